//! Crypto primitives and dependencies used by tollgate.
//!
//! This includes:
//! - JSON Web Keys and key sets, with conversion to and from native keys
//! - The JWS signature algorithms, backed by `aws-lc-rs`
//! - JWS messages in compact and JSON serialization
//! - JWT parsing, signing and claim validation
//!
//! # Tollgate
//!
//! Crate used by the end-user `tollgate` crate and `tollgate` crate authors alike.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(test, allow(clippy::float_cmp))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

pub mod jose;

pub mod dep {
    //! Dependencies for tollgate crypto modules.
    //!
    //! Exported for your convenience

    pub mod aws_lc_rs {
        //! Re-export of the [`aws-lc-rs`] crate.
        //!
        //! [`aws-lc-rs`]: https://docs.rs/aws-lc-rs

        #[doc(inline)]
        pub use aws_lc_rs::*;
    }

    pub mod jiff {
        //! Re-export of the [`jiff`] crate.
        //!
        //! [`jiff`]: https://docs.rs/jiff

        #[doc(inline)]
        pub use jiff::*;
    }

    pub mod pki_types {
        //! Re-export of the [`rustls-pki-types`] crate.
        //!
        //! [`rustls-pki-types`]: https://docs.rs/rustls-pki-types

        #[doc(inline)]
        pub use rustls_pki_types::*;
    }

    pub mod x509_parser {
        //! Re-export of the [`x509_parser`] crate.
        //!
        //! [`x509_parser`]: https://docs.rs/x509_parser

        #[doc(inline)]
        pub use x509_parser::*;
    }
}
