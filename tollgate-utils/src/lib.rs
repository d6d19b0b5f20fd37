//! utilities crate for tollgate
//!
//! `tollgate-utils` contains the small helpers shared by the
//! other tollgate crates, mostly the builder macros used to
//! generate the `with_*` and `set_*` configuration methods.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

#[doc(hidden)]
#[macro_use]
pub mod macros;
