//! Error types for tollgate.
//!
//! The [`BoxError`] type is a type-erased error type that can be used to represent any error that
//! implements the `std::error::Error` trait. It is used for cases where it is usually not
//! that important what specific error type is returned, but rather that an error occurred.
//!
//! [`OpaqueError`] wraps such a [`BoxError`] in a concrete type, so it can be returned
//! from functions and stored in other error types as their source.
//! [`ErrorContext`] and [`ErrorExt`] wrap errors in a human readable context.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

use std::error::Error as StdError;

/// Alias for a type-erased error type.
pub type BoxError = Box<dyn StdError + Send + Sync>;

mod ext;
pub use ext::{ErrorContext, ErrorExt, OpaqueError};
