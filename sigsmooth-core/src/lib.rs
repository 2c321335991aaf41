//! Shared error type and numpy-flavoured numeric helpers for `sigsmooth`.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

extern crate alloc;

mod error;

/// numpy-compatible numeric helpers.
pub mod num_rs;

pub use error::*;

/// Result alias used throughout `sigsmooth`.
pub type Result<T> = core::result::Result<T, Error>;
