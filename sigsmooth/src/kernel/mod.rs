//! Shared trait-first kernel substrate.
//!
//! Stage kernels validate their configuration once in
//! [`KernelLifecycle::try_new`] and read/write samples through the
//! [`Read1D`]/[`Write1D`] adapters.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
