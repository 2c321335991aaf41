//! Signal conditioning stages.
//!
//! Each stage is a plain function over a slice plus a validated kernel
//! implementing one of the capability traits in [traits].

/// Butterworth design and zero-phase low-pass filtering.
pub mod filter;
pub mod outlier;
pub mod smooth;
pub mod traits;
