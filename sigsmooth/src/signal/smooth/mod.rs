//! Local regression smoothing.

mod lowess;
mod window;

pub use lowess::*;
