#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
//! Signal conditioning for noisy, gap-containing, uniformly sampled series.
//!
//! Three independent stages and an orchestrator:
//!
//! * [low_pass_filter]: Butterworth low-pass in second-order sections, applied forward and
//!   backward so the output keeps the input's phase.
//! * [outlier_filter]: rejects sample-to-sample jumps at or above a quantile of all jumps and
//!   forward fills rejected and missing (NaN) samples.
//! * [lowess_filter]: locally weighted linear regression against the sample position.
//! * [filter_signal]: `outlier? -> low-pass -> lowess?`, configured by [PipelineConfig].
//!
//! ```
//! use sigsmooth::{filter_signal, low_pass_filter, PipelineConfig};
//!
//! let x: Vec<f64> = (0..100).map(|i| (i as f64 / 8.0).sin()).collect();
//! let y = filter_signal(&x, &PipelineConfig::default()).unwrap();
//! assert_eq!(y, low_pass_filter(&x, 2, 1.0 / 15.0).unwrap());
//! ```

extern crate alloc;

/// Re-export nalgebra for its complex type
pub use nalgebra as na;

/// Trait-first kernel substrate
pub mod kernel;

/// Orchestration of the conditioning stages
pub mod pipeline;

/// Signal conditioning stages
pub mod signal;

/// Median and mean reductions
pub mod stats;

pub use pipeline::{filter_signal, PipelineConfig, SignalPipeline, Smoothing, Stage};
pub use signal::filter::{low_pass_filter, LowPassConfig};
pub use signal::outlier::{detect_outliers, outlier_filter, OutlierConfig, OutlierMask};
pub use signal::smooth::{lowess, lowess_filter, LowessOptions};
pub use sigsmooth_core::{Error, Result};

/// Default Butterworth order of the low-pass stage.
pub const DEFAULT_LOW_PASS_ORDER: usize = 2;

/// Default low-pass cutoff as a fraction of the Nyquist frequency.
pub const DEFAULT_CUTOFF: f64 = 1.0 / 15.0;

/// Default jump quantile of the outlier stage.
pub const DEFAULT_OUTLIER_QUANTILE: f64 = 0.99;

/// Default LOWESS bandwidth as a fraction of the sample count.
pub const DEFAULT_LOWESS_FRAC: f64 = 0.08;

/// Default number of LOWESS robustness passes.
pub const DEFAULT_LOWESS_ITERATIONS: usize = 3;

/// Convert an `f64` constant into `F`. NaN if it cannot be represented.
pub(crate) fn cast<F: num_traits::Float>(value: f64) -> F {
    F::from(value).unwrap_or_else(F::nan)
}
