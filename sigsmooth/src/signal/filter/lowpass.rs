use alloc::vec::Vec;
use num_traits::Float;
use sigsmooth_core::{Error, Result};
use tracing::debug;

use super::design::butter_sos;
use super::{sosfiltfilt_checked_slice, sosfiltfilt_min_len};
use crate::{cast, DEFAULT_CUTOFF, DEFAULT_LOW_PASS_ORDER};

/// Parameters of the zero-phase Butterworth low-pass stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassConfig<F> {
    /// Butterworth order, at least one.
    pub order: usize,
    /// Cutoff as a fraction of the Nyquist frequency, in `(0, 1)`.
    pub cutoff: F,
}

impl<F: Float> Default for LowPassConfig<F> {
    fn default() -> Self {
        Self {
            order: DEFAULT_LOW_PASS_ORDER,
            cutoff: cast(DEFAULT_CUTOFF),
        }
    }
}

///
/// Zero-phase Butterworth low-pass filter.
///
/// Designs an `order`-th order Butterworth low-pass in second-order sections and runs it
/// forward and backward with [super::sosfiltfilt_checked_slice], so the output is
/// time-aligned with `x` and attenuated with the squared magnitude response. Both ends
/// are odd-extended by `3 * ntaps` samples and the filter state starts from the step
/// steady state of the boundary sample, so constant and slowly varying signals show no
/// start-up transient.
///
/// `ntaps` is `2 * sections + 1`, minus one for the first-order section of an odd
/// design. With the default order 2 the input needs at least 10 samples.
///
/// # Errors
/// * [Error::InvalidArg] for `order == 0`, `cutoff` outside `(0, 1)` or a non-finite sample.
/// * [Error::InsufficientData] when `x` is too short for the edge extension.
///
/// # Examples
/// ```
/// use sigsmooth::low_pass_filter;
///
/// let x = vec![4.0f64; 32];
/// let y = low_pass_filter(&x, 2, 1.0 / 15.0).unwrap();
/// assert_eq!(y.len(), 32);
/// assert!(y.iter().all(|v| (v - 4.0).abs() < 1e-9));
/// ```
///
pub fn low_pass_filter<F: Float>(x: &[F], order: usize, cutoff: F) -> Result<Vec<F>> {
    let sos = butter_sos(order, cutoff)?;

    let required = sosfiltfilt_min_len(&sos);
    if x.len() < required {
        return Err(Error::insufficient_data("x", required, x.len()));
    }
    if let Some(at) = x.iter().position(|v| !v.is_finite()) {
        debug!(at, "non-finite sample reached the low-pass stage");
        return Err(Error::invalid_arg(
            "x",
            "samples must be finite; resolve missing values before low-pass filtering.",
        ));
    }

    debug!(
        len = x.len(),
        order,
        sections = sos.len(),
        padlen = required - 1,
        "zero-phase low-pass"
    );
    sosfiltfilt_checked_slice(x, &sos)
}

impl<F: Float> LowPassConfig<F> {
    /// Run [low_pass_filter] with these parameters.
    pub fn apply(&self, x: &[F]) -> Result<Vec<F>> {
        low_pass_filter(x, self.order, self.cutoff)
    }
}
