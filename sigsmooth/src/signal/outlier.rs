//! Quantile jump rejection with forward fill.
//!
//! Missing samples are marked with NaN. The valid samples form a working
//! series; a sample is rejected when its absolute jump from the previous
//! working sample is at least the chosen quantile of all such jumps. Rejected
//! and missing positions take the most recent accepted value.

use crate::kernel::{
    check_closed_unit, copy_into, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
    Write1D,
};
use crate::signal::traits::OutlierReject1D;
use crate::{cast, DEFAULT_OUTLIER_QUANTILE};
use alloc::vec::Vec;
use itertools::Itertools;
use num_traits::Float;
use sigsmooth_core::num_rs::{quantile, QuantileMethod};
use sigsmooth_core::{Error, Result};
use tracing::debug;

/// Parameters of the outlier rejection stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierConfig<F> {
    /// Quantile of the absolute jumps used as rejection threshold, in `[0, 1]`.
    pub quantile: F,
}

impl<F: Float> Default for OutlierConfig<F> {
    fn default() -> Self {
        Self {
            quantile: cast(DEFAULT_OUTLIER_QUANTILE),
        }
    }
}

impl<F: Float> OutlierConfig<F> {
    /// Run [outlier_filter] with these parameters.
    pub fn apply(&self, x: &[F]) -> Result<Vec<F>> {
        outlier_filter(x, self.quantile)
    }
}

/// Result of jump detection over a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierMask<F> {
    /// The jump threshold, `None` when fewer than two samples are valid.
    pub threshold: Option<F>,
    /// Positions, in the input, of rejected samples. Ascending.
    pub rejected: Vec<usize>,
    /// Number of non-missing samples.
    pub valid: usize,
}

impl<F> OutlierMask<F> {
    /// Whether the sample at `position` was rejected.
    pub fn is_rejected(&self, position: usize) -> bool {
        self.rejected.binary_search(&position).is_ok()
    }
}

///
/// Find the samples [outlier_filter] would reject.
///
/// The threshold is the `quantile` of the absolute first differences of the non-missing
/// samples, interpolated linearly like `pandas.Series.quantile`. The comparison is
/// inclusive: a jump equal to the threshold is an outlier.
///
/// Infinite samples are refused rather than passed through. pandas would carry an
/// infinity into the jump series, where the neighbouring `inf - inf` differences become
/// NaN and the threshold itself can come out infinite. Only NaN marks a missing value.
///
/// # Errors
/// [Error::InvalidArg] for `quantile` outside `[0, 1]` or an infinite sample.
///
pub fn detect_outliers<F: Float>(x: &[F], quantile_level: F) -> Result<OutlierMask<F>> {
    if !(quantile_level >= F::zero() && quantile_level <= F::one()) {
        return Err(Error::invalid_arg(
            "quantile",
            "quantile must lie in [0, 1].",
        ));
    }
    if x.iter().any(|v| v.is_infinite()) {
        return Err(Error::invalid_arg(
            "x",
            "samples must be finite, or NaN to mark a missing value.",
        ));
    }

    let working = x
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .collect::<Vec<_>>();
    let jumps = working
        .iter()
        .tuple_windows()
        .map(|((_, prev), (_, next))| (*next - *prev).abs())
        .collect::<Vec<_>>();

    if jumps.is_empty() {
        return Ok(OutlierMask {
            threshold: None,
            rejected: Vec::new(),
            valid: working.len(),
        });
    }

    let threshold = quantile(&jumps, quantile_level, QuantileMethod::Linear)?;
    let rejected = working[1..]
        .iter()
        .zip(jumps.iter())
        .filter(|(_, jump)| **jump >= threshold)
        .map(|((pos, _), _)| *pos)
        .collect::<Vec<_>>();

    debug!(
        valid = working.len(),
        rejected = rejected.len(),
        "outlier jump threshold computed"
    );
    Ok(OutlierMask {
        threshold: Some(threshold),
        rejected,
        valid: working.len(),
    })
}

///
/// Replace large sample-to-sample jumps, and missing samples, with the last accepted value.
///
/// `x` is not modified. NaN marks a missing sample. The output has the length of `x` and
/// contains no NaN.
///
/// * An empty or all-missing input returns an empty vector.
/// * A single valid sample has no jumps to measure, so nothing is rejected.
///
/// # Errors
/// * [Error::InvalidArg] for `quantile` outside `[0, 1]` or an infinite sample.
/// * [Error::UnresolvedMissing] when the input starts with missing samples, which forward
///   fill has no value for.
///
/// # Examples
/// ```
/// use sigsmooth::outlier_filter;
///
/// let mut x = vec![10.0f64; 50];
/// x[20] = 10_000.0;
/// x[30] = f64::NAN;
/// assert_eq!(outlier_filter(&x, 0.99).unwrap(), vec![10.0; 50]);
/// ```
///
pub fn outlier_filter<F: Float>(x: &[F], quantile_level: F) -> Result<Vec<F>> {
    let mask = detect_outliers(x, quantile_level)?;
    if mask.valid == 0 {
        debug!(len = x.len(), "no valid samples for outlier rejection");
        return Ok(Vec::new());
    }

    let leading = x.iter().take_while(|v| v.is_nan()).count();
    if leading > 0 {
        return Err(Error::UnresolvedMissing { leading });
    }

    let mut rejected = mask.rejected.iter().copied().peekable();
    let mut last = x[0];
    let filled = x
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let is_rejected = rejected.next_if_eq(&i).is_some();
            if !(is_rejected || v.is_nan()) {
                last = *v;
            }
            last
        })
        .collect::<Vec<_>>();
    Ok(filled)
}

/// Validated outlier rejection kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFilterKernel<F> {
    config: OutlierConfig<F>,
}

impl<F> KernelLifecycle for OutlierFilterKernel<F>
where
    F: Float,
{
    type Config = OutlierConfig<F>;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        check_closed_unit(
            "quantile",
            config.quantile,
            "quantile must satisfy 0 <= quantile <= 1",
        )?;
        Ok(Self { config })
    }
}

impl<F> OutlierFilterKernel<F> {
    /// Validated parameters.
    pub fn config(&self) -> &OutlierConfig<F> {
        &self.config
    }
}

impl<F> OutlierReject1D<F> for OutlierFilterKernel<F>
where
    F: Float,
{
    fn run_into<I, O>(
        &self,
        input: &I,
        out: &mut O,
    ) -> core::result::Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let y = self.run_alloc(input)?;
        copy_into(&y, out)
    }

    fn run_alloc<I>(&self, input: &I) -> core::result::Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(self.config.apply(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const NAN: f64 = f64::NAN;

    #[test]
    fn spike_is_replaced_by_previous_value() {
        let mut x = vec![10.0f64; 50];
        x[25] = 10_000.0;
        let mask = detect_outliers(&x, 0.99).unwrap();
        assert_eq!(mask.threshold, Some(9990.0));
        // the jump back down from the spike is as large as the jump up
        assert_eq!(mask.rejected, vec![25, 26]);

        let y = outlier_filter(&x, 0.99).unwrap();
        assert_eq!(y, vec![10.0; 50]);
        assert_eq!(x[25], 10_000.0);
    }

    #[test]
    fn jump_equal_to_threshold_is_rejected() {
        let x = [0.0f64, 0.0, 0.0, 0.0, 5.0, 5.0];
        let mask = detect_outliers(&x, 1.0).unwrap();
        assert_eq!(mask.threshold, Some(5.0));
        assert!(mask.is_rejected(4));
        assert!(!mask.is_rejected(5));
        assert_eq!(
            outlier_filter(&x, 1.0).unwrap(),
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 5.0]
        );
    }

    #[test]
    fn jumps_are_measured_across_gaps() {
        // the gap at 2 is skipped, so the jump into index 3 is measured from index 1
        let x = [1.0f64, 2.0, NAN, 3.0, 4.0, 20.0, 5.0];
        let mask = detect_outliers(&x, 0.5).unwrap();
        // jumps 1, 1, 1, 16, 15 -> median 1
        assert_eq!(mask.threshold, Some(1.0));
        assert_eq!(mask.rejected, vec![1, 3, 4, 5, 6]);
        assert_eq!(mask.valid, 6);
        assert_eq!(
            outlier_filter(&x, 0.5).unwrap(),
            vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn interior_gaps_are_forward_filled() {
        let x = [1.0f64, NAN, NAN, 1.5, NAN, 2.0];
        let y = outlier_filter(&x, 1.0).unwrap();
        // jumps 0.5, 0.5 -> threshold 0.5, both rejected
        assert_eq!(y, vec![1.0; 6]);
        assert!(y.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(outlier_filter::<f64>(&[], 0.99).unwrap(), Vec::<f64>::new());
        assert_eq!(outlier_filter(&[NAN, NAN], 0.99).unwrap(), Vec::<f64>::new());
        assert_eq!(outlier_filter(&[3.0f64], 0.99).unwrap(), vec![3.0]);
        assert_eq!(outlier_filter(&[3.0f64, NAN], 0.99).unwrap(), vec![3.0, 3.0]);
        assert_eq!(
            outlier_filter(&[NAN, 1.0f64, 2.0], 0.99),
            Err(Error::UnresolvedMissing { leading: 1 })
        );
    }

    #[test]
    fn invalid_arguments() {
        assert_eq!(
            outlier_filter(&[1.0f64, 2.0], -0.1),
            Err(Error::invalid_arg("quantile", "quantile must lie in [0, 1]."))
        );
        assert!(outlier_filter(&[1.0f64, 2.0], 1.5).is_err());
        assert!(outlier_filter(&[1.0f64, 2.0], NAN).is_err());
        assert!(matches!(
            outlier_filter(&[1.0f64, f64::INFINITY], 0.5),
            Err(Error::InvalidArg { ref arg, .. }) if arg == "x"
        ));
    }

    #[test]
    fn infinite_samples_are_refused_not_filtered() {
        let x = [1.0f64, f64::NAN, f64::NEG_INFINITY, 2.0, 3.0];
        assert_eq!(
            detect_outliers(&x, 0.5).map(|m| m.valid),
            Err(Error::invalid_arg(
                "x",
                "samples must be finite, or NaN to mark a missing value.",
            ))
        );
        // NaN alone is still a gap
        assert_eq!(outlier_filter(&[1.0f64, f64::NAN, 1.0], 0.5).unwrap().len(), 3);
    }

    #[test]
    fn kernel_matches_function() {
        let x = [1.0f32, 1.1, 9.0, 1.2, 1.3, 1.2];
        let kernel = OutlierFilterKernel::try_new(OutlierConfig::<f32>::default()).unwrap();
        let mut out = [0.0f32; 6];
        kernel.run_into(&x, &mut out).unwrap();
        assert_eq!(out.to_vec(), outlier_filter(&x, kernel.config().quantile).unwrap());

        assert!(OutlierFilterKernel::try_new(OutlierConfig { quantile: -0.1f64 }).is_err());

        let mut out = [0.0f64; 2];
        let err = kernel_for_f64().run_into(&[NAN, NAN], &mut out).unwrap_err();
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 0,
                got: 2,
            }
        );
    }

    fn kernel_for_f64() -> OutlierFilterKernel<f64> {
        OutlierFilterKernel::try_new(OutlierConfig::default()).unwrap()
    }
}
