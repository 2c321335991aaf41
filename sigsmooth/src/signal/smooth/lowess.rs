use alloc::{vec, vec::Vec};
use core::cmp::Ordering;
use num_traits::Float;
use sigsmooth_core::{Error, Result};
use tracing::{debug, trace};

use super::window::Window;
use crate::kernel::{
    check_half_open_unit, copy_into, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
    Write1D,
};
use crate::signal::traits::Smooth1D;
use crate::stats::{mean_abs, median};
use crate::{cast, DEFAULT_LOWESS_FRAC, DEFAULT_LOWESS_ITERATIONS};

/// Median residual below this fraction of the mean residual is treated as zero.
const SCALE_THRESHOLD: f64 = 1e-7;

/// Smallest residual scale used for reweighting.
const MIN_SCALE: f64 = 1e-12;

/// Parameters of the LOWESS smoother.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowessOptions<F> {
    /// Fraction of the samples used for each local fit, in `(0, 1]`.
    pub frac: F,
    /// Number of robustifying passes after the initial fit.
    pub iterations: usize,
}

impl<F: Float> Default for LowessOptions<F> {
    fn default() -> Self {
        Self {
            frac: cast(DEFAULT_LOWESS_FRAC),
            iterations: DEFAULT_LOWESS_ITERATIONS,
        }
    }
}

impl<F: Float> LowessOptions<F> {
    /// Smooth `y` against its sample positions `0..n`.
    pub fn apply(&self, y: &[F]) -> Result<Vec<F>> {
        self.validate(y)?;
        let x = (0..y.len())
            .map(|i| F::from(i).ok_or_else(|| Error::invalid_arg("y", "length overflows F.")))
            .collect::<Result<Vec<_>>>()?;
        let k = neighbours(y.len(), self.frac)?;
        Ok(fit_sorted(&x, y, k, self.iterations))
    }

    fn validate(&self, y: &[F]) -> Result<()> {
        if !(self.frac > F::zero() && self.frac <= F::one()) {
            return Err(Error::invalid_arg(
                "frac",
                "bandwidth fraction must satisfy 0 < frac <= 1.",
            ));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid_arg("y", "samples must be finite."));
        }
        Ok(())
    }
}

///
/// Locally weighted scatterplot smoothing of `y` against `x`.
///
/// <https://www.statsmodels.org/stable/generated/statsmodels.nonparametric.smoothers_lowess.lowess.html>
///
/// For every sample the `k = floor(frac * n)` nearest neighbours in `x` are weighted with
/// the tricube kernel scaled to the farthest of them, and a weighted straight line is
/// evaluated at the sample. Each robustifying pass reweights samples with the bisquare of
/// their residual over six times the median absolute residual. When that median vanishes
/// against the mean absolute residual, the mean is used instead, and an exact fit ends the
/// passes early. Shifting `y` by a constant shifts the result by the same constant.
///
/// `x` need not be sorted: the fit runs on the data ordered by `x` and the result is
/// returned in the caller's order.
///
/// # Errors
/// * [Error::InvalidArg] for `frac` outside `(0, 1]`, non-finite samples or
///   `x.len() != y.len()`.
/// * [Error::InsufficientData] when `frac * n < 2`, so no neighbourhood has two points.
///
pub fn lowess<F: Float>(x: &[F], y: &[F], options: &LowessOptions<F>) -> Result<Vec<F>> {
    options.validate(y)?;
    if x.len() != y.len() {
        return Err(Error::invalid_arg("x", "x and y must have the same length."));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid_arg("x", "samples must be finite."));
    }
    let k = neighbours(y.len(), options.frac)?;

    let sorted = sort_by_x(x, y);
    let fitted = fit_sorted(&sorted.x, &sorted.y, k, options.iterations);
    Ok(unsort(&fitted, &sorted.indices))
}

///
/// LOWESS with the sample position as abscissa and the default robustness passes.
///
/// # Examples
/// ```
/// use sigsmooth::lowess_filter;
///
/// let ramp: Vec<f64> = (0..50).map(|i| 0.5 * i as f64).collect();
/// let smoothed = lowess_filter(&ramp, 0.2).unwrap();
/// assert!(smoothed.windows(2).all(|w| w[0] <= w[1]));
/// ```
///
pub fn lowess_filter<F: Float>(y: &[F], frac: F) -> Result<Vec<F>> {
    LowessOptions {
        frac,
        ..LowessOptions::default()
    }
    .apply(y)
}

/// Neighbourhood size for `n` samples, rejecting sizes below two.
fn neighbours<F: Float>(n: usize, frac: F) -> Result<usize> {
    let slack: F = cast(1e-10);
    let k = F::from(n)
        .map(|n| (frac * n + slack).floor())
        .and_then(|k| k.to_usize())
        .unwrap_or(0)
        .min(n);
    if k < 2 {
        let two: F = cast(2.0);
        let required = ((two - slack) / frac)
            .ceil()
            .to_usize()
            .unwrap_or(usize::MAX);
        return Err(Error::insufficient_data("y", required, n));
    }
    Ok(k)
}

fn fit_sorted<F: Float>(x: &[F], y: &[F], k: usize, iterations: usize) -> Vec<F> {
    let n = x.len();
    let range = x[n - 1] - x[0];
    debug!(len = n, neighbours = k, iterations, "lowess");

    let mut robustness = vec![F::one(); n];
    let mut fitted = vec![F::zero(); n];
    let mut weights = Vec::with_capacity(k);
    for iteration in 0..=iterations {
        let mut window = Window::first(k, n);
        for (i, fit) in fitted.iter_mut().enumerate() {
            window.recenter(x, i);
            *fit = fit_point(x, y, &robustness, window, i, range, &mut weights);
        }
        if iteration == iterations {
            break;
        }

        let residuals = y
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| (*y - *f).abs())
            .collect::<Vec<_>>();
        // an exact fit leaves nothing to reweight
        let Some(scale) = residual_scale(&residuals) else {
            break;
        };
        let cmad = cast::<F>(6.0) * scale;
        trace!(iteration, cmad = cmad.to_f64().unwrap_or(f64::NAN), "lowess residual scale");
        bisquare(&residuals, cmad, &mut robustness);
    }
    fitted
}

/// Weighted local line through the window, evaluated at `x[i]`.
///
/// The line is written around the weighted means of the window so a constant
/// response comes back as its weighted mean.
fn fit_point<F: Float>(
    x: &[F],
    y: &[F],
    robustness: &[F],
    window: Window,
    i: usize,
    range: F,
    weights: &mut Vec<F>,
) -> F {
    let at = x[i];
    let h = window.radius(x, i);
    let near = cast::<F>(0.001) * h;
    let far = cast::<F>(0.999) * h;

    let span = window.left..=window.right;
    weights.clear();
    weights.extend(span.clone().map(|j| {
        let r = (x[j] - at).abs();
        let w = if r <= near {
            F::one()
        } else if r <= far {
            let q = r / h;
            let t = F::one() - q * q * q;
            t * t * t
        } else {
            F::zero()
        };
        w * robustness[j]
    }));

    let total = weights.iter().fold(F::zero(), |acc, w| acc + *w);
    if total <= F::zero() {
        return y[i];
    }
    weights.iter_mut().for_each(|w| *w = *w / total);

    let xs = &x[span.clone()];
    let ys = &y[span];
    let y_mean = weights
        .iter()
        .zip(ys)
        .fold(F::zero(), |acc, (w, y)| acc + *w * *y);
    if h <= F::zero() {
        return y_mean;
    }

    let x_mean = weights
        .iter()
        .zip(xs)
        .fold(F::zero(), |acc, (w, x)| acc + *w * *x);
    let var = weights
        .iter()
        .zip(xs)
        .fold(F::zero(), |acc, (w, x)| acc + *w * (*x - x_mean) * (*x - x_mean));
    if var.sqrt() <= cast::<F>(0.001) * range {
        return y_mean;
    }
    let cov = weights
        .iter()
        .zip(xs.iter().zip(ys))
        .fold(F::zero(), |acc, (w, (x, y))| {
            acc + *w * (*x - x_mean) * (*y - y_mean)
        });
    y_mean + (at - x_mean) * cov / var
}

/// Robust scale of absolute residuals: their median, or their mean when the median
/// vanishes against it. `None` when every residual is zero.
fn residual_scale<F: Float>(residuals: &[F]) -> Option<F> {
    let mad = median::<_, F>(residuals.iter()).0;
    let mar = mean_abs::<_, F>(residuals.iter()).0;
    if !(mar > F::zero()) {
        return None;
    }
    let floor = (cast::<F>(SCALE_THRESHOLD) * mar).max(cast(MIN_SCALE));
    if mad <= floor {
        Some(mar.max(mad))
    } else {
        Some(mad)
    }
}

fn bisquare<F: Float>(residuals: &[F], cmad: F, robustness: &mut [F]) {
    let cmad = cmad.max(cast(MIN_SCALE));
    let near = cast::<F>(0.001) * cmad;
    let far = cast::<F>(0.999) * cmad;
    robustness
        .iter_mut()
        .zip(residuals)
        .for_each(|(w, r)| {
            *w = if *r <= near {
                F::one()
            } else if *r <= far {
                let u = *r / cmad;
                let t = F::one() - u * u;
                t * t
            } else {
                F::zero()
            };
        });
}

struct SortedData<F> {
    x: Vec<F>,
    y: Vec<F>,
    indices: Vec<usize>,
}

fn sort_by_x<F: Float>(x: &[F], y: &[F]) -> SortedData<F> {
    let mut indices = (0..x.len()).collect::<Vec<_>>();
    indices.sort_by(|a, b| x[*a].partial_cmp(&x[*b]).unwrap_or(Ordering::Equal));
    SortedData {
        x: indices.iter().map(|i| x[*i]).collect(),
        y: indices.iter().map(|i| y[*i]).collect(),
        indices,
    }
}

fn unsort<F: Float>(sorted: &[F], indices: &[usize]) -> Vec<F> {
    let mut out = vec![F::zero(); indices.len()];
    for (value, original) in sorted.iter().zip(indices) {
        out[*original] = *value;
    }
    out
}

/// Validated positional LOWESS kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowessKernel<F> {
    options: LowessOptions<F>,
}

impl<F> KernelLifecycle for LowessKernel<F>
where
    F: Float,
{
    type Config = LowessOptions<F>;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        check_half_open_unit(
            "frac",
            config.frac,
            "bandwidth fraction must satisfy 0 < frac <= 1",
        )?;
        Ok(Self { options: config })
    }
}

impl<F> LowessKernel<F> {
    /// Validated parameters.
    pub fn options(&self) -> &LowessOptions<F> {
        &self.options
    }
}

impl<F> Smooth1D<F> for LowessKernel<F>
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
        Ok(self.options.apply(input)?)
    }
}
