use crate::{Error, Result};
use alloc::vec::Vec;
use core::cmp::Ordering;
use num_traits::Float;

/// Estimation method used when the requested quantile falls between two order statistics.
///
/// Only numpy's default `linear` method is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantileMethod {
    /// Linear interpolation between the two neighbouring order statistics. This is the numpy and
    /// pandas default.
    #[default]
    Linear,
}

/// Best effort parallel behaviour with numpy's quantile method.
///
/// Computes the `q`-th quantile of `a`.
///
/// # Parameters
/// * `a` : (N,) slice
///   Samples. Must be non-empty and must not contain NaN.
/// * `q` : `F`
///   Probability in the closed interval `[0, 1]`.
/// * `method` : [QuantileMethod]
///   How to pick a value when `q * (N - 1)` is not an integer.
///
/// # Errors
/// [Error::InvalidArg] for an empty input, a NaN sample or `q` outside `[0, 1]`.
///
/// # Examples
/// ```
/// use sigsmooth_core::num_rs::{quantile, QuantileMethod};
///
/// let a = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile(&a, 0.5, QuantileMethod::Linear).unwrap(), 2.5);
/// assert_eq!(quantile(&a, 0.25, QuantileMethod::Linear).unwrap(), 1.75);
/// ```
pub fn quantile<F>(a: &[F], q: F, method: QuantileMethod) -> Result<F>
where
    F: Float,
{
    if a.is_empty() {
        return Err(Error::invalid_arg("a", "input must be non-empty."));
    }
    if q.is_nan() || q < F::zero() || q > F::one() {
        return Err(Error::invalid_arg("q", "quantile must lie in [0, 1]."));
    }
    if a.iter().any(|v| v.is_nan()) {
        return Err(Error::invalid_arg("a", "input must not contain NaN."));
    }

    let mut sorted: Vec<F> = a.to_vec();
    sorted.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));

    let last = sorted.len() - 1;
    let pos = q * F::from(last).ok_or_else(|| Error::invalid_arg("a", "length overflows F."))?;
    let lo = pos.floor().to_usize().unwrap_or(0).min(last);
    let hi = pos.ceil().to_usize().unwrap_or(last).min(last);
    let frac = pos - pos.floor();

    let value = match method {
        QuantileMethod::Linear => lerp(sorted[lo], sorted[hi], frac),
    };
    Ok(value)
}

/// numpy's `_lerp`: exact at both endpoints, and monotone in `t`.
fn lerp<F: Float>(a: F, b: F, t: F) -> F {
    let diff = b - a;
    let half = F::from(0.5).unwrap_or_else(F::zero);
    if t >= half {
        b - diff * (F::one() - t)
    } else {
        a + diff * t
    }
}
