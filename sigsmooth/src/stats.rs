//! Small reductions used by the robust stages.

use alloc::vec::Vec;
use core::borrow::Borrow;
use num_traits::Float;

///
/// Compute the median of the signal, `y`
///
/// Return the median and the number of points it was taken over. NaN samples
/// are ignored; an empty or all-NaN input gives `(NaN, 0)`.
///
/// ```
/// use approx::assert_relative_eq;
/// use sigsmooth::stats::median;
///
/// let y: [f64; 5] = [1.,2.,3.,4.,5.];
/// assert_relative_eq!(3f64, median::<_, f64>(y.iter()).0);
///
/// let y: [f64; 4] = [1.,2.,3.,4.];
/// assert_relative_eq!(2.5f64, median::<_, f64>(y.iter()).0);
///
/// let y: [f32; 6] = [3.,1.,4.,2.,3.,5.];
/// assert_relative_eq!(3f32, median::<_, f32>(y.iter()).0);
///
/// let y: &[f32] = &[];
/// assert!(median::<_, f32>(y.iter()).0.is_nan());
/// ```
///
pub fn median<YI, F>(y: YI) -> (F, usize)
where
    F: Float,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    let mut y = y
        .map(|yi| *yi.borrow())
        .filter(|yi| !yi.is_nan())
        .collect::<Vec<_>>();
    let n = y.len();
    if n == 0 {
        return (F::nan(), 0);
    }

    let upper = quickselect(&mut y, n / 2);
    if n % 2 == 1 {
        (upper, n)
    } else {
        // after selection everything left of n / 2 is <= upper
        let lower = y[..n / 2]
            .iter()
            .copied()
            .fold(F::neg_infinity(), F::max);
        ((lower + upper) / (F::one() + F::one()), n)
    }
}

///
/// Mean of the absolute values of `y`.
///
/// Return the mean and the number of points averaged; an empty input gives `(NaN, 0)`.
///
pub fn mean_abs<YI, F>(y: YI) -> (F, usize)
where
    F: Float,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    let (sum, count) = y.fold((F::zero(), 0usize), |acc, yi| {
        (acc.0 + yi.borrow().abs(), acc.1 + 1)
    });
    match F::from(count) {
        Some(n) if count > 0 => (sum / n, count),
        _ => (F::nan(), 0),
    }
}

/// Place the `k`-th smallest element at `k` and return it.
fn quickselect<F: Float>(y: &mut [F], k: usize) -> F {
    let (_, kth, _) = y.select_nth_unstable_by(k, |a, b| {
        a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal)
    });
    *kth
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn median_ignores_nan() {
        let y = [f64::NAN, 5.0, 1.0, f64::NAN, 3.0];
        assert_eq!(median::<_, f64>(y.iter()), (3.0, 3));
    }

    #[test]
    fn median_even_count_with_duplicates() {
        let y = [2.0f64, 2.0, 9.0, 2.0, 7.0, 1.0];
        assert_eq!(median::<_, f64>(y.iter()).0, 2.0);
        let y = [4.0f32, 1.0, 3.0, 2.0];
        assert_relative_eq!(median::<_, f32>(y.iter()).0, 2.5);
    }

    #[test]
    fn mean_abs_of_signed_values() {
        let y = [-1.0f64, 2.0, -3.0, 4.0];
        assert_eq!(mean_abs::<_, f64>(y.iter()), (2.5, 4));
        let empty: [f32; 0] = [];
        assert!(mean_abs::<_, f32>(empty.iter()).0.is_nan());
    }
}
