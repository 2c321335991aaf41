use alloc::vec::Vec;
use num_traits::Float;
use sigsmooth_core::{Error, Result};

/// Pad types.
///
/// Used by [super::sosfiltfilt_checked_slice].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Pad {
    /// No padding.
    None,

    /// Odd extension of the first and last values.
    #[default]
    Odd,
}

/// Extend `x` at both ends for forward-backward filtering.
///
/// Returns the edge length together with the extended signal. When `padlen` is `None`
/// the edge is `3 * ntaps`, as `scipy.signal.sosfiltfilt` does.
///
/// # Errors
/// [Error::InsufficientData] when `x` is not strictly longer than the edge.
pub fn pad<F: Float>(
    padtype: Pad,
    padlen: Option<usize>,
    x: &[F],
    ntaps: usize,
) -> Result<(usize, Vec<F>)> {
    let edge = match padtype {
        Pad::None => 0,
        Pad::Odd => padlen.unwrap_or(ntaps * 3),
    };
    if x.len() <= edge {
        return Err(Error::insufficient_data("x", edge + 1, x.len()));
    }
    if edge == 0 {
        return Ok((0, x.to_vec()));
    }

    Ok((edge, odd_ext(x, edge)?))
}

/// Odd extension at the boundaries of a signal.
///
/// Mirrors `x` through its end points: `2 * x[0] - x[n..1]` is prepended and
/// `2 * x[-1] - x[-2..-n-1]` appended.
///
/// # Errors
/// [Error::InsufficientData] when `n >= x.len()`.
pub fn odd_ext<F: Float>(x: &[F], n: usize) -> Result<Vec<F>> {
    let (first, last) = ends(x, n)?;
    let two = F::one() + F::one();
    let len = x.len();

    let mut ext = Vec::with_capacity(len + 2 * n);
    ext.extend((1..=n).rev().map(|i| two * first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=n).map(|i| two * last - x[len - 1 - i]));
    Ok(ext)
}

fn ends<F: Float>(x: &[F], n: usize) -> Result<(F, F)> {
    match (x.first(), x.last()) {
        (Some(&first), Some(&last)) if n < x.len() => Ok((first, last)),
        _ => Err(Error::insufficient_data("x", n + 1, x.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn odd_ext_doc() {
        // scipy.signal._arraytools.odd_ext([1, 2, 3, 4, 5], 2)
        let a = [1.0f64, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(
            odd_ext(&a, 2).unwrap(),
            vec![-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        );
        assert_eq!(odd_ext(&a, 0).unwrap(), a.to_vec());
    }

    #[test]
    fn ext_limits() {
        let a = [1.0f64, 2.0, 3.0];
        assert_eq!(odd_ext(&a, 3), Err(Error::insufficient_data("x", 4, 3)));
        assert!(odd_ext::<f64>(&[], 0).is_err());
        assert_eq!(odd_ext(&a, 2).unwrap(), vec![-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn pad_default_edge_is_three_ntaps() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let (edge, ext) = pad(Pad::Odd, None, &x, 3).unwrap();
        assert_eq!(edge, 9);
        assert_eq!(ext.len(), 28);
        assert_eq!(ext[0], -9.0);
        assert_eq!(ext[27], 18.0);

        assert_eq!(
            pad(Pad::Odd, None, &x[..9], 3),
            Err(Error::insufficient_data("x", 10, 9))
        );
    }

    #[test]
    fn pad_none_passes_through() {
        let x = [1.0f32, 2.0];
        assert_eq!(pad(Pad::None, Some(5), &x, 3).unwrap(), (0, vec![1.0, 2.0]));
        assert_eq!(pad(Pad::Odd, Some(1), &x, 3).unwrap().1, vec![0.0, 1.0, 2.0, 3.0]);
    }
}
