use alloc::vec::Vec;
use core::cmp::min;
use num_traits::Float;
use sigsmooth_core::{Error, Result};

use super::{design::Sos, pad, sosfilt_checked_slice, sosfilt_zi_checked_slice, Pad};

///
/// A forward-backward digital filter using cascaded second-order sections
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.sosfiltfilt.html#scipy.signal.sosfiltfilt>
///
/// The signal is odd-extended by `3 * ntaps` samples at both ends, filtered forward
/// from the step steady state of its first sample, reversed and filtered again from
/// the steady state of the last forward output. The result has zero phase and the
/// squared magnitude response of `sos`.
///
/// # Errors
/// * [Error::InvalidArg] when `sos` is empty or `y` is empty.
/// * [Error::InsufficientData] when `y` is not longer than the edge extension.
///
#[inline]
pub fn sosfiltfilt_checked_slice<F: Float>(y: &[F], sos: &[Sos<F>]) -> Result<Vec<F>> {
    if sos.is_empty() {
        return Err(Error::invalid_arg(
            "sos",
            "at least one section is required.",
        ));
    }
    if y.is_empty() {
        return Err(Error::invalid_arg("y", "input must be non-empty."));
    }

    let ntaps = padding_taps(sos);
    let y_len = y.len();
    let (edge, ext) = pad(Pad::Odd, None, y, ntaps)?;

    let mut init_sos = sos.to_vec();
    sosfilt_zi_checked_slice(init_sos.as_mut_slice())?;

    let x0 = ext[0];
    let mut sos_x = scaled_state(&init_sos, x0);
    let forward = sosfilt_checked_slice(&ext, sos_x.as_mut_slice())?;

    let y0 = *forward
        .last()
        .ok_or_else(|| Error::invalid_arg("y", "input must be non-empty."))?;
    let mut sos_y = scaled_state(&init_sos, y0);
    let mut y_rev = forward;
    y_rev.reverse();
    let backward = sosfilt_checked_slice(&y_rev, sos_y.as_mut_slice())?;

    let mut z = backward
        .into_iter()
        .skip(edge)
        .take(y_len)
        .collect::<Vec<_>>();
    z.reverse();
    Ok(z)
}

/// Smallest input length [sosfiltfilt_checked_slice] accepts for `sos`.
pub fn sosfiltfilt_min_len<F: Float>(sos: &[Sos<F>]) -> usize {
    3 * padding_taps(sos) + 1
}

fn padding_taps<F: Float>(sos: &[Sos<F>]) -> usize {
    let (bzeros, azeros) = sos.iter().map(Sos::trailing_zeros).fold(
        (0usize, 0usize),
        |(b, a), (bz, az)| (b + usize::from(bz), a + usize::from(az)),
    );
    2 * sos.len() + 1 - min(bzeros, azeros)
}

fn scaled_state<F: Float>(sos: &[Sos<F>], by: F) -> Vec<Sos<F>> {
    sos.iter()
        .map(|s| Sos {
            zi0: s.zi0 * by,
            zi1: s.zi1 * by,
            ..*s
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::filter::design::butter_sos;
    use approx::assert_abs_diff_eq;
    use dasp_signal::{rate, Signal};

    #[test]
    fn can_sosfiltfilt() {
        // 4th order butterworth bandpass 10 to 50 at 1666Hz
        let filter: [f64; 24] = [
            2.677_576_738_259_783_5e-5,
            5.355_153_476_519_567e-5,
            2.677_576_738_259_783_5e-5,
            1.0,
            -1.7991202154617734,
            0.8162578614819005,
            1.0,
            2.0,
            1.0,
            1.0,
            -1.8774769894419825,
            0.9094302413068086,
            1.0,
            -2.0,
            1.0,
            1.0,
            -1.9237959892866103,
            0.9263794671616161,
            1.0,
            -2.0,
            1.0,
            1.0,
            -1.978497311228862,
            0.9799894886973378,
        ];
        let sos = Sos::from_scipy_checked(4, &filter).unwrap();
        assert_eq!(sos.len(), 4);

        let sample_hz = 1666.;
        let seconds = 10;
        let mut signal = rate(sample_hz).const_hz(25.).sine();
        let sin_wave: Vec<f64> = (0..seconds * sample_hz as usize)
            .map(|_| signal.next())
            .collect::<Vec<_>>();

        let bp_wave = sosfiltfilt_checked_slice(&sin_wave, &sos).unwrap();
        assert_eq!(sin_wave.len(), bp_wave.len());

        // 25 Hz sits inside the pass band; zero phase keeps it aligned with the input
        let mid = sin_wave.len() / 2;
        sin_wave[mid..mid + 200]
            .iter()
            .zip(&bp_wave[mid..mid + 200])
            .for_each(|(a, b)| assert_abs_diff_eq!(a, b, epsilon = 0.05));
    }

    #[test]
    fn low_pass_keeps_constants() {
        let sos = butter_sos(2, 1.0f64 / 15.0).unwrap();
        let y = sosfiltfilt_checked_slice(&[3.5; 10], &sos).unwrap();
        assert_eq!(y.len(), 10);
        y.iter().for_each(|v| assert_abs_diff_eq!(*v, 3.5, epsilon = 1e-9));
    }

    #[test]
    fn low_pass_keeps_ramps() {
        // away from the edges the forward delay and backward advance cancel on a trend
        let sos = butter_sos(3, 0.1f64).unwrap();
        let x: Vec<f64> = (0..200).map(|i| 0.25 * i as f64 - 3.0).collect();
        let y = sosfiltfilt_checked_slice(&x, &sos).unwrap();
        x[80..120]
            .iter()
            .zip(&y[80..120])
            .for_each(|(a, b)| assert_abs_diff_eq!(a, b, epsilon = 1e-6));
    }

    #[test]
    fn minimum_length_follows_section_count() {
        let order2 = butter_sos(2, 0.2f64).unwrap();
        assert_eq!(sosfiltfilt_min_len(&order2), 10);
        assert_eq!(
            sosfiltfilt_checked_slice(&[1.0; 9], &order2),
            Err(Error::insufficient_data("x", 10, 9))
        );
        assert!(sosfiltfilt_checked_slice(&[1.0; 10], &order2).is_ok());

        // the first-order section of an odd design removes one tap
        let order3 = butter_sos(3, 0.2f64).unwrap();
        assert_eq!(sosfiltfilt_min_len(&order3), 13);
    }

    #[test]
    fn rejects_empty_input() {
        let sos = butter_sos(2, 0.2f64).unwrap();
        assert!(sosfiltfilt_checked_slice(&[], &sos).is_err());
        assert!(sosfiltfilt_checked_slice::<f64>(&[1.0; 20], &[]).is_err());
    }
}
