//! Digital IIR filter design.
//!
//! Butterworth low-pass design following `scipy.signal.butter`: an analog
//! prototype in zero-pole-gain form is frequency scaled, mapped to the
//! z-plane with the bilinear transform and factored into second-order
//! sections.

use alloc::vec::Vec;
use nalgebra::Complex;
use num_traits::Float;
use sigsmooth_core::{Error, Result};
use tracing::debug;

use crate::cast;

mod kernels;
mod relative_degree;
mod zpk;

pub use kernels::*;
pub(crate) use relative_degree::*;
pub use zpk::*;

/// One biquad section of a cascaded filter, with its transposed direct form II state.
///
/// `a[0]` is always one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sos<F> {
    /// Numerator coefficients `b0, b1, b2`.
    pub b: [F; 3],
    /// Denominator coefficients `1, a1, a2`.
    pub a: [F; 3],
    /// First delay element.
    pub zi0: F,
    /// Second delay element.
    pub zi1: F,
}

impl<F: Float> Sos<F> {
    /// Build a section with zeroed state, normalising by `a[0]`.
    ///
    /// # Errors
    /// [Error::InvalidArg] when `a[0]` is zero or not finite.
    pub fn new(b: [F; 3], a: [F; 3]) -> Result<Self> {
        let a0 = a[0];
        if a0 == F::zero() || !a0.is_finite() {
            return Err(Error::invalid_arg(
                "a",
                "leading denominator coefficient must be finite and non-zero.",
            ));
        }
        Ok(Self {
            b: [b[0] / a0, b[1] / a0, b[2] / a0],
            a: [F::one(), a[1] / a0, a[2] / a0],
            zi0: F::zero(),
            zi1: F::zero(),
        })
    }

    ///
    /// Parse `sections` rows in scipy's `(n_sections, 6)` layout `[b0, b1, b2, a0, a1, a2]`.
    ///
    pub fn from_scipy_checked(sections: usize, coeffs: &[F]) -> Result<Vec<Self>> {
        if sections == 0 {
            return Err(Error::invalid_arg("sections", "at least one section is required."));
        }
        if coeffs.len() != sections * 6 {
            return Err(Error::invalid_arg(
                "coeffs",
                "expected six coefficients per section.",
            ));
        }
        coeffs
            .chunks_exact(6)
            .map(|row| Sos::new([row[0], row[1], row[2]], [row[3], row[4], row[5]]))
            .collect()
    }

    /// Gain of the section at zero frequency.
    pub fn dc_gain(&self) -> F {
        (self.b[0] + self.b[1] + self.b[2]) / (self.a[0] + self.a[1] + self.a[2])
    }

    /// Which of numerator and denominator have a vanishing `z^-2` term.
    pub(crate) fn trailing_zeros(&self) -> (bool, bool) {
        (self.b[2] == F::zero(), self.a[2] == F::zero())
    }
}

/// Zero-pole-gain representation.
#[derive(Debug, Clone, PartialEq)]
pub struct ZpkFormatFilter<F> {
    /// Zeros.
    pub z: Vec<Complex<F>>,
    /// Poles.
    pub p: Vec<Complex<F>>,
    /// System gain.
    pub k: F,
}

impl<F> ZpkFormatFilter<F> {
    /// Bundle zeros, poles and gain.
    pub fn new(z: Vec<Complex<F>>, p: Vec<Complex<F>>, k: F) -> Self {
        Self { z, p, k }
    }
}

/// Cascaded second-order sections representation.
#[derive(Debug, Clone, PartialEq)]
pub struct SosFormatFilter<F> {
    /// Sections in application order.
    pub sos: Vec<Sos<F>>,
}

/// Output representation requested from a design routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOutputType {
    /// Zeros, poles and gain.
    Zpk,
    /// Second-order sections.
    #[default]
    Sos,
}

/// A designed digital filter.
#[derive(Debug, Clone, PartialEq)]
pub enum DigitalFilter<F> {
    /// Zero-pole-gain form.
    Zpk(ZpkFormatFilter<F>),
    /// Second-order sections.
    Sos(SosFormatFilter<F>),
}

///
/// Butterworth digital low-pass filter design.
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.butter.html>
///
/// `cutoff` is normalised to the Nyquist frequency and must satisfy `0 < cutoff < 1`.
/// The -3 dB point of the designed filter lands exactly on `cutoff` because the
/// analog prototype is pre-warped before the bilinear transform.
///
pub fn butter_checked<F: Float>(
    order: usize,
    cutoff: F,
    output: FilterOutputType,
) -> Result<DigitalFilter<F>> {
    if order == 0 {
        return Err(Error::invalid_arg("order", "order must be greater than zero."));
    }
    if !(cutoff > F::zero() && cutoff < F::one()) {
        return Err(Error::invalid_arg(
            "cutoff",
            "normalized cutoff must satisfy 0 < cutoff < 1.",
        ));
    }

    // Digital design runs at fs = 2 so the cutoff is already in half-cycles per sample.
    let fs: F = cast(2.0);
    let warped = cast::<F>(2.0) * fs * (cast::<F>(core::f64::consts::PI) * cutoff / fs).tan();

    let zpk = buttap(order)?;
    let zpk = lp2lp_zpk(zpk, warped)?;
    let zpk = bilinear_zpk(zpk, fs)?;

    let filter = match output {
        FilterOutputType::Zpk => DigitalFilter::Zpk(zpk),
        FilterOutputType::Sos => {
            let sos = zpk2sos(zpk)?;
            debug!(order, sections = sos.sos.len(), "designed butterworth low-pass");
            DigitalFilter::Sos(sos)
        }
    };
    Ok(filter)
}

///
/// Convenience wrapper around [butter_checked] returning the sections directly.
///
pub fn butter_sos<F: Float>(order: usize, cutoff: F) -> Result<Vec<Sos<F>>> {
    match butter_checked(order, cutoff, FilterOutputType::Sos)? {
        DigitalFilter::Sos(sos) => Ok(sos.sos),
        DigitalFilter::Zpk(_) => Err(Error::ExecInvariantViolation {
            reason: "sos design returned zpk output".into(),
        }),
    }
}
