use alloc::vec::Vec;
use core::cmp::Ordering;
use nalgebra::Complex;
use num_traits::Float;
use sigsmooth_core::{Error, Result};

use super::{relative_degree_checked, Sos, SosFormatFilter, ZpkFormatFilter};
use crate::cast;
use crate::signal::traits::ComplexSplit;

///
/// Analog Butterworth low-pass prototype with unit cutoff.
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.buttap.html>
///
pub fn buttap<F: Float>(order: usize) -> Result<ZpkFormatFilter<F>> {
    if order == 0 {
        return Err(Error::invalid_arg("order", "order must be greater than zero."));
    }
    let n = cast::<F>(order as f64);
    let pi = cast::<F>(core::f64::consts::PI);
    let two = cast::<F>(2.0);
    let p = (0..order)
        .map(|i| {
            // m = -N+1, -N+3, ..., N-1
            let m = cast::<F>(2.0 * i as f64 + 1.0 - order as f64);
            let theta = pi * m / (two * n);
            if m == F::zero() {
                Complex::new(-F::one(), F::zero())
            } else {
                Complex::new(-theta.cos(), -theta.sin())
            }
        })
        .collect();
    Ok(ZpkFormatFilter::new(Vec::new(), p, F::one()))
}

///
/// Transform a low-pass prototype to a different cutoff frequency `wo` (rad/s).
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.lp2lp_zpk.html>
///
pub fn lp2lp_zpk<F: Float>(zpk: ZpkFormatFilter<F>, wo: F) -> Result<ZpkFormatFilter<F>> {
    if !(wo > F::zero()) || !wo.is_finite() {
        return Err(Error::invalid_arg("wo", "cutoff must be positive and finite."));
    }
    let degree = relative_degree_checked(&zpk.z, &zpk.p)?;
    let z = zpk.z.into_iter().map(|z| z * wo).collect();
    let p = zpk.p.into_iter().map(|p| p * wo).collect();
    let k = zpk.k * wo.powi(degree as i32);
    Ok(ZpkFormatFilter::new(z, p, k))
}

///
/// Bilinear transform of an analog zero-pole-gain filter to the z-plane.
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.bilinear_zpk.html>
///
pub fn bilinear_zpk<F: Float>(zpk: ZpkFormatFilter<F>, fs: F) -> Result<ZpkFormatFilter<F>> {
    if !(fs > F::zero()) || !fs.is_finite() {
        return Err(Error::invalid_arg("fs", "sample rate must be positive and finite."));
    }
    let degree = relative_degree_checked(&zpk.z, &zpk.p)?;
    let fs2 = Complex::new(cast::<F>(2.0) * fs, F::zero());
    let one = Complex::new(F::one(), F::zero());

    let mut z: Vec<Complex<F>> = zpk.z.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
    let p = zpk.p.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();

    // Zeros at infinity map to Nyquist.
    z.extend(core::iter::repeat(-one).take(degree));

    let num = zpk.z.iter().fold(one, |acc, &z| acc * (fs2 - z));
    let den = zpk.p.iter().fold(one, |acc, &p| acc * (fs2 - p));
    let k = zpk.k * (num / den).re;
    Ok(ZpkFormatFilter::new(z, p, k))
}

///
/// Split roots into conjugate pairs and purely real roots.
///
/// Returns the member of each pair with positive imaginary part, and the real roots.
/// Roots whose imaginary part is within `100 * eps * |z|` of zero count as real.
///
/// <https://github.com/scipy/scipy/blob/main/scipy/signal/_filter_design.py> (`_cplxreal`)
///
pub fn cplxreal<F: Float>(roots: &[Complex<F>]) -> Result<ComplexSplit<F>> {
    let tol = cast::<F>(100.0) * F::epsilon();
    let is_real = |z: &Complex<F>| z.im.abs() <= tol * modulus(z);

    let reals: Vec<Complex<F>> = roots
        .iter()
        .filter(|z| is_real(*z))
        .map(|z| Complex::new(z.re, F::zero()))
        .collect();
    let mut upper: Vec<Complex<F>> = roots
        .iter()
        .filter(|z| !is_real(*z) && z.im > F::zero())
        .copied()
        .collect();
    let mut lower: Vec<Complex<F>> = roots
        .iter()
        .filter(|z| !is_real(*z) && z.im < F::zero())
        .copied()
        .collect();

    if upper.len() != lower.len() {
        return Err(Error::invalid_arg(
            "roots",
            "complex values do not come in conjugate pairs.",
        ));
    }

    let by_position = |a: &Complex<F>, b: &Complex<F>| {
        a.re.partial_cmp(&b.re)
            .unwrap_or(Ordering::Equal)
            .then(a.im.abs().partial_cmp(&b.im.abs()).unwrap_or(Ordering::Equal))
    };
    upper.sort_by(by_position);
    lower.sort_by(by_position);

    let mut pairs = Vec::with_capacity(upper.len());
    for (u, l) in upper.iter().zip(lower.iter()) {
        if modulus(&(*u - l.conj())) > tol * cast::<F>(10.0) * modulus(u).max(F::one()) {
            return Err(Error::invalid_arg(
                "roots",
                "complex values do not come in conjugate pairs.",
            ));
        }
        // Average the pair so the section polynomial is exactly real.
        let half = cast::<F>(0.5);
        pairs.push(Complex::new((u.re + l.re) * half, (u.im - l.im) * half));
    }
    Ok((pairs, reals))
}

fn modulus<F: Float>(z: &Complex<F>) -> F {
    z.re.hypot(z.im)
}

/// Section polynomials `[1, c1, c2]` built from one conjugate pair or up to two real roots.
struct RootSection<F> {
    poly: [F; 3],
    order: usize,
    // magnitude of the largest root, poles closest to the unit circle go last
    reach: F,
}

fn root_sections<F: Float>(roots: &[Complex<F>]) -> Result<Vec<RootSection<F>>> {
    let (pairs, reals) = cplxreal(roots)?;
    let mut sections: Vec<RootSection<F>> = pairs
        .iter()
        .map(|c| RootSection {
            poly: [F::one(), cast::<F>(-2.0) * c.re, c.norm_sqr()],
            order: 2,
            reach: modulus(c),
        })
        .collect();

    let mut reals: Vec<F> = reals.iter().map(|z| z.re).collect();
    reals.sort_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal));
    for chunk in reals.chunks(2) {
        let section = match chunk {
            [r1, r2] => RootSection {
                poly: [F::one(), -(*r1 + *r2), *r1 * *r2],
                order: 2,
                reach: r1.abs().max(r2.abs()),
            },
            [r] => RootSection {
                poly: [F::one(), -*r, F::zero()],
                order: 1,
                reach: r.abs(),
            },
            _ => continue,
        };
        sections.push(section);
    }
    Ok(sections)
}

///
/// Factor a zero-pole-gain filter into cascaded second-order sections.
///
/// Poles farthest from the unit circle come first, the gain is folded into the
/// first section, and a lone real pole shares its section with a lone real zero
/// when one is available.
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.zpk2sos.html>
///
pub fn zpk2sos<F: Float>(zpk: ZpkFormatFilter<F>) -> Result<SosFormatFilter<F>> {
    let identity = [F::one(), F::zero(), F::zero()];

    let mut poles = root_sections(&zpk.p)?;
    poles.sort_by(|a, b| a.reach.partial_cmp(&b.reach).unwrap_or(Ordering::Equal));

    let (mut zero_singles, mut zero_pairs): (Vec<_>, Vec<_>) = root_sections(&zpk.z)?
        .into_iter()
        .partition(|s| s.order == 1);

    let mut sos = Vec::with_capacity(poles.len().max(1));
    for pole in poles.iter() {
        let zero = if pole.order == 1 && !zero_singles.is_empty() {
            zero_singles.pop()
        } else {
            zero_pairs.pop().or_else(|| zero_singles.pop())
        };
        let b = zero.map(|z| z.poly).unwrap_or(identity);
        sos.push(Sos::new(b, pole.poly)?);
    }
    // More zeros than poles only arises for improper inputs, keep them as FIR sections.
    for zero in zero_pairs.into_iter().chain(zero_singles) {
        sos.push(Sos::new(zero.poly, identity)?);
    }
    if sos.is_empty() {
        sos.push(Sos::new(identity, identity)?);
    }

    let first = &mut sos[0];
    first.b = [first.b[0] * zpk.k, first.b[1] * zpk.k, first.b[2] * zpk.k];

    if sos
        .iter()
        .any(|s| s.b.iter().chain(s.a.iter()).any(|c| !c.is_finite()))
    {
        return Err(Error::ExecInvariantViolation {
            reason: "second-order sections contain non-finite coefficients".into(),
        });
    }
    Ok(SosFormatFilter { sos })
}
