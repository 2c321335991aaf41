use alloc::vec::Vec;
use num_traits::Float;
use sigsmooth_core::{Error, Result};

use super::design::Sos;

///
/// Filter data along one dimension using cascaded second-order sections.
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.sosfilt.html>
///
/// Each section runs in transposed direct form II. The `zi0`/`zi1` state of every
/// section is consumed and left holding the final state, so consecutive calls
/// continue where the previous one stopped.
///
pub fn sosfilt_checked_slice<F: Float>(y: &[F], sos: &mut [Sos<F>]) -> Result<Vec<F>> {
    if sos.is_empty() {
        return Err(Error::invalid_arg(
            "sos",
            "at least one section is required.",
        ));
    }

    let mut out = y.to_vec();
    for s in sos.iter_mut() {
        let [b0, b1, b2] = s.b;
        let [_, a1, a2] = s.a;
        for v in out.iter_mut() {
            let x = *v;
            let y = b0 * x + s.zi0;
            s.zi0 = b1 * x - a1 * y + s.zi1;
            s.zi1 = b2 * x - a2 * y;
            *v = y;
        }
    }
    Ok(out)
}

///
/// Construct initial conditions for sosfilt for step response steady-state.
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.sosfilt_zi.html>
///
/// The state of each section is overwritten with the steady state reached by a unit step,
/// scaled by the DC gain of the sections before it.
///
pub fn sosfilt_zi_checked_slice<F: Float>(sos: &mut [Sos<F>]) -> Result<()> {
    if sos.is_empty() {
        return Err(Error::invalid_arg(
            "sos",
            "at least one section is required.",
        ));
    }

    let mut scale = F::one();
    for s in sos.iter_mut() {
        let [b0, b1, b2] = s.b;
        let [_, a1, a2] = s.a;
        let den = F::one() + a1 + a2;
        if den == F::zero() {
            return Err(Error::invalid_arg(
                "sos",
                "section has a pole at z = 1 and no steady state.",
            ));
        }
        let rhs0 = b1 - a1 * b0;
        let rhs1 = b2 - a2 * b0;
        let z0 = (rhs0 + rhs1) / den;
        let z1 = rhs1 - a2 * z0;

        s.zi0 = scale * z0;
        s.zi1 = scale * z1;
        scale = scale * s.dc_gain();
    }
    Ok(())
}
