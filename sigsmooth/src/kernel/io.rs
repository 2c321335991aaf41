use super::{ConfigError, ExecInvariantViolation};

use alloc::vec::Vec;
use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// Adapter trait for reading a contiguous 1D signal.
pub trait Read1D<T> {
    /// Borrow the underlying samples as a contiguous slice.
    fn read_slice(&self) -> Result<&[T], ConfigError>;
}

/// Adapter trait for writing a contiguous 1D signal.
pub trait Write1D<T> {
    /// Borrow the underlying output as a mutable contiguous slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

impl<T> Read1D<T> for [T] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Read1D<T> for [T; N] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Write1D<T> for [T; N] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T> Read1D<T> for Vec<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

impl<T> Write1D<T> for Vec<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

// ndarray signals must be in standard layout; strided views are refused
// instead of being copied behind the caller's back.
impl<T> Read1D<T> for Array1<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice().ok_or(ConfigError::NonContiguous { arg: "signal" })
    }
}

impl<T> Write1D<T> for Array1<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "out" })
    }
}

impl<'a, T> Read1D<T> for ArrayView1<'a, T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "signal_view" })
    }
}

impl<'a, T> Write1D<T> for ArrayViewMut1<'a, T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "out_view" })
    }
}

/// Copy `samples` into `out`, checking that the lengths agree.
pub(crate) fn copy_into<T, O>(samples: &[T], out: &mut O) -> Result<(), ExecInvariantViolation>
where
    T: Copy,
    O: Write1D<T> + ?Sized,
{
    let out_slice = out
        .write_slice_mut()
        .map_err(ExecInvariantViolation::from)?;
    if out_slice.len() != samples.len() {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "out",
            expected: samples.len(),
            got: out_slice.len(),
        });
    }
    out_slice.copy_from_slice(samples);
    Ok(())
}
