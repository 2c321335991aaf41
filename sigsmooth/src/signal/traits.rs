//! Trait interfaces for signal-conditioning capabilities.
//!
//! Every stage kernel exposes the same shape: `run_into` writes into a
//! caller-provided buffer of the input's length, `run_alloc` returns a new
//! vector.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};

use alloc::vec::Vec;
use nalgebra::Complex;

/// Output tuple for splitting roots into conjugate-paired complex and real sets.
pub type ComplexSplit<T> = (Vec<Complex<T>>, Vec<Complex<T>>);

/// IIR design capability.
pub trait IirDesign<T> {
    /// Output representation produced by the design kernel.
    type Output;

    /// Run IIR design and allocate output representation.
    fn run_alloc(&self) -> Result<Self::Output, ExecInvariantViolation>;
}

/// 1D `sosfilt` capability.
pub trait SosFilt1D<T> {
    /// Run second-order-sections filtering into a caller-provided output buffer.
    fn run_into<I, O>(&mut self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run second-order-sections filtering and allocate output.
    fn run_alloc<I>(&mut self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D `sosfiltfilt` capability.
pub trait SosFiltFilt1D<T> {
    /// Run zero-phase SOS filtering into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run zero-phase SOS filtering and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D zero-phase low-pass capability.
pub trait LowPass1D<T> {
    /// Run low-pass filtering into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run low-pass filtering and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D outlier rejection capability.
pub trait OutlierReject1D<T> {
    /// Reject outliers into a caller-provided output buffer.
    ///
    /// The buffer must have the input's length. All-missing input cannot be
    /// written this way and reports [ExecInvariantViolation::LengthMismatch].
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Reject outliers and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D smoothing capability.
pub trait Smooth1D<T> {
    /// Smooth into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Smooth and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Full conditioning chain capability.
pub trait Condition1D<T> {
    /// Condition into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Condition and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}
