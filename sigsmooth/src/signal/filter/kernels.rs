//! Trait-first kernel wrappers for filtering primitives.

use crate::kernel::{
    check_open_unit, copy_into, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
    Write1D,
};
use crate::signal::traits::{LowPass1D, SosFilt1D, SosFiltFilt1D};
use alloc::vec::Vec;
use num_traits::Float;

use super::design::Sos;
use super::LowPassConfig;

/// Constructor config for [`SosFiltKernel`].
#[derive(Debug, Clone)]
pub struct SosFiltConfig<F> {
    /// Second-order sections with mutable filter state.
    pub sos: Vec<Sos<F>>,
}

/// Stateful 1D `sosfilt` kernel.
#[derive(Debug, Clone)]
pub struct SosFiltKernel<F> {
    sos: Vec<Sos<F>>,
}

impl<F> KernelLifecycle for SosFiltKernel<F>
where
    F: Float,
{
    type Config = SosFiltConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.sos.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "sos" });
        }
        Ok(Self { sos: config.sos })
    }
}

impl<F> SosFiltKernel<F> {
    /// Current section state.
    pub fn sections(&self) -> &[Sos<F>] {
        &self.sos
    }
}

impl<F> SosFilt1D<F> for SosFiltKernel<F>
where
    F: Float,
{
    fn run_into<I, O>(&mut self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let y = self.run_alloc(input)?;
        copy_into(&y, out)
    }

    fn run_alloc<I>(&mut self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(super::sosfilt_checked_slice(input, &mut self.sos)?)
    }
}

/// Constructor config for [`SosFiltFiltKernel`].
#[derive(Debug, Clone)]
pub struct SosFiltFiltConfig<F> {
    /// Second-order sections used for forward-backward filtering.
    pub sos: Vec<Sos<F>>,
}

/// Stateless 1D `sosfiltfilt` kernel.
#[derive(Debug, Clone)]
pub struct SosFiltFiltKernel<F> {
    sos: Vec<Sos<F>>,
}

impl<F> KernelLifecycle for SosFiltFiltKernel<F>
where
    F: Float,
{
    type Config = SosFiltFiltConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.sos.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "sos" });
        }
        Ok(Self { sos: config.sos })
    }
}

impl<F> SosFiltFilt1D<F> for SosFiltFiltKernel<F>
where
    F: Float,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let y = self.run_alloc(input)?;
        copy_into(&y, out)
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(super::sosfiltfilt_checked_slice(input, &self.sos)?)
    }
}

/// Validated zero-phase Butterworth low-pass kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassKernel<F> {
    config: LowPassConfig<F>,
}

impl<F> KernelLifecycle for LowPassKernel<F>
where
    F: Float,
{
    type Config = LowPassConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.order == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "order",
                reason: "order must be greater than zero",
            });
        }
        check_open_unit(
            "cutoff",
            config.cutoff,
            "normalized cutoff must satisfy 0 < cutoff < 1",
        )?;
        Ok(Self { config })
    }
}

impl<F> LowPassKernel<F> {
    /// Validated parameters.
    pub fn config(&self) -> &LowPassConfig<F> {
        &self.config
    }
}

impl<F> LowPass1D<F> for LowPassKernel<F>
where
    F: Float,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let y = self.run_alloc(input)?;
        copy_into(&y, out)
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(self.config.apply(input)?)
    }
}
