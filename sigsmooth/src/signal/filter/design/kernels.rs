//! Trait-first kernels for filter design APIs.

use crate::kernel::{check_open_unit, ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::signal::traits::IirDesign;
use num_traits::Float;

use super::{butter_checked, DigitalFilter, FilterOutputType};

/// Constructor config for [`ButterKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterConfig<F> {
    /// Filter order.
    pub order: usize,
    /// Cutoff as a fraction of the Nyquist frequency.
    pub cutoff: F,
    /// Optional output format, second-order sections by default.
    pub output: Option<FilterOutputType>,
}

/// Trait-first Butterworth low-pass design kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterKernel<F> {
    order: usize,
    cutoff: F,
    output: FilterOutputType,
}

impl<F> KernelLifecycle for ButterKernel<F>
where
    F: Float,
{
    type Config = ButterConfig<F>;

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

        Ok(Self {
            order: config.order,
            cutoff: config.cutoff,
            output: config.output.unwrap_or_default(),
        })
    }
}

impl<F> IirDesign<F> for ButterKernel<F>
where
    F: Float,
{
    type Output = DigitalFilter<F>;

    fn run_alloc(&self) -> Result<Self::Output, ExecInvariantViolation> {
        Ok(butter_checked(self.order, self.cutoff, self.output)?)
    }
}
