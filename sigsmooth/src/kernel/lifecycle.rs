use super::ConfigError;
use num_traits::Float;

/// Constructor validation lifecycle shared by stage kernels.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

/// Reject `value` unless `0 < value < 1`. NaN is rejected.
pub(crate) fn check_open_unit<F: Float>(
    arg: &'static str,
    value: F,
    reason: &'static str,
) -> Result<(), ConfigError> {
    if value > F::zero() && value < F::one() {
        Ok(())
    } else {
        Err(ConfigError::InvalidArgument { arg, reason })
    }
}

/// Reject `value` unless `0 <= value <= 1`. NaN is rejected.
pub(crate) fn check_closed_unit<F: Float>(
    arg: &'static str,
    value: F,
    reason: &'static str,
) -> Result<(), ConfigError> {
    if value >= F::zero() && value <= F::one() {
        Ok(())
    } else {
        Err(ConfigError::InvalidArgument { arg, reason })
    }
}

/// Reject `value` unless `0 < value <= 1`. NaN is rejected.
pub(crate) fn check_half_open_unit<F: Float>(
    arg: &'static str,
    value: F,
    reason: &'static str,
) -> Result<(), ConfigError> {
    if value > F::zero() && value <= F::one() {
        Ok(())
    } else {
        Err(ConfigError::InvalidArgument { arg, reason })
    }
}
