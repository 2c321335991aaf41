use alloc::string::ToString;
use core::fmt;
use sigsmooth_core::Error;

/// Validation errors raised at kernel construction or adapter binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input or configuration field is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::EmptyInput { arg } => Error::invalid_arg(arg, "input was empty."),
            ConfigError::InvalidArgument { arg, reason } => Error::invalid_arg(arg, reason),
            ConfigError::NonContiguous { arg } => {
                Error::invalid_arg(arg, "input is not contiguous in memory.")
            }
        }
    }
}

/// Runtime execution failures for checked kernel entrypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// An execution precondition was violated.
    InvalidState {
        /// Human readable reason.
        reason: &'static str,
    },
    /// Output length mismatched the expected runtime shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
    /// The stage computation itself failed.
    Compute(Error),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<Error> for ExecInvariantViolation {
    fn from(value: Error) -> Self {
        Self::Compute(value)
    }
}

impl From<ExecInvariantViolation> for Error {
    fn from(value: ExecInvariantViolation) -> Self {
        match value {
            ExecInvariantViolation::Compute(err) => err,
            ExecInvariantViolation::Config(err) => err.into(),
            ExecInvariantViolation::InvalidState { reason } => Error::ExecInvariantViolation {
                reason: reason.to_string(),
            },
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => Error::InvalidArg {
                arg: arg.to_string(),
                reason: alloc::format!("expected length {expected}, got {got}."),
            },
        }
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::InvalidState { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
            ExecInvariantViolation::Compute(err) => write!(f, "{err}"),
        }
    }
}

impl core::error::Error for ExecInvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_errors_survive_the_round_trip() {
        let original = Error::UnresolvedMissing { leading: 2 };
        let exec: ExecInvariantViolation = original.clone().into();
        assert_eq!(exec, ExecInvariantViolation::Compute(original.clone()));
        assert_eq!(Error::from(exec), original);
    }

    #[test]
    fn config_errors_become_invalid_args() {
        let err: Error = ConfigError::InvalidArgument {
            arg: "order",
            reason: "order must be greater than zero",
        }
        .into();
        assert_eq!(
            err,
            Error::invalid_arg("order", "order must be greater than zero")
        );
    }
}
