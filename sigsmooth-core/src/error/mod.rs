use alloc::string::String;
use core::{error, fmt};

/// Errors raised whilst conditioning a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Argument passed into a function was invalid.
    InvalidArg {
        /// The invalid arg
        arg: String,
        /// Explaining why arg is invalid.
        reason: String,
    },
    /// The input is too short for the requested filter configuration.
    InsufficientData {
        /// The argument whose length or configuration is insufficient.
        arg: String,
        /// Minimum number of samples the configuration needs.
        required: usize,
        /// Number of samples received.
        got: usize,
    },
    /// Leading samples were missing and forward fill had nothing to fill them from.
    UnresolvedMissing {
        /// Count of leading missing samples.
        leading: usize,
    },
    /// Execution produced a state that violates a numeric invariant.
    ExecInvariantViolation {
        /// Why execution could not proceed.
        reason: String,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidArg`].
    pub fn invalid_arg(arg: &str, reason: &str) -> Self {
        Error::InvalidArg {
            arg: arg.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::InsufficientData`].
    pub fn insufficient_data(arg: &str, required: usize, got: usize) -> Self {
        Error::InsufficientData {
            arg: arg.into(),
            required,
            got,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArg { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            Error::InsufficientData { arg, required, got } => write!(
                f,
                "Insufficient data in `{arg}`: at least {required} samples required, got {got}."
            ),
            Error::UnresolvedMissing { leading } => write!(
                f,
                "{leading} leading missing sample(s) cannot be forward filled."
            ),
            Error::ExecInvariantViolation { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
        }
    }
}

impl error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::Error;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_argument() {
        let err = Error::invalid_arg("cutoff", "must satisfy 0 < cutoff < 1");
        assert_eq!(
            err.to_string(),
            "Invalid argument `cutoff`: must satisfy 0 < cutoff < 1"
        );

        let err = Error::insufficient_data("x", 10, 4);
        assert_eq!(
            err.to_string(),
            "Insufficient data in `x`: at least 10 samples required, got 4."
        );
    }
}
