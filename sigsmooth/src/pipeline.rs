//! Stage orchestration.
//!
//! `input -> [outlier rejection] -> low-pass -> [LOWESS] -> output`
//!
//! The low-pass stage always runs. Outlier rejection and smoothing are opt-in
//! through [PipelineConfig]; the order of the stages is fixed.

use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use num_traits::Float;
use sigsmooth_core::{Error, Result};
use tracing::{debug, instrument};

use crate::kernel::{
    copy_into, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D,
};
use crate::signal::filter::{LowPassConfig, LowPassKernel};
use crate::signal::outlier::{OutlierConfig, OutlierFilterKernel};
use crate::signal::smooth::{LowessKernel, LowessOptions};
use crate::signal::traits::Condition1D;

/// Smoothing applied after the low-pass stage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Smoothing<F> {
    /// No smoothing.
    #[default]
    None,
    /// LOWESS over the sample positions.
    Lowess(LowessOptions<F>),
}

impl<F: Float> FromStr for Smoothing<F> {
    type Err = Error;

    /// Parse `"none"` or `"lowess"`, ignoring case. LOWESS gets its default options.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") {
            Ok(Smoothing::None)
        } else if s.eq_ignore_ascii_case("lowess") {
            Ok(Smoothing::Lowess(LowessOptions::default()))
        } else {
            Err(Error::invalid_arg(
                "smoothing",
                "expected `none` or `lowess`.",
            ))
        }
    }
}

impl<F> fmt::Display for Smoothing<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Smoothing::None => write!(f, "none"),
            Smoothing::Lowess(_) => write!(f, "lowess"),
        }
    }
}

/// Configuration of [filter_signal].
///
/// The default runs the low-pass stage alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig<F> {
    /// Run outlier rejection before the low-pass stage.
    pub enable_outlier_filter: bool,
    /// Outlier rejection parameters, validated even when the stage is disabled.
    pub outlier: OutlierConfig<F>,
    /// Low-pass parameters.
    pub low_pass: LowPassConfig<F>,
    /// Smoothing after the low-pass stage.
    pub smoothing: Smoothing<F>,
}

impl<F: Float> Default for PipelineConfig<F> {
    fn default() -> Self {
        Self {
            enable_outlier_filter: false,
            outlier: OutlierConfig::default(),
            low_pass: LowPassConfig::default(),
            smoothing: Smoothing::None,
        }
    }
}

/// A stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Quantile jump rejection with forward fill.
    OutlierFilter,
    /// Zero-phase Butterworth low-pass.
    LowPass,
    /// LOWESS smoothing.
    Lowess,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::OutlierFilter => "outlier_filter",
            Stage::LowPass => "low_pass_filter",
            Stage::Lowess => "lowess_filter",
        };
        f.write_str(name)
    }
}

/// A validated chain of stage kernels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPipeline<F> {
    outlier: Option<OutlierFilterKernel<F>>,
    low_pass: LowPassKernel<F>,
    lowess: Option<LowessKernel<F>>,
}

impl<F> KernelLifecycle for SignalPipeline<F>
where
    F: Float,
{
    type Config = PipelineConfig<F>;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        let outlier = OutlierFilterKernel::try_new(config.outlier)?;
        let low_pass = LowPassKernel::try_new(config.low_pass)?;
        let lowess = match config.smoothing {
            Smoothing::None => None,
            Smoothing::Lowess(options) => Some(LowessKernel::try_new(options)?),
        };
        Ok(Self {
            outlier: config.enable_outlier_filter.then_some(outlier),
            low_pass,
            lowess,
        })
    }
}

impl<F> SignalPipeline<F>
where
    F: Float,
{
    /// The stages that run, in order.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(3);
        if self.outlier.is_some() {
            stages.push(Stage::OutlierFilter);
        }
        stages.push(Stage::LowPass);
        if self.lowess.is_some() {
            stages.push(Stage::Lowess);
        }
        stages
    }

    /// Run every active stage on `x`, stopping at the first failure.
    pub fn run(&self, x: &[F]) -> Result<Vec<F>> {
        let mut y = match &self.outlier {
            Some(kernel) => {
                debug!(stage = %Stage::OutlierFilter, len = x.len(), "running stage");
                kernel.config().apply(x)?
            }
            None => x.to_vec(),
        };

        debug!(stage = %Stage::LowPass, len = y.len(), "running stage");
        y = self.low_pass.config().apply(&y)?;

        if let Some(kernel) = &self.lowess {
            debug!(stage = %Stage::Lowess, len = y.len(), "running stage");
            y = kernel.options().apply(&y)?;
        }
        Ok(y)
    }
}

impl<F> Condition1D<F> for SignalPipeline<F>
where
    F: Float,
{
    fn run_into<I, O>(
        &self,
        input: &I,
        out: &mut O,
    ) -> core::result::Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let y = self.run_alloc(input)?;
        copy_into(&y, out)
    }

    fn run_alloc<I>(&self, input: &I) -> core::result::Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(self.run(input)?)
    }
}

///
/// Condition a signal: optional outlier rejection, zero-phase low-pass, optional smoothing.
///
/// Every parameter in `config` is validated before any stage runs. With the default
/// configuration the result equals [crate::low_pass_filter] with its default parameters.
///
/// # Errors
/// The first error of any stage, see [crate::outlier_filter], [crate::low_pass_filter] and
/// [crate::lowess_filter].
///
/// # Examples
/// ```
/// use sigsmooth::{filter_signal, PipelineConfig, Smoothing};
///
/// let mut x: Vec<f64> = (0..200).map(|i| (i as f64 / 20.0).sin()).collect();
/// x[90] = 40.0;
///
/// let config = PipelineConfig {
///     enable_outlier_filter: true,
///     smoothing: "lowess".parse().unwrap(),
///     ..PipelineConfig::default()
/// };
/// let y = filter_signal(&x, &config).unwrap();
/// assert_eq!(y.len(), 200);
/// assert!(y.iter().all(|v| v.abs() < 1.5));
/// ```
///
#[instrument(level = "debug", skip_all, fields(len = x.len()))]
pub fn filter_signal<F: Float>(x: &[F], config: &PipelineConfig<F>) -> Result<Vec<F>> {
    let pipeline = SignalPipeline::try_new(*config)?;
    pipeline.run(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{low_pass_filter, lowess_filter, outlier_filter};
    use alloc::vec;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn signal(n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(42);
        (0..n)
            .map(|i| (i as f64 / 15.0).sin() + rng.gen_range(-0.2..0.2))
            .collect()
    }

    #[test]
    fn default_is_low_pass_only() {
        let x = signal(120);
        let config = PipelineConfig::<f64>::default();
        assert_eq!(
            SignalPipeline::try_new(config).unwrap().stages(),
            vec![Stage::LowPass]
        );
        assert_eq!(
            filter_signal(&x, &config).unwrap(),
            low_pass_filter(&x, 2, config.low_pass.cutoff).unwrap()
        );
    }

    #[test]
    fn stages_run_in_fixed_order() {
        let mut x = signal(150);
        x[70] = 25.0;
        let config = PipelineConfig {
            enable_outlier_filter: true,
            smoothing: Smoothing::Lowess(LowessOptions {
                frac: 0.1,
                iterations: 3,
            }),
            ..PipelineConfig::default()
        };
        assert_eq!(
            SignalPipeline::try_new(config).unwrap().stages(),
            vec![Stage::OutlierFilter, Stage::LowPass, Stage::Lowess]
        );

        let by_hand = outlier_filter(&x, 0.99).unwrap();
        let by_hand = low_pass_filter(&by_hand, 2, config.low_pass.cutoff).unwrap();
        let by_hand = lowess_filter(&by_hand, 0.1).unwrap();
        assert_eq!(filter_signal(&x, &config).unwrap(), by_hand);
    }

    #[test]
    fn missing_samples_need_the_outlier_stage() {
        let mut x = signal(60);
        x[10] = f64::NAN;

        let err = filter_signal(&x, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArg { ref arg, .. } if arg == "x"));

        let config = PipelineConfig {
            enable_outlier_filter: true,
            ..PipelineConfig::default()
        };
        let y = filter_signal(&x, &config).unwrap();
        assert_eq!(y.len(), 60);
        assert!(y.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn first_failure_is_propagated() {
        let config = PipelineConfig {
            enable_outlier_filter: true,
            ..PipelineConfig::default()
        };
        let mut x = signal(30);
        x[0] = f64::NAN;
        assert_eq!(
            filter_signal(&x, &config),
            Err(Error::UnresolvedMissing { leading: 1 })
        );

        // all-missing input empties the series, which the low-pass stage cannot filter
        assert_eq!(
            filter_signal(&[f64::NAN; 30], &config),
            Err(Error::insufficient_data("x", 10, 0))
        );

        // low-pass output too short for the requested LOWESS bandwidth
        let config = PipelineConfig {
            smoothing: Smoothing::Lowess(LowessOptions::default()),
            ..PipelineConfig::default()
        };
        assert_eq!(
            filter_signal(&signal(20), &config),
            Err(Error::insufficient_data("y", 25, 20))
        );
    }

    #[test]
    fn parameters_are_validated_up_front() {
        let x = signal(100);
        let cases = [
            PipelineConfig {
                low_pass: LowPassConfig {
                    order: 2,
                    cutoff: 1.5,
                },
                ..PipelineConfig::default()
            },
            PipelineConfig {
                low_pass: LowPassConfig {
                    order: 0,
                    cutoff: 0.1,
                },
                ..PipelineConfig::default()
            },
            PipelineConfig {
                outlier: OutlierConfig { quantile: -0.1 },
                ..PipelineConfig::default()
            },
            PipelineConfig {
                smoothing: Smoothing::Lowess(LowessOptions {
                    frac: 0.0,
                    iterations: 3,
                }),
                ..PipelineConfig::default()
            },
        ];
        for config in cases {
            assert!(matches!(
                filter_signal(&x, &config),
                Err(Error::InvalidArg { .. })
            ));
        }
    }

    #[test]
    fn smoothing_parses_from_str() {
        assert_eq!("none".parse::<Smoothing<f64>>().unwrap(), Smoothing::None);
        assert_eq!(
            " LOWESS ".parse::<Smoothing<f32>>().unwrap(),
            Smoothing::Lowess(LowessOptions::default())
        );
        assert!("savgol".parse::<Smoothing<f64>>().is_err());
        assert_eq!(Smoothing::<f64>::None.to_string(), "none");
        assert_eq!(Stage::LowPass.to_string(), "low_pass_filter");
    }

    #[test]
    fn condition_kernel_writes_into_buffers() {
        let x = signal(64);
        let pipeline = SignalPipeline::try_new(PipelineConfig::<f64>::default()).unwrap();
        let mut out = vec![0.0; 64];
        pipeline.run_into(&x, &mut out).unwrap();
        assert_eq!(out, pipeline.run(&x).unwrap());
    }
}
