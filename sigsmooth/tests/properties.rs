use approx::assert_abs_diff_eq;
use dasp_signal::{rate, Signal};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sigsmooth::{
    detect_outliers, filter_signal, low_pass_filter, lowess_filter, outlier_filter, Error,
    LowPassConfig, LowessOptions, OutlierConfig, PipelineConfig, Smoothing,
};

fn noisy_tone(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tone = rate(100.0).const_hz(1.5).sine();
    (0..n)
        .map(|_| tone.next() + rng.gen_range(-0.25..0.25))
        .collect()
}

#[test]
fn low_pass_keeps_length() {
    for n in [10, 11, 37, 256, 1001] {
        let x = noisy_tone(n, n as u64);
        assert_eq!(low_pass_filter(&x, 2, 1.0 / 15.0).unwrap().len(), n);
    }
    for order in 1..=6 {
        let x = noisy_tone(200, 1);
        assert_eq!(low_pass_filter(&x, order, 0.3).unwrap().len(), 200);
    }
}

#[test]
fn low_pass_passes_constants() {
    for order in 1..=5 {
        let y = low_pass_filter(&[-12.5f64; 64], order, 1.0 / 15.0).unwrap();
        y.iter()
            .for_each(|v| assert_abs_diff_eq!(*v, -12.5, epsilon = 1e-8));
    }
}

#[test]
fn outlier_output_has_no_missing_values() {
    let mut x = noisy_tone(300, 2);
    for i in [5, 6, 7, 120, 299] {
        x[i] = f64::NAN;
    }
    let y = outlier_filter(&x, 0.99).unwrap();
    assert_eq!(y.len(), x.len());
    assert!(y.iter().all(|v| v.is_finite()));
}

#[test]
fn single_spike_is_replaced_by_preceding_value() {
    let mut x = vec![10.0f64; 50];
    x[17] = 10_000.0;
    let y = outlier_filter(&x, 0.99).unwrap();
    assert_eq!(y[17], 10.0);
    x.iter()
        .zip(y.iter())
        .enumerate()
        .filter(|(i, _)| *i != 17)
        .for_each(|(_, (a, b))| assert_eq!(a, b));
}

#[test]
fn jump_at_threshold_is_an_outlier() {
    let x = [1.0f64, 2.0, 3.0, 4.0, 6.0, 7.0];
    // jumps 1, 1, 1, 2, 1: the maximum is exactly 2
    let mask = detect_outliers(&x, 1.0).unwrap();
    assert_eq!(mask.threshold, Some(2.0));
    assert_eq!(mask.rejected, vec![4]);
    assert_eq!(
        outlier_filter(&x, 1.0).unwrap(),
        vec![1.0, 2.0, 3.0, 4.0, 4.0, 7.0]
    );
}

#[test]
fn lowess_keeps_ramps_ordered() {
    let mut rng = StdRng::seed_from_u64(8);
    let ramp = (0..200)
        .map(|i| i as f64 + rng.gen_range(0.0..0.01))
        .collect::<Vec<_>>();
    let y = lowess_filter(&ramp, 0.08).unwrap();
    assert_eq!(y.len(), ramp.len());
    assert!(y.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn default_pipeline_is_the_low_pass_filter() {
    let x = noisy_tone(500, 3);
    assert_eq!(
        filter_signal(&x, &PipelineConfig::default()).unwrap(),
        low_pass_filter(&x, 2, 1.0 / 15.0).unwrap()
    );
}

#[test]
fn lowess_is_opt_in() {
    let x = noisy_tone(200, 4);
    let config = PipelineConfig {
        smoothing: "lowess".parse().unwrap(),
        ..PipelineConfig::default()
    };
    let expected = lowess_filter(&low_pass_filter(&x, 2, 1.0 / 15.0).unwrap(), 0.08).unwrap();
    assert_eq!(filter_signal(&x, &config).unwrap(), expected);
    assert_eq!(
        config.smoothing,
        Smoothing::Lowess(LowessOptions::default())
    );
}

#[test]
fn invalid_parameters_are_reported() {
    let x = noisy_tone(100, 5);
    assert!(matches!(
        low_pass_filter(&x, 2, 1.5),
        Err(Error::InvalidArg { .. })
    ));
    assert!(matches!(
        low_pass_filter(&x, 0, 1.0 / 15.0),
        Err(Error::InvalidArg { .. })
    ));
    assert!(matches!(
        outlier_filter(&x, -0.1),
        Err(Error::InvalidArg { .. })
    ));
    assert!(matches!(
        lowess_filter(&x, 1.2),
        Err(Error::InvalidArg { .. })
    ));

    let config = PipelineConfig {
        enable_outlier_filter: true,
        outlier: OutlierConfig { quantile: -0.1 },
        low_pass: LowPassConfig::default(),
        smoothing: Smoothing::None,
    };
    assert!(matches!(
        filter_signal(&x, &config),
        Err(Error::InvalidArg { .. })
    ));
}

#[test]
fn short_sequences_are_reported() {
    assert!(matches!(
        low_pass_filter(&[1.0f64; 4], 2, 1.0 / 15.0),
        Err(Error::InsufficientData { required: 10, got: 4, .. })
    ));
    assert!(matches!(
        lowess_filter(&[1.0f64; 10], 0.08),
        Err(Error::InsufficientData { got: 10, .. })
    ));
}

#[test]
fn leading_gap_is_surfaced() {
    let x = [f64::NAN, f64::NAN, 1.0, 2.0];
    assert_eq!(
        outlier_filter(&x, 0.99),
        Err(Error::UnresolvedMissing { leading: 2 })
    );
    assert_eq!(outlier_filter(&[f64::NAN; 4], 0.99).unwrap(), Vec::<f64>::new());
}

#[test]
fn inputs_are_not_modified() {
    let x = {
        let mut x = noisy_tone(120, 6);
        x[40] = 50.0;
        x[41] = f64::NAN;
        x
    };
    let before = x.clone();
    let config = PipelineConfig {
        enable_outlier_filter: true,
        smoothing: Smoothing::Lowess(LowessOptions::default()),
        ..PipelineConfig::default()
    };
    filter_signal(&x, &config).unwrap();
    x.iter()
        .zip(before.iter())
        .for_each(|(a, b)| assert!(a == b || (a.is_nan() && b.is_nan())));
}

#[test]
fn f32_pipeline() {
    let x = noisy_tone(150, 7)
        .into_iter()
        .map(|v| v as f32)
        .collect::<Vec<_>>();
    let config = PipelineConfig::<f32> {
        enable_outlier_filter: true,
        smoothing: Smoothing::Lowess(LowessOptions::default()),
        ..PipelineConfig::default()
    };
    let y = filter_signal(&x, &config).unwrap();
    assert_eq!(y.len(), 150);
    assert!(y.iter().all(|v| v.is_finite()));
}
