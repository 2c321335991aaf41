use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sigsmooth::kernel::KernelLifecycle;
use sigsmooth::signal::filter::design::{
    butter_sos, ButterConfig, ButterKernel, DigitalFilter, FilterOutputType, Sos,
};
use sigsmooth::signal::filter::{sosfiltfilt_checked_slice, LowPassKernel};
use sigsmooth::signal::outlier::OutlierFilterKernel;
use sigsmooth::signal::smooth::LowessKernel;
use sigsmooth::signal::traits::{Condition1D, IirDesign, LowPass1D, OutlierReject1D, Smooth1D};
use sigsmooth::{
    filter_signal, low_pass_filter, lowess_filter, outlier_filter, LowPassConfig, LowessOptions,
    OutlierConfig, PipelineConfig, SignalPipeline, Smoothing,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const DEFAULT_PYTHON_BIN: &str = "python";

const PY_REFERENCE_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np
import pandas as pd
import scipy
import scipy.signal
import statsmodels
import statsmodels.api as sm

env = json.loads(sys.stdin.read())
op = env["op"]
iters = int(env["iters"])
p = env["payload"]

def _as_array(key):
    return np.asarray([np.nan if v is None else v for v in p[key]], dtype=float)

def _low_pass(x, order, cutoff):
    sos = scipy.signal.butter(order, cutoff, output="sos")
    return scipy.signal.sosfiltfilt(sos, x)

def _outlier(x, q):
    full = pd.Series(x)
    ser = full.dropna()
    jumps = ser.diff().abs()
    ser[jumps >= jumps.quantile(q)] = np.nan
    return ser.reindex(full.index).ffill().to_numpy()

def _lowess(x, frac):
    return sm.nonparametric.lowess(x, np.arange(len(x)), frac=frac)[:, 1]

def _compute():
    if op == "butter_sos":
        return scipy.signal.butter(int(p["order"]), float(p["cutoff"]), output="sos")
    if op == "sosfiltfilt":
        sos = _as_array("sos").reshape((-1, 6))
        return scipy.signal.sosfiltfilt(sos, _as_array("x"))
    if op == "low_pass_filter":
        return _low_pass(_as_array("x"), int(p["order"]), float(p["cutoff"]))
    if op == "outlier_filter":
        return _outlier(_as_array("x"), float(p["quantile"]))
    if op == "lowess_filter":
        return _lowess(_as_array("x"), float(p["frac"]))
    if op == "filter_signal":
        x = _as_array("x")
        if p["outlier"]:
            x = _outlier(x, float(p["quantile"]))
        x = _low_pass(x, int(p["order"]), float(p["cutoff"]))
        if p["lowess"]:
            x = _lowess(x, float(p["frac"]))
        return x
    raise ValueError(f"unsupported op: {op}")

y = np.asarray(_compute(), dtype=float).reshape(-1)

t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "output": y.tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__,
    "scipy_version": scipy.__version__,
    "statsmodels_version": statsmodels.__version__
}))
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    output: Vec<f64>,
    avg_ns: f64,
    python_version: String,
    numpy_version: String,
    scipy_version: Option<String>,
    statsmodels_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContractRow {
    case_id: String,
    mae: f64,
    rmse: f64,
    max_abs: f64,
    rust_candidate_ns: f64,
    rust_baseline_ns: f64,
    python_ns: f64,
    speedup_vs_baseline: f64,
    speedup_vs_python: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    numpy_version: String,
    scipy_version: String,
    statsmodels_version: String,
    rows: Vec<ContractRow>,
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("contracts") => run_contracts(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- contracts");
            Ok(())
        }
    }
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    fs::create_dir_all(&out_dir).context("creating contract output directory")?;

    let python_bin = detect_python_bin();
    let mut rows = Vec::new();

    // Slow tones with deterministic jitter.
    let signal: Vec<f64> = (0..600)
        .map(|i| {
            let t = i as f64 / 40.0;
            let jitter = ((i * 7919) % 101) as f64 / 101.0 - 0.5;
            t.sin() + 0.4 * (0.3 * t).cos() + 0.2 * jitter
        })
        .collect();
    // Two spikes and a five-sample gap.
    let mut corrupted = signal.clone();
    corrupted[150] = 25.0;
    corrupted[400] = -30.0;
    corrupted[250..255].fill(f64::NAN);

    // Butterworth design
    {
        let case_id = "butter_sos_order4_f64";
        let kernel = ButterKernel::try_new(ButterConfig {
            order: 4,
            cutoff: 0.2,
            output: Some(FilterOutputType::Sos),
        })?;
        let candidate = flatten_digital_filter_sos(
            kernel
                .run_alloc()
                .map_err(|e| anyhow!("butter candidate execution failed: {e}"))?,
        )?;
        let baseline = flatten_sos_coeffs(&butter_sos(4, 0.2)?);
        let py = python_eval(
            &python_bin,
            "butter_sos",
            json!({ "order": 4, "cutoff": 0.2 }),
            200,
        )?;
        let candidate_ns = benchmark_avg_ns(200, || {
            kernel
                .run_alloc()
                .map(|_| ())
                .map_err(|e| anyhow!("butter candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(200, || {
            butter_sos::<f64>(4, 0.2)?;
            Ok(())
        })?;
        rows.push(record_case(
            case_id,
            &candidate,
            &baseline,
            &py,
            candidate_ns,
            baseline_ns,
        )?);
    }

    // Zero-phase second-order sections
    {
        let case_id = "sosfiltfilt_order4_f64";
        let sos = butter_sos(4, 0.1)?;
        let candidate = sosfiltfilt_checked_slice(&signal, &sos)?;
        let baseline = low_pass_filter(&signal, 4, 0.1)?;
        let py = python_eval(
            &python_bin,
            "sosfiltfilt",
            json!({ "sos": flatten_sos_coeffs(&sos), "x": signal }),
            100,
        )?;
        let candidate_ns = benchmark_avg_ns(100, || {
            sosfiltfilt_checked_slice(&signal, &sos)?;
            Ok(())
        })?;
        let baseline_ns = benchmark_avg_ns(100, || {
            low_pass_filter(&signal, 4, 0.1)?;
            Ok(())
        })?;
        rows.push(record_case(
            case_id,
            &candidate,
            &baseline,
            &py,
            candidate_ns,
            baseline_ns,
        )?);
    }

    // Default low-pass stage
    {
        let case_id = "low_pass_filter_default_f64";
        let kernel = LowPassKernel::try_new(LowPassConfig::<f64>::default())?;
        let candidate = kernel
            .run_alloc(signal.as_slice())
            .map_err(|e| anyhow!("low-pass candidate execution failed: {e}"))?;
        let baseline = low_pass_filter(&signal, 2, 1.0 / 15.0)?;
        let py = python_eval(
            &python_bin,
            "low_pass_filter",
            json!({ "x": signal, "order": 2, "cutoff": 1.0 / 15.0 }),
            100,
        )?;
        let candidate_ns = benchmark_avg_ns(100, || {
            kernel
                .run_alloc(signal.as_slice())
                .map(|_| ())
                .map_err(|e| anyhow!("low-pass candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(100, || {
            low_pass_filter(&signal, 2, 1.0 / 15.0)?;
            Ok(())
        })?;
        rows.push(record_case(
            case_id,
            &candidate,
            &baseline,
            &py,
            candidate_ns,
            baseline_ns,
        )?);
    }

    // Outlier rejection with gaps
    {
        let case_id = "outlier_filter_q099_f64";
        let kernel = OutlierFilterKernel::try_new(OutlierConfig::<f64>::default())?;
        let candidate = kernel
            .run_alloc(corrupted.as_slice())
            .map_err(|e| anyhow!("outlier candidate execution failed: {e}"))?;
        let baseline = outlier_filter(&corrupted, 0.99)?;
        let py = python_eval(
            &python_bin,
            "outlier_filter",
            json!({ "x": nullable(&corrupted), "quantile": 0.99 }),
            100,
        )?;
        let candidate_ns = benchmark_avg_ns(100, || {
            kernel
                .run_alloc(corrupted.as_slice())
                .map(|_| ())
                .map_err(|e| anyhow!("outlier candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(100, || {
            outlier_filter(&corrupted, 0.99)?;
            Ok(())
        })?;
        rows.push(record_case(
            case_id,
            &candidate,
            &baseline,
            &py,
            candidate_ns,
            baseline_ns,
        )?);
    }

    // LOWESS
    {
        let case_id = "lowess_filter_frac008_f64";
        let kernel = LowessKernel::try_new(LowessOptions::<f64>::default())?;
        let candidate = kernel
            .run_alloc(signal.as_slice())
            .map_err(|e| anyhow!("lowess candidate execution failed: {e}"))?;
        let baseline = lowess_filter(&signal, 0.08)?;
        let py = python_eval(
            &python_bin,
            "lowess_filter",
            json!({ "x": signal, "frac": 0.08 }),
            10,
        )?;
        let candidate_ns = benchmark_avg_ns(20, || {
            kernel
                .run_alloc(signal.as_slice())
                .map(|_| ())
                .map_err(|e| anyhow!("lowess candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(20, || {
            lowess_filter(&signal, 0.08)?;
            Ok(())
        })?;
        rows.push(record_case(
            case_id,
            &candidate,
            &baseline,
            &py,
            candidate_ns,
            baseline_ns,
        )?);
    }

    // Full pipeline
    {
        let case_id = "filter_signal_all_stages_f64";
        let config = PipelineConfig::<f64> {
            enable_outlier_filter: true,
            smoothing: Smoothing::Lowess(LowessOptions::default()),
            ..PipelineConfig::default()
        };
        let pipeline = SignalPipeline::try_new(config)?;
        let candidate = pipeline
            .run_alloc(corrupted.as_slice())
            .map_err(|e| anyhow!("pipeline candidate execution failed: {e}"))?;
        let baseline = filter_signal(&corrupted, &config)?;
        let py = python_eval(
            &python_bin,
            "filter_signal",
            json!({
                "x": nullable(&corrupted),
                "outlier": true,
                "quantile": 0.99,
                "order": 2,
                "cutoff": 1.0 / 15.0,
                "lowess": true,
                "frac": 0.08
            }),
            10,
        )?;
        let candidate_ns = benchmark_avg_ns(20, || {
            pipeline
                .run_alloc(corrupted.as_slice())
                .map(|_| ())
                .map_err(|e| anyhow!("pipeline candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(20, || {
            filter_signal(&corrupted, &config)?;
            Ok(())
        })?;
        rows.push(record_case(
            case_id,
            &candidate,
            &baseline,
            &py,
            candidate_ns,
            baseline_ns,
        )?);
    }

    let versions = python_versions(&python_bin)?;
    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        python_executable: python_bin.to_string_lossy().into_owned(),
        python_version: versions.python_version,
        numpy_version: versions.numpy_version,
        scipy_version: versions.scipy_version.unwrap_or_default(),
        statsmodels_version: versions.statsmodels_version.unwrap_or_default(),
        rows,
    };

    let summary_json = out_dir.join("summary.json");
    fs::write(
        &summary_json,
        serde_json::to_vec_pretty(&bundle).context("serializing contract bundle")?,
    )
    .with_context(|| format!("writing {}", summary_json.display()))?;
    let summary_csv = out_dir.join("summary.csv");
    write_summary_csv(&summary_csv, &bundle.rows)?;

    println!("Contracts complete:");
    println!("  - {}", summary_csv.display());
    println!("  - {}", summary_json.display());
    println!("  - cases: {}", bundle.rows.len());

    Ok(())
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os("SIGSMOOTH_PYTHON")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_versions(python_bin: &Path) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        r#"
import json, sys
import numpy
import scipy
import statsmodels
payload = json.loads(sys.stdin.read())
print(json.dumps({
    "output": [],
    "avg_ns": 0.0,
    "python_version": sys.version.split()[0],
    "numpy_version": numpy.__version__,
    "scipy_version": scipy.__version__,
    "statsmodels_version": statsmodels.__version__
}))
"#,
        json!({}),
    )
}

fn python_eval(
    python_bin: &Path,
    op: &str,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        PY_REFERENCE_SCRIPT,
        json!({
            "op": op,
            "iters": iters,
            "payload": payload
        }),
    )
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let payload_bytes = serde_json::to_vec(&payload).context("serializing python payload")?;
        stdin
            .write_all(&payload_bytes)
            .context("writing payload to python stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("waiting for python process")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python execution failed: {stderr}");
    }
    let stdout = String::from_utf8(output.stdout).context("parsing python stdout utf8")?;
    let parsed: PythonEval = serde_json::from_str(stdout.trim()).context("parsing python json")?;
    Ok(parsed)
}

fn record_case(
    case_id: &str,
    candidate: &[f64],
    baseline: &[f64],
    py: &PythonEval,
    candidate_ns: f64,
    baseline_ns: f64,
) -> Result<ContractRow> {
    ensure_same_length(case_id, candidate, baseline)?;
    ensure_same_length(case_id, candidate, &py.output)?;
    Ok(ContractRow {
        case_id: case_id.to_string(),
        mae: mean_abs_error(candidate, &py.output),
        rmse: root_mean_squared_error(candidate, &py.output),
        max_abs: max_abs_error(candidate, &py.output),
        rust_candidate_ns: candidate_ns,
        rust_baseline_ns: baseline_ns,
        python_ns: py.avg_ns,
        speedup_vs_baseline: baseline_ns / candidate_ns,
        speedup_vs_python: py.avg_ns / candidate_ns,
    })
}

/// JSON has no NaN, so missing samples travel as `null`.
fn nullable(x: &[f64]) -> Vec<Option<f64>> {
    x.iter().map(|v| (!v.is_nan()).then_some(*v)).collect()
}

fn flatten_sos_coeffs(sos: &[Sos<f64>]) -> Vec<f64> {
    let mut out = Vec::with_capacity(sos.len() * 6);
    for section in sos {
        out.extend_from_slice(&section.b);
        out.extend_from_slice(&section.a);
    }
    out
}

fn flatten_digital_filter_sos(filter: DigitalFilter<f64>) -> Result<Vec<f64>> {
    match filter {
        DigitalFilter::Sos(sos) => Ok(flatten_sos_coeffs(&sos.sos)),
        _ => bail!("expected SOS filter output"),
    }
}

fn ensure_same_length(case_id: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id} has mismatched output lengths: left={}, right={}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}

fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / a.len() as f64
}

fn root_mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    (a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        / a.len() as f64)
        .sqrt()
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn write_summary_csv(path: &Path, rows: &[ContractRow]) -> Result<()> {
    let mut out = String::new();
    out.push_str("case_id,mae,rmse,max_abs,rust_candidate_ns,rust_baseline_ns,python_ns,speedup_vs_baseline,speedup_vs_python\n");
    for row in rows {
        out.push_str(&format!(
            "{},{:.12},{:.12},{:.12},{:.3},{:.3},{:.3},{:.6},{:.6}\n",
            row.case_id,
            row.mae,
            row.rmse,
            row.max_abs,
            row.rust_candidate_ns,
            row.rust_baseline_ns,
            row.python_ns,
            row.speedup_vs_baseline,
            row.speedup_vs_python,
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}
