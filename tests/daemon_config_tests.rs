//! Integration tests for wavegend config: file, env overrides, CLI flags, and precedence.
#![cfg(feature = "prometheus")]

use std::process::Command;

/// Run wavegend in a subprocess with the given args and env. Returns (success, stdout, stderr).
fn run_wavegend(args: &[&str], env_extra: &[(&str, &str)]) -> (bool, String, String) {
    let exe = env!("CARGO_BIN_EXE_wavegend");
    let mut cmd = Command::new(exe);
    cmd.args(args);
    for (k, v) in env_extra {
        cmd.env(k, v);
    }
    let out = cmd.output().expect("run wavegend");
    let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
    (out.status.success(), stdout, stderr)
}

fn has_line(stdout: &str, line: &str) -> bool {
    stdout.lines().any(|l| l == line)
}

#[test]
fn validate_config_no_config_uses_defaults() {
    let (ok, stdout, stderr) = run_wavegend(&["--validate-config", "--no-config"], &[]);
    assert!(ok, "stderr: {}", stderr);
    assert!(has_line(&stdout, "num_series=1000"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "num_extra_labels=0"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "churn_period_secs=0"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "interval_ms=10000"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "sink=discard"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "http_bind=127.0.0.1:9090"), "stdout: {}", stdout);
}

#[test]
fn validate_config_cli_flags_override() {
    let (ok, stdout, stderr) = run_wavegend(
        &[
            "--validate-config",
            "--no-config",
            "--num-series",
            "3",
            "--extra-labels",
            "2",
            "--churn-period-secs",
            "60",
            "--label-prefix",
            "__metadata__",
            "--interval-ms",
            "5000",
            "--sink",
            "stdout",
        ],
        &[],
    );
    assert!(ok, "stderr: {}", stderr);
    assert!(has_line(&stdout, "num_series=3"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "num_extra_labels=2"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "churn_period_secs=60"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "label_prefix=__metadata__"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "interval_ms=5000"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "sink=stdout"), "stdout: {}", stdout);
}

#[test]
fn validate_config_env_overrides_defaults() {
    let (ok, stdout, stderr) = run_wavegend(
        &["--validate-config", "--no-config"],
        &[
            ("WAVEGEN_BATCH_SIZE", "250"),
            ("WAVEGEN_GENERATION__NUM_SERIES", "42"),
        ],
    );
    assert!(ok, "stderr: {}", stderr);
    assert!(has_line(&stdout, "batch_size=250"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "num_series=42"), "stdout: {}", stdout);
}

#[test]
fn validate_config_env_overridden_by_cli() {
    let (ok, stdout, _) = run_wavegend(
        &["--validate-config", "--no-config", "--num-series", "7"],
        &[("WAVEGEN_GENERATION__NUM_SERIES", "42")],
    );
    assert!(ok);
    assert!(has_line(&stdout, "num_series=7"), "CLI should win: {}", stdout);
}

#[test]
fn valid_config_file_merges_with_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("wavegend.toml");
    std::fs::write(
        &config_path,
        r#"
interval_ms = 15000
parallelism = 4
sink = "stdout"

[generation]
num_series = 12
churn_period_secs = 120
label_prefix = "__metadata__"
"#,
    )
    .expect("write config");
    let (ok, stdout, stderr) = run_wavegend(
        &["--validate-config", "--config", config_path.to_str().unwrap()],
        &[],
    );
    assert!(ok, "stderr: {}", stderr);
    assert!(has_line(&stdout, "interval_ms=15000"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "parallelism=4"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "sink=stdout"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "num_series=12"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "churn_period_secs=120"), "stdout: {}", stdout);
    assert!(has_line(&stdout, "label_prefix=__metadata__"), "stdout: {}", stdout);
    // Untouched keys keep their defaults.
    assert!(has_line(&stdout, "batch_size=1000"), "stdout: {}", stdout);
}

#[test]
fn env_overrides_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("wavegend.toml");
    std::fs::write(&config_path, "batch_size = 10\n").expect("write config");
    let (ok, stdout, stderr) = run_wavegend(
        &["--validate-config", "--config", config_path.to_str().unwrap()],
        &[("WAVEGEN_BATCH_SIZE", "20")],
    );
    assert!(ok, "stderr: {}", stderr);
    assert!(has_line(&stdout, "batch_size=20"), "stdout: {}", stdout);
}

#[test]
fn explicit_config_missing_file_fails() {
    let (ok, _stdout, stderr) = run_wavegend(
        &["--validate-config", "--config", "/nonexistent/wavegend.toml"],
        &[],
    );
    assert!(!ok, "missing config file with explicit --config should fail");
    assert!(
        stderr.contains("not found") || stderr.contains("config error"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn too_many_extra_labels_is_rejected() {
    let (ok, _stdout, stderr) = run_wavegend(
        &["--validate-config", "--no-config", "--extra-labels", "1000"],
        &[],
    );
    assert!(!ok, "oversized extra labels should fail");
    assert!(
        stderr.contains("config error") && stderr.contains("metadata label pool"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn zero_series_is_rejected() {
    let (ok, _stdout, stderr) =
        run_wavegend(&["--validate-config", "--no-config", "--num-series", "0"], &[]);
    assert!(!ok);
    assert!(stderr.contains("num_series"), "stderr: {}", stderr);
}

#[test]
fn churn_period_too_short_for_series_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("wavegend.toml");
    std::fs::write(
        &config_path,
        "[generation]\nnum_series = 5000\nchurn_period_secs = 1\n",
    )
    .expect("write config");
    let (ok, _stdout, stderr) = run_wavegend(
        &["--validate-config", "--config", config_path.to_str().unwrap()],
        &[],
    );
    assert!(!ok);
    assert!(stderr.contains("churn_period"), "stderr: {}", stderr);
}

#[test]
fn invalid_sink_in_config_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("bad.toml");
    std::fs::write(&config_path, "sink = \"kafka\"\n").expect("write config");
    let (ok, _stdout, stderr) = run_wavegend(
        &["--validate-config", "--config", config_path.to_str().unwrap()],
        &[],
    );
    assert!(!ok, "unknown sink should fail");
    assert!(
        stderr.contains("unknown variant") || stderr.contains("kafka") || stderr.contains("config error"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn invalid_http_bind_fails() {
    let (ok, _stdout, stderr) = run_wavegend(
        &["--validate-config", "--no-config", "--http-bind", "not-a-valid-address"],
        &[],
    );
    assert!(!ok);
    assert!(stderr.contains("invalid http_bind"), "stderr: {}", stderr);
}
