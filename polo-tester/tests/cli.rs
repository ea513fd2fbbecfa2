use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "polo-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_polo-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("location-race"));
}

#[test]
fn cli_runs_every_scenario_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_polo-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args(["--report", "json", "--iterations", "2", "--seeds", "1,2", "--output"])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Polo Finder QA Tester"));
    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let runs = value.as_array().expect("array");
    assert!(!runs.is_empty());
    assert!(runs.iter().all(|run| run["passed"] == true));
}

#[test]
fn cli_rejects_bad_seeds() {
    let exe = env!("CARGO_BIN_EXE_polo-tester");
    let output = Command::new(exe)
        .args(["--scenarios", "cep-mask", "--seeds", "banana"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}

#[test]
fn cli_unknown_scenario_is_skipped() {
    let exe = env!("CARGO_BIN_EXE_polo-tester");
    let output = Command::new(exe)
        .args(["--scenarios", "does-not-exist", "--report", "markdown"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown scenario"));
}
