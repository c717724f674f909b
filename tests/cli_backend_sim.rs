use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "backend-sim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn done_line(stdout: &str) -> String {
    stdout
        .lines()
        .find(|line| line.starts_with("done @ "))
        .unwrap_or_else(|| panic!("missing done line in stdout: {stdout}"))
        .to_string()
}

#[test]
fn backend_sim_runs_uniform_trials_to_completion() {
    let output = Command::new(env!("CARGO_BIN_EXE_backend_sim"))
        .args([
            "--max-concurrency",
            "2",
            "--trials",
            "5",
            "--runtime",
            "1.5",
            "--quiet",
        ])
        .output()
        .expect("run backend_sim");
    assert!(
        output.status.success(),
        "backend_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = done_line(&stdout);
    assert!(line.contains("queued=0"), "{line}");
    assert!(line.contains("running=0"), "{line}");
    assert!(line.contains("failed=0"), "{line}");
    assert!(line.contains("completed=5"), "{line}");
}

#[test]
fn backend_sim_writes_state_and_trace_json() {
    let dir = unique_temp_dir("state-trace");
    let plan = write_file(
        &dir,
        "plan.json",
        r#"
{
    "trials": [
        { "trial_index": 0, "runtime": 0.5 },
        { "trial_index": 1, "runtime": 0.5 },
        { "trial_index": 2, "runtime": 3.0, "submit_at_update": 2 }
    ]
}
        "#,
    );
    let state_json = dir.join("state.json");
    let trace_json = dir.join("trace.json");

    let output = Command::new(env!("CARGO_BIN_EXE_backend_sim"))
        .args([
            "--plan",
            plan.to_str().unwrap(),
            "--state-json",
            state_json.to_str().unwrap(),
            "--trace-json",
            trace_json.to_str().unwrap(),
            "--quiet",
        ])
        .output()
        .expect("run backend_sim");
    assert!(
        output.status.success(),
        "backend_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(done_line(&String::from_utf8_lossy(&output.stdout)).contains("completed=3"));

    let raw = fs::read_to_string(&state_json).expect("read state.json");
    let state: Value = serde_json::from_str(&raw).expect("parse state.json");
    assert_eq!(
        state.get("completed").and_then(|c| c.as_array()).map(|c| c.len()),
        Some(3)
    );
    assert_eq!(
        state
            .get("options")
            .and_then(|o| o.get("max_concurrency"))
            .and_then(|m| m.as_u64()),
        Some(1)
    );

    let raw = fs::read_to_string(&trace_json).expect("read trace.json");
    let trace: Value = serde_json::from_str(&raw).expect("parse trace.json");
    let events = trace.as_array().expect("trace.json must be a JSON array");
    assert!(
        events
            .iter()
            .any(|e| e.get("kind").and_then(|k| k.as_str()) == Some("promoted")),
        "expected a promoted event"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn backend_sim_resumes_from_state_json() {
    let dir = unique_temp_dir("resume");
    let state_json = dir.join("state.json");

    let first = Command::new(env!("CARGO_BIN_EXE_backend_sim"))
        .args([
            "--trials",
            "3",
            "--runtime",
            "4",
            "--max-updates",
            "2",
            "--state-json",
            state_json.to_str().unwrap(),
            "--quiet",
        ])
        .output()
        .expect("run backend_sim");
    assert!(first.status.success());
    let line = done_line(&String::from_utf8_lossy(&first.stdout));
    assert!(line.contains("queued=2") && line.contains("running=1"), "{line}");

    let second = Command::new(env!("CARGO_BIN_EXE_backend_sim"))
        .args(["--resume", state_json.to_str().unwrap(), "--quiet"])
        .output()
        .expect("run backend_sim");
    assert!(
        second.status.success(),
        "resume failed: stderr={}",
        String::from_utf8_lossy(&second.stderr)
    );
    let line = done_line(&String::from_utf8_lossy(&second.stdout));
    assert!(line.contains("completed=3"), "{line}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn backend_sim_exits_nonzero_on_invalid_concurrency() {
    let output = Command::new(env!("CARGO_BIN_EXE_backend_sim"))
        .args(["--max-concurrency", "0", "--trials", "1"])
        .output()
        .expect("run backend_sim");
    assert!(!output.status.success(), "expected non-zero exit");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("max_concurrency must be >= 1"),
        "stderr did not contain expected message: {stderr}"
    );
}
