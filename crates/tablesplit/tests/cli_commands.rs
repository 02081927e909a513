//! Tests for the tablesplit binary
//!
//! Each test runs the real binary with `TABLESPLIT_HOME` pointed at a temp
//! directory so no user configuration leaks in.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn tablesplit_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tablesplit"))
}

fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(tablesplit_bin())
        .env("TABLESPLIT_HOME", home)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run tablesplit")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout is not JSON ({}): {}",
            err,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

// =============================================================================
// FIXTURES
// =============================================================================

const TASK_DECLARATION: &str = r#"
[[partitions]]
id = "Task"
is_primary = true
identity_fields = ["Id"]

[[partitions.fields]]
name = "Id"
scalar_type = "int32"
generated_on_add = true

[[partitions.fields]]
name = "Name"
max_length = 200

[[partitions.fields]]
name = "Description"
nullable = true

[[partitions.fields]]
name = "StartDate"
scalar_type = "date_time"

[[partitions.capabilities]]
name = "TaskRequiredInfo"
fields = ["Name"]

[[partitions.capabilities]]
name = "TaskGeneralInfo"
fields = ["StartDate", "Description"]

[[partitions.indexes]]
fields = ["Name"]

[[partitions]]
id = "TaskRequired"
identity_navigation = { name = "Task", target = "Task" }

[[partitions.fields]]
name = "Name"

[[partitions.capabilities]]
name = "TaskRequiredInfo"
fields = ["Name"]

[[partitions]]
id = "TaskGeneral"
identity_navigation = { name = "Task", target = "Task" }

[[partitions.fields]]
name = "StartDate"

[[partitions.fields]]
name = "Description"

[[partitions.capabilities]]
name = "TaskGeneralInfo"
fields = ["StartDate", "Description"]
"#;

const UNCOVERED_DECLARATION: &str = r#"
[[partitions]]
id = "Task"
is_primary = true
identity_fields = ["Id"]

[[partitions.fields]]
name = "Id"

[[partitions.fields]]
name = "Name"

[[partitions.capabilities]]
name = "TaskInfo"
fields = ["Name"]

[[partitions]]
id = "TaskGeneral"
identity_navigation = { name = "Task", target = "Task" }

[[partitions.fields]]
name = "Name"

[[partitions.fields]]
name = "Description"

[[partitions.capabilities]]
name = "TaskInfo"
fields = ["Name", "Description"]
"#;

const RECORDS: &str = r#"[
    { "id": 1, "expense_type_id": 1, "company_id": 1, "date": "2021-01-01T00:00:00",
      "costs": [{ "price": "10", "quantity": 1.0 }, { "price": "90", "quantity": 9.0 }] },
    { "id": 2, "expense_type_id": 1, "company_id": 1, "date": "2021-01-01T00:00:00",
      "costs": [{ "price": "20", "quantity": 2.0 }] },
    { "id": 3, "expense_type_id": 2, "company_id": 2, "date": "2022-10-02T00:00:00" }
]"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// COMPOSE / CHECK
// =============================================================================

#[test]
fn test_compose_json_output() {
    let home = TempDir::new().unwrap();
    let file = write(&home, "task.toml", TASK_DECLARATION);

    let output = run(home.path(), &["compose", file.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value = stdout_json(&output);
    assert_eq!(value["fingerprint"].as_str().unwrap().len(), 64);
    assert_eq!(value["schema"]["primary"], "Task");

    let required = &value["schema"]["partitions"]["TaskRequired"];
    assert_eq!(required["identity_links"][0]["principal"], "Task");
    assert_eq!(required["indexes"].as_array().unwrap().len(), 1);
    // Empty structure lists are omitted
    assert!(value["schema"]["partitions"]["TaskGeneral"].get("indexes").is_none());
}

#[test]
fn test_compose_fingerprint_is_stable() {
    let home = TempDir::new().unwrap();
    let file = write(&home, "task.toml", TASK_DECLARATION);

    let first = stdout_json(&run(home.path(), &["compose", file.to_str().unwrap(), "--json"]));
    let second = stdout_json(&run(home.path(), &["compose", file.to_str().unwrap(), "--json"]));
    assert_eq!(first["fingerprint"], second["fingerprint"]);
}

#[test]
fn test_compose_table_output() {
    let home = TempDir::new().unwrap();
    let file = write(&home, "task.toml", TASK_DECLARATION);

    let output = run(home.path(), &["compose", file.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TaskRequired"));
    assert!(stdout.contains("Fingerprint:"));
}

#[test]
fn test_compose_naming_flag_overrides_config() {
    let home = TempDir::new().unwrap();
    write(&home, "tablesplit.toml", "[compose]\nnaming = \"preserve\"\n");
    let file = write(&home, "task.toml", TASK_DECLARATION);

    let output = run(
        home.path(),
        &["compose", file.to_str().unwrap(), "--json", "--naming", "upper_snake"],
    );
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["schema"]["partitions"]["TaskGeneral"]["table"], "TASK_GENERAL");
}

#[test]
fn test_check_reports_coverage_failure() {
    let home = TempDir::new().unwrap();
    let file = write(&home, "uncovered.toml", UNCOVERED_DECLARATION);

    let output = run(home.path(), &["check", file.to_str().unwrap()]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MISSING_CAPABILITY_COVERAGE"), "stderr: {}", stderr);
    assert!(stderr.contains("Description"));
}

#[test]
fn test_check_accepts_valid_declaration() {
    let home = TempDir::new().unwrap();
    let file = write(&home, "task.toml", TASK_DECLARATION);

    let output = run(home.path(), &["check", file.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("OK:"));
}

#[test]
fn test_compose_json_error() {
    let home = TempDir::new().unwrap();
    let file = write(&home, "uncovered.toml", UNCOVERED_DECLARATION);

    let output = run(home.path(), &["compose", file.to_str().unwrap(), "--json"]);
    assert!(!output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["error"]["code"], "MISSING_CAPABILITY_COVERAGE");
}

#[test]
fn test_compose_rejects_misspelled_field_key() {
    let home = TempDir::new().unwrap();
    let source = TASK_DECLARATION.replace("nullable = true", "nulable = true");
    let file = write(&home, "typo.toml", &source);

    let output = run(home.path(), &["compose", file.to_str().unwrap(), "--json"]);
    assert!(!output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["error"]["code"], "INVALID_DECLARATION");
    assert!(value["error"]["message"].as_str().unwrap().contains("nulable"));
}

#[test]
fn test_missing_file() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("nope.toml");

    let output = run(home.path(), &["check", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("File not found"));
}

// =============================================================================
// GROUP / CONFIG
// =============================================================================

#[test]
fn test_group_json_output() {
    let home = TempDir::new().unwrap();
    let file = write(&home, "records.json", RECORDS);

    let output = run(
        home.path(),
        &["group", file.to_str().unwrap(), "--date-scale", "year", "--entity", "company", "--json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value = stdout_json(&output);
    let groups = value.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["expense_ids"], serde_json::json!([1, 2]));
    assert_eq!(groups[0]["total_quantity"], 12.0);
    assert!(groups[1]["total_quantity"].is_null());
}

#[test]
fn test_config_json_reports_defaults() {
    let home = TempDir::new().unwrap();

    let output = run(home.path(), &["config", "--json"]);
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["home"], home.path().to_string_lossy().as_ref());
    assert_eq!(value["config_file"]["exists"], false);
    assert_eq!(value["compose"]["naming"], "preserve");
    assert!(value["logging"]["directory"].is_null());
}

#[test]
fn test_config_file_logging_creates_directory() {
    let home = TempDir::new().unwrap();
    let logs = home.path().join("custom-logs");
    write(
        &home,
        "tablesplit.toml",
        &format!(
            "[logging]\nlog_to_file = true\ndirectory = {:?}\n",
            logs.to_string_lossy()
        ),
    );

    let output = run(home.path(), &["config", "--json"]);
    assert!(output.status.success());
    assert!(logs.is_dir());
    assert_eq!(stdout_json(&output)["config_file"]["exists"], true);
}
