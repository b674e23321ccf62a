// ABOUTME: Integration tests for the conveyor CLI commands.
// ABOUTME: Runs init, deploy-stack, upload, and delete-stack against local providers.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn conveyor_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("conveyor"));
    cmd.env_remove("RUST_LOG");
    cmd
}

const TEMPLATE: &str = r#"
Parameters:
  Environment:
    Type: String
Outputs:
  Endpoint:
    Value: https://web.example.com
  DeployedEnvironment:
    Value:
      Ref: Environment
"#;

const CONFIG: &str = r##"
variables:
  Environment: test

polling:
  interval: 10ms
  timeout: 30s

substitute:
  - "*.config"

stack:
  name: web-#{Environment}
  template: template.yml
  parameters:
    Environment: "#{Environment}"

upload:
  bucket: assets
  targets:
    - kind: file-set
      pattern: "public/*.html"
      key_prefix: "#{Environment}/"
      substitution_patterns: "public/index.html"
"##;

/// Write a project with a stack template, staged files, and an existing bucket.
fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("conveyor.yml"), CONFIG).unwrap();
    fs::write(root.join("template.yml"), TEMPLATE).unwrap();
    fs::write(root.join("app.config"), "env=#{Environment}").unwrap();
    fs::create_dir_all(root.join("public")).unwrap();
    fs::write(root.join("public/index.html"), "<h1>#{Environment}</h1>").unwrap();
    fs::write(root.join("public/about.html"), "<h1>#{Environment}</h1>").unwrap();
    fs::create_dir_all(root.join(".conveyor/state/buckets/assets")).unwrap();
    dir
}

fn stack_file(root: &Path, name: &str) -> std::path::PathBuf {
    root.join(".conveyor/state/stacks").join(format!("{name}.json"))
}

#[test]
fn help_shows_commands() {
    conveyor_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("deploy-stack"))
        .stdout(predicate::str::contains("delete-stack"))
        .stdout(predicate::str::contains("upload"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("conveyor.yml");

    conveyor_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--stack", "orders-api"])
        .assert()
        .success();

    assert!(config_path.exists(), "conveyor.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("name: \"orders-api\""));
    assert!(content.contains("targets:"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("conveyor.yml");

    fs::write(&config_path, "existing: config").unwrap();

    conveyor_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "existing: config");
}

#[test]
fn missing_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    conveyor_cmd()
        .current_dir(temp_dir.path())
        .arg("deploy-stack")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn deploy_stack_creates_stack_and_prints_outputs() {
    let dir = project();

    conveyor_cmd()
        .current_dir(dir.path())
        .args(["--output", "quiet", "deploy-stack"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output.AwsOutputs[StackId]="))
        .stdout(predicate::str::contains(
            "Output.AwsOutputs[Endpoint]=https://web.example.com",
        ))
        .stdout(predicate::str::contains(
            "Output.AwsOutputs[DeployedEnvironment]=test",
        ));

    assert!(stack_file(dir.path(), "web-test").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("app.config")).unwrap(),
        "env=test"
    );
}

#[test]
fn deploy_stack_twice_is_unchanged() {
    let dir = project();

    for _ in 0..2 {
        conveyor_cmd()
            .current_dir(dir.path())
            .args(["--output", "quiet", "deploy-stack"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Output.AwsOutputs[StackId]="));
    }
}

#[test]
fn variable_override_changes_stack_name() {
    let dir = project();

    conveyor_cmd()
        .current_dir(dir.path())
        .args(["--var", "Environment=staging", "deploy-stack"])
        .assert()
        .success();

    assert!(stack_file(dir.path(), "web-staging").exists());
    assert!(!stack_file(dir.path(), "web-test").exists());
}

#[test]
fn json_output_emits_output_events() {
    let dir = project();

    let assert = conveyor_cmd()
        .current_dir(dir.path())
        .args(["--output", "json", "deploy-stack"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(events.iter().any(|e| e["event"] == "output"
        && e["name"] == "Output.AwsOutputs[Endpoint]"
        && e["value"] == "https://web.example.com"));
}

#[test]
fn upload_stores_objects_in_local_bucket() {
    let dir = project();

    conveyor_cmd()
        .current_dir(dir.path())
        .args(["--output", "quiet", "upload"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output.Files[test/public/index.html]=v1"))
        .stdout(predicate::str::contains("Output.Files[test/public/about.html]=v1"));

    let bucket = dir.path().join(".conveyor/state/buckets/assets/test/public");
    assert_eq!(
        fs::read_to_string(bucket.join("index.html")).unwrap(),
        "<h1>test</h1>"
    );
    assert_eq!(
        fs::read_to_string(bucket.join("about.html")).unwrap(),
        "<h1>#{Environment}</h1>"
    );
}

#[test]
fn upload_to_missing_bucket_fails() {
    let dir = project();
    fs::remove_dir_all(dir.path().join(".conveyor/state/buckets/assets")).unwrap();

    conveyor_cmd()
        .current_dir(dir.path())
        .arg("upload")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("upload failed"));
}

#[test]
fn delete_stack_removes_deployed_stack() {
    let dir = project();

    conveyor_cmd()
        .current_dir(dir.path())
        .arg("deploy-stack")
        .assert()
        .success();
    assert!(stack_file(dir.path(), "web-test").exists());

    conveyor_cmd()
        .current_dir(dir.path())
        .arg("delete-stack")
        .assert()
        .success();
    assert!(!stack_file(dir.path(), "web-test").exists());
}

#[test]
fn delete_stack_needs_only_the_stack_name() {
    let dir = project();
    conveyor_cmd()
        .current_dir(dir.path())
        .arg("deploy-stack")
        .assert()
        .success();
    fs::write(dir.path().join("conveyor.yml"), "stack:\n  name: web-test\n").unwrap();
    fs::remove_file(dir.path().join("template.yml")).unwrap();

    conveyor_cmd()
        .current_dir(dir.path())
        .arg("delete-stack")
        .assert()
        .success();
    assert!(!stack_file(dir.path(), "web-test").exists());
}

#[test]
fn delete_missing_stack_succeeds() {
    let dir = project();

    conveyor_cmd()
        .current_dir(dir.path())
        .arg("delete-stack")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deployment complete"));
}
