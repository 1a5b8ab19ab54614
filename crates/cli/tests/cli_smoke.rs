//! CLI smoke tests for the trestle reference pipeline.
//!
//! Each test runs the `trestle` binary against an isolated artifacts
//! directory and checks exit codes, summary rendering, and produced files.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated test environment: every run writes into its own temp directory.
struct TestEnv {
  temp: TempDir,
}

impl TestEnv {
  fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  fn artifacts(&self) -> PathBuf {
    self.temp.path().join("dist")
  }

  /// Command for the trestle binary, pointed at the isolated artifacts dir.
  fn cmd(&self) -> Command {
    let mut cmd = Command::cargo_bin("trestle").unwrap();
    cmd.arg("--artifacts").arg(self.artifacts());
    // Keep host detection and parameter fallback away from the CI job's
    // own environment.
    for var in ["GITHUB_ACTIONS", "GITLAB_CI", "TRAVIS", "TF_BUILD", "APPVEYOR", "CONFIGURATION"] {
      cmd.env_remove(var);
    }
    cmd
  }
}

fn bare_cmd() -> Command {
  Command::cargo_bin("trestle").unwrap()
}

// =============================================================================
// help & graph (exit 0 before planning)
// =============================================================================

#[test]
fn help_lists_targets_and_parameters() {
  bare_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Targets:"))
    .stdout(predicate::str::contains("Compile"))
    .stdout(predicate::str::contains("(default)"))
    .stdout(predicate::str::contains("Parameters:"))
    .stdout(predicate::str::contains("--configuration"));
}

#[test]
fn graph_renders_dependencies() {
  bare_cmd()
    .arg("--graph")
    .assert()
    .success()
    .stdout(predicate::str::contains("Dependency graph"))
    .stdout(predicate::str::contains("└─ Restore"));
}

// =============================================================================
// planning failures
// =============================================================================

#[test]
fn unknown_target_fails_listing_available_targets() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("Deploy")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown target 'Deploy'"))
    .stderr(predicate::str::contains("Compile"));
}

#[test]
fn unknown_flag_is_rejected() {
  bare_cmd().arg("--frobnicate").assert().failure();
}

#[test]
fn invalid_choice_value_is_rejected() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["--configuration", "fastest"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("not one of"));
}

// =============================================================================
// full runs
// =============================================================================

#[test]
fn default_invocation_runs_the_chain_up_to_compile() {
  let env = TestEnv::new();

  env
    .cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Build succeeded on"))
    .stdout(predicate::str::contains("Executed"));

  assert!(env.artifacts().join("packages.lock").exists());
  assert!(env.artifacts().join("app-debug.bin").exists());
}

#[test]
fn pack_runs_the_whole_chain() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("Pack")
    .assert()
    .success()
    .stdout(predicate::str::contains("running unit tests"))
    .stdout(predicate::str::contains("Build succeeded on"));

  assert!(env.artifacts().join("test-report.txt").exists());
  assert!(env.artifacts().join("app-debug.pkg").exists());
}

#[test]
fn release_configuration_flows_into_artifacts() {
  let env = TestEnv::new();

  env.cmd().args(["--configuration", "release"]).assert().success();

  assert!(env.artifacts().join("app-release.bin").exists());
}

#[test]
fn strict_mode_accepts_the_total_chain_order() {
  let env = TestEnv::new();

  env.cmd().args(["Pack", "--strict"]).assert().success();
}

// =============================================================================
// skips & conditions
// =============================================================================

#[test]
fn bare_skip_runs_only_the_invoked_target() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["Compile", "--skip"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Skipped"));

  // Compile ran; Restore was skipped, so no lock file was written.
  assert!(env.artifacts().join("app-debug.bin").exists());
  assert!(!env.artifacts().join("packages.lock").exists());
}

#[test]
fn named_skip_suppresses_only_that_target() {
  let env = TestEnv::new();

  env.cmd().args(["Compile", "--skip", "Clean"]).assert().success();

  assert!(env.artifacts().join("packages.lock").exists());
}

#[test]
fn skip_slow_condition_skips_tests() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["Pack", "--skip-slow"])
    .assert()
    .success()
    .stdout(predicate::str::contains("running unit tests").not());

  assert!(!env.artifacts().join("test-report.txt").exists());
  assert!(env.artifacts().join("app-debug.pkg").exists());
}

// =============================================================================
// summary JSON
// =============================================================================

#[test]
fn summary_path_writes_machine_readable_results() {
  let env = TestEnv::new();
  let summary_path = env.temp.path().join("run.json");

  env
    .cmd()
    .arg("Pack")
    .arg("--summary-path")
    .arg(&summary_path)
    .assert()
    .success();

  let raw = std::fs::read_to_string(&summary_path).unwrap();
  let summary: serde_json::Value = serde_json::from_str(&raw).unwrap();

  assert_eq!(summary["succeeded"], serde_json::Value::Bool(true));
  let targets: Vec<&str> = summary["rows"]
    .as_array()
    .unwrap()
    .iter()
    .map(|row| row["target"].as_str().unwrap())
    .collect();
  assert_eq!(targets, vec!["Clean", "Restore", "Compile", "Test", "Pack"]);
}

// =============================================================================
// parameter environment fallback
// =============================================================================

#[test]
fn environment_variable_binds_a_parameter() {
  let env = TestEnv::new();

  let mut cmd = bare_cmd();
  cmd.env("ARTIFACTS", env.artifacts());
  for var in ["GITHUB_ACTIONS", "GITLAB_CI", "TRAVIS", "TF_BUILD", "APPVEYOR", "CONFIGURATION"] {
    cmd.env_remove(var);
  }
  cmd.assert().success();

  assert!(env.artifacts().join("app-debug.bin").exists());
}
