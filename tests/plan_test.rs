//! Integration tests for planning output
//!
//! Covers `--list`, `--dry-run` and argument rendering without running a
//! build backend.

mod common;

use common::{run_casabuild, TestProject, SMALL_TABLE};
use serde_json::Value;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn dry_run_json(project: &TestProject, args: &[&str]) -> Value {
    let mut full = vec!["--dry-run", "--json"];
    full.extend_from_slice(args);
    let output = run_casabuild(&project.path(), &full);
    assert!(
        output.status.success(),
        "dry run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("dry run output should be JSON")
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|v| v.as_str().expect("expected a string").to_string())
        .collect()
}

#[test]
fn test_list_prints_builtin_table_in_default_order() {
    let project = TestProject::new();
    let output = run_casabuild(&project.path(), &["--list"]);

    assert!(output.status.success());
    let text = stdout(&output);
    let names: Vec<&str> = text
        .lines()
        .map(|l| l.split_whitespace().next().unwrap_or(""))
        .collect();
    assert_eq!(
        names,
        [
            "casa",
            "tables",
            "mirlib",
            "scimath",
            "measures",
            "fits",
            "lattices",
            "coordinates",
            "components",
            "images",
            "ms",
            "msvis",
            "msfits"
        ]
    );
}

#[test]
fn test_list_json() {
    let project = TestProject::new();
    let output = run_casabuild(&project.path(), &["--list", "--json"]);

    assert!(output.status.success());
    let table: Value = serde_json::from_slice(&output.stdout).unwrap();
    let measures = table
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["name"] == "measures")
        .expect("measures should be listed");
    assert_eq!(strings(&measures["depends"]), ["tables", "scimath"]);
}

#[test]
fn test_dry_run_orders_prerequisites_first() {
    let project = TestProject::new();
    let plan = dry_run_json(&project, &["measures"]);

    assert_eq!(
        strings(&plan["packages"]),
        ["casa", "tables", "scimath", "measures"]
    );
}

#[test]
fn test_dry_run_merges_several_targets() {
    let project = TestProject::new();
    let plan = dry_run_json(&project, &["tables", "scimath"]);

    assert_eq!(strings(&plan["packages"]), ["casa", "tables", "scimath"]);
}

#[test]
fn test_dry_run_without_targets_builds_everything() {
    let project = TestProject::new();
    let plan = dry_run_json(&project, &[]);

    let packages = strings(&plan["packages"]);
    assert_eq!(packages.len(), 13);
    assert_eq!(packages[0], "casa");
    assert_eq!(packages[12], "msfits");
}

#[test]
fn test_staged_arguments_point_at_stage_dir() {
    let project = TestProject::new();
    let plan = dry_run_json(&project, &["casa", "prefix=/ignored", "debug=1"]);

    let args = strings(&plan["args"]);
    assert_eq!(args[0], "debug=1");
    assert_eq!(args[1], "install");
    assert!(args[2].starts_with("prefix=") && args[2].ends_with("stage"));
    assert!(args[3].starts_with("casacoredir=") && args[3].ends_with("stage"));
    assert_eq!(args[2]["prefix=".len()..], args[3]["casacoredir=".len()..]);
    assert!(!args.iter().any(|a| a == "prefix=/ignored"));

    // A dry run never creates the staging directory
    assert!(!project.file_exists("stage"));
}

#[test]
fn test_system_install_arguments() {
    let project = TestProject::new();

    let plan = dry_run_json(&project, &["casa", "install", "prefix=/opt/casa"]);
    assert_eq!(
        strings(&plan["args"]),
        ["install", "prefix=/opt/casa", "casacoredir=/opt/casa"]
    );

    let plan = dry_run_json(&project, &["casa", "install"]);
    assert_eq!(strings(&plan["args"]), ["install", "casacoredir=/usr"]);
}

#[test]
fn test_short_help_is_passed_through() {
    let project = TestProject::new();
    let plan = dry_run_json(&project, &["-h"]);

    assert_eq!(strings(&plan["args"]), ["-h"]);
}

#[test]
fn test_unknown_names_are_forwarded() {
    let project = TestProject::new();
    let plan = dry_run_json(&project, &["nosuchpkg"]);

    assert_eq!(strings(&plan["packages"]).len(), 13);
    assert_eq!(strings(&plan["args"])[0], "nosuchpkg");
}

#[test]
fn test_jobs_zero_uses_cpu_count() {
    let project = TestProject::new();
    let plan = dry_run_json(&project, &["-j", "0", "casa"]);

    let args = strings(&plan["args"]);
    let jobs = args.last().unwrap();
    let n: usize = jobs.trim_start_matches("-j").parse().unwrap();
    assert!(n >= 1);
}

#[test]
fn test_project_settings_replace_table() {
    let project = TestProject::new();
    project.create_file("casabuild.toml", SMALL_TABLE);

    let plan = dry_run_json(&project, &[]);
    assert_eq!(
        strings(&plan["packages"]),
        ["casa", "tables", "scimath", "measures"]
    );

    // `fits` is not in this table, so it is forwarded
    let plan = dry_run_json(&project, &["fits"]);
    assert_eq!(strings(&plan["args"])[0], "fits");
}

#[test]
fn test_cyclic_table_is_rejected() {
    let project = TestProject::new();
    project.create_file(
        "casabuild.toml",
        "[packages.depends]\na = [\"b\"]\nb = [\"a\"]\n",
    );

    let output = run_casabuild(&project.path(), &["--dry-run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Circular dependency"));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let project = TestProject::new();
    let output = run_casabuild(&project.path(), &["--config", "missing.toml", "--dry-run"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn test_dry_run_text_output() {
    let project = TestProject::new();
    let output = run_casabuild(&project.path(), &["--dry-run", "tables"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Build plan (2 packages):"));
    assert!(text.contains("  1. casa"));
    assert!(text.contains("  2. tables"));
    assert!(text.contains("Backend arguments: install prefix="));
}

#[test]
fn test_verbose_logging_goes_to_stderr() {
    let project = TestProject::new();

    let output = run_casabuild(&project.path(), &["-vv", "--dry-run", "--json", "casa"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Build plan"));
    serde_json::from_slice::<Value>(&output.stdout).expect("stdout should stay JSON");

    let output = run_casabuild(&project.path(), &["--dry-run", "--json", "casa"]);
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Build plan"));
}
