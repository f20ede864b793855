//! Integration tests for the permcheck CLI.
//!
//! Each test builds its own app directory in a temporary location, so the
//! tests are independent and need no network access.

#![allow(deprecated)] // cargo_bin is deprecated but works fine for standard builds

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn permcheck() -> Command {
    let mut cmd = Command::cargo_bin("permcheck").unwrap();
    cmd.env_remove("PERMCHECK_APP_DIR");
    cmd
}

/// Creates an app directory with the given files under `permissions/`.
fn app_dir(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let permissions = temp_dir.path().join("permissions");
    fs::create_dir(&permissions).unwrap();
    for (name, content) in files {
        let path = permissions.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    temp_dir
}

fn app_arg(app: &TempDir) -> &Path {
    app.path()
}

const EMPTY: &str = r#"{"Version": "2012-10-17", "Statement": []}"#;

// ============================================================================
// Help and version
// ============================================================================

#[test]
fn test_help_contains_disclaimer() {
    permcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("DISCLAIMER"));
}

#[test]
fn test_help_lists_commands() {
    permcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check-boundaries"))
        .stdout(predicate::str::contains("check-overlap"))
        .stdout(predicate::str::contains("--app-dir"))
        .stdout(predicate::str::contains("--no-color"));
}

#[test]
fn test_version() {
    permcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_output_mode_fails() {
    permcheck()
        .args(["check-boundaries", "--output", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ============================================================================
// check-boundaries
// ============================================================================

#[test]
fn test_boundaries_maintenance_only_is_high_and_fails() {
    let app = app_dir(&[
        ("provision_boundary.json", EMPTY),
        ("deprovision_boundary.json", EMPTY),
        (
            "maintenance_boundary.json",
            r#"{"Statement": [{"Effect": "Allow", "Action": "s3:PutObject"}]}"#,
        ),
        ("breakglass_boundary.json", EMPTY),
    ]);

    let output = permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-boundaries", "--output", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let findings: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let findings = findings.as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["severity"], "high");
    assert_eq!(
        findings[0]["missing_from"],
        serde_json::json!(["provision", "deprovision", "breakglass"])
    );
}

#[test]
fn test_boundaries_breakglass_only_is_low_and_passes() {
    let app = app_dir(&[
        ("provision_boundary.json", EMPTY),
        ("deprovision_boundary.json", EMPTY),
        ("maintenance_boundary.json", EMPTY),
        (
            "breakglass_boundary.json",
            r#"{"Statement": [{"Action": ["iam:PassRole"]}]}"#,
        ),
    ]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-boundaries", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"severity\": \"low\""));
}

#[test]
fn test_boundaries_consistent_text_output() {
    let same = r#"{"Statement": [{"Effect": "Allow", "Action": "s3:GetObject"}]}"#;
    let app = app_dir(&[
        ("provision_boundary.json", same),
        ("deprovision_boundary.json", same),
        ("maintenance_boundary.json", same),
        ("breakglass_boundary.json", same),
    ]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["--no-color", "check-boundaries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All boundaries are consistent!"));
}

#[test]
fn test_boundaries_text_output_grouped_by_severity() {
    let app = app_dir(&[
        (
            "provision_boundary.json",
            r#"{"Statement": [{"Action": "ec2:RunInstances"}]}"#,
        ),
        ("deprovision_boundary.json", EMPTY),
        (
            "maintenance_boundary.json",
            r#"{"Statement": [{"Action": "s3:PutObject"}]}"#,
        ),
        ("breakglass_boundary.json", EMPTY),
    ]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-boundaries", "--no-color"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("HIGH PRIORITY (1 findings)"))
        .stdout(predicate::str::contains("MEDIUM PRIORITY (1 findings)"))
        .stdout(predicate::str::contains("Total discrepancies: 2"));
}

#[test]
fn test_boundaries_missing_files_are_tolerated() {
    let app = app_dir(&[(
        "provision_boundary.json",
        r#"{"Statement": [{"Action": "s3:GetObject"}]}"#,
    )]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-boundaries", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_boundaries_malformed_file_is_skipped() {
    let app = app_dir(&[
        ("provision_boundary.json", "{ not json"),
        ("deprovision_boundary.json", EMPTY),
        (
            "maintenance_boundary.json",
            r#"{"Statement": [{"Action": "s3:PutObject"}]}"#,
        ),
    ]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-boundaries", "--output", "json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("provision_boundary.json"));
}

#[test]
fn test_boundaries_without_permissions_dir_fails() {
    let temp_dir = TempDir::new().unwrap();

    permcheck()
        .arg("--app-dir")
        .arg(temp_dir.path())
        .arg("check-boundaries")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No permissions/ directory found"));
}

#[test]
fn test_nonexistent_app_dir_fails() {
    permcheck()
        .args([
            "--app-dir",
            "/nonexistent/path/that/does/not/exist",
            "check-boundaries",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

// ============================================================================
// check-overlap
// ============================================================================

const MANIFEST: &str = r#"
[[policies]]
name = "{{.nuon.install.id}}-storage"
contents = "./policies/storage.json"

[[policies]]
name = "{{.nuon.install.id}}-reader"
contents = "./policies/reader.json"
"#;

#[test]
fn test_overlap_detected_across_documents() {
    let app = app_dir(&[
        ("maintenance.toml", MANIFEST),
        (
            "policies/storage.json",
            r#"{"Statement": [{"Sid": "Storage", "Effect": "Allow", "Action": ["s3:GetObject", "s3:PutObject"]}]}"#,
        ),
        (
            "policies/reader.json",
            r#"{"Statement": [{"Sid": "Read", "Effect": "Allow", "Action": "s3:GetObject"}]}"#,
        ),
    ]);

    let output = permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-overlap", "maintenance.toml", "--output", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let overlaps: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let overlaps = overlaps.as_object().unwrap();
    assert_eq!(overlaps.len(), 1);
    let pairs = overlaps["s3:GetObject"].as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["policy1"], "storage.json");
    assert_eq!(pairs[0]["sid1"], "Storage");
    assert_eq!(pairs[0]["policy2"], "reader.json");
    assert_eq!(pairs[0]["sid2"], "Read");
}

#[test]
fn test_overlap_text_output_groups_by_pair() {
    let app = app_dir(&[
        ("maintenance.toml", MANIFEST),
        (
            "policies/storage.json",
            r#"{"Statement": [{"Sid": "Storage", "Action": "s3:GetObject"}]}"#,
        ),
        (
            "policies/reader.json",
            r#"{"Statement": [{"Sid": "Read", "Action": "s3:GetObject"}]}"#,
        ),
    ]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["--no-color", "check-overlap", "maintenance.toml"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("<install>-storage"))
        .stdout(predicate::str::contains("reader.json <-> storage.json"))
        .stdout(predicate::str::contains("Policy pairs with overlaps: 1"));
}

#[test]
fn test_overlap_between_files_sharing_a_name() {
    let app = app_dir(&[
        (
            "shared.toml",
            "[[policies]]\nname = \"a\"\ncontents = \"a/policy.json\"\n\n[[policies]]\nname = \"b\"\ncontents = \"b/policy.json\"\n",
        ),
        (
            "a/policy.json",
            r#"{"Statement": [{"Sid": "A", "Action": "s3:GetObject"}]}"#,
        ),
        (
            "b/policy.json",
            r#"{"Statement": [{"Sid": "B", "Action": "s3:GetObject"}]}"#,
        ),
    ]);

    let output = permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-overlap", "shared.toml", "--output", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let overlaps: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let pairs = overlaps["s3:GetObject"].as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["policy1"], "policy.json");
    assert_eq!(pairs[0]["policy2"], "b/policy.json");
}

#[test]
fn test_overlap_survives_badly_typed_manifest_entry() {
    let app = app_dir(&[
        (
            "mixed.toml",
            "[[policies]]\nname = \"a\"\ncontents = \"a.json\"\n\n[[policies]]\nname = \"b\"\ncontents = \"b.json\"\n\n[[policies]]\nname = 7\ncontents = 5\n",
        ),
        ("a.json", r#"{"Statement": [{"Action": "s3:GetObject"}]}"#),
        ("b.json", r#"{"Statement": [{"Action": "s3:GetObject"}]}"#),
    ]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-overlap", "mixed.toml", "--output", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("s3:GetObject"))
        .stderr(predicate::str::contains("not a string"));
}

#[test]
fn test_overlap_within_single_document_is_ignored() {
    let app = app_dir(&[
        (
            "single.toml",
            "[[policies]]\nname = \"only\"\ncontents = \"only.json\"\n",
        ),
        (
            "only.json",
            r#"{"Statement": [{"Sid": "One", "Action": "s3:GetObject"}, {"Sid": "Two", "Action": "s3:GetObject"}]}"#,
        ),
    ]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-overlap", "single.toml", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("{}\n"));
}

#[test]
fn test_overlap_manifest_by_path() {
    let app = app_dir(&[(
        "provision.toml",
        "[[policies]]\nname = \"absent\"\ncontents = \"absent.json\"\n",
    )]);
    let manifest = app.path().join("permissions").join("provision.toml");

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .arg("check-overlap")
        .arg(&manifest)
        .args(["--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("{}\n"))
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn test_overlap_empty_manifest_passes() {
    let app = app_dir(&[("empty.toml", "type = \"maintenance\"\n")]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["--no-color", "check-overlap", "empty.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No [[policies]] blocks found"));
}

#[test]
fn test_overlap_missing_manifest_fails() {
    let app = app_dir(&[]);

    permcheck()
        .arg("--app-dir")
        .arg(app_arg(&app))
        .args(["check-overlap", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission manifest not found"));
}
