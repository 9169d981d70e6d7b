//! CLI integration tests for rplite.
//!
//! These tests drive the binary against small component projects written to
//! temporary directories.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const BUTTON: &str = r#"import React from 'react';

export enum ButtonStatus {
  Active = 'active',
  Disabled = 'disabled',
}

/** Props for the button. */
type ButtonProps = {
  /** Visible text. */
  label: string;
  disabled: boolean; // greyed out
  /* visual style */
  variant: 'primary' | 'secondary';
  tags: string[];
  /** Don't set this by hand. */
  status: ButtonStatus;
};

export const Button = (props: ButtonProps) => (
  <button disabled={props.disabled}>{props.label}</button>
);

export default function ButtonDefault(props: ButtonProps) {
  return <button data-default="true">{props.label}</button>;
}
"#;

const BAD: &str = r#"type Theme = { primary: string };
type Props = { label: string; theme: Theme };

export const BadComponent = (props: Props) => <div>{props.label}</div>;
"#;

/// Get the rplite binary command, isolated from any global config.
fn rplite(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rplite").unwrap();
    cmd.env("HOME", home);
    cmd
}

/// Create a project with `src/Button.tsx` and `src/legacy/Old.tsx`.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("src/legacy")).unwrap();
    fs::write(tmp.path().join("src/Button.tsx"), BUTTON).unwrap();
    fs::write(
        tmp.path().join("src/legacy/Old.tsx"),
        "export const Old = (p: { label: string }) => null;",
    )
    .unwrap();
    fs::write(
        tmp.path().join("src/Button.stories.tsx"),
        "export const Story = (p: { label: string }) => null;",
    )
    .unwrap();
    tmp
}

fn scan_json(tmp: &TempDir, extra: &[&str]) -> Value {
    let output = rplite(tmp.path())
        .arg("scan")
        .args(extra)
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// rplite scan
// ============================================================================

#[test]
fn test_scan_prints_manifest() {
    let tmp = project();
    let manifest = scan_json(&tmp, &[]);

    assert_eq!(manifest["version"], "1");
    let components = manifest["components"].as_array().unwrap();
    let identities: Vec<(&str, &str, bool)> = components
        .iter()
        .map(|c| {
            (
                c["path"].as_str().unwrap(),
                c["name"].as_str().unwrap(),
                c["isDefaultExport"].as_bool().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        identities,
        vec![
            ("src/Button.tsx", "Button", false),
            ("src/Button.tsx", "Button", true),
            ("src/legacy/Old.tsx", "Old", false),
        ]
    );

    let props = &components[0]["props"];
    assert_eq!(props["label"]["type"], "string");
    assert_eq!(props["disabled"]["type"], "boolean");
    assert_eq!(
        props["variant"],
        serde_json::json!({ "type": "union", "options": ["primary", "secondary"] })
    );
    assert_eq!(
        props["tags"],
        serde_json::json!({ "type": "array", "element": { "type": "string" } })
    );
    assert_eq!(
        props["status"],
        serde_json::json!({ "type": "enum", "name": "ButtonStatus", "options": ["active", "disabled"] })
    );
}

#[test]
fn test_scan_ignore_flag_logs_each_file() {
    let tmp = project();

    rplite(tmp.path())
        .args(["scan", "--ignore", "src/legacy/**"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy").not())
        .stderr(predicate::str::contains("src/legacy/**"))
        .stderr(predicate::str::contains("Old.tsx"));
}

#[test]
fn test_scan_reads_project_config() {
    let tmp = project();
    fs::write(
        tmp.path().join("rplite.toml"),
        "[scan]\nignore = [\"src/legacy/**\"]\nmode = \"batch\"\n",
    )
    .unwrap();

    let manifest = scan_json(&tmp, &[]);
    assert_eq!(manifest["components"].as_array().unwrap().len(), 2);
}

#[test]
fn test_scan_unsupported_prop_warns() {
    let tmp = project();
    fs::write(tmp.path().join("src/Bad.tsx"), BAD).unwrap();

    rplite(tmp.path())
        .args(["scan"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("BadComponent"))
        .stdout(predicate::str::contains("theme").not())
        .stderr(predicate::str::contains("Unsupported prop type"))
        .stderr(predicate::str::contains("prop=theme"));
}

#[test]
fn test_scan_writes_output_file() {
    let tmp = project();
    let out = tmp.path().join("out/manifest.json");

    rplite(tmp.path())
        .args(["scan", "--pretty", "--out"])
        .arg(&out)
        .current_dir(tmp.path())
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("\n  \"components\""));
}

#[test]
fn test_scan_missing_source_dir_fails() {
    let tmp = TempDir::new().unwrap();

    rplite(tmp.path())
        .args(["scan"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("source directory not found"));
}

#[test]
fn test_scan_invalid_ignore_pattern_shows_help() {
    let tmp = project();

    rplite(tmp.path())
        .args(["scan", "--ignore", "src/[oops"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid ignore pattern `src/[oops`"))
        .stderr(predicate::str::contains("help: ignore patterns are globs"));
}

#[test]
fn test_scan_log_env_overrides_filter() {
    let tmp = project();

    rplite(tmp.path())
        .arg("scan")
        .env("RPLITE_LOG", "rplite=debug")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("scan found 3 components"));
}

// ============================================================================
// rplite validate
// ============================================================================

#[test]
fn test_validate_accepts_scanner_output() {
    let tmp = project();
    let out = tmp.path().join("manifest.json");

    rplite(tmp.path())
        .args(["scan", "--out"])
        .arg(&out)
        .current_dir(tmp.path())
        .assert()
        .success();

    rplite(tmp.path())
        .arg("validate")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 components"));
}

#[test]
fn test_validate_rejects_version_mismatch() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("manifest.json");
    fs::write(&file, r#"{"version":"2","components":[]}"#).unwrap();

    rplite(tmp.path())
        .arg("validate")
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Unsupported manifest version \"2\". Expected version \"1\".",
        ));
}

#[test]
fn test_validate_rejects_array_without_element() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("manifest.json");
    fs::write(
        &file,
        r#"{"version":"1","components":[{"name":"List","path":"src/List.tsx","isDefaultExport":false,"props":{"items":{"type":"array"}}}]}"#,
    )
    .unwrap();

    rplite(tmp.path())
        .arg("validate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("element definition"));
}

// ============================================================================
// rplite preview
// ============================================================================

#[test]
fn test_preview_renders_with_props() {
    let tmp = project();

    rplite(tmp.path())
        .args([
            "preview",
            "Button",
            "--named",
            "--prop",
            "label=Hello",
            "--prop",
            "disabled=true",
            "--prop",
            "tags=a, b,,c",
        ])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<Button label="Hello" disabled={true} variant="primary" tags={["a","b","c"]} status="active" />"#,
        ));
}

#[test]
fn test_preview_ambiguous_name_fails() {
    let tmp = project();

    rplite(tmp.path())
        .args(["preview", "Button"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous"))
        .stderr(predicate::str::contains("--named or --default"));
}

#[test]
fn test_preview_rejects_bad_option_value() {
    let tmp = project();

    rplite(tmp.path())
        .args(["preview", "Button", "--default", "--prop", "variant=tertiary"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not one of: primary, secondary"));
}

#[test]
fn test_preview_lists_controls() {
    let tmp = project();

    rplite(tmp.path())
        .args(["preview", "Button", "--default", "--controls"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("disabled: checkbox"))
        .stdout(predicate::str::contains("variant: select [primary, secondary]"))
        .stdout(predicate::str::contains("tags: list (Comma-separated text values)"));
}
