//! CLI integration tests for the `resunpack` binary.
//!
//! Runs the built binary inside temporary project roots and checks exit
//! codes, stdout, and the files written.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

/// Run resunpack in `dir` with the given arguments.
fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_resunpack"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute resunpack")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn create_test_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn create_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    create_test_file(root, "program/src/project.js", r#"cc._RF.push(e, "11aa", "Boot");"#);
    create_test_file(
        root,
        "program/res/a.json",
        r#"[
            {"__type__": "cc.JsonAsset", "_name": "config", "json": {"lives": 3}},
            [{"__type__": "cc.SceneAsset", "_name": "Title"}, {"__type__": "cc.Scene"}],
            {"__type__": "cc.SpriteFrame", "content": {"name": "coin", "texture": "5e01", "rect": [0, 0, 2, 2]}}
        ]"#,
    );
    fs::create_dir_all(root.join("raw-assets/5e")).unwrap();
    RgbaImage::from_pixel(4, 4, Rgba([255, 200, 0, 255]))
        .save(root.join("raw-assets/5e/5e01.png"))
        .unwrap();
    temp
}

// ============================================================================
// extract / assets / sprites
// ============================================================================

#[test]
fn test_extract_default_layout() {
    let temp = create_project();
    let output = run_in(temp.path(), &["extract"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("Extracted"));
    assert!(temp.path().join("out/config.json").exists());
    assert!(temp.path().join("out/Title.fire.json").exists());
    assert!(temp.path().join("images/coin.png").exists());
    assert!(!temp.path().join("out/aliases.json").exists());
}

#[test]
fn test_extract_with_diagnostics_and_overrides() {
    let temp = create_project();
    let output =
        run_in(temp.path(), &["extract", "--diagnostics", "--out", "json", "--images", "png"]);

    assert!(output.status.success());
    assert!(temp.path().join("json/config.json").exists());
    assert!(temp.path().join("json/scripts.json").exists());
    assert!(temp.path().join("png/coin.png").exists());
}

#[test]
fn test_config_file_from_parent_directory() {
    let temp = create_project();
    create_test_file(temp.path(), "resunpack.toml", "[paths]\nout = \"from-config\"\n");
    let nested = temp.path().join("program/res");

    let output = run_in(&nested, &["assets"]);

    assert!(output.status.success());
    // Relative config paths resolve against the config's directory
    assert!(temp.path().join("from-config/config.json").exists());
    assert!(!temp.path().join("images").exists());
}

#[test]
fn test_sprites_only() {
    let temp = create_project();
    let output = run_in(temp.path(), &["-q", "sprites"]);

    assert!(output.status.success());
    assert!(temp.path().join("images/coin.png").exists());
    assert!(!temp.path().join("out/config.json").exists());
}

#[test]
fn test_skips_do_not_fail_the_run() {
    let temp = create_project();
    create_test_file(temp.path(), "program/res/broken.json", "[{");

    let output = run_in(temp.path(), &["extract"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Skipped (1)"));
}

// ============================================================================
// Exit codes
// ============================================================================

#[test]
fn test_missing_config_argument_is_invalid() {
    let temp = create_project();
    let output = run_in(temp.path(), &["extract", "--config", "nope.toml"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_config_is_setup_error() {
    let temp = create_project();
    create_test_file(temp.path(), "resunpack.toml", "[output]\nindent = 99\n");

    let output = run_in(temp.path(), &["extract"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("output.indent"));
}

#[test]
fn test_unknown_command_is_invalid() {
    let temp = TempDir::new().unwrap();
    let output = run_in(temp.path(), &["explode"]);
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// scripts / scan
// ============================================================================

#[test]
fn test_scripts_lists_table() {
    let temp = create_project();
    let output = run_in(temp.path(), &["scripts"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "11aa\tBoot");
}

#[test]
fn test_scripts_missing_manifest_fails() {
    let temp = TempDir::new().unwrap();
    let output = run_in(temp.path(), &["scripts"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_scan_lists_frames() {
    let temp = TempDir::new().unwrap();
    create_test_file(
        temp.path(),
        "bundle.txt",
        r#"xx {"__type__":"cc.SpriteFrame","content":{"name":"door","texture":"t","rect":[4,0,10,30],"rotated":1}} yy"#,
    );

    let output = run_in(temp.path(), &["scan", "bundle.txt"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("door"));
    assert!(text.contains("rect=[4, 0, 30, 10]"));
    assert!(text.contains("size=10x30"));
}

#[test]
fn test_scan_missing_file_is_invalid() {
    let temp = TempDir::new().unwrap();
    let output = run_in(temp.path(), &["scan", "missing.json"]);
    assert_eq!(output.status.code(), Some(2));
}
