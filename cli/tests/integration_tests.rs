use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn argview(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_argview"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run argview")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Schema with a flag, a scalar, a vector and a context.
fn write_render_schema(dir: &TempDir) -> PathBuf {
    let json = serde_json::json!([
        {"kind": "flag", "name": "--verbose", "comment": "print progress"},
        {"kind": "scalar", "name": "--threads", "default": {"u32": 4}, "comment": "worker count"},
        {"kind": "vector", "name": "--size", "value_kind": "u32", "defaults": [{"u32": 640}, {"u32": 480}]},
        {
            "kind": "context",
            "name": "--camera",
            "comment": "view settings",
            "children": [
                {"kind": "scalar", "name": "--fov", "default": {"f32": 60.0}}
            ]
        }
    ]);
    let path = dir.path().join("render.json");
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
    path
}

#[test]
fn test_tokens_expands_includes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("camera.txt"), "--fov 75 # degrees\n--near 0.1\n").unwrap();

    let output = argview(dir.path(), &["tokens", "--", "--camera", "{", "<", "camera.txt", "}"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "--camera\n{\n--fov\n75\n--near\n0.1\n}\n");
}

#[test]
fn test_tokens_json_format() {
    let dir = TempDir::new().unwrap();
    let output = argview(dir.path(), &["tokens", "--format", "json", "--", "--a", "1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let tokens: Vec<String> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(tokens, ["--a", "1"]);
}

#[test]
fn test_tokens_reports_include_cycle() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "< b.txt").unwrap();
    fs::write(dir.path().join("b.txt"), "< a.txt").unwrap();

    let output = argview(dir.path(), &["tokens", "--", "<", "a.txt"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("contains file loading loop"));
}

#[test]
fn test_lex_prints_tokens_without_comments() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("args.txt");
    fs::write(&file, "# header\n--x 1   --y\t2 # trailing\n").unwrap();

    let output = argview(dir.path(), &["lex", file.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "--x\n1\n--y\n2\n");
}

#[test]
fn test_check_accepts_matching_arguments() {
    let dir = TempDir::new().unwrap();
    let schema = write_render_schema(&dir);

    let output = argview(
        dir.path(),
        &[
            "check",
            "--schema",
            schema.to_str().unwrap(),
            "--",
            "--camera",
            "{",
            "--fov",
            "90",
            "}",
            "--size",
            "800",
            "600",
            "--verbose",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "ok: 9 argument(s) matched\n");
}

#[test]
fn test_check_rejects_unknown_argument() {
    let dir = TempDir::new().unwrap();
    let schema = write_render_schema(&dir);

    let output = argview(
        dir.path(),
        &["check", "--schema", schema.to_str().unwrap(), "--", "--threads", "2", "--bogus"],
    );
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("--bogus"), "stderr: {err}");
    assert!(err.contains("cannot be matched"), "stderr: {err}");
}

#[test]
fn test_check_rejects_mistyped_value() {
    let dir = TempDir::new().unwrap();
    let schema = write_render_schema(&dir);

    let output = argview(
        dir.path(),
        &["check", "--schema", schema.to_str().unwrap(), "--", "--threads", "-2"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("expects a u32 value, not: -2"));
}

#[test]
fn test_check_without_schema_fails() {
    let dir = TempDir::new().unwrap();
    let output = argview(dir.path(), &["check", "--", "--verbose"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no schema given"));
}

#[test]
fn test_usage_prints_listing() {
    let dir = TempDir::new().unwrap();
    let schema = write_render_schema(&dir);

    let output = argview(dir.path(), &["usage", "--schema", schema.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("--threads = 4"), "usage: {text}");
    assert!(text.contains("- worker count"), "usage: {text}");
    assert!(text.contains("--camera { - view settings"), "usage: {text}");
    assert!(text.contains("  --fov = 60 [f32]"), "usage: {text}");
}

#[test]
fn test_default_config_file_supplies_schema_and_format() {
    let dir = TempDir::new().unwrap();
    write_render_schema(&dir);
    fs::write(
        dir.path().join(".argview.yml"),
        "version: \"1.0\"\nschema: render.json\nformat: yaml\n",
    )
    .unwrap();

    let check = argview(dir.path(), &["check", "--", "--verbose"]);
    assert!(check.status.success(), "stderr: {}", stderr(&check));
    assert_eq!(stdout(&check), "ok: 1 argument(s) matched\n");

    let tokens = argview(dir.path(), &["tokens", "--", "alpha"]);
    assert!(tokens.status.success(), "stderr: {}", stderr(&tokens));
    assert_eq!(stdout(&tokens), "- alpha\n");
}

#[test]
fn test_explicit_config_include_dir() {
    let dir = TempDir::new().unwrap();
    let presets = dir.path().join("presets");
    fs::create_dir(&presets).unwrap();
    fs::write(presets.join("fast.txt"), "--threads 16").unwrap();
    let config = dir.path().join("cfg.yml");
    fs::write(&config, "include_dir: presets\n").unwrap();

    let output = argview(
        dir.path(),
        &["--config", config.to_str().unwrap(), "tokens", "--", "<", "fast.txt"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "--threads\n16\n");
}
