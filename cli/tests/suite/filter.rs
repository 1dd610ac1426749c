#![cfg(unix)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use assert_cmd::Command;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const HISTORY_FILENAME: &str = ".vscode-shell-filter-history";

fn shell_filter(home: &TempDir) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("shell-filter").context("should find shell-filter binary")?;
    cmd.env("SHELL_FILTER_HOME", home.path())
        .env_remove("RUST_LOG")
        .arg("--color")
        .arg("never");
    Ok(cmd)
}

fn history_json(home: &TempDir) -> serde_json::Value {
    let raw = fs::read_to_string(home.path().join(HISTORY_FILENAME)).expect("history file");
    serde_json::from_str(&raw).expect("history json")
}

fn write_history(home: &TempDir, json: &str) {
    fs::write(home.path().join(HISTORY_FILENAME), json).expect("write history");
}

fn history_path(home: &TempDir) -> std::path::PathBuf {
    home.path().join(HISTORY_FILENAME)
}

#[test]
fn filters_stdin_through_preset_command() -> anyhow::Result<()> {
    let home = TempDir::new()?;

    shell_filter(&home)?
        .arg("tr a-z A-Z")
        .write_stdin("hello\n")
        .assert()
        .success()
        .stdout("HELLO\n");

    assert_eq!(
        history_json(&home),
        serde_json::json!([{ "command": "tr a-z A-Z", "count": 1 }])
    );
    Ok(())
}

#[test]
fn repeated_runs_are_ranked_in_the_history_file() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    for command in ["rev", "sort", "sort", "rev", "sort"] {
        shell_filter(&home)?
            .arg(command)
            .write_stdin("abc\n")
            .assert()
            .success();
    }

    assert_eq!(
        history_json(&home),
        serde_json::json!([
            { "command": "sort", "count": 3 },
            { "command": "rev", "count": 2 },
        ])
    );
    Ok(())
}

#[test]
fn failing_command_reports_stderr_and_keeps_history() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    write_history(&home, r#"[{"command": "sort", "count": 2}]"#);

    shell_filter(&home)?
        .arg("echo 'bad pattern' >&2; exit 2")
        .write_stdin("text\n")
        .assert()
        .code(1)
        .stdout("")
        .stderr(contains("Error: bad pattern"));

    assert_eq!(
        history_json(&home),
        serde_json::json!([{ "command": "sort", "count": 2 }])
    );
    Ok(())
}

#[test]
fn false_fails_with_empty_error() -> anyhow::Result<()> {
    let home = TempDir::new()?;

    shell_filter(&home)?
        .arg("false")
        .write_stdin("hello\n")
        .assert()
        .code(1)
        .stderr("Error: \n");

    assert!(!history_path(&home).exists());
    Ok(())
}

#[test]
fn empty_input_is_no_selection() -> anyhow::Result<()> {
    let home = TempDir::new()?;

    shell_filter(&home)?
        .arg("sort")
        .write_stdin("")
        .assert()
        .code(1)
        .stderr("No text selected.\n");

    assert!(!history_path(&home).exists());
    Ok(())
}

#[test]
fn line_range_is_filtered_in_place() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    let work = TempDir::new()?;
    let file = work.path().join("list.txt");
    fs::write(&file, "header\ncherry\napple\nbanana\nfooter\n")?;

    shell_filter(&home)?
        .arg("--file")
        .arg(&file)
        .arg("--lines")
        .arg("2:4")
        .arg("--in-place")
        .arg("sort")
        .assert()
        .success()
        .stdout("");

    assert_eq!(
        fs::read_to_string(&file)?,
        "header\napple\nbanana\ncherry\nfooter\n"
    );
    Ok(())
}

#[test]
fn line_range_outside_file_is_rejected() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    let work = TempDir::new()?;
    let file = work.path().join("short.txt");
    fs::write(&file, "one\n")?;

    shell_filter(&home)?
        .arg("--file")
        .arg(&file)
        .arg("--lines")
        .arg("1:3")
        .arg("sort")
        .assert()
        .code(1)
        .stderr(contains("line range 1:3 is outside the input (1 lines)"));
    Ok(())
}

#[test]
fn first_interactive_run_prompts_for_a_command() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    let work = TempDir::new()?;
    let file = work.path().join("words.txt");
    fs::write(&file, "b\na\n")?;

    shell_filter(&home)?
        .arg("--file")
        .arg(&file)
        .write_stdin("sort\n")
        .assert()
        .success()
        .stdout("a\nb\n")
        .stderr(contains("No history available. Enter your first shell command"));

    assert_eq!(
        history_json(&home),
        serde_json::json!([{ "command": "sort", "count": 1 }])
    );
    Ok(())
}

#[test]
fn interactive_pick_accepts_prefilled_command() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    write_history(
        &home,
        r#"[{"command": "sort -r", "count": 5}, {"command": "rev", "count": 1}]"#,
    );
    let work = TempDir::new()?;
    let file = work.path().join("words.txt");
    fs::write(&file, "a\nc\nb\n")?;

    // Pick entry 1, then accept the pre-filled text as is.
    shell_filter(&home)?
        .arg("--file")
        .arg(&file)
        .write_stdin("1\n\n")
        .assert()
        .success()
        .stdout("c\nb\na\n")
        .stderr(contains("Enter a new command..."))
        .stderr(contains("Modify the command before executing [sort -r]"));

    assert_eq!(
        history_json(&home),
        serde_json::json!([
            { "command": "sort -r", "count": 6 },
            { "command": "rev", "count": 1 },
        ])
    );
    Ok(())
}

#[test]
fn interactive_new_command_entry() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    write_history(&home, r#"[{"command": "sort", "count": 1}]"#);
    let work = TempDir::new()?;
    let file = work.path().join("word.txt");
    fs::write(&file, "abc\n")?;

    shell_filter(&home)?
        .arg("--file")
        .arg(&file)
        .write_stdin("2\nrev\n")
        .assert()
        .success()
        .stdout("cba\n")
        .stderr(contains("Enter a shell command to run"));

    assert_eq!(
        history_json(&home),
        serde_json::json!([
            { "command": "sort", "count": 1 },
            { "command": "rev", "count": 1 },
        ])
    );
    Ok(())
}

#[test]
fn dismissing_the_picker_aborts() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    write_history(&home, r#"[{"command": "sort", "count": 1}]"#);
    let work = TempDir::new()?;
    let file = work.path().join("word.txt");
    fs::write(&file, "abc\n")?;

    shell_filter(&home)?
        .arg("--file")
        .arg(&file)
        .arg("--in-place")
        .write_stdin("\n")
        .assert()
        .code(1)
        .stderr(contains("No command selected or entered."));

    assert_eq!(fs::read_to_string(&file)?, "abc\n");
    Ok(())
}

#[test]
fn corrupt_history_is_treated_as_empty() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    write_history(&home, "{ not json");

    shell_filter(&home)?
        .arg("rev")
        .write_stdin("abc\n")
        .assert()
        .success()
        .stdout("cba\n")
        .stderr("");

    assert_eq!(
        history_json(&home),
        serde_json::json!([{ "command": "rev", "count": 1 }])
    );
    Ok(())
}

#[test]
fn no_history_flag_skips_saving() -> anyhow::Result<()> {
    let home = TempDir::new()?;

    shell_filter(&home)?
        .arg("--no-history")
        .arg("rev")
        .write_stdin("abc\n")
        .assert()
        .success()
        .stdout("cba\n");

    assert!(!history_path(&home).exists());
    Ok(())
}

#[test]
fn config_file_sets_history_location_and_shell() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    fs::write(
        home.path().join(".shell-filter.toml"),
        r#"
history_file = "filters.json"
shell = ["/bin/sh", "-c"]
"#,
    )?;

    shell_filter(&home)?
        .arg("tr a-z A-Z")
        .write_stdin("abc\n")
        .assert()
        .success()
        .stdout("ABC\n");

    assert!(!history_path(&home).exists());
    let saved = fs::read_to_string(home.path().join("filters.json"))?;
    assert!(saved.contains("\"tr a-z A-Z\""));
    Ok(())
}

#[test]
fn history_file_flag_overrides_default_location() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    let elsewhere = TempDir::new()?;
    let custom = elsewhere.path().join("custom-history");

    shell_filter(&home)?
        .arg("--history-file")
        .arg(&custom)
        .arg("rev")
        .write_stdin("abc\n")
        .assert()
        .success();

    assert!(custom.exists());
    assert!(!history_path(&home).exists());
    assert_is_pretty_json(&custom);
    Ok(())
}

#[test]
fn ctrl_c_kills_running_filter_without_touching_history() -> anyhow::Result<()> {
    let home = TempDir::new()?;

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("shell-filter"))
        .env("SHELL_FILTER_HOME", home.path())
        .env_remove("RUST_LOG")
        .args(["--color", "never", "sleep 30"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    {
        let mut stdin = child.stdin.take().context("stdin should be piped")?;
        stdin.write_all(b"some text\n")?;
    }

    // Give the filter time to start and install its Ctrl-C handler.
    std::thread::sleep(Duration::from_millis(1000));
    let status = std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()?;
    assert!(status.success());

    let output = child.wait_with_output()?;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "");
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "interrupted (Ctrl-C)\n"
    );
    assert!(!history_path(&home).exists());
    Ok(())
}

fn assert_is_pretty_json(path: &Path) {
    let raw = fs::read_to_string(path).expect("history file");
    assert_eq!(raw, "[\n  {\n    \"command\": \"rev\",\n    \"count\": 1\n  }\n]");
}
