use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_nasheets")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn sheet_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// -- json / outline / tokens --

#[test]
fn json_prints_model() {
    cmd()
        .args(["json", fixture_path("all-features.nns").as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"front_matter\""))
        .stdout(predicate::str::contains("\"title\": \"All Features\""))
        .stdout(predicate::str::contains("\"pretty\""));
}

#[test]
fn outline_lists_sections() {
    cmd()
        .args(["outline", fixture_path("all-features.nns").as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Section: verse"))
        .stdout(predicate::str::contains("Section: bridge (break)"))
        .stdout(predicate::str::contains("Bar 5 \"intro\": Em7"));
}

#[test]
fn tokens_dump() {
    let file = sheet_file("A | !push!B\n");
    cmd()
        .args(["tokens"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Chord: A"))
        .stdout(predicate::str::contains("Annotation: push"))
        .stdout(predicate::str::contains("Return: \\n"))
        .stdout(predicate::str::contains("Eof: "));
}

// -- fmt --

#[test]
fn fmt_prints_canonical_text() {
    let expected = std::fs::read_to_string(fixture_path("messy.expected.nns")).unwrap();
    let assert = cmd()
        .args(["fmt", fixture_path("messy.nns").as_str()])
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn fmt_write_rewrites_in_place() {
    let file = sheet_file("A|B  |C\n\n\n#verse\n||:D :||");
    cmd()
        .args(["fmt", "--write"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let rewritten = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(rewritten, "A | B | C\n\n# verse\n\n||: D :||\n");
}

// -- check --

#[test]
fn check_passes_valid_files() {
    cmd()
        .args([
            "check",
            fixture_path("all-features.nns").as_str(),
            fixture_path("messy.nns").as_str(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn check_reports_errors() {
    cmd()
        .args([
            "check",
            fixture_path("all-features.nns").as_str(),
            fixture_path("broken.nns").as_str(),
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAILED"))
        .stderr(predicate::str::contains("lexical error: unexpected string Want: !"))
        .stderr(predicate::str::contains("broken.nns"))
        .stderr(predicate::str::contains("1 of 2 file(s) failed to parse"));
}

#[test]
fn check_expands_directories() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("one.nns"), "A | B\n").unwrap();
    std::fs::write(dir.path().join("two.nns"), "# verse\nC\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "!not a sheet").unwrap();

    cmd()
        .args(["check"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("one.nns"))
        .stdout(predicate::str::contains("two.nns"))
        .stdout(predicate::str::contains("notes.txt").not());
}

// -- config --

#[test]
fn config_changes_extension_and_default_length() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("song.chart"), "`abc`\n").unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "extension: chart\ndefault_length: 1/4\n").unwrap();

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("json")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_length\": \"1/4\""));
}

#[test]
fn bad_config_is_an_error() {
    let config = sheet_file("error_context: [1, 2]\n");
    cmd()
        .arg("--config")
        .arg(config.path())
        .args(["check", fixture_path("all-features.nns").as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn missing_file_is_an_error() {
    cmd()
        .args(["json", "/nonexistent/song.nns"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
