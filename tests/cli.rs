// 命令列整合測試

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn markpen(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("markpen").unwrap();
    cmd.arg("--config").arg(dir.path().join("state.json"));
    cmd
}

fn write_rules(dir: &TempDir) -> std::path::PathBuf {
    let csv = dir.path().join("rules.csv");
    fs::write(
        &csv,
        "\u{FEFF}find,replace,mode,case_sensitive,whole_word,auto_caps\n\
         \"hello\",\"world\",\"default\",FALSE,FALSE,TRUE\n\
         \"say \"\"hi\"\"\",\"greet\",\"quotes\",TRUE,FALSE,FALSE\n",
    )
    .unwrap();
    csv
}

#[test]
fn test_help() {
    Command::cargo_bin("markpen")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE"));
}

#[test]
fn test_keywords_render_html() {
    let dir = TempDir::new().unwrap();
    markpen(&dir)
        .args(["--keywords", "fox"])
        .write_stdin("the <quick> fox")
        .assert()
        .success()
        .stdout("the &lt;quick&gt; <span class=\"keyword hl-pink\">fox</span>");
}

#[test]
fn test_import_then_replace_plain() {
    let dir = TempDir::new().unwrap();
    let csv = write_rules(&dir);

    markpen(&dir)
        .arg("--import-csv")
        .arg(&csv)
        .assert()
        .success()
        .stderr(predicate::str::contains("Imported 2 rows"));

    let input = dir.path().join("doc.txt");
    fs::write(&input, "Hello there. ok").unwrap();

    markpen(&dir)
        .args(["--replace", "--plain"])
        .arg(&input)
        .assert()
        .success()
        .stdout("World there. Ok")
        .stderr(predicate::str::contains("Replaced 1 words"));
}

#[test]
fn test_export_csv_round_trip() {
    let dir = TempDir::new().unwrap();
    let csv = write_rules(&dir);
    let exported = dir.path().join("out.csv");

    markpen(&dir)
        .arg("--import-csv")
        .arg(&csv)
        .arg("--export-csv")
        .arg(&exported)
        .assert()
        .success();

    let text = fs::read_to_string(&exported).unwrap();
    assert!(text.starts_with('\u{FEFF}'));
    assert!(text.contains(r#""say ""hi""","greet","quotes",TRUE,FALSE,FALSE"#));
}

#[test]
fn test_bad_csv_is_rejected() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("bad.csv");
    fs::write(&csv, "\"a\",\"b\",\"c\"\n").unwrap();

    markpen(&dir)
        .arg("--import-csv")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing find,replace,mode header"));

    assert!(!dir.path().join("state.json").exists());
}

#[test]
fn test_unknown_mode_fails() {
    let dir = TempDir::new().unwrap();
    markpen(&dir)
        .args(["--mode", "nope", "--replace"])
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_chapters_listing() {
    let dir = TempDir::new().unwrap();
    markpen(&dir)
        .arg("--chapters")
        .write_stdin("Intro\nChapter 1\nA\nChapter 2: End\nB")
        .assert()
        .success()
        .stdout("1\t0\t(preamble)\n2\t6\tChapter 1\n3\t18\tChapter 2: End\n");
}

#[test]
fn test_export_keywords_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("keywords.txt");

    markpen(&dir)
        .args(["--keywords", "Anna; Bob, Anna"])
        .arg("--export-keywords")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&out).unwrap(), "Anna\nBob");
}
