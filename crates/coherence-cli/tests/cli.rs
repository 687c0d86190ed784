//! CLI command integration tests.
//! Each test uses a temp directory via COHERENCE_DATA_DIR for full isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEAVY: &str = "triste raiva medo culpa vazio";

fn coherence_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("coherence").unwrap();
    cmd.env("COHERENCE_DATA_DIR", data_dir.path());
    cmd
}

fn write_export(dir: &TempDir, name: &str, texts: &[&str]) -> std::path::PathBuf {
    let entries: Vec<_> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let ts = 1_700_000_000_000i64 + i as i64;
            serde_json::json!({ "id": ts, "text": t, "timestamp": ts })
        })
        .collect();
    let path = dir.path().join(name);
    std::fs::write(
        &path,
        serde_json::json!({ "version": "1", "entries": entries }).to_string(),
    )
    .unwrap();
    path
}

#[test]
fn score_fresh_journal() {
    let dir = TempDir::new().unwrap();
    coherence_cmd(&dir)
        .arg("score")
        .assert()
        .success()
        .stdout(predicate::str::contains("score:   75.00"))
        .stdout(predicate::str::contains("entries: 0"));
}

#[test]
fn log_fresh_journal() {
    let dir = TempDir::new().unwrap();
    coherence_cmd(&dir)
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("(journal is empty)"));
}

#[test]
fn write_neutral_entry_keeps_baseline() {
    let dir = TempDir::new().unwrap();
    coherence_cmd(&dir)
        .args(["write", "hoje caminhei no parque"])
        .assert()
        .success()
        .stdout(predicate::str::contains("score:   75.00"))
        .stdout(predicate::str::contains("trigger: none"));
}

#[test]
fn write_negative_entry_lowers_score() {
    let dir = TempDir::new().unwrap();
    coherence_cmd(&dir)
        .args(["write", "estou triste e com raiva"])
        .assert()
        .success()
        .stdout(predicate::str::contains("score:   68.33"))
        .stdout(predicate::str::contains("trigger: none"));

    coherence_cmd(&dir)
        .arg("score")
        .assert()
        .success()
        .stdout(predicate::str::contains("score:   68.33"))
        .stdout(predicate::str::contains("entries: 1"));
}

#[test]
fn log_lists_entries_with_sentiment() {
    let dir = TempDir::new().unwrap();
    coherence_cmd(&dir)
        .args(["write", "primeira entrada"])
        .assert()
        .success();
    coherence_cmd(&dir)
        .args(["write", "estou triste"])
        .assert()
        .success();

    let output = coherence_cmd(&dir).arg("log").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" 0  primeira entrada"));
    assert!(lines[1].ends_with("-1  estou triste"));

    coherence_cmd(&dir)
        .args(["log", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("estou triste"))
        .stdout(predicate::str::contains("primeira").not());
}

#[test]
fn import_sharp_drop_fires_dissonance() {
    let dir = TempDir::new().unwrap();
    let path = write_export(&dir, "heavy.json", &[HEAVY, HEAVY]);

    coherence_cmd(&dir)
        .arg("import")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2 entries"))
        .stdout(predicate::str::contains("trigger: dissonance"));
}

#[test]
fn config_file_thresholds_apply() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[engine]\nlow_score_threshold = 80.0\n",
    )
    .unwrap();

    coherence_cmd(&dir)
        .args(["write", "triste"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trigger: suggestion"));
}

#[test]
fn unreachable_generator_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[guidance]\nsource = \"http\"\nfetch_timeout_ms = 2000\n\n\
         [guidance.http]\nurl = \"http://127.0.0.1:9/guidance\"\n",
    )
    .unwrap();
    let path = write_export(&dir, "heavy.json", &[HEAVY, HEAVY]);

    coherence_cmd(&dir)
        .arg("import")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("trigger: none"));
}

#[test]
fn export_import_roundtrip() {
    let source = TempDir::new().unwrap();
    coherence_cmd(&source)
        .args(["write", "manhã tranquila"])
        .assert()
        .success();
    coherence_cmd(&source)
        .args(["write", "tarde cansada"])
        .assert()
        .success();

    let export_path = source.path().join("export.json");
    coherence_cmd(&source)
        .arg("export")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported 2 entries"));

    let target = TempDir::new().unwrap();
    coherence_cmd(&target)
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2 entries"));

    let before = coherence_cmd(&source).arg("log").output().unwrap();
    let after = coherence_cmd(&target).arg("log").output().unwrap();
    assert_eq!(before.stdout, after.stdout);

    // Importing the same file again appends nothing.
    coherence_cmd(&target)
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 0 entries"));
}

#[test]
fn import_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "not json").unwrap();

    coherence_cmd(&dir)
        .arg("import")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to import JSON"));
}

#[test]
fn explicit_journal_path() {
    let dir = TempDir::new().unwrap();
    let journal = dir.path().join("elsewhere").join("mine.db");
    coherence_cmd(&dir)
        .arg("--journal")
        .arg(&journal)
        .args(["write", "triste"])
        .assert()
        .success();
    assert!(journal.exists());

    coherence_cmd(&dir)
        .arg("score")
        .assert()
        .success()
        .stdout(predicate::str::contains("entries: 0"));
}

#[test]
fn config_prints_defaults() {
    let dir = TempDir::new().unwrap();
    coherence_cmd(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("cooldown_ms = 300000"))
        .stdout(predicate::str::contains("drop_threshold = 20.0"))
        .stdout(predicate::str::contains("source = \"canned\""));
}

#[test]
fn session_reads_entries_from_stdin() {
    let dir = TempDir::new().unwrap();
    coherence_cmd(&dir)
        .arg("session")
        .write_stdin("hoje estou bem\n:score\n:nope\n:quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("score: 75.00"))
        .stdout(predicate::str::contains("unknown command :nope"));

    coherence_cmd(&dir)
        .arg("score")
        .assert()
        .success()
        .stdout(predicate::str::contains("entries: 1"));
}
