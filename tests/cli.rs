use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn lexirank(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lexirank").unwrap();
    // keep the user's own config out of the run
    cmd.env("LEXIRANK_CONFIG", dir.join("missing-config.json"))
        .env("RUST_LOG", "warn")
        .current_dir(dir);
    cmd
}

fn write_fixtures(dir: &Path) {
    fs::write(
        dir.join("cefr.csv"),
        "word,cefr\ncat,A1\nact,A1\ngarden,A2\nox,A1\n",
    )
    .unwrap();
    fs::write(
        dir.join("counts.csv"),
        "word,count\ncat,500\nact,500\ngarden,120\n",
    )
    .unwrap();
}

#[test]
fn build_writes_outputs() {
    let dir = tempdir().unwrap();
    write_fixtures(dir.path());

    lexirank(dir.path())
        .args(["build", "--input", "cefr.csv", "--frequency", "counts.csv", "--out-dir", "dist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("words_ranked.csv (3 rows)"))
        .stdout(predicate::str::contains("words.db"));

    let csv = fs::read_to_string(dir.path().join("dist/words_ranked.csv")).unwrap();
    assert!(csv.starts_with("word,zipf,cefr_norm,is_easy,length,difficulty,level\n"));
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn build_fails_on_missing_input() {
    let dir = tempdir().unwrap();
    write_fixtures(dir.path());

    lexirank(dir.path())
        .args(["build", "--input", "nope.csv", "--frequency", "counts.csv", "--out-dir", "dist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.csv"));

    assert!(!dir.path().join("dist").exists());
}

#[test]
fn puzzle_prints_json() {
    let dir = tempdir().unwrap();
    write_fixtures(dir.path());
    lexirank(dir.path())
        .args(["build", "-i", "cefr.csv", "-f", "counts.csv", "-o", "dist"])
        .assert()
        .success();

    let csv = fs::read_to_string(dir.path().join("dist/words_ranked.csv")).unwrap();
    let cat_level = csv
        .lines()
        .find(|l| l.starts_with("cat,"))
        .and_then(|l| l.rsplit(',').next())
        .unwrap()
        .to_string();

    let output = lexirank(dir.path())
        .args(["puzzle", &cat_level, "--db", "dist/words.db"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let puzzle: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(puzzle["letters"], serde_json::json!(["A", "C", "T"]));
    assert_eq!(puzzle["words"].as_array().unwrap().len(), 2);
}

#[test]
fn puzzle_rejects_out_of_range_level() {
    let dir = tempdir().unwrap();
    write_fixtures(dir.path());
    lexirank(dir.path())
        .args(["build", "-i", "cefr.csv", "-f", "counts.csv", "-o", "dist"])
        .assert()
        .success();

    lexirank(dir.path())
        .args(["puzzle", "51", "--db", "dist/words.db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("level must be between 1 and 50"));
}

#[test]
fn puzzle_needs_a_database() {
    let dir = tempdir().unwrap();
    lexirank(dir.path())
        .args(["puzzle", "1", "--db", "absent.db"])
        .assert()
        .failure();
}
