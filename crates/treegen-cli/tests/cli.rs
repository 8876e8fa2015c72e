use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const CHAIN: &str = r#"{
  "type": "split", "col": 0, "threshold": 1.0,
  "left": {"type": "leaf", "value": 10.0},
  "right": {
    "type": "split", "col": 1, "threshold": 2.0, "na": "na_left",
    "left": {"type": "leaf", "value": 20.0},
    "right": {
      "type": "split", "col": 2, "equal": "group_large", "categories": [3, 7, 40],
      "left": {"type": "leaf", "value": 30.0},
      "right": {"type": "leaf", "value": 40.0}
    }
  }
}"#;

fn treegen() -> Command {
    Command::cargo_bin("treegen").unwrap()
}

fn write_tree(dir: &Path) -> PathBuf {
    let path = dir.join("tree.json");
    fs::write(&path, CHAIN).unwrap();
    path
}

#[test]
fn test_emit_prints_java_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write_tree(dir.path());

    treegen()
        .arg("emit")
        .arg(&tree)
        .args(["--name", "Chain", "--columns", "age,income,region"])
        .assert()
        .success()
        .stdout(predicate::str::contains("import static java.lang.Double.isNaN;"))
        .stdout(predicate::str::contains("class Chain {"))
        .stdout(predicate::str::contains("data[0] /*age*/ < 1.0f"))
        .stdout(predicate::str::contains(
            "isNaN(data[1]) || data[1] /*income*/ < 2.0f",
        ))
        .stdout(predicate::str::contains("GRPSPLIT0 = new byte[] {"));
}

#[test]
fn test_emit_splits_and_validates_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write_tree(dir.path());
    let out = dir.path().join("Chain.java");

    treegen()
        .arg("emit")
        .arg(&tree)
        .args(["--name", "Chain", "--max-nodes", "1", "--package", "models"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let source = fs::read_to_string(&out).unwrap();
    assert!(source.contains("package models;"));
    assert!(source.contains("Chain_1.score0(data)"));
    assert!(source.contains("class Chain_1 {"));

    treegen()
        .arg("validate")
        .arg(&out)
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"))
        .stdout(predicate::str::contains("forward_calls=1"));
}

#[test]
fn test_emit_split_files_directory() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write_tree(dir.path());
    let out = dir.path().join("classes");

    treegen()
        .arg("emit")
        .arg(&tree)
        .args(["--max-nodes", "1", "--split-files"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("Tree.java").exists());
    assert!(out.join("Tree_1.java").exists());

    treegen().arg("validate").arg(&out).assert().success();
}

#[test]
fn test_emit_json_format() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write_tree(dir.path());

    treegen()
        .arg("emit")
        .arg(&tree)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"GRPSPLIT0\""))
        .stdout(predicate::str::contains("\"score0\""));
}

#[test]
fn test_emit_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write_tree(dir.path());
    let config = dir.path().join("limits.json");
    fs::write(&config, r#"{"limits": {"max_nodes": 0}}"#).unwrap();

    treegen()
        .arg("emit")
        .arg(&tree)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("class Tree_2 {"));
}

#[test]
fn test_encode_then_score_binary() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write_tree(dir.path());
    let bin = dir.path().join("tree.bin");

    treegen()
        .arg("encode")
        .arg(&tree)
        .arg("-o")
        .arg(&bin)
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"));

    treegen()
        .arg("score")
        .arg(&bin)
        .args(["--row", "5,NaN,0", "--check", "--max-nodes", "1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("20\n"))
        .stdout(predicate::str::contains("OK"));

    treegen()
        .arg("score")
        .arg(&bin)
        .args(["--row", "5,3,7.9"])
        .assert()
        .success()
        .stdout("30\n");
}

#[test]
fn test_score_rejects_short_row() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write_tree(dir.path());

    treegen()
        .arg("score")
        .arg(&tree)
        .args(["--row", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Row has 1 features"));
}

#[test]
fn test_trace_prints_callbacks() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write_tree(dir.path());

    treegen()
        .arg("trace")
        .arg(&tree)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pre  0 data[0] < 1 [right]\n"))
        .stdout(predicate::str::contains("data[2] in {3, 7, 40} [right]"))
        .stdout(predicate::str::ends_with("post 0\n"));
}

#[test]
fn test_validate_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bad.java");
    fs::write(&path, "class Bad { double score0(double[] data) { double pred = ; } }").unwrap();

    treegen()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"));
}

#[test]
fn test_corrupt_binary_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.bin");
    fs::write(&path, [0x01, 0x00, 0x02, 0x00, 0x00]).unwrap();

    treegen()
        .arg("emit")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("NA split direction"));
}
