use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::File::create(&path)
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
}

/// Minimal stub library plus a small project; returns the temp root.
fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "pylib/torch/__init__.py",
        "def zeros(n):\n    return LibCall.torch.zeros(n)\n",
    );
    write_file(dir.path(), "pylib/LibCall.py", "def torch():\n    pass\n");
    write_file(
        dir.path(),
        "proj/main.py",
        "import torch\nt = torch.zeros(4)\n",
    );
    dir
}

#[test]
fn test_no_args() {
    cargo_bin_cmd!("pyir")
        .assert()
        .failure()
        .stderr(predicate::str::contains("entryPath is required"));
}

#[test]
fn test_help() {
    cargo_bin_cmd!("pyir")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("shape-analysis IR"));
}

#[test]
fn test_missing_entry_exits_with_config_code() {
    let dir = sample_tree();
    let missing = dir.path().join("proj/absent.py");

    cargo_bin_cmd!("pyir")
        .args([
            missing.to_str().unwrap(),
            "--lib-path",
            dir.path().join("pylib").to_str().unwrap(),
        ])
        .assert()
        .code(3);
}

#[test]
fn test_unknown_flag() {
    cargo_bin_cmd!("pyir")
        .arg("--unknown-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn test_lowers_project_and_reports_entry() {
    let dir = sample_tree();

    cargo_bin_cmd!("pyir")
        .args([
            dir.path().join("proj/main.py").to_str().unwrap(),
            "--lib-path",
            dir.path().join("pylib").to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "entry main (1 library, 1 project modules)",
        ));
}

#[test]
fn test_extract_ir_dumps_modules() {
    let dir = sample_tree();

    cargo_bin_cmd!("pyir")
        .args([
            dir.path().join("proj/main.py").to_str().unwrap(),
            "--lib-path",
            dir.path().join("pylib").to_str().unwrap(),
            "--extract-ir",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("# module torch"))
        .stdout(predicate::str::contains("# module main"))
        .stdout(predicate::str::contains("LibCall.importQualified"))
        .stdout(predicate::str::contains("LibCall.explicit"));
}

#[test]
fn test_skipped_files_exit_code() {
    let dir = sample_tree();
    write_file(dir.path(), "proj/broken.py", "def f(:\n");

    cargo_bin_cmd!("pyir")
        .args([
            dir.path().join("proj/main.py").to_str().unwrap(),
            "--lib-path",
            dir.path().join("pylib").to_str().unwrap(),
        ])
        .assert()
        .code(1);
}

#[test]
fn test_bad_config_file() {
    let dir = sample_tree();
    write_file(dir.path(), "cfg.json", "{\"entryPath\": ");

    cargo_bin_cmd!("pyir")
        .args(["--config", dir.path().join("cfg.json").to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("bad config"));
}

#[test]
fn test_config_file_supplies_paths() {
    let dir = sample_tree();
    let config = format!(
        "{{\"entryPath\": {:?}, \"libPath\": {:?}}}",
        dir.path().join("proj/main.py").to_str().unwrap(),
        dir.path().join("pylib").to_str().unwrap(),
    );
    write_file(dir.path(), "cfg.json", &config);

    cargo_bin_cmd!("pyir")
        .args(["--config", dir.path().join("cfg.json").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("entry main"));
}
