use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use xzmenu_testing::assertions::{assert_dirs_equal, assert_no_tar_leftovers};
use xzmenu_testing::fixtures::{create_project_tree, create_text_file};
use xzmenu_testing::TestDir;

/// The binary with an empty config file, so the user's own config is ignored
fn xzmenu(test_dir: &TestDir) -> Command {
    let config = test_dir.path().join("config.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }

    let mut cmd = Command::cargo_bin("xzmenu").unwrap();
    cmd.env_remove("XZMENU_XZ")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config);
    cmd
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("xzmenu").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("xzmenu"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("xzmenu").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--builtin"))
        .stdout(predicate::str::contains("--xz"));
}

#[test]
fn test_quit_exits_cleanly() {
    let test_dir = TestDir::new().unwrap();
    xzmenu(&test_dir)
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Choose an operation"))
        .stdout(predicate::str::contains("Goodbye"));
}

#[test]
fn test_invalid_choice_then_quit() {
    let test_dir = TestDir::new().unwrap();
    xzmenu(&test_dir)
        .write_stdin("9\nQUIT\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid choice"))
        .stdout(predicate::str::contains("Goodbye"));

    // Only the config file we wrote; the bad choice touched nothing.
    assert_eq!(fs::read_dir(test_dir.path()).unwrap().count(), 1);
}

#[test]
fn test_closed_stdin_exits_cleanly() {
    let test_dir = TestDir::new().unwrap();
    xzmenu(&test_dir).write_stdin("").assert().success();
}

#[test]
fn test_verbose_enables_debug_logs() {
    let test_dir = TestDir::new().unwrap();
    xzmenu(&test_dir)
        .arg("-v")
        .write_stdin("q\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Menu state"));
}

#[test]
fn test_rust_log_wins_over_verbose() {
    let test_dir = TestDir::new().unwrap();
    xzmenu(&test_dir)
        .env("RUST_LOG", "error")
        .arg("-v")
        .write_stdin("q\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Menu state").not());
}

#[test]
fn test_bad_config_fails_startup() {
    let test_dir = TestDir::new().unwrap();
    fs::write(
        test_dir.path().join("config.toml"),
        "[compressor]\nbackend = \"gzip\"\n",
    )
    .unwrap();

    xzmenu(&test_dir)
        .write_stdin("q\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn test_builtin_file_roundtrip() {
    let test_dir = TestDir::new().unwrap();
    let source = create_text_file(&test_dir, "work/notes.txt").unwrap();
    let original = fs::read(&source).unwrap();
    let work = test_dir.path().join("work");

    // Quoted, as a file manager would paste it.
    xzmenu(&test_dir)
        .arg("--builtin")
        .write_stdin(format!("1\n\"{}\"\n\nq\n", source.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Compressed file saved as"));

    let archive = work.join("notes.tar.xz");
    assert!(archive.exists());
    assert_no_tar_leftovers(&work).unwrap();

    fs::remove_file(&source).unwrap();
    xzmenu(&test_dir)
        .arg("--builtin")
        .write_stdin(format!("3\n{}\n\nq\n", archive.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    assert_eq!(fs::read(&source).unwrap(), original);
    assert!(!archive.exists());
    assert_no_tar_leftovers(&work).unwrap();
}

#[test]
fn test_builtin_directory_roundtrip() {
    let test_dir = TestDir::new().unwrap();
    let source = create_project_tree(&test_dir).unwrap();
    let out = test_dir.path().join("out");

    xzmenu(&test_dir)
        .arg("--builtin")
        .write_stdin(format!(
            "2\n{}\n{}\n\n4\n{}\n\nq\n",
            source.display(),
            out.display(),
            out.join("project.tar.xz").display()
        ))
        .assert()
        .success();

    assert_dirs_equal(&source, &out.join("project")).unwrap();
    assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
}

#[test]
fn test_operation_error_returns_to_menu() {
    let test_dir = TestDir::new().unwrap();
    let bogus = test_dir.path().join("bogus.tar.xz");
    fs::write(&bogus, b"this is not an xz stream").unwrap();

    xzmenu(&test_dir)
        .arg("--builtin")
        .write_stdin(format!("3\n{}\n\n9\nq\n", bogus.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("compression error"))
        .stdout(predicate::str::contains("Invalid choice"))
        .stdout(predicate::str::contains("Goodbye"))
        .stderr(predicate::str::contains("Operation failed").not());

    assert!(bogus.exists());
    assert!(!test_dir.path().join("bogus.tar").exists());
}

#[test]
fn test_missing_xz_binary_is_reported() {
    let test_dir = TestDir::new().unwrap();
    let source = create_text_file(&test_dir, "data.txt").unwrap();

    xzmenu(&test_dir)
        .arg("--xz")
        .arg(test_dir.path().join("no-such-xz"))
        .write_stdin(format!("1\n{}\n\nq\n", source.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("compression process error"));

    assert_no_tar_leftovers(test_dir.path()).unwrap();
    assert!(!test_dir.path().join("data.tar.xz").exists());
}

#[cfg(unix)]
mod external_process {
    use super::*;
    use xzmenu_testing::helpers::{read_invocations, write_failing_compressor, write_fake_compressor};

    #[test]
    fn test_xz_from_environment() {
        let test_dir = TestDir::new().unwrap();
        let bin = test_dir.path().join("bin");
        let script = write_fake_compressor(&bin).unwrap();
        let source = create_text_file(&test_dir, "work/a.log").unwrap();

        xzmenu(&test_dir)
            .env("XZMENU_XZ", &script)
            .write_stdin(format!("1\n{}\n\nq\n", source.display()))
            .assert()
            .success();

        let tar_path = test_dir.path().join("work/a.tar");
        assert_eq!(
            read_invocations(&bin).unwrap(),
            vec![tar_path.display().to_string()]
        );
        assert!(test_dir.path().join("work/a.tar.xz").exists());
        assert!(!tar_path.exists());
    }

    #[test]
    fn test_xz_failure_keeps_menu_running() {
        let test_dir = TestDir::new().unwrap();
        let script = write_failing_compressor(&test_dir.path().join("bin"), 2).unwrap();
        let source = create_text_file(&test_dir, "work/b.log").unwrap();

        xzmenu(&test_dir)
            .arg("--xz")
            .arg(&script)
            .write_stdin(format!("1\n{}\n\nq\n", source.display()))
            .assert()
            .success()
            .stdout(predicate::str::contains("exited with status 2"))
            .stdout(predicate::str::contains("Goodbye"));

        assert_no_tar_leftovers(&test_dir.path().join("work")).unwrap();
    }
}
