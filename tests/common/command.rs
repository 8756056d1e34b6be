use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_bitlet_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_bitlet_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bitlet").expect("Failed to find bitlet binary");
    cmd.env("BITLET_COMMIT_DATE", COMMIT_DATE);
    cmd.env_remove("BITLET_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn bitlet_commit(dir: &Path, message: &str) -> Command {
    run_bitlet_command(dir, &["commit", "-m", message])
}

/// Stage and commit a single file with the given content
pub fn commit_file(dir: &Path, file_name: &str, content: &str, message: &str) {
    std::fs::write(dir.join(file_name), content)
        .unwrap_or_else(|e| panic!("Failed to write file {}: {}", file_name, e));
    run_bitlet_command(dir, &["add", file_name])
        .assert()
        .success();
    bitlet_commit(dir, message).assert().success();
}

pub fn stdout_of(mut cmd: Command) -> String {
    let output = cmd.output().expect("Failed to run bitlet");
    assert!(
        output.status.success(),
        "bitlet failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("Output is not valid UTF-8")
}

pub fn current_branch(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".bitlet").join("HEAD"))
        .expect("Failed to read HEAD")
        .trim()
        .to_string()
}

pub fn branch_commit_id(dir: &Path, branch: &str) -> String {
    std::fs::read_to_string(dir.join(".bitlet").join("branches").join(branch))
        .expect("Failed to read branch")
        .trim()
        .to_string()
}

pub fn head_commit_id(dir: &Path) -> String {
    branch_commit_id(dir, &current_branch(dir))
}
