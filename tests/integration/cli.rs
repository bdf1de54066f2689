use assert_cmd::Command;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("javelin")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("start").and(contains("locate")));
}

#[test]
fn start_help_documents_generate_only() {
    Command::cargo_bin("javelin")
        .unwrap()
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(contains("--generate-only").and(contains("--stdin")));
}

#[test]
fn unknown_subcommand_is_rejected() {
    Command::cargo_bin("javelin")
        .unwrap()
        .arg("daemonize")
        .assert()
        .failure();
}

#[test]
fn explicit_missing_config_fails_with_code_one() {
    let temp = tempfile::tempdir().unwrap();
    Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .args(["start", "-c", "missing.yaml"])
        .assert()
        .failure()
        .code(1)
        .stdout(contains("Failed to read config file"));
}
