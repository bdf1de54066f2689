#![cfg(unix)]

#[path = "common/mod.rs"]
mod common;

use assert_cmd::Command;
use common::write_fake_jvm;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn locate_lists_fake_jvm_from_java_home() {
    let temp = tempdir().unwrap();
    let home = temp.path().join("fake-jdk");
    write_fake_jvm(&home, "99.0.1", "Fake Temurin");

    // Major 99 keeps any real host JVM out of the listing.
    Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .env("JAVA_HOME", &home)
        .args(["locate", "--version", "99"])
        .assert()
        .success()
        .stdout(
            contains("99.0.1")
                .and(contains("Fake Temurin"))
                .and(contains(home.join("bin").join("java").display().to_string())),
        );
}

#[test]
fn locate_fails_when_nothing_matches() {
    let temp = tempdir().unwrap();
    let home = temp.path().join("fake-jdk");
    write_fake_jvm(&home, "99.0.1", "Fake Temurin");

    Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .env("JAVA_HOME", &home)
        .args(["locate", "--version", "940"])
        .assert()
        .failure()
        .code(1)
        .stdout(contains("No usable Java runtime found"));
}

#[test]
fn preferred_vendor_leads_the_listing() {
    let temp = tempdir().unwrap();
    let graal = temp.path().join("fake-graal");
    let temurin = temp.path().join("fake-temurin");
    write_fake_jvm(&graal, "99.0.1", "Oracle GraalVM");
    write_fake_jvm(&temurin, "99.0.2", "Fake Temurin");

    let output = Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .env("JAVA_HOME", &temurin)
        .env("GRAALVM_HOME", &graal)
        .args(["locate", "--version", "99", "--prefer", "GraalVM"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let graal_at = stdout.find("Oracle GraalVM").expect("GraalVM listed");
    let temurin_at = stdout.find("Fake Temurin").expect("Temurin listed");
    assert!(graal_at < temurin_at, "preferred vendor should lead:\n{stdout}");
}
