#![cfg(unix)]

#[path = "common/mod.rs"]
mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use common::write_fake_jvm;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::tempdir;

fn write_workspace(dir: &Path, config_body: &str) {
    fs::write(dir.join("server.jar"), b"").unwrap();
    fs::create_dir_all(dir.join("libs")).unwrap();
    fs::write(dir.join("libs").join("dep.jar"), b"").unwrap();
    fs::write(dir.join("javelin.yaml"), config_body).unwrap();
}

const CONFIG: &str = r#"
runtime:
  version: "99"
  preferred: "Fake"
launch:
  app_jar: server.jar
  lib_dir: libs
  main_class: com.example.server.Main
  max_memory: 2G
  properties:
    - server.port=19132
  args:
    - --nogui
"#;

#[test]
fn generate_only_prints_the_full_command() {
    let temp = tempdir().unwrap();
    let home = temp.path().join("fake-jdk");
    write_fake_jvm(&home, "99.0.1", "Fake");
    write_workspace(temp.path(), CONFIG);

    Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .env("JAVA_HOME", &home)
        .args(["start", "-c", "javelin.yaml", "--generate-only"])
        .assert()
        .success()
        .stdout(
            contains(home.join("bin").join("java").display().to_string())
                .and(contains("-Xmx2G"))
                .and(contains("-Dserver.port=19132"))
                .and(contains("-XX:+UseZGC"))
                .and(contains("--add-opens java.base/java.lang=ALL-UNNAMED"))
                .and(contains("-cp server.jar:libs/* com.example.server.Main --nogui")),
        );
}

#[test]
fn start_executes_the_discovered_runtime() {
    let temp = tempdir().unwrap();
    let home = temp.path().join("fake-jdk");
    write_fake_jvm(&home, "99.0.1", "Fake");
    write_workspace(temp.path(), CONFIG);

    // The fake JVM exits 0 immediately, so a single supervised launch
    // finishes cleanly.
    Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .env("JAVA_HOME", &home)
        .args(["start", "-c", "javelin.yaml"])
        .assert()
        .success();
}

#[test]
fn missing_app_jar_is_fatal() {
    let temp = tempdir().unwrap();
    let home = temp.path().join("fake-jdk");
    write_fake_jvm(&home, "99.0.1", "Fake");
    write_workspace(temp.path(), CONFIG);
    fs::remove_file(temp.path().join("server.jar")).unwrap();

    Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .env("JAVA_HOME", &home)
        .args(["start", "-c", "javelin.yaml"])
        .assert()
        .failure()
        .code(1)
        .stdout(contains("Application jar not found"));
}

#[test]
fn empty_library_directory_is_fatal() {
    let temp = tempdir().unwrap();
    let home = temp.path().join("fake-jdk");
    write_fake_jvm(&home, "99.0.1", "Fake");
    write_workspace(temp.path(), CONFIG);
    fs::remove_file(temp.path().join("libs").join("dep.jar")).unwrap();

    Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .env("JAVA_HOME", &home)
        .args(["start", "-c", "javelin.yaml"])
        .assert()
        .failure()
        .code(1)
        .stdout(contains("missing or contains no jars"));
}

#[test]
fn missing_main_class_is_fatal() {
    let temp = tempdir().unwrap();
    let home = temp.path().join("fake-jdk");
    write_fake_jvm(&home, "99.0.1", "Fake");
    write_workspace(
        temp.path(),
        r#"
runtime:
  version: "99"
launch:
  app_jar: server.jar
  lib_dir: libs
"#,
    );

    Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .env("JAVA_HOME", &home)
        .args(["start", "-c", "javelin.yaml"])
        .assert()
        .failure()
        .code(1)
        .stdout(contains("No main class configured"));
}

#[test]
fn no_matching_runtime_is_fatal() {
    let temp = tempdir().unwrap();
    write_workspace(
        temp.path(),
        r#"
runtime:
  version: "940"
launch:
  app_jar: server.jar
  lib_dir: libs
  main_class: com.example.server.Main
"#,
    );

    Command::cargo_bin("javelin")
        .unwrap()
        .current_dir(temp.path())
        .args(["start", "-c", "javelin.yaml"])
        .assert()
        .failure()
        .code(1)
        .stdout(contains("No usable Java runtime found"));
}
