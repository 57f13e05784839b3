//! Startup failures exit non-zero before binding.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn missing_config_file_fails() {
    Command::cargo_bin("relay_api_server")
        .expect("binary")
        .args(["--port", "0", "--config", "/definitely/not/here.yaml"])
        .env_remove("OPENAI_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn invalid_config_values_fail() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "generation:\n  temperature: 9.5").expect("write");

    Command::cargo_bin("relay_api_server")
        .expect("binary")
        .arg("--port")
        .arg("0")
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("temperature"));
}

#[test]
fn help_lists_flags() {
    Command::cargo_bin("relay_api_server")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--api-key"))
        .stdout(predicate::str::contains("--config"));
}
