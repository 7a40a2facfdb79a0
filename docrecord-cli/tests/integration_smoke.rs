//! Smoke tests for the docrecord binary against the in-memory backend

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the caller's environment: fresh HOME and working
/// directory (no stray .env or config), no DOCRECORD_URL.
fn docrecord(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docrecord").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("DOCRECORD_URL")
        .env_remove("RUST_LOG");
    cmd
}

// === Help ===

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("get-all"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_update_help() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["update", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Create the record if it does not exist"));
}

// === Record commands ===

#[test]
fn test_create_with_id() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "memory://smoke", "create", "users", r#"{"_id": 7, "name": "Jane"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""_id": 7"#))
        .stdout(predicate::str::contains(r#""name": "Jane""#));
}

#[test]
fn test_create_generates_id() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "memory://smoke", "create", "users", r#"{"name": "No Id"}"#])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r#""_id": "[0-9a-f-]{36}""#).unwrap());
}

#[test]
fn test_create_rejects_non_object() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "memory://smoke", "create", "users", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON object"));
}

#[test]
fn test_get_missing_record_fails() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "memory://smoke", "get", "users", "23"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("The record 23 in users does not exist."));
}

#[test]
fn test_get_all_empty_collection() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "memory://smoke", "get-all", "users"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_get_all_ndjson_empty_collection() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "memory://smoke", "get-all", "users", "--format", "ndjson"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_update_missing_without_upsert_fails() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "memory://smoke", "update", "users", "ghost", r#"{"name": "x"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("The record ghost in users does not exist."));
}

#[test]
fn test_update_with_upsert_creates() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args([
            "--url",
            "memory://smoke",
            "update",
            "users",
            "ghost",
            r#"{"name": "Upserted"}"#,
            "--upsert",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""_id": "ghost""#))
        .stdout(predicate::str::contains(r#""name": "Upserted""#));
}

#[test]
fn test_delete_missing_prints_false() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "memory://smoke", "delete", "users", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::diff("false\n"));
}

#[test]
fn test_url_from_environment() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .env("DOCRECORD_URL", "memory://from-env")
        .args(["get-all", "users"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_url_from_dotenv_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(".env"), "DOCRECORD_URL=memory://dotenv\n").unwrap();
    docrecord(&home)
        .args(["delete", "users", "1"])
        .assert()
        .success()
        .stdout(predicate::str::diff("false\n"));
}

// === Connection string errors ===

#[test]
fn test_missing_connection_string() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["get-all", "users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No connection string"));
}

#[test]
fn test_malformed_connection_string() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "localhost:27017", "get-all", "users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("connection string is invalid"));
}

#[test]
fn test_unsupported_scheme() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "redis://localhost", "get-all", "users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported connection scheme"));
}

// === Config ===

#[test]
fn test_config_path_override() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom.toml");
    docrecord(&home)
        .arg("config")
        .arg("path")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_file_supplies_connection_string() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("docrecord.toml");
    std::fs::write(
        &path,
        "connection_string = \"memory://from-config\"\n\n[options]\nconnect_timeout_ms = 5000\n",
    )
    .unwrap();

    docrecord(&home)
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("connect_timeout_ms = 5000"))
        .stdout(predicate::str::contains("# effective connection: memory://from-config"));

    docrecord(&home)
        .arg("--config")
        .arg(&path)
        .args(["get-all", "users"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_default_config_file_is_read() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".docrecord");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "connection_string = \"memory://home\"\n").unwrap();

    docrecord(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# effective connection: memory://home"));

    docrecord(&home)
        .args(["delete", "users", "1"])
        .assert()
        .success()
        .stdout(predicate::str::diff("false\n"));
}

#[test]
fn test_config_show_redacts_password() {
    let home = TempDir::new().unwrap();
    docrecord(&home)
        .args(["--url", "mongodb://admin:hunter2@db/app", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("admin:****@db"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_invalid_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("broken.toml");
    std::fs::write(&path, "connection_string = \n").unwrap();

    docrecord(&home)
        .arg("--config")
        .arg(&path)
        .args(["get-all", "users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid TOML"));
}
