use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::tempdir;

fn sprintboard() -> Command {
    let mut cmd = Command::cargo_bin("sprintboard").unwrap();
    cmd.env_remove("SPRINTBOARD_FILE")
        .env_remove("SPRINTBOARD_DEBUG_LOG")
        .env_remove("SPRINTBOARD_PASSWORD");
    cmd
}

fn parse_json_output(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("Failed to parse JSON output")
}

fn run_ok(file: &Path, args: &[&str]) -> Value {
    let output = sprintboard()
        .arg("--file")
        .arg(file)
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    parse_json_output(&output)
}

fn run_err(file: &Path, args: &[&str]) -> Value {
    let output = sprintboard()
        .arg("--file")
        .arg(file)
        .args(args)
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&output);
    let last = stderr.lines().last().expect("no error output");
    serde_json::from_str(last).expect("Failed to parse JSON error")
}

fn stored_password_hash(file: &Path, username: &str) -> String {
    let body: Value = serde_json::from_slice(&std::fs::read(file).unwrap()).unwrap();
    body["data"]["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == username)
        .map(|u| u["password_hash"].as_str().unwrap().to_string())
        .expect("user not stored")
}

fn add_alice(file: &Path) -> Value {
    run_ok(
        file,
        &[
            "user",
            "add",
            "--username",
            "alice",
            "--password",
            "secret",
            "--full-name",
            "Alice Doe",
        ],
    )
}

mod user_tests {
    use super::*;

    #[test]
    fn test_user_add_prints_token() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        let json = add_alice(&file);

        assert!(json["success"].as_bool().unwrap());
        assert_eq!(json["data"]["username"], "alice");
        assert_eq!(json["data"]["full_name"], "Alice Doe");
        assert_eq!(json["data"]["is_active"], true);
        assert_eq!(json["data"]["token"].as_str().unwrap().len(), 32);
        assert!(json["data"].get("password_hash").is_none());
        assert!(file.exists());
    }

    #[test]
    fn test_user_add_duplicate_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        add_alice(&file);

        let json = run_err(
            &file,
            &["user", "add", "--username", "alice", "--password", "x"],
        );

        assert_eq!(json["success"], false);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("A user with that username already exists."));
    }

    #[test]
    fn test_user_list_and_get() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        run_ok(
            &file,
            &["user", "add", "--username", "zed", "--password", "pw"],
        );
        add_alice(&file);

        let json = run_ok(&file, &["user", "list"]);
        assert_eq!(json["data"]["count"], 2);
        assert_eq!(json["data"]["items"][0]["username"], "alice");
        assert_eq!(json["data"]["items"][1]["username"], "zed");
        assert!(json["data"]["items"][0].get("token").is_none());

        let json = run_ok(&file, &["user", "get", "--username", "zed"]);
        assert_eq!(json["data"]["username"], "zed");
    }

    #[test]
    fn test_user_get_unknown_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        let json = run_err(&file, &["user", "get", "--username", "ghost"]);

        assert_eq!(json["error"], "User not found: ghost");
    }

    #[test]
    fn test_user_deactivate_and_activate() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        add_alice(&file);

        let json = run_ok(&file, &["user", "deactivate", "--username", "alice"]);
        assert_eq!(json["data"]["is_active"], false);

        let json = run_ok(&file, &["user", "get", "--username", "alice"]);
        assert_eq!(json["data"]["is_active"], false);

        let json = run_ok(&file, &["user", "activate", "--username", "alice"]);
        assert_eq!(json["data"]["is_active"], true);
    }

    #[test]
    fn test_user_token_rotation() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        let created = add_alice(&file);

        let json = run_ok(&file, &["user", "token", "--username", "alice"]);

        assert_ne!(json["data"]["token"], created["data"]["token"]);
    }

    #[test]
    fn test_user_remove() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        add_alice(&file);

        let json = run_ok(&file, &["user", "remove", "--username", "alice"]);
        assert_eq!(json["data"]["deleted"], "alice");

        let json = run_ok(&file, &["user", "list"]);
        assert_eq!(json["data"]["count"], 0);
    }

    #[test]
    fn test_user_add_blank_username_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        let json = run_err(
            &file,
            &["user", "add", "--username", "  ", "--password", "pw"],
        );

        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Enter a valid username."));
    }

    #[test]
    fn test_user_add_rejects_url_unsafe_username() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        for username in ["two words", "a/b", "x?y"] {
            let json = run_err(
                &file,
                &["user", "add", "--username", username, "--password", "pw"],
            );
            assert!(json["error"]
                .as_str()
                .unwrap()
                .contains("@/./+/-/_"));
        }
        assert!(!file.exists());
    }

    #[test]
    fn test_user_add_password_from_env() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        sprintboard()
            .arg("--file")
            .arg(&file)
            .env("SPRINTBOARD_PASSWORD", "from-env")
            .args(["user", "add", "--username", "erin"])
            .assert()
            .success();

        assert!(stored_password_hash(&file, "erin").starts_with("$argon2id$"));
    }

    #[test]
    fn test_user_add_password_from_stdin() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        let output = sprintboard()
            .arg("--file")
            .arg(&file)
            .args(["user", "add", "--username", "frank", "--password-stdin"])
            .write_stdin("piped-secret\n")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        assert_eq!(parse_json_output(&output)["data"]["username"], "frank");
        assert!(stored_password_hash(&file, "frank").starts_with("$argon2id$"));
    }

    #[test]
    fn test_user_add_without_password_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        let json = run_err(&file, &["user", "add", "--username", "gina"]);

        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("A password is required"));
    }

    #[test]
    fn test_user_add_blank_stdin_password_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        let output = sprintboard()
            .arg("--file")
            .arg(&file)
            .args(["user", "add", "--username", "hal", "--password-stdin"])
            .write_stdin("\n")
            .assert()
            .failure()
            .get_output()
            .stderr
            .clone();

        assert!(String::from_utf8_lossy(&output).contains("Password may not be blank."));
    }

    #[test]
    fn test_user_passwd_replaces_hash() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        add_alice(&file);
        let before = stored_password_hash(&file, "alice");

        let output = sprintboard()
            .arg("--file")
            .arg(&file)
            .args(["user", "passwd", "--username", "alice", "--password-stdin"])
            .write_stdin("rotated\n")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&output);

        assert_eq!(json["data"]["username"], "alice");
        assert!(json["data"].get("token").is_none());
        let after = stored_password_hash(&file, "alice");
        assert_ne!(before, after);
        assert!(after.starts_with("$argon2id$"));
    }

    #[test]
    fn test_user_passwd_unknown_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        let json = run_err(
            &file,
            &["user", "passwd", "--username", "ghost", "--password", "pw"],
        );

        assert_eq!(json["error"], "User not found: ghost");
    }
}

mod env_tests {
    use super::*;

    #[test]
    fn test_file_from_env() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("env-board.json");

        sprintboard()
            .env("SPRINTBOARD_FILE", &file)
            .args(["user", "add", "--username", "bob", "--password", "pw"])
            .assert()
            .success();

        let json = run_ok(&file, &["user", "get", "--username", "bob"]);
        assert_eq!(json["data"]["username"], "bob");
    }

    #[cfg(not(feature = "sqlite"))]
    #[test]
    fn test_sqlite_backend_requires_feature() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.db");

        let json = run_err(&file, &["--backend", "sqlite", "user", "list"]);

        assert!(json["error"].as_str().unwrap().contains("--features sqlite"));
    }

    #[test]
    fn test_corrupt_file_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        std::fs::write(&file, "{ not json").unwrap();

        let json = run_err(&file, &["user", "list"]);

        assert_eq!(json["success"], false);
    }
}

mod completions_tests {
    use super::*;

    #[test]
    fn test_bash_completions() {
        sprintboard()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("sprintboard"));
    }

    #[test]
    fn test_unknown_command() {
        sprintboard()
            .arg("frobnicate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("unrecognized subcommand"));
    }
}
