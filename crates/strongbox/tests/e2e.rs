// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the `strongbox` binary.
//!
//! Each test writes its own config into a temp directory and passes the
//! passphrases through the environment, so no terminal is needed.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

struct Vault {
    dir: TempDir,
    config: PathBuf,
}

impl Vault {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("strongbox.toml");
        let db = dir.path().join("vault.db");
        std::fs::write(
            &config,
            format!(
                "[general]\nvault_name = \"e2e\"\nlog_level = \"warn\"\n\n\
                 [storage]\ndatabase_path = \"{}\"\n\n\
                 [vault]\nkdf_memory_cost = 32768\nkdf_iterations = 2\nkdf_parallelism = 1\n",
                db.display()
            ),
        )
        .unwrap();
        Self { dir, config }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str], passphrase: &str, new_passphrase: &str, stdin: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_strongbox"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .current_dir(self.dir.path())
            .env("STRONGBOX_PASSPHRASE", passphrase)
            .env("STRONGBOX_NEW_PASSPHRASE", new_passphrase)
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(stdin.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn init_add_show_rotate_show() {
    let vault = Vault::new();

    let out = vault.run(&["init"], "", "", "");
    // `init` takes the new passphrase from STRONGBOX_PASSPHRASE.
    assert!(!out.status.success());
    let out = vault.run(&["init"], "alpha", "", "");
    assert!(out.status.success(), "{}", stderr(&out));

    let out = vault.run(&["add", "smtp"], "alpha", "", "mail-secret\n");
    assert!(out.status.success(), "{}", stderr(&out));
    let out = vault.run(&["update", "smtp"], "alpha", "", "mail-secret-2\n");
    assert!(out.status.success(), "{}", stderr(&out));

    let out = vault.run(&["show", "smtp"], "alpha", "", "");
    assert_eq!(stdout(&out).trim_end(), "mail-secret-2");

    let report = vault.path("report.json");
    let out = vault.run(
        &["rotate", "--report", report.to_str().unwrap()],
        "alpha",
        "beta",
        "",
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("New master passphrase is now active."));

    let json = read_json(&report);
    assert_eq!(json["commit"], "committed");
    assert_eq!(json["report"]["total"], 2);
    assert_eq!(json["notification"]["subject"], "[e2e] master passphrase rotation succeeded");

    let out = vault.run(&["show", "smtp"], "beta", "", "");
    assert_eq!(stdout(&out).trim_end(), "mail-secret-2");
    let out = vault.run(&["show", "smtp"], "alpha", "", "");
    assert!(!out.status.success());

    let out = vault.run(&["history", "smtp"], "", "", "");
    assert!(stdout(&out).contains("modified"));
}

#[test]
fn rotate_with_wrong_passphrase_changes_nothing() {
    let vault = Vault::new();
    assert!(vault.run(&["init"], "alpha", "", "").status.success());
    assert!(vault.run(&["add", "db"], "alpha", "", "pw").status.success());

    let out = vault.run(&["rotate"], "wrong", "beta", "");
    assert!(!out.status.success());
    assert!(stderr(&out).contains("incorrect current master passphrase"));

    let out = vault.run(&["show", "db"], "alpha", "", "");
    assert_eq!(stdout(&out).trim_end(), "pw");
}

#[test]
fn demo_rotation_keeps_the_old_passphrase() {
    let vault = Vault::new();
    assert!(vault.run(&["init"], "alpha", "", "").status.success());
    assert!(vault.run(&["add", "db"], "alpha", "", "pw").status.success());

    let report = vault.path("demo.json");
    let out = vault.run(
        &["rotate", "--demo", "--report", report.to_str().unwrap()],
        "alpha",
        "beta",
        "",
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(read_json(&report)["commit"], "withheld");
    assert_eq!(read_json(&report)["report"]["demo"], true);

    let out = vault.run(&["show", "db"], "alpha", "", "");
    assert_eq!(stdout(&out).trim_end(), "pw");
}

#[test]
fn invalid_config_is_reported() {
    let vault = Vault::new();
    std::fs::write(&vault.config, "[rotation]\nflush_evry = 3\n").unwrap();
    let out = vault.run(&["list"], "", "", "");
    assert!(!out.status.success());
}
