use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn wsl2_backup() -> Command {
    let mut cmd = Command::cargo_bin("wsl2-backup").unwrap();
    cmd.env_remove("WSL2_BACKUP_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// Write a config whose directories live under `root`
fn write_config(root: &Path, wsl_executable: &str) -> PathBuf {
    let path = root.join("config.toml");
    let contents = format!(
        "BackupPath = '{}'\n\
         AgeOfBackupsToDelete = 30\n\
         MinNumOfBackupsToKeep = 1\n\
         LogPath = '{}'\n\
         AgeOfOldLogFilesToDelete = 7\n\
         WslExecutable = '{}'\n",
        root.join("backups").display(),
        root.join("logs").display(),
        wsl_executable
    );
    std::fs::write(&path, contents).unwrap();
    path
}

fn create_aged_file(dir: &Path, name: &str, days: u64) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, b"data").unwrap();
    let modified = std::time::SystemTime::now() - std::time::Duration::from_secs(days * 86_400);
    let file = std::fs::File::options().write(true).open(&path).unwrap();
    file.set_times(std::fs::FileTimes::new().set_modified(modified))
        .unwrap();
    path
}

// ─── Help & version ──────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    wsl2_backup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("timestamped"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("prune"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("schedule"));
}

#[test]
fn test_version_flag() {
    wsl2_backup()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wsl2-backup"));
}

#[test]
fn test_no_subcommand_shows_help() {
    wsl2_backup()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ─── Fatal configuration errors ──────────────────────────────────────────────

#[test]
fn test_run_without_config_fails() {
    let dir = TempDir::new().unwrap();
    wsl2_backup()
        .args(["run", "--config"])
        .arg(dir.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_run_with_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "wsl.exe");
    let mut contents = std::fs::read_to_string(&config).unwrap();
    contents.push_str("BackupPaht = 'typo'\n");
    std::fs::write(&config, contents).unwrap();

    wsl2_backup()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));
}

#[test]
fn test_config_from_env_var() {
    let dir = TempDir::new().unwrap();
    wsl2_backup()
        .arg("list")
        .env("WSL2_BACKUP_CONFIG", dir.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

// ─── Enumeration failure ─────────────────────────────────────────────────────

#[test]
fn test_run_with_missing_wsl_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "/nonexistent/wsl-xyz123");

    wsl2_backup()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to enumerate WSL instances"));

    assert!(!dir.path().join("backups").exists());
}

#[test]
fn test_fatal_error_printed_once_and_kept_in_transcript() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "/nonexistent/wsl-xyz123");

    let output = wsl2_backup()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&output);
    assert_eq!(stderr.matches("Failed to enumerate WSL instances").count(), 1);

    let logs = dir.path().join("logs");
    let transcript = std::fs::read_dir(&logs).unwrap().next().unwrap().unwrap().path();
    let contents = std::fs::read_to_string(transcript).unwrap();
    assert!(contents.contains("Backup aborted: Failed to enumerate WSL instances"));
}

#[test]
fn test_list_with_missing_wsl_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "/nonexistent/wsl-xyz123");

    wsl2_backup()
        .arg("list")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("wsl-xyz123"));
}

// ─── Prune command ───────────────────────────────────────────────────────────

#[test]
fn test_prune_dry_run_keeps_files() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "wsl.exe");
    let backups = dir.path().join("backups");
    let old = create_aged_file(&backups, "WSL2 Backup - Ubuntu 2020-01-01-03-00.tar", 90);
    create_aged_file(&backups, "WSL2 Backup - Ubuntu 2020-02-01-03-00.tar", 60);

    wsl2_backup()
        .args(["prune", "--backups", "--dry-run", "--no-color"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Would delete"))
        .stdout(predicate::str::contains("2020-01-01-03-00"));

    assert!(old.exists());
    assert!(!dir.path().join("logs").exists(), "dry run writes no transcript");
}

#[test]
fn test_prune_deletes_and_reports_json() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "wsl.exe");
    let backups = dir.path().join("backups");
    let old = create_aged_file(&backups, "WSL2 Backup - Ubuntu 2020-01-01-03-00.tar", 90);
    let kept = create_aged_file(&backups, "WSL2 Backup - Ubuntu 2020-02-01-03-00.tar", 60);
    let old_log = create_aged_file(&dir.path().join("logs"), "Transcript-2020-01-01.txt", 30);

    let output = wsl2_backup()
        .args(["prune", "--format", "json"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["backup_prune"]["deleted"].as_array().unwrap().len(), 1);
    assert_eq!(json["backup_prune"]["protected"], 1);
    assert_eq!(json["log_prune"]["deleted"].as_array().unwrap().len(), 1);

    assert!(!old.exists());
    assert!(kept.exists(), "newest archive is protected by the floor");
    assert!(!old_log.exists());
}

#[test]
fn test_prune_missing_backup_dir_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "wsl.exe");

    wsl2_backup()
        .args(["prune", "--backups", "--no-color"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Path not found"));
}

// ─── Config command ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.toml");

    wsl2_backup()
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));
    assert!(config.exists());

    wsl2_backup()
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("MinNumOfBackupsToKeep"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "wsl.exe");

    wsl2_backup()
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    wsl2_backup()
        .args(["config", "init", "--force", "--config"])
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn test_config_path() {
    wsl2_backup()
        .args(["config", "path", "--config", "/tmp/somewhere/config.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/somewhere/config.toml"));
}

// ─── Schedule command ────────────────────────────────────────────────────────

#[test]
fn test_schedule_prints_schtasks_command() {
    wsl2_backup()
        .args(["schedule", "--time", "02:15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("schtasks.exe /Create /SC DAILY"))
        .stdout(predicate::str::contains("/ST 02:15"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_schedule_rejects_bad_time() {
    wsl2_backup()
        .args(["schedule", "--time", "25:99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time"));
}

#[test]
fn test_completions() {
    wsl2_backup()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wsl2-backup"));
}
