use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::exporter::CommandRunner;

pub const DEFAULT_TASK_NAME: &str = "WSL2 Backup";
pub const DEFAULT_TIME: &str = "03:00";
pub const SCHTASKS: &str = "schtasks.exe";

/// A daily Windows Task Scheduler entry that runs `wsl2-backup run`
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub name: String,
    pub time: NaiveTime,
    pub executable: PathBuf,
    pub config: Option<PathBuf>,
}

impl ScheduledTask {
    pub fn new(name: &str, time: &str, config: Option<PathBuf>) -> Result<Self> {
        let executable = std::env::current_exe()
            .unwrap_or_else(|_| PathBuf::from("wsl2-backup.exe"));
        Ok(Self {
            name: name.to_string(),
            time: parse_time(time)?,
            executable,
            config,
        })
    }

    /// Command line the scheduler runs (the `/TR` value)
    pub fn task_command(&self) -> String {
        let mut command = format!("\"{}\" run", self.executable.display());
        if let Some(config) = &self.config {
            command.push_str(&format!(" --config \"{}\"", config.display()));
        }
        command
    }

    /// Arguments for `schtasks.exe`; `/F` replaces an existing task
    pub fn schtasks_args(&self) -> Vec<String> {
        vec![
            "/Create".to_string(),
            "/SC".to_string(),
            "DAILY".to_string(),
            "/TN".to_string(),
            self.name.clone(),
            "/TR".to_string(),
            self.task_command(),
            "/ST".to_string(),
            self.time.format("%H:%M").to_string(),
            "/F".to_string(),
        ]
    }

    /// The `schtasks.exe` invocation as it would be typed in a shell
    pub fn display_command(&self) -> String {
        let mut line = SCHTASKS.to_string();
        for arg in self.schtasks_args() {
            line.push(' ');
            if arg.contains(' ') || arg.contains('"') {
                line.push_str(&format!("\"{}\"", arg.replace('"', "\\\"")));
            } else {
                line.push_str(&arg);
            }
        }
        line
    }

    /// Register the task
    pub fn install<R: CommandRunner>(&self, runner: &R) -> Result<()> {
        let args = self.schtasks_args();
        let args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();
        let output = runner
            .run(SCHTASKS, &args)
            .with_context(|| format!("Failed to run {}", SCHTASKS))?;
        if !output.success {
            anyhow::bail!(
                "{} failed to create task '{}': {}",
                SCHTASKS,
                self.name,
                output.failure_message()
            );
        }
        Ok(())
    }
}

/// Parse `HH:MM` (24-hour)
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .with_context(|| format!("Invalid time '{}', expected HH:MM", s))
}
