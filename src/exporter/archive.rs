use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::instances::InstanceName;

/// Prefix of every archive file name
pub const ARCHIVE_LABEL: &str = "WSL2 Backup";

/// Minute-precision timestamp used in archive names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M";

/// `WSL2 Backup - <instance> <yyyy-MM-dd-HH-mm>.tar`
pub fn archive_file_name(instance: &InstanceName, timestamp: &NaiveDateTime) -> String {
    format!(
        "{} - {} {}.tar",
        ARCHIVE_LABEL,
        instance,
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Archive path directly inside `backup_dir`
pub fn archive_path(backup_dir: &Path, instance: &InstanceName, timestamp: &NaiveDateTime) -> PathBuf {
    backup_dir.join(archive_file_name(instance, timestamp))
}

/// Drop seconds and below
pub fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// Dry run: nothing was exported
    Planned,
    /// `wsl --export` reported success
    Exported { size_bytes: Option<u64> },
    /// `wsl --export` could not be run or exited with an error
    Failed { message: String },
}

/// One export attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub instance_name: InstanceName,
    pub timestamp: NaiveDateTime,
    pub destination_path: PathBuf,
    #[serde(flatten)]
    pub outcome: ExportOutcome,
}

impl ExportRecord {
    pub fn planned(instance: &InstanceName, backup_dir: &Path, timestamp: NaiveDateTime) -> Self {
        let timestamp = truncate_to_minute(timestamp);
        Self {
            instance_name: instance.clone(),
            timestamp,
            destination_path: archive_path(backup_dir, instance, &timestamp),
            outcome: ExportOutcome::Planned,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ExportOutcome::Failed { .. })
    }
}
