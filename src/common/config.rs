use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::common::errors::BackupError;
use crate::retention::RetentionRequest;

/// File name glob matching the archives this tool writes
pub const BACKUP_PATTERN: &str = "WSL2 Backup - *.tar";

/// File name glob matching per-run transcripts
pub const LOG_PATTERN: &str = "Transcript-*.txt";

/// Backup job configuration.
///
/// Keys keep the names used by existing config files. Unknown keys are
/// rejected so a typo never silently falls back to a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory the archives are exported into
    #[serde(rename = "BackupPath")]
    pub backup_path: PathBuf,

    /// Archives older than this many days are eligible for deletion
    #[serde(rename = "AgeOfBackupsToDelete")]
    pub backup_max_age_days: i64,

    /// Newest archives that are never deleted, whatever their age
    #[serde(rename = "MinNumOfBackupsToKeep")]
    pub min_backups_to_keep: u32,

    /// Directory holding the run transcripts
    #[serde(rename = "LogPath")]
    pub log_path: PathBuf,

    /// Transcripts older than this many days are deleted
    #[serde(rename = "AgeOfOldLogFilesToDelete")]
    pub log_max_age_days: i64,

    /// WSL launcher to invoke
    #[serde(rename = "WslExecutable", default = "default_wsl_executable")]
    pub wsl_executable: String,
}

fn default_wsl_executable() -> String {
    "wsl.exe".to_string()
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            backup_path: home.join("WSL2 Backups"),
            backup_max_age_days: 30,
            min_backups_to_keep: 3,
            log_path: Self::data_dir().join("logs"),
            log_max_age_days: 30,
            wsl_executable: default_wsl_executable(),
        }
    }
}

impl Config {
    /// Get the wsl2-backup config directory
    pub fn data_dir() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wsl2-backup")
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Load config from file. A missing file is an error, not a default.
    pub fn load(path: &Path) -> Result<Self, BackupError> {
        if !path.exists() {
            return Err(BackupError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| BackupError::ConfigError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(path, &contents)
    }

    /// Parse config contents; `path` is only used for error messages
    pub fn parse(path: &Path, contents: &str) -> Result<Self, BackupError> {
        toml::from_str(contents).map_err(|e| BackupError::ConfigError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save config to file, creating its directory
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Retention settings for the archive directory
    pub fn backup_retention(&self) -> RetentionRequest {
        RetentionRequest {
            directory: self.backup_path.clone(),
            name_pattern: BACKUP_PATTERN.to_string(),
            max_age_days: self.backup_max_age_days,
            min_keep_count: self.min_backups_to_keep as usize,
            exclude: Vec::new(),
        }
    }

    /// Retention settings for the transcript directory (no keep floor)
    pub fn log_retention(&self) -> RetentionRequest {
        RetentionRequest {
            directory: self.log_path.clone(),
            name_pattern: LOG_PATTERN.to_string(),
            max_age_days: self.log_max_age_days,
            min_keep_count: 0,
            exclude: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
BackupPath = 'D:\Backups\WSL'
AgeOfBackupsToDelete = 30
MinNumOfBackupsToKeep = 2
LogPath = 'D:\Backups\WSL\Logs'
AgeOfOldLogFilesToDelete = 14
"#;

    #[test]
    fn test_parse_pascal_case_keys() {
        let config = Config::parse(Path::new("config.toml"), SAMPLE).unwrap();
        assert_eq!(config.backup_path, PathBuf::from(r"D:\Backups\WSL"));
        assert_eq!(config.backup_max_age_days, 30);
        assert_eq!(config.min_backups_to_keep, 2);
        assert_eq!(config.log_max_age_days, 14);
        assert_eq!(config.wsl_executable, "wsl.exe");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let contents = format!("{}\nBackupsPath = 'typo'\n", SAMPLE);
        let err = Config::parse(Path::new("config.toml"), &contents).unwrap_err();
        assert!(matches!(err, BackupError::ConfigError { .. }));
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = Config::parse(Path::new("config.toml"), "BackupPath = '/b'\n").unwrap_err();
        assert!(matches!(err, BackupError::ConfigError { .. }));
    }

    #[test]
    fn test_negative_keep_count_rejected() {
        let contents = SAMPLE.replace("MinNumOfBackupsToKeep = 2", "MinNumOfBackupsToKeep = -1");
        assert!(Config::parse(Path::new("config.toml"), &contents).is_err());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = Config::load(Path::new("/nonexistent/wsl2-backup/config.toml")).unwrap_err();
        assert!(matches!(err, BackupError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_retention_requests() {
        let config = Config::parse(Path::new("config.toml"), SAMPLE).unwrap();

        let backups = config.backup_retention();
        assert_eq!(backups.name_pattern, BACKUP_PATTERN);
        assert_eq!(backups.max_age_days, 30);
        assert_eq!(backups.min_keep_count, 2);

        let logs = config.log_retention();
        assert_eq!(logs.name_pattern, LOG_PATTERN);
        assert_eq!(logs.max_age_days, 14);
        assert_eq!(logs.min_keep_count, 0);
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("BackupPath"));
        let parsed = Config::parse(Path::new("config.toml"), &text).unwrap();
        assert_eq!(parsed, config);
    }
}
