use chrono::NaiveDateTime;
use std::ffi::OsStr;
use std::path::Path;

use super::archive::{ExportOutcome, ExportRecord};
use super::instances::{decode_output, parse_instance_list, InstanceName};
use crate::common::errors::BackupError;

/// Captured result of one external command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Exit code plus decoded stderr, for error messages
    pub fn failure_message(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        let stderr = decode_output(&self.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        }
    }
}

/// Runs external programs and waits for them to finish
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&OsStr]) -> std::io::Result<CommandOutput>;
}

/// Runs commands as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[&OsStr]) -> std::io::Result<CommandOutput> {
        tracing::debug!("Running {} {:?}", program, args);
        let output = std::process::Command::new(program)
            .args(args)
            // Ask wsl.exe for UTF-8 instead of UTF-16LE.
            .env("WSL_UTF8", "1")
            .output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// The WSL subsystem as driven through `wsl.exe`
#[derive(Debug, Clone)]
pub struct Wsl<R> {
    executable: String,
    runner: R,
}

impl Wsl<ProcessCommandRunner> {
    pub fn new(executable: impl Into<String>) -> Self {
        Self::with_runner(executable, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> Wsl<R> {
    pub fn with_runner(executable: impl Into<String>, runner: R) -> Self {
        Self {
            executable: executable.into(),
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `wsl --list`, normalized, in enumeration order.
    ///
    /// An empty list is returned as-is; callers decide whether that is fatal.
    pub fn list_instances(&self) -> Result<Vec<InstanceName>, BackupError> {
        let output = self
            .runner
            .run(&self.executable, &[OsStr::new("--list")])
            .map_err(|e| BackupError::Enumeration {
                message: format!("could not run '{}': {}", self.executable, e),
            })?;

        if !output.success {
            return Err(BackupError::Enumeration {
                message: output.failure_message(),
            });
        }

        let text = decode_output(&output.stdout);
        Ok(parse_instance_list(&text))
    }

    /// `wsl --shutdown`: stops every running instance and the VM
    pub fn stop_all(&self) -> Result<(), BackupError> {
        let output = self
            .runner
            .run(&self.executable, &[OsStr::new("--shutdown")])
            .map_err(|e| BackupError::Shutdown {
                message: format!("could not run '{}': {}", self.executable, e),
            })?;

        if !output.success {
            return Err(BackupError::Shutdown {
                message: output.failure_message(),
            });
        }
        Ok(())
    }

    /// Export `instance` into `backup_dir`, named after the current local time
    pub fn export(&self, instance: &InstanceName, backup_dir: &Path) -> ExportRecord {
        self.export_at(instance, backup_dir, chrono::Local::now().naive_local())
    }

    /// Export `instance` with an explicit timestamp.
    ///
    /// Only the exit status is checked; the archive is not verified.
    pub fn export_at(
        &self,
        instance: &InstanceName,
        backup_dir: &Path,
        timestamp: NaiveDateTime,
    ) -> ExportRecord {
        let mut record = ExportRecord::planned(instance, backup_dir, timestamp);

        let args = [
            OsStr::new("--export"),
            OsStr::new(instance.as_str()),
            record.destination_path.as_os_str(),
        ];

        record.outcome = match self.runner.run(&self.executable, &args) {
            Ok(output) if output.success => ExportOutcome::Exported {
                size_bytes: std::fs::metadata(&record.destination_path)
                    .ok()
                    .map(|m| m.len()),
            },
            Ok(output) => ExportOutcome::Failed {
                message: output.failure_message(),
            },
            Err(e) => ExportOutcome::Failed {
                message: format!("could not run '{}': {}", self.executable, e),
            },
        };

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_includes_stderr() {
        let output = CommandOutput {
            success: false,
            code: Some(-1),
            stdout: Vec::new(),
            stderr: b"There is no distribution with the supplied name.\r\n".to_vec(),
        };
        assert_eq!(
            output.failure_message(),
            "exit code -1: There is no distribution with the supplied name."
        );
    }

    #[test]
    fn test_failure_message_without_stderr() {
        let output = CommandOutput {
            success: false,
            code: Some(1),
            ..Default::default()
        };
        assert_eq!(output.failure_message(), "exit code 1");
    }

    #[test]
    fn test_missing_executable_is_enumeration_error() {
        let wsl = Wsl::new("/nonexistent/bin/wsl-xyz123");
        let err = wsl.list_instances().unwrap_err();
        assert!(matches!(err, BackupError::Enumeration { .. }));
        assert!(err.to_string().contains("wsl-xyz123"));
    }

    #[test]
    fn test_missing_executable_is_shutdown_error() {
        let wsl = Wsl::new("/nonexistent/bin/wsl-xyz123");
        assert!(matches!(wsl.stop_all(), Err(BackupError::Shutdown { .. })));
    }
}
