use std::time::Instant;

use crate::common::config::Config;
use crate::common::errors::{BackupError, RetentionError};
use crate::exporter::{self, CommandRunner, ExportRecord, InstanceName, Wsl};
use crate::retention::{self, PruneMode, PruneReport, RetentionRequest};

/// Outcome of one prune pass; errors here never abort the run
pub type PruneResult = Result<PruneReport, RetentionError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct JobOptions {
    /// List and plan only: no shutdown, no export, no deletion
    pub dry_run: bool,
    /// Skip the retention passes (export only)
    pub skip_prune: bool,
    pub show_progress: bool,
}

#[derive(Debug)]
pub struct RunReport {
    pub dry_run: bool,
    pub instances: Vec<InstanceName>,
    pub exports: Vec<ExportRecord>,
    pub backup_prune: Option<PruneResult>,
    pub log_prune: Option<PruneResult>,
    pub duration_secs: f64,
}

impl RunReport {
    pub fn failed_exports(&self) -> usize {
        self.exports.iter().filter(|r| r.is_failed()).count()
    }
}

/// Which directories a standalone prune covers
#[derive(Debug, Clone, Copy)]
pub struct PruneTargets {
    pub backups: bool,
    pub logs: bool,
}

impl Default for PruneTargets {
    fn default() -> Self {
        Self {
            backups: true,
            logs: true,
        }
    }
}

/// The scheduled job.
///
/// Order: list instances, stop WSL, export each instance, prune the backup
/// directory, prune the log directory. No instances, a failed listing and a
/// failed shutdown are fatal; everything after the shutdown is not.
pub fn run_backup<R: CommandRunner>(
    wsl: &Wsl<R>,
    config: &Config,
    options: &JobOptions,
) -> Result<RunReport, BackupError> {
    let started = Instant::now();

    let instances = wsl.list_instances()?;
    if instances.is_empty() {
        return Err(BackupError::NoInstances);
    }
    let names: Vec<&str> = instances.iter().map(|i| i.as_str()).collect();
    tracing::info!("Found {} instance(s): {}", instances.len(), names.join(", "));

    let exports = if options.dry_run {
        let now = chrono::Local::now().naive_local();
        instances
            .iter()
            .map(|i| ExportRecord::planned(i, &config.backup_path, now))
            .collect()
    } else {
        tracing::info!("Shutting down WSL");
        wsl.stop_all()?;

        std::fs::create_dir_all(&config.backup_path).map_err(|source| BackupError::Io {
            path: config.backup_path.clone(),
            source,
        })?;

        exporter::export_all(wsl, &instances, &config.backup_path, options.show_progress)
    };

    let (backup_prune, log_prune) = if options.skip_prune {
        (None, None)
    } else {
        let mode = prune_mode(options.dry_run);
        // Leftovers of failed exports must not take a keep-floor slot.
        let mut backups = config.backup_retention();
        backups.exclude = exports
            .iter()
            .filter(|r| r.is_failed())
            .map(|r| r.destination_path.clone())
            .collect();
        (
            Some(prune_logged("backup", &backups, mode)),
            Some(prune_logged("log", &config.log_retention(), mode)),
        )
    };

    Ok(RunReport {
        dry_run: options.dry_run,
        instances,
        exports,
        backup_prune,
        log_prune,
        duration_secs: started.elapsed().as_secs_f64(),
    })
}

/// Retention only, without touching WSL
pub fn run_prune(
    config: &Config,
    targets: PruneTargets,
    mode: PruneMode,
) -> (Option<PruneResult>, Option<PruneResult>) {
    let backups = targets
        .backups
        .then(|| prune_logged("backup", &config.backup_retention(), mode));
    let logs = targets
        .logs
        .then(|| prune_logged("log", &config.log_retention(), mode));
    (backups, logs)
}

pub fn prune_mode(dry_run: bool) -> PruneMode {
    if dry_run {
        PruneMode::DryRun
    } else {
        PruneMode::Delete
    }
}

fn prune_logged(label: &str, request: &RetentionRequest, mode: PruneMode) -> PruneResult {
    tracing::info!(
        "Pruning {} files in {} older than {} days (keeping newest {})",
        label,
        request.directory.display(),
        request.max_age_days,
        request.min_keep_count
    );

    let result = retention::prune(request, mode);
    match &result {
        Ok(report) => tracing::info!(
            "{} {} {} file(s), {} failed",
            label,
            if mode == PruneMode::DryRun { "would remove" } else { "removed" },
            report.deleted.len(),
            report.failed.len()
        ),
        Err(e) => tracing::warn!("Skipping {} cleanup: {}", label, e),
    }
    result
}
