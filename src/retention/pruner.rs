use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use super::candidates::{find_candidates, FileCandidate};
use crate::common::errors::RetentionError;

const SECS_PER_DAY: u64 = 86_400;

/// What to prune, built fresh from configuration for each pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionRequest {
    /// Directory to prune (not recursed into)
    pub directory: PathBuf,
    /// File name glob, e.g. `Transcript-*.txt`
    pub name_pattern: String,
    /// Files older than this are eligible; must be at least 1
    pub max_age_days: i64,
    /// The newest N matching files are never deleted
    pub min_keep_count: usize,
    /// Paths left out of the pass entirely: neither counted nor deleted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneMode {
    /// Compute the deletion set only
    DryRun,
    /// Delete the files
    Delete,
}

impl std::fmt::Display for PruneMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneMode::DryRun => write!(f, "Dry Run"),
            PruneMode::Delete => write!(f, "Delete"),
        }
    }
}

/// Deletion set computed from one directory snapshot
#[derive(Debug, Clone)]
pub struct PrunePlan {
    pub directory: PathBuf,
    pub cutoff: SystemTime,
    pub examined: usize,
    /// Newest files held back by the keep floor
    pub protected: Vec<FileCandidate>,
    pub to_delete: Vec<FileCandidate>,
}

/// A deletion that failed; the remaining files were still processed
#[derive(Debug, Clone)]
pub struct FailedDeletion {
    pub path: PathBuf,
    pub error: String,
}

/// Report from a prune pass
#[derive(Debug, Clone)]
pub struct PruneReport {
    pub directory: PathBuf,
    pub mode: PruneMode,
    pub examined: usize,
    pub protected: usize,
    /// Files deleted (or, in dry-run mode, that would be deleted)
    pub deleted: Vec<FileCandidate>,
    pub failed: Vec<FailedDeletion>,
    pub bytes_freed: u64,
}

/// Reject ages below one day; nothing would survive them
pub fn validate(request: &RetentionRequest) -> Result<(), RetentionError> {
    if request.max_age_days < 1 {
        return Err(RetentionError::InvalidMaxAge {
            days: request.max_age_days,
        });
    }
    Ok(())
}

/// `now` minus `max_age_days`, clamped at the epoch
pub fn age_cutoff(now: SystemTime, max_age_days: i64) -> SystemTime {
    let secs = (max_age_days.max(0) as u64).saturating_mul(SECS_PER_DAY);
    now.checked_sub(Duration::from_secs(secs))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Split candidates into (protected, to_delete).
///
/// Candidates are stable-sorted by modification time; the last `min_keep`
/// are protected. Of the rest, only files modified strictly before `cutoff`
/// are deleted.
pub fn select_for_deletion(
    candidates: Vec<FileCandidate>,
    cutoff: SystemTime,
    min_keep: usize,
) -> (Vec<FileCandidate>, Vec<FileCandidate>) {
    let mut sorted = candidates;
    sorted.sort_by_key(|c| c.modified);

    let split = sorted.len().saturating_sub(min_keep);
    let protected = sorted.split_off(split);
    let to_delete = sorted
        .into_iter()
        .filter(|c| c.modified < cutoff)
        .collect();

    (protected, to_delete)
}

/// Compute the deletion set for `request` as of `now`, without touching disk
pub fn plan(request: &RetentionRequest, now: SystemTime) -> Result<PrunePlan, RetentionError> {
    validate(request)?;

    if !request.directory.is_dir() {
        return Err(RetentionError::PathNotFound {
            path: request.directory.clone(),
        });
    }

    let mut candidates = find_candidates(&request.directory, &request.name_pattern)?;
    candidates.retain(|c| !request.exclude.contains(&c.path));
    let examined = candidates.len();
    let cutoff = age_cutoff(now, request.max_age_days);
    let (protected, to_delete) = select_for_deletion(candidates, cutoff, request.min_keep_count);

    Ok(PrunePlan {
        directory: request.directory.clone(),
        cutoff,
        examined,
        protected,
        to_delete,
    })
}

/// Prune `request.directory` as of the current time
pub fn prune(request: &RetentionRequest, mode: PruneMode) -> Result<PruneReport, RetentionError> {
    prune_at(request, mode, SystemTime::now())
}

/// Prune as of `now`. Per-file failures are collected in the report.
pub fn prune_at(
    request: &RetentionRequest,
    mode: PruneMode,
    now: SystemTime,
) -> Result<PruneReport, RetentionError> {
    let plan = plan(request, now)?;

    tracing::debug!(
        "{}: {} matching '{}', {} protected, {} past {} days",
        request.directory.display(),
        plan.examined,
        request.name_pattern,
        plan.protected.len(),
        plan.to_delete.len(),
        request.max_age_days
    );

    Ok(execute(plan, mode))
}

/// Carry out a plan. A failed deletion is recorded and the rest still run.
pub fn execute(plan: PrunePlan, mode: PruneMode) -> PruneReport {
    let mut report = PruneReport {
        directory: plan.directory,
        mode,
        examined: plan.examined,
        protected: plan.protected.len(),
        deleted: Vec::new(),
        failed: Vec::new(),
        bytes_freed: 0,
    };

    for candidate in plan.to_delete {
        if mode == PruneMode::DryRun {
            tracing::info!("Would delete {}", candidate.path.display());
            report.bytes_freed += candidate.size_bytes;
            report.deleted.push(candidate);
            continue;
        }

        match std::fs::remove_file(&candidate.path) {
            Ok(()) => {
                tracing::info!("Deleted {}", candidate.path.display());
                report.bytes_freed += candidate.size_bytes;
                report.deleted.push(candidate);
            }
            Err(e) => {
                tracing::warn!("Failed to delete {}: {}", candidate.path.display(), e);
                report.failed.push(FailedDeletion {
                    path: candidate.path,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
