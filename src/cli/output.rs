use colored::*;
use std::path::Path;
use std::time::SystemTime;

use crate::common::config::Config;
use crate::common::format::{self, format_path, format_size};
use crate::exporter::{ExportOutcome, ExportRecord, InstanceName};
use crate::job::{PruneResult, RunReport};
use crate::retention::PruneMode;

/// Print instance names, default marker already stripped
pub fn print_instances(instances: &[InstanceName]) {
    println!();
    println!("  {} WSL Instances", "🐧");
    println!("{}", "─".repeat(60).dimmed());
    if instances.is_empty() {
        println!("  No instances found.");
    }
    for (i, name) in instances.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, name.as_str().cyan());
    }
    println!();
}

pub fn print_instances_json(instances: &[InstanceName]) {
    match serde_json::to_string_pretty(instances) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error: {}", e),
    }
}

pub fn print_instances_quiet(instances: &[InstanceName]) {
    for name in instances {
        println!("{}", name);
    }
}

/// Print one line per export, with the resulting archive
pub fn print_exports(records: &[ExportRecord], dry_run: bool) {
    println!();
    if dry_run {
        println!("  {} Archives that would be written", "📦");
    } else {
        println!("  {} Exports", "📦");
    }
    println!("{}", "─".repeat(60).dimmed());

    for record in records {
        let file = record
            .destination_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();
        match &record.outcome {
            ExportOutcome::Planned => {
                println!("  {} {}", "•".dimmed(), file);
            }
            ExportOutcome::Exported { size_bytes } => {
                let size = size_bytes.map(format_size).unwrap_or_else(|| "?".to_string());
                println!("  {} {} ({})", "✓".green(), file, size.dimmed());
            }
            ExportOutcome::Failed { message } => {
                println!("  {} {}", "✗".red(), file);
                println!("      {}", message.dimmed());
            }
        }
    }
    println!();
}

/// Print the outcome of one prune pass
pub fn print_prune_result(label: &str, result: &PruneResult) {
    let report = match result {
        Ok(r) => r,
        Err(e) => {
            println!("  {} {} cleanup skipped: {}", "⚠".yellow(), label, e);
            return;
        }
    };

    let verb = if report.mode == PruneMode::DryRun {
        "Would delete"
    } else {
        "Deleted"
    };

    if report.deleted.is_empty() && report.failed.is_empty() {
        println!(
            "  {} {}: nothing to delete in {} ({} matched, {} kept by floor)",
            "✓".green(),
            label,
            format_path(&report.directory),
            report.examined,
            report.protected
        );
        return;
    }

    println!(
        "  {} {}: {} {}, {} ({} matched, {} kept by floor)",
        "🗑".to_string(),
        label,
        verb,
        format::format_count(report.deleted.len()).cyan(),
        format_size(report.bytes_freed),
        report.examined,
        report.protected
    );

    let now = SystemTime::now();
    for file in &report.deleted {
        println!(
            "    {} {} {}",
            "✗".red(),
            file.file_name(),
            format!("({})", format::format_age(file.modified, now)).dimmed()
        );
    }
    for failed in &report.failed {
        println!(
            "    {} {}: {}",
            "⚠".yellow(),
            failed.path.display(),
            failed.error.dimmed()
        );
    }
}

pub fn print_run_report(report: &RunReport) {
    print_exports(&report.exports, report.dry_run);

    if report.backup_prune.is_some() || report.log_prune.is_some() {
        println!("  {} Cleanup", "🧹");
        println!("{}", "─".repeat(60).dimmed());
        if let Some(result) = &report.backup_prune {
            print_prune_result("Backups", result);
        }
        if let Some(result) = &report.log_prune {
            print_prune_result("Logs", result);
        }
        println!();
    }

    let failed = report.failed_exports();
    let summary = format!(
        "{} instance(s) in {}",
        report.instances.len(),
        format::format_duration(report.duration_secs)
    );
    if report.dry_run {
        println!("  {} Dry run — {}. Nothing was changed.", "ℹ️", summary);
    } else if failed > 0 {
        println!(
            "  {} {} — {} export(s) failed",
            "⚠".yellow(),
            summary,
            failed.to_string().red()
        );
    } else {
        println!("  {} Backed up {}", "✓".green(), summary);
    }
    println!();
}

pub fn prune_result_json(result: &PruneResult) -> serde_json::Value {
    match result {
        Ok(report) => serde_json::json!({
            "directory": report.directory.display().to_string(),
            "mode": report.mode,
            "examined": report.examined,
            "protected": report.protected,
            "deleted": report.deleted.iter().map(|f| f.path.display().to_string()).collect::<Vec<_>>(),
            "failed": report.failed.iter().map(|f| serde_json::json!({
                "path": f.path.display().to_string(),
                "error": f.error,
            })).collect::<Vec<_>>(),
            "bytes_freed": report.bytes_freed,
        }),
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    }
}

pub fn run_report_json(report: &RunReport) -> serde_json::Value {
    serde_json::json!({
        "dry_run": report.dry_run,
        "instances": report.instances,
        "exports": report.exports,
        "backup_prune": report.backup_prune.as_ref().map(prune_result_json),
        "log_prune": report.log_prune.as_ref().map(prune_result_json),
        "duration_secs": report.duration_secs,
    })
}

pub fn print_run_quiet(report: &RunReport) {
    let deleted = |r: &Option<PruneResult>| match r {
        Some(Ok(p)) => p.deleted.len().to_string(),
        Some(Err(_)) => "skipped".to_string(),
        None => "-".to_string(),
    };
    println!(
        "{}  {}  {}  {}",
        report.exports.len(),
        report.failed_exports(),
        deleted(&report.backup_prune),
        deleted(&report.log_prune)
    );
}

pub fn print_config(path: &Path, config: &Config) {
    format::print_header("wsl2-backup Configuration");
    format::print_kv("Config file", &format_path(path));
    format::print_kv("BackupPath", &config.backup_path.display().to_string());
    format::print_kv(
        "AgeOfBackupsToDelete",
        &format!("{} days", config.backup_max_age_days),
    );
    format::print_kv(
        "MinNumOfBackupsToKeep",
        &config.min_backups_to_keep.to_string(),
    );
    format::print_kv("LogPath", &config.log_path.display().to_string());
    format::print_kv(
        "AgeOfOldLogFilesToDelete",
        &format!("{} days", config.log_max_age_days),
    );
    format::print_kv("WslExecutable", &config.wsl_executable);
    println!();
}
