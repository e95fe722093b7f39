use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use wsl2_backup::cli::args::{Cli, Commands, ConfigAction, OutputFormat};
use wsl2_backup::cli::output;
use wsl2_backup::common::config::Config;
use wsl2_backup::common::logging::{self, LogOptions};
use wsl2_backup::exporter::{ProcessCommandRunner, Wsl};
use wsl2_backup::job::{self, JobOptions, PruneTargets};
use wsl2_backup::schedule::ScheduledTask;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Run { dry_run } => cmd_run(&cli, dry_run, false),
        Commands::Export => cmd_run(&cli, false, true),
        Commands::List => cmd_list(&cli),
        Commands::Prune {
            backups,
            logs,
            dry_run,
        } => cmd_prune(&cli, backups, logs, dry_run),
        Commands::Config { ref action } => cmd_config(&cli, action),
        Commands::Schedule {
            ref time,
            ref task_name,
            install,
        } => cmd_schedule(&cli, time, task_name, install),

        Commands::Completions { ref shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let shell = match shell {
                wsl2_backup::cli::args::CompletionShell::Bash => clap_complete::Shell::Bash,
                wsl2_backup::cli::args::CompletionShell::Zsh => clap_complete::Shell::Zsh,
                wsl2_backup::cli::args::CompletionShell::Fish => clap_complete::Shell::Fish,
            };
            clap_complete::generate(shell, &mut cmd, "wsl2-backup", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

fn log_options(cli: &Cli, transcript_dir: Option<PathBuf>) -> LogOptions {
    LogOptions {
        verbose: cli.verbose,
        quiet: cli.quiet || !matches!(cli.format, OutputFormat::Human),
        color: !cli.no_color,
        transcript_dir,
    }
}

fn show_progress(cli: &Cli) -> bool {
    !cli.quiet && matches!(cli.format, OutputFormat::Human)
}

// ─── Run / Export ─────────────────────────────────────────────────────────────

fn cmd_run(cli: &Cli, dry_run: bool, skip_prune: bool) -> Result<()> {
    let config = Config::load(&config_path(cli))?;

    let transcript = (!dry_run).then(|| config.log_path.clone());
    let _guard = logging::init(&log_options(cli, transcript))?;

    let wsl = Wsl::new(config.wsl_executable.clone());
    let options = JobOptions {
        dry_run,
        skip_prune,
        show_progress: show_progress(cli),
    };

    let report = match job::run_backup(&wsl, &config, &options) {
        Ok(report) => report,
        Err(e) => {
            // anyhow prints the error on the console; record it in the transcript.
            tracing::error!(target: logging::TRANSCRIPT_TARGET, "Backup aborted: {}", e);
            return Err(e.into());
        }
    };

    match cli.format {
        OutputFormat::Human => output::print_run_report(&report),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output::run_report_json(&report))?)
        }
        OutputFormat::Quiet => output::print_run_quiet(&report),
    }

    Ok(())
}

// ─── List ─────────────────────────────────────────────────────────────────────

fn cmd_list(cli: &Cli) -> Result<()> {
    let config = Config::load(&config_path(cli))?;
    let _guard = logging::init(&log_options(cli, None))?;

    let wsl = Wsl::new(config.wsl_executable.clone());
    let instances = wsl.list_instances()?;

    match cli.format {
        OutputFormat::Human => output::print_instances(&instances),
        OutputFormat::Json => output::print_instances_json(&instances),
        OutputFormat::Quiet => output::print_instances_quiet(&instances),
    }

    Ok(())
}

// ─── Prune ────────────────────────────────────────────────────────────────────

fn cmd_prune(cli: &Cli, backups: bool, logs: bool, dry_run: bool) -> Result<()> {
    let config = Config::load(&config_path(cli))?;

    let transcript = (!dry_run).then(|| config.log_path.clone());
    let _guard = logging::init(&log_options(cli, transcript))?;

    // Neither flag means both targets.
    let targets = if backups || logs {
        PruneTargets { backups, logs }
    } else {
        PruneTargets::default()
    };

    let (backup_result, log_result) = job::run_prune(&config, targets, job::prune_mode(dry_run));

    match cli.format {
        OutputFormat::Human => {
            println!();
            if let Some(result) = &backup_result {
                output::print_prune_result("Backups", result);
            }
            if let Some(result) = &log_result {
                output::print_prune_result("Logs", result);
            }
            if dry_run {
                println!("  {} Dry run — no files deleted.", "ℹ️");
            }
            println!();
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "backup_prune": backup_result.as_ref().map(output::prune_result_json),
                "log_prune": log_result.as_ref().map(output::prune_result_json),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Quiet => {
            for result in [&backup_result, &log_result].into_iter().flatten() {
                match result {
                    Ok(report) => println!("{}  {}", report.directory.display(), report.deleted.len()),
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(cli: &Cli, action: &ConfigAction) -> Result<()> {
    let path = config_path(cli);

    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
            let config = Config::default();
            config.save(&path)?;
            println!("  {} Wrote default config to {}", "✓".green(), path.display());
            println!("  Edit BackupPath and LogPath before the first run.");
            Ok(())
        }
        ConfigAction::Show => {
            let config = Config::load(&path)?;
            match cli.format {
                OutputFormat::Human => output::print_config(&path, &config),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Quiet => println!("{}", toml::to_string_pretty(&config)?),
            }
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

// ─── Schedule ─────────────────────────────────────────────────────────────────

fn cmd_schedule(cli: &Cli, time: &str, task_name: &str, install: bool) -> Result<()> {
    let task = ScheduledTask::new(task_name, time, cli.config.clone())?;

    if !install {
        println!("{}", task.display_command());
        return Ok(());
    }

    task.install(&ProcessCommandRunner)?;
    println!(
        "  {} Registered task '{}' to run daily at {}",
        "✓".green(),
        task.name,
        task.time.format("%H:%M")
    );
    println!("  {} Runs: {}", "💡", task.task_command().cyan());
    println!();
    Ok(())
}
