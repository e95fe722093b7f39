use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// wsl2-backup: scheduled WSL2 exports with retention cleanup
#[derive(Parser, Debug)]
#[command(
    name = "wsl2-backup",
    version,
    about = "Export WSL2 instances to archives and prune old backups",
    long_about = "wsl2-backup shuts WSL down, exports every instance to a timestamped\n\
                   .tar archive, then deletes archives and transcripts past their age.",
    after_help = "EXAMPLES:\n  \
        wsl2-backup config init                Write a default config file\n  \
        wsl2-backup run                        Export all instances, then prune\n  \
        wsl2-backup run --dry-run              Show what a run would do\n  \
        wsl2-backup list                       List WSL instances\n  \
        wsl2-backup prune --backups --dry-run  Preview archive cleanup\n  \
        wsl2-backup schedule --time 02:30      Print the Task Scheduler command\n  \
        wsl2-backup schedule --install         Register the daily task"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use
    #[arg(long, short, global = true, value_name = "PATH", env = "WSL2_BACKUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode, minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export all instances, then prune old archives and transcripts
    Run {
        /// Show instances, archive names and deletions without doing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Export all instances without pruning
    Export,

    /// List WSL instances
    List,

    /// Delete old archives and transcripts
    Prune {
        /// Only prune the backup directory
        #[arg(long)]
        backups: bool,

        /// Only prune the log directory
        #[arg(long)]
        logs: bool,

        /// Show what would be deleted
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Register a daily run with Windows Task Scheduler
    Schedule {
        /// Time of day to run (HH:MM, 24-hour)
        #[arg(long, default_value = crate::schedule::DEFAULT_TIME)]
        time: String,

        /// Task Scheduler task name
        #[arg(long, default_value = crate::schedule::DEFAULT_TASK_NAME)]
        task_name: String,

        /// Run schtasks.exe instead of printing the command
        #[arg(long)]
        install: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the config file location
    Path,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
