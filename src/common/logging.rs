use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logging setup for one invocation
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub quiet: bool,
    pub color: bool,
    /// Also write a plain-text transcript into this directory
    pub transcript_dir: Option<PathBuf>,
}

/// Events with this target reach the transcript but not the console
pub const TRANSCRIPT_TARGET: &str = "transcript";

/// `Transcript-<yyyy-MM-dd>.txt`
pub fn transcript_file_name(date: NaiveDate) -> String {
    format!("Transcript-{}.txt", date.format("%Y-%m-%d"))
}

fn console_directive(options: &LogOptions) -> &'static str {
    if options.verbose {
        "wsl2_backup=debug"
    } else if options.quiet {
        "wsl2_backup=warn"
    } else {
        "wsl2_backup=info"
    }
}

fn transcript_directive(options: &LogOptions) -> String {
    let level = if options.verbose { "debug" } else { "info" };
    format!("wsl2_backup={},{}=info", level, TRANSCRIPT_TARGET)
}

fn open_transcript(dir: &Path) -> Result<std::fs::File> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log dir: {}", dir.display()))?;
    let path = dir.join(transcript_file_name(chrono::Local::now().date_naive()));
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open transcript: {}", path.display()))
}

/// Install the global subscriber.
///
/// Console output goes to stderr so JSON on stdout stays parseable. The
/// transcript always records at info level, regardless of `-q`. Keep the
/// returned guard alive until exit or buffered lines are lost.
pub fn init(options: &LogOptions) -> Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directive(options)));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(options.color)
        .with_target(false)
        .without_time()
        .with_filter(console_filter);

    let (transcript, guard) = match &options.transcript_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(open_transcript(dir)?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_filter(EnvFilter::new(transcript_directive(options)));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(transcript)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
