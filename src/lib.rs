//! # wsl2-backup
//!
//! Scheduled export of WSL2 instances with retention-based cleanup.
//!
//! One run lists the WSL instances, shuts WSL down, exports every instance
//! to `WSL2 Backup - <name> <yyyy-MM-dd-HH-mm>.tar`, then prunes:
//!
//! - **Archives** older than a configured age, always keeping the newest N
//! - **Transcripts** (`Transcript-<yyyy-MM-dd>.txt`) older than a configured age
//!
//! Meant to be started by Task Scheduler; see `wsl2-backup schedule`.

pub mod cli;
pub mod common;
pub mod exporter;
pub mod job;
pub mod retention;
pub mod schedule;
