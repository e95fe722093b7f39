pub mod archive;
pub mod instances;
pub mod wsl;

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub use archive::{archive_file_name, archive_path, ExportOutcome, ExportRecord};
pub use instances::{decode_output, parse_instance_list, InstanceName};
pub use wsl::{CommandOutput, CommandRunner, ProcessCommandRunner, Wsl};

/// Export every instance in order, one at a time.
///
/// A failed export is logged and recorded; the remaining instances are
/// still exported.
pub fn export_all<R: CommandRunner>(
    wsl: &Wsl<R>,
    instances: &[InstanceName],
    backup_dir: &Path,
    show_progress: bool,
) -> Vec<ExportRecord> {
    let mut records = Vec::with_capacity(instances.len());

    for (i, instance) in instances.iter().enumerate() {
        let unsafe_chars = instance.unsafe_filename_chars();
        if !unsafe_chars.is_empty() {
            tracing::warn!(
                "Instance name '{}' contains characters not allowed in file names: {:?}",
                instance,
                unsafe_chars
            );
        }

        tracing::info!("Exporting '{}' ({}/{})", instance, i + 1, instances.len());

        let pb = if show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("Exporting {}", instance));
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let record = wsl.export(instance, backup_dir);

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        match &record.outcome {
            ExportOutcome::Failed { message } => {
                tracing::warn!("Export of '{}' failed: {}", instance, message);
            }
            _ => {
                tracing::info!("Exported '{}' to {}", instance, record.destination_path.display());
            }
        }

        records.push(record);
    }

    records
}
