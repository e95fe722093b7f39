use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::common::errors::RetentionError;

/// A file that a retention pass may delete
#[derive(Debug, Clone, PartialEq)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size_bytes: u64,
}

impl FileCandidate {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

// Windows file name matching ignores case.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compile a file-name glob
pub fn compile_pattern(pattern: &str) -> Result<Pattern, RetentionError> {
    Pattern::new(pattern).map_err(|source| RetentionError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// List regular files directly inside `dir` whose name matches `pattern`.
///
/// Subdirectories are never entered. A symlink counts when its target is a
/// regular file; deleting it removes only the link. Entries come back in
/// file-name order, which is the order ties keep after sorting by
/// modification time.
pub fn find_candidates(dir: &Path, pattern: &str) -> Result<Vec<FileCandidate>, RetentionError> {
    let pattern = compile_pattern(pattern)?;
    let mut candidates = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(false)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                return Err(RetentionError::Listing {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() && !entry.path_is_symlink() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !pattern.matches_with(&name, MATCH_OPTIONS) {
            continue;
        }

        // Symlinks are judged by their target.
        let metadata = match std::fs::metadata(entry.path()) {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        let modified = match metadata.modified() {
            Ok(t) => t,
            Err(_) => continue,
        };

        candidates.push(FileCandidate {
            path: entry.path().to_path_buf(),
            modified,
            size_bytes: metadata.len(),
        });
    }

    Ok(candidates)
}
