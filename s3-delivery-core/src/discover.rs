//! Finding the local files a delivery covers.

use std::fs::ReadDir;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions (lowercase, without the dot) expanded sheet by sheet.
pub const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Case-insensitive match of the file extension against [`SPREADSHEET_EXTENSIONS`].
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Recursively collects every regular file beneath `root`, sorted by path.
///
/// Directories are descended without following symlinked directories;
/// symlinks pointing at files are collected like the files themselves.
/// Only an unreadable `root` is an error. A subdirectory or entry that cannot
/// be read is logged at WARN and skipped, and its siblings are still collected.
pub fn collect_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    fn visit_dir(entries: ReadDir, results: &mut Vec<PathBuf>) {
        for entry_res in entries {
            let entry = match entry_res {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = ?e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!(path = %path.display(), error = ?e, "Skipping entry with unknown file type");
                    continue;
                }
            };
            if file_type.is_dir() {
                match std::fs::read_dir(&path) {
                    Ok(children) => visit_dir(children, results),
                    Err(e) => {
                        warn!(path = %path.display(), error = ?e, "Skipping unreadable directory")
                    }
                }
            } else if path.is_file() {
                results.push(path);
            } else {
                debug!(path = %path.display(), "Skipping non-regular entry");
            }
        }
    }

    let mut files = Vec::new();
    visit_dir(std::fs::read_dir(root)?, &mut files);
    files.sort();
    Ok(files)
}

/// Splits files into (spreadsheets, plain files), preserving order.
pub fn partition_spreadsheets(files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    files.into_iter().partition(|f| is_spreadsheet(f))
}

/// Object name for a file found under `root`: its relative path with `/`
/// separators regardless of platform.
pub fn relative_object_name(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
