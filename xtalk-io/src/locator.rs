//! Input file discovery.

use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Finds simulation output files in a directory.
pub struct FileSetLocator;

impl FileSetLocator {
    /// Lists regular files in `dir` whose name contains `marker`.
    ///
    /// The scan is not recursive. Names are sorted so that runs are
    /// reproducible regardless of directory enumeration order. A directory
    /// that cannot be read yields an empty list; callers decide whether that
    /// is fatal.
    #[must_use]
    pub fn locate(dir: &Path, marker: &str) -> Vec<String> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot read input directory {}: {e}", dir.display());
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.contains(marker))
            .collect();
        names.sort();

        debug!(
            "found {} file(s) matching '{marker}' in {}",
            names.len(),
            dir.display()
        );
        names
    }
}
