//! Deterministic directory listing shared by the article and photo readers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Regular, non-hidden files directly inside `dir`, sorted by file name.
///
/// Subdirectories, symlinks to directories and dotfiles (`.DS_Store`,
/// editor swap files) are skipped.
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File name of a listed path as an owned string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
