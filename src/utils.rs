/*!
 * Utility functions for lmpack
 */

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use walkdir::{DirEntry, WalkDir};

/// Count files below `dir` for progress tracking
pub fn count_files(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| !e.file_type().is_dir() && !e.path().is_dir())
        .count() as u64
}

/// List a directory, returning `(directories, files)`, each sorted by name.
///
/// Symlinks are classified by their target, so a link to a directory is
/// listed with the directories.
pub fn list_dir(dir: &Path) -> io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() || path.is_dir() {
            dirs.push(path);
        } else {
            files.push(path);
        }
    }

    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok((dirs, files))
}

/// Walk ordering shared by the tree and the content section:
/// directories before files, then by name
pub fn entry_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir() || a.path().is_dir();
    let b_dir = b.file_type().is_dir() || b.path().is_dir();

    b_dir
        .cmp(&a_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Patterns excluded from every pack
pub static DEFAULT_IGNORES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version control & IDEs
        ".git/*",
        ".vs/*",
        ".vscode/*",
        ".idea/*",
        // Dependencies & build output
        "__pycache__/*",
        "node_modules/*",
        "*/obj/*",
        "*/bin/*",
        // Previous packs
        "*.lmpack.md",
        "*.lmpack.txt",
    ]
});

/// Ignore files whose patterns exclude paths entirely
pub static DEFAULT_IGNORE_FILES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec![".gitignore", ".dockerignore"]);

/// Files listed in the output without their content
pub static DEFAULT_CONTENT_IGNORES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        ".gitignore",
        ".dockerignore",
        ".gitattributes",
        ".editorconfig",
        "poetry.lock",
        "package-lock.json",
        "*.g.cs",
        "*.svg",
        "*.png",
        "*.jpg",
    ]
});

/// Ignore files whose patterns only suppress content
pub static DEFAULT_CONTENT_IGNORE_FILES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec![".aiexclude", ".aiignore", ".cursorignore"]);
