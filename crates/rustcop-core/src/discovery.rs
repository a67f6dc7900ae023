//! Discovery of source files to inspect.
//!
//! Targets given on the command line expand as follows:
//!
//! - a directory is scanned recursively for candidate source files
//! - an argument containing `*`, `?` or `[` is expanded as a glob
//! - anything else is taken literally, without checking that it exists
//!
//! With no targets the current directory is scanned. A file is a candidate
//! when it has the `.rs` extension, or has no extension and starts with a
//! `#!` line naming a Rust script runner.

use crate::paths::normalize_path;
use crate::sanitize::sanitize_line;
use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Source file extension.
pub const SOURCE_EXTENSION: &str = "rs";

/// Interpreters recognized in a `#!` line of an extensionless file.
pub const SCRIPT_INTERPRETERS: &[&str] = &["rust-script", "run-cargo-script", "cargo-script", "cargo"];

/// Directory names never descended into during a scan.
const SKIPPED_DIRS: &[&str] = &[".git", "target"];

/// Errors that can occur while expanding targets.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A target looked like a glob but was not a valid pattern.
    #[error("invalid glob pattern {pattern:?}")]
    Glob {
        /// The offending argument.
        pattern: String,
        /// Underlying pattern error.
        source: glob::PatternError,
    },

    /// A directory or glob match could not be read.
    #[error("failed to read {path}: {message}")]
    Walk {
        /// Path that failed.
        path: PathBuf,
        /// Error description.
        message: String,
    },
}

/// Expands command-line targets into the list of files to inspect.
///
/// Order follows the arguments, and within a directory the sorted scan
/// order. A path reachable through several arguments is kept once, at its
/// first position.
///
/// # Errors
///
/// Returns an error for an invalid glob or an unreadable directory.
pub fn discover<S: AsRef<str>>(args: &[S]) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();

    if args.is_empty() {
        files = scan_dir(Path::new("."))?
            .into_iter()
            .map(|p| p.strip_prefix(".").map(Path::to_path_buf).unwrap_or(p))
            .collect();
    }

    for arg in args {
        let arg = arg.as_ref();
        let path = Path::new(arg);
        if path.is_dir() {
            files.extend(scan_dir(path)?);
        } else if is_glob(arg) {
            files.extend(expand_glob(arg)?);
        } else {
            files.push(path.to_path_buf());
        }
    }

    Ok(dedup(files))
}

/// Recursively finds candidate source files under `root`, sorted by name.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn scan_dir(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));

    for entry in walker {
        let entry = entry.map_err(|e| DiscoveryError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() && is_candidate(entry.path()) {
            files.push(entry.into_path());
        }
    }

    debug!("Scanned {}: {} candidate files", root.display(), files.len());
    Ok(files)
}

/// Returns true if `path` should be inspected when found by a directory scan.
#[must_use]
pub fn is_candidate(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => ext == SOURCE_EXTENSION,
        None => has_script_shebang(path),
    }
}

/// Returns true if the first line of `path` is a `#!` line naming one of
/// [`SCRIPT_INTERPRETERS`].
#[must_use]
pub fn has_script_shebang(path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };
    let mut first = Vec::new();
    if let Err(e) = BufReader::new(file).read_until(b'\n', &mut first) {
        debug!("Cannot read {}: {}", path.display(), e);
        return false;
    }
    is_script_shebang(&sanitize_line(&first))
}

/// Checks a single line for a Rust script `#!` directive.
#[must_use]
pub fn is_script_shebang(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("#!") else {
        return false;
    };
    // `#![...]` is an inner attribute, not an interpreter directive.
    if rest.trim_start().starts_with('[') {
        return false;
    }
    rest.split_whitespace().any(|word| {
        let program = word.rsplit('/').next().unwrap_or(word);
        SCRIPT_INTERPRETERS.contains(&program)
    })
}

fn is_glob(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let entries = glob::glob(pattern).map_err(|source| DiscoveryError::Glob {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DiscoveryError::Walk {
            path: e.path().to_path_buf(),
            message: e.error().to_string(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Drops later spellings of an already listed file. Paths are compared
/// absolute and normalized; the first spelling is kept for display.
fn dedup(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let cwd = std::env::current_dir().ok();
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|p| {
            let key = match &cwd {
                Some(cwd) => normalize_path(&cwd.join(p)),
                None => normalize_path(p),
            };
            seen.insert(key)
        })
        .collect()
}
