//! Lexical path normalization.

use std::path::{Component, Path, PathBuf};

/// Removes `.` components and folds `name/..` pairs without touching the
/// filesystem.
///
/// A `..` with nothing left to fold is kept for relative paths and dropped
/// at the root of absolute ones.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(path: &str) -> PathBuf {
        normalize_path(Path::new(path))
    }

    #[test]
    fn test_drops_cur_dir() {
        assert_eq!(norm("./src/./a.rs"), PathBuf::from("src/a.rs"));
        assert_eq!(norm("."), PathBuf::from("."));
    }

    #[test]
    fn test_folds_parent_dir() {
        assert_eq!(norm("/tmp/cwd/../other"), PathBuf::from("/tmp/other"));
        assert_eq!(norm("a/b/../../c"), PathBuf::from("c"));
        assert_eq!(norm("a/.."), PathBuf::from("."));
    }

    #[test]
    fn test_keeps_leading_parent_dir_of_relative_path() {
        assert_eq!(norm("../other/a.rs"), PathBuf::from("../other/a.rs"));
        assert_eq!(norm("../../x"), PathBuf::from("../../x"));
    }

    #[test]
    fn test_parent_of_root_is_root() {
        assert_eq!(norm("/../etc"), PathBuf::from("/etc"));
    }
}
