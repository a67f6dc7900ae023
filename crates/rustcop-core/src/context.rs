//! Context types for rule execution.

use crate::types::Location;
use std::path::Path;

/// Context provided to rules for the file being inspected.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    /// Path of the file, as discovered.
    pub path: &'a Path,
    /// Sanitized source lines, without line terminators.
    pub lines: &'a [String],
    /// Whether this file is detected as a test file.
    pub is_test: bool,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, lines: &'a [String]) -> Self {
        Self {
            path,
            lines,
            is_test: Self::detect_test_file(path),
        }
    }

    /// Returns the 1-indexed `line`, if it exists.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// Iterates `(line_number, text)` pairs, 1-indexed.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &'a str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, l)| (i + 1, l.as_str()))
    }

    /// Location in this file with a column.
    #[must_use]
    pub fn location(&self, line: usize, column: usize) -> Location {
        Location::new(self.path, line, column)
    }

    /// Location in this file without a column.
    #[must_use]
    pub fn line_location(&self, line: usize) -> Location {
        Location::line(self.path, line)
    }

    /// Detects if a file is a test file based on path conventions.
    fn detect_test_file(path: &Path) -> bool {
        for component in path.components() {
            if let std::path::Component::Normal(s) = component {
                let s = s.to_string_lossy();
                if s == "tests" || s == "benches" {
                    return true;
                }
            }
        }

        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            if file_name.ends_with("_test.rs")
                || file_name.ends_with("_tests.rs")
                || file_name == "tests.rs"
            {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_test_file() {
        assert!(FileContext::detect_test_file(Path::new("src/tests/foo.rs")));
        assert!(FileContext::detect_test_file(Path::new("tests/integration.rs")));
        assert!(FileContext::detect_test_file(Path::new("src/foo_test.rs")));
        assert!(!FileContext::detect_test_file(Path::new("src/foo.rs")));
        assert!(!FileContext::detect_test_file(Path::new("src/lib.rs")));
    }

    #[test]
    fn line_lookup_is_one_indexed() {
        let lines = vec!["first".to_string(), "second".to_string()];
        let ctx = FileContext::new(Path::new("a.rs"), &lines);
        assert_eq!(ctx.line(1), Some("first"));
        assert_eq!(ctx.line(2), Some("second"));
        assert_eq!(ctx.line(0), None);
        assert_eq!(ctx.line(3), None);
        assert_eq!(
            ctx.numbered_lines().collect::<Vec<_>>(),
            vec![(1, "first"), (2, "second")]
        );
    }

    #[test]
    fn locations_point_at_the_file() {
        let lines = Vec::new();
        let ctx = FileContext::new(Path::new("src/a.rs"), &lines);
        assert_eq!(ctx.location(3, 7), Location::new("src/a.rs", 3, 7));
        assert_eq!(ctx.line_location(3).column, None);
    }
}
