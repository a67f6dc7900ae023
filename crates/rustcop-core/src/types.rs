//! Core types for offences reported by rules.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Severity level for offences.
///
/// Ordered from least to most severe, so `severity >= Severity::Error`
/// selects offences that make a file unanalyzable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Style convention that should be followed.
    Convention,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
    /// The file could not be analyzed at all.
    Fatal,
}

impl Severity {
    /// Single-letter code used in report lines (`C`, `W`, `E`, `F`).
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Convention => 'C',
            Self::Warning => 'W',
            Self::Error => 'E',
            Self::Fatal => 'F',
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Convention => write!(f, "convention"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Source code location of an offence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path as it was discovered.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed), when the rule knows it.
    pub column: Option<usize>,
}

impl Location {
    /// Creates a line-only location.
    #[must_use]
    pub fn line(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
        }
    }

    /// Creates a location with an explicit column.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column: Some(column),
        }
    }
}

/// A single finding reported by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offence {
    /// Rule code (e.g., "RC001").
    pub code: String,
    /// Rule identifier (e.g., "line-length").
    pub rule: String,
    /// Severity of this offence.
    pub severity: Severity,
    /// Where the offence was found.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
}

impl Offence {
    /// Creates a new offence.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
        }
    }

    /// Returns the file this offence belongs to.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.location.file
    }
}

impl std::fmt::Display for Offence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:",
            self.location.file.display(),
            self.location.line
        )?;
        if let Some(column) = self.location.column {
            write!(f, "{column}:")?;
        }
        write!(
            f,
            " {}: [{}] {}",
            self.severity.code(),
            self.code,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Convention < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn severity_codes() {
        assert_eq!(Severity::Convention.code(), 'C');
        assert_eq!(Severity::Warning.code(), 'W');
        assert_eq!(Severity::Error.code(), 'E');
        assert_eq!(Severity::Fatal.code(), 'F');
    }

    #[test]
    fn offence_display_with_column() {
        let o = Offence::new(
            "RC001",
            "line-length",
            Severity::Convention,
            Location::new("src/lib.rs", 12, 101),
            "Line is too long. [120/100]",
        );
        assert_eq!(
            o.to_string(),
            "src/lib.rs:12:101: C: [RC001] Line is too long. [120/100]"
        );
    }

    #[test]
    fn offence_display_without_column() {
        let o = Offence::new(
            "RC000",
            "syntax",
            Severity::Error,
            Location::line("broken.rs", 3),
            "expected `;`",
        );
        assert_eq!(o.to_string(), "broken.rs:3: E: [RC000] expected `;`");
    }

    #[test]
    fn severity_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            severity: Severity,
        }
        let w: Wrapper = toml::from_str("severity = \"warning\"").unwrap();
        assert_eq!(w.severity, Severity::Warning);
    }
}
