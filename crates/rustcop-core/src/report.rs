//! Per-file reports and run-wide offence aggregation.

use crate::types::{Offence, Severity};
use std::path::{Path, PathBuf};

/// How a file's inspection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionOutcome {
    /// The syntax pre-check reported an error; no other rule ran.
    SyntaxError,
    /// The grammar collaborator could not parse the file; no rule ran.
    GrammarFailure,
    /// Every enabled rule ran against the file.
    Analyzed,
}

/// Display mode for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// Grouped by file with a header line per file.
    #[default]
    Default,
    /// One self-contained `file:line:col: C: message` line per offence.
    Emacs,
}

/// Ordered offences found in a single file.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Path of the inspected file.
    pub path: PathBuf,
    /// How the inspection ended.
    pub outcome: InspectionOutcome,
    /// Offences in rule-registry order.
    pub offences: Vec<Offence>,
}

impl FileReport {
    /// Creates an empty report for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, outcome: InspectionOutcome) -> Self {
        Self {
            path: path.into(),
            outcome,
            offences: Vec::new(),
        }
    }

    /// Returns the inspected path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if no offences were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offences.is_empty()
    }

    /// Appends offences, keeping their order.
    pub fn extend(&mut self, offences: impl IntoIterator<Item = Offence>) {
        self.offences.extend(offences);
    }
}

/// Accumulated result of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Reports in inspection order.
    pub files: Vec<FileReport>,
    /// Number of files inspected.
    pub files_inspected: usize,
    /// Number of offences across every file.
    pub total_offences: usize,
}

impl RunReport {
    /// Creates an empty run report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one file's report.
    pub fn push(&mut self, report: FileReport) {
        self.files_inspected += 1;
        self.total_offences += report.offences.len();
        self.files.push(report);
    }

    /// Iterates every offence in file order, then rule order.
    pub fn offences(&self) -> impl Iterator<Item = &Offence> {
        self.files.iter().flat_map(|f| f.offences.iter())
    }

    /// Counts offences by severity as `(fatal, error, warning, convention)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize, usize) {
        let count = |s: Severity| self.offences().filter(|o| o.severity == s).count();
        (
            count(Severity::Fatal),
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Convention),
        )
    }

    /// Process exit status: 0 when no offences were found, 1 otherwise.
    #[must_use]
    pub fn exit_status(&self) -> i32 {
        i32::from(self.total_offences != 0)
    }

    /// The `"<N> files inspected, <M> offences detected"` summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} files inspected, {} offences detected",
            self.files_inspected, self.total_offences
        )
    }
}
