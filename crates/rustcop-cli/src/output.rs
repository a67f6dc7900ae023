//! Report formatting for the terminal.

use rustcop_core::{FileReport, Offence, ReportMode, RuleRegistry, RunReport, Severity};
use std::io::{self, IsTerminal, Write};

const RESET: &str = "\x1b[0m";

/// Maps severities and run status to styled text.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Colors only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        let enabled = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    /// A palette that never emits escape codes.
    #[cfg(test)]
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    fn paint(self, color: &str, text: &str) -> String {
        if self.enabled {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// The one-letter severity code, colored by severity.
    pub fn severity(self, severity: Severity) -> String {
        let color = match severity {
            Severity::Convention => "\x1b[36m",
            Severity::Warning => "\x1b[35m",
            Severity::Error => "\x1b[31m",
            Severity::Fatal => "\x1b[1;31m",
        };
        self.paint(color, &severity.code().to_string())
    }

    /// A file header.
    pub fn header(self, text: &str) -> String {
        self.paint("\x1b[1m", text)
    }

    /// The summary line, green for a clean run and red otherwise.
    pub fn summary(self, run: &RunReport) -> String {
        let color = if run.total_offences == 0 {
            "\x1b[32m"
        } else {
            "\x1b[31m"
        };
        self.paint(color, &run.summary())
    }
}

fn write_offence(
    out: &mut impl Write,
    offence: &Offence,
    mode: ReportMode,
    palette: &Palette,
) -> io::Result<()> {
    let severity = palette.severity(offence.severity);
    let loc = &offence.location;
    match mode {
        ReportMode::Default => {
            writeln!(out, "{severity}: {:>3}: {}", loc.line, offence.message)
        }
        ReportMode::Emacs => {
            let column = loc.column.map(|c| format!(":{c}")).unwrap_or_default();
            writeln!(
                out,
                "{}:{}{column}: {severity}: {}",
                loc.file.display(),
                loc.line,
                offence.message
            )
        }
    }
}

/// Writes one file's block. Clean files print nothing.
pub fn write_file_report(
    out: &mut impl Write,
    report: &FileReport,
    mode: ReportMode,
    palette: &Palette,
) -> io::Result<()> {
    if report.is_empty() {
        return Ok(());
    }

    if mode == ReportMode::Default {
        let header = format!("== {} ==", report.path().display());
        writeln!(out, "{}", palette.header(&header))?;
    }
    for offence in &report.offences {
        write_offence(out, offence, mode, palette)?;
    }
    if mode == ReportMode::Default {
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the run summary line.
pub fn write_summary(out: &mut impl Write, run: &RunReport, palette: &Palette) -> io::Result<()> {
    writeln!(out, "{}", palette.summary(run))
}

/// Writes the registered rules, for debug mode.
pub fn write_cops_on_duty(out: &mut impl Write, registry: &RuleRegistry) -> io::Result<()> {
    writeln!(out, "Reporting for duty:")?;
    for d in registry.descriptors() {
        writeln!(out, "  {:<6} {:<22} {}", d.code, d.name, d.description)?;
    }
    writeln!(out)
}
