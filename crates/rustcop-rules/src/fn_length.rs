//! Rule to limit the body length of functions.
//!
//! Counts the lines strictly between a function's first and last line,
//! ignoring blank lines and `//` comment lines.
//!
//! # Configuration
//!
//! - `max`: Maximum body lines (default: 50)

use rustcop_core::{
    FileContext, NodeKind, Offence, ParsedSource, Rule, RuleBox, RuleConfig, RuleDescriptor,
};

/// Rule code for fn-length.
pub const CODE: &str = "RC005";

/// Rule name for fn-length.
pub const NAME: &str = "fn-length";

/// Registry entry for fn-length.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, CODE, "Limits the number of lines in a function body", build);

const DEFAULT_MAX: usize = 50;

/// Flags functions whose body exceeds `max` code lines.
#[derive(Debug, Clone)]
pub struct FnLength {
    /// Maximum allowed body lines.
    pub max: usize,
}

impl Default for FnLength {
    fn default() -> Self {
        Self::new()
    }
}

impl FnLength {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self { max: DEFAULT_MAX }
    }

    /// Creates the rule from its configuration entry.
    #[must_use]
    pub fn from_config(config: Option<&RuleConfig>) -> Self {
        let max = config
            .map(|c| c.get_int("max", 0))
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX);
        Self { max }
    }

    /// Sets the maximum body length.
    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }
}

fn build(config: Option<&RuleConfig>) -> RuleBox {
    Box::new(FnLength::from_config(config))
}

fn is_code_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with("//")
}

impl Rule for FnLength {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn inspect(&self, ctx: &FileContext, parsed: &ParsedSource) -> Vec<Offence> {
        parsed
            .correlation
            .nodes()
            .iter()
            .filter(|node| node.kind == NodeKind::Fn && node.end.line > node.start.line + 1)
            .filter_map(|node| {
                let body = (node.start.line + 1..node.end.line)
                    .filter_map(|n| ctx.line(n))
                    .filter(|line| is_code_line(line))
                    .count();
                (body > self.max).then(|| {
                    Offence::new(
                        CODE,
                        NAME,
                        self.default_severity(),
                        ctx.location(node.start.line, node.start.column),
                        format!(
                            "Function `{}` has too many lines. [{body}/{}]",
                            node.name, self.max
                        ),
                    )
                })
            })
            .collect()
    }
}
