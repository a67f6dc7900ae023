//! Rule to limit the length of source lines.
//!
//! # Configuration
//!
//! - `max`: Maximum line length in characters (default: 100)

use rustcop_core::{
    FileContext, Offence, ParsedSource, Rule, RuleBox, RuleConfig, RuleDescriptor, Severity,
};

/// Rule code for line-length.
pub const CODE: &str = "RC001";

/// Rule name for line-length.
pub const NAME: &str = "line-length";

/// Registry entry for line-length.
pub const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    CODE,
    "Limits source lines to a maximum number of characters",
    build,
);

const DEFAULT_MAX: usize = 100;

/// Flags lines longer than `max` characters.
#[derive(Debug, Clone)]
pub struct LineLength {
    /// Maximum allowed characters per line.
    pub max: usize,
}

impl Default for LineLength {
    fn default() -> Self {
        Self::new()
    }
}

impl LineLength {
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

    /// Sets the maximum line length.
    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }
}

fn build(config: Option<&RuleConfig>) -> RuleBox {
    Box::new(LineLength::from_config(config))
}

impl Rule for LineLength {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn inspect(&self, ctx: &FileContext, _parsed: &ParsedSource) -> Vec<Offence> {
        ctx.numbered_lines()
            .filter_map(|(n, line)| {
                let length = line.chars().count();
                (length > self.max).then(|| {
                    Offence::new(
                        CODE,
                        NAME,
                        self.default_severity(),
                        ctx.location(n, self.max + 1),
                        format!("Line is too long. [{length}/{}]", self.max),
                    )
                })
            })
            .collect()
    }

    fn default_severity(&self) -> Severity {
        Severity::Convention
    }
}
