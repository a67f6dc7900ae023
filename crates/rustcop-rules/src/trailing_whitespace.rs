//! Rule to forbid whitespace at the end of lines.

use rustcop_core::{
    FileContext, Offence, ParsedSource, Rule, RuleBox, RuleConfig, RuleDescriptor,
};

/// Rule code for trailing-whitespace.
pub const CODE: &str = "RC002";

/// Rule name for trailing-whitespace.
pub const NAME: &str = "trailing-whitespace";

/// Registry entry for trailing-whitespace.
pub const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    CODE,
    "Forbids spaces and tabs at the end of lines",
    build,
);

/// Flags lines ending in spaces or tabs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingWhitespace;

fn build(_config: Option<&RuleConfig>) -> RuleBox {
    Box::new(TrailingWhitespace)
}

impl Rule for TrailingWhitespace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn inspect(&self, ctx: &FileContext, _parsed: &ParsedSource) -> Vec<Offence> {
        ctx.numbered_lines()
            .filter_map(|(n, line)| {
                let trimmed = line.trim_end_matches([' ', '\t']);
                (trimmed.len() < line.len()).then(|| {
                    Offence::new(
                        CODE,
                        NAME,
                        self.default_severity(),
                        ctx.location(n, trimmed.chars().count() + 1),
                        "Trailing whitespace detected.",
                    )
                })
            })
            .collect()
    }
}
