//! Rule to forbid hard tabs in indentation.

use rustcop_core::{
    FileContext, Offence, ParsedSource, Rule, RuleBox, RuleConfig, RuleDescriptor,
};

/// Rule code for tab-indentation.
pub const CODE: &str = "RC003";

/// Rule name for tab-indentation.
pub const NAME: &str = "tab-indentation";

/// Registry entry for tab-indentation.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, CODE, "Forbids hard tabs in indentation", build);

/// Flags tab characters in leading whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabIndentation;

fn build(_config: Option<&RuleConfig>) -> RuleBox {
    Box::new(TabIndentation)
}

impl Rule for TabIndentation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn inspect(&self, ctx: &FileContext, _parsed: &ParsedSource) -> Vec<Offence> {
        ctx.numbered_lines()
            .filter_map(|(n, line)| {
                let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
                line[..indent].find('\t').map(|col| {
                    Offence::new(
                        CODE,
                        NAME,
                        self.default_severity(),
                        ctx.location(n, col + 1),
                        "Tab detected.",
                    )
                })
            })
            .collect()
    }
}
