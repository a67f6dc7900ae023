//! Privileged syntax pre-check.
//!
//! Parses the sanitized lines with `syn` before anything else runs. A file
//! that fails here gets exactly one offence and no other rule is consulted.

use rustcop_core::{source_text, FileContext, Offence, Severity, SyntaxCheck};
use tracing::debug;

/// Rule code for syntax.
pub const CODE: &str = "RC000";

/// Rule name for syntax.
pub const NAME: &str = "syntax";

/// Reports the first syntax error of a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Syntax;

impl SyntaxCheck for Syntax {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, ctx: &FileContext) -> Vec<Offence> {
        let source = source_text(ctx.lines);
        let Err(error) = syn::parse_file(&source) else {
            return Vec::new();
        };

        let start = error.span().start();
        // Errors at end of input may carry a synthetic span.
        let line = start.line.clamp(1, ctx.lines.len().max(1));
        debug!("Syntax error in {} at line {}", ctx.path.display(), line);

        vec![Offence::new(
            CODE,
            NAME,
            Severity::Error,
            ctx.location(line, start.column + 1),
            error.to_string(),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn check_code(code: &str) -> Vec<Offence> {
        let lines: Vec<String> = code.lines().map(String::from).collect();
        let ctx = FileContext::new(Path::new("test.rs"), &lines);
        Syntax.check(&ctx)
    }

    #[test]
    fn valid_file_passes() {
        assert!(check_code("fn main() {\n    println!(\"hi\");\n}\n").is_empty());
    }

    #[test]
    fn empty_file_passes() {
        assert!(check_code("").is_empty());
    }

    #[test]
    fn detects_missing_semicolon() {
        let offences = check_code("fn main() {\n    let x = 1;\n    let y = 2 3;\n}\n");
        assert_eq!(offences.len(), 1);
        assert_eq!(offences[0].code, CODE);
        assert_eq!(offences[0].severity, Severity::Error);
        assert_eq!(offences[0].location.line, 3);
    }

    #[test]
    fn detects_unclosed_delimiter() {
        let offences = check_code("fn main() {\n    let x = (1, 2;\n}\n");
        assert_eq!(offences.len(), 1);
        assert_eq!(offences[0].severity, Severity::Error);
    }

    #[test]
    fn shebang_scripts_parse() {
        assert!(check_code("#!/usr/bin/env rust-script\nfn main() {}\n").is_empty());
    }

    #[test]
    fn reported_line_is_within_file() {
        let offences = check_code("fn main() {");
        assert_eq!(offences.len(), 1);
        assert_eq!(offences[0].location.line, 1);
    }
}
