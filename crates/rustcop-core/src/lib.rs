//! # rustcop-core
//!
//! Core inspection pipeline for the rustcop source linter.
//!
//! This crate provides:
//!
//! - [`sanitize_line`] / [`split_lines`] for turning raw bytes into lines
//! - [`ConfigResolver`] for nearest-ancestor configuration lookup with a
//!   per-run cache
//! - [`discover`] for expanding command-line targets into files
//! - [`Grammar`] and [`RustGrammar`] producing tokens, syntax tree and
//!   correlation
//! - [`Rule`], [`SyntaxCheck`] and [`RuleRegistry`] for pluggable cops
//! - [`Inspector`] for running the per-file pipeline and aggregating a
//!   [`RunReport`]
//!
//! ## Example
//!
//! ```ignore
//! use rustcop_core::{discover, Inspector, RunOptions};
//!
//! let files = discover(&["src"])?;
//! let inspector = Inspector::builder()
//!     .registry(my_registry())
//!     .syntax_check(MySyntaxCheck)
//!     .options(RunOptions::from_env())
//!     .build()?;
//!
//! let run = inspector.run(&files)?;
//! std::process::exit(run.exit_status());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod discovery;
mod grammar;
mod paths;
mod pipeline;
mod report;
mod resolver;
mod rule;
mod sanitize;
mod types;

pub use config::{Config, ConfigError, RuleConfig};
pub use context::FileContext;
pub use discovery::{
    discover, has_script_shebang, is_candidate, is_script_shebang, scan_dir, DiscoveryError,
    SCRIPT_INTERPRETERS, SOURCE_EXTENSION,
};
pub use grammar::{
    source_text, Correlation, Delim, Grammar, GrammarError, Node, NodeKind, ParsedSource,
    Position, RustGrammar, Token, TokenKind,
};
pub use paths::normalize_path;
pub use pipeline::{
    InspectError, Inspector, InspectorBuilder, RunOptions, GRAMMAR_CODE, GRAMMAR_RULE,
};
pub use report::{FileReport, InspectionOutcome, ReportMode, RunReport};
pub use resolver::{
    locate, user_config_path, ConfigResolver, ConfigSource, CONFIG_FILE_NAMES, USER_CONFIG_ENV,
    USER_CONFIG_NAME,
};
pub use rule::{is_enabled, Rule, RuleBox, RuleDescriptor, RuleFactory, RuleRegistry, SyntaxCheck};
pub use sanitize::{sanitize_line, split_lines};
pub use types::{Location, Offence, Severity};
