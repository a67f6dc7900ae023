//! # rustcop-rules
//!
//! Built-in cops for rustcop.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | RC000 | `syntax` | Reports syntax errors; runs before every other rule |
//! | RC001 | `line-length` | Limits line length (`max`, default 100) |
//! | RC002 | `trailing-whitespace` | Forbids whitespace at the end of lines |
//! | RC003 | `tab-indentation` | Forbids hard tabs in indentation |
//! | RC004 | `no-unwrap-expect` | Forbids `.unwrap()` and `.expect()` in production code |
//! | RC005 | `fn-length` | Limits function body length (`max`, default 50) |
//!
//! ## Usage
//!
//! ```ignore
//! use rustcop_core::Inspector;
//! use rustcop_rules::{default_registry, syntax_check};
//!
//! let inspector = Inspector::builder()
//!     .registry(default_registry())
//!     .syntax_check(syntax_check())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attributes;
mod fn_length;
mod line_length;
mod no_unwrap_expect;
mod registry;
mod syntax;
mod tab_indentation;
mod trailing_whitespace;

pub use fn_length::FnLength;
pub use line_length::LineLength;
pub use no_unwrap_expect::NoUnwrapExpect;
pub use registry::{all_descriptors, default_registry, syntax_check};
pub use syntax::Syntax;
pub use tab_indentation::TabIndentation;
pub use trailing_whitespace::TrailingWhitespace;

/// Re-export core types for convenience.
pub use rustcop_core::{Offence, Rule, Severity};
