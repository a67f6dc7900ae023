//! The built-in rule set.

use crate::{
    fn_length, line_length, no_unwrap_expect, tab_indentation, trailing_whitespace, Syntax,
};
use rustcop_core::{RuleDescriptor, RuleRegistry};

/// Returns every built-in rule descriptor, in dispatch order.
#[must_use]
pub fn all_descriptors() -> Vec<RuleDescriptor> {
    vec![
        line_length::DESCRIPTOR,
        trailing_whitespace::DESCRIPTOR,
        tab_indentation::DESCRIPTOR,
        no_unwrap_expect::DESCRIPTOR,
        fn_length::DESCRIPTOR,
    ]
}

/// Returns a registry holding every built-in rule.
#[must_use]
pub fn default_registry() -> RuleRegistry {
    all_descriptors()
        .into_iter()
        .fold(RuleRegistry::new(), RuleRegistry::with)
}

/// Returns the syntax pre-check run before any registered rule.
#[must_use]
pub fn syntax_check() -> Syntax {
    Syntax
}
