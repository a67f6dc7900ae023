//! Rule to forbid `.unwrap()` and `.expect()` in production code.
//!
//! # Rationale
//!
//! Using `.unwrap()` or `.expect()` can cause panics at runtime, which is
//! undesirable in production code. This rule helps enforce proper error handling.
//!
//! # Configuration
//!
//! - `allow_in_tests`: Allow in test code (default: true)
//! - `allow_expect`: Allow `.expect()` but forbid `.unwrap()` (default: false)
//!
//! # Suppression
//!
//! - `#[allow(clippy::unwrap_used)]` or `#[allow(clippy::expect_used)]` on the
//!   function

use crate::attributes::{has_allow_attr, has_cfg_test, has_test_attr};
use rustcop_core::{
    Correlation, FileContext, Offence, ParsedSource, Position, Rule, RuleBox, RuleConfig,
    RuleDescriptor, Severity,
};
use syn::visit::Visit;
use syn::{Expr, ExprMethodCall, ImplItemFn, ItemFn, ItemMod};

/// Rule code for no-unwrap-expect.
pub const CODE: &str = "RC004";

/// Rule name for no-unwrap-expect.
pub const NAME: &str = "no-unwrap-expect";

/// Registry entry for no-unwrap-expect.
pub const DESCRIPTOR: RuleDescriptor = RuleDescriptor::new(
    NAME,
    CODE,
    "Forbids .unwrap() and .expect() in production code",
    build,
);

/// Forbids `.unwrap()` and `.expect()` calls in production code.
#[derive(Debug, Clone)]
pub struct NoUnwrapExpect {
    /// Allow in test code.
    pub allow_in_tests: bool,
    /// Allow `.expect()` (only forbid `.unwrap()`).
    pub allow_expect: bool,
}

impl Default for NoUnwrapExpect {
    fn default() -> Self {
        Self::new()
    }
}

impl NoUnwrapExpect {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allow_in_tests: true,
            allow_expect: false,
        }
    }

    /// Creates the rule from its configuration entry.
    #[must_use]
    pub fn from_config(config: Option<&RuleConfig>) -> Self {
        let defaults = Self::new();
        match config {
            Some(c) => Self {
                allow_in_tests: c.get_bool("allow_in_tests", defaults.allow_in_tests),
                allow_expect: c.get_bool("allow_expect", defaults.allow_expect),
            },
            None => defaults,
        }
    }

    /// Sets whether to allow in test code.
    #[must_use]
    pub fn allow_in_tests(mut self, allow: bool) -> Self {
        self.allow_in_tests = allow;
        self
    }

    /// Sets whether to allow `.expect()`.
    #[must_use]
    pub fn allow_expect(mut self, allow: bool) -> Self {
        self.allow_expect = allow;
        self
    }
}

fn build(config: Option<&RuleConfig>) -> RuleBox {
    Box::new(NoUnwrapExpect::from_config(config))
}

impl Rule for NoUnwrapExpect {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn inspect(&self, ctx: &FileContext, parsed: &ParsedSource) -> Vec<Offence> {
        if self.allow_in_tests && ctx.is_test {
            return Vec::new();
        }

        let mut visitor = UnwrapExpectVisitor {
            ctx,
            rule: self,
            correlation: &parsed.correlation,
            offences: Vec::new(),
            in_test_context: false,
            in_allowed_context: false,
        };

        visitor.visit_file(&parsed.tree);
        visitor.offences
    }
}

struct UnwrapExpectVisitor<'a> {
    ctx: &'a FileContext<'a>,
    rule: &'a NoUnwrapExpect,
    correlation: &'a Correlation,
    offences: Vec<Offence>,
    in_test_context: bool,
    in_allowed_context: bool,
}

impl UnwrapExpectVisitor<'_> {
    /// Runs `walk` with the test and allow flags raised by `attrs`.
    fn scoped(&mut self, attrs: &[syn::Attribute], walk: impl FnOnce(&mut Self)) {
        let was_in_test = self.in_test_context;
        let was_allowed = self.in_allowed_context;

        if has_test_attr(attrs) || has_cfg_test(attrs) {
            self.in_test_context = true;
        }
        if has_allow_attr(attrs, &["clippy::unwrap_used", "clippy::expect_used"]) {
            self.in_allowed_context = true;
        }

        walk(self);

        self.in_test_context = was_in_test;
        self.in_allowed_context = was_allowed;
    }

    fn skipped(&self) -> bool {
        (self.rule.allow_in_tests && self.in_test_context) || self.in_allowed_context
    }
}

impl<'ast> Visit<'ast> for UnwrapExpectVisitor<'_> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        self.scoped(&node.attrs, |v| syn::visit::visit_item_mod(v, node));
    }

    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.scoped(&node.attrs, |v| syn::visit::visit_item_fn(v, node));
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        self.scoped(&node.attrs, |v| syn::visit::visit_impl_item_fn(v, node));
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        let is_unwrap = node.method == "unwrap";
        let is_expect = node.method == "expect";

        if !self.skipped() && (is_unwrap || (is_expect && !self.rule.allow_expect)) {
            let start = node.method.span().start();
            let pos = Position::new(start.line, start.column + 1);

            let mut message = if is_unwrap {
                ".unwrap() is forbidden in production code".to_string()
            } else {
                ".expect() is forbidden in production code".to_string()
            };
            if let Some(func) = self.correlation.enclosing_fn(pos) {
                message = format!("{message} (in `{}`)", func.name);
            }
            // partial_cmp().unwrap() panics on NaN
            if is_unwrap && is_partial_cmp_chain(&node.receiver) {
                message.push_str("; NaN comparison danger with partial_cmp");
            }

            self.offences.push(Offence::new(
                CODE,
                NAME,
                self.rule.default_severity(),
                self.ctx.location(pos.line, pos.column),
                message,
            ));
        }

        syn::visit::visit_expr_method_call(self, node);
    }
}

/// Checks if the receiver is a `partial_cmp()` call.
fn is_partial_cmp_chain(expr: &Expr) -> bool {
    if let Expr::MethodCall(call) = expr {
        call.method == "partial_cmp"
    } else {
        false
    }
}
