//! Rule traits, descriptors and the rule registry.

use crate::config::{Config, RuleConfig};
use crate::context::FileContext;
use crate::grammar::ParsedSource;
use crate::types::{Offence, Severity};

/// A per-file analysis rule ("cop").
///
/// Rules are instantiated per file from a [`RuleDescriptor`], bound to that
/// file's configuration entry, and receive the sanitized lines together with
/// the tokens, syntax tree and correlation of the file.
///
/// # Example
///
/// ```ignore
/// use rustcop_core::{FileContext, Offence, ParsedSource, Rule, Severity};
///
/// pub struct NoTodo;
///
/// impl Rule for NoTodo {
///     fn name(&self) -> &'static str { "no-todo" }
///     fn code(&self) -> &'static str { "RC100" }
///
///     fn inspect(&self, ctx: &FileContext, _parsed: &ParsedSource) -> Vec<Offence> {
///         ctx.numbered_lines()
///             .filter(|(_, l)| l.contains("TODO"))
///             .map(|(n, _)| Offence::new(self.code(), self.name(),
///                 Severity::Convention, ctx.line_location(n), "TODO left in code."))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case identifier of this rule, used as config key.
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "RC001").
    fn code(&self) -> &'static str;

    /// Returns the default severity for offences from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Convention
    }

    /// Inspects a single file and returns any offences found.
    fn inspect(&self, ctx: &FileContext, parsed: &ParsedSource) -> Vec<Offence>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// The privileged syntax pre-check.
///
/// Runs on sanitized lines alone, before any tokenizing. An offence of
/// severity [`Severity::Error`] or above stops every other rule for the file.
pub trait SyntaxCheck: Send + Sync {
    /// Returns the identifier of this check.
    fn name(&self) -> &'static str;

    /// Checks the file's lines and returns any offences found.
    fn check(&self, ctx: &FileContext) -> Vec<Offence>;
}

/// Builds a rule instance from its (optional) configuration entry.
pub type RuleFactory = fn(Option<&RuleConfig>) -> RuleBox;

/// Static description of a rule: identifier, code and factory.
#[derive(Clone, Copy)]
pub struct RuleDescriptor {
    /// Stable identifier, used as the configuration key.
    pub name: &'static str,
    /// Rule code (e.g., "RC001").
    pub code: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Creates an instance bound to a configuration entry.
    pub factory: RuleFactory,
}

impl RuleDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(
        name: &'static str,
        code: &'static str,
        description: &'static str,
        factory: RuleFactory,
    ) -> Self {
        Self {
            name,
            code,
            description,
            factory,
        }
    }

    /// Instantiates the rule with the settings `config` has for it.
    #[must_use]
    pub fn instantiate(&self, config: Option<&Config>) -> RuleBox {
        (self.factory)(config.and_then(|c| c.rule(self.name)))
    }
}

impl std::fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("name", &self.name)
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

/// Decides whether `rule` runs under `config`.
///
/// A rule is enabled unless the configuration has an entry for it with
/// `enabled = false`. No configuration at all means every rule is enabled.
#[must_use]
pub fn is_enabled(rule: &RuleDescriptor, config: Option<&Config>) -> bool {
    config.map_or(true, |c| c.is_rule_enabled(rule.name))
}

/// The ordered set of known rules.
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    descriptors: Vec<RuleDescriptor>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule; a descriptor with an already registered name replaces it
    /// in place.
    pub fn register(&mut self, descriptor: RuleDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.name == descriptor.name)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, descriptor: RuleDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// All descriptors in registration order.
    #[must_use]
    pub fn descriptors(&self) -> &[RuleDescriptor] {
        &self.descriptors
    }

    /// Looks up a descriptor by name or code.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RuleDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.name == key || d.code == key)
    }

    /// Descriptors enabled under `config`, in registration order.
    #[must_use]
    pub fn enabled(&self, config: Option<&Config>) -> Vec<&RuleDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| is_enabled(d, config))
            .collect()
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
