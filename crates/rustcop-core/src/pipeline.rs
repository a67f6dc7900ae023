//! Per-file inspection pipeline and run orchestration.
//!
//! Each file goes through:
//!
//! ```text
//! Sanitizing -> SyntaxChecking -+-> SyntaxError (only the pre-check's offences)
//!                               +-> Analyzing -+-> Analyzed (every enabled rule)
//!                                              +-> GrammarFailure (one fatal offence)
//! ```
//!
//! Files are inspected one at a time in discovery order.

use crate::config::{Config, ConfigError};
use crate::context::FileContext;
use crate::grammar::{Grammar, GrammarError, ParsedSource, RustGrammar};
use crate::paths::normalize_path;
use crate::report::{FileReport, InspectionOutcome, ReportMode, RunReport};
use crate::resolver::{user_config_path, ConfigResolver};
use crate::rule::{is_enabled, RuleRegistry, SyntaxCheck};
use crate::sanitize::split_lines;
use crate::types::{Offence, Severity};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Rule identifier used for grammar failures.
pub const GRAMMAR_RULE: &str = "grammar";

/// Rule code used for grammar failures.
pub const GRAMMAR_CODE: &str = "RC999";

/// Fatal errors that abort a run.
#[derive(Debug, Error)]
pub enum InspectError {
    /// A target file could not be read.
    #[error("failed to read {path}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The configuration for a file could not be loaded.
    #[error("configuration error while inspecting {path}")]
    Config {
        /// File whose configuration was being resolved.
        path: PathBuf,
        /// Underlying configuration error.
        source: ConfigError,
    },

    /// The explicit `--config` file could not be loaded.
    #[error(transparent)]
    ExplicitConfig(ConfigError),

    /// The working directory could not be determined.
    #[error("cannot determine working directory: {0}")]
    WorkingDir(std::io::Error),
}

/// Immutable options for one run, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Report display mode.
    pub mode: ReportMode,
    /// Verbose diagnostics.
    pub debug: bool,
    /// Suppress the summary line.
    pub silent: bool,
    /// Explicit configuration file overriding directory resolution.
    pub config: Option<PathBuf>,
    /// User-level fallback configuration file.
    pub user_config: Option<PathBuf>,
}

impl RunOptions {
    /// Default options with the user-level config taken from the
    /// environment or home directory.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            user_config: user_config_path(),
            ..Self::default()
        }
    }
}

/// Builder for configuring an [`Inspector`].
#[derive(Default)]
pub struct InspectorBuilder {
    registry: RuleRegistry,
    syntax_check: Option<Box<dyn SyntaxCheck>>,
    grammar: Option<Box<dyn Grammar>>,
    options: RunOptions,
    base_dir: Option<PathBuf>,
}

impl InspectorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rule registry.
    #[must_use]
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the privileged syntax pre-check.
    #[must_use]
    pub fn syntax_check<S: SyntaxCheck + 'static>(mut self, check: S) -> Self {
        self.syntax_check = Some(Box::new(check));
        self
    }

    /// Sets the grammar (defaults to [`RustGrammar`]).
    #[must_use]
    pub fn grammar<G: Grammar + 'static>(mut self, grammar: G) -> Self {
        self.grammar = Some(Box::new(grammar));
        self
    }

    /// Sets the run options.
    #[must_use]
    pub fn options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the directory relative paths are resolved against
    /// (defaults to the current directory).
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Builds the inspector.
    ///
    /// # Errors
    ///
    /// Returns an error if no base directory was given and the current
    /// directory cannot be determined.
    pub fn build(self) -> Result<Inspector, InspectError> {
        let base_dir = match self.base_dir {
            Some(dir) => dir,
            None => std::env::current_dir().map_err(InspectError::WorkingDir)?,
        };

        Ok(Inspector {
            registry: self.registry,
            syntax_check: self.syntax_check,
            grammar: self.grammar.unwrap_or_else(|| Box::new(RustGrammar)),
            options: self.options,
            base_dir,
        })
    }
}

/// Runs the inspection pipeline over files.
///
/// Use [`Inspector::builder()`] to construct an instance.
pub struct Inspector {
    registry: RuleRegistry,
    syntax_check: Option<Box<dyn SyntaxCheck>>,
    grammar: Box<dyn Grammar>,
    options: RunOptions,
    base_dir: PathBuf,
}

impl Inspector {
    /// Creates a new builder for configuring an inspector.
    #[must_use]
    pub fn builder() -> InspectorBuilder {
        InspectorBuilder::new()
    }

    /// Returns the rule registry.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Returns the run options.
    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Creates the config resolver for a run, loading the explicit
    /// configuration once if one was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit configuration cannot be loaded.
    pub fn resolver(&self) -> Result<ConfigResolver, InspectError> {
        match &self.options.config {
            Some(path) => {
                let resolver =
                    ConfigResolver::with_explicit(path).map_err(InspectError::ExplicitConfig)?;
                if let Some(config) = resolver.explicit_config() {
                    config
                        .validate(self.rule_names())
                        .map_err(InspectError::ExplicitConfig)?;
                }
                Ok(resolver)
            }
            None => Ok(ConfigResolver::new(self.options.user_config.clone())),
        }
    }

    fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registry.descriptors().iter().map(|d| d.name)
    }

    /// Inspects `files` in order and aggregates the results.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; see [`InspectError`].
    pub fn run(&self, files: &[PathBuf]) -> Result<RunReport, InspectError> {
        self.run_with(files, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_file` with each file's report as
    /// soon as it is complete.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; see [`InspectError`].
    pub fn run_with<F>(&self, files: &[PathBuf], mut on_file: F) -> Result<RunReport, InspectError>
    where
        F: FnMut(&FileReport),
    {
        info!("Inspecting {} files", files.len());

        // The resolver, and with it the config cache, lives for this run only.
        let mut resolver = self.resolver()?;
        let mut run = RunReport::new();

        for path in files {
            let report = self.inspect_file(path, &mut resolver)?;
            on_file(&report);
            run.push(report);
        }

        info!(
            "Inspection complete: {} offences in {} files",
            run.total_offences, run.files_inspected
        );
        Ok(run)
    }

    /// Inspects a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its configuration
    /// cannot be loaded.
    pub fn inspect_file(
        &self,
        path: &Path,
        resolver: &mut ConfigResolver,
    ) -> Result<FileReport, InspectError> {
        debug!("Inspecting: {}", path.display());

        // Sanitizing
        let content = std::fs::read(path).map_err(|source| InspectError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let lines = split_lines(&content);
        let ctx = FileContext::new(path, &lines);

        // SyntaxChecking
        let precheck = self
            .syntax_check
            .as_ref()
            .map(|check| check.check(&ctx))
            .unwrap_or_default();
        if precheck.iter().any(|o| o.severity >= Severity::Error) {
            debug!("Syntax error in {}, skipping rules", path.display());
            let mut report = FileReport::new(path, InspectionOutcome::SyntaxError);
            report.extend(precheck);
            return Ok(report);
        }

        // Analyzing
        let parsed = match self.grammar.parse(&lines) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                let mut report = FileReport::new(path, InspectionOutcome::GrammarFailure);
                report.extend([grammar_offence(path, &e)]);
                return Ok(report);
            }
        };

        let start_dir = self.start_dir(path);
        let config = resolver
            .resolve(&start_dir)
            .and_then(|config| {
                if let Some(c) = &config {
                    c.validate(self.rule_names())?;
                }
                Ok(config)
            })
            .map_err(|source| InspectError::Config {
                path: path.to_path_buf(),
                source,
            })?;

        let mut report = FileReport::new(path, InspectionOutcome::Analyzed);
        report.extend(precheck);
        report.extend(self.dispatch(&ctx, &parsed, config.as_deref()));
        Ok(report)
    }

    /// Runs every enabled rule, in registry order.
    fn dispatch(
        &self,
        ctx: &FileContext,
        parsed: &ParsedSource,
        config: Option<&Config>,
    ) -> Vec<Offence> {
        let mut offences = Vec::new();

        for descriptor in self.registry.descriptors() {
            if !is_enabled(descriptor, config) {
                debug!("Skipping disabled rule: {}", descriptor.name);
                continue;
            }

            let rule = descriptor.instantiate(config);
            let mut found = rule.inspect(ctx, parsed);
            if let Some(severity) = config.and_then(|c| c.rule_severity(descriptor.name)) {
                for o in &mut found {
                    o.severity = severity;
                }
            }
            offences.extend(found);
        }

        offences
    }

    /// Absolute directory configuration lookup starts from.
    fn start_dir(&self, path: &Path) -> PathBuf {
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        normalize_path(&self.base_dir.join(parent))
    }
}

fn grammar_offence(path: &Path, error: &GrammarError) -> Offence {
    Offence::new(
        GRAMMAR_CODE,
        GRAMMAR_RULE,
        Severity::Fatal,
        crate::types::Location::new(path, error.line(), error.column()),
        error.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::rule::{Rule, RuleBox, RuleDescriptor};
    use std::fs;
    use tempfile::TempDir;

    /// Reports one offence per file at line 1.
    struct Always;

    impl Rule for Always {
        fn name(&self) -> &'static str {
            "always"
        }
        fn code(&self) -> &'static str {
            "T001"
        }
        fn inspect(&self, ctx: &FileContext, _parsed: &ParsedSource) -> Vec<Offence> {
            vec![Offence::new(
                self.code(),
                self.name(),
                self.default_severity(),
                ctx.line_location(1),
                "always",
            )]
        }
    }

    fn build_always(_: Option<&RuleConfig>) -> RuleBox {
        Box::new(Always)
    }

    /// Flags lines containing `BROKEN` as syntax errors.
    struct MarkerSyntax;

    impl SyntaxCheck for MarkerSyntax {
        fn name(&self) -> &'static str {
            "syntax"
        }
        fn check(&self, ctx: &FileContext) -> Vec<Offence> {
            ctx.numbered_lines()
                .filter(|(_, l)| l.contains("BROKEN"))
                .map(|(n, _)| {
                    Offence::new("T000", "syntax", Severity::Error, ctx.line_location(n), "broken")
                })
                .collect()
        }
    }

    struct FailingGrammar;

    impl Grammar for FailingGrammar {
        fn parse(&self, _lines: &[String]) -> Result<ParsedSource, GrammarError> {
            Err(GrammarError::Parse {
                line: 2,
                column: 3,
                message: "unexpected token".to_string(),
            })
        }
    }

    fn registry() -> RuleRegistry {
        RuleRegistry::new()
            .with(RuleDescriptor::new("always", "T001", "", build_always))
            .with(RuleDescriptor::new("always-too", "T002", "", build_always))
    }

    fn inspector(dir: &Path) -> Inspector {
        Inspector::builder()
            .registry(registry())
            .syntax_check(MarkerSyntax)
            .base_dir(dir)
            .build()
            .unwrap()
    }

    #[test]
    fn syntax_error_short_circuits_rules() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("bad.rs");
        fs::write(&file, "fn main() {}\nBROKEN\n").unwrap();

        let run = inspector(tmp.path()).run(&[file]).unwrap();
        let report = &run.files[0];
        assert_eq!(report.outcome, InspectionOutcome::SyntaxError);
        assert_eq!(report.offences.len(), 1);
        assert_eq!(report.offences[0].rule, "syntax");
        assert_eq!(report.offences[0].location.line, 2);
    }

    #[test]
    fn valid_file_runs_every_enabled_rule_in_order() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("ok.rs");
        fs::write(&file, "fn main() {}\n").unwrap();

        let run = inspector(tmp.path()).run(&[file]).unwrap();
        let rules: Vec<&str> = run.files[0].offences.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(rules, vec!["T001", "T002"]);
        assert_eq!(run.files[0].outcome, InspectionOutcome::Analyzed);
    }

    #[test]
    fn disabled_rule_never_reports() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(".rustcop.toml"),
            "[always]\nenabled = false\n",
        )
        .unwrap();
        let file = tmp.path().join("ok.rs");
        fs::write(&file, "fn main() {}\n").unwrap();

        let run = inspector(tmp.path()).run(&[file]).unwrap();
        let rules: Vec<&str> = run.files[0].offences.iter().map(|o| o.rule.as_str()).collect();
        assert_eq!(rules, vec!["always-too"]);
    }

    #[test]
    fn severity_override_applies() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(".rustcop.toml"),
            "[always]\nseverity = \"error\"\n",
        )
        .unwrap();
        let file = tmp.path().join("ok.rs");
        fs::write(&file, "fn main() {}\n").unwrap();

        let run = inspector(tmp.path()).run(&[file]).unwrap();
        assert_eq!(run.files[0].offences[0].severity, Severity::Error);
        assert_eq!(run.files[0].offences[1].severity, Severity::Convention);
    }

    #[test]
    fn grammar_failure_is_isolated_per_file() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.rs");
        let b = tmp.path().join("b.rs");
        fs::write(&a, "fn a() {}\n").unwrap();
        fs::write(&b, "fn b() {}\n").unwrap();

        let inspector = Inspector::builder()
            .registry(registry())
            .grammar(FailingGrammar)
            .base_dir(tmp.path())
            .build()
            .unwrap();
        let run = inspector.run(&[a, b]).unwrap();

        assert_eq!(run.files_inspected, 2);
        for report in &run.files {
            assert_eq!(report.outcome, InspectionOutcome::GrammarFailure);
            assert_eq!(report.offences.len(), 1);
            assert_eq!(report.offences[0].severity, Severity::Fatal);
            assert_eq!(report.offences[0].rule, GRAMMAR_RULE);
            assert_eq!(report.offences[0].location.line, 2);
        }
    }

    #[test]
    fn missing_file_is_fatal_with_path() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.rs");
        let err = inspector(tmp.path()).run(&[missing.clone()]).unwrap_err();
        match err {
            InspectError::Read { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_config_is_fatal_with_file_context() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".rustcop.toml"), "[always\n").unwrap();
        let file = tmp.path().join("ok.rs");
        fs::write(&file, "fn main() {}\n").unwrap();

        let err = inspector(tmp.path()).run(&[file.clone()]).unwrap_err();
        assert!(matches!(err, InspectError::Config { ref path, .. } if *path == file));
        assert!(err.to_string().contains("ok.rs"));
    }

    #[test]
    fn sibling_file_does_not_use_origin_config() {
        let tmp = TempDir::new().unwrap();
        let cwd = tmp.path().join("cwd");
        let other = tmp.path().join("other");
        fs::create_dir_all(&cwd).unwrap();
        fs::create_dir_all(&other).unwrap();
        fs::write(cwd.join(".rustcop.toml"), "[always]\nenabled = false\n").unwrap();
        fs::write(other.join("a.rs"), "fn main() {}\n").unwrap();

        let run = inspector(&cwd).run(&[cwd.join("../other/a.rs")]).unwrap();
        let rules: Vec<&str> = run.files[0].offences.iter().map(|o| o.rule.as_str()).collect();
        assert_eq!(rules, vec!["always", "always-too"]);
    }

    #[test]
    fn malformed_entry_for_unregistered_rule_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(".rustcop.toml"),
            "[old-cop]\nenabled = \"yes\"\n\n[always]\nenabled = false\n",
        )
        .unwrap();
        let file = tmp.path().join("ok.rs");
        fs::write(&file, "fn main() {}\n").unwrap();

        let run = inspector(tmp.path()).run(&[file]).unwrap();
        let rules: Vec<&str> = run.files[0].offences.iter().map(|o| o.rule.as_str()).collect();
        assert_eq!(rules, vec!["always-too"]);
    }

    #[test]
    fn malformed_entry_for_registered_rule_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".rustcop.toml"), "[always]\nenabled = \"yes\"\n").unwrap();
        let file = tmp.path().join("ok.rs");
        fs::write(&file, "fn main() {}\n").unwrap();

        let err = inspector(tmp.path()).run(&[file.clone()]).unwrap_err();
        match err {
            InspectError::Config { path, source } => {
                assert_eq!(path, file);
                assert!(source.to_string().contains("`always`"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn syntax_error_does_not_need_config() {
        // A malformed config is never loaded for a file that fails the pre-check.
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".rustcop.toml"), "[always\n").unwrap();
        let file = tmp.path().join("bad.rs");
        fs::write(&file, "BROKEN\n").unwrap();

        let run = inspector(tmp.path()).run(&[file]).unwrap();
        assert_eq!(run.total_offences, 1);
    }

    #[test]
    fn explicit_config_applies_to_every_file() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "[always-too]\nenabled = false\n").unwrap();
        let nested = tmp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join(".rustcop.toml"), "[always]\nenabled = false\n").unwrap();
        let file = nested.join("ok.rs");
        fs::write(&file, "fn main() {}\n").unwrap();

        let inspector = Inspector::builder()
            .registry(registry())
            .options(RunOptions {
                config: Some(explicit),
                ..RunOptions::default()
            })
            .base_dir(tmp.path())
            .build()
            .unwrap();
        let run = inspector.run(&[file]).unwrap();
        let rules: Vec<&str> = run.files[0].offences.iter().map(|o| o.rule.as_str()).collect();
        assert_eq!(rules, vec!["always"]);
    }

    #[test]
    fn invalid_explicit_config_aborts_before_any_file() {
        let tmp = TempDir::new().unwrap();
        let inspector = Inspector::builder()
            .options(RunOptions {
                config: Some(tmp.path().join("missing.toml")),
                ..RunOptions::default()
            })
            .base_dir(tmp.path())
            .build()
            .unwrap();
        let mut seen = 0;
        let err = inspector.run_with(&[], |_| seen += 1).unwrap_err();
        assert!(matches!(err, InspectError::ExplicitConfig(_)));
        assert_eq!(seen, 0);
    }

    #[test]
    fn explicit_config_with_malformed_rule_entry_aborts_up_front() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "always-too = 1\n").unwrap();
        let inspector = Inspector::builder()
            .registry(registry())
            .options(RunOptions {
                config: Some(explicit),
                ..RunOptions::default()
            })
            .base_dir(tmp.path())
            .build()
            .unwrap();

        let err = inspector.run(&[]).unwrap_err();
        assert!(matches!(err, InspectError::ExplicitConfig(_)));
        assert!(err.to_string().contains("`always-too`"));
    }

    #[test]
    fn run_with_reports_files_in_order() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.rs");
        let b = tmp.path().join("b.rs");
        fs::write(&a, "fn a() {}\n").unwrap();
        fs::write(&b, "BROKEN\n").unwrap();

        let mut seen = Vec::new();
        let run = inspector(tmp.path())
            .run_with(&[a.clone(), b.clone()], |r| seen.push(r.path.clone()))
            .unwrap();
        assert_eq!(seen, vec![a, b]);
        assert_eq!(run.total_offences, 3);
        assert_eq!(run.exit_status(), 1);
    }
}
