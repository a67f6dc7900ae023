//! Configuration file resolution with a per-run cache.
//!
//! For a file's directory the effective configuration is found as follows:
//!
//! 1. `--config` override, if the run has one (applies to every file)
//! 2. the nearest ancestor directory holding `.rustcop.toml` or `rustcop.toml`
//! 3. the user-level file (`$RUSTCOP_USER_CONFIG`, else `~/.rustcop.toml`)
//! 4. nothing found: every rule runs with its defaults
//!
//! Levels are never merged. The first file found wins.

use crate::config::{Config, ConfigError};
use crate::paths::normalize_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Config file names checked in each directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[".rustcop.toml", "rustcop.toml"];

/// Name of the user-level config file inside the home directory.
pub const USER_CONFIG_NAME: &str = ".rustcop.toml";

/// Environment variable overriding the user-level config path.
pub const USER_CONFIG_ENV: &str = "RUSTCOP_USER_CONFIG";

/// Where a configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config`.
    Explicit(PathBuf),
    /// Found in the starting directory or one of its ancestors.
    Ancestor(PathBuf),
    /// Loaded from the user-level fallback.
    User(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Ancestor(p) | Self::User(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Returns the user-level config path.
///
/// Resolution: `$RUSTCOP_USER_CONFIG` > `~/.rustcop.toml`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(USER_CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    home::home_dir().map(|h| h.join(USER_CONFIG_NAME))
}

/// Finds the config file that applies to `start_dir` without loading it.
///
/// `start_dir` is normalized first so that the walk only visits real
/// ancestors, never a directory reached back through `..`.
#[must_use]
pub fn locate(start_dir: &Path, user_config: Option<&Path>) -> ConfigSource {
    let start_dir = normalize_path(start_dir);
    for dir in start_dir.ancestors() {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return ConfigSource::Ancestor(candidate);
            }
        }
    }

    if let Some(user) = user_config {
        if user.is_file() {
            return ConfigSource::User(user.to_path_buf());
        }
    }

    ConfigSource::Default
}

/// Resolves and caches the configuration for each starting directory.
///
/// One resolver lives for one run. Entries are never evicted or refreshed,
/// so a config file edited mid-run is not observed.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    explicit: Option<(PathBuf, Arc<Config>)>,
    user_config: Option<PathBuf>,
    cache: HashMap<PathBuf, Option<Arc<Config>>>,
}

impl ConfigResolver {
    /// Creates a resolver using `user_config` as the last-resort fallback.
    #[must_use]
    pub fn new(user_config: Option<PathBuf>) -> Self {
        Self {
            explicit: None,
            user_config,
            cache: HashMap::new(),
        }
    }

    /// Creates a resolver that ignores the directory tree and always
    /// returns the configuration loaded from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn with_explicit(path: &Path) -> Result<Self, ConfigError> {
        let config = Config::from_file(path)?;
        debug!("Using explicit config: {}", path.display());
        Ok(Self {
            explicit: Some((path.to_path_buf(), Arc::new(config))),
            user_config: None,
            cache: HashMap::new(),
        })
    }

    /// The `--config` override, if this resolver has one.
    #[must_use]
    pub fn explicit_config(&self) -> Option<&Config> {
        self.explicit.as_ref().map(|(_, config)| config.as_ref())
    }

    /// Describes where the configuration for `start_dir` comes from.
    #[must_use]
    pub fn source_for(&self, start_dir: &Path) -> ConfigSource {
        match &self.explicit {
            Some((path, _)) => ConfigSource::Explicit(path.clone()),
            None => locate(start_dir, self.user_config.as_deref()),
        }
    }

    /// Returns the configuration for files in `start_dir`, or `None` when no
    /// configuration file applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the applicable config file is malformed or
    /// unreadable. Failed loads are not cached.
    pub fn resolve(&mut self, start_dir: &Path) -> Result<Option<Arc<Config>>, ConfigError> {
        if let Some((_, config)) = &self.explicit {
            return Ok(Some(Arc::clone(config)));
        }

        let start_dir = normalize_path(start_dir);
        if let Some(cached) = self.cache.get(&start_dir) {
            debug!("Config cache hit: {}", start_dir.display());
            return Ok(cached.clone());
        }

        let source = locate(&start_dir, self.user_config.as_deref());
        let config = match source.path() {
            Some(path) => {
                debug!("Loading config for {}: {:?}", start_dir.display(), source);
                Some(Arc::new(Config::from_file(path)?))
            }
            None => {
                debug!("No config for {}", start_dir.display());
                None
            }
        };

        self.cache.insert(start_dir, config.clone());
        Ok(config)
    }

    /// Number of starting directories resolved so far.
    #[must_use]
    pub fn cached_dirs(&self) -> usize {
        self.cache.len()
    }
}
