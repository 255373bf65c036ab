//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order; the first existing file wins:
//! 1. Explicit path (`--config`); must exist
//! 2. `$FORGEGATE_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/forgegate/config.toml`
//! 4. `~/.forgegate/config.toml`
//!
//! A missing file is not an error; defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use forgegate::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Retry policy: {:?}", config.retry_policy());
//! if let Some(repo) = config.repo_coordinates() {
//!     println!("Repository: {}", repo);
//! }
//! ```

pub mod schema;

pub use schema::{ForgeSection, GatewayConfig, RepoSection, RetrySection};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::RepoCoordinates;
use crate::forge::ForgeProvider;
use crate::gateway::RetryPolicy;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FORGEGATE_CONFIG";

/// Base branch used when the config does not name one.
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: GatewayConfig,
    /// Path the file was loaded from, if any
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `explicit` or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated, or if `explicit` names a file that does not exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(|key| std::env::var(key).ok(), dirs::home_dir()),
        };

        match path {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Read, parse, and validate a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ReadError`, `ParseError`, or `InvalidValue`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: GatewayConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing default config location.
    fn discover(env: impl Fn(&str) -> Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
        let candidates = [
            env(CONFIG_ENV).map(PathBuf::from),
            env("XDG_CONFIG_HOME").map(|xdg| PathBuf::from(xdg).join("forgegate/config.toml")),
            Self::home_config_path(home).ok(),
        ];
        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Per-user config location, `~/.forgegate/config.toml`.
    fn home_config_path(home: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        let home = home.ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".forgegate/config.toml"))
    }

    /// Path the configuration was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Forge provider. Defaults to GitHub.
    pub fn provider(&self) -> ForgeProvider {
        self.file
            .forge
            .as_ref()
            .and_then(|f| f.provider.as_deref())
            .and_then(ForgeProvider::parse)
            .unwrap_or_default()
    }

    /// API base override, if configured.
    pub fn api_base(&self) -> Option<&str> {
        self.file.forge.as_ref().and_then(|f| f.api_base.as_deref())
    }

    /// Default base branch. Defaults to "main".
    pub fn base_branch(&self) -> &str {
        self.file
            .repo
            .as_ref()
            .and_then(|r| r.base_branch.as_deref())
            .unwrap_or(DEFAULT_BASE_BRANCH)
    }

    /// Repository coordinates, if both owner and name are configured.
    pub fn repo_coordinates(&self) -> Option<RepoCoordinates> {
        let repo = self.file.repo.as_ref()?;
        Some(RepoCoordinates::new(
            repo.owner.as_deref()?,
            repo.name.as_deref()?,
            self.base_branch(),
        ))
    }

    /// Create retry policy with configured overrides.
    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(retry) = &self.file.retry {
            if let Some(max_attempts) = retry.max_attempts {
                policy.max_attempts = max_attempts;
            }
            if let Some(delay_ms) = retry.delay_ms {
                policy.delay = Duration::from_millis(delay_ms);
            }
            policy.attempt_timeout = retry.attempt_timeout_ms.map(Duration::from_millis);
        }
        policy
    }
}
