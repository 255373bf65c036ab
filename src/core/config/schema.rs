//! core::config::schema
//!
//! Configuration schema types.
//!
//! Every field is optional so a partial file layers over the defaults.
//! Values are validated after parsing.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [forge]
/// provider = "github"
/// api_base = "https://api.github.com"
///
/// [repo]
/// owner = "octocat"
/// name = "hello-world"
/// base_branch = "main"
///
/// [retry]
/// max_attempts = 4
/// delay_ms = 500
/// attempt_timeout_ms = 30000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Forge endpoint settings
    pub forge: Option<ForgeSection>,

    /// Repository the gateway operates on
    pub repo: Option<RepoSection>,

    /// Create retry policy
    pub retry: Option<RetrySection>,
}

impl GatewayConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(forge) = &self.forge {
            forge.validate()?;
        }
        if let Some(repo) = &self.repo {
            repo.validate()?;
        }
        if let Some(retry) = &self.retry {
            retry.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeSection {
    /// Forge provider (only "github")
    pub provider: Option<String>,

    /// REST API base URL (GitHub Enterprise: `https://host/api/v3`)
    pub api_base: Option<String>,
}

impl ForgeSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            let valid = crate::forge::valid_forge_names();
            if !valid.contains(&provider.to_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid forge '{}', must be one of: {}",
                    provider,
                    valid.join(", ")
                )));
            }
        }
        if let Some(api_base) = &self.api_base {
            if !(api_base.starts_with("https://") || api_base.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "api_base must be an http(s) URL, got '{}'",
                    api_base
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoSection {
    pub owner: Option<String>,
    pub name: Option<String>,

    /// Default target branch (default: "main")
    pub base_branch: Option<String>,
}

impl RepoSection {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("repo.owner", &self.owner),
            ("repo.name", &self.name),
            ("repo.base_branch", &self.base_branch),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} cannot be empty",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySection {
    /// Total create attempts, including the first (default: 4)
    pub max_attempts: Option<u32>,

    /// Fixed delay between attempts in milliseconds (default: 500)
    pub delay_ms: Option<u64>,

    /// Per-attempt deadline in milliseconds (default: none)
    pub attempt_timeout_ms: Option<u64>,
}

impl RetrySection {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == Some(0) {
            return Err(ConfigError::InvalidValue(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.attempt_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue(
                "retry.attempt_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(GatewayConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_full_file() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [forge]
            provider = "github"
            api_base = "https://github.example.com/api/v3"

            [repo]
            owner = "octocat"
            name = "hello-world"
            base_branch = "develop"

            [retry]
            max_attempts = 2
            delay_ms = 100
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        let repo = config.repo.unwrap();
        assert_eq!(repo.owner.as_deref(), Some("octocat"));
        assert_eq!(repo.base_branch.as_deref(), Some("develop"));
        assert_eq!(config.retry.unwrap().max_attempts, Some(2));
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<GatewayConfig, _> = toml::from_str("[retry]\nbackoff = 2.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_forge_rejected() {
        let config = GatewayConfig {
            forge: Some(ForgeSection {
                provider: Some("gitea".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(msg)) if msg.contains("gitea")
        ));
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = GatewayConfig {
            retry: Some(RetrySection {
                max_attempts: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_owner_rejected() {
        let config = GatewayConfig {
            repo: Some(RepoSection {
                owner: Some("  ".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_api_base_rejected() {
        let config = GatewayConfig {
            forge: Some(ForgeSection {
                api_base: Some("ftp://example.com".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
