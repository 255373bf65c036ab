//! forge::factory
//!
//! Forge selection and creation.
//!
//! # Design
//!
//! Callers go through [`create_forge`] rather than naming a concrete forge,
//! so the gateway and CLI only ever see `Arc<dyn Forge>`.
//!
//! # Example
//!
//! ```
//! use forgegate::core::types::RepoCoordinates;
//! use forgegate::forge::{create_forge, ForgeProvider};
//!
//! let repo = RepoCoordinates::new("octocat", "hello-world", "main");
//! let forge = create_forge(ForgeProvider::GitHub, &repo, "ghp_token", None);
//! assert_eq!(forge.name(), "github");
//! ```

use std::sync::Arc;

use super::github::{parse_github_url, GitHubForge, DEFAULT_API_BASE};
use super::traits::Forge;
use crate::core::types::RepoCoordinates;

/// Supported forge providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForgeProvider {
    #[default]
    GitHub,
}

impl ForgeProvider {
    /// Get all available providers.
    pub fn all() -> &'static [ForgeProvider] {
        &[ForgeProvider::GitHub]
    }

    /// Get the provider name as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            ForgeProvider::GitHub => "github",
        }
    }

    /// Parse a provider from a string, case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// use forgegate::forge::ForgeProvider;
    ///
    /// assert_eq!(ForgeProvider::parse("GitHub"), Some(ForgeProvider::GitHub));
    /// assert_eq!(ForgeProvider::parse("unknown"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "github" => Some(ForgeProvider::GitHub),
            _ => None,
        }
    }

    /// Default REST API base for the provider's public instance.
    pub fn default_api_base(&self) -> &'static str {
        match self {
            ForgeProvider::GitHub => DEFAULT_API_BASE,
        }
    }
}

impl std::fmt::Display for ForgeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the forge provider from a remote URL.
pub fn detect_provider(remote_url: &str) -> Option<ForgeProvider> {
    if parse_github_url(remote_url).is_some() {
        return Some(ForgeProvider::GitHub);
    }
    None
}

/// Create a forge for `repo`.
///
/// `api_base` overrides the provider's public endpoint (GitHub Enterprise,
/// local test servers).
pub fn create_forge(
    provider: ForgeProvider,
    repo: &RepoCoordinates,
    token: &str,
    api_base: Option<&str>,
) -> Arc<dyn Forge> {
    match provider {
        ForgeProvider::GitHub => Arc::new(GitHubForge::with_api_base(
            token,
            repo.owner(),
            repo.name(),
            api_base.unwrap_or(provider.default_api_base()),
        )),
    }
}

/// Get list of valid forge names for configuration validation.
pub fn valid_forge_names() -> Vec<&'static str> {
    ForgeProvider::all().iter().map(|p| p.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ForgeProvider::parse("github"), Some(ForgeProvider::GitHub));
        assert_eq!(ForgeProvider::parse("GITHUB"), Some(ForgeProvider::GitHub));
        assert_eq!(ForgeProvider::parse(""), None);
    }

    #[test]
    fn detect_github_remotes() {
        assert_eq!(
            detect_provider("git@github.com:owner/repo.git"),
            Some(ForgeProvider::GitHub)
        );
        assert_eq!(
            detect_provider("https://github.com/owner/repo"),
            Some(ForgeProvider::GitHub)
        );
        assert_eq!(detect_provider("git@unknown.com:owner/repo.git"), None);
    }

    #[test]
    fn create_github_forge() {
        let repo = RepoCoordinates::new("owner", "repo", "main");
        let forge = create_forge(ForgeProvider::GitHub, &repo, "token", None);
        assert_eq!(forge.name(), "github");
    }

    #[test]
    fn valid_names_include_github() {
        assert_eq!(valid_forge_names(), vec!["github"]);
    }
}
