//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`RepoCoordinates`] - Immutable (owner, name, base branch) triple
//!
//! # Examples
//!
//! ```
//! use forgegate::core::types::RepoCoordinates;
//!
//! let repo = RepoCoordinates::from_slug("octocat/hello-world", "main").unwrap();
//! assert_eq!(repo.owner(), "octocat");
//! assert_eq!(repo.name(), "hello-world");
//! assert_eq!(repo.base_branch(), "main");
//!
//! assert!(RepoCoordinates::from_slug("no-slash", "main").is_err());
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::forge::github::parse_github_url;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid repository slug '{0}', expected OWNER/NAME")]
    InvalidSlug(String),

    #[error("unsupported remote URL: {0}")]
    UnsupportedRemote(String),
}

/// The repository a gateway operates on.
///
/// Supplied once at construction and never mutated afterwards, so fields are
/// private and only readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoCoordinates {
    owner: String,
    name: String,
    base_branch: String,
}

impl RepoCoordinates {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        base_branch: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            base_branch: base_branch.into(),
        }
    }

    /// Parse an `OWNER/NAME` slug.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSlug` unless the slug has exactly two
    /// non-empty segments.
    pub fn from_slug(slug: &str, base_branch: impl Into<String>) -> Result<Self, TypeError> {
        match slug.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name, base_branch))
            }
            _ => Err(TypeError::InvalidSlug(slug.to_string())),
        }
    }

    /// Derive coordinates from a Git remote URL.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::UnsupportedRemote` if the URL is not a known forge remote.
    pub fn from_remote_url(url: &str, base_branch: impl Into<String>) -> Result<Self, TypeError> {
        let (owner, name) =
            parse_github_url(url).ok_or_else(|| TypeError::UnsupportedRemote(url.to_string()))?;
        Ok(Self::new(owner, name, base_branch))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Branch new pull requests target by default.
    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    /// `OWNER/NAME`.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.owner, self.name, self.base_branch)
    }
}
