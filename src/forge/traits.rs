//! forge::traits
//!
//! Forge trait definition and the normalized pull request model.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! All methods return `Result` so callers see the forge's own diagnostics.
//! Implementations do a single request per call; retrying is the gateway's
//! concern, never the transport's.
//!
//! # Example
//!
//! ```ignore
//! use forgegate::forge::{Forge, CreatePrRequest};
//!
//! async fn open_pr(forge: &dyn Forge) -> Result<(), ForgeError> {
//!     let request = CreatePrRequest {
//!         head: "feature-branch".to_string(),
//!         base: "main".to_string(),
//!         title: "Add feature".to_string(),
//!         body: Some("Description".to_string()),
//!         draft: false,
//!     };
//!     let pr = forge.create_pr(request).await?;
//!     println!("Created PR #{}: {}", pr.number, pr.html_url);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors from forge operations.
///
/// These map to the common failure modes of a hosted forge REST API. The
/// enum is `Clone + PartialEq` so an error can be replayed by test doubles
/// and compared after it travels through the gateway unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// A single request did not complete within its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Request to create a pull request.
#[derive(Debug, Clone)]
pub struct CreatePrRequest {
    /// Head branch name (the branch with changes)
    pub head: String,
    /// Base branch name (the branch to merge into)
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// Create as draft
    pub draft: bool,
}

/// Target state for an update.
///
/// Merged is not a state a PR can be moved into by an update, so only the
/// two settable states exist here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// Reopen a closed PR
    Open,
    /// Close an open PR without merging
    Closed,
}

impl StateChange {
    /// The value the forge expects on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateChange::Open => "open",
            StateChange::Closed => "closed",
        }
    }
}

impl std::fmt::Display for StateChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to update a pull request.
///
/// `None` fields are left unchanged on the forge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePrRequest {
    /// PR number
    pub number: u64,
    /// New body (if changing)
    pub body: Option<String>,
    /// New state (if changing)
    pub state: Option<StateChange>,
    /// New base branch (if changing)
    pub base: Option<String>,
}

/// PR state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    /// PR is open and awaiting review/merge
    Open,
    /// PR is closed without being merged
    Closed,
    /// PR has been merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrState::Open => write!(f, "open"),
            PrState::Closed => write!(f, "closed"),
            PrState::Merged => write!(f, "merged"),
        }
    }
}

/// Author of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub login: String,
    pub avatar_url: Option<String>,
    pub is_bot: bool,
}

/// Label attached to a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Pull request summary returned from a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR body
    pub body: Option<String>,
    /// Web URL for viewing
    pub html_url: String,
    /// PR state (open, closed, merged)
    pub state: PrState,
    /// Whether the PR is a draft
    pub is_draft: bool,
    pub author: Option<Author>,
    pub labels: Vec<Label>,
    /// Head branch name
    pub source_branch: String,
    /// Base branch name
    pub target_branch: String,
    /// Head commit
    pub sha: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Full pull request record returned from a get.
///
/// Carries every field of [`PullRequest`] plus the details only the single-PR
/// endpoint reports (mergeability, counters, reviewers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedPullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub state: PrState,
    pub is_draft: bool,
    pub author: Option<Author>,
    pub labels: Vec<Label>,
    pub source_branch: String,
    pub target_branch: String,
    pub sha: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Whether the PR has been merged
    pub merged: bool,
    /// `None` while the forge is still computing mergeability
    pub mergeable: Option<bool>,
    /// Forge-specific mergeable state (e.g. "clean", "blocked", "dirty")
    pub mergeable_state: Option<String>,
    pub rebaseable: Option<bool>,
    /// Logins of users whose review is requested
    pub requested_reviewers: Vec<String>,
    /// Whether the head branch lives in a fork
    pub fork: bool,
    pub comments: u64,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
}

impl DetailedPullRequest {
    /// Project the detailed record onto the summary shape.
    pub fn summary(&self) -> PullRequest {
        PullRequest {
            number: self.number,
            title: self.title.clone(),
            body: self.body.clone(),
            html_url: self.html_url.clone(),
            state: self.state,
            is_draft: self.is_draft,
            author: self.author.clone(),
            labels: self.labels.clone(),
            source_branch: self.source_branch.clone(),
            target_branch: self.target_branch.clone(),
            sha: self.sha.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            merged_at: self.merged_at,
            closed_at: self.closed_at,
        }
    }
}

/// Merge method for merging a PR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMethod {
    /// Create a merge commit
    #[default]
    Merge,
    /// Squash all commits and merge
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl MergeMethod {
    /// The `merge_method` value the forge expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMethod::Merge => "merge",
            MergeMethod::Squash => "squash",
            MergeMethod::Rebase => "rebase",
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The Forge trait for interacting with remote hosting services.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>` and perform exactly one
/// request. Callers decide whether a failure is worth retrying.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Create a new pull request.
    ///
    /// # Errors
    ///
    /// - `AuthRequired` if no authentication is configured
    /// - `AuthFailed` if the token is invalid or lacks permissions
    /// - `ApiError` with status 422 if validation fails (e.g., head doesn't exist yet)
    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError>;

    /// Get a pull request by number.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the PR doesn't exist
    async fn get_pr(&self, number: u64) -> Result<DetailedPullRequest, ForgeError>;

    /// Update an existing pull request. Only `Some` fields are sent.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the PR doesn't exist
    /// - `AuthFailed` if lacking permissions to update
    async fn update_pr(&self, request: UpdatePrRequest) -> Result<(), ForgeError>;

    /// Merge a pull request.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the PR doesn't exist
    /// - `ApiError` if merge fails (e.g., conflicts, required checks failing)
    async fn merge_pr(&self, number: u64, method: MergeMethod) -> Result<(), ForgeError>;
}
