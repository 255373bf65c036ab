//! forge::github
//!
//! GitHub forge implementation over the REST API.
//!
//! # Design
//!
//! Every `Forge` method maps to exactly one REST call:
//!
//! | method      | endpoint                                   |
//! |-------------|--------------------------------------------|
//! | `create_pr` | `POST  /repos/{owner}/{repo}/pulls`        |
//! | `get_pr`    | `GET   /repos/{owner}/{repo}/pulls/{n}`    |
//! | `update_pr` | `PATCH /repos/{owner}/{repo}/pulls/{n}`    |
//! | `merge_pr`  | `PUT   /repos/{owner}/{repo}/pulls/{n}/merge` |
//!
//! Raw payloads are deserialized into private `GitHub*` structs and then
//! normalized into [`PullRequest`] / [`DetailedPullRequest`]. Fields GitHub
//! may omit or null out are `Option`s or defaulted collections, so
//! normalization never fails on a missing optional field.
//!
//! # Rate Limiting
//!
//! A 429 is surfaced as `ForgeError::RateLimited`; nothing here waits or
//! retries.
//!
//! # Example
//!
//! ```ignore
//! use forgegate::forge::github::GitHubForge;
//! use forgegate::forge::{Forge, CreatePrRequest};
//!
//! let forge = GitHubForge::new("ghp_xxx", "octocat", "hello-world");
//! let pr = forge.create_pr(CreatePrRequest {
//!     head: "feature".to_string(),
//!     base: "main".to_string(),
//!     title: "Add feature".to_string(),
//!     body: None,
//!     draft: false,
//! }).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{
    Author, CreatePrRequest, DetailedPullRequest, Forge, ForgeError, Label, MergeMethod, PrState,
    PullRequest, UpdatePrRequest,
};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "forgegate";

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Personal access token or app token
    token: String,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL (configurable for GitHub Enterprise and tests)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("has_token", &!self.token.is_empty())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a forge against public GitHub.
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self::with_api_base(token, owner, repo, DEFAULT_API_BASE)
    }

    /// Create a forge with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (`https://github.example.com/api/v3`)
    /// or to point at a local mock server.
    pub fn with_api_base(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a forge from a Git remote URL.
    ///
    /// Returns `None` if the URL is not a GitHub remote.
    ///
    /// # Example
    ///
    /// ```
    /// use forgegate::forge::github::GitHubForge;
    ///
    /// let forge = GitHubForge::from_remote_url("git@github.com:owner/repo.git", "token");
    /// assert!(forge.is_some());
    /// ```
    pub fn from_remote_url(url: &str, token: impl Into<String>) -> Option<Self> {
        let (owner, repo) = parse_github_url(url)?;
        Some(Self::new(token, owner, repo))
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        if self.token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ForgeError::AuthFailed("token is not a valid header value".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Attach headers and send.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ForgeError> {
        request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle a response whose body is not needed on success.
    async fn handle_empty_response(&self, response: Response) -> Result<(), ForgeError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        // GitHub Apps report X-Accepted-GitHub-Permissions, classic OAuth X-Accepted-OAuth-Scopes.
        let headers = response.headers();
        let required_permissions = header_string(headers, "X-Accepted-GitHub-Permissions");
        let required_scopes = header_string(headers, "X-Accepted-OAuth-Scopes");

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.describe(),
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                match (required_permissions, required_scopes) {
                    (Some(perms), _) if !perms.is_empty() => {
                        err_msg.push_str(&format!(" [required: {}]", perms));
                    }
                    (_, Some(scopes)) if !scopes.is_empty() => {
                        err_msg.push_str(&format!(" [required scopes: {}]", scopes));
                    }
                    _ => {}
                }
                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError> {
        let body = CreatePrBody {
            head: &request.head,
            base: &request.base,
            title: &request.title,
            body: request.body.as_deref(),
            draft: request.draft,
        };

        let response = self
            .send(self.client.post(self.repo_url("pulls")).json(&body))
            .await?;
        let pr: GitHubPullRequest = self.handle_response(response).await?;
        Ok(pr.into())
    }

    async fn get_pr(&self, number: u64) -> Result<DetailedPullRequest, ForgeError> {
        let url = self.repo_url(&format!("pulls/{}", number));
        let response = self.send(self.client.get(url)).await?;
        let pr: GitHubPullRequest = self.handle_response(response).await?;
        Ok(pr.into())
    }

    async fn update_pr(&self, request: UpdatePrRequest) -> Result<(), ForgeError> {
        let url = self.repo_url(&format!("pulls/{}", request.number));
        let body = UpdatePrBody {
            body: request.body.as_deref(),
            state: request.state.map(|s| s.as_str()),
            base: request.base.as_deref(),
        };

        let response = self.send(self.client.patch(url).json(&body)).await?;
        self.handle_empty_response(response).await
    }

    async fn merge_pr(&self, number: u64, method: MergeMethod) -> Result<(), ForgeError> {
        let url = self.repo_url(&format!("pulls/{}/merge", number));
        let body = MergePrBody {
            merge_method: method.as_str(),
        };

        let response = self.send(self.client.put(url).json(&body)).await?;
        self.handle_empty_response(response).await
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a PR.
#[derive(Serialize)]
struct CreatePrBody<'a> {
    head: &'a str,
    base: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    draft: bool,
}

/// Request body for updating a PR. Absent fields stay untouched upstream.
#[derive(Serialize)]
struct UpdatePrBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base: Option<&'a str>,
}

/// Request body for merging a PR.
#[derive(Serialize)]
struct MergePrBody<'a> {
    merge_method: &'a str,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
    #[serde(default)]
    errors: Vec<GitHubErrorDetail>,
}

impl GitHubErrorResponse {
    /// Main message plus any field-level validation messages.
    fn describe(self) -> String {
        let details: Vec<String> = self.errors.into_iter().filter_map(|e| e.message).collect();
        if details.is_empty() {
            self.message
        } else {
            format!("{} ({})", self.message, details.join("; "))
        }
    }
}

#[derive(Deserialize)]
struct GitHubErrorDetail {
    message: Option<String>,
}

/// GitHub PR response format.
///
/// Shared by the create and get endpoints; the counters and mergeability
/// fields only come back from get.
#[derive(Deserialize)]
struct GitHubPullRequest {
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    state: String,
    draft: Option<bool>,
    user: Option<GitHubUser>,
    #[serde(default)]
    labels: Vec<GitHubLabel>,
    head: GitHubRef,
    base: GitHubRef,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    merged_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    merged: Option<bool>,
    mergeable: Option<bool>,
    mergeable_state: Option<String>,
    rebaseable: Option<bool>,
    #[serde(default)]
    requested_reviewers: Vec<GitHubUser>,
    comments: Option<u64>,
    commits: Option<u64>,
    additions: Option<u64>,
    deletions: Option<u64>,
    changed_files: Option<u64>,
}

/// GitHub ref (head/base) format.
#[derive(Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
    #[serde(default)]
    sha: String,
    /// Repository info (None for deleted forks)
    repo: Option<GitHubRepoInfo>,
}

/// Minimal GitHub repository info.
#[derive(Deserialize)]
struct GitHubRepoInfo {
    full_name: String,
}

#[derive(Deserialize)]
struct GitHubUser {
    login: String,
    avatar_url: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct GitHubLabel {
    name: String,
    color: Option<String>,
    description: Option<String>,
}

impl From<GitHubUser> for Author {
    fn from(user: GitHubUser) -> Self {
        Author {
            is_bot: user.kind.as_deref() == Some("Bot"),
            login: user.login,
            avatar_url: user.avatar_url,
        }
    }
}

impl From<GitHubLabel> for Label {
    fn from(label: GitHubLabel) -> Self {
        Label {
            name: label.name,
            color: label.color,
            description: label.description,
        }
    }
}

impl From<GitHubPullRequest> for DetailedPullRequest {
    fn from(pr: GitHubPullRequest) -> Self {
        let merged = pr.merged.unwrap_or(false) || pr.merged_at.is_some();
        let state = if merged {
            PrState::Merged
        } else if pr.state == "closed" {
            PrState::Closed
        } else {
            PrState::Open
        };

        // Head repo gone while base is known: the fork was deleted.
        let fork = match (&pr.head.repo, &pr.base.repo) {
            (Some(head), Some(base)) => head.full_name != base.full_name,
            (None, Some(_)) => true,
            (_, None) => false,
        };

        DetailedPullRequest {
            number: pr.number,
            title: pr.title,
            body: pr.body,
            html_url: pr.html_url,
            state,
            is_draft: pr.draft.unwrap_or(false),
            author: pr.user.map(Into::into),
            labels: pr.labels.into_iter().map(Into::into).collect(),
            source_branch: pr.head.ref_name,
            target_branch: pr.base.ref_name,
            sha: pr.head.sha,
            created_at: pr.created_at,
            updated_at: pr.updated_at,
            merged_at: pr.merged_at,
            closed_at: pr.closed_at,
            merged,
            mergeable: pr.mergeable,
            mergeable_state: pr.mergeable_state,
            rebaseable: pr.rebaseable,
            requested_reviewers: pr.requested_reviewers.into_iter().map(|u| u.login).collect(),
            fork,
            comments: pr.comments.unwrap_or(0),
            commits: pr.commits.unwrap_or(0),
            additions: pr.additions.unwrap_or(0),
            deletions: pr.deletions.unwrap_or(0),
            changed_files: pr.changed_files.unwrap_or(0),
        }
    }
}

impl From<GitHubPullRequest> for PullRequest {
    fn from(pr: GitHubPullRequest) -> Self {
        DetailedPullRequest::from(pr).summary()
    }
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports both SSH and HTTPS formats:
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// use forgegate::forge::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:octocat/hello-world.git").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;
    let rest = rest.strip_suffix(".git").unwrap_or(rest);

    match rest.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}
