//! gateway
//!
//! Pull request façade over a [`Forge`].
//!
//! # Architecture
//!
//! [`PrGateway`] turns internal pull request operations into forge calls
//! against fixed [`RepoCoordinates`]:
//!
//! - `create` retries under a [`RetryPolicy`] and drives the [`LoadingFlag`]
//! - `get`, `merge`, `reopen`, `update` are a single call each, no retry
//! - `pr_monitor` hands out one [`PrMonitor`] per number via [`MonitorRegistry`]
//!
//! Errors are the forge's own [`ForgeError`] values, passed through
//! unchanged so callers can inspect forge diagnostics.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use forgegate::core::types::RepoCoordinates;
//! use forgegate::forge::mock::MockForge;
//! use forgegate::forge::MergeMethod;
//! use forgegate::gateway::{CreateArgs, PrGateway};
//!
//! # tokio_test::block_on(async {
//! let gateway = PrGateway::new(
//!     Arc::new(MockForge::new()),
//!     RepoCoordinates::new("octocat", "hello-world", "main"),
//! );
//!
//! let pr = gateway
//!     .create(CreateArgs::new("Fix bug", "", "main", "feature/fix"))
//!     .await
//!     .unwrap();
//! assert!(!gateway.is_loading());
//!
//! gateway.merge(MergeMethod::Squash, pr.number).await.unwrap();
//! # });
//! ```

mod analytics;
mod loading;
mod monitor;
mod retry;

pub use analytics::{
    AnalyticsError, AnalyticsSink, NoopAnalytics, TracingAnalytics, PR_CREATED_EVENT,
};
pub use loading::LoadingFlag;
pub use monitor::{MonitorRegistry, PrMonitor};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};

use std::sync::Arc;

use tokio::sync::watch;

use crate::core::types::RepoCoordinates;
use crate::forge::{
    CreatePrRequest, DetailedPullRequest, Forge, ForgeError, MergeMethod, PullRequest,
    StateChange, UpdatePrRequest,
};

/// Arguments for [`PrGateway::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateArgs {
    pub title: String,
    pub body: String,
    /// Open as a draft (default: false)
    pub draft: bool,
    /// Branch the PR merges into
    pub base_branch_name: String,
    /// Branch carrying the changes
    pub upstream_name: String,
}

impl CreateArgs {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        base_branch_name: impl Into<String>,
        upstream_name: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            draft: false,
            base_branch_name: base_branch_name.into(),
            upstream_name: upstream_name.into(),
        }
    }

    pub fn draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }

    fn into_request(self) -> CreatePrRequest {
        CreatePrRequest {
            head: self.upstream_name,
            base: self.base_branch_name,
            title: self.title,
            body: Some(self.body),
            draft: self.draft,
        }
    }
}

/// Fields to change in [`PrGateway::update`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrUpdate {
    pub description: Option<String>,
    pub state: Option<StateChange>,
    pub target_base: Option<String>,
}

impl PrUpdate {
    fn into_request(self, number: u64) -> UpdatePrRequest {
        UpdatePrRequest {
            number,
            body: self.description,
            state: self.state,
            base: self.target_base,
        }
    }
}

/// Pull request operations for one repository.
pub struct PrGateway {
    forge: Arc<dyn Forge>,
    repo: RepoCoordinates,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    analytics: Arc<dyn AnalyticsSink>,
    loading: LoadingFlag,
    monitors: MonitorRegistry,
}

impl std::fmt::Debug for PrGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrGateway")
            .field("forge", &self.forge.name())
            .field("repo", &self.repo)
            .field("policy", &self.policy)
            .field("loading", &self.loading.is_loading())
            .field("monitors", &self.monitors)
            .finish()
    }
}

impl PrGateway {
    /// Gateway with the default retry policy, tokio sleeping, and no analytics.
    pub fn new(forge: Arc<dyn Forge>, repo: RepoCoordinates) -> Self {
        let monitors = MonitorRegistry::new(Arc::clone(&forge), repo.clone());
        Self {
            forge,
            repo,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            analytics: Arc::new(NoopAnalytics),
            loading: LoadingFlag::new(),
            monitors,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn repo(&self) -> &RepoCoordinates {
        &self.repo
    }

    pub fn forge(&self) -> &Arc<dyn Forge> {
        &self.forge
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Whether a create is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Observe the loading flag. Starts `false`, changes only around `create`.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Open a pull request, retrying failed attempts under the retry policy.
    ///
    /// The loading flag stays set for the whole attempt sequence, delays
    /// included, and is cleared on every exit path. On success the analytics
    /// sink is notified once; its outcome is ignored.
    ///
    /// # Errors
    ///
    /// The error of the final attempt, unchanged.
    pub async fn create(&self, args: CreateArgs) -> Result<PullRequest, ForgeError> {
        let _loading = self.loading.begin();
        let request = args.into_request();

        let pr = self
            .policy
            .run(self.sleeper.as_ref(), |attempt| {
                let request = request.clone();
                async move {
                    tracing::debug!(
                        attempt,
                        repo = %self.repo.slug(),
                        head = %request.head,
                        base = %request.base,
                        "creating pull request"
                    );
                    self.policy
                        .within_deadline(self.forge.create_pr(request))
                        .await
                }
            })
            .await?;

        tracing::info!(number = pr.number, url = %pr.html_url, "created pull request");
        if let Err(err) = self.analytics.track(PR_CREATED_EVENT) {
            tracing::debug!(error = %err, "ignoring analytics failure");
        }
        Ok(pr)
    }

    /// Fetch the full record of a pull request.
    pub async fn get(&self, number: u64) -> Result<DetailedPullRequest, ForgeError> {
        self.forge.get_pr(number).await
    }

    /// Merge a pull request.
    pub async fn merge(&self, method: MergeMethod, number: u64) -> Result<(), ForgeError> {
        tracing::debug!(number, %method, "merging pull request");
        self.forge.merge_pr(number, method).await
    }

    /// Set a pull request's state back to open.
    pub async fn reopen(&self, number: u64) -> Result<(), ForgeError> {
        self.update(
            number,
            PrUpdate {
                state: Some(StateChange::Open),
                ..Default::default()
            },
        )
        .await
    }

    /// Change the given fields of a pull request, leaving the rest as they are.
    pub async fn update(&self, number: u64, details: PrUpdate) -> Result<(), ForgeError> {
        tracing::debug!(number, ?details, "updating pull request");
        self.forge.update_pr(details.into_request(number)).await
    }

    /// Monitor for `number`; the same instance for the gateway's lifetime.
    pub fn pr_monitor(&self, number: u64) -> Arc<PrMonitor> {
        self.monitors.get_or_create(number)
    }

    pub fn monitors(&self) -> &MonitorRegistry {
        &self.monitors
    }
}
