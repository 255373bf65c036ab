//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge stores PRs in memory and records every call. Failures can
//! be configured two ways:
//! - [`FailOn`] makes one operation fail on every call.
//! - [`MockForge::fail_create_times`] queues errors that `create_pr` returns
//!   one per call before it starts succeeding, which is how a PR create
//!   racing a not-yet-propagated branch push looks from the outside.
//!
//! # Example
//!
//! ```
//! use forgegate::forge::mock::MockForge;
//! use forgegate::forge::{Forge, CreatePrRequest, PrState};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new();
//!
//! let pr = forge.create_pr(CreatePrRequest {
//!     head: "feature".to_string(),
//!     base: "main".to_string(),
//!     title: "Add feature".to_string(),
//!     body: None,
//!     draft: false,
//! }).await.unwrap();
//!
//! assert_eq!(pr.number, 1);
//! assert_eq!(pr.state, PrState::Open);
//!
//! let retrieved = forge.get_pr(1).await.unwrap();
//! assert_eq!(retrieved.title, "Add feature");
//! # });
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::traits::{
    CreatePrRequest, DetailedPullRequest, Forge, ForgeError, MergeMethod, PrState, PullRequest,
    StateChange, UpdatePrRequest,
};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockForge {
    inner: Arc<Mutex<MockForgeInner>>,
}

#[derive(Debug, Default)]
struct MockForgeInner {
    /// Stored PRs by number.
    prs: HashMap<u64, DetailedPullRequest>,
    /// Highest PR number handed out so far.
    last_number: u64,
    /// Operation that always fails.
    fail_on: Option<FailOn>,
    /// Errors returned by the next `create_pr` calls, front first.
    create_failures: VecDeque<ForgeError>,
    /// Simulated latency for `create_pr`.
    create_latency: Option<Duration>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    CreatePr(ForgeError),
    GetPr(ForgeError),
    UpdatePr(ForgeError),
    MergePr(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    CreatePr {
        head: String,
        base: String,
        title: String,
        draft: bool,
    },
    GetPr {
        number: u64,
    },
    UpdatePr(UpdatePrRequest),
    MergePr {
        number: u64,
        method: MergeMethod,
    },
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock forge with pre-existing PRs.
    pub fn with_prs(prs: Vec<DetailedPullRequest>) -> Self {
        let forge = Self::new();
        {
            let mut inner = forge.state();
            inner.last_number = prs.iter().map(|p| p.number).max().unwrap_or(0);
            inner.prs = prs.into_iter().map(|p| (p.number, p)).collect();
        }
        forge
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use forgegate::forge::mock::{MockForge, FailOn};
    /// use forgegate::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::GetPr(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.state().fail_on = Some(fail_on);
        self
    }

    /// Queue errors for the next `create_pr` calls.
    ///
    /// Each call pops one error; once the queue is empty, creates succeed
    /// (unless [`FailOn::CreatePr`] is also set).
    pub fn fail_create_times(self, errors: impl IntoIterator<Item = ForgeError>) -> Self {
        self.state().create_failures.extend(errors);
        self
    }

    /// Make every `create_pr` call take `latency` before answering.
    pub fn with_create_latency(self, latency: Duration) -> Self {
        self.state().create_latency = Some(latency);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.state();
        inner.fail_on = None;
        inner.create_failures.clear();
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.state().operations.clone()
    }

    /// Number of `create_pr` calls made so far, failed or not.
    pub fn create_calls(&self) -> usize {
        self.state()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::CreatePr { .. }))
            .count()
    }

    /// Get a PR by number (for test verification).
    pub fn get_pr_sync(&self, number: u64) -> Option<DetailedPullRequest> {
        self.state().prs.get(&number).cloned()
    }

    /// Get the count of PRs.
    pub fn pr_count(&self) -> usize {
        self.state().prs.len()
    }

    fn state(&self) -> MutexGuard<'_, MockForgeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, op: MockOperation) {
        self.state().operations.push(op);
    }

    fn check_fail(&self, expected: &str) -> Result<(), ForgeError> {
        match (&self.state().fail_on, expected) {
            (Some(FailOn::CreatePr(e)), "create_pr")
            | (Some(FailOn::GetPr(e)), "get_pr")
            | (Some(FailOn::UpdatePr(e)), "update_pr")
            | (Some(FailOn::MergePr(e)), "merge_pr") => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError> {
        self.record(MockOperation::CreatePr {
            head: request.head.clone(),
            base: request.base.clone(),
            title: request.title.clone(),
            draft: request.draft,
        });

        let latency = self.state().create_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.check_fail("create_pr")?;
        if let Some(err) = self.state().create_failures.pop_front() {
            return Err(err);
        }

        let mut inner = self.state();
        inner.last_number += 1;
        let number = inner.last_number;
        let pr = DetailedPullRequest {
            number,
            title: request.title,
            body: request.body,
            html_url: format!("https://github.com/mock/repo/pull/{}", number),
            state: PrState::Open,
            is_draft: request.draft,
            author: None,
            labels: Vec::new(),
            source_branch: request.head,
            target_branch: request.base,
            sha: format!("{:040x}", number),
            created_at: None,
            updated_at: None,
            merged_at: None,
            closed_at: None,
            merged: false,
            mergeable: None,
            mergeable_state: None,
            rebaseable: None,
            requested_reviewers: Vec::new(),
            fork: false,
            comments: 0,
            commits: 1,
            additions: 0,
            deletions: 0,
            changed_files: 0,
        };
        let summary = pr.summary();
        inner.prs.insert(number, pr);
        Ok(summary)
    }

    async fn get_pr(&self, number: u64) -> Result<DetailedPullRequest, ForgeError> {
        self.record(MockOperation::GetPr { number });
        self.check_fail("get_pr")?;

        self.state()
            .prs
            .get(&number)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("PR #{}", number)))
    }

    async fn update_pr(&self, request: UpdatePrRequest) -> Result<(), ForgeError> {
        self.record(MockOperation::UpdatePr(request.clone()));
        self.check_fail("update_pr")?;

        let mut inner = self.state();
        let pr = inner
            .prs
            .get_mut(&request.number)
            .ok_or_else(|| ForgeError::NotFound(format!("PR #{}", request.number)))?;

        // Rejected updates leave the PR untouched.
        if request.state.is_some() && pr.merged {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "merged pull requests cannot change state".into(),
            });
        }

        if let Some(body) = request.body {
            pr.body = Some(body);
        }
        if let Some(base) = request.base {
            pr.target_branch = base;
        }
        if let Some(state) = request.state {
            pr.state = match state {
                StateChange::Open => PrState::Open,
                StateChange::Closed => PrState::Closed,
            };
        }
        Ok(())
    }

    async fn merge_pr(&self, number: u64, method: MergeMethod) -> Result<(), ForgeError> {
        self.record(MockOperation::MergePr { number, method });
        self.check_fail("merge_pr")?;

        let mut inner = self.state();
        let pr = inner
            .prs
            .get_mut(&number)
            .ok_or_else(|| ForgeError::NotFound(format!("PR #{}", number)))?;

        if pr.state != PrState::Open {
            return Err(ForgeError::ApiError {
                status: 405,
                message: "Pull Request is not mergeable".into(),
            });
        }
        pr.state = PrState::Merged;
        pr.merged = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(head: &str) -> CreatePrRequest {
        CreatePrRequest {
            head: head.to_string(),
            base: "main".to_string(),
            title: format!("PR for {}", head),
            body: None,
            draft: false,
        }
    }

    #[tokio::test]
    async fn create_increments_number() {
        let forge = MockForge::new();
        let first = forge.create_pr(request("a")).await.unwrap();
        let second = forge.create_pr(request("b")).await.unwrap();
        assert_eq!(first.number, 1);
        assert_eq!(second.number, 2);
        assert_eq!(forge.pr_count(), 2);
    }

    #[tokio::test]
    async fn queued_create_failures_drain_in_order() {
        let forge = MockForge::new().fail_create_times([
            ForgeError::NetworkError("first".into()),
            ForgeError::RateLimited,
        ]);

        assert_eq!(
            forge.create_pr(request("a")).await.unwrap_err(),
            ForgeError::NetworkError("first".into())
        );
        assert_eq!(
            forge.create_pr(request("a")).await.unwrap_err(),
            ForgeError::RateLimited
        );
        assert!(forge.create_pr(request("a")).await.is_ok());
        assert_eq!(forge.create_calls(), 3);
    }

    #[tokio::test]
    async fn fail_on_only_hits_named_operation() {
        let forge = MockForge::new().fail_on(FailOn::MergePr(ForgeError::RateLimited));
        let pr = forge.create_pr(request("a")).await.unwrap();

        assert!(forge.get_pr(pr.number).await.is_ok());
        assert_eq!(
            forge.merge_pr(pr.number, MergeMethod::Squash).await,
            Err(ForgeError::RateLimited)
        );

        forge.clear_fail_on();
        assert!(forge.merge_pr(pr.number, MergeMethod::Squash).await.is_ok());
    }

    #[tokio::test]
    async fn update_leaves_absent_fields_alone() {
        let forge = MockForge::new();
        let pr = forge.create_pr(request("a")).await.unwrap();

        forge
            .update_pr(UpdatePrRequest {
                number: pr.number,
                state: Some(StateChange::Closed),
                ..Default::default()
            })
            .await
            .unwrap();

        let stored = forge.get_pr_sync(pr.number).unwrap();
        assert_eq!(stored.state, PrState::Closed);
        assert_eq!(stored.target_branch, "main");
        assert!(stored.body.is_none());
    }

    #[tokio::test]
    async fn merge_twice_fails() {
        let forge = MockForge::new();
        let pr = forge.create_pr(request("a")).await.unwrap();
        forge.merge_pr(pr.number, MergeMethod::Merge).await.unwrap();

        let err = forge
            .merge_pr(pr.number, MergeMethod::Merge)
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 405, .. }));
    }

    #[tokio::test]
    async fn rejected_update_changes_nothing() {
        let forge = MockForge::new();
        let pr = forge.create_pr(request("a")).await.unwrap();
        forge.merge_pr(pr.number, MergeMethod::Merge).await.unwrap();

        let err = forge
            .update_pr(UpdatePrRequest {
                number: pr.number,
                body: Some("changed".into()),
                state: Some(StateChange::Open),
                base: Some("dev".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 422, .. }));

        let stored = forge.get_pr_sync(pr.number).unwrap();
        assert_eq!(stored.state, PrState::Merged);
        assert!(stored.body.is_none());
        assert_eq!(stored.target_branch, "main");
    }

    #[tokio::test]
    async fn missing_pr_is_not_found() {
        let forge = MockForge::new();
        assert_eq!(
            forge.get_pr(9).await.unwrap_err(),
            ForgeError::NotFound("PR #9".into())
        );
    }
}
