//! gateway::monitor
//!
//! One monitor per pull request number.
//!
//! # Design
//!
//! [`MonitorRegistry`] owns a `number -> Arc<PrMonitor>` map. The first
//! request for a number builds the monitor; every later request returns the
//! same `Arc`, untouched. Lookup and insert happen under one lock so two
//! concurrent callers cannot both build a monitor for the same number.
//! Entries are never evicted; the map lives as long as its gateway.
//!
//! [`PrMonitor`] only holds what a watcher needs (its data source, the
//! repository, the number, and the expected base branch) plus the most
//! recent snapshot. Scheduling repeated refreshes is left to the caller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::types::RepoCoordinates;
use crate::forge::{DetailedPullRequest, Forge, ForgeError};

/// Watches a single pull request.
pub struct PrMonitor {
    source: Arc<dyn Forge>,
    repo: RepoCoordinates,
    number: u64,
    base_branch: String,
    latest: Mutex<Option<DetailedPullRequest>>,
}

impl std::fmt::Debug for PrMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrMonitor")
            .field("source", &self.source.name())
            .field("repo", &self.repo)
            .field("number", &self.number)
            .field("base_branch", &self.base_branch)
            .finish()
    }
}

impl PrMonitor {
    pub fn new(
        source: Arc<dyn Forge>,
        repo: RepoCoordinates,
        number: u64,
        base_branch: impl Into<String>,
    ) -> Self {
        Self {
            source,
            repo,
            number,
            base_branch: base_branch.into(),
            latest: Mutex::new(None),
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn repo(&self) -> &RepoCoordinates {
        &self.repo
    }

    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    /// Fetch the pull request once and remember the result.
    ///
    /// A failed fetch leaves the previous snapshot in place.
    pub async fn refresh(&self) -> Result<DetailedPullRequest, ForgeError> {
        let pr = self.source.get_pr(self.number).await?;
        *self.snapshot() = Some(pr.clone());
        Ok(pr)
    }

    /// Last successfully fetched snapshot.
    pub fn latest(&self) -> Option<DetailedPullRequest> {
        self.snapshot().clone()
    }

    /// Whether the last snapshot targets a branch other than the expected base.
    ///
    /// `false` until a snapshot exists.
    pub fn base_changed(&self) -> bool {
        self.snapshot()
            .as_ref()
            .is_some_and(|pr| pr.target_branch != self.base_branch)
    }

    fn snapshot(&self) -> MutexGuard<'_, Option<DetailedPullRequest>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cache guaranteeing a single [`PrMonitor`] per pull request number.
pub struct MonitorRegistry {
    source: Arc<dyn Forge>,
    repo: RepoCoordinates,
    monitors: Mutex<HashMap<u64, Arc<PrMonitor>>>,
}

impl std::fmt::Debug for MonitorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorRegistry")
            .field("repo", &self.repo)
            .field("monitors", &self.len())
            .finish()
    }
}

impl MonitorRegistry {
    pub fn new(source: Arc<dyn Forge>, repo: RepoCoordinates) -> Self {
        Self {
            source,
            repo,
            monitors: Mutex::new(HashMap::new()),
        }
    }

    /// Return the monitor for `number`, creating it on first request.
    pub fn get_or_create(&self, number: u64) -> Arc<PrMonitor> {
        let mut monitors = self.monitors();
        Arc::clone(monitors.entry(number).or_insert_with(|| {
            tracing::debug!(number, repo = %self.repo.slug(), "creating pull request monitor");
            Arc::new(PrMonitor::new(
                Arc::clone(&self.source),
                self.repo.clone(),
                number,
                self.repo.base_branch(),
            ))
        }))
    }

    /// Existing monitor for `number`, without creating one.
    pub fn get(&self, number: u64) -> Option<Arc<PrMonitor>> {
        self.monitors().get(&number).cloned()
    }

    pub fn len(&self) -> usize {
        self.monitors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn monitors(&self) -> MutexGuard<'_, HashMap<u64, Arc<PrMonitor>>> {
        self.monitors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::MockForge;
    use crate::forge::{CreatePrRequest, UpdatePrRequest};

    fn registry(forge: &MockForge) -> MonitorRegistry {
        MonitorRegistry::new(
            Arc::new(forge.clone()),
            RepoCoordinates::new("o", "r", "main"),
        )
    }

    #[test]
    fn same_number_same_instance() {
        let registry = registry(&MockForge::new());
        let a = registry.get_or_create(42);
        let b = registry.get_or_create(42);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_numbers_distinct_instances() {
        let registry = registry(&MockForge::new());
        let a = registry.get_or_create(1);
        let b = registry.get_or_create(2);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.number(), 1);
        assert_eq!(b.number(), 2);
        assert_eq!(b.base_branch(), "main");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn get_does_not_create() {
        let registry = registry(&MockForge::new());
        assert!(registry.get(7).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_requests_share_one_monitor() {
        let registry = Arc::new(registry(&MockForge::new()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get_or_create(5))
            })
            .collect();

        let monitors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(monitors.iter().all(|m| Arc::ptr_eq(m, &monitors[0])));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn refresh_stores_snapshot_and_detects_base_change() {
        let forge = MockForge::new();
        let pr = forge
            .create_pr(CreatePrRequest {
                head: "feature".into(),
                base: "main".into(),
                title: "t".into(),
                body: None,
                draft: false,
            })
            .await
            .unwrap();

        let registry = registry(&forge);
        let monitor = registry.get_or_create(pr.number);
        assert!(monitor.latest().is_none());
        assert!(!monitor.base_changed());

        monitor.refresh().await.unwrap();
        assert_eq!(monitor.latest().unwrap().number, pr.number);
        assert!(!monitor.base_changed());

        forge
            .update_pr(UpdatePrRequest {
                number: pr.number,
                base: Some("develop".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        monitor.refresh().await.unwrap();
        assert!(monitor.base_changed());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let forge = MockForge::new();
        let registry = registry(&forge);
        let monitor = registry.get_or_create(99);

        assert!(matches!(
            monitor.refresh().await,
            Err(ForgeError::NotFound(_))
        ));
        assert!(monitor.latest().is_none());
    }
}
