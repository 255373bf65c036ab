//! Integration tests for the gateway's single-call operations and monitors.

use std::sync::Arc;

use forgegate::core::types::RepoCoordinates;
use forgegate::forge::mock::{FailOn, MockForge, MockOperation};
use forgegate::forge::{ForgeError, MergeMethod, PrState, StateChange, UpdatePrRequest};
use forgegate::gateway::{CreateArgs, PrGateway, PrUpdate};

fn gateway(forge: &MockForge) -> PrGateway {
    PrGateway::new(
        Arc::new(forge.clone()),
        RepoCoordinates::new("octocat", "hello-world", "main"),
    )
}

async fn open_pr(gateway: &PrGateway) -> u64 {
    gateway
        .create(CreateArgs::new("Fix bug", "Details", "main", "feature/fix"))
        .await
        .unwrap()
        .number
}

mod get {
    use super::*;

    #[tokio::test]
    async fn returns_created_pr() {
        let forge = MockForge::new();
        let gateway = gateway(&forge);
        let number = open_pr(&gateway).await;

        let pr = gateway.get(number).await.unwrap();
        assert_eq!(pr.title, "Fix bug");
        assert_eq!(pr.body.as_deref(), Some("Details"));
        assert_eq!(pr.state, PrState::Open);
    }

    #[tokio::test]
    async fn failure_is_not_retried() {
        let forge = MockForge::new().fail_on(FailOn::GetPr(ForgeError::RateLimited));
        let gateway = gateway(&forge);

        assert_eq!(gateway.get(1).await.unwrap_err(), ForgeError::RateLimited);
        assert_eq!(forge.operations(), vec![MockOperation::GetPr { number: 1 }]);
    }
}

mod merge {
    use super::*;

    #[tokio::test]
    async fn squash_issues_one_call() {
        let forge = MockForge::new();
        let gateway = gateway(&forge);
        let number = open_pr(&gateway).await;

        gateway.merge(MergeMethod::Squash, number).await.unwrap();

        assert_eq!(
            forge.operations().last(),
            Some(&MockOperation::MergePr {
                number,
                method: MergeMethod::Squash
            })
        );
        assert_eq!(forge.get_pr_sync(number).unwrap().state, PrState::Merged);
    }

    #[tokio::test]
    async fn failure_is_returned_unchanged() {
        let err = ForgeError::ApiError {
            status: 405,
            message: "Base branch was modified".into(),
        };
        let forge = MockForge::new().fail_on(FailOn::MergePr(err.clone()));
        let gateway = gateway(&forge);

        assert_eq!(
            gateway.merge(MergeMethod::Merge, 42).await.unwrap_err(),
            err
        );
        assert_eq!(forge.operations().len(), 1);
    }

    #[tokio::test]
    async fn loading_flag_is_untouched() {
        let forge = MockForge::new();
        let gateway = gateway(&forge);
        let rx = gateway.subscribe_loading();

        let _ = gateway.merge(MergeMethod::Rebase, 1).await;

        assert!(!rx.has_changed().unwrap());
        assert!(!gateway.is_loading());
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn description_only_leaves_other_fields() {
        let forge = MockForge::new();
        let gateway = gateway(&forge);
        let number = open_pr(&gateway).await;

        gateway
            .update(
                number,
                PrUpdate {
                    description: Some("x".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            forge.operations().last(),
            Some(&MockOperation::UpdatePr(UpdatePrRequest {
                number,
                body: Some("x".into()),
                state: None,
                base: None,
            }))
        );
        let pr = forge.get_pr_sync(number).unwrap();
        assert_eq!(pr.body.as_deref(), Some("x"));
        assert_eq!(pr.target_branch, "main");
        assert_eq!(pr.state, PrState::Open);
    }

    #[tokio::test]
    async fn close_then_reopen() {
        let forge = MockForge::new();
        let gateway = gateway(&forge);
        let number = open_pr(&gateway).await;

        gateway
            .update(
                number,
                PrUpdate {
                    state: Some(StateChange::Closed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(forge.get_pr_sync(number).unwrap().state, PrState::Closed);

        gateway.reopen(number).await.unwrap();
        assert_eq!(forge.get_pr_sync(number).unwrap().state, PrState::Open);
    }

    #[tokio::test]
    async fn reopen_merged_pr_is_rejected() {
        let forge = MockForge::new();
        let gateway = gateway(&forge);
        let number = open_pr(&gateway).await;
        gateway.merge(MergeMethod::Merge, number).await.unwrap();

        let err = gateway.reopen(number).await.unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 422, .. }));
    }

    #[tokio::test]
    async fn missing_pr_is_not_found() {
        let forge = MockForge::new();
        let err = gateway(&forge).reopen(404).await.unwrap_err();
        assert!(matches!(err, ForgeError::NotFound(_)));
    }
}

mod monitors {
    use super::*;

    #[test]
    fn same_number_returns_same_instance() {
        let gateway = gateway(&MockForge::new());
        let a = gateway.pr_monitor(42);
        let b = gateway.pr_monitor(42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_numbers_return_distinct_instances() {
        let gateway = gateway(&MockForge::new());
        let a = gateway.pr_monitor(1);
        let b = gateway.pr_monitor(2);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(gateway.monitors().len(), 2);
    }

    #[test]
    fn monitor_carries_repository_context() {
        let gateway = gateway(&MockForge::new());
        let monitor = gateway.pr_monitor(7);
        assert_eq!(monitor.number(), 7);
        assert_eq!(monitor.repo().slug(), "octocat/hello-world");
        assert_eq!(monitor.base_branch(), "main");
    }

    #[tokio::test]
    async fn monitor_sees_retargeted_base() {
        let forge = MockForge::new();
        let gateway = gateway(&forge);
        let number = open_pr(&gateway).await;
        let monitor = gateway.pr_monitor(number);

        monitor.refresh().await.unwrap();
        assert!(!monitor.base_changed());

        gateway
            .update(
                number,
                PrUpdate {
                    target_base: Some("release".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        monitor.refresh().await.unwrap();

        assert!(monitor.base_changed());
        assert!(Arc::ptr_eq(&monitor, &gateway.pr_monitor(number)));
    }
}

mod loading_flag {
    use super::*;

    #[tokio::test]
    async fn only_create_moves_the_flag() {
        let forge = MockForge::new();
        let gateway = gateway(&forge);
        let mut rx = gateway.subscribe_loading();

        let number = open_pr(&gateway).await;
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());

        let _ = gateway.get(number).await;
        let _ = gateway
            .update(
                number,
                PrUpdate {
                    description: Some("x".into()),
                    ..Default::default()
                },
            )
            .await;
        let _ = gateway.reopen(number).await;
        let _ = gateway.merge(MergeMethod::Merge, number).await;
        let _ = gateway.pr_monitor(number).refresh().await;
        let _ = gateway.subscribe_loading();

        assert!(!rx.has_changed().unwrap());
        assert!(!gateway.is_loading());
    }
}
