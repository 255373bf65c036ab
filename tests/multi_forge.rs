//! Integration tests for forge selection.
//!
//! These tests verify:
//! - Forge provider detection from URLs
//! - Factory wiring from repository coordinates
//! - Configuration-driven forge selection

use std::path::PathBuf;

use forgegate::core::config::Config;
use forgegate::core::types::RepoCoordinates;
use forgegate::forge::{create_forge, detect_provider, valid_forge_names, Forge, ForgeProvider};

mod provider_detection {
    use super::*;

    #[test]
    fn detects_github_ssh_url() {
        let result = detect_provider("git@github.com:owner/repo.git");
        assert_eq!(result, Some(ForgeProvider::GitHub));
    }

    #[test]
    fn detects_github_https_url() {
        let result = detect_provider("https://github.com/owner/repo.git");
        assert_eq!(result, Some(ForgeProvider::GitHub));
    }

    #[test]
    fn unknown_host_is_none() {
        assert_eq!(detect_provider("https://example.com/owner/repo.git"), None);
    }
}

mod factory {
    use super::*;

    #[test]
    fn creates_github_forge_for_coordinates() {
        let repo = RepoCoordinates::from_remote_url("git@github.com:octocat/hello-world.git", "main")
            .unwrap();
        let forge = create_forge(ForgeProvider::GitHub, &repo, "token", None);
        assert_eq!(forge.name(), "github");
    }

    #[test]
    fn valid_names_list_github() {
        assert_eq!(valid_forge_names(), vec!["github"]);
    }
}

mod config_selection {
    use super::*;

    fn load(contents: &str) -> Result<Config, forgegate::core::config::ConfigError> {
        let dir = tempfile::TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        Config::load(Some(&path))
    }

    #[test]
    fn provider_and_api_base_from_file() {
        let config = load(
            r#"
            [forge]
            provider = "github"
            api_base = "https://github.example.com/api/v3"

            [repo]
            owner = "octocat"
            name = "hello-world"
            base_branch = "trunk"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider(), ForgeProvider::GitHub);
        assert_eq!(config.api_base(), Some("https://github.example.com/api/v3"));
        let repo = config.repo_coordinates().unwrap();
        assert_eq!(repo.slug(), "octocat/hello-world");
        assert_eq!(repo.base_branch(), "trunk");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(load("[forge]\nprovider = \"gitlab\"\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(load("[forge]\ntoken = \"secret\"\n").is_err());
    }
}
