//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each handler resolves a [`PrGateway`] from the [`Context`], runs one
//! gateway operation, and prints the result as JSON.
//!
//! # Async Commands
//!
//! Gateway operations are async because they involve network I/O. Each
//! handler is a synchronous wrapper that drives its async body on a fresh
//! tokio runtime.

mod create;
mod get;
mod merge;
mod update;

pub use create::create;
pub use get::get;
pub use merge::merge;
pub use update::{reopen, update};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::core::types::RepoCoordinates;
use crate::forge::create_forge;
use crate::gateway::{PrGateway, PrUpdate, TracingAnalytics};

/// Environment variable holding the forge API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Inputs shared by every command, taken from global flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub token: Option<String>,
    pub repo: Option<String>,
}

impl Context {
    /// Build a gateway from flags, environment, and configuration.
    ///
    /// # Errors
    ///
    /// Fails when the config cannot be loaded, no repository is known, or no
    /// token is available.
    pub fn gateway(&self) -> Result<PrGateway> {
        let config = Config::load(self.config_path.as_deref())?;
        let repo = self.repo_coordinates(&config)?;
        let token = resolve_token(self.token.as_deref(), std::env::var(TOKEN_ENV).ok())?;

        let provider = config.provider();
        tracing::debug!(
            provider = %provider,
            repo = %repo,
            config = ?config.path(),
            "building gateway"
        );

        let forge = create_forge(provider, &repo, &token, config.api_base());
        Ok(PrGateway::new(forge, repo)
            .with_retry_policy(config.retry_policy())
            .with_analytics(std::sync::Arc::new(TracingAnalytics)))
    }

    fn repo_coordinates(&self, config: &Config) -> Result<RepoCoordinates> {
        match &self.repo {
            Some(slug) => RepoCoordinates::from_slug(slug, config.base_branch())
                .with_context(|| format!("invalid --repo '{}'", slug)),
            None => config.repo_coordinates().ok_or_else(|| {
                anyhow::anyhow!(
                    "No repository configured. Pass --repo OWNER/NAME or set [repo] owner and name in the config file."
                )
            }),
        }
    }
}

/// Pick the token from the flag, then the environment. Blank values count as absent.
pub fn resolve_token(flag: Option<&str>, env: Option<String>) -> Result<String> {
    flag.map(str::to_string)
        .into_iter()
        .chain(env)
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
        .ok_or_else(|| anyhow::anyhow!("No API token. Pass --token or set {}.", TOKEN_ENV))
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Create {
            title,
            head,
            body,
            base,
            draft,
        } => create::create(ctx, &title, &head, &body, base.as_deref(), draft),
        Command::Get { number } => get::get(ctx, number),
        Command::Merge { number, method } => merge::merge(ctx, number, method.into()),
        Command::Reopen { number } => update::reopen(ctx, number),
        Command::Update {
            number,
            description,
            state,
            base,
        } => update::update(
            ctx,
            number,
            PrUpdate {
                description,
                state: state.map(Into::into),
                target_base: base,
            },
        ),
    }
}

/// Run an async command body to completion.
fn block_on<F: std::future::Future<Output = Result<()>>>(body: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(body)
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
