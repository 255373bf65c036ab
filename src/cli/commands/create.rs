//! cli::commands::create
//!
//! Open a pull request through the gateway.
//!
//! # Example
//!
//! ```bash
//! fgate create --title "Fix bug" --head feature/fix
//! fgate create --title "WIP" --head feature/wip --base develop --draft
//! ```

use super::{block_on, print_json, Context};
use crate::gateway::CreateArgs;
use anyhow::Result;

/// Run the create command.
pub fn create(
    ctx: &Context,
    title: &str,
    head: &str,
    body: &str,
    base: Option<&str>,
    draft: bool,
) -> Result<()> {
    block_on(async {
        let gateway = ctx.gateway()?;
        let base = base.unwrap_or(gateway.repo().base_branch()).to_string();

        let pr = gateway
            .create(CreateArgs::new(title, body, base, head).draft(draft))
            .await?;
        print_json(&pr)
    })
}
