//! cli::commands::update
//!
//! Change pull request fields, or reopen a closed pull request.
//!
//! Only the flags given are sent; everything else is left as it is on the
//! forge.

use super::{block_on, print_json, Context};
use crate::gateway::PrUpdate;
use anyhow::{bail, Result};
use serde_json::json;

/// Run the update command.
pub fn update(ctx: &Context, number: u64, details: PrUpdate) -> Result<()> {
    if details == PrUpdate::default() {
        bail!("Nothing to update. Pass --description, --state, or --base.");
    }

    block_on(async {
        let gateway = ctx.gateway()?;
        gateway.update(number, details.clone()).await?;
        print_json(&json!({
            "number": number,
            "updated": {
                "description": details.description,
                "state": details.state.map(|s| s.as_str()),
                "base": details.target_base,
            },
        }))
    })
}

/// Run the reopen command.
pub fn reopen(ctx: &Context, number: u64) -> Result<()> {
    block_on(async {
        let gateway = ctx.gateway()?;
        gateway.reopen(number).await?;
        print_json(&json!({ "number": number, "state": "open" }))
    })
}
