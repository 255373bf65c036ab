//! cli::commands::get
//!
//! Print the full record of a pull request.

use super::{block_on, print_json, Context};
use anyhow::Result;

/// Run the get command.
pub fn get(ctx: &Context, number: u64) -> Result<()> {
    block_on(async {
        let gateway = ctx.gateway()?;
        let pr = gateway.get(number).await?;
        tracing::debug!(number = pr.number, state = %pr.state, "fetched pull request");
        print_json(&pr)
    })
}
