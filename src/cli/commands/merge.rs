//! cli::commands::merge
//!
//! Merge a pull request via the forge API.
//!
//! # Example
//!
//! ```bash
//! fgate merge 42
//! fgate merge 42 --method squash
//! ```

use super::{block_on, print_json, Context};
use crate::forge::MergeMethod;
use anyhow::Result;
use serde_json::json;

/// Run the merge command.
pub fn merge(ctx: &Context, number: u64, method: MergeMethod) -> Result<()> {
    block_on(async {
        let gateway = ctx.gateway()?;
        gateway.merge(method, number).await?;
        print_json(&json!({
            "number": number,
            "merged": true,
            "method": method.as_str(),
        }))
    })
}
