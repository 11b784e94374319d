//! Endpoint resolution command

use clap::Args;
use guardian_core::endpoint::candidate_urls;
use guardian_core::ServiceTarget;
use serde_json::json;

use super::{print_json, Context};

/// Probe candidate URLs for a service and print the first that answers
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Configured base URL (may be stale)
    pub url: String,

    /// Logical service name used in logs and errors
    #[arg(short, long, default_value = "service")]
    pub name: String,
}

impl ResolveArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let target = ServiceTarget::new(&self.name, &self.url);
        let resolved = ctx.resolver()?.resolve_and_fetch(&target).await?;

        print_json(&json!({
            "candidates": candidate_urls(&self.url),
            "resolved": resolved,
        }))
    }
}
