//! Insight aggregation command

use clap::Args;
use guardian_core::InsightAggregator;

use super::{print_json, Context};

/// Combine AI-review and metrics service payloads
#[derive(Args, Debug)]
pub struct InsightsArgs {
    /// Report partial results instead of failing on the first unreachable service
    #[arg(long)]
    pub best_effort: bool,
}

impl InsightsArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let aggregator = InsightAggregator::new(ctx.resolver()?, ctx.metrics()?);
        let targets = InsightAggregator::default_targets(&ctx.config.services);

        let body = if self.best_effort {
            aggregator.dashboard(targets).await?
        } else {
            aggregator.aggregate_insights(targets).await?
        };

        print_json(&body)
    }
}
