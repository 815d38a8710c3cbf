//! `chaincensus count` — the census proper.

use anyhow::{Context, Result};
use async_trait::async_trait;

use chaincensus_core::{
    render_summary, render_timeline, report, Aggregator, Block, CensusError, Point, ProgressReporter,
    Tables,
};
use chaincensus_sync::{BlockHandler, SyncClient, WsTransport};

use crate::config::RunConfig;

struct CountHandler {
    aggregator: Aggregator,
    reporter: Option<ProgressReporter>,
    since_slot: u64,
    until_slot: Option<u64>,
}

#[async_trait]
impl BlockHandler for CountHandler {
    async fn on_forward(&mut self, block: &Block, tip: &Point) -> Result<(), CensusError> {
        // The boundary is only known once the first reply reveals the tip.
        let reporter = self.reporter.get_or_insert_with(|| {
            ProgressReporter::new(self.since_slot, self.until_slot.unwrap_or(tip.slot))
        });
        self.aggregator.ingest_block(block);
        reporter.maybe_report(&self.aggregator, block.slot);
        Ok(())
    }
}

pub async fn run(config: RunConfig) -> Result<()> {
    let tables = Tables::load(&config.data_dir)
        .with_context(|| format!("loading tables from {}", config.data_dir.display()))?;
    tracing::info!(
        validators = tables.validators.len(),
        network = %config.network,
        since = %config.since,
        "starting census",
    );

    let transport = WsTransport::connect(&config.host).await?;
    let mut handler = CountHandler {
        aggregator: Aggregator::new(tables),
        reporter: None,
        since_slot: config.since.slot,
        until_slot: config.until.as_ref().map(|p| p.slot),
    };

    let outcome = SyncClient::new(transport)
        .run(config.since.clone(), config.until.clone(), &mut handler)
        .await?;
    handler.aggregator.finish();

    let boundary = config.boundary_slot(outcome.tip.slot);
    tracing::info!(blocks = outcome.blocks, last_slot = outcome.last_slot, "census complete");

    println!("{}", render_summary(&handler.aggregator));
    println!("{}", render_timeline(&handler.aggregator));

    let path = report::write_unknowns(
        &config.data_dir,
        config.since.slot,
        boundary,
        handler.aggregator.unknowns(),
    )?;
    tracing::info!(
        unknowns = handler.aggregator.unknowns().len(),
        path = %path.display(),
        "unknown scripts persisted",
    );

    Ok(())
}
