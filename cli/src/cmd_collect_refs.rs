//! `chaincensus collect-refs` — map output references to inline scripts.
//!
//! Emits a JSON array of `["txid#index", digest]` pairs, the raw material
//! for `reference_scripts.json`: it lets a later census resolve reference
//! inputs to the script they point at without replaying the chain.

use anyhow::Result;
use async_trait::async_trait;

use chaincensus_core::{output_ref, Block, CensusError, Point, ScriptDigest};
use chaincensus_sync::{BlockHandler, SyncClient, WsTransport};

use crate::config::RunConfig;

#[derive(Default)]
struct CollectRefsHandler {
    entries: Vec<(String, String)>,
}

#[async_trait]
impl BlockHandler for CollectRefsHandler {
    async fn on_forward(&mut self, block: &Block, _tip: &Point) -> Result<(), CensusError> {
        for tx in &block.transactions {
            for (index, output) in tx.outputs.iter().enumerate() {
                let Some(script) = &output.script else { continue };
                // Reference inputs only ever resolve to Plutus validators;
                // native scripts are tracked by their own table.
                if script.language.is_native() {
                    continue;
                }
                if let Some(digest) = ScriptDigest::of(script) {
                    self.entries.push((output_ref(&tx.id, index as u64), digest.into_hex()));
                }
            }
        }
        Ok(())
    }
}

pub async fn run(config: RunConfig) -> Result<()> {
    tracing::info!(network = %config.network, since = %config.since, "collecting reference scripts");

    let transport = WsTransport::connect(&config.host).await?;
    let mut handler = CollectRefsHandler::default();
    let outcome = SyncClient::new(transport)
        .run(config.since.clone(), config.until.clone(), &mut handler)
        .await?;

    println!("{}", serde_json::to_string_pretty(&handler.entries)?);
    tracing::info!(
        blocks = outcome.blocks,
        references = handler.entries.len(),
        "collection complete",
    );
    Ok(())
}
