//! `chaincensus collect` — inventory every distinct script in the window.
//!
//! Plutus scripts go to stdout as `digest,cbor` CSV lines, ready to be
//! classified offline and merged into `validators.json`. Native scripts only
//! need their digest, emitted to stderr as quoted entries for
//! `native_scripts.json`.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use chaincensus_core::{Block, CensusError, Point, Script, ScriptDigest};
use chaincensus_sync::{BlockHandler, SyncClient, WsTransport};

use crate::config::RunConfig;

#[derive(Default)]
struct CollectHandler {
    seen: HashSet<String>,
}

impl CollectHandler {
    fn emit(&mut self, script: &Script) {
        let Some(digest) = ScriptDigest::of(script) else { return };
        if !self.seen.insert(digest.as_hex().to_string()) {
            return;
        }
        if script.language.is_native() {
            eprintln!("\"{digest}\",");
        } else {
            println!("{digest},{}", script.cbor);
        }
    }
}

#[async_trait]
impl BlockHandler for CollectHandler {
    async fn on_forward(&mut self, block: &Block, _tip: &Point) -> Result<(), CensusError> {
        for tx in &block.transactions {
            for script in tx.scripts.values() {
                self.emit(script);
            }
            for output in &tx.outputs {
                if let Some(script) = &output.script {
                    self.emit(script);
                }
            }
        }
        Ok(())
    }
}

pub async fn run(config: RunConfig) -> Result<()> {
    tracing::info!(network = %config.network, since = %config.since, "collecting scripts");

    let transport = WsTransport::connect(&config.host).await?;
    let mut handler = CollectHandler::default();
    let outcome = SyncClient::new(transport)
        .run(config.since.clone(), config.until.clone(), &mut handler)
        .await?;

    tracing::info!(
        blocks = outcome.blocks,
        scripts = handler.seen.len(),
        "collection complete",
    );
    Ok(())
}
