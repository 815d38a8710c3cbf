//! The chain-sync session driver.
//!
//! Negotiates an intersection, fills the pipeline window, then dispatches
//! forward blocks to a handler until the boundary slot is reached and the
//! window has drained.

use async_trait::async_trait;

use chaincensus_core::{Block, CensusError, Point};

use crate::cursor::ChainCursor;
use crate::messages::{
    parse_intersection, parse_next_block, IntersectionOutcome, NextBlock, Request, RollbackPoint,
};
use crate::scheduler::{PipelineScheduler, PIPELINE_WINDOW};
use crate::transport::ChainSyncTransport;

/// Receives blocks as the stream advances.
#[async_trait]
pub trait BlockHandler: Send {
    /// Called once per forward block inside the census window, in chain
    /// order.
    async fn on_forward(&mut self, block: &Block, tip: &Point) -> Result<(), CensusError>;

    /// Called when the node announces a rollback. The default ignores it:
    /// the census is a one-pass sweep of already-settled history, where
    /// rollbacks only ever occur within a few slots of the tip.
    async fn on_backward(&mut self, _point: &RollbackPoint, _tip: &Point) -> Result<(), CensusError> {
        Ok(())
    }
}

/// Summary of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Forward blocks dispatched to the handler.
    pub blocks: u64,
    /// Slot of the last block seen (boundary block included).
    pub last_slot: u64,
    /// The node's tip at intersection time.
    pub tip: Point,
}

/// A single-use chain-sync session over one transport.
pub struct SyncClient<T> {
    transport: T,
    window: usize,
}

impl<T: ChainSyncTransport> SyncClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, window: PIPELINE_WINDOW }
    }

    #[cfg(test)]
    fn with_window(transport: T, window: usize) -> Self {
        Self { transport, window }
    }

    /// Stream blocks from `since` (exclusive) up to `until`, or to the
    /// node's tip when no stop point is given.
    ///
    /// The boundary is inclusive: the block *at* the stop slot is handed to
    /// the handler, then the remaining pipelined replies drain undispatched.
    pub async fn run<H: BlockHandler>(
        mut self,
        since: Point,
        until: Option<Point>,
        handler: &mut H,
    ) -> Result<SyncOutcome, CensusError> {
        self.transport
            .send(&Request::find_intersection(std::slice::from_ref(&since)))
            .await?;
        let reply = self.recv("findIntersection").await?;
        let found = match parse_intersection(&reply)? {
            IntersectionOutcome::Found(found) => found,
            IntersectionOutcome::NotFound => {
                return Err(CensusError::IntersectionNotFound { slot: since.slot });
            }
        };

        let boundary_slot = until.as_ref().map(|p| p.slot).unwrap_or(found.tip.slot);
        tracing::info!(
            intersection = %found.intersection,
            tip = %found.tip,
            boundary_slot,
            "intersection negotiated",
        );

        let mut cursor = ChainCursor::new(since.slot, boundary_slot);
        let mut scheduler = PipelineScheduler::new(self.window);
        for _ in 0..scheduler.start_streaming() {
            self.transport.send(&Request::next_block()).await?;
        }

        let mut blocks = 0u64;
        while !scheduler.is_done() {
            let reply = self.recv("nextBlock").await?;
            match parse_next_block(&reply)? {
                NextBlock::Forward { block, tip } => {
                    // Dispatch before advancing so the boundary block itself
                    // is still handed over; replies past it only drain.
                    if !cursor.reached_boundary() {
                        blocks += 1;
                        handler.on_forward(&block, &tip).await?;
                    }
                    cursor.advance(block.slot);
                }
                NextBlock::Backward { point, tip } => {
                    tracing::debug!(point = %point, tip = %tip, "rollback announced");
                    handler.on_backward(&point, &tip).await?;
                }
            }
            if scheduler.on_reply(cursor.reached_boundary()) {
                self.transport.send(&Request::next_block()).await?;
            }
        }

        Ok(SyncOutcome { blocks, last_slot: cursor.current_slot(), tip: found.tip })
    }

    async fn recv(&mut self, context: &'static str) -> Result<serde_json::Value, CensusError> {
        self.transport.next_message().await?.ok_or_else(|| {
            CensusError::Transport(format!("connection closed while awaiting {context}"))
        })
    }
}
