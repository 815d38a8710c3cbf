//! chaincensus-sync — pipelined chain-sync client over Ogmios.
//!
//! # Architecture
//!
//! ```text
//! SyncClient::run
//!     ├── WsTransport        (frames in/out, ping/pong)
//!     ├── messages           (findIntersection / nextBlock envelopes)
//!     ├── PipelineScheduler  (window of in-flight requests, drain at boundary)
//!     ├── ChainCursor        (position vs. stop slot)
//!     └── BlockHandler       (caller's per-block callback)
//! ```
//!
//! The node answers chain-sync requests strictly in order, so the client
//! keeps [`PIPELINE_WINDOW`](scheduler::PIPELINE_WINDOW) requests in flight
//! and never correlates replies by id.

pub mod client;
pub mod cursor;
pub mod messages;
pub mod scheduler;
pub mod transport;

pub use client::{BlockHandler, SyncClient, SyncOutcome};
pub use cursor::ChainCursor;
pub use messages::{NextBlock, Request, RollbackPoint};
pub use scheduler::{PipelineScheduler, SyncState, PIPELINE_WINDOW};
pub use transport::{ChainSyncTransport, WsTransport};
