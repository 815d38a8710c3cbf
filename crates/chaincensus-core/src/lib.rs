//! chaincensus-core — script classification engine for the framework census.
//!
//! # Architecture
//!
//! ```text
//! Aggregator
//!     ├── Tables          (validators / native / reference lookups)
//!     ├── ShelleyAddress  (credential extraction, script-type nibbles)
//!     ├── ScriptDigest    (blake2b-224 fingerprinting)
//!     ├── Counters ×2     (interactions, transactions)
//!     └── Timeline        (per-epoch incremental snapshots)
//! ProgressReporter / render_* (progress + final output)
//! ```

pub mod address;
pub mod aggregator;
pub mod epoch;
pub mod error;
pub mod fingerprint;
pub mod framework;
pub mod report;
pub mod tables;
pub mod types;

pub use address::{decode_stake_credential, ShelleyAddress};
pub use aggregator::{Aggregator, Counters, Timeline};
pub use epoch::epoch_of_slot;
pub use error::CensusError;
pub use fingerprint::ScriptDigest;
pub use framework::Framework;
pub use report::{render_summary, render_timeline, write_unknowns, ProgressReporter};
pub use tables::Tables;
pub use types::{output_ref, Block, Output, Point, Script, ScriptLanguage, Transaction};
