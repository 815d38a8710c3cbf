//! Error types for the census pipeline.

use thiserror::Error;

/// Errors that can stop a census run.
///
/// Per-record anomalies (an unrecognized script digest, a Byron-era address)
/// are *not* errors — they are accumulated as data by the aggregator.
#[derive(Debug, Error)]
pub enum CensusError {
    /// Bad or missing configuration — fatal before any network traffic.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested network has no known starting point.
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    /// The node rejected every candidate intersection point.
    #[error("Intersection not found upstream at slot {slot}")]
    IntersectionNotFound { slot: u64 },

    /// WebSocket connection/send/receive error.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node sent a reply we could not make sense of.
    #[error("Protocol error in {context}: {reason}")]
    Protocol { context: &'static str, reason: String },

    /// A known-script table could not be loaded or parsed.
    #[error("Table error: {0}")]
    Table(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl CensusError {
    /// Returns `true` if the error should abort before connecting.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::UnknownNetwork(_))
    }
}
