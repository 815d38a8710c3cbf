//! Wire types for the chain-sync block stream.
//!
//! These mirror the JSON shapes the node emits. Blocks and transactions are
//! transient: deserialized per inbound message, handed to the aggregator,
//! then dropped. Unknown fields are ignored on purpose — we only model what
//! the census needs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Point ────────────────────────────────────────────────────────────────────

/// A chain position: slot number + block id.
///
/// Used both as the intersection candidate at startup and as the stream
/// boundary (tip or a configured stop point).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Absolute slot number.
    pub slot: u64,
    /// Block header hash, hex-rendered.
    pub id: String,
}

impl Point {
    pub fn new(slot: u64, id: impl Into<String>) -> Self {
        Self { slot, id: id.into() }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.id, self.slot)
    }
}

// ─── Block / Transaction ─────────────────────────────────────────────────────

/// A ledger block, reduced to what classification needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub slot: u64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// A transaction, reduced to its script-bearing surfaces.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub outputs: Vec<Output>,
    /// Witness scripts keyed by their digest.
    #[serde(default)]
    pub scripts: HashMap<String, Script>,
    /// Mint policies keyed by policy id (a script digest).
    #[serde(default)]
    pub mint: HashMap<String, Value>,
    /// Withdrawals keyed by reward (stake) address.
    #[serde(default)]
    pub withdrawals: HashMap<String, Value>,
    /// Collateral inputs — presence is a strong signal of script execution.
    #[serde(default)]
    pub collaterals: Vec<Value>,
    /// Reference inputs: read, not consumed.
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl Transaction {
    /// Returns `true` if this transaction posted collateral.
    pub fn has_collateral(&self) -> bool {
        !self.collaterals.is_empty()
    }
}

/// A reference input: an output this transaction reads without consuming.
#[derive(Debug, Clone, Deserialize)]
pub struct Reference {
    pub transaction: TransactionPointer,
    pub index: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionPointer {
    pub id: String,
}

impl Reference {
    /// The `"txid#index"` key used by the reference table.
    pub fn key(&self) -> String {
        output_ref(&self.transaction.id, self.index)
    }
}

/// Render an output reference as `"txid#index"`.
pub fn output_ref(transaction_id: &str, index: u64) -> String {
    format!("{transaction_id}#{index}")
}

// ─── Output / Script ─────────────────────────────────────────────────────────

/// A transaction output.
#[derive(Debug, Clone, Deserialize)]
pub struct Output {
    pub address: String,
    /// Inline script attached to the output, if any.
    #[serde(default)]
    pub script: Option<Script>,
}

/// An on-chain script blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub language: ScriptLanguage,
    /// CBOR payload, hex-encoded.
    pub cbor: String,
}

/// The ledger language a script was compiled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptLanguage {
    #[serde(rename = "native")]
    Native,
    #[serde(rename = "plutus:v1")]
    PlutusV1,
    #[serde(rename = "plutus:v2")]
    PlutusV2,
    #[serde(rename = "plutus:v3")]
    PlutusV3,
}

impl ScriptLanguage {
    /// The single-byte digest tag for this language.
    pub fn tag(self) -> u8 {
        match self {
            Self::Native => 0,
            Self::PlutusV1 => 1,
            Self::PlutusV2 => 2,
            Self::PlutusV3 => 3,
        }
    }

    pub fn is_native(self) -> bool {
        matches!(self, Self::Native)
    }
}
