//! Known-script tables.
//!
//! Three read-only tables, loaded once at startup and never mutated:
//!
//! - `validators.json` — `[[digest, framework], …]`: script digests and
//!   payment/delegation credentials attributed to a framework.
//! - `native_scripts.json` — `[digest, …]`: digests of phase-1 native
//!   scripts.
//! - `reference_scripts.json` — `[["txid#index", digest], …]`: resolves a
//!   reference input to the digest of the inline script at that output.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::CensusError;
use crate::framework::Framework;

/// Digest/credential → framework.
#[derive(Debug, Default)]
pub struct KnownScripts {
    by_digest: HashMap<String, Framework>,
}

impl KnownScripts {
    pub fn from_json_str(json: &str) -> Result<Self, CensusError> {
        let entries: Vec<(String, Framework)> = serde_json::from_str(json)?;
        Ok(Self { by_digest: entries.into_iter().collect() })
    }

    pub fn get(&self, digest: &str) -> Option<Framework> {
        self.by_digest.get(digest).copied()
    }

    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }
}

/// Digests of known phase-1 native scripts.
#[derive(Debug, Default)]
pub struct NativeScripts {
    digests: HashSet<String>,
}

impl NativeScripts {
    pub fn from_json_str(json: &str) -> Result<Self, CensusError> {
        let digests: Vec<String> = serde_json::from_str(json)?;
        Ok(Self { digests: digests.into_iter().collect() })
    }

    pub fn contains(&self, digest: &str) -> bool {
        self.digests.contains(digest)
    }
}

/// `"txid#index"` → script digest, for resolving reference inputs.
#[derive(Debug, Default)]
pub struct ReferenceScripts {
    by_outref: HashMap<String, String>,
}

impl ReferenceScripts {
    pub fn from_json_str(json: &str) -> Result<Self, CensusError> {
        let entries: Vec<(String, String)> = serde_json::from_str(json)?;
        Ok(Self { by_outref: entries.into_iter().collect() })
    }

    pub fn resolve(&self, outref: &str) -> Option<&str> {
        self.by_outref.get(outref).map(String::as_str)
    }
}

/// The full set of reference tables a run classifies against.
#[derive(Debug, Default)]
pub struct Tables {
    pub validators: KnownScripts,
    pub native: NativeScripts,
    pub references: ReferenceScripts,
}

impl Tables {
    /// Load all three tables from a data directory.
    ///
    /// A missing or malformed file is a configuration error — the run
    /// aborts before any network traffic.
    pub fn load(dir: &Path) -> Result<Self, CensusError> {
        Ok(Self {
            validators: KnownScripts::from_json_str(&read(dir, "validators.json")?)?,
            native: NativeScripts::from_json_str(&read(dir, "native_scripts.json")?)?,
            references: ReferenceScripts::from_json_str(&read(dir, "reference_scripts.json")?)?,
        })
    }

    /// Empty tables — every lookup misses. Used by the collect run
    /// variants, which inventory scripts without classifying them.
    pub fn empty() -> Self {
        Self::default()
    }
}

fn read(dir: &Path, name: &str) -> Result<String, CensusError> {
    let path = dir.join(name);
    std::fs::read_to_string(&path)
        .map_err(|e| CensusError::Table(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validators_table_parses_pairs() {
        let json = r#"[
            ["aaaa", "aiken"],
            ["bbbb", "plutarch"],
            ["cccc", "plutus-tx"]
        ]"#;
        let table = KnownScripts::from_json_str(json).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("aaaa"), Some(Framework::Aiken));
        assert_eq!(table.get("cccc"), Some(Framework::PlutusTx));
        assert_eq!(table.get("dddd"), None);
    }

    #[test]
    fn bad_framework_name_is_an_error() {
        let json = r#"[["aaaa", "not-a-framework"]]"#;
        assert!(KnownScripts::from_json_str(json).is_err());
    }

    #[test]
    fn native_and_reference_tables() {
        let native = NativeScripts::from_json_str(r#"["n1", "n2"]"#).unwrap();
        assert!(native.contains("n1"));
        assert!(!native.contains("n3"));

        let refs = ReferenceScripts::from_json_str(r#"[["tx0#0", "d0"]]"#).unwrap();
        assert_eq!(refs.resolve("tx0#0"), Some("d0"));
        assert_eq!(refs.resolve("tx0#1"), None);
    }
}
