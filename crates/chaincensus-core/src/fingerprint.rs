//! Script fingerprint computation.
//!
//! The canonical identity of a script is the blake2b-224 hash of its
//! language tag byte followed by the raw CBOR payload:
//!
//! ```text
//! digest = blake2b224(tag ++ cbor)     tag: native=0, plutus v1/v2/v3=1/2/3
//! ```
//!
//! Tag-prefixing means the same payload compiled for two languages can
//! never share a digest. All tagging lives here — call sites never build
//! preimages by hand.

use blake2::digest::consts::U28;
use blake2::{Blake2b, Digest};

use crate::types::Script;

type Blake2b224 = Blake2b<U28>;

/// A 28-byte script digest, hex-rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptDigest(String);

impl ScriptDigest {
    /// Fingerprint a script.
    ///
    /// Returns `None` if the CBOR payload is not valid hex — such a script
    /// cannot be identified and is skipped, never fatal.
    pub fn of(script: &Script) -> Option<Self> {
        let cbor = hex::decode(&script.cbor).ok()?;
        let mut hasher = Blake2b224::new();
        hasher.update([script.language.tag()]);
        hasher.update(&cbor);
        Some(Self(hex::encode(hasher.finalize())))
    }

    /// The hex form (56 lowercase characters).
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Consume into the hex string.
    pub fn into_hex(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ScriptDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScriptLanguage;

    fn script(language: ScriptLanguage, cbor: &str) -> Script {
        Script { language, cbor: cbor.into() }
    }

    #[test]
    fn digest_is_deterministic() {
        let s = script(ScriptLanguage::PlutusV2, "4e4d01000033222220051200120011");
        let a = ScriptDigest::of(&s).unwrap();
        let b = ScriptDigest::of(&s).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_hex().len(), 56);
        assert!(a.as_hex().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tag_prevents_cross_language_collision() {
        // Same payload bytes, different languages — digests must differ.
        let payload = "4e4d01000033222220051200120011";
        let v1 = ScriptDigest::of(&script(ScriptLanguage::PlutusV1, payload)).unwrap();
        let v2 = ScriptDigest::of(&script(ScriptLanguage::PlutusV2, payload)).unwrap();
        let v3 = ScriptDigest::of(&script(ScriptLanguage::PlutusV3, payload)).unwrap();
        let native = ScriptDigest::of(&script(ScriptLanguage::Native, payload)).unwrap();
        assert_ne!(v1, v2);
        assert_ne!(v2, v3);
        assert_ne!(v1, v3);
        assert_ne!(native, v1);
    }

    #[test]
    fn invalid_hex_payload_yields_none() {
        let s = script(ScriptLanguage::PlutusV1, "not-hex");
        assert!(ScriptDigest::of(&s).is_none());
    }
}
