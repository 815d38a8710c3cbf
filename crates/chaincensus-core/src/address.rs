//! Shelley address decoding.
//!
//! Shelley addresses are bech32-encoded with an `addr` prefix. The first
//! byte of the decoded payload is a header whose high nibble classifies the
//! address; bytes `[1, 29)` are the payment credential and bytes `[29, ..)`
//! the delegation credential (absent for enterprise addresses).
//!
//! Byron-era addresses use a different (base58) encoding and cannot hold
//! scripts, so anything not starting with `addr` decodes to `None` — that
//! is "no script possible", never an error.

use bech32::FromBase32;

/// Header nibbles whose payment credential is a script hash.
const PAYMENT_SCRIPT_TYPES: [u8; 4] = [0x1, 0x3, 0x5, 0x7];

/// Header nibbles whose delegation credential is a script hash.
const DELEGATION_SCRIPT_TYPES: [u8; 2] = [0x2, 0x3];

/// A decoded Shelley address.
#[derive(Debug, Clone)]
pub struct ShelleyAddress {
    bytes: Vec<u8>,
}

impl ShelleyAddress {
    /// Decode a textual address.
    ///
    /// Returns `None` for non-Shelley (Byron/base58) addresses and for
    /// strings that fail bech32 checksum validation.
    pub fn decode(address: &str) -> Option<Self> {
        if !address.starts_with("addr") {
            return None;
        }
        let (_hrp, words, _variant) = bech32::decode(address).ok()?;
        let bytes = Vec::<u8>::from_base32(&words).ok()?;
        if bytes.is_empty() {
            return None;
        }
        Some(Self { bytes })
    }

    /// The address type: high nibble of the header byte.
    pub fn addr_type(&self) -> u8 {
        self.bytes[0] >> 4
    }

    /// Payment credential, hex-rendered (bytes `[1, 29)`).
    pub fn payment_part(&self) -> String {
        self.bytes.get(1..29).map(hex::encode).unwrap_or_default()
    }

    /// Delegation credential, hex-rendered (bytes `[29, ..)`, possibly empty).
    pub fn delegation_part(&self) -> String {
        self.bytes.get(29..).map(hex::encode).unwrap_or_default()
    }

    /// Could any credential of this address be a script?
    pub fn may_hold_script(&self) -> bool {
        self.payment_is_script() || self.delegation_is_script()
    }

    /// Is the payment credential a script hash?
    pub fn payment_is_script(&self) -> bool {
        PAYMENT_SCRIPT_TYPES.contains(&self.addr_type())
    }

    /// Is the delegation credential a script hash?
    pub fn delegation_is_script(&self) -> bool {
        DELEGATION_SCRIPT_TYPES.contains(&self.addr_type())
    }
}

/// Extract the credential from a bech32 reward (stake) address.
///
/// Reward addresses carry a 1-byte header followed by a 28-byte credential;
/// we drop the header and return the credential hex. `None` for anything
/// that is not a `stake`-prefixed bech32 string.
pub fn decode_stake_credential(stake_address: &str) -> Option<String> {
    if !stake_address.starts_with("stake") {
        return None;
    }
    let (_hrp, words, _variant) = bech32::decode(stake_address).ok()?;
    let bytes = Vec::<u8>::from_base32(&words).ok()?;
    bytes.get(1..).map(hex::encode)
}
