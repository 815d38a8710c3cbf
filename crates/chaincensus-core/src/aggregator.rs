//! Classifier/aggregator — matches script references against the known
//! tables and tallies per-framework, per-transaction, and per-epoch counts.
//!
//! A transaction is classified when it posted collateral or pays to a
//! script-capable address. Four channels are then resolved independently
//! (a single transaction can hit several):
//!
//! 1. witness scripts (mint policies, spend witnesses, withdrawals),
//! 2. reference-input scripts, via the reference table,
//! 3. payment/delegation credentials of every output address,
//! 4. inline scripts on outputs, fingerprinted on the spot.
//!
//! Every resolved key is looked up in the validators table, then the
//! native-scripts table; misses go to the unknown set. Nothing in here is
//! fatal: unresolved scripts are data, not errors.
//!
//! All aggregate state lives in this one type, owned by the processing
//! loop. Rollback messages are intentionally never folded in (see the
//! sync client) — a rolled-back block's contribution is not retracted.

use std::collections::BTreeSet;

use crate::address::{decode_stake_credential, ShelleyAddress};
use crate::epoch::epoch_of_slot;
use crate::fingerprint::ScriptDigest;
use crate::framework::Framework;
use crate::tables::Tables;
use crate::types::{Block, Output, Transaction};

// ─── Counters ────────────────────────────────────────────────────────────────

/// A fixed-size per-framework counter plus a running total.
///
/// Two parallel instances exist on the aggregator: `interactions` counts
/// every script occurrence, `transactions` counts at most one hit per
/// framework per transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    counts: [u64; Framework::COUNT],
    total: u64,
}

impl Counters {
    pub fn get(&self, framework: Framework) -> u64 {
        self.counts[framework.index()]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    fn bump(&mut self, framework: Framework) {
        self.counts[framework.index()] += 1;
    }

    fn bump_total(&mut self) {
        self.total += 1;
    }

    fn snapshot(&self) -> [u64; Framework::COUNT] {
        self.counts
    }
}

// ─── Timeline ────────────────────────────────────────────────────────────────

/// Append-only per-epoch series of *incremental* transaction counts.
///
/// One entry per framework per epoch-boundary crossing — checked on every
/// forward block so a crossing is never skipped, no matter how sparse the
/// report interval is.
#[derive(Debug, Default)]
pub struct Timeline {
    epochs: Vec<u64>,
    series: Vec<[u64; Framework::COUNT]>,
    last_snapshot: [u64; Framework::COUNT],
    current_epoch: Option<u64>,
}

impl Timeline {
    /// Observe a forward block's slot; appends one snapshot when the slot
    /// crosses into a new epoch.
    fn observe_slot(&mut self, slot: u64, transactions: &Counters) {
        let epoch = epoch_of_slot(slot);
        match self.current_epoch {
            None => self.current_epoch = Some(epoch),
            Some(previous) if epoch > previous => {
                self.append(previous, transactions);
                self.current_epoch = Some(epoch);
            }
            Some(_) => {}
        }
    }

    /// Flush the in-progress epoch at end of stream.
    fn finish(&mut self, transactions: &Counters) {
        if let Some(epoch) = self.current_epoch.take() {
            self.append(epoch, transactions);
        }
    }

    fn append(&mut self, epoch: u64, transactions: &Counters) {
        let current = transactions.snapshot();
        let mut delta = [0u64; Framework::COUNT];
        for (i, (now, then)) in current.iter().zip(self.last_snapshot.iter()).enumerate() {
            delta[i] = now - then;
        }
        self.epochs.push(epoch);
        self.series.push(delta);
        self.last_snapshot = current;
    }

    /// Epoch indices, one per snapshot.
    pub fn epochs(&self) -> &[u64] {
        &self.epochs
    }

    /// Incremental counts for one framework across all snapshots.
    pub fn series(&self, framework: Framework) -> Vec<u64> {
        self.series.iter().map(|row| row[framework.index()]).collect()
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }
}

// ─── Aggregator ──────────────────────────────────────────────────────────────

/// Process-wide aggregate state for one census run.
#[derive(Debug)]
pub struct Aggregator {
    tables: Tables,
    interactions: Counters,
    transactions: Counters,
    timeline: Timeline,
    /// Digests/credentials seen but absent from every table; ordered so
    /// the persisted file is deterministic.
    unknowns: BTreeSet<String>,
    /// Classified transactions that matched no framework at all. Counted
    /// directly rather than derived as `total − Σ kinds`, which would go
    /// negative whenever one transaction matches several frameworks.
    unmatched: u64,
}

impl Aggregator {
    pub fn new(tables: Tables) -> Self {
        Self {
            tables,
            interactions: Counters::default(),
            transactions: Counters::default(),
            timeline: Timeline::default(),
            unknowns: BTreeSet::new(),
            unmatched: 0,
        }
    }

    /// Classify every transaction of a forward block.
    pub fn ingest_block(&mut self, block: &Block) {
        self.timeline.observe_slot(block.slot, &self.transactions);
        for tx in &block.transactions {
            self.classify_transaction(tx);
        }
    }

    /// Flush the tail epoch. Call once when the boundary is reached.
    pub fn finish(&mut self) {
        self.timeline.finish(&self.transactions);
    }

    pub fn interactions(&self) -> &Counters {
        &self.interactions
    }

    pub fn transactions(&self) -> &Counters {
        &self.transactions
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn unknowns(&self) -> &BTreeSet<String> {
        &self.unknowns
    }

    /// Classified transactions whose script surfaces resolved to nothing.
    pub fn unsure(&self) -> u64 {
        self.unmatched
    }

    fn classify_transaction(&mut self, tx: &Transaction) {
        let touches_scripts = tx.has_collateral()
            || tx.outputs.iter().any(|out| {
                ShelleyAddress::decode(&out.address)
                    .map(|a| a.may_hold_script())
                    .unwrap_or(false)
            });
        if !touches_scripts {
            return;
        }

        let before = self.interactions.snapshot();

        Self::count_witnesses(&self.tables, tx, &mut self.interactions, &mut self.unknowns);
        Self::count_usage(&self.tables, &tx.outputs, &mut self.interactions, &mut self.unknowns);
        Self::count_references(&self.tables, tx, &mut self.interactions, &mut self.unknowns);

        // Transaction-level tally: one increment per framework whose
        // interaction count moved, however many times it moved.
        self.transactions.bump_total();
        let after = self.interactions.snapshot();
        let mut matched = false;
        for framework in Framework::ALL {
            if after[framework.index()] > before[framework.index()] {
                self.transactions.bump(framework);
                matched = true;
            }
        }
        if !matched {
            self.unmatched += 1;
        }
    }

    /// Channel 1: witness scripts. Keys of `mint`, `scripts`, and
    /// `withdrawals` are script digests, except withdrawal keys which are
    /// reward addresses and decode to a stake credential first. The three
    /// maps are merged first, so a digest present in more than one of them
    /// still counts once.
    fn count_witnesses(
        tables: &Tables,
        tx: &Transaction,
        interactions: &mut Counters,
        unknowns: &mut BTreeSet<String>,
    ) {
        let keys: BTreeSet<&String> = tx
            .mint
            .keys()
            .chain(tx.scripts.keys())
            .chain(tx.withdrawals.keys())
            .collect();
        for key in keys {
            let credential = decode_stake_credential(key).unwrap_or_else(|| key.clone());
            Self::record(tables, &credential, interactions, unknowns);
            interactions.bump_total();
        }
    }

    /// Channel 2: reference-input scripts, resolved through the reference
    /// table. An unresolvable reference still counts as an interaction but
    /// has no digest to record as unknown.
    fn count_references(
        tables: &Tables,
        tx: &Transaction,
        interactions: &mut Counters,
        unknowns: &mut BTreeSet<String>,
    ) {
        for reference in &tx.references {
            if let Some(digest) = tables.references.resolve(&reference.key()) {
                Self::record(tables, digest, interactions, unknowns);
            }
            interactions.bump_total();
        }
    }

    /// Channels 3 and 4: output address credentials and inline scripts.
    ///
    /// Payment and delegation parts are looked up independently — an
    /// output can match on both. Unknown attribution is gated on the
    /// address type nibble: only credentials the header marks as scripts
    /// are recorded as unknown.
    fn count_usage(
        tables: &Tables,
        outputs: &[Output],
        interactions: &mut Counters,
        unknowns: &mut BTreeSet<String>,
    ) {
        for output in outputs {
            if let Some(address) = ShelleyAddress::decode(&output.address) {
                Self::record_credential(
                    tables,
                    &address.payment_part(),
                    address.payment_is_script(),
                    interactions,
                    unknowns,
                );
                Self::record_credential(
                    tables,
                    &address.delegation_part(),
                    address.delegation_is_script(),
                    interactions,
                    unknowns,
                );
            }

            if let Some(script) = &output.script {
                if let Some(digest) = ScriptDigest::of(script) {
                    Self::record(tables, digest.as_hex(), interactions, unknowns);
                    interactions.bump_total();
                }
            }
        }
    }

    /// Look up one credential from an output address. A credential that
    /// matches a table always counts; one that matches nothing counts only
    /// when the address header says it is a script.
    fn record_credential(
        tables: &Tables,
        credential: &str,
        header_says_script: bool,
        interactions: &mut Counters,
        unknowns: &mut BTreeSet<String>,
    ) {
        if let Some(framework) = tables.validators.get(credential) {
            interactions.bump(framework);
            interactions.bump_total();
        } else if tables.native.contains(credential) {
            interactions.bump(Framework::Native);
            interactions.bump_total();
        } else if header_says_script {
            unknowns.insert(credential.to_string());
            interactions.bump_total();
        }
    }

    /// Look up one digest/credential: validators table, then native table,
    /// then the unknown set.
    fn record(
        tables: &Tables,
        key: &str,
        interactions: &mut Counters,
        unknowns: &mut BTreeSet<String>,
    ) {
        if let Some(framework) = tables.validators.get(key) {
            interactions.bump(framework);
        } else if tables.native.contains(key) {
            interactions.bump(Framework::Native);
        } else {
            unknowns.insert(key.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{KnownScripts, NativeScripts, ReferenceScripts};
    use crate::types::{Script, ScriptLanguage};
    use bech32::{ToBase32, Variant};
    use serde_json::json;

    const AIKEN_DIGEST: &str = "aa11";
    const PLUTARCH_CRED: &str = "bb22bb22bb22bb22bb22bb22bb22bb22bb22bb22bb22bb22bb22bb22";

    fn tables() -> Tables {
        let validators = format!(r#"[["{AIKEN_DIGEST}", "aiken"], ["{PLUTARCH_CRED}", "plutarch"], ["dd44", "aiken"]]"#);
        Tables {
            validators: KnownScripts::from_json_str(&validators).unwrap(),
            native: NativeScripts::from_json_str(r#"["ee55"]"#).unwrap(),
            references: ReferenceScripts::from_json_str(r#"[["reftx#0", "dd44"]]"#).unwrap(),
        }
    }

    /// A type-1 base address (payment script) whose payment credential is
    /// `PLUTARCH_CRED`.
    fn plutarch_address() -> String {
        let mut bytes = vec![0x11];
        bytes.extend(hex::decode(PLUTARCH_CRED).unwrap());
        bytes.extend(std::iter::repeat(0x00).take(28));
        bech32::encode("addr", bytes.to_base32(), Variant::Bech32).unwrap()
    }

    /// A type-0 address: key/key, cannot hold scripts.
    fn key_address() -> String {
        let mut bytes = vec![0x01];
        bytes.extend(std::iter::repeat(0x99).take(56));
        bech32::encode("addr", bytes.to_base32(), Variant::Bech32).unwrap()
    }

    fn tx(value: serde_json::Value) -> Transaction {
        serde_json::from_value(value).unwrap()
    }

    fn block(slot: u64, transactions: Vec<serde_json::Value>) -> Block {
        serde_json::from_value(json!({ "slot": slot, "transactions": transactions })).unwrap()
    }

    #[test]
    fn end_to_end_three_transaction_scenario() {
        let mut agg = Aggregator::new(tables());

        // (a) collateralized tx with a witness script known to be Aiken's
        let a = json!({
            "id": "tx-a",
            "collaterals": [{}],
            "scripts": { AIKEN_DIGEST: {"language": "plutus:v2", "cbor": "00"} },
            "outputs": [{"address": key_address()}]
        });
        // (b) tx paying to an address whose payment credential is Plutarch's
        let b = json!({
            "id": "tx-b",
            "outputs": [{"address": plutarch_address()}]
        });
        // (c) tx with no collateral and no script-capable output — skipped
        let c = json!({
            "id": "tx-c",
            "outputs": [{"address": key_address()}]
        });

        agg.ingest_block(&block(5_000_000, vec![a, b, c]));

        assert_eq!(agg.transactions().get(Framework::Aiken), 1);
        assert_eq!(agg.transactions().get(Framework::Plutarch), 1);
        assert_eq!(agg.transactions().total(), 2);
        assert_eq!(agg.unsure(), 0);
    }

    #[test]
    fn at_most_one_transaction_increment_per_framework() {
        let mut agg = Aggregator::new(tables());

        // Two Aiken witness scripts plus an Aiken reference in one tx.
        let t = json!({
            "id": "tx-multi",
            "collaterals": [{}],
            "scripts": {
                AIKEN_DIGEST: {"language": "plutus:v2", "cbor": "00"},
                "dd44": {"language": "plutus:v2", "cbor": "01"}
            },
            "references": [{"transaction": {"id": "reftx"}, "index": 0}]
        });
        agg.ingest_block(&block(5_000_000, vec![t]));

        assert_eq!(agg.interactions().get(Framework::Aiken), 3);
        assert_eq!(agg.transactions().get(Framework::Aiken), 1);
        assert_eq!(agg.transactions().total(), 1);
    }

    #[test]
    fn reference_input_resolution() {
        let mut agg = Aggregator::new(tables());
        let t = json!({
            "id": "tx-ref",
            "collaterals": [{}],
            "references": [
                {"transaction": {"id": "reftx"}, "index": 0},
                {"transaction": {"id": "nosuch"}, "index": 9}
            ]
        });
        agg.ingest_block(&block(5_000_000, vec![t]));

        // "reftx#0" resolves to an Aiken digest; "nosuch#9" resolves to
        // nothing and leaves no unknown behind.
        assert_eq!(agg.interactions().get(Framework::Aiken), 1);
        assert_eq!(agg.interactions().total(), 2);
        assert_eq!(agg.transactions().get(Framework::Aiken), 1);
        assert!(agg.unknowns().is_empty());
    }

    #[test]
    fn unresolved_witness_goes_to_unknowns_and_unsure() {
        let mut agg = Aggregator::new(tables());
        let t = json!({
            "id": "tx-unknown",
            "collaterals": [{}],
            "scripts": { "feed": {"language": "plutus:v1", "cbor": "00"} }
        });
        agg.ingest_block(&block(5_000_000, vec![t]));

        assert!(agg.unknowns().contains("feed"));
        assert_eq!(agg.transactions().total(), 1);
        assert_eq!(agg.unsure(), 1);
    }

    #[test]
    fn transaction_matching_two_frameworks_is_not_unsure() {
        let mut agg = Aggregator::new(tables());
        let t = json!({
            "id": "tx-two",
            "collaterals": [{}],
            "scripts": {
                AIKEN_DIGEST: {"language": "plutus:v2", "cbor": "00"},
                PLUTARCH_CRED: {"language": "plutus:v2", "cbor": "01"}
            }
        });
        agg.ingest_block(&block(5_000_000, vec![t]));

        // One transaction, two framework marks. The total stays at one and
        // the transaction is not unsure, even though the per-kind sum
        // exceeds the total.
        assert_eq!(agg.transactions().total(), 1);
        assert_eq!(agg.transactions().get(Framework::Aiken), 1);
        assert_eq!(agg.transactions().get(Framework::Plutarch), 1);
        assert_eq!(agg.unsure(), 0);
    }

    #[test]
    fn witness_key_in_several_maps_counts_once() {
        let mut agg = Aggregator::new(tables());
        let t = json!({
            "id": "tx-dup",
            "collaterals": [{}],
            "mint": { AIKEN_DIGEST: {} },
            "scripts": { AIKEN_DIGEST: {"language": "plutus:v2", "cbor": "00"} }
        });
        agg.ingest_block(&block(5_000_000, vec![t]));

        assert_eq!(agg.interactions().get(Framework::Aiken), 1);
        assert_eq!(agg.transactions().get(Framework::Aiken), 1);
    }

    #[test]
    fn withdrawal_key_is_decoded_to_stake_credential() {
        let mut cred_bytes = vec![0xF1];
        cred_bytes.extend(hex::decode(PLUTARCH_CRED).unwrap());
        let stake_addr = bech32::encode("stake", cred_bytes.to_base32(), Variant::Bech32).unwrap();

        let mut agg = Aggregator::new(tables());
        let t = json!({
            "id": "tx-wdrl",
            "collaterals": [{}],
            "withdrawals": { stake_addr: {"ada": {"lovelace": 0}} }
        });
        agg.ingest_block(&block(5_000_000, vec![t]));

        assert_eq!(agg.interactions().get(Framework::Plutarch), 1);
        assert_eq!(agg.transactions().get(Framework::Plutarch), 1);
    }

    #[test]
    fn inline_output_script_is_fingerprinted() {
        let script = Script { language: ScriptLanguage::PlutusV2, cbor: "4e4d01".into() };
        let digest = ScriptDigest::of(&script).unwrap().into_hex();
        let validators = format!(r#"[["{digest}", "helios"]]"#);
        let tables = Tables {
            validators: KnownScripts::from_json_str(&validators).unwrap(),
            ..Tables::empty()
        };

        let mut agg = Aggregator::new(tables);
        let t = json!({
            "id": "tx-inline",
            "collaterals": [{}],
            "outputs": [{"address": key_address(), "script": {"language": "plutus:v2", "cbor": "4e4d01"}}]
        });
        agg.ingest_block(&block(5_000_000, vec![t]));

        assert_eq!(agg.interactions().get(Framework::Helios), 1);
        assert_eq!(agg.transactions().get(Framework::Helios), 1);
    }

    #[test]
    fn native_table_feeds_native_counter() {
        let mut agg = Aggregator::new(tables());
        let t = json!({
            "id": "tx-native",
            "collaterals": [{}],
            "mint": { "ee55": {} }
        });
        agg.ingest_block(&block(5_000_000, vec![t]));

        assert_eq!(agg.interactions().get(Framework::Native), 1);
        assert_eq!(agg.transactions().get(Framework::Native), 1);
        assert_eq!(agg.unsure(), 0);
    }

    #[test]
    fn timeline_snapshots_once_per_epoch_crossing() {
        use crate::epoch::{EPOCH_LENGTH, FIRST_SHELLEY_SLOT};

        let mut agg = Aggregator::new(tables());
        let tx_template = || {
            json!({
                "id": "t",
                "collaterals": [{}],
                "scripts": { AIKEN_DIGEST: {"language": "plutus:v2", "cbor": "00"} }
            })
        };

        let epoch0 = FIRST_SHELLEY_SLOT;
        let epoch1 = FIRST_SHELLEY_SLOT + EPOCH_LENGTH;
        let epoch2 = FIRST_SHELLEY_SLOT + 2 * EPOCH_LENGTH;

        agg.ingest_block(&block(epoch0, vec![tx_template()]));
        agg.ingest_block(&block(epoch0 + 10, vec![tx_template()]));
        agg.ingest_block(&block(epoch1, vec![tx_template()]));
        agg.ingest_block(&block(epoch2, vec![]));
        agg.finish();

        // Crossings into epoch 209 and 210, plus the tail flush.
        assert_eq!(agg.timeline().epochs(), &[208, 209, 210]);
        // Incremental, not cumulative: 2 in epoch 208, 1 in 209, 0 after.
        assert_eq!(agg.timeline().series(Framework::Aiken), vec![2, 1, 0]);
    }

    #[test]
    fn unsure_counts_unmatched_transactions_exactly() {
        let mut agg = Aggregator::new(tables());

        // 20 transactions with unresolvable witnesses, one that matches
        // two frameworks at once. Only the former are unsure.
        for i in 0..20u64 {
            let t = json!({
                "id": format!("tx-{i}"),
                "collaterals": [{}],
                "scripts": { format!("unknown-{}", i % 3): {"language": "plutus:v1", "cbor": "00"} }
            });
            agg.ingest_block(&block(5_000_000 + i, vec![t]));
        }
        let t = json!({
            "id": "tx-two",
            "collaterals": [{}],
            "scripts": {
                AIKEN_DIGEST: {"language": "plutus:v2", "cbor": "00"},
                PLUTARCH_CRED: {"language": "plutus:v2", "cbor": "01"}
            }
        });
        agg.ingest_block(&block(5_000_100, vec![t]));

        assert_eq!(agg.transactions().total(), 21);
        assert_eq!(agg.unsure(), 20);
    }
}
