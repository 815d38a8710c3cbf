//! `chaincensus detect-aiken` — flag collected scripts that were built with
//! Aiken.
//!
//! Aiken's code generator leaves recognizable traces in the decompiled
//! UPLC: its error-handling prelude and the trace strings its `expect`
//! machinery emits. Given the `digest,cbor` CSV produced by `collect`, this
//! decodes each script and prints the digests whose pretty-printed program
//! carries one of those markers, as a JSON array ready to be merged into
//! `validators.json`.

use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{Context, Result};
use uplc::ast::{DeBruijn, Program};

/// Strings only Aiken-generated programs contain, whitespace stripped.
const AIKEN_MARKERS: [&str; 8] = [
    "delay[(error)(force(error))]",
    "List/Tuple/Constrcontainsmoreitemsthanexpected",
    "ExpectednoitemsforList",
    "ExpectednofieldsforConstr",
    "ExpectedonincorrectBooleanvariant",
    "ExpectedonincorrectConstrvariant",
    "Constrindexdidn'tmatchatypevariant",
    "(force(builtinmkCons))])(force(builtinheadList))])(force(builtintailList))",
];

pub fn run(scripts: &str) -> Result<()> {
    let file = File::open(scripts).with_context(|| format!("open scripts file '{scripts}'"))?;

    let mut digests = Vec::new();
    let mut scanned = 0u64;
    for line in BufReader::new(file).lines() {
        let line = line?;
        let Some((digest, cbor)) = line.split_once(',') else { continue };
        scanned += 1;
        if is_aiken(cbor) {
            digests.push(digest.to_string());
        }
    }

    println!("{}", serde_json::to_string_pretty(&digests)?);
    tracing::info!(scanned, aiken = digests.len(), "detection complete");
    Ok(())
}

/// Decode a script and look for Aiken markers in its printed form.
/// Scripts that fail to decode are simply not Aiken's.
fn is_aiken(cbor: &str) -> bool {
    let Ok(program) = Program::<DeBruijn>::from_hex(cbor, &mut Vec::new(), &mut Vec::new()) else {
        return false;
    };
    has_marker(&program.to_pretty())
}

fn has_marker(pretty: &str) -> bool {
    let condensed = pretty.replace(['\n', ' '], "");
    AIKEN_MARKERS.iter().any(|marker| condensed.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_matching_ignores_layout() {
        let pretty = "(program 1.0.0\n  (delay [ (error) (force (error)) ])\n)";
        assert!(has_marker(pretty));

        let trace = "(program 1.0.0 (lam x [x (con string \"Expected no items for List\")]))";
        assert!(has_marker(trace));
    }

    #[test]
    fn plain_programs_carry_no_marker() {
        let pretty = "(program 1.0.0 (lam x (lam y [ [ (builtin addInteger) x ] y ])))";
        assert!(!has_marker(pretty));
    }

    #[test]
    fn undecodable_scripts_are_not_aiken() {
        assert!(!is_aiken("not-hex"));
        assert!(!is_aiken(""));
    }
}
