//! Progress and result rendering.
//!
//! Rendering is pure (string in, string out) so it can be asserted on;
//! the reporter only decides *when* to render and hands the text to
//! `tracing`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::aggregator::Aggregator;
use crate::error::CensusError;
use crate::framework::Framework;

/// Emits a progress line every `INTERVAL` classified transactions.
#[derive(Debug)]
pub struct ProgressReporter {
    since_slot: u64,
    boundary_slot: u64,
    last_reported: u64,
}

impl ProgressReporter {
    const INTERVAL: u64 = 5_000;

    pub fn new(since_slot: u64, boundary_slot: u64) -> Self {
        Self { since_slot, boundary_slot, last_reported: 0 }
    }

    /// Report when another `INTERVAL` transactions have been classified
    /// since the last report.
    pub fn maybe_report(&mut self, aggregator: &Aggregator, current_slot: u64) {
        let total = aggregator.transactions().total();
        if total < self.last_reported + Self::INTERVAL {
            return;
        }
        self.last_reported = total;
        tracing::info!(
            progress = %format!("{:.2}%", self.percent(current_slot)),
            slot = current_slot,
            transactions = total,
            unknowns = aggregator.unknowns().len(),
            "census progress",
        );
        tracing::debug!(totals = %render_summary(aggregator), "running totals");
    }

    /// Slot-based completion estimate, clamped to `[0, 100]`.
    fn percent(&self, current_slot: u64) -> f64 {
        let span = self.boundary_slot.saturating_sub(self.since_slot);
        if span == 0 {
            return 100.0;
        }
        let done = current_slot.saturating_sub(self.since_slot).min(span);
        100.0 * done as f64 / span as f64
    }
}

/// Render the final per-framework summary table.
///
/// Rows are sorted by transaction count, descending. Native scripts are the
/// output of no framework, so they appear neither as a row nor in the total
/// the percentages relate to.
pub fn render_summary(aggregator: &Aggregator) -> String {
    let transactions = aggregator.transactions();

    let mut rows: Vec<(Framework, u64)> = Framework::ALL
        .iter()
        .filter(|f| **f != Framework::Native)
        .map(|f| (*f, transactions.get(*f)))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));

    let total = transactions
        .total()
        .saturating_sub(transactions.get(Framework::Native));

    let mut out = String::new();
    for (framework, count) in rows {
        let pct = if total == 0 { 0.0 } else { 100.0 * count as f64 / total as f64 };
        out.push_str(&format!("{:>10}  {} ({:.2}%)\n", count, framework.title(), pct));
    }
    out.push_str(&format!("{:>10}  Unsure\n", aggregator.unsure()));
    out.push_str("==========\n");
    out.push_str(&format!("{:>10}  Total\n", total));
    out
}

/// Render the per-epoch adoption matrix as CSV-ish lines:
///
/// ```text
/// epoch, , 405, 406, …
/// Aiken, <logo-url>, 12, 34, …
/// ```
///
/// Native scripts are omitted; the matrix tracks framework adoption.
pub fn render_timeline(aggregator: &Aggregator) -> String {
    let timeline = aggregator.timeline();

    let mut out = String::from("epoch, ");
    for epoch in timeline.epochs() {
        out.push_str(&format!(", {epoch}"));
    }
    out.push('\n');

    for framework in Framework::ALL {
        let Some(logo) = framework.logo_url() else { continue };
        out.push_str(&format!("{}, {}", framework.title(), logo));
        for count in timeline.series(framework) {
            out.push_str(&format!(", {count}"));
        }
        out.push('\n');
    }
    out
}

/// File name for the persisted unknown set of one run window.
pub fn unknowns_file_name(since_slot: u64, until_slot: u64) -> String {
    format!("unknowns-{since_slot}:{until_slot}.json")
}

/// Persist the unknown digests as a JSON array next to the tables, so a
/// later table update can start from them.
pub fn write_unknowns(
    dir: &Path,
    since_slot: u64,
    until_slot: u64,
    unknowns: &BTreeSet<String>,
) -> Result<PathBuf, CensusError> {
    let path = dir.join(unknowns_file_name(since_slot, until_slot));
    let entries: Vec<&String> = unknowns.iter().collect();
    std::fs::write(&path, serde_json::to_string_pretty(&entries)?)?;
    Ok(path)
}
