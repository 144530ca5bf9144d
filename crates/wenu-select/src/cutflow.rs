//! Event counts per selection outcome.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::selector::{Rejection, Selection};

/// Running tally of selection outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CutFlow {
    /// Events seen
    pub processed: u64,
    /// Events yielding a candidate
    pub accepted: u64,
    /// Rejected events keyed by the first failing gate
    pub rejected: BTreeMap<Rejection, u64>,
}

impl CutFlow {
    /// Empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one selection outcome.
    pub fn record(&mut self, selection: &Selection) {
        self.processed += 1;
        match selection {
            Selection::Accepted(_) => self.accepted += 1,
            Selection::Rejected(reason) => *self.rejected.entry(*reason).or_insert(0) += 1,
        }
    }

    /// Events rejected for `reason`.
    pub fn rejected_by(&self, reason: Rejection) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    /// Events still alive after each gate, in gate order.
    ///
    /// Entry `i` counts events that passed gates `0..=i`.
    pub fn surviving(&self) -> Vec<(Rejection, u64)> {
        let mut alive = self.processed;
        Rejection::ALL
            .iter()
            .map(|&r| {
                alive -= self.rejected_by(r);
                (r, alive)
            })
            .collect()
    }

    /// Fold another tally into this one.
    pub fn merge(&mut self, other: &CutFlow) {
        self.processed += other.processed;
        self.accepted += other.accepted;
        for (reason, n) in &other.rejected {
            *self.rejected.entry(*reason).or_insert(0) += n;
        }
    }

    /// Emit the tally through the `log` facade.
    pub fn log_summary(&self) {
        log::info!("wenu filter: {} events processed, {} accepted", self.processed, self.accepted);
        for (reason, alive) in self.surviving() {
            let n = self.rejected_by(reason);
            if n > 0 {
                log::info!("  {reason:<26} rejected {n:>8}  surviving {alive:>8}");
            }
        }
    }
}
