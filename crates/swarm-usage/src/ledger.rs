//! Usage ledger — per-call records plus running totals.
//!
//! One ledger is created by the application and shared (`Arc<UsageLedger>`)
//! with every dispatcher and meter. Records and totals sit behind a single
//! mutex so each `append` is atomic with respect to the totals.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────

/// Statistics of one metered call. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Rendered caller chain (`a->b->c`), empty when unattributed.
    pub caller_chain: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Estimated cost (USD).
    pub cost: f64,
    /// `false` for calls that failed after exhausting their attempts.
    pub success: bool,
}

impl UsageRecord {
    /// Wall-clock time spent on the call, in milliseconds.
    pub fn latency_ms(&self) -> i64 {
        (self.end_time - self.start_time).num_milliseconds()
    }
}

/// Running totals across all records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct UsageTotals {
    pub cost: f64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Aggregate for one model or one caller chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UsageBreakdown {
    pub requests: u64,
    pub failed_requests: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost: f64,
}

impl UsageBreakdown {
    fn add(&mut self, record: &UsageRecord) {
        self.requests += 1;
        if !record.success {
            self.failed_requests += 1;
        }
        self.prompt_tokens += record.prompt_tokens;
        self.completion_tokens += record.completion_tokens;
        self.cost += record.cost;
    }
}

/// Snapshot of the ledger grouped by model and by caller chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub totals: UsageTotals,
    pub requests: u64,
    pub by_model: BTreeMap<String, UsageBreakdown>,
    pub by_caller: BTreeMap<String, UsageBreakdown>,
}

// ─────────────────────────────────────────────
// UsageLedger
// ─────────────────────────────────────────────

#[derive(Debug, Default)]
struct LedgerState {
    records: Vec<UsageRecord>,
    totals: UsageTotals,
}

/// Process-lifetime accumulator of usage records and totals.
#[derive(Debug, Default)]
pub struct UsageLedger {
    state: Mutex<LedgerState>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // A panic mid-append cannot leave a half-written record, so a poisoned
        // lock is still consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a record and fold it into the totals.
    pub fn append(&self, record: UsageRecord) {
        let mut state = self.lock();
        state.totals.cost += record.cost;
        state.totals.prompt_tokens += record.prompt_tokens;
        state.totals.completion_tokens += record.completion_tokens;
        state.records.push(record);
    }

    /// Current running totals.
    pub fn totals(&self) -> UsageTotals {
        self.lock().totals
    }

    /// Zero the totals and clear all records.
    ///
    /// Meant for use between measurement windows; quiesce in-flight calls first.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.records.clear();
        state.totals = UsageTotals::default();
    }

    /// Copy of all records, oldest first.
    pub fn records(&self) -> Vec<UsageRecord> {
        self.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Totals plus per-model and per-caller breakdowns.
    pub fn summary(&self) -> UsageSummary {
        let state = self.lock();
        let mut summary = UsageSummary {
            totals: state.totals,
            requests: state.records.len() as u64,
            ..Default::default()
        };

        for record in &state.records {
            summary
                .by_model
                .entry(record.model.clone())
                .or_default()
                .add(record);
            summary
                .by_caller
                .entry(record.caller_chain.clone())
                .or_default()
                .add(record);
        }

        summary
    }
}
