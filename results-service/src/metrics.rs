use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use cli::PipelineStats;
use once_cell::sync::OnceCell;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RefreshOutcome {
    Success,
    Unauthorized,
    SourceFailure,
}

impl RefreshOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Success => "success",
            RefreshOutcome::Unauthorized => "unauthorized",
            RefreshOutcome::SourceFailure => "source_failure",
        }
    }
}

#[derive(Default)]
pub struct Metrics {
    refresh_total: HashMap<RefreshOutcome, u64>,
    voters_not_found_total: u64,
    last_stats: Option<PipelineStats>,
}

static METRICS: OnceCell<Mutex<Metrics>> = OnceCell::new();

fn get() -> MutexGuard<'static, Metrics> {
    METRICS
        .get_or_init(|| Mutex::new(Metrics::default()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn record_refresh_outcome(outcome: RefreshOutcome) {
    *get().refresh_total.entry(outcome).or_insert(0) += 1;
}

pub fn record_voter_not_found() {
    get().voters_not_found_total += 1;
}

pub fn record_stats(stats: &PipelineStats) {
    get().last_stats = Some(stats.clone());
}

pub fn snapshot_as_json() -> serde_json::Value {
    use serde_json::json;
    let m = get();

    let mut refreshes: Vec<(&'static str, u64)> = m
        .refresh_total
        .iter()
        .map(|(outcome, count)| (outcome.as_str(), *count))
        .collect();
    refreshes.sort();

    let refreshes: Vec<serde_json::Value> = refreshes
        .into_iter()
        .map(|(outcome, count)| json!({ "outcome": outcome, "count": count }))
        .collect();

    json!({
        "refresh_total": refreshes,
        "voters_not_found_total": m.voters_not_found_total,
        "last_stats": m.last_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(json: &serde_json::Value, outcome: &str) -> u64 {
        json["refresh_total"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["outcome"] == outcome)
            .and_then(|e| e["count"].as_u64())
            .unwrap_or(0)
    }

    #[test]
    fn test_refresh_outcomes_are_counted() {
        let before = snapshot_as_json();
        record_refresh_outcome(RefreshOutcome::SourceFailure);
        record_refresh_outcome(RefreshOutcome::SourceFailure);
        record_refresh_outcome(RefreshOutcome::Unauthorized);
        let after = snapshot_as_json();

        assert_eq!(
            count(&after, "source_failure") - count(&before, "source_failure"),
            2
        );
        assert_eq!(
            count(&after, "unauthorized") - count(&before, "unauthorized"),
            1
        );
    }

    #[test]
    fn test_last_stats() {
        record_stats(&PipelineStats {
            transactions: 9,
            vote_transactions: 4,
            ..Default::default()
        });
        let json = snapshot_as_json();
        assert_eq!(json["last_stats"]["transactions"], 9);
        assert_eq!(json["last_stats"]["voteTransactions"], 4);
    }
}
