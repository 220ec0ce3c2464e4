//! Turnout figures for a session

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::session::GovernorsData;
use crate::types::{ProposalResult, VoterRecord};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub voted_accounts: usize,
    /// Governors in the snapshot, when the snapshot is known.
    pub eligible_accounts: Option<usize>,
    pub account_fraction: Option<f64>,
    pub voted_weight: u64,
    pub total_weight: u64,
    pub weight_fraction: f64,
    /// Number of proposals supported → number of voters.
    pub support_histogram: BTreeMap<usize, usize>,
    /// Passed proposals, control proposal excluded.
    pub proposals_passed: usize,
    pub proposals_total: usize,
    /// Sum of the asks of the passed proposals.
    pub ask_passed: u64,
}

pub fn participation(
    voters: &[VoterRecord],
    results: &[ProposalResult],
    governors: Option<&GovernorsData>,
    total_weight: u64,
) -> Participation {
    let voted_accounts = voters.len();
    let eligible_accounts = governors.map(|g| g.snapshot.len());
    let account_fraction = eligible_accounts
        .filter(|n| *n > 0)
        .map(|n| voted_accounts as f64 / n as f64);

    let voted_weight = voters
        .iter()
        .fold(0u64, |sum, v| sum.saturating_add(v.voter_weight));
    let weight_fraction = if total_weight > 0 {
        voted_weight as f64 / total_weight as f64
    } else {
        0.0
    };

    let support_histogram = voters
        .iter()
        .map(|v| v.num_votes)
        .counts()
        .into_iter()
        .collect();

    let real: Vec<&ProposalResult> = results.iter().filter(|r| !r.control).collect();
    let passed: Vec<&ProposalResult> = real.iter().copied().filter(|r| r.passed).collect();

    Participation {
        voted_accounts,
        eligible_accounts,
        account_fraction,
        voted_weight,
        total_weight,
        weight_fraction,
        support_histogram,
        proposals_passed: passed.len(),
        proposals_total: real.len(),
        ask_passed: passed.iter().fold(0u64, |sum, r| sum.saturating_add(r.ask)),
    }
}
