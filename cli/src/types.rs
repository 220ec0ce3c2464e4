use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_PROPOSALS_URL;
use crate::session::{proposal_text_urls, ProposalSpec};

/// One decoded vote transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterRecord {
    pub address: String,
    /// One weight per proposal slot, in session proposal order.
    pub vote_weights: Vec<u64>,
    /// Exact sum of `vote_weights`.
    pub voter_weight: u64,
    /// `voter_weight` over the session's total voting weight.
    pub relative_weight: f64,
    pub round: u64,
    pub round_time: u64,
    /// Number of proposals that received a nonzero weight.
    pub num_votes: usize,
}

/// How a single vote relates to the outcome of its proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoteEffect {
    /// Cast on the control proposal.
    Irrelevant,
    /// Cast after the proposal had already passed.
    NoEffectAlreadyPassed,
    /// Cast at or before the round the proposal passed.
    ContributedToPassing,
    /// Cast on a proposal that never passed.
    ContributedNoPass,
}

impl VoteEffect {
    pub const ALL: [VoteEffect; 4] = [
        VoteEffect::Irrelevant,
        VoteEffect::NoEffectAlreadyPassed,
        VoteEffect::ContributedToPassing,
        VoteEffect::ContributedNoPass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteEffect::Irrelevant => "irrelevant",
            VoteEffect::NoEffectAlreadyPassed => "no-effect-already-passed",
            VoteEffect::ContributedToPassing => "contributed-to-passing",
            VoteEffect::ContributedNoPass => "contributed-no-pass",
        }
    }
}

impl fmt::Display for VoteEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The weight one voter put on one proposal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub address: String,
    pub proposal_id: String,
    pub proposal_index: usize,
    pub votes: u64,
    pub voter_weight: u64,
    pub round: u64,
    pub round_time: u64,
    /// Set by classification.
    pub effect: Option<VoteEffect>,
    /// `votes` over the proposal threshold, set by classification.
    pub threshold_fraction: Option<f64>,
}

/// Running tally of one proposal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResult {
    pub proposal_id: String,
    pub proposal_index: usize,
    pub title: String,
    pub category: String,
    pub ask: u64,
    pub threshold: Option<u64>,
    pub control: bool,
    pub total_votes: u64,
    pub num_voters: u64,
    pub passed: bool,
    pub passed_round: Option<u64>,
    pub passed_time: Option<u64>,
    pub pull_request: Option<u64>,
    /// Published markdown text of the proposal.
    pub proposal_url: Option<String>,
}

impl ProposalResult {
    pub fn new(spec: &ProposalSpec) -> Self {
        ProposalResult {
            proposal_id: spec.proposal_id.clone(),
            proposal_index: spec.proposal_index,
            title: spec.title.clone(),
            category: spec.category.clone(),
            ask: spec.ask,
            threshold: spec.threshold,
            control: spec.control,
            total_votes: 0,
            num_voters: 0,
            passed: false,
            passed_round: None,
            passed_time: None,
            pull_request: spec.pull_request,
            proposal_url: spec
                .pull_request
                .map(|pr| proposal_text_urls(DEFAULT_PROPOSALS_URL, pr)[0].clone()),
        }
    }

    /// Fraction of the threshold reached, if the proposal has one.
    pub fn threshold_fraction(&self) -> Option<f64> {
        fraction_of(self.total_votes, self.threshold)
    }
}

pub(crate) fn fraction_of(value: u64, threshold: Option<u64>) -> Option<f64> {
    match threshold {
        Some(t) if t > 0 => Some(value as f64 / t as f64),
        _ => None,
    }
}
