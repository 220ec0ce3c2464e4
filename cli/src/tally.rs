//! Per-proposal vote tallying and pass detection

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::error::DataConsistencyError;
use crate::session::ProposalSpec;
use crate::types::{ProposalResult, VoteRecord};

/// Tally outcome keyed by proposal index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionTally {
    pub results: BTreeMap<usize, ProposalResult>,
    pub rejected: Vec<DataConsistencyError>,
    /// Positions in the tallied sequence that were not counted, ascending.
    pub skipped: Vec<usize>,
}

impl SessionTally {
    pub fn get(&self, proposal_index: usize) -> Option<&ProposalResult> {
        self.results.get(&proposal_index)
    }

    pub fn is_counted(&self, position: usize) -> bool {
        self.skipped.binary_search(&position).is_err()
    }

    /// Results in proposal order.
    pub fn into_results(self) -> Vec<ProposalResult> {
        self.results.into_values().collect()
    }
}

impl ProposalResult {
    /// Fold one vote into the tally. The proposal passes the first time the
    /// total strictly exceeds its threshold, and the passing round is frozen
    /// from then on.
    fn apply(&mut self, record: &VoteRecord) -> Result<(), DataConsistencyError> {
        self.total_votes = self.total_votes.checked_add(record.votes).ok_or_else(|| {
            DataConsistencyError::TotalOverflow {
                proposal_id: self.proposal_id.clone(),
            }
        })?;
        if record.votes > 0 {
            self.num_voters += 1;
        }

        if let Some(threshold) = self.threshold {
            if self.total_votes > threshold && self.passed_round.is_none() {
                self.passed = true;
                self.passed_round = Some(record.round);
                self.passed_time = Some(record.round_time);
                debug!(
                    "Proposal {} passed at round {} with {} votes",
                    self.proposal_id, record.round, self.total_votes
                );
            }
        }
        Ok(())
    }
}

/// Tally `records` in the order given. The order must be chronological for
/// the passing round to mean anything. Records that cannot be counted are
/// left out of every total and listed in `skipped`.
pub fn tally(proposals: &[ProposalSpec], records: &[VoteRecord]) -> SessionTally {
    let initial = SessionTally {
        results: proposals
            .iter()
            .map(|p| (p.proposal_index, ProposalResult::new(p)))
            .collect(),
        rejected: Vec::new(),
        skipped: Vec::new(),
    };

    records.iter().enumerate().fold(initial, |mut tally, (position, record)| {
        let outcome = match tally.results.get_mut(&record.proposal_index) {
            Some(result) => result.apply(record),
            None => Err(DataConsistencyError::UnknownProposal {
                address: record.address.clone(),
                index: record.proposal_index,
            }),
        };
        if let Err(e) = outcome {
            warn!("Skipping vote in tally: {}", e);
            tally.rejected.push(e);
            tally.skipped.push(position);
        }
        tally
    })
}
