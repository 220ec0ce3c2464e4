//! Flattening voter records into per-proposal vote records

use log::warn;

use crate::error::DataConsistencyError;
use crate::types::{VoteRecord, VoterRecord};

#[derive(Debug, Default)]
pub struct Expansion {
    pub records: Vec<VoteRecord>,
    pub rejected: Vec<DataConsistencyError>,
}

/// Emit one record per nonzero weight, keeping voter order and proposal
/// order within a voter. Weights beyond the proposal list are rejected.
pub fn expand_voters(voters: &[VoterRecord], proposal_ids: &[String]) -> Expansion {
    let mut expansion = Expansion::default();

    for voter in voters {
        for (index, votes) in voter.vote_weights.iter().enumerate() {
            if *votes == 0 {
                continue;
            }
            let Some(proposal_id) = proposal_ids.get(index) else {
                let err = DataConsistencyError::IndexOutOfRange {
                    address: voter.address.clone(),
                    index,
                    proposals: proposal_ids.len(),
                };
                warn!("Skipping vote record: {}", err);
                expansion.rejected.push(err);
                continue;
            };

            expansion.records.push(VoteRecord {
                address: voter.address.clone(),
                proposal_id: proposal_id.clone(),
                proposal_index: index,
                votes: *votes,
                voter_weight: voter.voter_weight,
                round: voter.round,
                round_time: voter.round_time,
                effect: None,
                threshold_fraction: None,
            });
        }
    }

    expansion
}
