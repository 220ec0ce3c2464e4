//! Labelling each vote with its effect on the outcome

use log::warn;

use crate::error::DataConsistencyError;
use crate::tally::SessionTally;
use crate::types::{fraction_of, ProposalResult, VoteEffect, VoteRecord};

/// Effect of a vote cast in `round` on the proposal `result`.
pub fn effect_of(result: &ProposalResult, round: u64) -> VoteEffect {
    if result.control {
        return VoteEffect::Irrelevant;
    }
    match result.passed_round {
        Some(passed_round) if round <= passed_round => VoteEffect::ContributedToPassing,
        Some(_) => VoteEffect::NoEffectAlreadyPassed,
        None => VoteEffect::ContributedNoPass,
    }
}

/// Annotate every record with its effect and threshold fraction. `records`
/// must be the sequence `tally` was built from: records the tally skipped
/// are dropped, so every returned vote is part of its proposal's total.
pub fn classify(records: Vec<VoteRecord>, tally: &SessionTally) -> Vec<VoteRecord> {
    records
        .into_iter()
        .enumerate()
        .filter(|(position, _)| tally.is_counted(*position))
        .filter_map(|(_, mut record)| {
            let Some(result) = tally.get(record.proposal_index) else {
                warn!(
                    "Dropping vote during classification: {}",
                    DataConsistencyError::UnknownProposal {
                        address: record.address.clone(),
                        index: record.proposal_index,
                    }
                );
                return None;
            };
            record.effect = Some(effect_of(result, record.round));
            record.threshold_fraction = fraction_of(record.votes, result.threshold);
            Some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ProposalSpec;
    use crate::tally::tally;

    fn spec(index: usize, id: &str, threshold: Option<u64>, control: bool) -> ProposalSpec {
        ProposalSpec {
            proposal_id: id.to_string(),
            proposal_index: index,
            title: String::new(),
            category: String::new(),
            ask: 0,
            threshold,
            control,
            pull_request: None,
        }
    }

    fn vote(index: usize, id: &str, votes: u64, round: u64) -> VoteRecord {
        VoteRecord {
            address: format!("V{}", round),
            proposal_id: id.to_string(),
            proposal_index: index,
            votes,
            voter_weight: votes,
            round,
            round_time: round,
            effect: None,
            threshold_fraction: None,
        }
    }

    #[test]
    fn test_passing_round_boundary() {
        let mut result = ProposalResult::new(&spec(0, "10", Some(100), false));
        result.passed = true;
        result.passed_round = Some(5);

        assert_eq!(effect_of(&result, 4), VoteEffect::ContributedToPassing);
        assert_eq!(effect_of(&result, 5), VoteEffect::ContributedToPassing);
        assert_eq!(effect_of(&result, 6), VoteEffect::NoEffectAlreadyPassed);
    }

    #[test]
    fn test_classify_full_session() {
        let proposals = vec![
            spec(0, "10", Some(100), false),
            spec(1, "11", Some(1000), false),
            spec(2, "01", Some(1), true),
        ];
        let records = vec![
            vote(0, "10", 60, 1),
            vote(1, "11", 60, 1),
            vote(0, "10", 60, 5),
            vote(2, "01", 60, 5),
            vote(0, "10", 10, 5),
            vote(0, "10", 10, 6),
        ];

        let tally = tally(&proposals, &records);
        assert_eq!(tally.get(0).unwrap().passed_round, Some(5));
        assert!(tally.get(2).unwrap().passed);

        let effects: Vec<VoteEffect> = classify(records, &tally)
            .iter()
            .map(|r| r.effect.unwrap())
            .collect();
        assert_eq!(
            effects,
            vec![
                VoteEffect::ContributedToPassing,
                VoteEffect::ContributedNoPass,
                VoteEffect::ContributedToPassing,
                VoteEffect::Irrelevant,
                VoteEffect::ContributedToPassing,
                VoteEffect::NoEffectAlreadyPassed,
            ]
        );
    }

    #[test]
    fn test_threshold_fraction() {
        let proposals = vec![spec(0, "10", Some(100), false), spec(1, "11", None, false)];
        let records = vec![vote(0, "10", 40, 1), vote(1, "11", 40, 1)];

        let tally = tally(&proposals, &records);
        let classified = classify(records, &tally);
        assert_eq!(classified[0].threshold_fraction, Some(0.4));
        assert_eq!(classified[1].threshold_fraction, None);
        assert_eq!(classified[1].effect, Some(VoteEffect::ContributedNoPass));
    }

    #[test]
    fn test_unknown_proposal_is_dropped() {
        let proposals = vec![spec(0, "10", Some(100), false)];
        let records = vec![vote(0, "10", 1, 1), vote(3, "99", 1, 1)];

        let tally = tally(&proposals, &records);
        let classified = classify(records, &tally);
        assert_eq!(classified.len(), 1);
    }

    #[test]
    fn test_overflowed_vote_is_not_classified() {
        let proposals = vec![spec(0, "10", Some(100), false)];
        let records = vec![vote(0, "10", u64::MAX, 1), vote(0, "10", 5, 2)];

        let tally = tally(&proposals, &records);
        assert_eq!(tally.skipped, vec![1]);

        let classified = classify(records, &tally);
        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].votes, u64::MAX);
        assert_eq!(classified[0].effect, Some(VoteEffect::ContributedToPassing));
    }
}
