//! Vote transaction decoding

use base64::{engine::general_purpose::STANDARD, Engine};
use log::{debug, warn};

use crate::consts::CAST_VOTE_SELECTOR;
use crate::error::DecodeError;
use crate::indexer::IndexerTransaction;
use crate::types::VoterRecord;

const LENGTH_PREFIX_BYTES: usize = 2;
const UINT64_BYTES: usize = 8;

/// True when the call's first argument is the cast vote selector.
pub fn is_vote_call(txn: &IndexerTransaction) -> bool {
    txn.application_args()
        .first()
        .is_some_and(|selector| selector == CAST_VOTE_SELECTOR)
}

/// Decode an ARC-4 `uint64[]`: a big-endian u16 element count followed by
/// that many big-endian u64 values.
pub fn decode_uint64_array(bytes: &[u8]) -> Result<Vec<u64>, DecodeError> {
    if bytes.len() < LENGTH_PREFIX_BYTES {
        return Err(DecodeError::TooShort(bytes.len()));
    }
    let declared = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    let body = &bytes[LENGTH_PREFIX_BYTES..];
    let expected = declared * UINT64_BYTES;
    if body.len() != expected {
        return Err(DecodeError::LengthMismatch {
            declared,
            expected,
            actual: body.len(),
        });
    }

    Ok(body
        .chunks_exact(UINT64_BYTES)
        .map(|chunk| {
            let mut word = [0u8; UINT64_BYTES];
            word.copy_from_slice(chunk);
            u64::from_be_bytes(word)
        })
        .collect())
}

/// Inverse of [`decode_uint64_array`]. Used to build vote arguments.
pub fn encode_uint64_array(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(LENGTH_PREFIX_BYTES + values.len() * UINT64_BYTES);
    out.extend_from_slice(&(values.len() as u16).to_be_bytes());
    for value in values {
        out.extend_from_slice(&value.to_be_bytes());
    }
    out
}

/// Base64 form of [`encode_uint64_array`], as it appears in application args.
pub fn encode_vote_weights(values: &[u64]) -> String {
    STANDARD.encode(encode_uint64_array(values))
}

/// Decode one vote call into a voter record. The weights are the
/// second-to-last application argument.
pub fn decode_vote(
    txn: &IndexerTransaction,
    total_voting_weight: u64,
) -> Result<VoterRecord, DecodeError> {
    let args = txn.application_args();
    if args.len() < 2 {
        return Err(DecodeError::MissingVoteArgument(args.len()));
    }
    let encoded = &args[args.len() - 2];
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    let vote_weights = decode_uint64_array(&bytes)?;

    let voter_weight = vote_weights
        .iter()
        .try_fold(0u64, |sum, w| sum.checked_add(*w))
        .ok_or(DecodeError::WeightOverflow)?;
    let relative_weight = if total_voting_weight > 0 {
        voter_weight as f64 / total_voting_weight as f64
    } else {
        0.0
    };
    let num_votes = vote_weights.iter().filter(|w| **w > 0).count();

    Ok(VoterRecord {
        address: txn.sender.clone(),
        vote_weights,
        voter_weight,
        relative_weight,
        round: txn.confirmed_round,
        round_time: txn.round_time,
        num_votes,
    })
}

/// Result of decoding a batch of application calls.
#[derive(Debug, Default)]
pub struct DecodedVotes {
    pub voters: Vec<VoterRecord>,
    pub vote_calls: usize,
    pub failures: usize,
}

/// Decode every vote call in order. Other calls are ignored and a failed
/// decode only drops its own transaction.
pub fn decode_votes(transactions: &[IndexerTransaction], total_voting_weight: u64) -> DecodedVotes {
    let mut decoded = DecodedVotes::default();

    for txn in transactions.iter().filter(|t| is_vote_call(t)) {
        decoded.vote_calls += 1;
        match decode_vote(txn, total_voting_weight) {
            Ok(voter) => decoded.voters.push(voter),
            Err(e) => {
                decoded.failures += 1;
                warn!(
                    "Skipping vote transaction {} from {}: {}",
                    txn.id, txn.sender, e
                );
            }
        }
    }

    debug!(
        "Decoded {} of {} vote calls out of {} transactions",
        decoded.voters.len(),
        decoded.vote_calls,
        transactions.len()
    );
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::ApplicationTransaction;
    use proptest::prelude::*;

    fn vote_txn(sender: &str, round: u64, args: Vec<String>) -> IndexerTransaction {
        IndexerTransaction {
            id: format!("{}-{}", sender, round),
            sender: sender.to_string(),
            confirmed_round: round,
            round_time: round * 4,
            intra_round_offset: 0,
            application_transaction: Some(ApplicationTransaction {
                application_id: 1,
                application_args: args,
            }),
        }
    }

    fn cast(weights: &[u64]) -> Vec<String> {
        vec![
            CAST_VOTE_SELECTOR.to_string(),
            encode_vote_weights(weights),
            "AA==".to_string(),
        ]
    }

    #[test]
    fn test_decode_known_bytes() {
        // [3, 0, 258]
        let bytes = [
            0, 3, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2,
        ];
        assert_eq!(decode_uint64_array(&bytes).unwrap(), vec![3, 0, 258]);
        assert_eq!(decode_uint64_array(&[0, 0]).unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn test_decode_rejects_bad_lengths() {
        assert_eq!(decode_uint64_array(&[1]), Err(DecodeError::TooShort(1)));
        assert_eq!(
            decode_uint64_array(&[0, 2, 0, 0, 0, 0, 0, 0, 0, 1]),
            Err(DecodeError::LengthMismatch {
                declared: 2,
                expected: 16,
                actual: 8
            })
        );
    }

    #[test]
    fn test_decode_vote_sums_weights() {
        let txn = vote_txn("A", 10, cast(&[100, 0, 250]));
        let voter = decode_vote(&txn, 1000).unwrap();
        assert_eq!(voter.address, "A");
        assert_eq!(voter.vote_weights, vec![100, 0, 250]);
        assert_eq!(voter.voter_weight, 350);
        assert_eq!(voter.num_votes, 2);
        assert_eq!(voter.round, 10);
        assert_eq!(voter.round_time, 40);
        assert!((voter.relative_weight - 0.35).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decode_vote_overflow() {
        let txn = vote_txn("A", 1, cast(&[u64::MAX, 1]));
        assert_eq!(decode_vote(&txn, 1), Err(DecodeError::WeightOverflow));
    }

    #[test]
    fn test_decode_votes_isolates_failures() {
        let transactions = vec![
            vote_txn("A", 1, cast(&[1, 2])),
            vote_txn("B", 2, vec![CAST_VOTE_SELECTOR.to_string()]),
            vote_txn("C", 3, vec!["AAAAAA==".to_string(), "AAE=".to_string(), "x".to_string()]),
            vote_txn(
                "D",
                4,
                vec![CAST_VOTE_SELECTOR.to_string(), "not base64!".to_string(), "x".to_string()],
            ),
            vote_txn("E", 5, cast(&[0, 7])),
        ];

        let decoded = decode_votes(&transactions, 100);
        assert_eq!(decoded.vote_calls, 4);
        assert_eq!(decoded.failures, 2);
        let senders: Vec<&str> = decoded.voters.iter().map(|v| v.address.as_str()).collect();
        assert_eq!(senders, vec!["A", "E"]);
    }

    proptest! {
        #[test]
        fn prop_voter_weight_is_exact_sum(weights in proptest::collection::vec(0u64..1u64 << 48, 0..60)) {
            let txn = vote_txn("P", 1, cast(&weights));
            let voter = decode_vote(&txn, 1).unwrap();
            let expected: u128 = weights.iter().map(|w| *w as u128).sum();
            prop_assert_eq!(voter.voter_weight as u128, expected);
            prop_assert_eq!(voter.vote_weights, weights);
        }
    }
}
