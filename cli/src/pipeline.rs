//! The vote aggregation pipeline: sort → decode → expand → tally → classify

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::classify::classify;
use crate::decode::decode_votes;
use crate::dump::SessionDump;
use crate::error::SourceError;
use crate::expand::expand_voters;
use crate::indexer::{IndexerClient, IndexerTransaction};
use crate::participation::{participation, Participation};
use crate::session::{proposal_specs, GovernorsData, SessionConfig, SessionMetadata};
use crate::tally::tally;
use crate::types::{ProposalResult, VoteRecord, VoterRecord};

/// Counters describing what one pipeline run saw and skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub transactions: usize,
    pub vote_transactions: usize,
    pub decode_failures: usize,
    pub inconsistent_records: usize,
    /// Whether the indexer order had to be sorted by round.
    pub reordered: bool,
}

/// Everything a presentation layer needs for one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingData {
    pub session: SessionConfig,
    pub metadata: SessionMetadata,
    pub governors: Option<GovernorsData>,
    /// In proposal order.
    pub results: Vec<ProposalResult>,
    pub voters: Vec<VoterRecord>,
    pub votes: Vec<VoteRecord>,
    pub participation: Participation,
    pub stats: PipelineStats,
}

impl VotingData {
    pub fn voter(&self, address: &str) -> Option<&VoterRecord> {
        self.voters.iter().find(|v| v.address == address)
    }

    pub fn votes_by(&self, address: &str) -> Vec<&VoteRecord> {
        self.votes.iter().filter(|v| v.address == address).collect()
    }
}

/// Stable sort by (round, offset within round). Returns true if the order changed.
pub fn sort_chronologically(transactions: &mut [IndexerTransaction]) -> bool {
    let sorted = transactions.windows(2).all(|w| {
        (w[0].confirmed_round, w[0].intra_round_offset)
            <= (w[1].confirmed_round, w[1].intra_round_offset)
    });
    if sorted {
        return false;
    }
    transactions.sort_by_key(|t| (t.confirmed_round, t.intra_round_offset));
    true
}

/// Run the pipeline over already fetched inputs.
pub fn compute(dump: SessionDump) -> VotingData {
    let SessionDump {
        session,
        mut transactions,
        metadata,
        governors,
    } = dump;

    let reordered = sort_chronologically(&mut transactions);
    if reordered {
        warn!("Indexer returned transactions out of round order, sorted before tallying");
    }

    let decoded = decode_votes(&transactions, session.total_voting_weight);
    let expansion = expand_voters(&decoded.voters, &session.proposal_ids);
    let proposals = proposal_specs(&session, &metadata);
    let session_tally = tally(&proposals, &expansion.records);
    let votes = classify(expansion.records, &session_tally);

    let stats = PipelineStats {
        transactions: transactions.len(),
        vote_transactions: decoded.vote_calls,
        decode_failures: decoded.failures,
        inconsistent_records: expansion.rejected.len() + session_tally.rejected.len(),
        reordered,
    };
    let results = session_tally.into_results();
    let participation = participation(
        &decoded.voters,
        &results,
        governors.as_ref(),
        session.total_voting_weight,
    );

    info!(
        "Session {}: {} voters, {} votes, {}/{} proposals passed",
        session.session,
        decoded.voters.len(),
        votes.len(),
        participation.proposals_passed,
        participation.proposals_total
    );

    VotingData {
        session,
        metadata,
        governors,
        results,
        voters: decoded.voters,
        votes,
        participation,
        stats,
    }
}

/// Fetch a session and run the pipeline. Any fetch failure fails the whole run.
pub async fn load(client: &IndexerClient, session: &SessionConfig) -> Result<VotingData, SourceError> {
    let dump = client.fetch_session(session).await?;
    Ok(compute(dump))
}
