//! CSV export of session records
//!
//! Header names are the camelCase field names, in struct field order.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::session::Governor;
use crate::types::{VoteRecord, VoterRecord};

/// Voter row without the weight vector, which does not fit a CSV cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterRow {
    pub address: String,
    pub voter_weight: u64,
    pub relative_weight: f64,
    pub round: u64,
    pub round_time: u64,
    pub num_votes: usize,
}

impl From<&VoterRecord> for VoterRow {
    fn from(v: &VoterRecord) -> Self {
        VoterRow {
            address: v.address.clone(),
            voter_weight: v.voter_weight,
            relative_weight: v.relative_weight,
            round: v.round,
            round_time: v.round_time,
            num_votes: v.num_votes,
        }
    }
}

/// Serialize `rows` as CSV into `writer`. Nothing is written for an empty slice.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(())
}

fn to_csv_string<T: Serialize>(rows: &[T]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(&mut buf, rows)?;
    Ok(String::from_utf8(buf)?)
}

pub fn votes_csv(votes: &[VoteRecord]) -> Result<String, ExportError> {
    to_csv_string(votes)
}

pub fn voters_csv(voters: &[VoterRecord]) -> Result<String, ExportError> {
    let rows: Vec<VoterRow> = voters.iter().map(VoterRow::from).collect();
    to_csv_string(&rows)
}

pub fn governors_csv(governors: &[Governor]) -> Result<String, ExportError> {
    to_csv_string(governors)
}
