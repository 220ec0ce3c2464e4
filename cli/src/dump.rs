use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::DumpError;
use crate::indexer::IndexerTransaction;
use crate::session::{GovernorsData, SessionConfig, SessionMetadata};

/// Largest decompressed dump `read` accepts, unless `XGOV_MAX_DUMP_MB` says otherwise.
pub const DEFAULT_MAX_DUMP_BYTES: u64 = 256 * 1024 * 1024;

pub fn max_dump_bytes() -> u64 {
    std::env::var("XGOV_MAX_DUMP_MB")
        .ok()
        .and_then(|mb| mb.parse::<u64>().ok())
        .map(|mb| mb.saturating_mul(1024 * 1024))
        .unwrap_or(DEFAULT_MAX_DUMP_BYTES)
}

/// Raw inputs of one session, as fetched. Replaying a dump through the
/// pipeline gives the same results as the fetch it was saved from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDump {
    pub session: SessionConfig,
    /// Application calls in indexer order.
    pub transactions: Vec<IndexerTransaction>,
    pub metadata: SessionMetadata,
    pub governors: Option<GovernorsData>,
}

impl SessionDump {
    pub fn save(&self, path: &Path, is_compressed: bool) -> Result<(), DumpError> {
        let data = serde_json::to_vec(self)?;
        let file = File::create(path)?;

        if is_compressed {
            let mut enc = GzEncoder::new(file, Compression::default());
            enc.write_all(&data)?;
            enc.finish()?;
        } else {
            let mut writer = BufWriter::new(file);
            writer.write_all(&data)?;
            writer.flush()?;
        }

        Ok(())
    }

    pub fn read(path: &Path, is_compressed: bool) -> Result<Self, DumpError> {
        Self::read_with_limit(path, is_compressed, max_dump_bytes())
    }

    /// Read a dump whose decompressed JSON is at most `limit` bytes.
    pub fn read_with_limit(path: &Path, is_compressed: bool, limit: u64) -> Result<Self, DumpError> {
        let file = BufReader::new(File::open(path)?);
        let reader: Box<dyn Read> = if is_compressed {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        // One byte past the limit tells an exact fit from an oversized dump
        let mut buf = Vec::new();
        reader.take(limit.saturating_add(1)).read_to_end(&mut buf)?;
        if buf.len() as u64 > limit {
            return Err(DumpError::TooLarge { limit });
        }

        Ok(serde_json::from_slice(&buf)?)
    }
}
