use thiserror::Error;

/// Failure to obtain session data from the indexer or a metadata document.
/// A refresh that hits one of these fails as a whole.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A vote transaction whose weight argument cannot be decoded. Only that
/// transaction is skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("transaction has {0} application args, vote weights need at least 2")]
    MissingVoteArgument(usize),

    #[error("vote weights are not valid base64: {0}")]
    Base64(String),

    #[error("encoded weight array is {0} bytes, shorter than its length prefix")]
    TooShort(usize),

    #[error("encoded weight array declares {declared} weights, expected {expected} bytes but got {actual}")]
    LengthMismatch {
        declared: usize,
        expected: usize,
        actual: usize,
    },

    #[error("sum of vote weights overflows u64")]
    WeightOverflow,
}

/// A single record that does not fit the session's proposal list.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DataConsistencyError {
    #[error("voter {address} has weight at proposal index {index}, session only has {proposals} proposals")]
    IndexOutOfRange {
        address: String,
        index: usize,
        proposals: usize,
    },

    #[error("vote from {address} references unknown proposal index {index}")]
    UnknownProposal { address: String, index: usize },

    #[error("total votes for proposal {proposal_id} overflow u64")]
    TotalOverflow { proposal_id: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown session {0}, built-in sessions are 1, 2 and 3")]
    UnknownSession(u32),

    #[error("failed to read session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid session file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session file lists no proposals")]
    NoProposals,
}

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("dump io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dump: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dump is larger than the {limit} byte limit, raise XGOV_MAX_DUMP_MB to read it")]
    TooLarge { limit: u64 },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv output is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("csv writer error: {0}")]
    Flush(String),
}
