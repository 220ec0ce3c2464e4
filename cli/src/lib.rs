pub mod classify;
pub mod consts;
pub mod decode;
pub mod dump;
pub mod error;
pub mod expand;
pub mod export;
pub mod indexer;
pub mod participation;
pub mod pipeline;
pub mod session;
pub mod tally;
pub mod types;
pub mod utils;

pub use dump::SessionDump;
pub use indexer::IndexerClient;
pub use pipeline::{compute, load, PipelineStats, VotingData};
pub use session::SessionConfig;
pub use types::*;
