//! Types for HTTP requests and responses

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct VotesQuery {
    /// Only votes on this proposal id.
    pub proposal: Option<String>,
    /// Only votes with this effect, e.g. `no-effect-already-passed`.
    pub effect: Option<String>,
}
