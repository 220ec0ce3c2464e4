//! Session configuration and the documents describing a voting session

use std::path::Path;

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::consts::{BuiltinSession, CONTROL_PROPOSAL_ID, SESSIONS};
use crate::error::ConfigError;

/// Everything that identifies one voting session ahead of time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub session: u32,
    /// Governance application whose calls carry the votes.
    pub app_id: u64,
    /// Sum of all governor weights in the session snapshot.
    pub total_voting_weight: u64,
    pub metadata_url: String,
    #[serde(default)]
    pub governor_data_url: Option<String>,
    /// Proposal ids in the order of the on-chain weight vector.
    pub proposal_ids: Vec<String>,
    #[serde(default = "default_control_proposal")]
    pub control_proposal_id: String,
}

fn default_control_proposal() -> String {
    CONTROL_PROPOSAL_ID.to_string()
}

impl SessionConfig {
    pub fn builtin(session: u32) -> Result<Self, ConfigError> {
        SESSIONS
            .iter()
            .find(|s| s.session == session)
            .map(Self::from)
            .ok_or(ConfigError::UnknownSession(session))
    }

    /// Load a custom session from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&text)?;
        if config.proposal_ids.is_empty() {
            return Err(ConfigError::NoProposals);
        }
        info!(
            "Loaded session {} from {} ({} proposals)",
            config.session,
            path.display(),
            config.proposal_ids.len()
        );
        Ok(config)
    }

    /// Resolve a session file if one is given, else the built-in session.
    pub fn resolve(session: u32, session_file: Option<&Path>) -> Result<Self, ConfigError> {
        match session_file {
            Some(path) => Self::from_file(path),
            None => Self::builtin(session),
        }
    }

    pub fn is_control(&self, proposal_id: &str) -> bool {
        self.control_proposal_id == proposal_id
    }
}

impl From<&BuiltinSession> for SessionConfig {
    fn from(s: &BuiltinSession) -> Self {
        SessionConfig {
            session: s.session,
            app_id: s.app_id,
            total_voting_weight: s.total_voting_weight,
            metadata_url: s.metadata_url(),
            governor_data_url: Some(s.governor_data_url()),
            proposal_ids: s.proposal_ids.iter().map(|id| id.to_string()).collect(),
            control_proposal_id: CONTROL_PROPOSAL_ID.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub at: String,
    #[serde(default)]
    pub by: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalMetadata {
    #[serde(default)]
    pub ask: u64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub focus_area: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub threshold: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: ProposalMetadata,
}

/// The session metadata document published alongside the voting contract.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub information_url: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub created: Created,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl SessionMetadata {
    /// Cut every question description down to its abstract, the text above
    /// the first markdown heading. Descriptions starting with a heading are kept.
    pub fn into_abstracts(mut self) -> Self {
        for question in self.questions.iter_mut() {
            let abstract_text = question.description.split('#').next().unwrap_or("");
            if !abstract_text.is_empty() {
                question.description = abstract_text.to_string();
            }
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Governor {
    pub address: String,
    #[serde(default)]
    pub signature: String,
    pub weight: u64,
}

/// Governor snapshot the session's voting power was derived from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernorsData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub snapshot: Vec<Governor>,
    #[serde(default)]
    pub created: Created,
}

/// A proposal slot of the session, joined with its metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalSpec {
    pub proposal_id: String,
    pub proposal_index: usize,
    pub title: String,
    pub category: String,
    pub ask: u64,
    pub threshold: Option<u64>,
    pub control: bool,
    /// Pull request that added the proposal text, parsed from its link.
    pub pull_request: Option<u64>,
}

static PULL_REQUEST_LINK: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"pull/(\d+)/files").ok());

/// Pull request number of a proposal link such as
/// `https://github.com/algorandfoundation/xGov/pull/92/files`.
pub fn pull_request_number(link: &str) -> Option<u64> {
    let re = (*PULL_REQUEST_LINK).as_ref()?;
    re.captures(link)?.get(1)?.as_str().parse().ok()
}

/// Candidate locations of a proposal's markdown text under `base`. Most
/// files are named `xgov-<pr>.md`, older ones `xGov-<pr>.md`.
pub fn proposal_text_urls(base: &str, pull_request: u64) -> [String; 2] {
    let base = base.trim_end_matches('/');
    [
        format!("{}/xgov-{}.md", base, pull_request),
        format!("{}/xGov-{}.md", base, pull_request),
    ]
}

/// Join the fixed proposal order with the metadata questions, which are
/// published in the same order.
pub fn proposal_specs(config: &SessionConfig, metadata: &SessionMetadata) -> Vec<ProposalSpec> {
    if metadata.questions.len() != config.proposal_ids.len() {
        warn!(
            "Session {} lists {} proposals but metadata has {} questions",
            config.session,
            config.proposal_ids.len(),
            metadata.questions.len()
        );
    }

    config
        .proposal_ids
        .iter()
        .enumerate()
        .map(|(index, proposal_id)| {
            let question = metadata.questions.get(index);
            ProposalSpec {
                proposal_id: proposal_id.clone(),
                proposal_index: index,
                title: question.map(|q| q.prompt.clone()).unwrap_or_default(),
                category: question
                    .map(|q| q.metadata.category.clone())
                    .unwrap_or_default(),
                ask: question.map(|q| q.metadata.ask).unwrap_or(0),
                threshold: question.and_then(|q| q.metadata.threshold),
                control: config.is_control(proposal_id),
                pull_request: question.and_then(|q| pull_request_number(&q.metadata.link)),
            }
        })
        .collect()
}
