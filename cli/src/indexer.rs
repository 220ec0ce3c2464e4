//! Indexer and metadata fetching

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::consts::DEFAULT_PROPOSALS_URL;
use crate::dump::SessionDump;
use crate::error::SourceError;
use crate::session::{proposal_text_urls, GovernorsData, SessionConfig, SessionMetadata};
use crate::types::ProposalResult;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationTransaction {
    #[serde(default)]
    pub application_id: u64,
    /// Base64 encoded arguments, in call order.
    #[serde(default)]
    pub application_args: Vec<String>,
}

/// The subset of an indexer transaction the vote pipeline reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexerTransaction {
    #[serde(default)]
    pub id: String,
    pub sender: String,
    pub confirmed_round: u64,
    pub round_time: u64,
    #[serde(default)]
    pub intra_round_offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_transaction: Option<ApplicationTransaction>,
}

impl IndexerTransaction {
    pub fn application_args(&self) -> &[String] {
        self.application_transaction
            .as_ref()
            .map(|a| a.application_args.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TransactionPage {
    #[serde(default)]
    transactions: Vec<IndexerTransaction>,
    #[serde(default)]
    next_token: Option<String>,
}

/// HTTP client for the indexer and the session documents. One instance is
/// built per pipeline invocation or per service.
#[derive(Clone)]
pub struct IndexerClient {
    client: Client,
    base_url: String,
    page_size: u32,
    max_pages: u32,
    proposals_url: String,
}

impl IndexerClient {
    pub fn new(
        base_url: &str,
        page_size: u32,
        max_pages: u32,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: page_size.max(1),
            max_pages: max_pages.max(1),
            proposals_url: DEFAULT_PROPOSALS_URL.to_string(),
        })
    }

    /// Read proposal texts from `url` instead of the xGov repository.
    pub fn with_proposals_url(mut self, url: &str) -> Self {
        self.proposals_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Page through every application call against `app_id`, oldest first as
    /// returned by the indexer. Stops after `max_pages` sequential requests.
    pub async fn transactions(&self, app_id: u64) -> Result<Vec<IndexerTransaction>, SourceError> {
        let url = format!("{}/v2/transactions", self.base_url);
        let mut transactions = Vec::new();
        let mut next: Option<String> = None;

        for page in 0..self.max_pages {
            let mut query = vec![
                ("application-id", app_id.to_string()),
                ("tx-type", "appl".to_string()),
                ("limit", self.page_size.to_string()),
            ];
            if let Some(token) = &next {
                query.push(("next", token.clone()));
            }

            let body: TransactionPage = self.get_json(&url, &query).await?;
            debug!(
                "Indexer page {}: {} transactions",
                page,
                body.transactions.len()
            );

            let empty = body.transactions.is_empty();
            transactions.extend(body.transactions);
            next = body.next_token.filter(|t| !t.is_empty());

            if empty || next.is_none() {
                next = None;
                break;
            }
        }

        if next.is_some() {
            warn!(
                "Stopped after {} indexer pages, results for app {} may be truncated",
                self.max_pages, app_id
            );
        }

        info!(
            "Fetched {} application calls for app {}",
            transactions.len(),
            app_id
        );
        Ok(transactions)
    }

    pub async fn session_metadata(
        &self,
        config: &SessionConfig,
    ) -> Result<SessionMetadata, SourceError> {
        let metadata: SessionMetadata = self.get_json(&config.metadata_url, &[]).await?;
        info!(
            "Fetched metadata for session {} with {} questions",
            config.session,
            metadata.questions.len()
        );
        Ok(metadata.into_abstracts())
    }

    pub async fn governors(
        &self,
        config: &SessionConfig,
    ) -> Result<Option<GovernorsData>, SourceError> {
        let Some(url) = &config.governor_data_url else {
            return Ok(None);
        };
        let governors: GovernorsData = self.get_json(url, &[]).await?;
        info!("Fetched {} governors", governors.snapshot.len());
        Ok(Some(governors))
    }

    /// Fetch everything one session needs, one request after the other.
    pub async fn fetch_session(&self, config: &SessionConfig) -> Result<SessionDump, SourceError> {
        let transactions = self.transactions(config.app_id).await?;
        let metadata = self.session_metadata(config).await?;
        let governors = self.governors(config).await?;

        Ok(SessionDump {
            session: config.clone(),
            transactions,
            metadata,
            governors,
        })
    }

    /// Markdown text of a proposal. The lower-case file name is tried first.
    /// `None` when the proposal links no pull request or neither file exists.
    pub async fn proposal_text(
        &self,
        proposal: &ProposalResult,
    ) -> Result<Option<String>, SourceError> {
        let Some(pull_request) = proposal.pull_request else {
            return Ok(None);
        };

        for url in proposal_text_urls(&self.proposals_url, pull_request) {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|source| SourceError::Request {
                    url: url.clone(),
                    source,
                })?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                debug!("No proposal text at {}", url);
                continue;
            }
            if !status.is_success() {
                return Err(SourceError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            let text = response
                .text()
                .await
                .map_err(|source| SourceError::Body { url, source })?;
            return Ok(Some(text));
        }

        warn!(
            "No text found for proposal {} (pull request {})",
            proposal.proposal_id, pull_request
        );
        Ok(None)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| SourceError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|source| SourceError::Body {
            url: url.to_string(),
            source,
        })
    }
}
