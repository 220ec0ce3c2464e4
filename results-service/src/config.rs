//! Service configuration from environment variables

use std::path::PathBuf;
use std::time::Duration;

use cli::consts::{
    DEFAULT_INDEXER_URL, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_PROPOSALS_URL, DEFAULT_SESSION,
};
use cli::{IndexerClient, SessionConfig};

use crate::utils::env_parse;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub port: u16,
    pub session: u32,
    pub session_file: Option<PathBuf>,
    pub indexer_url: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub proposals_url: String,
    pub refresh_token: Option<String>,
    pub http_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            session: env_parse("XGOV_SESSION", DEFAULT_SESSION),
            session_file: std::env::var("SESSION_FILE").ok().map(PathBuf::from),
            indexer_url: std::env::var("INDEXER_URL")
                .unwrap_or_else(|_| DEFAULT_INDEXER_URL.to_string()),
            page_size: env_parse("INDEXER_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            max_pages: env_parse("INDEXER_MAX_PAGES", DEFAULT_MAX_PAGES),
            proposals_url: std::env::var("PROPOSALS_URL")
                .unwrap_or_else(|_| DEFAULT_PROPOSALS_URL.to_string()),
            refresh_token: std::env::var("REFRESH_AUTH_TOKEN").ok(),
            http_timeout: Duration::from_secs(env_parse(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
        }
    }

    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        Ok(SessionConfig::resolve(
            self.session,
            self.session_file.as_deref(),
        )?)
    }

    pub fn client(&self) -> anyhow::Result<IndexerClient> {
        Ok(IndexerClient::new(
            &self.indexer_url,
            self.page_size,
            self.max_pages,
            self.http_timeout,
        )?
        .with_proposals_url(&self.proposals_url))
    }
}
