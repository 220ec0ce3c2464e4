//! Shared application state and the current results snapshot

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cli::{IndexerClient, SessionConfig, VotingData};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

/// One complete pipeline run. Readers never see a partial update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub data: VotingData,
    pub refreshed_at: DateTime<Utc>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionConfig>,
    pub client: IndexerClient,
    pub snapshot: Arc<RwLock<Option<Arc<Snapshot>>>>,
    /// Held for the duration of a refresh so only one runs at a time.
    pub refresh_lock: Arc<Mutex<()>>,
    pub refresh_token: Option<String>,
}

impl AppState {
    pub fn new(session: SessionConfig, client: IndexerClient, refresh_token: Option<String>) -> Self {
        Self {
            session: Arc::new(session),
            client,
            snapshot: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
        }
    }

    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    pub async fn replace(&self, data: VotingData) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot {
            data,
            refreshed_at: Utc::now(),
        });
        *self.snapshot.write().await = Some(snapshot.clone());
        snapshot
    }
}
