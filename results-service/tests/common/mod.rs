use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::{
    net::TcpListener,
    path::{Path, PathBuf},
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use cli::{consts::CAST_VOTE_SELECTOR, decode::encode_vote_weights};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tokio::time::sleep;

pub const REFRESH_TOKEN: &str = "test-token";

/// Get an available ephemeral port on localhost.
pub fn find_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Resolve the results-service binary path from env or common target dirs.
pub fn resolve_binary_path() -> String {
    if let Some(p) = option_env!("CARGO_BIN_EXE_results-service") {
        return p.to_string();
    }

    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let workspace_root = manifest.parent().unwrap_or(&manifest).to_path_buf();
    let candidates = [
        workspace_root.join("target/debug/results-service"),
        workspace_root.join("target/release/results-service"),
    ];
    for cand in candidates.iter() {
        if Path::new(&cand).exists() {
            return cand.to_string_lossy().to_string();
        }
    }

    "results-service".to_string()
}

/// Poll /healthz until the server responds OK or timeout.
pub async fn wait_ready(base: &str, timeout_ms: u64) -> anyhow::Result<()> {
    let client = Client::new();
    let mut waited = 0u64;
    loop {
        if waited >= timeout_ms {
            anyhow::bail!("server not ready after {}ms", timeout_ms);
        }
        if let Ok(resp) = client.get(format!("{}/healthz", base)).send().await {
            if resp.status().is_success() {
                return Ok(());
            }
        }
        sleep(Duration::from_millis(50)).await;
        waited += 50;
    }
}

// Struct that ensures the child process is killed on drop
pub struct ChildGuard(std::process::Child);
impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
    }
}

/// Indexer, metadata and governor documents for a three proposal session.
/// Setting `failing` makes the indexer answer 500.
#[derive(Clone, Default)]
pub struct FakeUpstream {
    pub failing: Arc<AtomicBool>,
}

impl FakeUpstream {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

fn cast(sender: &str, round: u64, weights: &[u64]) -> Value {
    json!({
        "id": format!("TX-{}", sender),
        "sender": sender,
        "confirmed-round": round,
        "round-time": 1_700_000_000 + round,
        "intra-round-offset": 0,
        "tx-type": "appl",
        "application-transaction": {
            "application-id": 42,
            "application-args": [CAST_VOTE_SELECTOR, encode_vote_weights(weights), "AA=="],
        }
    })
}

async fn transactions(
    State(upstream): State<FakeUpstream>,
    Query(query): Query<std::collections::HashMap<String, String>>,
) -> Response {
    if upstream.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    // Two pages, chained by the next token
    let page = match query.get("next").map(String::as_str) {
        None => json!({
            "current-round": 10,
            "next-token": "page-2",
            "transactions": [cast("VOTERA", 2, &[60, 100, 5]), cast("VOTERB", 5, &[50, 0, 0])],
        }),
        Some("page-2") => json!({
            "current-round": 10,
            "transactions": [cast("VOTERLATE", 6, &[30, 0, 0])],
        }),
        Some(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    Json(page).into_response()
}

async fn metadata() -> Json<Value> {
    let question = |id: &str, title: &str, ask: u64, threshold: u64, link: &str| {
        json!({
            "id": id,
            "prompt": title,
            "description": format!("Abstract of {}\n# Details", title),
            "metadata": { "ask": ask, "category": "Tooling", "threshold": threshold, "link": link },
        })
    };
    Json(json!({
        "id": "session-test",
        "title": "Test Session",
        "questions": [
            question("10", "Explorer", 500, 100, "https://github.com/algorandfoundation/xGov/pull/92/files"),
            question("11", "Wallet", 900, 1000, ""),
            question("01", "Control", 0, 1, ""),
        ],
    }))
}

async fn governors() -> Json<Value> {
    Json(json!({
        "title": "Test Governors",
        "snapshot": [
            { "address": "VOTERA", "signature": "sig-a", "weight": 165 },
            { "address": "VOTERB", "signature": "sig-b", "weight": 50 },
            { "address": "VOTERLATE", "signature": "sig-l", "weight": 30 },
            { "address": "IDLE", "signature": "sig-i", "weight": 755 },
        ],
    }))
}

// Only the camel-case file name exists, as for older proposals
async fn proposal_text() -> &'static str {
    "# Explorer\n\nA block explorer for the ecosystem."
}

/// Serve the fake upstream on an ephemeral port of the test runtime.
pub async fn spawn_upstream() -> anyhow::Result<(String, FakeUpstream)> {
    let upstream = FakeUpstream::default();
    let app = Router::new()
        .route("/v2/transactions", get(transactions))
        .route("/metadata", get(metadata))
        .route("/governors", get(governors))
        .route("/proposals/xGov-92.md", get(proposal_text))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((base_url, upstream))
}

fn session_file(upstream_url: &str) -> anyhow::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    let session = json!({
        "session": 99,
        "appId": 42,
        "totalVotingWeight": 1000,
        "metadataUrl": format!("{}/metadata", upstream_url),
        "governorDataUrl": format!("{}/governors", upstream_url),
        "proposalIds": ["10", "11", "01"],
    });
    file.write_all(session.to_string().as_bytes())?;
    file.flush()?;
    Ok(file)
}

pub struct TestServer {
    pub base_url: String,
    pub upstream: FakeUpstream,
    _guard: ChildGuard,
    _session_file: NamedTempFile,
}

pub async fn setup_server() -> anyhow::Result<TestServer> {
    // Resolve binary path from Cargo or fallbacks
    let bin = resolve_binary_path();
    let bin_path = Path::new(&bin);
    assert!(bin_path.exists(), "binary not found at {}", bin);

    let (upstream_url, upstream) = spawn_upstream().await?;
    let session_file = session_file(&upstream_url)?;

    let port = find_free_port();
    let base_url = format!("http://127.0.0.1:{}", port);

    // Start the binary
    let child = Command::new(&bin)
        .env("PORT", port.to_string())
        .env("SESSION_FILE", session_file.path())
        .env("INDEXER_URL", &upstream_url)
        .env("INDEXER_PAGE_SIZE", "2")
        .env("PROPOSALS_URL", format!("{}/proposals", upstream_url))
        .env("REFRESH_AUTH_TOKEN", REFRESH_TOKEN)
        .env("HTTP_TIMEOUT_SECS", "5")
        .env("RUST_LOG", "info")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Ensure we always try to kill the child on exit
    let guard = ChildGuard(child);

    // Wait until server is ready
    wait_ready(&base_url, 10_000).await?;

    Ok(TestServer {
        base_url,
        upstream,
        _guard: guard,
        _session_file: session_file,
    })
}
