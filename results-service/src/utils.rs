//! Shared utility functions for the results service

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use cli::VoteEffect;
use tracing::info;

/// Parse an effect filter from a query string, e.g. `contributed-to-passing`.
pub fn parse_effect(value: &str) -> Result<VoteEffect, StatusCode> {
    VoteEffect::ALL
        .into_iter()
        .find(|e| e.as_str() == value)
        .ok_or_else(|| {
            info!("Invalid effect filter '{}'", value);
            StatusCode::BAD_REQUEST
        })
}

/// Parse an environment variable into a type implementing FromStr, with a default fallback
pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Wrap CSV text as a downloadable attachment.
pub fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}
