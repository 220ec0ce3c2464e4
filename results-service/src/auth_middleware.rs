//! Authentication middleware for the refresh endpoint

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::info;

use crate::metrics::{record_refresh_outcome, RefreshOutcome};
use crate::state::AppState;

/// Middleware that checks the bearer token on `POST /refresh`. Without a
/// configured token every refresh is let through.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if request.uri().path() != "/refresh" {
        return Ok(next.run(request).await);
    }

    let Some(expected) = app_state.refresh_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let authorized = extract_bearer_token(&headers).map(|token| token == expected);
    if authorized != Ok(true) {
        info!("Rejected refresh request with missing or invalid token");
        record_refresh_outcome(RefreshOutcome::Unauthorized);
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let auth_header = headers
        .get("authorization")
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::BAD_REQUEST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), Err(StatusCode::UNAUTHORIZED));

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), Err(StatusCode::BAD_REQUEST));

        headers.insert("authorization", HeaderValue::from_static("Bearer s3cret"));
        assert_eq!(extract_bearer_token(&headers), Ok("s3cret"));
    }
}
