use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;

/// Soft wall-clock limit per request. The handler future is dropped when the
/// deadline passes and the client gets a 408 envelope, independent of whether
/// an underlying write completed.
pub async fn timeout_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let limit = Duration::from_secs(state.config.server.request_timeout_secs);

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!("request exceeded {}s soft timeout", limit.as_secs());
            ApiError::timeout("Request timeout").into_response()
        }
    }
}
