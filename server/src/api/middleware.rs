//! HTTP middleware and fallbacks

use axum::extract::Request;
use axum::response::IntoResponse;

use super::types::ApiError;

/// Unknown route: JSON 404 in the same shape as every other error
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "[404] No route");
    ApiError::not_found(
        "ROUTE_NOT_FOUND",
        format!("No route for {} {}", req.method(), req.uri().path()),
    )
}
