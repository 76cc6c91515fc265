//! services/api/src/web/middleware.rs
//!
//! Identifies the calling user for every sales page route.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Middleware that reads the `x-user-id` header and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// If missing or malformed, returns 400 Bad Request.
pub async fn require_user(mut req: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    // 1. Extract the header
    let user_id_str = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-user-id header is required".to_string(),
            )
        })?;

    // 2. Parse it
    let user_id = Uuid::parse_str(user_id_str.trim()).map_err(|_| {
        warn!("Rejected malformed x-user-id header: {}", user_id_str);
        (
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id format".to_string(),
        )
    })?;

    // 3. Insert user_id into request extensions
    req.extensions_mut().insert(user_id);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}
