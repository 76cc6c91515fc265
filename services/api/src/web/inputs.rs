//! services/api/src/web/inputs.rs
//!
//! Handlers for the free-form sales page inputs. Writes are debounced per
//! user and offer; a flush stands in for the field losing focus.

use crate::web::{rest::draft_error, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use ignite_core::domain::DraftScope;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Read the stored inputs, flushing any pending autosave first.
#[utoipa::path(
    get,
    path = "/offers/{offer}/inputs",
    params(("offer" = u32, Path, description = "The offer number.")),
    responses((status = 200, description = "The stored inputs object"))
)]
pub async fn get_inputs_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(offer): Path<u32>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let scope = DraftScope::new(user_id, offer);
    app_state.autosave.flush(scope).await;
    let inputs = app_state
        .drafts
        .load_inputs(scope)
        .await
        .map_err(draft_error)?;
    Ok(Json(inputs))
}

/// Queue the inputs for a debounced write.
#[utoipa::path(
    put,
    path = "/offers/{offer}/inputs",
    request_body(
        content = Object,
        description = "Free-form sales page inputs; must be a JSON object.",
        content_type = "application/json"
    ),
    params(("offer" = u32, Path, description = "The offer number.")),
    responses(
        (status = 202, description = "Inputs queued for saving"),
        (status = 400, description = "Body is not a JSON object")
    )
)]
pub async fn put_inputs_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(offer): Path<u32>,
    Json(inputs): Json<Value>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !inputs.is_object() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Sales page inputs must be a JSON object".to_string(),
        ));
    }
    app_state
        .autosave
        .push(DraftScope::new(user_id, offer), inputs)
        .await;
    Ok(StatusCode::ACCEPTED)
}

/// Write any queued inputs now.
#[utoipa::path(
    post,
    path = "/offers/{offer}/inputs/flush",
    params(("offer" = u32, Path, description = "The offer number.")),
    responses((status = 204, description = "Pending inputs written"))
)]
pub async fn flush_inputs_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(offer): Path<u32>,
) -> StatusCode {
    app_state
        .autosave
        .flush(DraftScope::new(user_id, offer))
        .await;
    StatusCode::NO_CONTENT
}
