pub mod inputs;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_user;
pub use state::AppState;

/// Builds the sales page API router. Every route requires `x-user-id`.
pub fn router(app_state: Arc<AppState>) -> Router {
    let offer_routes = Router::new()
        .route(
            "/offers/{offer}/drafts",
            get(rest::list_drafts_handler).post(rest::create_draft_handler),
        )
        .route(
            "/offers/{offer}/drafts/active",
            get(rest::get_active_draft_handler).put(rest::switch_active_draft_handler),
        )
        .route(
            "/offers/{offer}/drafts/{draft_id}",
            get(rest::get_draft_handler)
                .put(rest::save_draft_handler)
                .patch(rest::rename_draft_handler)
                .delete(rest::delete_draft_handler),
        )
        .route(
            "/offers/{offer}/drafts/{draft_id}/sections",
            get(rest::list_sections_handler),
        )
        .route(
            "/offers/{offer}/drafts/{draft_id}/sections/{section}",
            put(rest::update_section_handler),
        )
        .route(
            "/offers/{offer}/drafts/{draft_id}/export/{format}",
            get(rest::export_draft_handler),
        )
        .route("/offers/{offer}/generate", post(rest::generate_sales_page_handler))
        .route(
            "/offers/{offer}/inputs",
            get(inputs::get_inputs_handler).put(inputs::put_inputs_handler),
        )
        .route("/offers/{offer}/inputs/flush", post(inputs::flush_inputs_handler))
        .route("/completeness", post(rest::completeness_handler));

    offer_routes
        .layer(axum_middleware::from_fn(require_user))
        .with_state(app_state)
}
