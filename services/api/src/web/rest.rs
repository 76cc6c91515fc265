//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use ignite_core::{
    completeness,
    document::{Document, DocumentError, Section},
    domain::{Draft, DraftCollection, DraftScope, MissingElement, Priority, SalesPageRequest},
    drafts::DraftError,
    export::{self, ExportFormat, GOOGLE_DOCS_CREATE_URL},
    missing,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Set on text exports, pointing at the page that opens a new Google Doc.
pub const GOOGLE_DOCS_URL_HEADER: &str = "x-google-docs-url";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_drafts_handler,
        create_draft_handler,
        get_draft_handler,
        save_draft_handler,
        rename_draft_handler,
        delete_draft_handler,
        get_active_draft_handler,
        switch_active_draft_handler,
        list_sections_handler,
        update_section_handler,
        export_draft_handler,
        generate_sales_page_handler,
        completeness_handler,
        crate::web::inputs::get_inputs_handler,
        crate::web::inputs::put_inputs_handler,
        crate::web::inputs::flush_inputs_handler,
    ),
    components(
        schemas(
            DraftResponse,
            DraftCollectionResponse,
            CreateDraftRequest,
            SaveDraftRequest,
            RenameDraftRequest,
            SwitchDraftRequest,
            UpdateSectionRequest,
            SectionResponse,
            SectionsResponse,
            MissingElementResponse,
            GenerateRequest,
            CompletenessRequest,
            CompletenessResponse,
        )
    ),
    tags(
        (name = "IGNITE Sales Page API", description = "Drafts, generation and exports for sales pages.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub id: String,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl From<Draft> for DraftResponse {
    fn from(draft: Draft) -> Self {
        Self {
            id: draft.id,
            name: draft.name,
            content: draft.content.into_inner(),
            created_at: draft.created_at,
            last_modified: draft.last_modified,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftCollectionResponse {
    pub drafts: Vec<DraftResponse>,
    pub current_draft_id: Option<String>,
}

impl From<DraftCollection> for DraftCollectionResponse {
    fn from(collection: DraftCollection) -> Self {
        Self {
            drafts: collection.drafts.into_iter().map(Into::into).collect(),
            current_draft_id: collection.current_draft_id,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateDraftRequest {
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveDraftRequest {
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RenameDraftRequest {
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchDraftRequest {
    pub draft_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSectionRequest {
    pub content: String,
}

#[derive(Serialize, ToSchema)]
pub struct MissingElementResponse {
    pub section: String,
    pub field: String,
    pub description: String,
    /// One of `high`, `medium`, `low`.
    pub priority: String,
    pub suggestions: Vec<String>,
}

impl From<&MissingElement> for MissingElementResponse {
    fn from(element: &MissingElement) -> Self {
        let priority = match element.priority {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        Self {
            section: element.section.clone(),
            field: element.field.clone(),
            description: element.description.clone(),
            priority: priority.to_string(),
            suggestions: element.suggestions.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SectionResponse {
    pub key: String,
    pub title: String,
    pub content: String,
    pub missing: Vec<MissingElementResponse>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionsResponse {
    pub draft_id: String,
    pub sections: Vec<SectionResponse>,
}

/// The generation payload. The user comes from `x-user-id`, the offer from the path.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub offer_type: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub messaging_strategy: Value,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub offer_outline: Value,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub workbook_responses: Value,
    /// When omitted, the stored sales page inputs for the offer are used.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub sales_page_inputs: Value,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessRequest {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub messaging_strategy: Value,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub offer_outline: Value,
    /// When given, the offer's active draft must exist for a non-zero score.
    #[serde(default)]
    pub offer_number: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct CompletenessResponse {
    pub score: u8,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

pub(crate) fn draft_error(e: DraftError) -> (StatusCode, String) {
    match e {
        DraftError::DraftNotFound(id) => (StatusCode::NOT_FOUND, format!("Draft {} not found", id)),
        DraftError::Document(DocumentError::SectionNotFound(section)) => (
            StatusCode::NOT_FOUND,
            format!("Section '{}' is missing from this draft", section),
        ),
        DraftError::Document(
            e @ (DocumentError::UnknownSection(_) | DocumentError::MarkerInContent(_)),
        ) => (StatusCode::BAD_REQUEST, e.to_string()),
        DraftError::Generation(e) => {
            error!("Sales page generation failed: {:?}", e);
            (
                StatusCode::BAD_GATEWAY,
                "Failed to generate sales page".to_string(),
            )
        }
        other => {
            error!("Draft store failure: {:?}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to access drafts".to_string(),
            )
        }
    }
}

fn parse_section(raw: &str) -> Result<Section, (StatusCode, String)> {
    raw.parse::<Section>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

//=========================================================================================
// Draft Handlers
//=========================================================================================

/// List the drafts of an offer and the active draft id.
#[utoipa::path(
    get,
    path = "/offers/{offer}/drafts",
    params(("offer" = u32, Path, description = "The offer number.")),
    responses(
        (status = 200, description = "Draft collection", body = DraftCollectionResponse),
        (status = 400, description = "Missing or invalid x-user-id header")
    )
)]
pub async fn list_drafts_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(offer): Path<u32>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let collection = app_state
        .drafts
        .load(DraftScope::new(user_id, offer))
        .await
        .map_err(draft_error)?;
    Ok(Json(DraftCollectionResponse::from(collection)))
}

/// Store a document as a new draft.
#[utoipa::path(
    post,
    path = "/offers/{offer}/drafts",
    request_body = CreateDraftRequest,
    params(("offer" = u32, Path, description = "The offer number.")),
    responses((status = 201, description = "Draft created", body = DraftResponse))
)]
pub async fn create_draft_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(offer): Path<u32>,
    Json(req): Json<CreateDraftRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = app_state
        .drafts
        .create(DraftScope::new(user_id, offer), Document::new(req.content))
        .await
        .map_err(draft_error)?;
    Ok((StatusCode::CREATED, Json(DraftResponse::from(draft))))
}

#[utoipa::path(
    get,
    path = "/offers/{offer}/drafts/{draft_id}",
    params(
        ("offer" = u32, Path, description = "The offer number."),
        ("draft_id" = String, Path, description = "The draft id.")
    ),
    responses(
        (status = 200, description = "The draft", body = DraftResponse),
        (status = 404, description = "Unknown draft")
    )
)]
pub async fn get_draft_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((offer, draft_id)): Path<(u32, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = app_state
        .drafts
        .get(DraftScope::new(user_id, offer), &draft_id)
        .await
        .map_err(draft_error)?;
    Ok(Json(DraftResponse::from(draft)))
}

/// Replace a draft's whole document.
#[utoipa::path(
    put,
    path = "/offers/{offer}/drafts/{draft_id}",
    request_body = SaveDraftRequest,
    params(
        ("offer" = u32, Path, description = "The offer number."),
        ("draft_id" = String, Path, description = "The draft id.")
    ),
    responses(
        (status = 200, description = "Draft saved", body = DraftResponse),
        (status = 404, description = "Unknown draft")
    )
)]
pub async fn save_draft_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((offer, draft_id)): Path<(u32, String)>,
    Json(req): Json<SaveDraftRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = app_state
        .drafts
        .save(DraftScope::new(user_id, offer), &draft_id, Document::new(req.content))
        .await
        .map_err(draft_error)?;
    Ok(Json(DraftResponse::from(draft)))
}

/// Rename a draft. Blank names fall back to "Draft N".
#[utoipa::path(
    patch,
    path = "/offers/{offer}/drafts/{draft_id}",
    request_body = RenameDraftRequest,
    params(
        ("offer" = u32, Path, description = "The offer number."),
        ("draft_id" = String, Path, description = "The draft id.")
    ),
    responses(
        (status = 200, description = "Draft renamed", body = DraftResponse),
        (status = 404, description = "Unknown draft")
    )
)]
pub async fn rename_draft_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((offer, draft_id)): Path<(u32, String)>,
    Json(req): Json<RenameDraftRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = app_state
        .drafts
        .rename(DraftScope::new(user_id, offer), &draft_id, &req.name)
        .await
        .map_err(draft_error)?;
    Ok(Json(DraftResponse::from(draft)))
}

#[utoipa::path(
    delete,
    path = "/offers/{offer}/drafts/{draft_id}",
    params(
        ("offer" = u32, Path, description = "The offer number."),
        ("draft_id" = String, Path, description = "The draft id.")
    ),
    responses((status = 204, description = "Draft deleted, or it did not exist"))
)]
pub async fn delete_draft_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((offer, draft_id)): Path<(u32, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .drafts
        .delete(DraftScope::new(user_id, offer), &draft_id)
        .await
        .map_err(draft_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/offers/{offer}/drafts/active",
    params(("offer" = u32, Path, description = "The offer number.")),
    responses(
        (status = 200, description = "The active draft", body = DraftResponse),
        (status = 404, description = "The offer has no drafts")
    )
)]
pub async fn get_active_draft_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(offer): Path<u32>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = app_state
        .drafts
        .active(DraftScope::new(user_id, offer))
        .await
        .map_err(draft_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "No active draft".to_string()))?;
    Ok(Json(DraftResponse::from(draft)))
}

/// Switch the displayed draft. Unknown ids leave the collection unchanged.
#[utoipa::path(
    put,
    path = "/offers/{offer}/drafts/active",
    request_body = SwitchDraftRequest,
    params(("offer" = u32, Path, description = "The offer number.")),
    responses(
        (status = 200, description = "Draft collection after the switch", body = DraftCollectionResponse)
    )
)]
pub async fn switch_active_draft_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(offer): Path<u32>,
    Json(req): Json<SwitchDraftRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let collection = app_state
        .drafts
        .switch_active(DraftScope::new(user_id, offer), &req.draft_id)
        .await
        .map_err(draft_error)?;
    Ok(Json(DraftCollectionResponse::from(collection)))
}

//=========================================================================================
// Section Handlers
//=========================================================================================

/// Every section of a draft with the advisory notes for unwritten ones.
#[utoipa::path(
    get,
    path = "/offers/{offer}/drafts/{draft_id}/sections",
    params(
        ("offer" = u32, Path, description = "The offer number."),
        ("draft_id" = String, Path, description = "The draft id.")
    ),
    responses(
        (status = 200, description = "Sections", body = SectionsResponse),
        (status = 404, description = "Unknown draft")
    )
)]
pub async fn list_sections_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((offer, draft_id)): Path<(u32, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = app_state
        .drafts
        .get(DraftScope::new(user_id, offer), &draft_id)
        .await
        .map_err(draft_error)?;

    let elements = missing::detect(&draft.content);
    let sections = draft
        .content
        .sections()
        .into_iter()
        .map(|(section, content)| SectionResponse {
            key: section.key().to_string(),
            title: section.title().to_string(),
            content,
            missing: missing::for_section(&elements, section)
                .into_iter()
                .map(MissingElementResponse::from)
                .collect(),
        })
        .collect();

    Ok(Json(SectionsResponse {
        draft_id: draft.id,
        sections,
    }))
}

/// Replace one section of a draft. Fails with 404 if the draft lacks its markers.
#[utoipa::path(
    put,
    path = "/offers/{offer}/drafts/{draft_id}/sections/{section}",
    request_body = UpdateSectionRequest,
    params(
        ("offer" = u32, Path, description = "The offer number."),
        ("draft_id" = String, Path, description = "The draft id."),
        ("section" = String, Path, description = "headline, problem, solution, benefits, testimonials, pricing, guarantee or cta.")
    ),
    responses(
        (status = 200, description = "Draft saved", body = DraftResponse),
        (status = 400, description = "Unknown section, or content carrying a section marker"),
        (status = 404, description = "Unknown draft or section markers missing")
    )
)]
pub async fn update_section_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((offer, draft_id, section)): Path<(u32, String, String)>,
    Json(req): Json<UpdateSectionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let section = parse_section(&section)?;
    let draft = app_state
        .drafts
        .save_section(DraftScope::new(user_id, offer), &draft_id, section, &req.content)
        .await
        .map_err(draft_error)?;
    Ok(Json(DraftResponse::from(draft)))
}

//=========================================================================================
// Export, Generation and Scoring Handlers
//=========================================================================================

/// Download a draft as `docx` (HTML for Word), `html`, or `text`.
#[utoipa::path(
    get,
    path = "/offers/{offer}/drafts/{draft_id}/export/{format}",
    params(
        ("offer" = u32, Path, description = "The offer number."),
        ("draft_id" = String, Path, description = "The draft id."),
        ("format" = String, Path, description = "docx, html or text.")
    ),
    responses(
        (status = 200, description = "The exported file; text exports also carry x-google-docs-url"),
        (status = 400, description = "Unsupported format"),
        (status = 404, description = "Unknown draft")
    )
)]
pub async fn export_draft_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((offer, draft_id, format)): Path<(u32, String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let format = format
        .parse::<ExportFormat>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let draft = app_state
        .drafts
        .get(DraftScope::new(user_id, offer), &draft_id)
        .await
        .map_err(draft_error)?;

    let file = export::export(&draft.content, &draft.name, format);
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(file.mime_type));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).map_err(|e| {
            error!("Invalid export file name {}: {:?}", file.file_name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to export draft".to_string(),
            )
        })?,
    );
    if format == ExportFormat::Text {
        headers.insert(
            HeaderName::from_static(GOOGLE_DOCS_URL_HEADER),
            HeaderValue::from_static(GOOGLE_DOCS_CREATE_URL),
        );
    }

    Ok((headers, file.body))
}

/// Generate a sales page into a new draft. The active draft does not change.
#[utoipa::path(
    post,
    path = "/offers/{offer}/generate",
    request_body = GenerateRequest,
    params(("offer" = u32, Path, description = "The offer number.")),
    responses(
        (status = 201, description = "New draft holding the generated page", body = DraftResponse),
        (status = 502, description = "The generation service failed; nothing was stored")
    )
)]
pub async fn generate_sales_page_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(offer): Path<u32>,
    Json(req): Json<GenerateRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let scope = DraftScope::new(user_id, offer);
    let sales_page_inputs = if req.sales_page_inputs.is_null() {
        app_state.autosave.flush(scope).await;
        app_state.drafts.load_inputs(scope).await.map_err(draft_error)?
    } else {
        req.sales_page_inputs
    };

    let request = SalesPageRequest {
        user_id,
        offer_number: offer,
        offer_type: req.offer_type,
        messaging_strategy: req.messaging_strategy,
        offer_outline: req.offer_outline,
        workbook_responses: req.workbook_responses,
        sales_page_inputs,
    };

    let draft = app_state
        .generator
        .generate(&request)
        .await
        .map_err(draft_error)?;
    info!(%scope, draft_id = %draft.id, "Generated sales page stored as '{}'", draft.name);
    Ok((StatusCode::CREATED, Json(DraftResponse::from(draft))))
}

/// Heuristic 0-100 readiness score.
#[utoipa::path(
    post,
    path = "/completeness",
    request_body = CompletenessRequest,
    responses((status = 200, description = "Score", body = CompletenessResponse))
)]
pub async fn completeness_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CompletenessRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let score = match req.offer_number {
        Some(offer) => {
            let active = app_state
                .drafts
                .active(DraftScope::new(user_id, offer))
                .await
                .map_err(draft_error)?;
            completeness::score_for(
                active.as_ref().map(|d| &d.content),
                &req.messaging_strategy,
                &req.offer_outline,
            )
        }
        None => completeness::score(&req.messaging_strategy, &req.offer_outline),
    };
    Ok(Json(CompletenessResponse { score }))
}
