//! crates/ignite_core/src/generator.rs
//!
//! Orchestrates sales page generation: call the generation service, then file
//! the result as a brand-new draft.
//!
//! A new draft never takes over the display while another draft is active;
//! the user switches to it explicitly. The draft store lock is not held while
//! the service runs, so overlapping generations each land as their own draft.

use crate::document::Document;
use crate::domain::{Draft, SalesPageRequest};
use crate::drafts::{DraftError, DraftManager, DraftResult};
use crate::ports::SalesPageGenerationService;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

pub struct SalesPageGenerator {
    service: Arc<dyn SalesPageGenerationService>,
    drafts: Arc<DraftManager>,
}

impl SalesPageGenerator {
    pub fn new(service: Arc<dyn SalesPageGenerationService>, drafts: Arc<DraftManager>) -> Self {
        Self { service, drafts }
    }

    pub async fn generate(&self, request: &SalesPageRequest) -> DraftResult<Draft> {
        let scope = request.scope();
        let started = Instant::now();
        info!(%scope, "Sales page generation started.");

        let content = self
            .service
            .generate_sales_page(request)
            .await
            .map_err(|e| {
                error!(%scope, "Sales page generation failed: {}", e);
                DraftError::Generation(e)
            })?;

        let draft = self.drafts.create(scope, Document::new(content)).await?;
        info!(
            %scope,
            draft_id = %draft.id,
            "Sales page generated in {:?}.",
            started.elapsed()
        );
        Ok(draft)
    }
}
