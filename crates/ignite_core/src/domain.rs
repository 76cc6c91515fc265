//! crates/ignite_core/src/domain.rs
//!
//! Defines the core data structures for sales page drafting.
//! Serde derives describe the persisted layout; nothing here performs I/O.

use crate::document::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// The owner of a draft collection: one user working on one numbered offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftScope {
    pub user_id: Uuid,
    pub offer_number: u32,
}

impl DraftScope {
    pub fn new(user_id: Uuid, offer_number: u32) -> Self {
        Self {
            user_id,
            offer_number,
        }
    }

    pub fn drafts_key(&self) -> String {
        format!("salesPageDrafts_{}_offer{}", self.user_id, self.offer_number)
    }

    pub fn inputs_key(&self) -> String {
        format!("salesPageInputs_{}_offer{}", self.user_id, self.offer_number)
    }

    /// The single-document key written before drafts existed. Not offer-scoped.
    pub fn legacy_document_key(&self) -> String {
        format!("generatedSalesPage_{}", self.user_id)
    }
}

impl fmt::Display for DraftScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/offer{}", self.user_id, self.offer_number)
    }
}

/// A named, timestamped snapshot of a sales page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub name: String,
    pub content: Document,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Insertion-ordered drafts for one scope, plus the one being displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftCollection {
    pub drafts: Vec<Draft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_draft_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Advisory note about something a sales page still lacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingElement {
    pub section: String,
    pub field: String,
    pub description: String,
    pub priority: Priority,
    pub suggestions: Vec<String>,
}

/// Everything the generation service receives for one sales page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPageRequest {
    pub user_id: Uuid,
    pub offer_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<String>,
    #[serde(default)]
    pub messaging_strategy: Value,
    #[serde(default)]
    pub offer_outline: Value,
    #[serde(default)]
    pub workbook_responses: Value,
    #[serde(default)]
    pub sales_page_inputs: Value,
}

impl SalesPageRequest {
    pub fn scope(&self) -> DraftScope {
        DraftScope::new(self.user_id, self.offer_number)
    }
}
