//! crates/ignite_core/src/drafts.rs
//!
//! The draft store: versioned sales page snapshots for one user and offer.
//!
//! `DraftCollection` carries the pure, in-memory rules. `DraftManager` wraps
//! them with persistence through a `DraftRepository` and serializes every
//! read-modify-write behind one async mutex, so the collection has a single
//! writer even on a multi-threaded runtime.

use crate::document::{Document, DocumentError, Section};
use crate::domain::{Draft, DraftCollection, DraftScope};
use crate::ports::{DraftRepository, PortError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("Draft {0} not found")]
    DraftNotFound(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Port(#[from] PortError),
    #[error("Sales page generation failed: {0}")]
    Generation(PortError),
    #[error("Failed to serialize drafts: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type DraftResult<T> = Result<T, DraftError>;

//=========================================================================================
// DraftCollection rules
//=========================================================================================

/// Accepts both the current `{drafts, currentDraftId}` layout and a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCollection {
    Current(DraftCollection),
    Bare(Vec<Draft>),
}

impl DraftCollection {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str::<StoredCollection>(raw)? {
            StoredCollection::Current(collection) => collection,
            StoredCollection::Bare(drafts) => DraftCollection {
                drafts,
                current_draft_id: None,
            },
        })
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn get(&self, draft_id: &str) -> Option<&Draft> {
        self.drafts.iter().find(|d| d.id == draft_id)
    }

    fn position(&self, draft_id: &str) -> Option<usize> {
        self.drafts.iter().position(|d| d.id == draft_id)
    }

    pub fn active(&self) -> Option<&Draft> {
        self.current_draft_id.as_deref().and_then(|id| self.get(id))
    }

    /// The draft with the greatest `last_modified`; the earliest one wins ties.
    pub fn most_recent(&self) -> Option<&Draft> {
        self.drafts.iter().fold(None, |best: Option<&Draft>, draft| match best {
            Some(b) if b.last_modified >= draft.last_modified => Some(b),
            _ => Some(draft),
        })
    }

    /// Picks the displayed draft after loading.
    ///
    /// With no active draft recorded, the most recently modified one is shown.
    /// A recorded id that no longer exists falls back to the first draft.
    pub fn bootstrap_active(&mut self) {
        self.current_draft_id = match self.current_draft_id.take() {
            Some(id) if self.get(&id).is_some() => Some(id),
            Some(_) => self.drafts.first().map(|d| d.id.clone()),
            None => self.most_recent().map(|d| d.id.clone()),
        };
    }

    /// Millisecond timestamp id, bumped past any existing numeric id.
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let newest = self
            .drafts
            .iter()
            .filter_map(|d| d.id.parse::<i64>().ok())
            .max()
            .unwrap_or(i64::MIN);
        now.timestamp_millis().max(newest.saturating_add(1)).to_string()
    }

    /// Appends a new draft. It only becomes active when nothing else is.
    pub fn create(&mut self, offer_number: u32, content: Document, now: DateTime<Utc>) -> Draft {
        let draft = Draft {
            id: self.next_id(now),
            name: format!("Offer {} - Draft {}", offer_number, self.drafts.len() + 1),
            content,
            created_at: now,
            last_modified: now,
        };
        if self.active().is_none() {
            self.current_draft_id = Some(draft.id.clone());
        }
        self.drafts.push(draft.clone());
        draft
    }

    /// Returns false, changing nothing, when the id is unknown.
    pub fn switch_active(&mut self, draft_id: &str) -> bool {
        if self.get(draft_id).is_none() {
            return false;
        }
        self.current_draft_id = Some(draft_id.to_string());
        true
    }

    pub fn save(
        &mut self,
        draft_id: &str,
        content: Document,
        now: DateTime<Utc>,
    ) -> DraftResult<Draft> {
        let draft = self
            .drafts
            .iter_mut()
            .find(|d| d.id == draft_id)
            .ok_or_else(|| DraftError::DraftNotFound(draft_id.to_string()))?;
        draft.content = content;
        draft.last_modified = now;
        Ok(draft.clone())
    }

    pub fn rename(&mut self, draft_id: &str, name: &str) -> DraftResult<Draft> {
        let index = self
            .position(draft_id)
            .ok_or_else(|| DraftError::DraftNotFound(draft_id.to_string()))?;
        let trimmed = name.trim();
        let draft = &mut self.drafts[index];
        draft.name = if trimmed.is_empty() {
            format!("Draft {}", index + 1)
        } else {
            trimmed.to_string()
        };
        Ok(draft.clone())
    }

    /// Removes the draft, moving the active marker to the first remaining one
    /// (by stored order) when the active draft was removed.
    pub fn delete(&mut self, draft_id: &str) -> Option<Draft> {
        let index = self.position(draft_id)?;
        let removed = self.drafts.remove(index);
        if self.current_draft_id.as_deref() == Some(draft_id) {
            self.current_draft_id = self.drafts.first().map(|d| d.id.clone());
        }
        Some(removed)
    }
}

//=========================================================================================
// DraftManager (persisted, single writer)
//=========================================================================================

pub struct DraftManager {
    repository: Arc<dyn DraftRepository>,
    write_lock: Mutex<()>,
}

impl DraftManager {
    pub fn new(repository: Arc<dyn DraftRepository>) -> Self {
        Self {
            repository,
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the collection for `scope`, migrating the legacy single document
    /// on first use and choosing the active draft.
    pub async fn load(&self, scope: DraftScope) -> DraftResult<DraftCollection> {
        let _guard = self.write_lock.lock().await;
        self.load_unlocked(scope).await
    }

    pub async fn active(&self, scope: DraftScope) -> DraftResult<Option<Draft>> {
        Ok(self.load(scope).await?.active().cloned())
    }

    pub async fn get(&self, scope: DraftScope, draft_id: &str) -> DraftResult<Draft> {
        self.load(scope)
            .await?
            .get(draft_id)
            .cloned()
            .ok_or_else(|| DraftError::DraftNotFound(draft_id.to_string()))
    }

    pub async fn create(&self, scope: DraftScope, content: Document) -> DraftResult<Draft> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load_unlocked(scope).await?;
        let draft = collection.create(scope.offer_number, content, Utc::now());
        self.persist(scope, &collection).await?;
        info!(%scope, draft_id = %draft.id, "Created draft '{}'", draft.name);
        Ok(draft)
    }

    /// Unknown ids are ignored and return the collection unchanged.
    pub async fn switch_active(
        &self,
        scope: DraftScope,
        draft_id: &str,
    ) -> DraftResult<DraftCollection> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load_unlocked(scope).await?;
        if collection.switch_active(draft_id) {
            self.persist(scope, &collection).await?;
        }
        Ok(collection)
    }

    pub async fn save(
        &self,
        scope: DraftScope,
        draft_id: &str,
        content: Document,
    ) -> DraftResult<Draft> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load_unlocked(scope).await?;
        let draft = collection.save(draft_id, content, Utc::now())?;
        self.persist(scope, &collection).await?;
        Ok(draft)
    }

    /// Rewrites one section of a draft and saves it.
    pub async fn save_section(
        &self,
        scope: DraftScope,
        draft_id: &str,
        section: Section,
        content: &str,
    ) -> DraftResult<Draft> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load_unlocked(scope).await?;
        let current = collection
            .get(draft_id)
            .ok_or_else(|| DraftError::DraftNotFound(draft_id.to_string()))?;
        let updated = current.content.replace_section(section, content)?;
        let draft = collection.save(draft_id, updated, Utc::now())?;
        self.persist(scope, &collection).await?;
        Ok(draft)
    }

    pub async fn rename(
        &self,
        scope: DraftScope,
        draft_id: &str,
        name: &str,
    ) -> DraftResult<Draft> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load_unlocked(scope).await?;
        let draft = collection.rename(draft_id, name)?;
        self.persist(scope, &collection).await?;
        Ok(draft)
    }

    /// Unknown ids are ignored and return the collection unchanged.
    pub async fn delete(&self, scope: DraftScope, draft_id: &str) -> DraftResult<DraftCollection> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load_unlocked(scope).await?;
        if let Some(removed) = collection.delete(draft_id) {
            self.persist(scope, &collection).await?;
            info!(%scope, draft_id = %removed.id, "Deleted draft '{}'", removed.name);
        }
        Ok(collection)
    }

    /// Free-form sales page inputs. Corrupt or missing data reads as `{}`.
    pub async fn load_inputs(&self, scope: DraftScope) -> DraftResult<Value> {
        let raw = self.repository.get(&scope.inputs_key()).await?;
        let Some(raw) = raw else {
            return Ok(Value::Object(Map::new()));
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(_) | Err(_) => {
                warn!(%scope, "Stored sales page inputs are unreadable; starting empty.");
                Ok(Value::Object(Map::new()))
            }
        }
    }

    pub async fn save_inputs(&self, scope: DraftScope, inputs: &Value) -> DraftResult<()> {
        let raw = serde_json::to_string(inputs)?;
        self.repository.put(&scope.inputs_key(), &raw).await?;
        Ok(())
    }

    async fn load_unlocked(&self, scope: DraftScope) -> DraftResult<DraftCollection> {
        let mut collection = match self.repository.get(&scope.drafts_key()).await? {
            Some(raw) => DraftCollection::parse(&raw).unwrap_or_else(|e| {
                warn!(%scope, "Stored drafts are corrupt, starting empty: {}", e);
                DraftCollection::default()
            }),
            None => DraftCollection::default(),
        };

        // The legacy document predates numbered offers and belongs to the first one.
        if collection.is_empty() && scope.offer_number == 1 {
            let legacy_key = scope.legacy_document_key();
            if let Some(legacy) = self.repository.get(&legacy_key).await? {
                if !legacy.trim().is_empty() {
                    collection.create(scope.offer_number, Document::new(legacy), Utc::now());
                    self.persist(scope, &collection).await?;
                    info!(%scope, "Migrated legacy sales page into a draft.");
                }
                self.repository.delete(&legacy_key).await?;
            }
        }

        collection.bootstrap_active();
        Ok(collection)
    }

    async fn persist(&self, scope: DraftScope, collection: &DraftCollection) -> DraftResult<()> {
        let raw = serde_json::to_string(collection)?;
        self.repository.put(&scope.drafts_key(), &raw).await?;
        Ok(())
    }
}
