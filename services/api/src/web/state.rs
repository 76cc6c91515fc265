//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-offer autosave registry.

use crate::config::Config;
use futures::FutureExt;
use ignite_core::{
    debounce::{DebounceSink, Debouncer},
    domain::DraftScope,
    drafts::DraftManager,
    generator::SalesPageGenerator,
    ports::{DraftRepository, SalesPageGenerationService},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::error;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub drafts: Arc<DraftManager>,
    pub generator: Arc<SalesPageGenerator>,
    pub autosave: Arc<AutosaveRegistry>,
}

impl AppState {
    pub fn new(
        config: &Config,
        repository: Arc<dyn DraftRepository>,
        generation_service: Arc<dyn SalesPageGenerationService>,
    ) -> Self {
        let drafts = Arc::new(DraftManager::new(repository));
        let generator = Arc::new(SalesPageGenerator::new(generation_service, drafts.clone()));
        let autosave = Arc::new(AutosaveRegistry::new(config.autosave_delay, drafts.clone()));
        Self {
            drafts,
            generator,
            autosave,
        }
    }
}

//=========================================================================================
// AutosaveRegistry (One Debouncer per User and Offer)
//=========================================================================================

/// Debounced writers for the free-form sales page inputs.
pub struct AutosaveRegistry {
    delay: Duration,
    drafts: Arc<DraftManager>,
    debouncers: Mutex<HashMap<DraftScope, Arc<Debouncer<Value>>>>,
}

impl AutosaveRegistry {
    pub fn new(delay: Duration, drafts: Arc<DraftManager>) -> Self {
        Self {
            delay,
            drafts,
            debouncers: Mutex::new(HashMap::new()),
        }
    }

    /// Queues `inputs` to be written once typing settles.
    ///
    /// The registry lock is held through the push so an entry is never evicted
    /// between being looked up and receiving its value.
    pub async fn push(&self, scope: DraftScope, inputs: Value) {
        let mut debouncers = self.debouncers.lock().await;
        debouncers.retain(|other, debouncer| *other == scope || !debouncer.is_idle());
        let debouncer = self.debouncer(&mut debouncers, scope);
        debouncer.push(inputs).await;
    }

    /// Writes any queued inputs for the scope immediately, then forgets the
    /// scope if nothing new arrived meanwhile.
    pub async fn flush(&self, scope: DraftScope) {
        let debouncer = self.debouncers.lock().await.get(&scope).cloned();
        let Some(debouncer) = debouncer else {
            return;
        };
        debouncer.flush().await;

        let mut debouncers = self.debouncers.lock().await;
        if let Some(current) = debouncers.get(&scope) {
            if Arc::ptr_eq(current, &debouncer) && current.is_idle() {
                debouncers.remove(&scope);
            }
        }
    }

    fn debouncer(
        &self,
        debouncers: &mut HashMap<DraftScope, Arc<Debouncer<Value>>>,
        scope: DraftScope,
    ) -> Arc<Debouncer<Value>> {
        debouncers
            .entry(scope)
            .or_insert_with(|| {
                let drafts = self.drafts.clone();
                let sink: DebounceSink<Value> = Arc::new(move |inputs: Value| {
                    let drafts = drafts.clone();
                    async move {
                        if let Err(e) = drafts.save_inputs(scope, &inputs).await {
                            error!(%scope, "Failed to autosave sales page inputs: {:?}", e);
                        }
                    }
                    .boxed()
                });
                Arc::new(Debouncer::new(self.delay, sink))
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;
    use serde_json::json;
    use uuid::Uuid;

    fn registry() -> (AutosaveRegistry, Arc<DraftManager>) {
        let drafts = Arc::new(DraftManager::new(Arc::new(InMemoryRepository::new())));
        (
            AutosaveRegistry::new(Duration::from_millis(800), drafts.clone()),
            drafts,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_and_forgets_the_scope() {
        let (registry, drafts) = registry();
        let scope = DraftScope::new(Uuid::new_v4(), 1);

        registry.push(scope, json!({ "headline": "Launch" })).await;
        assert_eq!(registry.debouncers.lock().await.len(), 1);

        registry.flush(scope).await;
        assert!(registry.debouncers.lock().await.is_empty());
        assert_eq!(
            drafts.load_inputs(scope).await.unwrap(),
            json!({ "headline": "Launch" })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn settled_scopes_are_evicted_on_the_next_push() {
        let (registry, drafts) = registry();
        let user = Uuid::new_v4();
        let first = DraftScope::new(user, 1);
        let second = DraftScope::new(user, 2);

        registry.push(first, json!({ "offer": 1 })).await;
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(drafts.load_inputs(first).await.unwrap(), json!({ "offer": 1 }));

        registry.push(second, json!({ "offer": 2 })).await;
        let debouncers = registry.debouncers.lock().await;
        assert_eq!(debouncers.len(), 1);
        assert!(debouncers.contains_key(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_scopes_survive_other_pushes() {
        let (registry, _drafts) = registry();
        let user = Uuid::new_v4();

        registry.push(DraftScope::new(user, 1), json!({})).await;
        registry.push(DraftScope::new(user, 2), json!({})).await;
        assert_eq!(registry.debouncers.lock().await.len(), 2);
    }
}
