//! crates/ignite_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::SalesPageRequest;
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// String key-value storage holding serialized draft collections and inputs.
///
/// Keys are produced by [`crate::domain::DraftScope`], so every value is
/// already namespaced by user and offer.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removes the key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait SalesPageGenerationService: Send + Sync {
    /// Produces a complete marker-delimited sales page for the request.
    async fn generate_sales_page(&self, request: &SalesPageRequest) -> PortResult<String>;
}
