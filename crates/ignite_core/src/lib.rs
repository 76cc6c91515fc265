pub mod completeness;
pub mod debounce;
pub mod document;
pub mod domain;
pub mod drafts;
pub mod export;
pub mod generator;
pub mod missing;
pub mod ports;

pub use debounce::{DebounceSink, Debouncer};
pub use document::{Document, DocumentError, Section};
pub use domain::{Draft, DraftCollection, DraftScope, MissingElement, Priority, SalesPageRequest};
pub use drafts::{DraftError, DraftManager, DraftResult};
pub use generator::SalesPageGenerator;
pub use ports::{DraftRepository, PortError, PortResult, SalesPageGenerationService};
