pub mod document;
pub mod id;
pub mod manager;
pub mod models;
pub mod providers;

pub use document::{from_document, to_document};
pub use id::IdStrategy;
pub use manager::ReviewRepository;
pub use models::{ReviewFilter, SortOrder};
pub use providers::{ReviewStore, StorageConfig, StorageType};
