pub mod cli;
pub mod infrastructure;
pub mod models;
pub mod storage;

pub use infrastructure::ReviewStoreError;
pub use models::ReviewRecord;
pub use storage::{ReviewFilter, ReviewRepository};
