pub mod config;
pub mod error;
pub mod logging;

pub use config::{AppConfig, ConfigManager, ConfigSource};
pub use error::ReviewStoreError;
pub use logging::{setup_logging, LoggingConfig};
