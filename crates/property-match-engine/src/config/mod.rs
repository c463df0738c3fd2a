pub mod settings;

pub use settings::{EngineConfig, FieldMapping, IngestionConfig, LoggingConfig, Settings};
