use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No thread selected: pass a thread id or call set_thread first")]
    NoThreadSelected,

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Reply composer error: {0}")]
    Composer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}
