use thiserror::Error;

/// Failure reported by a storage collaborator while shutting down.
#[derive(Debug, Error)]
#[error("storage close failed: {message}")]
pub struct StorageError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Persistent storage owned by the configuration for its lifetime, usually
/// the database pool. Opaque apart from shutdown.
pub trait StorageHandle: Send + Sync {
    fn close(&self) -> Result<(), StorageError>;
}
