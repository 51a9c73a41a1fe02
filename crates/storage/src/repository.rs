use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),
}

/// Repository contract for the premium entitlement flag.
#[async_trait]
pub trait PremiumRepository: Send + Sync {
    /// Read the stored flag. `None` means it was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn load_premium(&self) -> Result<Option<bool>, StorageError>;

    /// Persist the flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    async fn save_premium(&self, value: bool) -> Result<(), StorageError>;
}

/// Process-local premium flag, lost when the process exits.
#[derive(Clone, Default)]
pub struct InMemoryPremiumRepository {
    value: Arc<Mutex<Option<bool>>>,
}

impl InMemoryPremiumRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(value: bool) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(value))),
        }
    }
}

#[async_trait]
impl PremiumRepository for InMemoryPremiumRepository {
    async fn load_premium(&self) -> Result<Option<bool>, StorageError> {
        let guard = self
            .value
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(*guard)
    }

    async fn save_premium(&self, value: bool) -> Result<(), StorageError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(value);
        Ok(())
    }
}
