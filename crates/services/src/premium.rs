use std::sync::Arc;

use storage::{InMemoryPremiumRepository, PremiumRepository};
use tokio::sync::watch;

use crate::error::PremiumError;

/// Premium entitlement as seen by a session, including the not-yet-loaded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumStatus {
    Loading,
    Resolved(bool),
}

impl PremiumStatus {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, PremiumStatus::Resolved(_))
    }

    /// `None` while loading.
    #[must_use]
    pub fn is_premium(&self) -> Option<bool> {
        match self {
            PremiumStatus::Loading => None,
            PremiumStatus::Resolved(value) => Some(*value),
        }
    }
}

/// Read side of the premium flag consumed by the session driver.
pub trait PremiumProvider: Send + Sync {
    fn status(&self) -> PremiumStatus;
}

impl PremiumProvider for PremiumStatus {
    fn status(&self) -> PremiumStatus {
        *self
    }
}

/// Owns the premium flag: loads it once, publishes changes, and lets
/// callers wait until it is known.
pub struct PremiumGate {
    repo: Arc<dyn PremiumRepository>,
    status: watch::Sender<PremiumStatus>,
}

impl PremiumGate {
    #[must_use]
    pub fn new(repo: Arc<dyn PremiumRepository>) -> Self {
        let (status, _) = watch::channel(PremiumStatus::Loading);
        Self { repo, status }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryPremiumRepository::new()))
    }

    /// Read the persisted flag and resolve the gate.
    ///
    /// A missing flag, or one that cannot be read, resolves to `false`.
    pub async fn load(&self) -> bool {
        let value = match self.repo.load_premium().await {
            Ok(value) => value.unwrap_or(false),
            Err(err) => {
                tracing::warn!(error = %err, "could not read premium flag, treating as not premium");
                false
            }
        };
        self.status.send_replace(PremiumStatus::Resolved(value));
        tracing::debug!(premium = value, "premium flag resolved");
        value
    }

    /// Current flag, or `None` until `load` (or `set`) has completed.
    #[must_use]
    pub fn get(&self) -> Option<bool> {
        self.status.borrow().is_premium()
    }

    /// Persist a new flag and publish it. The published value is unchanged on failure.
    ///
    /// # Errors
    ///
    /// Returns `PremiumError::Storage` if the flag cannot be saved.
    pub async fn set(&self, value: bool) -> Result<(), PremiumError> {
        self.repo.save_premium(value).await?;
        self.status.send_replace(PremiumStatus::Resolved(value));
        tracing::info!(premium = value, "premium flag updated");
        Ok(())
    }

    /// Wait until the flag is resolved and return it.
    pub async fn wait_resolved(&self) -> bool {
        let mut rx = self.status.subscribe();
        match rx.wait_for(PremiumStatus::is_resolved).await {
            Ok(status) => status.is_premium().unwrap_or(false),
            Err(_) => false,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PremiumStatus> {
        self.status.subscribe()
    }
}

impl PremiumProvider for PremiumGate {
    fn status(&self) -> PremiumStatus {
        *self.status.borrow()
    }
}
