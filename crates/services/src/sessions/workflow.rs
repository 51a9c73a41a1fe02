use std::sync::Arc;

use quiz_core::model::{LevelId, LevelSpec};
use storage::LevelCatalog;

use super::driver::SessionDriver;
use super::events::NotificationSink;
use super::runner::{SessionHandle, SessionRunner};
use crate::Clock;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::premium::PremiumGate;

/// Orchestrates session start against the level catalog and the premium gate.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    catalog: Arc<LevelCatalog>,
    premium: Arc<PremiumGate>,
    config: SessionConfig,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<LevelCatalog>, premium: Arc<PremiumGate>) -> Self {
        Self {
            clock,
            catalog,
            premium,
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Start a driver for the given level without waiting on the premium flag.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownLevel` if the id is not in the catalog,
    /// `SessionError::PremiumPending` if the level is gated and the flag is still
    /// loading, or `SessionError::Locked` if the player is not premium.
    pub fn start_session(&self, level_id: &LevelId) -> Result<SessionDriver, SessionError> {
        let level = self.lookup(level_id)?;
        SessionDriver::start(level, self.premium.as_ref(), &self.config, self.clock.now())
    }

    /// Like `start_session`, but waits for the premium flag to load first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownLevel` or `SessionError::Locked`.
    pub async fn start_when_ready(&self, level_id: &LevelId) -> Result<SessionDriver, SessionError> {
        let level = self.lookup(level_id)?;
        if level.requires_premium() {
            self.premium.wait_resolved().await;
        }
        SessionDriver::start(level, self.premium.as_ref(), &self.config, self.clock.now())
    }

    /// Start a session on a background task that runs the timers and the
    /// feedback delay, reporting to `sink`.
    ///
    /// # Errors
    ///
    /// See [`SessionLoopService::start_when_ready`].
    pub async fn spawn_session(
        &self,
        level_id: &LevelId,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<SessionHandle, SessionError> {
        let driver = self.start_when_ready(level_id).await?;
        Ok(SessionRunner::spawn(
            driver,
            self.clock,
            self.config.clone(),
            sink,
        ))
    }

    fn lookup(&self, level_id: &LevelId) -> Result<LevelSpec, SessionError> {
        self.catalog.get(level_id).cloned().ok_or_else(|| {
            tracing::warn!(level_id = %level_id, "start requested for unknown level");
            SessionError::UnknownLevel(level_id.clone())
        })
    }
}
