use std::sync::Arc;

use quiz_core::model::{LevelId, LevelSpec};
use serde::Serialize;
use storage::LevelCatalog;

use crate::premium::{PremiumGate, PremiumProvider, PremiumStatus};

/// Badge shown on a level card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelBadge {
    SpeedChallenge,
    Timed,
    Standard,
}

/// Presentation-agnostic entry of the level picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelListItem {
    pub id: LevelId,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: u8,
    pub badge: LevelBadge,
    /// Gated and the player is not premium. Loading counts as locked.
    pub locked: bool,
    pub problem_count: u32,
    /// Overall time limit rounded up to whole minutes.
    pub time_limit_minutes: Option<u32>,
    pub operator_symbols: Vec<char>,
}

impl LevelListItem {
    #[must_use]
    pub fn from_level(level: &LevelSpec, premium: PremiumStatus) -> Self {
        let badge = if level.is_speed_challenge() {
            LevelBadge::SpeedChallenge
        } else if level.time_limit_secs().is_some() {
            LevelBadge::Timed
        } else {
            LevelBadge::Standard
        };
        Self {
            id: level.id().clone(),
            title: level.title().to_owned(),
            description: level.description().map(str::to_owned),
            difficulty: level.difficulty(),
            badge,
            locked: level.requires_premium() && premium.is_premium() != Some(true),
            problem_count: level.problem_count(),
            time_limit_minutes: level.time_limit_secs().map(|secs| secs.div_ceil(60)),
            operator_symbols: level.operators().iter().map(|op| op.symbol()).collect(),
        }
    }
}

/// Level picker facade over the catalog and the premium gate.
#[derive(Clone)]
pub struct LevelListService {
    catalog: Arc<LevelCatalog>,
    premium: Arc<PremiumGate>,
}

impl LevelListService {
    #[must_use]
    pub fn new(catalog: Arc<LevelCatalog>, premium: Arc<PremiumGate>) -> Self {
        Self { catalog, premium }
    }

    /// Catalog order, locked flags from the current premium status.
    #[must_use]
    pub fn list_levels(&self) -> Vec<LevelListItem> {
        let premium = self.premium.status();
        self.catalog
            .levels()
            .iter()
            .map(|level| LevelListItem::from_level(level, premium))
            .collect()
    }

    #[must_use]
    pub fn level(&self, id: &LevelId) -> Option<LevelListItem> {
        self.catalog
            .get(id)
            .map(|level| LevelListItem::from_level(level, self.premium.status()))
    }
}
