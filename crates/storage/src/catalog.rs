use quiz_core::model::{LevelDraft, LevelError, LevelId, LevelSpec, Operator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUILTIN_LEVELS: &str = include_str!("levels.json");

/// Errors raised while loading a level catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("level `{id}` is invalid: {source}")]
    InvalidLevel {
        id: String,
        #[source]
        source: LevelError,
    },

    #[error("duplicate level id `{0}`")]
    DuplicateId(LevelId),
}

/// Persisted shape of a level in catalog JSON.
///
/// Field names follow the catalog files (`numberRange`, `problemCount`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    pub operators: Vec<Operator>,
    pub number_range: (u32, u32),
    pub problem_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_per_question_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_message: Option<String>,
    #[serde(default)]
    pub is_speed_challenge: bool,
    #[serde(default)]
    pub requires_premium: bool,
}

fn default_difficulty() -> u8 {
    1
}

impl LevelRecord {
    #[must_use]
    pub fn from_level(level: &LevelSpec) -> Self {
        let range = level.number_range();
        Self {
            id: level.id().to_string(),
            title: level.title().to_owned(),
            description: level.description().map(str::to_owned),
            difficulty: level.difficulty(),
            operators: level.operators().to_vec(),
            number_range: (range.min(), range.max()),
            problem_count: level.problem_count(),
            time_limit_seconds: level.time_limit_secs(),
            time_per_question_seconds: level.time_per_question_secs(),
            reward_message: level.reward_message().map(str::to_owned),
            is_speed_challenge: level.is_speed_challenge(),
            requires_premium: level.requires_premium(),
        }
    }

    /// Convert the record into a validated `LevelSpec`.
    ///
    /// # Errors
    ///
    /// Returns `LevelError` if the record violates level invariants.
    pub fn into_level(self) -> Result<LevelSpec, LevelError> {
        LevelDraft {
            id: self.id,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            operators: self.operators,
            number_range: self.number_range,
            problem_count: self.problem_count,
            time_limit_secs: self.time_limit_seconds,
            time_per_question_secs: self.time_per_question_seconds,
            reward_message: self.reward_message,
            is_speed_challenge: self.is_speed_challenge,
            requires_premium: self.requires_premium,
        }
        .validate()
    }
}

/// Ordered, read-only list of levels, looked up by id.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCatalog {
    levels: Vec<LevelSpec>,
}

impl LevelCatalog {
    /// The levels shipped with the quiz.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog fails to parse (covered by tests).
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_LEVELS).expect("built-in level catalog should be valid")
    }

    /// Parse a catalog from a JSON array of level records.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on malformed JSON, an invalid level, or a repeated id.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<LevelRecord> = serde_json::from_str(json)?;
        let mut levels = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id.clone();
            let level = record
                .into_level()
                .map_err(|source| CatalogError::InvalidLevel { id, source })?;
            levels.push(level);
        }
        Self::from_levels(levels)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two levels share an id.
    pub fn from_levels(levels: Vec<LevelSpec>) -> Result<Self, CatalogError> {
        for (i, level) in levels.iter().enumerate() {
            if levels[..i].iter().any(|other| other.id() == level.id()) {
                return Err(CatalogError::DuplicateId(level.id().clone()));
            }
        }
        Ok(Self { levels })
    }

    #[must_use]
    pub fn levels(&self) -> &[LevelSpec] {
        &self.levels
    }

    #[must_use]
    pub fn get(&self, id: &LevelId) -> Option<&LevelSpec> {
        self.levels.iter().find(|level| level.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Serialize the catalog back into its JSON record form.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let records: Vec<LevelRecord> = self.levels.iter().map(LevelRecord::from_level).collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }
}
