use thiserror::Error;

use crate::model::ids::LevelId;
use crate::model::operator::Operator;

/// Upper bound on `problem_count`; standard levels generate every problem at start.
pub const MAX_PROBLEM_COUNT: u32 = 1_000;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level id cannot be empty")]
    EmptyId,

    #[error("level title cannot be empty")]
    EmptyTitle,

    #[error("level must allow at least one operator")]
    NoOperators,

    #[error("number range must satisfy 1 <= min <= max, got [{min}, {max}]")]
    InvalidRange { min: u32, max: u32 },

    #[error("problem count must be between 1 and {}", MAX_PROBLEM_COUNT)]
    InvalidProblemCount,

    #[error("difficulty must be between 1 and 5, got {0}")]
    InvalidDifficulty(u8),

    #[error("time limit must be > 0 seconds when set")]
    InvalidTimeLimit,

    #[error("time per question must be > 0 seconds when set")]
    InvalidTimePerQuestion,
}

//
// ─── NUMBER RANGE ──────────────────────────────────────────────────────────────
//

/// Inclusive operand range declared by a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRange {
    min: u32,
    max: u32,
}

impl NumberRange {
    /// # Errors
    ///
    /// Returns `LevelError::InvalidRange` unless `1 <= min <= max`.
    pub fn new(min: u32, max: u32) -> Result<Self, LevelError> {
        if min == 0 || min > max {
            return Err(LevelError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated level definition, as read from a catalog.
#[derive(Debug, Clone)]
pub struct LevelDraft {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: u8,
    pub operators: Vec<Operator>,
    pub number_range: (u32, u32),
    pub problem_count: u32,
    pub time_limit_secs: Option<u32>,
    pub time_per_question_secs: Option<u32>,
    pub reward_message: Option<String>,
    pub is_speed_challenge: bool,
    pub requires_premium: bool,
}

impl LevelDraft {
    /// Untimed, single-star addition draft over `[1, 10]` with ten problems.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            difficulty: 1,
            operators: vec![Operator::Add],
            number_range: (1, 10),
            problem_count: 10,
            time_limit_secs: None,
            time_per_question_secs: None,
            reward_message: None,
            is_speed_challenge: false,
            requires_premium: false,
        }
    }

    /// Validate and normalize the draft into an immutable `LevelSpec`.
    ///
    /// # Errors
    ///
    /// Returns the first `LevelError` the draft violates.
    pub fn validate(self) -> Result<LevelSpec, LevelError> {
        let id = LevelId::new(self.id).map_err(|_| LevelError::EmptyId)?;
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(LevelError::EmptyTitle);
        }

        let mut operators = Vec::with_capacity(self.operators.len());
        for op in self.operators {
            if !operators.contains(&op) {
                operators.push(op);
            }
        }
        if operators.is_empty() {
            return Err(LevelError::NoOperators);
        }

        let (min, max) = self.number_range;
        let number_range = NumberRange::new(min, max)?;

        if !(1..=MAX_PROBLEM_COUNT).contains(&self.problem_count) {
            return Err(LevelError::InvalidProblemCount);
        }
        if !(1..=5).contains(&self.difficulty) {
            return Err(LevelError::InvalidDifficulty(self.difficulty));
        }
        if self.time_limit_secs == Some(0) {
            return Err(LevelError::InvalidTimeLimit);
        }
        if self.time_per_question_secs == Some(0) {
            return Err(LevelError::InvalidTimePerQuestion);
        }

        Ok(LevelSpec {
            id,
            title,
            description: normalize_optional(self.description),
            difficulty: self.difficulty,
            operators,
            number_range,
            problem_count: self.problem_count,
            time_limit_secs: self.time_limit_secs,
            time_per_question_secs: self.time_per_question_secs,
            reward_message: normalize_optional(self.reward_message),
            is_speed_challenge: self.is_speed_challenge,
            requires_premium: self.requires_premium,
        })
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Immutable description of one quiz level.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct LevelSpec {
    id: LevelId,
    title: String,
    description: Option<String>,
    difficulty: u8,
    operators: Vec<Operator>,
    number_range: NumberRange,
    problem_count: u32,
    time_limit_secs: Option<u32>,
    time_per_question_secs: Option<u32>,
    reward_message: Option<String>,
    is_speed_challenge: bool,
    requires_premium: bool,
}

impl LevelSpec {
    // Accessors
    #[must_use]
    pub fn id(&self) -> &LevelId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Star rating 1..=5; also selects the multiply and divide operand caps.
    #[must_use]
    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    /// Allowed operators, deduplicated and never empty.
    #[must_use]
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    #[must_use]
    pub fn number_range(&self) -> NumberRange {
        self.number_range
    }

    #[must_use]
    pub fn problem_count(&self) -> u32 {
        self.problem_count
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u32> {
        self.time_limit_secs
    }

    #[must_use]
    pub fn time_per_question_secs(&self) -> Option<u32> {
        self.time_per_question_secs
    }

    #[must_use]
    pub fn reward_message(&self) -> Option<&str> {
        self.reward_message.as_deref()
    }

    #[must_use]
    pub fn is_speed_challenge(&self) -> bool {
        self.is_speed_challenge
    }

    #[must_use]
    pub fn requires_premium(&self) -> bool {
        self.requires_premium
    }

    /// Index of the final problem in a session of this level.
    #[must_use]
    pub fn last_index(&self) -> usize {
        usize::try_from(self.problem_count)
            .unwrap_or(usize::MAX)
            .saturating_sub(1)
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
