use quiz_core::model::GameResult;
use serde::Serialize;

use crate::error::ResultError;

/// Closing line shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Encouragement {
    Fantastic,
    KeepPracticing,
}

/// Results screen model derived from a `GameResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub result: GameResult,
    /// Rounded; 0 when nothing was attempted.
    pub accuracy_percent: u32,
    pub encouragement: Option<Encouragement>,
}

impl ResultView {
    #[must_use]
    pub fn new(result: GameResult) -> Self {
        let accuracy_percent = accuracy_percent(result.problems_correct, result.problems_attempted);
        let encouragement = if result.is_win && result.score > result.problems_attempted / 2 {
            Some(Encouragement::Fantastic)
        } else if result.is_win {
            None
        } else {
            Some(Encouragement::KeepPracticing)
        };
        Self {
            result,
            accuracy_percent,
            encouragement,
        }
    }
}

impl From<GameResult> for ResultView {
    fn from(result: GameResult) -> Self {
        Self::new(result)
    }
}

fn accuracy_percent(correct: u32, attempted: u32) -> u32 {
    if attempted == 0 {
        return 0;
    }
    let correct = u64::from(correct);
    let attempted = u64::from(attempted);
    let rounded = (correct * 200 + attempted) / (attempted * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// # Errors
///
/// Returns `ResultError::Json` if the result cannot be serialized.
pub fn encode_result(result: &GameResult) -> Result<String, ResultError> {
    Ok(serde_json::to_string(result)?)
}

/// # Errors
///
/// Returns `ResultError::Json` if the payload is not a valid result record.
pub fn decode_result(payload: &str) -> Result<GameResult, ResultError> {
    Ok(serde_json::from_str(payload)?)
}
