use serde::{Deserialize, Serialize};

use crate::model::ids::LevelId;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win,
    Loss,
    TimeUp,
}

/// Terminal summary of one session, handed to the presentation layer.
///
/// The serialized form uses the camelCase field names the results screen reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub level_id: LevelId,
    pub level_title: String,
    pub score: u32,
    pub problems_attempted: u32,
    pub problems_correct: u32,
    pub time_taken_seconds: u64,
    pub is_win: bool,
}
