use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Correct,
    Incorrect,
    Info,
}

/// Message shown to the player after an answer, a timeout, or the end of a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

pub const DEFAULT_COMPLETION_MESSAGE: &str = "You completed the level!";

impl Feedback {
    #[must_use]
    pub fn new(kind: FeedbackKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn correct() -> Self {
        Self::new(FeedbackKind::Correct, "Correct! Great job!")
    }

    #[must_use]
    pub fn incorrect(answer: i64) -> Self {
        Self::new(
            FeedbackKind::Incorrect,
            format!("Not quite! The answer was {answer}."),
        )
    }

    #[must_use]
    pub fn question_timed_out(answer: i64) -> Self {
        Self::new(
            FeedbackKind::Incorrect,
            format!("Time's up! The answer was {answer}."),
        )
    }

    #[must_use]
    pub fn not_a_number() -> Self {
        Self::new(FeedbackKind::Info, "Please enter a number.")
    }

    #[must_use]
    pub fn time_up() -> Self {
        Self::new(FeedbackKind::Info, "Time's up!")
    }

    #[must_use]
    pub fn out_of_lives() -> Self {
        Self::new(FeedbackKind::Info, "Game Over! Better luck next time.")
    }

    #[must_use]
    pub fn out_of_questions() -> Self {
        Self::new(
            FeedbackKind::Info,
            "Game Over! You ran out of questions or made a mistake on the last one.",
        )
    }

    /// Win message: the level's reward message, or a generic completion line.
    #[must_use]
    pub fn level_complete(reward_message: Option<&str>) -> Self {
        Self::new(
            FeedbackKind::Correct,
            reward_message.unwrap_or(DEFAULT_COMPLETION_MESSAGE),
        )
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.kind == FeedbackKind::Correct
    }
}
