use quiz_core::model::{Feedback, GameResult, LevelId};

use super::driver::{SessionDriver, SessionStatus};
use super::progress::SessionProgress;

/// Render-ready copy of a session, published after every mutation.
///
/// `progress_label` reads "n of m". Timers are `None` for untimed levels.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub level_id: LevelId,
    pub level_title: String,
    pub question_text: Option<String>,
    pub score: u32,
    pub lives: u32,
    pub time_left: Option<u32>,
    pub question_time_left: Option<u32>,
    pub progress: SessionProgress,
    pub progress_label: String,
    pub feedback: Option<Feedback>,
    pub status: SessionStatus,
    pub difficulty: f64,
    pub result: Option<GameResult>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn from_driver(driver: &SessionDriver) -> Self {
        let progress = driver.progress();
        let level = driver.level();
        Self {
            level_id: level.id().clone(),
            level_title: level.title().to_owned(),
            question_text: driver.current_problem().map(|p| p.question_text()),
            score: driver.score(),
            lives: driver.lives(),
            time_left: driver.time_left(),
            question_time_left: driver.question_time_left(),
            progress_label: format!("{} of {}", progress.position, progress.total),
            progress,
            feedback: driver.feedback().cloned(),
            status: driver.status(),
            difficulty: driver.difficulty().value(),
            result: driver.result().cloned(),
        }
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        matches!(self.status, SessionStatus::GameOver(_))
    }
}

impl From<&SessionDriver> for SessionSnapshot {
    fn from(driver: &SessionDriver) -> Self {
        Self::from_driver(driver)
    }
}
