use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;

use quiz_core::generator::{ProblemGenerator, check_answer};
use quiz_core::model::{
    DifficultyFactor, Feedback, FeedbackKind, GameOutcome, GameResult, LevelSpec, Problem,
};
use quiz_core::time::whole_seconds_between;

use super::progress::SessionProgress;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::premium::{PremiumProvider, PremiumStatus};

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for an answer to the current problem.
    Active,
    /// Feedback is showing; `advance` moves the session on.
    AwaitingNext,
    GameOver(GameOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Session over, or feedback already pending.
    Ignored,
    /// Answer was not a number. No life lost, no advance scheduled.
    InvalidInput,
    Correct,
    Incorrect,
}

impl SubmitOutcome {
    /// True when the caller should schedule `advance` after the feedback delay.
    #[must_use]
    pub fn schedules_advance(self) -> bool {
        matches!(self, SubmitOutcome::Correct | SubmitOutcome::Incorrect)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Counted,
    /// The per-question timer expired; counts as a wrong answer and schedules `advance`.
    QuestionTimedOut,
    /// The overall timer expired and ended the session.
    TimeUp(GameResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Nothing was pending, or the session already ended.
    Ignored,
    NextProblem,
    Finished(GameResult),
}

//
// ─── DRIVER ────────────────────────────────────────────────────────────────────
//

/// Single-session state machine for one level.
///
/// All mutations go through `submit`, `tick` and `advance`. None of them block;
/// operations that arrive after game over, or while feedback is pending, are
/// ignored. Time is passed in by the caller so the driver stays deterministic.
pub struct SessionDriver {
    level: LevelSpec,
    generator: ProblemGenerator,
    rng: StdRng,
    problems: Vec<Problem>,
    current: usize,
    score: u32,
    lives: u32,
    time_left: Option<u32>,
    question_time_left: Option<u32>,
    feedback: Option<Feedback>,
    awaiting_advance: bool,
    last_answer_correct: bool,
    difficulty: DifficultyFactor,
    status: SessionStatus,
    started_at: DateTime<Utc>,
    result: Option<GameResult>,
}

impl SessionDriver {
    /// Start a session for `level`.
    ///
    /// `started_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::PremiumPending` if the level is premium-gated and the flag
    /// is still loading, or `SessionError::Locked` if the player is not premium.
    pub fn start(
        level: LevelSpec,
        premium: &dyn PremiumProvider,
        config: &SessionConfig,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        Self::start_with_rng(level, premium, config, started_at, StdRng::from_os_rng())
    }

    /// Same as `start`, drawing problems from the given RNG.
    ///
    /// # Errors
    ///
    /// See [`SessionDriver::start`].
    pub fn start_with_rng(
        level: LevelSpec,
        premium: &dyn PremiumProvider,
        config: &SessionConfig,
        started_at: DateTime<Utc>,
        mut rng: StdRng,
    ) -> Result<Self, SessionError> {
        if level.requires_premium() {
            match premium.status() {
                PremiumStatus::Loading => return Err(SessionError::PremiumPending),
                PremiumStatus::Resolved(false) => {
                    return Err(SessionError::Locked(level.id().clone()));
                }
                PremiumStatus::Resolved(true) => {}
            }
        }

        let generator = ProblemGenerator::new(config.generator());
        let difficulty = DifficultyFactor::default();
        let problems = if level.is_speed_challenge() {
            vec![generator.generate(&level, difficulty, &mut rng)]
        } else {
            generator.generate_for_level(&level, &mut rng)
        };

        Ok(Self {
            time_left: level.time_limit_secs(),
            question_time_left: level.time_per_question_secs(),
            level,
            generator,
            rng,
            problems,
            current: 0,
            score: 0,
            lives: config.initial_lives(),
            feedback: None,
            awaiting_advance: false,
            last_answer_correct: false,
            difficulty,
            status: SessionStatus::Active,
            started_at,
            result: None,
        })
    }

    // Accessors
    #[must_use]
    pub fn level(&self) -> &LevelSpec {
        &self.level
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        matches!(self.status, SessionStatus::GameOver(_))
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_problem(&self) -> Option<&Problem> {
        self.problems.get(self.current)
    }

    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Seconds left on the level clock, `None` when untimed.
    #[must_use]
    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    /// Seconds left for the current question, `None` when untimed.
    #[must_use]
    pub fn question_time_left(&self) -> Option<u32> {
        self.question_time_left
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn difficulty(&self) -> DifficultyFactor {
        self.difficulty
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Terminal summary, available once the session is over.
    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = usize::try_from(self.level.problem_count()).unwrap_or(usize::MAX);
        let answered_current = match self.status {
            SessionStatus::AwaitingNext => true,
            SessionStatus::GameOver(outcome) => outcome != GameOutcome::TimeUp,
            SessionStatus::Active => false,
        };
        let answered = if answered_current {
            (self.current + 1).min(total)
        } else {
            self.current
        };
        SessionProgress {
            position: self.current + 1,
            total,
            answered,
            remaining: total.saturating_sub(answered),
            is_complete: self.is_game_over(),
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Check a typed answer against the current problem.
    ///
    /// Never advances the session; on `Correct`/`Incorrect` the caller runs
    /// `advance` after the feedback delay.
    pub fn submit(&mut self, answer_text: &str) -> SubmitOutcome {
        if self.is_game_over() || self.awaiting_advance {
            return SubmitOutcome::Ignored;
        }
        let Some(expected) = self.current_problem().map(Problem::answer) else {
            return SubmitOutcome::Ignored;
        };

        let Ok(submitted) = answer_text.trim().parse::<i64>() else {
            self.feedback = Some(Feedback::not_a_number());
            return SubmitOutcome::InvalidInput;
        };

        if check_answer(expected, submitted) {
            self.score += 1;
            self.record_answer(true, Feedback::correct());
            SubmitOutcome::Correct
        } else {
            self.lives = self.lives.saturating_sub(1);
            self.record_answer(false, Feedback::incorrect(expected));
            SubmitOutcome::Incorrect
        }
    }

    /// One second of both timers. The level timer runs first and wins ties.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        match self.tick_overall(now) {
            TickOutcome::Ignored => self.tick_question(),
            TickOutcome::Counted => match self.tick_question() {
                TickOutcome::Ignored => TickOutcome::Counted,
                other => other,
            },
            finished => finished,
        }
    }

    /// One second of the level timer.
    pub fn tick_overall(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.is_game_over() {
            return TickOutcome::Ignored;
        }
        let Some(left) = self.time_left else {
            return TickOutcome::Ignored;
        };

        let left = left.saturating_sub(1);
        self.time_left = Some(left);
        if left == 0 {
            return TickOutcome::TimeUp(self.finish(GameOutcome::TimeUp, Feedback::time_up(), now));
        }
        TickOutcome::Counted
    }

    /// One second of the per-question timer. Paused while feedback is pending.
    pub fn tick_question(&mut self) -> TickOutcome {
        if self.is_game_over() || self.awaiting_advance {
            return TickOutcome::Ignored;
        }
        let Some(left) = self.question_time_left else {
            return TickOutcome::Ignored;
        };
        let Some(expected) = self.current_problem().map(Problem::answer) else {
            return TickOutcome::Ignored;
        };

        let left = left.saturating_sub(1);
        self.question_time_left = Some(left);
        if left > 0 {
            return TickOutcome::Counted;
        }

        self.lives = self.lives.saturating_sub(1);
        self.record_answer(false, Feedback::question_timed_out(expected));
        TickOutcome::QuestionTimedOut
    }

    /// Move past the pending feedback, evaluated against the current state.
    pub fn advance(&mut self, now: DateTime<Utc>) -> AdvanceOutcome {
        if self.is_game_over() || !self.awaiting_advance {
            return AdvanceOutcome::Ignored;
        }

        let on_last = self.current >= self.level.last_index();
        if self.lives == 0 {
            return AdvanceOutcome::Finished(self.finish(
                GameOutcome::Loss,
                Feedback::out_of_lives(),
                now,
            ));
        }
        if on_last && self.last_answer_correct {
            let feedback = Feedback::level_complete(self.level.reward_message());
            return AdvanceOutcome::Finished(self.finish(GameOutcome::Win, feedback, now));
        }
        if on_last {
            return AdvanceOutcome::Finished(self.finish(
                GameOutcome::Loss,
                Feedback::out_of_questions(),
                now,
            ));
        }

        self.current += 1;
        if self.level.is_speed_challenge() {
            let next = self
                .generator
                .generate(&self.level, self.difficulty, &mut self.rng);
            self.problems.push(next);
        }
        self.question_time_left = self.level.time_per_question_secs();
        self.feedback = None;
        self.awaiting_advance = false;
        self.status = SessionStatus::Active;
        AdvanceOutcome::NextProblem
    }

    fn record_answer(&mut self, correct: bool, feedback: Feedback) {
        if self.level.is_speed_challenge() {
            self.difficulty = if correct {
                self.difficulty.rewarded()
            } else {
                self.difficulty.penalized()
            };
        }
        self.last_answer_correct = correct;
        self.feedback = Some(feedback);
        self.awaiting_advance = true;
        self.status = SessionStatus::AwaitingNext;
    }

    fn finish(&mut self, outcome: GameOutcome, feedback: Feedback, now: DateTime<Utc>) -> GameResult {
        self.status = SessionStatus::GameOver(outcome);
        self.feedback = Some(feedback);
        self.awaiting_advance = false;
        let result = self.build_result(outcome, now);
        self.result = Some(result.clone());
        result
    }

    fn build_result(&self, outcome: GameOutcome, now: DateTime<Utc>) -> GameResult {
        let is_win = self.lives > 0
            && self.time_left.is_none_or(|left| left > 0)
            && self.current >= self.level.last_index()
            && self.feedback.as_ref().is_some_and(|f| f.kind == FeedbackKind::Correct);

        let index = u32::try_from(self.current).unwrap_or(u32::MAX);
        let problems_attempted = if is_win {
            self.level.problem_count()
        } else if outcome == GameOutcome::TimeUp {
            index
        } else {
            index.saturating_add(1)
        };

        GameResult {
            level_id: self.level.id().clone(),
            level_title: self.level.title().to_owned(),
            score: self.score,
            problems_attempted,
            problems_correct: self.score,
            time_taken_seconds: whole_seconds_between(self.started_at, now),
            is_win,
        }
    }
}

impl fmt::Debug for SessionDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDriver")
            .field("level_id", self.level.id())
            .field("problems_len", &self.problems.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("lives", &self.lives)
            .field("time_left", &self.time_left)
            .field("question_time_left", &self.question_time_left)
            .field("status", &self.status)
            .field("difficulty", &self.difficulty)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{LevelDraft, Operator};
    use quiz_core::time::fixed_now;

    fn addition_level() -> LevelSpec {
        LevelDraft::new("easy-addition", "Easy Addition")
            .validate()
            .unwrap()
    }

    fn start(level: LevelSpec) -> SessionDriver {
        SessionDriver::start_with_rng(
            level,
            &PremiumStatus::Resolved(false),
            &SessionConfig::default(),
            fixed_now(),
            StdRng::seed_from_u64(42),
        )
        .unwrap()
    }

    fn answer_correctly(driver: &mut SessionDriver) -> SubmitOutcome {
        let answer = driver.current_problem().unwrap().answer();
        driver.submit(&answer.to_string())
    }

    fn answer_wrong(driver: &mut SessionDriver) -> SubmitOutcome {
        let answer = driver.current_problem().unwrap().answer();
        driver.submit(&(answer + 1).to_string())
    }

    #[test]
    fn start_prefills_standard_levels() {
        let driver = start(addition_level());
        assert_eq!(driver.problems().len(), 10);
        assert_eq!(driver.lives(), 3);
        assert_eq!(driver.score(), 0);
        assert_eq!(driver.current_index(), 0);
        assert_eq!(driver.time_left(), None);
        assert_eq!(driver.status(), SessionStatus::Active);
        assert!((driver.difficulty().value() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn start_generates_one_problem_for_speed_challenges() {
        let mut draft = LevelDraft::new("speedy", "Speedy");
        draft.is_speed_challenge = true;
        let driver = start(draft.validate().unwrap());
        assert_eq!(driver.problems().len(), 1);
    }

    #[test]
    fn premium_levels_are_gated() {
        let mut draft = LevelDraft::new("vip", "VIP");
        draft.requires_premium = true;
        let level = draft.validate().unwrap();
        let config = SessionConfig::default();

        let err = SessionDriver::start(level.clone(), &PremiumStatus::Loading, &config, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::PremiumPending));

        let err = SessionDriver::start(
            level.clone(),
            &PremiumStatus::Resolved(false),
            &config,
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Locked(id) if id.as_str() == "vip"));

        assert!(
            SessionDriver::start(level, &PremiumStatus::Resolved(true), &config, fixed_now())
                .is_ok()
        );
    }

    #[test]
    fn submit_does_not_advance_synchronously() {
        let mut driver = start(addition_level());
        assert_eq!(answer_correctly(&mut driver), SubmitOutcome::Correct);
        assert_eq!(driver.current_index(), 0);
        assert_eq!(driver.status(), SessionStatus::AwaitingNext);
        assert_eq!(driver.score(), 1);

        assert_eq!(answer_correctly(&mut driver), SubmitOutcome::Ignored);
        assert_eq!(driver.score(), 1);

        assert_eq!(driver.advance(fixed_now()), AdvanceOutcome::NextProblem);
        assert_eq!(driver.current_index(), 1);
        assert!(driver.feedback().is_none());
    }

    #[test]
    fn invalid_input_keeps_state() {
        let mut driver = start(addition_level());
        assert_eq!(driver.submit("twelve"), SubmitOutcome::InvalidInput);
        assert_eq!(driver.feedback().unwrap().kind, FeedbackKind::Info);
        assert_eq!(driver.lives(), 3);
        assert_eq!(driver.status(), SessionStatus::Active);
        assert_eq!(driver.advance(fixed_now()), AdvanceOutcome::Ignored);

        // The player can retry straight away.
        assert_eq!(answer_correctly(&mut driver), SubmitOutcome::Correct);
    }

    #[test]
    fn ten_correct_answers_win() {
        let mut driver = start(addition_level());
        let mut finished = None;
        for _ in 0..10 {
            assert_eq!(answer_correctly(&mut driver), SubmitOutcome::Correct);
            if let AdvanceOutcome::Finished(result) = driver.advance(fixed_now()) {
                finished = Some(result);
            }
        }
        let result = finished.unwrap();
        assert_eq!(result.score, 10);
        assert_eq!(result.problems_attempted, 10);
        assert_eq!(result.problems_correct, 10);
        assert!(result.is_win);
        assert_eq!(driver.status(), SessionStatus::GameOver(GameOutcome::Win));
        assert_eq!(driver.feedback().unwrap().message, "You completed the level!");
    }

    #[test]
    fn three_wrong_answers_lose() {
        let mut driver = start(addition_level());
        answer_correctly(&mut driver);
        driver.advance(fixed_now());

        for _ in 0..2 {
            assert_eq!(answer_wrong(&mut driver), SubmitOutcome::Incorrect);
            assert_eq!(driver.advance(fixed_now()), AdvanceOutcome::NextProblem);
        }
        assert_eq!(answer_wrong(&mut driver), SubmitOutcome::Incorrect);
        assert_eq!(driver.lives(), 0);
        let AdvanceOutcome::Finished(result) = driver.advance(fixed_now()) else {
            panic!("expected game over");
        };
        assert!(!result.is_win);
        assert_eq!(result.problems_attempted, 4);
        assert_eq!(result.problems_correct, 1);
        assert_eq!(driver.status(), SessionStatus::GameOver(GameOutcome::Loss));
        assert_eq!(
            driver.feedback().unwrap().message,
            "Game Over! Better luck next time."
        );
    }

    #[test]
    fn wrong_on_last_problem_ends_level() {
        let mut draft = LevelDraft::new("two", "Two");
        draft.problem_count = 2;
        let mut driver = start(draft.validate().unwrap());
        answer_correctly(&mut driver);
        driver.advance(fixed_now());
        answer_wrong(&mut driver);
        let AdvanceOutcome::Finished(result) = driver.advance(fixed_now()) else {
            panic!("expected game over");
        };
        assert!(!result.is_win);
        assert_eq!(driver.lives(), 2);
        assert_eq!(result.problems_attempted, 2);
        assert_eq!(driver.feedback().unwrap(), &Feedback::out_of_questions());
    }

    #[test]
    fn overall_timer_ends_session() {
        let mut draft = LevelDraft::new("timed", "Timed");
        draft.time_limit_secs = Some(5);
        let mut driver = start(draft.validate().unwrap());
        for _ in 0..4 {
            assert_eq!(driver.tick(fixed_now()), TickOutcome::Counted);
        }
        let TickOutcome::TimeUp(result) = driver.tick(fixed_now() + Duration::seconds(5)) else {
            panic!("expected time up");
        };
        assert_eq!(result.problems_attempted, 0);
        assert!(!result.is_win);
        assert_eq!(result.time_taken_seconds, 5);
        assert_eq!(driver.feedback().unwrap().message, "Time's up!");
        assert_eq!(driver.tick(fixed_now()), TickOutcome::Ignored);
        assert_eq!(driver.submit("2"), SubmitOutcome::Ignored);
    }

    #[test]
    fn time_up_beats_pending_advance() {
        let mut draft = LevelDraft::new("timed", "Timed");
        draft.time_limit_secs = Some(1);
        let mut driver = start(draft.validate().unwrap());
        answer_correctly(&mut driver);
        assert!(matches!(driver.tick(fixed_now()), TickOutcome::TimeUp(_)));
        assert_eq!(driver.advance(fixed_now()), AdvanceOutcome::Ignored);
        assert_eq!(driver.status(), SessionStatus::GameOver(GameOutcome::TimeUp));
    }

    #[test]
    fn question_timer_counts_as_wrong_answer() {
        let mut draft = LevelDraft::new("q", "Q");
        draft.time_per_question_secs = Some(3);
        let mut driver = start(draft.validate().unwrap());
        let answer = driver.current_problem().unwrap().answer();

        assert_eq!(driver.tick(fixed_now()), TickOutcome::Counted);
        assert_eq!(driver.tick(fixed_now()), TickOutcome::Counted);
        assert_eq!(driver.tick(fixed_now()), TickOutcome::QuestionTimedOut);
        assert_eq!(driver.lives(), 2);
        let feedback = driver.feedback().unwrap();
        assert_eq!(feedback.kind, FeedbackKind::Incorrect);
        assert!(feedback.message.contains(&answer.to_string()));

        // Paused while feedback is pending.
        assert_eq!(driver.tick(fixed_now()), TickOutcome::Ignored);
        assert_eq!(driver.question_time_left(), Some(0));

        assert_eq!(driver.advance(fixed_now()), AdvanceOutcome::NextProblem);
        assert_eq!(driver.question_time_left(), Some(3));
    }

    #[test]
    fn speed_challenge_adapts_difficulty() {
        let mut draft = LevelDraft::new("speedy", "Speedy");
        draft.is_speed_challenge = true;
        draft.operators = vec![Operator::Add, Operator::Subtract];
        draft.number_range = (10, 99);
        draft.problem_count = 25;
        let mut driver = start(draft.validate().unwrap());

        for i in 1..=5 {
            answer_correctly(&mut driver);
            assert_eq!(driver.advance(fixed_now()), AdvanceOutcome::NextProblem);
            assert_eq!(driver.problems().len(), i + 1);
        }
        assert!((driver.difficulty().value() - 1.05_f64.powi(5)).abs() < 1e-9);

        answer_wrong(&mut driver);
        assert!((driver.difficulty().value() - 1.05_f64.powi(5) * 0.9).abs() < 1e-9);
    }

    #[test]
    fn question_timeouts_penalize_speed_difficulty_down_to_floor() {
        let mut draft = LevelDraft::new("speedy", "Speedy");
        draft.is_speed_challenge = true;
        draft.time_per_question_secs = Some(1);
        draft.problem_count = 25;
        let config = SessionConfig::new(
            10,
            SessionConfig::DEFAULT_FEEDBACK_DELAY,
            SessionConfig::DEFAULT_RESULT_DELAY,
            SessionConfig::DEFAULT_TICK_INTERVAL,
            quiz_core::generator::GeneratorConfig::default(),
        )
        .unwrap();
        let mut driver = SessionDriver::start_with_rng(
            draft.validate().unwrap(),
            &PremiumStatus::Resolved(false),
            &config,
            fixed_now(),
            StdRng::seed_from_u64(9),
        )
        .unwrap();

        assert_eq!(driver.tick(fixed_now()), TickOutcome::QuestionTimedOut);
        assert!((driver.difficulty().value() - 0.9).abs() < 1e-9);
        assert_eq!(driver.lives(), 9);

        for _ in 0..8 {
            assert_eq!(driver.advance(fixed_now()), AdvanceOutcome::NextProblem);
            assert_eq!(driver.tick(fixed_now()), TickOutcome::QuestionTimedOut);
            assert!(driver.difficulty().value() >= DifficultyFactor::MIN);
        }
        assert!((driver.difficulty().value() - DifficultyFactor::MIN).abs() < f64::EPSILON);
        assert_eq!(driver.lives(), 1);
    }

    #[test]
    fn standard_levels_keep_base_difficulty() {
        let mut driver = start(addition_level());
        answer_correctly(&mut driver);
        assert!((driver.difficulty().value() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn progress_tracks_answers() {
        let mut driver = start(addition_level());
        assert_eq!(driver.progress().answered, 0);
        assert_eq!(driver.progress().position, 1);
        answer_correctly(&mut driver);
        assert_eq!(driver.progress().answered, 1);
        driver.advance(fixed_now());
        let progress = driver.progress();
        assert_eq!(progress.position, 2);
        assert_eq!(progress.remaining, 9);
        assert!(!progress.is_complete);
    }
}
