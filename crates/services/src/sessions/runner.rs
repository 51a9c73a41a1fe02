use std::future;
use std::pin::Pin;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::GameResult;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior, Sleep};

use super::driver::{AdvanceOutcome, SessionDriver, SubmitOutcome, TickOutcome};
use super::events::NotificationSink;
use super::snapshot::SessionSnapshot;
use crate::config::SessionConfig;
use crate::error::SessionError;

#[derive(Debug)]
enum Command {
    Submit(String),
    Shutdown,
}

enum Event {
    Tick,
    Advance,
    Submit(String),
    Shutdown,
}

/// Owns a `SessionDriver` on a tokio task and feeds it timer ticks, submissions
/// and delayed advances one at a time.
pub struct SessionRunner {
    driver: SessionDriver,
    clock: Clock,
    config: SessionConfig,
    sink: Arc<dyn NotificationSink>,
    commands: mpsc::UnboundedReceiver<Command>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl SessionRunner {
    /// Spawn the session task and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(
        driver: SessionDriver,
        clock: Clock,
        config: SessionConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> SessionHandle {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (snapshot, snapshot_rx) = watch::channel(SessionSnapshot::from_driver(&driver));
        let runner = Self {
            driver,
            clock,
            config,
            sink,
            commands,
            snapshot,
        };
        let task = tokio::spawn(runner.run());
        SessionHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
            task,
        }
    }

    async fn run(mut self) -> Option<GameResult> {
        let level_id = self.driver.level().id().clone();
        tracing::info!(
            level_id = %level_id,
            problems = self.driver.problems().len(),
            lives = self.driver.lives(),
            "session started"
        );

        let period = self.config.tick_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut pending_advance: Option<Pin<Box<Sleep>>> = None;

        while !self.driver.is_game_over() {
            let event = tokio::select! {
                _ = ticker.tick() => Event::Tick,
                () = sleep_or_pending(&mut pending_advance) => Event::Advance,
                command = self.commands.recv() => match command {
                    Some(Command::Submit(text)) => Event::Submit(text),
                    Some(Command::Shutdown) | None => Event::Shutdown,
                },
            };

            match event {
                Event::Tick => {
                    if self.on_tick() {
                        pending_advance = Some(Box::pin(time::sleep(self.config.feedback_delay())));
                    }
                }
                Event::Advance => {
                    pending_advance = None;
                    self.on_advance();
                }
                Event::Submit(text) => {
                    if self.on_submit(&text) {
                        pending_advance = Some(Box::pin(time::sleep(self.config.feedback_delay())));
                    }
                }
                Event::Shutdown => {
                    tracing::info!(level_id = %level_id, "session torn down");
                    return None;
                }
            }
            self.publish();
        }

        let result = self.driver.result().cloned()?;
        tracing::info!(
            level_id = %level_id,
            score = result.score,
            attempted = result.problems_attempted,
            is_win = result.is_win,
            "game over"
        );
        self.hand_off(result).await
    }

    /// Returns true when an advance should be scheduled.
    fn on_tick(&mut self) -> bool {
        match self.driver.tick(self.clock.now()) {
            TickOutcome::Ignored => false,
            TickOutcome::Counted => {
                tracing::debug!(
                    time_left = ?self.driver.time_left(),
                    question_time_left = ?self.driver.question_time_left(),
                    "tick"
                );
                false
            }
            TickOutcome::QuestionTimedOut => {
                tracing::debug!(
                    index = self.driver.current_index(),
                    lives = self.driver.lives(),
                    "question timed out"
                );
                self.notify_feedback();
                true
            }
            TickOutcome::TimeUp(_) => {
                self.notify_feedback();
                false
            }
        }
    }

    /// Returns true when an advance should be scheduled.
    fn on_submit(&mut self, text: &str) -> bool {
        let outcome = self.driver.submit(text);
        tracing::debug!(
            index = self.driver.current_index(),
            lives = self.driver.lives(),
            score = self.driver.score(),
            ?outcome,
            "answer submitted"
        );
        if outcome == SubmitOutcome::Ignored {
            tracing::warn!(
                index = self.driver.current_index(),
                "submission ignored while feedback is pending"
            );
            return false;
        }
        self.notify_feedback();
        outcome.schedules_advance()
    }

    fn on_advance(&mut self) {
        match self.driver.advance(self.clock.now()) {
            AdvanceOutcome::Ignored => {
                tracing::warn!("advance fired with nothing pending");
            }
            AdvanceOutcome::NextProblem => {
                tracing::debug!(index = self.driver.current_index(), "next problem");
            }
            AdvanceOutcome::Finished(_) => self.notify_feedback(),
        }
    }

    /// Wait out the result delay, then deliver the result. Teardown during the
    /// delay skips delivery.
    async fn hand_off(&mut self, result: GameResult) -> Option<GameResult> {
        let delay = time::sleep(self.config.result_delay());
        tokio::pin!(delay);
        loop {
            tokio::select! {
                () = &mut delay => {
                    self.sink.finished(&result);
                    return Some(result);
                }
                command = self.commands.recv() => match command {
                    Some(Command::Submit(_)) => {
                        tracing::debug!("submission after game over ignored");
                    }
                    Some(Command::Shutdown) | None => {
                        tracing::info!(level_id = %result.level_id, "torn down before result hand-off");
                        return Some(result);
                    }
                },
            }
        }
    }

    fn notify_feedback(&self) {
        if let Some(feedback) = self.driver.feedback() {
            self.sink.feedback(feedback);
        }
    }

    fn publish(&self) {
        self.snapshot
            .send_replace(SessionSnapshot::from_driver(&self.driver));
    }
}

async fn sleep_or_pending(sleep: &mut Option<Pin<Box<Sleep>>>) {
    match sleep {
        Some(sleep) => sleep.as_mut().await,
        None => future::pending().await,
    }
}

/// Caller side of a running session.
///
/// Dropping the handle tears the session down.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<Option<GameResult>>,
}

impl SessionHandle {
    /// Queue an answer. Returns immediately.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task has exited.
    pub fn submit(&self, answer: impl Into<String>) -> Result<(), SessionError> {
        self.commands
            .send(Command::Submit(answer.into()))
            .map_err(|_| SessionError::Closed)
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Wait until the published snapshot shows game over.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session was torn down first.
    pub async fn game_over(&self) -> Result<SessionSnapshot, SessionError> {
        let mut rx = self.snapshot.clone();
        rx.wait_for(SessionSnapshot::is_game_over)
            .await
            .map(|snapshot| snapshot.clone())
            .map_err(|_| SessionError::Closed)
    }

    /// Ask the session to stop. Pending timers are dropped.
    pub fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).is_err() {
            tracing::debug!("shutdown sent to finished session");
        }
    }

    /// Wait for the session task to exit and return its result, if it reached one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task panicked or was aborted.
    pub async fn finished(self) -> Result<Option<GameResult>, SessionError> {
        self.task.await.map_err(|_| SessionError::Closed)
    }
}
