use std::sync::{Arc, Mutex};

use quiz_core::model::{Feedback, GameResult};
use tokio::sync::mpsc;

/// Presentation-side receiver for session notifications.
pub trait NotificationSink: Send + Sync {
    /// Called whenever the visible feedback changes.
    fn feedback(&self, feedback: &Feedback);

    /// Called once per session, after the result hand-off delay.
    fn finished(&self, result: &GameResult);
}

/// Notification forwarded by `ChannelSink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Feedback(Feedback),
    Finished(GameResult),
}

/// Sink that forwards notifications to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { sender }
    }

    /// Sink plus the receiving half of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    fn forward(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            tracing::warn!("session event dropped, receiver is gone");
        }
    }
}

impl NotificationSink for ChannelSink {
    fn feedback(&self, feedback: &Feedback) {
        self.forward(SessionEvent::Feedback(feedback.clone()));
    }

    fn finished(&self, result: &GameResult) {
        self.forward(SessionEvent::Finished(result.clone()));
    }
}

/// Sink that keeps every notification in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<SessionEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn push(&self, event: SessionEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

impl NotificationSink for RecordingSink {
    fn feedback(&self, feedback: &Feedback) {
        self.push(SessionEvent::Feedback(feedback.clone()));
    }

    fn finished(&self, result: &GameResult) {
        self.push(SessionEvent::Finished(result.clone()));
    }
}
