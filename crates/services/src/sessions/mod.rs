mod driver;
mod events;
mod progress;
mod runner;
mod snapshot;
mod workflow;

pub use driver::{AdvanceOutcome, SessionDriver, SessionStatus, SubmitOutcome, TickOutcome};
pub use events::{ChannelSink, NotificationSink, RecordingSink, SessionEvent};
pub use progress::SessionProgress;
pub use runner::{SessionHandle, SessionRunner};
pub use snapshot::SessionSnapshot;
pub use workflow::SessionLoopService;
