#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod levels;
pub mod premium;
pub mod results;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use config::SessionConfig;
pub use error::{ConfigError, PremiumError, ResultError, SessionError};
pub use levels::{LevelBadge, LevelListItem, LevelListService};
pub use premium::{PremiumGate, PremiumProvider, PremiumStatus};
pub use results::{Encouragement, ResultView, decode_result, encode_result};

pub use sessions::{
    AdvanceOutcome, ChannelSink, NotificationSink, RecordingSink, SessionDriver, SessionEvent,
    SessionHandle, SessionLoopService, SessionProgress, SessionRunner, SessionSnapshot,
    SessionStatus, SubmitOutcome, TickOutcome,
};
