mod difficulty;
mod feedback;
mod ids;
mod level;
mod operator;
mod problem;
mod result;

pub use ids::{LevelId, ParseIdError, ProblemId};

pub use difficulty::DifficultyFactor;
pub use feedback::{DEFAULT_COMPLETION_MESSAGE, Feedback, FeedbackKind};
pub use level::{LevelDraft, LevelError, LevelSpec, MAX_PROBLEM_COUNT, NumberRange};
pub use operator::Operator;
pub use problem::Problem;
pub use result::{GameOutcome, GameResult};
