use std::env;
use std::time::Duration;

use quiz_core::generator::GeneratorConfig;

use crate::error::ConfigError;

/// Pacing and rule knobs for quiz sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    initial_lives: u32,
    feedback_delay: Duration,
    result_delay: Duration,
    tick_interval: Duration,
    generator: GeneratorConfig,
}

impl SessionConfig {
    pub const DEFAULT_INITIAL_LIVES: u32 = 3;
    pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(1_500);
    pub const DEFAULT_RESULT_DELAY: Duration = Duration::from_millis(2_000);
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

    /// # Errors
    ///
    /// Returns `ConfigError` if `initial_lives` or `tick_interval` is zero.
    pub fn new(
        initial_lives: u32,
        feedback_delay: Duration,
        result_delay: Duration,
        tick_interval: Duration,
        generator: GeneratorConfig,
    ) -> Result<Self, ConfigError> {
        if initial_lives == 0 {
            return Err(ConfigError::InvalidInitialLives);
        }
        if tick_interval.is_zero() {
            return Err(ConfigError::InvalidTickInterval);
        }
        Ok(Self {
            initial_lives,
            feedback_delay,
            result_delay,
            tick_interval,
            generator,
        })
    }

    /// Defaults overridden by `QUIZ_INITIAL_LIVES`, `QUIZ_FEEDBACK_DELAY_MS`,
    /// `QUIZ_RESULT_DELAY_MS` and `QUIZ_MAX_DIVIDE_REDRAWS`.
    ///
    /// Missing, unparseable or zero-lives values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| -> Option<u64> { lookup(key)?.trim().parse().ok() };
        let defaults = Self::default();
        let initial_lives = read("QUIZ_INITIAL_LIVES")
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.initial_lives);
        let feedback_delay = read("QUIZ_FEEDBACK_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.feedback_delay);
        let result_delay = read("QUIZ_RESULT_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.result_delay);
        let generator = read("QUIZ_MAX_DIVIDE_REDRAWS")
            .and_then(|v| u32::try_from(v).ok())
            .map_or(defaults.generator, GeneratorConfig::new);

        Self {
            initial_lives,
            feedback_delay,
            result_delay,
            tick_interval: defaults.tick_interval,
            generator,
        }
    }

    #[must_use]
    pub fn with_feedback_delay(mut self, delay: Duration) -> Self {
        self.feedback_delay = delay;
        self
    }

    #[must_use]
    pub fn with_result_delay(mut self, delay: Duration) -> Self {
        self.result_delay = delay;
        self
    }

    #[must_use]
    pub fn initial_lives(&self) -> u32 {
        self.initial_lives
    }

    /// Pause between answer feedback and moving on.
    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    /// Pause between game over and handing the result to the sink.
    #[must_use]
    pub fn result_delay(&self) -> Duration {
        self.result_delay
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub fn generator(&self) -> GeneratorConfig {
        self.generator
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_lives: Self::DEFAULT_INITIAL_LIVES,
            feedback_delay: Self::DEFAULT_FEEDBACK_DELAY,
            result_delay: Self::DEFAULT_RESULT_DELAY,
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            generator: GeneratorConfig::default(),
        }
    }
}
