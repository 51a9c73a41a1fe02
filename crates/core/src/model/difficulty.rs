/// Multiplicative scale applied to speed-challenge operand ranges.
///
/// Always within `[DifficultyFactor::MIN, DifficultyFactor::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DifficultyFactor(f64);

impl DifficultyFactor {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 2.0;
    pub const INITIAL: f64 = 1.0;
    /// Applied after a correct answer.
    pub const REWARD: f64 = 1.05;
    /// Applied after a wrong answer or a question timeout.
    pub const PENALTY: f64 = 0.9;

    /// Creates a factor, clamping into the allowed bounds. Non-finite input maps to 1.0.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self(Self::INITIAL);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn rewarded(self) -> Self {
        Self::new(self.0 * Self::REWARD)
    }

    #[must_use]
    pub fn penalized(self) -> Self {
        Self::new(self.0 * Self::PENALTY)
    }
}

impl Default for DifficultyFactor {
    fn default() -> Self {
        Self(Self::INITIAL)
    }
}
