/// Aggregated view of session progress, useful for UI.
///
/// `position` is 1-based. `answered` counts the current problem once its
/// feedback is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Fraction of the level answered, in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.answered as f64 / self.total as f64;
        ratio.clamp(0.0, 1.0)
    }
}
