use rand::Rng;
use rand::seq::IndexedRandom;

use crate::model::{DifficultyFactor, LevelSpec, Operator, Problem, ProblemId};

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Tuning for the problem generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    max_divide_redraws: u32,
}

impl GeneratorConfig {
    pub const DEFAULT_MAX_DIVIDE_REDRAWS: u32 = 32;

    /// `max_divide_redraws` bounds how often an oversized division is redrawn
    /// before the quotient is clamped instead.
    #[must_use]
    pub fn new(max_divide_redraws: u32) -> Self {
        Self { max_divide_redraws }
    }

    #[must_use]
    pub fn max_divide_redraws(&self) -> u32 {
        self.max_divide_redraws
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DIVIDE_REDRAWS)
    }
}

//
// ─── EFFECTIVE RANGE ───────────────────────────────────────────────────────────
//

/// Operand bounds after difficulty scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveRange {
    pub min: i64,
    pub max: i64,
}

impl EffectiveRange {
    /// Speed challenges scale both bounds by the factor (floored, `min >= 1`,
    /// `max >= min + 1`). Other levels use the declared range as-is.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_level(level: &LevelSpec, factor: DifficultyFactor) -> Self {
        let range = level.number_range();
        let min = i64::from(range.min());
        let max = i64::from(range.max());
        if !level.is_speed_challenge() {
            return Self { min, max };
        }

        let scale = factor.value();
        let min = ((min as f64 * scale).floor() as i64).max(1);
        let max = ((max as f64 * scale).floor() as i64).max(min + 1);
        Self { min, max }
    }
}

//
// ─── GENERATOR ─────────────────────────────────────────────────────────────────
//

/// Produces arithmetic problems for a level.
///
/// Every returned `Problem` satisfies `operand1 OP operand2 == answer`;
/// subtraction never goes negative and division is always exact.
///
/// # Examples
///
/// ```
/// # use quiz_core::generator::ProblemGenerator;
/// # use quiz_core::model::{DifficultyFactor, LevelDraft};
/// let level = LevelDraft::new("easy-addition", "Easy Addition").validate()?;
/// let generator = ProblemGenerator::default();
/// let problem = generator.generate(&level, DifficultyFactor::default(), &mut rand::rng());
/// assert!(problem.is_consistent());
/// # Ok::<(), quiz_core::model::LevelError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProblemGenerator {
    config: GeneratorConfig,
}

impl ProblemGenerator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> GeneratorConfig {
        self.config
    }

    /// Generate one problem using an operator drawn uniformly from the level.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        level: &LevelSpec,
        factor: DifficultyFactor,
        rng: &mut R,
    ) -> Problem {
        let operator = level
            .operators()
            .choose(rng)
            .copied()
            .unwrap_or(Operator::Add);
        let range = EffectiveRange::for_level(level, factor);

        let (operand1, operand2, answer) = match operator {
            Operator::Add => {
                let a = rng.random_range(range.min..=range.max);
                let b = rng.random_range(range.min..=range.max);
                (a, b, a + b)
            }
            Operator::Subtract => {
                let mut a = rng.random_range(range.min..=range.max);
                let mut b = rng.random_range(range.min..=a);
                if a < b {
                    std::mem::swap(&mut a, &mut b);
                }
                (a, b, a - b)
            }
            Operator::Multiply => {
                let cap = range.max.min(if level.difficulty() < 3 { 12 } else { 20 });
                let low = capped_low(range.min, cap);
                let a = rng.random_range(low..=cap);
                let b = rng.random_range(low..=cap);
                (a, b, a * b)
            }
            Operator::Divide => self.divide_operands(level, range, rng),
        };

        let mut id_bytes = [0_u8; 16];
        rng.fill(&mut id_bytes);
        Problem::new(
            ProblemId::from_random_bytes(id_bytes),
            operand1,
            operand2,
            operator,
            answer,
        )
    }

    /// Generate exactly `level.problem_count()` independent problems at the base difficulty.
    pub fn generate_for_level<R: Rng + ?Sized>(
        &self,
        level: &LevelSpec,
        rng: &mut R,
    ) -> Vec<Problem> {
        (0..level.problem_count())
            .map(|_| self.generate(level, DifficultyFactor::default(), rng))
            .collect()
    }

    /// Returns `(dividend, divisor, quotient)` with `dividend <= 2 * range.max`.
    fn divide_operands<R: Rng + ?Sized>(
        &self,
        level: &LevelSpec,
        range: EffectiveRange,
        rng: &mut R,
    ) -> (i64, i64, i64) {
        let cap = range.max.min(if level.difficulty() < 4 { 10 } else { 15 });
        let low = capped_low(range.min, cap);
        let ceiling = range.max * 2;

        let mut divisor = low;
        let mut quotient = low;
        for _ in 0..=self.config.max_divide_redraws {
            divisor = rng.random_range(low..=cap);
            quotient = rng.random_range(low..=cap);
            if divisor * quotient <= ceiling {
                return (divisor * quotient, divisor, quotient);
            }
        }

        // Redraws exhausted: keep the divisor, shrink the quotient to fit.
        let quotient = quotient.min(ceiling / divisor).max(1);
        (divisor * quotient, divisor, quotient)
    }
}

/// Lower operand bound for capped operators: `min(effective_min, cap - 1)`, never below 1.
fn capped_low(effective_min: i64, cap: i64) -> i64 {
    effective_min.min(cap - 1).max(1)
}

/// Exact equality; no tolerance and no partial credit.
#[must_use]
pub fn check_answer(expected: i64, submitted: i64) -> bool {
    expected == submitted
}

/// Generate one problem with the default generator and the thread RNG.
#[must_use]
pub fn generate(level: &LevelSpec, factor: DifficultyFactor) -> Problem {
    ProblemGenerator::default().generate(level, factor, &mut rand::rng())
}

/// Generate a full problem set for a level with the default generator and the thread RNG.
#[must_use]
pub fn generate_for_level(level: &LevelSpec) -> Vec<Problem> {
    ProblemGenerator::default().generate_for_level(level, &mut rand::rng())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LevelDraft;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn level(ops: &[Operator], range: (u32, u32), difficulty: u8, speed: bool) -> LevelSpec {
        let mut draft = LevelDraft::new("test", "Test");
        draft.operators = ops.to_vec();
        draft.number_range = range;
        draft.difficulty = difficulty;
        draft.is_speed_challenge = speed;
        draft.validate().unwrap()
    }

    #[test]
    fn every_operator_produces_consistent_answers() {
        let generator = ProblemGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        for difficulty in 1..=5 {
            let level = level(&Operator::ALL, (1, 50), difficulty, false);
            for _ in 0..500 {
                let p = generator.generate(&level, DifficultyFactor::default(), &mut rng);
                assert!(p.is_consistent(), "{p:?}");
            }
        }
    }

    #[test]
    fn subtraction_is_never_negative() {
        let generator = ProblemGenerator::default();
        let mut rng = StdRng::seed_from_u64(11);
        let level = level(&[Operator::Subtract], (1, 10), 1, false);
        for _ in 0..500 {
            let p = generator.generate(&level, DifficultyFactor::default(), &mut rng);
            assert!(p.answer() >= 0);
            assert!(p.operand1() >= p.operand2());
            assert!((1..=10).contains(&p.operand1()));
        }
    }

    #[test]
    fn division_is_exact_and_bounded() {
        let generator = ProblemGenerator::default();
        let mut rng = StdRng::seed_from_u64(13);
        for (range, difficulty) in [((1, 100), 3), ((1, 50), 4), ((3, 3), 1), ((1, 2), 5)] {
            let level = level(&[Operator::Divide], range, difficulty, false);
            for _ in 0..500 {
                let p = generator.generate(&level, DifficultyFactor::default(), &mut rng);
                assert!(p.operand2() >= 1);
                assert!(p.answer() >= 1);
                assert_eq!(p.operand1() % p.operand2(), 0);
                assert_eq!(p.operand1(), p.operand2() * p.answer());
                assert!(p.operand1() >= p.operand2());
                assert!(p.operand1() <= i64::from(range.1) * 2);
            }
        }
    }

    #[test]
    fn division_falls_back_when_redraws_are_disabled() {
        let generator = ProblemGenerator::new(GeneratorConfig::new(0));
        let mut rng = StdRng::seed_from_u64(17);
        let level = level(&[Operator::Divide], (10, 50), 5, false);
        for _ in 0..500 {
            let p = generator.generate(&level, DifficultyFactor::default(), &mut rng);
            assert!(p.is_consistent());
            assert!(p.operand1() <= 100);
        }
    }

    #[test]
    fn multiplication_respects_caps() {
        let generator = ProblemGenerator::default();
        let mut rng = StdRng::seed_from_u64(19);
        let easy = level(&[Operator::Multiply], (1, 50), 2, false);
        let hard = level(&[Operator::Multiply], (1, 50), 3, false);
        for _ in 0..300 {
            let p = generator.generate(&easy, DifficultyFactor::default(), &mut rng);
            assert!(p.operand1() <= 12 && p.operand2() <= 12);
            let p = generator.generate(&hard, DifficultyFactor::default(), &mut rng);
            assert!(p.operand1() <= 20 && p.operand2() <= 20);
        }
    }

    #[test]
    fn non_speed_levels_ignore_factor() {
        let level = level(&[Operator::Add], (10, 20), 1, false);
        let range = EffectiveRange::for_level(&level, DifficultyFactor::new(2.0));
        assert_eq!(range, EffectiveRange { min: 10, max: 20 });
    }

    #[test]
    fn speed_levels_scale_range() {
        let speedy = level(&[Operator::Add], (10, 99), 5, true);
        let up = EffectiveRange::for_level(&speedy, DifficultyFactor::new(1.5));
        assert_eq!(up, EffectiveRange { min: 15, max: 148 });
        let down = EffectiveRange::for_level(&speedy, DifficultyFactor::new(0.5));
        assert_eq!(down, EffectiveRange { min: 5, max: 49 });

        let tiny = level(&[Operator::Add], (1, 1), 1, true);
        let range = EffectiveRange::for_level(&tiny, DifficultyFactor::new(0.5));
        assert_eq!(range, EffectiveRange { min: 1, max: 2 });
    }

    #[test]
    fn generate_for_level_fills_problem_count() {
        let mut draft = LevelDraft::new("count", "Count");
        draft.problem_count = 15;
        let level = draft.validate().unwrap();
        let problems =
            ProblemGenerator::default().generate_for_level(&level, &mut StdRng::seed_from_u64(3));
        assert_eq!(problems.len(), 15);
        let mut ids: Vec<_> = problems.iter().map(Problem::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 15);
    }

    #[test]
    fn check_answer_is_exact_equality() {
        for a in -20..=20 {
            assert!(check_answer(a, a));
            assert!(!check_answer(a, a + 1));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let level = level(&Operator::ALL, (1, 50), 4, false);
        let generator = ProblemGenerator::default();
        let a = generator.generate_for_level(&level, &mut StdRng::seed_from_u64(99));
        let b = generator.generate_for_level(&level, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
