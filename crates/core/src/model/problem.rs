use crate::model::ids::ProblemId;
use crate::model::operator::Operator;

/// A single generated arithmetic question and its answer.
///
/// `operand1 OP operand2 == answer` holds for every value the generator hands out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    id: ProblemId,
    operand1: i64,
    operand2: i64,
    operator: Operator,
    answer: i64,
}

impl Problem {
    pub(crate) fn new(
        id: ProblemId,
        operand1: i64,
        operand2: i64,
        operator: Operator,
        answer: i64,
    ) -> Self {
        Self {
            id,
            operand1,
            operand2,
            operator,
            answer,
        }
    }

    #[must_use]
    pub fn id(&self) -> ProblemId {
        self.id
    }

    #[must_use]
    pub fn operand1(&self) -> i64 {
        self.operand1
    }

    #[must_use]
    pub fn operand2(&self) -> i64 {
        self.operand2
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn symbol(&self) -> char {
        self.operator.symbol()
    }

    #[must_use]
    pub fn answer(&self) -> i64 {
        self.answer
    }

    /// Rendered question, e.g. `"12 ÷ 4 = ?"`.
    #[must_use]
    pub fn question_text(&self) -> String {
        format!("{} {} {} = ?", self.operand1, self.symbol(), self.operand2)
    }

    /// Re-derives the answer from the operands and compares it to the stored one.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.operator.apply(self.operand1, self.operand2) == Some(self.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_text_uses_display_symbol() {
        let problem = Problem::new(
            ProblemId::from_random_bytes([1; 16]),
            12,
            4,
            Operator::Divide,
            3,
        );
        assert_eq!(problem.question_text(), "12 ÷ 4 = ?");
        assert!(problem.is_consistent());
    }

    #[test]
    fn inconsistent_answer_is_detected() {
        let problem = Problem::new(
            ProblemId::from_random_bytes([2; 16]),
            3,
            4,
            Operator::Multiply,
            7,
        );
        assert!(!problem.is_consistent());
    }
}
