use serde::{Deserialize, Serialize};

/// One multiple-choice question. Invariants (four options, `correct` among
/// them) are enforced when decoding model output into this type.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
}

/// An ordered quiz produced by one generation job, consumed once for grading.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub items: Vec<QuizItem>,
}

impl Quiz {
    pub fn new(items: Vec<QuizItem>) -> Self {
        Quiz { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outcome of grading one submitted answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizItemResult {
    pub index: usize,
    pub is_correct: bool,
    pub expected: String,
    pub selected: String,
}

/// Result of grading a full quiz submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizReport {
    pub score: usize,
    pub total: usize,
    pub results: Vec<QuizItemResult>,
}
