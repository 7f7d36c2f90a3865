use crate::errors::{AppError, AppResult};
use crate::models::domain::quiz::{Quiz, QuizItemResult, QuizReport};

/// Grades quiz submissions against the stored answer key.
pub struct QuizGradingService;

impl QuizGradingService {
    /// Score one selection per item, in order. Comparison is exact string
    /// equality, case-sensitive, no normalization.
    pub fn grade(quiz: &Quiz, selections: &[String]) -> AppResult<QuizReport> {
        if selections.len() != quiz.len() {
            return Err(AppError::InvalidInput(format!(
                "Expected {} answers, got {}",
                quiz.len(),
                selections.len()
            )));
        }

        let mut score = 0;
        let results: Vec<QuizItemResult> = quiz
            .items
            .iter()
            .zip(selections)
            .enumerate()
            .map(|(index, (item, selected))| {
                let is_correct = item.correct == *selected;
                if is_correct {
                    score += 1;
                }
                QuizItemResult {
                    index,
                    is_correct,
                    expected: item.correct.clone(),
                    selected: selected.clone(),
                }
            })
            .collect();

        Ok(QuizReport {
            score,
            total: quiz.len(),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::sample_quiz;

    #[test]
    fn one_match_out_of_two_scores_exactly_one() {
        let quiz = sample_quiz();
        let selections = vec!["Validating blocks".to_string(), "A wallet".to_string()];

        let report = QuizGradingService::grade(&quiz, &selections).expect("grade");

        assert_eq!(report.score, 1);
        assert_eq!(report.total, 2);
        assert!(report.results[0].is_correct);
        assert!(!report.results[1].is_correct);
        assert_eq!(report.results[1].expected, "A distributed ledger");
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let quiz = sample_quiz();
        let selections = vec![
            "validating blocks".to_string(),
            "A distributed ledger".to_string(),
        ];

        let report = QuizGradingService::grade(&quiz, &selections).expect("grade");

        assert_eq!(report.score, 1);
        assert!(!report.results[0].is_correct);
    }

    #[test]
    fn mismatched_selection_count_is_rejected() {
        let quiz = sample_quiz();
        let selections = vec!["Validating blocks".to_string()];

        let err = QuizGradingService::grade(&quiz, &selections).unwrap_err();
        assert_eq!(err.category(), "INVALID_INPUT");
    }
}
