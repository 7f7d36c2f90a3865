pub mod fixtures {
    use crate::models::domain::quiz::{Quiz, QuizItem};

    /// A two-question quiz with known answers for grading tests.
    pub fn sample_quiz() -> Quiz {
        Quiz::new(vec![
            QuizItem {
                question: "What is mining?".to_string(),
                options: vec![
                    "Validating blocks".to_string(),
                    "Printing money".to_string(),
                    "Selling hardware".to_string(),
                    "Hosting wallets".to_string(),
                ],
                correct: "Validating blocks".to_string(),
            },
            QuizItem {
                question: "What is a blockchain?".to_string(),
                options: vec![
                    "A distributed ledger".to_string(),
                    "A wallet".to_string(),
                    "A mining rig".to_string(),
                    "An exchange".to_string(),
                ],
                correct: "A distributed ledger".to_string(),
            },
        ])
    }

    /// The sample quiz as the strict-JSON text the generation prompt asks for.
    pub fn sample_quiz_json() -> String {
        serde_json::to_string(&sample_quiz().items).expect("fixture quiz serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_sample_quiz() {
        let quiz = sample_quiz();
        assert_eq!(quiz.len(), 2);
        assert!(quiz.items[0].options.contains(&quiz.items[0].correct));
    }

    #[test]
    fn test_fixtures_sample_quiz_json_is_an_array() {
        let json = sample_quiz_json();
        assert!(json.starts_with('['));
        assert!(json.ends_with(']'));
    }
}
