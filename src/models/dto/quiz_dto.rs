use serde::Deserialize;
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::QuizItem;

/// Shape of one quiz record as the model is asked to emit it. Field-level
/// checks live on the derive; the cross-field invariant (`correct` must be
/// one of `options`) is enforced in the conversion to the domain type.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuizItemDto {
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub question: String,

    #[validate(length(equal = 4, message = "exactly 4 options are required"))]
    pub options: Vec<String>,

    #[validate(length(min = 1, message = "correct answer must not be empty"))]
    pub correct: String,
}

impl TryFrom<QuizItemDto> for QuizItem {
    type Error = AppError;

    fn try_from(dto: QuizItemDto) -> AppResult<Self> {
        dto.validate().map_err(|err| {
            AppError::InvalidInput(format!("Malformed quiz record '{}': {}", dto.question, err))
        })?;

        if !dto.options.contains(&dto.correct) {
            return Err(AppError::InvalidInput(format!(
                "Quiz record '{}' marks '{}' correct, but it is not among the options",
                dto.question, dto.correct
            )));
        }

        Ok(QuizItem {
            question: dto.question,
            options: dto.options,
            correct: dto.correct,
        })
    }
}

/// Decode the records extracted from model output into validated quiz items.
pub fn decode_quiz_items(records: Vec<serde_json::Value>) -> AppResult<Vec<QuizItem>> {
    records
        .into_iter()
        .enumerate()
        .map(|(position, record)| {
            let dto: QuizItemDto = serde_json::from_value(record).map_err(|err| {
                AppError::InvalidInput(format!(
                    "Quiz record {} is not a question/options/correct object: {}",
                    position + 1,
                    err
                ))
            })?;
            QuizItem::try_from(dto)
        })
        .collect()
}
