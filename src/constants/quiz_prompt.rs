/// Prompt appended to the quiz conversation to request a machine-readable quiz.
/// The extraction layer still tolerates fenced or prose-wrapped replies.
pub const QUIZ_GENERATION_PROMPT: &str = r#"Using the uploaded document(s) attached to this assistant, generate a multiple-choice quiz with 3 questions. For each question, provide 4 options and indicate the correct answer. Respond with STRICT JSON only in the format:
[
  {
    "question": "<question text>",
    "options": ["option1", "option2", "option3", "option4"],
    "correct": "<correct option>"
  }
]
Do not include any prose or code fences."#;
