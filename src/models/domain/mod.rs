pub mod conversation;
pub mod document;
pub mod job;
pub mod quiz;

pub use conversation::{AssistantMessage, Citation, Conversation, Role, Turn};
pub use document::Document;
pub use job::{Job, JobStatus};
pub use quiz::{Quiz, QuizItem, QuizReport};
