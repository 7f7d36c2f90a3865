use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::prompts::{CHAT_TURN_INSTRUCTIONS, QUIZ_RUN_INSTRUCTIONS};
use crate::errors::{AppError, AppResult};
use crate::models::domain::document::{Document, DocumentSummary};
use crate::models::domain::{Conversation, Quiz, QuizReport, Turn};
use crate::models::dto::quiz_dto::decode_quiz_items;
use crate::platform::AssistantPlatform;
use crate::services::document_registry::{DocumentRegistry, RemovalOutcome};
use crate::services::job_poller::JobPoller;
use crate::services::output_parsing::extract_json_array;
use crate::services::quiz_grading_service::QuizGradingService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No documents tracked.
    Empty,
    /// Documents exist but index/assistant are not both provisioned yet.
    Indexing,
    /// Chat and quiz operations permitted.
    Ready,
}

/// One user's session: owns the registry, both conversations and the pending
/// quiz, and drives the Empty -> Indexing -> Ready lifecycle. Callers
/// serialize requests per session; there is no internal locking.
pub struct SessionService {
    config: Arc<Config>,
    platform: Arc<dyn AssistantPlatform>,
    registry: DocumentRegistry,
    poller: JobPoller,
    chat: Option<Conversation>,
    quiz_conversation_id: Option<String>,
    quiz: Option<Quiz>,
}

impl SessionService {
    pub fn new(config: Arc<Config>, platform: Arc<dyn AssistantPlatform>) -> AppResult<Self> {
        let registry = DocumentRegistry::new(Arc::clone(&platform), &config)?;
        let poller = JobPoller::new(Arc::clone(&platform));

        Ok(Self {
            config,
            platform,
            registry,
            poller,
            chat: None,
            quiz_conversation_id: None,
            quiz: None,
        })
    }

    pub fn state(&self) -> SessionState {
        if !self.registry.has_documents() {
            return SessionState::Empty;
        }
        if self.registry.index_id().is_some() && self.registry.assistant_id().is_some() {
            SessionState::Ready
        } else {
            SessionState::Indexing
        }
    }

    /// Validate, stage and upload a new document. When an index is already
    /// active the file is attached to it incrementally; the index is never
    /// rebuilt for an add.
    pub async fn add_document(&mut self, display_name: &str, bytes: &[u8]) -> AppResult<Document> {
        let staged = self.registry.add(display_name, bytes)?;

        let remote_id = self
            .platform
            .upload_file(&staged.local_path, display_name)
            .await?;
        self.registry.attach_remote_id(display_name, &remote_id)?;

        if let Some(index_id) = self.registry.index_id().map(str::to_string) {
            self.platform
                .attach_file_to_index(&index_id, &remote_id)
                .await?;
            log::info!("Attached '{display_name}' to existing index {index_id}");
        }

        self.registry
            .get(display_name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No document named '{display_name}'")))
    }

    /// Convenience wrapper reading the document bytes from disk.
    pub async fn add_document_from_path(&mut self, path: &Path) -> AppResult<Document> {
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Path has no file name: {}", path.display()))
            })?;
        let bytes = tokio::fs::read(path).await?;

        self.add_document(&display_name, &bytes).await
    }

    /// Drive the session towards `Ready`: tear down stale identifiers when
    /// the document set is empty, otherwise provision the index and the
    /// assistant. Idempotent: an index recorded by an earlier partial run is
    /// reused, never recreated.
    pub async fn ensure_ready(&mut self) -> AppResult<SessionState> {
        if !self.registry.has_documents() {
            if self.registry.needs_resync() {
                self.reset_derived_state();
            }
            return Ok(SessionState::Empty);
        }

        let index_id = match self.registry.index_id() {
            Some(existing) => existing.to_string(),
            None => {
                let index_id = self.platform.create_index(&self.config.index_name).await?;
                self.registry.record_index_id(&index_id);
                for file_id in self.registry.remote_ids() {
                    self.platform
                        .attach_file_to_index(&index_id, &file_id)
                        .await?;
                }
                index_id
            }
        };

        if self.registry.assistant_id().is_none() {
            let assistant_id = self
                .platform
                .create_assistant(
                    &self.config.assistant_name,
                    &self.config.assistant_instructions,
                    &self.config.model,
                    std::slice::from_ref(&index_id),
                )
                .await?;
            self.registry.record_assistant_id(&assistant_id);
        }

        Ok(SessionState::Ready)
    }

    /// One conversational turn: appends the prompt to the chat conversation,
    /// waits for the assistant's reply and returns it rendered with its
    /// citations. The local turn history mirrors the remote one.
    pub async fn send_chat_message(&mut self, prompt: &str) -> AppResult<String> {
        if self.ensure_ready().await? != SessionState::Ready {
            return Err(AppError::InvalidInput(
                "Upload at least one document before chatting".to_string(),
            ));
        }
        let assistant_id = self.assistant_id()?;

        let conversation_id = match &self.chat {
            Some(chat) => chat.remote_thread_id.clone(),
            None => {
                let thread_id = self.platform.create_conversation().await?;
                self.chat = Some(Conversation::new(thread_id.clone()));
                thread_id
            }
        };

        if let Some(chat) = &mut self.chat {
            chat.push_user(prompt);
        }

        let message = self
            .poller
            .submit_and_await(
                &conversation_id,
                &assistant_id,
                prompt,
                Some(CHAT_TURN_INSTRUCTIONS),
                self.config.chat_timeout(),
                self.config.chat_poll_interval(),
            )
            .await?;

        let reply = message.rendered(&self.source_label());
        if let Some(chat) = &mut self.chat {
            chat.push_assistant(reply.clone());
        }
        Ok(reply)
    }

    /// Generate a quiz from the indexed documents. Runs on its own
    /// conversation so quiz traffic never interleaves with the chat history;
    /// the decoded quiz is stored for one later grading call.
    pub async fn generate_quiz(&mut self) -> AppResult<Quiz> {
        if self.ensure_ready().await? == SessionState::Empty {
            return Err(AppError::InvalidInput(
                "Upload at least one document before generating a quiz".to_string(),
            ));
        }
        let assistant_id = self.assistant_id()?;

        let conversation_id = match &self.quiz_conversation_id {
            Some(existing) => existing.clone(),
            None => {
                let thread_id = self.platform.create_conversation().await?;
                self.quiz_conversation_id = Some(thread_id.clone());
                thread_id
            }
        };

        let prompt = self.config.quiz_prompt.clone();
        let message = self
            .poller
            .submit_and_await(
                &conversation_id,
                &assistant_id,
                &prompt,
                Some(QUIZ_RUN_INSTRUCTIONS),
                self.config.quiz_timeout(),
                self.config.quiz_poll_interval(),
            )
            .await?;

        let records = extract_json_array(&message.text)?;
        let quiz = Quiz::new(decode_quiz_items(records)?);
        log::info!("Generated a {}-question quiz", quiz.len());

        self.quiz = Some(quiz.clone());
        Ok(quiz)
    }

    /// Grade the stored quiz against one selection per question. The quiz is
    /// consumed by a successful grading call.
    pub fn submit_quiz_answers(&mut self, selections: &[String]) -> AppResult<QuizReport> {
        let quiz = self
            .quiz
            .as_ref()
            .ok_or_else(|| AppError::NotFound("No quiz awaiting answers; generate one first".to_string()))?;

        let report = QuizGradingService::grade(quiz, selections)?;
        self.quiz = None;
        Ok(report)
    }

    /// Remove a document. When the last document goes, the session falls back
    /// to `Empty`: identifiers are cleared and cached conversation/quiz state
    /// is dropped so nothing stale is served against a dead index.
    pub async fn remove_document(&mut self, name: &str) -> AppResult<RemovalOutcome> {
        let outcome = self.registry.remove(name).await?;
        if !outcome.fully_cleaned {
            log::warn!("'{name}' removed locally; remote cleanup may be incomplete");
        }

        if !self.registry.has_documents() {
            self.reset_derived_state();
        }
        Ok(outcome)
    }

    pub fn documents(&self) -> Vec<DocumentSummary> {
        self.registry.summaries()
    }

    pub fn chat_history(&self) -> &[Turn] {
        self.chat.as_ref().map(|c| c.turns.as_slice()).unwrap_or(&[])
    }

    pub fn current_quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    fn assistant_id(&self) -> AppResult<String> {
        self.registry
            .assistant_id()
            .map(str::to_string)
            .ok_or_else(|| AppError::NotFound("No assistant provisioned".to_string()))
    }

    fn source_label(&self) -> String {
        let names = self.registry.display_names();
        if names.is_empty() {
            "uploaded document".to_string()
        } else {
            names.join(", ")
        }
    }

    fn reset_derived_state(&mut self) {
        self.registry.teardown();
        self.chat = None;
        self.quiz_conversation_id = None;
        self.quiz = None;
        log::info!("Session reset to empty state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockAssistantPlatform;
    use crate::test_utils::fixtures::sample_quiz;

    fn session() -> SessionService {
        SessionService::new(
            Arc::new(Config::test_config()),
            Arc::new(MockAssistantPlatform::new()),
        )
        .expect("session should build")
    }

    #[test]
    fn a_fresh_session_is_empty() {
        let session = session();

        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.chat_history().is_empty());
        assert!(session.documents().is_empty());
        assert!(session.current_quiz().is_none());
    }

    #[test]
    fn grading_without_a_stored_quiz_fails() {
        let mut session = session();

        let err = session.submit_quiz_answers(&[]).unwrap_err();
        assert_eq!(err.category(), "NOT_FOUND");
    }

    #[test]
    fn grading_consumes_the_stored_quiz() {
        let mut session = session();
        session.quiz = Some(sample_quiz());

        let selections = vec![
            "Validating blocks".to_string(),
            "A distributed ledger".to_string(),
        ];
        let report = session.submit_quiz_answers(&selections).expect("grade");

        assert_eq!(report.score, 2);
        assert!(session.current_quiz().is_none());
        assert!(session.submit_quiz_answers(&selections).is_err());
    }

    #[test]
    fn a_failed_grading_call_keeps_the_quiz() {
        let mut session = session();
        session.quiz = Some(sample_quiz());

        let err = session.submit_quiz_answers(&[]).unwrap_err();
        assert_eq!(err.category(), "INVALID_INPUT");
        assert!(session.current_quiz().is_some());
    }

    #[tokio::test]
    async fn chatting_with_no_documents_is_rejected() {
        let mut session = session();

        let err = session.send_chat_message("hello").await.unwrap_err();
        assert_eq!(err.category(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn quiz_generation_with_no_documents_is_rejected() {
        let mut session = session();

        let err = session.generate_quiz().await.unwrap_err();
        assert_eq!(err.category(), "INVALID_INPUT");
    }
}
