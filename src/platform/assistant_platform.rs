use std::path::Path;

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::domain::{AssistantMessage, JobStatus};

/// The remote assistant platform, reduced to the operations this crate
/// consumes. Every call is an opaque remote operation returning an identifier
/// or failing with a transport-level `AppError::Platform`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssistantPlatform: Send + Sync {
    /// Upload a stored file, returning its remote id.
    async fn upload_file(&self, local_path: &Path, display_name: &str) -> AppResult<String>;

    /// Delete a stored file.
    async fn delete_file(&self, file_id: &str) -> AppResult<()>;

    /// Create a semantic search index, returning its remote id.
    async fn create_index(&self, name: &str) -> AppResult<String>;

    /// Attach an uploaded file to an index.
    async fn attach_file_to_index(&self, index_id: &str, file_id: &str) -> AppResult<()>;

    /// Detach a file from an index.
    async fn detach_file_from_index(&self, index_id: &str, file_id: &str) -> AppResult<()>;

    /// Create an assistant bound to the given indexes, with retrieval enabled.
    async fn create_assistant(
        &self,
        name: &str,
        instructions: &str,
        model: &str,
        index_ids: &[String],
    ) -> AppResult<String>;

    /// Create a conversation, returning its remote id.
    async fn create_conversation(&self) -> AppResult<String>;

    /// Append a user-authored turn to a conversation.
    async fn append_user_turn(&self, conversation_id: &str, content: &str) -> AppResult<()>;

    /// Start a job against a conversation + assistant pair, optionally
    /// overriding the assistant's instructions for this job only.
    async fn start_job<'a>(
        &self,
        conversation_id: &str,
        assistant_id: &str,
        instructions: Option<&'a str>,
    ) -> AppResult<String>;

    /// Poll a job's current status.
    async fn job_status(&self, conversation_id: &str, run_id: &str) -> AppResult<JobStatus>;

    /// List the assistant-authored turns produced by one specific job.
    async fn assistant_turns_for_job(
        &self,
        conversation_id: &str,
        run_id: &str,
    ) -> AppResult<Vec<AssistantMessage>>;
}
