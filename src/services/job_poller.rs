use std::sync::Arc;
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{AssistantMessage, Job, JobStatus};
use crate::platform::AssistantPlatform;

/// Submits one unit of work to the remote assistant and waits for its result.
///
/// The wait is a fixed-interval poll on the calling task; callers that need
/// responsiveness run the whole call on its own task. A timeout abandons the
/// local wait only; the remote job is left running.
pub struct JobPoller {
    platform: Arc<dyn AssistantPlatform>,
}

impl JobPoller {
    pub fn new(platform: Arc<dyn AssistantPlatform>) -> Self {
        Self { platform }
    }

    /// Append `content` as a user turn, start a job, poll it to a terminal
    /// state, and fetch the assistant turn produced by this specific job.
    ///
    /// Errors mid-flow propagate immediately; there is no internal retry.
    /// Retrying means resubmitting the whole operation.
    pub async fn submit_and_await(
        &self,
        conversation_id: &str,
        assistant_id: &str,
        content: &str,
        extra_instructions: Option<&str>,
        timeout: Duration,
        poll_interval: Duration,
    ) -> AppResult<AssistantMessage> {
        self.platform
            .append_user_turn(conversation_id, content)
            .await?;

        let run_id = self
            .platform
            .start_job(conversation_id, assistant_id, extra_instructions)
            .await?;
        let mut job = Job::submitted(run_id, conversation_id);
        log::info!(
            "Submitted job {} on conversation {conversation_id}",
            job.remote_run_id
        );

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let status = self
                .platform
                .job_status(conversation_id, &job.remote_run_id)
                .await?;
            job.observe(status);

            if status.is_terminal() {
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                log::warn!(
                    "Job {} still '{status}' after {}s; abandoning the wait",
                    job.remote_run_id,
                    timeout.as_secs()
                );
                return Err(AppError::JobTimeout {
                    run_id: job.remote_run_id,
                    timeout_secs: timeout.as_secs(),
                });
            }

            tokio::time::sleep(poll_interval).await;
        }

        if job.status != JobStatus::Completed {
            return Err(AppError::JobFailed {
                run_id: job.remote_run_id,
                status: job.status,
            });
        }

        let turns = self
            .platform
            .assistant_turns_for_job(conversation_id, &job.remote_run_id)
            .await?;
        let message = turns.into_iter().next().ok_or_else(|| {
            AppError::Platform(format!(
                "Job {} completed but produced no assistant turn",
                job.remote_run_id
            ))
        })?;

        log::info!("Job {} completed", job.remote_run_id);
        Ok(message)
    }
}
