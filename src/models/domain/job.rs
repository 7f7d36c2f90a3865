use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote job status as tracked locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    Expired,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled | JobStatus::Expired
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::InProgress => write!(f, "in_progress"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
            JobStatus::Expired => write!(f, "expired"),
        }
    }
}

/// One remote unit of work against a conversation + assistant pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub remote_run_id: String,
    pub conversation_id: String,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn submitted(remote_run_id: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Job {
            remote_run_id: remote_run_id.into(),
            conversation_id: conversation_id.into(),
            status: JobStatus::Queued,
            submitted_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Record the latest observed status, stamping completion on terminal states.
    pub fn observe(&mut self, status: JobStatus) {
        self.status = status;
        if status.is_terminal() && self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
    }
}
