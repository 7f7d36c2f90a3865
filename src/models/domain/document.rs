use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded document tracked for the lifetime of a session.
///
/// `remote_id` stays `None` until the upload to the remote store succeeds.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Document {
    pub display_name: String,
    pub local_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub size_bytes: u64,
    pub kind: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(display_name: &str, local_path: PathBuf, size_bytes: u64, kind: &str) -> Self {
        Document {
            display_name: display_name.to_string(),
            local_path,
            remote_id: None,
            size_bytes,
            kind: kind.to_string(),
            uploaded_at: Utc::now(),
        }
    }

    pub fn size_mb(&self) -> f64 {
        (self.size_bytes as f64 / (1024.0 * 1024.0) * 10.0).round() / 10.0
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            name: self.display_name.clone(),
            size: format!("{:.1}MB", self.size_mb()),
            kind: self.kind.clone(),
            uploaded_at: self.uploaded_at,
        }
    }
}

/// Display-oriented view of a tracked document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub name: String,
    pub size: String,
    pub kind: String,
    pub uploaded_at: DateTime<Utc>,
}
