use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{AppError, AppResult, ValidationError};
use crate::models::domain::document::{Document, DocumentSummary};
use crate::platform::AssistantPlatform;

/// Result of removing a document. The document is gone locally either way;
/// `fully_cleaned` is false when a best-effort remote cleanup step failed and
/// the caller should surface a degraded-success warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub fully_cleaned: bool,
}

/// Session-scoped registry of uploaded documents and the identifiers of the
/// remote resources derived from them (index, assistant). All mutations of
/// those identifiers go through this type so the lifecycle invariants are
/// enforced in one place.
pub struct DocumentRegistry {
    platform: Arc<dyn AssistantPlatform>,
    supported_extensions: HashSet<String>,
    max_file_size_mb: u64,
    staging_dir: TempDir,
    documents: Vec<Document>,
    index_id: Option<String>,
    assistant_id: Option<String>,
}

impl DocumentRegistry {
    pub fn new(platform: Arc<dyn AssistantPlatform>, config: &Config) -> AppResult<Self> {
        let staging_dir = TempDir::new()?;

        Ok(Self {
            platform,
            supported_extensions: config.supported_extensions.clone(),
            max_file_size_mb: config.max_file_size_mb,
            staging_dir,
            documents: Vec::new(),
            index_id: None,
            assistant_id: None,
        })
    }

    /// Validate and track a new document, staging a local copy of its bytes.
    /// Validation happens before anything is written, so a rejected add
    /// leaves no trace.
    pub fn add(&mut self, display_name: &str, bytes: &[u8]) -> AppResult<Document> {
        let extension = file_extension(display_name);
        if !self.supported_extensions.contains(&extension) {
            return Err(ValidationError::UnsupportedType {
                name: display_name.to_string(),
                extension,
            }
            .into());
        }

        let size_bytes = bytes.len() as u64;
        if size_bytes > self.max_file_size_mb * 1024 * 1024 {
            return Err(ValidationError::TooLarge {
                name: display_name.to_string(),
                size_mb: (size_bytes as f64 / (1024.0 * 1024.0) * 10.0).round() / 10.0,
                max_mb: self.max_file_size_mb,
            }
            .into());
        }

        if self.documents.iter().any(|d| d.display_name == display_name) {
            return Err(ValidationError::DuplicateName(display_name.to_string()).into());
        }

        let staged_path = self
            .staging_dir
            .path()
            .join(format!("{}_{display_name}", Uuid::new_v4()));
        std::fs::write(&staged_path, bytes)?;

        let document = Document::new(display_name, staged_path, size_bytes, &extension);
        self.documents.push(document.clone());

        log::info!(
            "Added document '{display_name}' ({:.1}MB)",
            document.size_mb()
        );
        Ok(document)
    }

    /// Record the remote id assigned to an uploaded document. Idempotent.
    pub fn attach_remote_id(&mut self, name: &str, remote_id: &str) -> AppResult<()> {
        let document = self
            .documents
            .iter_mut()
            .find(|d| d.display_name == name)
            .ok_or_else(|| AppError::NotFound(format!("No document named '{name}'")))?;

        document.remote_id = Some(remote_id.to_string());
        log::info!("Recorded remote id for '{name}': {remote_id}");
        Ok(())
    }

    /// Remove a document: detach it from the index and delete the remote file
    /// (both best-effort), then drop it locally along with its staged copy.
    /// Local removal never blocks on remote cleanup failures.
    pub async fn remove(&mut self, name: &str) -> AppResult<RemovalOutcome> {
        let position = self
            .documents
            .iter()
            .position(|d| d.display_name == name)
            .ok_or_else(|| AppError::NotFound(format!("No document named '{name}'")))?;
        let document = self.documents[position].clone();

        let mut fully_cleaned = true;

        if let (Some(index_id), Some(file_id)) =
            (self.index_id.as_deref(), document.remote_id.as_deref())
        {
            if let Err(err) = self.platform.detach_file_from_index(index_id, file_id).await {
                log::warn!("Detach from index failed for '{name}': {err}");
                fully_cleaned = false;
            }
        }

        if let Some(file_id) = document.remote_id.as_deref() {
            if let Err(err) = self.platform.delete_file(file_id).await {
                log::warn!("Remote file delete failed for '{name}': {err}");
                fully_cleaned = false;
            }
        }

        if let Err(err) = std::fs::remove_file(&document.local_path) {
            log::warn!(
                "Failed to clean up staged copy {}: {err}",
                document.local_path.display()
            );
        }

        self.documents.remove(position);
        log::info!("Removed document '{name}'");
        Ok(RemovalOutcome { fully_cleaned })
    }

    /// True when the remote resources are out of step with the document set:
    /// either stale identifiers survive an empty document set, or documents
    /// exist with no index recorded. An index covering only a subset of the
    /// current documents is not detected.
    pub fn needs_resync(&self) -> bool {
        if self.documents.is_empty() {
            return self.index_id.is_some() || self.assistant_id.is_some();
        }
        self.index_id.is_none()
    }

    /// Clear the index/assistant identifiers without contacting the remote
    /// system.
    pub fn teardown(&mut self) {
        self.index_id = None;
        self.assistant_id = None;
        log::info!("Cleared index and assistant identifiers");
    }

    pub fn record_index_id(&mut self, index_id: &str) {
        self.index_id = Some(index_id.to_string());
    }

    pub fn record_assistant_id(&mut self, assistant_id: &str) {
        self.assistant_id = Some(assistant_id.to_string());
    }

    pub fn index_id(&self) -> Option<&str> {
        self.index_id.as_deref()
    }

    pub fn assistant_id(&self) -> Option<&str> {
        self.assistant_id.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.display_name == name)
    }

    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Remote ids of every uploaded document.
    pub fn remote_ids(&self) -> Vec<String> {
        self.documents
            .iter()
            .filter_map(|d| d.remote_id.clone())
            .collect()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.documents
            .iter()
            .map(|d| d.display_name.clone())
            .collect()
    }

    pub fn summaries(&self) -> Vec<DocumentSummary> {
        self.documents.iter().map(Document::summary).collect()
    }
}

fn file_extension(display_name: &str) -> String {
    Path::new(display_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockAssistantPlatform;

    fn registry() -> DocumentRegistry {
        registry_with(MockAssistantPlatform::new())
    }

    fn registry_with(platform: MockAssistantPlatform) -> DocumentRegistry {
        DocumentRegistry::new(Arc::new(platform), &Config::test_config())
            .expect("staging dir should be created")
    }

    #[test]
    fn add_rejects_unsupported_extension_without_side_effects() {
        let mut registry = registry();

        let err = registry.add("malware.exe", b"bytes").unwrap_err();
        assert_eq!(
            err,
            AppError::Validation(ValidationError::UnsupportedType {
                name: "malware.exe".to_string(),
                extension: "exe".to_string(),
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn add_rejects_missing_extension() {
        let mut registry = registry();

        let err = registry.add("README", b"bytes").unwrap_err();
        assert_eq!(err.category(), "VALIDATION");
        assert!(registry.is_empty());
    }

    #[test]
    fn add_rejects_oversized_file() {
        let mut registry = registry();
        registry.max_file_size_mb = 1;

        let bytes = vec![0u8; 2 * 1024 * 1024];
        let err = registry.add("big.pdf", &bytes).unwrap_err();
        assert_eq!(
            err,
            AppError::Validation(ValidationError::TooLarge {
                name: "big.pdf".to_string(),
                size_mb: 2.0,
                max_mb: 1,
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn add_rejects_duplicate_name_with_no_side_effect() {
        let mut registry = registry();

        registry.add("notes.pdf", b"first").expect("first add");
        let err = registry.add("notes.pdf", b"second").unwrap_err();

        assert_eq!(
            err,
            AppError::Validation(ValidationError::DuplicateName("notes.pdf".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn add_stages_a_local_copy() {
        let mut registry = registry();

        let document = registry.add("notes.pdf", b"content").expect("add");
        assert!(document.local_path.exists());
        assert_eq!(std::fs::read(&document.local_path).unwrap(), b"content");
    }

    #[test]
    fn attach_remote_id_is_idempotent() {
        let mut registry = registry();
        registry.add("notes.pdf", b"content").expect("add");

        registry.attach_remote_id("notes.pdf", "file_1").expect("first attach");
        registry.attach_remote_id("notes.pdf", "file_1").expect("repeat attach");

        assert_eq!(
            registry.get("notes.pdf").unwrap().remote_id.as_deref(),
            Some("file_1")
        );
        assert_eq!(registry.remote_ids(), vec!["file_1".to_string()]);
    }

    #[test]
    fn attach_remote_id_for_unknown_document_fails() {
        let mut registry = registry();

        let err = registry.attach_remote_id("ghost.pdf", "file_1").unwrap_err();
        assert_eq!(err.category(), "NOT_FOUND");
    }

    #[test]
    fn needs_resync_truth_table() {
        let mut registry = registry();

        // No documents, no identifiers: steady empty state.
        assert!(!registry.needs_resync());

        // Documents without an index: fresh state requiring creation.
        registry.add("notes.pdf", b"content").expect("add");
        assert!(registry.needs_resync());

        // Documents with an index: steady state.
        registry.record_index_id("vs_1");
        registry.record_assistant_id("asst_1");
        assert!(!registry.needs_resync());

        // Identifiers surviving an empty document set: stale state.
        registry.documents.clear();
        assert!(registry.needs_resync());

        registry.teardown();
        assert!(!registry.needs_resync());
    }

    #[test]
    fn needs_resync_does_not_detect_partial_drift() {
        let mut registry = registry();
        registry.add("one.pdf", b"a").expect("add");
        registry.record_index_id("vs_1");

        // A second document the index never attached still reads as steady.
        registry.add("two.pdf", b"b").expect("add");
        assert!(!registry.needs_resync());
    }

    #[test]
    fn teardown_clears_identifiers() {
        let mut registry = registry();
        registry.record_index_id("vs_1");
        registry.record_assistant_id("asst_1");

        registry.teardown();

        assert!(registry.index_id().is_none());
        assert!(registry.assistant_id().is_none());
    }

    #[tokio::test]
    async fn remove_unknown_document_fails() {
        let mut registry = registry();

        let err = registry.remove("ghost.pdf").await.unwrap_err();
        assert_eq!(err.category(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn remove_cleans_up_remote_and_staged_state() {
        let mut platform = MockAssistantPlatform::new();
        platform
            .expect_detach_file_from_index()
            .times(1)
            .returning(|_, _| Ok(()));
        platform
            .expect_delete_file()
            .times(1)
            .returning(|_| Ok(()));

        let mut registry = registry_with(platform);
        let document = registry.add("notes.pdf", b"content").expect("add");
        registry.attach_remote_id("notes.pdf", "file_1").expect("attach");
        registry.record_index_id("vs_1");

        let outcome = registry.remove("notes.pdf").await.expect("remove");

        assert!(outcome.fully_cleaned);
        assert!(registry.is_empty());
        assert!(!document.local_path.exists());
    }

    #[tokio::test]
    async fn remove_still_succeeds_locally_when_remote_cleanup_fails() {
        let mut platform = MockAssistantPlatform::new();
        platform
            .expect_detach_file_from_index()
            .times(1)
            .returning(|_, _| Err(AppError::Platform("index gone".to_string())));
        platform
            .expect_delete_file()
            .times(1)
            .returning(|_| Err(AppError::Platform("file gone".to_string())));

        let mut registry = registry_with(platform);
        registry.add("notes.pdf", b"content").expect("add");
        registry.attach_remote_id("notes.pdf", "file_1").expect("attach");
        registry.record_index_id("vs_1");

        let outcome = registry.remove("notes.pdf").await.expect("remove");

        assert!(!outcome.fully_cleaned);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn remove_without_remote_id_skips_remote_cleanup() {
        let mut registry = registry();
        registry.add("notes.pdf", b"content").expect("add");

        let outcome = registry.remove("notes.pdf").await.expect("remove");

        assert!(outcome.fully_cleaned);
        assert!(registry.is_empty());
    }
}
