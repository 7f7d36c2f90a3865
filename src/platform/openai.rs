use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::domain::{AssistantMessage, Citation, JobStatus};
use crate::platform::AssistantPlatform;

const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Production `AssistantPlatform` over the OpenAI REST surface: files,
/// vector stores, assistants, threads, messages and runs.
pub struct OpenAiPlatform {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenAiPlatform {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.url(path))
            .bearer_auth(self.api_key.expose_secret())
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(self.url(path))
            .bearer_auth(self.api_key.expose_secret())
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .delete(self.url(path))
            .bearer_auth(self.api_key.expose_secret())
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }
}

/// Fail with the response body included so the caller sees what the platform
/// actually objected to.
async fn check(response: reqwest::Response, operation: &str) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Platform(format!(
        "{operation} returned {status}: {body}"
    )))
}

fn parse_job_status(raw: &str) -> JobStatus {
    match raw {
        "queued" => JobStatus::Queued,
        "in_progress" => JobStatus::InProgress,
        "completed" => JobStatus::Completed,
        "failed" => JobStatus::Failed,
        "cancelled" => JobStatus::Cancelled,
        "expired" => JobStatus::Expired,
        // Transitional states the platform may report between polls.
        "cancelling" | "requires_action" => JobStatus::InProgress,
        other => {
            log::warn!("Unrecognized job status '{other}', treating as failed");
            JobStatus::Failed
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    status: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    role: String,
    #[serde(default)]
    run_id: Option<String>,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
    #[serde(default)]
    annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
struct Annotation {
    text: String,
    #[serde(default)]
    file_citation: Option<FileCitation>,
}

#[derive(Debug, Deserialize)]
struct FileCitation {
    #[serde(default)]
    file_id: Option<String>,
    #[serde(default)]
    quote: Option<String>,
}

/// Collapse a remote message into the internal value type: text parts joined,
/// annotation markers substituted with [n], citations carried alongside.
fn to_assistant_message(message: MessageObject) -> AssistantMessage {
    let mut citations: Vec<Citation> = Vec::new();
    let mut text_parts: Vec<String> = Vec::new();

    for part in message.content {
        if part.kind != "text" {
            continue;
        }
        let Some(text) = part.text else { continue };

        let mut value = text.value;
        for annotation in text.annotations {
            let index = citations.len() + 1;
            value = value.replace(&annotation.text, &format!(" [{index}]"));

            let (quote, file_id) = match annotation.file_citation {
                Some(citation) => (
                    citation.quote.unwrap_or_else(|| "cited text".to_string()),
                    citation.file_id,
                ),
                None => ("cited text".to_string(), None),
            };
            citations.push(Citation {
                index,
                quote,
                file_id,
            });
        }
        text_parts.push(value);
    }

    AssistantMessage {
        text: text_parts.join("\n").trim().to_string(),
        citations,
    }
}

#[async_trait]
impl AssistantPlatform for OpenAiPlatform {
    async fn upload_file(&self, local_path: &Path, display_name: &str) -> AppResult<String> {
        let bytes = tokio::fs::read(local_path).await?;
        let part = multipart::Part::bytes(bytes).file_name(display_name.to_string());
        let form = multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", part);

        let response = self.post("/files").multipart(form).send().await?;
        let created: CreatedObject = check(response, "File upload").await?.json().await?;

        log::info!("Uploaded '{display_name}' as {}", created.id);
        Ok(created.id)
    }

    async fn delete_file(&self, file_id: &str) -> AppResult<()> {
        let response = self.delete(&format!("/files/{file_id}")).send().await?;
        check(response, "File delete").await?;
        Ok(())
    }

    async fn create_index(&self, name: &str) -> AppResult<String> {
        let response = self
            .post("/vector_stores")
            .json(&json!({ "name": name }))
            .send()
            .await?;
        let created: CreatedObject = check(response, "Index create").await?.json().await?;

        log::info!("Created index {}", created.id);
        Ok(created.id)
    }

    async fn attach_file_to_index(&self, index_id: &str, file_id: &str) -> AppResult<()> {
        let response = self
            .post(&format!("/vector_stores/{index_id}/files"))
            .json(&json!({ "file_id": file_id }))
            .send()
            .await?;
        check(response, "Index attach").await?;
        Ok(())
    }

    async fn detach_file_from_index(&self, index_id: &str, file_id: &str) -> AppResult<()> {
        let response = self
            .delete(&format!("/vector_stores/{index_id}/files/{file_id}"))
            .send()
            .await?;
        check(response, "Index detach").await?;
        Ok(())
    }

    async fn create_assistant(
        &self,
        name: &str,
        instructions: &str,
        model: &str,
        index_ids: &[String],
    ) -> AppResult<String> {
        let response = self
            .post("/assistants")
            .json(&json!({
                "name": name,
                "instructions": instructions,
                "model": model,
                "tools": [{ "type": "file_search" }],
                "tool_resources": { "file_search": { "vector_store_ids": index_ids } },
            }))
            .send()
            .await?;
        let created: CreatedObject = check(response, "Assistant create").await?.json().await?;

        log::info!("Created assistant {}", created.id);
        Ok(created.id)
    }

    async fn create_conversation(&self) -> AppResult<String> {
        let response = self.post("/threads").json(&json!({})).send().await?;
        let created: CreatedObject = check(response, "Conversation create").await?.json().await?;
        Ok(created.id)
    }

    async fn append_user_turn(&self, conversation_id: &str, content: &str) -> AppResult<()> {
        let response = self
            .post(&format!("/threads/{conversation_id}/messages"))
            .json(&json!({ "role": "user", "content": content }))
            .send()
            .await?;
        check(response, "Turn append").await?;
        Ok(())
    }

    async fn start_job<'a>(
        &self,
        conversation_id: &str,
        assistant_id: &str,
        instructions: Option<&'a str>,
    ) -> AppResult<String> {
        let mut body = json!({ "assistant_id": assistant_id });
        if let Some(instructions) = instructions {
            body["instructions"] = json!(instructions);
        }

        let response = self
            .post(&format!("/threads/{conversation_id}/runs"))
            .json(&body)
            .send()
            .await?;
        let created: CreatedObject = check(response, "Job start").await?.json().await?;
        Ok(created.id)
    }

    async fn job_status(&self, conversation_id: &str, run_id: &str) -> AppResult<JobStatus> {
        let response = self
            .get(&format!("/threads/{conversation_id}/runs/{run_id}"))
            .send()
            .await?;
        let run: RunObject = check(response, "Job status").await?.json().await?;
        Ok(parse_job_status(&run.status))
    }

    async fn assistant_turns_for_job(
        &self,
        conversation_id: &str,
        run_id: &str,
    ) -> AppResult<Vec<AssistantMessage>> {
        let response = self
            .get(&format!("/threads/{conversation_id}/messages"))
            .query(&[("run_id", run_id)])
            .send()
            .await?;
        let list: MessageList = check(response, "Turn list").await?.json().await?;

        Ok(list
            .data
            .into_iter()
            .filter(|message| {
                message.role == "assistant" && message.run_id.as_deref() == Some(run_id)
            })
            .map(to_assistant_message)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_job_status_maps_known_states() {
        assert_eq!(parse_job_status("queued"), JobStatus::Queued);
        assert_eq!(parse_job_status("in_progress"), JobStatus::InProgress);
        assert_eq!(parse_job_status("completed"), JobStatus::Completed);
        assert_eq!(parse_job_status("expired"), JobStatus::Expired);
    }

    #[test]
    fn parse_job_status_treats_transitional_states_as_in_progress() {
        assert_eq!(parse_job_status("cancelling"), JobStatus::InProgress);
        assert_eq!(parse_job_status("requires_action"), JobStatus::InProgress);
    }

    #[test]
    fn parse_job_status_treats_unknown_states_as_failed() {
        assert_eq!(parse_job_status("weird_state"), JobStatus::Failed);
    }

    #[test]
    fn to_assistant_message_substitutes_markers_and_collects_citations() {
        let message: MessageObject = serde_json::from_value(serde_json::json!({
            "role": "assistant",
            "run_id": "run_1",
            "content": [{
                "type": "text",
                "text": {
                    "value": "Mining secures the ledger【4:0†source】.",
                    "annotations": [{
                        "text": "【4:0†source】",
                        "file_citation": { "file_id": "file_1", "quote": "miners validate blocks" }
                    }]
                }
            }]
        }))
        .expect("payload should deserialize");

        let converted = to_assistant_message(message);
        assert_eq!(converted.text, "Mining secures the ledger [1].");
        assert_eq!(converted.citations.len(), 1);
        assert_eq!(converted.citations[0].quote, "miners validate blocks");
        assert_eq!(converted.citations[0].file_id.as_deref(), Some("file_1"));
    }

    #[test]
    fn to_assistant_message_skips_non_text_parts() {
        let message: MessageObject = serde_json::from_value(serde_json::json!({
            "role": "assistant",
            "content": [
                { "type": "image_file" },
                { "type": "text", "text": { "value": "plain reply", "annotations": [] } }
            ]
        }))
        .expect("payload should deserialize");

        let converted = to_assistant_message(message);
        assert_eq!(converted.text, "plain reply");
        assert!(converted.citations.is_empty());
    }
}
