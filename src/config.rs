use std::collections::HashSet;
use std::env;
use std::time::Duration;

use secrecy::SecretString;

use crate::constants::prompts::ASSISTANT_INSTRUCTIONS;
use crate::constants::quiz_prompt::QUIZ_GENERATION_PROMPT;

/// Extensions the remote retrieval service can index.
const DEFAULT_SUPPORTED_EXTS: &[&str] = &[
    "pdf", "txt", "md", "docx", "pptx", "csv", "json", "html", "py", "java", "rb", "tex", "c",
    "cpp",
];

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub api_base_url: String,
    pub model: String,
    pub assistant_name: String,
    pub index_name: String,
    pub supported_extensions: HashSet<String>,
    pub max_file_size_mb: u64,
    pub chat_timeout_secs: u64,
    pub quiz_timeout_secs: u64,
    pub chat_poll_interval_secs: u64,
    pub quiz_poll_interval_secs: u64,
    pub assistant_instructions: String,
    pub quiz_prompt: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api_key: SecretString::from(env::var("OPENAI_API_KEY").unwrap_or_default()),
            api_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4-1106-preview".to_string()),
            assistant_name: env::var("ASSISTANT_NAME")
                .unwrap_or_else(|_| "Study Buddy".to_string()),
            index_name: env::var("INDEX_NAME")
                .unwrap_or_else(|_| "StudyBuddyVectorStore".to_string()),
            supported_extensions: env::var("SUPPORTED_EXTS")
                .map(|raw| {
                    raw.split(',')
                        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                        .filter(|ext| !ext.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| default_extensions()),
            max_file_size_mb: env_u64("MAX_FILE_SIZE_MB", 200),
            chat_timeout_secs: env_u64("CHAT_RESPONSE_TIMEOUT", 120),
            quiz_timeout_secs: env_u64("QUIZ_GENERATION_TIMEOUT", 120),
            chat_poll_interval_secs: env_u64("CHAT_POLL_INTERVAL", 1),
            quiz_poll_interval_secs: env_u64("QUIZ_POLL_INTERVAL", 5),
            assistant_instructions: env::var("ASSISTANT_INSTRUCTIONS")
                .unwrap_or_else(|_| ASSISTANT_INSTRUCTIONS.to_string()),
            quiz_prompt: env::var("QUIZ_GENERATION_PROMPT")
                .unwrap_or_else(|_| QUIZ_GENERATION_PROMPT.to_string()),
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_secs)
    }

    pub fn quiz_timeout(&self) -> Duration {
        Duration::from_secs(self.quiz_timeout_secs)
    }

    pub fn chat_poll_interval(&self) -> Duration {
        Duration::from_secs(self.chat_poll_interval_secs)
    }

    pub fn quiz_poll_interval(&self) -> Duration {
        Duration::from_secs(self.quiz_poll_interval_secs)
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api_key: SecretString::from("test-key".to_string()),
            api_base_url: "http://127.0.0.1:0/v1".to_string(),
            model: "gpt-4-1106-preview".to_string(),
            assistant_name: "Study Buddy".to_string(),
            index_name: "StudyBuddyVectorStore".to_string(),
            supported_extensions: default_extensions(),
            max_file_size_mb: 200,
            chat_timeout_secs: 120,
            quiz_timeout_secs: 120,
            chat_poll_interval_secs: 1,
            quiz_poll_interval_secs: 5,
            assistant_instructions: ASSISTANT_INSTRUCTIONS.to_string(),
            quiz_prompt: QUIZ_GENERATION_PROMPT.to_string(),
        }
    }
}

fn default_extensions() -> HashSet<String> {
    DEFAULT_SUPPORTED_EXTS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
