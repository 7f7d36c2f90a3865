use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation, authored by the user or the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Local mirror of a remote conversation's ordered turn history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub remote_thread_id: String,
    pub turns: Vec<Turn>,
}

impl Conversation {
    pub fn new(remote_thread_id: impl Into<String>) -> Self {
        Conversation {
            remote_thread_id: remote_thread_id.into(),
            turns: Vec::new(),
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: content.into(),
        });
    }
}

/// One grounding reference attached to an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub index: usize,
    pub quote: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

/// An assistant-authored reply with its citations, populated directly by the
/// platform layer from the remote turn payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl AssistantMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        AssistantMessage {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    /// Render the reply with a numbered source list appended. The inline
    /// markers ([1], [2], ...) are already substituted into `text` by the
    /// platform layer; this adds the matching footnotes.
    pub fn rendered(&self, source_label: &str) -> String {
        if self.citations.is_empty() {
            return self.text.clone();
        }

        let footnotes: Vec<String> = self
            .citations
            .iter()
            .map(|citation| format!("[{}] {} from {}", citation.index, citation.quote, source_label))
            .collect();

        format!("{}\n\n{}", self.text, footnotes.join("\n"))
    }
}
