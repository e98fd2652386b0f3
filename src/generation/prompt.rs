//! Chat prompt sent to the model for one function.

use serde::{Deserialize, Serialize};

/// Instructions given to the model as the system message
pub const SYSTEM_INSTRUCTIONS: [&str; 5] = [
    "You are Python programmer.",
    "Implement the given function.",
    "Do not write type annotations.",
    "Answer only with code.",
    "Do not wrap your answer as code block.",
];

/// Sampling seed, fixed so repeated generations stay close
pub const DEFAULT_SEED: u64 = 6;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Everything the generator needs for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub seed: u64,
}

impl Prompt {
    /// Prompt asking the model to implement the function in `artifact`
    pub fn for_artifact(artifact: impl Into<String>) -> Self {
        Self {
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTIONS.join(" ")),
                ChatMessage::user(artifact),
            ],
            temperature: 0.0,
            seed: DEFAULT_SEED,
        }
    }

    /// The user message, i.e. the extraction artifact
    pub fn artifact(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}
