//! Remote code generation.
//!
//! The model is an opaque, possibly slow, possibly failing remote call.
//! There is no retry policy: a failed request fails the generation.

use super::prompt::{ChatMessage, Prompt};
use crate::errors::{Error, Result};
use log::{debug, error};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default OpenAI API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Turns a prompt into generated source text
pub trait CodeGenerator: Send + Sync {
    fn generate(&self, prompt: &Prompt) -> Result<String>;

    fn name(&self) -> &str;
}

/// Client for OpenAI-compatible chat-completions endpoints
pub struct OpenAiClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        })
    }

    /// Client configured from the environment's API key
    pub fn from_env(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        Self::new(base_url, model, std::env::var(API_KEY_ENV).ok(), timeout)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body<'a>(&'a self, prompt: &'a Prompt) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: &prompt.messages,
            temperature: prompt.temperature,
            seed: prompt.seed,
        }
    }
}

impl CodeGenerator for OpenAiClient {
    fn generate(&self, prompt: &Prompt) -> Result<String> {
        let start = Instant::now();
        let mut request = self
            .http_client
            .post(self.endpoint())
            .json(&self.request_body(prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| {
            error!("{} request failed: {}", self.model, e);
            Error::Generation(format!("request to {} failed: {}", self.endpoint(), e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Generation(format!("HTTP {}: {}", status, body)));
        }

        let completion: ChatCompletionResponse = response.json()?;
        debug!(
            "{} answered in {:.1}s",
            self.model,
            start.elapsed().as_secs_f64()
        );
        parse_completion(completion)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn parse_completion(completion: ChatCompletionResponse) -> Result<String> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| Error::InvalidResponse("completion has no content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> OpenAiClient {
        OpenAiClient::new(
            "http://localhost:8080/v1/",
            "gpt-4o",
            None,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_trims_slash() {
        assert_eq!(
            client().endpoint(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body() {
        let client = client();
        let prompt = Prompt::for_artifact("def f():\n    ...");
        let body = serde_json::to_value(client.request_body(&prompt)).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["seed"], 6);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "def f():\n    ..."}));
    }

    #[test]
    fn test_parse_completion() {
        let completion: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "def f():\n    return 1\n"}}]
        }))
        .unwrap();
        assert_eq!(parse_completion(completion).unwrap(), "def f():\n    return 1\n");
    }

    #[test]
    fn test_empty_completion_is_invalid() {
        let completion: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            parse_completion(completion),
            Err(Error::InvalidResponse(_))
        ));

        let completion: ChatCompletionResponse = serde_json::from_value(
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
        )
        .unwrap();
        assert!(parse_completion(completion).is_err());
    }
}
