//! Completion service client.
//!
//! The core depends on the language model only through [`CompletionClient`]:
//! a prompt string goes in, a response string comes out. [`OpenAiClient`] is
//! the production implementation against an OpenAI-compatible
//! chat-completions endpoint; tests substitute scripted doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use policydiff_shared::{PolicyDiffError, Result};

/// Narrow interface to the text-completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// OpenAI chat-completions client
// ---------------------------------------------------------------------------

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Chat completion response body (the fields we read).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// HTTP client for the OpenAI chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f64,
}

impl OpenAiClient {
    /// Create a new client with the given API key, model, and temperature.
    pub fn new(api_key: String, model: String, temperature: f64) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| PolicyDiffError::Completion(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PolicyDiffError::Completion(format!(
                "API error ({status}): {body}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| PolicyDiffError::Completion(format!("invalid response: {e}")))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PolicyDiffError::Completion("response has no choices".into()))?;

        debug!(model = %self.model, response_len = content.len(), "completion received");

        Ok(content)
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Returns queued responses in order; repeats the last one when exhausted.
    pub(crate) struct ScriptedClient {
        responses: Mutex<VecDeque<String>>,
        last: String,
    }

    impl ScriptedClient {
        pub(crate) fn new(responses: Vec<&str>) -> Self {
            let last = responses.last().map(|s| s.to_string()).unwrap_or_default();
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                last,
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            let mut queue = self.responses.lock().expect("lock poisoned");
            Ok(queue.pop_front().unwrap_or_else(|| self.last.clone()))
        }
    }

    /// Always fails, exercising the skip-and-continue path.
    pub(crate) struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(PolicyDiffError::Completion("stubbed outage".into()))
        }
    }
}
