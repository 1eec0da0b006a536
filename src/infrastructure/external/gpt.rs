//! GPT Completion Client
//!
//! Proxies a prompt to an OpenAI-compatible chat completion endpoint and
//! returns the first choice's message content.

use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat completion API.
#[derive(Clone)]
pub struct GptClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GptClient {
    pub fn new(http: reqwest::Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    /// Generate a completion for a prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![ChatTurn {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("GPT request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "GPT endpoint returned status {}",
                response.status()
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("GPT response invalid: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Upstream("GPT response contained no choices".to_string()))
    }
}
