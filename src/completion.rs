//! Groq completion-provider client (OpenAI-compatible chat completions).
//!
//! Unlike the data gateway, failures here do propagate: the orchestrator
//! turns them into a user-visible error document.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::GroqConfig;
use crate::error::{AppError, AppResult};

/// Fixed assistant persona sent with every general query.
const SYSTEM_PROMPT: &str = "You are Wallet Genius, an AI assistant specialized in blockchain wallet analysis. \
You help users analyze Ethereum wallets, NFT collections, transaction patterns, and security risks. \
Be helpful, informative, and encourage users to provide wallet addresses for analysis.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
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

/// First 200 chars of an error body for the surfaced message. Char-wise,
/// since provider error pages are not guaranteed to be ASCII.
fn body_snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    pub fn new(config: &GroqConfig) -> Self {
        tracing::debug!(model = %config.model, "Creating completion client");
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Ask the model for a free-text reply to a general (addressless)
    /// message. The user text is passed through raw under the fixed
    /// persona prompt.
    pub async fn complete(&self, message: &str) -> AppResult<String> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: message },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Completion request failed");
                AppError::Completion(format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Completion provider returned an error");
            return Err(AppError::Completion(format!(
                "provider error {}: {}",
                status,
                body_snippet(&body)
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse completion response");
            AppError::Completion(format!("unparseable response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Completion("response carried no choices".to_string()))?;

        tracing::info!(
            duration_ms = %start.elapsed().as_millis(),
            chars = %content.len(),
            "Completion received"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_snippet_cuts_on_char_boundaries() {
        // Multi-byte char straddling the 200-char cut point
        let body = "\u{e9}".repeat(250);
        let snippet = body_snippet(&body);
        assert_eq!(snippet.chars().count(), 200);

        assert_eq!(body_snippet("short body"), "short body");
    }

    #[test]
    fn chat_request_serializes_openai_shape() {
        let request = ChatRequest {
            model: "llama3-70b-8192",
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: "hello" },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3-70b-8192");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn chat_response_reads_first_choice() {
        let body = serde_json::json!({
            "id": "chatcmpl-123",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Hi there"}}
            ],
            "usage": {"total_tokens": 12}
        });
        let parsed: ChatResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Hi there");
    }
}
