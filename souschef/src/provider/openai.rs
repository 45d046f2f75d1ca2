//! Hosted OpenAI-compatible chat completion client.

use super::types::{GenerationClient, GenerationError, GenerationFuture};
use std::time::Duration;
use tracing::debug;

/// Default chat completions endpoint for the hosted API.
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Maximum number of body characters carried into an error message.
const ERROR_BODY_EXCERPT: usize = 200;

/// Client for an OpenAI-compatible hosted chat completion API.
///
/// Sends `{model, temperature, messages, max_tokens}` with bearer-token
/// authorization and extracts `choices[0].message.content` from the reply.
#[derive(Debug)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Creates a new client for the hosted API.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GenerationError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            max_tokens,
        })
    }

    /// Overrides the chat completions endpoint.
    ///
    /// Useful for OpenAI-compatible gateways and for tests.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn request(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.max_tokens,
        });

        debug!(model = %self.model, prompt_len = prompt.len(), "chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Http(format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Http(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                code: status.as_u16(),
                body: excerpt(&text),
            });
        }

        extract_content(&text)
    }
}

impl GenerationClient for OpenAiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerationFuture<'a> {
        Box::pin(self.request(prompt))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Extracts `choices[0].message.content` from a chat completion body.
fn extract_content(body: &str) -> Result<String, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("malformed JSON: {}", e)))?;

    let content = value["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            GenerationError::InvalidResponse(
                "missing choices[0].message.content".to_string(),
            )
        })?;

    if content.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(content.to_string())
}

fn excerpt(body: &str) -> String {
    if body.len() <= ERROR_BODY_EXCERPT {
        return body.to_string();
    }
    let mut end = ERROR_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_success() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"A recipe."}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "A recipe.");
    }

    #[test]
    fn test_extract_content_missing_choices() {
        let body = r#"{"object":"chat.completion"}"#;
        let err = extract_content(body).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn test_extract_content_malformed_json() {
        let err = extract_content("not json").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn test_extract_content_empty_text() {
        let body = r#"{"choices":[{"message":{"content":""}}]}"#;
        assert_eq!(extract_content(body).unwrap_err(), GenerationError::EmptyResponse);
    }

    #[test]
    fn test_excerpt_caps_long_bodies() {
        let long = "x".repeat(500);
        let short = excerpt(&long);
        assert!(short.len() < long.len());
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_excerpt_keeps_short_bodies() {
        assert_eq!(excerpt("bad request"), "bad request");
    }
}
