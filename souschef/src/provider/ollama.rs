//! Local Ollama chat client.
//!
//! Speaks the same logical `generate(prompt) -> text` contract as the hosted
//! client against a locally running Ollama server, without bearer
//! authorization.
//!
//! Install: <https://ollama.ai/download>, then `ollama serve` and
//! `ollama pull llama3.2:1b`.

use super::types::{GenerationClient, GenerationError, GenerationFuture};
use std::time::Duration;
use tracing::debug;

/// Default URL of a locally running Ollama server.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Sampling temperature used for local generation.
const LOCAL_TEMPERATURE: f64 = 0.7;

/// Token budget for local generation.
const LOCAL_NUM_PREDICT: u32 = 2048;

/// Client for a locally running Ollama server.
#[derive(Debug)]
pub struct OllamaClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaClient {
    /// Creates a client for the server at `url` using `model`.
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| GenerationError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Confirms the server is reachable and the model responds.
    pub async fn probe(&self) -> Result<(), GenerationError> {
        self.request("Say 'Test successful' in 3 words").await.map(|_| ())
    }

    async fn request(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
            "options": {
                "temperature": LOCAL_TEMPERATURE,
                "num_predict": LOCAL_NUM_PREDICT,
            },
        });

        debug!(model = %self.model, prompt_len = prompt.len(), "local chat request");

        let response = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Http(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(self.status_error(status.as_u16(), text));
        }

        extract_content(&text)
    }

    fn transport_error(&self, error: reqwest::Error) -> GenerationError {
        if error.is_connect() {
            return GenerationError::Http(format!(
                "request failed: {}; make sure the server is running: 'ollama serve'",
                error
            ));
        }
        GenerationError::Http(format!("request failed: {}", error))
    }

    fn status_error(&self, code: u16, body: String) -> GenerationError {
        if body.contains("model") {
            return GenerationError::Status {
                code,
                body: format!(
                    "{}; make sure the model is downloaded: 'ollama pull {}'",
                    body.trim(),
                    self.model
                ),
            };
        }
        GenerationError::Status {
            code,
            body: body.trim().to_string(),
        }
    }
}

impl GenerationClient for OllamaClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerationFuture<'a> {
        Box::pin(self.request(prompt))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Extracts `message.content` from an Ollama chat reply.
fn extract_content(body: &str) -> Result<String, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("malformed JSON: {}", e)))?;

    let content = value["message"]["content"]
        .as_str()
        .ok_or_else(|| GenerationError::InvalidResponse("missing message.content".to_string()))?;

    if content.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_success() {
        let body = r#"{"message":{"role":"assistant","content":"Soup: boil water."}}"#;
        assert_eq!(extract_content(body).unwrap(), "Soup: boil water.");
    }

    #[test]
    fn test_extract_content_missing_message() {
        let err = extract_content(r#"{"done":true}"#).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn test_extract_content_empty_text() {
        let body = r#"{"message":{"content":""}}"#;
        assert_eq!(extract_content(body).unwrap_err(), GenerationError::EmptyResponse);
    }

    #[test]
    fn test_model_errors_carry_pull_hint() {
        let client = OllamaClient::new(DEFAULT_OLLAMA_URL, "llama3.2:1b").unwrap();
        let err = client.status_error(404, r#"{"error":"model not found"}"#.to_string());

        match err {
            GenerationError::Status { code, body } => {
                assert_eq!(code, 404);
                assert!(body.contains("ollama pull llama3.2:1b"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_slash_stripped_from_url() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.2:1b").unwrap();
        assert_eq!(client.url, "http://localhost:11434");
    }
}
