//! Generation client selection.
//!
//! Prefers a locally running Ollama server, falling back to the hosted
//! OpenAI-compatible API when an API key is configured.

use super::ollama::OllamaClient;
use super::openai::OpenAiClient;
use super::types::{GenerationClient, GenerationError};
use crate::config::ConfigFile;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds a generation client from configuration.
///
/// Probes the local server first; when it is unreachable and an API key is
/// configured, the hosted API is used instead.
pub async fn create_client(
    config: &ConfigFile,
) -> Result<Arc<dyn GenerationClient>, GenerationError> {
    let ollama = OllamaClient::new(&config.ollama.url, &config.ollama.model)?;
    match ollama.probe().await {
        Ok(()) => {
            info!(model = %config.ollama.model, "using local generation server");
            return Ok(Arc::new(ollama));
        }
        Err(e) => warn!(error = %e, "local generation server not available"),
    }

    if !config.openai.api_key.is_empty() {
        info!(model = %config.openai.model, "using hosted generation API");
        let client = OpenAiClient::new(
            &config.openai.api_key,
            &config.openai.model,
            config.openai.temperature,
            config.openai.max_tokens,
        )?;
        return Ok(Arc::new(client));
    }

    Err(GenerationError::Unavailable(
        "start a local server ('ollama serve') or configure an API key".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_backend_reports_unavailable() {
        // Point the local probe at a port nothing listens on and leave the
        // API key empty.
        let mut config = ConfigFile::default();
        config.ollama.url = "http://127.0.0.1:9".to_string();
        config.openai.api_key = String::new();

        let err = create_client(&config).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_falls_back_to_hosted_api_when_key_configured() {
        let mut config = ConfigFile::default();
        config.ollama.url = "http://127.0.0.1:9".to_string();
        config.openai.api_key = "sk-test".to_string();

        let client = create_client(&config).await.unwrap();
        assert_eq!(client.name(), "openai");
    }
}
