//! Generation client trait and error types.

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur when calling the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Transport-level failure (connect, timeout, read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("generation service returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// The response body could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The service answered successfully but produced no text.
    #[error("empty response from generation service")]
    EmptyResponse,

    /// No usable backend could be constructed.
    #[error("no generation service available: {0}")]
    Unavailable(String),
}

/// Boxed future returned by [`GenerationClient::generate`].
pub type GenerationFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// A text generation backend.
///
/// One shared handle is held read-only by every generation and substitution
/// worker; calls are stateless. The boxed-future signature keeps the trait
/// object-safe so workers can hold `Arc<dyn GenerationClient>`.
pub trait GenerationClient: Send + Sync + std::fmt::Debug {
    /// Generates prose for the given prompt.
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerationFuture<'a>;

    /// Returns the client's name for logging and identification.
    fn name(&self) -> &str;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Mock generation client for worker tests.
    #[derive(Debug)]
    pub struct MockGenerationClient {
        pub response: Result<String, GenerationError>,
    }

    impl MockGenerationClient {
        pub fn succeeding(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
            }
        }

        pub fn failing(error: GenerationError) -> Self {
            Self {
                response: Err(error),
            }
        }
    }

    impl GenerationClient for MockGenerationClient {
        fn generate<'a>(&'a self, _prompt: &'a str) -> GenerationFuture<'a> {
            let response = self.response.clone();
            Box::pin(async move { response })
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockGenerationClient::succeeding("a recipe");
        assert_eq!(mock.generate("prompt").await.unwrap(), "a recipe");
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockGenerationClient::failing(GenerationError::EmptyResponse);
        assert!(mock.generate("prompt").await.is_err());
    }
}
