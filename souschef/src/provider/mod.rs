//! Generation service clients.
//!
//! The workers depend on the [`GenerationClient`] trait only; concrete
//! clients speak to either a hosted OpenAI-compatible API or a locally
//! running Ollama server. [`create_client`] selects between them based on
//! configuration, preferring the local server.

mod factory;
mod ollama;
mod openai;
mod types;

pub use factory::create_client;
pub use ollama::{OllamaClient, DEFAULT_OLLAMA_URL};
pub use openai::OpenAiClient;
pub use types::{GenerationClient, GenerationError, GenerationFuture};

#[cfg(test)]
pub(crate) use types::tests::MockGenerationClient;
