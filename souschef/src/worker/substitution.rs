//! Substitution expert worker.
//!
//! Structural twin of the generation worker with a substitution-focused
//! prompt. Unlike the generation worker's tagged outcome, the reply here is
//! success-only: service errors are folded into the reply text. The two
//! workers are intentionally not unified on one reply shape.

use crate::provider::GenerationClient;
use crate::recipe::RecipeRequest;
use crate::worker::prompt::build_substitution_prompt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Error returned when a worker's channel is no longer open.
#[derive(Debug, Error)]
#[error("worker is not running")]
pub struct WorkerClosed;

/// The substitution expert's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionReply {
    /// Substitution advice, or an error description folded into text.
    pub text: String,
}

/// A substitution job submitted to the worker.
pub struct SubstitutionJob {
    /// The recipe to find substitutions for.
    pub request: RecipeRequest,
    /// Where the reply is delivered.
    pub reply_to: oneshot::Sender<SubstitutionReply>,
}

/// Cloneable handle for submitting substitution requests.
#[derive(Clone, Debug)]
pub struct SubstitutionHandle {
    job_tx: mpsc::Sender<SubstitutionJob>,
}

impl SubstitutionHandle {
    /// Submits a request and returns the receiver for the reply.
    pub async fn find_substitutions(
        &self,
        request: RecipeRequest,
    ) -> Result<oneshot::Receiver<SubstitutionReply>, WorkerClosed> {
        let (reply_to, rx) = oneshot::channel();
        self.job_tx
            .send(SubstitutionJob { request, reply_to })
            .await
            .map_err(|_| WorkerClosed)?;
        Ok(rx)
    }
}

/// The substitution expert worker.
pub struct SubstitutionWorker {
    client: Arc<dyn GenerationClient>,
    job_rx: mpsc::Receiver<SubstitutionJob>,
}

impl SubstitutionWorker {
    /// Creates a worker with its submission handle.
    pub fn new(client: Arc<dyn GenerationClient>) -> (Self, SubstitutionHandle) {
        let (job_tx, job_rx) = mpsc::channel(super::DEFAULT_JOB_CHANNEL_CAPACITY);
        (Self { client, job_rx }, SubstitutionHandle { job_tx })
    }

    /// Runs the worker until shutdown is signalled or the channel closes.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(client = self.client.name(), "substitution expert starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("substitution expert shutting down");
                    break;
                }

                job = self.job_rx.recv() => {
                    match job {
                        Some(job) => self.process(job).await,
                        None => {
                            debug!("job channel closed, substitution expert stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn process(&self, job: SubstitutionJob) {
        let prompt = build_substitution_prompt(&job.request);
        debug!(query = %job.request.query, "finding substitutions");

        let text = match self.client.generate(&prompt).await {
            Ok(text) => {
                info!(response_length = text.len(), "substitutions found");
                text
            }
            Err(e) => {
                warn!(error = %e, query = %job.request.query, "substitution lookup failed");
                format!("Error finding substitutions: {}", e)
            }
        };

        if job.reply_to.send(SubstitutionReply { text }).is_err() {
            debug!("reply receiver dropped before substitution delivery");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{GenerationError, MockGenerationClient};
    use std::time::Duration;

    fn spawn_worker(client: MockGenerationClient) -> (SubstitutionHandle, CancellationToken) {
        let (worker, handle) = SubstitutionWorker::new(Arc::new(client));
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        tokio::spawn(async move { worker.run(token).await });
        (handle, shutdown)
    }

    #[tokio::test]
    async fn test_reply_carries_advice() {
        let (handle, shutdown) = spawn_worker(MockGenerationClient::succeeding("Use tofu."));

        let rx = handle
            .find_substitutions(RecipeRequest::new("pasta carbonara", "vegan", true))
            .await
            .unwrap();
        let reply = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reply.text, "Use tofu.");
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_service_error_folded_into_text() {
        let (handle, shutdown) =
            spawn_worker(MockGenerationClient::failing(GenerationError::EmptyResponse));

        let rx = handle
            .find_substitutions(RecipeRequest::new("pasta", "none", false))
            .await
            .unwrap();
        let reply = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .unwrap()
            .unwrap();

        // No failure variant here: the error travels inside the text.
        assert!(reply.text.starts_with("Error finding substitutions:"));
        assert!(reply.text.contains("empty response"));
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_handle_reports_closed_worker() {
        let (handle, shutdown) = spawn_worker(MockGenerationClient::succeeding("ok"));
        shutdown.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let result = handle
            .find_substitutions(RecipeRequest::new("soup", "none", false))
            .await;
        assert!(result.is_err());
    }
}
