//! Generation worker.
//!
//! Turns recipe requests into prose by building a prompt and calling the
//! generation service. Jobs arrive on a channel and carry their own one-shot
//! reply sender; callers never block on the worker, and every job terminates
//! in exactly one [`GenerationOutcome`] delivered to its reply channel.

use crate::provider::GenerationClient;
use crate::recipe::RecipeRequest;
use crate::worker::prompt::build_recipe_prompt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default capacity of the generation job channel.
pub const DEFAULT_JOB_CHANNEL_CAPACITY: usize = 64;

/// Result of one generation job.
///
/// Produced exactly once per job. Service errors are carried as data; the
/// worker never propagates a fault past its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The service produced recipe text.
    Success {
        /// Generated prose.
        text: String,
    },
    /// The service call failed.
    Failure {
        /// Human-readable reason, carrying the underlying error's message.
        reason: String,
    },
}

impl GenerationOutcome {
    /// Returns true for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }
}

/// A generation job submitted to the worker.
pub struct GenerateJob {
    /// The request to generate a recipe for.
    pub request: RecipeRequest,
    /// Where the outcome is delivered.
    pub reply_to: oneshot::Sender<GenerationOutcome>,
}

impl GenerateJob {
    /// Creates a job with its reply channel.
    ///
    /// Returns the job and the receiver on which the outcome arrives.
    pub fn new(request: RecipeRequest) -> (Self, oneshot::Receiver<GenerationOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                request,
                reply_to: tx,
            },
            rx,
        )
    }
}

impl std::fmt::Debug for GenerateJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateJob")
            .field("request", &self.request)
            .finish()
    }
}

/// The generation worker.
///
/// A single sequential processor: jobs are handled one at a time, and the
/// only suspension point is the awaited generation service call. The shared
/// client handle is read-only.
pub struct GenerationWorker {
    client: Arc<dyn GenerationClient>,
    job_rx: mpsc::Receiver<GenerateJob>,
}

impl GenerationWorker {
    /// Creates a worker with its job channel.
    ///
    /// Returns the worker and a sender that can be cloned for producers.
    pub fn new(client: Arc<dyn GenerationClient>) -> (Self, mpsc::Sender<GenerateJob>) {
        let (job_tx, job_rx) = mpsc::channel(DEFAULT_JOB_CHANNEL_CAPACITY);
        (Self { client, job_rx }, job_tx)
    }

    /// Runs the worker until shutdown is signalled or the channel closes.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(client = self.client.name(), "generation worker starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("generation worker shutting down");
                    break;
                }

                job = self.job_rx.recv() => {
                    match job {
                        Some(job) => self.process(job).await,
                        None => {
                            debug!("job channel closed, generation worker stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn process(&self, job: GenerateJob) {
        let prompt = build_recipe_prompt(&job.request);
        debug!(query = %job.request.query, "calling generation service");

        let outcome = match self.client.generate(&prompt).await {
            Ok(text) => {
                info!(response_length = text.len(), "generation succeeded");
                GenerationOutcome::Success { text }
            }
            Err(e) => {
                warn!(error = %e, query = %job.request.query, "generation failed");
                GenerationOutcome::Failure {
                    reason: e.to_string(),
                }
            }
        };

        if job.reply_to.send(outcome).is_err() {
            debug!("reply receiver dropped before outcome delivery");
        }
    }
}
