//! Recipe request router.
//!
//! The router accepts three command disciplines that all need the generation
//! worker's outcome and normalizes them into one internal completion event:
//!
//! ```text
//!  caller ──► RouterHandle ──► Router ──► GenerateJob ──► GenerationWorker
//!                                ▲                             │
//!                                │   completion (self-post)    │ outcome
//!                                └───── continuation task ◄────┘
//! ```
//!
//! - [`RouterHandle::find_recipe`] dispatches immediately and resumes
//!   whenever the worker replies, with no bound.
//! - [`RouterHandle::find_recipe_ask`] makes the request/reply binding
//!   explicit and bounds it at [`ASK_TIMEOUT`]; the timeout path synthesizes
//!   the same failure shape as a service error.
//! - [`RouterHandle::forward_to_generator`] dispatches on behalf of a third
//!   party whose reply destination is preserved; the issuer never sees the
//!   reply.
//!
//! All three converge on one finalizer: successes are told to the audit
//! worker (fire-and-forget) and replied to the caller; failures are replied
//! with an `Error:` text and a ` (failed)` method tag, and are not audited.
//! Reply destinations are one-shot senders, so no command can be finalized
//! twice. The router holds no state across commands; each in-flight command
//! lives entirely in its own continuation task.

use crate::recipe::RecipeRequest;
use crate::worker::{AuditRecord, GenerateJob, GenerationOutcome};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Bound on the ask discipline's wait for a generation outcome.
///
/// Only the ask discipline is bounded; direct and forward dispatches wait
/// indefinitely on a stalled worker.
pub const ASK_TIMEOUT: Duration = Duration::from_secs(30);

/// Default capacity of the router's command channel.
pub const DEFAULT_COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Error returned when the router task is no longer running.
#[derive(Debug, Error)]
#[error("router is not running")]
pub struct RouterClosed;

/// The discipline a command was dispatched under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMethod {
    /// Fire-and-forget dispatch, open-ended wait.
    Direct,
    /// Request/response dispatch bounded by [`ASK_TIMEOUT`].
    Ask,
    /// Dispatch on behalf of a preserved original sender.
    Forward,
}

impl RouteMethod {
    fn bound(self) -> Option<Duration> {
        match self {
            RouteMethod::Ask => Some(ASK_TIMEOUT),
            RouteMethod::Direct | RouteMethod::Forward => None,
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMethod::Direct => write!(f, "direct"),
            RouteMethod::Ask => write!(f, "ask"),
            RouteMethod::Forward => write!(f, "forward"),
        }
    }
}

/// The router's reply to the original caller.
///
/// Failures arrive as data: the text carries an `Error:` description and the
/// method tag the ` (failed)` suffix. Callers never observe a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedResponse {
    /// Generated text, or `"Error: <reason>"` on failure.
    pub text: String,
    /// Dispatch discipline tag: `direct`, `ask`, or `forward`, with
    /// ` (failed)` appended on failure.
    pub method: String,
}

impl RoutedResponse {
    fn success(text: String, method: RouteMethod) -> Self {
        Self {
            text,
            method: method.to_string(),
        }
    }

    fn failure(reason: &str, method: RouteMethod) -> Self {
        Self {
            text: format!("Error: {}", reason),
            method: format!("{} (failed)", method),
        }
    }

    /// Returns true when this reply reports a failed command.
    pub fn is_failure(&self) -> bool {
        self.method.ends_with("(failed)")
    }
}

/// A finished correlation: the worker outcome joined back to the originating
/// request, reply destination, and dispatch discipline.
struct Completion {
    outcome: GenerationOutcome,
    request: RecipeRequest,
    reply_to: oneshot::Sender<RoutedResponse>,
    method: RouteMethod,
}

enum RouterMsg {
    FindRecipe {
        request: RecipeRequest,
        reply_to: oneshot::Sender<RoutedResponse>,
    },
    FindRecipeAsk {
        request: RecipeRequest,
        reply_to: oneshot::Sender<RoutedResponse>,
    },
    ForwardToGenerator {
        request: RecipeRequest,
        original_sender: oneshot::Sender<RoutedResponse>,
    },
    Completed(Completion),
}

/// Cloneable handle for submitting commands to the router.
#[derive(Clone)]
pub struct RouterHandle {
    msg_tx: mpsc::Sender<RouterMsg>,
}

impl RouterHandle {
    /// Direct discipline: dispatch and reply whenever the outcome arrives.
    pub async fn find_recipe(
        &self,
        request: RecipeRequest,
    ) -> Result<oneshot::Receiver<RoutedResponse>, RouterClosed> {
        let (reply_to, rx) = oneshot::channel();
        self.msg_tx
            .send(RouterMsg::FindRecipe { request, reply_to })
            .await
            .map_err(|_| RouterClosed)?;
        Ok(rx)
    }

    /// Ask discipline: like [`find_recipe`](Self::find_recipe) but bounded
    /// by [`ASK_TIMEOUT`].
    pub async fn find_recipe_ask(
        &self,
        request: RecipeRequest,
    ) -> Result<oneshot::Receiver<RoutedResponse>, RouterClosed> {
        let (reply_to, rx) = oneshot::channel();
        self.msg_tx
            .send(RouterMsg::FindRecipeAsk { request, reply_to })
            .await
            .map_err(|_| RouterClosed)?;
        Ok(rx)
    }

    /// Forward discipline: dispatch on behalf of `original_sender`, who may
    /// differ from the issuer and receives the reply directly.
    pub async fn forward_to_generator(
        &self,
        request: RecipeRequest,
        original_sender: oneshot::Sender<RoutedResponse>,
    ) -> Result<(), RouterClosed> {
        self.msg_tx
            .send(RouterMsg::ForwardToGenerator {
                request,
                original_sender,
            })
            .await
            .map_err(|_| RouterClosed)
    }
}

/// The recipe request router.
pub struct Router {
    msg_rx: mpsc::Receiver<RouterMsg>,
    self_tx: mpsc::Sender<RouterMsg>,
    generation_tx: mpsc::Sender<GenerateJob>,
    audit_tx: mpsc::Sender<AuditRecord>,
}

impl Router {
    /// Creates a router with its command channel.
    ///
    /// Returns the router and a handle that can be cloned for callers.
    pub fn new(
        generation_tx: mpsc::Sender<GenerateJob>,
        audit_tx: mpsc::Sender<AuditRecord>,
    ) -> (Self, RouterHandle) {
        let (msg_tx, msg_rx) = mpsc::channel(DEFAULT_COMMAND_CHANNEL_CAPACITY);
        let router = Self {
            msg_rx,
            self_tx: msg_tx.clone(),
            generation_tx,
            audit_tx,
        };
        (router, RouterHandle { msg_tx })
    }

    /// Runs the router until shutdown is signalled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("router starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("router shutting down");
                    break;
                }

                msg = self.msg_rx.recv() => {
                    match msg {
                        Some(msg) => self.handle(msg),
                        None => {
                            debug!("command channel closed, router stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn handle(&self, msg: RouterMsg) {
        match msg {
            RouterMsg::FindRecipe { request, reply_to } => {
                info!(query = %request.query, "direct: dispatching recipe request");
                self.dispatch(request, reply_to, RouteMethod::Direct);
            }
            RouterMsg::FindRecipeAsk { request, reply_to } => {
                info!(query = %request.query, "ask: dispatching recipe request");
                self.dispatch(request, reply_to, RouteMethod::Ask);
            }
            RouterMsg::ForwardToGenerator {
                request,
                original_sender,
            } => {
                info!(query = %request.query, "forward: dispatching for preserved sender");
                self.dispatch(request, original_sender, RouteMethod::Forward);
            }
            RouterMsg::Completed(completion) => self.finalize(completion),
        }
    }

    /// Sends the job to the generation worker and posts the outcome back as
    /// a completion event.
    ///
    /// The router loop never waits on the worker; each command's wait lives
    /// in its own spawned continuation, so later commands are accepted while
    /// earlier ones are still outstanding. A closed worker channel or a
    /// dropped worker-side reply sender still produces a `Failure` outcome;
    /// no command goes unanswered.
    fn dispatch(
        &self,
        request: RecipeRequest,
        reply_to: oneshot::Sender<RoutedResponse>,
        method: RouteMethod,
    ) {
        let (job, outcome_rx) = GenerateJob::new(request.clone());
        let generation_tx = self.generation_tx.clone();
        let self_tx = self.self_tx.clone();

        tokio::spawn(async move {
            let outcome = if generation_tx.send(job).await.is_err() {
                GenerationOutcome::Failure {
                    reason: "generation worker unavailable".to_string(),
                }
            } else {
                wait_for_outcome(outcome_rx, method.bound()).await
            };

            let completion = Completion {
                outcome,
                request,
                reply_to,
                method,
            };
            let _ = self_tx.send(RouterMsg::Completed(completion)).await;
        });
    }

    /// The single place all three disciplines converge.
    fn finalize(&self, completion: Completion) {
        let Completion {
            outcome,
            request,
            reply_to,
            method,
        } = completion;

        match outcome {
            GenerationOutcome::Success { text } => {
                // Fire-and-forget: a saturated audit channel drops the record.
                let record = AuditRecord {
                    request,
                    response: text.clone(),
                };
                if self.audit_tx.try_send(record).is_err() {
                    warn!("audit channel unavailable, record dropped");
                }

                info!(method = %method, "command completed");
                if reply_to
                    .send(RoutedResponse::success(text, method))
                    .is_err()
                {
                    debug!(method = %method, "caller dropped before reply");
                }
            }
            GenerationOutcome::Failure { reason } => {
                warn!(method = %method, reason = %reason, "command failed");
                let _ = reply_to.send(RoutedResponse::failure(&reason, method));
            }
        }
    }
}

async fn wait_for_outcome(
    outcome_rx: oneshot::Receiver<GenerationOutcome>,
    bound: Option<Duration>,
) -> GenerationOutcome {
    match bound {
        None => outcome_rx.await.unwrap_or_else(|_| GenerationOutcome::Failure {
            reason: "generation worker dropped the request".to_string(),
        }),
        Some(limit) => match tokio::time::timeout(limit, outcome_rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => GenerationOutcome::Failure {
                reason: "generation worker dropped the request".to_string(),
            },
            Err(_) => GenerationOutcome::Failure {
                reason: format!("Ask pattern failed: no reply within {}s", limit.as_secs()),
            },
        },
    }
}
