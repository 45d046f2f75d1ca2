//! Per-role worker hosting.
//!
//! [`Node::start`] spawns the workers a role is responsible for and wires
//! their channels; [`LocalCluster::start`] hosts both roles in one process
//! with both membership events delivered, which is how demos and tests run.
//! Capabilities a role does not host are refused synchronously with
//! [`PlacementError`], so callers get a clear "not available on this node"
//! signal instead of a hanging request.

use crate::cluster::membership::{Membership, MembershipView, MembershipWatch, NodeRole};
use crate::provider::GenerationClient;
use crate::router::{Router, RouterHandle};
use crate::worker::{
    AuditSink, AuditWorker, GenerateJob, GenerationWorker, SubstitutionHandle, SubstitutionWorker,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A capability was requested on a node whose role does not host it.
#[derive(Debug, Error)]
#[error("{capability} not available on this node (requires {role})")]
pub struct PlacementError {
    /// The missing capability, e.g. "substitution expert".
    pub capability: &'static str,
    /// The role that hosts it.
    pub role: NodeRole,
}

/// A running node hosting one role's workers.
pub struct Node {
    role: NodeRole,
    router: Option<RouterHandle>,
    substitution: Option<SubstitutionHandle>,
    generation_tx: mpsc::Sender<GenerateJob>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Node {
    /// Starts the workers for `role` with the default audit sink.
    pub fn start(role: NodeRole, client: Arc<dyn GenerationClient>) -> Self {
        Self::build(role, client, None)
    }

    /// Starts the workers for `role` with a custom audit sink.
    ///
    /// The sink only applies to `node1`, which hosts the audit worker.
    pub fn start_with_audit_sink(
        role: NodeRole,
        client: Arc<dyn GenerationClient>,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self::build(role, client, Some(sink))
    }

    fn build(
        role: NodeRole,
        client: Arc<dyn GenerationClient>,
        sink: Option<Arc<dyn AuditSink>>,
    ) -> Self {
        info!(role = %role, "starting node workers");

        let shutdown = CancellationToken::new();
        let mut tasks = Vec::new();

        let (generation_worker, generation_tx) = GenerationWorker::new(Arc::clone(&client));
        let generation_shutdown = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            generation_worker.run(generation_shutdown).await;
        }));

        let mut router = None;
        let mut substitution = None;

        match role {
            NodeRole::Node1 => {
                let (audit_worker, audit_tx) = match sink {
                    Some(sink) => AuditWorker::with_sink(sink),
                    None => AuditWorker::new(),
                };
                let audit_shutdown = shutdown.clone();
                tasks.push(tokio::spawn(async move {
                    audit_worker.run(audit_shutdown).await;
                }));

                let (router_unit, router_handle) = Router::new(generation_tx.clone(), audit_tx);
                let router_shutdown = shutdown.clone();
                tasks.push(tokio::spawn(async move {
                    router_unit.run(router_shutdown).await;
                }));
                router = Some(router_handle);

                info!(role = %role, "router, generation worker, and audit worker ready");
            }
            NodeRole::Node2 => {
                let (substitution_worker, substitution_handle) =
                    SubstitutionWorker::new(Arc::clone(&client));
                let substitution_shutdown = shutdown.clone();
                tasks.push(tokio::spawn(async move {
                    substitution_worker.run(substitution_shutdown).await;
                }));
                substitution = Some(substitution_handle);

                info!(role = %role, "generation worker and substitution expert ready");
            }
        }

        Self {
            role,
            router,
            substitution,
            generation_tx,
            shutdown,
            tasks,
        }
    }

    /// The role this node hosts.
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// The local generation worker's job channel.
    ///
    /// Every role hosts a generation worker; this is the channel a transport
    /// layer would hand to remote peers.
    pub fn generation(&self) -> &mpsc::Sender<GenerateJob> {
        &self.generation_tx
    }

    /// The router, when this node hosts it.
    pub fn router(&self) -> Result<&RouterHandle, PlacementError> {
        self.router.as_ref().ok_or(PlacementError {
            capability: "router",
            role: NodeRole::Node1,
        })
    }

    /// The substitution expert, when this node hosts it.
    pub fn substitution(&self) -> Result<&SubstitutionHandle, PlacementError> {
        self.substitution.as_ref().ok_or(PlacementError {
            capability: "substitution expert",
            role: NodeRole::Node2,
        })
    }

    /// Shuts the node down, waiting for worker tasks to finish.
    pub async fn shutdown(self) {
        info!(role = %self.role, "node shutting down");
        self.shutdown.cancel();

        for task in self.tasks {
            if let Err(e) = task.await {
                error!(role = %self.role, "worker task panicked: {}", e);
            }
        }

        info!(role = %self.role, "node stopped");
    }
}

/// Both roles hosted in one process.
///
/// Used by the demo and interactive modes; membership observes both roles
/// immediately, so the cluster starts ready.
pub struct LocalCluster {
    node1: Node,
    node2: Node,
    membership: Membership,
    watch: MembershipWatch,
}

impl LocalCluster {
    /// Starts both roles sharing one generation client.
    pub fn start(client: Arc<dyn GenerationClient>) -> Self {
        Self::start_with_audit_sink(client, None)
    }

    /// Starts both roles with a custom audit sink on node1.
    pub fn start_with_audit_sink(
        client: Arc<dyn GenerationClient>,
        sink: Option<Arc<dyn AuditSink>>,
    ) -> Self {
        let (membership, watch) = Membership::new();

        let node1 = match sink {
            Some(sink) => Node::start_with_audit_sink(NodeRole::Node1, Arc::clone(&client), sink),
            None => Node::start(NodeRole::Node1, Arc::clone(&client)),
        };
        membership.member_up(NodeRole::Node1);

        let node2 = Node::start(NodeRole::Node2, client);
        membership.member_up(NodeRole::Node2);

        info!("local cluster complete, both roles reachable");

        Self {
            node1,
            node2,
            membership,
            watch,
        }
    }

    /// The router hosted on node1.
    pub fn router(&self) -> Result<&RouterHandle, PlacementError> {
        self.node1.router()
    }

    /// The substitution expert hosted on node2.
    pub fn substitution(&self) -> Result<&SubstitutionHandle, PlacementError> {
        self.node2.substitution()
    }

    /// Snapshot of the membership view.
    pub fn view(&self) -> MembershipView {
        self.watch.view()
    }

    /// Returns true when both roles are reachable.
    pub fn is_ready(&self) -> bool {
        self.watch.is_ready()
    }

    /// The membership publisher, for harnesses simulating member loss.
    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    /// Shuts both nodes down.
    pub async fn shutdown(self) {
        self.node2.shutdown().await;
        self.node1.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockGenerationClient;
    use crate::recipe::RecipeRequest;
    use std::time::Duration;

    fn mock_client() -> Arc<dyn GenerationClient> {
        Arc::new(MockGenerationClient::succeeding("Recipe text"))
    }

    #[tokio::test]
    async fn test_node1_hosts_router_but_not_substitution() {
        let node = Node::start(NodeRole::Node1, mock_client());

        assert!(node.router().is_ok());
        let err = node.substitution().unwrap_err();
        assert_eq!(err.role, NodeRole::Node2);
        assert!(err.to_string().contains("not available on this node"));

        node.shutdown().await;
    }

    #[tokio::test]
    async fn test_node2_hosts_substitution_but_not_router() {
        let node = Node::start(NodeRole::Node2, mock_client());

        assert!(node.substitution().is_ok());
        assert!(node.router().is_err());

        node.shutdown().await;
    }

    #[tokio::test]
    async fn test_local_cluster_starts_ready() {
        let cluster = LocalCluster::start(mock_client());

        assert!(cluster.is_ready());
        assert_eq!(cluster.view().len(), 2);

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_local_cluster_serves_recipes_end_to_end() {
        let cluster = LocalCluster::start(mock_client());

        let rx = cluster
            .router()
            .unwrap()
            .find_recipe_ask(RecipeRequest::new("chicken curry", "spicy", true))
            .await
            .unwrap();
        let response = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.text, "Recipe text");
        assert_eq!(response.method, "ask");

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_member_loss_drops_readiness() {
        let cluster = LocalCluster::start(mock_client());
        cluster.membership().member_removed(NodeRole::Node2);

        assert!(!cluster.is_ready());

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_completes() {
        let cluster = LocalCluster::start(mock_client());

        tokio::time::timeout(Duration::from_secs(5), cluster.shutdown())
            .await
            .expect("shutdown should complete within 5 seconds");
    }
}
