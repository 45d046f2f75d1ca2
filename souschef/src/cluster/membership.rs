//! Cluster membership view and readiness signalling.
//!
//! [`Membership`] publishes the set of reachable roles over a watch channel.
//! Consumers hold a [`MembershipWatch`] and either inspect the current view
//! or await [`MembershipWatch::wait_ready`], which resolves the first time
//! both roles are reachable.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

/// A named placement group determining which workers are locally available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeRole {
    /// Hosts the router, a generation worker, and the audit worker.
    Node1,
    /// Hosts a second generation worker and the substitution expert.
    Node2,
}

impl NodeRole {
    /// Both roles, in order.
    pub const ALL: [NodeRole; 2] = [NodeRole::Node1, NodeRole::Node2];
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Node1 => write!(f, "node1"),
            NodeRole::Node2 => write!(f, "node2"),
        }
    }
}

/// Error parsing a role name.
#[derive(Debug, Error)]
#[error("unknown role '{0}', expected 'node1' or 'node2'")]
pub struct RoleParseError(String);

impl FromStr for NodeRole {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node1" => Ok(NodeRole::Node1),
            "node2" => Ok(NodeRole::Node2),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// The set of currently reachable roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipView {
    members: BTreeSet<NodeRole>,
}

impl MembershipView {
    /// Returns true when `role` is reachable.
    pub fn contains(&self, role: NodeRole) -> bool {
        self.members.contains(&role)
    }

    /// Returns true when both roles are reachable.
    pub fn is_complete(&self) -> bool {
        NodeRole::ALL.iter().all(|role| self.members.contains(role))
    }

    /// Number of reachable roles.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true when no role is reachable.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates the reachable roles.
    pub fn roles(&self) -> impl Iterator<Item = NodeRole> + '_ {
        self.members.iter().copied()
    }
}

/// Publisher side of the membership view.
///
/// The transport layer (or an in-process harness) calls
/// [`member_up`](Self::member_up) / [`member_removed`](Self::member_removed)
/// as roles join and leave.
pub struct Membership {
    view_tx: watch::Sender<MembershipView>,
}

impl Membership {
    /// Creates an empty membership with one initial watch.
    pub fn new() -> (Self, MembershipWatch) {
        let (view_tx, view_rx) = watch::channel(MembershipView::default());
        (Self { view_tx }, MembershipWatch { view_rx })
    }

    /// Marks a role as reachable.
    pub fn member_up(&self, role: NodeRole) {
        self.view_tx.send_modify(|view| {
            if view.members.insert(role) {
                info!(role = %role, reachable = view.members.len(), "member up");
            }
        });
    }

    /// Marks a role as no longer reachable.
    pub fn member_removed(&self, role: NodeRole) {
        self.view_tx.send_modify(|view| {
            if view.members.remove(&role) {
                info!(role = %role, reachable = view.members.len(), "member removed");
            }
        });
    }

    /// Creates another watch on the view.
    pub fn watch(&self) -> MembershipWatch {
        MembershipWatch {
            view_rx: self.view_tx.subscribe(),
        }
    }
}

/// Consumer side of the membership view.
#[derive(Clone)]
pub struct MembershipWatch {
    view_rx: watch::Receiver<MembershipView>,
}

impl MembershipWatch {
    /// Snapshot of the current view.
    pub fn view(&self) -> MembershipView {
        self.view_rx.borrow().clone()
    }

    /// Returns true when both roles are currently reachable.
    pub fn is_ready(&self) -> bool {
        self.view_rx.borrow().is_complete()
    }

    /// Waits until both roles are reachable.
    ///
    /// Resolves immediately when the current view already qualifies. Returns
    /// false if the membership publisher went away before readiness.
    pub async fn wait_ready(&mut self) -> bool {
        self.view_rx
            .wait_for(|view| view.is_complete())
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_role_round_trips_through_names() {
        for role in NodeRole::ALL {
            assert_eq!(role.to_string().parse::<NodeRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!("node3".parse::<NodeRole>().is_err());
    }

    #[test]
    fn test_view_completeness() {
        let (membership, watch) = Membership::new();
        assert!(watch.view().is_empty());
        assert!(!watch.is_ready());

        membership.member_up(NodeRole::Node1);
        assert!(watch.view().contains(NodeRole::Node1));
        assert!(!watch.is_ready());

        membership.member_up(NodeRole::Node2);
        assert!(watch.is_ready());
        assert_eq!(watch.view().len(), 2);
    }

    #[test]
    fn test_duplicate_member_up_is_idempotent() {
        let (membership, watch) = Membership::new();
        membership.member_up(NodeRole::Node1);
        membership.member_up(NodeRole::Node1);

        assert_eq!(watch.view().len(), 1);
    }

    #[test]
    fn test_member_removal_shrinks_view() {
        let (membership, watch) = Membership::new();
        membership.member_up(NodeRole::Node1);
        membership.member_up(NodeRole::Node2);
        membership.member_removed(NodeRole::Node2);

        assert!(!watch.is_ready());
        assert!(!watch.view().contains(NodeRole::Node2));
    }

    #[tokio::test]
    async fn test_wait_ready_resolves_on_second_member() {
        let (membership, mut watch) = Membership::new();
        membership.member_up(NodeRole::Node1);

        let waiter = tokio::spawn(async move { watch.wait_ready().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        membership.member_up(NodeRole::Node2);

        let ready = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(ready);
    }

    #[tokio::test]
    async fn test_wait_ready_reports_lost_publisher() {
        let (membership, mut watch) = Membership::new();
        drop(membership);

        assert!(!watch.wait_ready().await);
    }
}
