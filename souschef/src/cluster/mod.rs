//! Two-role placement for the cooking workers.
//!
//! Role `node1` hosts the router, a generation worker, and the audit worker;
//! role `node2` hosts a second generation worker and the substitution
//! expert. The membership layer reports which roles are currently reachable;
//! the environment becomes ready once both roles have been observed. How a
//! remote role becomes reachable is the transport layer's business; this
//! module only consumes the resulting membership events.

mod membership;
mod node;

pub use membership::{
    Membership, MembershipView, MembershipWatch, NodeRole, RoleParseError,
};
pub use node::{LocalCluster, Node, PlacementError};
