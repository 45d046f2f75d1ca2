//! Cluster node mode.
//!
//! Starts the workers for one role and waits on the membership layer. The
//! physical transport that makes a remote role reachable is provided
//! externally; this command hosts the role's workers, announces itself, and
//! opens the console once both roles are observed. Until then, node2-only
//! capabilities are refused with a plain "not available on this node"
//! message.

use super::common::print_recipe;
use crate::error::CliError;
use souschef::cluster::{Membership, Node, NodeRole};
use souschef::config::ConfigFile;
use souschef::provider::create_client;
use souschef::recipe::RecipeRequest;
use souschef::worker::FileAuditSink;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Served recipes are audited to this file on a long-running node.
const AUDIT_LOG_PATH: &str = "logs/recipe-audit.log";

pub async fn run(port: u16, role_name: &str, seed: bool) -> Result<(), CliError> {
    let role: NodeRole = role_name.parse()?;

    let config = ConfigFile::load()?;
    let client = create_client(&config).await?;

    let (membership, mut watch) = Membership::new();
    let node = Node::start_with_audit_sink(role, client, Arc::new(FileAuditSink::new(AUDIT_LOG_PATH)));
    membership.member_up(role);

    info!(
        system = %config.node.system_name,
        port,
        role = %role,
        seed,
        "cluster node started"
    );

    println!(
        "Started {} node on port {}{}",
        role,
        port,
        if seed { " as cluster seed" } else { "" }
    );
    println!(
        "Hosting: {}",
        match role {
            NodeRole::Node1 => "router, generation worker, audit worker",
            NodeRole::Node2 => "generation worker, substitution expert",
        }
    );
    println!("Waiting for the peer role to become reachable (Ctrl-C to stop)...");

    tokio::select! {
        ready = watch.wait_ready() => {
            if ready {
                println!("Both roles are reachable; ready for recipe requests.");
                if role == NodeRole::Node1 {
                    console(&node).await?;
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    node.shutdown().await;
    Ok(())
}

/// Minimal console for a ready node1: recipe requests plus the placement
/// refusal path for capabilities this role does not host.
async fn console(node: &Node) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nRecipe request ('substitution-test', 'quit'): ");
        std::io::stdout().flush()?;

        let Some(input) = lines.next_line().await? else {
            break;
        };
        let input = input.trim();

        match input {
            "" => continue,
            "quit" | "exit" => break,
            "substitution-test" => match node.substitution() {
                Ok(_) => println!("Substitution expert is hosted locally."),
                Err(e) => println!("{}", e),
            },
            query => {
                let request = RecipeRequest::new(query, "none", false);
                let reply = node.router()?.find_recipe(request).await?;
                print_recipe(&reply.await?);
            }
        }
    }
    Ok(())
}
