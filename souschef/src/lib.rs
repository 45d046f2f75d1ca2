//! SousChef - Recipe generation routed through cooperating workers
//!
//! This library implements a small recipe assistant as a set of cooperating
//! workers: a router accepts recipe commands under three messaging
//! disciplines (direct, ask-with-timeout, forward-with-sender-preservation),
//! dispatches them to a generation worker that calls an external text
//! generation service, and fans completed requests out to an audit worker
//! and the original caller.
//!
//! # High-Level API
//!
//! For most use cases, [`cluster::LocalCluster`] wires both node roles in
//! one process:
//!
//! ```ignore
//! use souschef::cluster::LocalCluster;
//! use souschef::config::ConfigFile;
//! use souschef::provider::create_client;
//! use souschef::recipe::RecipeRequest;
//!
//! let config = ConfigFile::load()?;
//! let client = create_client(&config).await?;
//! let cluster = LocalCluster::start(client);
//!
//! let request = RecipeRequest::new("chicken curry", "spicy", true);
//! let reply = cluster.router()?.find_recipe_ask(request).await?;
//! println!("{}", reply.await?.text);
//! ```

pub mod cluster;
pub mod config;
pub mod provider;
pub mod recipe;
pub mod router;
pub mod worker;

/// Version of the SousChef library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
