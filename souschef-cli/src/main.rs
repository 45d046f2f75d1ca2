//! SousChef CLI - Command-line interface
//!
//! This binary provides a command-line interface to the SousChef library.

use clap::{Parser, Subcommand};
use std::process;

mod commands;
mod error;
mod logging;

#[derive(Parser)]
#[command(name = "souschef")]
#[command(version = souschef::VERSION)]
#[command(about = "Recipe generation routed through cooperating workers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Demonstrate the direct, ask, and forward messaging disciplines
    Patterns,
    /// Run the in-process worker and routing checks
    Selftest,
    /// Interactive recipe assistant
    Interactive,
    /// Check connectivity to the generation service
    Test,
    /// Start a cluster node hosting the given role's workers
    Node {
        /// Port for the node's transport endpoint
        port: u16,
        /// Role to host: node1 or node2
        role: String,
        /// Start this node as the cluster seed
        #[arg(long)]
        seed: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = match logging::init("logs", "souschef.log") {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error initializing logging: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Patterns => commands::patterns::run().await,
        Command::Selftest => commands::selftest::run().await,
        Command::Interactive => commands::interactive::run().await,
        Command::Test => commands::test::run().await,
        Command::Node { port, role, seed } => commands::node::run(port, &role, seed).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
