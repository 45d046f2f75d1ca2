//! Generation service connectivity check.

use crate::error::CliError;
use souschef::config::ConfigFile;
use souschef::provider::create_client;

pub async fn run() -> Result<(), CliError> {
    println!("Testing generation service connectivity...");

    let config = ConfigFile::load()?;
    let client = create_client(&config).await?;
    println!("Using backend: {}", client.name());

    let response = client
        .generate("Give me a simple recipe for scrambled eggs")
        .await?;

    println!("Connectivity check passed. Response:");
    println!("{}", "=".repeat(40));
    println!("{}", response);
    println!("{}", "=".repeat(40));
    Ok(())
}
