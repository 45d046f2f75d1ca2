//! Demonstration of the three messaging disciplines.

use super::common::print_response;
use crate::error::CliError;
use souschef::cluster::LocalCluster;
use souschef::config::ConfigFile;
use souschef::provider::create_client;
use souschef::recipe::RecipeRequest;
use tokio::sync::oneshot;

pub async fn run() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let client = create_client(&config).await?;
    let cluster = LocalCluster::start(client);
    let router = cluster.router()?;

    println!("Demonstrating the three messaging disciplines");
    println!("=============================================");

    println!("\n1. DIRECT (fire-and-forget dispatch):");
    let reply = router
        .find_recipe(RecipeRequest::new("simple pasta", "none", false))
        .await?;
    print_response(&reply.await?);

    println!("\n2. ASK (request/response bounded at 30s):");
    let reply = router
        .find_recipe_ask(RecipeRequest::new("chicken curry", "spicy", true))
        .await?;
    print_response(&reply.await?);

    println!("\n3. FORWARD (original sender preserved):");
    let (destination, forwarded) = oneshot::channel();
    router
        .forward_to_generator(
            RecipeRequest::new("vegetable soup", "vegan", false),
            destination,
        )
        .await?;
    print_response(&forwarded.await?);

    println!("\nAll three disciplines completed.");
    cluster.shutdown().await;
    Ok(())
}
