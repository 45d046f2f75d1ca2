//! Interactive recipe assistant.
//!
//! Hosts both roles in-process and drives the router from a console loop.
//! Free text is treated as a recipe request; the named commands inspect the
//! cluster or exercise individual workers.

use super::common::print_recipe;
use crate::error::CliError;
use souschef::cluster::{LocalCluster, NodeRole};
use souschef::config::ConfigFile;
use souschef::provider::create_client;
use souschef::recipe::RecipeRequest;
use std::io::Write;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type InputLines = Lines<BufReader<Stdin>>;

pub async fn run() -> Result<(), CliError> {
    println!("Welcome to the Smart Cooking Assistant!");
    println!("=======================================");

    let config = ConfigFile::load()?;
    let client = create_client(&config).await?;
    println!("Generation backend ready: {}", client.name());

    let cluster = LocalCluster::start(client);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_help();

    loop {
        let Some(input) = prompt(&mut lines, "\nCommand (or recipe request): ").await? else {
            break;
        };
        let input = input.trim().to_string();

        match input.as_str() {
            "" => println!("Please enter a command or recipe request."),
            "quit" | "exit" => {
                println!("Thanks for using the Smart Cooking Assistant!");
                break;
            }
            "cluster-status" => print_cluster_status(&cluster),
            "actor-test" => routing_check(&cluster).await,
            "performance-test" => performance_check(&cluster).await,
            "substitution-test" => substitution_check(&cluster).await,
            query => serve_recipe(&cluster, query, &mut lines).await?,
        }
    }

    cluster.shutdown().await;
    Ok(())
}

fn print_help() {
    println!("\nAvailable commands:");
    println!("  - Type a recipe request normally (e.g., 'chicken curry')");
    println!("  - 'cluster-status' to see cluster info");
    println!("  - 'actor-test' to test worker communication");
    println!("  - 'performance-test' to run concurrent requests");
    println!("  - 'substitution-test' to test the substitution expert");
    println!("  - 'quit' to exit");
}

async fn prompt(lines: &mut InputLines, text: &str) -> Result<Option<String>, CliError> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

async fn serve_recipe(
    cluster: &LocalCluster,
    query: &str,
    lines: &mut InputLines,
) -> Result<(), CliError> {
    let dietary = prompt(
        lines,
        "Dietary preferences? (vegetarian/vegan/gluten-free/keto or Enter for none): ",
    )
    .await?
    .unwrap_or_default();
    let dietary = if dietary.trim().is_empty() {
        "none".to_string()
    } else {
        dietary.trim().to_string()
    };

    let subs = prompt(lines, "Need ingredient substitutions? (y/n): ")
        .await?
        .unwrap_or_default();
    let need_substitutions = subs.trim().to_lowercase().starts_with('y');

    let request = RecipeRequest::new(query, dietary, need_substitutions);
    println!("\nGenerating recipe for: {:?}", request);

    match cluster.router() {
        Ok(router) => {
            let reply = router.find_recipe(request).await?;
            print_recipe(&reply.await?);
        }
        Err(e) => println!("{}", e),
    }
    Ok(())
}

fn print_cluster_status(cluster: &LocalCluster) {
    println!("\nCLUSTER STATUS");
    println!("==============");

    let view = cluster.view();
    for role in NodeRole::ALL {
        let state = if view.contains(role) {
            "reachable"
        } else {
            "unreachable"
        };
        println!("  {}: {}", role, state);
    }
    println!(
        "Status: {}",
        if cluster.is_ready() {
            "complete"
        } else {
            "incomplete"
        }
    );
    println!(
        "Router: {}",
        if cluster.router().is_ok() {
            "available"
        } else {
            "not available"
        }
    );
    println!(
        "Substitution expert: {}",
        if cluster.substitution().is_ok() {
            "available"
        } else {
            "not available"
        }
    );
}

async fn routing_check(cluster: &LocalCluster) {
    println!("\nTesting worker communication...");

    let router = match cluster.router() {
        Ok(router) => router,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    let request = RecipeRequest::new("communication test - simple salad", "healthy", false);
    match router.find_recipe(request).await {
        Ok(reply) => match reply.await {
            Ok(response) if !response.is_failure() => {
                println!("Worker chain responded via '{}' ({} chars)", response.method, response.text.len());
            }
            Ok(response) => println!("Worker chain failed: {}", response.text),
            Err(_) => println!("No reply received"),
        },
        Err(e) => println!("{}", e),
    }
}

async fn performance_check(cluster: &LocalCluster) {
    println!("\nRunning concurrent request check...");

    let router = match cluster.router() {
        Ok(router) => router,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    let queries = ["quick pasta dish", "simple breakfast", "healthy snack"];
    let start = Instant::now();

    let mut receivers = Vec::new();
    for query in queries {
        match router
            .find_recipe(RecipeRequest::new(query, "none", false))
            .await
        {
            Ok(reply) => receivers.push((query, reply)),
            Err(e) => {
                println!("{}", e);
                return;
            }
        }
    }
    println!("Sent {} concurrent requests...", queries.len());

    for (query, reply) in receivers {
        match reply.await {
            Ok(response) => println!("  '{}' answered via '{}'", query, response.method),
            Err(_) => println!("  '{}' got no reply", query),
        }
    }

    let elapsed = start.elapsed();
    println!(
        "Total {:.2}s, {:.2}s average per request",
        elapsed.as_secs_f64(),
        elapsed.as_secs_f64() / queries.len() as f64
    );
}

async fn substitution_check(cluster: &LocalCluster) {
    println!("\nTesting substitution expert...");

    // Fail fast with a plain refusal when node2 is not reachable.
    let handle = match cluster.substitution() {
        Ok(handle) => handle,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    let request = RecipeRequest::new("pasta carbonara", "vegan", true);
    match handle.find_substitutions(request).await {
        Ok(reply) => match reply.await {
            Ok(reply) => {
                println!("{}", "=".repeat(60));
                println!("{}", reply.text);
                println!("{}", "=".repeat(60));
            }
            Err(_) => println!("No reply received"),
        },
        Err(e) => println!("{}", e),
    }
}
