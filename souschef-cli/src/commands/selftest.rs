//! In-process worker and routing checks.
//!
//! Exercises the real configured generation backend through the full worker
//! assembly: value semantics, cluster wiring, all three messaging
//! disciplines, the substitution expert, and concurrent routing.

use super::common::preview;
use crate::error::CliError;
use souschef::cluster::LocalCluster;
use souschef::config::ConfigFile;
use souschef::provider::create_client;
use souschef::recipe::RecipeRequest;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Instant;
use tokio::sync::oneshot;

pub async fn run() -> Result<(), CliError> {
    println!("SOUSCHEF SELF-TEST");
    println!("==================");

    let mut failed = 0;

    check_value_semantics(&mut failed);

    let config = ConfigFile::load()?;
    let client = create_client(&config).await?;
    let cluster = LocalCluster::start(client);

    check_cluster_assembly(&cluster, &mut failed);
    check_disciplines(&cluster, &mut failed).await;
    check_substitution_expert(&cluster, &mut failed).await;
    check_concurrent_routing(&cluster, &mut failed).await;

    cluster.shutdown().await;

    if failed == 0 {
        println!("\nAll self-test checks passed.");
        Ok(())
    } else {
        Err(CliError::SelfTest { failed })
    }
}

fn report(name: &str, result: Result<String, String>, failed: &mut usize) {
    match result {
        Ok(detail) => println!("  PASSED: {} - {}", name, detail),
        Err(reason) => {
            println!("  FAILED: {} - {}", name, reason);
            *failed += 1;
        }
    }
}

fn check_value_semantics(failed: &mut usize) {
    println!("\n1. Request value semantics");

    let original = RecipeRequest::new("pasta carbonara", "vegetarian", true);
    let duplicate = RecipeRequest::new("pasta carbonara", "vegetarian", true);

    let result = if original != duplicate {
        Err("identical requests compare unequal".to_string())
    } else if hash_of(&original) != hash_of(&duplicate) {
        Err("identical requests hash differently".to_string())
    } else {
        Ok("equality and hashing are structural".to_string())
    };
    report("value semantics", result, failed);
}

fn hash_of(request: &RecipeRequest) -> u64 {
    let mut hasher = DefaultHasher::new();
    request.hash(&mut hasher);
    hasher.finish()
}

fn check_cluster_assembly(cluster: &LocalCluster, failed: &mut usize) {
    println!("\n2. Cluster assembly");

    let result = if !cluster.is_ready() {
        Err("both roles should be reachable".to_string())
    } else if cluster.router().is_err() {
        Err("router missing on node1".to_string())
    } else if cluster.substitution().is_err() {
        Err("substitution expert missing on node2".to_string())
    } else {
        Ok(format!("{} roles reachable, all workers hosted", cluster.view().len()))
    };
    report("cluster assembly", result, failed);
}

async fn check_disciplines(cluster: &LocalCluster, failed: &mut usize) {
    println!("\n3. Messaging disciplines");

    let router = match cluster.router() {
        Ok(router) => router,
        Err(e) => {
            report("disciplines", Err(e.to_string()), failed);
            return;
        }
    };

    let direct = async {
        let reply = router
            .find_recipe(RecipeRequest::new("quick soup", "none", false))
            .await
            .map_err(|e| e.to_string())?;
        reply.await.map_err(|e| e.to_string())
    }
    .await;
    report(
        "direct",
        direct.and_then(|r| {
            if r.is_failure() {
                Err(r.text)
            } else {
                Ok(format!("reply via '{}', {} chars", r.method, r.text.len()))
            }
        }),
        failed,
    );

    let ask = async {
        let reply = router
            .find_recipe_ask(RecipeRequest::new("pasta dish", "vegetarian", true))
            .await
            .map_err(|e| e.to_string())?;
        reply.await.map_err(|e| e.to_string())
    }
    .await;
    report(
        "ask",
        ask.and_then(|r| {
            if r.is_failure() {
                Err(r.text)
            } else {
                Ok(format!("reply via '{}', {} chars", r.method, r.text.len()))
            }
        }),
        failed,
    );

    let forward = async {
        let (destination, forwarded) = oneshot::channel();
        router
            .forward_to_generator(RecipeRequest::new("salad", "healthy", false), destination)
            .await
            .map_err(|e| e.to_string())?;
        forwarded.await.map_err(|e| e.to_string())
    }
    .await;
    report(
        "forward",
        forward.and_then(|r| {
            if r.is_failure() {
                Err(r.text)
            } else {
                Ok(format!("reply via '{}', {} chars", r.method, r.text.len()))
            }
        }),
        failed,
    );
}

async fn check_substitution_expert(cluster: &LocalCluster, failed: &mut usize) {
    println!("\n4. Substitution expert");

    let result = async {
        let handle = cluster.substitution().map_err(|e| e.to_string())?;
        let reply = handle
            .find_substitutions(RecipeRequest::new("pasta carbonara", "vegan", true))
            .await
            .map_err(|e| e.to_string())?;
        let reply = reply.await.map_err(|e| e.to_string())?;
        Ok(format!("advice: {}", preview(&reply.text, 60)))
    }
    .await;
    report("substitutions", result, failed);
}

async fn check_concurrent_routing(cluster: &LocalCluster, failed: &mut usize) {
    println!("\n5. Concurrent routing");

    let result = async {
        let router = cluster.router().map_err(|e| e.to_string())?;
        let queries = ["quick pasta dish", "simple breakfast", "healthy snack"];
        let start = Instant::now();

        let mut receivers = Vec::new();
        for query in queries {
            let reply = router
                .find_recipe(RecipeRequest::new(query, "none", false))
                .await
                .map_err(|e| e.to_string())?;
            receivers.push(reply);
        }

        for reply in receivers {
            let response = reply.await.map_err(|e| e.to_string())?;
            if response.is_failure() {
                return Err(response.text);
            }
        }

        let elapsed = start.elapsed();
        Ok(format!(
            "{} concurrent requests in {:.2}s ({:.2}s avg)",
            queries.len(),
            elapsed.as_secs_f64(),
            elapsed.as_secs_f64() / queries.len() as f64
        ))
    }
    .await;
    report("concurrency", result, failed);
}
