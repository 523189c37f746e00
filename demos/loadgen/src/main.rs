//! Concurrent client load generator for a running `paxoslog` cluster.
//!
//! Grounded in the original prototype's `scripts/tester.go`: spawn `clients`
//! concurrent simulated clients, each firing `requests` sequential POSTs of a
//! random numeric string to one replica from a round-robin list, counting
//! successes. Not part of the `paxoslog`/`paxoslog-node` workspace members —
//! this is a demonstration tool, not a dependency of the protocol core or its
//! test suite.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rand::Rng;

#[derive(Parser, Debug)]
#[command(name = "loadgen", about = "Fire concurrent client requests at a paxoslog cluster.")]
struct Opt {
    /// Number of concurrent simulated clients.
    #[arg(long, default_value_t = 10)]
    clients: usize,

    /// Number of sequential requests each client sends.
    #[arg(long, default_value_t = 100)]
    requests: usize,

    /// Comma-separated replica addresses; client `i` targets `replicas[i % len]`.
    #[arg(long, value_delimiter = ',')]
    replicas: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();
    let opt = Opt::parse();

    if opt.replicas.is_empty() {
        tracing::error!("replica list is empty");
        std::process::exit(1);
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(opt.timeout_secs))
        .build()
        .expect("reqwest client configuration is valid");

    let successes = Arc::new(AtomicU64::new(0));
    let replicas = Arc::new(opt.replicas);
    let total = opt.clients * opt.requests;

    let mut handles = Vec::with_capacity(opt.clients);
    for id in 0..opt.clients {
        let client = client.clone();
        let replicas = Arc::clone(&replicas);
        let successes = Arc::clone(&successes);
        let requests = opt.requests;
        handles.push(tokio::spawn(async move {
            run_client(id, &client, &replicas, requests, &successes).await;
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    tracing::info!(
        succeeded = successes.load(Ordering::Relaxed),
        attempted = total,
        "load test complete"
    );
}

async fn run_client(
    id: usize,
    client: &reqwest::Client,
    replicas: &[String],
    requests: usize,
    successes: &AtomicU64,
) {
    let replica = &replicas[id % replicas.len()];
    let url = format!("http://{replica}/replica/request");

    for _ in 0..requests {
        let value = rand::thread_rng().gen_range(0..1000).to_string();

        let response = match client.post(&url).body(value.clone()).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(client = id, %error, value, "request failed");
                break;
            }
        };

        if response.status().is_success() {
            successes.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(client = id, replica, value, "accepted");
        } else {
            tracing::warn!(client = id, replica, value, status = %response.status(), "rejected");
        }
    }
}
