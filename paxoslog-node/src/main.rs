use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use paxoslog::{Leader, Quorum, Replica, Transport};
use paxoslog_node::client::HttpTransport;
use paxoslog_node::config::{Opt, QuorumPolicy, Role};
use paxoslog_node::{http, logging};

#[tokio::main]
async fn main() {
    let opt = Opt::parse();
    logging::init(opt.verbose);

    let addr: SocketAddr = match opt.addr.parse() {
        Ok(addr) => addr,
        Err(error) => {
            tracing::error!(%error, addr = %opt.addr, "malformed bind address");
            std::process::exit(1);
        }
    };

    let router = match opt.role {
        Role::Leader => {
            let transport: Arc<dyn Transport> =
                Arc::new(HttpTransport::new(Duration::from_secs(opt.leader_timeout_secs)));
            let mut leader =
                Leader::new(opt.addr.clone(), opt.leaders.clone(), opt.replicas.clone(), transport);
            if opt.quorum == QuorumPolicy::Received {
                leader = leader.with_quorum(Quorum::ReceivedMajority);
            }
            tracing::info!(
                id = %opt.addr,
                peers = ?opt.leaders,
                replicas = ?opt.replicas,
                quorum = ?opt.quorum,
                "starting leader"
            );
            http::leader_router(Arc::new(leader))
        }
        Role::Replica => {
            let transport: Arc<dyn Transport> =
                Arc::new(HttpTransport::new(Duration::from_secs(opt.replica_timeout_secs)));
            let replica = Replica::new(opt.addr.clone(), opt.leaders.clone(), transport)
                .with_retry_backoff(Duration::from_millis(opt.retry_backoff_millis));
            tracing::info!(
                id = %opt.addr,
                leaders = ?opt.leaders,
                retry_backoff_millis = opt.retry_backoff_millis,
                "starting replica"
            );
            http::replica_router(Arc::new(replica))
        }
    };

    tracing::info!(%addr, "listening");
    if let Err(error) = axum::Server::bind(&addr).serve(router.into_make_service()).await {
        tracing::error!(%error, "server exited with error");
        std::process::exit(1);
    }
}
