//! # Summary
//!
//! Serves the endpoint table of spec §6 with `axum`, the idiomatic Rust
//! analogue of the original prototype's `gorilla/mux` router
//! (`original_source/server/http.go`). Each handler maps a `paxoslog`
//! outcome or error onto the status taxonomy of §6 — this is the only place
//! in the workspace that knows about HTTP status codes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use paxoslog::{Decision, Error, Leader, LeaderOutcome, Proposal, Replica, Request};

/// 425, RFC 8470 "Too Early" — used here for the future-slot reply of §6,
/// which is exactly that: the leader is asking the replica to retry once
/// it's retargeted, not reporting a failure. `StatusCode` has no named
/// constant for 425, so this extension trait builds it from its numeric code.
trait TooEarly {
    fn too_early() -> StatusCode;
}

impl TooEarly for StatusCode {
    fn too_early() -> StatusCode {
        StatusCode::from_u16(425).expect("425 is a valid HTTP status code")
    }
}

pub fn leader_router(leader: Arc<Leader>) -> Router {
    Router::new()
        .route("/leader/prepare", post(handle_prepare))
        .route("/leader/accept", post(handle_accept))
        .route("/leader/request", post(handle_leader_request))
        .with_state(leader)
}

pub fn replica_router(replica: Arc<Replica>) -> Router {
    Router::new()
        .route("/replica/request", post(handle_replica_request))
        .route("/replica/update", post(handle_replica_update))
        .with_state(replica)
}

async fn handle_prepare(State(leader): State<Arc<Leader>>, Json(proposal): Json<Proposal>) -> Response {
    match leader.handle_prepare(proposal) {
        Ok(acceptance) => (StatusCode::OK, Json(acceptance)).into_response(),
        Err(error) => server_error(error),
    }
}

async fn handle_accept(State(leader): State<Arc<Leader>>, Json(proposal): Json<Proposal>) -> Response {
    match leader.handle_accept(proposal) {
        Ok(acceptance) => (StatusCode::OK, Json(acceptance)).into_response(),
        Err(error) => server_error(error),
    }
}

async fn handle_leader_request(State(leader): State<Arc<Leader>>, Json(request): Json<Request>) -> Response {
    match leader.handle_request(request).await {
        Ok(LeaderOutcome::Decided(decision)) => (StatusCode::OK, Json(decision)).into_response(),
        Ok(LeaderOutcome::FutureSlot(error_res)) => (StatusCode::too_early(), Json(error_res)).into_response(),
        Ok(LeaderOutcome::InvalidSlot) => StatusCode::BAD_REQUEST.into_response(),
        Ok(LeaderOutcome::ProposalLost) => StatusCode::NOT_ACCEPTABLE.into_response(),
        Err(error) => server_error(error),
    }
}

async fn handle_replica_request(State(replica): State<Arc<Replica>>, body: String) -> Response {
    match replica.handle_request(body).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => server_error(error),
    }
}

async fn handle_replica_update(State(replica): State<Arc<Replica>>, Json(decision): Json<Decision>) -> Response {
    match replica.update(decision) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => server_error(error),
    }
}

fn server_error(error: Error) -> Response {
    tracing::error!(%error, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
}
