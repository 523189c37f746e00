//! # Summary
//!
//! This module abstracts over connections to peer leaders and replicas, the
//! same role the teacher's `internal`/`external` modules play for its
//! channel- and socket-based transports: the protocol core never names a
//! concrete socket type, only this trait. Production wiring implements it
//! over HTTP; tests implement it over an in-memory router.

use async_trait::async_trait;

use crate::error::Error;
use crate::model::{Acceptance, Decision, ErrorRes, Proposal, Request};

/// The outcome of forwarding a `Request` to a leader's `/leader/request` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderOutcome {
    /// Agreement reached; the decision is final.
    Decided(Decision),
    /// The leader is ahead of the replica; retarget using `last_slot`.
    FutureSlot(ErrorRes),
    /// The replica is behind; terminal for this attempt.
    InvalidSlot,
    /// The proposal was not chosen; retry with a fresh slot.
    ProposalLost,
}

/// A named request/response channel between peers, carrying the opaque
/// messages of §3 between a replica, a leader, and the leaders it treats as
/// its acceptor quorum.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `/leader/prepare`: send a phase-1 proposal to `leader`.
    async fn prepare(&self, leader: &str, proposal: Proposal) -> Result<Acceptance, Error>;

    /// `/leader/accept`: send a phase-2 proposal to `leader`.
    async fn accept(&self, leader: &str, proposal: Proposal) -> Result<Acceptance, Error>;

    /// `/replica/update`: push a chosen decision to `replica`.
    async fn decide(&self, replica: &str, decision: Decision) -> Result<(), Error>;

    /// `/leader/request`: forward a replica's request to `leader`.
    async fn forward(&self, leader: &str, request: Request) -> Result<LeaderOutcome, Error>;
}
