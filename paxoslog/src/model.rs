//! # Summary
//!
//! This module defines the wire-shaped records passed between replicas,
//! leaders, and acceptors: `Request`, `Proposal`, `Acceptance`, `Decision`,
//! and `ErrorRes`. Every type here derives `Serialize`/`Deserialize` so it
//! can cross the `Transport` boundary unchanged, matching the JSON-shaped
//! payloads of the node's HTTP endpoints.

use serde::{Deserialize, Serialize};

pub type SlotId = u64;
pub type ProposalId = u64;

/// A message from a replica to a leader: "make `value` the decision for `slot_id`."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Stable network address of the originating replica, used by the leader to
    /// exclude the originator from the decision broadcast.
    pub replica_id: String,
    pub slot_id: SlotId,
    pub value: String,
}

/// A candidate `(id, slot, value)` triple a proposer wants accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub proposal_id: ProposalId,
    pub slot_id: SlotId,
    pub value: String,
}

/// A previously promised or accepted `(id, value)` pair, surfaced to a competing
/// proposer so it can detect staleness or recover a prior value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousProposal {
    pub id: ProposalId,
    pub value: String,
}

/// An acceptor's reply to a prepare or accept message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acceptance {
    pub proposal_id: ProposalId,
    pub prev_promise: Option<PreviousProposal>,
    pub prev_accept: Option<PreviousProposal>,
    /// Meaningful only in accept-phase replies.
    pub accepted: bool,
}

/// A value that has been chosen for a slot; must be applied by every replica exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub slot_id: SlotId,
    pub value: String,
}

/// Carried by a future-slot response so the replica can retarget.
///
/// `last_slot` is the leader's count of decided slots; a replica retargets by
/// setting its next request's `slot_id` directly to this value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRes {
    pub requested_slot: SlotId,
    pub last_slot: SlotId,
}
