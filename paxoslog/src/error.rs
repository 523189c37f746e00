//! # Summary
//!
//! This module defines the error taxonomy of §7: every unrecoverable
//! condition a proposer, acceptor, leader, or replica can surface. Lost
//! rounds and retargeting are *not* represented here — they are typed,
//! non-error outcomes of `Propose` and `HandleRequest` respectively.

use crate::model::SlotId;

/// Unrecoverable conditions surfaced by the protocol core.
///
/// Node-facing code (the binary crate) maps each variant onto the status
/// taxonomy of §6 without the protocol core depending on any HTTP types.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An acceptor refused a proposal because it has already accepted a later slot.
    #[error("stale proposal: slot {slot_id} already superseded by accepted slot {accepted_slot}")]
    StaleProposal { slot_id: SlotId, accepted_slot: SlotId },

    /// A leader refused a request because the replica is behind (`slot_id < lastSlot + 1`).
    #[error("invalid slot: requested {requested} is behind the leader's next slot")]
    InvalidSlot { requested: SlotId },

    /// A replica's pending map already held a different value for this slot.
    #[error("conflicting decision at slot {slot_id}: existing value differs from incoming value")]
    ConflictingDecision { slot_id: SlotId },

    /// A replica received a decision for a slot already present in its log.
    #[error("stale decision: slot {slot_id} is before the replica's log length {log_len}")]
    StaleDecision { slot_id: SlotId, log_len: u64 },

    /// Every acceptor (or every replica, for a broadcast) was unreachable within the timeout.
    #[error("transport failure: no peer reachable for {operation}")]
    TransportFailure { operation: &'static str },

    /// A single peer's call failed; carried only for logging, never aborts a round on its own.
    #[error("transport error contacting {peer}: {message}")]
    PeerUnreachable { peer: String, message: String },

    /// The replica's configured leader list is empty.
    #[error("no leaders configured")]
    NoLeadersConfigured,

    /// A response from a peer could not be interpreted as the expected message type.
    #[error("malformed response from {peer}: {message}")]
    MalformedResponse { peer: String, message: String },
}
