//! # Summary
//!
//! This module implements the `Replica` role: accepting client values,
//! picking a target slot, forwarding to a leader, and reconciling the
//! resulting decisions (or decisions that arrive unsolicited, via
//! broadcast) into a gap-free, append-only log.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::Error;
use crate::model::{Decision, Request, SlotId};
use crate::transport::{LeaderOutcome, Transport};

/// The append-only log plus the out-of-order staging area of spec §3.
///
/// Invariant: for every key `k` in `pending`, `k > log.len()`; once `pending[k]`
/// holds a value, a later arrival for `k` must carry the same value.
#[derive(Debug, Default)]
struct ReplicaState {
    log: Vec<String>,
    pending: HashMap<SlotId, String>,
}

impl ReplicaState {
    /// Appends every contiguous decision already staged in `pending`, starting
    /// from the current log length. Used both before building a new request
    /// (so it targets the true next-open slot) and after an `Update` closes a
    /// gap (so later arrivals held in `pending` get applied immediately).
    fn drain_pending(&mut self) {
        while let Some(value) = self.pending.remove(&(self.log.len() as SlotId)) {
            self.log.push(value);
        }
    }
}

/// A per-node replica: client-facing front door and log reconciler.
pub struct Replica {
    id: String,
    leaders: Vec<String>,
    state: Mutex<ReplicaState>,
    transport: std::sync::Arc<dyn Transport>,
    /// Fixed delay before retrying a lost proposal. Per spec §9's livelock note,
    /// this is a constant, not randomized backoff — randomized backoff is the
    /// documented-but-unimplemented fix for dueling-proposer livelock.
    retry_backoff: Duration,
}

impl Replica {
    pub fn new(id: String, leaders: Vec<String>, transport: std::sync::Arc<dyn Transport>) -> Self {
        Replica {
            id,
            leaders,
            state: Mutex::new(ReplicaState::default()),
            transport,
            retry_backoff: Duration::ZERO,
        }
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// A snapshot of the externally observable, gap-free log.
    pub fn log(&self) -> Vec<String> {
        self.state.lock().log.clone()
    }

    /// HandleRequest: §4.4. Targets the replica's next-open slot, forwards to
    /// the first configured leader, and retargets or retries in place as the
    /// leader's response dictates. Never sleeps except on a lost-proposal retry,
    /// and then only by `retry_backoff`.
    pub async fn handle_request(&self, value: String) -> Result<(), Error> {
        let leader = self.leaders.first().ok_or(Error::NoLeadersConfigured)?.clone();

        let mut slot_id = {
            let mut state = self.state.lock();
            state.drain_pending();
            state.log.len() as SlotId
        };

        loop {
            let request = Request { replica_id: self.id.clone(), slot_id, value: value.clone() };

            match self.transport.forward(&leader, request).await? {
                LeaderOutcome::Decided(decision) => {
                    self.update(decision)?;
                    return Ok(());
                }
                LeaderOutcome::FutureSlot(error_res) => {
                    // `last_slot` is the leader's count of decided slots (see
                    // `Leader::validate_slot`), i.e. already the slot to retry.
                    slot_id = error_res.last_slot;
                }
                LeaderOutcome::InvalidSlot => {
                    return Err(Error::InvalidSlot { requested: slot_id });
                }
                LeaderOutcome::ProposalLost => {
                    slot_id += 1;
                    if !self.retry_backoff.is_zero() {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
            }
        }
    }

    /// Update: §4.4. Applies a decision reached elsewhere (broadcast from a
    /// leader, or learned inline from this replica's own successful request).
    pub fn update(&self, decision: Decision) -> Result<(), Error> {
        let mut state = self.state.lock();
        let log_len = state.log.len() as SlotId;

        if decision.slot_id == log_len {
            state.log.push(decision.value);
            state.drain_pending();
            Ok(())
        } else if decision.slot_id > log_len {
            match state.pending.get(&decision.slot_id) {
                Some(existing) if *existing != decision.value => {
                    Err(Error::ConflictingDecision { slot_id: decision.slot_id })
                }
                Some(_) => Ok(()),
                None => {
                    state.pending.insert(decision.slot_id, decision.value);
                    Ok(())
                }
            }
        } else {
            Err(Error::StaleDecision { slot_id: decision.slot_id, log_len })
        }
    }
}
