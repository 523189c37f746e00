//! # Summary
//!
//! This module ties the acceptor state machine, the proposer's phase tally,
//! and the slot validator together into the `Leader` role: a per-node
//! singleton that answers `/leader/prepare` and `/leader/accept` as an
//! acceptor, and drives `/leader/request` as a proposer against its peers.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::acceptor::AcceptorState;
use crate::error::Error;
use crate::ids;
use crate::model::{Decision, Proposal, ProposalId, Request, SlotId};
use crate::proposer::{self, PhaseOutcome, Quorum};
use crate::transport::{LeaderOutcome, Transport};

/// Acceptor state plus `lastSlot`, guarded by one lock per §5: slot validation
/// read-locks it, acceptor mutation and `lastSlot` advancement write-lock it.
///
/// `last_slot` counts slots decided so far (see `validate_slot`'s doc comment).
struct LeaderState {
    acceptor: AcceptorState,
    last_slot: SlotId,
}

/// Classification of an incoming `/leader/request` against this leader's `lastSlot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotValidation {
    Valid,
    FutureSlot { last_slot: SlotId },
    InvalidSlot,
}

/// Final result of a proposer round, mirroring spec §4.1's `(decision, chosen, error)`.
pub struct ProposeResult {
    pub chosen: Option<Decision>,
    /// Set when the decision broadcast to one or more replicas failed. The
    /// decision is chosen regardless — this is surfaced for logging, not retried.
    pub broadcast_error: Option<Error>,
}

pub struct Leader {
    /// This node's own stable network address.
    id: String,
    /// Every other leader in the cluster (the acceptor quorum).
    peers: Vec<String>,
    /// Every replica in the cluster, notified on a successful decision.
    replicas: Vec<String>,
    state: RwLock<LeaderState>,
    clock: Mutex<ids::MonotonicClock>,
    leader_id: ProposalId,
    quorum: Quorum,
    transport: Arc<dyn Transport>,
}

impl Leader {
    pub fn new(
        id: String,
        peers: Vec<String>,
        replicas: Vec<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let total_leaders = peers.len() + 1;
        let leader_id = ids::leader_id(&id);
        Leader {
            id,
            peers,
            replicas,
            state: RwLock::new(LeaderState { acceptor: AcceptorState::new(), last_slot: 0 }),
            clock: Mutex::new(ids::MonotonicClock::new()),
            leader_id,
            quorum: Quorum::ConfiguredMajority { total_leaders },
            transport,
        }
    }

    /// Overrides the default configured-majority quorum rule, e.g. to run the
    /// received-majority variant exercised by the seed test scenarios.
    pub fn with_quorum(mut self, quorum: Quorum) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn last_slot(&self) -> SlotId {
        self.state.read().last_slot
    }

    /// HandlePrepare: §4.2. Takes the write lock for the acceptor mutation.
    pub fn handle_prepare(&self, proposal: Proposal) -> Result<crate::model::Acceptance, Error> {
        let mut state = self.state.write();
        state.acceptor.handle_prepare(&proposal)
    }

    /// HandleAccept: §4.2. A successful accept advances `lastSlot`.
    pub fn handle_accept(&self, proposal: Proposal) -> Result<crate::model::Acceptance, Error> {
        let mut state = self.state.write();
        let acceptance = state.acceptor.handle_accept(&proposal)?;
        if acceptance.accepted {
            state.last_slot += 1;
        }
        Ok(acceptance)
    }

    /// Leader slot validator: §4.3.
    ///
    /// `last_slot` is tracked here as a *count* of slots this leader has seen
    /// decided — equivalently, the next slot it expects a request for — rather
    /// than the index of the highest decided slot. The literal `lastSlot + 1`
    /// formula in spec §4.3 assumes a virtual `lastSlot = -1` before any slot
    /// is decided, which a `SlotId = u64` can't represent; storing the
    /// already-incremented count sidesteps the sentinel without changing
    /// observable behavior (a fresh leader's first valid request is slot 0).
    fn validate_slot(&self, requested: SlotId) -> SlotValidation {
        let last_slot = self.state.read().last_slot;
        if requested > last_slot {
            SlotValidation::FutureSlot { last_slot }
        } else if requested < last_slot {
            SlotValidation::InvalidSlot
        } else {
            SlotValidation::Valid
        }
    }

    /// `/leader/request`: validates the slot, then runs a full proposer round if valid.
    pub async fn handle_request(&self, request: Request) -> Result<LeaderOutcome, Error> {
        match self.validate_slot(request.slot_id) {
            SlotValidation::FutureSlot { last_slot } => {
                return Ok(LeaderOutcome::FutureSlot(crate::model::ErrorRes {
                    requested_slot: request.slot_id,
                    last_slot,
                }));
            }
            SlotValidation::InvalidSlot => return Ok(LeaderOutcome::InvalidSlot),
            SlotValidation::Valid => {}
        }

        let result = self.propose(request).await?;
        Ok(match result.chosen {
            Some(decision) => LeaderOutcome::Decided(decision),
            None => LeaderOutcome::ProposalLost,
        })
    }

    /// Propose: §4.1. Runs the two-phase round against every other leader,
    /// then broadcasts the decision to every replica but the originator.
    pub async fn propose(&self, request: Request) -> Result<ProposeResult, Error> {
        let proposal_id = {
            let mut clock = self.clock.lock();
            ids::proposal_id(clock.tick(), self.leader_id)
        };

        let mut proposal = Proposal {
            proposal_id,
            slot_id: request.slot_id,
            value: request.value.clone(),
        };

        let prepare_responses = self.broadcast_prepare(&proposal).await;
        let outcome = proposer::tally_prepare(proposal_id, prepare_responses, self.quorum)?;

        let adopted_value = match outcome {
            PhaseOutcome::Aborted | PhaseOutcome::LostQuorum => {
                return Ok(ProposeResult { chosen: None, broadcast_error: None });
            }
            PhaseOutcome::Proceed { adopted_value } => adopted_value,
        };

        if let Some(adopted) = adopted_value {
            tracing::info!(
                slot_id = proposal.slot_id,
                adopted_proposal_id = adopted.id,
                "adopting previously-accepted value ahead of phase 2"
            );
            proposal.value = adopted.value;
        }

        let accept_responses = self.broadcast_accept(&proposal).await;
        let outcome = proposer::tally_accept(accept_responses, self.quorum)?;

        match outcome {
            PhaseOutcome::LostQuorum | PhaseOutcome::Aborted => {
                Ok(ProposeResult { chosen: None, broadcast_error: None })
            }
            PhaseOutcome::Proceed { .. } => {
                let decision = Decision { slot_id: proposal.slot_id, value: proposal.value };
                self.state.write().last_slot += 1;
                let broadcast_error = self.broadcast_decision(&request.replica_id, &decision).await;
                Ok(ProposeResult { chosen: Some(decision), broadcast_error })
            }
        }
    }

    async fn broadcast_prepare(
        &self,
        proposal: &Proposal,
    ) -> Vec<(String, Result<crate::model::Acceptance, Error>)> {
        let calls = self.peers.iter().map(|peer| {
            let transport = self.transport.clone();
            let proposal = proposal.clone();
            let peer = peer.clone();
            async move {
                let result = transport.prepare(&peer, proposal).await;
                (peer, result)
            }
        });
        futures::future::join_all(calls).await
    }

    async fn broadcast_accept(
        &self,
        proposal: &Proposal,
    ) -> Vec<(String, Result<crate::model::Acceptance, Error>)> {
        let calls = self.peers.iter().map(|peer| {
            let transport = self.transport.clone();
            let proposal = proposal.clone();
            let peer = peer.clone();
            async move {
                let result = transport.accept(&peer, proposal).await;
                (peer, result)
            }
        });
        futures::future::join_all(calls).await
    }

    /// Broadcast, §4.5: synchronous fan-out to every replica but the originator.
    /// Any single failure is surfaced to the caller but does not un-choose the decision.
    async fn broadcast_decision(&self, originator: &str, decision: &Decision) -> Option<Error> {
        let mut first_error = None;
        for replica in self.replicas.iter().filter(|r| r.as_str() != originator) {
            if let Err(error) = self.transport.decide(replica, decision.clone()).await {
                tracing::error!(%replica, %error, "decision broadcast failed");
                first_error.get_or_insert(error);
            }
        }
        first_error
    }
}
