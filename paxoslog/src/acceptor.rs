//! # Summary
//!
//! This module implements the acceptor half of a leader: the promise/accept
//! state machine that backs a single slot at a time. `AcceptorState` holds
//! no lock of its own — the leader wraps it in a `parking_lot::RwLock` and
//! is responsible for taking the write lock across a full prepare or accept
//! call, per §5's ordering guarantees.

use crate::error::Error;
use crate::model::{Acceptance, PreviousProposal, Proposal, ProposalId, SlotId};

/// A `(proposal_id, slot_id, value)` triple recorded by an acceptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub proposal_id: ProposalId,
    pub slot_id: SlotId,
    pub value: String,
}

/// Per-acceptor promise/accept memory for the slot currently in play.
///
/// `None` stands in for the sentinel "proposal_id = 0 / slot never set" of spec §3;
/// the invariants are the same either way: `accepted.slot_id <= promised.slot_id`
/// whenever both are set, and `accepted` only ever moves forward.
#[derive(Debug, Default, Clone)]
pub struct AcceptorState {
    promised: Option<Record>,
    accepted: Option<Record>,
}

impl AcceptorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> Option<&Record> {
        self.accepted.as_ref()
    }

    /// HandlePrepare: §4.2.
    pub fn handle_prepare(&mut self, proposal: &Proposal) -> Result<Acceptance, Error> {
        if let Some(accepted) = &self.accepted {
            if accepted.slot_id > proposal.slot_id {
                return Err(Error::StaleProposal {
                    slot_id: proposal.slot_id,
                    accepted_slot: accepted.slot_id,
                });
            }
        }

        let mut prev_promise = None;
        match &self.promised {
            Some(promised) if promised.slot_id == proposal.slot_id => {
                if promised.proposal_id >= proposal.proposal_id {
                    prev_promise = Some(PreviousProposal {
                        id: promised.proposal_id,
                        value: promised.value.clone(),
                    });
                } else {
                    self.promised = Some(record_from(proposal));
                }
            }
            _ => self.promised = Some(record_from(proposal)),
        }

        let prev_accept = self.accepted.as_ref().and_then(|accepted| {
            (accepted.slot_id == proposal.slot_id).then(|| PreviousProposal {
                id: accepted.proposal_id,
                value: accepted.value.clone(),
            })
        });

        Ok(Acceptance {
            proposal_id: proposal.proposal_id,
            prev_promise,
            prev_accept,
            accepted: false,
        })
    }

    /// HandleAccept: §4.2. Returns whether the proposal was accepted so the
    /// caller can decide whether to advance `lastSlot`.
    pub fn handle_accept(&mut self, proposal: &Proposal) -> Result<Acceptance, Error> {
        if let Some(accepted) = &self.accepted {
            if accepted.slot_id > proposal.slot_id {
                return Err(Error::StaleProposal {
                    slot_id: proposal.slot_id,
                    accepted_slot: accepted.slot_id,
                });
            }
        }

        let outranked_by_promise = matches!(
            &self.promised,
            Some(promised)
                if promised.slot_id == proposal.slot_id && promised.proposal_id > proposal.proposal_id
        );
        let already_chosen = matches!(
            &self.accepted,
            Some(accepted) if accepted.slot_id == proposal.slot_id
        );

        if outranked_by_promise || already_chosen {
            return Ok(Acceptance {
                proposal_id: proposal.proposal_id,
                prev_promise: None,
                prev_accept: None,
                accepted: false,
            });
        }

        self.accepted = Some(record_from(proposal));
        Ok(Acceptance {
            proposal_id: proposal.proposal_id,
            prev_promise: None,
            prev_accept: None,
            accepted: true,
        })
    }
}

fn record_from(proposal: &Proposal) -> Record {
    Record {
        proposal_id: proposal.proposal_id,
        slot_id: proposal.slot_id,
        value: proposal.value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(id: ProposalId, slot: SlotId, value: &str) -> Proposal {
        Proposal { proposal_id: id, slot_id: slot, value: value.to_string() }
    }

    #[test]
    fn prepare_on_idle_acceptor_returns_no_prior_state() {
        let mut acceptor = AcceptorState::new();
        let acceptance = acceptor.handle_prepare(&proposal(100, 0, "A")).unwrap();
        assert_eq!(acceptance.proposal_id, 100);
        assert!(acceptance.prev_promise.is_none());
        assert!(acceptance.prev_accept.is_none());
    }

    /// S4: acceptor has promised(id=100, slot=0); prepare with id=99 returns
    /// prev_promise.id=100 (not an overwrite).
    #[test]
    fn prepare_with_equal_or_lower_id_returns_prev_promise_and_does_not_overwrite() {
        let mut acceptor = AcceptorState::new();
        acceptor.handle_prepare(&proposal(100, 0, "A")).unwrap();

        let acceptance = acceptor.handle_prepare(&proposal(99, 0, "B")).unwrap();
        assert_eq!(acceptance.prev_promise.as_ref().unwrap().id, 100);
        assert_eq!(acceptance.prev_promise.as_ref().unwrap().value, "A");

        // Promise is unchanged: a later prepare with id=100 still sees it as prev_promise.
        let acceptance = acceptor.handle_prepare(&proposal(100, 0, "C")).unwrap();
        assert_eq!(acceptance.prev_promise.as_ref().unwrap().id, 100);
    }

    #[test]
    fn prepare_with_higher_id_overwrites_promise() {
        let mut acceptor = AcceptorState::new();
        acceptor.handle_prepare(&proposal(100, 0, "A")).unwrap();
        let acceptance = acceptor.handle_prepare(&proposal(200, 0, "B")).unwrap();
        assert!(acceptance.prev_promise.is_none());
    }

    /// S5: acceptor has accepted(id=50, slot=0, val="X"); prepare with id=200 surfaces prev_accept.
    #[test]
    fn prepare_surfaces_prior_acceptance_for_same_slot() {
        let mut acceptor = AcceptorState::new();
        acceptor.handle_accept(&proposal(50, 0, "X")).unwrap();

        let acceptance = acceptor.handle_prepare(&proposal(200, 0, "Y")).unwrap();
        assert_eq!(acceptance.prev_accept.as_ref().unwrap().id, 50);
        assert_eq!(acceptance.prev_accept.as_ref().unwrap().value, "X");
    }

    #[test]
    fn prepare_on_earlier_slot_than_accepted_is_stale() {
        let mut acceptor = AcceptorState::new();
        acceptor.handle_accept(&proposal(50, 5, "X")).unwrap();
        let result = acceptor.handle_prepare(&proposal(999, 3, "Y"));
        assert!(matches!(result, Err(Error::StaleProposal { .. })));
    }

    #[test]
    fn accept_succeeds_when_no_higher_promise_and_not_already_accepted() {
        let mut acceptor = AcceptorState::new();
        acceptor.handle_prepare(&proposal(100, 0, "A")).unwrap();
        let acceptance = acceptor.handle_accept(&proposal(100, 0, "A")).unwrap();
        assert!(acceptance.accepted);
        assert_eq!(acceptor.accepted().unwrap().value, "A");
    }

    #[test]
    fn accept_rejected_when_promise_outranks_it() {
        let mut acceptor = AcceptorState::new();
        acceptor.handle_prepare(&proposal(200, 0, "A")).unwrap();
        let acceptance = acceptor.handle_accept(&proposal(100, 0, "B")).unwrap();
        assert!(!acceptance.accepted);
    }

    #[test]
    fn accept_rejected_when_slot_already_chosen() {
        let mut acceptor = AcceptorState::new();
        acceptor.handle_accept(&proposal(100, 0, "A")).unwrap();
        let acceptance = acceptor.handle_accept(&proposal(200, 0, "B")).unwrap();
        assert!(!acceptance.accepted);
        assert_eq!(acceptor.accepted().unwrap().value, "A");
    }

    #[test]
    fn accept_on_earlier_slot_than_accepted_is_stale() {
        let mut acceptor = AcceptorState::new();
        acceptor.handle_accept(&proposal(100, 5, "A")).unwrap();
        let result = acceptor.handle_accept(&proposal(999, 3, "B"));
        assert!(matches!(result, Err(Error::StaleProposal { .. })));
    }

    /// Acceptor monotonicity (§8 invariant 3): accepted.id is strictly increasing
    /// within one slot once a later accept wins over an earlier one.
    #[test]
    fn accepted_id_strictly_increases_within_a_slot() {
        let mut acceptor = AcceptorState::new();
        acceptor.handle_accept(&proposal(100, 0, "A")).unwrap();
        acceptor.handle_prepare(&proposal(200, 0, "B")).unwrap();
        // A later proposal number must be used to re-accept; overwriting requires
        // the promise to not outrank it, which it doesn't here.
        let acceptance = acceptor.handle_accept(&proposal(200, 0, "B")).unwrap();
        assert!(acceptance.accepted);
        assert_eq!(acceptor.accepted().unwrap().proposal_id, 200);
    }
}
