//! # Summary
//!
//! This module implements the proposer's phase tally: given the responses
//! collected from a prepare or accept broadcast, decide whether the round
//! should abort (a competing proposal is provably newer), continue with a
//! substituted value (classical Paxos's "adopt the highest prior accept"
//! rule, per spec §9's correctness fix), or proceed with the proposer's
//! own value.
//!
//! Kept free of `Transport` and locking so the tally rules are exercised
//! directly in unit tests, independent of any I/O.

use crate::error::Error;
use crate::model::{Acceptance, PreviousProposal, ProposalId};

/// How a proposer decides it has a quorum.
///
/// Per spec §9's open question on quorum semantics: the literal design counts a
/// strict majority of *received* responses, conflating reachability with agreement.
/// `ConfiguredMajority` is the SHOULD-adopt fix — `floor(N/2)+1` of the configured
/// acceptor set (`N` total leaders, including the proposer itself, which always
/// implicitly counts toward its own quorum).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quorum {
    ReceivedMajority,
    ConfiguredMajority { total_leaders: usize },
}

impl Quorum {
    fn met(&self, accepted: usize, rejected: usize) -> bool {
        match self {
            Quorum::ReceivedMajority => accepted > rejected,
            Quorum::ConfiguredMajority { total_leaders } => {
                let required = total_leaders / 2 + 1;
                // The proposer's own implicit vote counts toward the threshold.
                accepted + 1 >= required
            }
        }
    }
}

/// Outcome of tallying one phase's responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Quorum reached; round may proceed. Carries the highest-id `prev_accept`
    /// observed in a phase-1 quorum, if any, for the classical-Paxos value swap.
    Proceed { adopted_value: Option<PreviousProposal> },
    /// Quorum not reached; the caller should report `chosen = false`, not an error.
    LostQuorum,
    /// A peer reported an equal-or-higher id already promised or accepted;
    /// this proposal is provably stale.
    Aborted,
}

/// Tallies the responses from one phase (prepare or accept) against `proposal_id`.
///
/// `responses` pairs each contacted peer's address with the `Transport` result of
/// calling it; an `Err` is logged and omitted from the tally rather than aborting
/// the round, per §4.1's failure semantics. Returns `Err` only when every peer was
/// unreachable and at least one peer was contacted — a transport-to-all-peers
/// failure, per spec §7.
pub fn tally_prepare(
    proposal_id: ProposalId,
    responses: Vec<(String, Result<Acceptance, Error>)>,
    quorum: Quorum,
) -> Result<PhaseOutcome, Error> {
    let contacted = responses.len();
    let mut received = 0usize;
    let mut accepted = 0usize;
    let mut rejected = 0usize;
    let mut adopted_value: Option<PreviousProposal> = None;

    for (peer, result) in responses {
        let acceptance = match result {
            Ok(acceptance) => {
                received += 1;
                acceptance
            }
            Err(error) => {
                tracing::warn!(%peer, %error, "prepare: peer omitted from tally");
                continue;
            }
        };

        if let Some(prev_accept) = &acceptance.prev_accept {
            if prev_accept.id >= proposal_id {
                return Ok(PhaseOutcome::Aborted);
            }
            rejected += 1;
            if adopted_value.as_ref().map_or(true, |best| prev_accept.id > best.id) {
                adopted_value = Some(prev_accept.clone());
            }
        } else if let Some(prev_promise) = &acceptance.prev_promise {
            if prev_promise.id >= proposal_id {
                return Ok(PhaseOutcome::Aborted);
            }
            rejected += 1;
        } else {
            accepted += 1;
        }
    }

    if contacted > 0 && received == 0 {
        return Err(Error::TransportFailure { operation: "prepare" });
    }

    if quorum.met(accepted, rejected) {
        Ok(PhaseOutcome::Proceed { adopted_value })
    } else {
        Ok(PhaseOutcome::LostQuorum)
    }
}

/// Tallies accept-phase responses. Unlike prepare, an accept response carries no
/// `prev_promise`/`prev_accept` — only `accepted: bool` — so there is no stale-id
/// abort here, only a quorum count.
pub fn tally_accept(
    responses: Vec<(String, Result<Acceptance, Error>)>,
    quorum: Quorum,
) -> Result<PhaseOutcome, Error> {
    let contacted = responses.len();
    let mut received = 0usize;
    let mut accepted = 0usize;
    let mut rejected = 0usize;

    for (peer, result) in responses {
        match result {
            Ok(acceptance) => {
                received += 1;
                if acceptance.accepted {
                    accepted += 1;
                } else {
                    rejected += 1;
                }
            }
            Err(error) => {
                tracing::warn!(%peer, %error, "accept: peer omitted from tally");
            }
        }
    }

    if contacted > 0 && received == 0 {
        return Err(Error::TransportFailure { operation: "accept" });
    }

    if quorum.met(accepted, rejected) {
        Ok(PhaseOutcome::Proceed { adopted_value: None })
    } else {
        Ok(PhaseOutcome::LostQuorum)
    }
}
