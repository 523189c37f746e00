//! Proposer, acceptor, and replica log-coherence core of a single-decree,
//! per-slot Paxos replicated log.
//!
//! This crate holds only the protocol: proposal id construction, the
//! promise/accept state machine, the leader slot validator, and replica
//! log reconciliation. It knows nothing about sockets, CLI flags, or
//! process lifecycle — those live in the `paxoslog-node` binary crate,
//! which implements the [`Transport`] trait over HTTP and wires a
//! [`Leader`] or [`Replica`] to a listener.

pub mod acceptor;
pub mod error;
pub mod ids;
pub mod leader;
pub mod model;
pub mod proposer;
pub mod replica;
pub mod transport;

pub use error::Error;
pub use leader::{Leader, ProposeResult};
pub use model::{Acceptance, Decision, ErrorRes, PreviousProposal, Proposal, ProposalId, Request, SlotId};
pub use proposer::Quorum;
pub use replica::Replica;
pub use transport::{LeaderOutcome, Transport};
