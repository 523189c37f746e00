//! # Summary
//!
//! CLI argument parsing for the node launcher. Grounded in the original
//! prototype's positional launcher (`./run <role> <host:port> <leaders>
//! <replicas>`), rendered as a `clap` derive parser — `clap`'s derive API is
//! the maintained successor to the teacher's `structopt`, which is in
//! maintenance mode.

use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Role {
    Leader,
    Replica,
}

/// Which quorum rule a leader's proposer uses, per spec §9's open question.
/// `ConfiguredMajority` (the SHOULD-adopt fix) is the default; `ReceivedMajority`
/// is kept as an explicit opt-in for compatibility with the literal design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum QuorumPolicy {
    #[default]
    Configured,
    Received,
}

/// `./paxoslog-node --role leader --addr localhost:2022 --leaders
/// localhost:2023,localhost:2024 --replicas localhost:2025,localhost:2026`
#[derive(Parser, Debug)]
#[command(name = "paxoslog-node", about = "A single-decree Paxos replicated log node.")]
pub struct Opt {
    /// Whether this process hosts a Leader (and its internal Acceptor) or a Replica.
    #[arg(long, value_enum)]
    pub role: Role,

    /// This node's own bind address, e.g. `127.0.0.1:2022`.
    #[arg(long)]
    pub addr: String,

    /// Every *other* leader in the cluster (a leader's acceptor quorum; a
    /// replica's forwarding target list, tried in order).
    #[arg(long, value_delimiter = ',')]
    pub leaders: Vec<String>,

    /// Every replica in the cluster. Ignored by `--role replica`; a leader
    /// broadcasts decisions to every entry here except the originating replica.
    #[arg(long, value_delimiter = ',')]
    pub replicas: Vec<String>,

    /// Timeout in seconds for leader-to-leader prepare/accept calls.
    #[arg(long, default_value_t = 5)]
    pub leader_timeout_secs: u64,

    /// Timeout in seconds for replica-to-leader and leader-to-replica calls.
    #[arg(long, default_value_t = 5)]
    pub replica_timeout_secs: u64,

    /// Which quorum rule a leader's proposer uses. Ignored by `--role replica`.
    #[arg(long, value_enum, default_value_t = QuorumPolicy::Configured)]
    pub quorum: QuorumPolicy,

    /// Fixed delay in milliseconds before a replica retries a lost proposal
    /// with a fresh slot. Zero (the default) retries immediately. Ignored by
    /// `--role leader`.
    #[arg(long, default_value_t = 0)]
    pub retry_backoff_millis: u64,

    /// Logging verbosity: unset is warnings only, `-v` is info, `-vv` is debug,
    /// `-vvv` or more is trace.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
