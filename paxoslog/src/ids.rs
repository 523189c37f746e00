//! # Summary
//!
//! This module builds the two identifiers the protocol core relies on to
//! order proposals across leaders without any shared clock: a leader's
//! stable numeric id (derived from its network address) and the
//! proposal id a proposer stamps on each new round.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// Upper bound on leader ids, per spec: leader id is a stable hash of the
/// leader's address reduced modulo this bound.
const LEADER_ID_BOUND: u64 = 1000;

/// Reduces a leader's network address to a small, stable, collision-resistant id.
///
/// Two leaders racing in the same wall-clock second tie-break on this id, so it
/// must be deterministic across calls (unlike `std`'s randomly-seeded `HashMap`).
pub fn leader_id(address: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    address.hash(&mut hasher);
    hasher.finish() % LEADER_ID_BOUND
}

/// A monotonically non-decreasing source of wall-clock seconds.
///
/// `SystemTime` is not guaranteed monotonic (NTP can step it backward); proposal ids
/// derived from a regressing clock could collide with or undercut an earlier proposal
/// from the same leader. This clamps each reading to be no earlier than the last one
/// observed.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: u64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current second-since-epoch, never smaller than a previous reading.
    pub fn tick(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.last = self.last.max(now);
        self.last
    }
}

/// Builds a proposal id by concatenating the decimal digits of `seconds` and
/// `leader_id`, then parsing the concatenation back as an integer, exactly as
/// spec.md §3 describes. This keeps the id totally ordered by `(seconds, leader_id)`
/// without a second comparison key: a higher second always outranks a lower one
/// regardless of leader id, and within the same second, a higher leader id wins.
///
/// `leader_id` is zero-padded to the width of `LEADER_ID_BOUND` before
/// concatenating — without padding, `(100, 999)` and `(101, 0)` would stringify
/// to `"100999"` and `"1010"`, and the latter would compare as numerically
/// smaller despite belonging to a later second.
pub fn proposal_id(seconds: u64, leader_id: u64) -> u64 {
    format!("{seconds}{leader_id:03}")
        .parse()
        .expect("decimal concatenation of two u64s always parses as u64")
}
