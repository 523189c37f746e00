//! End-to-end seed test scenarios (spec §8): a small in-memory cluster of
//! `Leader`s and `Replica`s wired together over a `Transport` that dispatches
//! directly to the right role's handler instead of binding a socket.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use paxoslog::{
    Acceptance, Decision, Error, Leader, LeaderOutcome, Proposal, Quorum, Replica, Request, Transport,
};

#[derive(Default)]
struct Router {
    leaders: RwLock<HashMap<String, Arc<Leader>>>,
    replicas: RwLock<HashMap<String, Arc<Replica>>>,
}

impl Router {
    fn new() -> Arc<Self> {
        Arc::new(Router::default())
    }

    fn add_leader(&self, leader: Arc<Leader>) {
        self.leaders.write().insert(leader.id().to_string(), leader);
    }

    fn add_replica(&self, replica: Arc<Replica>) {
        self.replicas.write().insert(replica.id().to_string(), replica);
    }

    fn leader(&self, id: &str) -> Arc<Leader> {
        self.leaders.read().get(id).cloned().expect("leader must be registered")
    }

    fn replica(&self, id: &str) -> Arc<Replica> {
        self.replicas.read().get(id).cloned().expect("replica must be registered")
    }
}

#[async_trait]
impl Transport for Router {
    async fn prepare(&self, leader: &str, proposal: Proposal) -> Result<Acceptance, Error> {
        self.leader(leader).handle_prepare(proposal)
    }

    async fn accept(&self, leader: &str, proposal: Proposal) -> Result<Acceptance, Error> {
        self.leader(leader).handle_accept(proposal)
    }

    async fn decide(&self, replica: &str, decision: Decision) -> Result<(), Error> {
        self.replica(replica).update(decision)
    }

    async fn forward(&self, leader: &str, request: Request) -> Result<LeaderOutcome, Error> {
        self.leader(leader).handle_request(request).await
    }
}

/// Wires up `num_leaders` leaders (each other's acceptor quorum) and
/// `num_replicas` replicas, all sharing one `Router`.
fn cluster(num_leaders: usize, num_replicas: usize) -> (Arc<Router>, Vec<String>, Vec<String>) {
    let router = Router::new();
    let leader_ids: Vec<String> = (0..num_leaders).map(|i| format!("leader-{i}")).collect();
    let replica_ids: Vec<String> = (0..num_replicas).map(|i| format!("replica-{i}")).collect();

    for id in &leader_ids {
        let peers = leader_ids.iter().filter(|peer| *peer != id).cloned().collect();
        let transport: Arc<dyn Transport> = Arc::clone(&router);
        let leader = Arc::new(Leader::new(id.clone(), peers, replica_ids.clone(), transport));
        router.add_leader(leader);
    }
    for id in &replica_ids {
        let transport: Arc<dyn Transport> = Arc::clone(&router);
        let replica = Arc::new(Replica::new(id.clone(), leader_ids.clone(), transport));
        router.add_replica(replica);
    }

    (router, leader_ids, replica_ids)
}

/// S1: 3 leaders, 2 replicas, all logs empty; client sends "A" to replica 0;
/// every replica's log ends up `["A"]`.
#[tokio::test]
async fn s1_first_request_propagates_to_every_replica() {
    let (router, _leaders, replicas) = cluster(3, 2);

    router.replica(&replicas[0]).handle_request("A".to_string()).await.unwrap();

    for id in &replicas {
        assert_eq!(router.replica(id).log(), vec!["A".to_string()]);
    }
}

/// S2: continuing from S1, client sends "B" to replica 1 (not the originator
/// of "A"); every replica converges on `["A", "B"]`. Replica 1's own log was
/// already `["A"]` via the S1 broadcast, so it computes slot_id = 1 for "B"
/// without any retargeting.
#[tokio::test]
async fn s2_second_request_from_a_different_replica_appends_at_the_next_slot() {
    let (router, _leaders, replicas) = cluster(3, 2);

    router.replica(&replicas[0]).handle_request("A".to_string()).await.unwrap();
    router.replica(&replicas[1]).handle_request("B".to_string()).await.unwrap();

    for id in &replicas {
        assert_eq!(router.replica(id).log(), vec!["A".to_string(), "B".to_string()]);
    }
}

/// S3 (adapted numbering — see DESIGN.md): a replica that believes a later
/// slot is open than a particular leader has recorded gets told to retarget
/// via a future-slot response, retries at the leader's reported slot, and
/// succeeds.
///
/// Spec §8's S3 row describes a replica *behind* a leader receiving a
/// future-slot reply, which contradicts §4.3's own `requested > last_slot`
/// condition (a lower request can never be "future"). This test instead
/// drives the condition §4.3 actually defines: a replica believes slot 1 is
/// next (it already holds a decision for slot 0 that this leader never saw,
/// e.g. because a different leader's broadcast reached it but not this one's
/// acceptor), submits slot_id = 1 to a leader whose last_slot is still 0, and
/// is told to retry at slot 0 — which is exactly the slot this leader is
/// waiting for.
#[tokio::test]
async fn s3_future_slot_retargets_a_replica_that_is_ahead_of_one_leader() {
    let (router, leaders, replicas) = cluster(3, 2);

    // replica 0 already knows about a decision this leader never accepted.
    router.replica(&replicas[0]).update(Decision { slot_id: 0, value: "A".to_string() }).unwrap();
    assert_eq!(router.replica(&replicas[0]).log(), vec!["A".to_string()]);

    let leader = router.leader(&leaders[0]);
    assert_eq!(leader.last_slot(), 0);

    let request = Request { replica_id: replicas[0].clone(), slot_id: 1, value: "C".to_string() };
    let outcome = leader.handle_request(request).await.unwrap();
    let error_res = match outcome {
        LeaderOutcome::FutureSlot(error_res) => error_res,
        other => panic!("expected FutureSlot, got {other:?}"),
    };
    assert_eq!(error_res.last_slot, 0);

    // Retry at the reported slot succeeds and reaches every replica.
    let retry = Request { replica_id: replicas[0].clone(), slot_id: error_res.last_slot, value: "C".to_string() };
    match leader.handle_request(retry).await.unwrap() {
        LeaderOutcome::Decided(decision) => router.replica(&replicas[0]).update(decision).unwrap(),
        other => panic!("expected Decided, got {other:?}"),
    }

    for id in &replicas {
        assert_eq!(router.replica(id).log(), vec!["A".to_string(), "C".to_string()]);
    }
}

/// Boundary behavior (§8): a replica with no configured leaders fails
/// immediately rather than hanging or panicking.
#[tokio::test]
async fn handle_request_with_no_leaders_configured_fails_immediately() {
    let router = Router::new();
    let transport: Arc<dyn Transport> = Arc::clone(&router);
    let replica = Replica::new("solo".to_string(), Vec::new(), transport);

    let result = replica.handle_request("A".to_string()).await;
    assert!(matches!(result, Err(Error::NoLeadersConfigured)));
}

/// A value proposed while a competing leader holds a higher promise on the
/// same slot loses its round without erroring — the caller is expected to
/// retry with a fresh slot (spec §7: "lost round ... is not an error").
#[tokio::test]
async fn a_losing_proposer_reports_proposal_lost_not_an_error() {
    let (router, leaders, _replicas) = cluster(3, 1);

    // Directly inject a high promise into every acceptor's quorum via a prepare,
    // simulating a competing proposer that already has a commanding lead.
    for peer in &leaders[1..] {
        router
            .leader(peer)
            .handle_prepare(Proposal { proposal_id: u64::MAX, slot_id: 0, value: "rival".to_string() })
            .unwrap();
    }

    let request = Request { replica_id: "replica-0".to_string(), slot_id: 0, value: "A".to_string() };
    let outcome = router.leader(&leaders[0]).handle_request(request).await.unwrap();
    assert_eq!(outcome, LeaderOutcome::ProposalLost);
}

/// `Leader::with_quorum` actually changes a real `Leader`'s behavior, not just
/// the standalone tally helpers: a lone leader (no peers) reaches agreement
/// under the default `ConfiguredMajority` rule (its own implicit vote already
/// forms a majority of one), but the same leader built with the literal
/// `ReceivedMajority` rule never does, since zero received responses can
/// never outnumber zero rejections.
#[tokio::test]
async fn with_quorum_overrides_a_lone_leaders_agreement_outcome() {
    // Neither leader has any peers, so the `Router` transport is never
    // actually dispatched to — only the leader's own implicit vote matters.
    let transport: Arc<dyn Transport> = Router::new();
    let configured = Leader::new("leader-0".to_string(), Vec::new(), Vec::new(), transport);
    let request = Request { replica_id: "r0".to_string(), slot_id: 0, value: "A".to_string() };
    let outcome = configured.handle_request(request).await.unwrap();
    assert!(matches!(outcome, LeaderOutcome::Decided(_)));

    let transport: Arc<dyn Transport> = Router::new();
    let received = Leader::new("leader-1".to_string(), Vec::new(), Vec::new(), transport)
        .with_quorum(Quorum::ReceivedMajority);
    let request = Request { replica_id: "r0".to_string(), slot_id: 0, value: "A".to_string() };
    let outcome = received.handle_request(request).await.unwrap();
    assert_eq!(outcome, LeaderOutcome::ProposalLost);
}
