//! # Summary
//!
//! Implements `paxoslog::Transport` over HTTP with `reqwest`, the idiomatic
//! analogue of the original prototype's `http.Client` (`original_source/roles/leader.go`'s
//! `sendPrepare`). A single `HttpTransport` is shared (via `Arc`) by a node's
//! `Leader` or `Replica` for every outbound call; `reqwest::Client` is
//! internally connection-pooled, so there is no per-call socket setup cost.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use paxoslog::{Acceptance, Decision, Error, ErrorRes, LeaderOutcome, Proposal, Request, Transport};

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client configuration is valid");
        HttpTransport { client }
    }

    async fn post_json<Req: Serialize + ?Sized, Res: DeserializeOwned>(
        &self,
        peer: &str,
        path: &str,
        body: &Req,
    ) -> Result<Res, Error> {
        let url = format!("http://{peer}{path}");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|error| Error::PeerUnreachable { peer: peer.to_string(), message: error.to_string() })?;

        if !response.status().is_success() {
            return Err(Error::PeerUnreachable {
                peer: peer.to_string(),
                message: format!("unexpected status {}", response.status()),
            });
        }

        response
            .json::<Res>()
            .await
            .map_err(|error| Error::MalformedResponse { peer: peer.to_string(), message: error.to_string() })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn prepare(&self, leader: &str, proposal: Proposal) -> Result<Acceptance, Error> {
        self.post_json(leader, "/leader/prepare", &proposal).await
    }

    async fn accept(&self, leader: &str, proposal: Proposal) -> Result<Acceptance, Error> {
        self.post_json(leader, "/leader/accept", &proposal).await
    }

    async fn decide(&self, replica: &str, decision: Decision) -> Result<(), Error> {
        let url = format!("http://{replica}/replica/update");
        let response = self
            .client
            .post(&url)
            .json(&decision)
            .send()
            .await
            .map_err(|error| Error::PeerUnreachable { peer: replica.to_string(), message: error.to_string() })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::PeerUnreachable {
                peer: replica.to_string(),
                message: format!("unexpected status {}", response.status()),
            })
        }
    }

    async fn forward(&self, leader: &str, request: Request) -> Result<LeaderOutcome, Error> {
        let url = format!("http://{leader}/leader/request");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|error| Error::PeerUnreachable { peer: leader.to_string(), message: error.to_string() })?;

        match response.status().as_u16() {
            200 => {
                let decision: Decision = response
                    .json()
                    .await
                    .map_err(|error| Error::MalformedResponse { peer: leader.to_string(), message: error.to_string() })?;
                Ok(LeaderOutcome::Decided(decision))
            }
            425 => {
                let error_res: ErrorRes = response
                    .json()
                    .await
                    .map_err(|error| Error::MalformedResponse { peer: leader.to_string(), message: error.to_string() })?;
                Ok(LeaderOutcome::FutureSlot(error_res))
            }
            400 => Ok(LeaderOutcome::InvalidSlot),
            406 => Ok(LeaderOutcome::ProposalLost),
            other => Err(Error::MalformedResponse {
                peer: leader.to_string(),
                message: format!("unexpected status {other}"),
            }),
        }
    }
}
