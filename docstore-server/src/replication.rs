use std::time::Duration;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// A put or del change record, as exchanged between peers and persisted
/// nowhere -- it only ever exists in flight.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ChangeRecord {
    Put {
        #[serde(rename = "_id")]
        id: String,
        #[serde(rename = "prevRev", skip_serializing_if = "Option::is_none")]
        prev_rev: Option<String>,
        rev: String,
        doc: Value,
    },
    Del {
        #[serde(rename = "_id")]
        id: String,
        #[serde(rename = "prevRev", skip_serializing_if = "Option::is_none")]
        prev_rev: Option<String>,
    },
}

/// How a single peer responded to a pushed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerOutcome {
    Ack,
    Conflict,
    Failure,
}

/// The replication client: fans a change record out to every configured
/// peer concurrently, with an independent timeout per peer so one slow or
/// unreachable peer never delays another's classification.
pub struct ReplicationClient {
    client: Client,
    outbound_token: String,
}

/// Disjoint-by-construction classification of a fan-out's peer responses.
pub struct FanOutResult {
    pub acks: Vec<String>,
    pub conflicts: Vec<String>,
    pub failures: Vec<String>,
}

impl FanOutResult {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

impl ReplicationClient {
    pub fn new(outbound_token: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, outbound_token })
    }

    /// Pushes `change` to every peer in `peers`, waiting for all arms to
    /// settle (no early return on first conflict) before returning the
    /// classified result.
    pub async fn push_to_peers(&self, peers: &[String], change: &ChangeRecord) -> FanOutResult {
        let arms = peers.iter().map(|peer| self.push_one(peer, change));
        let outcomes = join_all(arms).await;

        let mut result = FanOutResult { acks: Vec::new(), conflicts: Vec::new(), failures: Vec::new() };
        for (peer, outcome) in peers.iter().zip(outcomes) {
            match outcome {
                PeerOutcome::Ack => result.acks.push(peer.clone()),
                PeerOutcome::Conflict => result.conflicts.push(peer.clone()),
                PeerOutcome::Failure => result.failures.push(peer.clone()),
            }
            log::info!("replication arm to {peer}: {:?}", peer_outcome_label(&result, peer));
        }
        result
    }

    async fn push_one(&self, peer: &str, change: &ChangeRecord) -> PeerOutcome {
        let url = format!("{}/replicate", peer.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.outbound_token)
            .json(change)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status() == StatusCode::OK => PeerOutcome::Ack,
            Ok(resp) if resp.status() == StatusCode::CONFLICT => PeerOutcome::Conflict,
            Ok(resp) => {
                log::warn!("peer {peer} returned unexpected status {}", resp.status());
                PeerOutcome::Failure
            }
            Err(err) if err.is_timeout() => {
                log::warn!("peer {peer} timed out");
                PeerOutcome::Failure
            }
            Err(err) => {
                log::warn!("peer {peer} unreachable: {err}");
                PeerOutcome::Failure
            }
        }
    }
}

fn peer_outcome_label(result: &FanOutResult, peer: &str) -> &'static str {
    if result.acks.iter().any(|p| p == peer) {
        "ack"
    } else if result.conflicts.iter().any(|p| p == peer) {
        "conflict"
    } else {
        "failure"
    }
}
