use std::collections::HashSet;
use docstore::docengine::DocStore;
use docstore::storage::AnyEngine;
use crate::config::ServerConfig;
use crate::replication::ReplicationClient;

/// Shared application state handed to every axum handler: the document
/// engine, the replication client used for outbound fan-out, and the
/// pieces of configuration the request path needs directly (peers, the
/// accepted inbound token set).
pub struct AppState {
    pub store: DocStore<AnyEngine>,
    pub replication: ReplicationClient,
    pub peers: Vec<String>,
    pub tokens: HashSet<String>,
}

impl AppState {
    pub fn new(store: DocStore<AnyEngine>, config: &ServerConfig) -> anyhow::Result<Self> {
        let replication = ReplicationClient::new(
            config.outbound_token.clone(),
            std::time::Duration::from_millis(config.peer_timeout_ms),
        )?;
        Ok(Self {
            store,
            replication,
            peers: config.peers.clone(),
            tokens: config.tokens.iter().cloned().collect(),
        })
    }
}
