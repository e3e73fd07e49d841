use std::path::PathBuf;
use anyhow::Context;
use serde_derive::{Deserialize, Serialize};

const DEFAULT_DATA_DIR: &str = "storage/docstore";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PEER_TIMEOUT_MS: u64 = 3000;

/// Server configuration: the collaborator interface the document engine and
/// write-orchestration layer consume. Loaded from a YAML file with
/// environment-variable overrides for the token fields, so bearer tokens
/// need not be committed alongside the rest of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URLs of peers to push writes to, e.g. `http://peer-b:8080`.
    #[serde(default)]
    pub peers: Vec<String>,

    /// Bearer tokens accepted on inbound requests.
    #[serde(default)]
    pub tokens: Vec<String>,

    /// The single token this node presents when pushing to peers. Resolves
    /// the "tokens as a set, outbound as first" ambiguity by requiring an
    /// explicit choice rather than picking one out of `tokens` implicitly.
    pub outbound_token: String,

    /// Directory the log-structured KV engine persists to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-peer replication request timeout, in milliseconds.
    #[serde(default = "default_peer_timeout_ms")]
    pub peer_timeout_ms: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_peer_timeout_ms() -> u64 {
    DEFAULT_PEER_TIMEOUT_MS
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            peers: Vec::new(),
            tokens: Vec::new(),
            outbound_token: String::new(),
            data_dir: default_data_dir(),
            port: default_port(),
            peer_timeout_ms: default_peer_timeout_ms(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from `path` (YAML), then applies the
    /// `DOCSTORE_TOKENS` (comma-separated) and `DOCSTORE_OUTBOUND_TOKEN`
    /// environment overrides on top of it.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()
            .with_context(|| format!("failed to read config file at {path}"))?;

        let mut cfg: ServerConfig = builder
            .try_deserialize()
            .with_context(|| format!("failed to parse config file at {path}"))?;

        if let Ok(tokens) = std::env::var("DOCSTORE_TOKENS") {
            cfg.tokens = tokens.split(',').map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
        }
        if let Ok(outbound) = std::env::var("DOCSTORE_OUTBOUND_TOKEN") {
            cfg.outbound_token = outbound;
        }

        if cfg.tokens.is_empty() {
            anyhow::bail!("no bearer tokens configured: set `tokens` in {path} or DOCSTORE_TOKENS");
        }
        if cfg.outbound_token.is_empty() {
            anyhow::bail!("no outbound token configured: set `outbound_token` in {path} or DOCSTORE_OUTBOUND_TOKEN");
        }

        Ok(cfg)
    }
}
