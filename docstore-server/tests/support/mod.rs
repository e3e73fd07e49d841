use std::net::TcpListener;
use std::process::Child;
use std::time::Duration;
use assert_cmd::prelude::*;
use tempfile::TempDir;

/// A running `docstore-server` process bound to an ephemeral port, backed by
/// a scratch data directory that is removed when the harness drops. The
/// server is `spawn`ed rather than `assert`ed, then polled on `/health`
/// until it accepts connections.
pub struct Harness {
    child: Child,
    _data_dir: TempDir,
    _log_dir: TempDir,
    pub base_url: String,
    pub token: String,
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

impl Harness {
    /// Starts a node with no peers configured.
    pub async fn start() -> Self {
        Self::start_with_peers(&[]).await
    }

    /// Starts a node peered with the given base URLs.
    pub async fn start_with_peers(peers: &[&str]) -> Self {
        let data_dir = tempfile::tempdir().unwrap();
        let log_dir = tempfile::tempdir().unwrap();
        let config_dir = tempfile::tempdir().unwrap();
        let port = free_port();
        let token = "test-token".to_string();

        let peers_yaml =
            format!("[{}]", peers.iter().map(|p| format!("\"{p}\"")).collect::<Vec<_>>().join(", "));
        let config = format!(
            "peers: {peers_yaml}\ntokens: [\"{token}\"]\noutbound_token: \"{token}\"\ndata_dir: \"{}\"\nport: {port}\npeer_timeout_ms: 1000\n",
            data_dir.path().display(),
        );
        let config_path = config_dir.path().join("docstore.yaml");
        std::fs::write(&config_path, config).unwrap();

        let child = std::process::Command::cargo_bin("docstore-server")
            .unwrap()
            .arg("--config")
            .arg(&config_path)
            .arg("--log-dir")
            .arg(log_dir.path())
            .arg("--log-level")
            .arg("warn")
            .spawn()
            .unwrap();

        let base_url = format!("http://127.0.0.1:{port}");
        let harness = Harness { child, _data_dir: data_dir, _log_dir: log_dir, base_url, token };
        harness.wait_ready().await;
        // config_dir's file has already been read by the server at startup
        drop(config_dir);
        harness
    }

    async fn wait_ready(&self) {
        let client = reqwest::Client::new();
        for _ in 0..100 {
            if client.get(format!("{}/health", self.base_url)).send().await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("server at {} did not become ready", self.base_url);
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }

    pub fn auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.token)
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
