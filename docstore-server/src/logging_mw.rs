use std::time::Instant;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Logs one line per request: method, path, status, latency. Mirrors the
/// per-peer fan-out logging in `replication::ReplicationClient`, so both
/// halves of a write (local HTTP handling, outbound replication) leave a
/// line in the same dispatcher.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();
    if path == "/health" {
        log::debug!("{method} {path} -> {status} ({elapsed:?})");
    } else if status.is_server_error() {
        log::error!("{method} {path} -> {status} ({elapsed:?})");
    } else {
        log::info!("{method} {path} -> {status} ({elapsed:?})");
    }
    response
}
