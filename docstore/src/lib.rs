//! `docstore` is a replicated JSON document store: a per-document
//! compare-and-swap engine over an append-only log-structured key-value
//! store, with the per-key locking and revision allocation its write path
//! needs. The HTTP surface, replication client/receiver wiring and CLI
//! entrypoint live in the `docstore-server` binary crate; this crate is the
//! storage and document engine consumed by it.
//!
//! ## Getting started
//!
//! ```rust
//! use docstore::docengine::DocStore;
//! use docstore::storage::memory::Memory;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = DocStore::new(Memory::new());
//! let doc = store.put(json!({"title": "hello"})).await.unwrap();
//! assert_eq!(doc["title"], json!("hello"));
//! # }
//! ```

pub mod docengine;
pub mod document;
pub mod error;
pub mod keylock;
pub mod revision;
pub mod storage;
