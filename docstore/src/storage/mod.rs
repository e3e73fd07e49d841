pub mod engine;
pub mod log;
pub mod log_cask;
pub mod memory;

use serde_derive::{Deserialize, Serialize};
use crate::error::CResult;
use crate::storage::engine::Engine;
use crate::storage::log_cask::LogCask;
use crate::storage::memory::Memory;

/// An in-memory index from key to its on-log position and length, kept in
/// key order so key listings and prefix lookups stay cheap without touching
/// the log itself.
pub type KeyDir = std::collections::BTreeMap<Vec<u8>, (u64, u32)>;

/// Status of the underlying storage engine, surfaced for diagnostics only;
/// the document engine never branches on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// The name of the storage engine.
    pub name: String,

    /// The number of live keys in the engine.
    pub keys: u64,

    /// The logical size of live key/value pairs.
    pub size: u64,

    /// The on-disk size of all data, live and garbage.
    pub total_disk_size: u64,

    /// The on-disk size of live data.
    pub live_disk_size: u64,

    /// The on-disk size of garbage data.
    pub garbage_disk_size: u64,
}

/// The concrete engine a running server picks between at startup: an
/// in-memory store for `:memory:` data directories (tests, ephemeral
/// nodes) or the durable log-structured engine otherwise. `DocStore` is
/// generic over `Engine`, so this is the one concrete type the binary
/// crate needs, rather than threading a type parameter through its CLI.
pub enum AnyEngine {
    Memory(Memory),
    LogCask(LogCask),
}

impl std::fmt::Display for AnyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyEngine::Memory(e) => e.fmt(f),
            AnyEngine::LogCask(e) => e.fmt(f),
        }
    }
}

impl Engine for AnyEngine {
    fn get(&mut self, key: &[u8]) -> CResult<Option<Vec<u8>>> {
        match self {
            AnyEngine::Memory(e) => e.get(key),
            AnyEngine::LogCask(e) => e.get(key),
        }
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> CResult<()> {
        match self {
            AnyEngine::Memory(e) => e.put(key, value),
            AnyEngine::LogCask(e) => e.put(key, value),
        }
    }

    fn delete(&mut self, key: &[u8]) -> CResult<()> {
        match self {
            AnyEngine::Memory(e) => e.delete(key),
            AnyEngine::LogCask(e) => e.delete(key),
        }
    }

    fn keys(&mut self, limit: usize) -> CResult<Vec<Vec<u8>>> {
        match self {
            AnyEngine::Memory(e) => e.keys(limit),
            AnyEngine::LogCask(e) => e.keys(limit),
        }
    }

    fn flush(&mut self) -> CResult<()> {
        match self {
            AnyEngine::Memory(e) => e.flush(),
            AnyEngine::LogCask(e) => e.flush(),
        }
    }

    fn status(&mut self) -> CResult<Status> {
        match self {
            AnyEngine::Memory(e) => e.status(),
            AnyEngine::LogCask(e) => e.status(),
        }
    }
}
