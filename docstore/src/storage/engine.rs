use crate::error::CResult;
use crate::storage::Status;

/// A byte-key/byte-value storage engine, holding keys in lexicographical
/// order. Writes are durable before `put`/`delete` return.
///
/// Only supports single-threaded use -- all methods take `&mut self`.
/// Concurrent access is serialised one level up, by the per-document lock
/// table (`crate::keylock`), never inside the engine itself.
pub trait Engine: std::fmt::Display + Send + Sync {
    /// Gets a value for a key, if it exists. A missing key is `Ok(None)`,
    /// never an error -- callers distinguish "not found" from I/O failure
    /// by matching on the `Option`, not on `Err`.
    fn get(&mut self, key: &[u8]) -> CResult<Option<Vec<u8>>>;

    /// Sets a value for a key, replacing the existing value if any.
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> CResult<()>;

    /// Deletes a key. Idempotent: deleting an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> CResult<()>;

    /// Returns up to `limit` keys in ascending key order.
    fn keys(&mut self, limit: usize) -> CResult<Vec<Vec<u8>>>;

    /// Flushes any buffered data to the underlying storage medium.
    fn flush(&mut self) -> CResult<()>;

    /// Returns engine status.
    fn status(&mut self) -> CResult<Status>;
}
