use std::future::Future;
use std::sync::{Arc, Mutex};
use serde_json::Value;
use crate::document::{self, ID_FIELD, REV_FIELD};
use crate::error::{CResult, Error};
use crate::keylock::KeyLock;
use crate::revision;
use crate::storage::engine::Engine;

/// The document engine: local CAS operations over an `Engine`, a per-`_id`
/// transaction scope that holds the key lock across multiple steps, and the
/// remote-apply operations used by inbound replication.
///
/// Storage access is single-threaded by the `Engine` contract, so it is
/// guarded by a plain `std::sync::Mutex` with short, non-`await`-ing
/// critical sections; the `KeyLock` is the thing that is allowed to be
/// held across `.await` points (network fan-out included), since it is
/// what defines the rollback window in the write orchestration layer.
pub struct DocStore<E: Engine> {
    engine: Arc<Mutex<E>>,
    locks: KeyLock,
}

impl<E: Engine> DocStore<E> {
    pub fn new(engine: E) -> Self {
        Self { engine: Arc::new(Mutex::new(engine)), locks: KeyLock::new() }
    }

    /// Fetches the current stored document for `id`, deserialised.
    pub async fn get(&self, id: &str) -> CResult<Option<Value>> {
        let _guard = self.locks.acquire(id).await;
        self.read(id)
    }

    /// Creates or updates a document. If `input` carries no `_id` one is
    /// generated. CAS semantics: if a document exists under the (possibly
    /// generated) `_id`, `input._rev` must equal its current `_rev`; if none
    /// exists, `input._rev` must be absent.
    pub async fn put(&self, input: Value) -> CResult<Value> {
        let id = document::extract_id(&input).unwrap_or_else(document::new_id);
        let _guard = self.locks.acquire(&id).await;
        self.cas_put(&id, &input)
    }

    /// Idempotent delete: deleting an absent document is not an error.
    pub async fn del(&self, id: &str) -> CResult<()> {
        let _guard = self.locks.acquire(id).await;
        self.engine.lock().unwrap().delete(id.as_bytes())
    }

    /// Up to `limit` `_id`s in store order.
    pub async fn list_ids(&self, limit: usize) -> CResult<Vec<String>> {
        let keys = self.engine.lock().unwrap().keys(limit)?;
        keys.into_iter()
            .map(|k| String::from_utf8(k).map_err(|e| Error::Io(e.to_string())))
            .collect()
    }

    /// Acquires the key lock for `id`, invokes `body` with a transaction
    /// handle, and releases on every exit path -- including `body`
    /// returning an error, since the guard's drop is unconditional.
    pub async fn with_doc_transaction<'s, F, Fut, T>(&'s self, id: &'s str, body: F) -> CResult<T>
    where
        F: FnOnce(DocTransaction<'s, E>) -> Fut,
        Fut: Future<Output = CResult<T>> + 's,
    {
        let _guard = self.locks.acquire(id).await;
        let tx = DocTransaction { store: self, id };
        body(tx).await
    }

    /// Applies a peer's put under the `_id`'s lock, using the sender's
    /// revision verbatim -- no new `_rev` is allocated here.
    pub async fn apply_remote_put(&self, doc: Value, prev_rev: Option<&str>) -> CResult<()> {
        let id = document::extract_id(&doc)
            .ok_or_else(|| Error::InvalidPayload("remote doc missing _id".to_string()))?;
        if document::extract_rev(&doc).is_none() {
            return Err(Error::InvalidPayload("remote doc missing _rev".to_string()));
        }
        let _guard = self.locks.acquire(&id).await;
        self.check_prev_rev(&id, prev_rev)?;
        let forced = document::with_forced_id(&doc, &id)?;
        self.write(&id, &forced)
    }

    /// Applies a peer's delete under the `_id`'s lock. No-op if the document
    /// is already absent.
    pub async fn apply_remote_del(&self, id: &str, prev_rev: Option<&str>) -> CResult<()> {
        let _guard = self.locks.acquire(id).await;
        self.check_prev_rev(id, prev_rev)?;
        self.engine.lock().unwrap().delete(id.as_bytes())
    }

    fn read(&self, id: &str) -> CResult<Option<Value>> {
        let bytes = self.engine.lock().unwrap().get(id.as_bytes())?;
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, id: &str, doc: &Value) -> CResult<()> {
        let bytes = serde_json::to_vec(doc)?;
        self.engine.lock().unwrap().put(id.as_bytes(), bytes)
    }

    fn check_prev_rev(&self, id: &str, expected: Option<&str>) -> CResult<()> {
        let current = self.read(id)?;
        let current_rev = current.as_ref().and_then(document::extract_rev);
        if current_rev.as_deref() != expected {
            return Err(Error::Conflict(format!(
                "revision mismatch for {id}: expected {:?}, found {:?}",
                expected, current_rev
            )));
        }
        Ok(())
    }

    fn cas_put(&self, id: &str, input: &Value) -> CResult<Value> {
        let existing = self.read(id)?;
        let existing_rev = existing.as_ref().and_then(document::extract_rev);
        let input_rev = document::extract_rev(input);

        if existing_rev != input_rev {
            return Err(Error::Conflict("revision mismatch".to_string()));
        }

        let rev = revision::next_rev(existing_rev.as_deref());
        let merged = document::merge(existing.as_ref(), input, id, &rev)?;
        self.write(id, &merged)?;
        Ok(merged)
    }
}

/// A handle scoped to a single `with_doc_transaction` call. Every method
/// re-reads current stored state rather than a snapshot taken at open time,
/// since nothing else can observe or mutate `id` while the lock is held.
pub struct DocTransaction<'s, E: Engine> {
    store: &'s DocStore<E>,
    id: &'s str,
}

impl<'s, E: Engine> DocTransaction<'s, E> {
    pub fn get(&self) -> CResult<Option<Value>> {
        self.store.read(self.id)
    }

    /// Same CAS semantics as `DocStore::put`, but against the transaction's
    /// already-locked `_id` rather than one derived from `input`.
    pub fn put(&self, input: Value) -> CResult<Value> {
        self.store.cas_put(self.id, &input)
    }

    /// Deletes the document if `expected_prev_rev` matches the current
    /// `_rev` (both absent permitted); idempotent when the document is
    /// already gone.
    pub fn del(&self, expected_prev_rev: Option<&str>) -> CResult<()> {
        self.store.check_prev_rev(self.id, expected_prev_rev)?;
        self.store.engine.lock().unwrap().delete(self.id.as_bytes())
    }

    /// Restores `doc` verbatim without allocating a new `_rev` -- the
    /// rollback primitive. Verifies the current `_rev` still equals
    /// `expected_prev_rev` before writing, so a rollback never clobbers a
    /// write that happened after the one it is undoing.
    pub fn replace_exact(&self, doc: Value, expected_prev_rev: Option<&str>) -> CResult<()> {
        self.store.check_prev_rev(self.id, expected_prev_rev)?;
        let forced = document::with_forced_id(&doc, self.id)?;
        self.store.write(self.id, &forced)
    }
}

/// Ensures a document is well-formed before it leaves the engine: carries
/// both reserved fields. Used by callers assembling change records from a
/// `tx.put`/`tx.get` result, never by the CAS path itself (which always
/// forces both fields on write).
pub fn require_id_and_rev(doc: &Value) -> CResult<(String, String)> {
    let id = doc
        .as_object()
        .and_then(|o| o.get(ID_FIELD))
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidPayload("document missing _id".to_string()))?;
    let rev = doc
        .as_object()
        .and_then(|o| o.get(REV_FIELD))
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidPayload("document missing _rev".to_string()))?;
    Ok((id.to_string(), rev.to_string()))
}
