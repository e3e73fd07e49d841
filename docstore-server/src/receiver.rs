use docstore::docengine::DocStore;
use docstore::document;
use docstore::error::{CResult, Error};
use docstore::storage::AnyEngine;
use crate::replication::ChangeRecord;

/// The inbound replication endpoint: validates a change record's shape
/// before it ever reaches the document engine, then delegates to the
/// remote-apply operations on the document store. Validation failures
/// never touch the lock table; only well-formed records do.
pub async fn apply(store: &DocStore<AnyEngine>, change: ChangeRecord) -> CResult<()> {
    match change {
        ChangeRecord::Put { id, prev_rev, rev, doc } => {
            if id.is_empty() {
                return Err(Error::InvalidPayload("_id must not be empty".to_string()));
            }
            let doc_id = document::extract_id(&doc);
            let doc_rev = document::extract_rev(&doc);
            if doc_id.as_deref() != Some(id.as_str()) {
                return Err(Error::InvalidPayload("doc._id must equal _id".to_string()));
            }
            if doc_rev.as_deref() != Some(rev.as_str()) {
                return Err(Error::InvalidPayload("doc._rev must equal rev".to_string()));
            }
            store.apply_remote_put(doc, prev_rev.as_deref()).await
        }
        ChangeRecord::Del { id, prev_rev } => {
            if id.is_empty() {
                return Err(Error::InvalidPayload("_id must not be empty".to_string()));
            }
            store.apply_remote_del(&id, prev_rev.as_deref()).await
        }
    }
}
