use serde_json::Value;
use docstore::document::{self, ID_FIELD};
use docstore::docengine::{self, DocStore};
use docstore::error::{CResult, Error};
use docstore::storage::AnyEngine;
use crate::replication::ChangeRecord;
use crate::state::AppState;

/// The user-facing create/update path: local CAS, synchronous push to every
/// peer, and a same-lock rollback if any peer reports a conflict.
/// `LOCAL_APPLIED -> PUSHED -> COMMITTED` on the happy path,
/// `PUSHED -> ROLLING_BACK -> ROLLED_BACK` when a peer rejects the write.
pub async fn create_or_update(state: &AppState, mut input: Value) -> CResult<Value> {
    let desired_id = document::extract_id(&input).unwrap_or_else(document::new_id);
    if let Some(obj) = input.as_object_mut() {
        obj.insert(ID_FIELD.to_string(), Value::String(desired_id.clone()));
    }

    let store: &DocStore<AnyEngine> = &state.store;
    store
        .with_doc_transaction(&desired_id, |tx| async move {
            let prev = tx.get()?;
            let saved = tx.put(input)?;

            let (id, rev) = docengine::require_id_and_rev(&saved)?;
            let prev_rev = prev.as_ref().and_then(document::extract_rev);

            let change = ChangeRecord::Put {
                id: id.clone(),
                prev_rev: prev_rev.clone(),
                rev: rev.clone(),
                doc: saved.clone(),
            };
            let result = state.replication.push_to_peers(&state.peers, &change).await;

            if result.has_conflicts() {
                match &prev {
                    Some(prev_doc) => tx.replace_exact(prev_doc.clone(), Some(&rev))?,
                    None => tx.del(Some(&rev))?,
                }
                return Err(Error::Conflict(format!(
                    "replication conflict: rejected by {}",
                    result.conflicts.join(", ")
                )));
            }

            Ok(saved)
        })
        .await
}

/// The user-facing delete path: analogous to `create_or_update`, but the
/// local step is an idempotent delete and the change record carries no
/// `doc`. A delete of an already-absent document still pushes (so peers
/// that lag behind catch up) and always succeeds locally.
pub async fn delete(state: &AppState, id: &str) -> CResult<()> {
    let store: &DocStore<AnyEngine> = &state.store;
    store
        .with_doc_transaction(id, |tx| async move {
            let prev = tx.get()?;
            let prev_rev = prev.as_ref().and_then(document::extract_rev);
            tx.del(prev_rev.as_deref())?;

            let change = ChangeRecord::Del { id: id.to_string(), prev_rev: prev_rev.clone() };
            let result = state.replication.push_to_peers(&state.peers, &change).await;

            if result.has_conflicts() {
                if let Some(prev_doc) = prev {
                    tx.replace_exact(prev_doc, None)?;
                }
                return Err(Error::Conflict(format!(
                    "replication conflict: rejected by {}",
                    result.conflicts.join(", ")
                )));
            }

            Ok(())
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstore::docengine::DocStore;
    use docstore::storage::memory::Memory;
    use serde_json::json;

    fn state() -> AppState {
        let store = DocStore::new(AnyEngine::Memory(Memory::new()));
        let replication =
            crate::replication::ReplicationClient::new("out".to_string(), std::time::Duration::from_millis(100))
                .unwrap();
        AppState { store, replication, peers: Vec::new(), tokens: Default::default() }
    }

    #[tokio::test]
    async fn create_with_no_peers_commits_locally() {
        let s = state();
        let doc = create_or_update(&s, json!({"title": "rtest"})).await.unwrap();
        let id = doc[ID_FIELD].as_str().unwrap();
        assert_eq!(s.store.get(id).await.unwrap().unwrap()["title"], json!("rtest"));
    }

    #[tokio::test]
    async fn create_with_unreachable_peer_still_commits() {
        let mut s = state();
        s.peers = vec!["http://127.0.0.1:1".to_string()];
        let doc = create_or_update(&s, json!({"title": "rtest"})).await.unwrap();
        assert_eq!(doc["title"], json!("rtest"));
    }

    #[tokio::test]
    async fn cas_conflict_never_pushes() {
        let s = state();
        let err = create_or_update(&s, json!({"_id": "x", "_rev": "1-aaaaaaaa"})).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn delete_of_absent_doc_is_a_no_op_success() {
        let s = state();
        delete(&s, "missing").await.unwrap();
    }
}
