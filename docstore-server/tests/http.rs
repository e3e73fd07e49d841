//! End-to-end HTTP tests against real spawned `docstore-server` processes:
//! happy-path create+replicate, CAS conflict, replication rollback, delete
//! propagation, and tolerated peer unreachability.

mod support;

use serde_json::{json, Value};
use support::Harness;

#[tokio::test]
async fn health_requires_no_token() {
    let node = Harness::start().await;
    let resp = node.client().get(format!("{}/health", node.base_url)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"status": "ok"}));
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let node = Harness::start().await;
    let resp = node.client().get(format!("{}/api/docs", node.base_url)).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn happy_create_and_read_back() {
    let node = Harness::start().await;
    let create = node
        .auth(node.client().post(format!("{}/api/docs", node.base_url)).json(&json!({"title": "rtest"})))
        .send()
        .await
        .unwrap();
    assert_eq!(create.status(), 201);
    let created: Value = create.json().await.unwrap();
    assert_eq!(created["title"], json!("rtest"));
    let id = created["_id"].as_str().unwrap();
    let rev = created["_rev"].as_str().unwrap();

    let fetched: Value = node
        .auth(node.client().get(format!("{}/api/docs/{id}", node.base_url)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["_id"], created["_id"]);
    assert_eq!(fetched["_rev"], json!(rev));
}

#[tokio::test]
async fn cas_conflict_leaves_store_unchanged() {
    let node = Harness::start().await;
    let created: Value = node
        .auth(node.client().post(format!("{}/api/docs", node.base_url)).json(&json!({"v": 1})))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["_id"].as_str().unwrap().to_string();

    let conflict = node
        .auth(
            node.client()
                .post(format!("{}/api/docs", node.base_url))
                .json(&json!({"_id": id, "_rev": "0-bad", "v": 2})),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(conflict.status(), 409);

    let unchanged: Value = node
        .auth(node.client().get(format!("{}/api/docs/{id}", node.base_url)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn get_of_missing_doc_is_404() {
    let node = Harness::start().await;
    let resp =
        node.auth(node.client().get(format!("{}/api/docs/missing", node.base_url))).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn list_docs_returns_created_ids() {
    let node = Harness::start().await;
    for i in 0..3 {
        node.auth(
            node.client().post(format!("{}/api/docs", node.base_url)).json(&json!({"_id": format!("id-{i}")})),
        )
        .send()
        .await
        .unwrap();
    }

    let ids: Value =
        node.auth(node.client().get(format!("{}/api/docs", node.base_url))).send().await.unwrap().json().await.unwrap();
    let ids = ids["ids"].as_array().unwrap();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn create_replicates_to_peer_before_responding() {
    let b = Harness::start().await;
    let a = Harness::start_with_peers(&[&b.base_url]).await;

    let created: Value = a
        .auth(a.client().post(format!("{}/api/docs", a.base_url)).json(&json!({"title": "rtest"})))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["_id"].as_str().unwrap();

    let on_b: Value =
        b.auth(b.client().get(format!("{}/api/docs/{id}", b.base_url))).send().await.unwrap().json().await.unwrap();
    assert_eq!(on_b, created);
}

#[tokio::test]
async fn delete_propagates_to_peer() {
    let b = Harness::start().await;
    let a = Harness::start_with_peers(&[&b.base_url]).await;

    let created: Value = a
        .auth(a.client().post(format!("{}/api/docs", a.base_url)).json(&json!({"title": "gone soon"})))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["_id"].as_str().unwrap();

    let del = a.auth(a.client().delete(format!("{}/api/docs/{id}", a.base_url))).send().await.unwrap();
    assert_eq!(del.status(), 204);

    let on_b = b.auth(b.client().get(format!("{}/api/docs/{id}", b.base_url))).send().await.unwrap();
    assert_eq!(on_b.status(), 404);
}

#[tokio::test]
async fn unreachable_peer_is_tolerated_not_retried() {
    let a = Harness::start_with_peers(&["http://127.0.0.1:1"]).await;

    let resp =
        a.auth(a.client().post(format!("{}/api/docs", a.base_url)).json(&json!({"title": "rtest"}))).send().await.unwrap();
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn replicate_rejects_mismatched_doc_id() {
    let node = Harness::start().await;
    let resp = node
        .auth(node.client().post(format!("{}/replicate", node.base_url)).json(&json!({
            "op": "put",
            "_id": "x",
            "rev": "1-aaaaaaaa",
            "doc": {"_id": "y", "_rev": "1-aaaaaaaa"}
        })))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn replicate_conflicting_prev_rev_is_409() {
    let node = Harness::start().await;
    let change = json!({
        "op": "put",
        "_id": "x",
        "rev": "1-aaaaaaaa",
        "doc": {"_id": "x", "_rev": "1-aaaaaaaa", "v": 1}
    });
    let first = node
        .auth(node.client().post(format!("{}/replicate", node.base_url)).json(&change))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);

    let second = node
        .auth(node.client().post(format!("{}/replicate", node.base_url)).json(&change))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);
}

#[tokio::test]
async fn concurrent_creates_same_id_yield_one_success_one_conflict() {
    let node = std::sync::Arc::new(Harness::start().await);
    let base: Value = node
        .auth(node.client().post(format!("{}/api/docs", node.base_url)).json(&json!({"_id": "race", "v": 0})))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rev = base["_rev"].as_str().unwrap().to_string();

    let mut handles = Vec::new();
    for v in 0..2 {
        let node = node.clone();
        let rev = rev.clone();
        handles.push(tokio::spawn(async move {
            node.auth(
                node.client()
                    .post(format!("{}/api/docs", node.base_url))
                    .json(&json!({"_id": "race", "_rev": rev, "v": v})),
            )
            .send()
            .await
            .unwrap()
            .status()
        }));
    }

    let mut statuses = Vec::new();
    for h in handles {
        statuses.push(h.await.unwrap().as_u16());
    }
    statuses.sort();
    assert_eq!(statuses, vec![201, 409]);
}
