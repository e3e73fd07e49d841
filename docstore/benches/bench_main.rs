use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docstore::docengine::DocStore;
use docstore::storage::memory::Memory;
use serde_json::json;
use tokio::runtime::Runtime;

fn put_then_get(rt: &Runtime, store: &DocStore<Memory>) {
    rt.block_on(async {
        let doc = store.put(json!({"title": "rtest", "n": 1})).await.unwrap();
        let id = doc["_id"].as_str().unwrap().to_string();
        black_box(store.get(&id).await.unwrap());
    });
}

fn criterion_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("put_then_get single id", |b| {
        let store = DocStore::new(Memory::new());
        b.iter(|| put_then_get(&rt, &store));
    });

    c.bench_function("put 1000 distinct ids", |b| {
        b.iter(|| {
            let store = DocStore::new(Memory::new());
            rt.block_on(async {
                for i in 0..1000 {
                    store.put(json!({"_id": format!("id-{i}"), "n": i})).await.unwrap();
                }
            });
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
