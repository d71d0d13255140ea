//! Update cost for mostly-unchanged snapshots
//!
//! Run with `cargo bench --bench engine`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use snapdiff::{DiffEngine, TreeBuilder};

fn snapshot(sections: usize, tweak: i64) -> Value {
    let mut root = serde_json::Map::new();
    for i in 0..sections {
        root.insert(
            format!("section{}", i),
            json!({
                "enabled": true,
                "limits": [i, i * 2, i * 3],
                "labels": {"owner": "ops", "tier": i % 3},
                "secret": {"type": "encrypted", "data": format!("blob-{}", i)}
            }),
        );
    }
    root.insert("revision".to_string(), json!(tweak));
    Value::Object(root)
}

fn bench_build(c: &mut Criterion) {
    let builder = TreeBuilder::default();
    let mut group = c.benchmark_group("build");
    for sections in [10, 100, 1000] {
        let value = snapshot(sections, 0);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &value, |b, v| {
            b.iter(|| builder.build(black_box(v)).unwrap())
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_one_leaf");
    for sections in [10, 100, 1000] {
        let a = snapshot(sections, 0);
        let b = snapshot(sections, 1);
        let mut engine = DiffEngine::default();
        engine.initialize(&a).unwrap();

        let mut flip = false;
        group.bench_function(BenchmarkId::from_parameter(sections), |bench| {
            bench.iter(|| {
                flip = !flip;
                let next = if flip { &b } else { &a };
                engine.update(black_box(next)).unwrap().digest()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_update);
criterion_main!(benches);
