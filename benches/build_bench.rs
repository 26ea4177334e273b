/// Benchmarks for building call trees from flat stats.
///
/// Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use statstree::domain::stats::{CallerStats, StatsEntry, StatsMap};
use statstree::{build_call_tree, RootPolicy};

/// A `main` fanning out into `width` layers of `depth` functions, each layer
/// called by every function in the previous one.
fn layered_stats(width: usize, depth: usize) -> StatsMap {
    let mut stats = StatsMap::new();
    stats.insert("main.py,1,main".to_string(), StatsEntry::new(1, 1, 0.0, 100.0));

    for layer in 0..depth {
        for col in 0..width {
            let mut entry = StatsEntry::new(1, 1, 0.01, (depth - layer) as f64);
            if layer == 0 {
                entry = entry.with_caller("main.py,1,main", CallerStats::Timed(1, 1, 0.01, 0.01));
            } else {
                for prev in 0..width {
                    entry = entry.with_caller(
                        format!("mod{}.py,{},f", layer - 1, prev),
                        CallerStats::Timed(1, 1, 0.01, 0.01),
                    );
                }
            }
            stats.insert(format!("mod{}.py,{},f", layer, col), entry);
        }
    }

    stats
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_call_tree");

    for &(width, depth) in &[(10, 10), (50, 20), (200, 10)] {
        let stats = layered_stats(width, depth);
        let edges = width + width * width * (depth - 1);
        group.throughput(Throughput::Elements(edges as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, depth)),
            &stats,
            |b, stats| b.iter(|| build_call_tree(black_box(stats), RootPolicy::MaxCumulative)),
        );
    }

    group.finish();
}

fn bench_json_load(c: &mut Criterion) {
    let json = serde_json::to_string(&to_json(&layered_stats(50, 20))).unwrap_or_default();

    c.bench_function("parse_stats_json_50x20", |b| {
        b.iter(|| serde_json::from_str::<StatsMap>(black_box(&json)).unwrap())
    });
}

fn to_json(stats: &StatsMap) -> serde_json::Value {
    let map = stats
        .iter()
        .map(|(k, e)| {
            let callers: serde_json::Map<String, serde_json::Value> = e
                .callers
                .keys()
                .map(|c| (c.clone(), serde_json::json!([1, 1, 0.01, 0.01])))
                .collect();
            (
                k.clone(),
                serde_json::json!([e.calls, e.recursive, e.local, e.cumulative, callers]),
            )
        })
        .collect::<serde_json::Map<_, _>>();
    serde_json::Value::Object(map)
}

criterion_group!(benches, bench_build, bench_json_load);
criterion_main!(benches);
