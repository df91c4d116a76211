use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata_core::{Edge, LegId, StratumPoint};
use strata_graph::LevelGraph;
use strata_iso::isomorphisms;

fn leg(raw: u32) -> LegId {
    LegId::from_raw(raw)
}

/// A two-level graph with `n` parallel edges between a high genus top
/// vertex and a genus zero bottom vertex, plus two pinned markings.
fn parallel_edges(n: u32) -> (LevelGraph, BTreeMap<LegId, StratumPoint>) {
    let top_legs: Vec<LegId> = (1..=n).map(leg).collect();
    let mut bot_legs: Vec<LegId> = (n + 1..=2 * n).map(leg).collect();
    let mark_a = leg(2 * n + 1);
    let mark_b = leg(2 * n + 2);
    bot_legs.push(mark_a);
    bot_legs.push(mark_b);
    let edges: Vec<Edge> = (0..n as usize)
        .map(|i| Edge(top_legs[i], bot_legs[i]))
        .collect();
    let mut pole_orders: BTreeMap<LegId, i64> = BTreeMap::new();
    for &l in &top_legs {
        pole_orders.insert(l, 2);
    }
    for &l in &bot_legs[..n as usize] {
        pole_orders.insert(l, -4);
    }
    pole_orders.insert(mark_a, 4 * i64::from(n) - 3);
    pole_orders.insert(mark_b, 1);
    let graph = LevelGraph::new(
        vec![n + 1, 0],
        vec![top_legs, bot_legs],
        edges,
        pole_orders,
        vec![0, -1],
        1,
    )
    .unwrap();
    let dmp = [
        (mark_a, StratumPoint::new(0, 0)),
        (mark_b, StratumPoint::new(0, 1)),
    ]
    .into_iter()
    .collect();
    (graph, dmp)
}

fn automorphisms_bench(c: &mut Criterion) {
    let (graph, dmp) = parallel_edges(6);

    c.bench_function("first_automorphism", |b| {
        b.iter(|| {
            black_box(isomorphisms(&graph, &dmp, &graph, &dmp).next());
        });
    });

    c.bench_function("all_automorphisms", |b| {
        b.iter(|| {
            black_box(isomorphisms(&graph, &dmp, &graph, &dmp).count());
        });
    });
}

criterion_group!(benches, automorphisms_bench);
criterion_main!(benches);
