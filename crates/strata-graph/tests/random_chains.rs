use std::collections::BTreeMap;

use proptest::prelude::*;
use strata_core::{Edge, LegId};
use strata_graph::LevelGraph;

fn leg(raw: u32) -> LegId {
    LegId::from_raw(raw)
}

/// A chain of `n` genus one vertices on `n` descending levels, one edge per
/// passage and one marking per vertex, with arbitrary pole orders.
fn chain(n: usize, orders: &[i64]) -> LevelGraph {
    let mut genera = Vec::new();
    let mut legs: Vec<Vec<LegId>> = Vec::new();
    let mut edges = Vec::new();
    let mut levels = Vec::new();
    let mut pole_orders = BTreeMap::new();
    let mut next_order = {
        let mut idx = 0usize;
        let orders = orders.to_vec();
        move || {
            let order = orders[idx % orders.len()];
            idx += 1;
            order
        }
    };
    for i in 0..n {
        let base = 10 * i as u32;
        let mut vertex_legs = vec![leg(base + 1)];
        pole_orders.insert(leg(base + 1), next_order());
        if i > 0 {
            vertex_legs.push(leg(base + 2));
            pole_orders.insert(leg(base + 2), next_order());
            edges.push(Edge(leg(base - 10 + 3), leg(base + 2)));
        }
        if i < n - 1 {
            vertex_legs.push(leg(base + 3));
            pole_orders.insert(leg(base + 3), next_order());
        }
        genera.push(1);
        legs.push(vertex_legs);
        levels.push(-(i as i64));
    }
    LevelGraph::new(genera, legs, edges, pole_orders, levels, 1).unwrap()
}

fn chain_strategy() -> impl Strategy<Value = LevelGraph> {
    (2usize..6, proptest::collection::vec(-5i64..5, 4..12))
        .prop_map(|(n, orders)| chain(n, &orders))
}

proptest! {
    #[test]
    fn vertical_squish_always_drops_one_level(g in chain_strategy()) {
        let top = g.internal_level_number(0).unwrap();
        let outcome = g.squish_vertical(top).unwrap();
        prop_assert!(outcome.changed);
        prop_assert_eq!(outcome.graph.number_of_levels(), g.number_of_levels() - 1);
    }

    #[test]
    fn delta_always_yields_two_levels(g in chain_strategy()) {
        let outcome = g.delta(1).unwrap();
        prop_assert_eq!(outcome.graph.number_of_levels(), 2);
        prop_assert!(!outcome.graph.has_horizontal_edge());
    }

    #[test]
    fn relabel_round_trips(g in chain_strategy()) {
        let forward: BTreeMap<LegId, LegId> = g
            .leg_list()
            .iter()
            .map(|l| (*l, leg(l.as_raw() + 100)))
            .collect();
        let backward: BTreeMap<LegId, LegId> =
            forward.iter().map(|(from, to)| (*to, *from)).collect();
        let there = g.relabel(&forward).unwrap();
        let back = there.relabel(&backward).unwrap();
        prop_assert_eq!(back, g);
    }

    #[test]
    fn json_round_trips(g in chain_strategy()) {
        let json = serde_json::to_string(&g).unwrap();
        let back: LevelGraph = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, g);
    }

    #[test]
    fn admissibility_report_agrees_with_the_predicates(g in chain_strategy()) {
        let report = g.check_admissible();
        prop_assert_eq!(report.is_admissible(), g.is_admissible());
        if report.is_admissible() {
            prop_assert!(g.is_stable());
            prop_assert!(g.check_orders().is_empty());
            prop_assert!(g.check_edge_orders().is_empty());
        }
    }
}
