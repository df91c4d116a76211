use std::collections::BTreeMap;

use strata_core::{Edge, LegId};
use strata_graph::{LevelGraph, SquishWarning};

fn leg(raw: u32) -> LegId {
    LegId::from_raw(raw)
}

fn lg(
    genera: &[u32],
    legs: &[&[u32]],
    edges: &[(u32, u32)],
    orders: &[i64],
    levels: &[i64],
    k: u32,
) -> LevelGraph {
    LevelGraph::from_order_list(
        genera.to_vec(),
        legs.iter()
            .map(|vertex_legs| vertex_legs.iter().map(|&l| leg(l)).collect())
            .collect(),
        edges.iter().map(|&(a, b)| Edge(leg(a), leg(b))).collect(),
        orders.to_vec(),
        levels.to_vec(),
        k,
    )
    .unwrap()
}

#[test]
fn horizontal_squish_merges_two_vertices() {
    let g = lg(
        &[1, 1],
        &[&[1, 2], &[3, 4]],
        &[(2, 3)],
        &[1, -1, -1, 1],
        &[0, 0],
        1,
    );
    let outcome = g.squish_horizontal(Edge(leg(2), leg(3))).unwrap();
    assert!(outcome.changed);
    assert!(outcome.warning.is_none());
    let expected = lg(&[2], &[&[1, 4]], &[], &[1, 1], &[0], 1);
    assert_eq!(outcome.graph, expected);
}

#[test]
fn horizontal_squish_of_a_loop_raises_genus() {
    let g = lg(&[1], &[&[1, 2, 3]], &[(1, 2)], &[-1, -1, 2], &[0], 1);
    let outcome = g.squish_horizontal(Edge(leg(1), leg(2))).unwrap();
    let result = &outcome.graph;
    assert_eq!(result.genera(), &[2]);
    assert_eq!(result.leg_list(), &[leg(3)]);
    assert_eq!(result.num_vertices(), g.num_vertices());
}

#[test]
fn horizontal_squish_drops_codim_by_one() {
    let g = lg(
        &[1, 1],
        &[&[1, 2], &[3, 4]],
        &[(2, 3)],
        &[1, -1, -1, 1],
        &[0, 0],
        1,
    );
    let outcome = g.squish_horizontal(Edge(leg(2), leg(3))).unwrap();
    assert_eq!(outcome.graph.codim(), g.codim() - 1);
    assert_eq!(outcome.graph.num_vertices(), g.num_vertices() - 1);
}

#[test]
fn horizontal_squish_warns_on_vertical_edge() {
    let g = lg(
        &[1, 1],
        &[&[1], &[2]],
        &[(1, 2)],
        &[0, -2],
        &[0, -1],
        1,
    );
    let outcome = g.squish_horizontal(Edge(leg(1), leg(2))).unwrap();
    assert!(!outcome.changed);
    assert_eq!(
        outcome.warning,
        Some(SquishWarning::NotHorizontal(Edge(leg(1), leg(2))))
    );
    assert_eq!(outcome.graph, g);
}

#[test]
fn horizontal_squish_errors_on_unknown_edge() {
    let g = lg(&[1], &[&[1, 2, 3]], &[(1, 2)], &[-1, -1, 2], &[0], 1);
    assert!(g.squish_horizontal(Edge(leg(1), leg(3))).is_err());
}

#[test]
fn vertical_squish_contracts_the_level_passage() {
    let g = lg(
        &[1, 2],
        &[&[1], &[2, 3, 4]],
        &[(1, 2)],
        &[0, -2, 1, 3],
        &[0, -1],
        1,
    );
    let outcome = g.squish_vertical(0).unwrap();
    assert!(outcome.changed);
    let mut orders = BTreeMap::new();
    orders.insert(leg(3), 1);
    orders.insert(leg(4), 3);
    let expected =
        LevelGraph::new(vec![3], vec![vec![leg(3), leg(4)]], vec![], orders, vec![0], 1).unwrap();
    assert_eq!(outcome.graph, expected);
}

#[test]
fn vertical_squish_drops_one_level() {
    let g = lg(
        &[0, 0, 0],
        &[&[1, 2], &[3, 4], &[5, 6]],
        &[(1, 3), (4, 5)],
        &[0, 1, -2, 0, -2, 1],
        &[0, -1, -2],
        1,
    );
    let outcome = g.squish_vertical(-1).unwrap();
    assert_eq!(outcome.graph.number_of_levels(), g.number_of_levels() - 1);
    // legs away from the passage keep their identities
    assert!(outcome.graph.leg_list().contains(&leg(1)));
    assert!(outcome.graph.leg_list().contains(&leg(3)));
}

#[test]
fn vertical_squish_with_two_edges_creates_a_cycle() {
    let g = lg(
        &[1, 0],
        &[&[1, 2], &[3, 4, 5, 6]],
        &[(1, 5), (2, 6)],
        &[0, 0, 1, 1, -2, -2],
        &[0, -1],
        1,
    );
    let outcome = g.squish_vertical(0).unwrap();
    // two contracted edges between two vertices: one cycle, genus 1 + 0 + 1
    assert_eq!(outcome.graph.genera(), &[2]);
    assert_eq!(outcome.graph.g(), g.g());
    assert_eq!(outcome.graph.number_of_levels(), 1);
}

#[test]
fn vertical_squish_below_the_bottom_warns() {
    let g = lg(
        &[1, 1],
        &[&[1], &[2]],
        &[(1, 2)],
        &[0, -2],
        &[0, -1],
        1,
    );
    let outcome = g.squish_vertical(-1).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.warning, Some(SquishWarning::NoLowerLevel(-1)));
    assert_eq!(outcome.graph, g);
}

#[test]
fn delta_keeps_exactly_one_passage() {
    let g = lg(
        &[0, 0, 0],
        &[&[1, 2], &[3, 4], &[5, 6]],
        &[(1, 3), (4, 5)],
        &[0, 1, -2, 0, -2, 1],
        &[0, -1, -2],
        1,
    );
    for passage in 1..=2 {
        let outcome = g.delta(passage).unwrap();
        assert_eq!(outcome.graph.number_of_levels(), 2);
        assert!(!outcome.graph.has_horizontal_edge());
    }
    // the kept passage is the requested one: passage 1 keeps the top level
    let top = g.delta(1).unwrap().graph;
    assert_eq!(top.vertices_on_level(0).len(), 1);
}

#[test]
fn delta_is_idempotent_on_two_level_graphs() {
    let g = lg(
        &[1, 2],
        &[&[1], &[2, 3, 4]],
        &[(1, 2)],
        &[0, -2, 1, 3],
        &[0, -1],
        1,
    );
    let outcome = g.delta(1).unwrap();
    assert_eq!(outcome.graph, g);
}

#[test]
fn delta_warns_on_horizontal_edges() {
    let g = lg(
        &[1, 1, 1],
        &[&[1, 2], &[3, 4], &[5]],
        &[(2, 3), (4, 5)],
        &[1, -1, -1, 0, -2],
        &[0, 0, -1],
        1,
    );
    let outcome = g.delta(1).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.warning, Some(SquishWarning::HorizontalEdgesPresent));
}

#[test]
fn delta_rejects_out_of_range_passages() {
    let g = lg(
        &[1, 2],
        &[&[1], &[2, 3, 4]],
        &[(1, 2)],
        &[0, -2, 1, 3],
        &[0, -1],
        1,
    );
    assert!(g.delta(0).is_err());
    assert!(g.delta(2).is_err());
}

#[test]
fn relabel_round_trips() {
    let g = lg(
        &[1, 0],
        &[&[1, 2], &[3, 4, 5, 6]],
        &[(1, 5), (2, 6)],
        &[0, 0, 1, 1, -2, -2],
        &[0, -1],
        1,
    );
    let forward: BTreeMap<LegId, LegId> =
        (1..=6).map(|l| (leg(l), leg(l + 10))).collect();
    let backward: BTreeMap<LegId, LegId> =
        (1..=6).map(|l| (leg(l + 10), leg(l))).collect();
    let renamed = g.relabel(&forward).unwrap();
    assert!(renamed.leg_list().contains(&leg(11)));
    let back = renamed.relabel(&backward).unwrap();
    assert_eq!(back, g);
}

#[test]
fn relabel_rejects_partial_and_colliding_maps() {
    let g = lg(&[1], &[&[1, 2, 3]], &[(1, 2)], &[-1, -1, 2], &[0], 1);
    let partial: BTreeMap<LegId, LegId> = [(leg(1), leg(4))].into_iter().collect();
    assert!(g.relabel(&partial).is_err());
    let colliding: BTreeMap<LegId, LegId> =
        [(leg(1), leg(4)), (leg(2), leg(4)), (leg(3), leg(5))]
            .into_iter()
            .collect();
    assert!(g.relabel(&colliding).is_err());
}

#[test]
fn extract_restricts_to_a_sub_graph() {
    let g = lg(
        &[0, 0, 0],
        &[&[1, 2], &[3, 4], &[5, 6]],
        &[(1, 3), (4, 5)],
        &[0, 1, -2, 0, -2, 1],
        &[0, -1, -2],
        1,
    );
    use strata_core::VertexId;
    let sub = g
        .extract(
            &[VertexId::from_index(0), VertexId::from_index(1)],
            &[Edge(leg(1), leg(3))],
        )
        .unwrap();
    assert_eq!(sub.num_vertices(), 2);
    assert_eq!(sub.edges(), &[Edge(leg(1), leg(3))]);
    // leg 4 lost its edge and became a marking
    assert!(sub.markings().contains(&leg(4)));
    // an edge leaving the vertex set is rejected
    assert!(g
        .extract(&[VertexId::from_index(0)], &[Edge(leg(1), leg(3))])
        .is_err());
}
