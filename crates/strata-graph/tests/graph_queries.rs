use strata_core::{Edge, LegId, StrataError, VertexId};
use strata_graph::LevelGraph;

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

// Genus two, two markings of order one: a two-level graph with a genus one
// top vertex joined by two edges to a genus zero bottom vertex.
fn genus_two_bic() -> LevelGraph {
    lg(
        &[1, 0],
        &[&[1, 2], &[3, 4, 5, 6]],
        &[(1, 5), (2, 6)],
        &[0, 0, 1, 1, -2, -2],
        &[0, -1],
        1,
    )
}

#[test]
fn leg_and_vertex_lookups() {
    let g = genus_two_bic();
    assert_eq!(g.vertex(leg(1)).unwrap(), VertexId::from_index(0));
    assert_eq!(g.vertex(leg(4)).unwrap(), VertexId::from_index(1));
    assert_eq!(g.level_of_leg(leg(2)).unwrap(), 0);
    assert_eq!(g.level_of_leg(leg(6)).unwrap(), -1);
    assert_eq!(g.order_at_leg(leg(5)).unwrap(), -2);
    assert!(matches!(g.vertex(leg(9)), Err(StrataError::Graph(_))));
}

#[test]
fn markings_and_half_edges() {
    let g = genus_two_bic();
    assert_eq!(g.markings(), vec![leg(3), leg(4)]);
    assert!(g.is_half_edge(leg(1)));
    assert!(!g.is_half_edge(leg(3)));
    assert_eq!(
        g.markings_at_vertex(VertexId::from_index(1)).unwrap(),
        vec![leg(3), leg(4)]
    );
}

#[test]
fn genus_is_consistent_with_signature() {
    let g = genus_two_bic();
    assert_eq!(g.g(), 2);
    assert_eq!(g.sig().genus(), Some(2));
}

#[test]
fn level_numbering() {
    let g = lg(
        &[0, 0, 0],
        &[&[1, 2], &[3, 4], &[5, 6]],
        &[(1, 3), (4, 5)],
        &[2, 0, -2, 0, -2, 0],
        &[0, -2, -5],
        1,
    );
    assert_eq!(g.number_of_levels(), 3);
    assert_eq!(g.internal_level_number(0), Some(0));
    assert_eq!(g.internal_level_number(1), Some(-2));
    assert_eq!(g.internal_level_number(-2), Some(-5));
    assert_eq!(g.internal_level_number(3), None);
    assert_eq!(g.level_number(-2), Some(1));
    assert_eq!(g.level_number(-5), Some(2));
    assert_eq!(g.level_number(-1), None);
    assert_eq!(g.next_lower_level(0), Some(-2));
    assert_eq!(g.next_lower_level(-5), None);
    assert_eq!(g.lowest_level(), Some(-5));
}

#[test]
fn edge_orientation_is_normalized() {
    // Edge given lower leg first comes out upper leg first.
    let g = lg(
        &[1, 1],
        &[&[1], &[2]],
        &[(2, 1)],
        &[0, -2],
        &[0, -1],
        1,
    );
    assert_eq!(g.edges(), &[Edge(leg(1), leg(2))]);
}

#[test]
fn horizontal_and_vertical_edges() {
    let g = genus_two_bic();
    assert!(!g.has_horizontal_edge());
    assert!(!g.is_horizontal(Edge(leg(1), leg(5))));
    assert!(g.is_bic());
    assert_eq!(g.codim(), 1);

    let h = lg(
        &[1, 1],
        &[&[1, 2], &[3, 4]],
        &[(2, 3)],
        &[1, -1, -1, 1],
        &[0, 0],
        1,
    );
    assert!(h.is_horizontal(Edge(leg(2), leg(3))));
    assert!(h.has_horizontal_edge());
    assert!(!h.is_bic());
    assert_eq!(h.codim(), 1);
    // a pair that is not an edge is not horizontal
    assert!(!h.is_horizontal(Edge(leg(1), leg(4))));
}

#[test]
fn long_edges_and_level_crossings() {
    let g = lg(
        &[1, 0, 1],
        &[&[1, 2], &[3, 4, 5], &[6, 7]],
        &[(1, 3), (2, 6), (4, 7)],
        &[0, 0, -2, 0, 2, -2, -2],
        &[0, -1, -2],
        1,
    );
    // (2,6) spans from level 0 to level -2
    assert!(g.is_long(Edge(leg(2), leg(6))));
    assert!(!g.is_long(Edge(leg(1), leg(3))));
    assert!(g.has_long_edge());
    assert!(g.crosses_level(Edge(leg(2), leg(6)), -1));
    assert_eq!(g.edges_going_past_level(-1).len(), 2);
    assert_eq!(g.edges_going_up_from_level(-1), vec![Edge(leg(1), leg(3))]);
    assert_eq!(g.vertices_above(-1), vec![VertexId::from_index(0)]);
    assert_eq!(g.edges_above(-1), Vec::new());
}

#[test]
fn prongs_come_from_the_upper_leg() {
    let g = genus_two_bic();
    assert_eq!(g.prong(Edge(leg(1), leg(5))).unwrap(), 1);
    assert!(g.prong(Edge(leg(3), leg(4))).is_err());
}

#[test]
fn loops_are_detected() {
    let g = lg(&[1], &[&[1, 2, 3]], &[(1, 2)], &[-1, -1, 2], &[0], 1);
    assert!(g.has_loop(VertexId::from_index(0)));
    assert!(!genus_two_bic().has_loop(VertexId::from_index(0)));
}

#[test]
fn constructor_rejects_malformed_input() {
    // duplicate leg across vertices
    assert!(LevelGraph::from_order_list(
        vec![1, 1],
        vec![vec![leg(1)], vec![leg(1)]],
        vec![],
        vec![0, 0],
        vec![0, 0],
        1,
    )
    .is_err());
    // order list of the wrong length
    assert!(LevelGraph::from_order_list(
        vec![1],
        vec![vec![leg(1), leg(2)]],
        vec![],
        vec![0],
        vec![0],
        1,
    )
    .is_err());
    // edge over an unknown leg
    assert!(LevelGraph::from_order_list(
        vec![1],
        vec![vec![leg(1)]],
        vec![Edge(leg(1), leg(7))],
        vec![0],
        vec![0],
        1,
    )
    .is_err());
    // leg in two edges
    assert!(LevelGraph::from_order_list(
        vec![0],
        vec![vec![leg(1), leg(2), leg(3)]],
        vec![Edge(leg(1), leg(2)), Edge(leg(2), leg(3))],
        vec![-1, -1, -1],
        vec![0],
        1,
    )
    .is_err());
    // vertex count mismatch
    assert!(LevelGraph::from_order_list(
        vec![1, 1],
        vec![vec![leg(1)]],
        vec![],
        vec![0],
        vec![0],
        1,
    )
    .is_err());
}
