use strata_core::{Edge, LegId};
use strata_graph::{LevelGraph, LevelGraphData};

fn leg(raw: u32) -> LegId {
    LegId::from_raw(raw)
}

fn genus_two_bic() -> LevelGraph {
    LevelGraph::from_order_list(
        vec![1, 0],
        vec![vec![leg(1), leg(2)], vec![leg(3), leg(4), leg(5), leg(6)]],
        vec![Edge(leg(1), leg(5)), Edge(leg(2), leg(6))],
        vec![0, 0, 1, 1, -2, -2],
        vec![0, -1],
        1,
    )
    .unwrap()
}

#[test]
fn graphs_round_trip_through_json() {
    let g = genus_two_bic();
    let json = serde_json::to_string(&g).unwrap();
    let back: LevelGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(back, g);
    // derived data is rebuilt, not transported
    assert_eq!(back.prongs(), g.prongs());
    assert_eq!(back.sig(), g.sig());
}

#[test]
fn malformed_payloads_are_rejected() {
    let mut data = LevelGraphData::from(genus_two_bic());
    data.pole_orders.pop();
    let json = serde_json::to_string(&data).unwrap();
    assert!(serde_json::from_str::<LevelGraph>(&json).is_err());
}

#[test]
fn payload_is_the_defining_data_only() {
    let g = genus_two_bic();
    let json = serde_json::to_string(&g).unwrap();
    assert!(json.contains("genera"));
    assert!(json.contains("pole_orders"));
    assert!(!json.contains("prongs"));
    assert!(!json.contains("sorted_levels"));
}
