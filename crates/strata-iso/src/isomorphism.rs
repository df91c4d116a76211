//! Level-aware isomorphism search between two level graphs sharing a
//! marking scheme.
//!
//! The search runs level by level: marked legs pin their vertices first,
//! the remaining vertices are matched by backtracking within each genus
//! class, then the legs of every matched vertex pair are matched by pole
//! order. The per-level solution sets are combined lazily across levels
//! and a combination survives only if it carries every edge to an edge.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strata_core::{Edge, LegId, StratumPoint, VertexId};
use strata_graph::LevelGraph;

use crate::product::LazyProduct;

/// A structural isomorphism between two level graphs: a total bijection on
/// vertices together with a total bijection on legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Isomorphism {
    /// Image of every vertex of the source graph.
    pub vertex_map: BTreeMap<VertexId, VertexId>,
    /// Image of every leg of the source graph.
    pub leg_map: BTreeMap<LegId, LegId>,
}

impl Isomorphism {
    /// Whether the isomorphism fixes every vertex and leg.
    pub fn is_identity(&self) -> bool {
        self.vertex_map.iter().all(|(v, w)| v == w)
            && self.leg_map.iter().all(|(l, m)| l == m)
    }

    /// Whether the leg map fixes every leg of the given tuple.
    pub fn stabilises_legs(&self, legs: &[LegId]) -> bool {
        legs.iter()
            .all(|leg| self.leg_map.get(leg) == Some(leg))
    }
}

/// The data of one level of one graph, extracted once per search.
struct LevelData {
    vertices: Vec<VertexId>,
    genera: Vec<u32>,
    legs: Vec<Vec<LegId>>,
    order_sorted: Vec<Vec<i64>>,
    vertex_of_leg: BTreeMap<LegId, usize>,
}

impl LevelData {
    fn extract(graph: &LevelGraph, rank: i64) -> Option<Self> {
        let internal = graph.internal_level_number(rank)?;
        let vertices = graph.vertices_on_level(internal);
        let mut genera = Vec::new();
        let mut legs = Vec::new();
        let mut order_sorted = Vec::new();
        let mut vertex_of_leg = BTreeMap::new();
        for (idx, &vertex) in vertices.iter().enumerate() {
            genera.push(graph.genus(vertex).ok()?);
            let vertex_legs = graph.legs_at_vertex(vertex).ok()?.to_vec();
            for &leg in &vertex_legs {
                vertex_of_leg.insert(leg, idx);
            }
            order_sorted.push(
                vertex_legs
                    .iter()
                    .map(|leg| graph.pole_orders()[leg])
                    .sorted()
                    .collect(),
            );
            legs.push(vertex_legs);
        }
        Some(Self { vertices, genera, legs, order_sorted, vertex_of_leg })
    }
}

/// All bijections between unpinned level-local vertices of one genus class
/// whose leg counts and sorted order multisets agree.
fn vertex_assignments(
    sources: &[usize],
    targets: &BTreeSet<usize>,
    a: &LevelData,
    b: &LevelData,
) -> Vec<BTreeMap<usize, usize>> {
    let Some((&first, rest)) = sources.split_first() else {
        return vec![BTreeMap::new()];
    };
    let mut maps = Vec::new();
    for &target in targets {
        if a.legs[first].len() != b.legs[target].len()
            || a.order_sorted[first] != b.order_sorted[target]
        {
            continue;
        }
        let mut remaining = targets.clone();
        remaining.remove(&target);
        for mut map in vertex_assignments(rest, &remaining, a, b) {
            map.insert(first, target);
            maps.push(map);
        }
    }
    maps
}

/// All bijections between the unpinned legs of a matched vertex pair that
/// preserve the pole order.
fn leg_assignments(
    sources: &[LegId],
    targets: &BTreeSet<LegId>,
    a: &LevelGraph,
    b: &LevelGraph,
) -> Vec<BTreeMap<LegId, LegId>> {
    let Some((&first, rest)) = sources.split_first() else {
        return vec![BTreeMap::new()];
    };
    let mut maps = Vec::new();
    for &target in targets {
        if a.pole_orders()[&first] != b.pole_orders()[&target] {
            continue;
        }
        let mut remaining = targets.clone();
        remaining.remove(&target);
        for mut map in leg_assignments(rest, &remaining, a, b) {
            map.insert(first, target);
            maps.push(map);
        }
    }
    maps
}

/// All isomorphisms of the level at the given relative rank, restricted to
/// that level's vertices and legs. `None` means the level (and therefore
/// any graph isomorphism) is impossible.
pub(crate) fn level_isomorphisms(
    a: &LevelGraph,
    a_dmp: &BTreeMap<LegId, StratumPoint>,
    b: &LevelGraph,
    b_dmp_inv: &BTreeMap<StratumPoint, LegId>,
    rank: i64,
) -> Option<Vec<Isomorphism>> {
    let da = LevelData::extract(a, rank)?;
    let db = LevelData::extract(b, rank)?;
    if da.vertices.len() != db.vertices.len() {
        return None;
    }
    if da.vertex_of_leg.len() != db.vertex_of_leg.len() {
        return None;
    }
    if da.genera.iter().sorted().collect::<Vec<_>>()
        != db.genera.iter().sorted().collect::<Vec<_>>()
    {
        return None;
    }

    // Pin the vertices and legs forced by the shared markings.
    let mut pinned_vertices: BTreeMap<usize, usize> = BTreeMap::new();
    let mut pinned_legs: BTreeMap<LegId, LegId> = BTreeMap::new();
    let mut source: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    let mut target: BTreeMap<u32, BTreeSet<usize>> = BTreeMap::new();
    for (idx, &genus) in da.genera.iter().enumerate() {
        source.entry(genus).or_default().push(idx);
    }
    for (idx, &genus) in db.genera.iter().enumerate() {
        target.entry(genus).or_default().insert(idx);
    }
    let mut legs_source: Vec<Vec<LegId>> = da.legs.clone();
    let mut legs_target: Vec<BTreeSet<LegId>> = db
        .legs
        .iter()
        .map(|legs| legs.iter().copied().collect())
        .collect();

    for (&leg_a, point) in a_dmp {
        let &leg_b = b_dmp_inv.get(point)?;
        let in_a = da.vertex_of_leg.contains_key(&leg_a);
        let in_b = db.vertex_of_leg.contains_key(&leg_b);
        if !in_a && !in_b {
            continue;
        }
        if in_a != in_b {
            return None;
        }
        let v_a = da.vertex_of_leg[&leg_a];
        let v_b = db.vertex_of_leg[&leg_b];
        if da.genera[v_a] != db.genera[v_b]
            || da.legs[v_a].len() != db.legs[v_b].len()
            || da.order_sorted[v_a] != db.order_sorted[v_b]
        {
            return None;
        }
        match pinned_vertices.get(&v_a) {
            Some(&w) if w != v_b => return None,
            Some(_) => {}
            None => {
                let genus = db.genera[v_b];
                let targets = target.entry(genus).or_default();
                if !targets.remove(&v_b) {
                    return None;
                }
                source.entry(genus).or_default().retain(|&v| v != v_a);
                pinned_vertices.insert(v_a, v_b);
            }
        }
        pinned_legs.insert(leg_a, leg_b);
        legs_source[v_a].retain(|&l| l != leg_a);
        legs_target[v_b].remove(&leg_b);
    }

    // Backtracking over the unpinned vertices, one genus class at a time.
    let genus_factors: Vec<Vec<BTreeMap<usize, usize>>> = source
        .iter()
        .map(|(genus, sources)| {
            let empty = BTreeSet::new();
            let targets = target.get(genus).unwrap_or(&empty);
            vertex_assignments(sources, targets, &da, &db)
        })
        .collect();

    let mut results = Vec::new();
    for combination in LazyProduct::new(genus_factors) {
        let mut vertex_map_local = pinned_vertices.clone();
        for map in combination {
            vertex_map_local.extend(map);
        }
        // Legs of every matched pair, pinned markings excluded.
        let leg_factors: Vec<Vec<BTreeMap<LegId, LegId>>> = vertex_map_local
            .iter()
            .map(|(&v, &w)| leg_assignments(&legs_source[v], &legs_target[w], a, b))
            .collect();
        for leg_combination in LazyProduct::new(leg_factors) {
            let mut leg_map = pinned_legs.clone();
            for map in leg_combination {
                leg_map.extend(map);
            }
            let vertex_map: BTreeMap<VertexId, VertexId> = vertex_map_local
                .iter()
                .map(|(&v, &w)| (da.vertices[v], db.vertices[w]))
                .collect();
            results.push(Isomorphism { vertex_map, leg_map });
        }
    }
    Some(results)
}

/// Lazily enumerates all isomorphisms between two level graphs that
/// respect the given marking embeddings.
pub fn isomorphisms<'a>(
    a: &'a LevelGraph,
    a_dmp: &BTreeMap<LegId, StratumPoint>,
    b: &'a LevelGraph,
    b_dmp: &BTreeMap<LegId, StratumPoint>,
) -> Box<dyn Iterator<Item = Isomorphism> + 'a> {
    if a.number_of_levels() != b.number_of_levels() {
        return Box::new(std::iter::empty());
    }
    let b_dmp_inv: BTreeMap<StratumPoint, LegId> =
        b_dmp.iter().map(|(&leg, &point)| (point, leg)).collect();
    let mut per_level = Vec::new();
    for rank in 0..a.number_of_levels() as i64 {
        match level_isomorphisms(a, a_dmp, b, &b_dmp_inv, rank) {
            Some(isos) => per_level.push(isos),
            None => return Box::new(std::iter::empty()),
        }
    }
    let b_edges: BTreeSet<Edge> = b.edges().iter().copied().collect();
    Box::new(
        LazyProduct::new(per_level).filter_map(move |combination| {
            let mut vertex_map = BTreeMap::new();
            let mut leg_map = BTreeMap::new();
            for part in combination {
                vertex_map.extend(part.vertex_map);
                leg_map.extend(part.leg_map);
            }
            for edge in a.edges() {
                let image = Edge(*leg_map.get(&edge.0)?, *leg_map.get(&edge.1)?);
                // Horizontal edges carry no level orientation, so both
                // orderings of the image count as a hit.
                if !b_edges.contains(&image)
                    && !b_edges.contains(&Edge(image.1, image.0))
                {
                    return None;
                }
            }
            Some(Isomorphism { vertex_map, leg_map })
        }),
    )
}
