//! The immutable level graph of a stratum of k-differentials.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strata_core::{graph_error, Edge, KSignature, LegId, StrataError, VertexId};

use crate::serialization::LevelGraphData;

/// A level graph: a stable graph with an integral level on every vertex,
/// a pole order on every leg and a differential order `k`.
///
/// All derived data (signature, leg lookup tables, prongs, level ordering)
/// is computed once at construction; the graph itself never mutates, and
/// every operator returns a fresh graph.
///
/// Edges are stored with the first leg on the weakly higher level; the
/// constructor normalizes the input orientation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LevelGraphData", into = "LevelGraphData")]
pub struct LevelGraph {
    genera: Vec<u32>,
    legs: Vec<Vec<LegId>>,
    edges: Vec<Edge>,
    pole_orders: BTreeMap<LegId, i64>,
    levels: Vec<i64>,
    k: u32,
    // derived
    sig: KSignature,
    sorted_levels: Vec<i64>,
    leg_list: Vec<LegId>,
    leg_vertex: BTreeMap<LegId, VertexId>,
    max_leg: u32,
    prongs: BTreeMap<Edge, i64>,
}

impl LevelGraph {
    /// Builds a level graph from its defining data.
    ///
    /// Structural integrity is enforced here (matching lengths, unique legs,
    /// complete pole orders, edges over known legs, each leg in at most one
    /// edge); admissibility of the orders and levels is a separate, opt-in
    /// concern of [`LevelGraph::check_admissible`].
    pub fn new(
        genera: Vec<u32>,
        legs: Vec<Vec<LegId>>,
        edges: Vec<Edge>,
        pole_orders: BTreeMap<LegId, i64>,
        levels: Vec<i64>,
        k: u32,
    ) -> Result<Self, StrataError> {
        if genera.len() != legs.len() || genera.len() != levels.len() {
            return Err(graph_error(
                "graph-length-mismatch",
                "genera, legs and levels must have one entry per vertex",
            )
            .with_context("genera", genera.len())
            .with_context("legs", legs.len())
            .with_context("levels", levels.len()));
        }
        let mut leg_vertex = BTreeMap::new();
        for (vertex, vertex_legs) in legs.iter().enumerate() {
            for &leg in vertex_legs {
                if leg_vertex.insert(leg, VertexId::from_index(vertex)).is_some() {
                    return Err(graph_error(
                        "graph-duplicate-leg",
                        "a leg may be attached to only one vertex",
                    )
                    .with_context("leg", leg));
                }
            }
        }
        for leg in leg_vertex.keys() {
            if !pole_orders.contains_key(leg) {
                return Err(graph_error(
                    "graph-missing-order",
                    "every leg needs a pole order",
                )
                .with_context("leg", *leg));
            }
        }
        for leg in pole_orders.keys() {
            if !leg_vertex.contains_key(leg) {
                return Err(graph_error(
                    "graph-unknown-order-leg",
                    "pole order given for a leg that is not in the graph",
                )
                .with_context("leg", *leg));
            }
        }
        let mut used_in_edge = BTreeSet::new();
        for edge in &edges {
            if edge.0 == edge.1 {
                return Err(graph_error(
                    "graph-degenerate-edge",
                    "an edge must join two distinct legs",
                )
                .with_context("edge", *edge));
            }
            for leg in edge.legs() {
                if !leg_vertex.contains_key(&leg) {
                    return Err(graph_error(
                        "graph-unknown-edge-leg",
                        "edge references a leg that is not in the graph",
                    )
                    .with_context("leg", leg)
                    .with_context("edge", *edge));
                }
                if !used_in_edge.insert(leg) {
                    return Err(graph_error(
                        "graph-leg-reused",
                        "a leg may appear in at most one edge",
                    )
                    .with_context("leg", leg));
                }
            }
        }
        // Normalize orientation: first leg on the weakly higher level.
        let edges: Vec<Edge> = edges
            .into_iter()
            .map(|e| {
                let lv0 = levels[leg_vertex[&e.0].index()];
                let lv1 = levels[leg_vertex[&e.1].index()];
                if lv0 < lv1 {
                    Edge(e.1, e.0)
                } else {
                    e
                }
            })
            .collect();

        let sorted_levels: Vec<i64> = levels.iter().copied().unique().sorted().collect();
        let leg_list: Vec<LegId> = leg_vertex.keys().copied().collect();
        let max_leg = leg_list.iter().map(|l| l.as_raw()).max().unwrap_or(0);

        let marking_orders: Vec<i64> = leg_list
            .iter()
            .filter(|leg| !used_in_edge.contains(leg))
            .map(|leg| pole_orders[leg])
            .collect();
        let sig = KSignature::new(marking_orders, k)?;

        let prongs: BTreeMap<Edge, i64> = edges
            .iter()
            .map(|&e| (e, pole_orders[&e.0] + 1))
            .collect();

        Ok(Self {
            genera,
            legs,
            edges,
            pole_orders,
            levels,
            k,
            sig,
            sorted_levels,
            leg_list,
            leg_vertex,
            max_leg,
            prongs,
        })
    }

    /// Builds a level graph with the pole orders given as a flat list over
    /// the legs in increasing leg order.
    pub fn from_order_list(
        genera: Vec<u32>,
        legs: Vec<Vec<LegId>>,
        edges: Vec<Edge>,
        orders: Vec<i64>,
        levels: Vec<i64>,
        k: u32,
    ) -> Result<Self, StrataError> {
        let mut all_legs: Vec<LegId> = legs.iter().flatten().copied().collect();
        all_legs.sort_unstable();
        if all_legs.len() != orders.len() {
            return Err(graph_error(
                "graph-order-list-length",
                "the order list must have one entry per leg",
            )
            .with_context("legs", all_legs.len())
            .with_context("orders", orders.len()));
        }
        let pole_orders = all_legs.into_iter().zip(orders).collect();
        Self::new(genera, legs, edges, pole_orders, levels, k)
    }

    /// The genus of each vertex.
    pub fn genera(&self) -> &[u32] {
        &self.genera
    }

    /// The legs attached to each vertex, indexed by vertex.
    pub fn legs(&self) -> &[Vec<LegId>] {
        &self.legs
    }

    /// The edges, in normalized orientation.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The pole order of every leg.
    pub fn pole_orders(&self) -> &BTreeMap<LegId, i64> {
        &self.pole_orders
    }

    /// The internal level of each vertex.
    pub fn levels(&self) -> &[i64] {
        &self.levels
    }

    /// The differential order `k`.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// The signature read off the markings.
    pub fn sig(&self) -> &KSignature {
        &self.sig
    }

    /// All legs in increasing order.
    pub fn leg_list(&self) -> &[LegId] {
        &self.leg_list
    }

    /// The largest leg identifier in use (0 if there are no legs).
    pub fn max_leg(&self) -> u32 {
        self.max_leg
    }

    /// The number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.genera.len()
    }

    /// The vertex a leg is attached to.
    pub fn vertex(&self, leg: LegId) -> Result<VertexId, StrataError> {
        self.leg_vertex.get(&leg).copied().ok_or_else(|| {
            graph_error("graph-missing-leg", "no such leg").with_context("leg", leg)
        })
    }

    /// The genus of a vertex.
    pub fn genus(&self, vertex: VertexId) -> Result<u32, StrataError> {
        self.genera.get(vertex.index()).copied().ok_or_else(|| {
            graph_error("graph-missing-vertex", "no such vertex").with_context("vertex", vertex)
        })
    }

    /// The legs attached to a vertex.
    pub fn legs_at_vertex(&self, vertex: VertexId) -> Result<&[LegId], StrataError> {
        self.legs
            .get(vertex.index())
            .map(Vec::as_slice)
            .ok_or_else(|| {
                graph_error("graph-missing-vertex", "no such vertex").with_context("vertex", vertex)
            })
    }

    /// The internal level of a vertex.
    pub fn level_of_vertex(&self, vertex: VertexId) -> Result<i64, StrataError> {
        self.levels.get(vertex.index()).copied().ok_or_else(|| {
            graph_error("graph-missing-vertex", "no such vertex").with_context("vertex", vertex)
        })
    }

    /// The internal level of the vertex carrying a leg.
    pub fn level_of_leg(&self, leg: LegId) -> Result<i64, StrataError> {
        let vertex = self.vertex(leg)?;
        self.level_of_vertex(vertex)
    }

    /// The pole order at a leg.
    pub fn order_at_leg(&self, leg: LegId) -> Result<i64, StrataError> {
        self.pole_orders.get(&leg).copied().ok_or_else(|| {
            graph_error("graph-missing-leg", "no such leg").with_context("leg", leg)
        })
    }

    /// The vertices on an internal level, in vertex order.
    pub fn vertices_on_level(&self, level: i64) -> Vec<VertexId> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, &lv)| lv == level)
            .map(|(idx, _)| VertexId::from_index(idx))
            .collect()
    }

    /// The edges incident to a vertex (loops appear once).
    pub fn edges_at_vertex(&self, vertex: VertexId) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| {
                self.leg_vertex.get(&e.0) == Some(&vertex)
                    || self.leg_vertex.get(&e.1) == Some(&vertex)
            })
            .copied()
            .collect()
    }

    /// Whether a leg is half of an edge (as opposed to a marking).
    pub fn is_half_edge(&self, leg: LegId) -> bool {
        self.edges.iter().any(|e| e.contains(leg))
    }

    /// The markings of the graph: legs not part of any edge, in increasing
    /// order.
    pub fn markings(&self) -> Vec<LegId> {
        self.leg_list
            .iter()
            .filter(|&&leg| !self.is_half_edge(leg))
            .copied()
            .collect()
    }

    /// The markings attached to a vertex, in increasing order.
    pub fn markings_at_vertex(&self, vertex: VertexId) -> Result<Vec<LegId>, StrataError> {
        Ok(self
            .legs_at_vertex(vertex)?
            .iter()
            .filter(|&&leg| !self.is_half_edge(leg))
            .copied()
            .collect())
    }

    /// The legs of order exactly `-1` at a vertex.
    pub fn simple_poles_at_vertex(&self, vertex: VertexId) -> Result<Vec<LegId>, StrataError> {
        Ok(self
            .legs_at_vertex(vertex)?
            .iter()
            .filter(|&&leg| self.pole_orders.get(&leg) == Some(&-1))
            .copied()
            .collect())
    }

    /// The leg carrying the pole of largest order at a vertex, if any.
    pub fn highest_order_pole(&self, vertex: VertexId) -> Result<Option<LegId>, StrataError> {
        let mut best: Option<(i64, LegId)> = None;
        for &leg in self.legs_at_vertex(vertex)? {
            let order = self.pole_orders[&leg];
            if order < 0 {
                let depth = -order;
                if best.map_or(true, |(d, _)| depth > d) {
                    best = Some((depth, leg));
                }
            }
        }
        Ok(best.map(|(_, leg)| leg))
    }

    /// The total genus of the (connected) graph.
    pub fn g(&self) -> i64 {
        self.genera.iter().map(|&g| i64::from(g)).sum::<i64>() + self.edges.len() as i64
            - self.genera.len() as i64
            + 1
    }

    /// The number of distinct levels.
    pub fn number_of_levels(&self) -> usize {
        self.sorted_levels.len()
    }

    /// The smallest internal level in use.
    pub fn lowest_level(&self) -> Option<i64> {
        self.sorted_levels.first().copied()
    }

    /// The internal level at relative position `i` from the top; the sign of
    /// `i` is ignored, so both `1` and `-1` denote the level below the top.
    pub fn internal_level_number(&self, i: i64) -> Option<i64> {
        let rank = i.unsigned_abs() as usize;
        if rank >= self.sorted_levels.len() {
            return None;
        }
        Some(self.sorted_levels[self.sorted_levels.len() - 1 - rank])
    }

    /// The relative position of an internal level, counted from the top
    /// (`0` is the top level).
    pub fn level_number(&self, internal: i64) -> Option<usize> {
        self.sorted_levels
            .iter()
            .position(|&lv| lv == internal)
            .map(|idx| self.sorted_levels.len() - 1 - idx)
    }

    /// The next internal level strictly below the given one, if any.
    pub fn next_lower_level(&self, internal: i64) -> Option<i64> {
        let idx = self.sorted_levels.iter().position(|&lv| lv == internal)?;
        if idx == 0 {
            return None;
        }
        Some(self.sorted_levels[idx - 1])
    }

    /// Whether an edge has both legs on one level. Non-edges are not
    /// horizontal.
    pub fn is_horizontal(&self, edge: Edge) -> bool {
        if !self.edges.contains(&edge) {
            return false;
        }
        match (self.level_of_leg(edge.0), self.level_of_leg(edge.1)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Whether the graph contains any horizontal edge.
    pub fn has_horizontal_edge(&self) -> bool {
        self.edges.iter().any(|&e| self.is_horizontal(e))
    }

    /// The number of horizontal edges.
    pub fn num_horizontal_edges(&self) -> usize {
        self.edges.iter().filter(|&&e| self.is_horizontal(e)).count()
    }

    /// Whether a vertex carries a loop.
    pub fn has_loop(&self, vertex: VertexId) -> bool {
        self.edges.iter().any(|e| {
            self.leg_vertex.get(&e.0) == Some(&vertex) && self.leg_vertex.get(&e.1) == Some(&vertex)
        })
    }

    /// The codimension of the boundary stratum the graph describes:
    /// one for each level passage plus one for each horizontal edge.
    pub fn codim(&self) -> usize {
        (self.number_of_levels() - 1) + self.num_horizontal_edges()
    }

    /// Whether the graph is a two-level graph without horizontal edges.
    pub fn is_bic(&self) -> bool {
        self.number_of_levels() == 2 && !self.has_horizontal_edge()
    }

    /// The edges with at least one leg on the given internal level.
    pub fn edges_at_level(&self, level: i64) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| {
                self.level_of_leg(e.0) == Ok(level) || self.level_of_leg(e.1) == Ok(level)
            })
            .copied()
            .collect()
    }

    /// The horizontal edges on the given internal level.
    pub fn horizontal_edges_at_level(&self, level: i64) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| {
                self.level_of_leg(e.0) == Ok(level) && self.level_of_leg(e.1) == Ok(level)
            })
            .copied()
            .collect()
    }

    /// The edges whose lower leg sits on the given internal level and whose
    /// upper leg sits strictly above it.
    pub fn edges_going_up_from_level(&self, level: i64) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| {
                self.level_of_leg(e.1) == Ok(level)
                    && self.level_of_leg(e.0).map_or(false, |lv| lv > level)
            })
            .copied()
            .collect()
    }

    /// Whether an edge starts weakly above and ends strictly below the given
    /// internal level.
    pub fn crosses_level(&self, edge: Edge, level: i64) -> bool {
        match (self.level_of_leg(edge.0), self.level_of_leg(edge.1)) {
            (Ok(a), Ok(b)) => a >= level && b < level,
            _ => false,
        }
    }

    /// The edges crossing the given internal level.
    pub fn edges_going_past_level(&self, level: i64) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|&&e| self.crosses_level(e, level))
            .copied()
            .collect()
    }

    /// Whether an edge spans more than one level passage.
    pub fn is_long(&self, edge: Edge) -> bool {
        let (Ok(a), Ok(b)) = (self.level_of_leg(edge.0), self.level_of_leg(edge.1)) else {
            return false;
        };
        match (self.level_number(a), self.level_number(b)) {
            (Some(top), Some(bot)) => bot > top + 1,
            _ => false,
        }
    }

    /// Whether the graph contains a long edge.
    pub fn has_long_edge(&self) -> bool {
        self.edges.iter().any(|&e| self.is_long(e))
    }

    /// The vertices on levels strictly above the given internal level.
    pub fn vertices_above(&self, level: i64) -> Vec<VertexId> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, &lv)| lv > level)
            .map(|(idx, _)| VertexId::from_index(idx))
            .collect()
    }

    /// The edges with both legs strictly above the given internal level.
    pub fn edges_above(&self, level: i64) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| {
                self.level_of_leg(e.0).map_or(false, |lv| lv > level)
                    && self.level_of_leg(e.1).map_or(false, |lv| lv > level)
            })
            .copied()
            .collect()
    }

    /// The number of prongs of an edge: the pole order at its upper leg plus
    /// one.
    pub fn prong(&self, edge: Edge) -> Result<i64, StrataError> {
        self.prongs.get(&edge).copied().ok_or_else(|| {
            graph_error("graph-missing-edge", "no such edge").with_context("edge", edge)
        })
    }

    /// All prongs, keyed by edge.
    pub fn prongs(&self) -> &BTreeMap<Edge, i64> {
        &self.prongs
    }

    /// Whether any marking is a pole.
    pub fn is_meromorphic(&self) -> bool {
        self.markings()
            .iter()
            .any(|leg| self.pole_orders[leg] < 0)
    }
}

impl PartialEq for LevelGraph {
    fn eq(&self, other: &Self) -> bool {
        let self_edges: BTreeSet<Edge> = self.edges.iter().copied().collect();
        let other_edges: BTreeSet<Edge> = other.edges.iter().copied().collect();
        self.genera == other.genera
            && self.legs == other.legs
            && self_edges == other_edges
            && self.pole_orders == other.pole_orders
            && self.levels == other.levels
            && self.k == other.k
    }
}

impl Eq for LevelGraph {}
