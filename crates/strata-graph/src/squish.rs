//! Contraction operators on level graphs.
//!
//! All operators are pure: they return a fresh graph and never touch the
//! receiver. Requests that do not apply (squishing a non-horizontal edge,
//! squishing below the bottom level, delta on a graph with horizontal
//! edges) are not errors; they come back as an unchanged graph with a
//! warning attached, so enumeration loops can shrug them off.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strata_core::{graph_error, Edge, LegId, StrataError, VertexId};

use crate::graph::LevelGraph;

/// Why a contraction request left the graph unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SquishWarning {
    /// The edge exists but is not horizontal.
    NotHorizontal(Edge),
    /// There is no level below the given internal level to merge with.
    NoLowerLevel(i64),
    /// Delta is only defined on graphs without horizontal edges.
    HorizontalEdgesPresent,
}

/// The result of a contraction: the (possibly unchanged) graph plus a
/// warning when the request did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquishOutcome {
    /// The resulting graph.
    pub graph: LevelGraph,
    /// Whether the graph differs from the input.
    pub changed: bool,
    /// Set when the request left the graph unchanged.
    pub warning: Option<SquishWarning>,
}

impl SquishOutcome {
    fn unchanged(graph: LevelGraph, warning: SquishWarning) -> Self {
        Self { graph, changed: false, warning: Some(warning) }
    }

    fn changed(graph: LevelGraph) -> Self {
        Self { graph, changed: true, warning: None }
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self { parent: (0..size).collect() }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

impl LevelGraph {
    /// Contracts a horizontal edge.
    ///
    /// A loop raises the genus of its vertex by one; an edge between two
    /// vertices merges them. The edge legs and their orders disappear.
    /// A non-horizontal edge yields the graph unchanged with a warning;
    /// an unknown edge is a hard error.
    pub fn squish_horizontal(&self, edge: Edge) -> Result<SquishOutcome, StrataError> {
        if !self.edges().contains(&edge) {
            return Err(
                graph_error("graph-missing-edge", "no such edge").with_context("edge", edge)
            );
        }
        if !self.is_horizontal(edge) {
            return Ok(SquishOutcome::unchanged(
                self.clone(),
                SquishWarning::NotHorizontal(edge),
            ));
        }
        let v = self.vertex(edge.0)?;
        let w = self.vertex(edge.1)?;
        let edge_legs: BTreeSet<LegId> = edge.legs().into_iter().collect();

        let mut genera = self.genera().to_vec();
        let mut legs: Vec<Vec<LegId>> = self.legs().to_vec();
        let mut levels = self.levels().to_vec();
        if v == w {
            genera[v.index()] += 1;
            legs[v.index()].retain(|leg| !edge_legs.contains(leg));
        } else {
            let (keep, drop) = if v < w { (v, w) } else { (w, v) };
            genera[keep.index()] += genera[drop.index()];
            let moved: Vec<LegId> = legs[drop.index()].clone();
            legs[keep.index()].extend(moved);
            legs[keep.index()].retain(|leg| !edge_legs.contains(leg));
            genera.remove(drop.index());
            legs.remove(drop.index());
            levels.remove(drop.index());
        }
        let edges: Vec<Edge> = self.edges().iter().filter(|&&e| e != edge).copied().collect();
        let pole_orders: BTreeMap<LegId, i64> = self
            .pole_orders()
            .iter()
            .filter(|(leg, _)| !edge_legs.contains(leg))
            .map(|(&leg, &order)| (leg, order))
            .collect();
        let graph = LevelGraph::new(genera, legs, edges, pole_orders, levels, self.k())?;
        Ok(SquishOutcome::changed(graph))
    }

    /// Contracts the level passage directly below the given internal level.
    ///
    /// Edges between `level` and the next lower level are contracted in a
    /// single pass, merging their vertices; the genus of each merged vertex
    /// accounts for the cycles the contracted edges formed. Vertices of the
    /// lower level without such an edge simply move up. With no level below,
    /// the graph is returned unchanged with a warning.
    pub fn squish_vertical(&self, level: i64) -> Result<SquishOutcome, StrataError> {
        let Some(below) = self.next_lower_level(level) else {
            return Ok(SquishOutcome::unchanged(
                self.clone(),
                SquishWarning::NoLowerLevel(level),
            ));
        };

        let mut uf = UnionFind::new(self.num_vertices());
        let mut contracted: BTreeSet<Edge> = BTreeSet::new();
        for &edge in self.edges() {
            if self.level_of_leg(edge.0)? == level && self.level_of_leg(edge.1)? == below {
                uf.union(self.vertex(edge.0)?.index(), self.vertex(edge.1)?.index());
                contracted.insert(edge);
            }
        }
        let contracted_legs: BTreeSet<LegId> = contracted
            .iter()
            .flat_map(|edge| edge.legs())
            .collect();

        // One record per class, in order of smallest member.
        let mut class_genus: BTreeMap<usize, i64> = BTreeMap::new();
        let mut class_size: BTreeMap<usize, usize> = BTreeMap::new();
        let mut class_legs: BTreeMap<usize, Vec<LegId>> = BTreeMap::new();
        let mut class_level: BTreeMap<usize, i64> = BTreeMap::new();
        for idx in 0..self.num_vertices() {
            let root = uf.find(idx);
            *class_genus.entry(root).or_insert(0) += i64::from(self.genera()[idx]);
            *class_size.entry(root).or_insert(0) += 1;
            class_legs
                .entry(root)
                .or_default()
                .extend(self.legs()[idx].iter().filter(|leg| !contracted_legs.contains(leg)));
            let lv = self.levels()[idx];
            class_level.insert(root, if lv == below { level } else { lv });
        }
        let mut contracted_in_class: BTreeMap<usize, usize> = BTreeMap::new();
        for edge in &contracted {
            let root = uf.find(self.vertex(edge.0)?.index());
            *contracted_in_class.entry(root).or_insert(0) += 1;
        }

        let mut genera = Vec::new();
        let mut legs = Vec::new();
        let mut levels = Vec::new();
        for (&root, &size) in &class_size {
            let cycles =
                contracted_in_class.get(&root).copied().unwrap_or(0) as i64 - (size as i64 - 1);
            genera.push((class_genus[&root] + cycles) as u32);
            legs.push(class_legs[&root].clone());
            levels.push(class_level[&root]);
        }
        let edges: Vec<Edge> = self
            .edges()
            .iter()
            .filter(|edge| !contracted.contains(edge))
            .copied()
            .collect();
        let pole_orders: BTreeMap<LegId, i64> = self
            .pole_orders()
            .iter()
            .filter(|(leg, _)| !contracted_legs.contains(leg))
            .map(|(&leg, &order)| (leg, order))
            .collect();
        let graph = LevelGraph::new(genera, legs, edges, pole_orders, levels, self.k())?;
        Ok(SquishOutcome::changed(graph))
    }

    /// The two-level graph of the `|i|`-th level passage: every other
    /// passage is squished, counting passages from the top starting at one.
    ///
    /// Graphs with horizontal edges come back unchanged with a warning;
    /// a passage index of zero or beyond the bottom is a hard error.
    pub fn delta(&self, i: i64) -> Result<SquishOutcome, StrataError> {
        let keep = i.unsigned_abs() as usize;
        if keep == 0 || keep >= self.number_of_levels() {
            return Err(graph_error(
                "graph-delta-out-of-range",
                "level passage index out of range",
            )
            .with_context("passage", i)
            .with_context("levels", self.number_of_levels()));
        }
        if self.has_horizontal_edge() {
            return Ok(SquishOutcome::unchanged(
                self.clone(),
                SquishWarning::HorizontalEdgesPresent,
            ));
        }
        // Internal labels of surviving levels are stable across squishes,
        // so they can be read off the original graph, bottom passage first.
        let mut current = self.clone();
        for rank in (0..self.number_of_levels() - 1).rev() {
            if rank == keep - 1 {
                continue;
            }
            let internal = self.internal_level_number(rank as i64).ok_or_else(|| {
                graph_error("graph-missing-level", "no level at this rank")
                    .with_context("rank", rank)
            })?;
            current = current.squish_vertical(internal)?.graph;
        }
        Ok(SquishOutcome::changed(current))
    }

    /// The sub-level-graph on the given vertices and edges. Half-edges of
    /// excluded edges become markings; pole orders and levels restrict.
    pub fn extract(
        &self,
        vertices: &[VertexId],
        edges: &[Edge],
    ) -> Result<LevelGraph, StrataError> {
        let kept: BTreeSet<VertexId> = vertices.iter().copied().collect();
        let mut genera = Vec::new();
        let mut legs = Vec::new();
        let mut levels = Vec::new();
        for &vertex in &kept {
            genera.push(self.genus(vertex)?);
            legs.push(self.legs_at_vertex(vertex)?.to_vec());
            levels.push(self.level_of_vertex(vertex)?);
        }
        for edge in edges {
            for leg in edge.legs() {
                if !kept.contains(&self.vertex(leg)?) {
                    return Err(graph_error(
                        "graph-extract-dangling-edge",
                        "extracted edge leaves the extracted vertex set",
                    )
                    .with_context("edge", *edge));
                }
            }
        }
        let kept_legs: BTreeSet<LegId> = legs.iter().flatten().copied().collect();
        let pole_orders: BTreeMap<LegId, i64> = self
            .pole_orders()
            .iter()
            .filter(|(leg, _)| kept_legs.contains(leg))
            .map(|(&leg, &order)| (leg, order))
            .collect();
        LevelGraph::new(genera, legs, edges.to_vec(), pole_orders, levels, self.k())
    }

    /// Renames every leg through the given map, which must cover all legs
    /// injectively. Legs within each vertex come out sorted.
    pub fn relabel(&self, map: &BTreeMap<LegId, LegId>) -> Result<LevelGraph, StrataError> {
        let mut seen = BTreeSet::new();
        for &leg in self.leg_list() {
            let target = map.get(&leg).ok_or_else(|| {
                graph_error("graph-relabel-partial", "relabel map misses a leg")
                    .with_context("leg", leg)
            })?;
            if !seen.insert(*target) {
                return Err(graph_error(
                    "graph-relabel-collision",
                    "relabel map sends two legs to one target",
                )
                .with_context("target", *target));
            }
        }
        let legs: Vec<Vec<LegId>> = self
            .legs()
            .iter()
            .map(|vertex_legs| {
                let mut renamed: Vec<LegId> = vertex_legs.iter().map(|leg| map[leg]).collect();
                renamed.sort_unstable();
                renamed
            })
            .collect();
        let edges: Vec<Edge> = self.edges().iter().map(|e| Edge(map[&e.0], map[&e.1])).collect();
        let pole_orders: BTreeMap<LegId, i64> = self
            .pole_orders()
            .iter()
            .map(|(leg, &order)| (map[leg], order))
            .collect();
        LevelGraph::new(
            self.genera().to_vec(),
            legs,
            edges,
            pole_orders,
            self.levels().to_vec(),
            self.k(),
        )
    }
}
