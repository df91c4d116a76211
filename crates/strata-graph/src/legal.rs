//! Legality of level graphs as degenerations of flat surfaces.
//!
//! A genus zero vertex whose zero orders are too large for its poles
//! ("inconvenient") forces a residue relation that can only be satisfied
//! with extra freedom: a cycle through the levels above, or enough poles
//! whose residues are not pinned by conditions. Horizontal bridges force
//! matching residues on both sides and need the same kind of freedom.

use std::collections::BTreeSet;

use strata_core::{Edge, LegId, StrataError, VertexId};

use crate::aux_graph::{AuxEdgeLabel, AuxGraph, AuxNode};
use crate::graph::LevelGraph;

impl LevelGraph {
    /// Whether a vertex is inconvenient: genus zero, no simple pole, and a
    /// zero order exceeding what the poles at the vertex can feed.
    pub fn is_inconvenient_vertex(&self, vertex: VertexId) -> Result<bool, StrataError> {
        if self.genus(vertex)? > 0 {
            return Ok(false);
        }
        if !self.simple_poles_at_vertex(vertex)?.is_empty() {
            return Ok(false);
        }
        let legs = self.legs_at_vertex(vertex)?;
        let pole_orders: Vec<i64> = legs
            .iter()
            .map(|leg| self.pole_orders()[leg])
            .filter(|&order| order < 0)
            .collect();
        let pole_depth: i64 = pole_orders.iter().map(|order| -order).sum();
        let pole_count = pole_orders.len() as i64;
        Ok(legs
            .iter()
            .any(|leg| self.pole_orders()[leg] > pole_depth - pole_count - 1))
    }

    /// Whether an inconvenient vertex stays inconvenient after redemption.
    ///
    /// Removing the vertex from its weakly-above component splits the rest
    /// into pieces; two connections into one piece close a cycle and redeem
    /// the vertex, and so do two poles with free residues (at the vertex or
    /// in connected pieces). Poles in `excluded` are pinned.
    pub fn is_illegal_vertex(
        &self,
        vertex: VertexId,
        aux: &AuxGraph,
        excluded: &BTreeSet<LegId>,
    ) -> Result<bool, StrataError> {
        if !self.is_inconvenient_vertex(vertex)? {
            return Ok(false);
        }
        let level = self.level_of_vertex(vertex)?;
        let meromorphic = self.is_meromorphic();

        // A holomorphic inconvenient vertex needs an edge that does not go
        // down to stand a chance.
        let mut has_non_down_edge = false;
        for edge in self.edges_at_vertex(vertex) {
            if self.level_of_leg(edge.0)? >= level && self.level_of_leg(edge.1)? >= level {
                has_non_down_edge = true;
                break;
            }
        }
        if !has_non_down_edge && !meromorphic {
            return Ok(true);
        }

        let above = aux.at_or_above(self, level);
        let node = AuxNode::Graph(vertex);
        let Some(own_component) = above.component_containing(node) else {
            return Ok(true);
        };
        let punctured = above.subgraph_where(|n| own_component.contains(n) && *n != node);
        let components = punctured.connected_components();

        let mut free_poles = 0usize;
        for leg in self.markings_at_vertex(vertex)? {
            if self.pole_orders()[&leg] < 0 && !excluded.contains(&leg) {
                free_poles += 1;
            }
        }
        for component in &components {
            let connections = above
                .edges_at(node)
                .into_iter()
                .filter(|edge| {
                    let other = if edge.a == node { edge.b } else { edge.a };
                    component.contains(&other)
                })
                .count();
            if connections > 1 {
                // Two connections into one piece close a cycle.
                return Ok(false);
            }
            if meromorphic && self.component_has_free_pole_in(component, excluded)? {
                free_poles += 1;
            }
        }
        Ok(free_poles < 2)
    }

    /// Whether a horizontal edge between distinct vertices is a bridge in
    /// the graph weakly above its level and lacks a free pole on each side.
    /// Loops and non-horizontal edges are never illegal.
    pub fn is_illegal_edge(
        &self,
        edge: Edge,
        aux: &AuxGraph,
        excluded: &BTreeSet<LegId>,
    ) -> Result<bool, StrataError> {
        if !self.is_horizontal(edge) {
            return Ok(false);
        }
        let v = self.vertex(edge.0)?;
        let w = self.vertex(edge.1)?;
        if v == w {
            return Ok(false);
        }
        let level = self.level_of_vertex(v)?;
        let above = aux.at_or_above(self, level);
        if !above.is_cut_edge(AuxEdgeLabel::Graph(edge)) {
            return Ok(false);
        }
        let without = above.without_edge(AuxEdgeLabel::Graph(edge));
        let side_v = without
            .component_containing(AuxNode::Graph(v))
            .unwrap_or_default();
        let side_w = without
            .component_containing(AuxNode::Graph(w))
            .unwrap_or_default();
        let redeemed = self.component_has_free_pole_in(&side_v, excluded)?
            && self.component_has_free_pole_in(&side_w, excluded)?;
        Ok(!redeemed)
    }

    /// Whether no vertex and no edge is illegal, with the poles in
    /// `excluded` treated as having pinned residues.
    pub fn is_legal(
        &self,
        aux: &AuxGraph,
        excluded: &BTreeSet<LegId>,
    ) -> Result<bool, StrataError> {
        for idx in 0..self.num_vertices() {
            if self.is_illegal_vertex(VertexId::from_index(idx), aux, excluded)? {
                return Ok(false);
            }
        }
        for &edge in self.edges() {
            if self.is_illegal_edge(edge, aux, excluded)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
