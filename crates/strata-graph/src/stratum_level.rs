//! The generalised stratum cut out by one level of a level graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strata_core::{
    graph_error, KSignature, LegId, StrataError, Stratum, StratumPoint,
};

use crate::aux_graph::{AuxEdgeLabel, AuxGraph, AuxNode};
use crate::graph::LevelGraph;

/// A level of a level graph, seen as a generalised stratum: one component
/// per vertex on the level, with residue conditions induced by the levels
/// above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStratum {
    sigs: Vec<KSignature>,
    res_cond: Vec<Vec<StratumPoint>>,
    leg_dict: Vec<(LegId, StratumPoint)>,
    leg_orbits: Vec<Vec<StratumPoint>>,
}

impl LevelStratum {
    /// Builds a level stratum from its components, conditions and the
    /// correspondence between graph legs and stratum points.
    pub fn new(
        sigs: Vec<KSignature>,
        res_cond: Vec<Vec<StratumPoint>>,
        leg_dict: Vec<(LegId, StratumPoint)>,
    ) -> Self {
        Self { sigs, res_cond, leg_dict, leg_orbits: Vec::new() }
    }

    /// The stratum point a graph leg maps to.
    pub fn stratum_number(&self, leg: LegId) -> Result<StratumPoint, StrataError> {
        self.leg_dict
            .iter()
            .find(|(l, _)| *l == leg)
            .map(|&(_, point)| point)
            .ok_or_else(|| {
                graph_error("level-missing-leg", "leg is not on this level")
                    .with_context("leg", leg)
            })
    }

    /// The graph leg a stratum point comes from.
    pub fn leg_number(&self, point: StratumPoint) -> Result<LegId, StrataError> {
        self.leg_dict
            .iter()
            .find(|(_, p)| *p == point)
            .map(|&(leg, _)| leg)
            .ok_or_else(|| {
                graph_error("level-missing-point", "no leg maps to this stratum point")
                    .with_context("point", point)
            })
    }

    /// The leg-to-point correspondence, in leg order.
    pub fn leg_dict(&self) -> &[(LegId, StratumPoint)] {
        &self.leg_dict
    }

    /// Orbits of the points on this level under the automorphisms of the
    /// embedded graph, once recorded.
    pub fn leg_orbits(&self) -> &[Vec<StratumPoint>] {
        &self.leg_orbits
    }

    /// Records the automorphism orbits of the points on this level.
    pub fn set_leg_orbits(&mut self, orbits: Vec<Vec<StratumPoint>>) {
        self.leg_orbits = orbits;
    }

    /// Whether the stratum is empty: a simple pole whose residue is forced
    /// to vanish by the conditions together with the residue theorem on
    /// each component.
    pub fn is_empty(&self) -> Result<bool, StrataError> {
        let pole_list = self.pole_list();
        let mut matrix = self.residue_matrix()?;
        for component in 0..self.components() {
            let row: Vec<u8> = pole_list
                .iter()
                .map(|point| u8::from(point.component == component))
                .collect();
            if row.iter().any(|&entry| entry == 1) {
                matrix.push_row(row)?;
            }
        }
        if matrix.row_count() == 0 {
            return Ok(false);
        }
        let base_rank = matrix.rank();
        for pole in self.simple_poles() {
            let column = pole_list
                .iter()
                .position(|point| *point == pole)
                .ok_or_else(|| {
                    graph_error("level-missing-pole", "simple pole not in the pole list")
                        .with_context("pole", pole)
                })?;
            if matrix.append_unit_row(column)?.rank() == base_rank {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Stratum for LevelStratum {
    fn signatures(&self) -> &[KSignature] {
        &self.sigs
    }

    fn residue_conditions(&self) -> &[Vec<StratumPoint>] {
        &self.res_cond
    }
}

impl LevelGraph {
    /// The generalised stratum of the level at relative position
    /// `relative_level` from the top.
    ///
    /// Each vertex on the level becomes a component; every connected
    /// component of the auxiliary graph strictly above the level induces
    /// one residue condition on the poles it feeds, unless a pole with a
    /// free residue inside the component lifts it. Poles in `excluded` do
    /// not lift conditions. Graphs with horizontal edges are rejected.
    pub fn stratum_from_level(
        &self,
        aux: &AuxGraph,
        relative_level: i64,
        excluded: &BTreeSet<LegId>,
    ) -> Result<LevelStratum, StrataError> {
        if self.has_horizontal_edge() {
            return Err(graph_error(
                "graph-horizontal-level",
                "level strata are only defined without horizontal edges",
            ));
        }
        let internal = self.internal_level_number(relative_level).ok_or_else(|| {
            graph_error("graph-missing-level", "no level at this relative position")
                .with_context("level", relative_level)
        })?;

        let vertices = self.vertices_on_level(internal);
        let mut sigs = Vec::new();
        let mut leg_dict: Vec<(LegId, StratumPoint)> = Vec::new();
        let mut leg_point: BTreeMap<LegId, StratumPoint> = BTreeMap::new();
        for (component, &vertex) in vertices.iter().enumerate() {
            let mut legs = self.legs_at_vertex(vertex)?.to_vec();
            legs.sort_unstable();
            let orders: Vec<i64> = legs.iter().map(|leg| self.pole_orders()[leg]).collect();
            sigs.push(KSignature::new(orders, self.k())?);
            for (index, &leg) in legs.iter().enumerate() {
                let point = StratumPoint::new(component, index);
                leg_dict.push((leg, point));
                leg_point.insert(leg, point);
            }
        }

        let weakly_above = aux.at_or_above(self, internal);
        let strictly_above = aux.strictly_above(self, internal);
        let mut res_cond = Vec::new();
        for component in strictly_above.connected_components() {
            if self.component_has_free_pole_in(&component, excluded)? {
                continue;
            }
            let mut condition: Vec<StratumPoint> = Vec::new();
            for aux_edge in weakly_above.edges() {
                match aux_edge.label {
                    AuxEdgeLabel::Graph(edge) => {
                        let upper = AuxNode::Graph(self.vertex(edge.0)?);
                        if component.contains(&upper) && self.level_of_leg(edge.1)? == internal {
                            if let Some(&point) = leg_point.get(&edge.1) {
                                condition.push(point);
                            }
                        }
                    }
                    AuxEdgeLabel::Residue { condition: idx, pole_leg } => {
                        if component.contains(&AuxNode::Infinity(idx))
                            && self.level_of_leg(pole_leg)? == internal
                        {
                            if let Some(&point) = leg_point.get(&pole_leg) {
                                condition.push(point);
                            }
                        }
                    }
                }
            }
            condition.sort_unstable();
            condition.dedup();
            if !condition.is_empty() {
                res_cond.push(condition);
            }
        }
        Ok(LevelStratum::new(sigs, res_cond, leg_dict))
    }

    /// Whether a set of auxiliary nodes contains a vertex with a marked
    /// pole whose residue is free (not in `excluded`).
    pub(crate) fn component_has_free_pole_in(
        &self,
        component: &BTreeSet<AuxNode>,
        excluded: &BTreeSet<LegId>,
    ) -> Result<bool, StrataError> {
        for node in component {
            let AuxNode::Graph(vertex) = node else { continue };
            for leg in self.markings_at_vertex(*vertex)? {
                if self.pole_orders()[&leg] < 0 && !excluded.contains(&leg) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
