//! Opt-in admissibility checks.
//!
//! Constructors only enforce structural integrity; whether a level graph is
//! an admissible degeneration (order sums, stability, edge orders on the
//! correct levels) is reported here as data, so callers can build and
//! inspect inadmissible candidates without tripping errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use strata_core::{Edge, VertexId};

use crate::graph::LevelGraph;

/// A single admissibility violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissibilityIssue {
    /// The leg orders at a vertex do not sum to `k(2g - 2)`.
    VertexOrderSum {
        /// The offending vertex.
        vertex: VertexId,
        /// The actual order sum at the vertex.
        sum: i64,
        /// The sum required by the vertex genus.
        expected: i64,
    },
    /// The graph as a whole is unstable: `2g - 2 + n <= 0`.
    UnstableGraph {
        /// The total genus of the graph.
        genus: i64,
        /// The number of markings.
        markings: usize,
    },
    /// A vertex is unstable: `2g_v - 2 + n_v <= 0`.
    UnstableComponent {
        /// The offending vertex.
        vertex: VertexId,
    },
    /// The orders at the two legs of an edge do not sum to `-2k`.
    EdgeOrderSum {
        /// The offending edge.
        edge: Edge,
        /// The actual order sum across the edge.
        sum: i64,
    },
    /// A non-horizontal edge carries its pole on the upper level.
    EdgeLevelCrossing {
        /// The offending edge.
        edge: Edge,
    },
    /// The signature genus and the graph genus disagree.
    GenusMismatch {
        /// The genus of the graph.
        graph_genus: i64,
        /// The genus implied by the marking orders, if any.
        signature_genus: Option<i64>,
    },
}

impl fmt::Display for AdmissibilityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissibilityIssue::VertexOrderSum { vertex, sum, expected } => write!(
                f,
                "order sum {sum} at vertex {vertex} differs from k(2g - 2) = {expected}"
            ),
            AdmissibilityIssue::UnstableGraph { genus, markings } => {
                write!(f, "unstable graph: genus {genus} with {markings} markings")
            }
            AdmissibilityIssue::UnstableComponent { vertex } => {
                write!(f, "unstable vertex {vertex}")
            }
            AdmissibilityIssue::EdgeOrderSum { edge, sum } => {
                write!(f, "orders across edge {edge} sum to {sum}, expected -2k")
            }
            AdmissibilityIssue::EdgeLevelCrossing { edge } => {
                write!(f, "edge {edge} carries its pole on the upper level")
            }
            AdmissibilityIssue::GenusMismatch { graph_genus, signature_genus } => match signature_genus {
                Some(sg) => write!(f, "graph genus {graph_genus} differs from signature genus {sg}"),
                None => write!(f, "marking orders admit no genus (graph genus {graph_genus})"),
            },
        }
    }
}

/// The outcome of a full admissibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissibilityReport {
    /// All violations found, in check order.
    pub issues: Vec<AdmissibilityIssue>,
}

impl AdmissibilityReport {
    /// Whether no violation was found.
    pub fn is_admissible(&self) -> bool {
        self.issues.is_empty()
    }
}

impl LevelGraph {
    /// Checks that the leg orders at every vertex sum to `k(2g_v - 2)`.
    pub fn check_orders(&self) -> Vec<AdmissibilityIssue> {
        let mut issues = Vec::new();
        let k = i64::from(self.k());
        for (idx, vertex_legs) in self.legs().iter().enumerate() {
            let vertex = VertexId::from_index(idx);
            let sum: i64 = vertex_legs.iter().map(|leg| self.pole_orders()[leg]).sum();
            let expected = k * (2 * i64::from(self.genera()[idx]) - 2);
            if sum != expected {
                issues.push(AdmissibilityIssue::VertexOrderSum { vertex, sum, expected });
            }
        }
        issues
    }

    /// Checks stability of the graph and of every vertex.
    pub fn check_stability(&self) -> Vec<AdmissibilityIssue> {
        let mut issues = Vec::new();
        let markings = self.markings().len();
        if 2 * self.g() - 2 + markings as i64 <= 0 {
            issues.push(AdmissibilityIssue::UnstableGraph { genus: self.g(), markings });
        }
        for (idx, vertex_legs) in self.legs().iter().enumerate() {
            if 2 * i64::from(self.genera()[idx]) - 2 + vertex_legs.len() as i64 <= 0 {
                issues.push(AdmissibilityIssue::UnstableComponent {
                    vertex: VertexId::from_index(idx),
                });
            }
        }
        issues
    }

    /// Whether the graph and all its vertices are stable.
    pub fn is_stable(&self) -> bool {
        self.check_stability().is_empty()
    }

    /// Checks that orders across every edge sum to `-2k` and that every
    /// non-horizontal edge carries its pole on the lower level.
    pub fn check_edge_orders(&self) -> Vec<AdmissibilityIssue> {
        let mut issues = Vec::new();
        let k = i64::from(self.k());
        for &edge in self.edges() {
            let sum = self.pole_orders()[&edge.0] + self.pole_orders()[&edge.1];
            if sum != -2 * k {
                issues.push(AdmissibilityIssue::EdgeOrderSum { edge, sum });
            }
            if !self.is_horizontal(edge) && self.pole_orders()[&edge.0] < 0 {
                issues.push(AdmissibilityIssue::EdgeLevelCrossing { edge });
            }
        }
        issues
    }

    /// Runs every admissibility check and collects the violations.
    pub fn check_admissible(&self) -> AdmissibilityReport {
        let mut issues = self.check_orders();
        issues.extend(self.check_stability());
        issues.extend(self.check_edge_orders());
        let graph_genus = self.g();
        let signature_genus = self.sig().genus();
        if signature_genus != Some(graph_genus) {
            issues.push(AdmissibilityIssue::GenusMismatch { graph_genus, signature_genus });
        }
        AdmissibilityReport { issues }
    }

    /// Whether the graph passes every admissibility check.
    pub fn is_admissible(&self) -> bool {
        self.check_admissible().is_admissible()
    }
}
