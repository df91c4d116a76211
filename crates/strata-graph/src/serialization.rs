//! Serde payload for level graphs.
//!
//! Graphs serialize through [`LevelGraphData`], the defining data without
//! any derived tables; deserialization runs the constructor, so a payload
//! that would not pass [`crate::LevelGraph::new`] is rejected.

use serde::{Deserialize, Serialize};
use strata_core::{Edge, LegId, StrataError};

use crate::graph::LevelGraph;

/// The defining data of a level graph, as stored on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelGraphData {
    /// The genus of each vertex.
    pub genera: Vec<u32>,
    /// The legs attached to each vertex.
    pub legs: Vec<Vec<LegId>>,
    /// The edges as leg pairs.
    pub edges: Vec<Edge>,
    /// The pole order of every leg.
    pub pole_orders: Vec<(LegId, i64)>,
    /// The internal level of each vertex.
    pub levels: Vec<i64>,
    /// The differential order.
    pub k: u32,
}

impl From<LevelGraph> for LevelGraphData {
    fn from(graph: LevelGraph) -> Self {
        Self {
            genera: graph.genera().to_vec(),
            legs: graph.legs().to_vec(),
            edges: graph.edges().to_vec(),
            pole_orders: graph
                .pole_orders()
                .iter()
                .map(|(&leg, &order)| (leg, order))
                .collect(),
            levels: graph.levels().to_vec(),
            k: graph.k(),
        }
    }
}

impl TryFrom<LevelGraphData> for LevelGraph {
    type Error = StrataError;

    fn try_from(data: LevelGraphData) -> Result<Self, Self::Error> {
        LevelGraph::new(
            data.genera,
            data.legs,
            data.edges,
            data.pole_orders.into_iter().collect(),
            data.levels,
            data.k,
        )
    }
}
