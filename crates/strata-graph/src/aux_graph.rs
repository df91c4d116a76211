//! The auxiliary undirected graph of a level graph.
//!
//! Legality and residue questions are connectivity questions on an
//! undirected multigraph whose nodes are the graph vertices plus one
//! "point at infinity" per residue condition, joined to the vertices that
//! carry the condition's poles.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strata_core::{Edge, LegId, StrataError, VertexId};

use crate::graph::LevelGraph;

/// A node of the auxiliary graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuxNode {
    /// A vertex of the level graph.
    Graph(VertexId),
    /// The point at infinity of one residue condition.
    Infinity(usize),
}

/// The label of an auxiliary edge, identifying its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuxEdgeLabel {
    /// An edge of the level graph.
    Graph(Edge),
    /// A connection to a point at infinity through a pole of the condition.
    Residue {
        /// Index of the residue condition.
        condition: usize,
        /// The pole leg through which the condition touches the vertex.
        pole_leg: LegId,
    },
}

/// A labelled undirected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxEdge {
    /// One endpoint.
    pub a: AuxNode,
    /// The other endpoint.
    pub b: AuxNode,
    /// The origin of the edge.
    pub label: AuxEdgeLabel,
}

/// An undirected multigraph over [`AuxNode`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxGraph {
    nodes: BTreeSet<AuxNode>,
    edges: Vec<AuxEdge>,
}

impl AuxGraph {
    /// The auxiliary graph of a level graph, without infinity nodes.
    pub fn from_level_graph(graph: &LevelGraph) -> Result<Self, StrataError> {
        let nodes: BTreeSet<AuxNode> = (0..graph.num_vertices())
            .map(|idx| AuxNode::Graph(VertexId::from_index(idx)))
            .collect();
        let mut edges = Vec::new();
        for &edge in graph.edges() {
            edges.push(AuxEdge {
                a: AuxNode::Graph(graph.vertex(edge.0)?),
                b: AuxNode::Graph(graph.vertex(edge.1)?),
                label: AuxEdgeLabel::Graph(edge),
            });
        }
        Ok(Self { nodes, edges })
    }

    /// Adds the point at infinity of a residue condition, joined to each of
    /// the given vertices through the pole leg that carries the condition.
    pub fn attach_infinity(&mut self, condition: usize, attachments: &[(VertexId, LegId)]) {
        let node = AuxNode::Infinity(condition);
        self.nodes.insert(node);
        for &(vertex, pole_leg) in attachments {
            self.edges.push(AuxEdge {
                a: AuxNode::Graph(vertex),
                b: node,
                label: AuxEdgeLabel::Residue { condition, pole_leg },
            });
        }
    }

    /// The nodes of the graph.
    pub fn nodes(&self) -> &BTreeSet<AuxNode> {
        &self.nodes
    }

    /// The edges of the graph.
    pub fn edges(&self) -> &[AuxEdge] {
        &self.edges
    }

    /// The edges incident to a node.
    pub fn edges_at(&self, node: AuxNode) -> Vec<&AuxEdge> {
        self.edges
            .iter()
            .filter(|edge| edge.a == node || edge.b == node)
            .collect()
    }

    /// The induced subgraph on the nodes accepted by the predicate.
    pub fn subgraph_where(&self, keep: impl Fn(&AuxNode) -> bool) -> AuxGraph {
        let nodes: BTreeSet<AuxNode> = self.nodes.iter().filter(|n| keep(n)).copied().collect();
        let edges = self
            .edges
            .iter()
            .filter(|edge| nodes.contains(&edge.a) && nodes.contains(&edge.b))
            .copied()
            .collect();
        AuxGraph { nodes, edges }
    }

    /// The subgraph on graph vertices weakly above the internal level,
    /// keeping every infinity node.
    pub fn at_or_above(&self, graph: &LevelGraph, level: i64) -> AuxGraph {
        self.subgraph_where(|node| match node {
            AuxNode::Graph(vertex) => {
                graph.level_of_vertex(*vertex).map_or(false, |lv| lv >= level)
            }
            AuxNode::Infinity(_) => true,
        })
    }

    /// The subgraph on graph vertices strictly above the internal level,
    /// keeping every infinity node.
    pub fn strictly_above(&self, graph: &LevelGraph, level: i64) -> AuxGraph {
        self.subgraph_where(|node| match node {
            AuxNode::Graph(vertex) => {
                graph.level_of_vertex(*vertex).map_or(false, |lv| lv > level)
            }
            AuxNode::Infinity(_) => true,
        })
    }

    fn adjacency(&self) -> BTreeMap<AuxNode, Vec<AuxNode>> {
        let mut adjacency: BTreeMap<AuxNode, Vec<AuxNode>> =
            self.nodes.iter().map(|&node| (node, Vec::new())).collect();
        for edge in &self.edges {
            adjacency.entry(edge.a).or_default().push(edge.b);
            adjacency.entry(edge.b).or_default().push(edge.a);
        }
        adjacency
    }

    /// The connected components, each as a node set, in order of their
    /// smallest node.
    pub fn connected_components(&self) -> Vec<BTreeSet<AuxNode>> {
        let adjacency = self.adjacency();
        let mut visited: BTreeSet<AuxNode> = BTreeSet::new();
        let mut components = Vec::new();
        for &start in &self.nodes {
            if visited.contains(&start) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                if !visited.insert(node) {
                    continue;
                }
                component.insert(node);
                if let Some(neighbours) = adjacency.get(&node) {
                    stack.extend(neighbours.iter().copied());
                }
            }
            components.push(component);
        }
        components
    }

    /// The component containing the given node, if the node is present.
    pub fn component_containing(&self, node: AuxNode) -> Option<BTreeSet<AuxNode>> {
        self.connected_components()
            .into_iter()
            .find(|component| component.contains(&node))
    }

    /// The same graph with every edge of the given label removed.
    pub fn without_edge(&self, label: AuxEdgeLabel) -> AuxGraph {
        AuxGraph {
            nodes: self.nodes.clone(),
            edges: self.edges.iter().filter(|e| e.label != label).copied().collect(),
        }
    }

    /// Whether removing the (unique) edge with this label disconnects its
    /// endpoints. Unknown labels are not cut edges.
    pub fn is_cut_edge(&self, label: AuxEdgeLabel) -> bool {
        let Some(edge) = self.edges.iter().find(|edge| edge.label == label) else {
            return false;
        };
        let (a, b) = (edge.a, edge.b);
        !self
            .without_edge(label)
            .component_containing(a)
            .map_or(false, |component| component.contains(&b))
    }
}
