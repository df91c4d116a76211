//! Strongly typed identifiers for legs, vertices, edges and stratum points.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a leg: a half-edge or marked point attached to exactly one
/// vertex. Legs are globally unique positive integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LegId(u32);

impl LegId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a vertex of a level graph, indexing the per-vertex tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(u32);

impl VertexId {
    /// Creates an identifier from an index into the vertex tables.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the index into the vertex tables.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An edge of a level graph, stored as an ordered pair of legs.
///
/// Storage orientation invariant: the first leg is never on a strictly lower
/// level than the second. Orientation is normalized once at graph
/// construction and carried forward by every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge(pub LegId, pub LegId);

impl Edge {
    /// Returns both legs of the edge in storage order.
    pub fn legs(&self) -> [LegId; 2] {
        [self.0, self.1]
    }

    /// Returns whether the edge is incident to the provided leg.
    pub fn contains(&self, leg: LegId) -> bool {
        self.0 == leg || self.1 == leg
    }

    /// Returns the leg at the other end of the edge, if `leg` is incident.
    pub fn other(&self, leg: LegId) -> Option<LegId> {
        if self.0 == leg {
            Some(self.1)
        } else if self.1 == leg {
            Some(self.0)
        } else {
            None
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// A point of an enclosing stratum: point `index` on component `component`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StratumPoint {
    /// Index of the stratum component the point belongs to.
    pub component: usize,
    /// Index of the point within the component's signature.
    pub index: usize,
}

impl StratumPoint {
    /// Creates a stratum point from its component and point indices.
    pub fn new(component: usize, index: usize) -> Self {
        Self { component, index }
    }
}

impl fmt::Display for StratumPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.component, self.index)
    }
}
