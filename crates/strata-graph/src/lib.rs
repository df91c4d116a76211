//! Level graphs of strata of k-differentials.
//!
//! The central type is [`LevelGraph`], an immutable stable graph with a
//! level on each vertex and a pole order on each leg. Around it sit the
//! opt-in admissibility checks, the contraction operators (horizontal and
//! vertical squishes, delta), the auxiliary connectivity graph, legality of
//! the graph as a degeneration, and the generalised stratum of a single
//! level.

#![deny(missing_docs)]

pub mod aux_graph;
pub mod checks;
pub mod graph;
pub mod legal;
pub mod serialization;
pub mod squish;
pub mod stratum_level;

pub use aux_graph::{AuxEdge, AuxEdgeLabel, AuxGraph, AuxNode};
pub use checks::{AdmissibilityIssue, AdmissibilityReport};
pub use graph::LevelGraph;
pub use serialization::LevelGraphData;
pub use squish::{SquishOutcome, SquishWarning};
pub use stratum_level::LevelStratum;
