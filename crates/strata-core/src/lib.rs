//! Core vocabulary of the strata level-graph engine.
//!
//! This crate defines the strongly typed identifiers, the signature of a
//! stratum of k-differentials, the structured error type shared by every
//! strata crate, residue condition matrices, and the [`Stratum`] trait
//! through which level graphs see the stratum they are embedded into.

#![deny(missing_docs)]

pub mod errors;
pub mod ids;
pub mod residue;
pub mod sig;
pub mod stratum;

pub use errors::{
    graph_error, iso_error, residue_error, signature_error, ErrorInfo, StrataError,
};
pub use ids::{Edge, LegId, StratumPoint, VertexId};
pub use residue::{matrix_from_res_conditions, ResidueMatrix};
pub use sig::KSignature;
pub use stratum::Stratum;
