//! Isomorphism search for level graphs and embeddings into strata.
//!
//! The crate provides the level-aware isomorphism engine for
//! [`strata_graph::LevelGraph`] and the [`EmbeddedLevelGraph`] type, which
//! couples a graph with the generalised stratum it degenerates and caches
//! the derived data (automorphisms, level strata, the two-level split).

#![deny(missing_docs)]

pub mod embedded;
pub mod isomorphism;
pub mod product;

pub use embedded::{EmbeddedLevelGraph, SplitData};
pub use isomorphism::{isomorphisms, Isomorphism};
pub use product::LazyProduct;
