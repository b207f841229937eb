//! Graph, halo-mesh and distributed-graph containers.
//!
//! This crate provides the vertex/edge container layer consumed by the
//! coarsening, partitioning and ordering engines. It mirrors the role that
//! the original library's low-level graph and mesh structures play: a
//! compact, CSR-backed adjacency with optional vertex/edge weights, a
//! configurable base index, and — for the distributed variant — a
//! communicator, a per-process vertex distribution and a ghost-vertex
//! region.
//!
//! The library uses [rayon](https://docs.rs/rayon) to parallelize topology
//! construction and induction.

pub mod comm;
pub mod dist_graph;
pub mod graph;
pub mod halo;
pub mod index;
pub mod prelude;

pub use crate::comm::Comm;
pub use crate::dist_graph::DistGraph;
pub use crate::graph::csr::{Csr, CsrLayout, Target};
pub use crate::graph::graph::Graph;
pub use crate::halo::HaloMesh;
pub use crate::index::Idx;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("communication failure: {0}")]
    CommunicationFailure(String),
    #[error("internal invariant violated: {0}")]
    Inconsistent(String),
    #[error("invalid partitioning")]
    InvalidPartitioning,
    #[error("number of node values must be the same as node count")]
    InvalidNodeValues,
}
