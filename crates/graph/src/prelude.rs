pub use crate::comm::Comm;
pub use crate::dist_graph::DistGraph;
pub use crate::graph::csr::{Csr, CsrLayout, Target};
pub use crate::graph::graph::Graph;
pub use crate::halo::HaloMesh;
pub use crate::index::Idx;
pub use crate::Error;
