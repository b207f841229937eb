//! Recursive-bisection partitioning (spec §4.4): plain K-way mapping,
//! K-way mapping with overlap (vertex separator), and the distributed
//! driver built on top of them.

pub mod bipart;
pub mod cost;
pub mod distributed;
pub mod error;
pub mod rb;
pub mod recursion;
pub mod separator;
pub mod strat;

pub use bipart::Bipart;
pub use cost::{is_balanced, wgraph_cost, WgraphCost};
pub use distributed::distributed_map;
pub use error::Error;
pub use rb::partition;
pub use recursion::{partition_with_overlap, partition_with_overlap_via_strategy};
pub use separator::separate_greedy;
pub use strat::{default_strategy, separate_via_strategy, vertex_separator_table, SeparatorState, SeparatorTable};
