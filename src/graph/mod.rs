//! Call graph model building, persistence and traversal.

pub mod builder;
pub mod query;
pub mod store;

pub use builder::{DIRECT_CALL, GRAPH_VERSION, GraphBuilder, merge_verified_connections};
pub use query::{FocusTargets, Subgraph};
pub use store::{GRAPH_FILE, GraphStore};
