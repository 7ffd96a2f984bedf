//! Node system - graph entities and node type registration

pub mod calculator;
pub mod edge;
pub mod factory;
pub mod layout;
pub mod math_utils;
pub mod node;
pub mod socket;

/// Unique identifier for a node
pub type NodeId = u64;

/// Unique identifier for a socket
pub type SocketId = u64;

/// Unique identifier for an edge
pub type EdgeId = u64;

pub use edge::{edge_path, Edge, EdgeType};
pub use factory::{NodeBehavior, NodeRegistry, NodeTemplate};
pub use layout::{DefaultSocketLayout, SocketLayout};
pub use node::{Node, SocketSpec};
pub use socket::{Socket, SocketPosition};
