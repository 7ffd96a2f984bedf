//! Nodle scene library
//!
//! Headless core of a node-graph editor: the scene model with sockets, nodes
//! and edges, drag-to-connect and cut-line gestures, undo/redo history,
//! clipboard and save/load.

pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod logging;
pub mod nodes;
pub mod scene;

// Re-export commonly used types
pub use config::EditorConfig;
pub use editor::{FileManager, HitTarget, InteractionManager, InteractionMode, Key, Modifiers};
pub use error::{GraphError, Result};
pub use nodes::{
    Edge, EdgeId, EdgeType, Node, NodeId, NodeRegistry, NodeTemplate, Socket, SocketId,
    SocketPosition, SocketSpec,
};
pub use scene::{GraphDocument, History, Scene, SceneClipboard, Selection};
