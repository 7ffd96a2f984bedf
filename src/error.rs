//! Error types shared by the scene, history, clipboard and file layers

use thiserror::Error;

use crate::nodes::{EdgeId, NodeId, SocketId};

/// Everything that can go wrong while editing, persisting or evaluating a graph.
///
/// Redundant removals (an edge removed twice, a socket asked to drop an edge
/// it never held) are not errors; they are logged and ignored.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The document is missing required fields or carries invalid values
    #[error("malformed graph document: {0}")]
    MalformedDocument(String),

    /// An edge points at a socket that the document does not define
    #[error("edge {edge} references socket {socket} which is not part of the document")]
    DanglingReference { edge: EdgeId, socket: SocketId },

    /// Clipboard text could not be read as a graph document
    #[error("clipboard does not contain a graph: {0}")]
    InvalidClipboardText(String),

    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("socket {0} does not exist")]
    UnknownSocket(SocketId),

    #[error("op code {0} is already registered")]
    DuplicateOpCode(u32),

    #[error("no node type registered for op code {0}")]
    UnknownOpCode(u32),

    #[error("input {index} of node {node} is not connected")]
    UnconnectedInput { node: NodeId, index: usize },

    #[error("cycle detected while evaluating node {0}")]
    Cycle(NodeId),

    #[error("evaluation of node {node} failed: {reason}")]
    Evaluation { node: NodeId, reason: String },

    #[error("no file name has been set, save under a new name instead")]
    NoFilePath,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::MalformedDocument(err.to_string())
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, GraphError>;
