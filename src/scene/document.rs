//! Persisted graph document
//!
//! Files and clipboard payloads share this shape. Record field order is the
//! key order written to JSON.

use std::collections::HashSet;

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphError, Result};
use crate::nodes::{EdgeType, SocketPosition};

/// Maps ids read from a document to the ids of the live objects built from them
pub type IdMap = std::collections::HashMap<u64, u64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketRecord {
    pub id: u64,
    pub index: usize,
    /// Absent in files written before the policy was persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_edges: Option<bool>,
    pub position: u8,
    pub socket_type: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: u64,
    pub title: String,
    pub pos_x: f32,
    pub pos_y: f32,
    pub inputs: Vec<SocketRecord>,
    pub outputs: Vec<SocketRecord>,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_code: Option<u32>,
}

impl NodeRecord {
    pub fn position(&self) -> Pos2 {
        Pos2::new(self.pos_x, self.pos_y)
    }

    pub fn sockets(&self) -> impl Iterator<Item = &SocketRecord> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: u64,
    pub edge_type: u8,
    pub start_socket: u64,
    pub end_socket: u64,
}

/// A whole graph, or a selected part of one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    /// Parses a document from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a document out of an already parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Checks the whole document before any of it is applied: socket positions
    /// and edge types must be known codes, socket ids unique, and every edge
    /// must reference sockets defined by the document's nodes.
    pub fn validate(&self) -> Result<()> {
        let mut sockets = HashSet::new();

        for node in &self.nodes {
            for socket in node.sockets() {
                SocketPosition::try_from(socket.position)?;
                if !sockets.insert(socket.id) {
                    return Err(GraphError::MalformedDocument(format!(
                        "socket id {} appears more than once",
                        socket.id
                    )));
                }
            }
        }

        for edge in &self.edges {
            EdgeType::try_from(edge.edge_type)?;
            for socket in [edge.start_socket, edge.end_socket] {
                if !sockets.contains(&socket) {
                    return Err(GraphError::DanglingReference {
                        edge: edge.id,
                        socket,
                    });
                }
            }
        }

        Ok(())
    }

    /// Bounding box of the node positions, `None` without nodes
    pub fn bounding_box(&self) -> Option<Rect> {
        let first = self.nodes.first()?.position();
        let (mut min_x, mut max_x) = (first.x, first.x);
        let (mut min_y, mut max_y) = (first.y, first.y);

        for node in &self.nodes[1..] {
            min_x = min_x.min(node.pos_x);
            max_x = max_x.max(node.pos_x);
            min_y = min_y.min(node.pos_y);
            max_y = max_y.max(node.pos_y);
        }

        Some(Rect::from_min_max(
            Pos2::new(min_x, min_y),
            Pos2::new(max_x, max_y),
        ))
    }
}
