//! Socket types and functionality for node connections

use log::warn;

use super::{EdgeId, NodeId, SocketId};
use crate::error::GraphError;
use crate::scene::document::SocketRecord;

/// Anchor slot of a socket on its node. The discriminants are the persisted codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketPosition {
    LeftTop = 1,
    LeftBottom = 2,
    LeftCenter = 3,
    RightTop = 4,
    RightBottom = 5,
    RightCenter = 6,
}

impl SocketPosition {
    /// Code written to documents
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_left(self) -> bool {
        matches!(
            self,
            SocketPosition::LeftTop | SocketPosition::LeftBottom | SocketPosition::LeftCenter
        )
    }

    pub fn is_right(self) -> bool {
        !self.is_left()
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, SocketPosition::LeftBottom | SocketPosition::RightBottom)
    }

    pub fn is_center(self) -> bool {
        matches!(self, SocketPosition::LeftCenter | SocketPosition::RightCenter)
    }

    /// Multi-edge policy for records written before `multi_edges` was stored:
    /// the right-hand top and bottom anchors were multi-edged.
    pub fn legacy_multi_edges(self) -> bool {
        matches!(self, SocketPosition::RightTop | SocketPosition::RightBottom)
    }
}

impl TryFrom<u8> for SocketPosition {
    type Error = GraphError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(SocketPosition::LeftTop),
            2 => Ok(SocketPosition::LeftBottom),
            3 => Ok(SocketPosition::LeftCenter),
            4 => Ok(SocketPosition::RightTop),
            5 => Ok(SocketPosition::RightBottom),
            6 => Ok(SocketPosition::RightCenter),
            other => Err(GraphError::MalformedDocument(format!(
                "invalid socket position {}",
                other
            ))),
        }
    }
}

/// A typed connection point owned by a node.
///
/// The socket only lists the ids of its incident edges. How many edges it may
/// hold is decided by the connect gesture, not by the socket itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Socket {
    pub id: SocketId,
    pub node: NodeId,
    pub index: usize,
    pub position: SocketPosition,
    pub socket_type: u32,
    pub is_input: bool,
    pub is_multi_edges: bool,
    pub count_on_this_node_side: usize,
    edges: Vec<EdgeId>,
}

impl Socket {
    /// Creates a socket of type 1 that accepts multiple edges
    pub fn new(
        id: SocketId,
        node: NodeId,
        index: usize,
        position: SocketPosition,
        is_input: bool,
    ) -> Self {
        Self {
            id,
            node,
            index,
            position,
            socket_type: 1,
            is_input,
            is_multi_edges: true,
            count_on_this_node_side: 1,
            edges: Vec::new(),
        }
    }

    pub fn with_socket_type(mut self, socket_type: u32) -> Self {
        self.socket_type = socket_type;
        self
    }

    pub fn with_multi_edges(mut self, multi_edges: bool) -> Self {
        self.is_multi_edges = multi_edges;
        self
    }

    /// Sets how many sockets share this side of the node (used for centering)
    pub fn with_count_on_side(mut self, count: usize) -> Self {
        self.count_on_this_node_side = count.max(1);
        self
    }

    pub fn is_output(&self) -> bool {
        !self.is_input
    }

    /// Incident edges in connection order
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn has_edges(&self) -> bool {
        !self.edges.is_empty()
    }

    pub fn has_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    /// Appends an edge. Multiplicity is enforced by the caller.
    pub fn add_edge(&mut self, edge: EdgeId) {
        self.edges.push(edge);
    }

    /// Removes an edge from the incident list, returning whether it was there
    pub fn remove_edge(&mut self, edge: EdgeId) -> bool {
        match self.edges.iter().position(|&e| e == edge) {
            Some(index) => {
                self.edges.remove(index);
                true
            }
            None => {
                warn!(
                    "Socket {} asked to remove edge {} which it does not hold",
                    self.id, edge
                );
                false
            }
        }
    }

    pub(crate) fn clear_edges(&mut self) {
        self.edges.clear();
    }

    /// Builds the persisted record
    pub fn to_record(&self) -> SocketRecord {
        SocketRecord {
            id: self.id,
            index: self.index,
            multi_edges: Some(self.is_multi_edges),
            position: self.position.code(),
            socket_type: self.socket_type,
        }
    }

    /// Restores a socket from its record under a live id.
    ///
    /// When the record predates the `multi_edges` field the policy is inferred
    /// from the anchor position.
    pub fn from_record(
        record: &SocketRecord,
        id: SocketId,
        node: NodeId,
        is_input: bool,
        count_on_side: usize,
    ) -> Result<Self, GraphError> {
        let position = SocketPosition::try_from(record.position)?;
        let multi_edges = record
            .multi_edges
            .unwrap_or_else(|| position.legacy_multi_edges());

        Ok(Socket::new(id, node, record.index, position, is_input)
            .with_socket_type(record.socket_type)
            .with_multi_edges(multi_edges)
            .with_count_on_side(count_on_side))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: u8, multi_edges: Option<bool>) -> SocketRecord {
        SocketRecord {
            id: 7,
            index: 0,
            multi_edges,
            position,
            socket_type: 2,
        }
    }

    #[test]
    fn test_missing_multi_edges_inferred_from_position() {
        let right = Socket::from_record(&record(4, None), 1, 1, false, 1).unwrap();
        assert!(right.is_multi_edges);

        let right_bottom = Socket::from_record(&record(5, None), 1, 1, false, 1).unwrap();
        assert!(right_bottom.is_multi_edges);

        let left = Socket::from_record(&record(2, None), 1, 1, true, 1).unwrap();
        assert!(!left.is_multi_edges);

        // Centered anchors were never multi-edged by default
        let right_center = Socket::from_record(&record(6, None), 1, 1, false, 1).unwrap();
        assert!(!right_center.is_multi_edges);
    }

    #[test]
    fn test_explicit_multi_edges_wins() {
        let socket = Socket::from_record(&record(4, Some(false)), 1, 1, false, 1).unwrap();
        assert!(!socket.is_multi_edges);
        assert_eq!(socket.socket_type, 2);
    }

    #[test]
    fn test_invalid_position_rejected() {
        let err = Socket::from_record(&record(9, None), 1, 1, false, 1).unwrap_err();
        assert!(matches!(err, GraphError::MalformedDocument(_)));
    }

    #[test]
    fn test_remove_missing_edge_is_tolerated() {
        let mut socket = Socket::new(1, 1, 0, SocketPosition::LeftTop, true);
        socket.add_edge(10);
        assert!(!socket.remove_edge(11));
        assert!(socket.remove_edge(10));
        assert!(!socket.remove_edge(10));
        assert!(!socket.has_edges());
    }

    #[test]
    fn test_record_keeps_policy() {
        let socket = Socket::new(3, 1, 2, SocketPosition::RightBottom, false)
            .with_socket_type(4)
            .with_multi_edges(false);
        let rec = socket.to_record();
        assert_eq!(rec.id, 3);
        assert_eq!(rec.index, 2);
        assert_eq!(rec.position, 5);
        assert_eq!(rec.multi_edges, Some(false));
        assert_eq!(rec.socket_type, 4);
    }
}
