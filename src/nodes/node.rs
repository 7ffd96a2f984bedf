//! Node types and core node functionality

use std::rc::Rc;

use egui::{Pos2, Rect, Vec2};
use serde_json::Value;

use super::layout::{DefaultSocketLayout, SocketLayout};
use super::socket::{Socket, SocketPosition};
use super::{NodeId, SocketId};

/// Describes one socket to create on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketSpec {
    pub socket_type: u32,
    pub position: SocketPosition,
    pub multi_edges: bool,
}

impl SocketSpec {
    /// Input socket on the bottom left that holds a single edge
    pub fn input(socket_type: u32) -> Self {
        Self {
            socket_type,
            position: SocketPosition::LeftBottom,
            multi_edges: false,
        }
    }

    /// Output socket on the top right that may fan out to many edges
    pub fn output(socket_type: u32) -> Self {
        Self {
            socket_type,
            position: SocketPosition::RightTop,
            multi_edges: true,
        }
    }

    pub fn with_position(mut self, position: SocketPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_multi_edges(mut self, multi_edges: bool) -> Self {
        self.multi_edges = multi_edges;
        self
    }
}

/// A vertex of the graph.
///
/// The node lists the ids of its sockets; the sockets themselves live in the
/// scene's socket arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    pub position: Pos2,
    pub inputs: Vec<SocketId>,
    pub outputs: Vec<SocketId>,
    /// Opaque payload owned by the node type, `Value::Null` when unused
    pub content: Value,
    /// Registry key of the node type, if it was created from a template
    pub op_code: Option<u32>,
    layout: Rc<dyn SocketLayout>,
}

impl Node {
    /// Creates a node without sockets using the default layout
    pub fn new(id: NodeId, title: impl Into<String>, position: Pos2) -> Self {
        Self {
            id,
            title: title.into(),
            position,
            inputs: vec![],
            outputs: vec![],
            content: Value::Null,
            op_code: None,
            layout: Rc::new(DefaultSocketLayout::default()),
        }
    }

    pub fn with_layout(mut self, layout: Rc<dyn SocketLayout>) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }

    pub fn with_op_code(mut self, op_code: Option<u32>) -> Self {
        self.op_code = op_code;
        self
    }

    pub fn layout(&self) -> &dyn SocketLayout {
        self.layout.as_ref()
    }

    /// Anchor offset of one of this node's sockets relative to the node origin
    pub fn socket_offset(&self, socket: &Socket) -> Vec2 {
        self.layout
            .socket_offset(socket.index, socket.position, socket.count_on_this_node_side)
    }

    /// Anchor of one of this node's sockets in scene coordinates
    pub fn socket_scene_position(&self, socket: &Socket) -> Pos2 {
        self.position + self.socket_offset(socket)
    }

    /// Returns the bounding rectangle of the node
    pub fn get_rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.layout.size())
    }

    /// Input sockets followed by output sockets
    pub fn sockets(&self) -> impl Iterator<Item = SocketId> + '_ {
        self.inputs.iter().chain(self.outputs.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_scene_position_adds_node_origin() {
        let node = Node::new(1, "Test", Pos2::new(100.0, 50.0));
        let socket = Socket::new(2, 1, 0, SocketPosition::RightTop, false);
        assert_eq!(node.socket_scene_position(&socket), Pos2::new(280.0, 88.0));
    }

    #[test]
    fn test_custom_layout_size() {
        let node = Node::new(1, "Small", Pos2::ZERO)
            .with_layout(Rc::new(DefaultSocketLayout::with_size(160.0, 74.0)));
        assert_eq!(node.get_rect().size(), Vec2::new(160.0, 74.0));
    }

    #[test]
    fn test_socket_spec_defaults() {
        let input = SocketSpec::input(1);
        assert!(!input.multi_edges);
        assert!(input.position.is_left());

        let output = SocketSpec::output(1);
        assert!(output.multi_edges);
        assert!(output.position.is_right());
    }
}
