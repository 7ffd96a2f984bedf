//! Edge types and path geometry

use egui::Pos2;
use serde::{Deserialize, Serialize};

use super::math_utils::flatten_cubic_bezier;
use super::socket::SocketPosition;
use super::{EdgeId, SocketId};
use crate::constants::edge::{BEZIER_SEGMENTS, CONTROL_POINT_ROUNDNESS};
use crate::error::GraphError;
use crate::scene::document::EdgeRecord;

/// Rendering style of an edge. The discriminants are the persisted codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Direct = 1,
    #[default]
    Bezier = 2,
}

impl EdgeType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for EdgeType {
    type Error = GraphError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(EdgeType::Direct),
            2 => Ok(EdgeType::Bezier),
            other => Err(GraphError::MalformedDocument(format!(
                "invalid edge type {}",
                other
            ))),
        }
    }
}

/// A directed connection between two sockets.
///
/// While the user drags a new connection the edge has no end socket and
/// follows `drag_position` instead. Such an edge is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub start_socket: SocketId,
    pub end_socket: Option<SocketId>,
    pub edge_type: EdgeType,
    pub drag_position: Option<Pos2>,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        start_socket: SocketId,
        end_socket: Option<SocketId>,
        edge_type: EdgeType,
    ) -> Self {
        Self {
            id,
            start_socket,
            end_socket,
            edge_type,
            drag_position: None,
        }
    }

    /// True while the edge is being dragged and has no end socket
    pub fn is_transient(&self) -> bool {
        self.end_socket.is_none()
    }

    /// Sockets this edge is registered with
    pub fn sockets(&self) -> impl Iterator<Item = SocketId> {
        std::iter::once(self.start_socket).chain(self.end_socket)
    }

    /// The socket on the other side of `socket`, if the edge touches it
    pub fn other_socket(&self, socket: SocketId) -> Option<SocketId> {
        if self.start_socket == socket {
            self.end_socket
        } else if self.end_socket == Some(socket) {
            Some(self.start_socket)
        } else {
            None
        }
    }

    pub fn connects(&self, socket: SocketId) -> bool {
        self.start_socket == socket || self.end_socket == Some(socket)
    }

    /// Builds the persisted record, `None` for a transient edge
    pub fn to_record(&self) -> Option<EdgeRecord> {
        self.end_socket.map(|end_socket| EdgeRecord {
            id: self.id,
            edge_type: self.edge_type.code(),
            start_socket: self.start_socket,
            end_socket,
        })
    }
}

/// Computes the polyline an edge is drawn along.
///
/// `start_position` is the anchor slot of the start socket. A bezier edge
/// leaving a socket away from its destination (a right socket going left or a
/// left socket going right) flips its horizontal control points and gains
/// vertical roundness so the curve loops around the node.
pub fn edge_path(
    edge_type: EdgeType,
    source: Pos2,
    destination: Pos2,
    start_position: Option<SocketPosition>,
) -> Vec<Pos2> {
    match edge_type {
        EdgeType::Direct => vec![source, destination],
        EdgeType::Bezier => {
            let dist = (destination.x - source.x) * 0.5;
            let mut cpx_s = dist;
            let mut cpx_d = -dist;
            let mut cpy_s = 0.0;
            let mut cpy_d = 0.0;

            if let Some(position) = start_position {
                let loops_back = (source.x > destination.x
                    && matches!(position, SocketPosition::RightTop | SocketPosition::RightBottom))
                    || (source.x < destination.x
                        && matches!(position, SocketPosition::LeftTop | SocketPosition::LeftBottom));

                if loops_back {
                    cpx_s = -cpx_s;
                    cpx_d = -cpx_d;
                    cpy_d = signum_or_zero(source.y - destination.y) * CONTROL_POINT_ROUNDNESS;
                    cpy_s = signum_or_zero(destination.y - source.y) * CONTROL_POINT_ROUNDNESS;
                }
            }

            flatten_cubic_bezier(
                source,
                Pos2::new(source.x + cpx_s, source.y + cpy_s),
                Pos2::new(destination.x + cpx_d, destination.y + cpy_d),
                destination,
                BEZIER_SEGMENTS,
            )
        }
    }
}

fn signum_or_zero(value: f32) -> f32 {
    if value == 0.0 {
        0.0
    } else {
        value.signum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_edge_has_no_record() {
        let edge = Edge::new(1, 10, None, EdgeType::Bezier);
        assert!(edge.is_transient());
        assert!(edge.to_record().is_none());
        assert_eq!(edge.sockets().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_other_socket() {
        let edge = Edge::new(1, 10, Some(20), EdgeType::Direct);
        assert_eq!(edge.other_socket(10), Some(20));
        assert_eq!(edge.other_socket(20), Some(10));
        assert_eq!(edge.other_socket(30), None);
    }

    #[test]
    fn test_edge_type_codes() {
        assert_eq!(EdgeType::try_from(1).unwrap(), EdgeType::Direct);
        assert_eq!(EdgeType::try_from(2).unwrap(), EdgeType::Bezier);
        assert!(EdgeType::try_from(3).is_err());
    }

    #[test]
    fn test_bezier_path_ends_at_anchors() {
        let source = Pos2::new(0.0, 0.0);
        let destination = Pos2::new(200.0, 100.0);
        let path = edge_path(EdgeType::Bezier, source, destination, Some(SocketPosition::RightTop));
        assert_eq!(path.len(), BEZIER_SEGMENTS + 1);
        assert_eq!(path[0], source);
        assert_eq!(*path.last().unwrap(), destination);
    }

    #[test]
    fn test_looping_bezier_leaves_to_the_right() {
        // Right socket whose destination is to its left: the curve first heads right
        let path = edge_path(
            EdgeType::Bezier,
            Pos2::new(100.0, 0.0),
            Pos2::new(0.0, 100.0),
            Some(SocketPosition::RightTop),
        );
        assert!(path[1].x > 100.0);
    }
}
