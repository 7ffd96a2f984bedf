//! Socket anchor geometry
//!
//! Renderers place socket glyphs and edge endpoints with these offsets, so the
//! functions here must be pure in their inputs.

use std::fmt;

use egui::Vec2;

use super::socket::SocketPosition;
use crate::constants::node as metrics;

/// Geometry contract supplied per node type
pub trait SocketLayout: fmt::Debug {
    /// Offset of a socket anchor relative to the node origin
    fn socket_offset(&self, index: usize, position: SocketPosition, count_on_side: usize) -> Vec2;

    /// Outer size of the node body
    fn size(&self) -> Vec2;
}

/// Title-bar node layout: inputs and outputs stacked along the left and right
/// edges, either from the top, from the bottom, or centered in the body.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSocketLayout {
    pub width: f32,
    pub height: f32,
    pub edge_roundness: f32,
    pub edge_padding: f32,
    pub title_height: f32,
    pub title_vertical_padding: f32,
    pub socket_spacing: f32,
}

impl Default for DefaultSocketLayout {
    fn default() -> Self {
        Self {
            width: metrics::DEFAULT_WIDTH,
            height: metrics::DEFAULT_HEIGHT,
            edge_roundness: metrics::EDGE_ROUNDNESS,
            edge_padding: metrics::EDGE_PADDING,
            title_height: metrics::TITLE_HEIGHT,
            title_vertical_padding: metrics::TITLE_VERTICAL_PADDING,
            socket_spacing: metrics::SOCKET_SPACING,
        }
    }
}

impl DefaultSocketLayout {
    /// Creates a layout with the given body size and default paddings
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl SocketLayout for DefaultSocketLayout {
    fn socket_offset(&self, index: usize, position: SocketPosition, count_on_side: usize) -> Vec2 {
        let x = if position.is_left() { 0.0 } else { self.width };
        let index = index as f32;

        let y = if position.is_bottom() {
            // Counted upwards from the bottom edge
            self.height - self.edge_roundness - self.title_vertical_padding
                - index * self.socket_spacing
        } else if position.is_center() {
            let count = count_on_side.max(1);
            let top_offset =
                self.title_height + 2.0 * self.title_vertical_padding + self.edge_padding;
            let available_height = self.height - top_offset;

            let mut y = top_offset + available_height / 2.0 + (index - 0.5) * self.socket_spacing;
            if count > 1 {
                y -= self.socket_spacing * (count - 1) as f32 / 2.0;
            }
            y
        } else {
            self.title_height + self.title_vertical_padding + self.edge_roundness
                + index * self.socket_spacing
        };

        Vec2::new(x, y)
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_sockets_stack_downwards() {
        let layout = DefaultSocketLayout::default();
        let first = layout.socket_offset(0, SocketPosition::RightTop, 2);
        let second = layout.socket_offset(1, SocketPosition::RightTop, 2);
        assert_eq!(first, Vec2::new(180.0, 38.0));
        assert_eq!(second.y - first.y, 22.0);
    }

    #[test]
    fn test_bottom_sockets_stack_upwards() {
        let layout = DefaultSocketLayout::default();
        let first = layout.socket_offset(0, SocketPosition::LeftBottom, 2);
        let second = layout.socket_offset(1, SocketPosition::LeftBottom, 2);
        assert_eq!(first, Vec2::new(0.0, 226.0));
        assert_eq!(first.y - second.y, 22.0);
    }

    #[test]
    fn test_center_sockets_are_symmetric() {
        let layout = DefaultSocketLayout::with_size(160.0, 74.0);
        let a = layout.socket_offset(0, SocketPosition::LeftCenter, 2);
        let b = layout.socket_offset(1, SocketPosition::LeftCenter, 2);
        let single = layout.socket_offset(0, SocketPosition::LeftCenter, 1);
        assert_eq!((a.y + b.y) / 2.0, single.y);
        assert_eq!(b.y - a.y, 22.0);
    }

    #[test]
    fn test_offsets_are_deterministic() {
        let layout = DefaultSocketLayout::default();
        assert_eq!(
            layout.socket_offset(3, SocketPosition::RightCenter, 4),
            layout.socket_offset(3, SocketPosition::RightCenter, 4)
        );
    }
}
