//! Pointer and keyboard interaction (selection, dragging, connecting, cutting)
//!
//! The view resolves what lies under the pointer and feeds presses, moves,
//! releases and keys to the [`InteractionManager`], which turns them into
//! scene mutations and records one history step per finished gesture.

use std::collections::HashMap;

use egui::{Pos2, Rect, Vec2};
use log::{debug, warn};

use crate::config::EditorConfig;
use crate::constants::history::{EDGES_CUT, EDGE_CREATED, NODE_MOVED, SELECTION_CHANGED};
use crate::constants::interaction::EDGE_DRAG_START_THRESHOLD;
use crate::error::Result;
use crate::nodes::{EdgeId, EdgeType, NodeId, SocketId};
use crate::scene::{Scene, Selection};

/// Current gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// A transient edge follows the pointer
    DraggingEdge,
    /// A cut line is being drawn
    Cutting,
    /// Selected nodes follow the pointer
    MovingNodes,
    /// A selection rectangle is being drawn
    RubberBand,
}

/// What the pointer is over, as resolved by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Empty,
    Socket(SocketId),
    Node(NodeId),
    Edge(EdgeId),
}

/// Modifier keys held during a press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Adds to or toggles within the selection
    pub shift: bool,
    /// Turns a press on empty canvas into a cut line
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Escape,
}

/// Interaction state machine over a [`Scene`]
#[derive(Debug, Clone)]
pub struct InteractionManager {
    pub selection: Selection,
    /// Set by the view while a text field has focus; Delete is ignored then
    pub editing: bool,
    mode: InteractionMode,
    drag_edge: Option<EdgeId>,
    drag_start_socket: Option<SocketId>,
    press_position: Pos2,
    last_scene_mouse_pos: Pos2,
    cut_points: Vec<Pos2>,
    drag_offsets: HashMap<NodeId, Vec2>,
    nodes_moved: bool,
    box_selection_start: Option<Pos2>,
    box_selection_end: Option<Pos2>,
    box_additive: bool,
    edge_drag_threshold: f32,
    edge_type: EdgeType,
}

impl InteractionManager {
    pub fn new() -> Self {
        Self {
            selection: Selection::new(),
            editing: false,
            mode: InteractionMode::Idle,
            drag_edge: None,
            drag_start_socket: None,
            press_position: Pos2::ZERO,
            last_scene_mouse_pos: Pos2::ZERO,
            cut_points: Vec::new(),
            drag_offsets: HashMap::new(),
            nodes_moved: false,
            box_selection_start: None,
            box_selection_end: None,
            box_additive: false,
            edge_drag_threshold: EDGE_DRAG_START_THRESHOLD,
            edge_type: EdgeType::default(),
        }
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            edge_drag_threshold: config.edge_drag_threshold,
            edge_type: config.default_edge_type,
            ..Self::new()
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Transient edge being dragged, if any
    pub fn drag_edge(&self) -> Option<EdgeId> {
        self.drag_edge
    }

    /// Points of the cut line drawn so far
    pub fn cut_points(&self) -> &[Pos2] {
        &self.cut_points
    }

    /// Last pointer position in scene coordinates, used as the paste target
    pub fn last_scene_mouse_pos(&self) -> Pos2 {
        self.last_scene_mouse_pos
    }

    /// Current rubber band rectangle
    pub fn box_selection_rect(&self) -> Option<Rect> {
        match (self.box_selection_start, self.box_selection_end) {
            (Some(start), Some(end)) => Some(Rect::from_two_pos(start, end)),
            _ => None,
        }
    }

    // ---- Pointer events ----

    /// Pointer press at `position` over `target`
    pub fn press(&mut self, scene: &mut Scene, position: Pos2, target: HitTarget, modifiers: Modifiers) {
        self.last_scene_mouse_pos = position;

        // Second click of a click-click connection. A click that does not land
        // on a socket drops the edge and is handled as a fresh press.
        if self.mode == InteractionMode::DraggingEdge {
            self.finish_edge_drag(scene, target);
            if matches!(target, HitTarget::Socket(_)) {
                return;
            }
        }
        if self.mode != InteractionMode::Idle {
            self.cancel(scene);
        }
        self.press_position = position;

        match target {
            HitTarget::Socket(socket) => self.start_edge_drag(scene, socket, position),
            HitTarget::Empty if modifiers.ctrl => {
                debug!("Cut line started at {:?}", position);
                self.cut_points.clear();
                self.cut_points.push(position);
                self.mode = InteractionMode::Cutting;
            }
            HitTarget::Empty => {
                self.box_additive = modifiers.shift;
                self.box_selection_start = Some(position);
                self.box_selection_end = Some(position);
                self.mode = InteractionMode::RubberBand;
            }
            HitTarget::Node(node) => {
                if modifiers.shift || !self.selection.contains_node(node) {
                    self.selection.select_node(node, modifiers.shift);
                }
                self.start_node_drag(scene, position);
            }
            HitTarget::Edge(edge) => self.selection.select_edge(edge, modifiers.shift),
        }
    }

    /// Pointer moved to `position`
    pub fn move_to(&mut self, scene: &mut Scene, position: Pos2) {
        self.last_scene_mouse_pos = position;

        match self.mode {
            InteractionMode::Idle => {}
            InteractionMode::DraggingEdge => {
                if let Some(edge) = self.drag_edge {
                    scene.set_edge_drag_position(edge, position);
                }
            }
            InteractionMode::Cutting => self.cut_points.push(position),
            InteractionMode::MovingNodes => {
                for (&node, &offset) in &self.drag_offsets {
                    scene.set_node_position(node, position + offset);
                }
                self.nodes_moved = true;
            }
            InteractionMode::RubberBand => self.box_selection_end = Some(position),
        }
    }

    /// Pointer released at `position` over `target`
    pub fn release(&mut self, scene: &mut Scene, position: Pos2, target: HitTarget) {
        self.last_scene_mouse_pos = position;

        match self.mode {
            InteractionMode::Idle => {}
            InteractionMode::DraggingEdge => {
                if (position - self.press_position).length() <= self.edge_drag_threshold {
                    debug!("Release close to the drag start, waiting for a second click");
                    return;
                }
                self.finish_edge_drag(scene, target);
            }
            InteractionMode::Cutting => {
                self.cut_points.push(position);
                self.cut_intersecting_edges(scene);
                self.mode = InteractionMode::Idle;
            }
            InteractionMode::MovingNodes => {
                if self.nodes_moved {
                    scene.store_history(NODE_MOVED, true);
                }
                self.end_node_drag();
            }
            InteractionMode::RubberBand => {
                self.box_selection_end = Some(position);
                self.complete_box_selection(scene);
            }
        }
    }

    /// Keyboard shortcut. Returns whether the key was handled.
    pub fn key_press(&mut self, scene: &mut Scene, key: Key) -> bool {
        match key {
            Key::Delete if self.editing => false,
            Key::Delete => {
                self.delete_selected(scene);
                true
            }
            Key::Escape => {
                let active = self.mode != InteractionMode::Idle;
                self.cancel(scene);
                active
            }
        }
    }

    /// Abandons the current gesture without touching the history
    pub fn cancel(&mut self, scene: &mut Scene) {
        match self.mode {
            InteractionMode::Idle => {}
            InteractionMode::DraggingEdge => {
                if let Some(edge) = self.drag_edge.take() {
                    scene.remove_edge(edge);
                }
                self.drag_start_socket = None;
            }
            InteractionMode::Cutting => self.cut_points.clear(),
            InteractionMode::MovingNodes => {
                for (&node, &offset) in &self.drag_offsets {
                    scene.set_node_position(node, self.press_position + offset);
                }
                self.end_node_drag();
            }
            InteractionMode::RubberBand => {
                self.box_selection_start = None;
                self.box_selection_end = None;
            }
        }
        debug!("Cancelled {:?}", self.mode);
        self.mode = InteractionMode::Idle;
    }

    // ---- Edge dragging ----

    fn start_edge_drag(&mut self, scene: &mut Scene, socket: SocketId, position: Pos2) {
        match scene.add_edge(socket, None, self.edge_type) {
            Ok(edge) => {
                scene.set_edge_drag_position(edge, position);
                debug!("Start dragging edge {} from socket {}", edge, socket);
                self.drag_edge = Some(edge);
                self.drag_start_socket = Some(socket);
                self.mode = InteractionMode::DraggingEdge;
            }
            Err(err) => warn!("Cannot start an edge drag: {}", err),
        }
    }

    /// Resolves an edge drag over `target`. Returns the new edge if one was created.
    ///
    /// Dropping on another socket replaces the existing edges of whichever
    /// endpoint accepts a single edge, release socket first.
    pub fn finish_edge_drag(&mut self, scene: &mut Scene, target: HitTarget) -> Option<EdgeId> {
        self.mode = InteractionMode::Idle;
        let start = self.drag_start_socket.take();
        if let Some(edge) = self.drag_edge.take() {
            scene.remove_edge(edge);
        }

        let (start, end) = match (start, target) {
            (Some(start), HitTarget::Socket(end)) if end != start => (start, end),
            _ => {
                debug!("Edge drag ended without a target socket");
                return None;
            }
        };

        for socket in [end, start] {
            if scene.socket(socket).is_some_and(|s| !s.is_multi_edges) {
                scene.remove_all_edges(socket);
            }
        }

        match scene.add_edge(start, Some(end), self.edge_type) {
            Ok(edge) => {
                scene.store_history(EDGE_CREATED, true);
                Some(edge)
            }
            Err(err) => {
                warn!("Could not connect socket {} to socket {}: {}", start, end, err);
                None
            }
        }
    }

    // ---- Cutting ----

    /// Removes every edge crossed by the cut line and records one history step
    pub fn cut_intersecting_edges(&mut self, scene: &mut Scene) -> usize {
        let mut removed = 0;
        for segment in self.cut_points.windows(2) {
            for edge in scene.edges_intersecting_segment(segment[0], segment[1]) {
                if scene.remove_edge(edge) {
                    removed += 1;
                }
            }
        }
        debug!("Cut line removed {} edges", removed);

        self.cut_points.clear();
        self.selection.retain(|n| scene.node(n).is_some(), |e| scene.edge(e).is_some());
        scene.store_history(EDGES_CUT, true);
        removed
    }

    // ---- Node dragging ----

    fn start_node_drag(&mut self, scene: &Scene, drag_start: Pos2) {
        self.drag_offsets = self
            .selection
            .nodes
            .iter()
            .filter_map(|&id| scene.node(id).map(|node| (id, node.position - drag_start)))
            .collect();
        self.nodes_moved = false;
        if !self.drag_offsets.is_empty() {
            self.mode = InteractionMode::MovingNodes;
        }
    }

    fn end_node_drag(&mut self) {
        self.drag_offsets.clear();
        self.nodes_moved = false;
        self.mode = InteractionMode::Idle;
    }

    // ---- Selection ----

    /// Nodes touched by the rubber band, for highlighting while it is drawn
    pub fn box_selection_preview(&self, scene: &Scene) -> Vec<NodeId> {
        self.box_selection_rect()
            .map(|rect| scene.nodes_in_rect(rect))
            .unwrap_or_default()
    }

    /// Applies the rubber band to the selection. A changed selection is
    /// recorded in the history without marking the scene modified.
    pub fn complete_box_selection(&mut self, scene: &mut Scene) {
        self.mode = InteractionMode::Idle;
        let Some(rect) = self.box_selection_rect() else {
            return;
        };
        self.box_selection_start = None;
        self.box_selection_end = None;

        let before = self.selection.clone();
        if !self.box_additive {
            self.selection.clear();
        }
        self.selection.nodes.extend(scene.nodes_in_rect(rect));
        self.selection.edges.extend(scene.edges_in_rect(rect));

        if self.selection != before {
            debug!(
                "Rubber band selected {} nodes and {} edges",
                self.selection.nodes.len(),
                self.selection.edges.len()
            );
            scene.store_history(SELECTION_CHANGED, false);
        }
    }

    /// Delete gesture on the current selection
    pub fn delete_selected(&mut self, scene: &mut Scene) {
        scene.delete_selected(&self.selection);
        self.selection.clear();
    }

    // ---- Clipboard and history ----

    pub fn copy(&mut self, scene: &mut Scene) -> Result<String> {
        scene.clipboard().copy_to_text(&self.selection)
    }

    pub fn cut(&mut self, scene: &mut Scene) -> Result<String> {
        let text = scene.clipboard().cut_to_text(&self.selection)?;
        self.selection.clear();
        Ok(text)
    }

    /// Pastes at the last pointer position and selects the pasted nodes
    pub fn paste(&mut self, scene: &mut Scene, text: &str) -> Result<Vec<NodeId>> {
        let pasted = scene
            .clipboard()
            .paste_text(text, self.last_scene_mouse_pos)?;
        if !pasted.is_empty() {
            self.selection = Selection::from_nodes(pasted.iter().copied());
        }
        Ok(pasted)
    }

    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        self.cancel(scene);
        let undone = scene.undo();
        self.prune_selection(scene);
        undone
    }

    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        self.cancel(scene);
        let redone = scene.redo();
        self.prune_selection(scene);
        redone
    }

    fn prune_selection(&mut self, scene: &Scene) {
        self.selection
            .retain(|n| scene.node(n).is_some(), |e| scene.edge(e).is_some());
    }
}

impl Default for InteractionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::SocketSpec;

    /// Two nodes side by side: A has one output, B one input
    fn two_nodes() -> (Scene, SocketId, SocketId) {
        let mut scene = Scene::new();
        let a = scene.add_node("A", Pos2::new(0.0, 0.0), &[], &[SocketSpec::output(1)]);
        let b = scene.add_node("B", Pos2::new(400.0, 0.0), &[SocketSpec::input(1)], &[]);
        let out = scene.node(a).unwrap().outputs[0];
        let inp = scene.node(b).unwrap().inputs[0];
        scene.store_initial_history_stamp();
        (scene, out, inp)
    }

    #[test]
    fn test_drag_creates_transient_edge() {
        let (mut scene, out, _) = two_nodes();
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(180.0, 38.0), HitTarget::Socket(out), Modifiers::NONE);
        assert_eq!(interaction.mode(), InteractionMode::DraggingEdge);
        let edge = interaction.drag_edge().unwrap();
        assert!(scene.edge(edge).unwrap().is_transient());
        assert!(scene.serialize().edges.is_empty());

        interaction.move_to(&mut scene, Pos2::new(250.0, 80.0));
        assert_eq!(scene.edge(edge).unwrap().drag_position, Some(Pos2::new(250.0, 80.0)));
    }

    #[test]
    fn test_release_on_empty_discards_without_history() {
        let (mut scene, out, _) = two_nodes();
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(180.0, 38.0), HitTarget::Socket(out), Modifiers::NONE);
        interaction.release(&mut scene, Pos2::new(300.0, 300.0), HitTarget::Empty);

        assert_eq!(interaction.mode(), InteractionMode::Idle);
        assert_eq!(scene.edge_count(), 0);
        assert!(scene.socket(out).unwrap().edges().is_empty());
        assert_eq!(scene.history().len(), 1);
    }

    #[test]
    fn test_release_on_same_socket_discards() {
        let (mut scene, out, _) = two_nodes();
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(180.0, 38.0), HitTarget::Socket(out), Modifiers::NONE);
        interaction.release(&mut scene, Pos2::new(300.0, 38.0), HitTarget::Socket(out));
        assert_eq!(scene.edge_count(), 0);
    }

    #[test]
    fn test_click_click_connects() {
        let (mut scene, out, inp) = two_nodes();
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(180.0, 38.0), HitTarget::Socket(out), Modifiers::NONE);
        interaction.release(&mut scene, Pos2::new(182.0, 39.0), HitTarget::Socket(out));
        assert_eq!(interaction.mode(), InteractionMode::DraggingEdge);

        interaction.press(&mut scene, Pos2::new(400.0, 226.0), HitTarget::Socket(inp), Modifiers::NONE);
        assert_eq!(interaction.mode(), InteractionMode::Idle);
        assert_eq!(scene.edge_count(), 1);
        assert_eq!(
            scene.history().current().unwrap().description,
            EDGE_CREATED
        );
    }

    #[test]
    fn test_escape_cancels_drag() {
        let (mut scene, out, _) = two_nodes();
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(180.0, 38.0), HitTarget::Socket(out), Modifiers::NONE);
        assert!(interaction.key_press(&mut scene, Key::Escape));
        assert_eq!(scene.edge_count(), 0);
        assert_eq!(scene.history().len(), 1);
    }

    #[test]
    fn test_delete_ignored_while_editing() {
        let (mut scene, _, _) = two_nodes();
        let mut interaction = InteractionManager::new();
        interaction.selection = Selection::from_nodes(scene.node_ids().to_vec());

        interaction.editing = true;
        assert!(!interaction.key_press(&mut scene, Key::Delete));
        assert_eq!(scene.node_count(), 2);

        interaction.editing = false;
        assert!(interaction.key_press(&mut scene, Key::Delete));
        assert_eq!(scene.node_count(), 0);
        assert!(interaction.selection.is_empty());
    }

    #[test]
    fn test_node_drag_records_move() {
        let (mut scene, _, _) = two_nodes();
        let a = scene.node_ids()[0];
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(10.0, 10.0), HitTarget::Node(a), Modifiers::NONE);
        assert_eq!(interaction.mode(), InteractionMode::MovingNodes);
        interaction.move_to(&mut scene, Pos2::new(60.0, 30.0));
        interaction.release(&mut scene, Pos2::new(60.0, 30.0), HitTarget::Node(a));

        assert_eq!(scene.node(a).unwrap().position, Pos2::new(50.0, 20.0));
        assert_eq!(scene.history().current().unwrap().description, NODE_MOVED);
    }

    #[test]
    fn test_click_without_move_records_nothing() {
        let (mut scene, _, _) = two_nodes();
        let a = scene.node_ids()[0];
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(10.0, 10.0), HitTarget::Node(a), Modifiers::NONE);
        interaction.release(&mut scene, Pos2::new(10.0, 10.0), HitTarget::Node(a));
        assert!(interaction.selection.contains_node(a));
        assert_eq!(scene.history().len(), 1);
    }

    #[test]
    fn test_rubber_band_selects() {
        let (mut scene, _, _) = two_nodes();
        let b = scene.node_ids()[1];
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(350.0, -50.0), HitTarget::Empty, Modifiers::NONE);
        interaction.move_to(&mut scene, Pos2::new(450.0, 50.0));
        assert_eq!(interaction.box_selection_preview(&scene), vec![b]);
        interaction.release(&mut scene, Pos2::new(450.0, 50.0), HitTarget::Empty);

        assert_eq!(interaction.selection, Selection::from_nodes([b]));
        let current = scene.history().current().unwrap();
        assert_eq!(current.description, SELECTION_CHANGED);
        assert!(!current.set_modified);
    }

    #[test]
    fn test_release_at_threshold_keeps_drag_alive() {
        let (mut scene, out, _) = two_nodes();
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(180.0, 38.0), HitTarget::Socket(out), Modifiers::NONE);
        interaction.release(&mut scene, Pos2::new(190.0, 38.0), HitTarget::Empty);
        assert_eq!(interaction.mode(), InteractionMode::DraggingEdge);
        assert!(interaction.drag_edge().is_some());
    }

    #[test]
    fn test_second_click_on_empty_canvas_starts_fresh_press() {
        let (mut scene, out, _) = two_nodes();
        let mut interaction = InteractionManager::new();

        interaction.press(&mut scene, Pos2::new(180.0, 38.0), HitTarget::Socket(out), Modifiers::NONE);
        interaction.release(&mut scene, Pos2::new(181.0, 38.0), HitTarget::Socket(out));
        assert_eq!(interaction.mode(), InteractionMode::DraggingEdge);

        interaction.press(&mut scene, Pos2::new(250.0, 300.0), HitTarget::Empty, Modifiers::CTRL);
        assert_eq!(interaction.mode(), InteractionMode::Cutting);
        assert_eq!(interaction.cut_points(), &[Pos2::new(250.0, 300.0)]);
        assert_eq!(scene.edge_count(), 0);

        interaction.key_press(&mut scene, Key::Escape);
        interaction.press(&mut scene, Pos2::new(180.0, 38.0), HitTarget::Socket(out), Modifiers::NONE);
        interaction.release(&mut scene, Pos2::new(181.0, 38.0), HitTarget::Socket(out));
        interaction.press(&mut scene, Pos2::new(600.0, 600.0), HitTarget::Empty, Modifiers::NONE);
        assert_eq!(interaction.mode(), InteractionMode::RubberBand);
        assert_eq!(scene.edge_count(), 0);
        assert_eq!(scene.history().len(), 1);
    }
}
