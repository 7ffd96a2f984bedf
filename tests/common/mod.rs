//! Shared fixtures for the integration tests

#![allow(dead_code)]

use egui::Pos2;
use nodle_scene::nodes::SocketSpec;
use nodle_scene::{
    EdgeId, HitTarget, InteractionManager, Modifiers, NodeId, Scene, SocketId,
};

/// A scene plus the interaction controller driving it
pub struct Harness {
    pub scene: Scene,
    pub interaction: InteractionManager,
}

impl Harness {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut scene = Scene::new();
        scene.store_initial_history_stamp();
        Self {
            scene,
            interaction: InteractionManager::new(),
        }
    }

    /// Node with one input and one output socket, both single-edge
    pub fn single_edge_node(&mut self, title: &str, x: f32, y: f32) -> NodeId {
        self.scene.add_node(
            title,
            Pos2::new(x, y),
            &[SocketSpec::input(1)],
            &[SocketSpec::output(1).with_multi_edges(false)],
        )
    }

    /// Node with one input and one multi-edge output
    pub fn node(&mut self, title: &str, x: f32, y: f32) -> NodeId {
        self.scene.add_node(
            title,
            Pos2::new(x, y),
            &[SocketSpec::input(1)],
            &[SocketSpec::output(1)],
        )
    }

    pub fn output(&self, node: NodeId) -> SocketId {
        self.scene.node(node).unwrap().outputs[0]
    }

    pub fn input(&self, node: NodeId) -> SocketId {
        self.scene.node(node).unwrap().inputs[0]
    }

    pub fn socket_pos(&self, socket: SocketId) -> Pos2 {
        self.scene.socket_scene_position(socket).unwrap()
    }

    /// Full press-move-release drag from one socket onto another
    pub fn drag_connect(&mut self, from: SocketId, to: SocketId) -> Option<EdgeId> {
        let start = self.socket_pos(from);
        let end = self.socket_pos(to);
        self.interaction
            .press(&mut self.scene, start, HitTarget::Socket(from), Modifiers::NONE);
        self.interaction.move_to(&mut self.scene, start.lerp(end, 0.5));
        self.interaction.move_to(&mut self.scene, end);
        self.interaction
            .release(&mut self.scene, end, HitTarget::Socket(to));
        self.scene
            .socket(to)
            .and_then(|s| s.edges().last().copied())
    }

    /// Ctrl-drag a cut line through the given points
    pub fn cut(&mut self, points: &[Pos2]) {
        let (first, rest) = points.split_first().unwrap();
        self.interaction
            .press(&mut self.scene, *first, HitTarget::Empty, Modifiers::CTRL);
        for point in rest {
            self.interaction.move_to(&mut self.scene, *point);
        }
        let last = *points.last().unwrap();
        self.interaction
            .release(&mut self.scene, last, HitTarget::Empty);
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.scene
            .history()
            .entries()
            .iter()
            .map(|e| e.description.clone())
            .collect()
    }
}
