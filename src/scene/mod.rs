//! Scene - the owning container of one graph document
//!
//! Nodes, sockets and edges live in id-keyed arenas owned by the scene and
//! refer to each other by id only. Every structural change goes through the
//! scene so the socket edge lists and the edge collection stay in step.

pub mod clipboard;
pub mod document;
pub mod history;
pub mod selection;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use egui::{Pos2, Rect, Vec2};
use log::{debug, error, info, warn};
use serde_json::Value;

pub use clipboard::SceneClipboard;
pub use document::{EdgeRecord, GraphDocument, IdMap, NodeRecord, SocketRecord};
pub use history::{History, HistoryEntry};
pub use selection::Selection;

use crate::config::EditorConfig;
use crate::constants::history::{DELETE_SELECTED, INITIAL_STAMP};
use crate::error::{GraphError, Result};
use crate::nodes::math_utils::{polyline_intersects_rect, polyline_intersects_segment};
use crate::nodes::{
    edge_path, Edge, EdgeId, EdgeType, Node, NodeId, NodeRegistry, Socket, SocketId, SocketSpec,
};

type ModifiedListener = Box<dyn FnMut(bool)>;

/// A graph document: nodes, their sockets, the edges between them, the
/// modified flag and the undo/redo history.
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    sockets: HashMap<SocketId, Socket>,
    edges: HashMap<EdgeId, Edge>,
    edge_order: Vec<EdgeId>,
    next_id: u64,
    has_been_modified: bool,
    modified_listeners: Vec<ModifiedListener>,
    history: History,
    registry: Rc<NodeRegistry>,
}

impl Scene {
    /// Creates an empty scene with an empty node registry
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            sockets: HashMap::new(),
            edges: HashMap::new(),
            edge_order: Vec::new(),
            next_id: 1,
            has_been_modified: false,
            modified_listeners: Vec::new(),
            history: History::default(),
            registry: Rc::new(NodeRegistry::new()),
        }
    }

    /// Creates an empty scene sized by the editor configuration
    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            history: History::new(config.history_limit),
            ..Self::new()
        }
    }

    pub fn with_registry(mut self, registry: Rc<NodeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    // ---- Queries ----

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        self.sockets.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Edges in creation order, including a transient edge being dragged
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edge_order
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_order.is_empty() && self.edge_order.is_empty()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn id_in_use(&self, id: u64) -> bool {
        self.nodes.contains_key(&id) || self.sockets.contains_key(&id) || self.edges.contains_key(&id)
    }

    /// Reuses a persisted id when asked to and when it is free, otherwise allocates one
    fn take_id(&mut self, persisted: u64, restore_id: bool) -> u64 {
        if restore_id && !self.id_in_use(persisted) {
            self.next_id = self.next_id.max(persisted.saturating_add(1));
            persisted
        } else {
            self.allocate_id()
        }
    }

    // ---- Nodes ----

    /// Adds a node with the default layout and the given sockets
    pub fn add_node(
        &mut self,
        title: impl Into<String>,
        position: Pos2,
        inputs: &[SocketSpec],
        outputs: &[SocketSpec],
    ) -> NodeId {
        let id = self.allocate_id();
        self.insert_node(Node::new(id, title, position), inputs, outputs);
        debug!("Added node {}", id);
        self.set_has_been_modified(true);
        id
    }

    /// Instantiates the registered node type `op_code` at `position`
    pub fn create_node(&mut self, op_code: u32, position: Pos2) -> Result<NodeId> {
        let registry = Rc::clone(&self.registry);
        let template = registry.template(op_code)?;

        let id = self.allocate_id();
        let node = Node::new(id, template.title.clone(), position)
            .with_layout(Rc::clone(&template.layout))
            .with_content(template.content.clone())
            .with_op_code(Some(op_code));
        self.insert_node(node, &template.inputs, &template.outputs);

        debug!("Created {} node {} from op code {}", template.title, id, op_code);
        self.set_has_been_modified(true);
        Ok(id)
    }

    fn insert_node(&mut self, mut node: Node, inputs: &[SocketSpec], outputs: &[SocketSpec]) {
        node.inputs = self.create_sockets(node.id, inputs, true);
        node.outputs = self.create_sockets(node.id, outputs, false);
        self.node_order.push(node.id);
        self.nodes.insert(node.id, node);
    }

    fn create_sockets(&mut self, node: NodeId, specs: &[SocketSpec], is_input: bool) -> Vec<SocketId> {
        let mut ids = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let id = self.allocate_id();
            let socket = Socket::new(id, node, index, spec.position, is_input)
                .with_socket_type(spec.socket_type)
                .with_multi_edges(spec.multi_edges)
                .with_count_on_side(specs.len());
            self.sockets.insert(id, socket);
            ids.push(id);
        }
        ids
    }

    /// Removes a node after removing every edge attached to its sockets
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            warn!("Node {} was already removed", id);
            return false;
        };

        let sockets: Vec<SocketId> = node.sockets().collect();
        for &socket in &sockets {
            self.remove_all_edges(socket);
        }
        for socket in sockets {
            self.sockets.remove(&socket);
        }

        self.nodes.remove(&id);
        self.node_order.retain(|&n| n != id);
        debug!("Removed node {}", id);
        self.set_has_been_modified(true);
        true
    }

    /// Moves a node. History for the move is recorded by the gesture that caused it.
    pub fn set_node_position(&mut self, id: NodeId, position: Pos2) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Replaces a node's content payload
    pub fn set_node_content(&mut self, id: NodeId, content: Value) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.content = content;
                self.set_has_been_modified(true);
                true
            }
            None => false,
        }
    }

    // ---- Edges ----

    /// Creates an edge and registers it with its sockets.
    ///
    /// Without an end socket the edge is transient: it exists while the user
    /// drags it and is skipped by serialization.
    pub fn add_edge(
        &mut self,
        start: SocketId,
        end: Option<SocketId>,
        edge_type: EdgeType,
    ) -> Result<EdgeId> {
        for socket in std::iter::once(start).chain(end) {
            if !self.sockets.contains_key(&socket) {
                return Err(GraphError::UnknownSocket(socket));
            }
        }

        let id = self.allocate_id();
        self.attach_edge(Edge::new(id, start, end, edge_type));

        if let Some(end) = end {
            debug!("Connected socket {} to socket {} with edge {}", start, end, id);
            self.set_has_been_modified(true);
        }
        Ok(id)
    }

    fn attach_edge(&mut self, edge: Edge) {
        for socket in edge.sockets() {
            if let Some(socket) = self.sockets.get_mut(&socket) {
                socket.add_edge(edge.id);
            }
        }
        self.edge_order.push(edge.id);
        self.edges.insert(edge.id, edge);
    }

    /// Detaches an edge from both sockets and drops it. Removing an edge twice is a no-op.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let Some(edge) = self.edges.remove(&id) else {
            warn!("Edge {} was already removed", id);
            return false;
        };

        for socket in edge.sockets() {
            if let Some(socket) = self.sockets.get_mut(&socket) {
                socket.remove_edge(id);
            }
        }
        self.edge_order.retain(|&e| e != id);

        if !edge.is_transient() {
            debug!("Removed edge {}", id);
            self.set_has_been_modified(true);
        }
        true
    }

    /// Removes every edge attached to a socket, returning how many were removed.
    ///
    /// Edges the socket lists but the scene no longer knows are logged and skipped.
    pub fn remove_all_edges(&mut self, socket: SocketId) -> usize {
        let Some(edges) = self.sockets.get(&socket).map(|s| s.edges().to_vec()) else {
            warn!("Socket {} does not exist", socket);
            return 0;
        };

        let mut removed = 0;
        for edge in edges {
            if self.remove_edge(edge) {
                removed += 1;
            } else {
                warn!("Socket {} listed edge {} which could not be removed", socket, edge);
            }
        }

        if let Some(socket) = self.sockets.get_mut(&socket) {
            socket.clear_edges();
        }
        removed
    }

    /// Points the loose end of a transient edge at `position`
    pub fn set_edge_drag_position(&mut self, id: EdgeId, position: Pos2) -> bool {
        match self.edges.get_mut(&id) {
            Some(edge) => {
                edge.drag_position = Some(position);
                true
            }
            None => false,
        }
    }

    // ---- Geometry ----

    /// Anchor of a socket relative to its node origin
    pub fn socket_position(&self, socket: SocketId) -> Option<Vec2> {
        let socket = self.sockets.get(&socket)?;
        let node = self.nodes.get(&socket.node)?;
        Some(node.socket_offset(socket))
    }

    /// Anchor of a socket in scene coordinates
    pub fn socket_scene_position(&self, socket: SocketId) -> Option<Pos2> {
        let socket = self.sockets.get(&socket)?;
        let node = self.nodes.get(&socket.node)?;
        Some(node.socket_scene_position(socket))
    }

    /// Polyline the edge is drawn along
    pub fn edge_path(&self, id: EdgeId) -> Option<Vec<Pos2>> {
        let edge = self.edges.get(&id)?;
        let source = self.socket_scene_position(edge.start_socket)?;
        let destination = match edge.end_socket {
            Some(end) => self.socket_scene_position(end)?,
            None => edge.drag_position.unwrap_or(source),
        };
        let start_position = self.sockets.get(&edge.start_socket).map(|s| s.position);
        Some(edge_path(edge.edge_type, source, destination, start_position))
    }

    /// Connected edges whose path crosses the segment `p1-p2`
    pub fn edges_intersecting_segment(&self, p1: Pos2, p2: Pos2) -> Vec<EdgeId> {
        self.edges()
            .filter(|edge| !edge.is_transient())
            .filter(|edge| {
                self.edge_path(edge.id)
                    .is_some_and(|path| polyline_intersects_segment(&path, p1, p2))
            })
            .map(|edge| edge.id)
            .collect()
    }

    /// Nodes whose body intersects the rectangle
    pub fn nodes_in_rect(&self, rect: Rect) -> Vec<NodeId> {
        self.nodes()
            .filter(|node| node.get_rect().intersects(rect))
            .map(|node| node.id)
            .collect()
    }

    /// Connected edges whose path passes through the rectangle
    pub fn edges_in_rect(&self, rect: Rect) -> Vec<EdgeId> {
        self.edges()
            .filter(|edge| !edge.is_transient())
            .filter(|edge| {
                self.edge_path(edge.id)
                    .is_some_and(|path| polyline_intersects_rect(&path, rect))
            })
            .map(|edge| edge.id)
            .collect()
    }

    // ---- Modification tracking ----

    pub fn has_been_modified(&self) -> bool {
        self.has_been_modified
    }

    /// Sets the modified flag. Listeners run when the flag changes or is set again.
    pub fn set_has_been_modified(&mut self, value: bool) {
        let changed = self.has_been_modified != value;
        self.has_been_modified = value;
        if changed || value {
            for listener in &mut self.modified_listeners {
                listener(value);
            }
        }
    }

    /// Registers a callback receiving the new modified flag
    pub fn add_has_been_modified_listener(&mut self, listener: impl FnMut(bool) + 'static) {
        self.modified_listeners.push(Box::new(listener));
    }

    fn clear_graph(&mut self) {
        self.nodes.clear();
        self.node_order.clear();
        self.sockets.clear();
        self.edges.clear();
        self.edge_order.clear();
    }

    /// Removes everything and resets the modified flag
    pub fn clear(&mut self) {
        self.clear_graph();
        self.set_has_been_modified(false);
    }

    // ---- Selection ----

    /// Removes the selected edges, then the selected nodes, without recording history
    pub fn remove_selected(&mut self, selection: &Selection) {
        let edges: Vec<EdgeId> = self
            .edge_order
            .iter()
            .copied()
            .filter(|&id| selection.contains_edge(id))
            .collect();
        for edge in edges {
            self.remove_edge(edge);
        }

        let nodes: Vec<NodeId> = self
            .node_order
            .iter()
            .copied()
            .filter(|&id| selection.contains_node(id))
            .collect();
        for node in nodes {
            self.remove_node(node);
        }
    }

    /// Delete gesture: removes the selection and records one history step
    pub fn delete_selected(&mut self, selection: &Selection) {
        self.remove_selected(selection);
        self.store_history(DELETE_SELECTED, true);
    }

    /// Clipboard operations bound to this scene
    pub fn clipboard(&mut self) -> SceneClipboard<'_> {
        SceneClipboard::new(self)
    }

    // ---- Serialization ----

    fn node_record(&self, node: &Node) -> NodeRecord {
        let records = |ids: &[SocketId]| -> Vec<SocketRecord> {
            ids.iter()
                .filter_map(|id| self.sockets.get(id))
                .map(Socket::to_record)
                .collect()
        };

        NodeRecord {
            id: node.id,
            title: node.title.clone(),
            pos_x: node.position.x,
            pos_y: node.position.y,
            inputs: records(&node.inputs),
            outputs: records(&node.outputs),
            content: node.content.clone(),
            op_code: node.op_code,
        }
    }

    /// Serializes the nodes in `selection` order-preserving, with only the
    /// edges accepted by `keep_edge`
    pub(crate) fn serialize_filtered(
        &self,
        keep_node: impl Fn(&Node) -> bool,
        keep_edge: impl Fn(&Edge) -> bool,
    ) -> GraphDocument {
        GraphDocument {
            nodes: self
                .nodes()
                .filter(|node| keep_node(node))
                .map(|node| self.node_record(node))
                .collect(),
            edges: self
                .edges()
                .filter(|edge| keep_edge(edge))
                .filter_map(Edge::to_record)
                .collect(),
        }
    }

    /// Snapshot of the whole graph. A transient edge is left out.
    pub fn serialize(&self) -> GraphDocument {
        self.serialize_filtered(|_| true, |_| true)
    }

    /// Replaces the whole graph with the document.
    ///
    /// The document is validated first; a rejected document leaves the scene
    /// untouched. With `restore_id` the persisted ids are kept.
    pub fn deserialize(&mut self, document: &GraphDocument, restore_id: bool) -> Result<()> {
        if let Err(err) = document.validate() {
            warn!("Rejected graph document: {}", err);
            return Err(err);
        }

        self.clear_graph();
        let mut id_map = IdMap::new();
        self.insert_document(document, &mut id_map, restore_id, Vec2::ZERO)?;
        debug!(
            "Deserialized {} nodes and {} edges",
            self.node_count(),
            self.edge_count()
        );
        self.set_has_been_modified(true);
        Ok(())
    }

    /// Builds nodes (with their sockets) and then edges from a validated
    /// document, returning the ids of the created nodes
    pub(crate) fn insert_document(
        &mut self,
        document: &GraphDocument,
        id_map: &mut IdMap,
        restore_id: bool,
        offset: Vec2,
    ) -> Result<Vec<NodeId>> {
        let mut created = Vec::with_capacity(document.nodes.len());
        for record in &document.nodes {
            created.push(self.restore_node(record, id_map, restore_id, offset)?);
        }
        for record in &document.edges {
            self.restore_edge(record, id_map, restore_id)?;
        }
        Ok(created)
    }

    fn restore_node(
        &mut self,
        record: &NodeRecord,
        id_map: &mut IdMap,
        restore_id: bool,
        offset: Vec2,
    ) -> Result<NodeId> {
        let id = self.take_id(record.id, restore_id);
        let mut node = Node::new(id, record.title.clone(), record.position() + offset)
            .with_content(record.content.clone())
            .with_op_code(record.op_code);
        if let Some(template) = record.op_code.and_then(|code| self.registry.get(code)) {
            node = node.with_layout(Rc::clone(&template.layout));
        }

        node.inputs = self.restore_sockets(&record.inputs, id, true, id_map, restore_id)?;
        node.outputs = self.restore_sockets(&record.outputs, id, false, id_map, restore_id)?;
        self.node_order.push(id);
        self.nodes.insert(id, node);
        Ok(id)
    }

    fn restore_sockets(
        &mut self,
        records: &[SocketRecord],
        node: NodeId,
        is_input: bool,
        id_map: &mut IdMap,
        restore_id: bool,
    ) -> Result<Vec<SocketId>> {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            let id = self.take_id(record.id, restore_id);
            let socket = Socket::from_record(record, id, node, is_input, records.len())?;
            id_map.insert(record.id, id);
            self.sockets.insert(id, socket);
            ids.push(id);
        }
        Ok(ids)
    }

    fn restore_edge(&mut self, record: &EdgeRecord, id_map: &IdMap, restore_id: bool) -> Result<EdgeId> {
        let resolve = |socket: u64| {
            id_map
                .get(&socket)
                .copied()
                .ok_or(GraphError::DanglingReference {
                    edge: record.id,
                    socket,
                })
        };
        let start = resolve(record.start_socket)?;
        let end = resolve(record.end_socket)?;
        let edge_type = EdgeType::try_from(record.edge_type)?;

        let id = self.take_id(record.id, restore_id);
        self.attach_edge(Edge::new(id, start, Some(end), edge_type));
        Ok(id)
    }

    // ---- History ----

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Records the current graph as a new history step
    pub fn store_history(&mut self, description: &str, set_modified: bool) {
        if set_modified {
            self.set_has_been_modified(true);
        }

        let snapshot = self.serialize();
        self.history.push(HistoryEntry {
            description: description.to_string(),
            snapshot,
            set_modified,
        });
        debug!(
            "Stored history step '{}' ({} of {})",
            description,
            self.history.current_step().map_or(0, |step| step + 1),
            self.history.len()
        );
    }

    /// Resets the history to a single step holding the current graph
    pub fn store_initial_history_stamp(&mut self) {
        self.history.clear();
        self.store_history(INITIAL_STAMP, false);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restores the previous history step. Returns false at the oldest step.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.step_back().cloned() else {
            debug!("Nothing to undo");
            return false;
        };
        self.restore_history_entry(&entry);
        true
    }

    /// Restores the next history step. Returns false at the newest step.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.step_forward().cloned() else {
            debug!("Nothing to redo");
            return false;
        };
        self.restore_history_entry(&entry);
        true
    }

    fn restore_history_entry(&mut self, entry: &HistoryEntry) {
        debug!("Restoring history step '{}'", entry.description);
        if let Err(err) = self.deserialize(&entry.snapshot, true) {
            error!(
                "Failed to restore history step '{}': {}",
                entry.description, err
            );
        }
    }

    // ---- Files ----

    /// Writes the graph as pretty JSON and clears the modified flag
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.serialize().to_json_pretty()?;
        fs::write(path, text)?;
        info!("Saved graph to {}", path.display());
        self.set_has_been_modified(false);
        Ok(())
    }

    /// Replaces the graph with the file's content.
    ///
    /// The history restarts from the loaded graph. On any error the scene is
    /// left as it was.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let document = match GraphDocument::from_json(&text) {
            Ok(document) => document,
            Err(err) => {
                warn!("Could not parse {}: {}", path.display(), err);
                return Err(err);
            }
        };

        self.deserialize(&document, true)?;
        self.store_initial_history_stamp();
        self.set_has_been_modified(false);
        info!(
            "Loaded {} nodes and {} edges from {}",
            self.node_count(),
            self.edge_count(),
            path.display()
        );
        Ok(())
    }

    // ---- Evaluation ----

    /// Evaluates a node, pulling every input through its first edge
    pub fn evaluate(&self, node: NodeId) -> Result<Vec<f64>> {
        let mut visiting = HashSet::new();
        self.evaluate_node(node, &mut visiting)
    }

    fn evaluate_node(&self, id: NodeId, visiting: &mut HashSet<NodeId>) -> Result<Vec<f64>> {
        let node = self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))?;
        if !visiting.insert(id) {
            return Err(GraphError::Cycle(id));
        }

        let mut inputs = Vec::with_capacity(node.inputs.len());
        for (index, &socket_id) in node.inputs.iter().enumerate() {
            let socket = self
                .sockets
                .get(&socket_id)
                .ok_or(GraphError::UnknownSocket(socket_id))?;
            let upstream = socket
                .edges()
                .iter()
                .filter_map(|edge| self.edges.get(edge))
                .find_map(|edge| edge.other_socket(socket_id))
                .and_then(|other| self.sockets.get(&other))
                .ok_or(GraphError::UnconnectedInput { node: id, index })?;

            let values = self.evaluate_node(upstream.node, visiting)?;
            let value = values
                .get(upstream.index)
                .copied()
                .ok_or_else(|| GraphError::Evaluation {
                    node: upstream.node,
                    reason: format!("no value produced for output {}", upstream.index),
                })?;
            inputs.push(value);
        }
        visiting.remove(&id);

        let behavior = node
            .op_code
            .and_then(|code| self.registry.get(code))
            .and_then(|template| template.behavior.clone())
            .ok_or_else(|| GraphError::Evaluation {
                node: id,
                reason: "node type has no evaluation behavior".to_string(),
            })?;

        behavior
            .evaluate(node, &inputs)
            .map_err(|reason| GraphError::Evaluation { node: id, reason })
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.node_order.len())
            .field("edges", &self.edge_order.len())
            .field("has_been_modified", &self.has_been_modified)
            .field("history", &self.history.len())
            .finish()
    }
}
