//! Cut, copy and paste of selected sub-graphs

use std::collections::HashSet;

use egui::{Pos2, Vec2};
use log::{debug, warn};
use serde_json::Value;

use super::document::{GraphDocument, IdMap};
use super::selection::Selection;
use super::Scene;
use crate::constants::history::{CUT_TO_CLIPBOARD, PASTED};
use crate::error::{GraphError, Result};
use crate::nodes::{NodeId, SocketId};

/// Clipboard operations borrowed from a [`Scene`]
pub struct SceneClipboard<'a> {
    scene: &'a mut Scene,
}

impl<'a> SceneClipboard<'a> {
    pub fn new(scene: &'a mut Scene) -> Self {
        Self { scene }
    }

    /// Serializes the selected nodes with the edges running between them.
    ///
    /// A selected edge with an endpoint on an unselected node is dropped. With
    /// `delete` the delete gesture runs after serializing, followed by a
    /// "Cut our elements from scene" step.
    pub fn serialize_selected(&mut self, selection: &Selection, delete: bool) -> GraphDocument {
        let sockets: HashSet<SocketId> = selection
            .nodes
            .iter()
            .filter_map(|&id| self.scene.node(id))
            .flat_map(|node| node.sockets())
            .collect();

        let document = self.scene.serialize_filtered(
            |node| selection.contains_node(node.id),
            |edge| {
                selection.contains_edge(edge.id) && edge.sockets().all(|s| sockets.contains(&s))
            },
        );
        debug!(
            "Serialized {} nodes and {} edges from the selection",
            document.nodes.len(),
            document.edges.len()
        );

        if delete {
            self.scene.delete_selected(selection);
            self.scene.store_history(CUT_TO_CLIPBOARD, true);
        }
        document
    }

    /// Instantiates a clipboard document centered on `pointer`.
    ///
    /// Every node and edge gets a fresh id. The document is validated before
    /// anything is created; the ids of the new nodes are returned.
    pub fn deserialize_from_clipboard(
        &mut self,
        document: &GraphDocument,
        pointer: Pos2,
    ) -> Result<Vec<NodeId>> {
        if let Err(err) = document.validate() {
            warn!("Refusing to paste: {}", err);
            return Err(err);
        }
        if document.nodes.is_empty() {
            debug!("Clipboard holds no nodes, nothing to paste");
            return Ok(Vec::new());
        }

        let offset = document
            .bounding_box()
            .map_or(Vec2::ZERO, |bbox| pointer - bbox.center());

        let mut id_map = IdMap::new();
        let created = self
            .scene
            .insert_document(document, &mut id_map, false, offset)?;
        self.scene.set_has_been_modified(true);
        debug!("Pasted {} nodes at {:?}", created.len(), pointer);

        self.scene.store_history(PASTED, true);
        Ok(created)
    }

    /// Copy: the selection as pretty JSON
    pub fn copy_to_text(&mut self, selection: &Selection) -> Result<String> {
        self.serialize_selected(selection, false).to_json_pretty()
    }

    /// Cut: the selection as pretty JSON, removed from the scene
    pub fn cut_to_text(&mut self, selection: &Selection) -> Result<String> {
        self.serialize_selected(selection, true).to_json_pretty()
    }

    /// Paste from clipboard text. Text that is not a graph document leaves the
    /// scene and its history untouched.
    pub fn paste_text(&mut self, text: &str, pointer: Pos2) -> Result<Vec<NodeId>> {
        let value: Value = serde_json::from_str(text).map_err(|err| {
            warn!("Clipboard text is not JSON: {}", err);
            GraphError::InvalidClipboardText(err.to_string())
        })?;

        if value.get("nodes").is_none() {
            warn!("Clipboard JSON does not contain any nodes");
            return Err(GraphError::InvalidClipboardText(
                "missing 'nodes' key".to_string(),
            ));
        }

        let document = GraphDocument::from_value(value)
            .map_err(|err| GraphError::InvalidClipboardText(err.to_string()))?;
        self.deserialize_from_clipboard(&document, pointer)
    }
}
