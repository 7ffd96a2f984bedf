//! File management for the node editor
//!
//! Tracks which file the scene belongs to and routes new/open/save through
//! the scene so the modified flag and history stay consistent.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::{GraphError, Result};
use crate::scene::Scene;

/// Manages file operations for one scene
#[derive(Debug, Clone, Default)]
pub struct FileManager {
    /// Current file path (None if unsaved/new file)
    current_file_path: Option<PathBuf>,
}

impl FileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_file_path(&self) -> Option<&Path> {
        self.current_file_path.as_deref()
    }

    pub fn is_filename_set(&self) -> bool {
        self.current_file_path.is_some()
    }

    /// Check if there are unsaved changes
    pub fn has_unsaved_changes(&self, scene: &Scene) -> bool {
        scene.has_been_modified()
    }

    /// File name for titles, with a `*` when the scene has unsaved changes
    pub fn get_file_display_name(&self, scene: &Scene) -> String {
        let name = match &self.current_file_path {
            Some(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("Unknown")
                .to_string(),
            None => "Untitled".to_string(),
        };

        if scene.has_been_modified() {
            format!("{}*", name)
        } else {
            name
        }
    }

    /// Starts an empty graph with a fresh history
    pub fn new_file(&mut self, scene: &mut Scene) {
        scene.clear();
        scene.store_initial_history_stamp();
        self.current_file_path = None;
        info!("Started a new graph");
    }

    /// Loads a graph. On error the scene and the current path are unchanged.
    pub fn load_from_file(&mut self, scene: &mut Scene, file_path: &Path) -> Result<()> {
        scene.load_from_file(file_path)?;
        self.current_file_path = Some(file_path.to_path_buf());
        Ok(())
    }

    /// Saves the graph and remembers the path
    pub fn save_to_file(&mut self, scene: &mut Scene, file_path: &Path) -> Result<()> {
        scene.save_to_file(file_path)?;
        self.current_file_path = Some(file_path.to_path_buf());
        Ok(())
    }

    /// Saves to the current path, `NoFilePath` when the graph was never saved
    pub fn save_file(&mut self, scene: &mut Scene) -> Result<()> {
        let path = self
            .current_file_path
            .clone()
            .ok_or(GraphError::NoFilePath)?;
        self.save_to_file(scene, &path)
    }
}
