//! Editor layer: user gestures and file handling on top of the scene

pub mod file_manager;
pub mod interaction;

pub use file_manager::FileManager;
pub use interaction::{HitTarget, InteractionManager, InteractionMode, Key, Modifiers};
