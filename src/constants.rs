//! Scene-wide constants and default values
//!
//! Centralized location for the metrics and labels the editor core relies on

/// Default node metrics used to place socket anchors
pub mod node {
    /// Default node width
    pub const DEFAULT_WIDTH: f32 = 180.0;

    /// Default node height
    pub const DEFAULT_HEIGHT: f32 = 240.0;

    /// Corner rounding, also used as the vertical inset of edge sockets
    pub const EDGE_ROUNDNESS: f32 = 10.0;

    /// Padding between the title bar and centered sockets
    pub const EDGE_PADDING: f32 = 10.0;

    /// Height of the title bar
    pub const TITLE_HEIGHT: f32 = 24.0;

    /// Vertical padding around the title text
    pub const TITLE_VERTICAL_PADDING: f32 = 4.0;

    /// Vertical distance between two sockets on the same side
    pub const SOCKET_SPACING: f32 = 22.0;
}

/// Edge path constants
pub mod edge {
    /// Vertical control point offset for bezier edges that loop back
    pub const CONTROL_POINT_ROUNDNESS: f32 = 100.0;

    /// Number of line segments a bezier edge is flattened into for hit testing
    pub const BEZIER_SEGMENTS: usize = 20;
}

/// Pointer interaction constants
pub mod interaction {
    /// Releases closer than this to the press point keep an edge drag alive
    pub const EDGE_DRAG_START_THRESHOLD: f32 = 10.0;
}

/// Undo/redo stack constants and the descriptions stored by editor gestures
pub mod history {
    /// Maximum number of snapshots kept on the stack
    pub const DEFAULT_LIMIT: usize = 32;

    pub const INITIAL_STAMP: &str = "Initial History Stamp";
    pub const EDGE_CREATED: &str = "Created new edge by dragging";
    pub const EDGES_CUT: &str = "Delete cutted edges";
    pub const DELETE_SELECTED: &str = "Delete selected";
    pub const CUT_TO_CLIPBOARD: &str = "Cut our elements from scene";
    pub const PASTED: &str = "Pasted elements from clipboard";
    pub const SELECTION_CHANGED: &str = "Selection changed";
    pub const NODE_MOVED: &str = "Node moved";
}

/// Configuration file location
pub mod config {
    /// Directory created under the platform config dir
    pub const APP_DIR: &str = "nodle-scene";

    /// Config file name inside [`APP_DIR`]
    pub const FILE_NAME: &str = "config.json";

    /// Default `env_logger` filter
    pub const DEFAULT_LOG_FILTER: &str = "info";
}
