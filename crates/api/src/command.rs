//! Drag commands - all operations that modify the editor view.
//!
//! Commands mirror what a drag controller does over one drag episode:
//! pick a block up, move the surface on every pointer move, keep the group
//! in sync with canvas pan/zoom, and drop the block somewhere. Blocks are
//! referred to by the names they were created with.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A command that modifies the editor view.
///
/// Commands are serializable so drag episodes can be recorded and replayed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // === Scene setup ===
    /// Create a named block, nested in `parent` or directly on the canvas.
    CreateBlock {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<String>,
        #[serde(default)]
        position: Vec2,
    },

    /// Create the drag surface. Repeating it is harmless.
    Initialize,

    // === Drag episode ===
    /// Move a block (and everything nested in it) onto the drag surface.
    PickUp { block: String },

    /// Move the surface to follow the pointer, in canvas units.
    TranslateSurface { offset: Vec2 },

    /// Keep the dragged contents in sync with canvas pan and zoom.
    TranslateAndScaleGroup { offset: Vec2, scale: f32 },

    /// Put the dragged block onto `destination` (the canvas by default).
    Drop {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination: Option<String>,
    },
}

/// Result of executing a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandResult {
    /// Command succeeded.
    Success {
        /// Name of the block the command acted on, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block: Option<String>,
    },
    /// Command failed.
    Error { message: String },
}

impl CommandResult {
    pub fn success() -> Self {
        Self::Success { block: None }
    }

    pub fn block(name: impl Into<String>) -> Self {
        Self::Success {
            block: Some(name.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CommandResult::Error { .. })
    }
}
