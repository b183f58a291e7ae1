use scene_graph::{SceneError, SceneNodeId};
use thiserror::Error;

pub type Result<T, E = DragSurfaceError> = std::result::Result<T, E>;

/// A broken drag surface invariant. Always a caller bug: two drag episodes
/// overlapped, or a node was put on the surface behind its back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("already dragging a block: the drag group still holds {current}")]
    DoubleOccupancy { current: SceneNodeId },

    #[error("drag group was not cleared: {remaining} node(s) left behind")]
    NonEmptyAfterClear { remaining: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DragSurfaceError {
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    #[error("drag surface used before it was initialized")]
    NotInitialized,

    #[error("container {0} is no longer part of the scene")]
    MissingContainer(SceneNodeId),

    #[error("the drag surface holds no block to clear")]
    NothingToClear,

    #[error("scale must be finite and positive, got {0}")]
    InvalidScale(f32),

    #[error("coordinates must be finite, got ({x}, {y})")]
    InvalidCoordinate { x: f32, y: f32 },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl DragSurfaceError {
    /// Whether this error is a broken invariant rather than a bad argument or
    /// a missing node.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, DragSurfaceError::InvariantViolation(_))
    }
}
