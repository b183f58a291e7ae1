//! Ownership of the host container's overflow mode.
//!
//! While a block is dragged the container must let it paint outside the
//! canvas bounds; the rest of the time it clips. Exactly one writer should
//! toggle that flag, so the drag surface receives it as an explicit
//! controller instead of reaching into the view.

use scene_graph::{Overflow, SceneError, SceneGraph, SceneNodeId};

pub trait DisplayModeController {
    /// Let content paint outside the container for the duration of a drag.
    fn set_overflow_visible(&mut self, scene: &mut SceneGraph) -> Result<(), SceneError>;

    /// Clip content to the container again.
    fn set_overflow_clipped(&mut self, scene: &mut SceneGraph) -> Result<(), SceneError>;
}

impl<T: DisplayModeController + ?Sized> DisplayModeController for Box<T> {
    fn set_overflow_visible(&mut self, scene: &mut SceneGraph) -> Result<(), SceneError> {
        (**self).set_overflow_visible(scene)
    }

    fn set_overflow_clipped(&mut self, scene: &mut SceneGraph) -> Result<(), SceneError> {
        (**self).set_overflow_clipped(scene)
    }
}

/// Writes `overflow: visible|hidden` to a container element's inline style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOverflow {
    container: SceneNodeId,
}

impl ContainerOverflow {
    pub fn new(container: SceneNodeId) -> Self {
        Self { container }
    }

    /// Controls the first element in the scene carrying `class`.
    pub fn find(scene: &SceneGraph, class: &str) -> Option<Self> {
        scene.find_by_class(class).map(Self::new)
    }

    pub fn container(&self) -> SceneNodeId {
        self.container
    }

    fn set(&self, scene: &mut SceneGraph, overflow: Overflow) -> Result<(), SceneError> {
        scene.style_mut(self.container)?.overflow = Some(overflow);
        Ok(())
    }
}

impl DisplayModeController for ContainerOverflow {
    fn set_overflow_visible(&mut self, scene: &mut SceneGraph) -> Result<(), SceneError> {
        self.set(scene, Overflow::Visible)
    }

    fn set_overflow_clipped(&mut self, scene: &mut SceneGraph) -> Result<(), SceneError> {
        self.set(scene, Overflow::Hidden)
    }
}

/// Test double that records every overflow change instead of touching the
/// scene.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingDisplayMode {
    calls: Vec<Overflow>,
}

impl RecordingDisplayMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every overflow mode written so far, oldest first.
    pub fn calls(&self) -> &[Overflow] {
        &self.calls
    }

    /// The mode most recently written, if any.
    pub fn current(&self) -> Option<Overflow> {
        self.calls.last().copied()
    }
}

impl DisplayModeController for RecordingDisplayMode {
    fn set_overflow_visible(&mut self, _scene: &mut SceneGraph) -> Result<(), SceneError> {
        self.calls.push(Overflow::Visible);
        Ok(())
    }

    fn set_overflow_clipped(&mut self, _scene: &mut SceneGraph) -> Result<(), SceneError> {
        self.calls.push(Overflow::Hidden);
        Ok(())
    }
}
