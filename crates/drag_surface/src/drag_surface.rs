//! # Block drag surface
//!
//! When a block drag starts, the block (with everything nested in it) moves
//! onto a separate surface element, and the surface is moved around with a
//! single `translate3d` style write per pointer move. At the end of the drag
//! the block is put back into the canvas it came from. The canvas itself is
//! never repainted while the pointer moves, however large the dragged
//! subtree is.
//!
//! The surface cycles between two states for the life of the view:
//!
//! - [`DragState::Empty`]: the drag group has no children, the surface is
//!   hidden
//! - [`DragState::Occupied`]: the drag group holds exactly one block, the
//!   surface is visible and follows the pointer
//!
//! Two transforms are kept apart. The surface root follows the pointer
//! ([`DragSurface::translate_surface`]); the drag group follows the canvas'
//! pan and zoom ([`DragSurface::translate_and_scale_group`]).

mod display_mode;
mod error;

pub use display_mode::{ContainerOverflow, DisplayModeController, RecordingDisplayMode};
pub use error::{DragSurfaceError, InvariantViolation, Result};

use blocks_core::transform::{snap, surface_transform, GroupTransform};
use blocks_core::DragSurfaceConfig;
use glam::Vec2;
use log::{debug, error, trace};
use scene_graph::{DisplayMode, ElementKind, SceneGraph, SceneNodeId, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Empty,
    Occupied,
}

/// Isolated layer hosting the one block subtree currently being dragged.
///
/// The surface does not own the scene; the host view does, and lends it to
/// every call. Callers serialize a drag episode as
/// `set_blocks_and_show` → any number of translations → `clear_and_hide`.
pub struct DragSurface<D = ContainerOverflow> {
    /// Element both the canvas and the surface are mounted into
    container: SceneNodeId,

    /// Sole writer of the container's overflow mode
    display_mode: D,

    config: DragSurfaceConfig,

    /// Surface root, created once by `initialize`
    surface_root: Option<SceneNodeId>,

    /// Holds the dragged block while the surface is occupied
    drag_group: Option<SceneNodeId>,

    /// Zoom factor of the host canvas, cached to convert pointer deltas into
    /// surface translation and back
    scale: f32,
}

impl<D: DisplayModeController> DragSurface<D> {
    pub fn new(container: SceneNodeId, display_mode: D) -> Self {
        Self::with_config(container, display_mode, DragSurfaceConfig::default())
    }

    pub fn with_config(container: SceneNodeId, display_mode: D, config: DragSurfaceConfig) -> Self {
        Self {
            container,
            display_mode,
            config,
            surface_root: None,
            drag_group: None,
            scale: 1.0,
        }
    }

    /// Creates the surface root and its drag group under the container.
    ///
    /// Safe to call any number of times; only the first call creates nodes.
    pub fn initialize(&mut self, scene: &mut SceneGraph) -> Result<()> {
        if self.surface_root.is_some() {
            return Ok(());
        }
        if !scene.contains(self.container) {
            return Err(DragSurfaceError::MissingContainer(self.container));
        }

        let root = scene.create_element(Some(self.container), ElementKind::Surface)?;
        scene.set_class(root, self.config.surface_class.clone())?;
        scene.style_mut(root)?.display = Some(DisplayMode::None);
        let group = scene.create_element(Some(root), ElementKind::Group)?;

        debug!(
            "drag surface {root} created in container {} with group {group}",
            self.container
        );
        self.surface_root = Some(root);
        self.drag_group = Some(group);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.surface_root.is_some()
    }

    pub fn state(&self, scene: &SceneGraph) -> DragState {
        match self.drag_group {
            Some(group) if !scene.children(group).is_empty() => DragState::Occupied,
            _ => DragState::Empty,
        }
    }

    /// Moves `blocks` (and its subtree) onto the drag group and shows the
    /// surface.
    ///
    /// `blocks` is detached from its previous parent as part of this call.
    /// The container's overflow is opened up so the block can be dragged
    /// past the canvas edge. Fails with
    /// [`InvariantViolation::DoubleOccupancy`] if a block is already on the
    /// surface, leaving both blocks where they were. If the overflow cannot
    /// be switched, the block and the surface are put back as they were.
    pub fn set_blocks_and_show(&mut self, scene: &mut SceneGraph, blocks: SceneNodeId) -> Result<()> {
        let (root, group) = self.parts()?;
        self.ensure_container(scene)?;

        if let Some(current) = scene.first_child(group) {
            error!("already dragging block {current}; refusing to also drag {blocks}");
            return Err(InvariantViolation::DoubleOccupancy { current }.into());
        }

        let origin = scene.index_in_parent(blocks);
        let display = scene.style(root).and_then(|style| style.display);
        let previous = scene.append_child(group, blocks)?;
        scene.style_mut(root)?.display = Some(DisplayMode::Block);

        if let Err(err) = self.display_mode.set_overflow_visible(scene) {
            error!("could not open container overflow for block {blocks}: {err}");
            if let (Some(parent), Some(index)) = (previous, origin) {
                scene.insert_child(parent, index, blocks)?;
            }
            scene.style_mut(root)?.display = display;
            return Err(err.into());
        }

        debug!(
            "block {blocks} moved onto the drag surface from {}",
            previous.map_or_else(|| "nowhere".to_string(), |id| id.to_string())
        );
        Ok(())
    }

    /// Translates and scales the drag group to stay in sync with the canvas.
    ///
    /// Caches `scale` for later surface translations. The translation is
    /// snapped to whole units unless rounding is disabled in the config.
    pub fn translate_and_scale_group(
        &mut self,
        scene: &mut SceneGraph,
        x: f32,
        y: f32,
        scale: f32,
    ) -> Result<()> {
        let (_, group) = self.parts()?;
        check_coordinates(x, y)?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(DragSurfaceError::InvalidScale(scale));
        }

        self.scale = scale;
        let transform = GroupTransform::new(Vec2::new(x, y), scale);
        scene.set_attribute(
            group,
            "transform",
            transform.to_attribute(self.config.round_to_whole_units),
        )?;
        Ok(())
    }

    /// Moves the whole surface to follow the pointer.
    ///
    /// `x` and `y` are canvas units. The surface sits outside the canvas'
    /// own transform, so they are multiplied by the cached scale, then
    /// snapped. This is one style write on the surface root, whatever the
    /// size of the dragged subtree. Also makes the surface visible.
    pub fn translate_surface(&mut self, scene: &mut SceneGraph, x: f32, y: f32) -> Result<()> {
        let (root, _) = self.parts()?;
        check_coordinates(x, y)?;

        let offset = snap(Vec2::new(x, y) * self.scale, self.config.round_to_whole_units);
        if !offset.is_finite() {
            return Err(DragSurfaceError::InvalidCoordinate { x, y });
        }
        trace!("drag surface to ({}, {})", offset.x, offset.y);
        *scene.style_mut(root)? = Style {
            transform: Some(surface_transform(offset)),
            display: Some(DisplayMode::Block),
            overflow: None,
        };
        Ok(())
    }

    /// Reports the surface translation in canvas units.
    ///
    /// Read back from the transform applied to the surface root and divided
    /// by the cached scale. Use this when finishing a drag to put the blocks
    /// back at the right position.
    pub fn surface_translation(&self, scene: &SceneGraph) -> Result<Vec2> {
        let (root, _) = self.parts()?;
        Ok(scene.relative_xy(root) / self.scale)
    }

    /// The drag group element, once initialized.
    pub fn group(&self) -> Option<SceneNodeId> {
        self.drag_group
    }

    /// The block currently on the surface, if any.
    pub fn current_block(&self, scene: &SceneGraph) -> Option<SceneNodeId> {
        self.drag_group.and_then(|group| scene.first_child(group))
    }

    /// Whether `node` currently lives on the drag surface, either as the
    /// dragged block or nested inside it.
    pub fn contains(&self, scene: &SceneGraph, node: SceneNodeId) -> bool {
        self.drag_group
            .is_some_and(|group| group != node && scene.is_ancestor(group, node))
    }

    /// Moves the dragged block onto `new_surface`, hides the surface and
    /// clips the container again.
    ///
    /// Returns the block that was moved. Fails with
    /// [`DragSurfaceError::NothingToClear`] when the surface is empty, and
    /// with [`InvariantViolation::NonEmptyAfterClear`] if anything is still
    /// left in the drag group afterwards. If the overflow cannot be switched
    /// back, the block stays on the surface and the surface stays visible.
    pub fn clear_and_hide(
        &mut self,
        scene: &mut SceneGraph,
        new_surface: SceneNodeId,
    ) -> Result<SceneNodeId> {
        let (root, group) = self.parts()?;
        self.ensure_container(scene)?;
        let block = scene
            .first_child(group)
            .ok_or(DragSurfaceError::NothingToClear)?;

        let display = scene.style(root).and_then(|style| style.display);
        scene.append_child(new_surface, block)?;
        scene.style_mut(root)?.display = Some(DisplayMode::None);

        if let Err(err) = self.display_mode.set_overflow_clipped(scene) {
            error!("could not clip container overflow after dropping block {block}: {err}");
            scene.insert_child(group, 0, block)?;
            scene.style_mut(root)?.display = display;
            return Err(err.into());
        }

        let remaining = scene.children(group).len();
        if remaining != 0 {
            error!("drag group was not cleared: {remaining} node(s) left after dropping {block}");
            return Err(InvariantViolation::NonEmptyAfterClear { remaining }.into());
        }

        debug!("block {block} moved off the drag surface onto {new_surface}");
        Ok(block)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn surface_root(&self) -> Option<SceneNodeId> {
        self.surface_root
    }

    pub fn container(&self) -> SceneNodeId {
        self.container
    }

    pub fn config(&self) -> &DragSurfaceConfig {
        &self.config
    }

    pub fn display_mode(&self) -> &D {
        &self.display_mode
    }

    fn parts(&self) -> Result<(SceneNodeId, SceneNodeId)> {
        match (self.surface_root, self.drag_group) {
            (Some(root), Some(group)) => Ok((root, group)),
            _ => Err(DragSurfaceError::NotInitialized),
        }
    }

    fn ensure_container(&self, scene: &SceneGraph) -> Result<()> {
        if scene.contains(self.container) {
            Ok(())
        } else {
            Err(DragSurfaceError::MissingContainer(self.container))
        }
    }
}

fn check_coordinates(x: f32, y: f32) -> Result<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(DragSurfaceError::InvalidCoordinate { x, y })
    }
}
