//! Command and query execution against an in-memory editor view.
//!
//! A [`DragSession`] owns a scene laid out the way an editor is injected
//! into a page: a container holding the main canvas and the drag surface.
//! Blocks are created on the canvas by name and then dragged around through
//! [`Command`]s, the way a drag controller would drive the surface.

use crate::{Command, CommandResult, Query, QueryResult};
use blocks_core::transform::translate_attribute;
use blocks_core::DragSurfaceConfig;
use drag_surface::{ContainerOverflow, DragState, DragSurface, DragSurfaceError};
use log::{debug, warn};
use scene_graph::{ElementKind, SceneError, SceneGraph, SceneNodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown block {0:?}")]
    UnknownBlock(String),

    #[error("a block named {0:?} already exists")]
    DuplicateBlock(String),

    #[error("no element with class {0:?} to control overflow on")]
    MissingContainer(String),

    #[error(transparent)]
    Drag(#[from] DragSurfaceError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// One step of a replay script: a command or a query.
///
/// Commands and queries share the `type` tag namespace, so a step is written
/// as the bare command or query object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Command(Command),
    Query(Query),
}

/// A recorded drag session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DragSurfaceConfig>,
    pub steps: Vec<Step>,
}

/// What a single script step produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepOutcome {
    Command(CommandResult),
    Query(QueryResult),
}

impl StepOutcome {
    pub fn is_error(&self) -> bool {
        match self {
            StepOutcome::Command(result) => result.is_error(),
            StepOutcome::Query(result) => result.is_error(),
        }
    }
}

/// An editor view with a drag surface, driven by commands.
pub struct DragSession {
    scene: SceneGraph,
    container: SceneNodeId,
    canvas: SceneNodeId,
    surface: DragSurface<ContainerOverflow>,
    blocks: BTreeMap<String, SceneNodeId>,
}

impl DragSession {
    /// Builds the view: root → container → canvas. The drag surface is
    /// created by [`Command::Initialize`].
    pub fn new(config: DragSurfaceConfig) -> Result<Self, SessionError> {
        let mut scene = SceneGraph::new();
        let container = scene.create_element(None, ElementKind::Container)?;
        scene.set_class(container, config.container_class.clone())?;
        let canvas = scene.create_element(Some(container), ElementKind::Canvas)?;
        scene.style_mut(container)?.overflow = Some(scene_graph::Overflow::Hidden);

        let overflow = ContainerOverflow::find(&scene, &config.container_class)
            .ok_or_else(|| SessionError::MissingContainer(config.container_class.clone()))?;
        let surface = DragSurface::with_config(container, overflow, config);

        Ok(Self {
            scene,
            container,
            canvas,
            surface,
            blocks: BTreeMap::new(),
        })
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn surface(&self) -> &DragSurface<ContainerOverflow> {
        &self.surface
    }

    pub fn container(&self) -> SceneNodeId {
        self.container
    }

    pub fn canvas(&self) -> SceneNodeId {
        self.canvas
    }

    /// Looks up a block by name.
    pub fn block(&self, name: &str) -> Option<SceneNodeId> {
        self.blocks.get(name).copied()
    }

    fn resolve(&self, name: &str) -> Result<SceneNodeId, SessionError> {
        self.block(name)
            .ok_or_else(|| SessionError::UnknownBlock(name.to_string()))
    }

    fn name_of(&self, node: SceneNodeId) -> Option<String> {
        self.blocks
            .iter()
            .find(|(_, id)| **id == node)
            .map(|(name, _)| name.clone())
    }

    /// Executes a command, turning failures into [`CommandResult::Error`].
    pub fn execute(&mut self, command: Command) -> CommandResult {
        match self.apply(command) {
            Ok(Some(block)) => CommandResult::block(block),
            Ok(None) => CommandResult::success(),
            Err(err) => {
                warn!("command failed: {err}");
                CommandResult::error(err.to_string())
            }
        }
    }

    fn apply(&mut self, command: Command) -> Result<Option<String>, SessionError> {
        debug!("executing {command:?}");
        match command {
            Command::CreateBlock {
                name,
                parent,
                position,
            } => {
                if self.blocks.contains_key(&name) {
                    return Err(SessionError::DuplicateBlock(name));
                }
                let parent = match parent {
                    Some(parent) => self.resolve(&parent)?,
                    None => self.canvas,
                };
                let block = self.scene.create_element(Some(parent), ElementKind::Block)?;
                self.scene
                    .set_attribute(block, "transform", translate_attribute(position))?;
                self.blocks.insert(name.clone(), block);
                Ok(Some(name))
            }

            Command::Initialize => {
                self.surface.initialize(&mut self.scene)?;
                Ok(None)
            }

            Command::PickUp { block } => {
                let node = self.resolve(&block)?;
                self.surface.set_blocks_and_show(&mut self.scene, node)?;
                Ok(Some(block))
            }

            Command::TranslateSurface { offset } => {
                self.surface
                    .translate_surface(&mut self.scene, offset.x, offset.y)?;
                Ok(None)
            }

            Command::TranslateAndScaleGroup { offset, scale } => {
                self.surface
                    .translate_and_scale_group(&mut self.scene, offset.x, offset.y, scale)?;
                Ok(None)
            }

            Command::Drop { destination } => {
                let destination = match destination {
                    Some(name) => self.resolve(&name)?,
                    None => self.canvas,
                };
                let block = self.surface.clear_and_hide(&mut self.scene, destination)?;
                Ok(self.name_of(block))
            }
        }
    }

    /// Answers a read-only query.
    pub fn query(&self, query: Query) -> QueryResult {
        match query {
            Query::SurfaceTranslation => match self.surface.surface_translation(&self.scene) {
                Ok(offset) => QueryResult::Translation { offset },
                Err(err) => QueryResult::error(err.to_string()),
            },

            Query::CurrentBlock => QueryResult::CurrentBlock {
                block: self
                    .surface
                    .current_block(&self.scene)
                    .and_then(|node| self.name_of(node)),
            },

            Query::State => QueryResult::State {
                occupied: self.surface.state(&self.scene) == DragState::Occupied,
                scale: self.surface.scale(),
            },

            Query::Markup => QueryResult::Markup {
                markup: self.scene.to_markup(self.container),
            },
        }
    }

    /// Runs script steps in order, one outcome per executed step.
    ///
    /// With `stop_on_error`, execution ends after the first failing step.
    pub fn run(&mut self, steps: &[Step], stop_on_error: bool) -> Vec<StepOutcome> {
        let mut outcomes = Vec::with_capacity(steps.len());
        for step in steps {
            let outcome = match step {
                Step::Command(command) => StepOutcome::Command(self.execute(command.clone())),
                Step::Query(query) => StepOutcome::Query(self.query(query.clone())),
            };
            let failed = outcome.is_error();
            outcomes.push(outcome);
            if failed && stop_on_error {
                break;
            }
        }
        outcomes
    }
}
