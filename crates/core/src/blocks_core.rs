//! # Core utilities shared by the block editor crates
//!
//! This crate holds the small, dependency-light pieces the rendering layer is
//! built on: the transform codec used to write and read back element
//! translations, and the drag surface configuration.

pub mod config;
pub mod transform;

pub use config::{ConfigError, DragSurfaceConfig};
pub use transform::GroupTransform;
