//! Drag API - command and query interface for driving a drag surface.
//!
//! This crate defines the typed command language a drag controller speaks.
//! Commands are:
//! - Serializable (for recording and replaying drag episodes)
//! - Name-based (blocks are referred to by the names they were created with)
//!
//! # Example
//! ```ignore
//! use api::{Command, DragSession};
//!
//! let mut session = DragSession::new(DragSurfaceConfig::default())?;
//! session.execute(Command::Initialize);
//! session.execute(Command::PickUp { block: "move_steps".into() });
//! session.execute(Command::TranslateSurface { offset: Vec2::new(10.0, 20.0) });
//! session.execute(Command::Drop { destination: None });
//! ```

mod command;
mod executor;
mod query;

pub use command::*;
pub use executor::{DragSession, Script, SessionError, Step, StepOutcome};
pub use query::*;
