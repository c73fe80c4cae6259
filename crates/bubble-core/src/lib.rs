//! Bubblify core: collision-sphere authoring for URDF robots
//!
//! This crate contains everything except drawing:
//! - Model: URDF loading into an index-based kinematic tree
//! - Kinematics: forward kinematics for a joint configuration
//! - Spheres: per-link collision spheres in link-local coordinates
//! - Selection and undo history
//! - Session: the edit controller consuming discrete events
//! - Export: sphere-set documents and spherized URDF

pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod frame;
pub mod history;
pub mod model;
pub mod selection;
pub mod session;
pub mod spheres;
pub mod sync;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::*;
pub use error::*;
pub use events::*;
pub use export::*;
pub use frame::*;
pub use history::*;
pub use model::*;
pub use selection::*;
pub use session::*;
pub use spheres::*;
pub use sync::*;
pub use types::*;
