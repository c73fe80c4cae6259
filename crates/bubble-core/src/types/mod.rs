//! Core type definitions

mod geometry;
mod index;
mod joint;
mod pose;

pub use geometry::*;
pub use index::*;
pub use joint::*;
pub use pose::*;
