//! Sphere-set and spherized URDF export
//!
//! Both artifacts are whole-file writes: content goes to a sibling temporary
//! file first and is renamed over the target, so a failed export never leaves
//! a truncated file behind.

mod sphere_set;
mod urdf;

use std::path::Path;

use crate::error::ExportError;

pub use sphere_set::{SphereRecord, SphereSet};
pub use urdf::{sphere_collision_name, spherize_urdf};
pub(crate) use urdf::save_urdf;

/// Replace `path` with `contents` in one step
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ExportError::Io(format!("not a file path: {}", path.display())))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    std::fs::write(&tmp, contents).map_err(|e| ExportError::Io(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ExportError::Io(e.to_string())
    })
}
