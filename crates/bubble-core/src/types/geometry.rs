//! Geometry references carried by links
//!
//! The engine never loads mesh data. It only keeps enough of each
//! `<visual>`/`<collision>` element for a renderer to resolve it.

use serde::{Deserialize, Serialize};

use super::{Pose, vec3_from_urdf};

/// Tagged geometry reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryRef {
    /// Mesh file reference, resolved by the renderer
    Mesh {
        filename: String,
        scale: Option<[f32; 3]>,
    },
    Box {
        size: [f32; 3],
    },
    Cylinder {
        radius: f32,
        length: f32,
    },
    Sphere {
        radius: f32,
    },
    Capsule {
        radius: f32,
        length: f32,
    },
}

impl GeometryRef {
    /// Mesh filename, if this reference needs an external loader
    pub fn mesh_filename(&self) -> Option<&str> {
        match self {
            GeometryRef::Mesh { filename, .. } => Some(filename),
            _ => None,
        }
    }
}

impl From<&urdf_rs::Geometry> for GeometryRef {
    fn from(geometry: &urdf_rs::Geometry) -> Self {
        match geometry {
            urdf_rs::Geometry::Mesh { filename, scale } => GeometryRef::Mesh {
                filename: filename.clone(),
                scale: scale.as_ref().map(vec3_from_urdf),
            },
            urdf_rs::Geometry::Box { size } => GeometryRef::Box {
                size: vec3_from_urdf(size),
            },
            urdf_rs::Geometry::Cylinder { radius, length } => GeometryRef::Cylinder {
                radius: *radius as f32,
                length: *length as f32,
            },
            urdf_rs::Geometry::Sphere { radius } => GeometryRef::Sphere {
                radius: *radius as f32,
            },
            urdf_rs::Geometry::Capsule { radius, length } => GeometryRef::Capsule {
                radius: *radius as f32,
                length: *length as f32,
            },
        }
    }
}

/// A single visual or collision element of a link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryElement {
    pub name: Option<String>,
    /// Pose relative to the link frame
    pub origin: Pose,
    pub geometry: GeometryRef,
}

impl From<&urdf_rs::Visual> for GeometryElement {
    fn from(visual: &urdf_rs::Visual) -> Self {
        Self {
            name: visual.name.clone(),
            origin: Pose::from(&visual.origin),
            geometry: GeometryRef::from(&visual.geometry),
        }
    }
}

impl From<&urdf_rs::Collision> for GeometryElement {
    fn from(collision: &urdf_rs::Collision) -> Self {
        Self {
            name: collision.name.clone(),
            origin: Pose::from(&collision.origin),
            geometry: GeometryRef::from(&collision.geometry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_reference_is_kept_opaque() {
        let geometry = urdf_rs::Geometry::Mesh {
            filename: "package://robot/meshes/base.dae".to_string(),
            scale: Some(urdf_rs::Vec3([0.001, 0.001, 0.001])),
        };

        let geometry = GeometryRef::from(&geometry);
        assert_eq!(
            geometry.mesh_filename(),
            Some("package://robot/meshes/base.dae")
        );
        assert!(matches!(geometry, GeometryRef::Mesh { scale: Some(s), .. } if s[0] == 0.001));
    }

    #[test]
    fn test_primitive_has_no_mesh() {
        let geometry = GeometryRef::from(&urdf_rs::Geometry::Sphere { radius: 0.2 });
        assert_eq!(geometry, GeometryRef::Sphere { radius: 0.2 });
        assert_eq!(geometry.mesh_filename(), None);
    }
}
