//! Pose type definition

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Pose (position and orientation) as written in a URDF `<origin>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub xyz: [f32; 3],
    /// Roll, pitch, yaw in radians (fixed-axis X, then Y, then Z)
    pub rpy: [f32; 3],
}

impl Pose {
    pub fn new(xyz: [f32; 3], rpy: [f32; 3]) -> Self {
        Self { xyz, rpy }
    }

    pub fn from_position(xyz: [f32; 3]) -> Self {
        Self { xyz, rpy: [0.0; 3] }
    }

    /// Rotation of this pose. URDF composes rpy as `Rz(yaw) * Ry(pitch) * Rx(roll)`.
    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::ZYX, self.rpy[2], self.rpy[1], self.rpy[0])
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.to_quat(), self.position())
    }

    /// Get position as Vec3
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.xyz)
    }
}

impl From<&urdf_rs::Pose> for Pose {
    fn from(urdf_pose: &urdf_rs::Pose) -> Self {
        Self {
            xyz: vec3_from_urdf(&urdf_pose.xyz),
            rpy: vec3_from_urdf(&urdf_pose.rpy),
        }
    }
}

/// Narrow a URDF (f64) vector to the f32 precision used by the kinematics
pub fn vec3_from_urdf(v: &urdf_rs::Vec3) -> [f32; 3] {
    [v.0[0] as f32, v.0[1] as f32, v.0[2] as f32]
}

/// Widen an f32 vector back to URDF precision
pub fn vec3_to_urdf(v: Vec3) -> urdf_rs::Vec3 {
    urdf_rs::Vec3([v.x as f64, v.y as f64, v.z as f64])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_from_urdf_pose() {
        let urdf_pose = urdf_rs::Pose {
            xyz: urdf_rs::Vec3([1.0, 2.0, 3.0]),
            rpy: urdf_rs::Vec3([0.1, 0.2, 0.3]),
        };

        let pose = Pose::from(&urdf_pose);
        assert_eq!(pose.xyz, [1.0, 2.0, 3.0]);
        assert_eq!(pose.rpy, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_yaw_rotates_about_z() {
        let pose = Pose::new([0.0; 3], [0.0, 0.0, FRAC_PI_2]);
        let p = pose.to_mat4().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_rpy_is_fixed_axis_order() {
        // roll then yaw about fixed axes: Y is first rolled onto Z, yaw leaves Z alone
        let pose = Pose::new([0.0; 3], [FRAC_PI_2, 0.0, FRAC_PI_2]);
        let p = pose.to_mat4().transform_point3(Vec3::Y);
        assert!(p.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_translation_applied_after_rotation() {
        let pose = Pose::new([1.0, 0.0, 0.0], [0.0, 0.0, FRAC_PI_2]);
        let p = pose.to_mat4().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }
}
