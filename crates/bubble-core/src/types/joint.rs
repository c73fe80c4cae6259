//! Joint-related type definitions

use serde::{Deserialize, Serialize};

use super::JointIndex;

/// Joint type
///
/// The kinematic engine only moves along a single scalar degree of freedom,
/// so the set is closed to the four one-dimensional URDF joint kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JointType {
    #[default]
    Fixed,
    Revolute,
    Continuous,
    Prismatic,
}

impl JointType {
    /// Map a URDF joint type. Returns `None` for multi-DOF kinds
    /// (floating, planar, spherical).
    pub fn from_urdf(urdf_type: &urdf_rs::JointType) -> Option<Self> {
        match urdf_type {
            urdf_rs::JointType::Fixed => Some(JointType::Fixed),
            urdf_rs::JointType::Revolute => Some(JointType::Revolute),
            urdf_rs::JointType::Continuous => Some(JointType::Continuous),
            urdf_rs::JointType::Prismatic => Some(JointType::Prismatic),
            urdf_rs::JointType::Floating
            | urdf_rs::JointType::Planar
            | urdf_rs::JointType::Spherical => None,
        }
    }

    /// Check if this joint type has an axis
    pub fn has_axis(&self) -> bool {
        !matches!(self, JointType::Fixed)
    }

    /// Check if this joint type has limits
    pub fn has_limits(&self) -> bool {
        matches!(self, JointType::Revolute | JointType::Prismatic)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            JointType::Fixed => "Fixed",
            JointType::Revolute => "Revolute",
            JointType::Continuous => "Continuous",
            JointType::Prismatic => "Prismatic",
        }
    }
}

/// Joint value range. A missing bound means the joint is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointLimits {
    /// Lower position limit (rad or m)
    pub lower: Option<f32>,
    /// Upper position limit (rad or m)
    pub upper: Option<f32>,
}

impl JointLimits {
    /// No bounds at all (continuous joints)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create limits with specified range
    pub fn with_range(lower: f32, upper: f32) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        self.lower.is_none_or(|l| value >= l) && self.upper.is_none_or(|u| value <= u)
    }

    /// Clamp a value into the range
    pub fn clamp(&self, value: f32) -> f32 {
        let value = self.lower.map_or(value, |l| value.max(l));
        self.upper.map_or(value, |u| value.min(u))
    }
}

/// Joint mimic configuration
/// Makes this joint follow another joint's position: value = multiplier * other_joint + offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointMimic {
    /// Joint to mimic
    pub joint: JointIndex,
    /// Multiplier applied to the mimicked joint's position (default: 1.0)
    pub multiplier: f32,
    /// Offset added after multiplication (default: 0.0)
    pub offset: f32,
}

impl JointMimic {
    /// Calculate the mimic value from the source joint's position
    pub fn calculate(&self, source_position: f32) -> f32 {
        self.multiplier * source_position + self.offset
    }
}
