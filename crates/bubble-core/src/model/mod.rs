//! Kinematic model: link/joint tree of a robot description
//!
//! The tree is stored as flat arrays indexed by [`LinkIndex`] and
//! [`JointIndex`]. Every link knows its parent joint, every joint knows both
//! of its links, and `order` lists links root-first so a single forward pass
//! visits each parent before its children.

mod kinematics;
mod load;

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::{
    GeometryElement, JointIndex, JointLimits, JointMimic, JointType, LinkIndex, Pose,
};

pub use kinematics::{ClampedJoint, ForwardKinematics, JointConfiguration, LinkTransforms};

/// A rigid body of the robot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    /// Joint connecting this link to its parent (None for the root)
    pub parent_joint: Option<JointIndex>,
    /// Visual elements
    pub visuals: Vec<GeometryElement>,
    /// Collision elements declared in the description
    pub collisions: Vec<GeometryElement>,
}

/// A single-DOF joint connecting two links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub name: String,
    pub joint_type: JointType,
    pub parent_link: LinkIndex,
    pub child_link: LinkIndex,
    /// Transform from parent link to joint origin
    pub origin: Pose,
    /// Unit motion axis in the joint frame
    pub axis: Vec3,
    pub limits: JointLimits,
    /// Value used when a configuration leaves this joint out
    pub rest: f32,
    pub mimic: Option<JointMimic>,
}

impl Joint {
    /// Whether the joint contributes an independent degree of freedom
    pub fn is_actuated(&self) -> bool {
        self.joint_type != JointType::Fixed && self.mimic.is_none()
    }
}

/// Immutable kinematic topology of one robot
#[derive(Debug, Clone)]
pub struct KinematicModel {
    name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    link_lookup: HashMap<String, LinkIndex>,
    joint_lookup: HashMap<String, JointIndex>,
    /// Child joints per link, in declaration order
    children: Vec<Vec<JointIndex>>,
    root: LinkIndex,
    /// Links sorted so every parent precedes its children
    order: Vec<LinkIndex>,
    /// URDF text the model was built from, kept verbatim for export
    source: String,
}

impl KinematicModel {
    /// Robot name from the description
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn link(&self, index: LinkIndex) -> &Link {
        &self.links[index.0]
    }

    pub fn joint(&self, index: JointIndex) -> &Joint {
        &self.joints[index.0]
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Look up a link by name
    pub fn link_index(&self, name: &str) -> Option<LinkIndex> {
        self.link_lookup.get(name).copied()
    }

    /// Look up a joint by name
    pub fn joint_index(&self, name: &str) -> Option<JointIndex> {
        self.joint_lookup.get(name).copied()
    }

    pub fn root(&self) -> LinkIndex {
        self.root
    }

    /// Parent link of `link`, or None for the root
    pub fn parent_link(&self, link: LinkIndex) -> Option<LinkIndex> {
        self.links[link.0]
            .parent_joint
            .map(|j| self.joints[j.0].parent_link)
    }

    /// Joints whose parent is `link`
    pub fn child_joints(&self, link: LinkIndex) -> &[JointIndex] {
        &self.children[link.0]
    }

    /// Links in root-first order
    pub fn traversal_order(&self) -> &[LinkIndex] {
        &self.order
    }

    /// Joints that take a value from the configuration (non-fixed, non-mimic)
    pub fn actuated_joints(&self) -> impl Iterator<Item = (JointIndex, &Joint)> {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, j)| j.is_actuated())
            .map(|(i, j)| (JointIndex(i), j))
    }

    /// The URDF text the model was loaded from
    pub fn source_xml(&self) -> &str {
        &self.source
    }
}
