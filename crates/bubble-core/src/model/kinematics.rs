//! Forward kinematics

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::KinematicModel;
use crate::types::{JointIndex, JointType, LinkIndex};

/// Joint values keyed by joint name. Joints left out take their rest value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointConfiguration {
    values: HashMap<String, f32>,
}

impl JointConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, joint: impl Into<String>, value: f32) {
        self.values.insert(joint.into(), value);
    }

    pub fn with(mut self, joint: impl Into<String>, value: f32) -> Self {
        self.set(joint, value);
        self
    }

    pub fn get(&self, joint: &str) -> Option<f32> {
        self.values.get(joint).copied()
    }

    pub fn remove(&mut self, joint: &str) -> Option<f32> {
        self.values.remove(joint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f32)> for JointConfiguration {
    fn from_iter<T: IntoIterator<Item = (String, f32)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A requested joint value that was pulled back into the joint's range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClampedJoint {
    pub joint: String,
    pub requested: f32,
    pub applied: f32,
}

/// World transform of every link, indexed by [`LinkIndex`]
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTransforms {
    poses: Vec<Mat4>,
}

impl LinkTransforms {
    /// All links at the world origin
    pub fn identity(link_count: usize) -> Self {
        Self {
            poses: vec![Mat4::IDENTITY; link_count],
        }
    }

    pub fn get(&self, link: LinkIndex) -> Mat4 {
        self.poses[link.0]
    }

    /// Map a point from the link frame into the world frame
    pub fn to_world(&self, link: LinkIndex, local: Vec3) -> Vec3 {
        self.poses[link.0].transform_point3(local)
    }

    /// Map a world point into the link frame
    pub fn to_local(&self, link: LinkIndex, world: Vec3) -> Vec3 {
        self.poses[link.0].inverse().transform_point3(world)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LinkIndex, Mat4)> + '_ {
        self.poses.iter().enumerate().map(|(i, m)| (LinkIndex(i), *m))
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

/// Result of a forward kinematics pass
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardKinematics {
    pub transforms: LinkTransforms,
    /// Applied value per joint, indexed by [`JointIndex`]
    pub joint_values: Vec<f32>,
    /// Requested values that were out of range
    pub clamped: Vec<ClampedJoint>,
}

impl KinematicModel {
    /// Configuration holding the rest value of every actuated joint
    pub fn rest_configuration(&self) -> JointConfiguration {
        self.actuated_joints()
            .map(|(_, joint)| (joint.name.clone(), joint.rest))
            .collect()
    }

    /// Resolve the value every joint takes under `config`
    ///
    /// Missing joints take their rest value, out-of-range values are clamped
    /// and reported, mimic joints follow their source.
    pub fn resolve_joint_values(&self, config: &JointConfiguration) -> (Vec<f32>, Vec<ClampedJoint>) {
        let mut values = vec![0.0; self.joint_count()];
        let mut clamped = Vec::new();

        for (index, joint) in self.actuated_joints() {
            let requested = config.get(&joint.name).unwrap_or(joint.rest);
            let applied = if requested.is_finite() {
                joint.limits.clamp(requested)
            } else {
                joint.rest
            };
            if applied != requested {
                clamped.push(ClampedJoint {
                    joint: joint.name.clone(),
                    requested,
                    applied,
                });
            }
            values[index.0] = applied;
        }

        for (name, _) in config.iter() {
            if self.joint_index(name).is_none() {
                tracing::debug!("Ignoring value for unknown joint '{}'", name);
            }
        }

        for (index, joint) in self.joints().iter().enumerate() {
            if joint.mimic.is_some() {
                values[index] = self.mimic_value(JointIndex(index), &values);
            }
        }

        (values, clamped)
    }

    /// Mimic chains are acyclic (checked at load) and end at an actuated joint
    fn mimic_value(&self, index: JointIndex, values: &[f32]) -> f32 {
        let joint = self.joint(index);
        match joint.mimic {
            Some(mimic) => {
                let source = self.mimic_value(mimic.joint, values);
                joint.limits.clamp(mimic.calculate(source))
            }
            None => values[index.0],
        }
    }

    /// Compute the world transform of every link under `config`
    ///
    /// Pure: depends only on the model and the configuration.
    pub fn forward_kinematics(&self, config: &JointConfiguration) -> ForwardKinematics {
        let (joint_values, clamped) = self.resolve_joint_values(config);
        let mut poses = vec![Mat4::IDENTITY; self.link_count()];

        for &link in self.traversal_order() {
            let Some(joint_index) = self.link(link).parent_joint else {
                continue;
            };
            let joint = self.joint(joint_index);
            let motion =
                compute_joint_transform(joint.joint_type, joint.axis, joint_values[joint_index.0]);
            poses[link.0] = poses[joint.parent_link.0] * joint.origin.to_mat4() * motion;
        }

        ForwardKinematics {
            transforms: LinkTransforms { poses },
            joint_values,
            clamped,
        }
    }
}

/// Compute the transform for a joint at a given position
pub fn compute_joint_transform(joint_type: JointType, axis: Vec3, position: f32) -> Mat4 {
    match joint_type {
        JointType::Revolute | JointType::Continuous => {
            Mat4::from_quat(Quat::from_axis_angle(axis, position))
        }
        JointType::Prismatic => Mat4::from_translation(axis * position),
        JointType::Fixed => Mat4::IDENTITY,
    }
}
