//! Robot description loading and tree validation

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use glam::Vec3;

use super::{Joint, KinematicModel, Link};
use crate::error::ModelError;
use crate::types::{
    GeometryElement, JointIndex, JointLimits, JointMimic, JointType, LinkIndex, Pose,
    vec3_from_urdf,
};

impl KinematicModel {
    /// Load a URDF file
    pub fn from_urdf_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::Io(format!(
                "file not found: {}",
                path.display()
            )));
        }
        let xml = std::fs::read_to_string(path).map_err(|e| ModelError::Io(e.to_string()))?;
        tracing::info!("Loaded URDF from {:?}", path);
        Self::from_urdf_str(&xml)
    }

    /// Parse URDF XML text
    pub fn from_urdf_str(xml: &str) -> Result<Self, ModelError> {
        let robot = urdf_rs::read_from_string(xml).map_err(|e| ModelError::Urdf(e.to_string()))?;
        Self::build(robot, xml.to_string())
    }

    /// Parse URDF XML bytes (must be UTF-8)
    pub fn from_urdf_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let xml = std::str::from_utf8(bytes).map_err(|e| ModelError::Urdf(e.to_string()))?;
        Self::from_urdf_str(xml)
    }

    /// Build and validate the kinematic tree of an already parsed description
    ///
    /// Without source text the exported description is regenerated by
    /// urdf-rs, which only knows links, joints and materials.
    pub fn from_robot(robot: urdf_rs::Robot) -> Result<Self, ModelError> {
        let source = urdf_rs::write_to_string(&robot).map_err(|e| ModelError::Urdf(e.to_string()))?;
        Self::build(robot, source)
    }

    fn build(robot: urdf_rs::Robot, source: String) -> Result<Self, ModelError> {
        if robot.links.is_empty() {
            return Err(ModelError::EmptyRobot);
        }

        let mut links = Vec::with_capacity(robot.links.len());
        let mut link_lookup = HashMap::with_capacity(robot.links.len());
        for urdf_link in &robot.links {
            let index = LinkIndex(links.len());
            if link_lookup.insert(urdf_link.name.clone(), index).is_some() {
                return Err(ModelError::DuplicateLink(urdf_link.name.clone()));
            }
            links.push(Link {
                name: urdf_link.name.clone(),
                parent_joint: None,
                visuals: urdf_link.visual.iter().map(GeometryElement::from).collect(),
                collisions: urdf_link
                    .collision
                    .iter()
                    .map(GeometryElement::from)
                    .collect(),
            });
        }

        let mut joints = Vec::with_capacity(robot.joints.len());
        let mut joint_lookup = HashMap::with_capacity(robot.joints.len());
        let mut children = vec![Vec::new(); links.len()];
        for urdf_joint in &robot.joints {
            let index = JointIndex(joints.len());
            if joint_lookup.insert(urdf_joint.name.clone(), index).is_some() {
                return Err(ModelError::DuplicateJoint(urdf_joint.name.clone()));
            }

            let parent_link = *link_lookup.get(&urdf_joint.parent.link).ok_or_else(|| {
                ModelError::UnknownParentLink {
                    joint: urdf_joint.name.clone(),
                    link: urdf_joint.parent.link.clone(),
                }
            })?;
            let child_link = *link_lookup.get(&urdf_joint.child.link).ok_or_else(|| {
                ModelError::UnknownChildLink {
                    joint: urdf_joint.name.clone(),
                    link: urdf_joint.child.link.clone(),
                }
            })?;

            let child = &mut links[child_link.0];
            if child.parent_joint.is_some() {
                return Err(ModelError::MultipleParents(child.name.clone()));
            }
            child.parent_joint = Some(index);
            children[parent_link.0].push(index);

            joints.push(convert_joint(urdf_joint, parent_link, child_link)?);
        }

        resolve_mimics(&robot.joints, &joint_lookup, &mut joints)?;

        let roots: Vec<LinkIndex> = (0..links.len())
            .map(LinkIndex)
            .filter(|l| links[l.0].parent_joint.is_none())
            .collect();
        let root = match roots.as_slice() {
            [] => return Err(ModelError::NoRoot),
            [root] => *root,
            _ => {
                return Err(ModelError::MultipleRoots(
                    roots.iter().map(|l| links[l.0].name.clone()).collect(),
                ));
            }
        };

        // Every link has at most one parent, so anything unreachable from the
        // root sits on a cycle
        let mut order = Vec::with_capacity(links.len());
        let mut queue = VecDeque::from([root]);
        while let Some(link) = queue.pop_front() {
            order.push(link);
            queue.extend(children[link.0].iter().map(|j| joints[j.0].child_link));
        }
        if order.len() != links.len() {
            let mut reached = vec![false; links.len()];
            for link in &order {
                reached[link.0] = true;
            }
            let stray = reached.iter().position(|r| !r).unwrap_or_default();
            return Err(ModelError::Cycle(links[stray].name.clone()));
        }

        tracing::info!(
            "Built kinematic model '{}': {} links, {} joints, root '{}'",
            robot.name,
            links.len(),
            joints.len(),
            links[root.0].name
        );

        Ok(Self {
            name: robot.name,
            links,
            joints,
            link_lookup,
            joint_lookup,
            children,
            root,
            order,
            source,
        })
    }
}

/// Convert a URDF joint, leaving the mimic reference for a second pass
fn convert_joint(
    urdf_joint: &urdf_rs::Joint,
    parent_link: LinkIndex,
    child_link: LinkIndex,
) -> Result<Joint, ModelError> {
    let joint_type = JointType::from_urdf(&urdf_joint.joint_type).unwrap_or_else(|| {
        tracing::warn!(
            "Joint '{}' has unsupported type {:?}, treating it as fixed",
            urdf_joint.name,
            urdf_joint.joint_type
        );
        JointType::Fixed
    });

    let axis = if joint_type.has_axis() {
        let axis = Vec3::from(vec3_from_urdf(&urdf_joint.axis.xyz));
        axis.try_normalize()
            .ok_or_else(|| ModelError::ZeroAxis(urdf_joint.name.clone()))?
    } else {
        Vec3::Z
    };

    let limits = if joint_type.has_limits() {
        let lower = urdf_joint.limit.lower as f32;
        let upper = urdf_joint.limit.upper as f32;
        if lower > upper {
            return Err(ModelError::InvalidLimits {
                joint: urdf_joint.name.clone(),
                lower,
                upper,
            });
        }
        JointLimits::with_range(lower, upper)
    } else {
        JointLimits::unbounded()
    };

    Ok(Joint {
        name: urdf_joint.name.clone(),
        joint_type,
        parent_link,
        child_link,
        origin: Pose::from(&urdf_joint.origin),
        axis,
        limits,
        rest: limits.clamp(0.0),
        mimic: None,
    })
}

fn resolve_mimics(
    urdf_joints: &[urdf_rs::Joint],
    joint_lookup: &HashMap<String, JointIndex>,
    joints: &mut [Joint],
) -> Result<(), ModelError> {
    for (joint, urdf_joint) in joints.iter_mut().zip(urdf_joints) {
        let Some(mimic) = &urdf_joint.mimic else {
            continue;
        };
        if joint.joint_type == JointType::Fixed {
            continue;
        }
        let source = *joint_lookup
            .get(&mimic.joint)
            .ok_or_else(|| ModelError::UnknownMimicJoint {
                joint: urdf_joint.name.clone(),
                target: mimic.joint.clone(),
            })?;
        joint.mimic = Some(JointMimic {
            joint: source,
            multiplier: mimic.multiplier.unwrap_or(1.0) as f32,
            offset: mimic.offset.unwrap_or(0.0) as f32,
        });
    }

    // A chain longer than the joint count must loop
    for start in 0..joints.len() {
        let mut current = JointIndex(start);
        let mut steps = 0;
        while let Some(mimic) = joints[current.0].mimic {
            current = mimic.joint;
            steps += 1;
            if steps > joints.len() {
                return Err(ModelError::MimicCycle(joints[start].name.clone()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ARM_URDF, TWO_LINK_URDF};

    fn model_from(links: &str, joints: &str) -> Result<KinematicModel, ModelError> {
        KinematicModel::from_urdf_str(&format!(
            r#"<robot name="test">{links}{joints}</robot>"#
        ))
    }

    fn joint(name: &str, parent: &str, child: &str) -> String {
        format!(
            r#"<joint name="{name}" type="fixed"><parent link="{parent}"/><child link="{child}"/></joint>"#
        )
    }

    #[test]
    fn test_load_two_link() {
        let model = KinematicModel::from_urdf_str(TWO_LINK_URDF).unwrap();
        assert_eq!(model.name(), "two_link");
        assert_eq!(model.link_count(), 2);
        assert_eq!(model.joint_count(), 1);

        let base = model.link_index("base_link").unwrap();
        let arm = model.link_index("arm_link").unwrap();
        assert_eq!(model.root(), base);
        assert_eq!(model.parent_link(arm), Some(base));
        assert_eq!(model.parent_link(base), None);

        let hinge = model.joint(model.joint_index("hinge").unwrap());
        assert_eq!(hinge.joint_type, JointType::Revolute);
        assert_eq!(hinge.limits, JointLimits::with_range(0.0, std::f32::consts::PI));
        assert!(hinge.axis.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_traversal_order_is_root_first() {
        let model = KinematicModel::from_urdf_str(ARM_URDF).unwrap();
        let order = model.traversal_order();
        assert_eq!(order.len(), model.link_count());
        for (position, link) in order.iter().enumerate() {
            if let Some(parent) = model.parent_link(*link) {
                let parent_position = order.iter().position(|l| *l == parent).unwrap();
                assert!(parent_position < position);
            }
        }
    }

    #[test]
    fn test_geometry_references_kept() {
        let model = KinematicModel::from_urdf_str(ARM_URDF).unwrap();
        let base = model.link(model.link_index("base").unwrap());
        assert_eq!(base.visuals.len(), 1);
        assert_eq!(
            base.visuals[0].geometry.mesh_filename(),
            Some("meshes/base.stl")
        );
        assert_eq!(base.collisions.len(), 1);
    }

    #[test]
    fn test_empty_robot_rejected() {
        let result = KinematicModel::from_urdf_str(r#"<robot name="empty"></robot>"#);
        assert_eq!(result.unwrap_err(), ModelError::EmptyRobot);
    }

    #[test]
    fn test_malformed_xml_rejected() {
        let result = KinematicModel::from_urdf_str("<robot name=\"broken\"><link name=");
        assert!(matches!(result, Err(ModelError::Urdf(_))));
    }

    #[test]
    fn test_duplicate_link_rejected() {
        let result = model_from(r#"<link name="a"/><link name="a"/>"#, "");
        assert_eq!(result.unwrap_err(), ModelError::DuplicateLink("a".into()));
    }

    #[test]
    fn test_duplicate_joint_rejected() {
        let result = model_from(
            r#"<link name="a"/><link name="b"/><link name="c"/>"#,
            &(joint("j", "a", "b") + &joint("j", "a", "c")),
        );
        assert_eq!(result.unwrap_err(), ModelError::DuplicateJoint("j".into()));
    }

    #[test]
    fn test_dangling_joint_rejected() {
        let result = model_from(r#"<link name="a"/>"#, &joint("j", "a", "ghost"));
        assert!(matches!(
            result,
            Err(ModelError::UnknownChildLink { link, .. }) if link == "ghost"
        ));

        let result = model_from(r#"<link name="a"/>"#, &joint("j", "ghost", "a"));
        assert!(matches!(
            result,
            Err(ModelError::UnknownParentLink { link, .. }) if link == "ghost"
        ));
    }

    #[test]
    fn test_two_parents_rejected() {
        let result = model_from(
            r#"<link name="a"/><link name="b"/><link name="c"/>"#,
            &(joint("j1", "a", "c") + &joint("j2", "b", "c")),
        );
        assert_eq!(result.unwrap_err(), ModelError::MultipleParents("c".into()));
    }

    #[test]
    fn test_cycle_rejected() {
        let result = model_from(
            r#"<link name="root"/><link name="a"/><link name="b"/>"#,
            &(joint("j1", "a", "b") + &joint("j2", "b", "a")),
        );
        assert!(matches!(result, Err(ModelError::Cycle(_))));

        let result = model_from(
            r#"<link name="a"/><link name="b"/>"#,
            &(joint("j1", "a", "b") + &joint("j2", "b", "a")),
        );
        assert_eq!(result.unwrap_err(), ModelError::NoRoot);
    }

    #[test]
    fn test_forest_rejected() {
        let result = model_from(r#"<link name="a"/><link name="b"/>"#, "");
        assert!(matches!(result, Err(ModelError::MultipleRoots(roots)) if roots.len() == 2));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let result = model_from(
            r#"<link name="a"/><link name="b"/>"#,
            r#"<joint name="j" type="revolute"><parent link="a"/><child link="b"/>
               <axis xyz="0 0 1"/><limit lower="1" upper="-1" effort="1" velocity="1"/></joint>"#,
        );
        assert!(matches!(result, Err(ModelError::InvalidLimits { .. })));
    }

    #[test]
    fn test_unsupported_joint_type_becomes_fixed() {
        let model = model_from(
            r#"<link name="a"/><link name="b"/>"#,
            r#"<joint name="j" type="floating"><parent link="a"/><child link="b"/></joint>"#,
        )
        .unwrap();
        assert_eq!(model.joints()[0].joint_type, JointType::Fixed);
    }

    #[test]
    fn test_mimic_resolved() {
        let model = KinematicModel::from_urdf_str(ARM_URDF).unwrap();
        let finger = model.joint(model.joint_index("finger_right").unwrap());
        let mimic = finger.mimic.unwrap();
        assert_eq!(mimic.joint, model.joint_index("finger_left").unwrap());
        assert_eq!(mimic.multiplier, -1.0);
        assert!(!finger.is_actuated());
    }

    #[test]
    fn test_unknown_mimic_rejected() {
        let result = model_from(
            r#"<link name="a"/><link name="b"/>"#,
            r#"<joint name="j" type="continuous"><parent link="a"/><child link="b"/>
               <axis xyz="0 0 1"/><mimic joint="nope"/></joint>"#,
        );
        assert!(matches!(result, Err(ModelError::UnknownMimicJoint { .. })));
    }

    #[test]
    fn test_rest_value_clamped_into_range() {
        let model = model_from(
            r#"<link name="a"/><link name="b"/>"#,
            r#"<joint name="j" type="prismatic"><parent link="a"/><child link="b"/>
               <axis xyz="1 0 0"/><limit lower="0.2" upper="0.5" effort="1" velocity="1"/></joint>"#,
        )
        .unwrap();
        assert_eq!(model.joints()[0].rest, 0.2);
    }
}
