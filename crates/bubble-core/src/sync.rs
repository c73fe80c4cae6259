//! World-space view of the sphere store
//!
//! Nothing is cached here. Every lookup composes the owning link's current
//! transform with the sphere's local center, so a pose can never be read
//! against an older configuration than the one the transforms came from.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::model::LinkTransforms;
use crate::spheres::{SphereId, SphereStore};
use crate::types::LinkIndex;

/// A sphere placed in the world frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldSphere {
    pub id: SphereId,
    pub link: LinkIndex,
    pub center: Vec3,
    pub radius: f32,
}

/// Borrowed pairing of link transforms and the sphere store
#[derive(Debug, Clone, Copy)]
pub struct PoseSynchronizer<'a> {
    transforms: &'a LinkTransforms,
    store: &'a SphereStore,
}

impl<'a> PoseSynchronizer<'a> {
    pub fn new(transforms: &'a LinkTransforms, store: &'a SphereStore) -> Self {
        Self { transforms, store }
    }

    /// World center and radius of a sphere
    pub fn world_pose_of(&self, id: SphereId) -> Result<WorldSphere, EditError> {
        let sphere = self.store.require(id)?;
        Ok(WorldSphere {
            id,
            link: sphere.link,
            center: self.transforms.to_world(sphere.link, sphere.center),
            radius: sphere.radius,
        })
    }

    pub fn link_transform(&self, link: LinkIndex) -> Mat4 {
        self.transforms.get(link)
    }

    /// Express a world point in a link's frame
    pub fn world_to_local(&self, link: LinkIndex, world: Vec3) -> Vec3 {
        self.transforms.to_local(link, world)
    }

    /// Express a world-frame displacement in a link's frame
    pub fn world_delta_to_local(&self, link: LinkIndex, delta: Vec3) -> Vec3 {
        self.transforms.get(link).inverse().transform_vector3(delta)
    }

    /// All spheres in world space, store order
    pub fn world_spheres(&self) -> impl Iterator<Item = WorldSphere> + '_ {
        self.store.iter().map(|sphere| WorldSphere {
            id: sphere.id,
            link: sphere.link,
            center: self.transforms.to_world(sphere.link, sphere.center),
            radius: sphere.radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JointConfiguration, KinematicModel};
    use crate::testing::TWO_LINK_URDF;
    use std::f32::consts::FRAC_PI_2;
    use uuid::Uuid;

    #[test]
    fn test_world_pose_follows_configuration() {
        let model = KinematicModel::from_urdf_str(TWO_LINK_URDF).unwrap();
        let mut store = SphereStore::for_model(&model);
        let id = store.add("arm_link", Vec3::new(0.0, 0.0, 0.1), 0.05).unwrap();

        let rest = model.forward_kinematics(&JointConfiguration::new());
        let at_rest = PoseSynchronizer::new(&rest.transforms, &store)
            .world_pose_of(id)
            .unwrap();
        assert!(at_rest.center.abs_diff_eq(Vec3::new(0.0, 0.0, 0.6), 1e-6));

        let bent = model.forward_kinematics(&JointConfiguration::new().with("hinge", FRAC_PI_2));
        let moved = PoseSynchronizer::new(&bent.transforms, &store)
            .world_pose_of(id)
            .unwrap();
        assert!(moved.center.abs_diff_eq(Vec3::new(0.1, 0.0, 0.5), 1e-6));
        assert_eq!(moved.radius, 0.05);
    }

    #[test]
    fn test_unknown_sphere() {
        let model = KinematicModel::from_urdf_str(TWO_LINK_URDF).unwrap();
        let store = SphereStore::for_model(&model);
        let fk = model.forward_kinematics(&JointConfiguration::new());
        let id = Uuid::new_v4();
        assert_eq!(
            PoseSynchronizer::new(&fk.transforms, &store).world_pose_of(id),
            Err(EditError::UnknownSphere(id))
        );
    }

    #[test]
    fn test_world_delta_ignores_translation() {
        let model = KinematicModel::from_urdf_str(TWO_LINK_URDF).unwrap();
        let store = SphereStore::for_model(&model);
        let fk = model.forward_kinematics(&JointConfiguration::new().with("hinge", FRAC_PI_2));
        let sync = PoseSynchronizer::new(&fk.transforms, &store);
        let arm = model.link_index("arm_link").unwrap();

        // world +X is the arm's local +Z once the hinge is at 90°
        let local = sync.world_delta_to_local(arm, Vec3::X);
        assert!(local.abs_diff_eq(Vec3::Z, 1e-6));
    }
}
