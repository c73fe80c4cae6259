//! Collision spheres attached to links

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EditError;
use crate::model::{KinematicModel, LinkTransforms};
use crate::types::LinkIndex;

/// Sphere identifiers are unique across the whole store
pub type SphereId = Uuid;

/// A collision sphere expressed in its link's frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub id: SphereId,
    /// Owning link
    pub link: LinkIndex,
    /// Center in the owning link's frame
    pub center: Vec3,
    /// Always positive
    pub radius: f32,
    /// Optional display name
    pub name: Option<String>,
    pub visible: bool,
}

/// Partial update of a sphere's geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SphereUpdate {
    pub center: Option<Vec3>,
    pub radius: Option<f32>,
}

impl SphereUpdate {
    pub fn center(center: Vec3) -> Self {
        Self {
            center: Some(center),
            radius: None,
        }
    }

    pub fn radius(radius: f32) -> Self {
        Self {
            center: None,
            radius: Some(radius),
        }
    }
}

/// Reject non-positive (and NaN) radii
pub fn validate_radius(radius: f32) -> Result<f32, EditError> {
    if radius > 0.0 && radius.is_finite() {
        Ok(radius)
    } else {
        Err(EditError::InvalidRadius(radius))
    }
}

/// Reject centers with NaN or infinite coordinates
pub fn validate_center(center: Vec3) -> Result<Vec3, EditError> {
    if center.is_finite() {
        Ok(center)
    } else {
        Err(EditError::InvalidCenter(center.to_array()))
    }
}

/// Per-link ordered sphere lists for one robot
///
/// Lists are indexed like the model's links, so iterating the store yields
/// spheres in link declaration order, then insertion order. Every operation
/// validates before it mutates: a rejected call leaves the store untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereStore {
    link_names: Vec<String>,
    link_lookup: HashMap<String, LinkIndex>,
    lists: Vec<Vec<Sphere>>,
    owners: HashMap<SphereId, LinkIndex>,
}

impl SphereStore {
    /// Create an empty store for the links of `model`
    pub fn for_model(model: &KinematicModel) -> Self {
        let link_names: Vec<String> = model.links().iter().map(|l| l.name.clone()).collect();
        let link_lookup = link_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), LinkIndex(i)))
            .collect();
        Self {
            lists: vec![Vec::new(); link_names.len()],
            link_names,
            link_lookup,
            owners: HashMap::new(),
        }
    }

    /// Resolve a link name
    pub fn link_index(&self, link: &str) -> Result<LinkIndex, EditError> {
        self.link_lookup
            .get(link)
            .copied()
            .ok_or_else(|| EditError::UnknownLink(link.to_string()))
    }

    pub fn link_name(&self, link: LinkIndex) -> &str {
        &self.link_names[link.0]
    }

    pub fn link_count(&self) -> usize {
        self.link_names.len()
    }

    /// Add a sphere to the end of a link's list
    pub fn add(&mut self, link: &str, center: Vec3, radius: f32) -> Result<SphereId, EditError> {
        self.add_named(link, center, radius, None)
    }

    /// Add a sphere with a display name
    pub fn add_named(
        &mut self,
        link: &str,
        center: Vec3,
        radius: f32,
        name: Option<String>,
    ) -> Result<SphereId, EditError> {
        let link = self.link_index(link)?;
        self.add_to(link, center, radius, name)
    }

    pub(crate) fn add_to(
        &mut self,
        link: LinkIndex,
        center: Vec3,
        radius: f32,
        name: Option<String>,
    ) -> Result<SphereId, EditError> {
        if link.0 >= self.lists.len() {
            return Err(EditError::UnknownLink(link.to_string()));
        }
        let center = validate_center(center)?;
        let radius = validate_radius(radius)?;
        let id = Uuid::new_v4();
        self.lists[link.0].push(Sphere {
            id,
            link,
            center,
            radius,
            name,
            visible: true,
        });
        self.owners.insert(id, link);
        Ok(id)
    }

    /// Partially update a sphere's center and/or radius
    pub fn update(&mut self, id: SphereId, update: SphereUpdate) -> Result<(), EditError> {
        if let Some(center) = update.center {
            validate_center(center)?;
        }
        if let Some(radius) = update.radius {
            validate_radius(radius)?;
        }
        let sphere = self.get_mut(id)?;
        if let Some(center) = update.center {
            sphere.center = center;
        }
        if let Some(radius) = update.radius {
            sphere.radius = radius;
        }
        Ok(())
    }

    /// Remove a sphere. Removing an absent sphere is a no-op.
    pub fn remove(&mut self, id: SphereId) -> Option<Sphere> {
        let link = self.owners.remove(&id)?;
        let list = &mut self.lists[link.0];
        let position = list.iter().position(|s| s.id == id)?;
        Some(list.remove(position))
    }

    /// Move a sphere to another link, keeping its world position
    ///
    /// The sphere is appended to the end of the new link's list.
    pub fn reparent(
        &mut self,
        id: SphereId,
        new_link: &str,
        transforms: &LinkTransforms,
    ) -> Result<(), EditError> {
        let new_link = self.link_index(new_link)?;
        let old_link = self.owner(id).ok_or(EditError::UnknownSphere(id))?;
        if old_link == new_link {
            return Ok(());
        }

        let world = transforms.to_world(old_link, self.require(id)?.center);
        let center = validate_center(transforms.to_local(new_link, world))?;
        let Some(mut sphere) = self.remove(id) else {
            return Err(EditError::UnknownSphere(id));
        };
        sphere.center = center;
        sphere.link = new_link;
        self.lists[new_link.0].push(sphere);
        self.owners.insert(id, new_link);
        Ok(())
    }

    /// Spheres of a link in insertion order
    pub fn list_by_link(&self, link: &str) -> Result<&[Sphere], EditError> {
        let link = self.link_index(link)?;
        Ok(&self.lists[link.0])
    }

    pub fn spheres_of(&self, link: LinkIndex) -> &[Sphere] {
        &self.lists[link.0]
    }

    pub fn get(&self, id: SphereId) -> Option<&Sphere> {
        let link = self.owners.get(&id)?;
        self.lists[link.0].iter().find(|s| s.id == id)
    }

    /// Like [`SphereStore::get`] but reports a missing sphere as an error
    pub fn require(&self, id: SphereId) -> Result<&Sphere, EditError> {
        self.get(id).ok_or(EditError::UnknownSphere(id))
    }

    fn get_mut(&mut self, id: SphereId) -> Result<&mut Sphere, EditError> {
        let link = *self.owners.get(&id).ok_or(EditError::UnknownSphere(id))?;
        self.lists[link.0]
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(EditError::UnknownSphere(id))
    }

    /// Link owning a sphere
    pub fn owner(&self, id: SphereId) -> Option<LinkIndex> {
        self.owners.get(&id).copied()
    }

    pub fn contains(&self, id: SphereId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Set or clear a sphere's display name
    pub fn rename(&mut self, id: SphereId, name: Option<String>) -> Result<(), EditError> {
        self.get_mut(id)?.name = name;
        Ok(())
    }

    pub fn set_visible(&mut self, id: SphereId, visible: bool) -> Result<(), EditError> {
        self.get_mut(id)?.visible = visible;
        Ok(())
    }

    /// Toggle every sphere of a link, returning how many were touched
    pub fn set_link_visible(&mut self, link: &str, visible: bool) -> Result<usize, EditError> {
        let link = self.link_index(link)?;
        let list = &mut self.lists[link.0];
        for sphere in list.iter_mut() {
            sphere.visible = visible;
        }
        Ok(list.len())
    }

    /// All spheres, link declaration order then insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Sphere> {
        self.lists.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Sphere count per link, for links owning at least one sphere
    pub fn counts_by_link(&self) -> Vec<(&str, usize)> {
        self.lists
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.is_empty())
            .map(|(i, list)| (self.link_names[i].as_str(), list.len()))
            .collect()
    }

    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
        self.owners.clear();
    }
}
