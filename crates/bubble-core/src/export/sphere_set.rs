//! Flat, re-loadable sphere-set document

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::write_atomic;
use crate::error::{EditError, ExportError};
use crate::model::KinematicModel;
use crate::spheres::SphereStore;

/// One sphere, in its link's frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereRecord {
    pub link: String,
    pub center: [f32; 3],
    pub radius: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Every sphere of one robot, link declaration order then insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereSet {
    #[serde(default = "SphereSet::current_version")]
    pub version: u32,
    /// Robot the set was authored for
    #[serde(default)]
    pub robot: String,
    pub spheres: Vec<SphereRecord>,
}

impl SphereSet {
    /// Current document version
    pub const CURRENT_VERSION: u32 = 1;

    fn current_version() -> u32 {
        Self::CURRENT_VERSION
    }

    /// Snapshot the store
    pub fn from_store(robot: &str, store: &SphereStore) -> Self {
        let spheres = store
            .iter()
            .map(|sphere| SphereRecord {
                link: store.link_name(sphere.link).to_string(),
                center: sphere.center.to_array(),
                radius: sphere.radius,
                name: sphere.name.clone(),
            })
            .collect();
        Self {
            version: Self::CURRENT_VERSION,
            robot: robot.to_string(),
            spheres,
        }
    }

    /// Build a fresh store for `model` holding these spheres
    ///
    /// Fails as a whole on the first record naming an unknown link or
    /// carrying a non-positive radius.
    pub fn to_store(&self, model: &KinematicModel) -> Result<SphereStore, EditError> {
        if !self.robot.is_empty() && self.robot != model.name() {
            tracing::warn!(
                "Sphere set was authored for '{}', loading it onto '{}'",
                self.robot,
                model.name()
            );
        }
        let mut store = SphereStore::for_model(model);
        for record in &self.spheres {
            store.add_named(
                &record.link,
                Vec3::from(record.center),
                record.radius,
                record.name.clone(),
            )?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn to_json_string(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::Serialize(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> Result<Self, ExportError> {
        serde_json::from_str(json).map_err(|e| ExportError::Deserialize(e.to_string()))
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ExportError> {
        serde_json::from_slice(bytes).map_err(|e| ExportError::Deserialize(e.to_string()))
    }

    /// Read a sphere-set file
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let bytes = std::fs::read(path).map_err(|e| ExportError::Io(e.to_string()))?;
        let set = Self::from_json_bytes(&bytes)?;
        tracing::info!("Loaded {} spheres from {:?}", set.len(), path);
        Ok(set)
    }

    /// Write the set, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        write_atomic(path, self.to_json_string()?.as_bytes())?;
        tracing::info!("Exported {} spheres to {:?}", self.len(), path);
        Ok(())
    }
}
