//! Editing session: one robot, its configuration, spheres and selection
//!
//! The session is the only owner of mutable engine state. Every change goes
//! through one of its methods (directly or via [`Session::dispatch`]) and is
//! applied to completion before the next one starts.

use std::path::Path;

use glam::Vec3;

use crate::config::{AppConfig, EditFrame};
use crate::error::{EditError, ExportError};
use crate::events::{EditEvent, EventQueue, Outcome};
use crate::export::{self, SphereSet, spherize_urdf};
use crate::frame::{Frame, FrameSink, LinkFrame, SphereFrame};
use crate::history::{Checkpoint, EditHistory};
use crate::model::{ClampedJoint, ForwardKinematics, JointConfiguration, KinematicModel, LinkTransforms};
use crate::selection::Selection;
use crate::spheres::{SphereId, SphereStore, SphereUpdate, validate_radius};
use crate::sync::{PoseSynchronizer, WorldSphere};

pub struct Session {
    model: KinematicModel,
    config: AppConfig,
    /// Requested values of actuated joints, already clamped into range
    configuration: JointConfiguration,
    kinematics: ForwardKinematics,
    store: SphereStore,
    selection: Selection,
    history: EditHistory,
    queue: EventQueue,
}

impl Session {
    pub fn new(model: KinematicModel, config: AppConfig) -> Self {
        let configuration = model.rest_configuration();
        let kinematics = model.forward_kinematics(&configuration);
        let store = SphereStore::for_model(&model);
        let history = EditHistory::new(config.editor.history_depth);
        Self {
            model,
            config,
            configuration,
            kinematics,
            store,
            selection: Selection::Idle,
            history,
            queue: EventQueue::new(),
        }
    }

    /// Switch to another robot. Spheres, selection, history and pending
    /// events of the previous robot are dropped; export them first if needed.
    pub fn load_robot(&mut self, model: KinematicModel) {
        tracing::info!(
            "Replacing robot '{}' ({} spheres dropped) with '{}'",
            self.model.name(),
            self.store.len(),
            model.name()
        );
        self.configuration = model.rest_configuration();
        self.kinematics = model.forward_kinematics(&self.configuration);
        self.store = SphereStore::for_model(&model);
        self.selection = Selection::Idle;
        self.history.clear();
        self.queue.clear();
        self.model = model;
    }

    pub fn model(&self) -> &KinematicModel {
        &self.model
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn store(&self) -> &SphereStore {
        &self.store
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn configuration(&self) -> &JointConfiguration {
        &self.configuration
    }

    pub fn transforms(&self) -> &LinkTransforms {
        &self.kinematics.transforms
    }

    /// Applied value per joint, mimic joints included
    pub fn joint_values(&self) -> &[f32] {
        &self.kinematics.joint_values
    }

    pub fn pose_sync(&self) -> PoseSynchronizer<'_> {
        PoseSynchronizer::new(&self.kinematics.transforms, &self.store)
    }

    pub fn world_pose_of(&self, id: SphereId) -> Result<WorldSphere, EditError> {
        self.pose_sync().world_pose_of(id)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Label of the edit `undo` would revert, for menus and status lines
    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    // ------------------------------------------------------------------
    // Joint configuration
    // ------------------------------------------------------------------

    /// Set one actuated joint; the stored value is the clamped one
    pub fn set_joint(&mut self, joint: &str, value: f32) -> Result<Vec<ClampedJoint>, EditError> {
        let index = self
            .model
            .joint_index(joint)
            .ok_or_else(|| EditError::UnknownJoint(joint.to_string()))?;
        if !self.model.joint(index).is_actuated() {
            return Err(EditError::JointNotActuated(joint.to_string()));
        }
        let mut configuration = self.configuration.clone();
        configuration.set(joint, value);
        Ok(self.apply_configuration(configuration))
    }

    /// Replace the configuration; joints left out return to rest
    pub fn set_configuration(&mut self, configuration: JointConfiguration) -> Vec<ClampedJoint> {
        self.apply_configuration(configuration)
    }

    pub fn reset_joints(&mut self) {
        self.apply_configuration(self.model.rest_configuration());
    }

    fn apply_configuration(&mut self, requested: JointConfiguration) -> Vec<ClampedJoint> {
        let kinematics = self.model.forward_kinematics(&requested);
        for clamped in &kinematics.clamped {
            tracing::warn!(
                "Joint '{}' value {} out of range, clamped to {}",
                clamped.joint,
                clamped.requested,
                clamped.applied
            );
        }
        self.configuration = self
            .model
            .actuated_joints()
            .map(|(index, joint)| (joint.name.clone(), kinematics.joint_values[index.0]))
            .collect();
        let clamped = kinematics.clamped.clone();
        self.kinematics = kinematics;
        clamped
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select_link(&mut self, link: &str) -> Result<(), EditError> {
        self.selection.select_link(link, &self.store)
    }

    pub fn select_sphere(&mut self, id: SphereId) -> Result<(), EditError> {
        self.selection.select_sphere(id, &self.store)
    }

    pub fn deselect(&mut self) {
        self.selection.deselect();
    }

    fn active_sphere(&self) -> Result<SphereId, EditError> {
        self.selection.active_sphere().ok_or(EditError::NoActiveSphere)
    }

    // ------------------------------------------------------------------
    // Sphere edits
    // ------------------------------------------------------------------

    /// Run an edit and record the state it started from if it changed the store
    fn record<T>(
        &mut self,
        description: &str,
        edit: impl FnOnce(&mut Self) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        let store_before = self.store.clone();
        let selection_before = self.selection;
        let result = edit(self)?;
        if self.store != store_before {
            self.history.record(&store_before, selection_before, description);
        }
        Ok(result)
    }

    /// Add a sphere to `link` (or the active link), using configured defaults
    /// for a missing center or radius
    pub fn add_sphere(
        &mut self,
        link: Option<&str>,
        center: Option<Vec3>,
        radius: Option<f32>,
        name: Option<String>,
    ) -> Result<SphereId, EditError> {
        let link = match link {
            Some(name) => self.store.link_index(name)?,
            None => self.selection.active_link().ok_or(EditError::NoActiveLink)?,
        };
        let center = center.unwrap_or_else(|| Vec3::from(self.config.spheres.default_center));
        let radius = radius.unwrap_or(self.config.spheres.default_radius);

        self.record("Add Sphere", |session| {
            let id = session.store.add_to(link, center, radius, name)?;
            if session.config.editor.select_new_spheres {
                session.selection.focus_sphere(id, &session.store)?;
            }
            Ok(id)
        })
    }

    /// Translate the active sphere. A world-frame delta is mapped through the
    /// owning link's current pose before it is stored.
    pub fn move_active_sphere(&mut self, delta: Vec3, frame: EditFrame) -> Result<(), EditError> {
        let id = self.active_sphere()?;
        let sphere = self.store.require(id)?;
        let center = match frame {
            EditFrame::Local => sphere.center + delta,
            EditFrame::World => {
                let sync = self.pose_sync();
                let world = sync.world_pose_of(id)?.center + delta;
                sync.world_to_local(sphere.link, world)
            }
        };
        self.record("Move Sphere", |session| {
            session.store.update(id, SphereUpdate::center(center))
        })
    }

    /// Put the active sphere's center at `position`
    pub fn place_active_sphere(
        &mut self,
        position: Vec3,
        frame: EditFrame,
    ) -> Result<(), EditError> {
        let id = self.active_sphere()?;
        let link = self.store.require(id)?.link;
        let center = match frame {
            EditFrame::Local => position,
            EditFrame::World => self.pose_sync().world_to_local(link, position),
        };
        self.record("Place Sphere", |session| {
            session.store.update(id, SphereUpdate::center(center))
        })
    }

    /// Grow or shrink the active sphere
    pub fn resize_active_sphere(&mut self, delta_radius: f32) -> Result<(), EditError> {
        let id = self.active_sphere()?;
        let radius = self.store.require(id)?.radius + delta_radius;
        self.record("Resize Sphere", |session| {
            session.store.update(id, SphereUpdate::radius(radius))
        })
    }

    /// Set the active sphere's radius, raised to the configured minimum
    pub fn set_active_sphere_radius(&mut self, radius: f32) -> Result<(), EditError> {
        let id = self.active_sphere()?;
        let radius = validate_radius(radius)?.max(self.config.spheres.min_radius);
        self.record("Resize Sphere", |session| {
            session.store.update(id, SphereUpdate::radius(radius))
        })
    }

    /// Remove a sphere; returns whether anything was removed
    pub fn remove_sphere(&mut self, id: SphereId) -> bool {
        let removed = self
            .record("Remove Sphere", |session| Ok(session.store.remove(id).is_some()))
            .unwrap_or(false);
        self.selection.reconcile(&self.store);
        removed
    }

    pub fn remove_active_sphere(&mut self) -> Result<(), EditError> {
        let id = self.active_sphere()?;
        self.remove_sphere(id);
        Ok(())
    }

    /// Move a sphere to another link, keeping its world position
    pub fn reparent_sphere(&mut self, id: SphereId, link: &str) -> Result<(), EditError> {
        self.record("Reparent Sphere", |session| {
            session
                .store
                .reparent(id, link, &session.kinematics.transforms)?;
            session.selection.reconcile(&session.store);
            Ok(())
        })
    }

    pub fn rename_sphere(&mut self, id: SphereId, name: Option<String>) -> Result<(), EditError> {
        self.record("Rename Sphere", |session| session.store.rename(id, name))
    }

    pub fn set_sphere_visible(&mut self, id: SphereId, visible: bool) -> Result<(), EditError> {
        self.record("Toggle Sphere Visibility", |session| {
            session.store.set_visible(id, visible)
        })
    }

    pub fn set_link_spheres_visible(&mut self, link: &str, visible: bool) -> Result<usize, EditError> {
        self.record("Toggle Sphere Visibility", |session| {
            session.store.set_link_visible(link, visible)
        })
    }

    /// Restore the state before the last recorded edit
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.store, self.selection) {
            Some(checkpoint) => {
                tracing::debug!("Undo: {}", checkpoint.label);
                self.restore(checkpoint);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.store, self.selection) {
            Some(checkpoint) => {
                tracing::debug!("Redo: {}", checkpoint.label);
                self.restore(checkpoint);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.store = checkpoint.store;
        self.selection = checkpoint.selection;
        self.selection.reconcile(&self.store);
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Queue an event for [`Session::process_pending`]
    pub fn push_event(&mut self, event: EditEvent) {
        self.queue.push(event);
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Apply queued events in arrival order, one at a time
    pub fn process_pending(&mut self) -> Vec<Result<Outcome, EditError>> {
        let mut results = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.queue.pop() {
            results.push(self.dispatch(event));
        }
        results
    }

    /// Apply a single event
    pub fn dispatch(&mut self, event: EditEvent) -> Result<Outcome, EditError> {
        let description = event.description();
        let result = self.apply_event(event);
        match &result {
            Ok(outcome) => tracing::debug!("{}: {:?}", description, outcome),
            Err(e) => tracing::warn!("{} rejected: {}", description, e),
        }
        result
    }

    fn apply_event(&mut self, event: EditEvent) -> Result<Outcome, EditError> {
        let default_frame = self.config.editor.move_frame;
        let outcome = match event {
            EditEvent::SetJoint { joint, value } => Outcome::JointsUpdated {
                clamped: self.set_joint(&joint, value)?,
            },
            EditEvent::SetConfiguration { values } => Outcome::JointsUpdated {
                clamped: self.set_configuration(values),
            },
            EditEvent::ResetJoints => {
                self.reset_joints();
                Outcome::JointsUpdated {
                    clamped: Vec::new(),
                }
            }
            EditEvent::SelectLink { link } => {
                self.select_link(&link)?;
                Outcome::Applied
            }
            EditEvent::SelectSphere { sphere } => {
                self.select_sphere(sphere)?;
                Outcome::Applied
            }
            EditEvent::Deselect => {
                self.deselect();
                Outcome::Applied
            }
            EditEvent::AddSphere {
                link,
                center,
                radius,
                name,
            } => Outcome::SphereAdded {
                sphere: self.add_sphere(link.as_deref(), center, radius, name)?,
            },
            EditEvent::MoveActiveSphere { delta, frame } => {
                self.move_active_sphere(delta, frame.unwrap_or(default_frame))?;
                Outcome::Applied
            }
            EditEvent::PlaceActiveSphere { position, frame } => {
                self.place_active_sphere(position, frame.unwrap_or(default_frame))?;
                Outcome::Applied
            }
            EditEvent::ResizeActiveSphere { delta } => {
                self.resize_active_sphere(delta)?;
                Outcome::Applied
            }
            EditEvent::SetActiveSphereRadius { radius } => {
                self.set_active_sphere_radius(radius)?;
                Outcome::Applied
            }
            EditEvent::RemoveSphere { sphere } => {
                if self.remove_sphere(sphere) {
                    Outcome::Applied
                } else {
                    Outcome::Unchanged
                }
            }
            EditEvent::RemoveActiveSphere => {
                self.remove_active_sphere()?;
                Outcome::Applied
            }
            EditEvent::ReparentSphere { sphere, link } => {
                self.reparent_sphere(sphere, &link)?;
                Outcome::Applied
            }
            EditEvent::RenameSphere { sphere, name } => {
                self.rename_sphere(sphere, name)?;
                Outcome::Applied
            }
            EditEvent::SetSphereVisible { sphere, visible } => {
                self.set_sphere_visible(sphere, visible)?;
                Outcome::Applied
            }
            EditEvent::SetLinkSpheresVisible { link, visible } => {
                self.set_link_spheres_visible(&link, visible)?;
                Outcome::Applied
            }
            EditEvent::Undo => {
                if self.undo() {
                    Outcome::Applied
                } else {
                    Outcome::Unchanged
                }
            }
            EditEvent::Redo => {
                if self.redo() {
                    Outcome::Applied
                } else {
                    Outcome::Unchanged
                }
            }
        };
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Snapshot of link poses and world-space spheres
    pub fn frame(&self) -> Frame<'_> {
        let links = self
            .model
            .links()
            .iter()
            .zip(self.kinematics.transforms.iter())
            .map(|(link, (index, transform))| LinkFrame {
                link: index,
                name: &link.name,
                transform,
                visuals: &link.visuals,
                collisions: &link.collisions,
            })
            .collect();

        let spheres = self
            .pose_sync()
            .world_spheres()
            .zip(self.store.iter())
            .map(|(world, sphere)| SphereFrame {
                id: world.id,
                link: world.link,
                center: world.center,
                radius: world.radius,
                selected: self.selection.is_selected(world.id),
                visible: sphere.visible,
            })
            .collect();

        Frame {
            links,
            spheres,
            active_link: self.selection.active_link(),
            sphere_opacity: self.config.spheres.opacity,
            show_visual: self.config.display.show_visual,
            show_collision: self.config.display.show_collision,
        }
    }

    /// Hand the current frame to a renderer
    pub fn publish(&self, sink: &mut impl FrameSink) {
        sink.present(&self.frame());
    }

    // ------------------------------------------------------------------
    // Import / export
    // ------------------------------------------------------------------

    pub fn export_sphere_set(&self) -> SphereSet {
        SphereSet::from_store(self.model.name(), &self.store)
    }

    /// The original description with every sphere added as a collision
    pub fn export_urdf(&self) -> Result<String, ExportError> {
        spherize_urdf(self.model.source_xml(), &self.export_sphere_set())
    }

    pub fn save_sphere_set(&self, path: &Path) -> Result<(), ExportError> {
        self.export_sphere_set().save(path)
    }

    pub fn save_urdf(&self, path: &Path) -> Result<(), ExportError> {
        export::save_urdf(&self.export_urdf()?, path)
    }

    /// Replace every sphere with the contents of `set`. Undoable.
    pub fn load_sphere_set(&mut self, set: &SphereSet) -> Result<(), ExportError> {
        let store = set.to_store(&self.model)?;
        self.record("Import Spheres", |session| {
            session.store = store;
            session.selection.reconcile(&session.store);
            Ok(())
        })?;
        tracing::info!("Imported {} spheres", self.store.len());
        Ok(())
    }

    pub fn load_sphere_set_file(&mut self, path: &Path) -> Result<(), ExportError> {
        let set = SphereSet::load(path)?;
        self.load_sphere_set(&set)
    }
}
