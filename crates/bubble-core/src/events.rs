//! Discrete edit, selection and configuration events
//!
//! Input sources (sliders, buttons, scripted input) push events; the session
//! consumes them one at a time, each to completion.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::EditFrame;
use crate::model::{ClampedJoint, JointConfiguration};
use crate::spheres::SphereId;

/// A single operator interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditEvent {
    SetJoint {
        joint: String,
        value: f32,
    },
    /// Replace the whole configuration; joints left out return to rest
    SetConfiguration {
        values: JointConfiguration,
    },
    ResetJoints,
    SelectLink {
        link: String,
    },
    SelectSphere {
        sphere: SphereId,
    },
    Deselect,
    /// Missing fields fall back to the active link and configured defaults
    AddSphere {
        #[serde(default)]
        link: Option<String>,
        #[serde(default)]
        center: Option<Vec3>,
        #[serde(default)]
        radius: Option<f32>,
        #[serde(default)]
        name: Option<String>,
    },
    MoveActiveSphere {
        delta: Vec3,
        #[serde(default)]
        frame: Option<EditFrame>,
    },
    PlaceActiveSphere {
        position: Vec3,
        #[serde(default)]
        frame: Option<EditFrame>,
    },
    ResizeActiveSphere {
        delta: f32,
    },
    SetActiveSphereRadius {
        radius: f32,
    },
    RemoveSphere {
        sphere: SphereId,
    },
    RemoveActiveSphere,
    ReparentSphere {
        sphere: SphereId,
        link: String,
    },
    RenameSphere {
        sphere: SphereId,
        #[serde(default)]
        name: Option<String>,
    },
    SetSphereVisible {
        sphere: SphereId,
        visible: bool,
    },
    SetLinkSpheresVisible {
        link: String,
        visible: bool,
    },
    Undo,
    Redo,
}

impl EditEvent {
    /// Check if this event should be included in undo history
    pub fn is_undoable(&self) -> bool {
        match self {
            // Selection is not undoable (UX preference)
            EditEvent::SelectLink { .. } | EditEvent::SelectSphere { .. } | EditEvent::Deselect => {
                false
            }

            // Joint values change continuously while dragging
            EditEvent::SetJoint { .. }
            | EditEvent::SetConfiguration { .. }
            | EditEvent::ResetJoints => false,

            EditEvent::Undo | EditEvent::Redo => false,

            _ => true,
        }
    }

    /// Get a description of the event for display
    pub fn description(&self) -> &'static str {
        match self {
            EditEvent::SetJoint { .. } => "Set Joint",
            EditEvent::SetConfiguration { .. } => "Set Configuration",
            EditEvent::ResetJoints => "Reset Joints",
            EditEvent::SelectLink { .. } => "Select Link",
            EditEvent::SelectSphere { .. } => "Select Sphere",
            EditEvent::Deselect => "Deselect",
            EditEvent::AddSphere { .. } => "Add Sphere",
            EditEvent::MoveActiveSphere { .. } => "Move Sphere",
            EditEvent::PlaceActiveSphere { .. } => "Place Sphere",
            EditEvent::ResizeActiveSphere { .. } | EditEvent::SetActiveSphereRadius { .. } => {
                "Resize Sphere"
            }
            EditEvent::RemoveSphere { .. } | EditEvent::RemoveActiveSphere => "Remove Sphere",
            EditEvent::ReparentSphere { .. } => "Reparent Sphere",
            EditEvent::RenameSphere { .. } => "Rename Sphere",
            EditEvent::SetSphereVisible { .. } | EditEvent::SetLinkSpheresVisible { .. } => {
                "Toggle Sphere Visibility"
            }
            EditEvent::Undo => "Undo",
            EditEvent::Redo => "Redo",
        }
    }
}

/// What an accepted event did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// Accepted, but there was nothing to change
    Unchanged,
    SphereAdded { sphere: SphereId },
    /// Joint values were applied; out-of-range requests were clamped
    JointsUpdated { clamped: Vec<ClampedJoint> },
}

/// FIFO of pending events
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<EditEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EditEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<EditEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Extend<EditEvent> for EventQueue {
    fn extend<T: IntoIterator<Item = EditEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
