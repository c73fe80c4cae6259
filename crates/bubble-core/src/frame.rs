//! Per-frame scene snapshot handed to a renderer

use glam::{Mat4, Vec3};
use serde::Serialize;

use crate::spheres::SphereId;
use crate::types::{GeometryElement, LinkIndex};

/// Pose and geometry references of one link
#[derive(Debug, Clone, Serialize)]
pub struct LinkFrame<'a> {
    pub link: LinkIndex,
    pub name: &'a str,
    pub transform: Mat4,
    pub visuals: &'a [GeometryElement],
    pub collisions: &'a [GeometryElement],
}

/// A sphere as the renderer should draw it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SphereFrame {
    pub id: SphereId,
    pub link: LinkIndex,
    pub center: Vec3,
    pub radius: f32,
    pub selected: bool,
    pub visible: bool,
}

/// Everything a renderer needs for one frame. Read-only view of the session.
#[derive(Debug, Clone, Serialize)]
pub struct Frame<'a> {
    pub links: Vec<LinkFrame<'a>>,
    pub spheres: Vec<SphereFrame>,
    pub active_link: Option<LinkIndex>,
    pub sphere_opacity: f32,
    pub show_visual: bool,
    pub show_collision: bool,
}

impl Frame<'_> {
    pub fn sphere(&self, id: SphereId) -> Option<&SphereFrame> {
        self.spheres.iter().find(|s| s.id == id)
    }

    pub fn selected_sphere(&self) -> Option<&SphereFrame> {
        self.spheres.iter().find(|s| s.selected)
    }
}

/// Consumer of frame snapshots (the rendering side)
pub trait FrameSink {
    fn present(&mut self, frame: &Frame<'_>);
}
