//! Scripted viewer paths that drive chunk streaming.

use glam::Vec2;

use crate::params::{FixedViewer, StraightPath, SweepingPath, ViewerPath};

/// Supplies the viewer's ground-plane position once per tick
pub trait ViewerPositionSource {
    /// Position (world x, world z) at `time_s` seconds
    fn position_at(&self, time_s: f32) -> Vec2;
}

/// Viewer system following one of the preset paths
#[derive(Debug, Clone, Default)]
pub struct ViewerSystem {
    path: ViewerPath,
}

impl ViewerSystem {
    /// Create new viewer system with specified path
    pub fn new(path: ViewerPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &ViewerPath {
        &self.path
    }

    fn compute_fixed_path(p: &FixedViewer) -> Vec2 {
        Vec2::from_array(p.position)
    }

    /// Constant heading, measured clockwise from +z
    fn compute_straight_path(p: &StraightPath, time_s: f32) -> Vec2 {
        let heading = p.heading_deg.to_radians();
        let direction = Vec2::new(heading.sin(), heading.cos());
        Vec2::from_array(p.start) + direction * p.speed_m_per_s * time_s
    }

    /// Layered sine arcs on x, forward progress with weaving on z
    fn compute_sweeping_path(p: &SweepingPath, time_s: f32) -> Vec2 {
        let x = (time_s * p.x_freq_primary_hz).sin() * p.x_amplitude_primary_m
            + (time_s * p.x_freq_secondary_hz).sin() * p.x_amplitude_secondary_m;

        let z = time_s * p.forward_speed_m_per_s
            + (time_s * p.weave_freq_hz).sin() * p.weave_amplitude_m;

        Vec2::new(x, z)
    }
}

impl ViewerPositionSource for ViewerSystem {
    fn position_at(&self, time_s: f32) -> Vec2 {
        match &self.path {
            ViewerPath::Fixed(params) => Self::compute_fixed_path(params),
            ViewerPath::Straight(params) => Self::compute_straight_path(params, time_s),
            ViewerPath::Sweeping(params) => Self::compute_sweeping_path(params, time_s),
        }
    }
}
