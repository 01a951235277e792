//! Viewer path configuration and presets.
//!
//! Positions are on the ground plane: `x` is world x, `y` is world z.

/// Stationary viewer (for debugging)
#[derive(Debug, Clone)]
pub struct FixedViewer {
    /// Ground position (meters)
    pub position: [f32; 2],
}

impl Default for FixedViewer {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
        }
    }
}

/// Straight-line travel at constant speed
#[derive(Debug, Clone)]
pub struct StraightPath {
    /// Starting ground position (meters)
    pub start: [f32; 2],

    /// Heading in degrees, clockwise from +z
    pub heading_deg: f32,

    /// Travel speed (meters per second)
    pub speed_m_per_s: f32,
}

impl Default for StraightPath {
    fn default() -> Self {
        Self {
            start: [0.0, 0.0],
            heading_deg: 0.0,     // Due "north" (+z)
            speed_m_per_s: 150.0, // Fast enough to cross a chunk in under 2s
        }
    }
}

/// Sweeping arcs on x with forward progress on z
#[derive(Debug, Clone)]
pub struct SweepingPath {
    /// Primary x oscillation frequency (Hz)
    pub x_freq_primary_hz: f32,

    /// Primary x oscillation amplitude (meters)
    pub x_amplitude_primary_m: f32,

    /// Secondary x oscillation frequency (Hz)
    pub x_freq_secondary_hz: f32,

    /// Secondary x oscillation amplitude (meters)
    pub x_amplitude_secondary_m: f32,

    /// Forward movement speed along z (meters per second)
    pub forward_speed_m_per_s: f32,

    /// Weave frequency along z (Hz)
    pub weave_freq_hz: f32,

    /// Weave amplitude along z (meters)
    pub weave_amplitude_m: f32,
}

impl Default for SweepingPath {
    fn default() -> Self {
        Self {
            x_freq_primary_hz: 0.2,
            x_amplitude_primary_m: 400.0,
            x_freq_secondary_hz: 0.7,
            x_amplitude_secondary_m: 60.0,
            forward_speed_m_per_s: 80.0,
            weave_freq_hz: 0.5,
            weave_amplitude_m: 40.0,
        }
    }
}

/// Viewer path selection
#[derive(Debug, Clone)]
pub enum ViewerPath {
    /// Stationary viewer
    Fixed(FixedViewer),

    /// Constant heading and speed
    Straight(StraightPath),

    /// Layered sine arcs while moving forward
    Sweeping(SweepingPath),
}

impl Default for ViewerPath {
    fn default() -> Self {
        Self::Straight(StraightPath::default())
    }
}
