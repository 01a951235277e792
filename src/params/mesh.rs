//! Mesh and map-size settings.

use serde::Deserialize;

use crate::terrain::HeightCurve;

/// Map side length whose edge count (240) divides evenly by every
/// stride in 1, 2, 4, 6, 8, 10, 12.
pub const DEFAULT_MAP_CHUNK_SIZE: usize = 241;

/// Tessellation settings shared by previews and streamed chunks
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeshSettings {
    /// Height-field samples per side (vertices per side at LOD 0)
    pub map_chunk_size: usize,

    /// Vertical scale applied after the height curve (meters)
    pub height_multiplier: f32,

    /// Remaps normalized heights before scaling
    pub height_curve: HeightCurve,

    /// LOD used by the single-map preview export
    pub preview_lod: u32,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            map_chunk_size: DEFAULT_MAP_CHUNK_SIZE,
            height_multiplier: 36.0,
            height_curve: HeightCurve::flat_below(0.4), // Keep water flat
            preview_lod: 0,
        }
    }
}

impl MeshSettings {
    /// World-space chunk width: one less than the sample count
    pub fn chunk_size(&self) -> f32 {
        self.map_chunk_size.saturating_sub(1) as f32
    }
}
