//! Chunk-level terrain synthesis: height field, colors and meshes.

use glam::Vec2;

use super::mesh::{generate_terrain_mesh, MeshData};
use super::noise_map::{generate_noise_map, HeightField, NormalizeMode};
use super::regions::{RegionTable, Rgba};
use crate::params::{MeshSettings, NoiseSettings, TerrainConfig};

/// Height field plus its color classification for one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    pub height_field: HeightField,
    pub color_map: Vec<Rgba>,
}

impl MapData {
    pub fn width(&self) -> usize {
        self.height_field.width()
    }

    pub fn height(&self) -> usize {
        self.height_field.height()
    }
}

/// Stateless generator shared by the streaming workers.
///
/// Holds an immutable copy of the settings, so it is `Send + Sync` and can
/// be called from any thread.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    noise: NoiseSettings,
    mesh: MeshSettings,
    regions: RegionTable,
}

impl TerrainGenerator {
    pub fn new(config: &TerrainConfig) -> Self {
        Self {
            noise: config.noise.clone(),
            mesh: config.mesh.clone(),
            regions: config.regions.clone(),
        }
    }

    /// Side length, in samples, of every generated map
    pub fn map_chunk_size(&self) -> usize {
        self.mesh.map_chunk_size
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Generate the height field and color map centered on `center`
    pub fn generate_map_data(&self, center: Vec2, mode: NormalizeMode) -> MapData {
        let size = self.map_chunk_size();
        let params = self.noise.parameters(center, mode);
        let height_field = generate_noise_map(size, size, &params);
        let color_map = self.regions.color_map(&height_field);

        MapData {
            height_field,
            color_map,
        }
    }

    /// Tessellate `map_data` at the given level of detail
    pub fn generate_mesh(&self, map_data: &MapData, lod: u32) -> MeshData {
        generate_terrain_mesh(
            &map_data.height_field,
            self.mesh.height_multiplier,
            &self.mesh.height_curve,
            lod,
        )
    }
}
