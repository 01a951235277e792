//! Top-level terrain configuration: TOML loading and boundary clamping.

use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use super::{MeshSettings, NoiseSettings, StreamingSettings};
use crate::error::TerrainError;
use crate::streaming::LodTable;
use crate::terrain::{RegionTable, MIN_NOISE_SCALE};

/// Everything needed to generate and stream terrain.
///
/// Every section is optional in the TOML file; missing values take the
/// defaults below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerrainConfig {
    pub noise: NoiseSettings,
    pub mesh: MeshSettings,
    pub regions: RegionTable,
    pub streaming: StreamingSettings,
}

impl TerrainConfig {
    /// Load, sanitize and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded terrain config from {}", path.display());
        Ok(config)
    }

    /// Parse, sanitize and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, TerrainError> {
        let config: Self = toml::from_str(text)?;
        let config = config.sanitized();
        config.lod_table()?;
        Ok(config)
    }

    /// Clamp numeric parameters into their valid ranges, warning on each change
    pub fn sanitized(mut self) -> Self {
        let noise = &mut self.noise;
        if noise.octaves < 0 {
            warn!("octaves {} is negative, using 0", noise.octaves);
            noise.octaves = 0;
        }
        if noise.lacunarity < 1.0 {
            warn!("lacunarity {} is below 1, using 1", noise.lacunarity);
            noise.lacunarity = 1.0;
        }
        if noise.scale <= 0.0 {
            warn!("scale {} is not positive, using {}", noise.scale, MIN_NOISE_SCALE);
            noise.scale = MIN_NOISE_SCALE;
        }
        if !(0.0..=1.0).contains(&noise.persistence) {
            let clamped = noise.persistence.clamp(0.0, 1.0);
            warn!("persistence {} is outside [0, 1], using {}", noise.persistence, clamped);
            noise.persistence = clamped;
        }

        let mesh = &mut self.mesh;
        if mesh.height_multiplier < 0.0 {
            warn!("height multiplier {} is negative, using 0", mesh.height_multiplier);
            mesh.height_multiplier = 0.0;
        }
        if mesh.map_chunk_size < 2 {
            warn!("map chunk size {} is below 2, using 2", mesh.map_chunk_size);
            mesh.map_chunk_size = 2;
        }

        let streaming = &mut self.streaming;
        if streaming.viewer_move_threshold < 0.0 {
            warn!(
                "viewer move threshold {} is negative, using 0",
                streaming.viewer_move_threshold
            );
            streaming.viewer_move_threshold = 0.0;
        }

        self
    }

    /// Validated LOD table for the configured map size
    pub fn lod_table(&self) -> Result<LodTable, TerrainError> {
        LodTable::new(
            self.streaming.detail_levels.clone(),
            self.mesh.map_chunk_size,
        )
    }

    /// World-space width of one streamed chunk
    pub fn chunk_size(&self) -> f32 {
        self.mesh.chunk_size()
    }

    /// Worker thread count with 0 resolved to the CPU count
    pub fn worker_threads(&self) -> usize {
        match self.streaming.worker_threads {
            0 => num_cpus::get(),
            n => n,
        }
    }
}
