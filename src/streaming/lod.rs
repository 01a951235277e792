//! Level-of-detail bands and distance-based selection.

use serde::Deserialize;

use crate::error::TerrainError;
use crate::terrain::simplification_increment;

/// One LOD band: chunks up to `visible_distance_threshold` away use `lod`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelOfDetailInfo {
    pub lod: u32,
    pub visible_distance_threshold: f32,
}

impl LevelOfDetailInfo {
    pub const fn new(lod: u32, visible_distance_threshold: f32) -> Self {
        Self {
            lod,
            visible_distance_threshold,
        }
    }
}

/// Validated, ordered LOD bands
#[derive(Debug, Clone, PartialEq)]
pub struct LodTable {
    levels: Vec<LevelOfDetailInfo>,
}

impl LodTable {
    /// Check the bands against the map size.
    ///
    /// Requires at least one band, strictly increasing thresholds, and a
    /// sampling stride that lands on the map edge for every band.
    pub fn new(
        levels: Vec<LevelOfDetailInfo>,
        map_chunk_size: usize,
    ) -> Result<Self, TerrainError> {
        if levels.is_empty() {
            return Err(TerrainError::InvalidLodTable(
                "at least one detail level is required".to_string(),
            ));
        }

        for pair in levels.windows(2) {
            if !(pair[1].visible_distance_threshold > pair[0].visible_distance_threshold) {
                return Err(TerrainError::InvalidLodTable(format!(
                    "thresholds must increase strictly ({} then {})",
                    pair[0].visible_distance_threshold, pair[1].visible_distance_threshold
                )));
            }
        }

        let edges = map_chunk_size.saturating_sub(1);
        for level in &levels {
            let stride = simplification_increment(level.lod);
            if edges % stride != 0 {
                return Err(TerrainError::InvalidLodTable(format!(
                    "lod {} samples every {} vertices, which does not divide {} edges",
                    level.lod, stride, edges
                )));
            }
        }

        Ok(Self { levels })
    }

    /// View radius: the last band's threshold
    pub fn max_view_distance(&self) -> f32 {
        self.levels
            .last()
            .map_or(0.0, |level| level.visible_distance_threshold)
    }

    /// Band index for a viewer distance.
    ///
    /// A distance exactly on a threshold stays in the finer band; anything
    /// past the last threshold uses the coarsest band.
    pub fn select(&self, distance: f32) -> usize {
        let mut index = 0;
        for (i, level) in self.levels[..self.levels.len() - 1].iter().enumerate() {
            if distance > level.visible_distance_threshold {
                index = i + 1;
            } else {
                break;
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&LevelOfDetailInfo> {
        self.levels.get(index)
    }

    pub fn levels(&self) -> &[LevelOfDetailInfo] {
        &self.levels
    }
}
