//! Height-band classification and color maps.

use serde::Deserialize;

use super::noise_map::HeightField;

/// RGBA8 color
pub type Rgba = [u8; 4];

/// Color for heights above every region
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Named height band: applies to heights up to and including `height`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerrainType {
    pub name: String,
    pub height: f32,
    pub color: [u8; 3],
}

impl TerrainType {
    pub fn new(name: impl Into<String>, height: f32, color: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            height,
            color,
        }
    }

    pub fn rgba(&self) -> Rgba {
        let [r, g, b] = self.color;
        [r, g, b, 255]
    }
}

/// Regions ordered by ascending height threshold
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Vec<TerrainType>")]
pub struct RegionTable {
    regions: Vec<TerrainType>,
}

impl From<Vec<TerrainType>> for RegionTable {
    fn from(regions: Vec<TerrainType>) -> Self {
        Self::new(regions)
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new(vec![
            TerrainType::new("deep water", 0.3, [51, 99, 193]),
            TerrainType::new("shallow water", 0.4, [54, 103, 199]),
            TerrainType::new("sand", 0.45, [210, 208, 125]),
            TerrainType::new("grass", 0.55, [86, 152, 23]),
            TerrainType::new("grass 2", 0.6, [62, 107, 18]),
            TerrainType::new("rock", 0.7, [90, 69, 60]),
            TerrainType::new("rock 2", 0.9, [75, 60, 53]),
            TerrainType::new("snow", 1.0, [255, 255, 255]),
        ])
    }
}

impl RegionTable {
    /// Sort regions by height; equal thresholds keep their given order
    pub fn new(mut regions: Vec<TerrainType>) -> Self {
        regions.sort_by(|a, b| a.height.total_cmp(&b.height));
        Self { regions }
    }

    pub fn regions(&self) -> &[TerrainType] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// First region whose threshold is at or above `height`
    pub fn classify(&self, height: f32) -> Option<&TerrainType> {
        self.regions.iter().find(|region| height <= region.height)
    }

    pub fn color_of(&self, height: f32) -> Rgba {
        self.classify(height).map_or(TRANSPARENT, TerrainType::rgba)
    }

    /// One color per height sample, row-major
    pub fn color_map(&self, height_field: &HeightField) -> Vec<Rgba> {
        height_field
            .values()
            .iter()
            .map(|&height| self.color_of(height))
            .collect()
    }
}
