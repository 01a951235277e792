//! Fractal noise settings.

use glam::Vec2;
use serde::Deserialize;

use crate::terrain::{NoiseParameters, NormalizeMode, MIN_NOISE_SCALE};

/// Noise synthesis parameters as read from configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseSettings {
    /// Seed for the per-octave offsets
    pub seed: u64,

    /// Map units per noise period (> 0)
    pub scale: f32,

    /// Number of summed octaves (negative values count as zero)
    pub octaves: i32,

    /// Amplitude decay per octave, in [0, 1]
    pub persistence: f32,

    /// Frequency growth per octave, >= 1
    pub lacunarity: f32,

    /// Global sampling offset (map units) added to every chunk's position
    pub offset: [f32; 2],

    /// Normalization for single-map previews; streamed chunks always use global
    pub normalize_mode: NormalizeMode,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
            normalize_mode: NormalizeMode::Local,
        }
    }
}

impl NoiseSettings {
    /// Per-request parameters for a map centered on `center`.
    ///
    /// Out-of-range values are clamped here as well, so a config that skipped
    /// `TerrainConfig::sanitized` still yields valid noise input.
    pub fn parameters(&self, center: Vec2, normalize_mode: NormalizeMode) -> NoiseParameters {
        NoiseParameters {
            seed: self.seed,
            scale: self.scale.max(MIN_NOISE_SCALE),
            octave_count: self.octaves.max(0) as usize,
            persistence: self.persistence.clamp(0.0, 1.0),
            lacunarity: self.lacunarity.max(1.0),
            offset: Vec2::from_array(self.offset) + center,
            normalize_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_add_center_to_offset() {
        let settings = NoiseSettings {
            offset: [10.0, -5.0],
            ..NoiseSettings::default()
        };
        let params = settings.parameters(Vec2::new(240.0, 480.0), NormalizeMode::Global);

        assert_eq!(params.offset, Vec2::new(250.0, 475.0));
        assert_eq!(params.normalize_mode, NormalizeMode::Global);
        assert_eq!(params.octave_count, 4);
    }

    #[test]
    fn test_parameters_clamp_invalid_values() {
        let settings = NoiseSettings {
            scale: -3.0,
            octaves: -2,
            persistence: 1.5,
            lacunarity: 0.5,
            ..NoiseSettings::default()
        };
        let params = settings.parameters(Vec2::ZERO, NormalizeMode::Local);

        assert_eq!(params.scale, MIN_NOISE_SCALE);
        assert_eq!(params.octave_count, 0);
        assert_eq!(params.persistence, 1.0);
        assert_eq!(params.lacunarity, 1.0);
    }
}
