//! Fractal noise height fields.
//!
//! Sums several octaves of Perlin noise, each sampled at its own seeded
//! offset, and normalizes the result either per map (`Local`) or against the
//! tallest height the octave stack can reach (`Global`).

use glam::{DVec2, Vec2};
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Smallest usable noise scale; non-positive scales are raised to this
pub const MIN_NOISE_SCALE: f32 = 0.0001;

/// Per-octave offsets are drawn from `-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE`.
/// Larger raw coordinates push Perlin sampling toward a constant value.
const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// How raw octave sums are mapped into the height range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// Stretch this map's own min/max onto [0, 1]. Only valid for a single map.
    #[default]
    Local,

    /// Divide by the largest reachable height so independently generated
    /// chunks share one height scale.
    Global,
}

/// Inputs for one height-field request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParameters {
    /// Seed for the octave offset stream
    pub seed: u64,

    /// Map units per noise period (clamped to `MIN_NOISE_SCALE`)
    pub scale: f32,

    /// Number of summed octaves
    pub octave_count: usize,

    /// Amplitude multiplier per octave, in [0, 1]
    pub persistence: f32,

    /// Frequency multiplier per octave, >= 1
    pub lacunarity: f32,

    /// World-space sampling offset (chunk position + global offset)
    pub offset: Vec2,

    pub normalize_mode: NormalizeMode,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octave_count: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
            normalize_mode: NormalizeMode::Local,
        }
    }
}

/// Row-major grid of normalized heights
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl HeightField {
    /// Wrap existing row-major values, or `None` if the length is not
    /// `width * height`
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Option<Self> {
        if values.len() != width.checked_mul(height)? {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Height at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Seeded per-octave offsets plus the largest height the stack can reach.
///
/// The y component subtracts the world offset: map rows run toward -z, so a
/// chunk one step north must sample the rows just above its neighbour.
pub fn octave_offsets(params: &NoiseParameters) -> (Vec<DVec2>, f64) {
    let mut prng = ChaCha8Rng::seed_from_u64(params.seed);
    let persistence = params.persistence as f64;

    let mut offsets = Vec::with_capacity(params.octave_count);
    let mut max_possible_height = 0.0;
    let mut amplitude = 1.0;

    for _ in 0..params.octave_count {
        let offset_x = prng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64
            + params.offset.x as f64;
        let offset_y = prng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64
            - params.offset.y as f64;
        offsets.push(DVec2::new(offset_x, offset_y));

        max_possible_height += amplitude;
        amplitude *= persistence;
    }

    (offsets, max_possible_height)
}

/// Generate a `width` x `height` fractal noise map.
///
/// Deterministic: identical inputs give bit-identical output.
pub fn generate_noise_map(width: usize, height: usize, params: &NoiseParameters) -> HeightField {
    let perlin = Perlin::new(Perlin::DEFAULT_SEED);
    let (offsets, max_possible_height) = octave_offsets(params);

    let scale = if params.scale <= 0.0 {
        MIN_NOISE_SCALE
    } else {
        params.scale
    } as f64;
    let persistence = params.persistence as f64;
    let lacunarity = params.lacunarity as f64;

    // Scale around the map center instead of its corner
    let half_width = width as f64 / 2.0;
    let half_height = height as f64 / 2.0;

    let mut raw = Vec::with_capacity(width * height);
    let mut min_height = f64::MAX;
    let mut max_height = f64::MIN;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut noise_height = 0.0;

            for offset in &offsets {
                // Offset before dividing so translation never distorts the shape
                let sample_x = (x as f64 - half_width + offset.x) / scale * frequency;
                let sample_y = (y as f64 - half_height + offset.y) / scale * frequency;

                // noise::Perlin is already centered on zero, roughly [-1, 1]
                let perlin_value = perlin.get([sample_x, sample_y]);
                noise_height += perlin_value * amplitude;

                amplitude *= persistence;
                frequency *= lacunarity;
            }

            min_height = min_height.min(noise_height);
            max_height = max_height.max(noise_height);
            raw.push(noise_height);
        }
    }

    let values = match params.normalize_mode {
        NormalizeMode::Local => {
            let range = max_height - min_height;
            raw.iter()
                .map(|&h| {
                    if range > 0.0 {
                        ((h - min_height) / range) as f32
                    } else {
                        0.0
                    }
                })
                .collect()
        }
        NormalizeMode::Global => raw
            .iter()
            .map(|&h| {
                if max_possible_height > 0.0 {
                    // Sums above max_possible_height - 1 would land past 1;
                    // capped so global heights share the local [0, 1] range
                    ((h + 1.0) / max_possible_height).clamp(0.0, 1.0) as f32
                } else {
                    0.0
                }
            })
            .collect(),
    };

    HeightField {
        width,
        height,
        values,
    }
}
