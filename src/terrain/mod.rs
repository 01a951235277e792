//! Procedural terrain synthesis: noise, height curves, regions and meshes.

mod curve;
mod generator;
mod mesh;
mod noise_map;
mod regions;
mod texture;

pub use curve::{HeightCurve, Interpolation, Keyframe};
pub use generator::{MapData, TerrainGenerator};
pub use mesh::{
    generate_terrain_mesh, simplification_increment, vertices_per_line, MeshData, Vertex,
};
pub use noise_map::{
    generate_noise_map, octave_offsets, HeightField, NoiseParameters, NormalizeMode,
    MIN_NOISE_SCALE,
};
pub use regions::{RegionTable, Rgba, TerrainType, TRANSPARENT};
pub use texture::{texture_from_color_map, texture_from_height_map};
