//! Parameter definitions with physical units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Units (meters, seconds, Hz, samples)
//! - Documented ranges and defaults
//! - Clamping at the configuration boundary

mod config;
mod mesh;
mod noise;
mod streaming;
mod viewer;

// Re-export all types
pub use config::TerrainConfig;
pub use mesh::{MeshSettings, DEFAULT_MAP_CHUNK_SIZE};
pub use noise::NoiseSettings;
pub use streaming::StreamingSettings;
pub use viewer::{FixedViewer, StraightPath, SweepingPath, ViewerPath};
