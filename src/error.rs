//! Error type for the configuration, export and worker-pool surfaces.
//!
//! Terrain synthesis itself never fails: numeric parameters are clamped
//! when the configuration is sanitized, and a missing LOD mesh is a
//! cache miss rather than an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("failed to read or write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse terrain config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid level-of-detail table: {0}")]
    InvalidLodTable(String),
}
