//! Terrainsurfer library - Procedural terrain generation and streaming

pub mod cli;
pub mod error;
pub mod params;
pub mod preview;
pub mod streaming;
pub mod terrain;
pub mod viewer;

pub use error::TerrainError;
