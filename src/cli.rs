//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use log::warn;

use crate::error::TerrainError;
use crate::params::{FixedViewer, StraightPath, SweepingPath, TerrainConfig, ViewerPath};
use crate::preview::DrawMode;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Terrainsurfer")]
#[command(about = "Procedural terrain generation and chunk streaming", long_about = None)]
pub struct Args {
    /// TOML terrain config (defaults are used when omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the noise seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Export a single-map preview instead of streaming: noise, color, mesh
    #[arg(long, value_name = "MODE")]
    pub preview: Option<String>,

    /// Level of detail for the mesh preview
    #[arg(long, value_name = "LOD")]
    pub lod: Option<u32>,

    /// Output directory for previews
    #[arg(long, value_name = "DIR", default_value = "preview")]
    pub output: PathBuf,

    /// Number of fixed-step streaming ticks (60 per simulated second)
    #[arg(long, value_name = "TICKS", default_value = "600")]
    pub ticks: u32,

    /// Viewer preset: straight (default), sweeping, fixed
    #[arg(long, value_name = "PRESET", default_value = "straight")]
    pub viewer_preset: String,

    /// Viewer speed for moving presets (meters per second)
    #[arg(long, value_name = "M_PER_S")]
    pub speed: Option<f32>,

    /// Background worker threads (0 = one per CPU)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

impl Args {
    /// Load the config file (or defaults) and apply command-line overrides
    pub fn load_config(&self) -> Result<TerrainConfig, TerrainError> {
        let mut config = match &self.config {
            Some(path) => TerrainConfig::load(path)?,
            None => TerrainConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.noise.seed = seed;
        }
        if let Some(workers) = self.workers {
            config.streaming.worker_threads = workers;
        }
        Ok(config)
    }

    /// Parse viewer preset from command-line arguments
    pub fn parse_viewer_path(&self) -> ViewerPath {
        match self.viewer_preset.to_lowercase().as_str() {
            "straight" => {
                let mut straight = StraightPath::default();
                if let Some(speed) = self.speed {
                    straight.speed_m_per_s = speed;
                }
                ViewerPath::Straight(straight)
            }
            "sweeping" => {
                let mut sweeping = SweepingPath::default();
                if let Some(speed) = self.speed {
                    sweeping.forward_speed_m_per_s = speed;
                }
                ViewerPath::Sweeping(sweeping)
            }
            "fixed" => ViewerPath::Fixed(FixedViewer::default()),
            other => {
                warn!("Unknown viewer preset '{}', using straight", other);
                ViewerPath::default()
            }
        }
    }

    /// Requested preview mode; unknown names fall back to the noise map
    pub fn draw_mode(&self) -> Option<DrawMode> {
        self.preview.as_deref().map(|name| {
            DrawMode::parse(name).unwrap_or_else(|| {
                warn!("Unknown preview mode '{}', using noise", name);
                DrawMode::NoiseMap
            })
        })
    }
}
