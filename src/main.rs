//! Terrainsurfer - procedural terrain generation and chunk streaming
//!
//! Either exports a single preview map or flies a scripted viewer across
//! the infinite terrain, streaming chunks in and out around it.

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{debug, info};

use terrainsurfer::cli::Args;
use terrainsurfer::params::TerrainConfig;
use terrainsurfer::preview::{export_preview, DrawMode};
use terrainsurfer::streaming::{ChunkCoord, ChunkDisplay, ChunkStreamingManager};
use terrainsurfer::terrain::MeshData;
use terrainsurfer::viewer::{ViewerPositionSource, ViewerSystem};

/// Fixed simulation step (seconds)
const TICK_S: f32 = 1.0 / 60.0;

/// Display stand-in that counts what a renderer would be asked to do
#[derive(Debug, Default)]
struct SwapCounter {
    mesh_swaps: usize,
    uploaded_vertices: usize,
    shown: usize,
    hidden: usize,
    evicted: usize,
}

impl ChunkDisplay for SwapCounter {
    fn show_mesh(&mut self, coord: ChunkCoord, lod_index: usize, mesh: &Arc<MeshData>) {
        self.mesh_swaps += 1;
        self.uploaded_vertices += mesh.interleaved().len();
        debug!(
            "Chunk {} now shows LOD index {} ({} triangles, {} index bytes)",
            coord,
            lod_index,
            mesh.triangle_count(),
            mesh.index_bytes().len()
        );
    }

    fn set_visible(&mut self, _coord: ChunkCoord, visible: bool) {
        if visible {
            self.shown += 1;
        } else {
            self.hidden += 1;
        }
    }

    fn chunk_evicted(&mut self, _coord: ChunkCoord) {
        self.evicted += 1;
    }
}

fn run_preview(config: &TerrainConfig, args: &Args, mode: DrawMode) -> Result<(), Box<dyn Error>> {
    println!("Preview: {:?} -> {}", mode, args.output.display());
    let files = export_preview(config, mode, args.lod, &args.output)?;
    for file in files {
        println!("  {}", file.display());
    }
    Ok(())
}

fn run_streaming(config: &TerrainConfig, args: &Args) -> Result<(), Box<dyn Error>> {
    let viewer = ViewerSystem::new(args.parse_viewer_path());
    let mut manager = ChunkStreamingManager::new(config, SwapCounter::default())?;

    println!(
        "Streaming {} ticks ({:.1}s simulated), viewer: {:?}",
        args.ticks,
        args.ticks as f32 * TICK_S,
        viewer.path()
    );

    let start = Instant::now();
    let mut position = viewer.position_at(0.0);
    for tick in 0..args.ticks {
        let time_s = tick as f32 * TICK_S;
        position = viewer.position_at(time_s);
        manager.tick(position);

        if tick % 60 == 0 {
            let stats = manager.stats();
            info!(
                "t={:.1}s viewer=({:.0}, {:.0}) chunks={} visible={} in_flight={}",
                time_s, position.x, position.y, stats.chunks, stats.visible_chunks, stats.in_flight
            );
        }
    }

    // Let outstanding work land so the summary reflects every request
    if !manager.wait_idle(Duration::from_secs(60)) {
        println!("Warning: background jobs still running after 60s");
    }
    manager.tick(position);

    let stats = manager.stats();
    let display = manager.display();
    println!("\nStreaming finished in {:.2?}", start.elapsed());
    println!("  Chunks cached:        {}", stats.chunks);
    println!("  Chunks visible:       {}", stats.visible_chunks);
    println!("  Meshes cached:        {}", stats.cached_meshes);
    println!("  Height-field requests: {}", stats.height_field_requests);
    println!("  Mesh requests:        {}", stats.mesh_requests);
    println!("  Evicted chunks:       {}", stats.evicted_chunks);
    println!("  Discarded results:    {}", stats.discarded_results);
    println!("  Failed jobs:          {}", stats.failed_jobs);
    println!(
        "  Display: {} mesh swaps ({} vertices), {} shown, {} hidden, {} evicted",
        display.mesh_swaps, display.uploaded_vertices, display.shown, display.hidden, display.evicted
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    println!("Terrainsurfer - procedural terrain streaming");
    let config = args.load_config()?;
    println!(
        "Seed {}, scale {}, {} octaves, map size {}\n",
        config.noise.seed, config.noise.scale, config.noise.octaves, config.mesh.map_chunk_size
    );

    match args.draw_mode() {
        Some(mode) => run_preview(&config, &args, mode),
        None => run_streaming(&config, &args),
    }
}
