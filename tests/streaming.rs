//! End-to-end chunk streaming scenarios on a small map size.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use terrainsurfer::params::TerrainConfig;
use terrainsurfer::streaming::{
    ChunkCoord, ChunkDisplay, ChunkStreamingManager, LevelOfDetailInfo,
};
use terrainsurfer::terrain::{MapData, MeshData};

/// Chunk side is 24 world units; view distance 60 gives 3 rings (7 x 7)
fn small_config() -> TerrainConfig {
    let mut config = TerrainConfig::default();
    config.noise.seed = 42;
    config.mesh.map_chunk_size = 25;
    config.streaming.detail_levels = vec![
        LevelOfDetailInfo::new(0, 20.0),
        LevelOfDetailInfo::new(1, 40.0),
        LevelOfDetailInfo::new(2, 60.0),
    ];
    config.streaming.worker_threads = 4;
    config
}

#[derive(Debug, Default)]
struct RecordingDisplay {
    color_maps: HashSet<ChunkCoord>,
    shown_lod: HashMap<ChunkCoord, usize>,
    mesh_vertices: HashMap<ChunkCoord, usize>,
    visible: HashSet<ChunkCoord>,
    evicted: Vec<ChunkCoord>,
}

impl ChunkDisplay for RecordingDisplay {
    fn apply_color_map(&mut self, coord: ChunkCoord, map_data: &Arc<MapData>) {
        assert_eq!(map_data.color_map.len(), 25 * 25);
        self.color_maps.insert(coord);
    }

    fn show_mesh(&mut self, coord: ChunkCoord, lod_index: usize, mesh: &Arc<MeshData>) {
        self.shown_lod.insert(coord, lod_index);
        self.mesh_vertices.insert(coord, mesh.vertex_count());
    }

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
        if visible {
            self.visible.insert(coord);
        } else {
            self.visible.remove(&coord);
        }
    }

    fn chunk_evicted(&mut self, coord: ChunkCoord) {
        self.evicted.push(coord);
    }
}

fn new_manager(config: &TerrainConfig) -> ChunkStreamingManager<RecordingDisplay> {
    ChunkStreamingManager::new(config, RecordingDisplay::default()).expect("build manager")
}

/// Tick until a tick applies results without issuing new work
fn settle(manager: &mut ChunkStreamingManager<RecordingDisplay>, viewer: Vec2) {
    for _ in 0..10 {
        assert!(manager.wait_idle(Duration::from_secs(60)), "workers did not finish");
        let before = manager.stats();
        manager.tick(viewer);
        let after = manager.stats();
        if after.height_field_requests == before.height_field_requests
            && after.mesh_requests == before.mesh_requests
        {
            return;
        }
    }
    panic!("streaming did not settle");
}

/// Chunks whose nearest edge lies within 60 units of the origin
fn expected_visible_at_origin() -> HashSet<ChunkCoord> {
    let mut visible = HashSet::new();
    for y in -3..=3 {
        for x in -3..=3 {
            let dx = (24.0 * (x as f32).abs() - 12.0).max(0.0);
            let dy = (24.0 * (y as f32).abs() - 12.0).max(0.0);
            if (dx * dx + dy * dy).sqrt() <= 60.0 {
                visible.insert(ChunkCoord::new(x, y));
            }
        }
    }
    visible
}

#[test]
fn test_first_tick_creates_square_and_requests_height_fields() {
    let mut manager = new_manager(&small_config());
    manager.tick(Vec2::ZERO);

    assert_eq!(manager.chunk_count(), 49);
    assert_eq!(manager.dispatcher().height_field_requests(), 49);
    assert_eq!(manager.dispatcher().mesh_requests(), 0);
    // Nothing can be visible before its height field arrives
    assert_eq!(manager.visible_chunk_count(), 0);
}

#[test]
fn test_visible_chunks_get_meshes() {
    let mut manager = new_manager(&small_config());
    manager.tick(Vec2::ZERO);
    settle(&mut manager, Vec2::ZERO);

    let expected = expected_visible_at_origin();
    assert_eq!(expected.len(), 29);
    assert_eq!(manager.visible_chunk_count(), expected.len());

    let display = manager.display();
    assert_eq!(display.visible, expected);
    assert_eq!(display.color_maps.len(), 49);
    for coord in &expected {
        assert!(display.shown_lod.contains_key(coord), "no mesh for {}", coord);
    }

    // LOD bands by nearest-edge distance
    assert_eq!(display.shown_lod[&ChunkCoord::new(0, 0)], 0);
    assert_eq!(display.shown_lod[&ChunkCoord::new(1, 0)], 0);
    assert_eq!(display.shown_lod[&ChunkCoord::new(2, 0)], 1);
    assert_eq!(display.shown_lod[&ChunkCoord::new(3, 0)], 2);
    assert_eq!(display.mesh_vertices[&ChunkCoord::new(0, 0)], 25 * 25);
    assert_eq!(display.mesh_vertices[&ChunkCoord::new(3, 0)], 7 * 7);

    let record = manager.chunk(ChunkCoord::new(2, 0)).expect("chunk exists");
    assert_eq!(record.current_lod, Some(1));
    assert!(record.visible);

    // Corner chunks are created but never shown
    let corner = manager.chunk(ChunkCoord::new(3, 3)).expect("corner exists");
    assert!(!corner.visible);
    assert_eq!(corner.current_lod, None);
}

#[test]
fn test_cached_meshes_are_not_requested_again() {
    let mut manager = new_manager(&small_config());
    manager.tick(Vec2::ZERO);
    settle(&mut manager, Vec2::ZERO);

    let before = manager.stats();
    for _ in 0..5 {
        manager.force_update(Vec2::ZERO);
    }
    let after = manager.stats();

    assert_eq!(after.mesh_requests, before.mesh_requests);
    assert_eq!(after.height_field_requests, before.height_field_requests);
    assert_eq!(after.chunks, 49);
}

#[test]
fn test_moving_viewer_switches_lod() {
    let mut manager = new_manager(&small_config());
    manager.tick(Vec2::ZERO);
    settle(&mut manager, Vec2::ZERO);
    assert_eq!(manager.display().shown_lod[&ChunkCoord::new(2, 0)], 1);

    // Standing on chunk (2, 0) wants its full-detail mesh
    let viewer = Vec2::new(48.0, 0.0);
    manager.tick(viewer);
    settle(&mut manager, viewer);

    let record = manager.chunk(ChunkCoord::new(2, 0)).expect("chunk exists");
    assert_eq!(record.current_lod, Some(0));
    assert_eq!(record.cached_mesh_count(), 2);
    assert_eq!(manager.display().shown_lod[&ChunkCoord::new(2, 0)], 0);

    // Going back reuses the cached coarser mesh without a new request
    let requests = manager.dispatcher().mesh_requests();
    manager.tick(Vec2::ZERO);
    settle(&mut manager, Vec2::ZERO);
    let record = manager.chunk(ChunkCoord::new(2, 0)).expect("chunk exists");
    assert_eq!(record.current_lod, Some(1));

    assert_eq!(manager.dispatcher().mesh_requests(), requests);
}

#[test]
fn test_pending_meshes_survive_repeat_updates_and_lod_switch() {
    let mut config = small_config();
    config.streaming.worker_threads = 1;
    let mut manager = new_manager(&config);

    manager.tick(Vec2::ZERO);
    assert!(manager.wait_idle(Duration::from_secs(60)));
    manager.apply_completed_results();
    let requested = manager.dispatcher().mesh_requests();
    assert_eq!(requested, 29);

    // Results are not applied here, so every visible slot is still pending
    for _ in 0..3 {
        manager.force_update(Vec2::ZERO);
        assert_eq!(manager.dispatcher().mesh_requests(), requested);
    }

    // (2, 0) still waits on its LOD 1 mesh when the viewer reaches it
    let target = ChunkCoord::new(2, 0);
    manager.force_update(Vec2::new(48.0, 0.0));
    assert!(manager.dispatcher().mesh_requests() > requested);
    settle(&mut manager, Vec2::new(48.0, 0.0));

    let record = manager.chunk(target).expect("chunk exists");
    assert_eq!(record.current_lod, Some(0));
    assert_eq!(record.cached_mesh_count(), 2);
    assert_eq!(manager.display().shown_lod[&target], 0);
    assert_eq!(manager.display().mesh_vertices[&target], 25 * 25);
}

#[test]
fn test_far_move_hides_old_chunks_without_destroying_them() {
    let mut manager = new_manager(&small_config());
    manager.tick(Vec2::ZERO);
    settle(&mut manager, Vec2::ZERO);

    let viewer = Vec2::new(24.0 * 10.0, 0.0);
    manager.tick(viewer);
    settle(&mut manager, viewer);

    // Grow-only grid: both squares are kept
    assert_eq!(manager.chunk_count(), 98);
    for coord in expected_visible_at_origin() {
        let record = manager.chunk(coord).expect("old chunk kept");
        assert!(!record.visible, "{} still visible", coord);
        assert!(!manager.display().visible.contains(&coord));
    }
    assert_eq!(manager.visible_chunk_count(), 29);
    assert!(manager.display().evicted.is_empty());
}

#[test]
fn test_eviction_bounds_the_grid() {
    let mut config = small_config();
    config.streaming.max_cached_chunks = Some(60);
    let mut manager = new_manager(&config);

    manager.tick(Vec2::ZERO);
    settle(&mut manager, Vec2::ZERO);
    assert_eq!(manager.chunk_count(), 49);

    let viewer = Vec2::new(24.0 * 10.0, 0.0);
    manager.tick(viewer);
    settle(&mut manager, viewer);

    assert_eq!(manager.chunk_count(), 60);
    assert_eq!(manager.stats().evicted_chunks, 38);
    assert_eq!(manager.display().evicted.len(), 38);

    // Farthest chunks go first
    assert!(manager.chunk(ChunkCoord::new(-3, 0)).is_none());
    assert_eq!(manager.visible_chunk_count(), 29);

    // Returning recreates evicted chunks
    manager.tick(Vec2::ZERO);
    settle(&mut manager, Vec2::ZERO);
    assert!(manager.chunk(ChunkCoord::new(-3, 0)).is_some());
    assert!(manager.chunk_count() <= 60);
    assert_eq!(manager.visible_chunk_count(), 29);
}

#[test]
fn test_neighbouring_chunks_agree_on_seams() {
    let mut manager = new_manager(&small_config());
    manager.tick(Vec2::ZERO);
    settle(&mut manager, Vec2::ZERO);

    let west = manager.chunk(ChunkCoord::new(0, 0)).and_then(|c| c.map_data().cloned());
    let east = manager.chunk(ChunkCoord::new(1, 0)).and_then(|c| c.map_data().cloned());
    let (west, east) = (west.expect("west ready"), east.expect("east ready"));

    for y in 0..25 {
        let a = west.height_field.get(24, y);
        let b = east.height_field.get(0, y);
        assert!((a - b).abs() < 1e-6, "seam mismatch at row {}", y);
    }
}
