//! Chunk streaming around a moving viewer.
//!
//! The manager owns the chunk grid and is the only code that mutates it.
//! Generation runs on the dispatcher's workers; results come back through
//! the dispatcher queues and are applied at the start of each tick.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use log::{debug, info, warn};

use super::chunk::{ChunkCoord, ChunkGrid, ChunkRecord, HeightFieldState, LodMeshSlot};
use super::dispatcher::{AsyncResultDispatcher, FailedJob};
use super::display::ChunkDisplay;
use super::lod::LodTable;
use super::worker_pool::WorkerPool;
use crate::error::TerrainError;
use crate::params::TerrainConfig;
use crate::terrain::TerrainGenerator;

/// Snapshot of streaming state for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamingStats {
    pub chunks: usize,
    pub visible_chunks: usize,
    pub cached_meshes: usize,
    pub height_field_requests: usize,
    pub mesh_requests: usize,
    pub in_flight: usize,
    pub evicted_chunks: usize,
    pub discarded_results: usize,
    pub failed_jobs: usize,
}

/// Decides which chunks exist, which are visible and at what LOD
pub struct ChunkStreamingManager<D: ChunkDisplay> {
    dispatcher: AsyncResultDispatcher,
    display: D,
    grid: ChunkGrid,
    lod_table: LodTable,

    chunk_size: f32,
    /// Rings of chunks enumerated around the viewer's chunk
    chunks_visible_in_view_dist: i32,
    sqr_move_threshold: f32,
    max_cached_chunks: Option<usize>,

    viewer_position: Vec2,
    last_update_position: Option<Vec2>,
    visible_last_update: HashSet<ChunkCoord>,

    evicted_chunks: usize,
    discarded_results: usize,
    failed_jobs: usize,
}

impl<D: ChunkDisplay> ChunkStreamingManager<D> {
    /// Build a manager and its worker pool from `config`
    pub fn new(config: &TerrainConfig, display: D) -> Result<Self, TerrainError> {
        let config = config.clone().sanitized();
        let lod_table = config.lod_table()?;
        let generator = Arc::new(TerrainGenerator::new(&config));
        let pool = WorkerPool::new(config.worker_threads())?;

        let chunk_size = config.chunk_size();
        let max_view_distance = lod_table.max_view_distance();
        let chunks_visible_in_view_dist = (max_view_distance / chunk_size).ceil() as i32;
        let move_threshold = config.streaming.viewer_move_threshold;

        info!(
            "Streaming {}m chunks, view distance {}m ({} rings), {} LOD levels",
            chunk_size,
            max_view_distance,
            chunks_visible_in_view_dist,
            lod_table.len()
        );

        Ok(Self {
            dispatcher: AsyncResultDispatcher::new(generator, pool),
            display,
            grid: ChunkGrid::new(),
            lod_table,
            chunk_size,
            chunks_visible_in_view_dist,
            sqr_move_threshold: move_threshold * move_threshold,
            max_cached_chunks: config.streaming.max_cached_chunks,
            viewer_position: Vec2::ZERO,
            last_update_position: None,
            visible_last_update: HashSet::new(),
            evicted_chunks: 0,
            discarded_results: 0,
            failed_jobs: 0,
        })
    }

    /// Per-frame entry point.
    ///
    /// Applies finished background work, then recomputes visibility if the
    /// viewer moved past the threshold since the last update. The first tick
    /// always updates.
    pub fn tick(&mut self, viewer_position: Vec2) {
        self.viewer_position = viewer_position;
        self.apply_completed_results();

        let moved = match self.last_update_position {
            Some(old) => (old - viewer_position).length_squared() > self.sqr_move_threshold,
            None => true,
        };
        if moved {
            self.last_update_position = Some(viewer_position);
            self.update_visible_chunks();
        }
    }

    /// Recompute visibility now, ignoring the move threshold
    pub fn force_update(&mut self, viewer_position: Vec2) {
        self.viewer_position = viewer_position;
        self.last_update_position = Some(viewer_position);
        self.update_visible_chunks();
    }

    /// Apply every result the workers have finished since the last call.
    ///
    /// Failed jobs are handled first. Their slots go back to absent without
    /// an immediate retry; the next visibility update requests them again.
    pub fn apply_completed_results(&mut self) {
        for failure in self.dispatcher.drain_failures() {
            self.failed_jobs += 1;
            self.reset_failed_job(failure);
        }

        for result in self.dispatcher.drain_height_fields() {
            let Some(record) = self.grid.get_mut(result.coord) else {
                debug!("Discarding height field for evicted chunk {}", result.coord);
                self.discarded_results += 1;
                continue;
            };
            record.height_field = HeightFieldState::Ready(Arc::clone(&result.map_data));
            self.display.apply_color_map(result.coord, &result.map_data);
            self.refresh_chunk(result.coord);
        }

        for result in self.dispatcher.drain_meshes() {
            let Some(record) = self.grid.get_mut(result.coord) else {
                debug!("Discarding mesh for evicted chunk {}", result.coord);
                self.discarded_results += 1;
                continue;
            };
            if let Some(slot) = record.lod_meshes.get_mut(result.lod_index) {
                *slot = LodMeshSlot::Ready(result.mesh);
            }
            self.refresh_chunk(result.coord);
        }
    }

    fn reset_failed_job(&mut self, failure: FailedJob) {
        match failure {
            FailedJob::HeightField { coord } => {
                let pending = self
                    .grid
                    .get(coord)
                    .is_some_and(|record| record.map_data().is_none());
                if pending {
                    warn!("Height field for chunk {} failed; dropping the chunk", coord);
                    self.grid.remove(coord);
                }
            }
            FailedJob::Mesh { coord, lod_index } => {
                let slot = self
                    .grid
                    .get_mut(coord)
                    .and_then(|record| record.lod_meshes.get_mut(lod_index));
                if let Some(slot) = slot.filter(|slot| matches!(slot, LodMeshSlot::Pending)) {
                    warn!("LOD {} mesh for chunk {} failed", lod_index, coord);
                    *slot = LodMeshSlot::Absent;
                }
            }
        }
    }

    /// Walk the square of chunks around the viewer, creating and updating
    /// them, then hide chunks that dropped out of view.
    pub fn update_visible_chunks(&mut self) {
        let previously_visible = std::mem::take(&mut self.visible_last_update);

        let current = ChunkCoord::from_world(self.viewer_position, self.chunk_size);
        let rings = self.chunks_visible_in_view_dist;

        for y_offset in -rings..=rings {
            for x_offset in -rings..=rings {
                let coord = ChunkCoord::new(
                    current.x.saturating_add(x_offset),
                    current.y.saturating_add(y_offset),
                );
                if self.grid.contains(coord) {
                    self.refresh_chunk(coord);
                } else {
                    self.create_chunk(coord);
                }
            }
        }

        for coord in previously_visible {
            if !self.visible_last_update.contains(&coord) {
                self.set_chunk_visible(coord, false);
            }
        }

        self.evict_hidden_chunks(current);

        debug!(
            "Streaming update at {} (chunk {}): {} chunks, {} visible",
            self.viewer_position,
            current,
            self.grid.len(),
            self.visible_last_update.len()
        );
    }

    /// Update one chunk and track it if it ends up visible
    fn refresh_chunk(&mut self, coord: ChunkCoord) {
        if self.update_chunk(coord) {
            self.visible_last_update.insert(coord);
        }
    }

    /// Recompute visibility and LOD for one chunk. Returns whether it is visible.
    ///
    /// Chunks without a height field are left untouched. A desired LOD whose
    /// mesh is not cached is requested once; the previous mesh stays on
    /// screen until it arrives.
    pub fn update_chunk(&mut self, coord: ChunkCoord) -> bool {
        let Some(record) = self.grid.get_mut(coord) else {
            return false;
        };
        let Some(map_data) = record.map_data().cloned() else {
            return false;
        };

        let distance = record.bounds.distance(self.viewer_position);
        let visible = distance <= self.lod_table.max_view_distance();

        if visible {
            let lod_index = self.lod_table.select(distance);
            if record.current_lod != Some(lod_index) {
                match record.lod_meshes[lod_index].clone() {
                    LodMeshSlot::Ready(mesh) => {
                        debug!(
                            "Chunk {} switching LOD {:?} -> {}",
                            coord, record.current_lod, lod_index
                        );
                        record.current_lod = Some(lod_index);
                        self.display.show_mesh(coord, lod_index, &mesh);
                    }
                    LodMeshSlot::Absent => {
                        if let Some(level) = self.lod_table.level(lod_index) {
                            record.lod_meshes[lod_index] = LodMeshSlot::Pending;
                            self.dispatcher
                                .request_mesh(coord, lod_index, level.lod, map_data);
                        }
                    }
                    LodMeshSlot::Pending => {}
                }
            }
        }

        if record.visible != visible {
            record.visible = visible;
            self.display.set_visible(coord, visible);
        }
        visible
    }

    /// Insert a record for `coord` and request its height field
    fn create_chunk(&mut self, coord: ChunkCoord) {
        let record = ChunkRecord::new(coord, self.chunk_size, self.lod_table.len());
        let center = record.bounds.center;
        self.grid.insert(record);
        self.dispatcher.request_height_field(coord, center);
        debug!("Created chunk {}", coord);
    }

    fn set_chunk_visible(&mut self, coord: ChunkCoord, visible: bool) {
        if let Some(record) = self.grid.get_mut(coord) {
            if record.visible != visible {
                record.visible = visible;
                self.display.set_visible(coord, visible);
            }
        }
    }

    /// Drop hidden chunks, farthest first, until the grid fits the cache
    /// limit. Chunks in the square around `current` are kept, since the next
    /// update would recreate them.
    fn evict_hidden_chunks(&mut self, current: ChunkCoord) {
        let Some(limit) = self.max_cached_chunks else {
            return;
        };
        if self.grid.len() <= limit {
            return;
        }

        let rings = self.chunks_visible_in_view_dist.unsigned_abs();
        let viewer = self.viewer_position;
        let mut candidates: Vec<(f32, ChunkCoord)> = self
            .grid
            .iter()
            .filter(|record| !record.visible)
            .filter(|record| {
                record.coord.x.abs_diff(current.x) > rings
                    || record.coord.y.abs_diff(current.y) > rings
            })
            .map(|record| (record.bounds.sqr_distance(viewer), record.coord))
            .collect();
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let excess = self.grid.len() - limit;
        for (_, coord) in candidates.into_iter().take(excess) {
            self.grid.remove(coord);
            self.display.chunk_evicted(coord);
            self.evicted_chunks += 1;
            debug!("Evicted chunk {}", coord);
        }
    }

    pub fn stats(&self) -> StreamingStats {
        StreamingStats {
            chunks: self.grid.len(),
            visible_chunks: self.visible_chunk_count(),
            cached_meshes: self.grid.iter().map(ChunkRecord::cached_mesh_count).sum(),
            height_field_requests: self.dispatcher.height_field_requests(),
            mesh_requests: self.dispatcher.mesh_requests(),
            in_flight: self.dispatcher.in_flight(),
            evicted_chunks: self.evicted_chunks,
            discarded_results: self.discarded_results,
            failed_jobs: self.failed_jobs,
        }
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        self.grid.get(coord)
    }

    pub fn chunk_count(&self) -> usize {
        self.grid.len()
    }

    pub fn visible_chunk_count(&self) -> usize {
        self.grid.iter().filter(|record| record.visible).count()
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    pub fn view_rings(&self) -> i32 {
        self.chunks_visible_in_view_dist
    }

    pub fn viewer_position(&self) -> Vec2 {
        self.viewer_position
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn dispatcher(&self) -> &AsyncResultDispatcher {
        &self.dispatcher
    }

    pub fn lod_table(&self) -> &LodTable {
        &self.lod_table
    }

    /// Block until all background jobs have finished (results still need a
    /// tick to be applied)
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.dispatcher.wait_idle(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::{LevelOfDetailInfo, NullDisplay};

    fn small_config() -> TerrainConfig {
        let mut config = TerrainConfig::default();
        config.mesh.map_chunk_size = 25;
        config.streaming.detail_levels = vec![
            LevelOfDetailInfo::new(0, 20.0),
            LevelOfDetailInfo::new(1, 40.0),
            LevelOfDetailInfo::new(2, 60.0),
        ];
        config.streaming.worker_threads = 2;
        config
    }

    #[test]
    fn test_ring_count_rounds_up() {
        let manager = ChunkStreamingManager::new(&small_config(), NullDisplay).expect("manager");
        assert_eq!(manager.chunk_size(), 24.0);
        assert_eq!(manager.view_rings(), 3);

        let defaults =
            ChunkStreamingManager::new(&TerrainConfig::default(), NullDisplay).expect("manager");
        assert_eq!(defaults.view_rings(), 3);
    }

    #[test]
    fn test_small_moves_do_not_update() {
        let mut manager = ChunkStreamingManager::new(&small_config(), NullDisplay).expect("manager");
        manager.tick(Vec2::ZERO);
        let requests = manager.dispatcher().height_field_requests();
        assert_eq!(requests, 49);

        manager.tick(Vec2::new(24.0, 0.0));
        assert_eq!(manager.dispatcher().height_field_requests(), requests);

        manager.tick(Vec2::new(48.0, 0.0));
        assert_eq!(manager.dispatcher().height_field_requests(), requests + 14);
    }

    #[test]
    fn test_invalid_lod_table_fails_construction() {
        let mut config = small_config();
        config.streaming.detail_levels = Vec::new();
        assert!(matches!(
            ChunkStreamingManager::new(&config, NullDisplay),
            Err(TerrainError::InvalidLodTable(_))
        ));
    }

    #[test]
    fn test_failed_height_field_recreates_chunk() {
        let mut manager = ChunkStreamingManager::new(&small_config(), NullDisplay).expect("manager");
        manager.tick(Vec2::ZERO);
        assert!(manager.wait_idle(Duration::from_secs(30)));

        let origin = ChunkCoord::new(0, 0);
        manager
            .dispatcher()
            .report_failure(FailedJob::HeightField { coord: origin });
        manager.apply_completed_results();

        // The real result arrives after the chunk was dropped
        assert!(manager.chunk(origin).is_none());
        assert_eq!(manager.stats().failed_jobs, 1);
        assert_eq!(manager.stats().discarded_results, 1);

        manager.force_update(Vec2::ZERO);
        assert!(manager.chunk(origin).is_some());
        assert_eq!(manager.dispatcher().height_field_requests(), 50);
    }

    #[test]
    fn test_failed_mesh_is_requested_again() {
        let mut manager = ChunkStreamingManager::new(&small_config(), NullDisplay).expect("manager");
        manager.tick(Vec2::ZERO);
        assert!(manager.wait_idle(Duration::from_secs(30)));
        manager.apply_completed_results();
        assert!(manager.wait_idle(Duration::from_secs(30)));
        let requests = manager.dispatcher().mesh_requests();
        assert_eq!(requests, 29);

        // Stand-in for a mesh job that panicked before its result landed
        let origin = ChunkCoord::new(0, 0);
        manager.dispatcher().drain_meshes();
        manager
            .dispatcher()
            .report_failure(FailedJob::Mesh { coord: origin, lod_index: 0 });
        manager.apply_completed_results();

        let record = manager.chunk(origin).expect("origin chunk");
        assert!(matches!(record.lod_meshes[0], LodMeshSlot::Absent));
        assert_eq!(record.current_lod, None);
        assert_eq!(manager.dispatcher().mesh_requests(), requests);

        manager.force_update(Vec2::ZERO);
        assert!(matches!(
            manager.chunk(origin).expect("origin chunk").lod_meshes[0],
            LodMeshSlot::Pending
        ));
        assert_eq!(manager.dispatcher().mesh_requests(), requests + 1);
    }

    #[test]
    fn test_extreme_viewer_position_does_not_overflow() {
        let mut config = small_config();
        config.streaming.max_cached_chunks = Some(10);
        let mut manager = ChunkStreamingManager::new(&config, NullDisplay).expect("manager");

        manager.tick(Vec2::ZERO);
        manager.tick(Vec2::new(1.0e12, -1.0e12));
        manager.tick(Vec2::new(-1.0e12, 1.0e12));

        let corner = ChunkCoord::new(i32::MIN, i32::MAX);
        assert!(manager.chunk(corner).is_some());
        assert!(manager.chunk_count() > 0);
        assert!(manager.wait_idle(Duration::from_secs(60)));
    }
}
