//! Hands background generation results back to the consuming thread.
//!
//! Workers push typed results onto mutex-protected FIFO queues; the
//! streaming manager drains each queue once per tick and applies the
//! results in completion order on its own thread. A job that panics
//! reports a [`FailedJob`] instead, so its slot can be requested again.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use glam::Vec2;
use log::warn;

use super::chunk::ChunkCoord;
use super::worker_pool::WorkerPool;
use crate::terrain::{MapData, MeshData, NormalizeMode, TerrainGenerator};

/// Thread-safe FIFO shared between workers and the consumer
#[derive(Debug)]
pub struct ResultQueue<T> {
    inner: Arc<Mutex<VecDeque<T>>>,
}

// Manual impl: cloning shares the queue and must not require `T: Clone`
impl<T> Clone for ResultQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ResultQueue<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

impl<T> ResultQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, item: T) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(item);
    }

    /// Take every queued item in enqueue order
    pub fn drain(&self) -> Vec<T> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Finished height field for a chunk
#[derive(Debug, Clone)]
pub struct HeightFieldResult {
    pub coord: ChunkCoord,
    pub map_data: Arc<MapData>,
}

/// Finished mesh for one LOD band of a chunk
#[derive(Debug, Clone)]
pub struct MeshResult {
    pub coord: ChunkCoord,
    pub lod_index: usize,
    pub mesh: Arc<MeshData>,
}

/// Generation job that panicked before producing its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedJob {
    HeightField { coord: ChunkCoord },
    Mesh { coord: ChunkCoord, lod_index: usize },
}

impl FailedJob {
    pub fn coord(&self) -> ChunkCoord {
        match *self {
            FailedJob::HeightField { coord } | FailedJob::Mesh { coord, .. } => coord,
        }
    }
}

/// Issues generation jobs and collects their results
pub struct AsyncResultDispatcher {
    generator: Arc<TerrainGenerator>,
    pool: WorkerPool,
    height_fields: ResultQueue<HeightFieldResult>,
    meshes: ResultQueue<MeshResult>,
    failures: ResultQueue<FailedJob>,
    height_field_requests: AtomicUsize,
    mesh_requests: AtomicUsize,
}

impl AsyncResultDispatcher {
    pub fn new(generator: Arc<TerrainGenerator>, pool: WorkerPool) -> Self {
        Self {
            generator,
            pool,
            height_fields: ResultQueue::new(),
            meshes: ResultQueue::new(),
            failures: ResultQueue::new(),
            height_field_requests: AtomicUsize::new(0),
            mesh_requests: AtomicUsize::new(0),
        }
    }

    /// Generate the chunk's height field in the background.
    ///
    /// Streamed chunks always normalize globally so neighbours share one
    /// height scale.
    pub fn request_height_field(&self, coord: ChunkCoord, center: Vec2) {
        self.height_field_requests.fetch_add(1, Ordering::Relaxed);

        let generator = Arc::clone(&self.generator);
        let queue = self.height_fields.clone();
        self.spawn_guarded(
            FailedJob::HeightField { coord },
            move || generator.generate_map_data(center, NormalizeMode::Global),
            move |map_data| {
                queue.push(HeightFieldResult {
                    coord,
                    map_data: Arc::new(map_data),
                })
            },
        );
    }

    /// Tessellate the chunk at `lod` in the background
    pub fn request_mesh(
        &self,
        coord: ChunkCoord,
        lod_index: usize,
        lod: u32,
        map_data: Arc<MapData>,
    ) {
        self.mesh_requests.fetch_add(1, Ordering::Relaxed);

        let generator = Arc::clone(&self.generator);
        let queue = self.meshes.clone();
        self.spawn_guarded(
            FailedJob::Mesh { coord, lod_index },
            move || generator.generate_mesh(&map_data, lod),
            move |mesh| {
                queue.push(MeshResult {
                    coord,
                    lod_index,
                    mesh: Arc::new(mesh),
                })
            },
        );
    }

    /// Run `job` on the pool and hand its output to `deliver`. A panic in
    /// `job` queues `failure` in place of a result.
    fn spawn_guarded<T, J, F>(&self, failure: FailedJob, job: J, deliver: F)
    where
        T: 'static,
        J: FnOnce() -> T + Send + 'static,
        F: FnOnce(T) + Send + 'static,
    {
        let failures = self.failures.clone();
        self.pool.execute(move || match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(output) => deliver(output),
            Err(_) => {
                warn!("Terrain job {:?} panicked", failure);
                failures.push(failure);
            }
        });
    }

    pub fn drain_height_fields(&self) -> Vec<HeightFieldResult> {
        self.height_fields.drain()
    }

    pub fn drain_meshes(&self) -> Vec<MeshResult> {
        self.meshes.drain()
    }

    pub fn drain_failures(&self) -> Vec<FailedJob> {
        self.failures.drain()
    }

    #[cfg(test)]
    pub(crate) fn report_failure(&self, failure: FailedJob) {
        self.failures.push(failure);
    }

    /// Height-field jobs issued since creation
    pub fn height_field_requests(&self) -> usize {
        self.height_field_requests.load(Ordering::Relaxed)
    }

    /// Mesh jobs issued since creation
    pub fn mesh_requests(&self) -> usize {
        self.mesh_requests.load(Ordering::Relaxed)
    }

    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }

    /// Block until all issued jobs have pushed their results
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.pool.wait_idle(timeout)
    }

    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.num_threads()
    }
}
