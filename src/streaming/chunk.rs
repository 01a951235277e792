//! Chunk records and the arena grid that stores them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use glam::Vec2;

use crate::terrain::{MapData, MeshData};

/// Integer position of a chunk in the infinite grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing `position`, rounding to the nearest chunk center
    pub fn from_world(position: Vec2, chunk_size: f32) -> Self {
        Self {
            x: (position.x / chunk_size).round() as i32,
            y: (position.y / chunk_size).round() as i32,
        }
    }

    /// World-space center of the chunk
    pub fn world_position(self, chunk_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * chunk_size
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned square footprint of a chunk on the ground plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkBounds {
    pub center: Vec2,
    pub half_extent: f32,
}

impl ChunkBounds {
    pub fn new(center: Vec2, size: f32) -> Self {
        Self {
            center,
            half_extent: size / 2.0,
        }
    }

    /// Squared distance from `point` to the nearest point of the square
    pub fn sqr_distance(&self, point: Vec2) -> f32 {
        let outside = ((point - self.center).abs() - Vec2::splat(self.half_extent)).max(Vec2::ZERO);
        outside.length_squared()
    }

    /// Distance to the nearest edge, zero inside
    pub fn distance(&self, point: Vec2) -> f32 {
        self.sqr_distance(point).sqrt()
    }
}

/// Height-field progress for one chunk
#[derive(Debug, Clone)]
pub enum HeightFieldState {
    Pending,
    Ready(Arc<MapData>),
}

/// Mesh cache slot for one LOD band
#[derive(Debug, Clone, Default)]
pub enum LodMeshSlot {
    #[default]
    Absent,
    Pending,
    Ready(Arc<MeshData>),
}

impl LodMeshSlot {
    pub fn mesh(&self) -> Option<&Arc<MeshData>> {
        match self {
            Self::Ready(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Per-chunk streaming state, owned by the manager's grid
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub coord: ChunkCoord,
    pub bounds: ChunkBounds,
    pub height_field: HeightFieldState,
    /// One slot per LOD band, indexed like the LOD table
    pub lod_meshes: Vec<LodMeshSlot>,
    /// Band whose mesh is currently displayed
    pub current_lod: Option<usize>,
    pub visible: bool,
}

impl ChunkRecord {
    /// New record whose height field has just been requested
    pub fn new(coord: ChunkCoord, chunk_size: f32, lod_count: usize) -> Self {
        Self {
            coord,
            bounds: ChunkBounds::new(coord.world_position(chunk_size), chunk_size),
            height_field: HeightFieldState::Pending,
            lod_meshes: vec![LodMeshSlot::Absent; lod_count],
            current_lod: None,
            visible: false,
        }
    }

    pub fn map_data(&self) -> Option<&Arc<MapData>> {
        match &self.height_field {
            HeightFieldState::Ready(map_data) => Some(map_data),
            HeightFieldState::Pending => None,
        }
    }

    pub fn cached_mesh_count(&self) -> usize {
        self.lod_meshes
            .iter()
            .filter(|slot| slot.mesh().is_some())
            .count()
    }
}

/// Arena of chunk records with a coordinate index.
///
/// Removed slots are recycled, so long sessions with eviction do not grow
/// the backing storage.
#[derive(Debug, Default)]
pub struct ChunkGrid {
    slots: Vec<Option<ChunkRecord>>,
    free: Vec<usize>,
    index: HashMap<ChunkCoord, usize>,
}

impl ChunkGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any record at the same coordinate
    pub fn insert(&mut self, record: ChunkRecord) {
        if let Some(&slot) = self.index.get(&record.coord) {
            self.slots[slot] = Some(record);
            return;
        }

        let coord = record.coord;
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(record);
                slot
            }
            None => {
                self.slots.push(Some(record));
                self.slots.len() - 1
            }
        };
        self.index.insert(coord, slot);
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        let slot = *self.index.get(&coord)?;
        self.slots[slot].as_ref()
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkRecord> {
        let slot = *self.index.get(&coord)?;
        self.slots[slot].as_mut()
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<ChunkRecord> {
        let slot = self.index.remove(&coord)?;
        self.free.push(slot);
        self.slots[slot].take()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.index.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Allocated arena slots, including free ones
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}
