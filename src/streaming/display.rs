//! Seam to the renderer that presents streamed chunks.

use std::sync::Arc;

use super::chunk::ChunkCoord;
use crate::terrain::{MapData, MeshData};

/// Receives finished chunk buffers from the streaming manager.
///
/// All calls happen on the thread that drives `ChunkStreamingManager::tick`.
pub trait ChunkDisplay {
    /// Height field and colors arrived; typically uploaded as the chunk texture
    fn apply_color_map(&mut self, _coord: ChunkCoord, _map_data: &Arc<MapData>) {}

    /// Present `mesh` for the chunk, replacing any previous LOD
    fn show_mesh(&mut self, coord: ChunkCoord, lod_index: usize, mesh: &Arc<MeshData>);

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool);

    /// The chunk was dropped from the cache and its resources may be freed
    fn chunk_evicted(&mut self, _coord: ChunkCoord) {}
}

/// Display that ignores every call
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl ChunkDisplay for NullDisplay {
    fn show_mesh(&mut self, _coord: ChunkCoord, _lod_index: usize, _mesh: &Arc<MeshData>) {}

    fn set_visible(&mut self, _coord: ChunkCoord, _visible: bool) {}
}
