//! Infinite-terrain chunk streaming with asynchronous generation.

mod chunk;
mod dispatcher;
mod display;
mod lod;
mod manager;
mod worker_pool;

pub use chunk::{
    ChunkBounds, ChunkCoord, ChunkGrid, ChunkRecord, HeightFieldState, LodMeshSlot,
};
pub use dispatcher::{
    AsyncResultDispatcher, FailedJob, HeightFieldResult, MeshResult, ResultQueue,
};
pub use display::{ChunkDisplay, NullDisplay};
pub use lod::{LevelOfDetailInfo, LodTable};
pub use manager::{ChunkStreamingManager, StreamingStats};
pub use worker_pool::WorkerPool;
