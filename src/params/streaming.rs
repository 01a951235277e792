//! Chunk streaming settings.

use serde::Deserialize;

use crate::streaming::LevelOfDetailInfo;

/// Streaming behaviour around the viewer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamingSettings {
    /// LOD bands, nearest first; the last threshold is the view distance
    pub detail_levels: Vec<LevelOfDetailInfo>,

    /// Viewer travel (meters) before visibility is recomputed
    pub viewer_move_threshold: f32,

    /// Upper bound on cached chunk records; `None` keeps every chunk
    pub max_cached_chunks: Option<usize>,

    /// Background generation threads (0 = one per CPU)
    pub worker_threads: usize,
}

impl Default for StreamingSettings {
    fn default() -> Self {
        Self {
            detail_levels: vec![
                LevelOfDetailInfo::new(0, 200.0),
                LevelOfDetailInfo::new(1, 400.0),
                LevelOfDetailInfo::new(4, 600.0),
            ],
            viewer_move_threshold: 25.0,
            max_cached_chunks: None,
            worker_threads: 0,
        }
    }
}
