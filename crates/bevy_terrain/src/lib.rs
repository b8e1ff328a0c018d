//! Bevy Terrain - chunked tile terrain with render synchronization.
//!
//! The world terrain is split into small rectangular [`TerrainChunk`]s. Each
//! chunk owns its tiles and pushes time-stamped snapshots to a shared render
//! entity; the renderer consumes them on its own cadence. [`TerrainPlugin`]
//! drives the sync once per frame.

pub mod chunk;
pub mod config;
pub mod coords;
pub mod diagnostics;
pub mod plugin;
pub mod primitives;
pub mod render;
pub mod schedule;
pub mod terrain;
pub mod tile;
pub mod time;

pub use chunk::{ChunkError, SyncOutcome, TerrainChunk};
pub use config::{ChunkLimits, ConfigError, SyncMode, TerrainConfig};
pub use coords::{
  ChunkPos, ChunkSize, LocalPos, MAX_CHUNK_HEIGHT, MAX_CHUNK_WIDTH, TileDelta,
  TilePos,
};
pub use diagnostics::{SyncMetrics, TimeSeries};
pub use plugin::TerrainPlugin;
pub use primitives::{Rect, TileGrid};
pub use render::{
  RenderEntityHandle, RenderEntityId, RenderSyncTarget, TerrainDrawable, TerrainRenderEntity,
  TerrainRenderStage, TerrainRenderState, TerrainUpdate, TileChange, TileState,
};
pub use schedule::TerrainSet;
pub use terrain::{SyncStats, Terrain, TerrainError};
pub use tile::{TerrainId, TerrainTile, TileFlags};
pub use time::SimTime;
