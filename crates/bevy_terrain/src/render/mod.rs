//! Render synchronization boundary.
//!
//! Chunks push time-stamped [`TerrainUpdate`]s into a [`RenderSyncTarget`].
//! The push is a one-way, non-blocking hand-off: the chunk never waits for
//! the renderer to consume it. Targets are shared (`Arc`) so their lifetime
//! is independent of any single chunk.

mod entity;
mod stage;

use std::sync::Arc;

pub use entity::{TerrainRenderEntity, TerrainRenderState};
pub(crate) use stage::poll_render_stage;
pub use stage::{RenderEntityId, TerrainDrawable, TerrainRenderStage};

use crate::coords::{ChunkSize, TileDelta};
use crate::tile::TerrainTile;
use crate::time::SimTime;

/// Consumer of terrain state on the renderer side.
///
/// Implementations must tolerate being called zero or many times per
/// simulation change, with repeated identical payloads, and with timestamps
/// that are not monotonic across different chunks.
pub trait RenderSyncTarget: Send + Sync {
  fn update(&self, update: TerrainUpdate, time: SimTime);
}

/// Shared, nullable-by-`Option` handle a chunk holds to its target.
pub type RenderEntityHandle = Arc<dyn RenderSyncTarget>;

/// One modified tile in a delta payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileChange {
  /// Row-major index into the chunk's tile buffer.
  pub index: u32,
  pub tile: TerrainTile,
}

/// Tile payload of a [`TerrainUpdate`].
#[derive(Clone, Debug)]
pub enum TileState {
  /// Complete row-major tile buffer.
  Full(Arc<[TerrainTile]>),
  /// Tiles changed since the previous sync to the same target.
  Delta(Box<[TileChange]>),
}

/// Immutable snapshot of a chunk's terrain pushed to a render target.
#[derive(Clone, Debug)]
pub struct TerrainUpdate {
  pub size: ChunkSize,
  pub offset: TileDelta,
  /// Chunk generation the payload brings the target up to.
  pub generation: u64,
  pub tiles: TileState,
}

impl TerrainUpdate {
  /// Number of tiles carried by the payload.
  pub fn tile_count(&self) -> usize {
    match &self.tiles {
      TileState::Full(tiles) => tiles.len(),
      TileState::Delta(changes) => changes.len(),
    }
  }

  pub fn is_full(&self) -> bool {
    matches!(self.tiles, TileState::Full(_))
  }
}
