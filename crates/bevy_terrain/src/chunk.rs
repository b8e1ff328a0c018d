//! Terrain chunk - a bounded grid of tiles with a render sync handle.
//!
//! Simulation code mutates a chunk's tiles directly. Once per render frame
//! the driver calls [`TerrainChunk::render_update`] with the current
//! simulation time, and the chunk pushes its state to the attached render
//! entity (if any).
//!
//! The chunk holds no locks. Mutation needs `&mut self`, so the simulation
//! tick and the render sync are serialized by whoever owns the chunk.

use std::sync::Arc;

use bevy::log::{debug, trace};

use crate::config::{ChunkLimits, SyncMode, TerrainConfig};
use crate::coords::{ChunkSize, LocalPos, TileDelta};
use crate::primitives::{DirtyTiles, LengthMismatch, Rect, TileGrid};
use crate::render::{RenderEntityHandle, TerrainUpdate, TileChange, TileState};
use crate::tile::TerrainTile;
use crate::time::SimTime;

/// What a call to [`TerrainChunk::render_update`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
  /// No render entity attached; nothing was built or sent.
  Detached,
  /// Delta mode and nothing changed since the last sync; only the timestamp
  /// was pushed.
  Skipped,
  /// Complete state was pushed.
  Full { tiles: usize },
  /// Only modified tiles were pushed.
  Delta { tiles: usize },
}

impl SyncOutcome {
  /// Number of tiles handed to the render entity.
  pub fn tiles_sent(self) -> usize {
    match self {
      Self::Full { tiles } | Self::Delta { tiles } => tiles,
      Self::Detached | Self::Skipped => 0,
    }
  }
}

/// Subdivision of the world terrain.
pub struct TerrainChunk {
  offset: TileDelta,
  /// Row-major tile data. Origin is the left corner.
  tiles: TileGrid<TerrainTile>,
  /// Target for render updates. Can be `None`.
  render_entity: Option<RenderEntityHandle>,
  sync_mode: SyncMode,
  delta_threshold: f32,
  /// Tiles modified since the last sync.
  dirty: DirtyTiles,
  /// Incremented on every tile change.
  generation: u64,
  /// The next sync must carry complete state.
  needs_full_sync: bool,
}

impl std::fmt::Debug for TerrainChunk {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TerrainChunk")
      .field("offset", &self.offset)
      .field("tiles", &self.tiles)
      .field("render_entity", &self.render_entity.is_some())
      .field("sync_mode", &self.sync_mode)
      .field("delta_threshold", &self.delta_threshold)
      .field("dirty", &self.dirty)
      .field("generation", &self.generation)
      .field("needs_full_sync", &self.needs_full_sync)
      .finish()
  }
}

impl TerrainChunk {
  /// Creates a chunk that takes ownership of a row-major tile buffer.
  ///
  /// Uses the global chunk limits. Fails if `tiles.len()` is not
  /// `width * height`; the buffer is never truncated or padded.
  pub fn new(
    size: ChunkSize,
    offset: TileDelta,
    tiles: Vec<TerrainTile>,
  ) -> Result<Self, ChunkError> {
    Self::with_limits(size, offset, tiles, &ChunkLimits::default())
  }

  /// Creates a chunk validated against custom limits.
  pub fn with_limits(
    size: ChunkSize,
    offset: TileDelta,
    tiles: Vec<TerrainTile>,
    limits: &ChunkLimits,
  ) -> Result<Self, ChunkError> {
    if size.width == 0 || size.height == 0 {
      return Err(ChunkError::ZeroSize(size));
    }
    if !limits.allows(size) {
      return Err(ChunkError::SizeExceedsLimit {
        size,
        limit: limits.max_size(),
      });
    }
    let tiles = TileGrid::from_vec(size, tiles)?;
    let dirty = DirtyTiles::new(tiles.len());

    Ok(Self {
      offset,
      tiles,
      render_entity: None,
      sync_mode: SyncMode::default(),
      delta_threshold: TerrainConfig::default().delta_threshold,
      dirty,
      generation: 0,
      needs_full_sync: true,
    })
  }

  /// Creates a chunk using the limits and sync settings of `config`.
  pub fn from_config(
    size: ChunkSize,
    offset: TileDelta,
    tiles: Vec<TerrainTile>,
    config: &TerrainConfig,
  ) -> Result<Self, ChunkError> {
    let mut chunk = Self::with_limits(size, offset, tiles, &config.limits)?;
    chunk.sync_mode = config.sync_mode;
    chunk.delta_threshold = config.delta_threshold;
    Ok(chunk)
  }

  /// Creates a chunk with every tile set to `tile`.
  pub fn filled(size: ChunkSize, offset: TileDelta, tile: TerrainTile) -> Result<Self, ChunkError> {
    Self::new(size, offset, vec![tile; size.tile_count()])
  }

  /// Size of the chunk in tiles.
  #[inline]
  pub fn size(&self) -> ChunkSize {
    self.tiles.size()
  }

  /// Offset of the chunk to the terrain origin, in tiles.
  #[inline]
  pub fn offset(&self) -> TileDelta {
    self.offset
  }

  /// Replaces the render entity. `None` detaches rendering for this chunk.
  ///
  /// The next sync to a newly attached entity always carries full state.
  pub fn set_render_entity(&mut self, entity: Option<RenderEntityHandle>) {
    match (&self.render_entity, &entity) {
      (_, Some(_)) => debug!("Attached render entity to chunk {:?}", self.offset),
      (Some(_), None) => debug!("Detached render entity from chunk {:?}", self.offset),
      (None, None) => {}
    }
    self.render_entity = entity;
    self.needs_full_sync = true;
  }

  pub fn has_render_entity(&self) -> bool {
    self.render_entity.is_some()
  }

  pub fn sync_mode(&self) -> SyncMode {
    self.sync_mode
  }

  /// Switches the sync mode. The next sync carries full state.
  pub fn set_sync_mode(&mut self, mode: SyncMode) {
    self.sync_mode = mode;
    self.needs_full_sync = true;
  }

  /// Returns the tile at (x, y).
  ///
  /// # Panics
  /// If (x, y) lies outside the chunk.
  #[inline]
  #[track_caller]
  pub fn tile(&self, x: u16, y: u16) -> &TerrainTile {
    &self.tiles[(x, y)]
  }

  /// Returns the tile at `pos`, or `None` if out of bounds.
  #[inline]
  pub fn get_tile(&self, pos: LocalPos) -> Option<&TerrainTile> {
    self.tiles.get(pos)
  }

  /// Row-major tile buffer, index `y * width + x`.
  #[inline]
  pub fn tiles(&self) -> &[TerrainTile] {
    self.tiles.as_slice()
  }

  /// Overwrites the tile at (x, y). Returns true if the value changed.
  ///
  /// # Panics
  /// If (x, y) lies outside the chunk.
  #[track_caller]
  pub fn set_tile(&mut self, x: u16, y: u16, tile: TerrainTile) -> bool {
    let index = self.tiles.expect_index(LocalPos::new(x, y));
    self.write(index, tile)
  }

  /// Applies `f` to the tile at (x, y). Returns true if the value changed.
  ///
  /// # Panics
  /// If (x, y) lies outside the chunk.
  #[track_caller]
  pub fn modify_tile(&mut self, x: u16, y: u16, f: impl FnOnce(&mut TerrainTile)) -> bool {
    let index = self.tiles.expect_index(LocalPos::new(x, y));
    let mut tile = self.tiles.as_slice()[index];
    f(&mut tile);
    self.write(index, tile)
  }

  /// Writes `tile` over the part of `rect` inside the chunk.
  ///
  /// Returns the number of tiles that changed.
  pub fn fill_rect(&mut self, rect: Rect, tile: TerrainTile) -> usize {
    let rect = rect.clamped(self.size());
    let mut changed = 0;
    for pos in rect.positions() {
      let index = self.tiles.expect_index(pos);
      if self.write(index, tile) {
        changed += 1;
      }
    }
    changed
  }

  /// Forces the tiles in `rect` to be re-sent on the next delta sync.
  pub fn invalidate(&mut self, rect: Rect) {
    let rect = rect.clamped(self.size());
    for pos in rect.positions() {
      let index = self.tiles.expect_index(pos);
      self.dirty.mark(index);
    }
  }

  /// Forces the next sync to carry full state.
  pub fn invalidate_all(&mut self) {
    self.needs_full_sync = true;
  }

  /// Counter advanced by every tile change.
  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Returns true if anything would be sent on the next delta sync.
  pub fn is_dirty(&self) -> bool {
    self.needs_full_sync || !self.dirty.is_empty()
  }

  pub fn dirty_count(&self) -> usize {
    self.dirty.count()
  }

  fn write(&mut self, index: usize, tile: TerrainTile) -> bool {
    let slot = &mut self.tiles.as_mut_slice()[index];
    if *slot == tile {
      return false;
    }
    *slot = tile;
    self.dirty.mark(index);
    self.generation += 1;
    true
  }

  fn should_use_delta(&self) -> bool {
    (self.dirty.count() as f32) < (self.tiles.len() as f32 * self.delta_threshold)
  }

  /// Pushes the current state to the render entity, stamped with `time`.
  ///
  /// A no-op when no render entity is attached. Safe to call any number of
  /// times; the chunk forwards `time` as-is and does not enforce ordering.
  /// Every call with an attached entity pushes, so the entity always sees the
  /// latest `time`.
  #[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
  pub fn render_update(&mut self, time: SimTime) -> SyncOutcome {
    let Some(entity) = self.render_entity.as_ref() else {
      return SyncOutcome::Detached;
    };

    let full = match self.sync_mode {
      SyncMode::Full => true,
      SyncMode::Delta => self.needs_full_sync || !self.should_use_delta(),
    };
    let clean = !full && self.dirty.is_empty();

    let tiles = if full {
      TileState::Full(Arc::from(self.tiles.as_slice()))
    } else {
      let data = self.tiles.as_slice();
      TileState::Delta(
        self
          .dirty
          .iter()
          .map(|index| TileChange {
            index: index as u32,
            tile: data[index],
          })
          .collect(),
      )
    };

    let update = TerrainUpdate {
      size: self.size(),
      offset: self.offset,
      generation: self.generation,
      tiles,
    };
    let sent = update.tile_count();
    entity.update(update, time);

    self.dirty.clear();
    self.needs_full_sync = false;

    trace!(
      "Synced chunk {:?} at {} ({} tiles, {})",
      self.offset,
      time,
      sent,
      if full { "full" } else { "delta" }
    );

    if full {
      SyncOutcome::Full { tiles: sent }
    } else if clean {
      SyncOutcome::Skipped
    } else {
      SyncOutcome::Delta { tiles: sent }
    }
  }
}

/// Chunk construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
  /// Width or height is zero.
  ZeroSize(ChunkSize),
  /// Size exceeds the configured maximum chunk dimensions.
  SizeExceedsLimit { size: ChunkSize, limit: ChunkSize },
  /// Tile buffer length is not `width * height`.
  TileCountMismatch { expected: usize, actual: usize },
}

impl From<LengthMismatch> for ChunkError {
  fn from(err: LengthMismatch) -> Self {
    Self::TileCountMismatch {
      expected: err.expected,
      actual: err.actual,
    }
  }
}

impl std::fmt::Display for ChunkError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::ZeroSize(size) => write!(f, "chunk size {} has a zero dimension", size),
      Self::SizeExceedsLimit { size, limit } => {
        write!(f, "chunk size {} exceeds limit {}", size, limit)
      }
      Self::TileCountMismatch { expected, actual } => {
        write!(
          f,
          "tile count mismatch: expected {}, got {}",
          expected, actual
        )
      }
    }
  }
}

impl std::error::Error for ChunkError {}
