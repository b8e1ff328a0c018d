//! Terrain - owner of all chunks of a world.
//!
//! Chunks are laid out on a regular grid with a fixed pitch. Every chunk's
//! offset is aligned to the pitch and its size is at most the pitch, so edge
//! chunks may be smaller than interior ones. World tile coordinates are
//! routed to a chunk by grid cell and then translated with
//! `local = world - offset`.

use std::collections::HashMap;

use bevy::prelude::*;
use rayon::prelude::*;

use crate::chunk::{ChunkError, SyncOutcome, TerrainChunk};
use crate::config::TerrainConfig;
use crate::coords::{ChunkPos, ChunkSize, LocalPos, TileDelta, TilePos};
use crate::render::{RenderEntityId, TerrainRenderStage};
use crate::tile::TerrainTile;
use crate::time::SimTime;

/// Aggregate result of syncing every chunk of a terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
  pub full: usize,
  pub delta: usize,
  pub skipped: usize,
  pub detached: usize,
  pub tiles_sent: usize,
}

impl SyncStats {
  fn record(mut self, outcome: SyncOutcome) -> Self {
    match outcome {
      SyncOutcome::Full { .. } => self.full += 1,
      SyncOutcome::Delta { .. } => self.delta += 1,
      SyncOutcome::Skipped => self.skipped += 1,
      SyncOutcome::Detached => self.detached += 1,
    }
    self.tiles_sent += outcome.tiles_sent();
    self
  }

  pub(crate) fn merge(self, other: Self) -> Self {
    Self {
      full: self.full + other.full,
      delta: self.delta + other.delta,
      skipped: self.skipped + other.skipped,
      detached: self.detached + other.detached,
      tiles_sent: self.tiles_sent + other.tiles_sent,
    }
  }

  /// Number of chunks that pushed anything.
  pub fn pushed(&self) -> usize {
    self.full + self.delta
  }
}

/// World terrain component.
///
/// Spawn this as a component on an entity; [`TerrainPlugin`] syncs every
/// terrain to its render entities once per frame.
///
/// [`TerrainPlugin`]: crate::TerrainPlugin
#[derive(Component)]
pub struct Terrain {
  pitch: ChunkSize,
  chunks: Vec<TerrainChunk>,
  /// Grid cell to index into `chunks`.
  index: HashMap<ChunkPos, usize>,
  parallel_threshold: usize,
}

impl Terrain {
  /// Creates an empty terrain with the given chunk grid pitch.
  ///
  /// # Panics
  /// If the pitch has a zero dimension.
  pub fn empty(pitch: ChunkSize) -> Self {
    assert!(
      pitch.width > 0 && pitch.height > 0,
      "terrain grid pitch {} has a zero dimension",
      pitch
    );
    Self {
      pitch,
      chunks: Vec::new(),
      index: HashMap::new(),
      parallel_threshold: TerrainConfig::default().parallel_threshold,
    }
  }

  /// Creates a terrain from pre-built chunks.
  pub fn new(pitch: ChunkSize, chunks: Vec<TerrainChunk>) -> Result<Self, TerrainError> {
    check_pitch(pitch)?;
    let mut terrain = Self::empty(pitch);
    for chunk in chunks {
      terrain.insert_chunk(chunk)?;
    }
    Ok(terrain)
  }

  /// Builds a `chunks_x` by `chunks_y` grid of `pitch`-sized chunks with the
  /// origin chunk at offset (0, 0), asking `tile_at` for every tile.
  ///
  /// Fails before generating anything if the grid's far corner is not
  /// addressable by an `i32` tile offset.
  pub fn generate(
    chunks_x: u32,
    chunks_y: u32,
    pitch: ChunkSize,
    config: &TerrainConfig,
    mut tile_at: impl FnMut(TilePos) -> TerrainTile,
  ) -> Result<Self, TerrainError> {
    check_pitch(pitch)?;
    let too_large = TerrainError::GridTooLarge {
      chunks_x,
      chunks_y,
      pitch,
    };
    let (Ok(cells_x), Ok(cells_y)) = (i32::try_from(chunks_x), i32::try_from(chunks_y)) else {
      return Err(too_large);
    };
    let far_corner = ChunkPos::new(cells_x.saturating_sub(1), cells_y.saturating_sub(1));
    if far_corner.to_offset(pitch).is_none() {
      return Err(too_large);
    }

    let mut terrain = Self::empty(pitch);
    terrain.parallel_threshold = config.parallel_threshold;

    for cy in 0..cells_y {
      for cx in 0..cells_x {
        let offset = ChunkPos::new(cx, cy)
          .to_offset(pitch)
          .ok_or_else(|| too_large.clone())?;
        let mut tiles = Vec::with_capacity(pitch.tile_count());
        for y in 0..pitch.height {
          for x in 0..pitch.width {
            tiles.push(tile_at(LocalPos::new(x, y).to_world(offset)));
          }
        }
        let chunk = TerrainChunk::from_config(pitch, offset, tiles, config)?;
        terrain.insert_chunk(chunk)?;
      }
    }

    info!(
      "Generated terrain with {} chunks of {}",
      terrain.chunks.len(),
      pitch
    );
    Ok(terrain)
  }

  /// Adds a chunk at its own offset.
  pub fn insert_chunk(&mut self, chunk: TerrainChunk) -> Result<(), TerrainError> {
    let offset = chunk.offset();
    let size = chunk.size();
    if size.width > self.pitch.width || size.height > self.pitch.height {
      return Err(TerrainError::LargerThanPitch {
        size,
        pitch: self.pitch,
      });
    }
    let cell =
      ChunkPos::from_offset(offset, self.pitch).ok_or(TerrainError::Misaligned { offset })?;
    if self.index.contains_key(&cell) {
      return Err(TerrainError::Overlap { offset });
    }

    self.index.insert(cell, self.chunks.len());
    self.chunks.push(chunk);
    Ok(())
  }

  /// Removes the chunk at `offset`.
  ///
  /// Its render entity is not notified; the renderer side releases it once
  /// nothing else holds it.
  pub fn unload_chunk(&mut self, offset: TileDelta) -> Option<TerrainChunk> {
    let cell = ChunkPos::from_offset(offset, self.pitch)?;
    let idx = self.index.remove(&cell)?;
    let chunk = self.chunks.swap_remove(idx);

    if let Some(moved) = self.chunks.get(idx) {
      if let Some(moved_cell) = ChunkPos::from_offset(moved.offset(), self.pitch) {
        self.index.insert(moved_cell, idx);
      }
    }
    debug!("Unloaded terrain chunk {:?}", offset);
    Some(chunk)
  }

  pub fn pitch(&self) -> ChunkSize {
    self.pitch
  }

  pub fn set_parallel_threshold(&mut self, threshold: usize) {
    self.parallel_threshold = threshold;
  }

  pub fn chunks(&self) -> &[TerrainChunk] {
    &self.chunks
  }

  /// Returns the chunk index and local position for a world tile.
  fn locate(&self, pos: TilePos) -> Option<(usize, LocalPos)> {
    let idx = *self.index.get(&pos.to_chunk(self.pitch))?;
    let chunk = &self.chunks[idx];
    let local = pos.to_local(chunk.offset(), chunk.size())?;
    Some((idx, local))
  }

  pub fn contains(&self, pos: TilePos) -> bool {
    self.locate(pos).is_some()
  }

  pub fn chunk_at(&self, pos: TilePos) -> Option<&TerrainChunk> {
    self.locate(pos).map(|(idx, _)| &self.chunks[idx])
  }

  pub fn chunk_at_mut(&mut self, pos: TilePos) -> Option<&mut TerrainChunk> {
    self.locate(pos).map(|(idx, _)| &mut self.chunks[idx])
  }

  pub fn tile(&self, pos: TilePos) -> Option<&TerrainTile> {
    let (idx, local) = self.locate(pos)?;
    self.chunks[idx].get_tile(local)
  }

  /// Overwrites a world tile. Returns true if the tile exists and changed.
  pub fn set_tile(&mut self, pos: TilePos, tile: TerrainTile) -> bool {
    match self.locate(pos) {
      Some((idx, local)) => self.chunks[idx].set_tile(local.x, local.y, tile),
      None => false,
    }
  }

  /// Applies `f` to a world tile. Returns true if the tile exists and changed.
  pub fn modify_tile(&mut self, pos: TilePos, f: impl FnOnce(&mut TerrainTile)) -> bool {
    match self.locate(pos) {
      Some((idx, local)) => self.chunks[idx].modify_tile(local.x, local.y, f),
      None => false,
    }
  }

  /// Creates a render entity in `stage` for every chunk that has none.
  pub fn attach_render_entities(&mut self, stage: &mut TerrainRenderStage) -> Vec<RenderEntityId> {
    let mut ids = Vec::new();
    for chunk in self.chunks.iter_mut().filter(|c| !c.has_render_entity()) {
      let (id, entity) = stage.create_entity();
      chunk.set_render_entity(Some(entity));
      ids.push(id);
    }
    ids
  }

  /// Detaches every chunk from its render entity.
  pub fn detach_render_entities(&mut self) {
    for chunk in &mut self.chunks {
      chunk.set_render_entity(None);
    }
  }

  /// Syncs every chunk to its render entity.
  ///
  /// Chunks are independent, so large terrains sync in parallel. No ordering
  /// between chunks is implied.
  pub fn render_update(&mut self, time: SimTime) -> SyncStats {
    if self.chunks.len() >= self.parallel_threshold {
      self
        .chunks
        .par_iter_mut()
        .map(|chunk| SyncStats::default().record(chunk.render_update(time)))
        .reduce(SyncStats::default, SyncStats::merge)
    } else {
      self
        .chunks
        .iter_mut()
        .fold(SyncStats::default(), |stats, chunk| {
          stats.record(chunk.render_update(time))
        })
    }
  }
}

fn check_pitch(pitch: ChunkSize) -> Result<(), TerrainError> {
  if pitch.width == 0 || pitch.height == 0 {
    return Err(ChunkError::ZeroSize(pitch).into());
  }
  Ok(())
}

/// Terrain assembly errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
  Chunk(ChunkError),
  /// Chunk offset is not a multiple of the grid pitch.
  Misaligned { offset: TileDelta },
  /// Chunk is larger than a grid cell.
  LargerThanPitch { size: ChunkSize, pitch: ChunkSize },
  /// Another chunk already occupies the cell.
  Overlap { offset: TileDelta },
  /// Generated grid extends past the `i32` tile offset range.
  GridTooLarge {
    chunks_x: u32,
    chunks_y: u32,
    pitch: ChunkSize,
  },
}

impl From<ChunkError> for TerrainError {
  fn from(err: ChunkError) -> Self {
    Self::Chunk(err)
  }
}

impl std::fmt::Display for TerrainError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Chunk(e) => write!(f, "chunk error: {}", e),
      Self::Misaligned { offset } => {
        write!(f, "chunk offset ({}, {}) not aligned to grid", offset.x, offset.y)
      }
      Self::LargerThanPitch { size, pitch } => {
        write!(f, "chunk size {} larger than grid pitch {}", size, pitch)
      }
      Self::Overlap { offset } => {
        write!(f, "chunk at ({}, {}) overlaps existing chunk", offset.x, offset.y)
      }
      Self::GridTooLarge {
        chunks_x,
        chunks_y,
        pitch,
      } => write!(
        f,
        "{}x{} grid of {} chunks exceeds the tile offset range",
        chunks_x, chunks_y, pitch
      ),
    }
  }
}

impl std::error::Error for TerrainError {}
