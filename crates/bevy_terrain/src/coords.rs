//! Coordinate types and spatial constants.
//!
//! Defines the coordinate system for the terrain:
//! - [`TilePos`]: Absolute tile position in the world terrain grid (i64)
//! - [`TileDelta`]: Tile displacement, used for chunk offsets (i32)
//! - [`ChunkPos`]: Cell of the terrain's chunk grid (i32)
//! - [`LocalPos`]: Tile position within a chunk (u16)
//! - [`ChunkSize`]: Width and height of a chunk in tiles
//!
//! The conversion from world to chunk-local coordinates is
//! `local = world - offset`. Chunks never perform it themselves; the owning
//! [`Terrain`](crate::terrain::Terrain) does.

use serde::{Deserialize, Serialize};

/// Maximum chunk width in tiles.
pub const MAX_CHUNK_WIDTH: u16 = 16;

/// Maximum chunk height in tiles.
pub const MAX_CHUNK_HEIGHT: u16 = 16;

/// Size of a chunk in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkSize {
  pub width: u16,
  pub height: u16,
}

impl ChunkSize {
  /// Creates a new chunk size.
  pub const fn new(width: u16, height: u16) -> Self {
    Self { width, height }
  }

  /// The largest chunk size allowed by the global limits.
  pub const fn max() -> Self {
    Self::new(MAX_CHUNK_WIDTH, MAX_CHUNK_HEIGHT)
  }

  /// Number of tiles covered by this size (`width * height`).
  #[inline]
  pub const fn tile_count(self) -> usize {
    self.width as usize * self.height as usize
  }

  /// Returns true if the local position lies inside `[0,width) x [0,height)`.
  #[inline]
  pub const fn contains(self, pos: LocalPos) -> bool {
    pos.x < self.width && pos.y < self.height
  }
}

impl std::fmt::Display for ChunkSize {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}x{}", self.width, self.height)
  }
}

/// Tile displacement relative to the terrain origin.
///
/// Used as the chunk offset. Immutable once a chunk is constructed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileDelta {
  pub x: i32,
  pub y: i32,
}

impl TileDelta {
  /// Creates a new tile delta.
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }
}

/// Absolute tile position in the world terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilePos {
  pub x: i64,
  pub y: i64,
}

impl TilePos {
  /// Creates a new tile position.
  pub const fn new(x: i64, y: i64) -> Self {
    Self { x, y }
  }

  /// Converts to a position local to a chunk with the given offset and size.
  ///
  /// Returns `None` if the position falls outside the chunk.
  pub fn to_local(self, offset: TileDelta, size: ChunkSize) -> Option<LocalPos> {
    let lx = self.x - offset.x as i64;
    let ly = self.y - offset.y as i64;
    if lx < 0 || ly < 0 || lx >= size.width as i64 || ly >= size.height as i64 {
      return None;
    }
    Some(LocalPos::new(lx as u16, ly as u16))
  }

  /// Returns the chunk grid cell containing this tile for a grid with the
  /// given pitch.
  ///
  /// Uses floor division for correct negative coordinate handling.
  /// For example, tile -1 with a pitch of 16 maps to cell -1.
  pub fn to_chunk(self, pitch: ChunkSize) -> ChunkPos {
    let cx = self.x.div_euclid(pitch.width as i64) as i32;
    let cy = self.y.div_euclid(pitch.height as i64) as i32;
    ChunkPos::new(cx, cy)
  }
}

/// Tile position within a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalPos {
  pub x: u16,
  pub y: u16,
}

impl LocalPos {
  /// Creates a new local position.
  pub const fn new(x: u16, y: u16) -> Self {
    Self { x, y }
  }

  /// Converts back to world coordinates for a chunk at `offset`.
  pub fn to_world(self, offset: TileDelta) -> TilePos {
    TilePos::new(
      offset.x as i64 + self.x as i64,
      offset.y as i64 + self.y as i64,
    )
  }
}

/// Cell in the terrain's regular chunk grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkPos {
  pub x: i32,
  pub y: i32,
}

impl ChunkPos {
  /// Creates a new chunk position.
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }

  /// Offset of this cell's origin for a grid with the given pitch, or `None`
  /// if it does not fit in an `i32` tile offset.
  pub fn to_offset(self, pitch: ChunkSize) -> Option<TileDelta> {
    Some(TileDelta::new(
      self.x.checked_mul(i32::from(pitch.width))?,
      self.y.checked_mul(i32::from(pitch.height))?,
    ))
  }

  /// Returns the cell whose origin is `offset`, or `None` if the offset is not
  /// aligned to the grid pitch.
  pub fn from_offset(offset: TileDelta, pitch: ChunkSize) -> Option<Self> {
    let w = pitch.width as i32;
    let h = pitch.height as i32;
    if offset.x.rem_euclid(w) != 0 || offset.y.rem_euclid(h) != 0 {
      return None;
    }
    Some(Self::new(offset.x.div_euclid(w), offset.y.div_euclid(h)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn world_to_local_inside_and_outside() {
    let offset = TileDelta::new(4, 4);
    let size = ChunkSize::new(2, 2);

    assert_eq!(
      TilePos::new(5, 4).to_local(offset, size),
      Some(LocalPos::new(1, 0))
    );
    assert_eq!(TilePos::new(6, 4).to_local(offset, size), None);
    assert_eq!(TilePos::new(3, 5).to_local(offset, size), None);
  }

  #[test]
  fn local_to_world_inverts_to_local() {
    let offset = TileDelta::new(-16, 32);
    let size = ChunkSize::max();
    let local = LocalPos::new(15, 3);

    let world = local.to_world(offset);
    assert_eq!(world, TilePos::new(-1, 35));
    assert_eq!(world.to_local(offset, size), Some(local));
  }

  #[test]
  fn negative_tiles_floor_into_cells() {
    let pitch = ChunkSize::max();
    assert_eq!(TilePos::new(-1, 0).to_chunk(pitch), ChunkPos::new(-1, 0));
    assert_eq!(TilePos::new(-16, 15).to_chunk(pitch), ChunkPos::new(-1, 0));
    assert_eq!(TilePos::new(-17, 16).to_chunk(pitch), ChunkPos::new(-2, 1));
  }

  #[test]
  fn offset_alignment() {
    let pitch = ChunkSize::new(8, 4);
    assert_eq!(
      ChunkPos::from_offset(TileDelta::new(-8, 12), pitch),
      Some(ChunkPos::new(-1, 3))
    );
    assert_eq!(ChunkPos::from_offset(TileDelta::new(3, 0), pitch), None);
    assert_eq!(
      ChunkPos::new(2, -1).to_offset(pitch),
      Some(TileDelta::new(16, -4))
    );
  }

  #[test]
  fn offset_overflow_is_none() {
    let pitch = ChunkSize::max();
    assert_eq!(ChunkPos::new(i32::MAX / 16 + 1, 0).to_offset(pitch), None);
    assert_eq!(ChunkPos::new(0, i32::MIN).to_offset(pitch), None);
    assert_eq!(
      ChunkPos::new(i32::MAX / 16, 0).to_offset(pitch),
      Some(TileDelta::new(i32::MAX / 16 * 16, 0))
    );
  }
}
