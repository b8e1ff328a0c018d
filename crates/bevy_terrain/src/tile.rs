//! Terrain tile format.

use bitflags::bitflags;

/// Terrain type registry index.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct TerrainId(pub u16);

bitflags! {
  /// Per-tile simulation flags.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
  pub struct TileFlags: u8 {
    /// A unit or building currently stands on the tile.
    const OCCUPIED = 1 << 0;
    /// Ground units cannot path through the tile.
    const IMPASSABLE = 1 << 1;
  }
}

/// One terrain cell. Stored by value in its chunk's grid.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct TerrainTile {
  pub terrain: TerrainId,
  /// Height in elevation steps above the terrain base level.
  pub elevation: i16,
  pub flags: TileFlags,
}

impl TerrainTile {
  pub const fn new(terrain: TerrainId, elevation: i16) -> Self {
    Self {
      terrain,
      elevation,
      flags: TileFlags::empty(),
    }
  }

  /// Returns a copy with the given flags set.
  pub fn with_flags(mut self, flags: TileFlags) -> Self {
    self.flags = flags;
    self
  }

  #[inline]
  pub fn is_passable(&self) -> bool {
    !self.flags.contains(TileFlags::IMPASSABLE)
  }

  #[inline]
  pub fn is_occupied(&self) -> bool {
    self.flags.contains(TileFlags::OCCUPIED)
  }
}
