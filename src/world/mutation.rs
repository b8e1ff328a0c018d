//! Random tile writes standing in for the simulation.

use bevy::prelude::*;
use bevy_terrain::{Terrain, TerrainId, TerrainTile, TileFlags, TilePos};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of distinct terrain types the demo paints with.
pub const TERRAIN_KINDS: u16 = 6;

#[derive(Resource)]
pub struct TileWriter {
  rng: StdRng,
  writes_per_tick: u32,
  /// World extent in tiles, starting at the origin.
  width: i64,
  height: i64,
}

impl TileWriter {
  pub fn new(seed: u64, writes_per_tick: u32, width: i64, height: i64) -> Self {
    Self {
      rng: StdRng::seed_from_u64(seed),
      writes_per_tick,
      width,
      height,
    }
  }
}

/// Random tile with a small chance of carrying a flag.
pub fn random_tile(rng: &mut impl Rng) -> TerrainTile {
  let tile = TerrainTile::new(
    TerrainId(rng.random_range(0..TERRAIN_KINDS)),
    rng.random_range(-4..=4),
  );
  match rng.random_range(0..10) {
    0 => tile.with_flags(TileFlags::OCCUPIED),
    1 => tile.with_flags(TileFlags::IMPASSABLE),
    _ => tile,
  }
}

/// System: Overwrites random tiles of every terrain.
pub fn write_random_tiles(mut writer: ResMut<TileWriter>, mut terrains: Query<&mut Terrain>) {
  let writer = &mut *writer;
  if writer.width <= 0 || writer.height <= 0 {
    return;
  }

  for mut terrain in terrains.iter_mut() {
    let mut changed = 0;
    for _ in 0..writer.writes_per_tick {
      let pos = TilePos::new(
        writer.rng.random_range(0..writer.width),
        writer.rng.random_range(0..writer.height),
      );
      if terrain.set_tile(pos, random_tile(&mut writer.rng)) {
        changed += 1;
      }
    }
    trace!("Simulation tick changed {} tiles", changed);
  }
}
