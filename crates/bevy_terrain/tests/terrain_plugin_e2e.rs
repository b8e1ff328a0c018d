//! Headless Bevy E2E test of the terrain render sync.
//!
//! Tests the complete frame flow:
//! 1. Spawn a terrain (render entities are attached automatically)
//! 2. Write tiles from a `FixedUpdate` system
//! 3. Run frames
//! 4. Verify the render stage drawables mirror the terrain

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_terrain::{
  ChunkSize, SimTime, SyncMetrics, SyncMode, Terrain, TerrainConfig, TerrainId, TerrainPlugin,
  TerrainRenderStage, TerrainTile, TilePos,
};

/// Simulated frame delta, longer than the default fixed timestep so every
/// frame runs at least one simulation tick.
const FRAME: Duration = Duration::from_millis(20);

const PITCH: ChunkSize = ChunkSize::new(8, 8);

#[derive(Resource, Default)]
struct PendingWrites(Vec<(TilePos, TerrainTile)>);

fn apply_writes(mut writes: ResMut<PendingWrites>, mut terrains: Query<&mut Terrain>) {
  for (pos, tile) in writes.0.drain(..) {
    for mut terrain in terrains.iter_mut() {
      terrain.set_tile(pos, tile);
    }
  }
}

struct TestHarness {
  app: App,
  terrain: Entity,
}

impl TestHarness {
  fn new(mode: SyncMode) -> Self {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(TerrainPlugin::default().sync_mode(mode));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.init_resource::<PendingWrites>();
    app.add_systems(FixedUpdate, apply_writes);

    let config = app.world().resource::<TerrainConfig>().clone();
    let terrain = Terrain::generate(3, 2, PITCH, &config, |_| {
      TerrainTile::new(TerrainId(1), 0)
    })
    .unwrap();
    let terrain = app.world_mut().spawn(terrain).id();

    Self { app, terrain }
  }

  fn run(&mut self, frames: usize) {
    for _ in 0..frames {
      self.app.update();
    }
  }

  fn write(&mut self, pos: TilePos, tile: TerrainTile) {
    self
      .app
      .world_mut()
      .resource_mut::<PendingWrites>()
      .0
      .push((pos, tile));
  }

  fn terrain(&self) -> &Terrain {
    self.app.world().get::<Terrain>(self.terrain).unwrap()
  }

  fn stage(&self) -> &TerrainRenderStage {
    self.app.world().resource::<TerrainRenderStage>()
  }

  /// Asserts every drawable matches the chunk at its offset.
  fn assert_stage_mirrors_terrain(&self) {
    let terrain = self.terrain();
    let mut seen = 0;
    for (_, drawable) in self.stage().drawables() {
      let origin = TilePos::new(drawable.offset.x as i64, drawable.offset.y as i64);
      let chunk = terrain.chunk_at(origin).unwrap();
      assert_eq!(drawable.size, chunk.size());
      assert_eq!(&drawable.tiles[..], chunk.tiles());
      seen += 1;
    }
    assert_eq!(seen, terrain.chunks().len());
  }
}

#[test]
fn spawned_terrain_reaches_render_stage() {
  let mut harness = TestHarness::new(SyncMode::Full);
  harness.run(1);

  assert_eq!(harness.stage().len(), 6);
  assert!(harness.terrain().chunks().iter().all(|c| c.has_render_entity()));
  harness.assert_stage_mirrors_terrain();
}

#[test]
fn fixed_update_writes_show_up_after_the_frame() {
  for mode in [SyncMode::Full, SyncMode::Delta] {
    let mut harness = TestHarness::new(mode);
    harness.run(2);

    let lava = TerrainTile::new(TerrainId(7), 3);
    harness.write(TilePos::new(9, 12), lava);
    harness.write(TilePos::new(23, 0), lava);
    harness.run(2);

    assert_eq!(harness.terrain().tile(TilePos::new(9, 12)), Some(&lava));
    harness.assert_stage_mirrors_terrain();
  }
}

#[test]
fn drawable_times_never_go_backwards() {
  let mut harness = TestHarness::new(SyncMode::Full);
  let mut last = SimTime::ZERO;
  for frame in 0..10 {
    harness.write(TilePos::new(frame, 0), TerrainTile::new(TerrainId(2), 0));
    harness.run(1);
    for (_, drawable) in harness.stage().drawables() {
      assert!(drawable.time >= last);
    }
    last = harness
      .stage()
      .drawables()
      .map(|(_, d)| d.time)
      .max()
      .unwrap_or(last);
  }
  assert!(last > SimTime::ZERO);
}

#[test]
fn delta_mode_skips_clean_chunks() {
  let mut harness = TestHarness::new(SyncMode::Delta);
  harness.run(2);

  harness.write(TilePos::new(1, 1), TerrainTile::new(TerrainId(4), 0));
  harness.run(1);

  let metrics = harness.app.world().resource::<SyncMetrics>();
  assert_eq!(metrics.last_frame.delta, 1);
  assert_eq!(metrics.last_frame.skipped, 5);
  assert_eq!(metrics.last_frame.tiles_sent, 1);
}

#[test]
fn despawned_terrain_releases_render_entities() {
  let mut harness = TestHarness::new(SyncMode::Full);
  harness.run(1);
  assert_eq!(harness.stage().len(), 6);

  let terrain = harness.terrain;
  harness.app.world_mut().despawn(terrain);
  harness.run(1);

  assert!(harness.stage().is_empty());
}
