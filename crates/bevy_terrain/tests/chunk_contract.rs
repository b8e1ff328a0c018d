//! Contract tests for `TerrainChunk` construction and render sync.
//!
//! Every test attaches a recording target that stores each push verbatim, so
//! assertions are made against exactly what the renderer would observe.

use std::sync::{Arc, Mutex};

use bevy_terrain::{
  ChunkError, ChunkSize, RenderSyncTarget, SimTime, SyncMode, TerrainChunk, TerrainId,
  TerrainRenderEntity, TerrainTile, TerrainUpdate, TileDelta, TileState,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Default)]
struct RecordingTarget {
  pushes: Mutex<Vec<(TerrainUpdate, SimTime)>>,
}

impl RecordingTarget {
  fn count(&self) -> usize {
    self.pushes.lock().unwrap().len()
  }

  fn last(&self) -> Option<(TerrainUpdate, SimTime)> {
    self.pushes.lock().unwrap().last().cloned()
  }
}

impl RenderSyncTarget for RecordingTarget {
  fn update(&self, update: TerrainUpdate, time: SimTime) {
    self.pushes.lock().unwrap().push((update, time));
  }
}

fn tile(id: u16) -> TerrainTile {
  TerrainTile::new(TerrainId(id), id as i16)
}

fn full_tiles(update: &TerrainUpdate) -> &[TerrainTile] {
  match &update.tiles {
    TileState::Full(tiles) => tiles,
    TileState::Delta(_) => panic!("expected full payload"),
  }
}

#[test]
fn every_valid_position_is_addressable() {
  for width in 1..=16u16 {
    for height in [1u16, 7, 16] {
      let size = ChunkSize::new(width, height);
      let tiles: Vec<_> = (0..size.tile_count()).map(|i| tile(i as u16)).collect();
      let chunk = TerrainChunk::new(size, TileDelta::new(3, -2), tiles).unwrap();

      for y in 0..height {
        for x in 0..width {
          let expected = tile(y * width + x);
          assert_eq!(*chunk.tile(x, y), expected);
          assert_eq!(chunk.tiles()[(y * width + x) as usize], expected);
        }
      }
    }
  }
}

#[test]
fn off_by_one_tile_counts_fail() {
  let size = ChunkSize::new(5, 3);
  for len in [14, 16] {
    let err = TerrainChunk::new(size, TileDelta::default(), vec![tile(0); len]).unwrap_err();
    assert_eq!(
      err,
      ChunkError::TileCountMismatch {
        expected: 15,
        actual: len
      }
    );
  }
}

#[test]
#[should_panic(expected = "out of bounds")]
fn out_of_range_access_panics() {
  let chunk = TerrainChunk::filled(ChunkSize::new(2, 2), TileDelta::default(), tile(0)).unwrap();
  chunk.tile(0, 2);
}

#[test]
fn render_update_without_target_is_a_no_op() {
  let mut chunk =
    TerrainChunk::filled(ChunkSize::new(4, 4), TileDelta::default(), tile(1)).unwrap();
  for secs in 0..3 {
    assert_eq!(
      chunk.render_update(SimTime::from_secs(secs)),
      bevy_terrain::SyncOutcome::Detached
    );
  }
  assert!(!chunk.has_render_entity());
}

#[test]
fn detached_target_is_never_called_again() {
  let mut chunk =
    TerrainChunk::filled(ChunkSize::new(4, 4), TileDelta::default(), tile(1)).unwrap();
  let target = Arc::new(RecordingTarget::default());

  chunk.set_render_entity(Some(target.clone()));
  chunk.render_update(SimTime::from_secs(1));
  chunk.set_render_entity(None);
  chunk.set_tile(0, 0, tile(2));
  chunk.render_update(SimTime::from_secs(2));

  assert_eq!(target.count(), 1);
}

#[test]
fn replacing_target_is_last_write_wins() {
  let mut chunk =
    TerrainChunk::filled(ChunkSize::new(2, 2), TileDelta::default(), tile(1)).unwrap();
  let first = Arc::new(RecordingTarget::default());
  let second = Arc::new(RecordingTarget::default());

  chunk.set_render_entity(Some(first.clone()));
  chunk.set_render_entity(Some(second.clone()));
  chunk.render_update(SimTime::from_secs(1));

  assert_eq!(first.count(), 0);
  assert_eq!(second.count(), 1);
}

#[test]
fn non_decreasing_updates_leave_target_consistent() {
  for mode in [SyncMode::Full, SyncMode::Delta] {
    let mut chunk =
      TerrainChunk::filled(ChunkSize::new(3, 3), TileDelta::new(6, 6), tile(0)).unwrap();
    chunk.set_sync_mode(mode);
    let entity = Arc::new(TerrainRenderEntity::new());
    chunk.set_render_entity(Some(entity.clone()));

    chunk.render_update(SimTime::from_secs(4));
    chunk.set_tile(1, 2, tile(9));
    chunk.render_update(SimTime::from_secs(4));
    chunk.render_update(SimTime::from_secs(7));

    let state = entity.snapshot().unwrap();
    assert_eq!(&state.tiles[..], chunk.tiles(), "{:?}", mode);
    assert_eq!(entity.last_update(), Some(SimTime::from_secs(7)), "{:?}", mode);
  }
}

#[test]
fn render_entity_moved_to_fresh_chunk_shows_its_tiles() {
  for mode in [SyncMode::Full, SyncMode::Delta] {
    let size = ChunkSize::new(2, 2);
    let entity = Arc::new(TerrainRenderEntity::new());

    let mut old = TerrainChunk::filled(size, TileDelta::default(), tile(0)).unwrap();
    old.set_sync_mode(mode);
    old.set_render_entity(Some(entity.clone()));
    for step in 1..=5 {
      old.set_tile(0, 0, tile(step));
      old.render_update(SimTime::from_secs(step as u64));
    }
    old.set_render_entity(None);

    let mut fresh = TerrainChunk::filled(size, TileDelta::default(), tile(9)).unwrap();
    fresh.set_sync_mode(mode);
    fresh.set_render_entity(Some(entity.clone()));
    fresh.render_update(SimTime::from_secs(6));

    let state = entity.snapshot().unwrap();
    assert_eq!(&state.tiles[..], fresh.tiles(), "{:?}", mode);
    assert_eq!(state.generation, 0);
  }
}

#[test]
fn full_mode_target_sees_latest_time() {
  let mut chunk =
    TerrainChunk::filled(ChunkSize::new(2, 2), TileDelta::default(), tile(0)).unwrap();
  let target = Arc::new(RecordingTarget::default());
  chunk.set_render_entity(Some(target.clone()));

  chunk.render_update(SimTime::from_secs(1));
  chunk.render_update(SimTime::from_secs(1));
  chunk.render_update(SimTime::from_secs(5));

  let (update, time) = target.last().unwrap();
  assert_eq!(time, SimTime::from_secs(5));
  assert_eq!(full_tiles(&update), chunk.tiles());
  assert_eq!(target.count(), 3);
}

#[test]
fn size_and_offset_survive_mutation_and_sync() {
  let size = ChunkSize::new(7, 5);
  let offset = TileDelta::new(-14, 35);
  let mut chunk = TerrainChunk::filled(size, offset, tile(0)).unwrap();
  chunk.set_render_entity(Some(Arc::new(RecordingTarget::default())));

  let mut rng = StdRng::seed_from_u64(7);
  for step in 0..200u64 {
    let x = rng.gen_range(0..size.width);
    let y = rng.gen_range(0..size.height);
    chunk.set_tile(x, y, tile(rng.gen_range(0..32)));
    if step % 3 == 0 {
      chunk.render_update(SimTime::from_secs(step));
    }
  }

  assert_eq!(chunk.size(), size);
  assert_eq!(chunk.offset(), offset);
}

#[test]
fn random_delta_syncs_match_full_state() {
  let size = ChunkSize::new(16, 16);
  let mut chunk = TerrainChunk::filled(size, TileDelta::new(16, 0), tile(0)).unwrap();
  chunk.set_sync_mode(SyncMode::Delta);
  let entity = Arc::new(TerrainRenderEntity::new());
  chunk.set_render_entity(Some(entity.clone()));

  let mut rng = StdRng::seed_from_u64(42);
  for frame in 0..100u64 {
    let writes = rng.gen_range(0..40);
    for _ in 0..writes {
      let x = rng.gen_range(0..size.width);
      let y = rng.gen_range(0..size.height);
      chunk.set_tile(x, y, tile(rng.gen_range(0..8)));
    }
    if rng.gen_bool(0.1) {
      chunk.invalidate_all();
    }
    chunk.render_update(SimTime::from_secs(frame));

    let state = entity.snapshot().unwrap();
    assert_eq!(&state.tiles[..], chunk.tiles(), "frame {}", frame);
    assert_eq!(state.generation, chunk.generation());
    assert!(!chunk.is_dirty());
  }
}

#[test]
fn two_by_two_scenario() {
  let (a, b, c, d, e) = (tile(1), tile(2), tile(3), tile(4), tile(5));
  let mut chunk =
    TerrainChunk::new(ChunkSize::new(2, 2), TileDelta::new(4, 4), vec![a, b, c, d]).unwrap();
  assert_eq!(*chunk.tile(1, 0), b);

  chunk.set_tile(1, 0, e);
  let target = Arc::new(RecordingTarget::default());
  chunk.set_render_entity(Some(target.clone()));
  chunk.render_update(SimTime::from_secs(10));

  let (update, time) = target.last().unwrap();
  assert_eq!(full_tiles(&update), &[a, e, c, d]);
  assert_eq!(time, SimTime::from_secs(10));
  assert_eq!(update.offset, TileDelta::new(4, 4));
  assert_eq!(update.size, ChunkSize::new(2, 2));
}
