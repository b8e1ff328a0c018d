//! Default renderer-side sync target.

use std::sync::{Arc, Mutex, MutexGuard};

use bevy::log::{debug, warn};

use super::{RenderSyncTarget, TerrainUpdate, TileState};
use crate::coords::{ChunkSize, TileDelta};
use crate::tile::TerrainTile;
use crate::time::SimTime;

/// Latest terrain state received by a [`TerrainRenderEntity`].
#[derive(Clone, Debug)]
pub struct TerrainRenderState {
  pub size: ChunkSize,
  pub offset: TileDelta,
  pub tiles: Arc<[TerrainTile]>,
  pub generation: u64,
  pub time: SimTime,
}

#[derive(Default)]
struct Inner {
  size: Option<ChunkSize>,
  offset: TileDelta,
  tiles: Vec<TerrainTile>,
  generation: u64,
  last_update: Option<SimTime>,
  changed: bool,
}

/// Mailbox between a chunk and the renderer.
///
/// The chunk writes through [`RenderSyncTarget::update`]; the renderer reads
/// on its own frame cadence with [`fetch_update`](Self::fetch_update). The
/// lock is held only for the copy in either direction.
#[derive(Default)]
pub struct TerrainRenderEntity {
  inner: Mutex<Inner>,
}

impl TerrainRenderEntity {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    // Poisoning is ignored: the next full update rewrites every field.
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Returns true if a state arrived that the renderer hasn't fetched yet.
  pub fn is_changed(&self) -> bool {
    self.lock().changed
  }

  /// Timestamp of the most recent accepted update.
  pub fn last_update(&self) -> Option<SimTime> {
    self.lock().last_update
  }

  pub fn generation(&self) -> u64 {
    self.lock().generation
  }

  /// Returns the current state without consuming the change flag.
  pub fn snapshot(&self) -> Option<TerrainRenderState> {
    let inner = self.lock();
    Self::state_of(&inner)
  }

  /// Returns the new state once per change, then `None` until the next
  /// accepted update.
  pub fn fetch_update(&self) -> Option<TerrainRenderState> {
    let mut inner = self.lock();
    if !inner.changed {
      return None;
    }
    inner.changed = false;
    Self::state_of(&inner)
  }

  fn state_of(inner: &Inner) -> Option<TerrainRenderState> {
    Some(TerrainRenderState {
      size: inner.size?,
      offset: inner.offset,
      tiles: Arc::from(inner.tiles.as_slice()),
      generation: inner.generation,
      time: inner.last_update?,
    })
  }
}

impl RenderSyncTarget for TerrainRenderEntity {
  fn update(&self, update: TerrainUpdate, time: SimTime) {
    let mut inner = self.lock();

    // Full state is authoritative even at a lower generation: the entity may
    // have been re-attached to a chunk whose counter started over.
    if !update.is_full() && update.generation < inner.generation {
      debug!(
        "Dropping stale terrain delta for chunk {:?}: generation {} < {}",
        update.offset, update.generation, inner.generation
      );
      return;
    }

    let advanced = inner.last_update.is_none_or(|last| time > last);
    match &update.tiles {
      TileState::Full(tiles) => {
        inner.tiles.clear();
        inner.tiles.extend_from_slice(&tiles);
        inner.size = Some(update.size);
        inner.offset = update.offset;
      }
      TileState::Delta(changes) => {
        if inner.size != Some(update.size) {
          warn!(
            "Ignoring terrain delta for chunk {:?} without a full state to apply it to",
            update.offset
          );
          return;
        }
        for change in changes.iter() {
          match inner.tiles.get_mut(change.index as usize) {
            Some(tile) => *tile = change.tile,
            None => warn!(
              "Terrain delta index {} out of range for chunk {:?}",
              change.index, update.offset
            ),
          }
        }
      }
    }

    inner.generation = update.generation;
    inner.last_update = Some(match inner.last_update {
      Some(last) if last > time => last,
      _ => time,
    });
    inner.changed |= update.tile_count() > 0 || advanced;
  }
}
