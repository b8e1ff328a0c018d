//! Renderer-side registry of terrain render entities.

use std::sync::Arc;

use bevy::prelude::*;

use super::{TerrainRenderEntity, TerrainRenderState};
use crate::coords::{ChunkSize, TileDelta};
use crate::tile::TerrainTile;
use crate::time::SimTime;

/// Stable identity of a registered render entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderEntityId(pub u64);

/// Drawable form of one chunk as last seen by the renderer.
#[derive(Clone, Debug)]
pub struct TerrainDrawable {
  pub offset: TileDelta,
  pub size: ChunkSize,
  pub tiles: Arc<[TerrainTile]>,
  pub generation: u64,
  pub time: SimTime,
}

impl From<TerrainRenderState> for TerrainDrawable {
  fn from(state: TerrainRenderState) -> Self {
    Self {
      offset: state.offset,
      size: state.size,
      tiles: state.tiles,
      generation: state.generation,
      time: state.time,
    }
  }
}

struct StageEntry {
  id: RenderEntityId,
  entity: Arc<TerrainRenderEntity>,
  drawable: Option<TerrainDrawable>,
}

/// Holds a shared handle to every terrain render entity and the drawable
/// built from its latest state.
///
/// Chunks hold the other handle. An entity lives until both sides have
/// released it: [`prune`](Self::prune) drops entries nobody else references.
#[derive(Resource, Default)]
pub struct TerrainRenderStage {
  entries: Vec<StageEntry>,
  next_id: u64,
}

impl TerrainRenderStage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates and registers a fresh render entity.
  pub fn create_entity(&mut self) -> (RenderEntityId, Arc<TerrainRenderEntity>) {
    let entity = Arc::new(TerrainRenderEntity::new());
    let id = self.register(entity.clone());
    (id, entity)
  }

  /// Registers an existing render entity.
  pub fn register(&mut self, entity: Arc<TerrainRenderEntity>) -> RenderEntityId {
    let id = RenderEntityId(self.next_id);
    self.next_id += 1;
    self.entries.push(StageEntry {
      id,
      entity,
      drawable: None,
    });
    id
  }

  /// Fetches pending updates from every entity.
  ///
  /// Returns the number of drawables that changed.
  pub fn poll(&mut self) -> usize {
    let mut updated = 0;
    for entry in &mut self.entries {
      if let Some(state) = entry.entity.fetch_update() {
        entry.drawable = Some(state.into());
        updated += 1;
      }
    }
    updated
  }

  /// Drops entities that only the stage still references.
  ///
  /// Returns the number of entities removed.
  pub fn prune(&mut self) -> usize {
    let before = self.entries.len();
    self
      .entries
      .retain(|entry| Arc::strong_count(&entry.entity) > 1);
    let removed = before - self.entries.len();
    if removed > 0 {
      debug!("Pruned {} orphaned terrain render entities", removed);
    }
    removed
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn entity(&self, id: RenderEntityId) -> Option<&Arc<TerrainRenderEntity>> {
    self
      .entries
      .iter()
      .find(|entry| entry.id == id)
      .map(|entry| &entry.entity)
  }

  pub fn drawable(&self, id: RenderEntityId) -> Option<&TerrainDrawable> {
    self
      .entries
      .iter()
      .find(|entry| entry.id == id)
      .and_then(|entry| entry.drawable.as_ref())
  }

  /// Iterates over every entity that has produced a drawable so far.
  pub fn drawables(&self) -> impl Iterator<Item = (RenderEntityId, &TerrainDrawable)> {
    self
      .entries
      .iter()
      .filter_map(|entry| entry.drawable.as_ref().map(|d| (entry.id, d)))
  }
}

/// System: pulls the latest terrain state into the render stage.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub(crate) fn poll_render_stage(mut stage: ResMut<TerrainRenderStage>) {
  let updated = stage.poll();
  if updated > 0 {
    trace!("Render stage picked up {} terrain updates", updated);
  }
  stage.prune();
}
