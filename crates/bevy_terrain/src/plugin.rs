//! Bevy wiring for terrain render sync.

use bevy::prelude::*;
// WASM compat: std::time::Instant panics on wasm32
use web_time::Instant;

use crate::config::{SyncMode, TerrainConfig};
use crate::diagnostics::SyncMetrics;
use crate::render::{TerrainRenderStage, poll_render_stage};
use crate::schedule::TerrainSet;
use crate::terrain::{SyncStats, Terrain};
use crate::time::SimTime;

/// Plugin that syncs every [`Terrain`] to the render stage once per frame.
///
/// Simulation writes tiles in `FixedUpdate` (or `Update`); the sync runs in
/// `PostUpdate`, stamped with the fixed-timestep clock, so every push carries
/// the time of the last completed simulation tick.
///
/// ```ignore
/// App::new()
///   .add_plugins(MinimalPlugins)
///   .add_plugins(TerrainPlugin::default().sync_mode(SyncMode::Delta));
/// ```
pub struct TerrainPlugin {
  /// Configuration inserted as a resource. Sanitized on build.
  pub config: TerrainConfig,
  /// Create render entities for newly spawned terrains.
  pub auto_attach: bool,
}

impl Default for TerrainPlugin {
  fn default() -> Self {
    Self {
      config: TerrainConfig::default(),
      auto_attach: true,
    }
  }
}

impl TerrainPlugin {
  pub fn new(config: TerrainConfig) -> Self {
    Self {
      config,
      ..default()
    }
  }

  /// Sets the sync mode of the inserted config.
  pub fn sync_mode(mut self, mode: SyncMode) -> Self {
    self.config.sync_mode = mode;
    self
  }

  /// Leaves render entity attachment to the caller.
  pub fn manual_attach(mut self) -> Self {
    self.auto_attach = false;
    self
  }
}

impl Plugin for TerrainPlugin {
  fn build(&self, app: &mut App) {
    app.insert_resource(self.config.clone().sanitized());
    app.init_resource::<TerrainRenderStage>();
    app.init_resource::<SyncMetrics>();

    app.configure_sets(
      PostUpdate,
      (TerrainSet::RenderSync, TerrainSet::RenderPoll).chain(),
    );

    if self.auto_attach {
      app.add_systems(
        PostUpdate,
        (attach_new_terrains, sync_terrain_render)
          .chain()
          .in_set(TerrainSet::RenderSync),
      );
    } else {
      app.add_systems(
        PostUpdate,
        sync_terrain_render.in_set(TerrainSet::RenderSync),
      );
    }
    app.add_systems(PostUpdate, poll_render_stage.in_set(TerrainSet::RenderPoll));
  }
}

/// System: Gives every newly spawned terrain's chunks a render entity.
pub(crate) fn attach_new_terrains(
  mut terrains: Query<&mut Terrain, Added<Terrain>>,
  mut stage: ResMut<TerrainRenderStage>,
) {
  for mut terrain in terrains.iter_mut() {
    let ids = terrain.attach_render_entities(&mut stage);
    debug!("Attached {} terrain render entities", ids.len());
  }
}

/// System: Pushes every terrain's state to its render entities.
///
/// The timestamp is the elapsed fixed-timestep time, so all chunks synced in
/// one frame carry the same time.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub(crate) fn sync_terrain_render(
  time: Res<Time<Fixed>>,
  mut terrains: Query<&mut Terrain>,
  mut metrics: ResMut<SyncMetrics>,
) {
  let start = Instant::now();
  let now = SimTime::from(time.elapsed());

  let stats = terrains
    .iter_mut()
    .fold(SyncStats::default(), |stats, mut terrain| {
      stats.merge(terrain.render_update(now))
    });

  metrics
    .sync_time
    .push(start.elapsed().as_secs_f32() * 1000.0);
  metrics.tiles_sent.push(stats.tiles_sent as f32);
  metrics.last_frame = stats;

  if stats.pushed() > 0 {
    trace!(
      "Terrain sync at {}: {} full, {} delta, {} skipped",
      now, stats.full, stats.delta, stats.skipped
    );
  }
}
