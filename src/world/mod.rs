mod mutation;

use bevy::prelude::*;
use bevy_terrain::{SyncMetrics, TerrainRenderStage, TerrainSet};
use mutation::TileWriter;
pub use mutation::random_tile;

/// Frames between two sync reports.
const REPORT_INTERVAL: u32 = 60;

pub struct WorldPlugin {
  pub writer_seed: u64,
  pub writes_per_tick: u32,
  /// World extent in tiles.
  pub width: i64,
  pub height: i64,
}

impl Plugin for WorldPlugin {
  fn build(&self, app: &mut App) {
    app.insert_resource(TileWriter::new(
      self.writer_seed,
      self.writes_per_tick,
      self.width,
      self.height,
    ));
    app.add_systems(FixedUpdate, mutation::write_random_tiles);
    app.add_systems(PostUpdate, report_sync.after(TerrainSet::RenderPoll));
  }
}

fn report_sync(
  mut frame: Local<u32>,
  metrics: Res<SyncMetrics>,
  stage: Res<TerrainRenderStage>,
) {
  *frame += 1;
  if *frame % REPORT_INTERVAL != 0 {
    return;
  }

  let last = metrics.last_frame;
  info!(
    "frame {}: {} full, {} delta, {} skipped, {} tiles | avg sync {:.3}ms (max {:.3}ms), avg {:.0} tiles, {} render entities",
    *frame,
    last.full,
    last.delta,
    last.skipped,
    last.tiles_sent,
    metrics.sync_time.avg(),
    metrics.sync_time.max(),
    metrics.tiles_sent.avg(),
    stage.len()
  );
}
