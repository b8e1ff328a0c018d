mod cli;
mod world;

use std::process::ExitCode;
use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_terrain::{
  ChunkSize, SyncMetrics, Terrain, TerrainConfig, TerrainPlugin, TerrainRenderStage,
};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cli::Cli;

const TICK_HZ: f64 = 60.0;

fn main() -> ExitCode {
  let cli = Cli::parse();

  let mut app = App::new();
  app.add_plugins((MinimalPlugins, LogPlugin::default()));

  let mut config = match &cli.config {
    Some(path) => match TerrainConfig::load(path) {
      Ok(config) => config,
      Err(e) => {
        error!("Failed to load terrain config {}: {}", path.display(), e);
        return ExitCode::FAILURE;
      }
    },
    None => TerrainConfig::default(),
  };
  if let Some(mode) = cli.sync_mode {
    config.sync_mode = mode.into();
  }
  let config = config.sanitized();

  // Frames advance by exactly one tick so every frame runs one simulation
  // step, independent of how fast the host is.
  app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ));
  app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
    1.0 / TICK_HZ,
  )));

  let pitch = ChunkSize::new(cli.chunk_size, cli.chunk_size);
  let mut rng = StdRng::seed_from_u64(cli.seed);
  let terrain = match Terrain::generate(cli.chunks_x, cli.chunks_y, pitch, &config, |_| {
    world::random_tile(&mut rng)
  }) {
    Ok(terrain) => terrain,
    Err(e) => {
      error!("Failed to generate terrain: {}", e);
      return ExitCode::FAILURE;
    }
  };

  info!(
    "Running {} frames over {}x{} chunks of {} in {:?} mode",
    cli.frames, cli.chunks_x, cli.chunks_y, pitch, config.sync_mode
  );

  app.add_plugins(TerrainPlugin::new(config));
  app.add_plugins(world::WorldPlugin {
    writer_seed: cli.seed.wrapping_add(1),
    writes_per_tick: cli.writes_per_tick,
    width: i64::from(cli.chunks_x) * i64::from(pitch.width),
    height: i64::from(cli.chunks_y) * i64::from(pitch.height),
  });
  app.world_mut().spawn(terrain);

  for _ in 0..cli.frames {
    app.update();
  }

  let metrics = app.world().resource::<SyncMetrics>();
  let stage = app.world().resource::<TerrainRenderStage>();
  info!(
    "Done: avg sync {:.3}ms, avg {:.0} tiles per frame, {} drawables",
    metrics.sync_time.avg(),
    metrics.tiles_sent.avg(),
    stage.drawables().count()
  );

  ExitCode::SUCCESS
}
