use std::path::PathBuf;

use bevy_terrain::SyncMode;
use clap::{Parser, ValueEnum};

/// Headless terrain render-sync driver.
///
/// Generates a chunked terrain, mutates random tiles every simulation tick
/// and syncs it to the render stage once per frame.
#[derive(Parser, Debug)]
#[command(name = "terrain_demo", version)]
pub struct Cli {
  /// Number of chunk columns.
  #[arg(long, default_value_t = 8)]
  pub chunks_x: u32,
  /// Number of chunk rows.
  #[arg(long, default_value_t = 8)]
  pub chunks_y: u32,
  /// Chunk width and height in tiles (at most 16).
  #[arg(long, default_value_t = 16)]
  pub chunk_size: u16,
  /// Frames to run before exiting.
  #[arg(long, default_value_t = 600)]
  pub frames: u32,
  /// Overrides the sync mode from the config file.
  #[arg(long, value_enum)]
  pub sync_mode: Option<SyncModeArg>,
  /// TOML terrain config.
  #[arg(long)]
  pub config: Option<PathBuf>,
  /// Seed for terrain generation and tile writes.
  #[arg(long, default_value_t = 42)]
  pub seed: u64,
  /// Tile writes per simulation tick.
  #[arg(long, default_value_t = 32)]
  pub writes_per_tick: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SyncModeArg {
  Full,
  Delta,
}

impl From<SyncModeArg> for SyncMode {
  fn from(arg: SyncModeArg) -> Self {
    match arg {
      SyncModeArg::Full => SyncMode::Full,
      SyncModeArg::Delta => SyncMode::Delta,
    }
  }
}
