//! Render sync metrics.

mod time_series;

use bevy::prelude::*;
pub use time_series::TimeSeries;

use crate::terrain::SyncStats;

const SAMPLE_CAPACITY: usize = 120;

/// Per-frame statistics of the terrain render sync.
#[derive(Resource)]
pub struct SyncMetrics {
  /// Wall time spent in `Terrain::render_update`, in milliseconds.
  pub sync_time: TimeSeries,
  /// Tiles handed to render entities per frame.
  pub tiles_sent: TimeSeries,
  /// Stats of the most recent frame, summed over all terrains.
  pub last_frame: SyncStats,
}

impl Default for SyncMetrics {
  fn default() -> Self {
    Self {
      sync_time: TimeSeries::new(SAMPLE_CAPACITY),
      tiles_sent: TimeSeries::new(SAMPLE_CAPACITY),
      last_frame: SyncStats::default(),
    }
  }
}
