//! Terrain configuration.
//!
//! Loaded from TOML, for example:
//!
//! ```toml
//! sync_mode = "delta"
//! delta_threshold = 0.5
//!
//! [limits]
//! max_width = 16
//! max_height = 8
//! ```
//!
//! Missing keys fall back to their defaults.

use std::io;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::coords::{ChunkSize, MAX_CHUNK_HEIGHT, MAX_CHUNK_WIDTH};

/// How a chunk packages its state for the render target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
  /// Push the complete tile buffer on every sync.
  #[default]
  Full,
  /// Push only tiles modified since the last sync. A clean chunk pushes an
  /// empty delta carrying just the time.
  Delta,
}

/// Upper bound on chunk dimensions, validated at chunk construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkLimits {
  pub max_width: u16,
  pub max_height: u16,
}

impl Default for ChunkLimits {
  fn default() -> Self {
    Self {
      max_width: MAX_CHUNK_WIDTH,
      max_height: MAX_CHUNK_HEIGHT,
    }
  }
}

impl ChunkLimits {
  /// Returns true if `size` fits within these limits and the global maximum.
  pub fn allows(&self, size: ChunkSize) -> bool {
    let max = self.max_size();
    size.width <= max.width && size.height <= max.height
  }

  /// Effective maximum size, never above `MAX_CHUNK_WIDTH` x `MAX_CHUNK_HEIGHT`.
  pub fn max_size(&self) -> ChunkSize {
    ChunkSize::new(
      self.max_width.min(MAX_CHUNK_WIDTH),
      self.max_height.min(MAX_CHUNK_HEIGHT),
    )
  }

  /// Clamps the limits to the global maximum chunk dimensions.
  fn clamped(self) -> Self {
    let clamped = Self {
      max_width: self.max_width.clamp(1, MAX_CHUNK_WIDTH),
      max_height: self.max_height.clamp(1, MAX_CHUNK_HEIGHT),
    };
    if clamped != self {
      warn!(
        "Chunk limits {}x{} clamped to {}x{}",
        self.max_width, self.max_height, clamped.max_width, clamped.max_height
      );
    }
    clamped
  }
}

/// Configuration shared by all terrains in the app.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
  /// Sync mode newly constructed chunks start in.
  pub sync_mode: SyncMode,
  /// Fraction of a chunk's tiles above which a delta sync sends full state
  /// instead.
  pub delta_threshold: f32,
  /// Chunk count from which a terrain syncs its chunks in parallel.
  pub parallel_threshold: usize,
  pub limits: ChunkLimits,
}

impl Default for TerrainConfig {
  fn default() -> Self {
    Self {
      sync_mode: SyncMode::Full,
      delta_threshold: 0.75,
      parallel_threshold: 64,
      limits: ChunkLimits::default(),
    }
  }
}

impl TerrainConfig {
  /// Parses a TOML document.
  pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
    let config: Self = toml::from_str(contents)?;
    Ok(config.sanitized())
  }

  /// Reads and parses a TOML file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let config = Self::from_toml_str(&contents)?;
    info!("Loaded terrain config from {}", path.display());
    Ok(config)
  }

  pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(self)
  }

  pub fn with_sync_mode(mut self, mode: SyncMode) -> Self {
    self.sync_mode = mode;
    self
  }

  pub fn with_limits(mut self, limits: ChunkLimits) -> Self {
    self.limits = limits;
    self
  }

  /// Clamps limits to the global maximum and the delta threshold to [0, 1].
  pub fn sanitized(mut self) -> Self {
    self.limits = self.limits.clamped();
    if self.delta_threshold.is_nan() {
      warn!("delta_threshold is NaN, using default");
      self.delta_threshold = Self::default().delta_threshold;
    } else if !(0.0..=1.0).contains(&self.delta_threshold) {
      warn!(
        "delta_threshold {} outside [0, 1], clamping",
        self.delta_threshold
      );
      self.delta_threshold = self.delta_threshold.clamp(0.0, 1.0);
    }
    self
  }
}

/// Error loading a terrain config.
#[derive(Debug)]
pub enum ConfigError {
  Io(io::Error),
  Parse(toml::de::Error),
}

impl From<io::Error> for ConfigError {
  fn from(err: io::Error) -> Self {
    Self::Io(err)
  }
}

impl From<toml::de::Error> for ConfigError {
  fn from(err: toml::de::Error) -> Self {
    Self::Parse(err)
  }
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io(e) => write!(f, "I/O error: {}", e),
      Self::Parse(e) => write!(f, "parse error: {}", e),
    }
  }
}

impl std::error::Error for ConfigError {}
