//! Schedule labels for terrain systems.
//!
//! Terrain systems run in [`PostUpdate`], after simulation has written its
//! tiles in [`FixedUpdate`] and [`Update`]. The two sets are chained:
//!
//! ```text
//! RenderSync → RenderPoll
//! ```
//!
//! # Usage
//!
//! ```ignore
//! app.add_systems(PostUpdate, draw_terrain.after(TerrainSet::RenderPoll));
//! ```

use bevy::prelude::*;

/// System sets for the per-frame terrain render sync.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TerrainSet {
  /// Chunks push their state to their render entities.
  RenderSync,
  /// The render stage fetches pushed state into drawables.
  RenderPoll,
}
