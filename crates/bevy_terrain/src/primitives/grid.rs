//! Bounded 2D tile buffer.
//!
//! A [`TileGrid`] is a generic fixed-size 2D buffer. The primary use case is
//! the tile storage of a [`TerrainChunk`](crate::chunk::TerrainChunk).
//!
//! # Layout
//!
//! Data is stored in row-major order: the element at `(x, y)` lives at index
//! `y * width + x`. Render entities receive the raw buffer in exactly this
//! order, so no reshaping happens on transfer. [`TileGrid::index_of`] is the
//! only place that mapping is computed.

use std::ops::Index;

use crate::coords::{ChunkSize, LocalPos};

/// Supplied buffer length did not match `width * height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthMismatch {
  pub expected: usize,
  pub actual: usize,
}

/// A fixed-size 2D buffer of elements.
///
/// Length never changes after construction.
#[derive(Clone, Debug)]
pub struct TileGrid<T> {
  data: Box<[T]>,
  size: ChunkSize,
}

impl<T> TileGrid<T> {
  /// Takes ownership of a row-major buffer.
  ///
  /// Fails if `data.len() != width * height`. The buffer is never truncated
  /// or padded.
  pub fn from_vec(size: ChunkSize, data: Vec<T>) -> Result<Self, LengthMismatch> {
    let expected = size.tile_count();
    if data.len() != expected {
      return Err(LengthMismatch {
        expected,
        actual: data.len(),
      });
    }
    Ok(Self {
      data: data.into_boxed_slice(),
      size,
    })
  }

  #[inline]
  pub fn size(&self) -> ChunkSize {
    self.size
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.data.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Converts (x, y) to a linear index, or `None` if out of bounds.
  #[inline]
  pub fn index_of(&self, pos: LocalPos) -> Option<usize> {
    if self.size.contains(pos) {
      Some(pos.y as usize * self.size.width as usize + pos.x as usize)
    } else {
      None
    }
  }

  /// Converts (x, y) to a linear index.
  ///
  /// # Panics
  /// If the position lies outside the grid. Out-of-range access is a
  /// coordinate routing bug in the caller and is never clamped.
  #[inline]
  #[track_caller]
  pub fn expect_index(&self, pos: LocalPos) -> usize {
    match self.index_of(pos) {
      Some(i) => i,
      None => panic!(
        "tile ({}, {}) out of bounds for {} grid",
        pos.x, pos.y, self.size
      ),
    }
  }

  /// Returns a reference to the element at (x, y), or `None` if out of bounds.
  #[inline]
  pub fn get(&self, pos: LocalPos) -> Option<&T> {
    self.index_of(pos).map(|i| &self.data[i])
  }

  /// Returns a slice of the underlying row-major data.
  #[inline]
  pub fn as_slice(&self) -> &[T] {
    &self.data
  }

  /// Returns a mutable slice of the underlying row-major data.
  #[inline]
  pub fn as_mut_slice(&mut self) -> &mut [T] {
    &mut self.data
  }

  /// Iterates over every position in row-major order.
  pub fn positions(&self) -> impl Iterator<Item = LocalPos> + use<T> {
    let ChunkSize { width, height } = self.size;
    (0..height).flat_map(move |y| (0..width).map(move |x| LocalPos::new(x, y)))
  }
}

impl<T> Index<LocalPos> for TileGrid<T> {
  type Output = T;

  #[inline]
  #[track_caller]
  fn index(&self, pos: LocalPos) -> &Self::Output {
    let i = self.expect_index(pos);
    &self.data[i]
  }
}

impl<T> Index<(u16, u16)> for TileGrid<T> {
  type Output = T;

  #[inline]
  #[track_caller]
  fn index(&self, (x, y): (u16, u16)) -> &Self::Output {
    &self[LocalPos::new(x, y)]
  }
}
