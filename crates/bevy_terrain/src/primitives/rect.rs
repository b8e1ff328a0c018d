use crate::coords::{ChunkSize, LocalPos};

/// A rectangular region of chunk-local tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
  pub x: u16,
  pub y: u16,
  pub width: u16,
  pub height: u16,
}

impl Rect {
  /// Creates a new rectangle.
  #[inline]
  pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }

  /// Clamps this rect to fit within the given bounds.
  pub fn clamped(&self, bounds: ChunkSize) -> Self {
    let x = self.x.min(bounds.width);
    let y = self.y.min(bounds.height);
    let max_w = bounds.width.saturating_sub(x);
    let max_h = bounds.height.saturating_sub(y);
    Self {
      x,
      y,
      width: self.width.min(max_w),
      height: self.height.min(max_h),
    }
  }

  /// Iterates over the covered positions in row-major order.
  pub fn positions(&self) -> impl Iterator<Item = LocalPos> + use<> {
    let Rect {
      x,
      y,
      width,
      height,
    } = *self;
    (y..y.saturating_add(height))
      .flat_map(move |py| (x..x.saturating_add(width)).map(move |px| LocalPos::new(px, py)))
  }
}
