//! Per-tile dirty tracking.

/// Bitset of tiles modified since the last render sync.
///
/// Indexed by the same row-major linear index as the owning grid.
#[derive(Clone, Debug)]
pub struct DirtyTiles {
  words: Box<[u64]>,
  len: usize,
  count: usize,
}

impl DirtyTiles {
  /// Creates an all-clean set for `len` tiles.
  pub fn new(len: usize) -> Self {
    Self {
      words: vec![0; len.div_ceil(64)].into_boxed_slice(),
      len,
      count: 0,
    }
  }

  /// Marks a tile dirty. Returns true if it was clean before.
  #[inline]
  pub fn mark(&mut self, index: usize) -> bool {
    debug_assert!(index < self.len);
    let (word, bit) = (index / 64, 1u64 << (index % 64));
    if self.words[word] & bit != 0 {
      return false;
    }
    self.words[word] |= bit;
    self.count += 1;
    true
  }

  pub fn clear(&mut self) {
    self.words.fill(0);
    self.count = 0;
  }

  /// Number of dirty tiles.
  #[inline]
  pub fn count(&self) -> usize {
    self.count
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  /// Iterates over dirty indices in ascending order.
  pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
    self
      .words
      .iter()
      .enumerate()
      .flat_map(|(w, &word)| BitIter(word).map(move |b| w * 64 + b))
  }
}

struct BitIter(u64);

impl Iterator for BitIter {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    if self.0 == 0 {
      return None;
    }
    let bit = self.0.trailing_zeros() as usize;
    self.0 &= self.0 - 1;
    Some(bit)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mark_counts_each_tile_once() {
    let mut dirty = DirtyTiles::new(256);
    assert!(dirty.mark(3));
    assert!(!dirty.mark(3));
    assert!(dirty.mark(200));
    assert_eq!(dirty.count(), 2);
    assert_eq!(dirty.iter().collect::<Vec<_>>(), vec![3, 200]);
  }

  #[test]
  fn partial_last_word_and_clear() {
    let mut dirty = DirtyTiles::new(70);
    for i in 0..70 {
      dirty.mark(i);
    }
    assert_eq!(dirty.count(), 70);
    assert_eq!(dirty.iter().last(), Some(69));

    dirty.clear();
    assert!(dirty.is_empty());
    assert_eq!(dirty.iter().next(), None);
  }
}
