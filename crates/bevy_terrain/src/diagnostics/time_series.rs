use std::collections::VecDeque;

/// Fixed-capacity ring buffer of samples with a running sum.
#[derive(Clone, Debug)]
pub struct TimeSeries {
  samples: VecDeque<f32>,
  capacity: usize,
  sum: f32,
}

impl TimeSeries {
  pub fn new(capacity: usize) -> Self {
    Self {
      samples: VecDeque::with_capacity(capacity),
      capacity: capacity.max(1),
      sum: 0.0,
    }
  }

  /// Appends a sample, evicting the oldest one when full.
  pub fn push(&mut self, value: f32) {
    if self.samples.len() >= self.capacity {
      if let Some(evicted) = self.samples.pop_front() {
        self.sum -= evicted;
      }
    }
    self.samples.push_back(value);
    self.sum += value;
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn current(&self) -> Option<f32> {
    self.samples.back().copied()
  }

  pub fn avg(&self) -> f32 {
    if self.samples.is_empty() {
      0.0
    } else {
      self.sum / self.samples.len() as f32
    }
  }

  /// Largest sample in the window, or 0 when empty.
  pub fn max(&self) -> f32 {
    self.samples.iter().copied().fold(None, |acc: Option<f32>, v| {
      Some(acc.map_or(v, |m| m.max(v)))
    })
    .unwrap_or(0.0)
  }
}
