//! Simulation timestamps.

use std::time::Duration;

/// Point in simulation time at which a terrain state was produced.
///
/// Chunks never interpret it; they forward it to their render entity so the
/// renderer can skip, coalesce or interpolate states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(Duration);

impl SimTime {
  pub const ZERO: Self = Self(Duration::ZERO);

  pub const fn new(elapsed: Duration) -> Self {
    Self(elapsed)
  }

  pub fn from_secs(secs: u64) -> Self {
    Self(Duration::from_secs(secs))
  }

  pub fn from_secs_f64(secs: f64) -> Self {
    Self(Duration::from_secs_f64(secs))
  }

  pub fn elapsed(self) -> Duration {
    self.0
  }

  pub fn as_secs_f64(self) -> f64 {
    self.0.as_secs_f64()
  }
}

impl From<Duration> for SimTime {
  fn from(elapsed: Duration) -> Self {
    Self(elapsed)
  }
}

impl std::fmt::Display for SimTime {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:.3}s", self.0.as_secs_f64())
  }
}
