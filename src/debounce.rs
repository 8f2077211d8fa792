use std::time::{Duration, Instant};

/// A single cancelable scheduled commit.
///
/// `arm` schedules `value` to become ready after `delay`; arming again before
/// then replaces both the value and the deadline, so only the last write in a
/// burst survives. The owner drives it by calling `poll` from its event loop.
#[derive(Debug)]
pub struct Debouncer<T> {
  pending: Option<(Instant, T)>,
}

impl<T> Default for Debouncer<T> {
  fn default() -> Self {
    Self { pending: None }
  }
}

impl<T> Debouncer<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn arm(&mut self, delay: Duration, value: T, now: Instant) {
    self.pending = Some((now + delay, value));
  }

  pub fn cancel(&mut self) {
    self.pending = None;
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Take the pending value once its deadline has passed.
  pub fn poll(&mut self, now: Instant) -> Option<T> {
    match self.pending.take() {
      Some((deadline, value)) if now >= deadline => Some(value),
      still_waiting => {
        self.pending = still_waiting;
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DELAY: Duration = Duration::from_millis(300);

  #[test]
  fn idle_debouncer_yields_nothing() {
    let mut d: Debouncer<&str> = Debouncer::new();
    assert!(!d.is_pending());
    assert_eq!(d.poll(Instant::now()), None);
  }

  #[test]
  fn fires_only_after_delay() {
    let t0 = Instant::now();
    let mut d = Debouncer::new();
    d.arm(DELAY, "caf", t0);
    assert_eq!(d.poll(t0 + Duration::from_millis(299)), None);
    assert!(d.is_pending());
    assert_eq!(d.poll(t0 + DELAY), Some("caf"));
    assert!(!d.is_pending());
    assert_eq!(d.poll(t0 + DELAY * 2), None);
  }

  #[test]
  fn rearm_restarts_countdown_and_last_write_wins() {
    let t0 = Instant::now();
    let mut d = Debouncer::new();
    d.arm(DELAY, "c", t0);
    d.arm(DELAY, "ca", t0 + Duration::from_millis(200));
    d.arm(DELAY, "caf", t0 + Duration::from_millis(400));

    // The first deadline has passed but was superseded.
    assert_eq!(d.poll(t0 + Duration::from_millis(650)), None);
    assert!(d.is_pending());
    assert_eq!(d.poll(t0 + Duration::from_millis(700)), Some("caf"));
  }

  #[test]
  fn cancel_drops_pending_value() {
    let t0 = Instant::now();
    let mut d = Debouncer::new();
    d.arm(DELAY, 1, t0);
    d.cancel();
    assert!(!d.is_pending());
    assert_eq!(d.poll(t0 + DELAY), None);
  }
}
