//! Debounced autosave: coalesces bursts of state changes into one write.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock moved only by [`ManualClock::advance`]. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug, Clone)]
struct PendingWrite {
    due: Duration,
    payload: String,
}

/// Single cancel-and-rearm timer over serialized snapshots.
///
/// Each `schedule` replaces the pending write and pushes its deadline out,
/// so a burst yields one write of the newest payload once the burst has been
/// quiet for `delay`. Payloads equal to the last persisted one are dropped.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<PendingWrite>,
    last_persisted: Option<String>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            last_persisted: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Takes effect from the next `schedule`.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Arms (or re-arms) the timer. Returns false when the payload is
    /// already on disk, in which case any pending write is canceled too.
    /// Re-scheduling the payload that is already pending keeps its deadline.
    pub fn schedule(&mut self, payload: String, now: Duration) -> bool {
        if self.last_persisted.as_deref() == Some(payload.as_str()) {
            self.pending = None;
            return false;
        }
        if self.pending.as_ref().is_some_and(|p| p.payload == payload) {
            return true;
        }
        self.pending = Some(PendingWrite {
            due: now + self.delay,
            payload,
        });
        true
    }

    /// Takes the pending payload if its deadline has passed.
    pub fn take_due(&mut self, now: Duration) -> Option<String> {
        if self.pending.as_ref().is_some_and(|p| p.due <= now) {
            return self.take_pending();
        }
        None
    }

    /// Takes the pending payload regardless of its deadline.
    pub fn take_pending(&mut self) -> Option<String> {
        let pending = self.pending.take()?;
        if self.last_persisted.as_deref() == Some(pending.payload.as_str()) {
            return None;
        }
        Some(pending.payload)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn mark_persisted(&mut self, payload: String) {
        self.last_persisted = Some(payload);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_collapses_to_latest_payload() {
        let mut d = Debouncer::new(DELAY);
        assert!(d.schedule("a".into(), ms(0)));
        assert!(d.schedule("b".into(), ms(100)));
        assert!(d.schedule("c".into(), ms(200)));
        assert_eq!(d.take_due(ms(400)), None);
        assert_eq!(d.take_due(ms(500)).as_deref(), Some("c"));
        assert!(!d.is_pending());
    }

    #[test]
    fn unchanged_payload_is_skipped() {
        let mut d = Debouncer::new(DELAY);
        d.mark_persisted("same".into());
        assert!(!d.schedule("same".into(), ms(0)));
        assert_eq!(d.take_due(ms(1000)), None);
    }

    #[test]
    fn reverting_to_persisted_cancels_pending_write() {
        let mut d = Debouncer::new(DELAY);
        d.mark_persisted("a".into());
        assert!(d.schedule("b".into(), ms(0)));
        assert!(!d.schedule("a".into(), ms(50)));
        assert!(!d.is_pending());
    }

    #[test]
    fn repeated_payload_keeps_deadline() {
        let mut d = Debouncer::new(DELAY);
        assert!(d.schedule("a".into(), ms(0)));
        assert!(d.schedule("a".into(), ms(200)));
        assert!(d.schedule("a".into(), ms(290)));
        assert_eq!(d.take_due(ms(300)).as_deref(), Some("a"));
    }

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(ms(301));
        assert_eq!(clock.now(), ms(301));
    }
}
