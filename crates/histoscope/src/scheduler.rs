//! Deferred render requests.
//!
//! Rendering is requested with a delay. Requests made while one is pending are
//! coalesced into it; a zero delay cancels the pending request and renders at once.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Millisecond time source.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from its creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for tests and replay.
///
/// Clones share the same time. With a nonzero step every read advances the time
/// after returning it, which makes measured intervals deterministic.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
    step: u64,
}

impl ManualClock {
    /// A clock frozen at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that advances by `step` milliseconds on every read.
    #[must_use]
    pub fn with_step(step: u64) -> Self {
        Self {
            now: Rc::default(),
            step,
        }
    }

    /// Moves time forward.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Sets the current time.
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        if self.step > 0 {
            self.now.set(now.saturating_add(self.step));
        }
        now
    }
}

/// What a render request turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    /// Render right now; any pending request was cancelled.
    Immediate,
    /// A render is scheduled at `due_ms`.
    Scheduled { due_ms: u64 },
    /// A render was already pending; this request joined it.
    Coalesced,
}

/// At most one pending render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeferredRender {
    due_ms: Option<u64>,
}

impl DeferredRender {
    /// Creates a scheduler with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a render `delay_ms` after `now_ms`.
    pub fn request(&mut self, now_ms: u64, delay_ms: u64) -> RenderRequest {
        if delay_ms == 0 {
            self.due_ms = None;
            return RenderRequest::Immediate;
        }
        if self.due_ms.is_some() {
            return RenderRequest::Coalesced;
        }
        let due_ms = now_ms.saturating_add(delay_ms);
        self.due_ms = Some(due_ms);
        RenderRequest::Scheduled { due_ms }
    }

    /// Drops the pending render. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.due_ms.take().is_some()
    }

    /// Whether a render is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    /// Deadline of the pending render.
    #[must_use]
    pub fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    /// Consumes the pending render when its deadline has passed.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match self.due_ms {
            Some(due) if due <= now_ms => {
                self.due_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_requests_coalesce() {
        let mut render = DeferredRender::new();
        assert_eq!(render.request(0, 5), RenderRequest::Scheduled { due_ms: 5 });
        assert_eq!(render.request(1, 5), RenderRequest::Coalesced);
        assert_eq!(render.request(2, 100), RenderRequest::Coalesced);
        assert_eq!(render.due_ms(), Some(5));
        assert!(!render.take_due(4));
        assert!(render.take_due(5));
        assert!(!render.is_pending());
    }

    #[test]
    fn test_zero_delay_cancels_pending() {
        let mut render = DeferredRender::new();
        render.request(0, 5);
        assert_eq!(render.request(1, 0), RenderRequest::Immediate);
        assert!(!render.is_pending());
        assert!(!render.take_due(100));
    }

    #[test]
    fn test_cancel() {
        let mut render = DeferredRender::new();
        assert!(!render.cancel());
        render.request(0, 10);
        assert!(render.cancel());
        assert_eq!(render.request(20, 10), RenderRequest::Scheduled { due_ms: 30 });
    }

    #[test]
    fn test_manual_clock_shared_and_stepping() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(40);
        assert_eq!(other.now_ms(), 40);
        other.set(7);
        assert_eq!(clock.now_ms(), 7);

        let stepping = ManualClock::with_step(300);
        assert_eq!(stepping.now_ms(), 0);
        assert_eq!(stepping.now_ms(), 300);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::default();
        let a = clock.now_ms();
        assert!(clock.now_ms() >= a);
    }

    proptest! {
        #[test]
        fn prop_pending_deadline_never_moves(
            requests in prop::collection::vec((0u64..50, 0u64..20), 1..40),
        ) {
            let mut render = DeferredRender::new();
            let mut now = 0;
            for (step, delay) in requests {
                now += step;
                let before = render.due_ms();
                match render.request(now, delay) {
                    RenderRequest::Immediate => {
                        prop_assert_eq!(delay, 0);
                        prop_assert!(!render.is_pending());
                    }
                    RenderRequest::Coalesced => prop_assert_eq!(render.due_ms(), before),
                    RenderRequest::Scheduled { due_ms } => {
                        prop_assert!(before.is_none());
                        prop_assert_eq!(due_ms, now + delay);
                    }
                }
                render.take_due(now);
            }
        }
    }
}
