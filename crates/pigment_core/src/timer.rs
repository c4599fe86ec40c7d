//! Interval timers
//!
//! The engine is single-threaded and cooperative, so timers never fire on
//! their own: the host calls [`IntervalScheduler::tick`] with the current
//! time from its frame loop and receives the timers that came due.
//! Cancelling a timer removes it, so it cannot fire on a later tick.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    pub struct TimerId;
}

#[derive(Clone, Copy, Debug)]
struct Interval {
    period_ms: f64,
    next_due_ms: f64,
}

/// A timer that came due during a tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fired {
    pub id: TimerId,
    /// Number of whole periods elapsed since the previous firing
    pub count: u32,
}

/// Drives all repeating timers
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    timers: SlotMap<TimerId, Interval>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
        }
    }

    /// Start a repeating timer whose first firing is one period after `now_ms`
    pub fn start(&mut self, period_ms: f64, now_ms: f64) -> TimerId {
        let period_ms = period_ms.max(1.0);
        let id = self.timers.insert(Interval {
            period_ms,
            next_due_ms: now_ms + period_ms,
        });
        tracing::trace!(?id, period_ms, "timer started");
        id
    }

    /// Stop a timer. Returns `false` if it was not running.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let removed = self.timers.remove(id).is_some();
        if removed {
            tracing::trace!(?id, "timer cancelled");
        }
        removed
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Advance to `now_ms`, returning every timer that came due.
    ///
    /// A clock jump larger than `u32::MAX` periods reports a saturated
    /// count; the schedule still moves past `now_ms`. Non-finite times are
    /// ignored.
    pub fn tick(&mut self, now_ms: f64) -> SmallVec<[Fired; 4]> {
        let mut fired = SmallVec::new();
        if !now_ms.is_finite() {
            return fired;
        }
        for (id, timer) in self.timers.iter_mut() {
            if now_ms < timer.next_due_ms {
                continue;
            }
            let elapsed = now_ms - timer.next_due_ms;
            let periods = (elapsed / timer.period_ms).floor() + 1.0;
            timer.next_due_ms += timer.period_ms * periods;
            let count = periods.min(u32::MAX as f64) as u32;
            fired.push(Fired { id, count });
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_period() {
        let mut scheduler = IntervalScheduler::new();
        let id = scheduler.start(100.0, 0.0);

        assert!(scheduler.tick(50.0).is_empty());
        assert_eq!(scheduler.tick(100.0).as_slice(), &[Fired { id, count: 1 }]);
        assert!(scheduler.tick(150.0).is_empty());
        assert_eq!(scheduler.tick(200.0).as_slice(), &[Fired { id, count: 1 }]);
    }

    #[test]
    fn test_catch_up_counts_missed_periods() {
        let mut scheduler = IntervalScheduler::new();
        let id = scheduler.start(100.0, 0.0);
        assert_eq!(scheduler.tick(350.0).as_slice(), &[Fired { id, count: 3 }]);
        assert_eq!(scheduler.tick(400.0).as_slice(), &[Fired { id, count: 1 }]);
    }

    #[test]
    fn test_huge_time_jump_saturates_count() {
        let mut scheduler = IntervalScheduler::new();
        let id = scheduler.start(30.0, 0.0);

        // Monotonic clock at 0, then an epoch timestamp
        assert_eq!(
            scheduler.tick(1.7e12).as_slice(),
            &[Fired { id, count: u32::MAX }]
        );
        assert!(scheduler.tick(1.7e12).is_empty());
        assert_eq!(
            scheduler.tick(1.7e12 + 30.0).as_slice(),
            &[Fired { id, count: 1 }]
        );
    }

    #[test]
    fn test_non_finite_time_is_ignored() {
        let mut scheduler = IntervalScheduler::new();
        let id = scheduler.start(100.0, 0.0);
        assert!(scheduler.tick(f64::NAN).is_empty());
        assert!(scheduler.tick(f64::INFINITY).is_empty());
        assert_eq!(scheduler.tick(100.0).as_slice(), &[Fired { id, count: 1 }]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut scheduler = IntervalScheduler::new();
        let id = scheduler.start(30.0, 0.0);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.is_active(id));
        assert!(scheduler.tick(1_000.0).is_empty());
        assert!(!scheduler.cancel(id));
        assert!(scheduler.is_empty());
    }
}
