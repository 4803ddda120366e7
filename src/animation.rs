use std::time::{Duration, Instant};

use crate::state::{Action, Effects, Selection};

/// Fixed-cadence timer that advances the time index while
/// [`Selection::animating`] is set. The selection flag is the only record of
/// whether playback is running; the driver only tracks the next deadline.
pub struct AnimationDriver {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl AnimationDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Fire at most one tick. Starts the schedule on the first poll after
    /// playback begins and cancels it once playback stops.
    pub fn poll(&mut self, sel: &mut Selection, periods: usize, now: Instant) -> Option<Effects> {
        if !sel.animating {
            self.next_tick = None;
            return None;
        }

        let due = match self.next_tick {
            None => {
                self.next_tick = Some(now + self.interval);
                return None;
            }
            Some(due) => due,
        };
        if now < due {
            return None;
        }

        let effects = sel.apply(Action::Advance, periods);
        self.next_tick = if sel.animating {
            // Don't try to catch up after a stall
            Some((due + self.interval).max(now))
        } else {
            tracing::debug!(index = sel.time_index, "animation completed a full loop");
            None
        };
        Some(effects)
    }
}

/// Trailing-edge debounce: only the last call in a burst fires, `wait` after it.
pub struct Debouncer {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self { wait, deadline: None }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per burst, when the deadline has passed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
