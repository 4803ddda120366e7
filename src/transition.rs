use std::time::{Duration, Instant};

use crate::state::Paint;

/// Progress clock for an eased visual change
#[derive(Clone, Copy, Debug)]
pub struct Easing {
    start: Instant,
    duration: Duration,
}

impl Easing {
    /// A change that is already complete
    pub fn settled(now: Instant) -> Self {
        Self {
            start: now,
            duration: Duration::ZERO,
        }
    }

    pub fn new(now: Instant, paint: Paint, duration: Duration) -> Self {
        match paint {
            Paint::Immediate => Self::settled(now),
            Paint::Eased => Self { start: now, duration },
        }
    }

    /// Eased progress in [0, 1]
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = now.saturating_duration_since(self.start).as_secs_f64() / self.duration.as_secs_f64();
        ease_cubic_in_out(t.min(1.0))
    }

    pub fn is_done(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }
}

pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Horizontal position of the chart's time cursor, in period units
#[derive(Clone, Copy, Debug)]
pub struct MarkerTween {
    from: f64,
    to: f64,
    easing: Easing,
}

impl MarkerTween {
    pub fn at(position: f64, now: Instant) -> Self {
        Self {
            from: position,
            to: position,
            easing: Easing::settled(now),
        }
    }

    /// Move towards `to`, starting from wherever the cursor currently is
    pub fn retarget(&mut self, to: f64, now: Instant, paint: Paint, duration: Duration) {
        self.from = self.position(now);
        self.to = to;
        self.easing = Easing::new(now, paint, duration);
    }

    pub fn position(&self, now: Instant) -> f64 {
        self.from + (self.to - self.from) * self.easing.progress(now)
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.easing.is_done(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints_and_symmetry() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!((ease_cubic_in_out(0.25) + ease_cubic_in_out(0.75) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_immediate_is_done_at_once() {
        let now = Instant::now();
        let easing = Easing::new(now, Paint::Immediate, Duration::from_millis(300));
        assert_eq!(easing.progress(now), 1.0);
        assert!(easing.is_done(now));
    }

    #[test]
    fn test_eased_progress() {
        let now = Instant::now();
        let easing = Easing::new(now, Paint::Eased, Duration::from_millis(300));
        assert_eq!(easing.progress(now), 0.0);
        assert!(!easing.is_done(now + Duration::from_millis(100)));
        assert!((easing.progress(now + Duration::from_millis(150)) - 0.5).abs() < 1e-9);
        assert_eq!(easing.progress(now + Duration::from_secs(2)), 1.0);
    }

    #[test]
    fn test_marker_retarget_midflight() {
        let now = Instant::now();
        let dur = Duration::from_millis(300);
        let mut marker = MarkerTween::at(0.0, now);

        marker.retarget(10.0, now, Paint::Eased, dur);
        let mid = now + Duration::from_millis(150);
        assert!((marker.position(mid) - 5.0).abs() < 1e-9);

        marker.retarget(2.0, mid, Paint::Immediate, dur);
        assert_eq!(marker.position(mid), 2.0);
        assert_eq!(marker.target(), 2.0);
        assert!(marker.is_done(mid));
    }
}
