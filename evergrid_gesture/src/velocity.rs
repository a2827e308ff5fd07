// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Release velocity estimation.

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

/// Estimates pointer velocity from recent position samples.
///
/// Only samples within `window_ms` of the newest one are considered; the
/// velocity is the displacement across that window divided by its duration.
///
/// ```rust
/// use evergrid_gesture::VelocityTracker;
/// use kurbo::{Point, Vec2};
///
/// let mut tracker = VelocityTracker::new(100);
/// tracker.add(1_000, Point::new(0.0, 0.0));
/// tracker.add(1_050, Point::new(25.0, 0.0));
/// tracker.add(1_100, Point::new(50.0, 10.0));
/// assert_eq!(tracker.velocity(), Vec2::new(500.0, 100.0));
/// ```
#[derive(Clone, Debug)]
pub struct VelocityTracker {
    samples: SmallVec<[(u64, Point); 16]>,
    window_ms: u64,
}

impl VelocityTracker {
    /// Creates a tracker looking back `window_ms` milliseconds.
    #[must_use]
    pub fn new(window_ms: u64) -> Self {
        Self {
            samples: SmallVec::new(),
            window_ms,
        }
    }

    /// Records a position at `timestamp` milliseconds.
    ///
    /// Samples older than the newest one are ignored.
    pub fn add(&mut self, timestamp: u64, position: Point) {
        if let Some(&(last, _)) = self.samples.last() {
            if timestamp < last {
                return;
            }
            if timestamp == last {
                self.samples.pop();
            }
        }
        self.samples.push((timestamp, position));
        let cutoff = timestamp.saturating_sub(self.window_ms);
        self.samples.retain(|(t, _)| *t >= cutoff);
    }

    /// Forgets all samples.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Velocity in units per second, or zero with fewer than two samples.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.first(), self.samples.last()) else {
            return Vec2::ZERO;
        };
        if t1 <= t0 {
            return Vec2::ZERO;
        }
        let per_second = 1000.0 / (t1 - t0) as f64;
        (p1 - p0) * per_second
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::VelocityTracker;
    use kurbo::{Point, Vec2};

    #[test]
    fn old_samples_fall_out_of_the_window() {
        let mut t = VelocityTracker::new(50);
        t.add(0, Point::new(0.0, 0.0));
        t.add(500, Point::new(100.0, 0.0));
        // A long pause followed by a quick flick: only the flick counts.
        t.add(520, Point::new(110.0, 0.0));
        assert_eq!(t.velocity(), Vec2::new(500.0, 0.0));
    }

    #[test]
    fn single_sample_is_still() {
        let mut t = VelocityTracker::default();
        assert_eq!(t.velocity(), Vec2::ZERO);
        t.add(10, Point::new(5.0, 5.0));
        assert_eq!(t.velocity(), Vec2::ZERO);
        t.reset();
        assert_eq!(t.velocity(), Vec2::ZERO);
    }

    #[test]
    fn out_of_order_samples_are_ignored() {
        let mut t = VelocityTracker::new(1000);
        t.add(100, Point::new(0.0, 0.0));
        t.add(200, Point::new(10.0, 0.0));
        t.add(150, Point::new(999.0, 0.0));
        assert_eq!(t.velocity(), Vec2::new(100.0, 0.0));
    }
}
