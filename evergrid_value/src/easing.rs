// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves for timing animations.

use crate::util::abs;

/// Easing curve applied to the linear progress of a [`TimingSpec`](crate::TimingSpec).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    /// No easing.
    Linear,
    /// Cubic ease in, `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,
    /// Cubic ease out, `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,
    /// Cubic ease in and out, `cubic-bezier(0.42, 0, 0.58, 1)`.
    #[default]
    EaseInOut,
    /// An arbitrary CSS-style cubic bezier with control points `(x1, y1)` and `(x2, y2)`.
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// Maps a linear fraction in `[0, 1]` onto the curve.
    #[must_use]
    pub fn transform(&self, fraction: f64) -> f64 {
        match *self {
            Self::Linear => fraction.clamp(0.0, 1.0),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, fraction),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, fraction),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, fraction),
            Self::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, fraction),
        }
    }
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, fraction: f64) -> f64 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }

    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;

    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let sample = |a: f64, b: f64, c: f64, t: f64| ((a * t + b) * t + c) * t;
    let derivative = |a: f64, b: f64, c: f64, t: f64| (3.0 * a * t + 2.0 * b) * t + c;

    // Newton-Raphson for the parameter whose x matches `fraction`.
    let mut t = fraction;
    let mut solved = false;
    for _ in 0..8 {
        let x = sample(ax, bx, cx, t) - fraction;
        if abs(x) < 1e-7 {
            solved = true;
            break;
        }
        let dx = derivative(ax, bx, cx, t);
        if abs(dx) < 1e-7 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    if !solved {
        let mut lo = 0.0;
        let mut hi = 1.0;
        t = fraction;
        for _ in 0..32 {
            let delta = sample(ax, bx, cx, t) - fraction;
            if abs(delta) < 1e-7 {
                break;
            }
            if delta > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            t = 0.5 * (lo + hi);
        }
    }

    sample(ay, by, cy, t)
}

#[cfg(test)]
mod tests {
    use super::Easing;

    #[test]
    fn endpoints_are_exact() {
        for easing in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
        ] {
            assert_eq!(easing.transform(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.transform(1.0), 1.0, "{easing:?} at 1");
        }
    }

    #[test]
    fn ease_in_out_is_symmetric_around_midpoint() {
        let mid = Easing::EaseInOut.transform(0.5);
        assert!(crate::util::abs(mid - 0.5) < 1e-4, "midpoint was {mid}");
        assert!(Easing::EaseIn.transform(0.25) < 0.25);
        assert!(Easing::EaseOut.transform(0.25) > 0.25);
    }
}
