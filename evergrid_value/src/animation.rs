// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated values driven by springs, timing curves, and exponential decay.

use core::fmt;

use kurbo::Vec2;

use crate::util::{abs, exp, ln, sqrt};
use crate::{Easing, Observable, Subscription, ValueHandle};

/// Values that can be animated: a vector space with a magnitude.
pub trait Animatable: Copy + PartialEq + fmt::Debug + 'static {
    /// The additive identity.
    const ZERO: Self;

    /// Component-wise sum.
    fn plus(self, other: Self) -> Self;

    /// Component-wise difference.
    fn minus(self, other: Self) -> Self;

    /// Multiplication by a scalar.
    fn times(self, factor: f64) -> Self;

    /// Euclidean magnitude, used for rest detection.
    fn magnitude(self) -> f64;

    /// Linear interpolation from `self` towards `to`.
    fn interpolate(self, to: Self, t: f64) -> Self {
        self.plus(to.minus(self).times(t))
    }
}

impl Animatable for f64 {
    const ZERO: Self = 0.0;

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn minus(self, other: Self) -> Self {
        self - other
    }

    fn times(self, factor: f64) -> Self {
        self * factor
    }

    fn magnitude(self) -> f64 {
        abs(self)
    }
}

impl Animatable for Vec2 {
    const ZERO: Self = Self::ZERO;

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn minus(self, other: Self) -> Self {
        self - other
    }

    fn times(self, factor: f64) -> Self {
        self * factor
    }

    fn magnitude(self) -> f64 {
        self.hypot()
    }
}

/// Damped spring parameters (unit mass, time in seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringSpec {
    /// Spring constant.
    pub stiffness: f64,
    /// `1.0` is critically damped, lower values overshoot.
    pub damping_ratio: f64,
    /// Displacement and speed below which the spring settles onto its target.
    pub rest_threshold: f64,
}

impl SpringSpec {
    /// Critically damped, medium stiffness.
    pub const DEFAULT: Self = Self {
        stiffness: 1500.0,
        damping_ratio: 1.0,
        rest_threshold: 0.01,
    };

    /// Underdamped; overshoots and settles.
    pub const BOUNCY: Self = Self {
        stiffness: 1500.0,
        damping_ratio: 0.5,
        rest_threshold: 0.01,
    };

    /// Critically damped and fast.
    pub const STIFF: Self = Self {
        stiffness: 3000.0,
        damping_ratio: 1.0,
        rest_threshold: 0.01,
    };
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Fixed-duration animation along an easing curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingSpec {
    /// Duration in milliseconds, excluding the delay.
    pub duration_ms: u64,
    /// Delay before the value starts to move, in milliseconds.
    pub delay_ms: u64,
    /// Curve applied to linear progress.
    pub easing: Easing,
}

impl TimingSpec {
    /// A timing animation of `duration_ms` with the default easing.
    #[must_use]
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    /// Returns a copy with the given easing.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Returns a copy with the given delay.
    #[must_use]
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

impl Default for TimingSpec {
    fn default() -> Self {
        Self {
            duration_ms: 500,
            delay_ms: 0,
            easing: Easing::default(),
        }
    }
}

/// Exponential velocity decay, used for momentum scrolling.
///
/// The velocity is multiplied by `deceleration` every millisecond.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecaySpec {
    /// Per-millisecond velocity multiplier in `(0, 1)`.
    pub deceleration: f64,
    /// Speed (units per second) below which the decay stops.
    pub stop_velocity: f64,
}

impl Default for DecaySpec {
    fn default() -> Self {
        Self {
            deceleration: 0.998,
            stop_velocity: 0.5,
        }
    }
}

impl DecaySpec {
    /// Returns a copy with a different stop velocity.
    #[must_use]
    pub fn with_stop_velocity(mut self, stop_velocity: f64) -> Self {
        self.stop_velocity = stop_velocity;
        self
    }

    fn rate_per_ms(&self) -> f64 {
        // `ln(d)` is negative for `d` in `(0, 1)`; clamp away from 1 so the
        // projected distance stays finite.
        ln(self.deceleration.clamp(1e-6, 1.0 - 1e-9))
    }

    /// Where a value starting at `from` with `velocity` (units per second) comes to rest.
    #[must_use]
    pub fn projected_end<T: Animatable>(&self, from: T, velocity: T) -> T {
        let per_ms = velocity.times(1e-3);
        from.minus(per_ms.times(1.0 / self.rate_per_ms()))
    }
}

/// How an [`AnimatedValue`] moves to a new target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Animation {
    /// Physically based spring; preserves the current velocity.
    Spring(SpringSpec),
    /// Fixed duration along an easing curve.
    Timing(TimingSpec),
}

impl Default for Animation {
    fn default() -> Self {
        Self::Spring(SpringSpec::default())
    }
}

#[derive(Debug, Clone, Copy)]
enum Run<T> {
    Spring {
        target: T,
        spec: SpringSpec,
    },
    Timing {
        from: T,
        target: T,
        spec: TimingSpec,
        elapsed_ms: f64,
    },
    Decay {
        origin: T,
        initial_velocity: T,
        spec: DecaySpec,
        elapsed_ms: f64,
    },
}

/// Largest integration step for springs, in seconds.
const SPRING_STEP: f64 = 1.0 / 240.0;

/// Longest time step a spring integrates; longer steps (a host resuming after
/// a suspend, or an infinite `dt`) settle the spring onto its target at once.
const MAX_SPRING_DT: f64 = 10.0;

/// An [`Observable`] whose value can be animated.
///
/// Hosts advance all animated values once per frame with [`AnimatedValue::tick`].
/// Every tick that moves the value writes it through the owned observable, so
/// handles and listeners see each intermediate value.
///
/// ```rust
/// use evergrid_value::{AnimatedValue, Animation, TimingSpec, Easing};
///
/// let mut opacity = AnimatedValue::new(0.0_f64);
/// opacity.animate_to(1.0, Animation::Timing(TimingSpec::new(300).with_easing(Easing::Linear)));
///
/// opacity.tick(0.150);
/// assert!((opacity.get() - 0.5).abs() < 1e-9);
/// assert!(!opacity.tick(0.150));
/// assert_eq!(opacity.get(), 1.0);
/// ```
pub struct AnimatedValue<T: Animatable> {
    value: Observable<T>,
    velocity: T,
    run: Option<Run<T>>,
}

impl<T: Animatable> fmt::Debug for AnimatedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedValue")
            .field("value", &self.value.get())
            .field("velocity", &self.velocity)
            .field("run", &self.run)
            .finish()
    }
}

impl<T: Animatable> AnimatedValue<T> {
    /// Creates a resting animated value.
    pub fn new(value: T) -> Self {
        Self {
            value: Observable::new(value),
            velocity: T::ZERO,
            run: None,
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Current velocity in units per second.
    #[must_use]
    pub const fn velocity(&self) -> T {
        self.velocity
    }

    /// Read-only handle for consumers.
    #[must_use]
    pub fn handle(&self) -> ValueHandle<T> {
        self.value.handle()
    }

    /// Registers a listener on the underlying observable.
    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        self.value.subscribe(listener)
    }

    /// Stops any running animation and jumps to `value`.
    pub fn set_value(&mut self, value: T) {
        self.run = None;
        self.velocity = T::ZERO;
        self.value.set(value);
    }

    /// Stops any running animation, keeping the current value.
    pub fn stop(&mut self) {
        self.run = None;
        self.velocity = T::ZERO;
    }

    /// Overrides the current velocity (units per second).
    ///
    /// A spring started afterwards with [`animate_to`](Self::animate_to) picks
    /// the velocity up; use this to hand a fling over to a snapping spring.
    pub fn set_velocity(&mut self, velocity: T) {
        self.velocity = velocity;
    }

    /// Returns `true` while an animation is running.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.run.is_some()
    }

    /// The value the running animation heads to, if known.
    ///
    /// For decays this is the projected resting point.
    #[must_use]
    pub fn target(&self) -> Option<T> {
        match self.run? {
            Run::Spring { target, .. } | Run::Timing { target, .. } => Some(target),
            Run::Decay {
                origin,
                initial_velocity,
                spec,
                ..
            } => Some(spec.projected_end(origin, initial_velocity)),
        }
    }

    /// Starts animating towards `target`.
    pub fn animate_to(&mut self, target: T, animation: Animation) {
        self.run = Some(match animation {
            Animation::Spring(spec) => Run::Spring { target, spec },
            Animation::Timing(spec) => Run::Timing {
                from: self.get(),
                target,
                spec,
                elapsed_ms: 0.0,
            },
        });
    }

    /// Starts a momentum decay from the current value with `velocity` (units per second).
    pub fn decay(&mut self, velocity: T, spec: DecaySpec) {
        self.velocity = velocity;
        self.run = Some(Run::Decay {
            origin: self.get(),
            initial_velocity: velocity,
            spec,
            elapsed_ms: 0.0,
        });
    }

    /// Advances the running animation by `dt` seconds.
    ///
    /// Returns `true` while the animation is still running after this step.
    pub fn tick(&mut self, dt: f64) -> bool {
        let Some(run) = self.run else {
            return false;
        };
        if dt.is_nan() || dt <= 0.0 {
            return true;
        }
        let current = self.get();
        let (next, velocity, done) = match run {
            Run::Spring { target, spec } => step_spring(current, self.velocity, target, spec, dt),
            Run::Timing {
                from,
                target,
                spec,
                elapsed_ms,
            } => {
                let elapsed_ms = elapsed_ms + dt * 1000.0;
                self.run = Some(Run::Timing {
                    from,
                    target,
                    spec,
                    elapsed_ms,
                });
                let active = elapsed_ms - spec.delay_ms as f64;
                if active <= 0.0 {
                    (current, T::ZERO, false)
                } else {
                    let duration = (spec.duration_ms as f64).max(1.0);
                    let linear = (active / duration).min(1.0);
                    let eased = spec.easing.transform(linear);
                    let next = from.interpolate(target, eased);
                    if linear >= 1.0 {
                        (target, T::ZERO, true)
                    } else {
                        (next, next.minus(current).times(1.0 / dt), false)
                    }
                }
            }
            Run::Decay {
                origin,
                initial_velocity,
                spec,
                elapsed_ms,
            } => {
                let elapsed_ms = elapsed_ms + dt * 1000.0;
                self.run = Some(Run::Decay {
                    origin,
                    initial_velocity,
                    spec,
                    elapsed_ms,
                });
                let rate = spec.rate_per_ms();
                let falloff = exp(rate * elapsed_ms);
                // x(t) = x0 + v0 * (d^t - 1) / ln(d), with v0 in units per millisecond.
                let travelled = initial_velocity.times(1e-3 * (falloff - 1.0) / rate);
                let velocity = initial_velocity.times(falloff);
                let done = velocity.magnitude() < spec.stop_velocity;
                (origin.plus(travelled), velocity, done)
            }
        };

        self.velocity = if done { T::ZERO } else { velocity };
        if done {
            self.run = None;
        }
        if next != current {
            self.value.set(next);
        }
        !done
    }
}

fn step_spring<T: Animatable>(
    mut position: T,
    mut velocity: T,
    target: T,
    spec: SpringSpec,
    dt: f64,
) -> (T, T, bool) {
    if dt > MAX_SPRING_DT {
        return (target, T::ZERO, true);
    }
    let stiffness = spec.stiffness.max(0.0);
    let damping = 2.0 * spec.damping_ratio.max(0.0) * sqrt(stiffness);
    let mut remaining = dt;
    while remaining > 0.0 {
        let h = remaining.min(SPRING_STEP);
        // Semi-implicit Euler: F = -k * x - c * v.
        let displacement = position.minus(target);
        let accel = displacement
            .times(-stiffness)
            .minus(velocity.times(damping));
        velocity = velocity.plus(accel.times(h));
        position = position.plus(velocity.times(h));
        remaining -= h;
    }
    let settled = position.minus(target).magnitude() < spec.rest_threshold
        && velocity.magnitude() < spec.rest_threshold;
    if settled {
        (target, T::ZERO, true)
    } else {
        (position, velocity, false)
    }
}
