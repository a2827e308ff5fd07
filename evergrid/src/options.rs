// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container configuration.

use evergrid_gesture::GestureConfig;
use evergrid_recycler::DEFAULT_MAX_SPARE_PER_REUSE;
use evergrid_value::{Animation, DecaySpec, SpringSpec};
use evergrid_view::ClampMode;
use kurbo::{Point, Rect, Vec2};

/// Initial state and behavior of an [`Evergrid`](crate::Evergrid).
///
/// Every field has a usable default; override what a screen needs:
///
/// ```rust
/// use evergrid::EvergridOptions;
/// use kurbo::Vec2;
///
/// // A chart: origin centered, one unit is 50 pixels, y grows upwards.
/// let options = EvergridOptions {
///     anchor: Vec2::new(0.5, 0.5),
///     scale: Vec2::new(50.0, -50.0),
///     ..EvergridOptions::default()
/// };
/// assert!(options.momentum);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvergridOptions {
    /// Fraction of the container where [`offset`](Self::offset) appears.
    pub anchor: Vec2,
    /// Initial content point under the anchor.
    pub offset: Point,
    /// Initial pixels per content unit; components may be negative, never zero.
    pub scale: Vec2,
    /// Smallest allowed scale magnitude.
    pub min_scale: f64,
    /// Largest allowed scale magnitude.
    pub max_scale: f64,
    /// Content bounds used by [`ClampMode::Contain`].
    pub content_bounds: Option<Rect>,
    /// How the offset is kept within [`content_bounds`](Self::content_bounds).
    pub clamp_mode: ClampMode,
    /// Pan, pinch, and long-press thresholds.
    pub gesture: GestureConfig,
    /// Whether releasing a pan keeps the content moving.
    pub momentum: bool,
    /// Momentum decay. `stop_velocity` is in pixels per second.
    pub decay: DecaySpec,
    /// How the offset moves to a snap target after release.
    pub snap_animation: Animation,
    /// Hidden item views kept per reuse id.
    pub max_spare_per_reuse: usize,
}

impl Default for EvergridOptions {
    fn default() -> Self {
        Self {
            anchor: Vec2::ZERO,
            offset: Point::ZERO,
            scale: Vec2::new(1.0, 1.0),
            min_scale: 1e-3,
            max_scale: 1e3,
            content_bounds: None,
            clamp_mode: ClampMode::Free,
            gesture: GestureConfig::default(),
            momentum: true,
            decay: DecaySpec::default().with_stop_velocity(20.0),
            snap_animation: Animation::Spring(SpringSpec::DEFAULT),
            max_spare_per_reuse: DEFAULT_MAX_SPARE_PER_REUSE,
        }
    }
}
