// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture thresholds and axis configuration.

use kurbo::Vec2;

bitflags::bitflags! {
    /// Axes along which a pan may move the content.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ScrollAxes: u8 {
        /// Horizontal panning.
        const HORIZONTAL = 0b0000_0001;
        /// Vertical panning.
        const VERTICAL   = 0b0000_0010;
    }
}

impl ScrollAxes {
    /// Zeroes the components of `v` along disabled axes.
    #[must_use]
    pub fn mask(self, v: Vec2) -> Vec2 {
        Vec2::new(
            if self.contains(Self::HORIZONTAL) { v.x } else { 0.0 },
            if self.contains(Self::VERTICAL) { v.y } else { 0.0 },
        )
    }
}

impl Default for ScrollAxes {
    fn default() -> Self {
        Self::all()
    }
}

/// Tuning for [`GestureState`](crate::GestureState).
///
/// Distances are in pointer coordinates (container pixels when driven by the
/// `evergrid` container); times are in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GestureConfig {
    /// Movement on an enabled axis beyond which a press becomes a pan.
    pub pan_slop: f64,
    /// Hold time after which a press that has not panned reports a long press.
    pub long_press_ms: u64,
    /// Axes along which pans move content.
    pub axes: ScrollAxes,
    /// Whether a second pointer starts a pinch.
    pub pinch: bool,
    /// Pointer distance below which pinch ratios are not computed.
    pub min_pinch_distance: f64,
    /// How far back release velocity looks.
    pub velocity_window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pan_slop: 8.0,
            long_press_ms: 500,
            axes: ScrollAxes::all(),
            pinch: true,
            min_pinch_distance: 10.0,
            velocity_window_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScrollAxes;
    use kurbo::Vec2;

    #[test]
    fn mask_zeroes_disabled_axes() {
        let v = Vec2::new(3.0, -4.0);
        assert_eq!(ScrollAxes::HORIZONTAL.mask(v), Vec2::new(3.0, 0.0));
        assert_eq!(ScrollAxes::VERTICAL.mask(v), Vec2::new(0.0, -4.0));
        assert_eq!(ScrollAxes::empty().mask(v), Vec2::ZERO);
        assert_eq!(ScrollAxes::default().mask(v), v);
    }
}
