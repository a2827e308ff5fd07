// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item-aligned scrolling.

/// Alignment mode when scrolling an item into view.
///
/// Applied on each scrolling axis separately, against the container shrunk by
/// the source's insets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollAlign {
    /// Align the leading edge of the item with the leading edge of the container.
    Start,
    /// Center the item within the container.
    Center,
    /// Align the trailing edge of the item with the trailing edge of the container.
    End,
    /// Move just enough to make the item fully visible, preferring the
    /// smallest change from the current offset.
    #[default]
    Nearest,
}

impl ScrollAlign {
    /// Pixels the item at `item0..item1` must move along one axis to satisfy
    /// this alignment within `region0..region1`.
    pub(crate) fn shift(self, item0: f64, item1: f64, region0: f64, region1: f64) -> f64 {
        match self {
            Self::Start => region0 - item0,
            Self::End => region1 - item1,
            Self::Center => (region0 + region1) * 0.5 - (item0 + item1) * 0.5,
            Self::Nearest => {
                if item0 >= region0 && item1 <= region1 {
                    0.0
                } else if item0 < region0 {
                    // Leading side is cut off: align start.
                    region0 - item0
                } else {
                    region1 - item1
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScrollAlign;

    #[test]
    fn shifts_follow_alignment() {
        // Item 30..40 in a 0..30 region.
        assert_eq!(ScrollAlign::Start.shift(30.0, 40.0, 0.0, 30.0), -30.0);
        assert_eq!(ScrollAlign::End.shift(30.0, 40.0, 0.0, 30.0), -10.0);
        assert_eq!(ScrollAlign::Center.shift(30.0, 40.0, 0.0, 30.0), -20.0);
        assert_eq!(ScrollAlign::Nearest.shift(30.0, 40.0, 0.0, 30.0), -10.0);
    }

    #[test]
    fn nearest_keeps_fully_visible_items() {
        assert_eq!(ScrollAlign::Nearest.shift(10.0, 20.0, 0.0, 30.0), 0.0);
        // Cut off at the leading edge: align start.
        assert_eq!(ScrollAlign::Nearest.shift(-5.0, 5.0, 0.0, 30.0), 5.0);
    }
}
