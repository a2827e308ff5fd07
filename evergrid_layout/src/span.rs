// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible index spans over uniform cells.

use core::ops::Range;

use crate::types::{IndexBounds, Rounding};
use crate::util::{ceil, floor, round};

/// Upper bound on the number of indices a single span may produce.
///
/// Zooming far out over an unbounded source would otherwise ask for millions
/// of cells; longer spans keep a window of this length around the middle of
/// the query.
pub const MAX_SPAN_LEN: i64 = 4096;

/// Upper bound on the number of cells a grid realizes at once.
pub const MAX_VISIBLE_CELLS: u64 = 16_384;

/// Indices stay within `±2^62` so that span arithmetic cannot overflow.
const INDEX_LIMIT: f64 = 4_611_686_018_427_387_904.0;

/// Computes the indices `i` whose cells `[i * extent, (i + 1) * extent)`
/// intersect the half-open range `[min, max)`.
///
/// Returns an empty range when `extent` is not positive, the query range is
/// empty, or any input is not finite. The result is clipped to `bounds`, and
/// at most [`MAX_SPAN_LEN`] long.
///
/// ```rust
/// use evergrid_layout::{visible_span, IndexBounds};
///
/// assert_eq!(visible_span(-15.0, 25.0, 10.0, None), -2..3);
/// assert_eq!(visible_span(-15.0, 25.0, 10.0, Some(IndexBounds::new(0, 100))), 0..3);
/// assert_eq!(visible_span(0.0, 50.0, 0.0, None), 0..0);
/// ```
#[must_use]
pub fn visible_span(min: f64, max: f64, extent: f64, bounds: Option<IndexBounds>) -> Range<i64> {
    if !min.is_finite() || !max.is_finite() || !extent.is_finite() {
        return 0..0;
    }
    if extent <= 0.0 || max <= min {
        return 0..0;
    }

    let mut lo = clamp_index(floor(min / extent));
    let mut hi = clamp_index(ceil(max / extent));
    if let Some(b) = bounds {
        lo = lo.max(b.start as f64);
        hi = hi.min(b.end as f64);
    }
    if hi <= lo {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "`lo` lies within the index limit"
        )]
        let start = lo as i64;
        return start..start;
    }

    let len = MAX_SPAN_LEN as f64;
    if hi - lo > len {
        tracing::warn!(
            lo,
            hi,
            limit = MAX_SPAN_LEN,
            "visible span truncated; item extent is tiny relative to the viewport"
        );
        let mid = floor(lo * 0.5 + hi * 0.5);
        lo = (mid - floor(len * 0.5)).max(lo);
        hi = lo + len;
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "both ends lie within the index limit"
    )]
    let (start, end) = (lo as i64, hi as i64);
    start..end
}

fn clamp_index(i: f64) -> f64 {
    i.clamp(-INDEX_LIMIT, INDEX_LIMIT)
}

/// Shrinks a grid's column and row spans around their middles until at most
/// [`MAX_VISIBLE_CELLS`] cells remain, keeping the aspect of the area.
pub(crate) fn limit_cells(columns: Range<i64>, rows: Range<i64>) -> (Range<i64>, Range<i64>) {
    let cols = columns.end.saturating_sub(columns.start).max(0).unsigned_abs();
    let rows_len = rows.end.saturating_sub(rows.start).max(0).unsigned_abs();
    if cols.saturating_mul(rows_len) <= MAX_VISIBLE_CELLS {
        return (columns, rows);
    }
    tracing::warn!(
        columns = cols,
        rows = rows_len,
        limit = MAX_VISIBLE_CELLS,
        "visible grid area truncated; cells are tiny relative to the viewport"
    );
    let keep_cols = (MAX_VISIBLE_CELLS.saturating_mul(cols) / rows_len)
        .isqrt()
        .clamp(1, cols);
    let keep_rows = (MAX_VISIBLE_CELLS / keep_cols).clamp(1, rows_len);
    (shrink(columns, cols, keep_cols), shrink(rows, rows_len, keep_rows))
}

fn shrink(span: Range<i64>, len: u64, keep: u64) -> Range<i64> {
    // Both lengths are at most `MAX_SPAN_LEN`.
    let trim = i64::try_from((len - keep) / 2).unwrap_or(0);
    let keep = i64::try_from(keep).unwrap_or(0);
    let start = span.start + trim;
    start..start + keep
}

/// Converts a coordinate into a cell index along one axis.
///
/// Returns `None` when `extent` is not positive or the coordinate is not finite.
#[must_use]
pub fn cell_at(position: f64, extent: f64, rounding: Rounding) -> Option<i64> {
    if !position.is_finite() || !extent.is_finite() || extent <= 0.0 {
        return None;
    }
    let t = position / extent;
    let cell = match rounding {
        Rounding::Floor => floor(t),
        Rounding::Round => round(t),
        Rounding::Ceil => ceil(t),
    };
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Cell indices saturate at the i64 range"
    )]
    let i = cell as i64;
    Some(i)
}

#[cfg(test)]
mod tests {
    use super::{MAX_SPAN_LEN, MAX_VISIBLE_CELLS, cell_at, limit_cells, visible_span};
    use crate::types::{IndexBounds, Rounding};

    #[test]
    fn touching_edges_are_excluded() {
        // Cell 0 is [0, 10) and cell 3 is [30, 40): neither intersects [10, 30).
        assert_eq!(visible_span(10.0, 30.0, 10.0, None), 1..3);
    }

    #[test]
    fn partial_cells_are_included() {
        assert_eq!(visible_span(9.0, 31.0, 10.0, None), 0..4);
    }

    #[test]
    fn bounds_clip_and_may_empty() {
        let b = IndexBounds::new(0, 5);
        assert_eq!(visible_span(-100.0, -50.0, 10.0, Some(b)), 0..0);
        assert_eq!(visible_span(35.0, 200.0, 10.0, Some(b)), 3..5);
        assert!(visible_span(60.0, 80.0, 10.0, Some(b)).is_empty());
    }

    #[test]
    fn degenerate_inputs_are_empty() {
        assert!(visible_span(0.0, 10.0, -1.0, None).is_empty());
        assert!(visible_span(10.0, 10.0, 1.0, None).is_empty());
        assert!(visible_span(f64::NAN, 10.0, 1.0, None).is_empty());
        assert!(visible_span(0.0, f64::INFINITY, 1.0, None).is_empty());
    }

    #[test]
    fn huge_spans_keep_a_window_around_the_middle() {
        let span = visible_span(0.0, 1.0e9, 1.0, None);
        assert_eq!(span.end - span.start, MAX_SPAN_LEN);
        assert!(span.contains(&500_000_000), "window was {span:?}");
    }

    #[test]
    fn astronomically_wide_queries_do_not_overflow() {
        let span = visible_span(-1.0e300, 1.0e300, 1.0, None);
        assert_eq!(span.end - span.start, MAX_SPAN_LEN);
        assert!(span.contains(&0), "window was {span:?}");

        // Saturated far away on one side only.
        let span = visible_span(1.0e300, 2.0e300, 1.0, None);
        assert!(span.end - span.start <= MAX_SPAN_LEN);

        // A tiny extent turns finite bounds into infinite cell positions.
        let span = visible_span(-10.0, 10.0, 1.0e-310, None);
        assert_eq!(span.end - span.start, MAX_SPAN_LEN);
    }

    #[test]
    fn bounds_are_applied_before_the_window() {
        let span = visible_span(0.0, 1.0e9, 1.0, Some(IndexBounds::new(0, 10)));
        assert_eq!(span, 0..10);
    }

    #[test]
    fn grid_area_is_limited_around_the_middle() {
        let (columns, rows) = limit_cells(-2000..2000, -1000..1000);
        let area = (columns.end - columns.start) * (rows.end - rows.start);
        assert!(area.unsigned_abs() <= MAX_VISIBLE_CELLS, "area was {area}");
        assert!(columns.contains(&0) && rows.contains(&0));
        // Wider than tall stays wider than tall.
        assert!(columns.end - columns.start > rows.end - rows.start);

        // Small areas pass through untouched.
        assert_eq!(limit_cells(0..10, 0..10), (0..10, 0..10));
        assert_eq!(limit_cells(0..0, 0..5000), (0..0, 0..5000));
    }

    #[test]
    fn cell_rounding_modes() {
        assert_eq!(cell_at(25.0, 10.0, Rounding::Floor), Some(2));
        assert_eq!(cell_at(25.0, 10.0, Rounding::Round), Some(3));
        assert_eq!(cell_at(21.0, 10.0, Rounding::Ceil), Some(3));
        assert_eq!(cell_at(-1.0, 10.0, Rounding::Floor), Some(-1));
        assert_eq!(cell_at(5.0, 0.0, Rounding::Floor), None);
    }
}
