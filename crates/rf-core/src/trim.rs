use crate::index::IndexSequence;
use crate::range::RangeBounds;

// ---------------------------------------------------------------------------
// Completeness trimming
// ---------------------------------------------------------------------------

/// Half-open iteration range `(min_iteration, max_iteration)` for a call.
///
/// With `complete` requested, edge windows whose boundaries extend past
/// the domain actually covered by the index are skipped. The leading and
/// trailing runs are contiguous because the boundary sequences are
/// non-decreasing. Always `0 <= min <= max <= range.len()`.
pub fn iteration_bounds(
    index: &IndexSequence,
    range: &RangeBounds,
    complete: bool,
) -> (usize, usize) {
    let min = min_iteration(index, range, complete);
    let max = max_iteration(index, range, complete);
    // A window extending past both index edges trims from both sides at
    // once; clamp so the pair stays a valid half-open range.
    (min, max.max(min))
}

/// Count of leading iterations whose window starts before the first
/// index element. 0 when completeness is off or the start is unbounded.
pub fn min_iteration(index: &IndexSequence, range: &RangeBounds, complete: bool) -> usize {
    if !complete || index.is_empty() {
        return 0;
    }
    let Some(starts) = range.starts() else {
        return 0;
    };

    let mut out = 0;
    for p in 0..range.len() {
        if index.gt(0, starts, p) {
            out += 1;
        } else {
            break;
        }
    }
    out
}

/// `range.len()` minus the count of trailing iterations whose window
/// stops past the last index element.
pub fn max_iteration(index: &IndexSequence, range: &RangeBounds, complete: bool) -> usize {
    let m = range.len();
    if !complete {
        return m;
    }
    let Some(stops) = range.stops() else {
        return m;
    };
    let Some(last) = index.last_pos() else {
        return m;
    };

    let mut cut = 0;
    for p in (0..m).rev() {
        if index.lt(last, stops, p) {
            cut += 1;
        } else {
            break;
        }
    }
    m - cut
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array};
    use std::sync::Arc;

    fn int_array(values: &[i64]) -> ArrayRef {
        Arc::new(Int64Array::from(values.to_vec()))
    }

    fn int_index(values: &[i64]) -> IndexSequence {
        IndexSequence::new(&int_array(values)).unwrap()
    }

    fn bounds(index: &IndexSequence, starts: &[i64], stops: &[i64]) -> RangeBounds {
        RangeBounds::new(
            Some(&int_array(starts)),
            Some(&int_array(stops)),
            index,
            starts.len(),
        )
        .unwrap()
    }

    // -- 1. leading_trim -----------------------------------------------------

    #[test]
    fn leading_trim() {
        // index [1..=5], window reaches 2 back: starts = index - 2.
        let index = int_index(&[1, 2, 3, 4, 5]);
        let range = bounds(&index, &[-1, 0, 1, 2, 3], &[1, 2, 3, 4, 5]);

        assert_eq!(iteration_bounds(&index, &range, true), (2, 5));
    }

    // -- 2. trailing_trim ----------------------------------------------------

    #[test]
    fn trailing_trim() {
        // Window reaches 1 forward: stops = index + 1.
        let index = int_index(&[1, 2, 3, 4, 5]);
        let range = bounds(&index, &[1, 2, 3, 4, 5], &[2, 3, 4, 5, 6]);

        assert_eq!(iteration_bounds(&index, &range, true), (0, 4));
    }

    // -- 3. disabled_completeness --------------------------------------------

    #[test]
    fn disabled_completeness() {
        let index = int_index(&[1, 2, 3, 4, 5]);
        let range = bounds(&index, &[-1, 0, 1, 2, 3], &[2, 3, 4, 5, 6]);

        assert_eq!(iteration_bounds(&index, &range, false), (0, 5));
    }

    // -- 4. unbounded_sides_never_trim ---------------------------------------

    #[test]
    fn unbounded_sides_never_trim() {
        let index = int_index(&[1, 2, 3]);
        let range = RangeBounds::new(None, None, &index, 3).unwrap();

        assert_eq!(iteration_bounds(&index, &range, true), (0, 3));
    }

    // -- 5. empty_index_never_trims ------------------------------------------

    #[test]
    fn empty_index_never_trims() {
        let index = int_index(&[]);
        let range = RangeBounds::new(None, None, &index, 4).unwrap();

        assert_eq!(iteration_bounds(&index, &range, true), (0, 4));
    }

    // -- 6. fully_covered_window_untouched -----------------------------------

    #[test]
    fn fully_covered_window_untouched() {
        let index = int_index(&[1, 2, 3, 4, 5]);
        let range = bounds(&index, &[1, 2, 3, 4, 5], &[1, 2, 3, 4, 5]);

        assert_eq!(iteration_bounds(&index, &range, true), (0, 5));
    }

    // -- 7. window_past_both_edges_yields_empty_range ------------------------

    #[test]
    fn window_past_both_edges_yields_empty_range() {
        // The single window reaches past both ends of the index, so both
        // runs trim the same iteration. The pair must stay well-formed.
        let index = int_index(&[5]);
        let range = bounds(&index, &[4], &[6]);

        let (min, max) = iteration_bounds(&index, &range, true);
        assert!(min <= max);
        assert_eq!((min, max), (1, 1));
    }
}
