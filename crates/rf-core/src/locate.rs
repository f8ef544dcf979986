use arrow::record_batch::RecordBatch;

use crate::index::IndexSequence;
use crate::membership::MembershipTable;
use crate::range::RangeBounds;

// ---------------------------------------------------------------------------
// CompactRange
// ---------------------------------------------------------------------------

/// A contiguous row range expressed as (start, length, direction),
/// without materializing individual positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactRange {
    start: usize,
    len: usize,
    forward: bool,
}

impl CompactRange {
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        forward: true,
    };

    pub fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            len,
            forward: true,
        }
    }

    pub fn reversed(start: usize, len: usize) -> Self {
        Self {
            start,
            len,
            forward: false,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn forward(&self) -> bool {
        self.forward
    }

    /// The covered rows as a zero-copy slice of `batch`, in storage order.
    pub fn slice(&self, batch: &RecordBatch) -> RecordBatch {
        batch.slice(self.start, self.len)
    }

    /// Lazily expand to concrete row positions, honoring direction.
    pub fn positions(&self) -> impl Iterator<Item = usize> + use<> {
        let Self {
            start,
            len,
            forward,
        } = *self;
        (0..len).map(move |k| if forward { start + k } else { start + len - 1 - k })
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Two-pointer scan state over index positions.
///
/// Created by the driver at call start, passed by mutable reference into
/// [`locate_window`] once per iteration, and discarded at call end. Both
/// positions only ever advance; this is what gives the whole call its
/// amortized O(n + m) cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    start_pos: usize,
    stop_pos: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current (start, stop) scan positions.
    pub fn positions(&self) -> (usize, usize) {
        (self.start_pos, self.stop_pos)
    }
}

// ---------------------------------------------------------------------------
// Window locator
// ---------------------------------------------------------------------------

/// Resolve the row range satisfying boundary pair `p`.
///
/// Correct only because both the index and the boundary sequences are
/// non-decreasing in their positions: the cursor never moves backward.
pub fn locate_window(
    cursor: &mut Cursor,
    index: &IndexSequence,
    range: &RangeBounds,
    table: &MembershipTable,
    p: usize,
) -> CompactRange {
    let Some(last) = index.last_pos() else {
        return CompactRange::EMPTY;
    };

    let Some(start_pos) = locate_start_pos(cursor, index, range, p, last) else {
        return CompactRange::EMPTY;
    };
    let Some(stop_pos) = locate_stop_pos(cursor, index, range, p, last) else {
        return CompactRange::EMPTY;
    };

    if stop_pos < start_pos {
        return CompactRange::EMPTY;
    }

    table.row_span(start_pos, stop_pos)
}

/// First index position with `index[pos] >= start(p)`, or `None` when no
/// position satisfies the bound.
fn locate_start_pos(
    cursor: &mut Cursor,
    index: &IndexSequence,
    range: &RangeBounds,
    p: usize,
    last: usize,
) -> Option<usize> {
    // Pin to the start
    let Some(starts) = range.starts() else {
        return Some(0);
    };

    if cursor.start_pos > last {
        return None;
    }

    while index.lt(cursor.start_pos, starts, p) {
        cursor.start_pos += 1;
        if cursor.start_pos > last {
            return None;
        }
    }

    Some(cursor.start_pos)
}

/// Last index position with `index[pos] <= stop(p)`. Saturates at the
/// last position once the cursor has run past the end; `None` only when
/// no position at all satisfies the bound.
fn locate_stop_pos(
    cursor: &mut Cursor,
    index: &IndexSequence,
    range: &RangeBounds,
    p: usize,
    last: usize,
) -> Option<usize> {
    // Pin to the end
    let Some(stops) = range.stops() else {
        return Some(last);
    };

    if cursor.stop_pos > last {
        return Some(last);
    }

    while index.lte(cursor.stop_pos, stops, p) {
        cursor.stop_pos += 1;
        if cursor.stop_pos > last {
            return Some(last);
        }
    }

    cursor.stop_pos.checked_sub(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
