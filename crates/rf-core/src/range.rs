use std::cmp::Ordering;

use arrow::array::ArrayRef;
use orion_error::prelude::*;

use crate::error::{CoreReason, CoreResult};
use crate::index::{IndexArray, IndexSequence};

// ---------------------------------------------------------------------------
// RangeBounds
// ---------------------------------------------------------------------------

/// Paired start/stop boundary sequences in the index's domain.
///
/// A `None` side is unbounded: an unbounded start pins every window's
/// lower edge to the first index position, an unbounded stop pins the
/// upper edge to the last. Construction validates eagerly, before any
/// iteration runs.
#[derive(Debug)]
pub struct RangeBounds {
    starts: Option<IndexArray>,
    stops: Option<IndexArray>,
    len: usize,
}

impl RangeBounds {
    /// Build a boundary sequence of `len` pairs.
    ///
    /// Both bounded sides must have exactly `len` non-null elements of
    /// the index's element kind, be non-decreasing, and satisfy
    /// `start(p) <= stop(p)` for every pair.
    pub fn new(
        starts: Option<&ArrayRef>,
        stops: Option<&ArrayRef>,
        index: &IndexSequence,
        len: usize,
    ) -> CoreResult<Self> {
        let starts = starts
            .map(|a| Self::convert(a, index, len, "starts"))
            .transpose()?;
        let stops = stops
            .map(|a| Self::convert(a, index, len, "stops"))
            .transpose()?;

        if let (Some(start_seq), Some(stop_seq)) = (&starts, &stops) {
            for p in 0..len {
                if start_seq.cmp(p, stop_seq, p) == Ordering::Greater {
                    return StructError::from(CoreReason::Validation)
                        .with_detail(format!(
                            "malformed range pair {}: start exceeds stop",
                            p + 1
                        ))
                        .err();
                }
            }
        }

        Ok(Self { starts, stops, len })
    }

    fn convert(
        array: &ArrayRef,
        index: &IndexSequence,
        len: usize,
        what: &str,
    ) -> CoreResult<IndexArray> {
        let bounds = IndexArray::try_new(array, what)?;

        if bounds.kind() != index.kind() {
            return StructError::from(CoreReason::Validation)
                .with_detail(format!(
                    "{what} kind {:?} does not match index kind {:?}",
                    bounds.kind(),
                    index.kind()
                ))
                .err();
        }

        if bounds.len() != len {
            return StructError::from(CoreReason::Validation)
                .with_detail(format!(
                    "{what} has length {}, expected {len}",
                    bounds.len()
                ))
                .err();
        }

        // The scanner relies on a non-decreasing boundary sequence.
        // Verify up front rather than silently producing wrong windows.
        for p in 1..len {
            if bounds.cmp(p - 1, &bounds, p) == Ordering::Greater {
                return StructError::from(CoreReason::Validation)
                    .with_detail(format!(
                        "{what} must be non-decreasing: element {} decreases",
                        p + 1
                    ))
                    .err();
            }
        }

        Ok(bounds)
    }

    /// Number of boundary pairs, i.e. iterations.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn start_unbounded(&self) -> bool {
        self.starts.is_none()
    }

    pub fn stop_unbounded(&self) -> bool {
        self.stops.is_none()
    }

    pub(crate) fn starts(&self) -> Option<&IndexArray> {
        self.starts.as_ref()
    }

    pub(crate) fn stops(&self) -> Option<&IndexArray> {
        self.stops.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
