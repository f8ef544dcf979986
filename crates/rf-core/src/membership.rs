use orion_error::prelude::*;

use crate::error::{CoreReason, CoreResult};
use crate::locate::CompactRange;

// ---------------------------------------------------------------------------
// MembershipTable
// ---------------------------------------------------------------------------

/// Flattened, offset-addressed table mapping each index position to the
/// contiguous run of underlying rows it owns.
///
/// Built by a running sum over the per-position membership sizes:
/// `offset_start[0] = 0`, `offset_stop[i] = offset_start[i] + size[i] - 1`,
/// `offset_start[i + 1] = offset_stop[i] + 1`. This turns "all rows owned
/// by index positions `a..=b`" into a single contiguous range lookup.
#[derive(Debug)]
pub struct MembershipTable {
    starts: Vec<usize>,
    stops: Vec<usize>,
}

impl MembershipTable {
    /// Build the table from the per-index-position membership sizes
    /// (1 for simple row-aligned windowing, >1 for grouped data).
    ///
    /// Every index position must own at least one row.
    pub fn from_sizes(sizes: &[usize]) -> CoreResult<Self> {
        let mut starts = Vec::with_capacity(sizes.len());
        let mut stops = Vec::with_capacity(sizes.len());
        let mut offset = 0usize;

        for (i, &size) in sizes.iter().enumerate() {
            if size == 0 {
                return StructError::from(CoreReason::Validation)
                    .with_detail(format!(
                        "membership size at index position {i} must be at least 1"
                    ))
                    .err();
            }
            starts.push(offset);
            stops.push(offset + size - 1);
            offset += size;
        }

        Ok(Self { starts, stops })
    }

    /// Number of index positions covered.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Total number of underlying rows in the flattened space.
    pub fn total_rows(&self) -> usize {
        self.stops.last().map(|s| s + 1).unwrap_or(0)
    }

    /// Contiguous row range owned by index positions `a..=b`.
    pub(crate) fn row_span(&self, a: usize, b: usize) -> CompactRange {
        let start = self.starts[a];
        CompactRange::new(start, self.stops[b] - start + 1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
