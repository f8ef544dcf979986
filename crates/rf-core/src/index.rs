use std::cmp::Ordering;

use arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, StringArray, TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use orion_error::prelude::*;

use crate::error::{CoreReason, CoreResult};

// ---------------------------------------------------------------------------
// IndexKind
// ---------------------------------------------------------------------------

/// Element kind of an index or boundary array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Int64,
    Float64,
    Timestamp,
    Utf8,
}

// ---------------------------------------------------------------------------
// IndexArray (internal)
// ---------------------------------------------------------------------------

/// A typed, non-null Arrow array usable as an index or as one side of a
/// range boundary sequence. The variant is fixed at construction so the
/// comparison loop never branches on Arrow types.
#[derive(Debug, Clone)]
pub(crate) enum IndexArray {
    Int64(Int64Array),
    Float64(Float64Array),
    Timestamp(TimestampNanosecondArray),
    Utf8(StringArray),
}

impl IndexArray {
    pub(crate) fn try_new(array: &ArrayRef, what: &str) -> CoreResult<Self> {
        if array.null_count() > 0 {
            return StructError::from(CoreReason::DataFormat)
                .with_detail(format!(
                    "{what} must not contain nulls ({} found)",
                    array.null_count()
                ))
                .err();
        }

        let out = match array.data_type() {
            DataType::Int64 => array
                .as_any()
                .downcast_ref::<Int64Array>()
                .map(|a| Self::Int64(a.clone())),
            DataType::Float64 => array
                .as_any()
                .downcast_ref::<Float64Array>()
                .map(|a| Self::Float64(a.clone())),
            DataType::Timestamp(TimeUnit::Nanosecond, _) => array
                .as_any()
                .downcast_ref::<TimestampNanosecondArray>()
                .map(|a| Self::Timestamp(a.clone())),
            DataType::Utf8 => array
                .as_any()
                .downcast_ref::<StringArray>()
                .map(|a| Self::Utf8(a.clone())),
            _ => None,
        };

        let Some(out) = out else {
            return StructError::from(CoreReason::DataFormat)
                .with_detail(format!(
                    "unsupported {what} type: {:?}",
                    array.data_type()
                ))
                .err();
        };

        // NaN has no place in a totally ordered sequence.
        if let Self::Float64(a) = &out {
            if a.values().iter().any(|v| v.is_nan()) {
                return StructError::from(CoreReason::DataFormat)
                    .with_detail(format!("{what} must not contain NaN"))
                    .err();
            }
        }

        Ok(out)
    }

    pub(crate) fn kind(&self) -> IndexKind {
        match self {
            Self::Int64(_) => IndexKind::Int64,
            Self::Float64(_) => IndexKind::Float64,
            Self::Timestamp(_) => IndexKind::Timestamp,
            Self::Utf8(_) => IndexKind::Utf8,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Int64(a) => a.len(),
            Self::Float64(a) => a.len(),
            Self::Timestamp(a) => a.len(),
            Self::Utf8(a) => a.len(),
        }
    }

    /// Compare element `i` of `self` against element `j` of `other`.
    ///
    /// Mismatched variants are rejected when a [`RangeBounds`](crate::range::RangeBounds)
    /// is constructed, so the cross-kind arm is unreachable here.
    pub(crate) fn cmp(&self, i: usize, other: &IndexArray, j: usize) -> Ordering {
        match (self, other) {
            (Self::Int64(a), Self::Int64(b)) => a.value(i).cmp(&b.value(j)),
            (Self::Float64(a), Self::Float64(b)) => a
                .value(i)
                .partial_cmp(&b.value(j))
                .unwrap_or(Ordering::Equal),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.value(i).cmp(&b.value(j)),
            (Self::Utf8(a), Self::Utf8(b)) => a.value(i).cmp(b.value(j)),
            _ => unreachable!("element kind mismatch is rejected at construction"),
        }
    }
}

// ---------------------------------------------------------------------------
// IndexSequence
// ---------------------------------------------------------------------------

/// An ordered sequence of comparable elements plus the relational
/// operators used by the window locator.
///
/// The caller guarantees ascending sort; the sequence is immutable for
/// the duration of a call.
#[derive(Debug)]
pub struct IndexSequence {
    values: IndexArray,
}

impl IndexSequence {
    /// Wrap an Arrow array as an index.
    ///
    /// Supported kinds: `Int64`, `Float64`, `Timestamp(Nanosecond)`,
    /// `Utf8`. Arrays containing nulls are rejected.
    pub fn new(array: &ArrayRef) -> CoreResult<Self> {
        Ok(Self {
            values: IndexArray::try_new(array, "index")?,
        })
    }

    pub fn kind(&self) -> IndexKind {
        self.values.kind()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Last valid index position, `None` for an empty index.
    pub fn last_pos(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    #[cfg(test)]
    pub(crate) fn values(&self) -> &IndexArray {
        &self.values
    }

    /// `index[i] < bounds[j]`
    pub(crate) fn lt(&self, i: usize, bounds: &IndexArray, j: usize) -> bool {
        self.values.cmp(i, bounds, j) == Ordering::Less
    }

    /// `index[i] > bounds[j]`
    pub(crate) fn gt(&self, i: usize, bounds: &IndexArray, j: usize) -> bool {
        self.values.cmp(i, bounds, j) == Ordering::Greater
    }

    /// `index[i] <= bounds[j]`
    pub(crate) fn lte(&self, i: usize, bounds: &IndexArray, j: usize) -> bool {
        self.values.cmp(i, bounds, j) != Ordering::Greater
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn int_index(values: &[i64]) -> IndexSequence {
        let array: ArrayRef = Arc::new(Int64Array::from(values.to_vec()));
        IndexSequence::new(&array).unwrap()
    }

    // -- 1. int64_comparators ------------------------------------------------

    #[test]
    fn int64_comparators() {
        let index = int_index(&[1, 2, 3]);
        let bounds = int_index(&[2]);

        assert!(index.lt(0, bounds.values(), 0));
        assert!(!index.lt(1, bounds.values(), 0));
        assert!(index.lte(1, bounds.values(), 0));
        assert!(!index.lte(2, bounds.values(), 0));
        assert!(index.gt(2, bounds.values(), 0));
        assert!(!index.gt(1, bounds.values(), 0));
    }

    // -- 2. float64_comparators ----------------------------------------------

    #[test]
    fn float64_comparators() {
        let array: ArrayRef = Arc::new(Float64Array::from(vec![0.5, 1.5]));
        let index = IndexSequence::new(&array).unwrap();
        let bounds_array: ArrayRef = Arc::new(Float64Array::from(vec![1.0]));
        let bounds = IndexSequence::new(&bounds_array).unwrap();

        assert_eq!(index.kind(), IndexKind::Float64);
        assert!(index.lt(0, bounds.values(), 0));
        assert!(index.gt(1, bounds.values(), 0));
    }

    // -- 3. timestamp_comparators --------------------------------------------

    #[test]
    fn timestamp_comparators() {
        let array: ArrayRef = Arc::new(TimestampNanosecondArray::from(vec![
            1_000_000_000_i64,
            2_000_000_000,
        ]));
        let index = IndexSequence::new(&array).unwrap();
        let bounds_array: ArrayRef =
            Arc::new(TimestampNanosecondArray::from(vec![1_500_000_000_i64]));
        let bounds = IndexSequence::new(&bounds_array).unwrap();

        assert_eq!(index.kind(), IndexKind::Timestamp);
        assert!(index.lt(0, bounds.values(), 0));
        assert!(!index.lte(1, bounds.values(), 0));
    }

    // -- 4. utf8_comparators -------------------------------------------------

    #[test]
    fn utf8_comparators() {
        let array: ArrayRef = Arc::new(StringArray::from(vec!["apple", "cherry"]));
        let index = IndexSequence::new(&array).unwrap();
        let bounds_array: ArrayRef = Arc::new(StringArray::from(vec!["banana"]));
        let bounds = IndexSequence::new(&bounds_array).unwrap();

        assert_eq!(index.kind(), IndexKind::Utf8);
        assert!(index.lt(0, bounds.values(), 0));
        assert!(index.gt(1, bounds.values(), 0));
    }

    // -- 5. nulls_rejected ---------------------------------------------------

    #[test]
    fn nulls_rejected() {
        let array: ArrayRef = Arc::new(Int64Array::from(vec![Some(1), None, Some(3)]));
        assert!(IndexSequence::new(&array).is_err());
    }

    // -- 6. unsupported_type_rejected ----------------------------------------

    #[test]
    fn unsupported_type_rejected() {
        let array: ArrayRef = Arc::new(arrow::array::Int32Array::from(vec![1, 2, 3]));
        assert!(IndexSequence::new(&array).is_err());
    }

    // -- 7. last_pos ---------------------------------------------------------

    #[test]
    fn last_pos() {
        assert_eq!(int_index(&[1, 2, 3]).last_pos(), Some(2));
        assert_eq!(int_index(&[]).last_pos(), None);
        assert!(int_index(&[]).is_empty());
    }

    // -- 8. nan_rejected -------------------------------------------------------

    #[test]
    fn nan_rejected() {
        let array: ArrayRef = Arc::new(Float64Array::from(vec![1.0, f64::NAN, 3.0]));
        let err = IndexSequence::new(&array).unwrap_err();
        assert!(err.to_string().contains("NaN"), "got: {err}");
    }
}
