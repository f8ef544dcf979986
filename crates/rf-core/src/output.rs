use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use orion_error::prelude::*;

use crate::error::{CoreError, CoreReason, CoreResult};

// ---------------------------------------------------------------------------
// OutputKind
// ---------------------------------------------------------------------------

/// Declared element kind of the output store, chosen once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Int64,
    Float64,
    Boolean,
    Utf8,
    /// Arbitrary per-window results; one array per output slot.
    List,
}

// ---------------------------------------------------------------------------
// OutputColumn
// ---------------------------------------------------------------------------

/// Finished output of an evaluation call. Ownership transfers to the
/// caller on return.
#[derive(Debug, Clone)]
pub enum OutputColumn {
    /// Atomic element kind; slots never written are Arrow nulls.
    Array(ArrayRef),
    /// `List` kind; slots never written are `None`.
    Cells(Vec<Option<ArrayRef>>),
}

impl OutputColumn {
    pub fn len(&self) -> usize {
        match self {
            Self::Array(a) => a.len(),
            Self::Cells(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Self::Array(a) => Some(a),
            Self::Cells(_) => None,
        }
    }

    pub fn as_cells(&self) -> Option<&[Option<ArrayRef>]> {
        match self {
            Self::Array(_) => None,
            Self::Cells(c) => Some(c),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputSink (internal)
// ---------------------------------------------------------------------------

/// Tagged output store. The variant is selected once, before the loop
/// begins; every slot starts at the missing-value marker so destinations
/// never targeted remain distinguishably "not computed".
pub(crate) enum OutputSink {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Utf8(Vec<Option<String>>),
    List(Vec<Option<ArrayRef>>),
}

impl OutputSink {
    pub(crate) fn new(kind: OutputKind, size: usize) -> Self {
        match kind {
            OutputKind::Int64 => Self::Int64(vec![None; size]),
            OutputKind::Float64 => Self::Float64(vec![None; size]),
            OutputKind::Boolean => Self::Boolean(vec![None; size]),
            OutputKind::Utf8 => Self::Utf8(vec![None; size]),
            OutputKind::List => Self::List(vec![None; size]),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Int64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Utf8(v) => v.len(),
            Self::List(v) => v.len(),
        }
    }

    /// Write one window result into destination slot `dest`.
    ///
    /// Atomic sinks take the result's first element (a null stores the
    /// missing marker); the `List` sink stores the whole array.
    pub(crate) fn write(&mut self, dest: usize, value: &ArrayRef) -> CoreResult<()> {
        if dest >= self.len() {
            return StructError::from(CoreReason::Validation)
                .with_detail(format!(
                    "destination {dest} out of bounds for output of size {}",
                    self.len()
                ))
                .err();
        }

        match self {
            Self::Int64(slots) => slots[dest] = scalar_i64(value)?,
            Self::Float64(slots) => slots[dest] = scalar_f64(value)?,
            Self::Boolean(slots) => slots[dest] = scalar_bool(value)?,
            Self::Utf8(slots) => slots[dest] = scalar_str(value)?,
            Self::List(slots) => slots[dest] = Some(value.clone()),
        }

        Ok(())
    }

    pub(crate) fn finish(self) -> OutputColumn {
        match self {
            Self::Int64(v) => OutputColumn::Array(Arc::new(Int64Array::from(v))),
            Self::Float64(v) => OutputColumn::Array(Arc::new(Float64Array::from(v))),
            Self::Boolean(v) => OutputColumn::Array(Arc::new(BooleanArray::from(v))),
            Self::Utf8(v) => {
                OutputColumn::Array(Arc::new(v.into_iter().collect::<StringArray>()))
            }
            Self::List(v) => OutputColumn::Cells(v),
        }
    }
}

// ---------------------------------------------------------------------------
// Scalar extraction
// ---------------------------------------------------------------------------

fn type_mismatch(expected: &str, value: &ArrayRef) -> CoreError {
    StructError::from(CoreReason::DataFormat).with_detail(format!(
        "expected {expected} result, got {:?}",
        value.data_type()
    ))
}

fn empty_result() -> CoreError {
    StructError::from(CoreReason::DataFormat)
        .with_detail("window function returned an empty result".to_string())
}

fn scalar_i64(value: &ArrayRef) -> CoreResult<Option<i64>> {
    let arr = value
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| type_mismatch("Int64", value))?;
    if arr.is_empty() {
        return Err(empty_result());
    }
    Ok((!arr.is_null(0)).then(|| arr.value(0)))
}

fn scalar_f64(value: &ArrayRef) -> CoreResult<Option<f64>> {
    let arr = value
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| type_mismatch("Float64", value))?;
    if arr.is_empty() {
        return Err(empty_result());
    }
    Ok((!arr.is_null(0)).then(|| arr.value(0)))
}

fn scalar_bool(value: &ArrayRef) -> CoreResult<Option<bool>> {
    let arr = value
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| type_mismatch("Boolean", value))?;
    if arr.is_empty() {
        return Err(empty_result());
    }
    Ok((!arr.is_null(0)).then(|| arr.value(0)))
}

fn scalar_str(value: &ArrayRef) -> CoreResult<Option<String>> {
    let arr = value
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| type_mismatch("Utf8", value))?;
    if arr.is_empty() {
        return Err(empty_result());
    }
    Ok((!arr.is_null(0)).then(|| arr.value(0).to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
