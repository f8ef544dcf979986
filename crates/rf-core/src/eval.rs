use arrow::array::{Array, ArrayRef};
use arrow::record_batch::RecordBatch;
use orion_error::prelude::*;

use crate::cancel::CancelToken;
use crate::error::{CoreReason, CoreResult};
use crate::index::IndexSequence;
use crate::locate::{Cursor, locate_window};
use crate::membership::MembershipTable;
use crate::output::{OutputColumn, OutputKind, OutputSink};
use crate::range::RangeBounds;
use crate::trim;

/// How often the driver polls the cancellation token, in iterations.
const CANCEL_POLL_INTERVAL: usize = 1024;

/// Per-window callable. Receives the current window as a zero-copy slice
/// of the data batch and returns one result array. Any failure is fatal
/// to the whole call.
pub type WindowFn<'a> = dyn FnMut(&RecordBatch) -> anyhow::Result<ArrayRef> + 'a;

// ---------------------------------------------------------------------------
// SlideCall -- scatter mode
// ---------------------------------------------------------------------------

/// Inputs for a scatter-mode evaluation: one window per boundary pair,
/// each result fanned out to the caller-chosen output slots of that
/// iteration.
pub struct SlideCall<'a> {
    pub data: &'a RecordBatch,
    pub index: &'a IndexSequence,
    pub range: &'a RangeBounds,
    /// Substitute boundaries for completeness trimming only. When `None`
    /// the locating range is trimmed against itself.
    pub trim_range: Option<&'a RangeBounds>,
    pub table: &'a MembershipTable,
    /// Output slots to write per iteration; zero, one, or many each.
    pub destinations: &'a [Vec<usize>],
    pub output: OutputKind,
    /// Require every window result to have exactly one element.
    pub scalar_results: bool,
    /// Skip edge windows extending past the covered index domain.
    pub complete: bool,
    pub output_size: usize,
}

/// Evaluate `f` over every in-bounds window, scattering results.
///
/// Windows execute left to right, in increasing iteration order, exactly
/// once each; results already written are not rolled back on error.
pub fn slide_over(
    call: SlideCall<'_>,
    cancel: &CancelToken,
    f: &mut WindowFn<'_>,
) -> CoreResult<OutputColumn> {
    check_row_coverage(call.table, call.data)?;

    if call.destinations.len() != call.range.len() {
        return StructError::from(CoreReason::Validation)
            .with_detail(format!(
                "{} destination sets supplied for {} iterations",
                call.destinations.len(),
                call.range.len()
            ))
            .err();
    }

    let trim_range = call.trim_range.unwrap_or(call.range);
    if trim_range.len() != call.range.len() {
        return StructError::from(CoreReason::Validation)
            .with_detail(format!(
                "trim range has {} pairs, expected {}",
                trim_range.len(),
                call.range.len()
            ))
            .err();
    }

    let (min_iteration, max_iteration) =
        trim::iteration_bounds(call.index, trim_range, call.complete);

    log::debug!(
        "slide: {} index positions, {} iterations ({min_iteration}..{max_iteration}), {} output slots",
        call.index.len(),
        call.range.len(),
        call.output_size
    );

    let mut cursor = Cursor::new();
    let mut sink = OutputSink::new(call.output, call.output_size);

    for p in min_iteration..max_iteration {
        check_cancelled(cancel, p)?;

        let window = locate_window(&mut cursor, call.index, call.range, call.table, p);
        let result = invoke(f, &window.slice(call.data))?;
        check_scalar_result(call.scalar_results, p, &result)?;

        for &dest in &call.destinations[p] {
            sink.write(dest, &result)?;
        }
    }

    Ok(sink.finish())
}

// ---------------------------------------------------------------------------
// HopCall -- append mode
// ---------------------------------------------------------------------------

/// Inputs for an append-mode evaluation: one boundary pair per output
/// slot, results written sequentially.
pub struct HopCall<'a> {
    pub data: &'a RecordBatch,
    pub index: &'a IndexSequence,
    pub range: &'a RangeBounds,
    pub table: &'a MembershipTable,
    pub output: OutputKind,
    pub scalar_results: bool,
}

/// Evaluate `f` over every boundary pair, writing result `p` to slot `p`.
pub fn hop_over(
    call: HopCall<'_>,
    cancel: &CancelToken,
    f: &mut WindowFn<'_>,
) -> CoreResult<OutputColumn> {
    check_row_coverage(call.table, call.data)?;

    log::debug!(
        "hop: {} index positions, {} iterations",
        call.index.len(),
        call.range.len()
    );

    let mut cursor = Cursor::new();
    let mut sink = OutputSink::new(call.output, call.range.len());

    for p in 0..call.range.len() {
        check_cancelled(cancel, p)?;

        let window = locate_window(&mut cursor, call.index, call.range, call.table, p);
        let result = invoke(f, &window.slice(call.data))?;
        check_scalar_result(call.scalar_results, p, &result)?;

        sink.write(p, &result)?;
    }

    Ok(sink.finish())
}

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

fn check_row_coverage(table: &MembershipTable, data: &RecordBatch) -> CoreResult<()> {
    if table.total_rows() > data.num_rows() {
        return StructError::from(CoreReason::Validation)
            .with_detail(format!(
                "membership table covers {} rows but data has {}",
                table.total_rows(),
                data.num_rows()
            ))
            .err();
    }
    Ok(())
}

fn check_cancelled(cancel: &CancelToken, p: usize) -> CoreResult<()> {
    if p % CANCEL_POLL_INTERVAL == 0 && cancel.is_cancelled() {
        return StructError::from(CoreReason::Cancelled)
            .with_detail(format!("cancelled before iteration {}", p + 1))
            .err();
    }
    Ok(())
}

fn invoke(f: &mut WindowFn<'_>, window: &RecordBatch) -> CoreResult<ArrayRef> {
    f(window).map_err(|e| StructError::from(CoreReason::WindowFn).with_detail(format!("{e:#}")))
}

fn check_scalar_result(scalar_results: bool, p: usize, result: &ArrayRef) -> CoreResult<()> {
    if scalar_results && result.len() != 1 {
        return StructError::from(CoreReason::Shape)
            .with_detail(format!(
                "iteration {} must produce a result of size 1, not {}",
                p + 1,
                result.len()
            ))
            .err();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
