use std::sync::Arc;

use anyhow::{Result, bail};
use arrow::array::{ArrayRef, Int64Array};
use arrow::record_batch::RecordBatch;

use rf_core::{
    CancelToken, CoreError, IndexSequence, MembershipTable, OutputColumn, OutputKind, RangeBounds,
    SlideCall, WindowFn, slide_over,
};

use crate::params::{Bound, SlideParams};

// ---------------------------------------------------------------------------
// SlidePlan
// ---------------------------------------------------------------------------

/// A fully derived sliding-window plan: validated boundary sequences,
/// row membership, and destination sets, ready for the evaluation
/// driver. The engine never sees the raw parameters.
#[derive(Debug)]
pub struct SlidePlan {
    pub index: IndexSequence,
    pub range: RangeBounds,
    /// Separate trimming boundaries when `min_before`/`min_after` were
    /// given; otherwise completeness trims against `range`.
    pub trim_range: Option<RangeBounds>,
    pub table: MembershipTable,
    pub destinations: Vec<Vec<usize>>,
    pub output_size: usize,
}

impl SlidePlan {
    /// Assemble the scatter-mode call for this plan.
    pub fn call<'a>(
        &'a self,
        data: &'a RecordBatch,
        output: OutputKind,
        scalar_results: bool,
        complete: bool,
    ) -> SlideCall<'a> {
        SlideCall {
            data,
            index: &self.index,
            range: &self.range,
            trim_range: self.trim_range.as_ref(),
            table: &self.table,
            destinations: &self.destinations,
            output,
            scalar_results,
            complete,
            output_size: self.output_size,
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive a [`SlidePlan`] from raw per-row index values.
///
/// Duplicate index values are grouped: each unique value becomes one
/// index position owning a contiguous run of rows, those rows become the
/// iteration's destination set (fan-out for grouped data), and the run
/// lengths feed the membership table. `step` keeps every step-th index
/// position as an iteration.
pub fn derive_plan(index_values: &[i64], params: &SlideParams) -> Result<SlidePlan> {
    params.validate()?;
    check_ascending(index_values)?;

    let mut unique: Vec<i64> = Vec::new();
    let mut sizes: Vec<usize> = Vec::new();
    let mut owners: Vec<Vec<usize>> = Vec::new();
    for (row, &v) in index_values.iter().enumerate() {
        if unique.last() == Some(&v) {
            if let (Some(size), Some(owner)) = (sizes.last_mut(), owners.last_mut()) {
                *size += 1;
                owner.push(row);
            }
        } else {
            unique.push(v);
            sizes.push(1);
            owners.push(vec![row]);
        }
    }

    let stepped: Vec<usize> = (0..unique.len()).step_by(params.step).collect();

    let index_array: ArrayRef = Arc::new(Int64Array::from(unique.clone()));
    let index = IndexSequence::new(&index_array).map_err(core_err)?;

    let range = build_range(&unique, &stepped, params.before, params.after, &index)?;

    let trim_range = match (params.min_before, params.min_after) {
        (None, None) => None,
        (mb, ma) => {
            let before = mb.map(Bound::Finite).unwrap_or(params.before);
            let after = ma.map(Bound::Finite).unwrap_or(params.after);
            Some(build_range(&unique, &stepped, before, after, &index)?)
        }
    };

    let table = MembershipTable::from_sizes(&sizes).map_err(core_err)?;
    let destinations: Vec<Vec<usize>> = stepped.iter().map(|&p| owners[p].clone()).collect();

    Ok(SlidePlan {
        index,
        range,
        trim_range,
        table,
        destinations,
        output_size: index_values.len(),
    })
}

/// Derive and evaluate in one shot.
pub fn slide_index(
    data: &RecordBatch,
    index_values: &[i64],
    params: &SlideParams,
    output: OutputKind,
    scalar_results: bool,
    cancel: &CancelToken,
    f: &mut WindowFn<'_>,
) -> Result<OutputColumn> {
    let plan = derive_plan(index_values, params)?;
    slide_over(plan.call(data, output, scalar_results, params.complete), cancel, f)
        .map_err(core_err)
}

fn build_range(
    unique: &[i64],
    stepped: &[usize],
    before: Bound,
    after: Bound,
    index: &IndexSequence,
) -> Result<RangeBounds> {
    let starts: Option<ArrayRef> = before.finite().map(|b| {
        Arc::new(Int64Array::from(
            stepped.iter().map(|&p| unique[p] - b).collect::<Vec<i64>>(),
        )) as ArrayRef
    });
    let stops: Option<ArrayRef> = after.finite().map(|a| {
        Arc::new(Int64Array::from(
            stepped.iter().map(|&p| unique[p] + a).collect::<Vec<i64>>(),
        )) as ArrayRef
    });

    RangeBounds::new(starts.as_ref(), stops.as_ref(), index, stepped.len()).map_err(core_err)
}

fn check_ascending(index_values: &[i64]) -> Result<()> {
    if let Some(w) = index_values.windows(2).find(|w| w[0] > w[1]) {
        bail!("index must be sorted ascending ({} precedes {})", w[0], w[1]);
    }
    Ok(())
}

fn core_err(e: CoreError) -> anyhow::Error {
    anyhow::anyhow!("{e}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- 1. row_aligned_plan -------------------------------------------------

    #[test]
    fn row_aligned_plan() {
        let params = SlideParams::new(Bound::Finite(1), Bound::Finite(0));
        let plan = derive_plan(&[1, 2, 3], &params).unwrap();

        assert_eq!(plan.index.len(), 3);
        assert_eq!(plan.range.len(), 3);
        assert_eq!(plan.table.total_rows(), 3);
        assert_eq!(plan.output_size, 3);
        assert_eq!(plan.destinations, vec![vec![0], vec![1], vec![2]]);
        assert!(plan.trim_range.is_none());
    }

    // -- 2. grouped_plan_fans_out --------------------------------------------

    #[test]
    fn grouped_plan_fans_out() {
        let params = SlideParams::new(Bound::Finite(0), Bound::Finite(0));
        let plan = derive_plan(&[1, 1, 2, 2, 2, 5], &params).unwrap();

        assert_eq!(plan.index.len(), 3);
        assert_eq!(plan.output_size, 6);
        assert_eq!(
            plan.destinations,
            vec![vec![0, 1], vec![2, 3, 4], vec![5]]
        );
        assert_eq!(plan.table.total_rows(), 6);
    }

    // -- 3. step_skips_positions ---------------------------------------------

    #[test]
    fn step_skips_positions() {
        let mut params = SlideParams::new(Bound::Finite(0), Bound::Finite(0));
        params.step = 2;
        let plan = derive_plan(&[1, 2, 3, 4, 5], &params).unwrap();

        // Iterations at positions 0, 2, 4 only.
        assert_eq!(plan.range.len(), 3);
        assert_eq!(plan.destinations, vec![vec![0], vec![2], vec![4]]);
        assert_eq!(plan.output_size, 5);
    }

    // -- 4. unbounded_side_omits_bounds --------------------------------------

    #[test]
    fn unbounded_side_omits_bounds() {
        let params = SlideParams::new(Bound::Unbounded, Bound::Finite(0));
        let plan = derive_plan(&[1, 2, 3], &params).unwrap();

        assert!(plan.range.start_unbounded());
        assert!(!plan.range.stop_unbounded());
    }

    // -- 5. trim_reaches_build_trim_range ------------------------------------

    #[test]
    fn trim_reaches_build_trim_range() {
        let mut params = SlideParams::new(Bound::Finite(3), Bound::Finite(0));
        params.complete = true;
        params.min_before = Some(1);
        let plan = derive_plan(&[1, 2, 3], &params).unwrap();

        let trim = plan.trim_range.as_ref().unwrap();
        assert_eq!(trim.len(), plan.range.len());
    }

    // -- 6. unsorted_index_rejected ------------------------------------------

    #[test]
    fn unsorted_index_rejected() {
        let params = SlideParams::new(Bound::Finite(1), Bound::Finite(0));
        let err = derive_plan(&[1, 3, 2], &params).unwrap_err();
        assert!(err.to_string().contains("sorted"), "got: {err}");
    }

    // -- 7. empty_index_plan -------------------------------------------------

    #[test]
    fn empty_index_plan() {
        let params = SlideParams::new(Bound::Finite(1), Bound::Finite(0));
        let plan = derive_plan(&[], &params).unwrap();

        assert_eq!(plan.range.len(), 0);
        assert_eq!(plan.output_size, 0);
        assert!(plan.destinations.is_empty());
    }
}
