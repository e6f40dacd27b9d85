//! Merging newly inserted source rows into a sorted view order.

use std::ops::Range;

use smallvec::SmallVec;

use crate::{Comparator, SourceRows};

/// A contiguous run of new rows inserted into the view with a single
/// notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertRun {
    /// The view position of the first new row, in the order as left by the
    /// runs before this one.
    pub position: usize,
    /// The offset of the run in the sorted new indices.
    pub start: usize,
    /// The number of rows in the run.
    pub len: usize,
}

impl InsertRun {
    /// The view position of the last new row.
    pub fn last(&self) -> usize {
        self.position + self.len - 1
    }

    /// The range of the sorted new indices this run inserts.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// The source indices `first..=last`, sorted with the comparator.
///
/// Rows that compare equal stay in source order.
pub fn sorted_new_indices<S>(first: usize, last: usize, comparator: &Comparator<'_, S>) -> Vec<usize>
where
    S: SourceRows + ?Sized,
{
    let mut indices: Vec<_> = (first..=last).collect();
    if !comparator.is_source_order() {
        indices.sort_by(|&a, &b| comparator.compare(a, b));
    }
    indices
}

/// Plan the insertion of `new_sorted` into `existing`, both sorted with the
/// comparator.
///
/// `existing` must already refer to the source indices after the insertion.
/// A new row goes before the first existing row it sorts strictly before, so
/// it ends up after existing rows it compares equal to. Every maximal run of
/// new rows landing between the same two existing rows is one [`InsertRun`].
/// Runs are returned front to back and take linear time to compute.
pub fn plan_inserts<S>(
    existing: &[usize],
    new_sorted: &[usize],
    comparator: &Comparator<'_, S>,
) -> SmallVec<[InsertRun; 2]>
where
    S: SourceRows + ?Sized,
{
    let mut runs = SmallVec::new();
    let mut next_new = 0;
    let mut inserted = 0;

    for (position, &existing_index) in existing.iter().enumerate() {
        if next_new == new_sorted.len() {
            break;
        }

        let start = next_new;
        while next_new < new_sorted.len() && comparator.less_than(new_sorted[next_new], existing_index)
        {
            next_new += 1;
        }

        if next_new > start {
            runs.push(InsertRun { position: position + inserted, start, len: next_new - start });
            inserted += next_new - start;
        }
    }

    // Whatever is left sorts after every existing row.
    if next_new < new_sorted.len() {
        runs.push(InsertRun {
            position: existing.len() + inserted,
            start: next_new,
            len: new_sorted.len() - next_new,
        });
    }

    runs
}
