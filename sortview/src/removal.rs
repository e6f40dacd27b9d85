//! Removing source rows that may be scattered all over the view.

use smallvec::SmallVec;

use crate::Permutation;

/// A contiguous run of view rows removed with a single notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemovalRun {
    /// The first removed view row.
    pub first: usize,
    /// The last removed view row.
    pub last: usize,
}

/// The view rows backed by a removed source range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemovalPlan {
    // Ascending.
    positions: Vec<usize>,
}

impl RemovalPlan {
    /// The view rows to remove, ascending.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Whether no rows are removed.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The maximal runs of adjacent rows to remove, last run first.
    ///
    /// Removing the runs in this order keeps the positions of the runs not
    /// removed yet valid.
    pub fn runs(&self) -> SmallVec<[RemovalRun; 2]> {
        let mut runs = SmallVec::new();
        let mut positions = self.positions.iter().rev().copied();
        let Some(mut last) = positions.next() else {
            return runs;
        };

        let mut first = last;
        for position in positions {
            if position + 1 == first {
                first = position;
            } else {
                runs.push(RemovalRun { first, last });
                last = position;
                first = position;
            }
        }
        runs.push(RemovalRun { first, last });

        runs
    }
}

/// Prepare the removal of the source rows `first..=last`.
///
/// Source indices above `last` are shifted down right away so that they
/// refer to the rows after the removal. The view rows that referred to the
/// removed source rows are left in place and returned in the plan; until they
/// are removed, their source indices are meaningless.
///
/// # Panics
///
/// Panics if `first > last`.
pub fn plan_removals(permutation: &mut Permutation, first: usize, last: usize) -> RemovalPlan {
    assert!(first <= last, "removal range {first}..={last} is empty");

    let count = last - first + 1;
    let mut positions = Vec::with_capacity(count);

    for (position, index) in permutation.indices_mut().iter_mut().enumerate() {
        if *index > last {
            *index -= count;
        } else if *index >= first {
            positions.push(position);
        }
    }

    RemovalPlan { positions }
}

/// View rows whose source rows are already gone but which have not been
/// removed from the view yet.
///
/// Only non-empty while a removal is being carried out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invalidated {
    // Ascending.
    positions: Vec<usize>,
}

impl Invalidated {
    /// Mark the rows of the given plan as invalid.
    pub fn new(plan: &RemovalPlan) -> Self {
        Self { positions: plan.positions.clone() }
    }

    /// Whether the given view row is invalid.
    pub fn contains(&self, row: usize) -> bool {
        self.positions.binary_search(&row).is_ok()
    }

    /// The first and last invalid row, if any.
    pub fn span(&self) -> Option<(usize, usize)> {
        Some((*self.positions.first()?, *self.positions.last()?))
    }

    /// Whether no rows are invalid.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Forget about the rows at and after `row`, once they are removed.
    pub fn release_from(&mut self, row: usize) {
        let keep = self.positions.partition_point(|&position| position < row);
        self.positions.truncate(keep);
    }

    /// Forget about all rows.
    pub fn clear(&mut self) {
        self.positions.clear();
    }
}
