use std::fmt;

use slab::Slab;

use super::SortedView;
use crate::SourceRows;

/// A change to the rows of a [`SortProxy`][crate::SortProxy], as seen by its
/// observers.
///
/// Every structural change is announced twice: once before the view is
/// modified (`*AboutToBe*`) and once after. All positions are view rows and
/// ranges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ViewChange {
    /// The rows `first..=last` are about to be moved in front of the row at
    /// `dest`.
    RowsAboutToBeMoved {
        /// The first moved row.
        first: usize,
        /// The last moved row.
        last: usize,
        /// The row the block is moved in front of, before the move.
        dest: usize,
    },
    /// The rows `first..=last` were moved in front of the row that was at
    /// `dest`.
    RowsMoved {
        /// The first moved row, before the move.
        first: usize,
        /// The last moved row, before the move.
        last: usize,
        /// The row the block was moved in front of, before the move.
        dest: usize,
    },
    /// New rows are about to be inserted at `first..=last`.
    RowsAboutToBeInserted {
        /// The position of the first new row.
        first: usize,
        /// The position of the last new row.
        last: usize,
    },
    /// New rows were inserted at `first..=last`.
    RowsInserted {
        /// The position of the first new row.
        first: usize,
        /// The position of the last new row.
        last: usize,
    },
    /// The rows `first..=last` are about to be removed.
    RowsAboutToBeRemoved {
        /// The first removed row.
        first: usize,
        /// The last removed row.
        last: usize,
    },
    /// The rows that were at `first..=last` were removed.
    RowsRemoved {
        /// The first removed row.
        first: usize,
        /// The last removed row.
        last: usize,
    },
    /// The rows `first..=last` have new data but stayed in place.
    DataChanged {
        /// The first changed row.
        first: usize,
        /// The last changed row.
        last: usize,
    },
    /// All rows are about to be replaced.
    AboutToReset,
    /// All rows were replaced.
    Reset,
}

/// A handle to an observer registered with
/// [`SortProxy::subscribe`][crate::SortProxy::subscribe].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

type Observer<S> = Box<dyn FnMut(&SortedView<S>, &ViewChange)>;

pub(super) struct Observers<S: SourceRows> {
    slots: Slab<Observer<S>>,
}

impl<S: SourceRows> Observers<S> {
    pub(super) fn new() -> Self {
        Self { slots: Slab::new() }
    }

    pub(super) fn insert(&mut self, observer: Observer<S>) -> ObserverId {
        ObserverId(self.slots.insert(observer))
    }

    pub(super) fn remove(&mut self, id: ObserverId) -> bool {
        self.slots.try_remove(id.0).is_some()
    }

    pub(super) fn notify(&mut self, view: &SortedView<S>, change: ViewChange) {
        for (_, observer) in &mut self.slots {
            observer(view, &change);
        }
    }
}

impl<S: SourceRows> fmt::Debug for Observers<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").field("len", &self.slots.len()).finish()
    }
}
