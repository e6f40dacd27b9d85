use std::{fmt, mem, ops};

use imbl::Vector;

use super::{
    insert_rows, remove_rows, set_row, update_rows, BroadcastMessage, ObservableList,
    OneOrManyUpdates, SourceChange, SourceUpdate,
};

/// A group of changes to an [`ObservableList`] that becomes visible all at
/// once.
///
/// Changes only take effect on [`commit`](Self::commit); dropping the
/// transaction discards them. Subscribers receive the committed changes in a
/// single broadcast, each still paired with the state of the list right after
/// it, so a `SortProxy` can replay them in order.
pub struct ListTransaction<'o, T: Clone> {
    inner: &'o mut ObservableList<T>,
    // Working copy, written back on commit.
    values: Vector<T>,
    // Empty if nobody is subscribed.
    batch: Vec<SourceUpdate<T>>,
}

impl<'o, T: Clone + Send + Sync + 'static> ListTransaction<'o, T> {
    pub(super) fn new(inner: &'o mut ObservableList<T>) -> Self {
        let values = inner.values.clone();
        Self { inner, values, batch: Vec::new() }
    }

    /// Write the changes back to the list and send them to subscribers.
    pub fn commit(mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sortview_source::list::update",
            "commit({} changes)",
            self.batch.len()
        );

        self.inner.values = mem::take(&mut self.values);
        if self.batch.is_empty() {
            return;
        }

        let updates = OneOrManyUpdates::Many(mem::take(&mut self.batch));
        let _num_receivers = self.inner.sender.send(BroadcastMessage { updates }).unwrap_or(0);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sortview_source::list::broadcast",
            "Committed changes broadcast to {_num_receivers} receivers"
        );
    }

    /// Discard the changes made so far and start over from the list's current
    /// contents.
    pub fn rollback(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sortview_source::list::update", "rollback");

        self.values = self.inner.values.clone();
        self.batch.clear();
    }

    /// Append the given elements at the end of the list.
    pub fn append(&mut self, values: Vector<T>) {
        let len = self.values.len();
        self.insert_many(len, values);
    }

    /// Add an element at the back of the list.
    pub fn push_back(&mut self, value: T) {
        let len = self.values.len();
        self.insert(len, value);
    }

    /// Add an element at the front of the list.
    pub fn push_front(&mut self, value: T) {
        self.insert(0, value);
    }

    /// Insert an element at the given position.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) {
        self.insert_many(index, Vector::unit(value));
    }

    /// Insert the given elements before the given position.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn insert_many(&mut self, index: usize, values: Vector<T>) {
        if let Some(change) = insert_rows(&mut self.values, index, values) {
            self.add_to_batch(change);
        }
    }

    /// Replace the element at the given position and return the previous
    /// element at that position.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn set(&mut self, index: usize, value: T) -> T {
        let (old_value, change) = set_row(&mut self.values, index, value);
        self.add_to_batch(change);
        old_value
    }

    /// Update every element in the given range in place.
    ///
    /// # Panics
    ///
    /// Panics if the range reaches past the end of the list.
    #[track_caller]
    pub fn update_range(&mut self, range: impl ops::RangeBounds<usize>, f: impl FnMut(&mut T)) {
        if let Some(change) = update_rows(&mut self.values, range, f) {
            self.add_to_batch(change);
        }
    }

    /// Remove the elements in the given range and return them.
    ///
    /// # Panics
    ///
    /// Panics if the range reaches past the end of the list.
    #[track_caller]
    pub fn remove_range(&mut self, range: impl ops::RangeBounds<usize>) -> Vector<T> {
        let (removed, change) = remove_rows(&mut self.values, range);
        if let Some(change) = change {
            self.add_to_batch(change);
        }
        removed
    }

    /// Remove every row. Nothing is recorded if the working copy is already
    /// empty.
    pub fn clear(&mut self) {
        let already_empty = self.values.is_empty();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sortview_source::list::update",
            nop = already_empty.then_some(true),
            "transaction clear"
        );

        if already_empty {
            return;
        }

        self.values.clear();
        // Earlier changes are subsumed by the reset.
        self.batch.clear();
        self.add_to_batch(SourceChange::Reset);
    }

    fn add_to_batch(&mut self, change: SourceChange) {
        if self.inner.sender.receiver_count() != 0 {
            self.batch.push(SourceUpdate { change, state: self.values.clone() });
        }
    }
}

impl<T> fmt::Debug for ListTransaction<'_, T>
where
    T: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListTransaction").field("values", &self.values).finish_non_exhaustive()
    }
}

// Read-only: every change has to be recorded in the batch.
impl<T: Clone> ops::Deref for ListTransaction<'_, T> {
    type Target = Vector<T>;

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<T: Clone> Drop for ListTransaction<'_, T> {
    fn drop(&mut self) {
        #[cfg(feature = "tracing")]
        if !self.batch.is_empty() {
            tracing::debug!(target: "sortview_source::list::update", "dropped without commit");
        }
    }
}
