use std::{
    fmt,
    ops::{self, Bound, RangeBounds},
};

use imbl::Vector;
use tokio::sync::broadcast::{self, Sender};

mod subscriber;
mod transaction;

pub use self::{subscriber::SourceSubscriber, transaction::ListTransaction};

/// An ordered list of elements that broadcasts any changes made to it, in the
/// form of row ranges.
pub struct ObservableList<T> {
    values: Vector<T>,
    sender: Sender<BroadcastMessage<T>>,
}

impl<T: Clone + Send + Sync + 'static> ObservableList<T> {
    /// An empty list that buffers up to 16 undelivered updates per subscriber.
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    /// An empty list that keeps at most `capacity` updates around for slow
    /// subscribers.
    ///
    /// A subscriber that misses an update because the buffer overflowed is
    /// sent a [`SourceChange::Reset`] carrying the newest contents instead.
    ///
    /// # Panics
    ///
    /// If `capacity` is zero or exceeds `usize::MAX / 2`.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { values: Vector::new(), sender }
    }

    /// The plain contents, without the broadcast channel.
    pub fn into_inner(self) -> Vector<T> {
        self.values
    }

    /// Start listening for changes.
    ///
    /// The subscriber only sees changes made after this call. Use the
    /// current contents of the list (it dereferences to a `Vector`) as the
    /// initial state.
    pub fn subscribe(&self) -> SourceSubscriber<T> {
        SourceSubscriber::new(self.sender.subscribe())
    }

    /// Append the given elements at the end of the list and notify
    /// subscribers.
    pub fn append(&mut self, values: Vector<T>) {
        let len = self.values.len();
        self.insert_many(len, values);
    }

    /// Insert `value` as the new first row.
    pub fn push_front(&mut self, value: T) {
        self.insert(0, value);
    }

    /// Insert `value` as the new last row.
    pub fn push_back(&mut self, value: T) {
        let len = self.values.len();
        self.insert(len, value);
    }

    /// Insert `value` so that it ends up at row `index`.
    ///
    /// # Panics
    ///
    /// If `index` is greater than the length.
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) {
        self.insert_many(index, Vector::unit(value));
    }

    /// Insert the given elements before the given position and notify
    /// subscribers with a single [`SourceChange::RowsInserted`].
    ///
    /// Does nothing if `values` is empty.
    ///
    /// # Panics
    ///
    /// If `index` is greater than the length.
    #[track_caller]
    pub fn insert_many(&mut self, index: usize, values: Vector<T>) {
        if let Some(change) = insert_rows(&mut self.values, index, values) {
            self.broadcast(change);
        }
    }

    /// Overwrite row `index` with `value`, reported as
    /// [`SourceChange::DataChanged`]. Returns what was there before.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn set(&mut self, index: usize, value: T) -> T {
        let (old_value, change) = set_row(&mut self.values, index, value);
        self.broadcast(change);
        old_value
    }

    /// Update the element at the given position in place and notify
    /// subscribers.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn update(&mut self, index: usize, f: impl FnOnce(&mut T)) {
        let mut f = Some(f);
        self.update_range(index..=index, |value| {
            if let Some(f) = f.take() {
                f(value);
            }
        });
    }

    /// Update every element in the given range in place and notify
    /// subscribers with a single [`SourceChange::DataChanged`].
    ///
    /// Does nothing if the range is empty.
    ///
    /// # Panics
    ///
    /// Panics if the range reaches past the end of the list.
    #[track_caller]
    pub fn update_range(&mut self, range: impl RangeBounds<usize>, f: impl FnMut(&mut T)) {
        if let Some(change) = update_rows(&mut self.values, range, f) {
            self.broadcast(change);
        }
    }

    /// Take row `index` out of the list.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.values.len();
        if index >= len {
            panic!("index out of bounds: the length is {len} but the index is {index}");
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sortview_source::list::update", "remove(index = {index})");

        let value = self.values.remove(index);
        self.broadcast(SourceChange::RowsRemoved { first: index, last: index });
        value
    }

    /// Remove the elements in the given range, notify subscribers with a
    /// single [`SourceChange::RowsRemoved`] and return the elements.
    ///
    /// Does nothing if the range is empty.
    ///
    /// # Panics
    ///
    /// Panics if the range reaches past the end of the list.
    #[track_caller]
    pub fn remove_range(&mut self, range: impl RangeBounds<usize>) -> Vector<T> {
        let (removed, change) = remove_rows(&mut self.values, range);
        if let Some(change) = change {
            self.broadcast(change);
        }
        removed
    }

    /// Take the first row out of the list, if there is one.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.remove(0))
    }

    /// Take the last row out of the list, if there is one.
    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.values.len().checked_sub(1)?;
        Some(self.remove(last))
    }

    /// Drop every row from `len` onwards as one [`SourceChange::RowsRemoved`].
    ///
    /// A `len` at or past the end leaves the list alone.
    pub fn truncate(&mut self, len: usize) {
        if len < self.values.len() {
            self.remove_range(len..);
        }
    }

    /// Remove every row. Subscribers get a [`SourceChange::Reset`] unless the
    /// list was already empty.
    pub fn clear(&mut self) {
        let already_empty = self.values.is_empty();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sortview_source::list::update",
            nop = already_empty.then_some(true),
            "clear"
        );

        if !already_empty {
            self.values.clear();
            self.broadcast(SourceChange::Reset);
        }
    }

    /// Swap in entirely new contents, reported as [`SourceChange::Reset`].
    pub fn reset(&mut self, values: Vector<T>) {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sortview_source::list::update", "reset(len = {})", values.len());

        self.values = values;
        self.broadcast(SourceChange::Reset);
    }

    /// Group several changes so subscribers see them in one go.
    pub fn transaction(&mut self) -> ListTransaction<'_, T> {
        ListTransaction::new(self)
    }

    fn broadcast(&self, change: SourceChange) {
        if self.sender.receiver_count() != 0 {
            let update = SourceUpdate { change, state: self.values.clone() };
            let msg = BroadcastMessage { updates: OneOrManyUpdates::One(update) };
            let _num_receivers = self.sender.send(msg).unwrap_or(0);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "sortview_source::list::broadcast",
                "Source change sent to {_num_receivers} receivers"
            );
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObservableList<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList").field("values", &self.values).finish_non_exhaustive()
    }
}

// Read access only, writes have to go through the broadcasting methods.
impl<T> ops::Deref for ObservableList<T> {
    type Target = Vector<T>;

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vector<T>> for ObservableList<T> {
    fn from(values: Vector<T>) -> Self {
        let mut this = Self::new();
        this.values = values;
        this
    }
}

/// A change to an [`ObservableList`], described by the rows it touched.
///
/// Ranges are inclusive. Removed rows are given in the index space from
/// before the removal, inserted rows in the index space from after the
/// insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceChange {
    /// The rows `first..=last` were updated in place.
    DataChanged {
        /// The first updated row.
        first: usize,
        /// The last updated row.
        last: usize,
    },
    /// New rows were inserted and now occupy `first..=last`.
    RowsInserted {
        /// The index of the first new row.
        first: usize,
        /// The index of the last new row.
        last: usize,
    },
    /// The rows that occupied `first..=last` were removed.
    RowsRemoved {
        /// The index the first removed row had.
        first: usize,
        /// The index the last removed row had.
        last: usize,
    },
    /// The contents were replaced wholesale, or the subscriber lagged too far
    /// behind to be told about the individual changes.
    Reset,
}

/// A [`SourceChange`] together with the state of the list right after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUpdate<T> {
    /// What changed.
    pub change: SourceChange,
    /// The full list of elements after the change.
    pub state: Vector<T>,
}

#[derive(Clone)]
struct BroadcastMessage<T> {
    updates: OneOrManyUpdates<T>,
}

#[derive(Clone)]
enum OneOrManyUpdates<T> {
    One(SourceUpdate<T>),
    Many(Vec<SourceUpdate<T>>),
}

impl<T> OneOrManyUpdates<T> {
    fn into_vec(self) -> Vec<SourceUpdate<T>> {
        match self {
            OneOrManyUpdates::One(update) => vec![update],
            OneOrManyUpdates::Many(updates) => updates,
        }
    }
}

#[track_caller]
fn resolve_range(range: impl RangeBounds<usize>, len: usize) -> Option<(usize, usize)> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start + 1,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end + 1,
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    if start > end {
        panic!("range start {start} is greater than range end {end}");
    }
    if end > len {
        panic!("range out of bounds: the length is {len} but the range ends at {end}");
    }

    (start < end).then(|| (start, end - 1))
}

#[track_caller]
fn insert_rows<T: Clone>(
    values: &mut Vector<T>,
    index: usize,
    new_values: Vector<T>,
) -> Option<SourceChange> {
    let len = values.len();
    if index > len {
        panic!("index out of bounds: the length is {len} but the index is {index}");
    }
    if new_values.is_empty() {
        return None;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "sortview_source::list::update",
        "insert(index = {index}, len = {})", new_values.len()
    );

    let count = new_values.len();
    let tail = values.split_off(index);
    values.append(new_values);
    values.append(tail);

    Some(SourceChange::RowsInserted { first: index, last: index + count - 1 })
}

#[track_caller]
fn set_row<T: Clone>(values: &mut Vector<T>, index: usize, value: T) -> (T, SourceChange) {
    let len = values.len();
    if index >= len {
        panic!("index out of bounds: the length is {len} but the index is {index}");
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(target: "sortview_source::list::update", "set(index = {index})");

    let old_value = values.set(index, value);
    (old_value, SourceChange::DataChanged { first: index, last: index })
}

#[track_caller]
fn update_rows<T: Clone>(
    values: &mut Vector<T>,
    range: impl RangeBounds<usize>,
    mut f: impl FnMut(&mut T),
) -> Option<SourceChange> {
    let (first, last) = resolve_range(range, values.len())?;

    #[cfg(feature = "tracing")]
    tracing::debug!(target: "sortview_source::list::update", "update(first = {first}, last = {last})");

    for index in first..=last {
        if let Some(value) = values.get_mut(index) {
            f(value);
        }
    }

    Some(SourceChange::DataChanged { first, last })
}

#[track_caller]
fn remove_rows<T: Clone>(
    values: &mut Vector<T>,
    range: impl RangeBounds<usize>,
) -> (Vector<T>, Option<SourceChange>) {
    let Some((first, last)) = resolve_range(range, values.len()) else {
        return (Vector::new(), None);
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(target: "sortview_source::list::update", "remove(first = {first}, last = {last})");

    let mut removed = values.split_off(first);
    let rest = removed.split_off(last - first + 1);
    values.append(rest);

    (removed, Some(SourceChange::RowsRemoved { first, last }))
}

#[cfg(feature = "serde")]
impl serde::Serialize for SourceChange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStructVariant;

        const SELF_NAME: &str = "SourceChange";

        let (index, name, first, last) = match *self {
            SourceChange::DataChanged { first, last } => (0, "DataChanged", first, last),
            SourceChange::RowsInserted { first, last } => (1, "RowsInserted", first, last),
            SourceChange::RowsRemoved { first, last } => (2, "RowsRemoved", first, last),
            SourceChange::Reset => {
                return serializer.serialize_struct_variant(SELF_NAME, 3, "Reset", 0)?.end();
            }
        };

        let mut state = serializer.serialize_struct_variant(SELF_NAME, index, name, 2)?;
        state.serialize_field("first", &first)?;
        state.serialize_field("last", &last)?;
        state.end()
    }
}
