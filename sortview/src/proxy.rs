use std::{fmt, ops};

use imbl::Vector;
use sortview_source::{SourceChange, SourceUpdate};

use crate::{
    merge,
    removal::{self, Invalidated},
    reorder::{self, BlockMove},
    CaseSensitivity, Permutation, SortKey, SortOrder, SortSpec, SourceRows,
};

mod observers;

pub use self::observers::{ObserverId, ViewChange};
use self::observers::Observers;

/// A sorted view of a source sequence that reports every change to it as
/// a minimal series of row moves, insertions and removals.
///
/// The proxy does not own the source rows themselves, only the current state
/// of the source (for [`imbl::Vector`], a cheap snapshot) and the
/// [`Permutation`] from view rows to source rows. The application forwards
/// source changes with the `source_*` methods (or [`apply`][Self::apply] for
/// updates from a [`sortview_source::ObservableList`]) and the proxy updates
/// the permutation incrementally, notifying observers before and after every
/// step.
///
/// Read access to the view goes through [`SortedView`], which the proxy
/// dereferences to and which observers get passed.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use sortview::{SortKey, SortOrder, SortProxy, SortValue, ViewChange};
///
/// let mut proxy = SortProxy::with_source(vec![5, 4, 3, 2, 1]);
/// let changes = Rc::new(RefCell::new(Vec::new()));
/// proxy.subscribe({
///     let changes = changes.clone();
///     move |_view, change| changes.borrow_mut().push(*change)
/// });
///
/// let by_value = SortKey::new(|value: &i32| SortValue::from(*value));
/// proxy.set_sort_key(by_value, SortOrder::Ascending, Default::default());
///
/// let rows: Vec<_> = proxy.rows().copied().collect();
/// assert_eq!(rows, [1, 2, 3, 4, 5]);
/// assert!(changes.borrow().iter().all(|change| matches!(
///     change,
///     ViewChange::RowsAboutToBeMoved { .. } | ViewChange::RowsMoved { .. }
/// )));
/// ```
pub struct SortProxy<S: SourceRows> {
    view: SortedView<S>,
    observers: Observers<S>,
}

impl<S: SourceRows> SortProxy<S> {
    /// Create a new `SortProxy` without a source, keeping source order.
    pub fn new() -> Self {
        Self { view: SortedView::empty(), observers: Observers::new() }
    }

    /// Create a new `SortProxy` for the given source, keeping source order.
    pub fn with_source(source: S) -> Self {
        let mut this = Self::new();
        this.view.permutation = Permutation::identity(source.len());
        this.view.source = Some(source);
        this
    }

    /// Register a callback that is invoked for every change to the view.
    ///
    /// Callbacks run synchronously, in the middle of the change, and get read
    /// access to the view as it is at that point.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&SortedView<S>, &ViewChange) + 'static,
    {
        self.observers.insert(Box::new(observer))
    }

    /// Remove a callback registered with [`subscribe`][Self::subscribe].
    ///
    /// Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Attach a new source, replacing the current one.
    ///
    /// The view is rebuilt from scratch and observers are told about a reset.
    pub fn set_source(&mut self, source: S) {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sortview::proxy::update", "set_source(len = {})", source.len());

        self.notify(ViewChange::AboutToReset);
        let comparator = self.view.spec.comparator(&source);
        self.view.permutation = Permutation::sorted(source.len(), &comparator);
        self.view.source = Some(source);
        self.notify(ViewChange::Reset);
        self.debug_check();
    }

    /// Detach the current source, leaving the view empty.
    ///
    /// Returns the detached source, if there was one.
    pub fn clear_source(&mut self) -> Option<S> {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sortview::proxy::update", "clear_source");

        self.view.source.as_ref()?;
        self.notify(ViewChange::AboutToReset);
        let source = self.view.source.take();
        self.view.permutation.clear();
        self.notify(ViewChange::Reset);
        source
    }

    /// Sort by the given key.
    ///
    /// Setting a clone of the active key with the same order and case
    /// sensitivity does nothing.
    pub fn set_sort_key(
        &mut self,
        key: SortKey<S::Item>,
        order: SortOrder,
        case_sensitivity: CaseSensitivity,
    ) {
        self.set_sort_spec(SortSpec { key: Some(key), order, case_sensitivity });
    }

    /// Change the order of the view to the given one, moving rows as needed.
    pub fn set_sort_spec(&mut self, spec: SortSpec<S::Item>) {
        let unchanged = spec.orders_like(&self.view.spec);
        self.view.spec = spec;

        if unchanged {
            #[cfg(feature = "tracing")]
            tracing::trace!(target: "sortview::proxy::update", "sort spec unchanged");
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sortview::proxy::update", spec = ?self.view.spec, "set_sort_spec");

        self.reorder();
        self.debug_check();
    }

    /// Go back to source order.
    pub fn clear_sort(&mut self) {
        self.set_sort_spec(SortSpec::unsorted());
    }

    /// Change the sort order, keeping the key.
    pub fn set_sort_order(&mut self, order: SortOrder) {
        let spec = self.view.spec.clone().with_order(order);
        self.set_sort_spec(spec);
    }

    /// Change the case sensitivity, keeping the key.
    pub fn set_case_sensitivity(&mut self, case_sensitivity: CaseSensitivity) {
        let spec = self.view.spec.clone().with_case_sensitivity(case_sensitivity);
        self.set_sort_spec(spec);
    }

    /// Handle a change of the data of the source rows `first..=last`.
    ///
    /// `state` is the source after the change. Rows whose position changes
    /// are moved; afterwards, [`ViewChange::DataChanged`] is emitted for every
    /// run of adjacent changed rows.
    ///
    /// # Panics
    ///
    /// Panics if no source is attached, if the range is invalid or if `state`
    /// has a different number of rows than the view.
    #[track_caller]
    pub fn source_data_changed(&mut self, first: usize, last: usize, state: S) {
        let len = self.attached_len();
        if first > last || last >= len {
            panic!("changed rows {first}..={last} out of bounds: the length is {len}");
        }
        check_state_len(len, state.len());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sortview::proxy::update",
            "data_changed(first = {first}, last = {last})"
        );

        self.view.source = Some(state);
        if self.view.spec.is_sorted() {
            self.reorder();
        }

        for run in changed_runs(&self.view.permutation, first, last) {
            self.notify(ViewChange::DataChanged { first: run.0, last: run.1 });
        }
        self.debug_check();
    }

    /// Handle the insertion of the source rows `first..=last`.
    ///
    /// `state` is the source after the insertion. The new rows are merged into
    /// the view with one insertion per run of new rows that end up adjacent.
    ///
    /// # Panics
    ///
    /// Panics if no source is attached, if the range is invalid or if `state`
    /// does not have exactly the number of new rows more than the view.
    #[track_caller]
    pub fn source_rows_inserted(&mut self, first: usize, last: usize, state: S) {
        let len = self.attached_len();
        if first > last || first > len {
            panic!("inserted rows {first}..={last} out of bounds: the length was {len}");
        }
        let count = last - first + 1;
        check_state_len(len + count, state.len());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sortview::proxy::update",
            "rows_inserted(first = {first}, last = {last})"
        );

        self.view.permutation.shift_from(first, count);

        let (new_sorted, runs) = {
            let comparator = self.view.spec.comparator(&state);
            let new_sorted = merge::sorted_new_indices(first, last, &comparator);
            let runs =
                merge::plan_inserts(self.view.permutation.as_slice(), &new_sorted, &comparator);
            (new_sorted, runs)
        };
        self.view.source = Some(state);

        for run in runs {
            let change = ViewChange::RowsAboutToBeInserted { first: run.position, last: run.last() };
            self.notify(change);
            self.view.permutation.insert_block(run.position, &new_sorted[run.range()]);
            self.notify(ViewChange::RowsInserted { first: run.position, last: run.last() });
        }
        self.debug_check();
    }

    /// Handle the removal of the source rows that were at `first..=last`.
    ///
    /// `state` is the source after the removal. The view rows of the removed
    /// source rows are removed with one removal per run of adjacent rows, last
    /// run first. Until its run is removed, reading such a row through the
    /// view gives `None`.
    ///
    /// # Panics
    ///
    /// Panics if no source is attached, if the range is invalid or if `state`
    /// does not have exactly the number of removed rows fewer than the view.
    #[track_caller]
    pub fn source_rows_removed(&mut self, first: usize, last: usize, state: S) {
        let len = self.attached_len();
        if first > last || last >= len {
            panic!("removed rows {first}..={last} out of bounds: the length was {len}");
        }
        check_state_len(len - (last - first + 1), state.len());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sortview::proxy::update",
            "rows_removed(first = {first}, last = {last})"
        );

        self.view.source = Some(state);
        let plan = removal::plan_removals(&mut self.view.permutation, first, last);
        self.view.invalidated = Invalidated::new(&plan);

        for run in plan.runs() {
            self.notify(ViewChange::RowsAboutToBeRemoved { first: run.first, last: run.last });
            self.view.permutation.remove_block(run.first, run.last);
            self.view.invalidated.release_from(run.first);
            self.notify(ViewChange::RowsRemoved { first: run.first, last: run.last });
        }

        self.view.invalidated.clear();
        self.debug_check();
    }

    /// Handle the source being replaced wholesale.
    ///
    /// Same as [`set_source`][Self::set_source].
    pub fn source_reset(&mut self, state: S) {
        self.set_source(state);
    }

    fn reorder(&mut self) {
        let Some(source) = &self.view.source else {
            return;
        };
        if self.view.permutation.is_empty() {
            return;
        }

        let comparator = self.view.spec.comparator(source);
        let target = reorder::target_order(self.view.permutation.as_slice(), &comparator);
        let moves = reorder::plan_moves(self.view.permutation.as_slice(), &target);

        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sortview::proxy::update", "reorder with {} moves", moves.len());

        for block in moves {
            self.apply_move(block);
        }
        debug_assert_eq!(self.view.permutation.as_slice(), target.as_slice());
    }

    fn apply_move(&mut self, block: BlockMove) {
        let BlockMove { first, last, dest } = block;
        self.notify(ViewChange::RowsAboutToBeMoved { first, last, dest });
        self.view.permutation.move_block(first, last, dest);
        self.notify(ViewChange::RowsMoved { first, last, dest });
    }

    fn notify(&mut self, change: ViewChange) {
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "sortview::proxy::emit", ?change);

        self.observers.notify(&self.view, change);
    }

    #[track_caller]
    fn attached_len(&self) -> usize {
        if self.view.source.is_none() {
            panic!("source change reported without a source attached");
        }
        self.view.permutation.len()
    }

    fn debug_check(&self) {
        debug_assert!(self.view.invalidated.is_empty());
        debug_assert!(self.view.permutation.is_bijection(), "{:?}", self.view.permutation);
        debug_assert_eq!(
            self.view.permutation.len(),
            self.view.source.as_ref().map_or(0, SourceRows::len)
        );
    }
}

impl<T: Clone> SortProxy<Vector<T>> {
    /// Handle an update received from a
    /// [`SourceSubscriber`][sortview_source::SourceSubscriber].
    ///
    /// If no source is attached yet, the update's state is attached as the
    /// source, whatever the change.
    pub fn apply(&mut self, update: SourceUpdate<T>) {
        let SourceUpdate { change, state } = update;
        if self.view.source.is_none() {
            self.set_source(state);
            return;
        }

        match change {
            SourceChange::DataChanged { first, last } => {
                self.source_data_changed(first, last, state);
            }
            SourceChange::RowsInserted { first, last } => {
                self.source_rows_inserted(first, last, state);
            }
            SourceChange::RowsRemoved { first, last } => {
                self.source_rows_removed(first, last, state);
            }
            SourceChange::Reset => self.source_reset(state),
        }
    }
}

impl<S: SourceRows> Default for SortProxy<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SourceRows> fmt::Debug for SortProxy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortProxy")
            .field("view", &self.view)
            .field("observers", &self.observers)
            .finish()
    }
}

// Note: No DerefMut because all mutating must go through inherent methods that
// notify observers
impl<S: SourceRows> ops::Deref for SortProxy<S> {
    type Target = SortedView<S>;

    fn deref(&self) -> &Self::Target {
        &self.view
    }
}

/// Read access to the rows of a [`SortProxy`], in view order.
pub struct SortedView<S: SourceRows> {
    source: Option<S>,
    spec: SortSpec<S::Item>,
    permutation: Permutation,
    invalidated: Invalidated,
}

impl<S: SourceRows> SortedView<S> {
    fn empty() -> Self {
        Self {
            source: None,
            spec: SortSpec::unsorted(),
            permutation: Permutation::new(),
            invalidated: Invalidated::default(),
        }
    }

    /// The number of rows in the view.
    pub fn row_count(&self) -> usize {
        self.permutation.len()
    }

    /// The row at the given view position.
    ///
    /// Returns `None` if the position is out of bounds, or if the source row
    /// behind it was removed and the view row is about to be removed as well.
    pub fn data(&self, row: usize) -> Option<&S::Item> {
        let index = self.map_to_source(row)?;
        self.source.as_ref()?.row(index)
    }

    /// The source index of the row at the given view position.
    ///
    /// Returns `None` in the same cases as [`data`][Self::data].
    pub fn map_to_source(&self, row: usize) -> Option<usize> {
        if self.invalidated.contains(row) {
            return None;
        }
        self.permutation.get(row)
    }

    /// The view position of the row at the given source index.
    pub fn map_from_source(&self, source_index: usize) -> Option<usize> {
        if self.invalidated.is_empty() {
            return self.permutation.position_of(source_index);
        }

        // Invalidated rows hold stale indices that may equal a live one.
        self.permutation
            .iter()
            .enumerate()
            .find(|&(row, &index)| index == source_index && !self.invalidated.contains(row))
            .map(|(row, _)| row)
    }

    /// Whether the given view row refers to a removed source row.
    pub fn is_invalidated(&self, row: usize) -> bool {
        self.invalidated.contains(row)
    }

    /// Iterate over the rows in view order.
    ///
    /// Rows that [`data`][Self::data] gives `None` for are skipped.
    pub fn rows(&self) -> impl Iterator<Item = &S::Item> + '_ {
        (0..self.row_count()).filter_map(move |row| self.data(row))
    }

    /// The current permutation from view rows to source rows.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// The current sort spec.
    pub fn sort_spec(&self) -> &SortSpec<S::Item> {
        &self.spec
    }

    /// The current state of the source, if one is attached.
    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }
}

impl<S: SourceRows> fmt::Debug for SortedView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedView")
            .field("attached", &self.source.is_some())
            .field("spec", &self.spec)
            .field("permutation", &self.permutation)
            .field("invalidated", &self.invalidated)
            .finish()
    }
}

#[track_caller]
fn check_state_len(expected: usize, actual: usize) {
    if expected != actual {
        panic!("source state has {actual} rows, but the change implies {expected}");
    }
}

// Runs of adjacent view rows backed by the source rows `first..=last`.
fn changed_runs(permutation: &Permutation, first: usize, last: usize) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for (row, &index) in permutation.iter().enumerate() {
        if !(first..=last).contains(&index) {
            continue;
        }
        match runs.last_mut() {
            Some(run) if run.1 + 1 == row => run.1 = row,
            _ => runs.push((row, row)),
        }
    }
    runs
}
