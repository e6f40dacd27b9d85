use std::sync::Arc;

use imbl::Vector;

/// Read access to the rows of a source sequence.
///
/// A [`SortProxy`][crate::SortProxy] holds a value of this type for the
/// current state of its source and only ever reads rows through it. It is
/// implemented for the common sequence types; with [`imbl::Vector`] a new
/// state is a cheap, structurally shared clone.
pub trait SourceRows {
    /// The type of the rows.
    type Item;

    /// The number of rows.
    fn len(&self) -> usize;

    /// The row at the given source index, if any.
    fn row(&self, index: usize) -> Option<&Self::Item>;

    /// Whether there are no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> SourceRows for Vector<T> {
    type Item = T;

    fn len(&self) -> usize {
        Vector::len(self)
    }

    fn row(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<T> SourceRows for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn row(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<T> SourceRows for [T] {
    type Item = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn row(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<S: SourceRows + ?Sized> SourceRows for Arc<S> {
    type Item = S::Item;

    fn len(&self) -> usize {
        (**self).len()
    }

    fn row(&self, index: usize) -> Option<&S::Item> {
        (**self).row(index)
    }
}
