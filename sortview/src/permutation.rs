use std::{fmt, ops::Range, slice};

use crate::{Comparator, SourceRows};

/// The current view order: a map from view positions to source indices.
///
/// After every completed operation on a [`SortProxy`][crate::SortProxy] this
/// is a bijection over `0..len`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Permutation {
    indices: Vec<usize>,
}

impl Permutation {
    /// The empty permutation.
    pub fn new() -> Self {
        Self::default()
    }

    /// The permutation that keeps `len` rows in source order.
    pub fn identity(len: usize) -> Self {
        Self { indices: (0..len).collect() }
    }

    /// The permutation that sorts `len` rows with the given comparator.
    ///
    /// The sort is stable: rows that compare equal stay in source order.
    pub fn sorted<S>(len: usize, comparator: &Comparator<'_, S>) -> Self
    where
        S: SourceRows + ?Sized,
    {
        let mut this = Self::identity(len);
        if !comparator.is_source_order() {
            this.indices.sort_by(|&a, &b| comparator.compare(a, b));
        }
        this
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The source index at the given view position.
    pub fn get(&self, position: usize) -> Option<usize> {
        self.indices.get(position).copied()
    }

    /// The view position of the given source index.
    pub fn position_of(&self, source_index: usize) -> Option<usize> {
        self.indices.iter().position(|&index| index == source_index)
    }

    /// The source indices in view order.
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Iterate over the source indices in view order.
    pub fn iter(&self) -> slice::Iter<'_, usize> {
        self.indices.iter()
    }

    /// Whether every index in `0..len` occurs exactly once.
    pub fn is_bijection(&self) -> bool {
        let mut seen = vec![false; self.indices.len()];
        self.indices.iter().all(|&index| match seen.get_mut(index) {
            Some(seen) if !*seen => {
                *seen = true;
                true
            }
            _ => false,
        })
    }

    /// Insert the given source indices before the view position `before`.
    ///
    /// # Panics
    ///
    /// Panics if `before > len`.
    #[track_caller]
    pub fn insert_block(&mut self, before: usize, indices: &[usize]) {
        let len = self.len();
        if before > len {
            panic!("position out of bounds: the length is {len} but the position is {before}");
        }

        self.indices.splice(before..before, indices.iter().copied());
    }

    /// Remove the view positions `first..=last`, returning their source
    /// indices.
    ///
    /// # Panics
    ///
    /// Panics if `first > last` or `last >= len`.
    #[track_caller]
    pub fn remove_block(&mut self, first: usize, last: usize) -> Vec<usize> {
        let range = self.checked_block(first, last);
        self.indices.drain(range).collect()
    }

    /// Move the view positions `first..=last` so that they end up right
    /// before what is now at position `dest`.
    ///
    /// # Panics
    ///
    /// Panics if the block is out of bounds, if `dest > len` or if `dest`
    /// lies within `first..=last + 1`.
    #[track_caller]
    pub fn move_block(&mut self, first: usize, last: usize, dest: usize) {
        let range = self.checked_block(first, last);
        let len = self.len();
        if dest > len {
            panic!("position out of bounds: the length is {len} but the position is {dest}");
        }

        if dest < first {
            self.indices[dest..range.end].rotate_right(range.len());
        } else if dest > range.end {
            self.indices[first..dest].rotate_left(range.len());
        } else {
            panic!("cannot move rows {first}..={last} to {dest}, inside of themselves");
        }
    }

    /// Add `by` to every source index at or above `start`.
    pub fn shift_from(&mut self, start: usize, by: usize) {
        for index in &mut self.indices {
            if *index >= start {
                *index += by;
            }
        }
    }

    pub(crate) fn indices_mut(&mut self) -> &mut [usize] {
        &mut self.indices
    }

    pub(crate) fn clear(&mut self) {
        self.indices.clear();
    }

    #[track_caller]
    fn checked_block(&self, first: usize, last: usize) -> Range<usize> {
        let len = self.len();
        if first > last || last >= len {
            panic!("rows {first}..={last} out of bounds: the length is {len}");
        }
        first..last + 1
    }
}

impl fmt::Debug for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.indices).finish()
    }
}

impl<'a> IntoIterator for &'a Permutation {
    type Item = &'a usize;
    type IntoIter = slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

impl From<Permutation> for Vec<usize> {
    fn from(permutation: Permutation) -> Self {
        permutation.indices
    }
}
