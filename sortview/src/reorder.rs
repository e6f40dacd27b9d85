//! Turning one view order into another with as few block moves as possible.

use crate::{Comparator, SourceRows};

/// Relocation of the view rows `first..=last` to right before the row
/// currently at `dest`.
///
/// All positions are in the coordinates from before the move, so `dest` can
/// be the row count (move to the end), but never a position in
/// `first..=last + 1` (the block would not go anywhere).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockMove {
    /// The first row of the block.
    pub first: usize,
    /// The last row of the block.
    pub last: usize,
    /// The row the block is moved in front of.
    pub dest: usize,
}

impl BlockMove {
    /// The number of rows moved.
    pub fn row_count(&self) -> usize {
        self.last - self.first + 1
    }

    /// Whether this is a valid move in a view with `row_count` rows.
    pub fn is_legal(&self, row_count: usize) -> bool {
        self.first <= self.last
            && self.last < row_count
            && self.dest <= row_count
            && (self.dest < self.first || self.dest > self.last + 1)
    }
}

/// Sort the given view order with the comparator.
///
/// Rows that compare equal keep their current relative order, so sorting an
/// already sorted order gives it back unchanged.
pub fn target_order<S>(current: &[usize], comparator: &Comparator<'_, S>) -> Vec<usize>
where
    S: SourceRows + ?Sized,
{
    let mut target = current.to_vec();
    target.sort_by(|&a, &b| comparator.compare(a, b));
    target
}

/// Compute the block moves that turn `current` into `target`.
///
/// Both slices must hold the same source indices. Each move is expressed in
/// the order as left by the moves before it. Rows that are adjacent and in
/// the right relative order in `current` are never split up, and rows that
/// are already in place are never moved.
///
/// # Panics
///
/// Panics if the slices are not permutations of each other.
pub fn plan_moves(current: &[usize], target: &[usize]) -> Vec<BlockMove> {
    assert_eq!(current.len(), target.len(), "orders of different lengths");

    let mut unordered = current.to_vec();
    let mut moves = Vec::new();

    // Number of rows not yet known to be in place, in both `unordered` and
    // `target`. Everything past it is identical in both.
    let mut remaining = target.len();

    while remaining > 0 {
        let cursor = remaining - 1;
        let wanted = target[cursor];

        if unordered[cursor] == wanted {
            remaining -= 1;
            continue;
        }

        let found = unordered[..cursor]
            .iter()
            .rposition(|&index| index == wanted)
            .unwrap_or_else(|| panic!("source index {wanted} is missing from the current order"));

        // Grow the block backwards while it keeps matching the target.
        let mut len = 1;
        while len <= found && unordered[found - len] == target[cursor - len] {
            len += 1;
        }

        let block = BlockMove { first: found + 1 - len, last: found, dest: cursor + 1 };
        assert!(block.is_legal(unordered.len()), "illegal block move {block:?}");

        unordered[block.first..block.dest].rotate_left(len);
        moves.push(block);
        remaining -= len;
    }

    moves
}
