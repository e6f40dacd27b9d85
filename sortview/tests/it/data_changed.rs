use sortview::{CaseSensitivity, SortOrder, SortProxy, ViewChange};

use crate::{by_value, moves, record, rows};

fn sorted(source: Vec<i32>) -> SortProxy<Vec<i32>> {
    let mut proxy = SortProxy::with_source(source);
    proxy.set_sort_key(by_value(), SortOrder::Ascending, CaseSensitivity::Sensitive);
    proxy
}

#[test]
fn smallest_becomes_largest() {
    let mut proxy = sorted(vec![1, 2, 3, 4, 5]);
    let changes = record(&mut proxy);

    proxy.source_data_changed(0, 0, vec![6, 2, 3, 4, 5]);

    assert_eq!(rows(&proxy), [2, 3, 4, 5, 6]);
    assert_eq!(
        *changes.borrow(),
        [
            ViewChange::RowsAboutToBeMoved { first: 0, last: 0, dest: 5 },
            ViewChange::RowsMoved { first: 0, last: 0, dest: 5 },
            ViewChange::DataChanged { first: 4, last: 4 },
        ]
    );
}

#[test]
fn move_within() {
    let mut proxy = sorted(vec![10, 20, 30, 40, 50]);
    let changes = record(&mut proxy);

    proxy.source_data_changed(1, 1, vec![10, 35, 30, 40, 50]);

    assert_eq!(rows(&proxy), [10, 30, 35, 40, 50]);
    assert_eq!(moves(&changes.borrow()), [(1, 1, 3)]);
    assert_eq!(changes.borrow().last(), Some(&ViewChange::DataChanged { first: 2, last: 2 }));
}

#[test]
fn largest_becomes_smallest() {
    let mut proxy = sorted(vec![1, 2, 3, 4, 5]);
    let changes = record(&mut proxy);

    proxy.source_data_changed(4, 4, vec![1, 2, 3, 4, 0]);

    assert_eq!(rows(&proxy), [0, 1, 2, 3, 4]);
    // The longest already ordered block is kept together.
    assert_eq!(moves(&changes.borrow()), [(0, 3, 5)]);
    assert_eq!(changes.borrow().last(), Some(&ViewChange::DataChanged { first: 0, last: 0 }));
    assert_eq!(proxy.map_to_source(0), Some(4));
}

#[test]
fn adjacent_rows_move_together() {
    let mut proxy = sorted(vec![1, 2, 3, 4, 5]);
    let changes = record(&mut proxy);

    proxy.source_data_changed(1, 2, vec![1, 10, 11, 4, 5]);

    assert_eq!(rows(&proxy), [1, 4, 5, 10, 11]);
    assert_eq!(moves(&changes.borrow()), [(1, 2, 5)]);
    assert_eq!(changes.borrow().last(), Some(&ViewChange::DataChanged { first: 3, last: 4 }));
}

#[test]
fn value_stays_in_place() {
    let mut proxy = sorted(vec![10, 20, 30]);
    let changes = record(&mut proxy);

    proxy.source_data_changed(1, 1, vec![10, 25, 30]);

    assert_eq!(rows(&proxy), [10, 25, 30]);
    assert_eq!(*changes.borrow(), [ViewChange::DataChanged { first: 1, last: 1 }]);
}

#[test]
fn scattered_changed_rows() {
    // View order is [1, 2, 5, 6], backed by source indices [0, 2, 1, 3].
    let mut proxy = sorted(vec![1, 5, 2, 6]);
    let changes = record(&mut proxy);

    proxy.source_data_changed(0, 1, vec![1, 5, 2, 6]);

    assert_eq!(
        *changes.borrow(),
        [
            ViewChange::DataChanged { first: 0, last: 0 },
            ViewChange::DataChanged { first: 2, last: 2 },
        ]
    );
}

#[test]
fn unsorted() {
    let mut proxy = SortProxy::with_source(vec![3, 2, 1]);
    let changes = record(&mut proxy);

    proxy.source_data_changed(0, 2, vec![1, 2, 3]);

    assert_eq!(rows(&proxy), [1, 2, 3]);
    assert_eq!(*changes.borrow(), [ViewChange::DataChanged { first: 0, last: 2 }]);
}

#[test]
fn descending() {
    let mut proxy = SortProxy::with_source(vec![1, 2, 3]);
    proxy.set_sort_key(by_value(), SortOrder::Descending, CaseSensitivity::Sensitive);
    assert_eq!(rows(&proxy), [3, 2, 1]);
    let changes = record(&mut proxy);

    proxy.source_data_changed(0, 0, vec![4, 2, 3]);

    assert_eq!(rows(&proxy), [4, 3, 2]);
    assert_eq!(moves(&changes.borrow()), [(0, 1, 3)]);
    assert_eq!(changes.borrow().last(), Some(&ViewChange::DataChanged { first: 0, last: 0 }));
}
