#![allow(missing_docs)]

use std::{cell::RefCell, rc::Rc};

use imbl::Vector;
use sortview::{SortKey, SortProxy, SortValue, SourceRows, ViewChange};

mod data_changed;
mod random;
mod reorder;

fn by_value() -> SortKey<i32> {
    SortKey::new(|value: &i32| SortValue::from(*value))
}

fn rows<S>(proxy: &SortProxy<S>) -> Vec<S::Item>
where
    S: SourceRows,
    S::Item: Clone,
{
    proxy.rows().cloned().collect()
}

/// Record every change the proxy reports from now on.
fn record<S>(proxy: &mut SortProxy<S>) -> Rc<RefCell<Vec<ViewChange>>>
where
    S: SourceRows + 'static,
{
    let changes = Rc::new(RefCell::new(Vec::new()));
    proxy.subscribe({
        let changes = changes.clone();
        move |_, change| changes.borrow_mut().push(*change)
    });
    changes
}

/// Keep a copy of the view's rows up to date using nothing but the reported
/// changes, the way a list widget would.
fn mirror(proxy: &mut SortProxy<Vector<i32>>) -> Rc<RefCell<Vec<i32>>> {
    let mirror = Rc::new(RefCell::new(rows(proxy)));
    proxy.subscribe({
        let mirror = mirror.clone();
        move |view, change| {
            let mut mirror = mirror.borrow_mut();
            match *change {
                ViewChange::RowsMoved { first, last, dest } => {
                    move_block(&mut mirror, first, last, dest);
                }
                ViewChange::RowsInserted { first, last } => {
                    for row in first..=last {
                        mirror.insert(row, *view.data(row).unwrap());
                    }
                }
                ViewChange::RowsRemoved { first, last } => {
                    mirror.drain(first..=last);
                }
                ViewChange::DataChanged { first, last } => {
                    for row in first..=last {
                        mirror[row] = *view.data(row).unwrap();
                    }
                }
                ViewChange::Reset => {
                    *mirror = view.rows().copied().collect();
                }
                ViewChange::RowsAboutToBeMoved { .. }
                | ViewChange::RowsAboutToBeInserted { .. }
                | ViewChange::RowsAboutToBeRemoved { .. }
                | ViewChange::AboutToReset => {}
            }
        }
    });
    mirror
}

fn move_block<T>(values: &mut [T], first: usize, last: usize, dest: usize) {
    let len = last - first + 1;
    if dest < first {
        values[dest..=last].rotate_right(len);
    } else {
        values[first..dest].rotate_left(len);
    }
}

fn moves(changes: &[ViewChange]) -> Vec<(usize, usize, usize)> {
    changes
        .iter()
        .filter_map(|change| match *change {
            ViewChange::RowsMoved { first, last, dest } => Some((first, last, dest)),
            _ => None,
        })
        .collect()
}
