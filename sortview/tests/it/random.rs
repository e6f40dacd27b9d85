use futures_util::{FutureExt, StreamExt};
use imbl::Vector;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sortview::{CaseSensitivity, SortKey, SortOrder, SortProxy};
use sortview_source::ObservableList;

use crate::{by_value, mirror, rows};

fn is_ordered(values: &[i32], order: SortOrder) -> bool {
    values.windows(2).all(|pair| match order {
        SortOrder::Ascending => pair[0] <= pair[1],
        SortOrder::Descending => pair[0] >= pair[1],
    })
}

fn random_values(rng: &mut StdRng, max_len: usize) -> Vector<i32> {
    let len = rng.gen_range(1..=max_len);
    (0..len).map(|_| rng.gen_range(-20..20)).collect()
}

#[test]
fn random_changes() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut list = ObservableList::new();
        let mut sub = list.subscribe();
        let mut proxy = SortProxy::with_source(Vector::new());
        let key = by_value();
        let mut order = SortOrder::Ascending;
        proxy.set_sort_key(key.clone(), order, CaseSensitivity::Sensitive);
        let mirror = mirror(&mut proxy);

        for _ in 0..200 {
            let len = list.len();
            match rng.gen_range(0..10) {
                0..=2 => {
                    let index = rng.gen_range(0..=len);
                    let values = random_values(&mut rng, 4);
                    list.insert_many(index, values);
                }
                3 | 4 if len > 0 => {
                    let first = rng.gen_range(0..len);
                    let last = rng.gen_range(first..len.min(first + 4));
                    list.remove_range(first..=last);
                }
                5 | 6 if len > 0 => {
                    let first = rng.gen_range(0..len);
                    let last = rng.gen_range(first..len.min(first + 3));
                    let value = rng.gen_range(-20..20);
                    list.update_range(first..=last, |v| *v = value);
                }
                7 if len > 0 => {
                    let mut txn = list.transaction();
                    txn.push_front(rng.gen_range(-20..20));
                    txn.remove_range(len..);
                    txn.commit();
                }
                8 => {
                    order = match order {
                        SortOrder::Ascending => SortOrder::Descending,
                        SortOrder::Descending => SortOrder::Ascending,
                    };
                    proxy.set_sort_key(key.clone(), order, CaseSensitivity::Sensitive);
                }
                _ => {
                    let values = random_values(&mut rng, 3);
                    list.append(values);
                }
            }

            while let Some(Some(update)) = sub.next().now_or_never() {
                proxy.apply(update);
            }

            let rows = rows(&proxy);
            assert_eq!(rows.len(), list.len());
            assert!(proxy.permutation().is_bijection());
            assert!(is_ordered(&rows, order), "seed {seed}: {rows:?} is not {order:?}");
            assert_eq!(*mirror.borrow(), rows, "seed {seed}");
            for (row, &index) in proxy.permutation().iter().enumerate() {
                assert_eq!(proxy.map_from_source(index), Some(row));
            }
        }
    }
}

#[test]
fn random_resorts_keep_ties_in_view_order() {
    let mut rng = StdRng::seed_from_u64(42);
    let source: Vec<(i32, i32)> =
        (0..40).map(|_| (rng.gen_range(0..5), rng.gen_range(0..5))).collect();
    let by_first = SortKey::new(|row: &(i32, i32)| row.0.into());
    let by_second = SortKey::new(|row: &(i32, i32)| row.1.into());

    let mut proxy = SortProxy::with_source(source);
    proxy.set_sort_key(by_first, SortOrder::Ascending, CaseSensitivity::Sensitive);
    let before = rows(&proxy);

    proxy.set_sort_key(by_second, SortOrder::Ascending, CaseSensitivity::Sensitive);
    let after = rows(&proxy);

    let mut expected = before;
    expected.sort_by_key(|row| row.1);
    assert_eq!(after, expected);
}
