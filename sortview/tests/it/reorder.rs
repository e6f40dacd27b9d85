use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use sortview::{
    reorder::{plan_moves, target_order, BlockMove},
    Permutation, SortKey, SortSpec, SortValue,
};

use crate::move_block;

fn apply(current: &[usize], moves: &[BlockMove]) -> Vec<usize> {
    let mut order = current.to_vec();
    for block in moves {
        assert!(block.is_legal(order.len()), "{block:?}");
        move_block(&mut order, block.first, block.last, block.dest);
    }
    order
}

#[test]
fn nothing_to_do() {
    assert!(plan_moves(&[], &[]).is_empty());
    assert!(plan_moves(&[0, 1, 2], &[0, 1, 2]).is_empty());
}

#[test]
fn rotate_one() {
    let moves = plan_moves(&[0, 1, 2, 3, 4], &[1, 2, 3, 4, 0]);
    assert_eq!(moves, [BlockMove { first: 0, last: 0, dest: 5 }]);
}

#[test]
fn swap_halves() {
    let current = [0, 1, 2, 3, 4, 5];
    let target = [3, 4, 5, 0, 1, 2];

    let moves = plan_moves(&current, &target);

    assert_eq!(moves, [BlockMove { first: 0, last: 2, dest: 6 }]);
    assert_eq!(apply(&current, &moves), target);
}

#[test]
fn reverse() {
    let current = [0, 1, 2, 3];
    let target = [3, 2, 1, 0];

    let moves = plan_moves(&current, &target);

    assert_eq!(moves.len(), 3);
    assert_eq!(apply(&current, &moves), target);
}

#[test]
fn block_move() {
    let block = BlockMove { first: 1, last: 2, dest: 4 };
    assert_eq!(block.row_count(), 2);
    assert!(block.is_legal(4));
    assert!(!block.is_legal(3));
    assert!(!BlockMove { first: 1, last: 2, dest: 3 }.is_legal(4));
    assert!(!BlockMove { first: 1, last: 2, dest: 2 }.is_legal(4));
    assert!(BlockMove { first: 1, last: 2, dest: 0 }.is_legal(4));
    assert!(!BlockMove { first: 2, last: 1, dest: 0 }.is_legal(4));
}

#[test]
fn target_is_stable() {
    let source = vec![2, 1, 2, 1];
    let spec = SortSpec::by(SortKey::new(|value: &i32| SortValue::from(*value)));
    let comparator = spec.comparator(&source);

    assert_eq!(target_order(&[0, 1, 2, 3], &comparator), [1, 3, 0, 2]);
    assert_eq!(target_order(&[2, 3, 0, 1], &comparator), [3, 1, 2, 0]);
}

#[test]
fn shuffled() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for len in [1, 2, 3, 7, 16, 50] {
        for _ in 0..20 {
            let mut current: Vec<usize> = (0..len).collect();
            current.shuffle(&mut rng);
            let mut target = current.clone();
            target.shuffle(&mut rng);

            let moves = plan_moves(&current, &target);

            assert!(moves.len() < len.max(1));
            assert_eq!(apply(&current, &moves), target);
        }
    }
}

#[test]
fn single_row_moves_back() {
    let current = [4, 0, 1, 2, 3, 5, 6];
    let target = [0, 1, 2, 3, 4, 5, 6];

    let moves = plan_moves(&current, &target);

    assert_eq!(moves, [BlockMove { first: 0, last: 0, dest: 5 }]);
    assert_eq!(apply(&current, &moves), target);
}

#[test]
fn permutation() {
    let mut permutation = Permutation::identity(5);
    permutation.move_block(0, 1, 5);
    assert_eq!(permutation.as_slice(), [2, 3, 4, 0, 1]);

    let mut permutation = Permutation::identity(5);
    permutation.move_block(3, 4, 0);
    assert_eq!(permutation.as_slice(), [3, 4, 0, 1, 2]);

    permutation.insert_block(5, &[5, 6]);
    assert_eq!(permutation.as_slice(), [3, 4, 0, 1, 2, 5, 6]);
    assert!(permutation.is_bijection());

    assert_eq!(permutation.remove_block(0, 1), [3, 4]);
    assert!(!permutation.is_bijection());

    permutation.shift_from(5, 10);
    assert_eq!(permutation.as_slice(), [0, 1, 2, 15, 16]);
    assert_eq!(permutation.position_of(15), Some(3));
    assert_eq!(permutation.get(5), None);
    assert_eq!(Vec::<usize>::from(permutation), [0, 1, 2, 15, 16]);
}

#[test]
fn sorted_permutation() {
    let source: Vec<String> = vec!["b".into(), "c".into(), "a".into()];
    let spec = SortSpec::by(SortKey::new(|value: &String| SortValue::from(value.as_str())));

    let permutation = Permutation::sorted(source.len(), &spec.comparator(&source));
    assert_eq!(permutation.as_slice(), [2, 0, 1]);

    let unsorted = SortSpec::unsorted();
    let permutation = Permutation::sorted(source.len(), &unsorted.comparator(&source));
    assert_eq!(permutation, Permutation::identity(3));
}
