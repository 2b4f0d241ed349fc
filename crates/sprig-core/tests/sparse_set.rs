//! Generational arena behavior: slot reuse, stale handle detection and
//! iteration over live values.

use sprig_core::alloc::sparse_set::{IndexSlot, SparseSet};

#[test]
fn push_get_and_mutate() {
    let mut set = SparseSet::new();
    let a = set.push(42);
    let b = set.push(100);

    *set.get_mut(b) += 1;

    assert_eq!(*set.get(a), 42);
    assert_eq!(*set.get(b), 101);
    assert_eq!(set.len(), 2);
}

#[test]
fn removed_slot_is_reused_with_new_generation() {
    let mut set = SparseSet::new();
    let first = set.push("first");
    let _second = set.push("second");

    assert_eq!(set.remove(first), "first");
    let third = set.push("third");

    assert_eq!(third.index(), first.index());
    assert_eq!(third.generation(), first.generation() + 1);
    assert_eq!(set.try_get(first), None);
    assert_eq!(set.try_get(third), Some(&"third"));
}

#[test]
fn try_get_out_of_range_is_none() {
    let set = SparseSet::<i32>::new();
    assert_eq!(set.try_get(IndexSlot::new(0, 999)), None);
    assert!(!set.contains(IndexSlot::new(0, 0)));
}

#[test]
fn try_remove_twice_returns_none() {
    let mut set = SparseSet::new();
    let idx = set.push(1);
    assert_eq!(set.try_remove(idx), Some(1));
    assert_eq!(set.try_remove(idx), None);
    assert!(set.is_empty());
}

#[test]
#[should_panic(expected = "invalid generation")]
fn get_after_remove_panics() {
    let mut set = SparseSet::new();
    let idx = set.push(42);
    set.remove(idx);
    let _ = set.get(idx);
}

#[test]
#[should_panic(expected = "invalid generation")]
fn get_mut_after_remove_panics() {
    let mut set = SparseSet::new();
    let idx = set.push(42);
    set.remove(idx);
    let _ = set.get_mut(idx);
}

#[test]
fn clear_invalidates_every_handle() {
    let mut set = SparseSet::with_capacity(8);
    let handles: Vec<_> = (0..4).map(|i| set.push(i)).collect();

    set.clear();

    assert_eq!(set.len(), 0);
    assert!(handles.iter().all(|h| set.try_get(*h).is_none()));
    let fresh = set.push(9);
    assert_eq!(*set.get(fresh), 9);
}

#[test]
fn iteration_follows_slot_order_and_skips_holes() {
    let mut set = SparseSet::new();
    set.push(10);
    let middle = set.push(20);
    set.push(30);
    set.remove(middle);

    for v in set.iter_mut() {
        *v *= 2;
    }

    let values: Vec<_> = set.iter().copied().collect();
    assert_eq!(values, vec![20, 60]);
}

#[test]
fn churn_keeps_length_consistent() {
    let mut set = SparseSet::new();
    let handles: Vec<_> = (0..100).map(|i| set.push(i)).collect();
    for h in handles.iter().step_by(2) {
        set.remove(*h);
    }
    assert_eq!(set.len(), 50);

    for i in 100..150 {
        set.push(i);
    }
    assert_eq!(set.len(), 100);
    assert_eq!(set.iter().count(), 100);
}
