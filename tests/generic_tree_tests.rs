//! Generic tests for all SearchTree implementations
//!
//! These tests only use the trait interface, so the B-Tree and the Red-Black
//! Tree are held to the same ordered behavior. Equal keys differ (the B-Tree
//! replaces, the Red-Black Tree keeps both) and are tested per tree below.

use rust_balanced_collections::btree::BTree;
use rust_balanced_collections::red_black::RedBlackTree;
use rust_balanced_collections::SearchTree;

// Test helpers that work with any SearchTree implementation

/// Test that an empty tree behaves correctly
fn test_empty_tree<T: SearchTree<i32>>() {
    let mut tree = T::new();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.search(&1), None);
    assert_eq!(tree.remove(&1), None);
    assert_eq!(tree.minimum(), None);
    assert_eq!(tree.maximum(), None);
    assert!(tree.validate());
}

/// Test basic insert and search
fn test_basic_operations<T: SearchTree<i32>>() {
    let mut tree = T::new();
    for key in [5, 1, 10, 3] {
        assert_eq!(tree.insert(key), None);
    }

    assert!(!tree.is_empty());
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.search(&3), Some(&3));
    assert_eq!(tree.search(&4), None);
    assert!(tree.contains(&10));
    assert!(!tree.contains(&11));
    assert_eq!(tree.minimum(), Some(&1));
    assert_eq!(tree.maximum(), Some(&10));
    assert!(tree.validate());
}

/// Test that a single key builds a one-level tree
fn test_single_element<T: SearchTree<i32>>() {
    let mut tree = T::new();
    tree.insert(42);
    assert_eq!(tree.height(), 1);
    assert_eq!(tree.minimum(), tree.maximum());
    assert_eq!(tree.remove(&42), Some(42));
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert!(tree.validate());
}

/// Test that removing a missing key leaves the tree untouched
fn test_remove_missing<T: SearchTree<i32>>() {
    let mut tree = T::new();
    for key in (0..40).step_by(2) {
        tree.insert(key);
    }
    let height = tree.height();
    for key in (1..40).step_by(2) {
        assert_eq!(tree.remove(&key), None);
    }
    assert_eq!(tree.len(), 20);
    assert_eq!(tree.height(), height);
    assert!(tree.validate());
}

/// Test ascending insertion
fn test_ascending_insertion<T: SearchTree<i32>>() {
    let mut tree = T::new();
    for key in 0..500 {
        tree.insert(key);
    }
    assert_eq!(tree.len(), 500);
    assert_eq!(tree.minimum(), Some(&0));
    assert_eq!(tree.maximum(), Some(&499));
    // Both trees stay within twice the optimal binary height
    assert!(tree.height() <= 18);
    assert!(tree.validate());
}

/// Test descending insertion
fn test_descending_insertion<T: SearchTree<i32>>() {
    let mut tree = T::new();
    for key in (0..500).rev() {
        tree.insert(key);
    }
    assert_eq!(tree.len(), 500);
    assert!(tree.height() <= 18);
    assert!(tree.validate());
}

/// Test insertion in a scrambled order
fn test_random_order_insertion<T: SearchTree<i32>>() {
    let mut tree = T::new();
    // 7919 is prime, so this visits every residue once
    for i in 0..1000 {
        tree.insert((i * 7919) % 1000);
    }
    assert_eq!(tree.len(), 1000);
    for key in 0..1000 {
        assert_eq!(tree.search(&key), Some(&key));
    }
    assert!(tree.validate());
}

/// Test removing every key, alternating from both ends
fn test_remove_from_both_ends<T: SearchTree<i32>>() {
    let mut tree = T::new();
    for key in 0..100 {
        tree.insert(key);
    }
    let (mut low, mut high) = (0, 99);
    while low <= high {
        assert_eq!(tree.remove(&low), Some(low));
        let next = low + 1;
        assert_eq!(tree.minimum(), Some(&next));
        if low < high {
            assert_eq!(tree.remove(&high), Some(high));
        }
        assert!(tree.validate());
        low += 1;
        high -= 1;
    }
    assert!(tree.is_empty());
}

/// Test interleaved inserts and removes
fn test_alternating_operations<T: SearchTree<i32>>() {
    let mut tree = T::new();
    for i in 0..300 {
        tree.insert(i);
        tree.insert(i + 1000);
        if i % 3 == 0 {
            assert_eq!(tree.remove(&(i + 1000)), Some(i + 1000));
        }
    }
    assert_eq!(tree.len(), 500);
    assert_eq!(tree.maximum(), Some(&1299));
    assert!(tree.validate());
}

/// Test negative keys
fn test_negative_keys<T: SearchTree<i32>>() {
    let mut tree = T::new();
    for key in [234, 23, 245, 675, 43, -24, -578, -3, 6, 0, 2342] {
        tree.insert(key);
    }
    assert_eq!(tree.minimum(), Some(&-578));
    assert_eq!(tree.maximum(), Some(&2342));
    assert_eq!(tree.remove(&-3), Some(-3));
    assert_eq!(tree.search(&-3), None);
    assert!(tree.validate());
}

// Macro to generate a single test function
macro_rules! tree_test {
    ($name:ident, $tree:ty, $func:ident) => {
        #[test]
        fn $name() {
            $func::<$tree>();
        }
    };
}

macro_rules! define_tree_tests {
    ($module:ident, $tree:ty) => {
        mod $module {
            use super::*;

            tree_test!(empty_tree, $tree, test_empty_tree);
            tree_test!(basic_operations, $tree, test_basic_operations);
            tree_test!(single_element, $tree, test_single_element);
            tree_test!(remove_missing, $tree, test_remove_missing);
            tree_test!(ascending_insertion, $tree, test_ascending_insertion);
            tree_test!(descending_insertion, $tree, test_descending_insertion);
            tree_test!(random_order_insertion, $tree, test_random_order_insertion);
            tree_test!(remove_from_both_ends, $tree, test_remove_from_both_ends);
            tree_test!(alternating_operations, $tree, test_alternating_operations);
            tree_test!(negative_keys, $tree, test_negative_keys);
        }
    };
}

define_tree_tests!(btree, BTree<i32>);
define_tree_tests!(red_black, RedBlackTree<i32>);

#[test]
fn btree_duplicate_insert_replaces() {
    let mut tree = BTree::new();
    for key in 0..20 {
        tree.insert(key);
    }
    for key in 0..20 {
        assert_eq!(SearchTree::insert(&mut tree, key), Some(key));
    }
    assert_eq!(tree.len(), 20);
    assert!(tree.validate());
}

#[test]
fn red_black_duplicate_insert_keeps_both() {
    let mut tree: RedBlackTree<i32> = SearchTree::new();
    for key in 0..20 {
        assert_eq!(SearchTree::insert(&mut tree, key), None);
    }
    for key in 0..20 {
        assert_eq!(SearchTree::insert(&mut tree, key), None);
    }
    assert_eq!(tree.len(), 40);
    assert!(tree.validate());

    for key in 0..20 {
        assert_eq!(SearchTree::remove(&mut tree, &key), Some(key));
        assert_eq!(tree.search(&key), Some(&key));
    }
    assert_eq!(tree.len(), 20);
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), (0..20).collect::<Vec<_>>());
    assert!(tree.validate());
}
