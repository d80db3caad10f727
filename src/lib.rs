//! Balanced Collections for Rust
//!
//! This crate provides implementations of classic invariant-maintaining data
//! structures, with every node kept in a generational arena instead of behind
//! pointers.
//!
//! # Features
//!
//! - **B-Tree**: multiway search tree of configurable minimum degree; O(log n) search, insert and delete with single-pass top-down splitting and rebalancing
//! - **Red-Black Tree**: binary search tree balanced by node coloring; O(log n) search, insert and delete, with handles that survive rebalancing
//! - **Fibonacci Heap**: O(1) amortized insert and decrease_key; union splices the root rings in O(1) after moving the other heap's nodes into this arena in O(m); O(log n) amortized extract-min and delete
//!
//! Every structure exposes `check_invariants()`/`validate()`, which walk the
//! whole structure and report the first broken invariant.
//!
//! # Example
//!
//! ```rust
//! use rust_balanced_collections::fibonacci::FibonacciHeap;
//! use rust_balanced_collections::red_black::RedBlackTree;
//! use rust_balanced_collections::btree::BTree;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle = heap.insert(5);
//! heap.insert(3);
//! heap.decrease_key(&handle, 1).unwrap();
//! assert_eq!(heap.minimum(), Some(&1));
//!
//! let tree: RedBlackTree<i32> = (0..10).collect();
//! assert!(tree.validate());
//!
//! let mut btree = BTree::with_degree(3).unwrap();
//! btree.extend([4, 2, 9]);
//! assert_eq!(btree.to_string(), "BTree=[2,4,9]");
//! ```

pub mod btree;
pub mod config;
pub mod fibonacci;
pub mod red_black;
pub mod storage;
pub mod traits;

// Re-export the main traits and error types for convenience
pub use storage::NodeHandle;
pub use traits::{Handle, Heap, HeapError, InvariantViolation, SearchTree, TreeError};
