//! Common traits and error types for the collections in this crate
//!
//! Two operation surfaces are provided:
//!
//! - [`SearchTree`]: ordered search surface shared by [`BTree`](crate::btree::BTree)
//!   and [`RedBlackTree`](crate::red_black::RedBlackTree)
//! - [`Heap`]: priority queue surface with handle-based `decrease_key` and
//!   `delete`, implemented by [`FibonacciHeap`](crate::fibonacci::FibonacciHeap)
//!
//! Lookups that miss and queries on empty structures return `None`; they are
//! expected outcomes, not errors. Caller mistakes (stale handles, increasing
//! a key through `decrease_key`) are reported through [`TreeError`] and
//! [`HeapError`] before anything is mutated. Structural corruption is only
//! ever reported by the `check_invariants` diagnostics as an
//! [`InvariantViolation`].

use std::fmt;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The new key is greater than the current key
    KeyIncreased,
    /// The handle does not name a live element of this heap
    InvalidHandle,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::KeyIncreased => {
                write!(f, "new key is greater than the current key")
            }
            HeapError::InvalidHandle => {
                write!(f, "handle is no longer valid for this heap")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// Error type for handle-based tree operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The handle was issued by a different tree
    ForeignHandle,
    /// The handle's node has already been removed from this tree
    StaleHandle,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::ForeignHandle => write!(f, "handle belongs to a different tree"),
            TreeError::StaleHandle => write!(f, "handle refers to a node that was already removed"),
        }
    }
}

impl std::error::Error for TreeError {}

/// Description of the first structural invariant found broken
///
/// Only produced by `check_invariants`; a correct implementation never
/// returns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node holds a number of keys outside its allowed range
    KeyCount {
        depth: usize,
        found: usize,
        min: usize,
        max: usize,
    },
    /// An internal node's child count is not its key count plus one
    ChildCount { depth: usize, keys: usize, children: usize },
    /// Leaves were found at different depths
    UnevenLeaves { expected: usize, found: usize },
    /// Keys are not strictly increasing in symmetric order
    Unordered,
    /// The cached length disagrees with the number of stored keys
    LengthMismatch { recorded: usize, counted: usize },
    /// The cached height disagrees with the measured height
    HeightMismatch { recorded: usize, measured: usize },
    /// The root of a red-black tree is red
    RedRoot,
    /// A red node has a red child
    RedRedEdge,
    /// Two paths from the same node cross different numbers of black nodes
    BlackHeightMismatch { left: usize, right: usize },
    /// A parent/child or sibling link does not point back consistently
    BrokenLink,
    /// A child's key is smaller than its parent's key
    HeapOrder,
    /// A node's recorded degree differs from its number of children
    DegreeMismatch { recorded: usize, counted: usize },
    /// A root of the heap forest is marked
    MarkedRoot,
    /// The cached minimum does not name the smallest root
    StaleMinimum,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::KeyCount { depth, found, min, max } => write!(
                f,
                "node at depth {depth} holds {found} keys, expected {min}..={max}"
            ),
            InvariantViolation::ChildCount { depth, keys, children } => write!(
                f,
                "node at depth {depth} has {keys} keys but {children} children"
            ),
            InvariantViolation::UnevenLeaves { expected, found } => {
                write!(f, "leaf at depth {found}, expected every leaf at depth {expected}")
            }
            InvariantViolation::Unordered => write!(f, "keys are not in strictly increasing order"),
            InvariantViolation::LengthMismatch { recorded, counted } => {
                write!(f, "recorded length {recorded} but counted {counted} keys")
            }
            InvariantViolation::HeightMismatch { recorded, measured } => {
                write!(f, "recorded height {recorded} but measured {measured}")
            }
            InvariantViolation::RedRoot => write!(f, "root is red"),
            InvariantViolation::RedRedEdge => write!(f, "red node has a red child"),
            InvariantViolation::BlackHeightMismatch { left, right } => {
                write!(f, "black-height differs between subtrees ({left} vs {right})")
            }
            InvariantViolation::BrokenLink => write!(f, "inconsistent node links"),
            InvariantViolation::HeapOrder => write!(f, "child key is smaller than its parent key"),
            InvariantViolation::DegreeMismatch { recorded, counted } => {
                write!(f, "recorded degree {recorded} but node has {counted} children")
            }
            InvariantViolation::MarkedRoot => write!(f, "root of the forest is marked"),
            InvariantViolation::StaleMinimum => write!(f, "cached minimum is not the smallest root"),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// A handle to an element, used for node-addressed operations
///
/// Handles are plain values. Using one with a structure that did not issue
/// it, or after its element was removed, is detected and reported as an
/// error rather than touching unrelated nodes.
pub trait Handle: Clone + PartialEq + Eq {}

/// Ordered search operations shared by the search trees
///
/// Each tree decides what an equal key does: [`BTree`](crate::btree::BTree)
/// replaces the stored key, while
/// [`RedBlackTree`](crate::red_black::RedBlackTree) keeps both.
///
/// # Example
///
/// ```rust
/// use rust_balanced_collections::SearchTree;
/// use rust_balanced_collections::btree::BTree;
///
/// let mut tree = BTree::new();
/// tree.insert(3);
/// tree.insert(1);
/// tree.insert(2);
///
/// assert_eq!(tree.search(&2), Some(&2));
/// assert_eq!(tree.minimum(), Some(&1));
/// assert_eq!(tree.remove(&3), Some(3));
/// assert!(tree.validate());
/// ```
pub trait SearchTree<K: Ord> {
    /// Creates a new empty tree
    fn new() -> Self;

    /// Returns the number of keys in the tree
    fn len(&self) -> usize;

    /// Returns true if the tree holds no keys
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of node levels; 0 for an empty tree
    fn height(&self) -> usize;

    /// Inserts `key`, returning the stored key it replaced, if any
    ///
    /// Trees that keep equal keys always return `None`.
    ///
    /// # Time Complexity
    /// O(log n)
    fn insert(&mut self, key: K) -> Option<K>;

    /// Looks up the stored key equal to `key`
    fn search(&self, key: &K) -> Option<&K>;

    /// Returns true if a key equal to `key` is stored
    fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Removes the key equal to `key` and returns it
    ///
    /// # Time Complexity
    /// O(log n)
    fn remove(&mut self, key: &K) -> Option<K>;

    /// Smallest stored key
    fn minimum(&self) -> Option<&K>;

    /// Largest stored key
    fn maximum(&self) -> Option<&K>;

    /// Walks the whole structure and reports the first broken invariant
    fn check_invariants(&self) -> Result<(), InvariantViolation>;

    /// Returns true if every structural invariant holds
    fn validate(&self) -> bool {
        self.check_invariants().is_ok()
    }
}

/// Mergeable min-heap with handle-based updates
///
/// # Example
///
/// ```rust
/// use rust_balanced_collections::Heap;
/// use rust_balanced_collections::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.push(10);
/// heap.push(7);
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some(&5));
/// assert_eq!(heap.pop(), Some(5));
/// ```
pub trait Heap<K: Ord> {
    /// The handle type for this heap
    type Handle: Handle;

    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts a key, returning a handle to it
    ///
    /// # Time Complexity
    /// O(1) amortized for the Fibonacci heap.
    fn push(&mut self, key: K) -> Self::Handle;

    /// Returns the minimum key without removing it
    fn peek(&self) -> Option<&K>;

    /// Removes and returns the minimum key
    ///
    /// # Time Complexity
    /// O(log n) amortized.
    fn pop(&mut self) -> Option<K>;

    /// Merges another heap into this one, consuming the other heap
    ///
    /// # Time Complexity
    /// O(m) for [`FibonacciHeap`](crate::fibonacci::FibonacciHeap), with
    /// `m = other.len()`: the other heap's nodes move into this heap's arena
    /// before the root rings are spliced in O(1). Handles issued by the other
    /// heap stop resolving.
    fn merge(&mut self, other: Self);

    /// Lowers the key of the element named by `handle`
    ///
    /// # Errors
    /// Returns `HeapError::KeyIncreased` if `new_key` is greater than the
    /// current key, and `HeapError::InvalidHandle` if the handle does not
    /// name a live element of this heap. The heap is unchanged on error.
    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError>;

    /// Removes the element named by `handle` and returns its key
    ///
    /// # Errors
    /// Returns `HeapError::InvalidHandle` if the handle does not name a live
    /// element of this heap.
    fn delete(&mut self, handle: &Self::Handle) -> Result<K, HeapError>;
}
