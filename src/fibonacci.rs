//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert and decrease_key
//! - O(log n) amortized extract_min and delete
//! - O(m) union for an `m`-element heap: its nodes move into this heap's
//!   arena, then the root rings are spliced in O(1)
//!
//! The structure consists of a collection of heap-ordered trees. Roots are linked
//! in a circular doubly linked list, as are the children of every node. The heap
//! maintains the key of the minimum root.
//!
//! Nodes live in an [`Arena`]; ring, parent and child links are [`NodeKey`]s.
//! [`insert`](FibonacciHeap::insert) returns a [`NodeHandle`] used by
//! [`decrease_key`](FibonacciHeap::decrease_key) and
//! [`delete`](FibonacciHeap::delete).

use crate::storage::{Arena, NodeHandle, NodeKey};
use crate::traits::{Heap, HeapError, InvariantViolation};
use slotmap::SecondaryMap;
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::mem;

const TRACE_TARGET: &str = "balanced_collections::fibonacci";

#[derive(Clone)]
struct Node<K> {
    key: K,
    parent: Option<NodeKey>,
    child: Option<NodeKey>,
    left: NodeKey,
    right: NodeKey,
    degree: usize,
    marked: bool,
}

/// Fibonacci Heap
///
/// # Example
///
/// ```rust
/// use rust_balanced_collections::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5);
/// heap.insert(3);
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.minimum(), Some(&1));
/// assert_eq!(heap.extract_min(), Some(1));
/// assert_eq!(heap.extract_min(), Some(3));
/// ```
#[derive(Clone)]
pub struct FibonacciHeap<K> {
    arena: Arena<Node<K>>,
    min: Option<NodeKey>,
    len: usize,
}

impl<K: Ord> FibonacciHeap<K> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            min: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.min = None;
        self.len = 0;
    }

    /// Inserts a key as a new singleton root
    ///
    /// **Time Complexity**: O(1)
    pub fn insert(&mut self, key: K) -> NodeHandle {
        let node = self.arena.insert_with_key(|node| Node {
            key,
            parent: None,
            child: None,
            left: node,
            right: node,
            degree: 0,
            marked: false,
        });
        self.add_root(node);
        self.len += 1;
        self.arena.handle(node)
    }

    /// Smallest key in the heap
    ///
    /// **Time Complexity**: O(1)
    pub fn minimum(&self) -> Option<&K> {
        self.min.map(|min| &self.arena[min].key)
    }

    /// Reads the key of the element named by `handle`
    pub fn get(&self, handle: &NodeHandle) -> Option<&K> {
        let node = self.arena.resolve(handle).ok()?;
        Some(&self.arena[node].key)
    }

    /// Removes and returns the smallest key
    ///
    /// **Time Complexity**: O(log n) amortized
    ///
    /// **Algorithm**:
    /// 1. Move every child of the minimum root into the root ring
    /// 2. Unlink the minimum root
    /// 3. Consolidate the root ring so that no two roots share a degree
    pub fn extract_min(&mut self) -> Option<K> {
        let min = self.min?;

        if let Some(child) = self.arena[min].child.take() {
            for node in self.ring(child) {
                let node = &mut self.arena[node];
                node.parent = None;
                node.marked = false;
            }
            self.arena[min].degree = 0;
            self.concat_rings(min, child);
        }

        let next = self.arena[min].right;
        if next == min {
            self.min = None;
        } else {
            self.unlink(min);
            self.consolidate(next);
        }

        self.len -= 1;
        self.arena.remove(min).map(|node| node.key)
    }

    /// Lowers the key of the element named by `handle`
    ///
    /// **Time Complexity**: O(1) amortized
    ///
    /// **Algorithm**:
    /// 1. Replace the key in place
    /// 2. If the node is now smaller than its parent, cut it to the root ring
    /// 3. Cascade up the ancestors: a marked ancestor is cut as well, the first
    ///    unmarked one is marked and ends the walk
    ///
    /// # Errors
    /// `HeapError::InvalidHandle` for a handle that does not name a live
    /// element of this heap; `HeapError::KeyIncreased` if `new_key` is greater
    /// than the current key. The heap is unchanged on error.
    pub fn decrease_key(&mut self, handle: &NodeHandle, new_key: K) -> Result<(), HeapError> {
        let node = self
            .arena
            .resolve(handle)
            .map_err(|_| HeapError::InvalidHandle)?;
        if new_key > self.arena[node].key {
            return Err(HeapError::KeyIncreased);
        }
        self.arena[node].key = new_key;

        if let Some(parent) = self.arena[node].parent {
            if self.arena[node].key < self.arena[parent].key {
                self.cut(node);
                self.cascading_cut(parent);
            }
        }

        if let Some(min) = self.min {
            if self.arena[node].key < self.arena[min].key {
                self.min = Some(node);
            }
        }
        Ok(())
    }

    /// Removes the element named by `handle` and returns its key
    ///
    /// The node is cut to the root ring as if its key had dropped below the
    /// minimum, then extracted.
    ///
    /// **Time Complexity**: O(log n) amortized
    ///
    /// # Errors
    /// `HeapError::InvalidHandle` for a handle that does not name a live
    /// element of this heap.
    pub fn delete(&mut self, handle: &NodeHandle) -> Result<K, HeapError> {
        let node = self
            .arena
            .resolve(handle)
            .map_err(|_| HeapError::InvalidHandle)?;
        if let Some(parent) = self.arena[node].parent {
            self.cut(node);
            self.cascading_cut(parent);
        }
        self.min = Some(node);
        self.extract_min().ok_or(HeapError::InvalidHandle)
    }

    /// Moves every element of `other` into this heap
    ///
    /// The root rings are spliced together without consolidation. The nodes
    /// of `other` are re-homed into this heap's arena first, which costs
    /// O(m) for `m = other.len()`; handles issued by `other` no longer
    /// resolve afterwards.
    pub fn union(&mut self, mut other: Self) {
        let Some(other_min) = other.min else {
            return;
        };

        let mut moved: SecondaryMap<NodeKey, NodeKey> = SecondaryMap::with_capacity(other.len);
        let mut placed = Vec::with_capacity(other.len);
        for (old, node) in other.arena.drain() {
            let new = self.arena.insert(node);
            moved.insert(old, new);
            placed.push(new);
        }
        for new in placed {
            let node = &mut self.arena[new];
            node.left = moved[node.left];
            node.right = moved[node.right];
            node.parent = node.parent.map(|parent| moved[parent]);
            node.child = node.child.map(|child| moved[child]);
        }
        let other_min = moved[other_min];

        match self.min {
            None => self.min = Some(other_min),
            Some(min) => {
                self.concat_rings(min, other_min);
                if self.arena[other_min].key < self.arena[min].key {
                    self.min = Some(other_min);
                }
            }
        }
        self.len += mem::take(&mut other.len);
        other.min = None;
    }

    /// Keys in tree order: each root followed by its descendants
    pub fn iter(&self) -> Iter<'_, K> {
        let mut stack = self.min.map(|min| self.ring(min)).unwrap_or_default();
        stack.reverse();
        Iter {
            arena: &self.arena,
            stack,
            remaining: self.len,
        }
    }

    /// Checks ring links, heap order, degrees, marks and the cached minimum
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(min) = self.min else {
            return if self.len == 0 && self.arena.is_empty() {
                Ok(())
            } else {
                Err(InvariantViolation::LengthMismatch {
                    recorded: self.len,
                    counted: self.arena.len(),
                })
            };
        };
        let min_node = self.arena.get(min).ok_or(InvariantViolation::BrokenLink)?;
        if min_node.parent.is_some() {
            return Err(InvariantViolation::StaleMinimum);
        }

        let roots = self.checked_ring(min)?;
        let mut counted = roots.len();
        let mut stack = Vec::with_capacity(roots.len());
        for root in roots {
            let node = &self.arena[root];
            if node.parent.is_some() {
                return Err(InvariantViolation::BrokenLink);
            }
            if node.marked {
                return Err(InvariantViolation::MarkedRoot);
            }
            if node.key < min_node.key {
                return Err(InvariantViolation::StaleMinimum);
            }
            stack.push(root);
        }

        while let Some(current) = stack.pop() {
            let node = &self.arena[current];
            let children = match node.child {
                Some(child) => self.checked_ring(child)?,
                None => Vec::new(),
            };
            if children.len() != node.degree {
                return Err(InvariantViolation::DegreeMismatch {
                    recorded: node.degree,
                    counted: children.len(),
                });
            }
            for child in children {
                let child_node = &self.arena[child];
                if child_node.parent != Some(current) {
                    return Err(InvariantViolation::BrokenLink);
                }
                if child_node.key < node.key {
                    return Err(InvariantViolation::HeapOrder);
                }
                counted += 1;
                if counted > self.arena.len() {
                    return Err(InvariantViolation::BrokenLink);
                }
                stack.push(child);
            }
        }

        if counted != self.len || counted != self.arena.len() {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.len,
                counted,
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> bool {
        self.check_invariants().is_ok()
    }

    /// Adds a detached node to the root ring and updates the minimum
    fn add_root(&mut self, node: NodeKey) {
        match self.min {
            None => {
                self.arena[node].left = node;
                self.arena[node].right = node;
                self.min = Some(node);
            }
            Some(min) => {
                self.splice_before(min, node);
                if self.arena[node].key < self.arena[min].key {
                    self.min = Some(node);
                }
            }
        }
    }

    /// Links trees of equal degree until every root degree is unique
    fn consolidate(&mut self, start: NodeKey) {
        let roots = self.ring(start);
        let roots_before = roots.len();

        // ceil(log2(n + 1)) + 1 buckets; grows if a larger degree turns up
        let buckets = (usize::BITS - self.len.leading_zeros()) as usize + 1;
        let mut by_degree: SmallVec<[Option<NodeKey>; 64]> = smallvec![None; buckets];

        for root in roots {
            let mut x = root;
            let mut degree = self.arena[x].degree;
            loop {
                if degree >= by_degree.len() {
                    by_degree.resize(degree + 1, None);
                }
                let Some(mut y) = by_degree[degree].take() else {
                    break;
                };
                if self.arena[y].key < self.arena[x].key {
                    mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                degree += 1;
            }
            by_degree[degree] = Some(x);
        }

        self.min = None;
        let mut roots_after = 0;
        for root in by_degree.into_iter().flatten() {
            self.add_root(root);
            roots_after += 1;
        }
        tracing::debug!(target: TRACE_TARGET, roots_before, roots_after, "consolidate");
    }

    /// Makes root `y` a child of root `x`
    fn link(&mut self, y: NodeKey, x: NodeKey) {
        self.unlink(y);
        self.arena[y].parent = Some(x);
        self.arena[y].marked = false;

        match self.arena[x].child {
            Some(child) => self.splice_before(child, y),
            None => self.arena[x].child = Some(y),
        }
        self.arena[x].degree += 1;
    }

    /// Cuts `node` from its parent and adds it to the root ring
    fn cut(&mut self, node: NodeKey) {
        let Some(parent) = self.arena[node].parent else {
            return;
        };
        tracing::trace!(target: TRACE_TARGET, degree = self.arena[node].degree, "cut");

        if self.arena[parent].child == Some(node) {
            let next = self.arena[node].right;
            self.arena[parent].child = if next == node { None } else { Some(next) };
        }
        self.unlink(node);
        self.arena[parent].degree -= 1;

        self.arena[node].parent = None;
        self.arena[node].marked = false;
        self.add_root(node);
    }

    /// Walks up from `node`, cutting marked ancestors until an unmarked one
    /// (which gets marked) or a root is reached
    fn cascading_cut(&mut self, mut node: NodeKey) {
        while let Some(parent) = self.arena[node].parent {
            if !self.arena[node].marked {
                self.arena[node].marked = true;
                return;
            }
            tracing::trace!(target: TRACE_TARGET, "cascading cut");
            self.cut(node);
            node = parent;
        }
    }

    /// Inserts `node` to the left of `anchor` in `anchor`'s ring
    fn splice_before(&mut self, anchor: NodeKey, node: NodeKey) {
        let anchor_left = self.arena[anchor].left;
        self.arena[node].right = anchor;
        self.arena[node].left = anchor_left;
        self.arena[anchor_left].right = node;
        self.arena[anchor].left = node;
    }

    /// Removes `node` from its ring, leaving it as a singleton ring
    fn unlink(&mut self, node: NodeKey) {
        let (left, right) = (self.arena[node].left, self.arena[node].right);
        self.arena[left].right = right;
        self.arena[right].left = left;
        self.arena[node].left = node;
        self.arena[node].right = node;
    }

    /// Joins two disjoint rings into one
    fn concat_rings(&mut self, a: NodeKey, b: NodeKey) {
        let a_left = self.arena[a].left;
        let b_left = self.arena[b].left;
        self.arena[a_left].right = b;
        self.arena[b].left = a_left;
        self.arena[b_left].right = a;
        self.arena[a].left = b_left;
    }

    fn ring(&self, start: NodeKey) -> Vec<NodeKey> {
        let mut nodes = vec![start];
        let mut current = self.arena[start].right;
        while current != start {
            nodes.push(current);
            current = self.arena[current].right;
        }
        nodes
    }

    // Ring walk that tolerates corruption: bounded by the arena size
    fn checked_ring(&self, start: NodeKey) -> Result<Vec<NodeKey>, InvariantViolation> {
        let mut nodes = Vec::new();
        let mut current = start;
        loop {
            let node = self.arena.get(current).ok_or(InvariantViolation::BrokenLink)?;
            let right = self.arena.get(node.right).ok_or(InvariantViolation::BrokenLink)?;
            if right.left != current {
                return Err(InvariantViolation::BrokenLink);
            }
            nodes.push(current);
            if nodes.len() > self.arena.len() {
                return Err(InvariantViolation::BrokenLink);
            }
            current = node.right;
            if current == start {
                return Ok(nodes);
            }
        }
    }
}

impl<K: Ord> Default for FibonacciHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Heap<K> for FibonacciHeap<K> {
    type Handle = NodeHandle;

    fn new() -> Self {
        FibonacciHeap::new()
    }

    fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn push(&mut self, key: K) -> Self::Handle {
        self.insert(key)
    }

    fn peek(&self) -> Option<&K> {
        self.minimum()
    }

    fn pop(&mut self) -> Option<K> {
        self.extract_min()
    }

    fn merge(&mut self, other: Self) {
        self.union(other)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError> {
        FibonacciHeap::decrease_key(self, handle, new_key)
    }

    fn delete(&mut self, handle: &Self::Handle) -> Result<K, HeapError> {
        FibonacciHeap::delete(self, handle)
    }
}

impl<K: Ord> FromIterator<K> for FibonacciHeap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut heap = FibonacciHeap::new();
        heap.extend(iter);
        heap
    }
}

impl<K: Ord> Extend<K> for FibonacciHeap<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for FibonacciHeap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FibonacciHeap")
            .field("len", &self.len)
            .field("minimum", &self.minimum())
            .finish()
    }
}

impl<K: Ord + fmt::Display> fmt::Display for FibonacciHeap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FibonacciHeap=[")?;
        for (position, key) in self.iter().enumerate() {
            if position > 0 {
                write!(f, ",")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "]")
    }
}

/// Iterator over the keys of a [`FibonacciHeap`] in tree order
pub struct Iter<'a, K> {
    arena: &'a Arena<Node<K>>,
    stack: Vec<NodeKey>,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let arena = self.arena;
        let current = self.stack.pop()?;
        let node = &arena[current];
        if let Some(child) = node.child {
            let mut children = vec![child];
            let mut sibling = arena[child].right;
            while sibling != child {
                children.push(sibling);
                sibling = arena[sibling].right;
            }
            self.stack.extend(children.into_iter().rev());
        }
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}
