//! B-Tree implementation
//!
//! A B-Tree of minimum degree `t` keeps sorted keys in nodes of bounded
//! fan-out:
//! - every node except the root holds between `t - 1` and `2t - 1` keys
//! - an internal node with `k` keys has exactly `k + 1` children
//! - all leaves sit at the same depth
//!
//! This gives O(log n) search, insert and delete. Both mutations run a
//! single top-down pass: insert splits every saturated node *before*
//! descending into it, and delete tops up every minimal node (by borrowing
//! from a sibling or merging with one) *before* descending into it, so
//! neither ever has to walk back up.
//!
//! Nodes live in an [`Arena`] and refer to their children by [`NodeKey`].

use crate::config::{ConfigError, MinDegree};
use crate::storage::{Arena, NodeKey};
use crate::traits::{InvariantViolation, SearchTree};
use std::cmp::Ordering;
use std::fmt;
use std::mem;

const TRACE_TARGET: &str = "balanced_collections::btree";

#[derive(Clone)]
struct Node<K> {
    keys: Vec<K>,
    // Empty for leaves
    children: Vec<NodeKey>,
}

impl<K> Node<K> {
    fn with_capacity(max_keys: usize) -> Self {
        Node {
            keys: Vec::with_capacity(max_keys),
            children: Vec::new(),
        }
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl<K> Default for Node<K> {
    fn default() -> Self {
        Node {
            keys: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// B-Tree ordered set
///
/// # Example
///
/// ```rust
/// use rust_balanced_collections::btree::BTree;
///
/// let mut tree = BTree::with_degree(3).unwrap();
/// for key in [40, 10, 30, 20, 50] {
///     tree.insert(key);
/// }
/// assert_eq!(tree.search(&30), Some(&30));
/// assert_eq!(tree.search(&35), None);
/// assert_eq!(tree.remove(&10), Some(10));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![20, 30, 40, 50]);
/// ```
#[derive(Clone)]
pub struct BTree<K> {
    arena: Arena<Node<K>>,
    root: Option<NodeKey>,
    degree: MinDegree,
    len: usize,
    height: usize,
}

impl<K: Ord> BTree<K> {
    /// Creates an empty tree with the default minimum degree (2)
    pub fn new() -> Self {
        Self::with_min_degree(MinDegree::default())
    }

    /// Creates an empty tree with minimum degree `t`
    ///
    /// # Errors
    /// Returns `ConfigError::DegreeTooSmall` if `t < 2`.
    pub fn with_degree(t: usize) -> Result<Self, ConfigError> {
        Ok(Self::with_min_degree(MinDegree::new(t)?))
    }

    /// Creates an empty tree with an already validated minimum degree
    pub fn with_min_degree(degree: MinDegree) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            degree,
            len: 0,
            height: 0,
        }
    }

    /// The tree's minimum degree `t`
    pub fn degree(&self) -> usize {
        self.degree.get()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of node levels; 0 when empty, 1 for a lone leaf root
    pub fn height(&self) -> usize {
        self.height
    }

    /// Removes every key
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
        self.height = 0;
    }

    /// Looks up the stored key equal to `key`
    ///
    /// **Time Complexity**: O(t log_t n)
    pub fn search(&self, key: &K) -> Option<&K> {
        let mut current = self.root?;
        loop {
            let node = &self.arena[current];
            match node.keys.binary_search(key) {
                Ok(index) => return Some(&node.keys[index]),
                Err(_) if node.is_leaf() => return None,
                Err(index) => current = node.children[index],
            }
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Inserts `key`, returning the equal key it replaced, if any
    ///
    /// **Algorithm**:
    /// 1. Empty tree: the key becomes a one-key leaf root
    /// 2. Saturated root: push a new empty root above it and split the old
    ///    root; this is the only way the tree grows in height
    /// 3. Descend, splitting each saturated child before entering it, and
    ///    place the key in the leaf reached
    pub fn insert(&mut self, key: K) -> Option<K> {
        let max_keys = self.degree.max_keys();

        let mut current = match self.root {
            Some(root) => root,
            None => {
                let mut leaf = Node::with_capacity(max_keys);
                leaf.keys.push(key);
                self.root = Some(self.arena.insert(leaf));
                self.len = 1;
                self.height = 1;
                return None;
            }
        };

        if self.arena[current].keys.len() == max_keys {
            let mut new_root = Node::with_capacity(max_keys);
            new_root.children.push(current);
            let new_root = self.arena.insert(new_root);
            self.split_child(new_root, 0);
            self.root = Some(new_root);
            self.height += 1;
            current = new_root;
            tracing::trace!(target: TRACE_TARGET, height = self.height, "split root");
        }

        loop {
            let mut index = match self.arena[current].keys.binary_search(&key) {
                Ok(index) => {
                    return Some(mem::replace(&mut self.arena[current].keys[index], key));
                }
                Err(index) => index,
            };

            if self.arena[current].is_leaf() {
                self.arena[current].keys.insert(index, key);
                self.len += 1;
                return None;
            }

            let child = self.arena[current].children[index];
            if self.arena[child].keys.len() == max_keys {
                self.split_child(current, index);
                match key.cmp(&self.arena[current].keys[index]) {
                    Ordering::Equal => {
                        return Some(mem::replace(&mut self.arena[current].keys[index], key));
                    }
                    Ordering::Greater => index += 1,
                    Ordering::Less => {}
                }
            }
            current = self.arena[current].children[index];
        }
    }

    /// Removes the key equal to `key` and returns it
    ///
    /// A miss leaves the tree untouched.
    ///
    /// **Algorithm** (single top-down pass):
    /// - key in a leaf: remove it
    /// - key in an internal node: replace it with its predecessor if the
    ///   left child can spare a key, else with its successor if the right
    ///   child can, else merge both children around it and continue in the
    ///   merged node
    /// - key below this node: make sure the child to enter has at least `t`
    ///   keys (borrow from a sibling, or merge with one), then enter it
    ///
    /// When a merge empties the root, its only child becomes the root.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let root = self.root?;
        if !self.contains(key) {
            return None;
        }

        let removed = self.remove_below(root, key);
        if removed.is_some() {
            self.len -= 1;
        }
        self.collapse_root(root);
        removed
    }

    /// Smallest key (leftmost walk)
    pub fn minimum(&self) -> Option<&K> {
        let mut current = self.root?;
        loop {
            let node = &self.arena[current];
            match node.children.first() {
                Some(&child) => current = child,
                None => return node.keys.first(),
            }
        }
    }

    /// Largest key (rightmost walk)
    pub fn maximum(&self) -> Option<&K> {
        let mut current = self.root?;
        loop {
            let node = &self.arena[current];
            match node.children.last() {
                Some(&child) => current = child,
                None => return node.keys.last(),
            }
        }
    }

    /// In-order iterator over the keys
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.arena, self.root, self.len)
    }

    /// Walks every node and reports the first broken invariant
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let root = match self.root {
            Some(root) => root,
            None => {
                if self.len != 0 {
                    return Err(InvariantViolation::LengthMismatch {
                        recorded: self.len,
                        counted: 0,
                    });
                }
                if self.height != 0 {
                    return Err(InvariantViolation::HeightMismatch {
                        recorded: self.height,
                        measured: 0,
                    });
                }
                return Ok(());
            }
        };

        let min_keys = self.degree.min_keys();
        let max_keys = self.degree.max_keys();
        let mut leaf_depth = None;
        let mut counted = 0;
        let mut stack: Vec<(NodeKey, usize, Option<&K>, Option<&K>)> = vec![(root, 1, None, None)];

        while let Some((current, depth, lower, upper)) = stack.pop() {
            let node = match self.arena.get(current) {
                Some(node) => node,
                None => return Err(InvariantViolation::BrokenLink),
            };

            let min = if current == root { 1 } else { min_keys };
            if node.keys.len() < min || node.keys.len() > max_keys {
                return Err(InvariantViolation::KeyCount {
                    depth,
                    found: node.keys.len(),
                    min,
                    max: max_keys,
                });
            }

            if node.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(InvariantViolation::Unordered);
            }
            if let (Some(lower), Some(first)) = (lower, node.keys.first()) {
                if first <= lower {
                    return Err(InvariantViolation::Unordered);
                }
            }
            if let (Some(upper), Some(last)) = (upper, node.keys.last()) {
                if last >= upper {
                    return Err(InvariantViolation::Unordered);
                }
            }
            counted += node.keys.len();

            if node.is_leaf() {
                match leaf_depth {
                    None => leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(InvariantViolation::UnevenLeaves {
                            expected,
                            found: depth,
                        });
                    }
                    Some(_) => {}
                }
                continue;
            }

            if node.children.len() != node.keys.len() + 1 {
                return Err(InvariantViolation::ChildCount {
                    depth,
                    keys: node.keys.len(),
                    children: node.children.len(),
                });
            }
            for (index, &child) in node.children.iter().enumerate() {
                let child_lower = if index == 0 { lower } else { node.keys.get(index - 1) };
                let child_upper = node.keys.get(index).or(upper);
                stack.push((child, depth + 1, child_lower, child_upper));
            }
        }

        if counted != self.len {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.len,
                counted,
            });
        }
        let measured = leaf_depth.unwrap_or(0);
        if measured != self.height {
            return Err(InvariantViolation::HeightMismatch {
                recorded: self.height,
                measured,
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> bool {
        self.check_invariants().is_ok()
    }

    /// Splits the saturated child at `index` of `parent`
    ///
    /// The child keeps its lower `t - 1` keys (and lower `t` children), a new
    /// right sibling takes the upper `t - 1` keys (and upper `t` children),
    /// and the median moves up into `parent` between the two.
    fn split_child(&mut self, parent: NodeKey, index: usize) {
        let t = self.degree.get();
        let child = self.arena[parent].children[index];

        let (median, sibling) = {
            let node = &mut self.arena[child];
            let mut sibling = Node::with_capacity(self.degree.max_keys());
            sibling.keys.extend(node.keys.drain(t..));
            let median = node.keys.remove(t - 1);
            if !node.is_leaf() {
                sibling.children.extend(node.children.drain(t..));
            }
            (median, sibling)
        };

        let sibling = self.arena.insert(sibling);
        let parent = &mut self.arena[parent];
        parent.keys.insert(index, median);
        parent.children.insert(index + 1, sibling);
    }

    /// Deletes `key` from the subtree rooted at `start`
    ///
    /// `start` is either the root or a node already holding at least `t`
    /// keys, so removing one key from it cannot underflow it.
    fn remove_below(&mut self, start: NodeKey, key: &K) -> Option<K> {
        let t = self.degree.get();
        let mut current = start;

        loop {
            let search = self.arena[current].keys.binary_search(key);
            if self.arena[current].is_leaf() {
                return match search {
                    Ok(index) => Some(self.arena[current].keys.remove(index)),
                    Err(_) => None,
                };
            }

            match search {
                Ok(index) => {
                    let left = self.arena[current].children[index];
                    let right = self.arena[current].children[index + 1];

                    if self.arena[left].keys.len() >= t {
                        let predecessor = self.pop_max(left);
                        return Some(mem::replace(
                            &mut self.arena[current].keys[index],
                            predecessor,
                        ));
                    }
                    if self.arena[right].keys.len() >= t {
                        let successor = self.pop_min(right);
                        return Some(mem::replace(
                            &mut self.arena[current].keys[index],
                            successor,
                        ));
                    }
                    self.merge_children(current, index);
                    current = left;
                }
                Err(index) => {
                    let index = self.fill_child(current, index);
                    current = self.arena[current].children[index];
                }
            }
        }
    }

    /// Removes and returns the largest key of the subtree at `start`
    fn pop_max(&mut self, start: NodeKey) -> K {
        let mut current = start;
        loop {
            let node = &mut self.arena[current];
            if node.is_leaf() {
                let last = node.keys.len() - 1;
                return node.keys.remove(last);
            }
            let last = node.children.len() - 1;
            let index = self.fill_child(current, last);
            current = self.arena[current].children[index];
        }
    }

    /// Removes and returns the smallest key of the subtree at `start`
    fn pop_min(&mut self, start: NodeKey) -> K {
        let mut current = start;
        loop {
            let node = &mut self.arena[current];
            if node.is_leaf() {
                return node.keys.remove(0);
            }
            let index = self.fill_child(current, 0);
            current = self.arena[current].children[index];
        }
    }

    /// Ensures the child at `index` of `parent` holds at least `t` keys
    ///
    /// Returns the index of the child that now covers the original child's
    /// key range (it shifts left by one when merged into its left sibling).
    fn fill_child(&mut self, parent: NodeKey, index: usize) -> usize {
        let t = self.degree.get();
        let children = &self.arena[parent].children;
        let child_count = children.len();

        if self.arena[children[index]].keys.len() >= t {
            return index;
        }
        if index > 0 && self.arena[children[index - 1]].keys.len() >= t {
            self.borrow_from_left(parent, index);
            return index;
        }
        if index + 1 < child_count && self.arena[children[index + 1]].keys.len() >= t {
            self.borrow_from_right(parent, index);
            return index;
        }
        if index + 1 < child_count {
            self.merge_children(parent, index);
            index
        } else {
            self.merge_children(parent, index - 1);
            index - 1
        }
    }

    /// Rotates one key (and child) from the left sibling through the parent
    fn borrow_from_left(&mut self, parent: NodeKey, index: usize) {
        let left = self.arena[parent].children[index - 1];
        let child = self.arena[parent].children[index];

        let (key, grandchild) = {
            let node = &mut self.arena[left];
            let last = node.keys.len() - 1;
            (node.keys.remove(last), node.children.pop())
        };
        let separator = mem::replace(&mut self.arena[parent].keys[index - 1], key);

        let node = &mut self.arena[child];
        node.keys.insert(0, separator);
        if let Some(grandchild) = grandchild {
            node.children.insert(0, grandchild);
        }
    }

    /// Rotates one key (and child) from the right sibling through the parent
    fn borrow_from_right(&mut self, parent: NodeKey, index: usize) {
        let right = self.arena[parent].children[index + 1];
        let child = self.arena[parent].children[index];

        let (key, grandchild) = {
            let node = &mut self.arena[right];
            let key = node.keys.remove(0);
            let grandchild = if node.is_leaf() {
                None
            } else {
                Some(node.children.remove(0))
            };
            (key, grandchild)
        };
        let separator = mem::replace(&mut self.arena[parent].keys[index], key);

        let node = &mut self.arena[child];
        node.keys.push(separator);
        if let Some(grandchild) = grandchild {
            node.children.push(grandchild);
        }
    }

    /// Merges child `index + 1` and the separating key into child `index`
    fn merge_children(&mut self, parent: NodeKey, index: usize) {
        let (separator, left, right) = {
            let node = &mut self.arena[parent];
            let separator = node.keys.remove(index);
            let right = node.children.remove(index + 1);
            (separator, node.children[index], right)
        };

        let absorbed = mem::take(&mut self.arena[right]);
        self.arena.remove(right);

        let node = &mut self.arena[left];
        node.keys.push(separator);
        node.keys.extend(absorbed.keys);
        node.children.extend(absorbed.children);
    }

    /// Drops an emptied root, promoting its only child if it has one
    fn collapse_root(&mut self, root: NodeKey) {
        if !self.arena[root].keys.is_empty() {
            return;
        }
        let promoted = self.arena[root].children.first().copied();
        self.arena.remove(root);
        self.root = promoted;
        self.height -= 1;
        tracing::trace!(target: TRACE_TARGET, height = self.height, "collapsed root");
    }
}

impl<K: Ord> Default for BTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> SearchTree<K> for BTree<K> {
    fn new() -> Self {
        BTree::new()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn height(&self) -> usize {
        self.height
    }

    fn insert(&mut self, key: K) -> Option<K> {
        BTree::insert(self, key)
    }

    fn search(&self, key: &K) -> Option<&K> {
        BTree::search(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<K> {
        BTree::remove(self, key)
    }

    fn minimum(&self) -> Option<&K> {
        BTree::minimum(self)
    }

    fn maximum(&self) -> Option<&K> {
        BTree::maximum(self)
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        BTree::check_invariants(self)
    }
}

impl<K: Ord> FromIterator<K> for BTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = BTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for BTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: Ord> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BTree")
            .field("degree", &self.degree.get())
            .field("height", &self.height)
            .field("keys", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<K: Ord + fmt::Display> fmt::Display for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BTree=[")?;
        for (position, key) in self.iter().enumerate() {
            if position > 0 {
                write!(f, ",")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "]")
    }
}

/// In-order iterator over a [`BTree`]
pub struct Iter<'a, K> {
    arena: &'a Arena<Node<K>>,
    // (node, index of the next key to yield from it)
    stack: Vec<(NodeKey, usize)>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn new(arena: &'a Arena<Node<K>>, root: Option<NodeKey>, len: usize) -> Self {
        let mut iter = Iter {
            arena,
            stack: Vec::new(),
            remaining: len,
        };
        if let Some(root) = root {
            iter.descend_left(root);
        }
        iter
    }

    fn descend_left(&mut self, mut current: NodeKey) {
        loop {
            self.stack.push((current, 0));
            match self.arena[current].children.first() {
                Some(&child) => current = child,
                None => break,
            }
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let arena = self.arena;
        loop {
            let (current, index) = *self.stack.last()?;
            let node = &arena[current];
            if index < node.keys.len() {
                if let Some(top) = self.stack.last_mut() {
                    top.1 += 1;
                }
                if let Some(&child) = node.children.get(index + 1) {
                    self.descend_left(child);
                }
                self.remaining -= 1;
                return Some(&node.keys[index]);
            }
            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(tree: &BTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree: BTree<i32> = BTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.search(&1), None);
        assert_eq!(tree.minimum(), None);
        assert_eq!(tree.maximum(), None);
        assert!(tree.validate());
    }

    #[test]
    fn test_rejects_small_degree() {
        assert_eq!(
            BTree::<i32>::with_degree(1).err(),
            Some(ConfigError::DegreeTooSmall(1))
        );
    }

    #[test]
    fn test_root_split_grows_height() {
        let mut tree = BTree::new();
        for key in [1, 2, 3] {
            tree.insert(key);
        }
        assert_eq!(tree.height(), 1);

        tree.insert(4);
        assert_eq!(tree.height(), 2);
        assert_eq!(keys(&tree), vec![1, 2, 3, 4]);
        assert!(tree.validate());
    }

    #[test]
    fn test_split_child_moves_median_up() {
        let mut tree = BTree::with_degree(3).unwrap();
        for key in 1..=5 {
            tree.insert(key);
        }
        let root = tree.root.unwrap();
        assert_eq!(tree.arena[root].keys, vec![1, 2, 3, 4, 5]);

        tree.insert(6);
        let root = tree.root.unwrap();
        assert_eq!(tree.arena[root].keys, vec![3]);
        let left = tree.arena[root].children[0];
        let right = tree.arena[root].children[1];
        assert_eq!(tree.arena[left].keys, vec![1, 2]);
        assert_eq!(tree.arena[right].keys, vec![4, 5, 6]);
    }

    #[test]
    fn test_insert_replaces_equal_key() {
        let mut tree = BTree::new();
        assert_eq!(tree.insert(5), None);
        assert_eq!(tree.insert(5), Some(5));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_insert_replaces_key_promoted_by_split() {
        let mut tree = BTree::new();
        for key in [10, 20, 30, 40, 50, 60] {
            tree.insert(key);
        }
        for key in [10, 20, 30, 40, 50, 60] {
            assert_eq!(tree.insert(key), Some(key));
        }
        assert_eq!(tree.len(), 6);
        assert!(tree.validate());
    }

    #[test]
    fn test_remove_from_leaf_and_internal() {
        let mut tree: BTree<i32> = (1..=20).collect();
        assert!(tree.validate());

        // 8 sits in an internal node for this insertion order
        assert_eq!(tree.remove(&8), Some(8));
        assert!(tree.validate());
        assert_eq!(tree.remove(&20), Some(20));
        assert!(tree.validate());
        assert_eq!(tree.remove(&8), None);
        assert_eq!(tree.len(), 18);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut tree: BTree<i32> = (0..10).collect();
        let before = keys(&tree);
        let height = tree.height();
        assert_eq!(tree.remove(&42), None);
        assert_eq!(keys(&tree), before);
        assert_eq!(tree.height(), height);
    }

    #[test]
    fn test_remove_everything_shrinks_to_empty() {
        let mut tree: BTree<i32> = (0..100).collect();
        for key in 0..100 {
            assert_eq!(tree.remove(&key), Some(key));
            assert!(tree.validate(), "invalid after removing {key}");
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(tree.arena.is_empty());
    }

    #[test]
    fn test_remove_reverse_order_with_larger_degree() {
        let mut tree = BTree::with_degree(4).unwrap();
        tree.extend(0..200);
        for key in (0..200).rev() {
            assert_eq!(tree.remove(&key), Some(key));
            assert!(tree.validate());
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_min_max() {
        let tree: BTree<i32> = [7, -3, 12, 0, 45, 9].into_iter().collect();
        assert_eq!(tree.minimum(), Some(&-3));
        assert_eq!(tree.maximum(), Some(&45));
    }

    #[test]
    fn test_display() {
        let tree: BTree<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(tree.to_string(), "BTree=[1,2,3]");
        assert_eq!(BTree::<i32>::new().to_string(), "BTree=[]");
    }

    #[test]
    fn test_check_invariants_detects_corruption() {
        let mut tree: BTree<i32> = (0..10).collect();
        let root = tree.root.unwrap();
        tree.arena[root].keys[0] = 100;
        assert_eq!(tree.check_invariants(), Err(InvariantViolation::Unordered));
    }

    #[test]
    fn test_clear() {
        let mut tree: BTree<i32> = (0..10).collect();
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.validate());
        tree.insert(1);
        assert_eq!(keys(&tree), vec![1]);
    }
}
