//! Red-Black Tree implementation
//!
//! A red-black tree is a binary search tree whose nodes are colored red or
//! black so that:
//! - the root is black
//! - a red node never has a red child
//! - every path from a node down to an empty child position crosses the same
//!   number of black nodes (its black-height)
//!
//! Together these keep the height within `2 log2(n + 1)`, so search, insert
//! and delete are O(log n). After each mutation a bottom-up fix-up restores
//! the coloring with O(1) rotations and O(log n) recolorings.
//!
//! Nodes live in an [`Arena`]; parent links are plain keys used for
//! navigation during fix-up. [`insert`](RedBlackTree::insert) hands out a
//! [`NodeHandle`] that stays valid until that node is deleted, including
//! across rotations and the deletion of other nodes.

use crate::storage::{Arena, NodeHandle, NodeKey};
use crate::traits::{InvariantViolation, SearchTree, TreeError};
use std::cmp::Ordering;
use std::fmt;

const TRACE_TARGET: &str = "balanced_collections::red_black";

/// Node color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Clone)]
struct Node<K> {
    key: K,
    color: Color,
    parent: Option<NodeKey>,
    left: Option<NodeKey>,
    right: Option<NodeKey>,
}

impl<K> Node<K> {
    #[inline]
    fn child(&self, side: Side) -> Option<NodeKey> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    fn child_mut(&mut self, side: Side) -> &mut Option<NodeKey> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Red-Black Tree ordered collection
///
/// Equal keys are stored side by side, each in its own node with its own
/// handle.
///
/// # Example
///
/// ```rust
/// use rust_balanced_collections::red_black::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// for key in [5, 3, 8, 1, 4, 7, 9] {
///     tree.insert(key);
/// }
/// let five = tree.find(&5).unwrap();
/// assert_eq!(tree.delete(&five), Ok(5));
/// assert_eq!(tree.search(&5), None);
/// assert!(tree.validate());
/// ```
#[derive(Clone)]
pub struct RedBlackTree<K> {
    arena: Arena<Node<K>>,
    root: Option<NodeKey>,
    len: usize,
}

impl<K: Ord> RedBlackTree<K> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeKey, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((current, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.arena[current];
            stack.extend(node.left.map(|child| (child, depth + 1)));
            stack.extend(node.right.map(|child| (child, depth + 1)));
        }
        deepest
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    /// Inserts `key` and returns a handle to its new node
    ///
    /// Equal keys are kept: each insert adds a node, placed after the keys
    /// already stored that compare equal to it.
    ///
    /// **Time Complexity**: O(log n)
    pub fn insert(&mut self, key: K) -> NodeHandle {
        let node = self.insert_entry(key);
        self.arena.handle(node)
    }

    /// Finds a node holding a key equal to `key`
    pub fn find(&self, key: &K) -> Option<NodeHandle> {
        self.find_key(key).map(|node| self.arena.handle(node))
    }

    /// Looks up the stored key equal to `key`
    pub fn search(&self, key: &K) -> Option<&K> {
        self.find_key(key).map(|node| &self.arena[node].key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find_key(key).is_some()
    }

    /// Reads the key of the node named by `handle`
    pub fn get(&self, handle: &NodeHandle) -> Option<&K> {
        let node = self.arena.resolve(handle).ok()?;
        Some(&self.arena[node].key)
    }

    /// Deletes the node named by `handle` and returns its key
    ///
    /// **Time Complexity**: O(log n)
    ///
    /// # Errors
    /// `TreeError::ForeignHandle` if the handle came from another tree,
    /// `TreeError::StaleHandle` if its node was already deleted. The tree is
    /// unchanged on error.
    pub fn delete(&mut self, handle: &NodeHandle) -> Result<K, TreeError> {
        let node = self.arena.resolve(handle)?;
        self.unlink(node);
        let node = self.arena.remove(node).ok_or(TreeError::StaleHandle)?;
        Ok(node.key)
    }

    /// Deletes one node holding a key equal to `key`
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let node = self.find_key(key)?;
        self.unlink(node);
        self.arena.remove(node).map(|node| node.key)
    }

    pub fn minimum(&self) -> Option<&K> {
        self.root.map(|root| &self.arena[self.subtree_min(root)].key)
    }

    pub fn maximum(&self) -> Option<&K> {
        self.root.map(|root| &self.arena[self.subtree_max(root)].key)
    }

    /// Handle of the node that follows `handle` in key order
    ///
    /// The minimum of the right subtree when there is one, otherwise the
    /// nearest ancestor reached from its left side. `None` at the maximum.
    ///
    /// **Time Complexity**: O(log n)
    ///
    /// # Errors
    /// `TreeError::ForeignHandle` or `TreeError::StaleHandle`, as for
    /// [`delete`](RedBlackTree::delete).
    pub fn successor(&self, handle: &NodeHandle) -> Result<Option<NodeHandle>, TreeError> {
        let node = self.arena.resolve(handle)?;
        Ok(self.neighbor(node, Side::Right).map(|next| self.arena.handle(next)))
    }

    /// Handle of the node that precedes `handle` in key order; `None` at the
    /// minimum
    ///
    /// # Errors
    /// `TreeError::ForeignHandle` or `TreeError::StaleHandle`.
    pub fn predecessor(&self, handle: &NodeHandle) -> Result<Option<NodeHandle>, TreeError> {
        let node = self.arena.resolve(handle)?;
        Ok(self.neighbor(node, Side::Left).map(|prev| self.arena.handle(prev)))
    }

    /// Color of the node named by `handle`
    pub fn color(&self, handle: &NodeHandle) -> Option<Color> {
        let node = self.arena.resolve(handle).ok()?;
        Some(self.arena[node].color)
    }

    /// In-order iterator over the keys
    pub fn iter(&self) -> Iter<'_, K> {
        let mut iter = Iter {
            arena: &self.arena,
            stack: Vec::new(),
            remaining: self.len,
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Checks the coloring rules, the search order and the parent links
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return if self.len == 0 {
                Ok(())
            } else {
                Err(InvariantViolation::LengthMismatch {
                    recorded: self.len,
                    counted: 0,
                })
            };
        };
        if self.arena[root].color == Color::Red {
            return Err(InvariantViolation::RedRoot);
        }
        if self.arena[root].parent.is_some() {
            return Err(InvariantViolation::BrokenLink);
        }

        let mut counted = 0;
        self.check_subtree(Some(root), None, None, &mut counted)?;
        if counted != self.len {
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

    fn find_key(&self, key: &K) -> Option<NodeKey> {
        let mut current = self.root;
        while let Some(node) = current {
            current = match key.cmp(&self.arena[node].key) {
                Ordering::Less => self.arena[node].left,
                Ordering::Greater => self.arena[node].right,
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    fn insert_entry(&mut self, key: K) -> NodeKey {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(node) = current {
            parent = Some(node);
            side = if key < self.arena[node].key {
                Side::Left
            } else {
                Side::Right
            };
            current = self.arena[node].child(side);
        }

        let node = self.arena.insert(Node {
            key,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        });
        match parent {
            Some(parent) => *self.arena[parent].child_mut(side) = Some(node),
            None => self.root = Some(node),
        }
        self.len += 1;

        self.insert_fixup(node);
        node
    }

    /// Restores the coloring after `node` was attached as a red leaf
    ///
    /// **Cases** (while the parent is red):
    /// 1. Red uncle: recolor parent and uncle black, grandparent red, and
    ///    continue from the grandparent
    /// 2. Black uncle, node and parent on opposite sides: rotate the parent
    ///    so both sit on the same side, then fall through to case 3
    /// 3. Black uncle, same side: rotate the grandparent the other way and
    ///    swap the colors of parent and grandparent; done
    fn insert_fixup(&mut self, mut node: NodeKey) {
        while let Some(parent) = self.arena[node].parent {
            if self.arena[parent].color == Color::Black {
                break;
            }
            let Some(grandparent) = self.arena[parent].parent else {
                break;
            };

            let parent_side = self.side_of(parent, grandparent);
            let uncle = self.arena[grandparent].child(parent_side.opposite());

            if self.color_of(uncle) == Color::Red {
                self.arena[parent].color = Color::Black;
                self.set_color(uncle, Color::Black);
                self.arena[grandparent].color = Color::Red;
                node = grandparent;
                continue;
            }

            let parent = if self.side_of(node, parent) != parent_side {
                self.rotate(parent, parent_side);
                node
            } else {
                parent
            };
            self.arena[parent].color = Color::Black;
            self.arena[grandparent].color = Color::Red;
            self.rotate(grandparent, parent_side.opposite());
            break;
        }

        if let Some(root) = self.root {
            self.arena[root].color = Color::Black;
        }
    }

    /// Detaches `node` from the tree structure, leaving it in the arena
    ///
    /// A node with two children is replaced by its in-order successor, which
    /// is relinked into its place (so handles to the successor stay valid).
    /// The color that disappears from the tree decides whether the
    /// double-black fix-up has to run.
    fn unlink(&mut self, node: NodeKey) {
        let (left, right) = (self.arena[node].left, self.arena[node].right);

        let (removed_color, replacement, replacement_parent) = match (left, right) {
            (None, _) => {
                let parent = self.arena[node].parent;
                self.transplant(node, right);
                (self.arena[node].color, right, parent)
            }
            (Some(_), None) => {
                let parent = self.arena[node].parent;
                self.transplant(node, left);
                (self.arena[node].color, left, parent)
            }
            (Some(left), Some(right)) => {
                let successor = self.subtree_min(right);
                let successor_color = self.arena[successor].color;
                let replacement = self.arena[successor].right;

                let replacement_parent = if self.arena[successor].parent == Some(node) {
                    Some(successor)
                } else {
                    let parent = self.arena[successor].parent;
                    self.transplant(successor, replacement);
                    self.arena[successor].right = Some(right);
                    self.arena[right].parent = Some(successor);
                    parent
                };

                self.transplant(node, Some(successor));
                self.arena[successor].left = Some(left);
                self.arena[left].parent = Some(successor);
                self.arena[successor].color = self.arena[node].color;
                (successor_color, replacement, replacement_parent)
            }
        };

        self.len -= 1;
        if removed_color == Color::Black {
            self.delete_fixup(replacement, replacement_parent);
        }
        if let Some(root) = self.root {
            self.arena[root].color = Color::Black;
        }
    }

    /// Resolves the extra black carried by `node` (which may be an empty
    /// position, hence the separate `parent`)
    ///
    /// **Cases** with `sibling` on the far side of `parent`:
    /// 1. Red sibling: rotate it above the parent and recolor; the new
    ///    sibling is black, continue with cases 2-4
    /// 2. Black sibling, both its children black: paint the sibling red and
    ///    move the extra black up to the parent
    /// 3. Black sibling, near child red and far child black: rotate the
    ///    sibling away so the red child becomes the far child
    /// 4. Black sibling, far child red: rotate the parent toward `node`,
    ///    recolor, and stop
    fn delete_fixup(&mut self, mut node: Option<NodeKey>, mut parent: Option<NodeKey>) {
        while node != self.root && self.color_of(node) == Color::Black {
            let Some(current_parent) = parent else {
                break;
            };
            let side = if self.arena[current_parent].left == node {
                Side::Left
            } else {
                Side::Right
            };

            let mut sibling = self.arena[current_parent].child(side.opposite());
            if self.color_of(sibling) == Color::Red {
                self.set_color(sibling, Color::Black);
                self.arena[current_parent].color = Color::Red;
                self.rotate(current_parent, side);
                sibling = self.arena[current_parent].child(side.opposite());
            }

            // A black-height of at least one on this side guarantees a sibling
            let Some(mut sibling_key) = sibling else {
                node = Some(current_parent);
                parent = self.arena[current_parent].parent;
                continue;
            };

            let near = self.arena[sibling_key].child(side);
            let far = self.arena[sibling_key].child(side.opposite());
            if self.color_of(near) == Color::Black && self.color_of(far) == Color::Black {
                self.arena[sibling_key].color = Color::Red;
                node = Some(current_parent);
                parent = self.arena[current_parent].parent;
                continue;
            }

            if self.color_of(far) == Color::Black {
                self.set_color(near, Color::Black);
                self.arena[sibling_key].color = Color::Red;
                self.rotate(sibling_key, side.opposite());
                match self.arena[current_parent].child(side.opposite()) {
                    Some(rotated) => sibling_key = rotated,
                    None => break,
                }
            }

            self.arena[sibling_key].color = self.arena[current_parent].color;
            self.arena[current_parent].color = Color::Black;
            let far = self.arena[sibling_key].child(side.opposite());
            self.set_color(far, Color::Black);
            self.rotate(current_parent, side);
            node = self.root;
            parent = None;
        }

        self.set_color(node, Color::Black);
    }

    /// Rotates `node` down toward `side`; its child on the other side takes
    /// its place
    fn rotate(&mut self, node: NodeKey, side: Side) {
        let Some(pivot) = self.arena[node].child(side.opposite()) else {
            return;
        };
        tracing::trace!(target: TRACE_TARGET, ?side, "rotate");

        let inner = self.arena[pivot].child(side);
        *self.arena[node].child_mut(side.opposite()) = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(node);
        }

        let parent = self.arena[node].parent;
        self.arena[pivot].parent = parent;
        match parent {
            None => self.root = Some(pivot),
            Some(parent) => {
                let node_side = self.side_of(node, parent);
                *self.arena[parent].child_mut(node_side) = Some(pivot);
            }
        }

        *self.arena[pivot].child_mut(side) = Some(node);
        self.arena[node].parent = Some(pivot);
    }

    /// Puts `replacement` where `node` hangs from its parent
    fn transplant(&mut self, node: NodeKey, replacement: Option<NodeKey>) {
        let parent = self.arena[node].parent;
        match parent {
            None => self.root = replacement,
            Some(parent) => {
                let side = self.side_of(node, parent);
                *self.arena[parent].child_mut(side) = replacement;
            }
        }
        if let Some(replacement) = replacement {
            self.arena[replacement].parent = parent;
        }
    }

    #[inline]
    fn side_of(&self, child: NodeKey, parent: NodeKey) -> Side {
        if self.arena[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    // Empty positions count as black
    #[inline]
    fn color_of(&self, node: Option<NodeKey>) -> Color {
        node.map_or(Color::Black, |node| self.arena[node].color)
    }

    #[inline]
    fn set_color(&mut self, node: Option<NodeKey>, color: Color) {
        if let Some(node) = node {
            self.arena[node].color = color;
        }
    }

    fn subtree_min(&self, mut node: NodeKey) -> NodeKey {
        while let Some(left) = self.arena[node].left {
            node = left;
        }
        node
    }

    fn subtree_max(&self, mut node: NodeKey) -> NodeKey {
        while let Some(right) = self.arena[node].right {
            node = right;
        }
        node
    }

    /// In-order neighbor of `node` toward `side`
    fn neighbor(&self, node: NodeKey, side: Side) -> Option<NodeKey> {
        if let Some(child) = self.arena[node].child(side) {
            return Some(match side {
                Side::Right => self.subtree_min(child),
                Side::Left => self.subtree_max(child),
            });
        }
        let mut current = node;
        let mut parent = self.arena[current].parent;
        while let Some(up) = parent {
            if self.arena[up].child(side) != Some(current) {
                return Some(up);
            }
            current = up;
            parent = self.arena[up].parent;
        }
        None
    }

    /// Returns the black-height of the subtree below `node`
    fn check_subtree<'a>(
        &'a self,
        node: Option<NodeKey>,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
        counted: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        let Some(key) = node else {
            return Ok(0);
        };
        let current = self.arena.get(key).ok_or(InvariantViolation::BrokenLink)?;
        *counted += 1;

        // Rotations can leave equal keys on either side
        if lower.is_some_and(|lower| current.key < *lower)
            || upper.is_some_and(|upper| current.key > *upper)
        {
            return Err(InvariantViolation::Unordered);
        }

        for child in [current.left, current.right].into_iter().flatten() {
            let child_node = self.arena.get(child).ok_or(InvariantViolation::BrokenLink)?;
            if child_node.parent != Some(key) {
                return Err(InvariantViolation::BrokenLink);
            }
            if current.color == Color::Red && child_node.color == Color::Red {
                return Err(InvariantViolation::RedRedEdge);
            }
        }

        let left = self.check_subtree(current.left, lower, Some(&current.key), counted)?;
        let right = self.check_subtree(current.right, Some(&current.key), upper, counted)?;
        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch { left, right });
        }
        Ok(left + usize::from(current.color == Color::Black))
    }
}

impl<K: Ord> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> SearchTree<K> for RedBlackTree<K> {
    fn new() -> Self {
        RedBlackTree::new()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn height(&self) -> usize {
        RedBlackTree::height(self)
    }

    fn insert(&mut self, key: K) -> Option<K> {
        self.insert_entry(key);
        None
    }

    fn search(&self, key: &K) -> Option<&K> {
        RedBlackTree::search(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<K> {
        RedBlackTree::remove(self, key)
    }

    fn minimum(&self) -> Option<&K> {
        RedBlackTree::minimum(self)
    }

    fn maximum(&self) -> Option<&K> {
        RedBlackTree::maximum(self)
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        RedBlackTree::check_invariants(self)
    }
}

impl<K: Ord> FromIterator<K> for RedBlackTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = RedBlackTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for RedBlackTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert_entry(key);
        }
    }
}

impl<'a, K: Ord> IntoIterator for &'a RedBlackTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for RedBlackTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord + fmt::Display> fmt::Display for RedBlackTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedBlackTree=[")?;
        for (position, key) in self.iter().enumerate() {
            if position > 0 {
                write!(f, ",")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "]")
    }
}

/// In-order iterator over a [`RedBlackTree`]
pub struct Iter<'a, K> {
    arena: &'a Arena<Node<K>>,
    stack: Vec<NodeKey>,
    remaining: usize,
}

impl<K> Iter<'_, K> {
    fn push_left_spine(&mut self, mut node: Option<NodeKey>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = self.arena[current].left;
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let arena = self.arena;
        let current = self.stack.pop()?;
        let node = &arena[current];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(tree: &RedBlackTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn test_first_insert_is_black_root() {
        let mut tree = RedBlackTree::new();
        let handle = tree.insert(10);
        assert_eq!(tree.color(&handle), Some(Color::Black));
        assert_eq!(tree.height(), 1);
        assert!(tree.validate());
    }

    #[test]
    fn test_ascending_inserts_stay_balanced() {
        let mut tree = RedBlackTree::new();
        for key in 0..=10 {
            tree.insert(key);
            assert!(tree.validate(), "invalid after inserting {key}");
        }
        assert_eq!(keys(&tree), (0..=10).collect::<Vec<_>>());
        // 2 * log2(12) bounds the height of an 11-node tree
        assert!(tree.height() <= 7);
    }

    #[test]
    fn test_red_uncle_recolors() {
        let mut tree = RedBlackTree::new();
        let root = tree.insert(10);
        let left = tree.insert(5);
        let right = tree.insert(15);
        tree.insert(1);

        assert_eq!(tree.color(&root), Some(Color::Black));
        assert_eq!(tree.color(&left), Some(Color::Black));
        assert_eq!(tree.color(&right), Some(Color::Black));
        assert!(tree.validate());
    }

    #[test]
    fn test_zig_zag_insert_double_rotation() {
        let mut tree = RedBlackTree::new();
        tree.insert(10);
        tree.insert(5);
        let middle = tree.insert(7);

        assert_eq!(tree.root.map(|root| tree.arena.handle(root)), Some(middle));
        assert_eq!(tree.color(&middle), Some(Color::Black));
        assert_eq!(keys(&tree), vec![5, 7, 10]);
        assert!(tree.validate());
    }

    #[test]
    fn test_delete_round_trip() {
        let mut tree: RedBlackTree<i32> = [5, 3, 8, 1, 4, 7, 9].into_iter().collect();
        let five = tree.find(&5).unwrap();

        assert_eq!(tree.delete(&five), Ok(5));
        assert_eq!(tree.search(&5), None);
        assert_eq!(tree.find(&5), None);
        assert!(tree.validate());
        assert_eq!(keys(&tree), vec![1, 3, 4, 7, 8, 9]);
    }

    #[test]
    fn test_delete_twice_is_usage_error() {
        let mut tree: RedBlackTree<i32> = (0..5).collect();
        let handle = tree.find(&2).unwrap();
        assert_eq!(tree.delete(&handle), Ok(2));
        assert_eq!(tree.delete(&handle), Err(TreeError::StaleHandle));
        assert_eq!(tree.len(), 4);
        assert!(tree.validate());
    }

    #[test]
    fn test_foreign_handle_is_usage_error() {
        let mut first: RedBlackTree<i32> = (0..5).collect();
        let mut second: RedBlackTree<i32> = (0..5).collect();
        let handle = first.find(&3).unwrap();

        assert_eq!(second.delete(&handle), Err(TreeError::ForeignHandle));
        assert_eq!(second.len(), 5);
        assert_eq!(first.delete(&handle), Ok(3));
    }

    #[test]
    fn test_handles_survive_other_deletions() {
        let mut tree = RedBlackTree::new();
        let handles: Vec<_> = (0..32).map(|key| tree.insert(key)).collect();
        for key in (0..32).step_by(2) {
            assert_eq!(tree.remove(&key), Some(key));
        }
        for (key, handle) in handles.iter().enumerate().skip(1).step_by(2) {
            assert_eq!(tree.get(handle), Some(&(key as i32)));
        }
        assert!(tree.validate());
    }

    #[test]
    fn test_insert_equal_keys_keeps_both() {
        let mut tree: RedBlackTree<i32> = [2, 6].into_iter().collect();
        let first = tree.insert(4);
        let second = tree.insert(4);
        assert_ne!(first, second);
        assert_eq!(tree.len(), 4);
        assert_eq!(keys(&tree), vec![2, 4, 4, 6]);
        assert!(tree.validate());

        assert_eq!(tree.delete(&first), Ok(4));
        assert!(tree.validate());
        assert_eq!(tree.get(&second), Some(&4));
        assert_eq!(tree.search(&4), Some(&4));

        assert_eq!(tree.delete(&second), Ok(4));
        assert!(tree.validate());
        assert_eq!(tree.search(&4), None);
        assert_eq!(keys(&tree), vec![2, 6]);
    }

    #[test]
    fn test_delete_either_equal_key() {
        for delete_first in [true, false] {
            let mut tree = RedBlackTree::new();
            let handles: Vec<_> = [7, 7, 7, 3, 7, 9].into_iter().map(|key| tree.insert(key)).collect();
            assert_eq!(tree.len(), 6);
            assert!(tree.validate());

            let target = if delete_first { &handles[0] } else { &handles[4] };
            assert_eq!(tree.delete(target), Ok(7));
            assert!(tree.validate());
            assert_eq!(keys(&tree), vec![3, 7, 7, 7, 9]);
            for handle in handles.iter().filter(|handle| *handle != target) {
                assert!(tree.get(handle).is_some());
            }
        }
    }

    #[test]
    fn test_successor_and_predecessor() {
        let mut tree = RedBlackTree::new();
        let handles: Vec<_> = (1..=7).map(|key| tree.insert(key)).collect();
        let key_of = |handle: Option<NodeHandle>| handle.and_then(|handle| tree.get(&handle).copied());

        // Ascending inserts put 2 at the root with 4 as its right child
        let root = tree.root.map(|root| tree.arena.handle(root)).unwrap();
        assert_eq!(tree.get(&root), Some(&2));
        assert_eq!(key_of(tree.successor(&root).unwrap()), Some(3));
        assert_eq!(key_of(tree.predecessor(&root).unwrap()), Some(1));

        // 3 has no right child, so its successor is an ancestor
        assert_eq!(key_of(tree.successor(&handles[2]).unwrap()), Some(4));
        // 5 has no left child, so its predecessor is an ancestor
        assert_eq!(key_of(tree.predecessor(&handles[4]).unwrap()), Some(4));

        assert_eq!(tree.successor(&handles[6]), Ok(None));
        assert_eq!(tree.predecessor(&handles[0]), Ok(None));
    }

    #[test]
    fn test_successor_walks_in_order() {
        let mut tree: RedBlackTree<i32> = [5, 3, 8, 1, 4, 7, 9, 4].into_iter().collect();
        let mut walked = Vec::new();
        let mut cursor = tree.find(&1);
        while let Some(handle) = cursor {
            walked.push(*tree.get(&handle).unwrap());
            cursor = tree.successor(&handle).unwrap();
        }
        assert_eq!(walked, keys(&tree));

        let mut walked = Vec::new();
        let mut cursor = tree.find(&9);
        while let Some(handle) = cursor {
            walked.push(*tree.get(&handle).unwrap());
            cursor = tree.predecessor(&handle).unwrap();
        }
        walked.reverse();
        assert_eq!(walked, keys(&tree));

        let stale = tree.find(&8).unwrap();
        tree.delete(&stale).unwrap();
        assert_eq!(tree.successor(&stale), Err(TreeError::StaleHandle));
        assert_eq!(tree.predecessor(&stale), Err(TreeError::StaleHandle));

        let other: RedBlackTree<i32> = (0..3).collect();
        let foreign = other.find(&1).unwrap();
        assert_eq!(tree.successor(&foreign), Err(TreeError::ForeignHandle));
    }

    #[test]
    fn test_delete_all_in_mixed_order() {
        let mut tree: RedBlackTree<i32> = (0..64).map(|key| (key * 37) % 64).collect();
        for key in (0..64).map(|key| (key * 11) % 64) {
            assert_eq!(tree.remove(&key), Some(key));
            assert!(tree.validate(), "invalid after removing {key}");
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_check_invariants_detects_red_root() {
        let mut tree: RedBlackTree<i32> = (0..3).collect();
        let root = tree.root.unwrap();
        tree.arena[root].color = Color::Red;
        assert_eq!(tree.check_invariants(), Err(InvariantViolation::RedRoot));
    }

    #[test]
    fn test_check_invariants_detects_black_height_mismatch() {
        let mut tree: RedBlackTree<i32> = (0..3).collect();
        let root = tree.root.unwrap();
        let left = tree.arena[root].left.unwrap();
        tree.arena[left].color = Color::Black;
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::BlackHeightMismatch { left: 1, right: 0 })
        );
    }

    #[test]
    fn test_display() {
        let tree: RedBlackTree<i32> = [2, 1, 3].into_iter().collect();
        assert_eq!(tree.to_string(), "RedBlackTree=[1,2,3]");
    }
}
