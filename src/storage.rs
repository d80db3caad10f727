//! Arena storage for tree and heap nodes
//!
//! Every structure in this crate keeps its nodes in an [`Arena`]: a
//! `slotmap` of nodes addressed by generational [`NodeKey`]s. Parent, child
//! and sibling links are stored as `Option<NodeKey>`, so the node graph may
//! contain cycles (sibling rings, parent back-links) without any shared
//! ownership. Dropping the arena drops every node.
//!
//! # Characteristics
//! - Contiguous node allocation with slot reuse
//! - Generational keys: a key whose node was removed never resolves again,
//!   even after its slot is reused
//! - Each arena carries an [`ArenaId`], so a [`NodeHandle`] issued by one
//!   structure is rejected by every other structure
//!
//! Internally the structures index the arena directly (`arena[key]`); such
//! keys come from links that the structure itself maintains. Keys that come
//! from callers always go through [`Arena::resolve`] first.

use crate::traits::{Handle, TreeError};
use slotmap::{new_key_type, SlotMap};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    /// Generational key of a node inside an [`Arena`]
    pub struct NodeKey;
}

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one arena instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaId(u64);

impl ArenaId {
    fn fresh() -> Self {
        ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a node of a specific structure
///
/// Returned by [`RedBlackTree::insert`](crate::red_black::RedBlackTree::insert)
/// and [`FibonacciHeap::insert`](crate::fibonacci::FibonacciHeap::insert).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    arena: ArenaId,
    key: NodeKey,
}

impl Handle for NodeHandle {}

/// Node arena tagged with its own identity
pub struct Arena<N> {
    id: ArenaId,
    nodes: SlotMap<NodeKey, N>,
}

impl<N> Arena<N> {
    /// Creates an empty arena with a fresh identity
    pub fn new() -> Self {
        Self {
            id: ArenaId::fresh(),
            nodes: SlotMap::with_key(),
        }
    }

    /// Identity of this arena
    #[inline]
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Number of live nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stores a node, returning its key
    #[inline]
    pub fn insert(&mut self, node: N) -> NodeKey {
        self.nodes.insert(node)
    }

    /// Stores a node built from its own key (for self-referencing links)
    #[inline]
    pub fn insert_with_key<F>(&mut self, build: F) -> NodeKey
    where
        F: FnOnce(NodeKey) -> N,
    {
        self.nodes.insert_with_key(build)
    }

    /// Removes a node, returning it if the key was live
    #[inline]
    pub fn remove(&mut self, key: NodeKey) -> Option<N> {
        self.nodes.remove(key)
    }

    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&N> {
        self.nodes.get(key)
    }

    #[inline]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Drops every node; keys issued before the call never resolve again
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Removes and yields every node with its key
    pub fn drain(&mut self) -> impl Iterator<Item = (NodeKey, N)> + '_ {
        self.nodes.drain()
    }

    /// Wraps a key of this arena into a caller-facing handle
    #[inline]
    pub fn handle(&self, key: NodeKey) -> NodeHandle {
        NodeHandle { arena: self.id, key }
    }

    /// Turns a caller-supplied handle back into a live key of this arena
    ///
    /// # Errors
    /// `TreeError::ForeignHandle` if the handle was issued by another arena,
    /// `TreeError::StaleHandle` if its node has been removed.
    pub fn resolve(&self, handle: &NodeHandle) -> Result<NodeKey, TreeError> {
        if handle.arena != self.id() {
            return Err(TreeError::ForeignHandle);
        }
        if !self.contains(handle.key) {
            return Err(TreeError::StaleHandle);
        }
        Ok(handle.key)
    }
}

impl<N> Default for Arena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone> Clone for Arena<N> {
    /// The copy gets its own identity; handles of the original do not
    /// resolve in it.
    fn clone(&self) -> Self {
        Self {
            id: ArenaId::fresh(),
            nodes: self.nodes.clone(),
        }
    }
}

impl<N> fmt::Debug for Arena<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("id", &self.id)
            .field("len", &self.nodes.len())
            .finish()
    }
}

impl<N> Index<NodeKey> for Arena<N> {
    type Output = N;

    #[inline]
    fn index(&self, key: NodeKey) -> &N {
        &self.nodes[key]
    }
}

impl<N> IndexMut<NodeKey> for Arena<N> {
    #[inline]
    fn index_mut(&mut self, key: NodeKey) -> &mut N {
        &mut self.nodes[key]
    }
}
