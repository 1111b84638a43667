//! Binary prefix trie with longest-prefix matching
//!
//! Nodes live in a single arena and refer to their children by index. The
//! first two arena slots are the IPv4 and IPv6 roots, so the two families
//! never share a path and a lookup in one can never match the other.
//!
//! A node carries a value only when a block was inserted at exactly that
//! depth; every other node exists to branch. Both operations walk at most
//! one node per address bit, independent of how many blocks are stored.

use crate::address::{Address, IpVersion};
use crate::prefix::PrefixBlock;
use std::fmt;
use std::mem;

/// Arena index of a node
type NodeId = u32;

const V4_ROOT: NodeId = 0;
const V6_ROOT: NodeId = 1;

/// Arena capacity; node IDs must fit in a `NodeId`
const MAX_NODES: usize = NodeId::MAX as usize;

/// A node in the trie
#[derive(Clone)]
struct Node<V> {
    /// Children for bit 0 and bit 1
    children: [Option<NodeId>; 2],
    /// Present only on nodes created by an insertion
    value: Option<V>,
}

impl<V> Node<V> {
    fn new_empty() -> Self {
        Self {
            children: [None, None],
            value: None,
        }
    }
}

/// Map from prefix blocks to values with longest-prefix-match lookup
///
/// The arena holds at most `u32::MAX` nodes. A full IPv6 table of a few
/// million blocks stays far below that.
#[derive(Clone)]
pub struct PrefixTrie<V> {
    /// All nodes; slots 0 and 1 are the IPv4 and IPv6 roots
    nodes: Vec<Node<V>>,
    /// Number of nodes holding a value
    len: usize,
}

impl<V> PrefixTrie<V> {
    /// Create an empty trie
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new_empty(), Node::new_empty()],
            len: 0,
        }
    }

    /// Associate `value` with `block`
    ///
    /// Re-inserting a block replaces its value and returns the old one.
    pub fn insert(&mut self, block: PrefixBlock, value: V) -> Option<V> {
        let base = block.base();
        let mut node_id = root(block.version());

        for depth in 0..block.prefix_len() {
            let bit = base.bit(depth) as usize;
            node_id = match self.nodes[node_id as usize].children[bit] {
                Some(child_id) => child_id,
                None => {
                    // The child is complete before the parent links to it
                    let child_id = self.allocate_node();
                    self.nodes[node_id as usize].children[bit] = Some(child_id);
                    child_id
                }
            };
        }

        let previous = self.nodes[node_id as usize].value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Value of the most specific block containing `addr`
    ///
    /// Returns the matched block with the value, or `None` when no stored
    /// block covers the address.
    pub fn longest_prefix_match(&self, addr: Address) -> Option<(PrefixBlock, &V)> {
        let mut node = &self.nodes[root(addr.version()) as usize];
        let mut best = node.value.as_ref().map(|value| (0, value));

        for depth in 0..addr.width() {
            let bit = addr.bit(depth) as usize;
            match node.children[bit] {
                Some(child_id) => node = &self.nodes[child_id as usize],
                None => break,
            }
            if let Some(value) = node.value.as_ref() {
                best = Some((depth + 1, value));
            }
        }

        best.map(|(prefix_len, value)| (PrefixBlock::covering(addr, prefix_len), value))
    }

    /// Value stored for exactly `block`
    pub fn get(&self, block: &PrefixBlock) -> Option<&V> {
        let node_id = self.find_node(block)?;
        self.nodes[node_id as usize].value.as_ref()
    }

    /// Whether a value is stored for exactly `block`
    pub fn contains_block(&self, block: &PrefixBlock) -> bool {
        self.get(block).is_some()
    }

    /// Remove the value stored for exactly `block`
    ///
    /// Branch nodes along the path are kept; they are reused by later
    /// insertions and do not affect matching.
    pub fn remove(&mut self, block: &PrefixBlock) -> Option<V> {
        let node_id = self.find_node(block)?;
        let removed = self.nodes[node_id as usize].value.take();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no block is stored
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of arena nodes, including both roots and branch nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Approximate heap and inline size in bytes
    ///
    /// Counts arena capacity only; heap data owned by `V` is not included.
    pub fn memory_usage(&self) -> usize {
        mem::size_of::<Self>() + self.nodes.capacity() * mem::size_of::<Node<V>>()
    }

    /// Iterate stored blocks in pre-order: IPv4 before IPv6, ascending base
    /// address, shorter prefixes before the blocks they contain
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            trie: self,
            stack: vec![
                Frame::root(V6_ROOT, IpVersion::V6),
                Frame::root(V4_ROOT, IpVersion::V4),
            ],
        }
    }

    fn find_node(&self, block: &PrefixBlock) -> Option<NodeId> {
        let base = block.base();
        let mut node_id = root(block.version());
        for depth in 0..block.prefix_len() {
            node_id = self.nodes[node_id as usize].children[base.bit(depth) as usize]?;
        }
        Some(node_id)
    }

    /// Allocate a new node and return its ID
    fn allocate_node(&mut self) -> NodeId {
        debug_assert!(
            self.nodes.len() < MAX_NODES,
            "prefix trie arena exceeds {} nodes",
            MAX_NODES
        );
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new_empty());
        id
    }
}

#[inline]
fn root(version: IpVersion) -> NodeId {
    match version {
        IpVersion::V4 => V4_ROOT,
        IpVersion::V6 => V6_ROOT,
    }
}

impl<V> Default for PrefixTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for PrefixTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixTrie")
            .field("len", &self.len)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl<V> Extend<(PrefixBlock, V)> for PrefixTrie<V> {
    fn extend<I: IntoIterator<Item = (PrefixBlock, V)>>(&mut self, iter: I) {
        for (block, value) in iter {
            self.insert(block, value);
        }
    }
}

impl<V> FromIterator<(PrefixBlock, V)> for PrefixTrie<V> {
    fn from_iter<I: IntoIterator<Item = (PrefixBlock, V)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<'a, V> IntoIterator for &'a PrefixTrie<V> {
    type Item = (PrefixBlock, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pending node in a pre-order walk
struct Frame {
    node_id: NodeId,
    version: IpVersion,
    bits: u128,
    depth: u8,
}

impl Frame {
    fn root(node_id: NodeId, version: IpVersion) -> Self {
        Self {
            node_id,
            version,
            bits: 0,
            depth: 0,
        }
    }
}

/// Iterator over the blocks stored in a [`PrefixTrie`]
pub struct Iter<'a, V> {
    trie: &'a PrefixTrie<V>,
    stack: Vec<Frame>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (PrefixBlock, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            let node = &self.trie.nodes[frame.node_id as usize];
            let width = frame.version.width();

            // Push the 1-branch first so the 0-branch is visited first
            for bit in [1u8, 0] {
                if let Some(child_id) = node.children[bit as usize] {
                    let shift = width - 1 - frame.depth;
                    self.stack.push(Frame {
                        node_id: child_id,
                        version: frame.version,
                        bits: frame.bits | ((bit as u128) << shift),
                        depth: frame.depth + 1,
                    });
                }
            }

            if let Some(value) = node.value.as_ref() {
                let base = Address::from_raw(frame.bits, frame.version);
                return Some((PrefixBlock::covering(base, frame.depth), value));
            }
        }
        None
    }
}
