use rustc_hash::FxHashMap;

use crate::core::{DedupMap, Node};
use crate::error::{Result, SvdagError};

/// Append-only pool of DAG nodes.
///
/// Child slots reference nodes by 1-based index (slot value `k` is the node
/// at position `k - 1`); slot `0` is the empty sentinel. The pool records
/// its root index separately so editing operations can append freely; for a
/// freshly built or compressed pool the root is the last node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodePool {
    nodes: Vec<Node>,
    root: u32,
}

impl NodePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 1-based index of the root node, 0 when the pool holds no geometry.
    pub fn root(&self) -> u32 {
        self.root
    }

    pub fn root_node(&self) -> Option<&Node> {
        if self.root == 0 {
            None
        } else {
            self.nodes.get(self.root as usize - 1)
        }
    }

    pub fn set_root(&mut self, index: u32) {
        debug_assert!(index as usize <= self.nodes.len(), "root {index} out of range");
        self.root = index;
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Appends a node and returns its 1-based index.
    pub fn append(&mut self, node: Node) -> u32 {
        self.nodes.push(node);
        self.nodes.len() as u32
    }

    pub fn get(&self, index: u32) -> Result<&Node> {
        if index == 0 || index as usize > self.nodes.len() {
            return Err(SvdagError::IndexOutOfRange {
                index,
                len: self.nodes.len(),
            });
        }
        Ok(&self.nodes[index as usize - 1])
    }

    /// Unchecked access for internal callers that hold a validated index.
    pub(crate) fn node(&self, index: u32) -> &Node {
        &self.nodes[index as usize - 1]
    }

    pub(crate) fn node_mut(&mut self, index: u32) -> &mut Node {
        &mut self.nodes[index as usize - 1]
    }

    /// Adds `delta` to every positive child slot; empty and leaf slots are
    /// untouched. Used to re-root one pool's indices before concatenating it
    /// onto another.
    pub fn shift_indexes(&mut self, delta: i32) {
        for node in &mut self.nodes {
            for slot in node.children_mut() {
                if *slot > 0 {
                    *slot += delta;
                }
            }
        }
    }

    /// Canonicalises the pool: structurally equal subtrees collapse into one
    /// node, nodes unreachable from the root are dropped, and subtrees that
    /// end up all-empty resolve to the empty sentinel in their parent slot.
    ///
    /// Children are emitted before parents (octant-order DFS), so the output
    /// is topologically ordered with the root last. Idempotent.
    pub fn compress(&mut self) {
        if self.root == 0 || self.nodes.is_empty() {
            self.nodes.clear();
            self.root = 0;
            return;
        }

        let mut out: Vec<Node> = Vec::with_capacity(self.nodes.len());
        let mut dedup = DedupMap::default();
        let mut memo: FxHashMap<u32, i32> = FxHashMap::default();

        let new_root = self.compress_node(self.root, &mut out, &mut dedup, &mut memo);

        if new_root > 0 {
            self.nodes = out;
            self.root = new_root as u32;
        } else {
            self.nodes.clear();
            self.root = 0;
        }

        debug_assert!(self.is_topologically_ordered());
    }

    fn compress_node(
        &self,
        index: u32,
        out: &mut Vec<Node>,
        dedup: &mut DedupMap,
        memo: &mut FxHashMap<u32, i32>,
    ) -> i32 {
        if let Some(&resolved) = memo.get(&index) {
            return resolved;
        }

        let mut children = *self.node(index).children();
        for slot in children.iter_mut() {
            if *slot > 0 {
                *slot = self.compress_node(*slot as u32, out, dedup, memo);
            }
        }

        let rewritten = Node::new(children);
        let resolved = if !rewritten.has_value() {
            0
        } else if let Some(&existing) = dedup.get(&rewritten) {
            existing as i32
        } else {
            out.push(rewritten);
            let new_index = out.len() as u32;
            dedup.insert(rewritten, new_index);
            new_index as i32
        };

        memo.insert(index, resolved);
        resolved
    }

    /// Every positive slot references a strictly lower position and the root
    /// is the last node. Holds for built and compressed pools; `combine` and
    /// `subtract` leave forward references behind until recompression.
    pub(crate) fn is_topologically_ordered(&self) -> bool {
        if self.root != 0 && self.root as usize != self.nodes.len() {
            return false;
        }
        self.nodes.iter().enumerate().all(|(position, node)| {
            node.children()
                .iter()
                .all(|&slot| slot <= 0 || (slot as usize) <= position)
        })
    }

    /// Every positive slot resolves to a pool entry.
    pub(crate) fn slots_in_range(&self) -> bool {
        let len = self.nodes.len();
        self.nodes.iter().all(|node| {
            node.children()
                .iter()
                .all(|&slot| slot <= 0 || (slot as usize) <= len)
        })
    }
}
