//! The SMARTS pattern hierarchy.
//!
//! `Hierarchy` is an ordered tree of [`ParameterNode`]s. Node payloads are
//! `Arc`-wrapped so that cloning a `Hierarchy` (done on every provisional
//! SPLIT/MERGE apply) is O(node count) pointer copies rather than a deep
//! clone, letting `Clustering` clone cheaply by sharing immutable node
//! payloads.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::graph::Structure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// A node in the hierarchy: a name, a SMARTS string, the structure it was
/// built from, and its position in the tree. Immutable once created; SPLIT
/// creates new nodes, MERGE destroys them, and nothing in between mutates
/// a node in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterNode {
    pub name: String,
    pub smarts: String,
    pub structure: Structure,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hierarchy {
    nodes: HashMap<NodeId, Arc<ParameterNode>>,
    names: HashMap<String, NodeId>,
    root_ids: Vec<NodeId>,
    next_id: u64,
    next_counter: u64,
    pub group_prefix: String,
}

impl Hierarchy {
    /// Builds a fresh hierarchy with a single root node whose SMARTS
    /// matches every IC in the dataset. Default root name is `p0`.
    pub fn new_root(smarts: String, structure: Structure) -> Self {
        Self::new_root_named("p0".to_string(), smarts, structure, "p".to_string())
    }

    pub fn new_root_named(name: String, smarts: String, structure: Structure, group_prefix: String) -> Self {
        let root_id = NodeId(0);
        let node = ParameterNode {
            name: name.clone(),
            smarts,
            structure,
            parent: None,
            children: Vec::new(),
        };
        let mut nodes = HashMap::new();
        nodes.insert(root_id, Arc::new(node));
        let mut names = HashMap::new();
        names.insert(name, root_id);
        Hierarchy {
            nodes,
            names,
            root_ids: vec![root_id],
            next_id: 1,
            next_counter: 1,
            group_prefix,
        }
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.root_ids
    }

    pub fn node(&self, id: NodeId) -> Option<&ParameterNode> {
        self.nodes.get(&id).map(|a| a.as_ref())
    }

    pub fn node_by_name(&self, name: &str) -> Option<&ParameterNode> {
        self.names.get(name).and_then(|id| self.node(*id))
    }

    pub fn id_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order traversal over all nodes reachable from the roots,
    /// first-child-wins at every branch — the same order a labeler uses
    /// for first-match-wins assignment.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root_ids.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Next unused group-prefix counter value, i.e.
    /// `1 + max(existing counters)` among names beginning with
    /// `group_prefix`.
    fn next_group_name(&mut self) -> String {
        let candidate = self.next_counter;
        self.next_counter += 1;
        format!("{}{}", self.group_prefix, candidate)
    }

    /// Inserts a new child of `parent` at `position` (position 0 is
    /// highest priority; SPLIT always inserts its new child at position
    /// 0). Returns the new node's id.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        position: usize,
        smarts: String,
        structure: Structure,
    ) -> Result<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return Err(EngineError::NodeMissing(format!("{:?}", parent)));
        }
        let name = self.next_group_name();
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let node = ParameterNode {
            name: name.clone(),
            smarts,
            structure,
            parent: Some(parent),
            children: Vec::new(),
        };
        self.nodes.insert(id, Arc::new(node));
        self.names.insert(name, id);

        let parent_node = Arc::make_mut(self.nodes.get_mut(&parent).unwrap());
        let position = position.min(parent_node.children.len());
        parent_node.children.insert(position, id);

        Ok(id)
    }

    /// Removes `child` from the hierarchy. `child`'s own children, if any,
    /// are reparented into `child`'s former slot under `child`'s parent, so
    /// the tree stays connected (their ICs then fall through to the
    /// nearest remaining ancestor at relabel time).
    ///
    /// # Panics
    /// If `child` is a root (roots cannot be merged away).
    pub fn remove_child(&mut self, child: NodeId) -> Result<()> {
        let child_node = self
            .nodes
            .get(&child)
            .ok_or_else(|| EngineError::NodeMissing(format!("{:?}", child)))?
            .clone();
        let parent_id = child_node.parent.expect("cannot remove a root node via remove_child");
        let grandchildren = child_node.children.clone();

        let parent_node = Arc::make_mut(self.nodes.get_mut(&parent_id).unwrap());
        let idx = parent_node
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| EngineError::NodeMissing(format!("{:?} is not a child of its recorded parent", child)))?;
        parent_node.children.remove(idx);
        for (offset, gc) in grandchildren.iter().enumerate() {
            parent_node.children.insert(idx + offset, *gc);
        }

        for &gc in &grandchildren {
            let gc_node = Arc::make_mut(self.nodes.get_mut(&gc).unwrap());
            gc_node.parent = Some(parent_id);
        }

        self.names.remove(&child_node.name);
        self.nodes.remove(&child);

        Ok(())
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }
}
