use std::sync::Arc;

use xlat_common::ir::NodeId;

use super::{PhysicalRegister, RegisterClass, RegisterSet};

/// Where a value ended up after allocation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Assignment {
    #[default]
    Unassigned,
    Register(PhysicalRegister),
    Spilled(u32),
}

impl Assignment {
    pub fn register(&self) -> Option<PhysicalRegister> {
        match self {
            Self::Register(register) => Some(*register),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegisterNode {
    pub class: Option<RegisterClass>,
    pub assignment: Assignment,
    pub interference: Vec<NodeId>,
}

/// One register node per IR node, plus the interference edges between them.
///
/// The graph is reused across allocations. Resetting it clears every node in
/// place, so the interference lists keep their capacity from one translation
/// unit to the next.
#[derive(Debug)]
pub struct RegisterGraph {
    set: Arc<RegisterSet>,
    nodes: Vec<RegisterNode>,
    spill_slots: u32,
}

impl RegisterGraph {
    pub fn new(set: Arc<RegisterSet>, node_count: usize) -> Self {
        let mut nodes = Vec::with_capacity(node_count);
        nodes.resize_with(node_count, RegisterNode::default);

        Self {
            set,
            nodes,
            spill_slots: 0,
        }
    }

    /// Resize the graph to `node_count` nodes and forget every class,
    /// assignment and edge.
    pub fn reset(&mut self, node_count: usize) {
        for node in self.nodes.iter_mut() {
            node.class = None;
            node.assignment = Assignment::Unassigned;
            node.interference.clear();
        }

        self.nodes.resize_with(node_count, RegisterNode::default);
        self.spill_slots = 0;
    }

    /// Forget the assignments and edges of a previous allocation but keep the
    /// node classes.
    pub fn clear_allocation(&mut self) {
        for node in self.nodes.iter_mut() {
            node.assignment = Assignment::Unassigned;
            node.interference.clear();
        }

        self.spill_slots = 0;
    }

    pub fn set(&self) -> &RegisterSet {
        &self.set
    }

    pub fn shared_set(&self) -> &Arc<RegisterSet> {
        &self.set
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &RegisterNode {
        assert!(id.index() < self.nodes.len(), "register node {id} out of range");
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut RegisterNode {
        assert!(id.index() < self.nodes.len(), "register node {id} out of range");
        &mut self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &RegisterNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId::from(index), node))
    }

    pub fn add_interference(&mut self, a: NodeId, b: NodeId) {
        assert_ne!(a, b, "{a} cannot interfere with itself");
        debug_assert!(!self.interferes(a, b));

        self.node_mut(a).interference.push(b);
        self.node_mut(b).interference.push(a);
    }

    pub fn interferes(&self, a: NodeId, b: NodeId) -> bool {
        self.node(a).interference.contains(&b)
    }

    /// Hand out the next unused spill slot.
    pub fn next_spill_slot(&mut self) -> u32 {
        let slot = self.spill_slots;
        self.spill_slots += 1;
        slot
    }

    pub fn spill_slots(&self) -> u32 {
        self.spill_slots
    }
}
