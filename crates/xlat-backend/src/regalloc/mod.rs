//! Register allocation over an [`IrGraph`].
//!
//! The allocator works on a [`RegisterGraph`] with one node per IR node. A run
//! goes through the same steps every time:
//!
//! 1. Give every value-producing node the register class of its value.
//! 2. Compute a [`LiveRange`] for every such node.
//! 3. Connect same-class nodes whose ranges overlap.
//! 4. Color the graph, evicting values to spill slots when a class runs out.
//!
//! If anything was spilled, spill and fill nodes are inserted into the IR and
//! the whole thing runs again on the rewritten graph, until a run gets by
//! without new spills.
//!
//! The steps after the first two are also usable on their own: set the node
//! classes and live ranges by hand and call
//! [`allocate_registers`](RegisterAllocationPass::allocate_registers).

pub use graph::{Assignment, RegisterGraph, RegisterNode};
pub use liveness::{liveness, remat_cost, LiveRange, UNSPILLABLE};
pub use registers::{PhysicalRegister, RegisterClass, RegisterSet};

mod allocation;
mod graph;
mod interfere;
mod liveness;
mod registers;
mod rewrite;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use log::{debug, info};
use xlat_common::ir::{IrGraph, NodeId};
use xlat_common::Pass;

use allocation::{allocate, Allocation};
use interfere::interference;
use liveness::liveness_into;

pub const PASS_NAME: &str = "register-allocation";

#[derive(Debug)]
pub struct RegisterAllocationPass {
    graph: Option<RegisterGraph>,
    ranges: Vec<Option<LiveRange>>,
    supports_spills: bool,

    had_full_ra: bool,
    has_spills: bool,
    spill_slots: u32,
}

impl RegisterAllocationPass {
    /// Create a pass without a register graph. One must be allocated with
    /// [`allocate_register_graph`](Self::allocate_register_graph) before the
    /// pass can run.
    pub fn new() -> Self {
        Self {
            graph: None,
            ranges: Vec::new(),
            supports_spills: true,
            had_full_ra: false,
            has_spills: false,
            spill_slots: 0,
        }
    }

    pub fn with_register_set(set: Arc<RegisterSet>) -> Self {
        let mut pass = Self::new();
        pass.allocate_register_graph(set, 0);
        pass
    }

    pub fn allocate_register_graph(&mut self, set: Arc<RegisterSet>, node_count: usize) {
        self.graph = Some(RegisterGraph::new(set, node_count));
        self.ranges.clear();
        self.ranges.resize(node_count, None);
    }

    /// Prepare the graph for a new allocation of `node_count` nodes, keeping
    /// the storage of the previous one.
    pub fn reset_register_graph(&mut self, node_count: usize) {
        self.graph_mut().reset(node_count);
        self.ranges.clear();
        self.ranges.resize(node_count, None);

        self.had_full_ra = false;
        self.has_spills = false;
        self.spill_slots = 0;
    }

    pub fn set_node_class(&mut self, node: NodeId, class: RegisterClass) {
        let graph = self.graph_mut();
        assert!(
            graph.set().has_class(class),
            "{class} is not a class of the register set"
        );

        graph.node_mut(node).class = Some(class);
    }

    pub fn set_live_range(&mut self, node: NodeId, range: LiveRange) {
        assert!(
            node.index() < self.ranges.len(),
            "register node {node} out of range"
        );

        self.ranges[node.index()] = Some(range);
    }

    /// Build the interference edges and color the graph from the classes and
    /// live ranges set so far. Returns whether every live node ended up in a
    /// register or a spill slot.
    pub fn allocate_registers(&mut self) -> bool {
        !self.allocate_with(&[]).failed
    }

    pub fn get_node_register(&self, node: NodeId) -> Option<PhysicalRegister> {
        self.graph().node(node).assignment.register()
    }

    pub fn get_node_assignment(&self, node: NodeId) -> Assignment {
        self.graph().node(node).assignment
    }

    pub fn live_range(&self, node: NodeId) -> Option<LiveRange> {
        self.ranges.get(node.index()).copied().flatten()
    }

    pub fn graph(&self) -> &RegisterGraph {
        match self.graph.as_ref() {
            Some(graph) => graph,
            None => panic!("the register graph has not been allocated"),
        }
    }

    /// Whether the last allocation fit every value in a register without
    /// spilling.
    pub fn had_full_ra(&self) -> bool {
        self.had_full_ra
    }

    /// Whether the last allocation succeeded by spilling.
    pub fn has_spills(&self) -> bool {
        self.has_spills
    }

    pub fn spill_slots(&self) -> u32 {
        self.spill_slots
    }

    /// Whether the code can be emitted with the last allocation. When this is
    /// false the caller has to fall back to interpreting the block.
    pub fn succeeded(&self) -> bool {
        self.had_full_ra || self.has_spills
    }

    pub fn set_supports_spills(&mut self, supports: bool) {
        self.supports_spills = supports;
    }

    pub fn supports_spills(&self) -> bool {
        self.supports_spills
    }

    fn graph_mut(&mut self) -> &mut RegisterGraph {
        match self.graph.as_mut() {
            Some(graph) => graph,
            None => panic!("the register graph has not been allocated"),
        }
    }

    fn find_node_classes(&mut self, ir: &IrGraph) {
        for id in ir.linear() {
            if let Some(class) = ir.get(id).result() {
                self.set_node_class(id, RegisterClass::of(class));
            }
        }
    }

    fn allocate_with(&mut self, spilled_before: &[bool]) -> Allocation {
        let Some(graph) = self.graph.as_mut() else {
            panic!("the register graph has not been allocated");
        };

        graph.clear_allocation();
        interference(graph, &self.ranges);

        let allocation = allocate(graph, &self.ranges, spilled_before, self.supports_spills);

        self.had_full_ra = !allocation.failed && allocation.spilled.is_empty();
        self.has_spills = !allocation.failed && !allocation.spilled.is_empty();
        self.spill_slots = graph.spill_slots();

        allocation
    }

    fn finish(&mut self, succeeded: bool, slots: u32) {
        self.had_full_ra = succeeded && slots == 0;
        self.has_spills = succeeded && slots > 0;
        self.spill_slots = slots;
    }
}

impl Default for RegisterAllocationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for RegisterAllocationPass {
    fn name(&self) -> &'static str {
        PASS_NAME
    }

    /// Allocate registers for `ir`, inserting spill and fill nodes as needed.
    /// Returns whether the graph was rewritten.
    fn run(&mut self, ir: &mut IrGraph) -> bool {
        let mut spilled = Vec::new();
        let mut slots = 0;
        let mut changed = false;

        // Every round spills at least one value that was never spilled before,
        // so this many rounds are enough unless something is wrong.
        let rounds = ir.node_count() + 1;

        for round in 0..rounds {
            self.reset_register_graph(ir.node_count());
            self.find_node_classes(ir);
            liveness_into(ir, &mut self.ranges);

            let allocation = self.allocate_with(&spilled);

            if allocation.failed {
                info!("register allocation failed after {round} spill rounds");
                self.finish(false, slots);
                return changed;
            }

            if allocation.spilled.is_empty() {
                debug!(
                    "allocated {} nodes with {slots} spill slots in {} rounds",
                    ir.node_count(),
                    round + 1
                );

                self.finish(true, slots);
                return changed;
            }

            spilled.resize(ir.node_count(), false);
            for (value, slot) in allocation.spilled {
                spilled[value.index()] = true;
                rewrite::insert_spill(ir, value, slots + slot);
            }

            slots += self.spill_slots;
            changed = true;
        }

        info!("register allocation did not settle after {rounds} rounds");
        self.finish(false, slots);
        changed
    }
}
