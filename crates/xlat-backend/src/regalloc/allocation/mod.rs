//! Greedy coloring of the register graph.
//!
//! Values are colored in the order they are defined, each taking the lowest
//! numbered register of its class that no interfering neighbor holds. When a
//! class runs dry, an already colored neighbor is evicted to a spill slot and
//! its register handed over.

mod check;
mod fit;
mod spill;
mod unavailable;

use log::{debug, trace};
use xlat_common::ir::NodeId;

use super::{Assignment, LiveRange, RegisterGraph};

#[derive(Debug, Default)]
pub struct Allocation {
    /// Nodes that were sent to a spill slot, with their slot.
    pub spilled: Vec<(NodeId, u32)>,

    /// Whether some node got neither a register nor a spill slot.
    pub failed: bool,
}

/// Color every node that has a live range. The graph must already hold the
/// node classes and interference edges.
///
/// Nodes marked in `spilled_before` already live in a spill slot and are
/// never picked for spilling again.
pub fn allocate(
    graph: &mut RegisterGraph,
    ranges: &[Option<LiveRange>],
    spilled_before: &[bool],
    supports_spills: bool,
) -> Allocation {
    let allocator = Allocator {
        graph,
        ranges,
        spilled_before,
        supports_spills,
    };

    allocator.allocate()
}

struct Allocator<'a> {
    graph: &'a mut RegisterGraph,
    ranges: &'a [Option<LiveRange>],
    spilled_before: &'a [bool],
    supports_spills: bool,
}

impl Allocator<'_> {
    fn allocate(mut self) -> Allocation {
        let mut order: Vec<(u32, NodeId)> = self
            .ranges
            .iter()
            .enumerate()
            .filter_map(|(index, range)| range.map(|range| (range.begin, NodeId::from(index))))
            .collect();
        order.sort();

        let mut allocation = Allocation::default();

        for (_, id) in order {
            let Some(class) = self.graph.node(id).class else {
                panic!("{id} is live but has no register class");
            };

            let unavailable = self.unavailable_physical(id);
            if let Some(register) = self.first_fitting_reg(class, &unavailable) {
                trace!("{id} gets {register}");
                self.graph.node_mut(id).assignment = Assignment::Register(register);
                continue;
            }

            if !self.supports_spills {
                debug!("out of {class} registers at {id} and spilling is off");
                allocation.failed = true;
                continue;
            }

            // `id` is never spilled itself; without a victim the unit fails.
            let Some(victim) = self.spill_candidate(id) else {
                debug!("no register or spill candidate for {id}");
                allocation.failed = true;
                continue;
            };

            let Assignment::Register(register) = self.graph.node(victim).assignment else {
                unreachable!()
            };

            let slot = self.graph.next_spill_slot();
            debug!("spilling {victim} to slot {slot} to free {register} for {id}");

            self.graph.node_mut(victim).assignment = Assignment::Spilled(slot);
            self.graph.node_mut(id).assignment = Assignment::Register(register);
            allocation.spilled.push((victim, slot));
        }

        self.check_consistency();
        allocation
    }

    fn range(&self, id: NodeId) -> LiveRange {
        match self.ranges.get(id.index()).copied().flatten() {
            Some(range) => range,
            None => unreachable!("{id} has no live range"),
        }
    }
}
