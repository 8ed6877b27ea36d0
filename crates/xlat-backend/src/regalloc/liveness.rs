//! Linear live ranges over the program order of a graph.
//!
//! Every node is given a position by walking the blocks in layout order. A
//! value lives from the position of its definition to the position of its last
//! use. Jumps back to an earlier block form loops; a value defined before such
//! a loop and used inside it has to survive the whole loop, so its range is
//! stretched to the position of the backwards jump.

use log::trace;
use xlat_common::ir::{IrGraph, Op};

/// Rematerialization cost of values that can only come back from a spill
/// slot. Values with this cost are never chosen for spilling.
pub const UNSPILLABLE: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LiveRange {
    pub begin: u32,
    pub end: u32,

    /// Relative cost of computing the value again instead of keeping it in a
    /// register. Lower is a better spill candidate.
    pub remat_cost: u32,
}

impl LiveRange {
    pub fn new(begin: u32, end: u32, remat_cost: u32) -> Self {
        assert!(begin <= end, "live range ends at {end} before it begins at {begin}");
        Self {
            begin,
            end,
            remat_cost,
        }
    }

    /// Ranges overlap unless one ends strictly before the other begins, so a
    /// value last used by a node still conflicts with that node's result.
    pub fn overlaps(&self, other: &LiveRange) -> bool {
        !(self.end < other.begin || other.end < self.begin)
    }

    pub fn is_spillable(&self) -> bool {
        self.remat_cost != UNSPILLABLE
    }
}

pub fn remat_cost(op: &Op) -> u32 {
    match op {
        Op::Constant(_) => 1,
        Op::LoadContext { .. } | Op::LoadFlag(_) => 2,
        Op::Binary(..) | Op::Syscall(_) | Op::InlineSyscall { .. } => 3,
        Op::FillRegister { .. } => UNSPILLABLE,
        _ => 4,
    }
}

/// Compute the live range of every value-producing node, indexed by node.
///
/// Panics if a node uses a value that has not been defined earlier in program
/// order.
pub fn liveness(ir: &IrGraph) -> Vec<Option<LiveRange>> {
    let mut ranges = Vec::new();
    liveness_into(ir, &mut ranges);
    ranges
}

/// Same as [`liveness`], but reuses the storage of `ranges`.
pub fn liveness_into(ir: &IrGraph, ranges: &mut Vec<Option<LiveRange>>) {
    ranges.clear();
    ranges.resize(ir.node_count(), None);

    let mut block_starts = vec![0; ir.block_count()];
    let mut jumps = Vec::new();
    let mut position = 0u32;

    for (block_id, block) in ir.blocks() {
        block_starts[block_id.index()] = position;

        for id in block.nodes.iter().copied() {
            let node = ir.get(id);

            node.op.for_each_operand(|operand| {
                let Some(range) = ranges[operand.index()].as_mut() else {
                    panic!("{id} uses {operand}, which is not defined before it");
                };

                range.end = range.end.max(position);
            });

            if node.result().is_some() {
                ranges[id.index()] = Some(LiveRange::new(position, position, remat_cost(&node.op)));
            }

            jumps.extend(node.op.successors().map(|target| (position, target)));
            position += 1;
        }
    }

    let loops: Vec<_> = jumps
        .into_iter()
        .map(|(from, target)| (block_starts[target.index()], from))
        .filter(|(start, from)| start <= from)
        .collect();

    // Loops can nest or share values, so keep going until nothing moves.
    loop {
        let mut changed = false;

        for (start, end) in loops.iter().copied() {
            for range in ranges.iter_mut().flatten() {
                if range.begin < start && range.end >= start && range.end < end {
                    trace!("extending live range {}..{} to {end}", range.begin, range.end);
                    range.end = end;
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }
}
