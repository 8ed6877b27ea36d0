use std::collections::HashMap;

use log::trace;
use xlat_common::ir::{IrGraph, NodeId, Op};
use xlat_common::Pass;

/// Removes flag stores that are overwritten within the same block before
/// anything could have read them.
#[derive(Debug, Default)]
pub struct RedundantFlagCalculationElimination;

impl RedundantFlagCalculationElimination {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for RedundantFlagCalculationElimination {
    fn name(&self) -> &'static str {
        "redundant-flag-calculation-elimination"
    }

    fn run(&mut self, ir: &mut IrGraph) -> bool {
        let mut dead = Vec::new();

        for (_, block) in ir.blocks() {
            let mut pending: HashMap<u8, NodeId> = HashMap::new();

            for id in block.nodes.iter().copied() {
                match &ir.get(id).op {
                    Op::StoreFlag(flag, _) => {
                        if let Some(previous) = pending.insert(*flag, id) {
                            dead.push(previous);
                        }
                    }

                    Op::LoadFlag(flag) => {
                        pending.remove(flag);
                    }

                    op if op.is_barrier() => pending.clear(),

                    _ => {}
                }
            }
        }

        trace!("removing {} overwritten flag stores", dead.len());

        for id in dead.iter().copied() {
            ir.unlink(id);
        }

        !dead.is_empty()
    }
}
