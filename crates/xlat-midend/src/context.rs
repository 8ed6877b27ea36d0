use std::collections::HashMap;
use std::ops::Range;

use log::trace;
use xlat_common::ir::{IrGraph, NodeId, Op};
use xlat_common::Pass;

/// The context bytes an access touches.
fn bytes(offset: u32, size: u8) -> Range<u64> {
    let start = u64::from(offset);
    start..start + u64::from(size)
}

fn overlaps(a: &Range<u64>, b: &Range<u64>) -> bool {
    a.start < b.end && b.start < a.end
}

fn covers(outer: &Range<u64>, inner: &Range<u64>) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}

/// Removes context stores whose bytes are completely overwritten later in the
/// same block without being read in between.
#[derive(Debug, Default)]
pub struct DeadContextStoreElimination;

impl DeadContextStoreElimination {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for DeadContextStoreElimination {
    fn name(&self) -> &'static str {
        "dead-context-store-elimination"
    }

    fn run(&mut self, ir: &mut IrGraph) -> bool {
        let mut dead = Vec::new();

        for (_, block) in ir.blocks() {
            let mut pending: Vec<(NodeId, Range<u64>)> = Vec::new();

            for id in block.nodes.iter().copied() {
                let node = ir.get(id);
                match &node.op {
                    Op::StoreContext { offset, .. } => {
                        let range = bytes(*offset, node.size);
                        pending.retain(|(store, written)| {
                            if covers(&range, written) {
                                dead.push(*store);
                                false
                            } else {
                                true
                            }
                        });

                        pending.push((id, range));
                    }

                    Op::LoadContext { offset, .. } => {
                        let range = bytes(*offset, node.size);
                        pending.retain(|(_, written)| !overlaps(&range, written));
                    }

                    op if op.is_barrier() => pending.clear(),

                    _ => {}
                }
            }
        }

        trace!("removing {} dead context stores", dead.len());

        for id in dead.iter().copied() {
            ir.unlink(id);
        }

        !dead.is_empty()
    }
}

/// Forwards a value stored to the context to a later load of exactly the same
/// bytes in the same block.
///
/// Kept out of the default pipeline: forwarding across a partial-width store
/// into the same register has produced corrupted guest state.
#[derive(Debug, Default)]
pub struct RedundantContextLoadElimination;

impl RedundantContextLoadElimination {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for RedundantContextLoadElimination {
    fn name(&self) -> &'static str {
        "redundant-context-load-elimination"
    }

    fn run(&mut self, ir: &mut IrGraph) -> bool {
        let blocks: Vec<Vec<NodeId>> = ir.blocks().map(|(_, block)| block.nodes.clone()).collect();
        let mut forwarded = 0;

        for nodes in blocks {
            let mut known: HashMap<(u32, u8), NodeId> = HashMap::new();

            for id in nodes {
                let size = ir.get(id).size;
                match ir.get(id).op.clone() {
                    Op::StoreContext { offset, value } => {
                        let range = bytes(offset, size);
                        known.retain(|(other, width), _| !overlaps(&range, &bytes(*other, *width)));
                        known.insert((offset, size), value);
                    }

                    Op::LoadContext { offset, class } => {
                        let Some(value) = known.get(&(offset, size)).copied() else {
                            continue;
                        };

                        if ir.get(value).result() != Some(class) {
                            continue;
                        }

                        trace!("forwarding {value} to the load at {id}");
                        ir.replace_uses(id, value);
                        ir.unlink(id);
                        forwarded += 1;
                    }

                    op if op.is_barrier() => known.clear(),

                    _ => {}
                }
            }
        }

        forwarded > 0
    }
}
