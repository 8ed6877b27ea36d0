use log::debug;
use xlat_common::ir::{IrGraph, NodeId};
use xlat_common::Pass;

/// Rebuilds the node arena so it contains exactly the linked nodes, numbered
/// densely in program order. Any index-keyed data computed before compaction
/// is invalid afterwards.
#[derive(Debug, Default)]
pub struct IrCompaction;

impl IrCompaction {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for IrCompaction {
    fn name(&self) -> &'static str {
        "ir-compaction"
    }

    fn run(&mut self, ir: &mut IrGraph) -> bool {
        let mut compacted = IrGraph::new();
        for _ in 0..ir.block_count() {
            compacted.add_block();
        }

        let mut remap: Vec<Option<NodeId>> = vec![None; ir.node_count()];

        for (block_id, block) in ir.blocks() {
            for id in block.nodes.iter().copied() {
                let node = ir.get(id);
                let mut op = node.op.clone();
                op.map_operands(|operand| {
                    remap[operand.index()]
                        .unwrap_or_else(|| panic!("{id} uses {operand} before it is defined"))
                });

                remap[id.index()] = Some(compacted.push(block_id, op, node.size));
            }
        }

        let changed = remap
            .iter()
            .enumerate()
            .any(|(old, new)| *new != Some(NodeId::from(old)));

        debug!(
            "compacted {} slots into {}",
            ir.node_count(),
            compacted.node_count()
        );

        *ir = compacted;
        changed
    }
}
