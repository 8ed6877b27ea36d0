use log::trace;
use xlat_common::ir::IrGraph;
use xlat_common::Pass;

/// Structural checks over the IR. Never changes anything; every violation is
/// a bug in whichever component produced the graph, so it panics.
#[derive(Debug, Default)]
pub struct IrValidation;

impl IrValidation {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for IrValidation {
    fn name(&self) -> &'static str {
        "ir-validation"
    }

    fn run(&mut self, ir: &mut IrGraph) -> bool {
        let positions = ir.positions();

        for (block_id, block) in ir.blocks() {
            let Some((last, body)) = block.nodes.split_last() else {
                panic!("{block_id} is empty");
            };

            assert!(
                ir.get(*last).op.is_terminator(),
                "{block_id} does not end in control flow"
            );

            for id in body {
                assert!(
                    !ir.get(*id).op.is_terminator(),
                    "{id} ends {block_id} early"
                );
            }

            for id in block.nodes.iter().copied() {
                let node = ir.get(id);
                assert_eq!(node.block, block_id, "{id} is listed in the wrong block");

                let Some(at) = positions[id.index()] else {
                    panic!("{id} is listed in {block_id} but not linked");
                };

                node.op.for_each_operand(|operand| {
                    assert!(
                        operand.index() < positions.len(),
                        "{id} uses {operand}, which is out of range"
                    );

                    match positions[operand.index()] {
                        Some(def) => {
                            assert!(def < at, "{id} uses {operand} before it is defined")
                        }
                        None => panic!("{id} uses unlinked {operand}"),
                    }

                    assert!(
                        ir.get(operand).result().is_some(),
                        "{id} uses {operand}, which has no result"
                    );
                });

                for target in node.op.successors() {
                    assert!(ir.has_block(target), "{id} jumps to missing {target}");
                }
            }
        }

        trace!("validated {} nodes", ir.linked_count());
        false
    }
}
