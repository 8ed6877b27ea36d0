use log::trace;
use xlat_common::ir::{IrGraph, Op};
use xlat_common::Pass;

/// Folds integer arithmetic whose operands are both constants.
#[derive(Debug, Default)]
pub struct ConstProp;

impl ConstProp {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for ConstProp {
    fn name(&self) -> &'static str {
        "const-prop"
    }

    fn run(&mut self, ir: &mut IrGraph) -> bool {
        let order: Vec<_> = ir.linear().collect();
        let mut folded = 0;

        for id in order {
            let node = ir.get(id);
            let Op::Binary(op, left, right) = node.op else {
                continue;
            };

            let (Op::Constant(left), Op::Constant(right)) = (&ir.get(left).op, &ir.get(right).op)
            else {
                continue;
            };

            let value = op.fold(*left, *right, node.size);
            ir.get_mut(id).op = Op::Constant(value);
            folded += 1;
        }

        trace!("folded {folded} constant expressions");
        folded > 0
    }
}
