use log::trace;
use xlat_common::ir::{IrGraph, NodeId, Op};

/// Store `value` to `slot` right after it is defined, and reload it from the
/// slot right before each of its uses.
pub fn insert_spill(ir: &mut IrGraph, value: NodeId, slot: u32) {
    let node = ir.get(value);
    let size = node.size;
    let Some(class) = node.result() else {
        panic!("{value} produces no value to spill");
    };

    let users: Vec<NodeId> = ir
        .linear()
        .filter(|id| ir.get(*id).op.operands().contains(&value))
        .collect();

    ir.insert_after(value, Op::SpillRegister { value, slot }, size);

    for user in users {
        let fill = ir.insert_before(user, Op::FillRegister { slot, class }, size);
        ir.get_mut(user)
            .op
            .map_operands(|operand| if operand == value { fill } else { operand });

        trace!("{user} now reads {value} through {fill}");
    }
}
