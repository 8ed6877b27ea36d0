use xlat_common::ir::{BinaryOp, IrBuilder, IrGraph, NodeId, Op, ValueClass};
use xlat_common::Pass;

use super::{
    ConstProp, DeadContextStoreElimination, IrCompaction, IrValidation,
    RedundantContextLoadElimination, RedundantFlagCalculationElimination, SyscallOptimization,
};

fn linked_ops(ir: &IrGraph) -> Vec<Op> {
    ir.linear().map(|id| ir.get(id).op.clone()).collect()
}

#[test]
fn const_prop_folds_chains() {
    let mut builder = IrBuilder::new();
    let a = builder.constant(8, 2);
    let b = builder.constant(8, 3);
    let c = builder.add(8, a, b);
    let d = builder.binary(BinaryOp::Mul, 8, c, a);
    builder.store_context(8, 0, d);
    builder.exit();
    let mut ir = builder.build();

    assert!(ConstProp::new().run(&mut ir));
    assert_eq!(Op::Constant(5), ir.get(c).op);
    assert_eq!(Op::Constant(10), ir.get(d).op);
}

#[test]
fn const_prop_keeps_unknown_operands() {
    let mut builder = IrBuilder::new();
    let a = builder.constant(4, 2);
    let b = builder.load_context(4, 8, ValueClass::Integer);
    let c = builder.add(4, a, b);
    builder.exit();
    let mut ir = builder.build();

    assert!(!ConstProp::new().run(&mut ir));
    assert_eq!(Op::Binary(BinaryOp::Add, a, b), ir.get(c).op);
}

#[test]
fn overwritten_flags_are_removed() {
    let mut builder = IrBuilder::new();
    let x = builder.constant(1, 1);
    let first = builder.store_flag(0, x);
    let other = builder.store_flag(1, x);
    let second = builder.store_flag(0, x);
    builder.exit();
    let mut ir = builder.build();

    assert!(RedundantFlagCalculationElimination::new().run(&mut ir));
    assert!(!ir.is_linked(first));
    assert!(ir.is_linked(other));
    assert!(ir.is_linked(second));
}

#[test]
fn read_flags_are_kept() {
    let mut builder = IrBuilder::new();
    let x = builder.constant(1, 1);
    let first = builder.store_flag(0, x);
    builder.load_flag(0);
    builder.store_flag(0, x);
    let number = builder.constant(8, 60);
    let across = builder.store_flag(2, x);
    builder.syscall(vec![number]);
    builder.store_flag(2, x);
    builder.exit();
    let mut ir = builder.build();

    assert!(!RedundantFlagCalculationElimination::new().run(&mut ir));
    assert!(ir.is_linked(first));
    assert!(ir.is_linked(across));
}

#[test]
fn constant_syscalls_are_inlined() {
    let mut builder = IrBuilder::new();
    let number = builder.constant(8, 60);
    let code = builder.load_context(8, 0, ValueClass::Integer);
    let known = builder.syscall(vec![number, code]);
    let unknown = builder.syscall(vec![code]);
    builder.exit();
    let mut ir = builder.build();

    assert!(SyscallOptimization::new().run(&mut ir));
    assert_eq!(
        Op::InlineSyscall {
            number: 60,
            args: vec![code]
        },
        ir.get(known).op
    );
    assert_eq!(Op::Syscall(vec![code]), ir.get(unknown).op);
}

#[test]
fn covered_context_stores_are_removed() {
    let mut builder = IrBuilder::new();
    let x = builder.constant(8, 1);
    let narrow = builder.store_context(4, 20, x);
    let wide = builder.store_context(8, 16, x);
    let partial = builder.store_context(4, 16, x);
    builder.exit();
    let mut ir = builder.build();

    assert!(DeadContextStoreElimination::new().run(&mut ir));
    assert!(!ir.is_linked(narrow));
    assert!(ir.is_linked(wide));
    assert!(ir.is_linked(partial));
}

#[test]
fn loaded_context_stores_are_kept() {
    let mut builder = IrBuilder::new();
    let x = builder.constant(8, 1);
    let store = builder.store_context(8, 16, x);
    builder.load_context(1, 23, ValueClass::Integer);
    builder.store_context(8, 16, x);
    builder.exit();
    let mut ir = builder.build();

    assert!(!DeadContextStoreElimination::new().run(&mut ir));
    assert!(ir.is_linked(store));
}

#[test]
fn context_loads_are_forwarded() {
    let mut builder = IrBuilder::new();
    let x = builder.constant(8, 1);
    builder.store_context(8, 16, x);
    let load = builder.load_context(8, 16, ValueClass::Integer);
    let mismatched = builder.load_context(4, 16, ValueClass::Integer);
    let user = builder.add(8, load, mismatched);
    builder.exit();
    let mut ir = builder.build();

    assert!(RedundantContextLoadElimination::new().run(&mut ir));
    assert!(!ir.is_linked(load));
    assert!(ir.is_linked(mismatched));
    assert_eq!(Op::Binary(BinaryOp::Add, x, mismatched), ir.get(user).op);
}

#[test]
fn validation_accepts_well_formed_graphs() {
    let mut builder = IrBuilder::new();
    let next = builder.block();
    let x = builder.constant(8, 1);
    builder.cond_jump(x, next, next);
    builder.switch_to(next);
    builder.exit();
    let mut ir = builder.build();

    assert!(!IrValidation::new().run(&mut ir));
}

#[test]
#[should_panic(expected = "does not end in control flow")]
fn validation_rejects_unterminated_blocks() {
    let mut builder = IrBuilder::new();
    builder.constant(8, 1);
    let mut ir = builder.build();

    IrValidation::new().run(&mut ir);
}

#[test]
#[should_panic(expected = "before it is defined")]
fn validation_rejects_uses_before_definitions() {
    let mut builder = IrBuilder::new();
    let a = builder.constant(8, 1);
    let b = builder.constant(8, 2);
    let c = builder.add(8, a, b);
    builder.exit();
    let mut ir = builder.build();

    // Moving the definition of `a` after its use breaks program order.
    ir.unlink(a);
    let late = ir.insert_after(c, Op::Constant(1), 8);
    ir.get_mut(c).op = Op::Binary(BinaryOp::Add, late, b);

    IrValidation::new().run(&mut ir);
}

#[test]
fn compaction_renumbers_densely() {
    let mut builder = IrBuilder::new();
    let dead = builder.constant(8, 1);
    let a = builder.constant(8, 2);
    let b = builder.add(8, a, a);
    builder.store_context(8, 0, b);
    builder.exit();
    let mut ir = builder.build();

    ir.unlink(dead);
    let before = linked_ops(&ir);

    assert!(IrCompaction::new().run(&mut ir));
    assert_eq!(4, ir.node_count());
    assert_eq!(ir.node_count(), ir.linked_count());

    let order: Vec<_> = ir.linear().collect();
    assert_eq!((0..4).map(NodeId).collect::<Vec<_>>(), order);
    assert_eq!(Op::Binary(BinaryOp::Add, NodeId(0), NodeId(0)), ir.get(NodeId(1)).op);
    assert_eq!(before.len(), linked_ops(&ir).len());
}

#[test]
fn compaction_of_dense_graph_is_unchanged() {
    let mut builder = IrBuilder::new();
    let a = builder.constant(8, 2);
    builder.store_context(8, 0, a);
    builder.exit();
    let mut ir = builder.build();

    assert!(!IrCompaction::new().run(&mut ir));
}

#[test]
fn stores_at_the_top_of_the_context() {
    let mut builder = IrBuilder::new();
    let x = builder.constant(8, 1);
    let first = builder.store_context(8, u32::MAX, x);
    let second = builder.store_context(8, u32::MAX, x);
    let wrapped = builder.load_context(8, 0, ValueClass::Integer);
    builder.exit();
    let mut ir = builder.build();

    assert!(DeadContextStoreElimination::new().run(&mut ir));
    assert!(!ir.is_linked(first));
    assert!(ir.is_linked(second));

    assert!(!RedundantContextLoadElimination::new().run(&mut ir));
    assert!(ir.is_linked(wrapped));
}
