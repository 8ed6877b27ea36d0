use std::sync::Arc;
use std::thread;

use xlat_common::ir::{IrBuilder, IrGraph, NodeId, Op, ValueClass};
use xlat_common::Pass;

use super::{
    liveness, Assignment, LiveRange, PhysicalRegister, RegisterAllocationPass, RegisterClass,
    RegisterSet, UNSPILLABLE,
};

fn register_set(gprs: u32, fprs: u32) -> Arc<RegisterSet> {
    let mut set = RegisterSet::new(gprs + fprs, 2);
    set.add_registers(RegisterClass::GPR, 0, gprs);
    set.add_registers(RegisterClass::FPR, gprs, fprs);
    Arc::new(set)
}

/// A pass prepared for `ranges.len()` hand-made general purpose values.
fn by_hand(gprs: u32, ranges: &[LiveRange]) -> RegisterAllocationPass {
    let mut pass = RegisterAllocationPass::new();
    pass.allocate_register_graph(register_set(gprs, 0), ranges.len());

    for (index, range) in ranges.iter().enumerate() {
        pass.set_node_class(NodeId::from(index), RegisterClass::GPR);
        pass.set_live_range(NodeId::from(index), *range);
    }

    pass
}

fn gpr(number: u32) -> PhysicalRegister {
    PhysicalRegister {
        class: RegisterClass::GPR,
        number,
    }
}

fn count_ops(ir: &IrGraph, pred: impl Fn(&Op) -> bool) -> usize {
    ir.linear().filter(|id| pred(&ir.get(*id).op)).count()
}

/// Four constants live at once, combined pairwise and then together.
fn four_live() -> IrGraph {
    let mut builder = IrBuilder::new();
    let a = builder.constant(8, 1);
    let b = builder.constant(8, 2);
    let c = builder.constant(8, 3);
    let d = builder.constant(8, 4);
    let x = builder.add(8, a, b);
    let y = builder.add(8, c, d);
    let z = builder.add(8, x, y);
    builder.store_context(8, 0, z);
    builder.exit();
    builder.build()
}

#[test]
fn register_set_classes() {
    let set = register_set(3, 2);

    assert_eq!(2, set.class_count());
    assert_eq!(3, set.count(RegisterClass::GPR));
    assert_eq!(
        vec![3, 4],
        set.registers(RegisterClass::FPR)
            .map(|register| register.number)
            .collect::<Vec<_>>()
    );
    assert!(set.contains(gpr(2)));
    assert!(!set.contains(gpr(3)));
}

#[test]
#[should_panic(expected = "overlaps the registers of another class")]
fn register_classes_are_disjoint() {
    let mut set = RegisterSet::new(4, 2);
    set.add_registers(RegisterClass::GPR, 0, 3);
    set.add_registers(RegisterClass::FPR, 2, 2);
}

#[test]
fn disjoint_ranges_share_a_register() {
    let mut pass = by_hand(1, &[LiveRange::new(0, 2, 3), LiveRange::new(3, 5, 3)]);

    assert!(pass.allocate_registers());
    assert!(pass.had_full_ra());
    assert!(!pass.has_spills());
    assert_eq!(Some(gpr(0)), pass.get_node_register(NodeId(0)));
    assert_eq!(Some(gpr(0)), pass.get_node_register(NodeId(1)));
}

#[test]
fn three_live_values_in_two_registers_spill_once() {
    let range = LiveRange::new(0, 10, 3);
    let mut pass = by_hand(2, &[range, range, range]);

    assert!(pass.allocate_registers());
    assert!(!pass.had_full_ra());
    assert!(pass.has_spills());
    assert_eq!(1, pass.spill_slots());

    assert_eq!(Assignment::Spilled(0), pass.get_node_assignment(NodeId(0)));
    assert_eq!(Some(gpr(1)), pass.get_node_register(NodeId(1)));
    assert_eq!(Some(gpr(0)), pass.get_node_register(NodeId(2)));
}

#[test]
fn disabled_spilling_reports_failure() {
    let range = LiveRange::new(0, 10, 3);
    let mut pass = by_hand(2, &[range, range, range]);
    pass.set_supports_spills(false);

    assert!(!pass.allocate_registers());
    assert!(!pass.had_full_ra());
    assert!(!pass.has_spills());
    assert!(!pass.succeeded());
    assert_eq!(0, pass.spill_slots());
}

#[test]
fn disabled_spilling_leaves_the_graph_alone() {
    let mut ir = four_live();
    let before = ir.clone();

    let mut pass = RegisterAllocationPass::with_register_set(register_set(3, 0));
    pass.set_supports_spills(false);

    assert!(!pass.run(&mut ir));
    assert!(!pass.had_full_ra());
    assert!(!pass.has_spills());
    assert_eq!(before.node_count(), ir.node_count());
    assert_eq!(
        before.linear().collect::<Vec<_>>(),
        ir.linear().collect::<Vec<_>>()
    );
}

#[test]
fn cheapest_neighbor_is_spilled() {
    let mut pass = by_hand(
        2,
        &[
            LiveRange::new(0, 10, 3),
            LiveRange::new(0, 10, 1),
            LiveRange::new(0, 10, 3),
        ],
    );

    assert!(pass.allocate_registers());
    assert_eq!(Assignment::Spilled(0), pass.get_node_assignment(NodeId(1)));
    assert_eq!(Some(gpr(1)), pass.get_node_register(NodeId(2)));
}

#[test]
fn fills_are_never_spilled() {
    let mut pass = by_hand(
        1,
        &[
            LiveRange::new(0, 4, UNSPILLABLE),
            LiveRange::new(1, 2, UNSPILLABLE),
        ],
    );

    assert!(!pass.allocate_registers());
    assert!(!pass.succeeded());
    assert_eq!(Assignment::Unassigned, pass.get_node_assignment(NodeId(1)));
}

#[test]
fn overlap_is_inclusive() {
    let mut pass = by_hand(4, &[LiveRange::new(0, 4, 1), LiveRange::new(4, 6, 1)]);
    pass.allocate_registers();
    assert!(pass.graph().interferes(NodeId(0), NodeId(1)));

    let mut pass = by_hand(4, &[LiveRange::new(0, 3, 1), LiveRange::new(4, 6, 1)]);
    pass.allocate_registers();
    assert!(!pass.graph().interferes(NodeId(0), NodeId(1)));
}

#[test]
fn classes_do_not_interfere() {
    let mut pass = RegisterAllocationPass::new();
    pass.allocate_register_graph(register_set(1, 1), 2);
    pass.set_node_class(NodeId(0), RegisterClass::GPR);
    pass.set_node_class(NodeId(1), RegisterClass::FPR);
    pass.set_live_range(NodeId(0), LiveRange::new(0, 5, 1));
    pass.set_live_range(NodeId(1), LiveRange::new(0, 5, 4));

    assert!(pass.allocate_registers());
    assert!(pass.had_full_ra());
    assert!(!pass.graph().interferes(NodeId(0), NodeId(1)));
    assert_eq!(RegisterClass::FPR, pass.get_node_register(NodeId(1)).unwrap().class);
}

#[test]
#[should_panic(expected = "has no register class")]
fn live_nodes_need_a_class() {
    let mut pass = RegisterAllocationPass::new();
    pass.allocate_register_graph(register_set(1, 0), 1);
    pass.set_live_range(NodeId(0), LiveRange::new(0, 1, 1));
    pass.allocate_registers();
}

#[test]
fn enough_registers_means_no_spills() {
    let mut builder = IrBuilder::new();
    let a = builder.constant(8, 1);
    let b = builder.load_context(8, 16, ValueClass::Integer);
    let c = builder.add(8, a, b);
    builder.store_context(8, 16, c);
    builder.exit();
    let mut ir = builder.build();

    let mut pass = RegisterAllocationPass::with_register_set(register_set(3, 0));

    assert!(!pass.run(&mut ir));
    assert!(pass.had_full_ra());
    assert!(!pass.has_spills());
    for id in [a, b, c] {
        assert!(pass.get_node_register(id).is_some());
    }
}

#[test]
fn spills_are_written_into_the_graph() {
    let mut ir = four_live();
    let mut pass = RegisterAllocationPass::with_register_set(register_set(3, 0));

    assert!(pass.run(&mut ir));
    assert!(pass.succeeded());
    assert!(pass.has_spills());
    assert!(!pass.had_full_ra());
    assert_eq!(3, pass.spill_slots());

    let mut slots: Vec<u32> = ir
        .linear()
        .filter_map(|id| match ir.get(id).op {
            Op::SpillRegister { slot, .. } => Some(slot),
            _ => None,
        })
        .collect();
    slots.sort();
    assert_eq!(vec![0, 1, 2], slots);
    assert_eq!(3, count_ops(&ir, |op| matches!(op, Op::FillRegister { .. })));

    for id in ir.linear() {
        if ir.get(id).result().is_some() {
            assert!(pass.get_node_register(id).is_some(), "{id} has no register");
        }
    }
}

#[test]
fn hopeless_allocation_terminates() {
    let mut builder = IrBuilder::new();
    let a = builder.constant(8, 1);
    let b = builder.constant(8, 2);
    builder.add(8, a, b);
    builder.exit();
    let mut ir = builder.build();

    let mut pass = RegisterAllocationPass::with_register_set(register_set(1, 0));
    pass.run(&mut ir);

    assert!(!pass.succeeded());
    assert!(!pass.had_full_ra());
    assert!(!pass.has_spills());
    assert_eq!(0, pass.spill_slots());
}

#[test]
fn failed_units_are_not_rewritten() {
    let mut builder = IrBuilder::new();
    let a = builder.load_context(8, 0, ValueClass::Integer);
    let b = builder.load_context(8, 8, ValueClass::Integer);
    let c = builder.add(8, a, b);
    builder.store_context(8, 16, c);
    builder.exit();
    let mut ir = builder.build();
    let before = ir.clone();

    // Both operands die where `c` is defined, so there is nothing to evict.
    let mut pass = RegisterAllocationPass::with_register_set(register_set(2, 0));

    assert!(!pass.run(&mut ir));
    assert!(!pass.succeeded());
    assert_eq!(0, pass.spill_slots());
    assert_eq!(Assignment::Unassigned, pass.get_node_assignment(c));
    assert_eq!(before.node_count(), ir.node_count());
    assert_eq!(
        before.linear().collect::<Vec<_>>(),
        ir.linear().collect::<Vec<_>>()
    );
    assert_eq!(0, count_ops(&ir, |op| matches!(op, Op::SpillRegister { .. })));
}

#[test]
fn reset_allocation_is_deterministic() {
    let ir = four_live();
    let mut pass = RegisterAllocationPass::with_register_set(register_set(5, 0));

    let mut first = ir.clone();
    pass.run(&mut first);
    let assignments: Vec<_> = first.linear().map(|id| pass.get_node_assignment(id)).collect();

    let mut second = ir.clone();
    pass.run(&mut second);
    let again: Vec<_> = second.linear().map(|id| pass.get_node_assignment(id)).collect();

    assert!(pass.had_full_ra());
    assert_eq!(assignments, again);
}

#[test]
fn values_live_across_loops() {
    let mut builder = IrBuilder::new();
    let body = builder.block();
    let done = builder.block();

    let a = builder.constant(8, 1);
    builder.jump(body);

    builder.switch_to(body);
    let b = builder.add(8, a, a);
    builder.cond_jump(b, body, done);

    builder.switch_to(done);
    builder.exit();
    let ir = builder.build();

    let ranges = liveness(&ir);

    assert_eq!(Some(LiveRange::new(0, 3, 1)), ranges[a.index()]);
    assert_eq!(Some(LiveRange::new(2, 3, 3)), ranges[b.index()]);
}

#[test]
#[should_panic(expected = "which is not defined before it")]
fn uses_need_earlier_definitions() {
    let mut builder = IrBuilder::new();
    let a = builder.constant(8, 1);
    let b = builder.constant(8, 2);
    let c = builder.add(8, a, b);
    builder.exit();
    let mut ir = builder.build();

    let late = ir.insert_after(c, Op::Constant(3), 8);
    ir.get_mut(c).op = Op::Binary(xlat_common::ir::BinaryOp::Add, late, b);

    liveness(&ir);
}

#[test]
fn register_sets_are_shared_between_threads() {
    let set = register_set(3, 2);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                let mut ir = four_live();
                let mut pass = RegisterAllocationPass::with_register_set(set);
                pass.run(&mut ir);
                (pass.spill_slots(), ir.node_count())
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert!(results.iter().all(|result| *result == (3, results[0].1)));
}
