use std::sync::Arc;

use xlat_backend::regalloc::{RegisterAllocationPass, RegisterClass, RegisterSet};
use xlat_common::ir::{IrBuilder, IrGraph, Op, ValueClass};
use xlat_common::{Driver, IrOutput, Silent};

use super::{PassManager, PassState};

#[derive(Default)]
struct Recorder {
    outputs: Vec<IrOutput>,
    last: String,
}

impl Driver for Recorder {
    fn output_ir(&mut self, at: IrOutput, data: impl FnOnce() -> String) {
        self.outputs.push(at);
        self.last = data();
    }
}

fn default_manager() -> PassManager {
    let mut manager = PassManager::new();
    manager.add_default_passes();
    manager.add_default_validation_passes();
    manager
}

fn allocator(gprs: u32) -> RegisterAllocationPass {
    let mut set = RegisterSet::new(gprs + 4, 2);
    set.add_registers(RegisterClass::GPR, 0, gprs);
    set.add_registers(RegisterClass::FPR, gprs, 4);
    RegisterAllocationPass::with_register_set(Arc::new(set))
}

fn redundant() -> IrGraph {
    let mut builder = IrBuilder::new();
    let a = builder.constant(8, 2);
    let b = builder.constant(8, 3);
    let c = builder.add(8, a, b);
    builder.store_context(8, 16, c);
    builder.store_context(8, 16, c);
    let flag = builder.constant(1, 1);
    builder.store_flag(0, flag);
    builder.store_flag(0, flag);
    let number = builder.constant(8, 60);
    builder.syscall(vec![number, c]);
    builder.exit();
    builder.build()
}

#[test]
fn default_pipeline_order() {
    let manager = default_manager();
    let names: Vec<_> = manager.entries().map(|entry| entry.name()).collect();

    assert_eq!(
        vec![
            "const-prop",
            "redundant-context-load-elimination",
            "redundant-flag-calculation-elimination",
            "syscall-optimization",
            "dead-context-store-elimination",
            "ir-compaction",
            "ir-validation",
        ],
        names
    );

    let last_enabled = manager.entries().filter(|entry| entry.is_enabled()).last();
    assert_eq!(Some("ir-compaction"), last_enabled.map(|entry| entry.name()));
}

#[test]
fn known_bad_passes_are_disabled() {
    let manager = default_manager();

    for entry in manager.entries() {
        match entry.name() {
            "redundant-context-load-elimination" | "ir-validation" => {
                assert!(matches!(entry.state(), PassState::Disabled(_)))
            }
            _ => assert_eq!(PassState::Enabled, entry.state()),
        }
    }
}

#[test]
fn passes_toggle_by_name() {
    let mut manager = default_manager();

    assert!(manager.enable("ir-validation"));
    assert!(manager.disable("const-prop", "testing"));
    assert!(!manager.enable("no-such-pass"));

    let states: Vec<_> = manager
        .entries()
        .filter(|entry| matches!(entry.name(), "ir-validation" | "const-prop"))
        .map(|entry| entry.state())
        .collect();

    assert_eq!(
        vec![PassState::Disabled("testing"), PassState::Enabled],
        states
    );
}

#[test]
#[should_panic(expected = "added twice")]
fn passes_are_unique() {
    let mut manager = default_manager();
    manager.add_default_passes();
}

#[test]
fn run_leaves_a_dense_graph() {
    let mut manager = default_manager();
    let mut ir = redundant();

    assert!(manager.run(&mut Silent, &mut ir));
    assert_eq!(ir.node_count(), ir.linked_count());

    let ops: Vec<_> = ir.linear().map(|id| ir.get(id).op.clone()).collect();
    assert_eq!(Op::Constant(5), ops[2]);
    assert_eq!(
        1,
        ops.iter()
            .filter(|op| matches!(op, Op::StoreContext { .. }))
            .count()
    );
    assert_eq!(
        1,
        ops.iter()
            .filter(|op| matches!(op, Op::StoreFlag(..)))
            .count()
    );
    assert!(ops
        .iter()
        .any(|op| matches!(op, Op::InlineSyscall { number: 60, .. })));
}

#[test]
fn driver_sees_every_enabled_pass() {
    let mut manager = default_manager();
    manager.insert_register_allocation_pass(allocator(8));
    let mut driver = Recorder::default();
    let mut ir = redundant();

    manager.run(&mut driver, &mut ir);

    assert_eq!(
        vec![
            IrOutput::Pass("const-prop"),
            IrOutput::Pass("redundant-flag-calculation-elimination"),
            IrOutput::Pass("syscall-optimization"),
            IrOutput::Pass("dead-context-store-elimination"),
            IrOutput::Pass("ir-compaction"),
            IrOutput::Allocation,
        ],
        driver.outputs
    );
    assert!(driver.last.starts_with("block0:"));
}

#[test]
fn allocation_runs_last() {
    let mut manager = default_manager();
    manager.insert_register_allocation_pass(allocator(8));
    let mut ir = redundant();

    manager.run(&mut Silent, &mut ir);

    let allocation = manager.register_allocation().unwrap();
    assert!(allocation.had_full_ra());
    assert!(!allocation.has_spills());

    for id in ir.linear() {
        if ir.get(id).result().is_some() {
            assert!(allocation.get_node_register(id).is_some());
        }
    }
}

#[test]
fn validation_accepts_pipeline_output() {
    let mut manager = default_manager();
    manager.enable("ir-validation");
    manager.insert_register_allocation_pass(allocator(3));
    let mut ir = redundant();

    manager.run(&mut Silent, &mut ir);

    assert!(manager.register_allocation().unwrap().succeeded());
}

#[test]
fn context_offsets_near_the_limit() {
    let mut builder = IrBuilder::new();
    let x = builder.load_context(8, 0, ValueClass::Integer);
    builder.store_context(8, u32::MAX, x);
    builder.store_context(8, u32::MAX, x);
    builder.exit();
    let mut ir = builder.build();

    let mut manager = default_manager();
    manager.insert_register_allocation_pass(allocator(2));

    assert!(manager.run(&mut Silent, &mut ir));
    assert_eq!(3, ir.node_count());
    assert!(manager.register_allocation().unwrap().had_full_ra());
}

#[test]
fn out_of_registers_keeps_the_optimized_graph() {
    let mut builder = IrBuilder::new();
    let a = builder.load_context(8, 0, ValueClass::Integer);
    let b = builder.load_context(8, 8, ValueClass::Integer);
    let c = builder.add(8, a, b);
    builder.store_context(8, 16, c);
    builder.exit();
    let mut ir = builder.build();

    let mut manager = default_manager();
    manager.insert_register_allocation_pass(allocator(2));

    assert!(!manager.run(&mut Silent, &mut ir));
    assert_eq!(5, ir.node_count());
    assert!(!ir
        .linear()
        .any(|id| matches!(ir.get(id).op, Op::SpillRegister { .. } | Op::FillRegister { .. })));

    let allocation = manager.register_allocation().unwrap();
    assert!(!allocation.succeeded());
    assert_eq!(0, allocation.spill_slots());
}
