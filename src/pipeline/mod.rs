//! The ordered pipeline of passes run over every translation unit.

#[cfg(test)]
mod tests;

use log::{debug, info, trace};
use xlat_backend::regalloc::RegisterAllocationPass;
use xlat_common::ir::{IrGraph, Prettier};
use xlat_common::{Driver, IrOutput, Pass};
use xlat_midend::{
    ConstProp, DeadContextStoreElimination, IrCompaction, IrValidation,
    RedundantContextLoadElimination, RedundantFlagCalculationElimination, SyscallOptimization,
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PassState {
    Enabled,

    /// The pass is kept in the pipeline but skipped, for the given reason.
    Disabled(&'static str),
}

pub struct PipelineEntry {
    pass: Box<dyn Pass>,
    state: PassState,
}

impl PipelineEntry {
    pub fn name(&self) -> &'static str {
        self.pass.name()
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == PassState::Enabled
    }
}

#[derive(Default)]
pub struct PassManager {
    passes: Vec<PipelineEntry>,
    register_allocation: Option<RegisterAllocationPass>,
}

impl PassManager {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            register_allocation: None,
        }
    }

    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.insert(pass, PassState::Enabled);
    }

    pub fn add_disabled_pass(&mut self, pass: Box<dyn Pass>, reason: &'static str) {
        self.insert(pass, PassState::Disabled(reason));
    }

    /// Register the standard optimization pipeline. Compaction comes last, so
    /// the allocator always sees densely numbered nodes.
    pub fn add_default_passes(&mut self) {
        self.add_pass(Box::new(ConstProp::new()));
        self.add_disabled_pass(
            Box::new(RedundantContextLoadElimination::new()),
            "forwarding stores to loads corrupts guest state",
        );
        self.add_pass(Box::new(RedundantFlagCalculationElimination::new()));
        self.add_pass(Box::new(SyscallOptimization::new()));
        self.add_pass(Box::new(DeadContextStoreElimination::new()));
        self.add_pass(Box::new(IrCompaction::new()));
    }

    pub fn add_default_validation_passes(&mut self) {
        self.add_disabled_pass(
            Box::new(IrValidation::new()),
            "validation is opt-in",
        );
    }

    /// Install the register allocator. It runs after every other pass.
    pub fn insert_register_allocation_pass(&mut self, pass: RegisterAllocationPass) {
        assert!(
            self.register_allocation.is_none(),
            "a register allocation pass is already installed"
        );

        self.register_allocation = Some(pass);
    }

    pub fn register_allocation(&self) -> Option<&RegisterAllocationPass> {
        self.register_allocation.as_ref()
    }

    pub fn register_allocation_mut(&mut self) -> Option<&mut RegisterAllocationPass> {
        self.register_allocation.as_mut()
    }

    /// Enable the pass called `name`. Returns whether there was such a pass.
    pub fn enable(&mut self, name: &str) -> bool {
        self.set_state(name, PassState::Enabled)
    }

    /// Disable the pass called `name`. Returns whether there was such a pass.
    pub fn disable(&mut self, name: &str, reason: &'static str) -> bool {
        self.set_state(name, PassState::Disabled(reason))
    }

    pub fn entries(&self) -> impl Iterator<Item = &PipelineEntry> + '_ {
        self.passes.iter()
    }

    /// Run every enabled pass in order, then the register allocator if one is
    /// installed. Returns whether any of them changed the graph.
    pub fn run(&mut self, driver: &mut impl Driver, ir: &mut IrGraph) -> bool {
        info!("running {} passes", self.passes.len());
        let mut changed = false;

        for entry in self.passes.iter_mut() {
            let name = entry.pass.name();

            if let PassState::Disabled(reason) = entry.state {
                trace!("skipping {name}: {reason}");
                continue;
            }

            let pass_changed = entry.pass.run(ir);
            trace!("{name} done (changed: {pass_changed})");
            changed |= pass_changed;

            driver.output_ir(IrOutput::Pass(name), || {
                let prettier = Prettier::new(ir);
                prettier.pretty_graph()
            });
        }

        if let Some(pass) = self.register_allocation.as_mut() {
            changed |= pass.run(ir);

            debug!(
                "register allocation: full {}, spills {}, {} slots",
                pass.had_full_ra(),
                pass.has_spills(),
                pass.spill_slots()
            );

            driver.output_ir(IrOutput::Allocation, || {
                let prettier = Prettier::new(ir);
                prettier.pretty_graph()
            });
        }

        debug!("pipeline done (changed: {changed})");
        changed
    }

    fn insert(&mut self, pass: Box<dyn Pass>, state: PassState) {
        assert!(
            self.passes.iter().all(|entry| entry.name() != pass.name()),
            "pass {} added twice",
            pass.name()
        );

        self.passes.push(PipelineEntry { pass, state });
    }

    fn set_state(&mut self, name: &str, state: PassState) -> bool {
        match self.passes.iter_mut().find(|entry| entry.name() == name) {
            Some(entry) => {
                entry.state = state;
                true
            }

            None => false,
        }
    }
}
