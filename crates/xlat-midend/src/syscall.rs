use log::trace;
use xlat_common::ir::{IrGraph, Op};
use xlat_common::Pass;

/// Turns syscalls with a translation-time constant number into inline
/// syscalls, so the emitter can dispatch to the handler directly.
#[derive(Debug, Default)]
pub struct SyscallOptimization;

impl SyscallOptimization {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for SyscallOptimization {
    fn name(&self) -> &'static str {
        "syscall-optimization"
    }

    fn run(&mut self, ir: &mut IrGraph) -> bool {
        let order: Vec<_> = ir.linear().collect();
        let mut inlined = 0;

        for id in order {
            let Op::Syscall(args) = &ir.get(id).op else {
                continue;
            };

            let Some((number, rest)) = args.split_first() else {
                continue;
            };

            let Op::Constant(number) = ir.get(*number).op else {
                continue;
            };

            trace!("inlining syscall {number} at {id}");

            let args = rest.to_vec();
            ir.get_mut(id).op = Op::InlineSyscall { number, args };
            inlined += 1;
        }

        inlined > 0
    }
}
