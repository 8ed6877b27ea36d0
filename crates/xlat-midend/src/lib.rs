//! The ordinary IR-to-IR passes which run before register allocation. Each
//! one is a single sweep over the graph; none of them assume another pass
//! (or themselves) will run again.

mod compact;
mod const_prop;
mod context;
mod flags;
mod syscall;
mod validate;

#[cfg(test)]
mod tests;

pub use compact::IrCompaction;
pub use const_prop::ConstProp;
pub use context::{DeadContextStoreElimination, RedundantContextLoadElimination};
pub use flags::RedundantFlagCalculationElimination;
pub use syscall::SyscallOptimization;
pub use validate::IrValidation;
