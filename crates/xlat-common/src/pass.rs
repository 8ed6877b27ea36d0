use crate::ir::IrGraph;

/// A single transformation over the IR of one translation unit.
pub trait Pass {
    /// A short, stable name used for logging and for toggling the pass.
    fn name(&self) -> &'static str;

    /// Run the pass over the graph. Returns `true` if anything was changed.
    fn run(&mut self, ir: &mut IrGraph) -> bool;
}
