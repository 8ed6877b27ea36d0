pub trait Driver {
    /// Output the IR after the given stage. The IR string is taken as a
    /// function, since generating it would usually be wasteful.
    fn output_ir(&mut self, at: IrOutput, data: impl FnOnce() -> String);
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IrOutput {
    /// After the named pass has run.
    Pass(&'static str),

    /// After register allocation has rewritten the IR with spills and fills.
    Allocation,
}

/// A driver which throws every piece of output away.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Driver for Silent {
    fn output_ir(&mut self, _: IrOutput, _: impl FnOnce() -> String) {}
}
