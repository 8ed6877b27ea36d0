pub mod ir;

pub use driver::{Driver, IrOutput, Silent};
pub use pass::Pass;

mod driver;
mod pass;
