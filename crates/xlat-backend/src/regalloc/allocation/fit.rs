use super::super::{PhysicalRegister, RegisterClass};
use super::Allocator;

impl Allocator<'_> {
    pub fn first_fitting_reg(
        &self,
        class: RegisterClass,
        unavailable: &[PhysicalRegister],
    ) -> Option<PhysicalRegister> {
        self.graph
            .set()
            .registers(class)
            .find(|register| !unavailable.contains(register))
    }
}
