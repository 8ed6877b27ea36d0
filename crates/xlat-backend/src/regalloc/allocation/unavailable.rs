use xlat_common::ir::NodeId;

use super::super::PhysicalRegister;
use super::Allocator;

impl Allocator<'_> {
    /// The registers held by the neighbors of `id`.
    pub fn unavailable_physical(&self, id: NodeId) -> Vec<PhysicalRegister> {
        self.graph
            .node(id)
            .interference
            .iter()
            .filter_map(|other| self.graph.node(*other).assignment.register())
            .collect()
    }
}
