//! A "coherence check" that no two interfering nodes were given the same
//! register.

use super::Allocator;

impl Allocator<'_> {
    pub fn check_consistency(&self) {
        for (id, node) in self.graph.nodes() {
            let Some(this) = node.assignment.register() else {
                continue;
            };

            assert!(
                self.graph.set().contains(this),
                "{id} was given {this}, which is not in the register set"
            );

            for other in node.interference.iter() {
                if self.graph.node(*other).assignment.register() == Some(this) {
                    panic!("inconsistency: both {id} and {other} were given {this}, but they interfere");
                }
            }
        }
    }
}
