use xlat_common::ir::NodeId;

use super::super::Assignment;
use super::Allocator;

impl Allocator<'_> {
    /// Pick the colored neighbor of `id` that is cheapest to spill.
    ///
    /// Only neighbors still live after `id` is defined are worth evicting.
    /// Among those the lowest rematerialization cost wins, then the range
    /// that reaches furthest, then the lowest node.
    pub fn spill_candidate(&self, id: NodeId) -> Option<NodeId> {
        let at = self.range(id).begin;

        self.graph
            .node(id)
            .interference
            .iter()
            .copied()
            .filter(|other| matches!(self.graph.node(*other).assignment, Assignment::Register(_)))
            .filter(|other| self.is_spillable(*other))
            .map(|other| (self.range(other), other))
            .filter(|(range, _)| range.end > at)
            .min_by(|(a, a_id), (b, b_id)| {
                a.remat_cost
                    .cmp(&b.remat_cost)
                    .then(b.end.cmp(&a.end))
                    .then(a_id.cmp(b_id))
            })
            .map(|(_, other)| other)
    }

    fn is_spillable(&self, id: NodeId) -> bool {
        let before = self.spilled_before.get(id.index()).copied().unwrap_or(false);
        !before && self.range(id).is_spillable()
    }
}
