use xlat_common::ir::NodeId;

use super::{LiveRange, RegisterGraph};

/// Add an edge between every pair of same-class nodes whose live ranges
/// overlap.
///
/// Nodes are swept in order of where their ranges begin, keeping a list of the
/// ranges still live at that point, so only overlapping pairs are compared.
pub fn interference(graph: &mut RegisterGraph, ranges: &[Option<LiveRange>]) {
    assert!(
        ranges.len() <= graph.len(),
        "{} live ranges for a graph of {} nodes",
        ranges.len(),
        graph.len()
    );

    let mut order: Vec<(LiveRange, NodeId)> = ranges
        .iter()
        .enumerate()
        .filter_map(|(index, range)| range.map(|range| (range, NodeId::from(index))))
        .collect();
    order.sort_by_key(|(range, id)| (range.begin, *id));

    let mut active: Vec<(LiveRange, NodeId)> = Vec::new();

    for (range, id) in order {
        let Some(class) = graph.node(id).class else {
            panic!("{id} is live but has no register class");
        };

        active.retain(|(other, _)| other.end >= range.begin);

        for (other, other_id) in active.iter() {
            debug_assert!(range.overlaps(other));
            if graph.node(*other_id).class == Some(class) {
                graph.add_interference(id, *other_id);
            }
        }

        active.push((range, id));
    }
}
