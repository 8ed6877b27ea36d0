//! The intermediate representation of one translation unit.
//!
//! A graph owns a single arena of [`Node`]s. Nodes never own each other:
//! operands, jump targets and every other relationship are plain indices into
//! the arena (or into the list of blocks). Program order is given separately
//! by each [`Block`]'s list of node ids, so passes can unlink or insert nodes
//! without moving anything in the arena. Unlinked nodes stay in the arena as
//! garbage until the graph is compacted.

pub use block::{Block, BlockId};
pub use build::IrBuilder;
pub use node::{Node, NodeId, ValueClass};
pub use op::{mask, BinaryOp, F80BinaryOp, F80UnaryOp, FloatOp, Op, F80_SIZE};
pub use pretty::Prettier;

mod block;
mod build;
mod node;
mod op;
mod pretty;

#[cfg(test)]
mod tests;

#[derive(Clone, Debug, Default)]
pub struct IrGraph {
    nodes: Vec<Node>,
    linked: Vec<bool>,
    blocks: Vec<Block>,
}

impl IrGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            linked: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId(u32::try_from(self.blocks.len()).expect("too many blocks"));
        self.blocks.push(Block::default());
        id
    }

    pub fn block(&self, id: BlockId) -> &Block {
        assert!(self.has_block(id), "no such block {id}");
        &self.blocks[id.index()]
    }

    pub fn has_block(&self, id: BlockId) -> bool {
        id.index() < self.blocks.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Iterate over the blocks in layout order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (BlockId(index as u32), block))
    }

    /// The number of slots in the node arena, including unlinked ones.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The number of nodes reachable through the block lists.
    pub fn linked_count(&self) -> usize {
        self.blocks.iter().map(|block| block.nodes.len()).sum()
    }

    pub fn get(&self, id: NodeId) -> &Node {
        assert!(id.index() < self.nodes.len(), "node {id} out of range");
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        assert!(id.index() < self.nodes.len(), "node {id} out of range");
        &mut self.nodes[id.index()]
    }

    pub fn is_linked(&self, id: NodeId) -> bool {
        self.linked.get(id.index()).copied().unwrap_or(false)
    }

    /// Iterate over every linked node in program order.
    pub fn linear(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.blocks
            .iter()
            .flat_map(|block| block.nodes.iter().copied())
    }

    /// Map every arena slot to its index in program order, or `None` for
    /// unlinked slots.
    pub fn positions(&self) -> Vec<Option<u32>> {
        let mut positions = vec![None; self.nodes.len()];
        for (position, id) in self.linear().enumerate() {
            positions[id.index()] = Some(position as u32);
        }

        positions
    }

    /// Append a new node to the end of `block`.
    pub fn push(&mut self, block: BlockId, op: Op, size: u8) -> NodeId {
        let id = self.alloc(block, op, size);
        self.blocks[block.index()].nodes.push(id);
        id
    }

    /// Insert a new node immediately before `anchor` in its block.
    pub fn insert_before(&mut self, anchor: NodeId, op: Op, size: u8) -> NodeId {
        let (block, at) = self.locate(anchor);
        let id = self.alloc(block, op, size);
        self.blocks[block.index()].nodes.insert(at, id);
        id
    }

    /// Insert a new node immediately after `anchor` in its block.
    pub fn insert_after(&mut self, anchor: NodeId, op: Op, size: u8) -> NodeId {
        let (block, at) = self.locate(anchor);
        let id = self.alloc(block, op, size);
        self.blocks[block.index()].nodes.insert(at + 1, id);
        id
    }

    /// Remove a node from its block. The arena slot is kept until the graph
    /// is compacted.
    pub fn unlink(&mut self, id: NodeId) {
        let (block, at) = self.locate(id);
        self.blocks[block.index()].nodes.remove(at);
        self.linked[id.index()] = false;
    }

    /// Make every linked use of `old` refer to `new` instead. Returns the
    /// number of operands rewritten.
    pub fn replace_uses(&mut self, old: NodeId, new: NodeId) -> usize {
        assert!(self.is_linked(new), "replacement {new} is not linked");

        let mut replaced = 0;
        for block in self.blocks.iter() {
            for id in block.nodes.iter() {
                self.nodes[id.index()].op.map_operands(|operand| {
                    if operand == old {
                        replaced += 1;
                        new
                    } else {
                        operand
                    }
                });
            }
        }

        replaced
    }

    /// Count the linked uses of every arena slot.
    pub fn use_counts(&self) -> Vec<u32> {
        let mut counts = vec![0; self.nodes.len()];
        for id in self.linear() {
            self.nodes[id.index()]
                .op
                .for_each_operand(|operand| counts[operand.index()] += 1);
        }

        counts
    }

    fn alloc(&mut self, block: BlockId, op: Op, size: u8) -> NodeId {
        assert!(self.has_block(block), "no such block {block}");
        op.for_each_operand(|operand| {
            assert!(
                self.is_linked(operand),
                "operand {operand} is out of range or unlinked"
            );
        });

        for target in op.successors() {
            assert!(self.has_block(target), "jump to missing block {target}");
        }

        let id = NodeId::from(self.nodes.len());
        self.nodes.push(Node { op, size, block });
        self.linked.push(true);
        id
    }

    fn locate(&self, id: NodeId) -> (BlockId, usize) {
        assert!(self.is_linked(id), "node {id} is not linked");

        let block = self.get(id).block;
        let at = self.blocks[block.index()]
            .nodes
            .iter()
            .position(|other| *other == id)
            .expect("linked node missing from its block");

        (block, at)
    }
}
