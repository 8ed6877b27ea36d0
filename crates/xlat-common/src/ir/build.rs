use super::{BinaryOp, BlockId, FloatOp, IrGraph, NodeId, Op, ValueClass};

/// Convenience layer for emitting nodes into a graph one block at a time.
#[derive(Debug)]
pub struct IrBuilder {
    graph: IrGraph,
    current: BlockId,
}

impl IrBuilder {
    /// Create a builder positioned at a fresh entry block.
    pub fn new() -> Self {
        let mut graph = IrGraph::new();
        let current = graph.add_block();
        Self { graph, current }
    }

    /// Create a new block without switching to it.
    pub fn block(&mut self) -> BlockId {
        self.graph.add_block()
    }

    pub fn switch_to(&mut self, block: BlockId) {
        assert!(self.graph.has_block(block));
        self.current = block;
    }

    pub fn current(&self) -> BlockId {
        self.current
    }

    pub fn op(&mut self, op: Op, size: u8) -> NodeId {
        self.graph.push(self.current, op, size)
    }

    pub fn constant(&mut self, size: u8, value: u64) -> NodeId {
        self.op(Op::Constant(value), size)
    }

    pub fn load_context(&mut self, size: u8, offset: u32, class: ValueClass) -> NodeId {
        self.op(Op::LoadContext { offset, class }, size)
    }

    pub fn store_context(&mut self, size: u8, offset: u32, value: NodeId) -> NodeId {
        self.op(Op::StoreContext { offset, value }, size)
    }

    pub fn load_flag(&mut self, flag: u8) -> NodeId {
        self.op(Op::LoadFlag(flag), 1)
    }

    pub fn store_flag(&mut self, flag: u8, value: NodeId) -> NodeId {
        self.op(Op::StoreFlag(flag, value), 1)
    }

    pub fn binary(&mut self, op: BinaryOp, size: u8, left: NodeId, right: NodeId) -> NodeId {
        self.op(Op::Binary(op, left, right), size)
    }

    pub fn add(&mut self, size: u8, left: NodeId, right: NodeId) -> NodeId {
        self.binary(BinaryOp::Add, size, left, right)
    }

    pub fn float(&mut self, op: FloatOp, size: u8, left: NodeId, right: NodeId) -> NodeId {
        self.op(Op::Float(op, left, right), size)
    }

    pub fn syscall(&mut self, args: Vec<NodeId>) -> NodeId {
        self.op(Op::Syscall(args), 8)
    }

    pub fn jump(&mut self, to: BlockId) -> NodeId {
        self.op(Op::Jump(to), 0)
    }

    pub fn cond_jump(&mut self, cond: NodeId, then: BlockId, elze: BlockId) -> NodeId {
        self.op(Op::CondJump { cond, then, elze }, 0)
    }

    pub fn exit(&mut self) -> NodeId {
        self.op(Op::Exit, 0)
    }

    pub fn build(self) -> IrGraph {
        self.graph
    }
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}
