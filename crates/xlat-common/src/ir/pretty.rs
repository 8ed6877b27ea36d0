use pretty::{Arena, DocAllocator, DocBuilder};

use super::{Block, BlockId, IrGraph, NodeId, Op};

/// Renders a graph in the same textual form the command line tool reads.
pub struct Prettier<'a> {
    graph: &'a IrGraph,
    allocator: Arena<'a>,
    width: usize,
}

impl<'a> Prettier<'a> {
    pub fn new(graph: &'a IrGraph) -> Self {
        Self {
            graph,
            allocator: Arena::new(),
            width: 80,
        }
    }

    pub fn with_width(self, width: usize) -> Self {
        Self { width, ..self }
    }

    #[must_use]
    pub fn pretty_graph(&'a self) -> String {
        let doc = self.allocator.intersperse(
            self.graph
                .blocks()
                .map(|(id, block)| self.doc_block(id, block)),
            self.allocator.hardline(),
        );

        let mut res = Vec::new();
        doc.render(self.width, &mut res).unwrap();
        String::from_utf8(res).unwrap()
    }

    #[must_use]
    pub fn pretty_node(&'a self, id: NodeId) -> String {
        let doc = self.doc_node(id);
        let mut res = Vec::new();
        doc.render(self.width, &mut res).unwrap();
        String::from_utf8(res).unwrap()
    }

    fn doc_block(&'a self, id: BlockId, block: &Block) -> DocBuilder<Arena<'a>> {
        let header = self.allocator.text(format!("{id}:"));
        if block.nodes.is_empty() {
            return header;
        }

        header.append(
            self.allocator
                .hardline()
                .append(self.allocator.intersperse(
                    block.nodes.iter().map(|id| self.doc_node(*id)),
                    self.allocator.hardline(),
                ))
                .nest(2),
        )
    }

    fn doc_node(&'a self, id: NodeId) -> DocBuilder<Arena<'a>> {
        let node = self.graph.get(id);

        let head = if node.op.is_terminator() {
            self.allocator.text(node.op.mnemonic())
        } else {
            self.allocator
                .text(format!("{}.{}", node.op.mnemonic(), node.size))
        };

        let inst = self
            .allocator
            .intersperse(
                std::iter::once(head).chain(
                    self.arguments(&node.op)
                        .into_iter()
                        .map(|arg| self.allocator.text(arg)),
                ),
                self.allocator.text(" "),
            );

        if node.result().is_some() {
            self.allocator.text(format!("{id} = ")).append(inst)
        } else {
            inst
        }
    }

    fn arguments(&self, op: &Op) -> Vec<String> {
        match op {
            Op::Constant(value) => vec![value.to_string()],
            Op::LoadContext { offset, class } => vec![class.to_string(), offset.to_string()],
            Op::StoreContext { offset, value } => vec![offset.to_string(), value.to_string()],
            Op::LoadFlag(flag) => vec![flag.to_string()],
            Op::StoreFlag(flag, value) => vec![flag.to_string(), value.to_string()],
            Op::InlineSyscall { number, args } => std::iter::once(number.to_string())
                .chain(args.iter().map(ToString::to_string))
                .collect(),
            Op::Jump(to) => vec![to.to_string()],
            Op::CondJump { cond, then, elze } => {
                vec![cond.to_string(), then.to_string(), elze.to_string()]
            }
            Op::F80CvtTo { value, size } | Op::F80CvtToInt { value, size } => {
                vec![size.to_string(), value.to_string()]
            }
            Op::F80CvtInt { value, truncate } => {
                if *truncate {
                    vec![String::from("trunc"), value.to_string()]
                } else {
                    vec![value.to_string()]
                }
            }
            Op::F80Cmp { left, right, flags } => {
                vec![flags.to_string(), left.to_string(), right.to_string()]
            }
            Op::SpillRegister { value, slot } => vec![slot.to_string(), value.to_string()],
            Op::FillRegister { slot, class } => vec![class.to_string(), slot.to_string()],

            Op::Binary(..)
            | Op::Float(..)
            | Op::Syscall(_)
            | Op::Exit
            | Op::F80LoadFcw(_)
            | Op::F80Cvt(_)
            | Op::F80Unary(..)
            | Op::F80Binary(..) => op.operands().iter().map(ToString::to_string).collect(),
        }
    }
}
