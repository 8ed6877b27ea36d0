use super::{BinaryOp, IrBuilder, IrGraph, NodeId, Op, Prettier, ValueClass};

fn sample() -> (IrGraph, [NodeId; 4]) {
    let mut builder = IrBuilder::new();
    let next = builder.block();

    let a = builder.constant(8, 1);
    let b = builder.load_context(8, 16, ValueClass::Integer);
    let c = builder.add(8, a, b);
    builder.store_context(8, 16, c);
    builder.jump(next);

    builder.switch_to(next);
    let exit = builder.exit();

    (builder.build(), [a, b, c, exit])
}

#[test]
fn linear_order_follows_blocks() {
    let (graph, [a, b, c, exit]) = sample();
    let order: Vec<_> = graph.linear().collect();

    assert_eq!(6, order.len());
    assert_eq!(&[a, b, c], &order[..3]);
    assert_eq!(Some(&exit), order.last());
}

#[test]
fn insert_before_and_after_keep_program_order() {
    let (mut graph, [a, b, c, _]) = sample();

    let before = graph.insert_before(c, Op::Constant(7), 8);
    let after = graph.insert_after(a, Op::Constant(9), 8);

    let order: Vec<_> = graph.linear().take(5).collect();
    assert_eq!(vec![a, after, b, before, c], order);

    let positions = graph.positions();
    assert_eq!(Some(1), positions[after.index()]);
    assert_eq!(Some(3), positions[before.index()]);
}

#[test]
fn unlink_keeps_arena_slot() {
    let (mut graph, [a, ..]) = sample();
    let count = graph.node_count();

    graph.unlink(a);

    assert!(!graph.is_linked(a));
    assert_eq!(count, graph.node_count());
    assert_eq!(count - 1, graph.linked_count());
    assert_eq!(None, graph.positions()[a.index()]);
}

#[test]
fn replace_uses_rewrites_operands() {
    let (mut graph, [a, b, c, _]) = sample();

    let replaced = graph.replace_uses(b, a);

    assert_eq!(1, replaced);
    assert_eq!(Op::Binary(BinaryOp::Add, a, a), graph.get(c).op);
    assert_eq!(0, graph.use_counts()[b.index()]);
    assert_eq!(2, graph.use_counts()[a.index()]);
}

#[test]
#[should_panic(expected = "out of range or unlinked")]
fn operand_must_exist() {
    let mut graph = IrGraph::new();
    let block = graph.add_block();
    graph.push(block, Op::StoreFlag(0, NodeId(3)), 1);
}

#[test]
#[should_panic(expected = "out of range or unlinked")]
fn operand_must_be_linked() {
    let (mut graph, [a, ..]) = sample();
    graph.unlink(a);
    let block = graph.get(a).block;
    graph.push(block, Op::StoreFlag(0, a), 1);
}

#[test]
fn fold_masks_to_size() {
    assert_eq!(0x00, BinaryOp::Add.fold(0xff, 1, 1));
    assert_eq!(0xffff, BinaryOp::Sub.fold(0, 1, 2));
    assert_eq!(u64::MAX, BinaryOp::Sub.fold(0, 1, 8));
    assert_eq!(0x10, BinaryOp::Shl.fold(1, 36, 4));
    assert_eq!(0x7f, BinaryOp::Shr.fold(0xff, 1, 1));
}

#[test]
fn pretty_prints_blocks() {
    let (graph, _) = sample();
    let prettier = Prettier::new(&graph);

    let expected = "block0:
  %0 = const.8 1
  %1 = loadctx.8 gpr 16
  %2 = add.8 %0 %1
  storectx.8 16 %2
  jump block1
block1:
  exit";

    assert_eq!(expected, prettier.pretty_graph());
}

#[test]
fn result_classes() {
    assert_eq!(Some(ValueClass::Integer), Op::Constant(0).result());
    assert_eq!(
        Some(ValueClass::Float),
        Op::FillRegister {
            slot: 0,
            class: ValueClass::Float
        }
        .result()
    );
    assert_eq!(None, Op::Exit.result());
}
