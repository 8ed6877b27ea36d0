use super::{BlockId, NodeId, ValueClass};

/// The size in bytes of an 80-bit float held in a vector register.
pub const F80_SIZE: u8 = 16;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 8] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Shl,
        Self::Shr,
    ];

    /// Evaluate the operation on two constants of the given size in bytes.
    pub fn fold(&self, left: u64, right: u64, size: u8) -> u64 {
        let mask = mask(size);
        let bits = u64::from(size) * 8;
        let (left, right) = (left & mask, right & mask);

        let value = match self {
            Self::Add => left.wrapping_add(right),
            Self::Sub => left.wrapping_sub(right),
            Self::Mul => left.wrapping_mul(right),
            Self::And => left & right,
            Self::Or => left | right,
            Self::Xor => left ^ right,
            Self::Shl => left << (right % bits),
            Self::Shr => left >> (right % bits),
        };

        value & mask
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Shl => "shl",
            Self::Shr => "shr",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FloatOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl FloatOp {
    pub const ALL: [FloatOp; 4] = [Self::Add, Self::Sub, Self::Mul, Self::Div];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Add => "fadd",
            Self::Sub => "fsub",
            Self::Mul => "fmul",
            Self::Div => "fdiv",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum F80UnaryOp {
    Round,
    F2xm1,
    Tan,
    Sqrt,
    Sin,
    Cos,
    XtractExp,
    XtractSig,
    BcdStore,
    BcdLoad,
}

impl F80UnaryOp {
    pub const ALL: [F80UnaryOp; 10] = [
        Self::Round,
        Self::F2xm1,
        Self::Tan,
        Self::Sqrt,
        Self::Sin,
        Self::Cos,
        Self::XtractExp,
        Self::XtractSig,
        Self::BcdStore,
        Self::BcdLoad,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Round => "f80round",
            Self::F2xm1 => "f80f2xm1",
            Self::Tan => "f80tan",
            Self::Sqrt => "f80sqrt",
            Self::Sin => "f80sin",
            Self::Cos => "f80cos",
            Self::XtractExp => "f80xtractexp",
            Self::XtractSig => "f80xtractsig",
            Self::BcdStore => "f80bcdstore",
            Self::BcdLoad => "f80bcdload",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum F80BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Fyl2x,
    Atan,
    Fprem1,
    Fprem,
    Scale,
}

impl F80BinaryOp {
    pub const ALL: [F80BinaryOp; 9] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Fyl2x,
        Self::Atan,
        Self::Fprem1,
        Self::Fprem,
        Self::Scale,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Add => "f80add",
            Self::Sub => "f80sub",
            Self::Mul => "f80mul",
            Self::Div => "f80div",
            Self::Fyl2x => "f80fyl2x",
            Self::Atan => "f80atan",
            Self::Fprem1 => "f80fprem1",
            Self::Fprem => "f80fprem",
            Self::Scale => "f80scale",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Op {
    Constant(u64),

    LoadContext { offset: u32, class: ValueClass },
    StoreContext { offset: u32, value: NodeId },
    LoadFlag(u8),
    StoreFlag(u8, NodeId),

    Binary(BinaryOp, NodeId, NodeId),
    Float(FloatOp, NodeId, NodeId),

    /// A guest syscall. The first argument is the syscall number.
    Syscall(Vec<NodeId>),
    /// A guest syscall whose number is known at translation time.
    InlineSyscall { number: u64, args: Vec<NodeId> },

    Jump(BlockId),
    CondJump {
        cond: NodeId,
        then: BlockId,
        elze: BlockId,
    },
    Exit,

    F80LoadFcw(NodeId),
    /// Convert a 32- or 64-bit float of `size` bytes to an 80-bit float.
    F80CvtTo { value: NodeId, size: u8 },
    /// Convert an 80-bit float to a float of the node's size.
    F80Cvt(NodeId),
    /// Convert an 80-bit float to an integer of the node's size.
    F80CvtInt { value: NodeId, truncate: bool },
    /// Compare two 80-bit floats, producing packed flags selected by `flags`.
    F80Cmp {
        left: NodeId,
        right: NodeId,
        flags: u8,
    },
    /// Convert an integer of `size` bytes to an 80-bit float.
    F80CvtToInt { value: NodeId, size: u8 },
    F80Unary(F80UnaryOp, NodeId),
    F80Binary(F80BinaryOp, NodeId, NodeId),

    SpillRegister { value: NodeId, slot: u32 },
    FillRegister { slot: u32, class: ValueClass },
}

impl Op {
    /// The class of the value this operation produces, if it produces one.
    pub fn result(&self) -> Option<ValueClass> {
        match self {
            Self::Constant(_)
            | Self::LoadFlag(_)
            | Self::Binary(..)
            | Self::Syscall(_)
            | Self::InlineSyscall { .. }
            | Self::F80CvtInt { .. }
            | Self::F80Cmp { .. } => Some(ValueClass::Integer),

            Self::Float(..)
            | Self::F80CvtTo { .. }
            | Self::F80Cvt(_)
            | Self::F80CvtToInt { .. }
            | Self::F80Unary(..)
            | Self::F80Binary(..) => Some(ValueClass::Float),

            Self::LoadContext { class, .. } | Self::FillRegister { class, .. } => Some(*class),

            Self::StoreContext { .. }
            | Self::StoreFlag(..)
            | Self::Jump(_)
            | Self::CondJump { .. }
            | Self::Exit
            | Self::F80LoadFcw(_)
            | Self::SpillRegister { .. } => None,
        }
    }

    pub fn for_each_operand(&self, mut f: impl FnMut(NodeId)) {
        match self {
            Self::Constant(_)
            | Self::LoadContext { .. }
            | Self::LoadFlag(_)
            | Self::Jump(_)
            | Self::Exit
            | Self::FillRegister { .. } => {}

            Self::StoreContext { value, .. }
            | Self::StoreFlag(_, value)
            | Self::F80LoadFcw(value)
            | Self::F80CvtTo { value, .. }
            | Self::F80Cvt(value)
            | Self::F80CvtInt { value, .. }
            | Self::F80CvtToInt { value, .. }
            | Self::F80Unary(_, value)
            | Self::SpillRegister { value, .. } => f(*value),

            Self::CondJump { cond, .. } => f(*cond),

            Self::Binary(_, left, right)
            | Self::Float(_, left, right)
            | Self::F80Cmp { left, right, .. }
            | Self::F80Binary(_, left, right) => {
                f(*left);
                f(*right);
            }

            Self::Syscall(args) | Self::InlineSyscall { args, .. } => {
                args.iter().copied().for_each(f);
            }
        }
    }

    pub fn map_operands(&mut self, mut f: impl FnMut(NodeId) -> NodeId) {
        match self {
            Self::Constant(_)
            | Self::LoadContext { .. }
            | Self::LoadFlag(_)
            | Self::Jump(_)
            | Self::Exit
            | Self::FillRegister { .. } => {}

            Self::StoreContext { value, .. }
            | Self::StoreFlag(_, value)
            | Self::F80LoadFcw(value)
            | Self::F80CvtTo { value, .. }
            | Self::F80Cvt(value)
            | Self::F80CvtInt { value, .. }
            | Self::F80CvtToInt { value, .. }
            | Self::F80Unary(_, value)
            | Self::SpillRegister { value, .. } => *value = f(*value),

            Self::CondJump { cond, .. } => *cond = f(*cond),

            Self::Binary(_, left, right)
            | Self::Float(_, left, right)
            | Self::F80Cmp { left, right, .. }
            | Self::F80Binary(_, left, right) => {
                *left = f(*left);
                *right = f(*right);
            }

            Self::Syscall(args) | Self::InlineSyscall { args, .. } => {
                for arg in args.iter_mut() {
                    *arg = f(*arg);
                }
            }
        }
    }

    pub fn operands(&self) -> Vec<NodeId> {
        let mut operands = Vec::new();
        self.for_each_operand(|operand| operands.push(operand));
        operands
    }

    pub fn successors(&self) -> impl Iterator<Item = BlockId> {
        let (first, second) = match self {
            Self::Jump(to) => (Some(*to), None),
            Self::CondJump { then, elze, .. } => (Some(*then), Some(*elze)),
            _ => (None, None),
        };

        first.into_iter().chain(second)
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::Jump(_) | Self::CondJump { .. } | Self::Exit)
    }

    /// Whether the operation may observe or modify guest state in ways a
    /// store-forwarding analysis within a block cannot see through.
    pub fn is_barrier(&self) -> bool {
        matches!(self, Self::Syscall(_) | Self::InlineSyscall { .. }) || self.is_terminator()
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Constant(_) => "const",
            Self::LoadContext { .. } => "loadctx",
            Self::StoreContext { .. } => "storectx",
            Self::LoadFlag(_) => "loadflag",
            Self::StoreFlag(..) => "storeflag",
            Self::Binary(op, ..) => op.mnemonic(),
            Self::Float(op, ..) => op.mnemonic(),
            Self::Syscall(_) => "syscall",
            Self::InlineSyscall { .. } => "isyscall",
            Self::Jump(_) => "jump",
            Self::CondJump { .. } => "condjump",
            Self::Exit => "exit",
            Self::F80LoadFcw(_) => "f80ldfcw",
            Self::F80CvtTo { .. } => "f80cvtto",
            Self::F80Cvt(_) => "f80cvt",
            Self::F80CvtInt { .. } => "f80cvtint",
            Self::F80Cmp { .. } => "f80cmp",
            Self::F80CvtToInt { .. } => "f80cvttoint",
            Self::F80Unary(op, _) => op.mnemonic(),
            Self::F80Binary(op, ..) => op.mnemonic(),
            Self::SpillRegister { .. } => "spill",
            Self::FillRegister { .. } => "fill",
        }
    }
}

/// All-ones mask for a value of `size` bytes.
pub fn mask(size: u8) -> u64 {
    assert!(matches!(size, 1 | 2 | 4 | 8), "not an integer size: {size}");

    if size == 8 {
        u64::MAX
    } else {
        (1 << (u32::from(size) * 8)) - 1
    }
}
