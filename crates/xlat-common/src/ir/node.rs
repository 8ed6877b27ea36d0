use std::fmt::{self, Display};

use super::{BlockId, Op};

/// Index of a node in the arena of an [`IrGraph`](super::IrGraph).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(u32::try_from(index).expect("node index exceeds u32"))
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// The kind of register a value needs to live in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueClass {
    Integer,
    Float,
}

impl Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "gpr"),
            Self::Float => write!(f, "fpr"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    pub op: Op,

    /// Size of the result (or of the stored value) in bytes.
    pub size: u8,

    /// The block whose node list this node belongs (or belonged) to.
    pub block: BlockId,
}

impl Node {
    pub fn result(&self) -> Option<ValueClass> {
        self.op.result()
    }
}
