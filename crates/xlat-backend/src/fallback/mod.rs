//! Software routines for 80-bit float operations the host cannot do natively.
//!
//! [`register_fallbacks`] builds the table of every routine once, keyed by the
//! operation and the size and flag variant it is specialised for. Code
//! generation then asks [`FallbackTable::classify`] which routine a node
//! calls and with what calling shape.

pub use abi::{AbiKind, FallbackAbi};

mod abi;


use std::collections::HashMap;
use std::fmt::{self, Display};

use log::{debug, trace};
use xlat_common::ir::{F80BinaryOp, F80UnaryOp, IrGraph, NodeId, Op};

/// The number of result variants of the 80-bit comparison.
pub const COMPARE_FLAG_VARIANTS: u8 = 8;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FallbackOp {
    LoadFcw,
    CvtTo,
    Cvt,
    CvtInt,
    Cmp,
    CvtToInt,
    Unary(F80UnaryOp),
    Binary(F80BinaryOp),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FallbackKey {
    pub op: FallbackOp,

    /// The size variant in bytes, or zero for operations that have none.
    pub size: u8,

    /// The flag variant, or zero for operations that have none.
    pub flag: u8,
}

impl FallbackKey {
    pub fn new(op: FallbackOp, size: u8, flag: u8) -> Self {
        Self { op, size, flag }
    }
}

/// A software routine, specialised for one size or flag variant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Routine {
    LoadFcw,
    FloatToF80 { size: u8 },
    F80ToFloat { size: u8 },
    F80ToInt { size: u8, truncate: bool },
    Compare { flags: u8 },
    IntToF80 { size: u8 },
    Unary(F80UnaryOp),
    Binary(F80BinaryOp),
}

impl Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFcw => write!(f, "f80_load_fcw"),
            Self::FloatToF80 { size } => write!(f, "f80_from_f{}", u32::from(*size) * 8),
            Self::F80ToFloat { size } => write!(f, "f80_to_f{}", u32::from(*size) * 8),
            Self::F80ToInt { size, truncate } => {
                let bits = u32::from(*size) * 8;
                if *truncate {
                    write!(f, "f80_to_i{bits}_trunc")
                } else {
                    write!(f, "f80_to_i{bits}")
                }
            }
            Self::Compare { flags } => write!(f, "f80_cmp_{flags}"),
            Self::IntToF80 { size } => write!(f, "f80_from_i{}", u32::from(*size) * 8),
            Self::Unary(op) => write!(f, "{}", op.mnemonic()),
            Self::Binary(op) => write!(f, "{}", op.mnemonic()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FallbackInfo {
    pub routine: Routine,
    pub abi: FallbackAbi,
}

/// Immutable lookup from operation variant to routine.
#[derive(Clone, Debug, Default)]
pub struct FallbackTable {
    entries: HashMap<FallbackKey, FallbackInfo>,
}

/// Build the table of every fallback routine.
pub fn register_fallbacks() -> FallbackTable {
    let mut table = FallbackTable::default();

    table.register(
        FallbackKey::new(FallbackOp::LoadFcw, 0, 0),
        Routine::LoadFcw,
        FallbackAbi::VoidU16,
    );

    for (size, abi) in [(4, FallbackAbi::F80F32), (8, FallbackAbi::F80F64)] {
        table.register(
            FallbackKey::new(FallbackOp::CvtTo, size, 0),
            Routine::FloatToF80 { size },
            abi,
        );
    }

    for (size, abi) in [(4, FallbackAbi::F32F80), (8, FallbackAbi::F64F80)] {
        table.register(
            FallbackKey::new(FallbackOp::Cvt, size, 0),
            Routine::F80ToFloat { size },
            abi,
        );
    }

    for (size, abi) in [
        (2, FallbackAbi::I16F80),
        (4, FallbackAbi::I32F80),
        (8, FallbackAbi::I64F80),
    ] {
        for truncate in [false, true] {
            table.register(
                FallbackKey::new(FallbackOp::CvtInt, size, u8::from(truncate)),
                Routine::F80ToInt { size, truncate },
                abi,
            );
        }
    }

    for flags in 0..COMPARE_FLAG_VARIANTS {
        table.register(
            FallbackKey::new(FallbackOp::Cmp, 0, flags),
            Routine::Compare { flags },
            FallbackAbi::I64F80F80,
        );
    }

    for (size, abi) in [(2, FallbackAbi::F80I16), (4, FallbackAbi::F80I32)] {
        table.register(
            FallbackKey::new(FallbackOp::CvtToInt, size, 0),
            Routine::IntToF80 { size },
            abi,
        );
    }

    for op in F80UnaryOp::ALL {
        table.register(
            FallbackKey::new(FallbackOp::Unary(op), 0, 0),
            Routine::Unary(op),
            FallbackAbi::F80F80,
        );
    }

    for op in F80BinaryOp::ALL {
        table.register(
            FallbackKey::new(FallbackOp::Binary(op), 0, 0),
            Routine::Binary(op),
            FallbackAbi::F80F80F80,
        );
    }

    debug!("registered {} fallback routines", table.len());
    table
}

impl FallbackTable {
    fn register(&mut self, key: FallbackKey, routine: Routine, abi: FallbackAbi) {
        let info = FallbackInfo { routine, abi };
        assert!(
            self.entries.insert(key, info).is_none(),
            "fallback for {key:?} registered twice"
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, key: FallbackKey) -> Option<FallbackInfo> {
        self.entries.get(&key).copied()
    }

    /// Find the routine that implements `node`.
    ///
    /// Returns `None` for nodes that are lowered natively, and for fallback
    /// operations of a size no routine exists for.
    pub fn classify(&self, ir: &IrGraph, node: NodeId) -> Option<FallbackInfo> {
        let key = Self::key(ir, node)?;

        match self.lookup(key) {
            Some(info) => {
                trace!("{node} calls {} {}", info.routine, info.abi);
                Some(info)
            }

            None => {
                debug!("no fallback for {node} of size {}", key.size);
                None
            }
        }
    }

    fn key(ir: &IrGraph, id: NodeId) -> Option<FallbackKey> {
        let node = ir.get(id);

        let key = match node.op {
            Op::F80LoadFcw(_) => FallbackKey::new(FallbackOp::LoadFcw, 0, 0),
            Op::F80CvtTo { size, .. } => FallbackKey::new(FallbackOp::CvtTo, size, 0),
            Op::F80Cvt(_) => FallbackKey::new(FallbackOp::Cvt, node.size, 0),
            Op::F80CvtInt { truncate, .. } => {
                FallbackKey::new(FallbackOp::CvtInt, node.size, u8::from(truncate))
            }
            Op::F80Cmp { flags, .. } => {
                assert!(
                    flags < COMPARE_FLAG_VARIANTS,
                    "comparison flags variant {flags} of {id} is out of range"
                );
                FallbackKey::new(FallbackOp::Cmp, 0, flags)
            }
            Op::F80CvtToInt { size, .. } => FallbackKey::new(FallbackOp::CvtToInt, size, 0),
            Op::F80Unary(op, _) => FallbackKey::new(FallbackOp::Unary(op), 0, 0),
            Op::F80Binary(op, ..) => FallbackKey::new(FallbackOp::Binary(op), 0, 0),
            _ => return None,
        };

        Some(key)
    }
}
