use std::fmt::{self, Display};

/// The kind of a single argument or result of a fallback routine.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AbiKind {
    U16,
    I16,
    I32,
    I64,
    F32,
    F64,
    F80,
}

impl AbiKind {
    /// Whether the value is passed in a vector register.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64 | Self::F80)
    }
}

impl Display for AbiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U16 => write!(f, "u16"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::F80 => write!(f, "f80"),
        }
    }
}

/// The calling shape of a fallback routine. The first kind in a name is the
/// result, the rest are the arguments in order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FallbackAbi {
    VoidU16,
    F80F32,
    F80F64,
    F80I16,
    F80I32,
    F32F80,
    F64F80,
    I16F80,
    I32F80,
    I64F80,
    I64F80F80,
    F80F80,
    F80F80F80,
}

impl FallbackAbi {
    pub const ALL: [FallbackAbi; 13] = [
        Self::VoidU16,
        Self::F80F32,
        Self::F80F64,
        Self::F80I16,
        Self::F80I32,
        Self::F32F80,
        Self::F64F80,
        Self::I16F80,
        Self::I32F80,
        Self::I64F80,
        Self::I64F80F80,
        Self::F80F80,
        Self::F80F80F80,
    ];

    pub fn result(&self) -> Option<AbiKind> {
        match self {
            Self::VoidU16 => None,
            Self::F80F32 | Self::F80F64 | Self::F80I16 | Self::F80I32 => Some(AbiKind::F80),
            Self::F80F80 | Self::F80F80F80 => Some(AbiKind::F80),
            Self::F32F80 => Some(AbiKind::F32),
            Self::F64F80 => Some(AbiKind::F64),
            Self::I16F80 => Some(AbiKind::I16),
            Self::I32F80 => Some(AbiKind::I32),
            Self::I64F80 | Self::I64F80F80 => Some(AbiKind::I64),
        }
    }

    pub fn arguments(&self) -> &'static [AbiKind] {
        match self {
            Self::VoidU16 => &[AbiKind::U16],
            Self::F80F32 => &[AbiKind::F32],
            Self::F80F64 => &[AbiKind::F64],
            Self::F80I16 => &[AbiKind::I16],
            Self::F80I32 => &[AbiKind::I32],
            Self::F32F80 | Self::F64F80 | Self::I16F80 | Self::I32F80 | Self::I64F80 => {
                &[AbiKind::F80]
            }
            Self::F80F80 => &[AbiKind::F80],
            Self::I64F80F80 | Self::F80F80F80 => &[AbiKind::F80, AbiKind::F80],
        }
    }
}

impl Display for FallbackAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.result() {
            Some(result) => write!(f, "{result}(")?,
            None => write!(f, "void(")?,
        }

        for (index, argument) in self.arguments().iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{argument}")?;
        }

        write!(f, ")")
    }
}
