use std::fmt::{self, Display};

use xlat_common::ir::ValueClass;

/// Tag for a disjoint pool of physical registers.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RegisterClass(pub u32);

impl RegisterClass {
    pub const GPR: Self = Self(0);
    pub const FPR: Self = Self(1);

    /// The class a value of the given kind is allocated from.
    pub fn of(class: ValueClass) -> Self {
        match class {
            ValueClass::Integer => Self::GPR,
            ValueClass::Float => Self::FPR,
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for RegisterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::GPR => write!(f, "gpr"),
            Self::FPR => write!(f, "fpr"),
            Self(other) => write!(f, "class{other}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PhysicalRegister {
    pub class: RegisterClass,

    /// The target-wide register number, i.e. the class base plus the index of
    /// the register within its class.
    pub number: u32,
}

impl Display for PhysicalRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.number)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct ClassRange {
    base: u32,
    count: u32,
}

/// The physical register inventory of a target, partitioned into classes.
///
/// Built once per target and shared read-only (usually behind an `Arc`) by
/// every allocation afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegisterSet {
    register_count: u32,
    classes: Vec<Option<ClassRange>>,
}

impl RegisterSet {
    pub fn new(register_count: u32, class_count: u32) -> Self {
        Self {
            register_count,
            classes: vec![None; class_count as usize],
        }
    }

    /// Give `class` the `count` registers numbered from `base`.
    pub fn add_registers(&mut self, class: RegisterClass, base: u32, count: u32) {
        assert!(
            class.index() < self.classes.len(),
            "{class} is not one of the {} classes of this set",
            self.classes.len()
        );
        assert!(
            self.classes[class.index()].is_none(),
            "{class} already has registers"
        );

        let end = base
            .checked_add(count)
            .filter(|end| *end <= self.register_count);
        assert!(
            end.is_some(),
            "registers {base}..{base}+{count} exceed the {} registers of this set",
            self.register_count
        );

        for other in self.classes.iter().flatten() {
            let disjoint = base + count <= other.base || other.base + other.count <= base;
            assert!(disjoint, "{class} overlaps the registers of another class");
        }

        self.classes[class.index()] = Some(ClassRange { base, count });
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn register_count(&self) -> u32 {
        self.register_count
    }

    pub fn has_class(&self, class: RegisterClass) -> bool {
        class.index() < self.classes.len()
    }

    /// The number of registers in `class`.
    pub fn count(&self, class: RegisterClass) -> u32 {
        self.range(class).map(|range| range.count).unwrap_or(0)
    }

    /// The registers of `class`, lowest numbered first.
    pub fn registers(&self, class: RegisterClass) -> impl Iterator<Item = PhysicalRegister> {
        let (base, count) = self
            .range(class)
            .map(|range| (range.base, range.count))
            .unwrap_or((0, 0));

        (base..base + count).map(move |number| PhysicalRegister { class, number })
    }

    pub fn contains(&self, register: PhysicalRegister) -> bool {
        self.range(register.class)
            .map(|range| (range.base..range.base + range.count).contains(&register.number))
            .unwrap_or(false)
    }

    fn range(&self, class: RegisterClass) -> Option<ClassRange> {
        self.classes.get(class.index()).copied().flatten()
    }
}
