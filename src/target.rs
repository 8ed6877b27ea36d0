//! Register inventories of the hosts code can be generated for.

use std::sync::Arc;

use bimap::BiMap;
use target_lexicon::{Architecture, Triple};
use xlat_backend::regalloc::{PhysicalRegister, RegisterClass, RegisterSet};

const X86_64_GPRS: &[&str] = &[
    "rbx", "rcx", "rdx", "rsi", "rdi", "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15",
];

const X86_64_FPRS: &[&str] = &[
    "xmm2", "xmm3", "xmm4", "xmm5", "xmm6", "xmm7", "xmm8", "xmm9", "xmm10", "xmm11", "xmm12",
    "xmm13", "xmm14", "xmm15",
];

const AARCH64_GPRS: &[&str] = &[
    "x4", "x5", "x6", "x7", "x8", "x9", "x10", "x11", "x12", "x13", "x14", "x15", "x16", "x17",
];

const AARCH64_FPRS: &[&str] = &[
    "v16", "v17", "v18", "v19", "v20", "v21", "v22", "v23", "v24", "v25", "v26", "v27", "v28",
    "v29", "v30", "v31",
];

/// The registers the allocator may hand out on one host, with their names.
#[derive(Clone, Debug)]
pub struct RegisterInventory {
    gprs: &'static [&'static str],
    fprs: &'static [&'static str],
    names: BiMap<u32, &'static str>,
}

impl RegisterInventory {
    /// The full inventory for `triple`, if code can be generated for it.
    pub fn for_target(triple: &Triple) -> Option<Self> {
        let (gprs, fprs) = match triple.architecture {
            Architecture::X86_64 => (X86_64_GPRS, X86_64_FPRS),
            Architecture::Aarch64(_) => (AARCH64_GPRS, AARCH64_FPRS),
            _ => return None,
        };

        Some(Self::new(gprs, fprs))
    }

    fn new(gprs: &'static [&'static str], fprs: &'static [&'static str]) -> Self {
        let mut names = BiMap::new();
        for (number, name) in gprs.iter().chain(fprs.iter()).enumerate() {
            let number = u32::try_from(number).unwrap_or(u32::MAX);
            assert!(names.insert_no_overwrite(number, *name).is_ok());
        }

        Self { gprs, fprs, names }
    }

    /// Keep only the first `gprs` general purpose and `fprs` vector
    /// registers. Returns `None` if the host has fewer than asked for.
    pub fn limit(self, gprs: Option<usize>, fprs: Option<usize>) -> Option<Self> {
        let gprs = gprs.unwrap_or(self.gprs.len());
        let fprs = fprs.unwrap_or(self.fprs.len());

        if gprs > self.gprs.len() || fprs > self.fprs.len() {
            return None;
        }

        Some(Self::new(&self.gprs[..gprs], &self.fprs[..fprs]))
    }

    pub fn gpr_count(&self) -> u32 {
        self.gprs.len() as u32
    }

    pub fn fpr_count(&self) -> u32 {
        self.fprs.len() as u32
    }

    /// Build the register set the allocator works from. General purpose
    /// registers are numbered first, vector registers after them.
    pub fn register_set(&self) -> Arc<RegisterSet> {
        let (gprs, fprs) = (self.gpr_count(), self.fpr_count());

        let mut set = RegisterSet::new(gprs + fprs, 2);
        set.add_registers(RegisterClass::GPR, 0, gprs);
        set.add_registers(RegisterClass::FPR, gprs, fprs);
        Arc::new(set)
    }

    pub fn name(&self, register: PhysicalRegister) -> Option<&'static str> {
        self.names.get_by_left(&register.number).copied()
    }

    pub fn register(&self, name: &str) -> Option<PhysicalRegister> {
        let number = *self.names.get_by_right(name)?;
        let class = if number < self.gpr_count() {
            RegisterClass::GPR
        } else {
            RegisterClass::FPR
        };

        Some(PhysicalRegister { class, number })
    }
}
