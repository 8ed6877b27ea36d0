pub mod fallback;
pub mod regalloc;
