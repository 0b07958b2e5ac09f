//! # External collaborators
//!
//! The semantic core reaches everything outside the register file through
//! four narrow interfaces: the MMU, the coprocessor ports, the exclusive
//! monitor, and the CP15/Jazelle configuration shims. Each trait lives next
//! to a minimal reference implementation so the crate is usable and testable
//! stand-alone; a real system model replaces them at construction time.

pub mod control;
pub mod coprocessor;
pub mod jazelle;
pub mod memory;
pub mod monitor;

pub use control::SystemControl;
pub use coprocessor::Coprocessor;
pub use jazelle::JazelleUnit;
pub use memory::Mmu;
pub use monitor::ExclusiveMonitor;
