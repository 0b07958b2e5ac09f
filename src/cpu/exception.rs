//! # Exception-generating transformers
//!
//! SWI and BKPT are ordinary control flow, not errors: each saves the
//! return address and CPSR into the target mode's bank, masks interrupts,
//! forces ARM state, loads CPSR.E from the CP15 EE bit and branches to the
//! architectural vector (offset from 0xFFFF0000 when high vectors are
//! configured).

use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;
use crate::cpu::cpu_modes::Mode;

/// Vector offsets from the configured base.
const VECTOR_SWI: u32 = 0x08;
const VECTOR_PREFETCH_ABORT: u32 = 0x0C;

/// Vector base for the high-vectors configuration.
const HIGH_VECTOR_BASE: u32 = 0xFFFF_0000;

impl Arm1176 {
    fn vector(&self, offset: u32) -> u32 {
        if self.control.high_vectors_configured() {
            HIGH_VECTOR_BASE | offset
        } else {
            offset
        }
    }

    /// SWI: enter Supervisor mode through the software-interrupt vector.
    pub fn swi(&mut self, cond: Condition) {
        if !self.condition_passed(cond) {
            return;
        }
        let next = self.next_instr();
        let old_cpsr = self.cpsr;
        self.regs.set(Mode::Supervisor, 14, next);
        self.set_spsr_of(Mode::Supervisor, old_cpsr);
        self.cpsr.set_mode(Mode::Supervisor);
        self.cpsr.set_state_bit(false);
        self.cpsr.set_irq_disable(true);
        self.cpsr.set_endian_bit(self.control.reg1_ee_bit());
        let target = self.vector(VECTOR_SWI);
        self.set_pc_raw(target);
    }

    /// BKPT: enter Abort mode through the prefetch-abort vector, unless
    /// debug hardware claims the breakpoint first. Unconditional.
    pub fn bkpt(&mut self) {
        if !self.control.not_overridden_by_debug_hardware() {
            return;
        }
        let return_address = self.next_instr();
        let old_cpsr = self.cpsr;
        self.regs.set(Mode::Abort, 14, return_address);
        self.set_spsr_of(Mode::Abort, old_cpsr);
        self.cpsr.set_mode(Mode::Abort);
        self.cpsr.set_state_bit(false);
        self.cpsr.set_irq_disable(true);
        self.cpsr.set_abort_disable(true);
        self.cpsr.set_endian_bit(self.control.reg1_ee_bit());
        let target = self.vector(VECTOR_PREFETCH_ABORT);
        self.set_pc_raw(target);
    }
}
