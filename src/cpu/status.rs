//! # Status-register transformers
//!
//! MRS/MSR move whole PSR images; MSR's writes are constrained by the
//! architectural field masks so reserved bits stay reserved, user mode can
//! only touch the flag byte, and the execution-state bits are writable only
//! on an SPSR. CPS flips the interrupt masks and mode from privileged code,
//! and SETEND rewrites CPSR.E.

use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::instruction::{MsrOperand, PsrKind};
use crate::cpu::psr::Psr;
use crate::cpu::unpredictable::Unpredictable;

impl Arm1176 {
    /// MRS: read CPSR or the current SPSR into Rd.
    pub fn mrs(&mut self, cond: Condition, d: u8, source: PsrKind) {
        if !self.condition_passed(cond) {
            return;
        }
        let value = match source {
            PsrKind::Cpsr => self.cpsr,
            PsrKind::Spsr => self.spsr(),
        };
        self.set_reg(d, value.bits());
    }

    /// MSR: mask-constrained PSR write (ARM ARM A4.1.39).
    pub fn msr(&mut self, cond: Condition, destination: PsrKind, field_mask: u8, operand: MsrOperand) {
        if !self.condition_passed(cond) {
            return;
        }
        let operand = match operand {
            MsrOperand::Immediate { immed_8, rotate_imm } => {
                immed_8.rotate_right(u32::from(rotate_imm) * 2)
            }
            MsrOperand::Register { m } => self.reg(m),
        };
        if operand & Psr::UNALLOC_MASK != 0 {
            self.unpredictable(Unpredictable::ReservedPsrBits { operand });
            return;
        }

        // One byte of the image per field-mask bit.
        let mut byte_mask = 0_u32;
        for lane in 0..4 {
            if field_mask >> lane & 1 == 1 {
                byte_mask |= 0xFF << (8 * lane);
            }
        }

        match destination {
            PsrKind::Cpsr => {
                let mask = if self.in_privileged_mode() {
                    if operand & Psr::STATE_MASK != 0 {
                        self.unpredictable(Unpredictable::CpsrStateBits { operand });
                        return;
                    }
                    byte_mask & (Psr::USER_MASK | Psr::PRIV_MASK)
                } else {
                    byte_mask & Psr::USER_MASK
                };
                let merged = (self.cpsr.bits() & !mask) | (operand & mask);
                self.cpsr = Psr::from_bits(merged);
            }
            PsrKind::Spsr => {
                if !self.current_mode_has_spsr() {
                    self.unpredictable(Unpredictable::SpsrAccess);
                    return;
                }
                let mask = byte_mask & (Psr::USER_MASK | Psr::PRIV_MASK | Psr::STATE_MASK);
                let merged = (self.spsr().bits() & !mask) | (operand & mask);
                self.set_spsr(Psr::from_bits(merged));
            }
        }
    }

    /// CPS: change the A/I/F masks and optionally the mode. A no-op outside
    /// privileged modes.
    pub fn cps(&mut self, imod: u8, mmod: bool, a: bool, i: bool, f: bool, mode: Mode) {
        if !self.in_privileged_mode() {
            return;
        }
        if imod >> 1 & 1 == 1 {
            let value = imod & 1 == 1;
            if a {
                self.cpsr.set_abort_disable(value);
            }
            if i {
                self.cpsr.set_irq_disable(value);
            }
            if f {
                self.cpsr.set_fiq_disable(value);
            }
        }
        if mmod {
            self.cpsr.set_mode(mode);
        }
    }

    /// SETEND: rewrite CPSR.E through the CP15 shim. Unconditional.
    pub fn setend(&mut self, big_endian: bool) {
        self.cpsr = self.control.cpsr_with_e_bit(self.cpsr, big_endian);
    }
}
