//! # Branch transformers
//!
//! B/BL and the interworking branches. BX-style targets carry the desired
//! Thumb state in bit 0, so these are the callers of
//! [`Arm1176::set_pc_interworking`]; plain B/BL keeps the current state.

use crate::alu::sign_extend24;
use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;
use crate::cpu::registers::REG_LR;

impl Arm1176 {
    /// B and BL. The 24-bit immediate is sign-extended and shifted into a
    /// word offset relative to the pipeline PC (current instruction + 8).
    pub fn b_bl(&mut self, cond: Condition, link: bool, signed_immed_24: u32) {
        if !self.condition_passed(cond) {
            return;
        }
        if link {
            let next = self.next_instr();
            self.set_reg(REG_LR, next);
        }
        let target = self.reg(15).wrapping_add(sign_extend24(signed_immed_24) << 2);
        self.set_pc_raw(target);
    }

    /// BX: branch to Rm with a possible Thumb switch.
    pub fn bx(&mut self, cond: Condition, m: u8) {
        let old_rm = self.reg(m);
        if self.condition_passed(cond) {
            self.set_pc_interworking(old_rm);
        }
    }

    /// BLX (register form): BX plus a return address in r14.
    pub fn blx_register(&mut self, cond: Condition, m: u8) {
        let target = self.reg(m);
        if self.condition_passed(cond) {
            let next = self.next_instr();
            self.set_reg(REG_LR, next);
            self.set_pc_interworking(target);
        }
    }

    /// BLX (immediate form). Unconditional; always enters Thumb state. The
    /// H bit contributes the halfword step Thumb targets need.
    pub fn blx_immediate(&mut self, signed_immed_24: u32, h_bit: bool) {
        let next = self.next_instr();
        self.set_reg(REG_LR, next);
        self.cpsr.set_state_bit(true);
        let target = self
            .reg(15)
            .wrapping_add(sign_extend24(signed_immed_24) << 2)
            .wrapping_add(u32::from(h_bit) << 1);
        self.set_pc_raw(target);
    }

    /// BXJ: attempt Jazelle entry, falling back to BX behavior when the
    /// extension is absent, declines the opcode, or the configuration says
    /// to. All the predicates live behind the Jazelle collaborator.
    pub fn bxj(&mut self, cond: Condition, m: u8) {
        let old_rm = self.reg(m);
        if !self.condition_passed(cond) {
            return;
        }
        if !self.jazelle.je_bit() {
            self.set_pc_interworking(old_rm);
            return;
        }
        let jpc = self.jazelle.subarchitecture_defined_value();
        let invalid_handler = self.jazelle.subarchitecture_defined_value();
        if self.jazelle.accepts_opcode_at_jpc() {
            if self.jazelle.cv_bit() {
                self.cpsr.set_jazelle_bit(true);
                self.jazelle.start_opcode_execution_at(jpc);
            } else {
                self.set_pc_raw(invalid_handler);
            }
        } else if !self.jazelle.cv_bit() && self.jazelle.implementation_defined_condition() {
            self.set_pc_raw(invalid_handler);
        } else {
            self.set_pc_interworking(old_rm);
        }
    }

    /// CLZ: count leading zeros of Rm; 32 when Rm is zero. No flag side
    /// effects.
    pub fn clz(&mut self, cond: Condition, d: u8, m: u8) {
        let old_rm = self.reg(m);
        if self.condition_passed(cond) {
            self.set_reg(d, old_rm.leading_zeros());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn branch_forward_and_backward() {
        let mut core = Arm1176::for_tests();
        core.regs.set_program_counter(0x100);
        // +15 words relative to PC+8.
        core.b_bl(Condition::AL, false, 15);
        assert_eq!(core.regs.program_counter(), 0x100 + 8 + 60);

        // -9 words.
        core.b_bl(Condition::AL, false, 0x00FF_FFF7);
        assert_eq!(core.regs.program_counter(), 0x144 + 8 - 36);
    }

    #[test]
    fn branch_with_link_saves_return_address() {
        let mut core = Arm1176::for_tests();
        core.regs.set_program_counter(0x100);
        core.b_bl(Condition::AL, true, 1);
        assert_eq!(core.reg(REG_LR), 0x104);
        assert_eq!(core.regs.program_counter(), 0x10C);
    }

    #[test]
    fn conditional_branch_not_taken() {
        let mut core = Arm1176::for_tests();
        core.regs.set_program_counter(0x100);
        core.b_bl(Condition::EQ, true, 1);
        assert_eq!(core.regs.program_counter(), 0x100);
        assert_eq!(core.reg(REG_LR), 0);
    }

    #[test]
    fn bx_switches_to_thumb_on_odd_target() {
        let mut core = Arm1176::for_tests();
        core.set_reg(2, 0x0000_2001);
        core.bx(Condition::AL, 2);
        assert!(core.cpsr.state_bit());
        assert_eq!(core.regs.program_counter(), 0x2000);
    }

    #[test]
    fn bx_even_target_stays_arm() {
        let mut core = Arm1176::for_tests();
        core.cpsr.set_state_bit(true);
        core.set_reg(2, 0x2000);
        core.bx(Condition::AL, 2);
        assert!(!core.cpsr.state_bit());
        assert_eq!(core.regs.program_counter(), 0x2000);
    }

    #[test]
    fn blx_register_links_and_exchanges() {
        let mut core = Arm1176::for_tests();
        core.regs.set_program_counter(0x500);
        core.set_reg(3, 0x3001);
        core.blx_register(Condition::AL, 3);
        assert_eq!(core.reg(REG_LR), 0x504);
        assert!(core.cpsr.state_bit());
        assert_eq!(core.regs.program_counter(), 0x3000);
    }

    #[test]
    fn blx_immediate_is_unconditional_and_enters_thumb() {
        let mut core = Arm1176::for_tests();
        core.regs.set_program_counter(0x100);
        core.cpsr.set_zero_flag(false);
        core.blx_immediate(2, true);
        assert!(core.cpsr.state_bit());
        assert_eq!(core.reg(REG_LR), 0x104);
        assert_eq!(core.regs.program_counter(), 0x100 + 8 + 8 + 2);
    }

    #[test]
    fn bxj_without_extension_behaves_as_bx() {
        let mut core = Arm1176::for_tests();
        core.set_reg(4, 0x4001);
        core.bxj(Condition::AL, 4);
        assert!(core.cpsr.state_bit());
        assert!(!core.cpsr.jazelle_bit());
        assert_eq!(core.regs.program_counter(), 0x4000);
    }

    #[test]
    fn clz_counts_leading_zeros() {
        let mut core = Arm1176::for_tests();
        core.set_reg(1, 0);
        core.clz(Condition::AL, 0, 1);
        assert_eq!(core.reg(0), 32);

        core.set_reg(1, 1);
        core.clz(Condition::AL, 0, 1);
        assert_eq!(core.reg(0), 31);

        core.set_reg(1, 0x8000_0000);
        core.clz(Condition::AL, 0, 1);
        assert_eq!(core.reg(0), 0);
    }
}
