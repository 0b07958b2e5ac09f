//! # Data-processing transformers
//!
//! The sixteen classic ALU operations plus CPY, all sharing one shape:
//! snapshot the sources, gate on the condition, run the operand through the
//! shifter, compute, write Rd, then apply the family's flag rules when S is
//! set. A flag-setting write to r15 instead restores CPSR from the SPSR,
//! which is the architectural exception-return idiom.
//!
//! Arithmetic operations derive C and V from the ALU result; logical
//! operations take C from the shifter's carry-out and leave V alone.

use crate::alu::{
    borrow_from_sub2, borrow_from_sub3, carry_from_add2, carry_from_add3, overflow_from_add2,
    overflow_from_add3, overflow_from_sub2, overflow_from_sub3,
};
use crate::bitwise::Bits;
use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;
use crate::cpu::registers::REG_PC;
use crate::cpu::shifter::ShiftOperand;

impl Arm1176 {
    /// N and Z from a result; the per-family C/V updates happen at the call
    /// site.
    fn set_nz(&mut self, result: u32) {
        self.cpsr.set_sign_flag(result.get_bit(31));
        self.cpsr.set_zero_flag(result == 0);
    }

    pub fn adc(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        let carry_in = self.cpsr.carry_flag();
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self).value;
        let result = old_rn.wrapping_add(operand).wrapping_add(u32::from(carry_in));
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(carry_from_add3(old_rn, operand, carry_in));
            self.cpsr.set_overflow_flag(overflow_from_add3(old_rn, operand, carry_in));
        }
    }

    pub fn add(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self).value;
        let result = old_rn.wrapping_add(operand);
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(carry_from_add2(old_rn, operand));
            self.cpsr.set_overflow_flag(overflow_from_add2(old_rn, operand));
        }
    }

    pub fn and(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self);
        let result = old_rn & operand.value;
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(operand.carry);
        }
    }

    pub fn bic(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self);
        let result = old_rn & !operand.value;
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(operand.carry);
        }
    }

    pub fn cmn(&mut self, cond: Condition, n: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self).value;
        let alu_out = old_rn.wrapping_add(operand);
        self.set_nz(alu_out);
        self.cpsr.set_carry_flag(carry_from_add2(old_rn, operand));
        self.cpsr.set_overflow_flag(overflow_from_add2(old_rn, operand));
    }

    pub fn cmp(&mut self, cond: Condition, n: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self).value;
        let alu_out = old_rn.wrapping_sub(operand);
        self.set_nz(alu_out);
        self.cpsr.set_carry_flag(!borrow_from_sub2(old_rn, operand));
        self.cpsr.set_overflow_flag(overflow_from_sub2(old_rn, operand));
    }

    /// CPY is MOV without a shifter operand and without flags.
    pub fn cpy(&mut self, cond: Condition, d: u8, m: u8) {
        let old_rm = self.reg(m);
        if self.condition_passed(cond) {
            self.set_reg(d, old_rm);
        }
    }

    pub fn eor(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self);
        let result = old_rn ^ operand.value;
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(operand.carry);
        }
    }

    pub fn mov(&mut self, cond: Condition, set_flags: bool, d: u8, op2: ShiftOperand) {
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self);
        self.set_reg(d, operand.value);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(operand.value);
            self.cpsr.set_carry_flag(operand.carry);
        }
    }

    pub fn mvn(&mut self, cond: Condition, set_flags: bool, d: u8, op2: ShiftOperand) {
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self);
        let result = !operand.value;
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(operand.carry);
        }
    }

    pub fn orr(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self);
        let result = old_rn | operand.value;
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(operand.carry);
        }
    }

    pub fn rsb(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self).value;
        let result = operand.wrapping_sub(old_rn);
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(!borrow_from_sub2(operand, old_rn));
            self.cpsr.set_overflow_flag(overflow_from_sub2(operand, old_rn));
        }
    }

    pub fn rsc(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        let borrow_in = !self.cpsr.carry_flag();
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self).value;
        let result = operand.wrapping_sub(old_rn).wrapping_sub(u32::from(borrow_in));
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(!borrow_from_sub3(operand, old_rn, borrow_in));
            self.cpsr.set_overflow_flag(overflow_from_sub3(operand, old_rn, borrow_in));
        }
    }

    pub fn sbc(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        let borrow_in = !self.cpsr.carry_flag();
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self).value;
        let result = old_rn.wrapping_sub(operand).wrapping_sub(u32::from(borrow_in));
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(!borrow_from_sub3(old_rn, operand, borrow_in));
            self.cpsr.set_overflow_flag(overflow_from_sub3(old_rn, operand, borrow_in));
        }
    }

    pub fn sub(&mut self, cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self).value;
        let result = old_rn.wrapping_sub(operand);
        self.set_reg(d, result);
        if set_flags && d == REG_PC {
            self.copy_spsr_to_cpsr();
        } else if set_flags {
            self.set_nz(result);
            self.cpsr.set_carry_flag(!borrow_from_sub2(old_rn, operand));
            self.cpsr.set_overflow_flag(overflow_from_sub2(old_rn, operand));
        }
    }

    pub fn teq(&mut self, cond: Condition, n: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self);
        let alu_out = old_rn ^ operand.value;
        self.set_nz(alu_out);
        self.cpsr.set_carry_flag(operand.carry);
    }

    pub fn tst(&mut self, cond: Condition, n: u8, op2: ShiftOperand) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = op2.resolve(self);
        let alu_out = old_rn & operand.value;
        self.set_nz(alu_out);
        self.cpsr.set_carry_flag(operand.carry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::cpu_modes::Mode;
    use crate::cpu::psr::Psr;
    use pretty_assertions::assert_eq;

    fn flags(core: &Arm1176) -> (bool, bool, bool, bool) {
        (
            core.cpsr.sign_flag(),
            core.cpsr.zero_flag(),
            core.cpsr.carry_flag(),
            core.cpsr.overflow_flag(),
        )
    }

    const fn imm(value: u32) -> ShiftOperand {
        ShiftOperand::Immediate {
            immed_8: value,
            rotate_imm: 0,
        }
    }

    #[test]
    fn add_carry_and_overflow_together() {
        // 0x80000000 + 0x80000000 wraps to zero with carry and overflow.
        let mut core = Arm1176::for_tests();
        core.set_reg(0, 0x8000_0000);
        core.set_reg(1, 0x8000_0000);
        core.add(
            Condition::AL,
            true,
            0,
            0,
            ShiftOperand::Register { m: 1 },
        );
        assert_eq!(core.reg(0), 0);
        assert_eq!(flags(&core), (false, true, true, true));
    }

    #[test]
    fn sbc_with_borrow_in() {
        // 0 - 1 - 1 = 0xFFFFFFFE, negative, borrow out.
        let mut core = Arm1176::for_tests();
        core.cpsr.set_carry_flag(false);
        core.set_reg(0, 0);
        core.sbc(Condition::AL, true, 0, 0, imm(1));
        assert_eq!(core.reg(0), 0xFFFF_FFFE);
        assert_eq!(flags(&core), (true, false, false, false));
    }

    #[test]
    fn adc_adds_the_carry() {
        let mut core = Arm1176::for_tests();
        core.cpsr.set_carry_flag(true);
        core.set_reg(0, 5);
        core.adc(Condition::AL, true, 0, 0, imm(2));
        assert_eq!(core.reg(0), 8);
        assert_eq!(flags(&core), (false, false, false, false));
    }

    #[test]
    fn logical_ops_take_carry_from_shifter() {
        let mut core = Arm1176::for_tests();
        core.set_reg(1, 0x8000_0001);
        core.set_reg(2, 0xFFFF_FFFF);
        // LSL #1 shifts bit 31 out into the carry.
        core.and(
            Condition::AL,
            true,
            2,
            0,
            ShiftOperand::LslImmediate { m: 1, shift_imm: 1 },
        );
        assert_eq!(core.reg(0), 0x0000_0002);
        assert!(core.cpsr.carry_flag());
        assert!(!core.cpsr.overflow_flag());
    }

    #[test]
    fn failed_condition_leaves_context_untouched() {
        let mut core = Arm1176::for_tests();
        core.set_reg(0, 7);
        let before = core.save_state();
        // Z clear, EQ fails.
        core.add(Condition::EQ, true, 0, 0, imm(1));
        core.cmp(Condition::EQ, 0, imm(7));
        core.mvn(Condition::EQ, true, 0, imm(0));
        let after = core.save_state();
        assert_eq!(before.cpsr, after.cpsr);
        assert_eq!(after.regs.get(Mode::Supervisor, 0), 7);
    }

    #[test]
    fn aliased_source_uses_pre_write_value() {
        // ADD r0, r0, r0 LSL r0: every operand aliases the destination.
        let mut core = Arm1176::for_tests();
        core.set_reg(0, 3);
        core.add(
            Condition::AL,
            false,
            0,
            0,
            ShiftOperand::LslRegister { m: 0, s: 0 },
        );
        assert_eq!(core.reg(0), 3 + (3 << 3));
    }

    #[test]
    fn comparisons_do_not_write_registers() {
        let mut core = Arm1176::for_tests();
        core.set_reg(3, 9);
        core.cmp(Condition::AL, 3, imm(9));
        assert_eq!(core.reg(3), 9);
        assert!(core.cpsr.zero_flag());
        assert!(core.cpsr.carry_flag());

        core.tst(Condition::AL, 3, imm(6));
        assert!(!core.cpsr.zero_flag());
        core.teq(Condition::AL, 3, imm(9));
        assert!(core.cpsr.zero_flag());
        core.cmn(Condition::AL, 3, imm(0xF7));
        assert!(core.cpsr.zero_flag());
        assert!(core.cpsr.carry_flag());
    }

    #[test]
    fn rsb_reverses_the_operands() {
        let mut core = Arm1176::for_tests();
        core.set_reg(1, 3);
        core.rsb(Condition::AL, true, 1, 0, imm(10));
        assert_eq!(core.reg(0), 7);
        assert!(core.cpsr.carry_flag());
    }

    #[test]
    fn rsc_subtracts_the_not_carry() {
        let mut core = Arm1176::for_tests();
        core.cpsr.set_carry_flag(false);
        core.set_reg(1, 3);
        core.rsc(Condition::AL, false, 1, 0, imm(10));
        assert_eq!(core.reg(0), 6);
    }

    #[test]
    fn mov_to_pc_without_s_keeps_thumb_bit() {
        let mut core = Arm1176::for_tests();
        core.set_reg(1, 0x0000_2001);
        core.mov(
            Condition::AL,
            false,
            REG_PC,
            ShiftOperand::Register { m: 1 },
        );
        // Raw PC write: no interworking, T untouched.
        assert!(!core.cpsr.state_bit());
        assert_eq!(core.regs.program_counter(), 0x2001);
    }

    #[test]
    fn flag_setting_write_to_pc_restores_spsr() {
        let mut core = Arm1176::for_tests();
        let mut saved = Psr::from(Mode::System);
        saved.set_carry_flag(true);
        saved.set_state_bit(true);
        core.set_spsr(saved);
        core.set_reg(1, 0x4000);
        core.mov(
            Condition::AL,
            true,
            REG_PC,
            ShiftOperand::Register { m: 1 },
        );
        assert_eq!(core.cpsr, saved);
        assert_eq!(core.cpsr.mode(), Mode::System);
    }

    #[test]
    fn sub_borrow_clears_carry() {
        let mut core = Arm1176::for_tests();
        core.set_reg(0, 1);
        core.sub(Condition::AL, true, 0, 0, imm(2));
        assert_eq!(core.reg(0), 0xFFFF_FFFF);
        assert_eq!(flags(&core), (true, false, false, false));
    }

    #[test]
    fn cpy_moves_without_flags() {
        let mut core = Arm1176::for_tests();
        core.set_reg(4, 0x8000_0000);
        core.cpy(Condition::AL, 5, 4);
        assert_eq!(core.reg(5), 0x8000_0000);
        assert!(!core.cpsr.sign_flag());
    }
}
