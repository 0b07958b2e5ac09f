//! # Pack, byte-reverse and extend transformers
//!
//! PKHBT/PKHTB splice halfwords with an optional shift; REV/REV16/REVSH
//! reorder bytes for endianness conversion; the SXT*/UXT* family extracts
//! rotated bytes or halfwords, extends them, and optionally accumulates
//! onto Rn. None of these touch the flags.

use crate::alu::{asr, byte, half, sign_extend8, sign_extend16};
use crate::bitwise::Bits;
use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;

impl Arm1176 {
    /// PKHBT: bottom half from Rn, top half from Rm LSL #shift.
    pub fn pkhbt(&mut self, cond: Condition, d: u8, n: u8, m: u8, shift_imm: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        result.set_bits(0..=15, half(old_rn, 0));
        result.set_bits(16..=31, half(old_rm << shift_imm, 1));
        self.set_reg(d, result);
    }

    /// PKHTB: top half from Rn, bottom half from Rm ASR #shift, where a
    /// zero shift encodes ASR #32.
    pub fn pkhtb(&mut self, cond: Condition, d: u8, n: u8, m: u8, shift_imm: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        let bottom = if shift_imm == 0 {
            if old_rm.get_bit(31) { 0xFFFF } else { 0x0000 }
        } else {
            half(asr(old_rm, u32::from(shift_imm)), 0)
        };
        result.set_bits(0..=15, bottom);
        result.set_bits(16..=31, half(old_rn, 1));
        self.set_reg(d, result);
    }

    /// REV: full byte reversal.
    pub fn rev(&mut self, cond: Condition, d: u8, m: u8) {
        let old_rm = self.reg(m);
        if self.condition_passed(cond) {
            self.set_reg(d, old_rm.swap_bytes());
        }
    }

    /// REV16: byte reversal within each halfword.
    pub fn rev16(&mut self, cond: Condition, d: u8, m: u8) {
        let old_rm = self.reg(m);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        result.set_bits(8..=15, byte(old_rm, 0));
        result.set_bits(0..=7, byte(old_rm, 1));
        result.set_bits(24..=31, byte(old_rm, 2));
        result.set_bits(16..=23, byte(old_rm, 3));
        self.set_reg(d, result);
    }

    /// REVSH: byte-reverse the low halfword and sign-extend it from what
    /// was bit 7.
    pub fn revsh(&mut self, cond: Condition, d: u8, m: u8) {
        let old_rm = self.reg(m);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        result.set_bits(8..=15, byte(old_rm, 0));
        result.set_bits(0..=7, byte(old_rm, 1));
        let fill = if old_rm.get_bit(7) { 0xFFFF } else { 0x0000 };
        result.set_bits(16..=31, fill);
        self.set_reg(d, result);
    }

    /// The rotated source shared by the whole extend family.
    fn extend_operand(&self, m: u8, rotate: u8) -> u32 {
        self.reg(m).rotate_right(8 * u32::from(rotate))
    }

    pub fn sxtb(&mut self, cond: Condition, d: u8, m: u8, rotate: u8) {
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate);
        self.set_reg(d, sign_extend8(operand));
    }

    pub fn sxth(&mut self, cond: Condition, d: u8, m: u8, rotate: u8) {
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate);
        self.set_reg(d, sign_extend16(operand));
    }

    /// SXTB16: sign-extend bytes 0 and 2 into the two halfwords.
    pub fn sxtb16(&mut self, cond: Condition, d: u8, m: u8, rotate: u8) {
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate);
        let mut result = self.reg(d);
        result.set_bits(0..=15, sign_extend8(operand));
        result.set_bits(16..=31, sign_extend8(byte(operand, 2)));
        self.set_reg(d, result);
    }

    pub fn sxtab(&mut self, cond: Condition, d: u8, n: u8, m: u8, rotate: u8) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate);
        self.set_reg(d, old_rn.wrapping_add(sign_extend8(operand)));
    }

    pub fn sxtah(&mut self, cond: Condition, d: u8, n: u8, m: u8, rotate: u8) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate);
        self.set_reg(d, old_rn.wrapping_add(sign_extend16(operand)));
    }

    /// SXTAB16: per-halfword accumulate of sign-extended bytes 0 and 2.
    pub fn sxtab16(&mut self, cond: Condition, d: u8, n: u8, m: u8, rotate: u8) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate);
        let mut result = self.reg(d);
        result.set_bits(
            0..=15,
            half(old_rn, 0).wrapping_add(sign_extend8(operand)),
        );
        result.set_bits(
            16..=31,
            half(old_rn, 1).wrapping_add(sign_extend8(byte(operand, 2))),
        );
        self.set_reg(d, result);
    }

    pub fn uxtb(&mut self, cond: Condition, d: u8, m: u8, rotate: u8) {
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate);
        self.set_reg(d, operand & 0x0000_00FF);
    }

    pub fn uxth(&mut self, cond: Condition, d: u8, m: u8, rotate: u8) {
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate);
        self.set_reg(d, operand & 0x0000_FFFF);
    }

    pub fn uxtb16(&mut self, cond: Condition, d: u8, m: u8, rotate: u8) {
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate);
        self.set_reg(d, operand & 0x00FF_00FF);
    }

    pub fn uxtab(&mut self, cond: Condition, d: u8, n: u8, m: u8, rotate: u8) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate) & 0x0000_00FF;
        self.set_reg(d, old_rn.wrapping_add(operand));
    }

    pub fn uxtah(&mut self, cond: Condition, d: u8, n: u8, m: u8, rotate: u8) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate) & 0x0000_FFFF;
        self.set_reg(d, old_rn.wrapping_add(operand));
    }

    /// UXTAB16: per-halfword accumulate of zero-extended bytes 0 and 2.
    pub fn uxtab16(&mut self, cond: Condition, d: u8, n: u8, m: u8, rotate: u8) {
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let operand = self.extend_operand(m, rotate) & 0x00FF_00FF;
        let mut result = self.reg(d);
        result.set_bits(0..=15, half(old_rn, 0).wrapping_add(half(operand, 0)));
        result.set_bits(16..=31, half(old_rn, 1).wrapping_add(byte(operand, 2)));
        self.set_reg(d, result);
    }
}
