//! # Multiply transformers
//!
//! From MUL up through the ARMv6 DSP family: 32x32 with optional
//! accumulate, 64-bit long forms, signed halfword products, dual-halfword
//! dot products, most-significant-word forms with optional rounding, and
//! the unsigned sum-of-absolute-differences pair.
//!
//! Flag behavior is uneven by design: MUL/MLA and the long forms update
//! N/Z under S (C and V are left alone), the halfword and dual products
//! set the sticky Q flag on accumulator overflow, and everything else
//! leaves the flags untouched.

use crate::alu::{byte, carry_from_add2, overflow_from_add2, signed_half};
use crate::bitwise::Bits;
use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;

/// Signed 64-bit product of two 32-bit register images.
const fn signed_product(a: u32, b: u32) -> i64 {
    a as i32 as i64 * b as i32 as i64
}

/// The 64-bit accumulator held in an RdHi:RdLo pair.
const fn pair_to_u64(hi: u32, lo: u32) -> u64 {
    (hi as u64) << 32 | lo as u64
}

impl Arm1176 {
    fn set_nz_long(&mut self, hi: u32, lo: u32) {
        self.cpsr.set_sign_flag(hi.get_bit(31));
        self.cpsr.set_zero_flag(hi == 0 && lo == 0);
    }

    pub fn mul(&mut self, cond: Condition, set_flags: bool, d: u8, m: u8, s: u8) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let result = old_rm.wrapping_mul(old_rs);
        self.set_reg(d, result);
        if set_flags {
            self.cpsr.set_sign_flag(result.get_bit(31));
            self.cpsr.set_zero_flag(result == 0);
        }
    }

    pub fn mla(&mut self, cond: Condition, set_flags: bool, d: u8, n: u8, m: u8, s: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let result = old_rm.wrapping_mul(old_rs).wrapping_add(old_rn);
        self.set_reg(d, result);
        if set_flags {
            self.cpsr.set_sign_flag(result.get_bit(31));
            self.cpsr.set_zero_flag(result == 0);
        }
    }

    pub fn umull(&mut self, cond: Condition, set_flags: bool, d_lo: u8, d_hi: u8, m: u8, s: u8) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let product = u64::from(old_rm) * u64::from(old_rs);
        let (hi, lo) = ((product >> 32) as u32, product as u32);
        self.set_reg(d_hi, hi);
        self.set_reg(d_lo, lo);
        if set_flags {
            self.set_nz_long(hi, lo);
        }
    }

    pub fn umlal(&mut self, cond: Condition, set_flags: bool, d_lo: u8, d_hi: u8, m: u8, s: u8) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let product = u64::from(old_rm) * u64::from(old_rs);
        let accumulated =
            pair_to_u64(self.reg(d_hi), self.reg(d_lo)).wrapping_add(product);
        let (hi, lo) = ((accumulated >> 32) as u32, accumulated as u32);
        self.set_reg(d_hi, hi);
        self.set_reg(d_lo, lo);
        if set_flags {
            self.set_nz_long(hi, lo);
        }
    }

    /// UMAAL: Rm*Rs + RdLo + RdHi as a 64-bit value. Never saturates or
    /// overflows (the sum fits in 64 bits by construction) and never
    /// touches the flags.
    pub fn umaal(&mut self, cond: Condition, d_lo: u8, d_hi: u8, m: u8, s: u8) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let result = u64::from(old_rm) * u64::from(old_rs)
            + u64::from(self.reg(d_lo))
            + u64::from(self.reg(d_hi));
        self.set_reg(d_lo, result as u32);
        self.set_reg(d_hi, (result >> 32) as u32);
    }

    pub fn smull(&mut self, cond: Condition, set_flags: bool, d_lo: u8, d_hi: u8, m: u8, s: u8) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let product = signed_product(old_rm, old_rs) as u64;
        let (hi, lo) = ((product >> 32) as u32, product as u32);
        self.set_reg(d_hi, hi);
        self.set_reg(d_lo, lo);
        if set_flags {
            self.set_nz_long(hi, lo);
        }
    }

    pub fn smlal(&mut self, cond: Condition, set_flags: bool, d_lo: u8, d_hi: u8, m: u8, s: u8) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let product = signed_product(old_rm, old_rs) as u64;
        let accumulated =
            pair_to_u64(self.reg(d_hi), self.reg(d_lo)).wrapping_add(product);
        let (hi, lo) = ((accumulated >> 32) as u32, accumulated as u32);
        self.set_reg(d_hi, hi);
        self.set_reg(d_lo, lo);
        if set_flags {
            self.set_nz_long(hi, lo);
        }
    }

    /// Signed halfword operand of Rm or Rs: the low (x/y = 0) or high
    /// (x/y = 1) half, sign-extended.
    fn halfword_operand(value: u32, top: bool) -> u32 {
        signed_half(value, u32::from(top)) as u32
    }

    /// SMLA&lt;x&gt;&lt;y&gt;: 16x16 product plus Rn; Q on accumulate overflow.
    pub fn smla(&mut self, cond: Condition, d: u8, n: u8, m: u8, s: u8, x: bool, y: bool) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand1 = Self::halfword_operand(old_rm, x);
        let operand2 = Self::halfword_operand(old_rs, y);
        let product = operand1.wrapping_mul(operand2);
        self.set_reg(d, product.wrapping_add(old_rn));
        if overflow_from_add2(product, old_rn) {
            self.cpsr.set_sticky_overflow(true);
        }
    }

    /// SMLAL&lt;x&gt;&lt;y&gt;: 16x16 product accumulated into RdHi:RdLo. The
    /// high word absorbs the product's sign and the carry out of the low
    /// addition.
    pub fn smlal_xy(&mut self, cond: Condition, d_lo: u8, d_hi: u8, m: u8, s: u8, x: bool, y: bool) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand1 = Self::halfword_operand(old_rm, x);
        let operand2 = Self::halfword_operand(old_rs, y);
        let product = operand1.wrapping_mul(operand2);
        let new_lo = self.reg(d_lo).wrapping_add(product);
        self.set_reg(d_lo, new_lo);
        let sign_word = if (product as i32) < 0 { 0xFFFF_FFFF } else { 0 };
        // Carry propagation is computed against the updated low word.
        let carry = u32::from(carry_from_add2(new_lo, product));
        let new_hi = self
            .reg(d_hi)
            .wrapping_add(sign_word)
            .wrapping_add(carry);
        self.set_reg(d_hi, new_hi);
    }

    /// SMLAW&lt;y&gt;: 32x16 product, top 32 of the 48-bit result, plus Rn.
    pub fn smlaw(&mut self, cond: Condition, d: u8, n: u8, m: u8, s: u8, y: bool) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand2 = Self::halfword_operand(old_rs, y);
        let product = (signed_product(old_rm, operand2) >> 16) as u32;
        self.set_reg(d, product.wrapping_add(old_rn));
        if overflow_from_add2(product, old_rn) {
            self.cpsr.set_sticky_overflow(true);
        }
    }

    /// SMULW&lt;y&gt;: SMLAW without the accumulate.
    pub fn smulw(&mut self, cond: Condition, d: u8, m: u8, s: u8, y: bool) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand2 = Self::halfword_operand(old_rs, y);
        self.set_reg(d, (signed_product(old_rm, operand2) >> 16) as u32);
    }

    /// SMUL&lt;x&gt;&lt;y&gt;: plain 16x16 product.
    pub fn smul(&mut self, cond: Condition, d: u8, m: u8, s: u8, x: bool, y: bool) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand1 = Self::halfword_operand(old_rm, x);
        let operand2 = Self::halfword_operand(old_rs, y);
        self.set_reg(d, operand1.wrapping_mul(operand2));
    }

    /// The X-swapped second operand shared by the dual-halfword products.
    const fn dual_operand(old_rs: u32, x: bool) -> u32 {
        if x { old_rs.rotate_right(16) } else { old_rs }
    }

    /// SMUAD: sum of the two signed halfword products; Q on overflow.
    pub fn smuad(&mut self, cond: Condition, d: u8, m: u8, s: u8, x: bool) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand2 = Self::dual_operand(old_rs, x);
        let product1 = (signed_half(old_rm, 0).wrapping_mul(signed_half(operand2, 0))) as u32;
        let product2 = (signed_half(old_rm, 1).wrapping_mul(signed_half(operand2, 1))) as u32;
        self.set_reg(d, product1.wrapping_add(product2));
        if overflow_from_add2(product1, product2) {
            self.cpsr.set_sticky_overflow(true);
        }
    }

    /// SMUSD: difference of the two signed halfword products. Cannot
    /// overflow, so no Q.
    pub fn smusd(&mut self, cond: Condition, d: u8, m: u8, s: u8, x: bool) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand2 = Self::dual_operand(old_rs, x);
        let product1 = (signed_half(old_rm, 0).wrapping_mul(signed_half(operand2, 0))) as u32;
        let product2 = (signed_half(old_rm, 1).wrapping_mul(signed_half(operand2, 1))) as u32;
        self.set_reg(d, product1.wrapping_sub(product2));
    }

    /// SMLAD: dual product sum plus Rn; Q on overflow of the full sum.
    pub fn smlad(&mut self, cond: Condition, d: u8, n: u8, m: u8, s: u8, x: bool) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand2 = Self::dual_operand(old_rs, x);
        let product1 = (signed_half(old_rm, 0).wrapping_mul(signed_half(operand2, 0))) as u32;
        let product2 = (signed_half(old_rm, 1).wrapping_mul(signed_half(operand2, 1))) as u32;
        self.set_reg(d, old_rn.wrapping_add(product1).wrapping_add(product2));
        let wide = old_rn as i32 as i64 + product1 as i32 as i64 + product2 as i32 as i64;
        if i64::from(wide as i32) != wide {
            self.cpsr.set_sticky_overflow(true);
        }
    }

    /// SMLSD: dual product difference plus Rn; Q on overflow of the sum.
    pub fn smlsd(&mut self, cond: Condition, d: u8, n: u8, m: u8, s: u8, x: bool) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand2 = Self::dual_operand(old_rs, x);
        let product1 = (signed_half(old_rm, 0).wrapping_mul(signed_half(operand2, 0))) as u32;
        let product2 = (signed_half(old_rm, 1).wrapping_mul(signed_half(operand2, 1))) as u32;
        let difference = product1.wrapping_sub(product2);
        self.set_reg(d, old_rn.wrapping_add(difference));
        if overflow_from_add2(old_rn, difference) {
            self.cpsr.set_sticky_overflow(true);
        }
    }

    /// SMLALD: dual product sum accumulated into the 64-bit RdHi:RdLo.
    pub fn smlald(&mut self, cond: Condition, d_lo: u8, d_hi: u8, m: u8, s: u8, x: bool) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand2 = Self::dual_operand(old_rs, x);
        let product1 = i64::from(signed_half(old_rm, 0)) * i64::from(signed_half(operand2, 0));
        let product2 = i64::from(signed_half(old_rm, 1)) * i64::from(signed_half(operand2, 1));
        let result = pair_to_u64(self.reg(d_hi), self.reg(d_lo))
            .wrapping_add(product1 as u64)
            .wrapping_add(product2 as u64);
        self.set_reg(d_lo, result as u32);
        self.set_reg(d_hi, (result >> 32) as u32);
    }

    /// SMLSLD: dual product difference accumulated into RdHi:RdLo.
    pub fn smlsld(&mut self, cond: Condition, d_lo: u8, d_hi: u8, m: u8, s: u8, x: bool) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let operand2 = Self::dual_operand(old_rs, x);
        let product1 = i64::from(signed_half(old_rm, 0)) * i64::from(signed_half(operand2, 0));
        let product2 = i64::from(signed_half(old_rm, 1)) * i64::from(signed_half(operand2, 1));
        let result = pair_to_u64(self.reg(d_hi), self.reg(d_lo))
            .wrapping_add(product1 as u64)
            .wrapping_sub(product2 as u64);
        self.set_reg(d_lo, result as u32);
        self.set_reg(d_hi, (result >> 32) as u32);
    }

    /// SMMLA: Rn + most-significant word of Rm*Rs, optionally rounded
    /// half-up before the truncation.
    pub fn smmla(&mut self, cond: Condition, d: u8, n: u8, m: u8, s: u8, round: bool) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let mut wide = ((old_rn as u64) << 32).wrapping_add(signed_product(old_rm, old_rs) as u64);
        if round {
            wide = wide.wrapping_add(0x8000_0000);
        }
        self.set_reg(d, (wide >> 32) as u32);
    }

    /// SMMLS: the subtracting counterpart of SMMLA.
    pub fn smmls(&mut self, cond: Condition, d: u8, n: u8, m: u8, s: u8, round: bool) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let mut wide = ((old_rn as u64) << 32).wrapping_sub(signed_product(old_rm, old_rs) as u64);
        if round {
            wide = wide.wrapping_add(0x8000_0000);
        }
        self.set_reg(d, (wide >> 32) as u32);
    }

    /// SMMUL: most-significant word of Rm*Rs with optional rounding.
    pub fn smmul(&mut self, cond: Condition, d: u8, m: u8, s: u8, round: bool) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let mut wide = signed_product(old_rm, old_rs) as u64;
        if round {
            wide = wide.wrapping_add(0x8000_0000);
        }
        self.set_reg(d, (wide >> 32) as u32);
    }

    /// USAD8: sum of the absolute differences of the four unsigned byte
    /// lanes.
    pub fn usad8(&mut self, cond: Condition, d: u8, m: u8, s: u8) {
        let old_rm = self.reg(m);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let total: u32 = (0..4)
            .map(|lane| byte(old_rm, lane).abs_diff(byte(old_rs, lane)))
            .sum();
        self.set_reg(d, total);
    }

    /// USADA8: USAD8 accumulated onto Rn.
    pub fn usada8(&mut self, cond: Condition, d: u8, n: u8, m: u8, s: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        let old_rs = self.reg(s);
        if !self.condition_passed(cond) {
            return;
        }
        let total: u32 = (0..4)
            .map(|lane| byte(old_rm, lane).abs_diff(byte(old_rs, lane)))
            .sum();
        self.set_reg(d, old_rn.wrapping_add(total));
    }
}
