//! # Parallel add/subtract transformers
//!
//! Byte and halfword lane arithmetic. The signed (S-prefix) and unsigned
//! (U-prefix) forms write the wrapped lane results and record a per-lane
//! predicate in CPSR.GE: signed lanes set GE when the full-precision lane
//! result is non-negative, unsigned adds set GE on lane carry and unsigned
//! subtracts on no-borrow. The halving forms (SH/UH) return the
//! full-precision lane result shifted right one bit and leave GE alone.
//! SEL consumes GE, picking each result byte from Rn or Rm.
//!
//! GE lanes not written by an instruction keep their previous value.

use crate::alu::{byte, carry_from8_add2, carry_from16_add2, half, signed_byte, signed_half};
use crate::bitwise::Bits;
use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;

impl Arm1176 {
    pub fn sadd16(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..2_u32 {
            let sum = signed_half(old_rn, lane) + signed_half(old_rm, lane);
            result.set_bits((16 * lane as u8)..=(16 * lane as u8 + 15), sum as u32);
            self.cpsr.set_ge_pair(lane as u8, sum >= 0);
        }
        self.set_reg(d, result);
    }

    pub fn ssub16(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..2_u32 {
            let diff = signed_half(old_rn, lane) - signed_half(old_rm, lane);
            result.set_bits((16 * lane as u8)..=(16 * lane as u8 + 15), diff as u32);
            self.cpsr.set_ge_pair(lane as u8, diff >= 0);
        }
        self.set_reg(d, result);
    }

    pub fn sadd8(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..4_u32 {
            let sum = signed_byte(old_rn, lane) + signed_byte(old_rm, lane);
            result.set_bits((8 * lane as u8)..=(8 * lane as u8 + 7), sum as u32);
            self.cpsr.set_ge_bit(lane as u8, sum >= 0);
        }
        self.set_reg(d, result);
    }

    pub fn ssub8(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..4_u32 {
            let diff = signed_byte(old_rn, lane) - signed_byte(old_rm, lane);
            result.set_bits((8 * lane as u8)..=(8 * lane as u8 + 7), diff as u32);
            self.cpsr.set_ge_bit(lane as u8, diff >= 0);
        }
        self.set_reg(d, result);
    }

    /// SADDSUBX: top = Rn.top + Rm.bottom, bottom = Rn.bottom - Rm.top.
    pub fn saddsubx(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let sum = signed_half(old_rn, 1) + signed_half(old_rm, 0);
        let diff = signed_half(old_rn, 0) - signed_half(old_rm, 1);
        let mut result = self.reg(d);
        result.set_bits(16..=31, sum as u32);
        result.set_bits(0..=15, diff as u32);
        self.set_reg(d, result);
        self.cpsr.set_ge_pair(1, sum >= 0);
        self.cpsr.set_ge_pair(0, diff >= 0);
    }

    /// SSUBADDX: top = Rn.top - Rm.bottom, bottom = Rn.bottom + Rm.top.
    pub fn ssubaddx(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let diff = signed_half(old_rn, 1) - signed_half(old_rm, 0);
        let sum = signed_half(old_rn, 0) + signed_half(old_rm, 1);
        let mut result = self.reg(d);
        result.set_bits(16..=31, diff as u32);
        result.set_bits(0..=15, sum as u32);
        self.set_reg(d, result);
        self.cpsr.set_ge_pair(1, diff >= 0);
        self.cpsr.set_ge_pair(0, sum >= 0);
    }

    pub fn uadd16(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..2_u32 {
            let rn_lane = half(old_rn, lane);
            let rm_lane = half(old_rm, lane);
            result.set_bits((16 * lane as u8)..=(16 * lane as u8 + 15), rn_lane + rm_lane);
            self.cpsr
                .set_ge_pair(lane as u8, carry_from16_add2(rn_lane, rm_lane));
        }
        self.set_reg(d, result);
    }

    pub fn usub16(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..2_u32 {
            let rn_lane = half(old_rn, lane);
            let rm_lane = half(old_rm, lane);
            result.set_bits(
                (16 * lane as u8)..=(16 * lane as u8 + 15),
                rn_lane.wrapping_sub(rm_lane),
            );
            self.cpsr.set_ge_pair(lane as u8, rn_lane >= rm_lane);
        }
        self.set_reg(d, result);
    }

    pub fn uadd8(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..4_u32 {
            let rn_lane = byte(old_rn, lane);
            let rm_lane = byte(old_rm, lane);
            result.set_bits((8 * lane as u8)..=(8 * lane as u8 + 7), rn_lane + rm_lane);
            self.cpsr
                .set_ge_bit(lane as u8, carry_from8_add2(rn_lane, rm_lane));
        }
        self.set_reg(d, result);
    }

    pub fn usub8(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..4_u32 {
            let rn_lane = byte(old_rn, lane);
            let rm_lane = byte(old_rm, lane);
            result.set_bits(
                (8 * lane as u8)..=(8 * lane as u8 + 7),
                rn_lane.wrapping_sub(rm_lane),
            );
            self.cpsr.set_ge_bit(lane as u8, rn_lane >= rm_lane);
        }
        self.set_reg(d, result);
    }

    /// UADDSUBX: top = Rn.top + Rm.bottom, bottom = Rn.bottom - Rm.top.
    pub fn uaddsubx(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let sum = half(old_rn, 1) + half(old_rm, 0);
        let mut result = self.reg(d);
        result.set_bits(16..=31, sum);
        self.cpsr
            .set_ge_pair(1, carry_from16_add2(half(old_rn, 1), half(old_rm, 0)));
        result.set_bits(0..=15, half(old_rn, 0).wrapping_sub(half(old_rm, 1)));
        self.cpsr.set_ge_pair(0, half(old_rn, 0) >= half(old_rm, 1));
        self.set_reg(d, result);
    }

    /// USUBADDX: top = Rn.top - Rm.bottom, bottom = Rn.bottom + Rm.top.
    pub fn usubaddx(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        result.set_bits(16..=31, half(old_rn, 1).wrapping_sub(half(old_rm, 0)));
        self.cpsr.set_ge_pair(1, half(old_rn, 1) >= half(old_rm, 0));
        let sum = half(old_rn, 0) + half(old_rm, 1);
        result.set_bits(0..=15, sum);
        self.cpsr
            .set_ge_pair(0, carry_from16_add2(half(old_rn, 0), half(old_rm, 1)));
        self.set_reg(d, result);
    }

    pub fn shadd16(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..2_u32 {
            let sum = signed_half(old_rn, lane) + signed_half(old_rm, lane);
            result.set_bits((16 * lane as u8)..=(16 * lane as u8 + 15), (sum >> 1) as u32);
        }
        self.set_reg(d, result);
    }

    pub fn shsub16(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..2_u32 {
            let diff = signed_half(old_rn, lane) - signed_half(old_rm, lane);
            result.set_bits((16 * lane as u8)..=(16 * lane as u8 + 15), (diff >> 1) as u32);
        }
        self.set_reg(d, result);
    }

    pub fn shadd8(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..4_u32 {
            let sum = signed_byte(old_rn, lane) + signed_byte(old_rm, lane);
            result.set_bits((8 * lane as u8)..=(8 * lane as u8 + 7), (sum >> 1) as u32);
        }
        self.set_reg(d, result);
    }

    pub fn shsub8(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..4_u32 {
            let diff = signed_byte(old_rn, lane) - signed_byte(old_rm, lane);
            result.set_bits((8 * lane as u8)..=(8 * lane as u8 + 7), (diff >> 1) as u32);
        }
        self.set_reg(d, result);
    }

    pub fn shaddsubx(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let sum = signed_half(old_rn, 1) + signed_half(old_rm, 0);
        let diff = signed_half(old_rn, 0) - signed_half(old_rm, 1);
        let mut result = self.reg(d);
        result.set_bits(16..=31, (sum >> 1) as u32);
        result.set_bits(0..=15, (diff >> 1) as u32);
        self.set_reg(d, result);
    }

    pub fn shsubaddx(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let diff = signed_half(old_rn, 1) - signed_half(old_rm, 0);
        let sum = signed_half(old_rn, 0) + signed_half(old_rm, 1);
        let mut result = self.reg(d);
        result.set_bits(16..=31, (diff >> 1) as u32);
        result.set_bits(0..=15, (sum >> 1) as u32);
        self.set_reg(d, result);
    }

    pub fn uhadd16(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..2_u32 {
            let sum = half(old_rn, lane) + half(old_rm, lane);
            result.set_bits((16 * lane as u8)..=(16 * lane as u8 + 15), sum >> 1);
        }
        self.set_reg(d, result);
    }

    pub fn uhsub16(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..2_u32 {
            let diff = half(old_rn, lane).wrapping_sub(half(old_rm, lane));
            result.set_bits((16 * lane as u8)..=(16 * lane as u8 + 15), (diff & 0x1_FFFF) >> 1);
        }
        self.set_reg(d, result);
    }

    pub fn uhadd8(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..4_u32 {
            let sum = byte(old_rn, lane) + byte(old_rm, lane);
            result.set_bits((8 * lane as u8)..=(8 * lane as u8 + 7), sum >> 1);
        }
        self.set_reg(d, result);
    }

    pub fn uhsub8(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let mut result = self.reg(d);
        for lane in 0..4_u32 {
            let diff = byte(old_rn, lane).wrapping_sub(byte(old_rm, lane));
            result.set_bits((8 * lane as u8)..=(8 * lane as u8 + 7), (diff & 0x1FF) >> 1);
        }
        self.set_reg(d, result);
    }

    pub fn uhaddsubx(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let sum = half(old_rn, 1) + half(old_rm, 0);
        let diff = half(old_rn, 0).wrapping_sub(half(old_rm, 1));
        let mut result = self.reg(d);
        result.set_bits(16..=31, sum >> 1);
        result.set_bits(0..=15, (diff & 0x1_FFFF) >> 1);
        self.set_reg(d, result);
    }

    pub fn uhsubaddx(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let diff = half(old_rn, 1).wrapping_sub(half(old_rm, 0));
        let sum = half(old_rn, 0) + half(old_rm, 1);
        let mut result = self.reg(d);
        result.set_bits(16..=31, (diff & 0x1_FFFF) >> 1);
        result.set_bits(0..=15, sum >> 1);
        self.set_reg(d, result);
    }

    /// SEL: assemble Rd from Rn/Rm bytes, steered by the GE lanes.
    pub fn sel(&mut self, cond: Condition, d: u8, n: u8, m: u8) {
        let old_rm = self.reg(m);
        let old_rn = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        let ge = self.cpsr.ge_bits();
        let mut result = self.reg(d);
        for lane in 0..4_u32 {
            let source = if ge >> lane & 1 == 1 { old_rn } else { old_rm };
            result.set_bits((8 * lane as u8)..=(8 * lane as u8 + 7), byte(source, lane));
        }
        self.set_reg(d, result);
    }
}
