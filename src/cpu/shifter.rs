//! # Data-processing shifter
//!
//! The second operand of a data-processing instruction passes through the
//! barrel shifter, which yields two results: the 32-bit `shifter_operand`
//! and a one-bit `shifter_carry_out` that the logical instructions fold
//! into CPSR.C. The ARM ARM (A5.1) defines eleven addressing forms, each
//! with its own zero-shift special case:
//!
//! - `LSL #0` passes Rm through untouched, carry unchanged
//! - `LSR #0` encodes `LSR #32`
//! - `ASR #0` encodes `ASR #32`
//! - `ROR #0` encodes `RRX` (rotate through carry by one)
//! - register-specified shifts use the low byte of Rs, with distinct
//!   behavior at 0, 32 and above 32

use serde::{Deserialize, Serialize};

use crate::alu::asr;
use crate::bitwise::Bits;
use crate::cpu::arm1176::Arm1176;

/// The barrel shifter's two outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShifterOut {
    pub value: u32,
    pub carry: bool,
}

/// The shift applied to a scaled register offset (and, by index, to the
/// shift field of a register-form shifter operand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftKind {
    Lsl,
    Lsr,
    Asr,
    Ror,
}

impl From<u32> for ShiftKind {
    fn from(op: u32) -> Self {
        match op {
            0 => Self::Lsl,
            1 => Self::Lsr,
            2 => Self::Asr,
            3 => Self::Ror,
            _ => unreachable!(),
        }
    }
}

impl std::fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lsl => f.write_str("LSL"),
            Self::Lsr => f.write_str("LSR"),
            Self::Asr => f.write_str("ASR"),
            Self::Ror => f.write_str("ROR"),
        }
    }
}

/// A decoded shifter operand: one of the eleven A5.1 forms.
///
/// Register numbers refer to the bank of the current mode; reading r15
/// through the shifter observes the usual execute-address-plus-8 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftOperand {
    /// 8-bit immediate rotated right by twice the 4-bit rotate field.
    Immediate { immed_8: u32, rotate_imm: u8 },
    /// Plain register, no shift.
    Register { m: u8 },
    /// `Rm, LSL #imm` (imm 0..=31).
    LslImmediate { m: u8, shift_imm: u8 },
    /// `Rm, LSL Rs`.
    LslRegister { m: u8, s: u8 },
    /// `Rm, LSR #imm`; imm 0 encodes LSR #32.
    LsrImmediate { m: u8, shift_imm: u8 },
    /// `Rm, LSR Rs`.
    LsrRegister { m: u8, s: u8 },
    /// `Rm, ASR #imm`; imm 0 encodes ASR #32.
    AsrImmediate { m: u8, shift_imm: u8 },
    /// `Rm, ASR Rs`.
    AsrRegister { m: u8, s: u8 },
    /// `Rm, ROR #imm`; imm 0 is RRX and delegates to that form.
    RorImmediate { m: u8, shift_imm: u8 },
    /// `Rm, ROR Rs`.
    RorRegister { m: u8, s: u8 },
    /// `Rm, RRX`: rotate right through carry by one.
    Rrx { m: u8 },
}

impl ShiftOperand {
    /// Computes `shifter_operand` and `shifter_carry_out` against the
    /// current register and flag state. Read-only: the shifter never
    /// commits anything.
    #[must_use]
    pub fn resolve(self, core: &Arm1176) -> ShifterOut {
        let carry_in = core.cpsr.carry_flag();
        match self {
            Self::Immediate { immed_8, rotate_imm } => {
                let value = immed_8.rotate_right(u32::from(rotate_imm) * 2);
                ShifterOut {
                    value,
                    carry: if rotate_imm == 0 {
                        carry_in
                    } else {
                        value.get_bit(31)
                    },
                }
            }
            Self::Register { m } => ShifterOut {
                value: core.reg(m),
                carry: carry_in,
            },
            Self::LslImmediate { m, shift_imm } => {
                let rm = core.reg(m);
                if shift_imm == 0 {
                    ShifterOut {
                        value: rm,
                        carry: carry_in,
                    }
                } else {
                    ShifterOut {
                        value: rm << shift_imm,
                        carry: rm.get_bit(32 - shift_imm),
                    }
                }
            }
            Self::LslRegister { m, s } => {
                let rm = core.reg(m);
                let amount = core.reg(s) & 0xFF;
                match amount {
                    0 => ShifterOut {
                        value: rm,
                        carry: carry_in,
                    },
                    1..=31 => ShifterOut {
                        value: rm << amount,
                        carry: rm.get_bit((32 - amount) as u8),
                    },
                    32 => ShifterOut {
                        value: 0,
                        carry: rm.get_bit(0),
                    },
                    _ => ShifterOut {
                        value: 0,
                        carry: false,
                    },
                }
            }
            Self::LsrImmediate { m, shift_imm } => {
                let rm = core.reg(m);
                if shift_imm == 0 {
                    // LSR #32
                    ShifterOut {
                        value: 0,
                        carry: rm.get_bit(31),
                    }
                } else {
                    ShifterOut {
                        value: rm >> shift_imm,
                        carry: rm.get_bit(shift_imm - 1),
                    }
                }
            }
            Self::LsrRegister { m, s } => {
                let rm = core.reg(m);
                let amount = core.reg(s) & 0xFF;
                match amount {
                    0 => ShifterOut {
                        value: rm,
                        carry: carry_in,
                    },
                    1..=31 => ShifterOut {
                        value: rm >> amount,
                        carry: rm.get_bit((amount - 1) as u8),
                    },
                    32 => ShifterOut {
                        value: 0,
                        carry: rm.get_bit(31),
                    },
                    _ => ShifterOut {
                        value: 0,
                        carry: false,
                    },
                }
            }
            Self::AsrImmediate { m, shift_imm } => {
                let rm = core.reg(m);
                if shift_imm == 0 {
                    // ASR #32: all bits become the sign bit.
                    ShifterOut {
                        value: if rm.get_bit(31) { 0xFFFF_FFFF } else { 0 },
                        carry: rm.get_bit(31),
                    }
                } else {
                    ShifterOut {
                        value: asr(rm, u32::from(shift_imm)),
                        carry: rm.get_bit(shift_imm - 1),
                    }
                }
            }
            Self::AsrRegister { m, s } => {
                let rm = core.reg(m);
                let amount = core.reg(s) & 0xFF;
                match amount {
                    0 => ShifterOut {
                        value: rm,
                        carry: carry_in,
                    },
                    1..=31 => ShifterOut {
                        value: asr(rm, amount),
                        carry: rm.get_bit((amount - 1) as u8),
                    },
                    _ => ShifterOut {
                        value: if rm.get_bit(31) { 0xFFFF_FFFF } else { 0 },
                        carry: rm.get_bit(31),
                    },
                }
            }
            Self::RorImmediate { m, shift_imm } => {
                if shift_imm == 0 {
                    Self::Rrx { m }.resolve(core)
                } else {
                    let rm = core.reg(m);
                    ShifterOut {
                        value: rm.rotate_right(u32::from(shift_imm)),
                        carry: rm.get_bit(shift_imm - 1),
                    }
                }
            }
            Self::RorRegister { m, s } => {
                let rm = core.reg(m);
                let rs = core.reg(s);
                let amount = rs & 0xFF;
                let rotation = rs & 0b11111;
                if amount == 0 {
                    ShifterOut {
                        value: rm,
                        carry: carry_in,
                    }
                } else if rotation == 0 {
                    // A multiple of 32: value unchanged, carry from bit 31.
                    ShifterOut {
                        value: rm,
                        carry: rm.get_bit(31),
                    }
                } else {
                    ShifterOut {
                        value: rm.rotate_right(rotation),
                        carry: rm.get_bit((rotation - 1) as u8),
                    }
                }
            }
            Self::Rrx { m } => {
                let rm = core.reg(m);
                ShifterOut {
                    value: (u32::from(carry_in) << 31) | (rm >> 1),
                    carry: rm.get_bit(0),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::arm1176::Arm1176;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn core_with(r1: u32, carry: bool) -> Arm1176 {
        let mut core = Arm1176::for_tests();
        core.set_reg(1, r1);
        core.cpsr.set_carry_flag(carry);
        core
    }

    #[test]
    fn immediate_rotation_and_carry() {
        let core = core_with(0, true);
        let out = ShiftOperand::Immediate {
            immed_8: 0xFF,
            rotate_imm: 0,
        }
        .resolve(&core);
        assert_eq!(out.value, 0xFF);
        // rotate 0 keeps the current carry
        assert!(out.carry);

        let out = ShiftOperand::Immediate {
            immed_8: 0xFF,
            rotate_imm: 2,
        }
        .resolve(&core);
        assert_eq!(out.value, 0xF000_000F);
        assert!(out.carry);

        let out = ShiftOperand::Immediate {
            immed_8: 0x01,
            rotate_imm: 1,
        }
        .resolve(&core);
        assert_eq!(out.value, 0x4000_0000);
        assert!(!out.carry);
    }

    #[test]
    fn lsl_by_zero_is_identity() {
        let core = core_with(0xDEAD_BEEF, true);
        let out = ShiftOperand::LslImmediate { m: 1, shift_imm: 0 }.resolve(&core);
        assert_eq!(out.value, 0xDEAD_BEEF);
        assert!(out.carry);
    }

    #[test]
    fn lsl_shifts_carry_out_of_bit_32() {
        let core = core_with(0x8000_0001, false);
        let out = ShiftOperand::LslImmediate { m: 1, shift_imm: 1 }.resolve(&core);
        assert_eq!(out.value, 0x0000_0002);
        assert!(out.carry);
    }

    #[test]
    fn lsl_by_register_edge_amounts() {
        let mut core = core_with(0x8000_0001, false);
        for (amount, value, carry) in [
            (0_u32, 0x8000_0001_u32, false),
            (1, 0x0000_0002, true),
            (31, 0x8000_0000, false),
            (32, 0, true), // carry = bit 0 of Rm
            (33, 0, false),
            (255, 0, false),
        ] {
            core.set_reg(2, amount);
            let out = ShiftOperand::LslRegister { m: 1, s: 2 }.resolve(&core);
            assert_eq!((out.value, out.carry), (value, carry), "LSL by {amount}");
        }
        // Only the low byte of Rs participates.
        core.set_reg(2, 0x0000_0100);
        let out = ShiftOperand::LslRegister { m: 1, s: 2 }.resolve(&core);
        assert_eq!(out.value, 0x8000_0001);
    }

    #[test]
    fn lsr_immediate_zero_encodes_lsr_32() {
        let core = core_with(0x8000_0000, false);
        let out = ShiftOperand::LsrImmediate { m: 1, shift_imm: 0 }.resolve(&core);
        assert_eq!(out.value, 0);
        assert!(out.carry);
    }

    #[test]
    fn lsr_by_register_edge_amounts() {
        let mut core = core_with(0x8000_0001, true);
        for (amount, value, carry) in [
            (0_u32, 0x8000_0001_u32, true),
            (1, 0x4000_0000, true),
            (32, 0, true), // carry = bit 31
            (33, 0, false),
        ] {
            core.set_reg(2, amount);
            let out = ShiftOperand::LsrRegister { m: 1, s: 2 }.resolve(&core);
            assert_eq!((out.value, out.carry), (value, carry), "LSR by {amount}");
        }
    }

    #[test]
    fn asr_immediate_zero_replicates_sign() {
        let core = core_with(0x8000_0000, false);
        let out = ShiftOperand::AsrImmediate { m: 1, shift_imm: 0 }.resolve(&core);
        assert_eq!(out.value, 0xFFFF_FFFF);
        assert!(out.carry);

        let core = core_with(0x7FFF_FFFF, false);
        let out = ShiftOperand::AsrImmediate { m: 1, shift_imm: 0 }.resolve(&core);
        assert_eq!(out.value, 0);
        assert!(!out.carry);
    }

    #[test]
    fn asr_by_register_saturates_past_32() {
        let mut core = core_with(0x8000_0000, false);
        core.set_reg(2, 40);
        let out = ShiftOperand::AsrRegister { m: 1, s: 2 }.resolve(&core);
        assert_eq!(out.value, 0xFFFF_FFFF);
        assert!(out.carry);
    }

    #[test]
    fn ror_immediate_zero_is_rrx() {
        let core = core_with(0x0000_0003, true);
        let out = ShiftOperand::RorImmediate { m: 1, shift_imm: 0 }.resolve(&core);
        assert_eq!(out.value, 0x8000_0001);
        assert!(out.carry);

        let direct = ShiftOperand::Rrx { m: 1 }.resolve(&core);
        assert_eq!(out, direct);
    }

    #[test]
    fn ror_by_register_multiples_of_32() {
        let mut core = core_with(0x8000_0001, false);
        // Full byte zero: identity, carry preserved.
        core.set_reg(2, 0);
        let out = ShiftOperand::RorRegister { m: 1, s: 2 }.resolve(&core);
        assert_eq!((out.value, out.carry), (0x8000_0001, false));
        // Non-zero byte, low five bits zero: identity, carry = bit 31.
        core.set_reg(2, 32);
        let out = ShiftOperand::RorRegister { m: 1, s: 2 }.resolve(&core);
        assert_eq!((out.value, out.carry), (0x8000_0001, true));
        // Ordinary rotation.
        core.set_reg(2, 4);
        let out = ShiftOperand::RorRegister { m: 1, s: 2 }.resolve(&core);
        assert_eq!((out.value, out.carry), (0x1800_0000, false));
    }

    #[test]
    fn register_forms_by_zero_preserve_rm_and_carry() {
        // LSL #0 and LSR-by-register-0 both pass Rm through untouched.
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let rm: u32 = rng.r#gen();
            let carry = rng.r#gen();
            let mut core = core_with(rm, carry);
            core.set_reg(2, 0);
            for operand in [
                ShiftOperand::LslImmediate { m: 1, shift_imm: 0 },
                ShiftOperand::LslRegister { m: 1, s: 2 },
                ShiftOperand::LsrRegister { m: 1, s: 2 },
                ShiftOperand::AsrRegister { m: 1, s: 2 },
                ShiftOperand::RorRegister { m: 1, s: 2 },
                ShiftOperand::Register { m: 1 },
            ] {
                let out = operand.resolve(&core);
                assert_eq!((out.value, out.carry), (rm, carry));
            }
        }
    }
}
