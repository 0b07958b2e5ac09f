//! # Load/store addressing modes
//!
//! Four operand-decoding families from ARM ARM chapter A5:
//!
//! - [`WordByteAddress`]: the nine forms behind LDR/LDRB/STR/STRB and their
//!   T variants (A5.2)
//! - [`MiscAddress`]: the six forms behind the halfword/signed/doubleword
//!   transfers (A5.3)
//! - [`BlockMode`]: the four block forms behind LDM/STM (A5.4)
//! - [`CoprocAddress`]: the four forms behind LDC/STC (A5.5)
//!
//! Offset-only forms leave the base register untouched. Pre-indexed forms
//! commit the computed address to Rn, post-indexed forms commit base+offset
//! while transferring against the old base; both commit only when the
//! instruction's condition passes, although the address itself is computed
//! regardless. The block helpers never commit Rn: the instruction decides,
//! from its W bit, whether to write `new_rn` back.

use serde::{Deserialize, Serialize};

use crate::alu::asr;
use crate::bitwise::Bits;
use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;
use crate::cpu::shifter::ShiftKind;

/// Applies the scaled-register index rules of A5.2.4: the same shifts as
/// the data-processing shifter restricted to immediate amounts, with
/// `shift_imm == 0` meaning LSR/ASR by 32 and ROR meaning RRX.
fn scaled_index(core: &Arm1176, m: u8, kind: ShiftKind, shift_imm: u8) -> u32 {
    let rm = core.reg(m);
    match kind {
        ShiftKind::Lsl => rm << shift_imm,
        ShiftKind::Lsr => {
            if shift_imm == 0 {
                0
            } else {
                rm >> shift_imm
            }
        }
        ShiftKind::Asr => {
            if shift_imm == 0 {
                if rm.get_bit(31) { 0xFFFF_FFFF } else { 0 }
            } else {
                asr(rm, u32::from(shift_imm))
            }
        }
        ShiftKind::Ror => {
            if shift_imm == 0 {
                (u32::from(core.cpsr.carry_flag()) << 31) | (rm >> 1)
            } else {
                rm.rotate_right(u32::from(shift_imm))
            }
        }
    }
}

const fn apply(base: u32, offset: u32, u: bool) -> u32 {
    if u {
        base.wrapping_add(offset)
    } else {
        base.wrapping_sub(offset)
    }
}

/// Word/unsigned-byte addressing (A5.2), nine forms.
///
/// `u` is the direction bit: add the offset when set, subtract otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordByteAddress {
    ImmediateOffset {
        n: u8,
        offset_12: u32,
        u: bool,
    },
    RegisterOffset {
        n: u8,
        m: u8,
        u: bool,
    },
    ScaledRegisterOffset {
        n: u8,
        m: u8,
        shift: ShiftKind,
        shift_imm: u8,
        u: bool,
    },
    ImmediatePreIndexed {
        n: u8,
        offset_12: u32,
        u: bool,
    },
    RegisterPreIndexed {
        n: u8,
        m: u8,
        u: bool,
    },
    ScaledRegisterPreIndexed {
        n: u8,
        m: u8,
        shift: ShiftKind,
        shift_imm: u8,
        u: bool,
    },
    ImmediatePostIndexed {
        n: u8,
        offset_12: u32,
        u: bool,
    },
    RegisterPostIndexed {
        n: u8,
        m: u8,
        u: bool,
    },
    ScaledRegisterPostIndexed {
        n: u8,
        m: u8,
        shift: ShiftKind,
        shift_imm: u8,
        u: bool,
    },
}

impl WordByteAddress {
    /// Base register of the form (the T variants need it).
    #[must_use]
    pub const fn base_register(self) -> u8 {
        match self {
            Self::ImmediateOffset { n, .. }
            | Self::RegisterOffset { n, .. }
            | Self::ScaledRegisterOffset { n, .. }
            | Self::ImmediatePreIndexed { n, .. }
            | Self::RegisterPreIndexed { n, .. }
            | Self::ScaledRegisterPreIndexed { n, .. }
            | Self::ImmediatePostIndexed { n, .. }
            | Self::RegisterPostIndexed { n, .. }
            | Self::ScaledRegisterPostIndexed { n, .. } => n,
        }
    }

    /// Computes the effective address and performs the form's base-register
    /// update. The update is gated on the instruction's condition; the
    /// address itself is computed unconditionally.
    pub fn resolve(self, core: &mut Arm1176, cond: Condition) -> u32 {
        match self {
            Self::ImmediateOffset { n, offset_12, u } => apply(core.reg(n), offset_12, u),
            Self::RegisterOffset { n, m, u } => apply(core.reg(n), core.reg(m), u),
            Self::ScaledRegisterOffset {
                n,
                m,
                shift,
                shift_imm,
                u,
            } => apply(core.reg(n), scaled_index(core, m, shift, shift_imm), u),
            Self::ImmediatePreIndexed { n, offset_12, u } => {
                let address = apply(core.reg(n), offset_12, u);
                if core.condition_passed(cond) {
                    core.set_reg(n, address);
                }
                address
            }
            Self::RegisterPreIndexed { n, m, u } => {
                let address = apply(core.reg(n), core.reg(m), u);
                if core.condition_passed(cond) {
                    core.set_reg(n, address);
                }
                address
            }
            Self::ScaledRegisterPreIndexed {
                n,
                m,
                shift,
                shift_imm,
                u,
            } => {
                let address = apply(core.reg(n), scaled_index(core, m, shift, shift_imm), u);
                if core.condition_passed(cond) {
                    core.set_reg(n, address);
                }
                address
            }
            Self::ImmediatePostIndexed { n, offset_12, u } => {
                let address = core.reg(n);
                if core.condition_passed(cond) {
                    core.set_reg(n, apply(address, offset_12, u));
                }
                address
            }
            Self::RegisterPostIndexed { n, m, u } => {
                let address = core.reg(n);
                let offset = core.reg(m);
                if core.condition_passed(cond) {
                    core.set_reg(n, apply(address, offset, u));
                }
                address
            }
            Self::ScaledRegisterPostIndexed {
                n,
                m,
                shift,
                shift_imm,
                u,
            } => {
                let address = core.reg(n);
                let index = scaled_index(core, m, shift, shift_imm);
                if core.condition_passed(cond) {
                    core.set_reg(n, apply(address, index, u));
                }
                address
            }
        }
    }
}

/// Miscellaneous-transfer addressing (A5.3), six forms, used by the
/// halfword, signed and doubleword loads/stores. The immediate is an 8-bit
/// value assembled from two 4-bit halves of the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MiscAddress {
    ImmediateOffset {
        n: u8,
        immed_h: u8,
        immed_l: u8,
        u: bool,
    },
    RegisterOffset {
        n: u8,
        m: u8,
        u: bool,
    },
    ImmediatePreIndexed {
        n: u8,
        immed_h: u8,
        immed_l: u8,
        u: bool,
    },
    RegisterPreIndexed {
        n: u8,
        m: u8,
        u: bool,
    },
    ImmediatePostIndexed {
        n: u8,
        immed_h: u8,
        immed_l: u8,
        u: bool,
    },
    RegisterPostIndexed {
        n: u8,
        m: u8,
        u: bool,
    },
}

const fn misc_offset(immed_h: u8, immed_l: u8) -> u32 {
    (((immed_h as u32) << 4) | immed_l as u32) & 0xFF
}

impl MiscAddress {
    /// As [`WordByteAddress::resolve`].
    pub fn resolve(self, core: &mut Arm1176, cond: Condition) -> u32 {
        match self {
            Self::ImmediateOffset {
                n,
                immed_h,
                immed_l,
                u,
            } => apply(core.reg(n), misc_offset(immed_h, immed_l), u),
            Self::RegisterOffset { n, m, u } => apply(core.reg(n), core.reg(m), u),
            Self::ImmediatePreIndexed {
                n,
                immed_h,
                immed_l,
                u,
            } => {
                let address = apply(core.reg(n), misc_offset(immed_h, immed_l), u);
                if core.condition_passed(cond) {
                    core.set_reg(n, address);
                }
                address
            }
            Self::RegisterPreIndexed { n, m, u } => {
                let address = apply(core.reg(n), core.reg(m), u);
                if core.condition_passed(cond) {
                    core.set_reg(n, address);
                }
                address
            }
            Self::ImmediatePostIndexed {
                n,
                immed_h,
                immed_l,
                u,
            } => {
                let address = core.reg(n);
                if core.condition_passed(cond) {
                    core.set_reg(n, apply(address, misc_offset(immed_h, immed_l), u));
                }
                address
            }
            Self::RegisterPostIndexed { n, m, u } => {
                let address = core.reg(n);
                let offset = core.reg(m);
                if core.condition_passed(cond) {
                    core.set_reg(n, apply(address, offset, u));
                }
                address
            }
        }
    }
}

/// Block-transfer range computed by [`BlockMode::block_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    /// Address of the lowest word transferred.
    pub start_address: u32,
    /// Address of the highest word transferred.
    pub end_address: u32,
    /// The base register value after writeback, uncommitted.
    pub new_rn: u32,
}

/// Load/store-multiple addressing (A5.4): the four increment/decrement,
/// before/after forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockMode {
    IncrementAfter,
    IncrementBefore,
    DecrementAfter,
    DecrementBefore,
}

impl BlockMode {
    /// Start/end addresses and the would-be writeback value for a transfer
    /// of `count` words based at `base`. Commits nothing: the caller
    /// applies `new_rn` iff its W bit says so.
    #[must_use]
    pub const fn block_range(self, base: u32, count: u32) -> BlockRange {
        let span = count * 4;
        match self {
            Self::IncrementAfter => BlockRange {
                start_address: base,
                end_address: base.wrapping_add(span).wrapping_sub(4),
                new_rn: base.wrapping_add(span),
            },
            Self::IncrementBefore => BlockRange {
                start_address: base.wrapping_add(4),
                end_address: base.wrapping_add(span),
                new_rn: base.wrapping_add(span),
            },
            Self::DecrementAfter => BlockRange {
                start_address: base.wrapping_sub(span).wrapping_add(4),
                end_address: base,
                new_rn: base.wrapping_sub(span),
            },
            Self::DecrementBefore => BlockRange {
                start_address: base.wrapping_sub(span),
                end_address: base.wrapping_sub(4),
                new_rn: base.wrapping_sub(span),
            },
        }
    }

    /// [`BlockMode::block_range`] for a register list, counting its set
    /// bits.
    #[must_use]
    pub const fn for_register_list(self, base: u32, register_list: u16) -> BlockRange {
        self.block_range(base, register_list.count_ones())
    }
}

/// Coprocessor load/store addressing (A5.5), four forms. The 8-bit
/// immediate is a word count, scaled by four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoprocAddress {
    ImmediateOffset { n: u8, offset_8: u8, u: bool },
    ImmediatePreIndexed { n: u8, offset_8: u8, u: bool },
    ImmediatePostIndexed { n: u8, offset_8: u8, u: bool },
    Unindexed { n: u8 },
}

impl CoprocAddress {
    /// Computes the first transfer address and performs the base-register
    /// update, gated on the condition as in the other families. The
    /// transfer's extent is not known here: LDC/STC extend it one word at a
    /// time while the coprocessor reports `not_finished`.
    pub fn resolve(self, core: &mut Arm1176, cond: Condition) -> u32 {
        match self {
            Self::ImmediateOffset { n, offset_8, u } => {
                apply(core.reg(n), u32::from(offset_8) * 4, u)
            }
            Self::ImmediatePreIndexed { n, offset_8, u } => {
                let address = apply(core.reg(n), u32::from(offset_8) * 4, u);
                if core.condition_passed(cond) {
                    core.set_reg(n, address);
                }
                address
            }
            Self::ImmediatePostIndexed { n, offset_8, u } => {
                let address = core.reg(n);
                if core.condition_passed(cond) {
                    core.set_reg(n, apply(address, u32::from(offset_8) * 4, u));
                }
                address
            }
            Self::Unindexed { n } => core.reg(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::arm1176::Arm1176;
    use pretty_assertions::assert_eq;

    #[test]
    fn immediate_offset_leaves_rn_alone() {
        let mut core = Arm1176::for_tests();
        core.set_reg(1, 0x2000);
        let address = WordByteAddress::ImmediateOffset {
            n: 1,
            offset_12: 8,
            u: true,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x2008);
        assert_eq!(core.reg(1), 0x2000);

        let address = WordByteAddress::ImmediateOffset {
            n: 1,
            offset_12: 8,
            u: false,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x1FF8);
    }

    #[test]
    fn pre_indexed_commits_only_when_condition_passes() {
        let mut core = Arm1176::for_tests();
        core.set_reg(1, 0x2000);
        // Z is clear, so EQ fails: the address is produced but Rn stays.
        let address = WordByteAddress::ImmediatePreIndexed {
            n: 1,
            offset_12: 4,
            u: true,
        }
        .resolve(&mut core, Condition::EQ);
        assert_eq!(address, 0x2004);
        assert_eq!(core.reg(1), 0x2000);

        let address = WordByteAddress::ImmediatePreIndexed {
            n: 1,
            offset_12: 4,
            u: true,
        }
        .resolve(&mut core, Condition::NE);
        assert_eq!(address, 0x2004);
        assert_eq!(core.reg(1), 0x2004);
    }

    #[test]
    fn post_indexed_transfers_at_old_base() {
        let mut core = Arm1176::for_tests();
        core.set_reg(1, 0x2000);
        core.set_reg(2, 0x10);
        let address = WordByteAddress::RegisterPostIndexed { n: 1, m: 2, u: false }
            .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x2000);
        assert_eq!(core.reg(1), 0x1FF0);
    }

    #[test]
    fn scaled_register_forms() {
        let mut core = Arm1176::for_tests();
        core.set_reg(1, 0x1000);
        core.set_reg(2, 0x8000_0010);

        let address = WordByteAddress::ScaledRegisterOffset {
            n: 1,
            m: 2,
            shift: ShiftKind::Lsl,
            shift_imm: 2,
            u: true,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x1000_u32.wrapping_add(0x8000_0010 << 2));

        // ASR #0 means ASR #32: index is the replicated sign bit.
        let address = WordByteAddress::ScaledRegisterOffset {
            n: 1,
            m: 2,
            shift: ShiftKind::Asr,
            shift_imm: 0,
            u: true,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x1000_u32.wrapping_add(0xFFFF_FFFF));

        // LSR #0 means LSR #32: zero index.
        let address = WordByteAddress::ScaledRegisterOffset {
            n: 1,
            m: 2,
            shift: ShiftKind::Lsr,
            shift_imm: 0,
            u: true,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x1000);

        // ROR #0 means RRX.
        core.cpsr.set_carry_flag(true);
        let address = WordByteAddress::ScaledRegisterOffset {
            n: 1,
            m: 2,
            shift: ShiftKind::Ror,
            shift_imm: 0,
            u: true,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x1000_u32.wrapping_add(0xC000_0008));
    }

    #[test]
    fn misc_immediate_is_two_nibbles() {
        let mut core = Arm1176::for_tests();
        core.set_reg(3, 0x3000);
        let address = MiscAddress::ImmediateOffset {
            n: 3,
            immed_h: 0xA,
            immed_l: 0x5,
            u: true,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x30A5);
    }

    #[test]
    fn misc_post_indexed_writeback() {
        let mut core = Arm1176::for_tests();
        core.set_reg(3, 0x3000);
        let address = MiscAddress::ImmediatePostIndexed {
            n: 3,
            immed_h: 0,
            immed_l: 2,
            u: false,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x3000);
        assert_eq!(core.reg(3), 0x2FFE);
    }

    #[test]
    fn block_ranges_match_the_arm_arm_formulas() {
        // Three registers based at 0x2000.
        let list: u16 = 0b0000_0000_0000_1101;
        let range = BlockMode::IncrementAfter.for_register_list(0x2000, list);
        assert_eq!(
            range,
            BlockRange {
                start_address: 0x2000,
                end_address: 0x2008,
                new_rn: 0x200C,
            }
        );
        let range = BlockMode::IncrementBefore.for_register_list(0x2000, list);
        assert_eq!(
            range,
            BlockRange {
                start_address: 0x2004,
                end_address: 0x200C,
                new_rn: 0x200C,
            }
        );
        let range = BlockMode::DecrementAfter.for_register_list(0x2000, list);
        assert_eq!(
            range,
            BlockRange {
                start_address: 0x1FF8,
                end_address: 0x2000,
                new_rn: 0x1FF4,
            }
        );
        let range = BlockMode::DecrementBefore.for_register_list(0x2000, list);
        assert_eq!(
            range,
            BlockRange {
                start_address: 0x1FF4,
                end_address: 0x1FFC,
                new_rn: 0x1FF4,
            }
        );
    }

    #[test]
    fn coprocessor_offsets_scale_by_four() {
        let mut core = Arm1176::for_tests();
        core.set_reg(4, 0x4000);
        let address = CoprocAddress::ImmediateOffset {
            n: 4,
            offset_8: 3,
            u: true,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x400C);

        let address = CoprocAddress::ImmediatePreIndexed {
            n: 4,
            offset_8: 3,
            u: false,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x3FF4);
        assert_eq!(core.reg(4), 0x3FF4);

        let address = CoprocAddress::ImmediatePostIndexed {
            n: 4,
            offset_8: 1,
            u: true,
        }
        .resolve(&mut core, Condition::AL);
        assert_eq!(address, 0x3FF4);
        assert_eq!(core.reg(4), 0x3FF8);
    }
}
