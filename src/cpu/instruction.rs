//! # Decoded instruction descriptors
//!
//! The external decoder maps a 32-bit instruction word to one of these
//! variants; the core's [`Arm1176::execute`](super::arm1176::Arm1176::execute)
//! dispatches it to the matching semantic transformer. One variant per
//! architectural mnemonic keeps the semantic core exhaustively
//! pattern-matchable and the decoder fully decoupled.
//!
//! Register fields are 4-bit register numbers; `cond` is the instruction's
//! condition field. The few architecturally unconditional instructions
//! (BKPT, BLX immediate, RFE, SRS, SETEND, CPS, PLD) carry no condition.

use serde::{Deserialize, Serialize};

use crate::cpu::addressing::{BlockMode, CoprocAddress, MiscAddress, WordByteAddress};
use crate::cpu::condition::Condition;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::shifter::ShiftOperand;

/// Which Program Status Register MRS/MSR touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PsrKind {
    /// Current Program Status Register.
    Cpsr,
    /// Saved Program Status Register of the current exception mode.
    Spsr,
}

impl std::fmt::Display for PsrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpsr => write!(f, "CPSR"),
            Self::Spsr => write!(f, "SPSR"),
        }
    }
}

/// MSR's source operand: a rotated 8-bit immediate or a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsrOperand {
    Immediate { immed_8: u32, rotate_imm: u8 },
    Register { m: u8 },
}

/// A decoded ARM-state instruction, ready for [`execute`].
///
/// [`execute`]: super::arm1176::Arm1176::execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    // Data processing
    Adc { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    Add { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    And { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    Bic { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    Cmn { cond: Condition, n: u8, op2: ShiftOperand },
    Cmp { cond: Condition, n: u8, op2: ShiftOperand },
    Cpy { cond: Condition, d: u8, m: u8 },
    Eor { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    Mov { cond: Condition, set_flags: bool, d: u8, op2: ShiftOperand },
    Mvn { cond: Condition, set_flags: bool, d: u8, op2: ShiftOperand },
    Orr { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    Rsb { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    Rsc { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    Sbc { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    Sub { cond: Condition, set_flags: bool, n: u8, d: u8, op2: ShiftOperand },
    Teq { cond: Condition, n: u8, op2: ShiftOperand },
    Tst { cond: Condition, n: u8, op2: ShiftOperand },

    // Branches
    Branch { cond: Condition, link: bool, signed_immed_24: u32 },
    BranchExchange { cond: Condition, m: u8 },
    BranchExchangeJazelle { cond: Condition, m: u8 },
    BranchLinkExchangeImmediate { signed_immed_24: u32, h_bit: bool },
    BranchLinkExchangeRegister { cond: Condition, m: u8 },

    // Exception generation
    Bkpt,
    Swi { cond: Condition },

    // Status register access
    Cps { imod: u8, mmod: bool, a: bool, i: bool, f: bool, mode: Mode },
    Mrs { cond: Condition, d: u8, source: PsrKind },
    Msr { cond: Condition, destination: PsrKind, field_mask: u8, operand: MsrOperand },
    Setend { big_endian: bool },

    // Multiplies
    Mla { cond: Condition, set_flags: bool, d: u8, n: u8, m: u8, s: u8 },
    Mul { cond: Condition, set_flags: bool, d: u8, m: u8, s: u8 },
    Smla { cond: Condition, d: u8, n: u8, m: u8, s: u8, x: bool, y: bool },
    Smlad { cond: Condition, d: u8, n: u8, m: u8, s: u8, x: bool },
    Smlal { cond: Condition, set_flags: bool, d_lo: u8, d_hi: u8, m: u8, s: u8 },
    SmlalXy { cond: Condition, d_lo: u8, d_hi: u8, m: u8, s: u8, x: bool, y: bool },
    Smlald { cond: Condition, d_lo: u8, d_hi: u8, m: u8, s: u8, x: bool },
    Smlaw { cond: Condition, d: u8, n: u8, m: u8, s: u8, y: bool },
    Smlsd { cond: Condition, d: u8, n: u8, m: u8, s: u8, x: bool },
    Smlsld { cond: Condition, d_lo: u8, d_hi: u8, m: u8, s: u8, x: bool },
    Smmla { cond: Condition, d: u8, n: u8, m: u8, s: u8, round: bool },
    Smmls { cond: Condition, d: u8, n: u8, m: u8, s: u8, round: bool },
    Smmul { cond: Condition, d: u8, m: u8, s: u8, round: bool },
    Smuad { cond: Condition, d: u8, m: u8, s: u8, x: bool },
    Smul { cond: Condition, d: u8, m: u8, s: u8, x: bool, y: bool },
    Smull { cond: Condition, set_flags: bool, d_lo: u8, d_hi: u8, m: u8, s: u8 },
    Smulw { cond: Condition, d: u8, m: u8, s: u8, y: bool },
    Smusd { cond: Condition, d: u8, m: u8, s: u8, x: bool },
    Umaal { cond: Condition, d_lo: u8, d_hi: u8, m: u8, s: u8 },
    Umlal { cond: Condition, set_flags: bool, d_lo: u8, d_hi: u8, m: u8, s: u8 },
    Umull { cond: Condition, set_flags: bool, d_lo: u8, d_hi: u8, m: u8, s: u8 },
    Usad8 { cond: Condition, d: u8, m: u8, s: u8 },
    Usada8 { cond: Condition, d: u8, n: u8, m: u8, s: u8 },

    // Miscellaneous arithmetic
    Clz { cond: Condition, d: u8, m: u8 },

    // Saturating arithmetic
    Qadd { cond: Condition, d: u8, n: u8, m: u8 },
    Qadd16 { cond: Condition, d: u8, n: u8, m: u8 },
    Qadd8 { cond: Condition, d: u8, n: u8, m: u8 },
    Qaddsubx { cond: Condition, d: u8, n: u8, m: u8 },
    Qdadd { cond: Condition, d: u8, n: u8, m: u8 },
    Qdsub { cond: Condition, d: u8, n: u8, m: u8 },
    Qsub { cond: Condition, d: u8, n: u8, m: u8 },
    Qsub16 { cond: Condition, d: u8, n: u8, m: u8 },
    Qsub8 { cond: Condition, d: u8, n: u8, m: u8 },
    Qsubaddx { cond: Condition, d: u8, n: u8, m: u8 },
    Ssat { cond: Condition, d: u8, m: u8, sat_imm: u8, shift_imm: u8, arithmetic_shift: bool },
    Ssat16 { cond: Condition, d: u8, m: u8, sat_imm: u8 },
    Uqadd16 { cond: Condition, d: u8, n: u8, m: u8 },
    Uqadd8 { cond: Condition, d: u8, n: u8, m: u8 },
    Uqaddsubx { cond: Condition, d: u8, n: u8, m: u8 },
    Uqsub16 { cond: Condition, d: u8, n: u8, m: u8 },
    Uqsub8 { cond: Condition, d: u8, n: u8, m: u8 },
    Uqsubaddx { cond: Condition, d: u8, n: u8, m: u8 },
    Usat { cond: Condition, d: u8, m: u8, sat_imm: u8, shift_imm: u8, arithmetic_shift: bool },
    Usat16 { cond: Condition, d: u8, m: u8, sat_imm: u8 },

    // Parallel add/subtract
    Sadd16 { cond: Condition, d: u8, n: u8, m: u8 },
    Sadd8 { cond: Condition, d: u8, n: u8, m: u8 },
    Saddsubx { cond: Condition, d: u8, n: u8, m: u8 },
    Shadd16 { cond: Condition, d: u8, n: u8, m: u8 },
    Shadd8 { cond: Condition, d: u8, n: u8, m: u8 },
    Shaddsubx { cond: Condition, d: u8, n: u8, m: u8 },
    Shsub16 { cond: Condition, d: u8, n: u8, m: u8 },
    Shsub8 { cond: Condition, d: u8, n: u8, m: u8 },
    Shsubaddx { cond: Condition, d: u8, n: u8, m: u8 },
    Ssub16 { cond: Condition, d: u8, n: u8, m: u8 },
    Ssub8 { cond: Condition, d: u8, n: u8, m: u8 },
    Ssubaddx { cond: Condition, d: u8, n: u8, m: u8 },
    Uadd16 { cond: Condition, d: u8, n: u8, m: u8 },
    Uadd8 { cond: Condition, d: u8, n: u8, m: u8 },
    Uaddsubx { cond: Condition, d: u8, n: u8, m: u8 },
    Uhadd16 { cond: Condition, d: u8, n: u8, m: u8 },
    Uhadd8 { cond: Condition, d: u8, n: u8, m: u8 },
    Uhaddsubx { cond: Condition, d: u8, n: u8, m: u8 },
    Uhsub16 { cond: Condition, d: u8, n: u8, m: u8 },
    Uhsub8 { cond: Condition, d: u8, n: u8, m: u8 },
    Uhsubaddx { cond: Condition, d: u8, n: u8, m: u8 },
    Usub16 { cond: Condition, d: u8, n: u8, m: u8 },
    Usub8 { cond: Condition, d: u8, n: u8, m: u8 },
    Usubaddx { cond: Condition, d: u8, n: u8, m: u8 },

    // Byte select, pack, reverse, extend
    Pkhbt { cond: Condition, d: u8, n: u8, m: u8, shift_imm: u8 },
    Pkhtb { cond: Condition, d: u8, n: u8, m: u8, shift_imm: u8 },
    Rev { cond: Condition, d: u8, m: u8 },
    Rev16 { cond: Condition, d: u8, m: u8 },
    Revsh { cond: Condition, d: u8, m: u8 },
    Sel { cond: Condition, d: u8, n: u8, m: u8 },
    Sxtab { cond: Condition, d: u8, n: u8, m: u8, rotate: u8 },
    Sxtab16 { cond: Condition, d: u8, n: u8, m: u8, rotate: u8 },
    Sxtah { cond: Condition, d: u8, n: u8, m: u8, rotate: u8 },
    Sxtb { cond: Condition, d: u8, m: u8, rotate: u8 },
    Sxtb16 { cond: Condition, d: u8, m: u8, rotate: u8 },
    Sxth { cond: Condition, d: u8, m: u8, rotate: u8 },
    Uxtab { cond: Condition, d: u8, n: u8, m: u8, rotate: u8 },
    Uxtab16 { cond: Condition, d: u8, n: u8, m: u8, rotate: u8 },
    Uxtah { cond: Condition, d: u8, n: u8, m: u8, rotate: u8 },
    Uxtb { cond: Condition, d: u8, m: u8, rotate: u8 },
    Uxtb16 { cond: Condition, d: u8, m: u8, rotate: u8 },
    Uxth { cond: Condition, d: u8, m: u8, rotate: u8 },

    // Load/store word and unsigned byte
    Ldr { cond: Condition, d: u8, address: WordByteAddress },
    Ldrb { cond: Condition, d: u8, address: WordByteAddress },
    Ldrbt { cond: Condition, d: u8, address: WordByteAddress },
    Ldrt { cond: Condition, d: u8, address: WordByteAddress },
    Pld,
    Str { cond: Condition, d: u8, address: WordByteAddress },
    Strb { cond: Condition, d: u8, address: WordByteAddress },
    Strbt { cond: Condition, d: u8, address: WordByteAddress },
    Strt { cond: Condition, d: u8, address: WordByteAddress },

    // Miscellaneous loads/stores
    Ldrd { cond: Condition, d: u8, address: MiscAddress },
    Ldrh { cond: Condition, d: u8, address: MiscAddress },
    Ldrsb { cond: Condition, d: u8, address: MiscAddress },
    Ldrsh { cond: Condition, d: u8, address: MiscAddress },
    Strd { cond: Condition, d: u8, address: MiscAddress },
    Strh { cond: Condition, d: u8, address: MiscAddress },

    // Semaphores and exclusives
    Ldrex { cond: Condition, d: u8, n: u8 },
    Strex { cond: Condition, d: u8, n: u8, m: u8 },
    Swp { cond: Condition, d: u8, n: u8, m: u8 },
    Swpb { cond: Condition, d: u8, n: u8, m: u8 },

    // Load/store multiple and exception return
    Ldm1 { cond: Condition, addressing: BlockMode, n: u8, register_list: u16, w: bool },
    Ldm2 { cond: Condition, addressing: BlockMode, n: u8, register_list: u16, w: bool },
    Ldm3 { cond: Condition, addressing: BlockMode, n: u8, register_list: u16, w: bool },
    Rfe { addressing: BlockMode, n: u8, w: bool },
    Srs { addressing: BlockMode, mode: Mode, w: bool },
    Stm1 { cond: Condition, addressing: BlockMode, n: u8, register_list: u16, w: bool },
    Stm2 { cond: Condition, addressing: BlockMode, n: u8, register_list: u16, w: bool },

    // Coprocessor
    Cdp { cond: Condition, cp_num: u8 },
    Ldc { cond: Condition, cp_num: u8, address: CoprocAddress },
    Mcr { cond: Condition, cp_num: u8, d: u8 },
    Mcrr { cond: Condition, cp_num: u8, d: u8, n: u8 },
    Mrc { cond: Condition, cp_num: u8, d: u8 },
    Mrrc { cond: Condition, cp_num: u8, d: u8, n: u8 },
    Stc { cond: Condition, cp_num: u8, address: CoprocAddress },
}

impl Instruction {
    /// The ARM mnemonic, for tracing and diagnostics.
    #[must_use]
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::Adc { .. } => "ADC",
            Self::Add { .. } => "ADD",
            Self::And { .. } => "AND",
            Self::Bic { .. } => "BIC",
            Self::Cmn { .. } => "CMN",
            Self::Cmp { .. } => "CMP",
            Self::Cpy { .. } => "CPY",
            Self::Eor { .. } => "EOR",
            Self::Mov { .. } => "MOV",
            Self::Mvn { .. } => "MVN",
            Self::Orr { .. } => "ORR",
            Self::Rsb { .. } => "RSB",
            Self::Rsc { .. } => "RSC",
            Self::Sbc { .. } => "SBC",
            Self::Sub { .. } => "SUB",
            Self::Teq { .. } => "TEQ",
            Self::Tst { .. } => "TST",
            Self::Branch { link: false, .. } => "B",
            Self::Branch { link: true, .. } => "BL",
            Self::BranchExchange { .. } => "BX",
            Self::BranchExchangeJazelle { .. } => "BXJ",
            Self::BranchLinkExchangeImmediate { .. } | Self::BranchLinkExchangeRegister { .. } => {
                "BLX"
            }
            Self::Bkpt => "BKPT",
            Self::Swi { .. } => "SWI",
            Self::Cps { .. } => "CPS",
            Self::Mrs { .. } => "MRS",
            Self::Msr { .. } => "MSR",
            Self::Setend { .. } => "SETEND",
            Self::Mla { .. } => "MLA",
            Self::Mul { .. } => "MUL",
            Self::Smla { .. } => "SMLA",
            Self::Smlad { .. } => "SMLAD",
            Self::Smlal { .. } | Self::SmlalXy { .. } => "SMLAL",
            Self::Smlald { .. } => "SMLALD",
            Self::Smlaw { .. } => "SMLAW",
            Self::Smlsd { .. } => "SMLSD",
            Self::Smlsld { .. } => "SMLSLD",
            Self::Smmla { .. } => "SMMLA",
            Self::Smmls { .. } => "SMMLS",
            Self::Smmul { .. } => "SMMUL",
            Self::Smuad { .. } => "SMUAD",
            Self::Smul { .. } => "SMUL",
            Self::Smull { .. } => "SMULL",
            Self::Smulw { .. } => "SMULW",
            Self::Smusd { .. } => "SMUSD",
            Self::Umaal { .. } => "UMAAL",
            Self::Umlal { .. } => "UMLAL",
            Self::Umull { .. } => "UMULL",
            Self::Usad8 { .. } => "USAD8",
            Self::Usada8 { .. } => "USADA8",
            Self::Clz { .. } => "CLZ",
            Self::Qadd { .. } => "QADD",
            Self::Qadd16 { .. } => "QADD16",
            Self::Qadd8 { .. } => "QADD8",
            Self::Qaddsubx { .. } => "QADDSUBX",
            Self::Qdadd { .. } => "QDADD",
            Self::Qdsub { .. } => "QDSUB",
            Self::Qsub { .. } => "QSUB",
            Self::Qsub16 { .. } => "QSUB16",
            Self::Qsub8 { .. } => "QSUB8",
            Self::Qsubaddx { .. } => "QSUBADDX",
            Self::Ssat { .. } => "SSAT",
            Self::Ssat16 { .. } => "SSAT16",
            Self::Uqadd16 { .. } => "UQADD16",
            Self::Uqadd8 { .. } => "UQADD8",
            Self::Uqaddsubx { .. } => "UQADDSUBX",
            Self::Uqsub16 { .. } => "UQSUB16",
            Self::Uqsub8 { .. } => "UQSUB8",
            Self::Uqsubaddx { .. } => "UQSUBADDX",
            Self::Usat { .. } => "USAT",
            Self::Usat16 { .. } => "USAT16",
            Self::Sadd16 { .. } => "SADD16",
            Self::Sadd8 { .. } => "SADD8",
            Self::Saddsubx { .. } => "SADDSUBX",
            Self::Shadd16 { .. } => "SHADD16",
            Self::Shadd8 { .. } => "SHADD8",
            Self::Shaddsubx { .. } => "SHADDSUBX",
            Self::Shsub16 { .. } => "SHSUB16",
            Self::Shsub8 { .. } => "SHSUB8",
            Self::Shsubaddx { .. } => "SHSUBADDX",
            Self::Ssub16 { .. } => "SSUB16",
            Self::Ssub8 { .. } => "SSUB8",
            Self::Ssubaddx { .. } => "SSUBADDX",
            Self::Uadd16 { .. } => "UADD16",
            Self::Uadd8 { .. } => "UADD8",
            Self::Uaddsubx { .. } => "UADDSUBX",
            Self::Uhadd16 { .. } => "UHADD16",
            Self::Uhadd8 { .. } => "UHADD8",
            Self::Uhaddsubx { .. } => "UHADDSUBX",
            Self::Uhsub16 { .. } => "UHSUB16",
            Self::Uhsub8 { .. } => "UHSUB8",
            Self::Uhsubaddx { .. } => "UHSUBADDX",
            Self::Usub16 { .. } => "USUB16",
            Self::Usub8 { .. } => "USUB8",
            Self::Usubaddx { .. } => "USUBADDX",
            Self::Pkhbt { .. } => "PKHBT",
            Self::Pkhtb { .. } => "PKHTB",
            Self::Rev { .. } => "REV",
            Self::Rev16 { .. } => "REV16",
            Self::Revsh { .. } => "REVSH",
            Self::Sel { .. } => "SEL",
            Self::Sxtab { .. } => "SXTAB",
            Self::Sxtab16 { .. } => "SXTAB16",
            Self::Sxtah { .. } => "SXTAH",
            Self::Sxtb { .. } => "SXTB",
            Self::Sxtb16 { .. } => "SXTB16",
            Self::Sxth { .. } => "SXTH",
            Self::Uxtab { .. } => "UXTAB",
            Self::Uxtab16 { .. } => "UXTAB16",
            Self::Uxtah { .. } => "UXTAH",
            Self::Uxtb { .. } => "UXTB",
            Self::Uxtb16 { .. } => "UXTB16",
            Self::Uxth { .. } => "UXTH",
            Self::Ldr { .. } => "LDR",
            Self::Ldrb { .. } => "LDRB",
            Self::Ldrbt { .. } => "LDRBT",
            Self::Ldrt { .. } => "LDRT",
            Self::Pld => "PLD",
            Self::Str { .. } => "STR",
            Self::Strb { .. } => "STRB",
            Self::Strbt { .. } => "STRBT",
            Self::Strt { .. } => "STRT",
            Self::Ldrd { .. } => "LDRD",
            Self::Ldrh { .. } => "LDRH",
            Self::Ldrsb { .. } => "LDRSB",
            Self::Ldrsh { .. } => "LDRSH",
            Self::Strd { .. } => "STRD",
            Self::Strh { .. } => "STRH",
            Self::Ldrex { .. } => "LDREX",
            Self::Strex { .. } => "STREX",
            Self::Swp { .. } => "SWP",
            Self::Swpb { .. } => "SWPB",
            Self::Ldm1 { .. } | Self::Ldm2 { .. } | Self::Ldm3 { .. } => "LDM",
            Self::Rfe { .. } => "RFE",
            Self::Srs { .. } => "SRS",
            Self::Stm1 { .. } | Self::Stm2 { .. } => "STM",
            Self::Cdp { .. } => "CDP",
            Self::Ldc { .. } => "LDC",
            Self::Mcr { .. } => "MCR",
            Self::Mcrr { .. } => "MCRR",
            Self::Mrc { .. } => "MRC",
            Self::Mrrc { .. } => "MRRC",
            Self::Stc { .. } => "STC",
        }
    }
}
