//! # Program Status Registers (CPSR and SPSR)
//!
//! ```text
//! 31 30 29 28 27  26-25  24  23-20  19-16  15-10  9 8 7 6 5  4-0
//! ┌──┬──┬──┬──┬──┬──────┬──┬──────┬──────┬──────┬─┬─┬─┬─┬─┬─────┐
//! │N │Z │C │V │Q │ Res  │J │ Res  │  GE  │ Res  │E│A│I│F│T│Mode │
//! └──┴──┴──┴──┴──┴──────┴──┴──────┴──────┴──────┴─┴─┴─┴─┴─┴─────┘
//! ```
//!
//! - **N/Z/C/V (31-28)**: condition flags, tested by
//!   [`condition`](super::condition)
//! - **Q (27)**: sticky saturation/overflow flag; set by the saturating and
//!   some multiply instructions, cleared only by MSR
//! - **J (24)**: Jazelle state
//! - **GE (19-16)**: per-lane results of the parallel add/subtract family
//! - **E (9)**: data endianness; **A/I/F (8-6)**: async-abort/IRQ/FIQ masks
//! - **T (5)**: Thumb state; **Mode (4-0)**: see `cpu_modes`
//!
//! Each exception mode has an **SPSR** that captures the CPSR on exception
//! entry; the bank lives in the processor context.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::{condition::Condition, cpu_modes::Mode};

/// Program Status Register (CPSR or SPSR).
///
/// Wraps the raw 32-bit image and provides type-safe accessors for every
/// architectural field. MSR needs mask-constrained whole-image writes, so the
/// raw image is reachable through [`Psr::bits`]/[`Psr::from_bits`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

/// MSR field masks for ARMv6 (ARM ARM A4.1.39).
impl Psr {
    /// Bits with no architectural meaning; an MSR operand touching any of
    /// them is UNPREDICTABLE.
    pub const UNALLOC_MASK: u32 = 0x06F0_FC00;
    /// Bits writable from any mode: flags, Q, GE, E.
    pub const USER_MASK: u32 = 0xF80F_0200;
    /// Bits writable only from privileged modes: A, I, F, mode.
    pub const PRIV_MASK: u32 = 0x0000_01DF;
    /// Execution-state bits (J, T); writable only on an SPSR.
    pub const STATE_MASK: u32 = 0x0100_0020;
}

impl Psr {
    pub(crate) fn can_execute(self, cond: Condition) -> bool {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, NV, PL, VC, VS};
        match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            AL => true,
            NV => false,
        }
    }

    /// Raw 32-bit image.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Rebuild from a raw image (MSR, RFE, SPSR-to-CPSR copies).
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// N => Bit 31
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// Q => Bit 27. Sticky: only MSR clears it.
    #[must_use]
    pub fn sticky_overflow(self) -> bool {
        self.0.get_bit(27)
    }

    /// J => Bit 24
    #[must_use]
    pub fn jazelle_bit(self) -> bool {
        self.0.get_bit(24)
    }

    /// GE => Bits 19-16, one bit per SIMD lane.
    #[must_use]
    pub fn ge_bits(self) -> u32 {
        self.0.get_bits(16..=19)
    }

    /// E => Bit 9, data endianness.
    #[must_use]
    pub fn endian_bit(self) -> bool {
        self.0.get_bit(9)
    }

    /// A => Bit 8, asynchronous abort mask.
    #[must_use]
    pub fn abort_disable(self) -> bool {
        self.0.get_bit(8)
    }

    /// I => Bit 7, IRQ mask.
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(7)
    }

    /// F => Bit 6, FIQ mask.
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(6)
    }

    /// T => Bit 5, Thumb state. Changed only through the interworking
    /// PC writes and exception entry.
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    /// M4-M0 => Bits 4-0.
    ///
    /// An SPSR image can legally hold garbage mode bits (software may write
    /// anything there); reading such an image back decodes to Supervisor as
    /// a safe default rather than panicking.
    #[must_use]
    pub fn mode(self) -> Mode {
        let mode_bits = self.0 & 0b11111;
        Mode::try_from(mode_bits).unwrap_or_else(|_| {
            tracing::debug!(
                "invalid mode bits 0b{:05b} in PSR=0x{:08X}, defaulting to Supervisor",
                mode_bits,
                self.0
            );
            Mode::Supervisor
        })
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    /// Sets Q. Saturating and overflow-detecting instructions only ever set
    /// it; clearing is MSR's business.
    pub fn set_sticky_overflow(&mut self, value: bool) {
        self.0.set_bit(27, value);
    }

    pub fn set_jazelle_bit(&mut self, value: bool) {
        self.0.set_bit(24, value);
    }

    /// Replaces all four GE bits.
    pub fn set_ge_bits(&mut self, value: u32) {
        self.0.set_bits(16..=19, value);
    }

    /// Sets GE lane `lane` (0..=3). Unaffected lanes keep their value.
    pub fn set_ge_bit(&mut self, lane: u8, value: bool) {
        debug_assert!(lane < 4);
        self.0.set_bit(16 + lane, value);
    }

    /// Sets both bits of a halfword GE pair (`pair` is 0 or 1).
    pub fn set_ge_pair(&mut self, pair: u8, value: bool) {
        debug_assert!(pair < 2);
        self.0.set_bits(16 + pair * 2..=17 + pair * 2, if value { 0b11 } else { 0b00 });
    }

    pub fn set_endian_bit(&mut self, value: bool) {
        self.0.set_bit(9, value);
    }

    pub fn set_abort_disable(&mut self, value: bool) {
        self.0.set_bit(8, value);
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(7, value);
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(6, value);
    }

    pub fn set_state_bit(&mut self, value: bool) {
        self.0.set_bit(5, value);
    }

    /// The Mode Bits M4-M0 contain the current operating mode.
    pub const fn set_mode(&mut self, m: Mode) {
        self.0 &= !0b11111;
        self.0 |= m as u32;
    }
}

impl From<Mode> for Psr {
    fn from(m: Mode) -> Self {
        let mut s = Self(0);
        s.set_mode(m);
        s
    }
}

impl From<Psr> for u32 {
    fn from(p: Psr) -> Self {
        p.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flag_bits() {
        let mut cpsr = Psr::default();
        cpsr.set_sign_flag(true);
        assert!(cpsr.sign_flag());
        cpsr.set_zero_flag(true);
        assert!(cpsr.zero_flag());
        cpsr.set_carry_flag(true);
        assert!(cpsr.carry_flag());
        cpsr.set_overflow_flag(true);
        assert!(cpsr.overflow_flag());
        assert_eq!(cpsr.bits() >> 28, 0b1111);
    }

    #[test]
    fn sticky_and_state_bits() {
        let mut cpsr = Psr::default();
        cpsr.set_sticky_overflow(true);
        assert!(cpsr.sticky_overflow());
        cpsr.set_jazelle_bit(true);
        assert!(cpsr.jazelle_bit());
        cpsr.set_state_bit(true);
        assert!(cpsr.state_bit());
        cpsr.set_endian_bit(true);
        assert!(cpsr.endian_bit());
        cpsr.set_abort_disable(true);
        assert!(cpsr.abort_disable());
    }

    #[test]
    fn ge_lanes() {
        let mut cpsr = Psr::default();
        cpsr.set_ge_bits(0b1010);
        assert_eq!(cpsr.ge_bits(), 0b1010);
        cpsr.set_ge_bit(0, true);
        assert_eq!(cpsr.ge_bits(), 0b1011);
        // Pair writes only touch their two lanes.
        cpsr.set_ge_pair(1, false);
        assert_eq!(cpsr.ge_bits(), 0b0011);
        cpsr.set_ge_pair(1, true);
        assert_eq!(cpsr.ge_bits(), 0b1111);
    }

    #[test]
    fn mode_round_trip() {
        let mut cpsr = Psr::default();
        cpsr.set_mode(Mode::Fiq);
        assert_eq!(cpsr.bits() & 0b11111, 0b10001);
        assert_eq!(cpsr.mode(), Mode::Fiq);

        cpsr.set_mode(Mode::System);
        assert_eq!(cpsr.mode(), Mode::System);
    }

    #[test]
    fn invalid_mode_bits_decode_to_supervisor() {
        let cpsr = Psr::from_bits(0b00000);
        assert_eq!(cpsr.mode(), Mode::Supervisor);
    }

    #[test]
    fn condition_table() {
        let mut cpsr = Psr::default();
        assert!(cpsr.can_execute(Condition::AL));
        assert!(!cpsr.can_execute(Condition::NV));
        assert!(cpsr.can_execute(Condition::NE));
        assert!(!cpsr.can_execute(Condition::EQ));

        cpsr.set_zero_flag(true);
        assert!(cpsr.can_execute(Condition::EQ));
        assert!(cpsr.can_execute(Condition::LS));
        assert!(!cpsr.can_execute(Condition::HI));

        cpsr.set_zero_flag(false);
        cpsr.set_sign_flag(true);
        cpsr.set_overflow_flag(false);
        assert!(cpsr.can_execute(Condition::LT));
        assert!(!cpsr.can_execute(Condition::GE));

        cpsr.set_overflow_flag(true);
        assert!(cpsr.can_execute(Condition::GE));
        assert!(cpsr.can_execute(Condition::GT));
    }

    #[test]
    fn masks_do_not_overlap() {
        assert_eq!(Psr::UNALLOC_MASK & Psr::USER_MASK, 0);
        assert_eq!(Psr::UNALLOC_MASK & Psr::PRIV_MASK, 0);
        assert_eq!(Psr::UNALLOC_MASK & Psr::STATE_MASK, 0);
        assert_eq!(Psr::USER_MASK & Psr::PRIV_MASK, 0);
        assert_eq!(Psr::USER_MASK & Psr::STATE_MASK, 0);
        assert_eq!(Psr::PRIV_MASK & Psr::STATE_MASK, 0);
        assert_eq!(
            Psr::UNALLOC_MASK | Psr::USER_MASK | Psr::PRIV_MASK | Psr::STATE_MASK,
            0xFFFF_FFFF
        );
    }
}
