//! # Banked register file
//!
//! The 16 architecturally visible registers backed by 30 physical slots:
//! r0-r7 are shared by every mode, r8-r12 have an extra FIQ bank, and each
//! of the six register banks (User/System share one) has its own r13/r14.
//! r15 is the program counter and lives outside the flat array because its
//! read value is offset from its stored value.
//!
//! A flat array plus an index function replaces copy-on-mode-switch
//! banking: changing CPSR.mode re-routes every subsequent access, and the
//! User-bank override needed by LDM(2)/STM(2) is just an access with a
//! different mode argument.

use serde::{Deserialize, Serialize};

use crate::cpu::cpu_modes::Mode;

/// Stack Pointer register number.
pub const REG_SP: u8 = 0xD;

/// Link Register number (return address for subroutines).
pub const REG_LR: u8 = 0xE;

/// Program Counter register number.
pub const REG_PC: u8 = 0xF;

/// Physical storage for r0-r14 across all modes, plus the PC.
///
/// `pc` holds the address of the instruction currently executing; the
/// architectural read value of r15 (that address + 8) is materialized by
/// [`RegisterFile::get`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterFile {
    phys: [u32; 30],
    pc: u32,
}

/// Physical slot of register `r` as seen from `mode`.
const fn slot(mode: Mode, r: u8) -> usize {
    match r {
        0..=7 => r as usize,
        // FIQ's private r8-r12 occupy slots 13..=17.
        8..=12 => {
            if matches!(mode, Mode::Fiq) {
                r as usize + 5
            } else {
                r as usize
            }
        }
        // Six r13/r14 pairs at 18..=29, one per register bank.
        13 | 14 => 18 + 2 * mode.bank() + (r as usize - 13),
        _ => panic!("register number out of range"),
    }
}

impl RegisterFile {
    /// Reads register `r` through the bank of `mode`. r15 reads as the
    /// address of the current instruction plus 8.
    #[must_use]
    pub fn get(&self, mode: Mode, r: u8) -> u32 {
        if r == REG_PC {
            self.pc.wrapping_add(8)
        } else {
            self.phys[slot(mode, r)]
        }
    }

    /// Writes register `r` through the bank of `mode`.
    ///
    /// r15 is not writable here: PC updates go through the processor's
    /// dedicated PC-write operations so that the Thumb-interworking subset
    /// stays lexically distinguishable.
    pub fn set(&mut self, mode: Mode, r: u8, value: u32) {
        assert!(r < REG_PC, "r15 is written through the PC-write operations");
        self.phys[slot(mode, r)] = value;
    }

    /// Address of the instruction currently executing.
    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.pc
    }

    pub const fn set_program_counter(&mut self, address: u32) {
        self.pc = address;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn low_registers_are_shared() {
        let mut regs = RegisterFile::default();
        regs.set(Mode::User, 3, 42);
        assert_eq!(regs.get(Mode::Fiq, 3), 42);
        assert_eq!(regs.get(Mode::Irq, 3), 42);
    }

    #[test]
    fn fiq_banks_r8_to_r12() {
        let mut regs = RegisterFile::default();
        regs.set(Mode::User, 8, 1);
        regs.set(Mode::Fiq, 8, 2);
        assert_eq!(regs.get(Mode::User, 8), 1);
        assert_eq!(regs.get(Mode::System, 8), 1);
        assert_eq!(regs.get(Mode::Irq, 8), 1);
        assert_eq!(regs.get(Mode::Fiq, 8), 2);
    }

    #[test]
    fn sp_and_lr_are_banked_per_mode() {
        let mut regs = RegisterFile::default();
        regs.set(Mode::User, REG_SP, 0x100);
        regs.set(Mode::Supervisor, REG_SP, 0x200);
        regs.set(Mode::Irq, REG_SP, 0x300);
        regs.set(Mode::Fiq, REG_LR, 0x400);

        assert_eq!(regs.get(Mode::User, REG_SP), 0x100);
        // System shares the User bank.
        assert_eq!(regs.get(Mode::System, REG_SP), 0x100);
        assert_eq!(regs.get(Mode::Supervisor, REG_SP), 0x200);
        assert_eq!(regs.get(Mode::Irq, REG_SP), 0x300);
        assert_eq!(regs.get(Mode::Fiq, REG_LR), 0x400);
        assert_eq!(regs.get(Mode::User, REG_LR), 0);
    }

    #[test]
    fn pc_reads_execute_address_plus_8() {
        let mut regs = RegisterFile::default();
        regs.set_program_counter(0x1000);
        assert_eq!(regs.get(Mode::User, REG_PC), 0x1008);
        assert_eq!(regs.program_counter(), 0x1000);
    }

    #[test]
    #[should_panic]
    fn pc_rejects_generic_writes() {
        let mut regs = RegisterFile::default();
        regs.set(Mode::User, REG_PC, 0);
    }
}
