//! # Block-transfer transformers
//!
//! LDM/STM move ascending register numbers through ascending addresses.
//! LDM(2)/STM(2) go through the User bank regardless of the current mode,
//! LDM(3) restores CPSR from the SPSR before loading the PC, and RFE/SRS
//! are the exception-return/save forms. Writeback commits the block
//! helper's `new_rn` only when the W bit says so.

use crate::bitwise::Bits;
use crate::cpu::addressing::BlockMode;
use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::unpredictable::Unpredictable;

impl Arm1176 {
    /// LDM(1): load r0..r14 from the list; a listed r15 takes the loaded
    /// word as an interworking branch target.
    pub fn ldm1(
        &mut self,
        cond: Condition,
        addressing: BlockMode,
        n: u8,
        register_list: u16,
        w: bool,
    ) {
        if !self.condition_passed(cond) {
            return;
        }
        let range = addressing.for_register_list(self.reg(n), register_list);
        let mut address = range.start_address;
        for i in 0..=14 {
            if register_list.get_bit(i) {
                let value = self.mmu.read_word(address);
                self.set_reg(i, value);
                address = address.wrapping_add(4);
            }
        }
        if register_list.get_bit(15) {
            let value = self.mmu.read_word(address);
            self.set_pc_interworking(value);
        }
        if w {
            self.set_reg(n, range.new_rn);
        }
    }

    /// LDM(2): load r0..r14 into the User bank. No PC slot.
    pub fn ldm2(
        &mut self,
        cond: Condition,
        addressing: BlockMode,
        n: u8,
        register_list: u16,
        w: bool,
    ) {
        if !self.condition_passed(cond) {
            return;
        }
        let range = addressing.for_register_list(self.reg(n), register_list);
        let mut address = range.start_address;
        for i in 0..=14 {
            if register_list.get_bit(i) {
                let value = self.mmu.read_word(address);
                self.set_reg_user(i, value);
                address = address.wrapping_add(4);
            }
        }
        if w {
            self.set_reg(n, range.new_rn);
        }
    }

    /// LDM(3): exception return. Registers load as LDM(1), then CPSR takes
    /// the SPSR and the PC takes the final word as a raw write (the
    /// restored CPSR already carries the T bit).
    pub fn ldm3(
        &mut self,
        cond: Condition,
        addressing: BlockMode,
        n: u8,
        register_list: u16,
        w: bool,
    ) {
        if !self.condition_passed(cond) {
            return;
        }
        let range = addressing.for_register_list(self.reg(n), register_list);
        let mut address = range.start_address;
        for i in 0..=14 {
            if register_list.get_bit(i) {
                let value = self.mmu.read_word(address);
                self.set_reg(i, value);
                address = address.wrapping_add(4);
            }
        }
        if self.current_mode_has_spsr() {
            self.copy_spsr_to_cpsr();
        } else {
            self.unpredictable(Unpredictable::SpsrAccess);
        }
        let value = self.mmu.read_word(address);
        self.set_pc_raw(value);
        if w {
            // Writeback goes through the restored mode's bank.
            self.set_reg(n, range.new_rn);
        }
    }

    /// STM(1): store the listed registers; a listed r15 stores the
    /// pipeline value (current instruction + 8).
    pub fn stm1(
        &mut self,
        cond: Condition,
        addressing: BlockMode,
        n: u8,
        register_list: u16,
        w: bool,
    ) {
        if !self.condition_passed(cond) {
            return;
        }
        let range = addressing.for_register_list(self.reg(n), register_list);
        let mut address = range.start_address;
        for i in 0..=15 {
            if register_list.get_bit(i) {
                let value = self.reg(i);
                self.mmu.write_word(address, value);
                self.clear_exclusive_if_shared(address, 4);
                address = address.wrapping_add(4);
            }
        }
        if w {
            self.set_reg(n, range.new_rn);
        }
    }

    /// STM(2): store r0..r14 from the User bank.
    pub fn stm2(
        &mut self,
        cond: Condition,
        addressing: BlockMode,
        n: u8,
        register_list: u16,
        w: bool,
    ) {
        if !self.condition_passed(cond) {
            return;
        }
        let range = addressing.for_register_list(self.reg(n), register_list);
        let mut address = range.start_address;
        for i in 0..=14 {
            if register_list.get_bit(i) {
                let value = self.reg_user(i);
                self.mmu.write_word(address, value);
                self.clear_exclusive_if_shared(address, 4);
                address = address.wrapping_add(4);
            }
        }
        if w {
            self.set_reg(n, range.new_rn);
        }
    }

    /// RFE: unconditional return-from-exception. Loads the new PC and CPSR
    /// from two stacked words; UNPREDICTABLE outside privileged modes.
    pub fn rfe(&mut self, addressing: BlockMode, n: u8, w: bool) {
        let range = addressing.block_range(self.reg(n), 2);
        let address = range.start_address;
        let value = self.mmu.read_word(address);
        if self.in_privileged_mode() {
            let image = self.mmu.read_word(address.wrapping_add(4));
            self.cpsr = crate::cpu::psr::Psr::from_bits(image);
        } else {
            self.unpredictable(Unpredictable::SpsrAccess);
            return;
        }
        if w {
            self.set_reg(n, range.new_rn);
        }
        self.set_pc_raw(value);
    }

    /// SRS: unconditional save of r14 and the current SPSR onto the stack
    /// of the named mode; UNPREDICTABLE when the current mode has no SPSR.
    pub fn srs(&mut self, addressing: BlockMode, mode: Mode, w: bool) {
        let base = self.regs.get(mode, 13);
        let range = addressing.block_range(base, 2);
        let address = range.start_address;
        let link = self.reg(14);
        self.mmu.write_word(address, link);
        self.clear_exclusive_if_shared(address, 4);
        if self.current_mode_has_spsr() {
            let saved = self.spsr();
            self.mmu.write_word(address.wrapping_add(4), saved.bits());
            self.clear_exclusive_if_shared(address.wrapping_add(4), 4);
        } else {
            self.unpredictable(Unpredictable::SpsrAccess);
            return;
        }
        if w {
            self.regs.set(mode, 13, range.new_rn);
        }
    }
}
