//! # Coprocessor transformers
//!
//! The seven generic coprocessor operations. LDC/STC are word-at-a-time
//! loops: the coprocessor's `not_finished` is consulted before every
//! additional word, so each access stays individually observable. Both
//! return the final transfer address for drivers that want the extent.
//!
//! MRC with r15 as the destination is the architectural flag-load: the top
//! four bits of the coprocessor value land in N/Z/C/V and the PC is left
//! alone.

use crate::bitwise::Bits;
use crate::cpu::addressing::CoprocAddress;
use crate::cpu::arm1176::Arm1176;
use crate::cpu::condition::Condition;
use crate::cpu::registers::REG_PC;

impl Arm1176 {
    /// CDP: kick off a coprocessor-internal operation.
    pub fn cdp(&mut self, cond: Condition, cp_num: u8) {
        if !self.condition_passed(cond) {
            return;
        }
        if let Some(cp) = self.coproc(cp_num) {
            cp.dependent_operation();
        }
    }

    /// LDC: feed memory words to the coprocessor until it reports done.
    /// Returns the address of the last word transferred.
    pub fn ldc(&mut self, cond: Condition, cp_num: u8, address: CoprocAddress) -> Option<u32> {
        let Some(mut cp) = self.take_coproc(cp_num) else {
            return None;
        };
        let start_address = address.resolve(self, cond);
        let mut end_address = start_address;
        if self.condition_passed(cond) {
            let word = self.mmu.read_word(end_address);
            cp.load(word);
            while cp.not_finished() {
                end_address = end_address.wrapping_add(4);
                let word = self.mmu.read_word(end_address);
                cp.load(word);
            }
        }
        self.put_coproc(cp_num, cp);
        Some(end_address)
    }

    /// STC: drain coprocessor words into memory until it reports done.
    /// Returns the address of the last word transferred.
    pub fn stc(&mut self, cond: Condition, cp_num: u8, address: CoprocAddress) -> Option<u32> {
        let Some(mut cp) = self.take_coproc(cp_num) else {
            return None;
        };
        let start_address = address.resolve(self, cond);
        let mut end_address = start_address;
        if self.condition_passed(cond) {
            let word = cp.value();
            self.mmu.write_word(end_address, word);
            self.clear_exclusive_if_shared(end_address, 4);
            while cp.not_finished() {
                end_address = end_address.wrapping_add(4);
                let word = cp.value();
                self.mmu.write_word(end_address, word);
                self.clear_exclusive_if_shared(end_address, 4);
            }
        }
        self.put_coproc(cp_num, cp);
        Some(end_address)
    }

    /// MCR: send Rd to the coprocessor.
    pub fn mcr(&mut self, cond: Condition, cp_num: u8, d: u8) {
        let value = self.reg(d);
        if !self.condition_passed(cond) {
            return;
        }
        if let Some(cp) = self.coproc(cp_num) {
            cp.send(value);
        }
    }

    /// MCRR: send Rd then Rn.
    pub fn mcrr(&mut self, cond: Condition, cp_num: u8, d: u8, n: u8) {
        let first = self.reg(d);
        let second = self.reg(n);
        if !self.condition_passed(cond) {
            return;
        }
        if let Some(cp) = self.coproc(cp_num) {
            cp.send(first);
            cp.send(second);
        }
    }

    /// MRC: read a coprocessor value into Rd, or into the flags when Rd is
    /// r15.
    pub fn mrc(&mut self, cond: Condition, cp_num: u8, d: u8) {
        if !self.condition_passed(cond) {
            return;
        }
        let Some(cp) = self.coproc(cp_num) else {
            return;
        };
        let data = cp.value();
        if d == REG_PC {
            self.cpsr.set_sign_flag(data.get_bit(31));
            self.cpsr.set_zero_flag(data.get_bit(30));
            self.cpsr.set_carry_flag(data.get_bit(29));
            self.cpsr.set_overflow_flag(data.get_bit(28));
        } else {
            self.set_reg(d, data);
        }
    }

    /// MRRC: two-word read into Rd and Rn.
    pub fn mrrc(&mut self, cond: Condition, cp_num: u8, d: u8, n: u8) {
        if !self.condition_passed(cond) {
            return;
        }
        let Some(cp) = self.coproc(cp_num) else {
            return;
        };
        let first = cp.first_value();
        let second = cp.second_value();
        self.set_reg(d, first);
        self.set_reg(n, second);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::hardware::Coprocessor;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A FIFO coprocessor for exercising the transfer loops.
    #[derive(Default)]
    struct Fifo {
        loaded: Rc<RefCell<Vec<u32>>>,
        to_store: Vec<u32>,
        sent: Rc<RefCell<Vec<u32>>>,
        words_left: usize,
    }

    impl Coprocessor for Fifo {
        fn dependent_operation(&mut self) {
            self.sent.borrow_mut().push(0xDEAD);
        }

        fn load(&mut self, word: u32) {
            self.loaded.borrow_mut().push(word);
            self.words_left = self.words_left.saturating_sub(1);
        }

        fn value(&mut self) -> u32 {
            self.words_left = self.words_left.saturating_sub(1);
            self.to_store.remove(0)
        }

        fn send(&mut self, word: u32) {
            self.sent.borrow_mut().push(word);
        }

        fn first_value(&mut self) -> u32 {
            0x1111
        }

        fn second_value(&mut self) -> u32 {
            0x2222
        }

        fn not_finished(&mut self) -> bool {
            self.words_left > 0
        }
    }

    #[test]
    fn ldc_transfers_until_finished() {
        let mut core = Arm1176::for_tests();
        let loaded = Rc::new(RefCell::new(Vec::new()));
        core.set_coprocessor(
            10,
            Box::new(Fifo {
                loaded: Rc::clone(&loaded),
                words_left: 3,
                ..Fifo::default()
            }),
        );
        core.mmu.write_word(0x1000, 0xA);
        core.mmu.write_word(0x1004, 0xB);
        core.mmu.write_word(0x1008, 0xC);
        core.set_reg(1, 0x1000);
        let end = core.ldc(
            Condition::AL,
            10,
            CoprocAddress::ImmediateOffset {
                n: 1,
                offset_8: 0,
                u: true,
            },
        );
        assert_eq!(end, Some(0x1008));
        assert_eq!(loaded.borrow().as_slice(), [0xA, 0xB, 0xC]);
    }

    #[test]
    fn stc_drains_the_coprocessor() {
        let mut core = Arm1176::for_tests();
        core.set_coprocessor(
            10,
            Box::new(Fifo {
                to_store: vec![0x10, 0x20],
                words_left: 2,
                ..Fifo::default()
            }),
        );
        core.set_reg(1, 0x2000);
        let end = core.stc(
            Condition::AL,
            10,
            CoprocAddress::ImmediateOffset {
                n: 1,
                offset_8: 0,
                u: true,
            },
        );
        assert_eq!(end, Some(0x2004));
        assert_eq!(core.mmu.read_word(0x2000), 0x10);
        assert_eq!(core.mmu.read_word(0x2004), 0x20);
    }

    #[test]
    fn mcr_and_mcrr_send_register_values() {
        let mut core = Arm1176::for_tests();
        let sent = Rc::new(RefCell::new(Vec::new()));
        core.set_coprocessor(
            7,
            Box::new(Fifo {
                sent: Rc::clone(&sent),
                ..Fifo::default()
            }),
        );
        core.set_reg(2, 0xAB);
        core.set_reg(3, 0xCD);
        core.mcr(Condition::AL, 7, 2);
        core.mcrr(Condition::AL, 7, 2, 3);
        assert_eq!(sent.borrow().as_slice(), [0xAB, 0xAB, 0xCD]);
    }

    #[test]
    fn mrc_writes_a_register_or_the_flags() {
        let mut core = Arm1176::for_tests();
        core.set_coprocessor(
            7,
            Box::new(Fifo {
                to_store: vec![0x42, 0xF000_0000],
                ..Fifo::default()
            }),
        );
        core.mrc(Condition::AL, 7, 5);
        assert_eq!(core.reg(5), 0x42);

        core.mrc(Condition::AL, 7, REG_PC);
        assert!(core.cpsr.sign_flag());
        assert!(core.cpsr.zero_flag());
        assert!(core.cpsr.carry_flag());
        assert!(core.cpsr.overflow_flag());
        // The PC itself is untouched.
        assert_eq!(core.regs.program_counter(), 0);
    }

    #[test]
    fn mrrc_reads_both_words() {
        let mut core = Arm1176::for_tests();
        core.set_coprocessor(7, Box::new(Fifo::default()));
        core.mrrc(Condition::AL, 7, 5, 6);
        assert_eq!(core.reg(5), 0x1111);
        assert_eq!(core.reg(6), 0x2222);
    }

    #[test]
    fn missing_coprocessor_is_skipped() {
        let mut core = Arm1176::for_tests();
        core.mrc(Condition::AL, 3, 5);
        assert_eq!(core.reg(5), 0);
        assert_eq!(core.ldc(
            Condition::AL,
            3,
            CoprocAddress::Unindexed { n: 1 },
        ), None);
    }

    #[test]
    fn cdp_runs_the_dependent_operation() {
        let mut core = Arm1176::for_tests();
        let sent = Rc::new(RefCell::new(Vec::new()));
        core.set_coprocessor(
            7,
            Box::new(Fifo {
                sent: Rc::clone(&sent),
                ..Fifo::default()
            }),
        );
        core.cdp(Condition::AL, 7);
        assert_eq!(sent.borrow().as_slice(), [0xDEAD]);
    }
}
