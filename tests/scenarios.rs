//! End-to-end scenarios through the public surface: decoded descriptors
//! applied with `execute`, observed through registers, flags and memory.

use pretty_assertions::assert_eq;

use armv6sim::cpu::addressing::{BlockMode, WordByteAddress};
use armv6sim::cpu::arm1176::Arm1176;
use armv6sim::cpu::condition::Condition;
use armv6sim::cpu::hardware::memory::Ram;
use armv6sim::cpu::hardware::monitor::SingleCoreMonitor;
use armv6sim::cpu::instruction::{Instruction, MsrOperand, PsrKind};
use armv6sim::cpu::registers::REG_SP;
use armv6sim::cpu::shifter::ShiftOperand;

fn core() -> Arm1176 {
    Arm1176::new(Box::new(Ram::new(0, 0x1_0000)))
}

#[test]
fn add_wraps_with_carry_and_overflow() {
    let mut core = core();
    core.set_reg(0, 0x8000_0000);
    core.set_reg(1, 0x8000_0000);
    core.execute(&Instruction::Add {
        cond: Condition::AL,
        set_flags: true,
        n: 0,
        d: 0,
        op2: ShiftOperand::Register { m: 1 },
    });
    assert_eq!(core.reg(0), 0);
    assert!(!core.cpsr.sign_flag());
    assert!(core.cpsr.zero_flag());
    assert!(core.cpsr.carry_flag());
    assert!(core.cpsr.overflow_flag());
}

#[test]
fn sbc_with_borrow_in() {
    let mut core = core();
    core.set_reg(0, 0);
    core.cpsr.set_carry_flag(false);
    core.execute(&Instruction::Sbc {
        cond: Condition::AL,
        set_flags: true,
        n: 0,
        d: 0,
        op2: ShiftOperand::Immediate {
            immed_8: 1,
            rotate_imm: 0,
        },
    });
    assert_eq!(core.reg(0), 0xFFFF_FFFE);
    assert!(core.cpsr.sign_flag());
    assert!(!core.cpsr.zero_flag());
    assert!(!core.cpsr.carry_flag());
    assert!(!core.cpsr.overflow_flag());
}

#[test]
fn unaligned_ldr_rotates_the_addressed_byte_into_lane_zero() {
    let mut core = core();
    core.mmu.write_byte(0x1000, 0x11);
    core.mmu.write_byte(0x1001, 0x22);
    core.mmu.write_byte(0x1002, 0x33);
    core.mmu.write_byte(0x1003, 0x44);
    core.set_reg(1, 0x1003);
    core.execute(&Instruction::Ldr {
        cond: Condition::AL,
        d: 0,
        address: WordByteAddress::ImmediateOffset {
            n: 1,
            offset_12: 0,
            u: true,
        },
    });
    assert_eq!(core.reg(0), 0x3322_1144);
}

#[test]
fn ldm_loads_ascending_registers_and_writes_back() {
    let mut core = core();
    core.set_reg(REG_SP, 0x2000);
    core.mmu.write_word(0x2000, 0xAAAA_0001);
    core.mmu.write_word(0x2004, 0xBBBB_0002);
    core.mmu.write_word(0x2008, 0xCCCC_0003);
    core.execute(&Instruction::Ldm1 {
        cond: Condition::AL,
        addressing: BlockMode::IncrementAfter,
        n: REG_SP,
        register_list: 0b0000_0000_0000_1101,
        w: true,
    });
    assert_eq!(core.reg(0), 0xAAAA_0001);
    assert_eq!(core.reg(2), 0xBBBB_0002);
    assert_eq!(core.reg(3), 0xCCCC_0003);
    assert_eq!(core.reg(REG_SP), 0x200C);
}

#[test]
fn qadd_saturates_and_sets_q() {
    let mut core = core();
    core.set_reg(1, 0x7FFF_FFFF);
    core.set_reg(2, 1);
    core.execute(&Instruction::Qadd {
        cond: Condition::AL,
        d: 0,
        n: 1,
        m: 2,
    });
    assert_eq!(core.reg(0), 0x7FFF_FFFF);
    assert!(core.cpsr.sticky_overflow());
}

#[test]
fn uadd8_sets_all_ge_lanes_on_carry() {
    let mut core = core();
    core.set_reg(1, 0x0102_0304);
    core.set_reg(2, 0xFFFE_FDFC);
    core.execute(&Instruction::Uadd8 {
        cond: Condition::AL,
        d: 0,
        n: 1,
        m: 2,
    });
    assert_eq!(core.reg(0), 0);
    assert_eq!(core.cpsr.ge_bits(), 0b1111);
}

#[test]
fn exclusive_pair_reports_success_then_failure() {
    let mut core = core();
    core.set_monitor(Box::new(SingleCoreMonitor::new().shared()));
    core.mmu.write_word(0x4000, 5);
    core.set_reg(1, 0x4000);
    core.set_reg(2, 6);

    core.execute(&Instruction::Ldrex {
        cond: Condition::AL,
        d: 0,
        n: 1,
    });
    assert_eq!(core.reg(0), 5);

    core.execute(&Instruction::Strex {
        cond: Condition::AL,
        d: 3,
        n: 1,
        m: 2,
    });
    assert_eq!(core.reg(3), 0);
    assert_eq!(core.mmu.read_word(0x4000), 6);

    core.execute(&Instruction::Strex {
        cond: Condition::AL,
        d: 3,
        n: 1,
        m: 2,
    });
    assert_eq!(core.reg(3), 1);
}

#[test]
fn msr_writes_the_flag_byte_in_privileged_mode() {
    let mut core = core();
    core.execute(&Instruction::Msr {
        cond: Condition::AL,
        destination: PsrKind::Cpsr,
        field_mask: 0b1000,
        operand: MsrOperand::Immediate {
            immed_8: 0xF0,
            rotate_imm: 4,
        },
    });
    assert!(core.cpsr.sign_flag());
    assert!(core.cpsr.zero_flag());
    assert!(core.cpsr.carry_flag());
    assert!(core.cpsr.overflow_flag());
}

#[test]
fn a_failed_condition_preserves_every_architectural_bit() {
    let mut core = core();
    core.set_reg(0, 0x1234);
    core.set_reg(1, 0x5678);
    let before = core.save_state();
    // Z is clear: EQ fails for every one of these.
    let instructions = [
        Instruction::Add {
            cond: Condition::EQ,
            set_flags: true,
            n: 0,
            d: 0,
            op2: ShiftOperand::Register { m: 1 },
        },
        Instruction::Qadd {
            cond: Condition::EQ,
            d: 0,
            n: 0,
            m: 1,
        },
        Instruction::Umull {
            cond: Condition::EQ,
            set_flags: true,
            d_lo: 2,
            d_hi: 3,
            m: 0,
            s: 1,
        },
        Instruction::Rev {
            cond: Condition::EQ,
            d: 0,
            m: 1,
        },
        Instruction::Swi { cond: Condition::EQ },
    ];
    for instruction in &instructions {
        core.execute(instruction);
    }
    let after = core.save_state();
    assert_eq!(before.cpsr, after.cpsr);
    assert_eq!(before.spsrs, after.spsrs);
    for r in 0..15 {
        assert_eq!(
            before.regs.get(armv6sim::cpu::cpu_modes::Mode::Supervisor, r),
            after.regs.get(armv6sim::cpu::cpu_modes::Mode::Supervisor, r),
        );
    }
    assert_eq!(before.regs.program_counter(), after.regs.program_counter());
}

#[test]
fn mov_to_pc_keeps_thumb_bit_but_ldr_to_pc_switches() {
    let mut core1 = core();
    core1.set_reg(1, 0x0000_2001);
    core1.execute(&Instruction::Mov {
        cond: Condition::AL,
        set_flags: false,
        d: 15,
        op2: ShiftOperand::Register { m: 1 },
    });
    assert!(!core1.cpsr.state_bit());
    assert_eq!(core1.regs.program_counter(), 0x2001);

    let mut core = core();
    core.mmu.write_word(0x3000, 0x0000_4001);
    core.set_reg(1, 0x3000);
    core.execute(&Instruction::Ldr {
        cond: Condition::AL,
        d: 15,
        address: WordByteAddress::ImmediateOffset {
            n: 1,
            offset_12: 0,
            u: true,
        },
    });
    assert!(core.cpsr.state_bit());
    assert_eq!(core.regs.program_counter(), 0x4000);
}

#[test]
fn mnemonics_are_exposed_for_tracing() {
    let i = Instruction::Qadd {
        cond: Condition::AL,
        d: 0,
        n: 1,
        m: 2,
    };
    assert_eq!(i.mnemonic(), "QADD");
    assert_eq!(Instruction::Pld.mnemonic(), "PLD");
    assert_eq!(Instruction::Bkpt.mnemonic(), "BKPT");
}

#[test]
fn state_snapshots_serialize() {
    let mut core1 = core();
    core1.set_reg(5, 0xCAFE);
    core1.cpsr.set_carry_flag(true);
    let snapshot = core1.save_state();
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: armv6sim::cpu::arm1176::CoreState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.cpsr, snapshot.cpsr);

    let mut core = core();
    core.restore_state(restored);
    assert_eq!(core.reg(5), 0xCAFE);
    assert!(core.cpsr.carry_flag());
}
