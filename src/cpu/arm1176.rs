//! # Processor context
//!
//! [`Arm1176`] bundles everything an instruction transformer can touch: the
//! banked register file, CPSR and the SPSR bank, and handles to the injected
//! collaborators (MMU, coprocessors, exclusive monitor, CP15 shadow, Jazelle
//! shim, UNPREDICTABLE sink). Each decoded instruction is applied by
//! [`Arm1176::execute`]; transformers run to completion, there are no
//! suspension points, and the context is the exclusive resource of the
//! transformer in flight.
//!
//! ## PC protocol
//!
//! The register file stores the address of the instruction currently
//! executing; reading r15 yields that address plus 8, matching the
//! architectural prefetch offset. A transformer that branches calls one of
//! two writers so the Thumb-interworking subset stays lexically visible:
//!
//! - [`Arm1176::set_pc_raw`]: PC only, T untouched (ordinary
//!   data-processing writes to r15, LDM(3), RFE, exception entry)
//! - [`Arm1176::set_pc_interworking`]: CPSR.T from bit 0, PC from the
//!   remaining bits (BX, BLX, LDR-to-PC, LDM(1) with PC in the list)
//!
//! Either writer raises the taken-jump flag. After each instruction the
//! driver calls [`Arm1176::retire`], which either consumes the flag (the
//! next fetch happens at the branch target) or advances sequentially.

use serde::{Deserialize, Serialize};

use crate::cpu::condition::Condition;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::hardware::control::FixedControl;
use crate::cpu::hardware::jazelle::NullJazelle;
use crate::cpu::hardware::monitor::SingleCoreMonitor;
use crate::cpu::hardware::{Coprocessor, ExclusiveMonitor, JazelleUnit, Mmu, SystemControl};
use crate::cpu::instruction::Instruction;
use crate::cpu::psr::Psr;
use crate::cpu::registers::{REG_PC, RegisterFile};
use crate::cpu::unpredictable::{LoggingSink, Unpredictable, UnpredictableSink};

/// The ARMv6 semantic core: architectural state plus collaborator handles.
pub struct Arm1176 {
    pub regs: RegisterFile,
    pub cpsr: Psr,
    spsrs: [Psr; 5],
    jumped: bool,

    pub mmu: Box<dyn Mmu>,
    coprocessors: [Option<Box<dyn Coprocessor>>; 16],
    pub monitor: Box<dyn ExclusiveMonitor>,
    pub control: Box<dyn SystemControl>,
    pub jazelle: Box<dyn JazelleUnit>,
    sink: Box<dyn UnpredictableSink>,
}

/// Serializable snapshot of the architectural state. Collaborators are
/// injected wiring, not state, and are not part of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreState {
    pub regs: RegisterFile,
    pub cpsr: Psr,
    pub spsrs: [Psr; 5],
}

impl Arm1176 {
    /// Builds a core in the architectural reset state (Supervisor mode,
    /// ARM state, IRQ and FIQ masked) over the given memory. The remaining
    /// collaborators start as the in-tree reference implementations and can
    /// be swapped via the `set_*` methods.
    #[must_use]
    pub fn new(mmu: Box<dyn Mmu>) -> Self {
        let mut cpsr = Psr::from(Mode::Supervisor);
        cpsr.set_irq_disable(true);
        cpsr.set_fiq_disable(true);

        Self {
            regs: RegisterFile::default(),
            cpsr,
            spsrs: [Psr::default(); 5],
            jumped: false,
            mmu,
            coprocessors: std::array::from_fn(|_| None),
            monitor: Box::new(SingleCoreMonitor::new()),
            control: Box::new(FixedControl::default()),
            jazelle: Box::new(NullJazelle),
            sink: Box::new(LoggingSink::default()),
        }
    }

    pub fn set_coprocessor(&mut self, cp_num: u8, coprocessor: Box<dyn Coprocessor>) {
        self.coprocessors[cp_num as usize] = Some(coprocessor);
    }

    pub fn set_monitor(&mut self, monitor: Box<dyn ExclusiveMonitor>) {
        self.monitor = monitor;
    }

    pub fn set_control(&mut self, control: Box<dyn SystemControl>) {
        self.control = control;
    }

    pub fn set_jazelle(&mut self, jazelle: Box<dyn JazelleUnit>) {
        self.jazelle = jazelle;
    }

    pub fn set_sink(&mut self, sink: Box<dyn UnpredictableSink>) {
        self.sink = sink;
    }

    /// Architectural-state snapshot for savestates.
    #[must_use]
    pub fn save_state(&self) -> CoreState {
        CoreState {
            regs: self.regs.clone(),
            cpsr: self.cpsr,
            spsrs: self.spsrs,
        }
    }

    pub fn restore_state(&mut self, state: CoreState) {
        self.regs = state.regs;
        self.cpsr = state.cpsr;
        self.spsrs = state.spsrs;
        self.jumped = false;
    }

    // ------------------------------------------------------------------
    // Register access
    // ------------------------------------------------------------------

    /// Reads register `r` in the current mode. r15 reads as the current
    /// instruction address plus 8.
    #[must_use]
    pub fn reg(&self, r: u8) -> u32 {
        self.regs.get(self.cpsr.mode(), r)
    }

    /// Writes register `r` in the current mode. A write to r15 goes through
    /// [`Arm1176::set_pc_raw`]: the generic port never touches CPSR.T.
    pub fn set_reg(&mut self, r: u8, value: u32) {
        if r == REG_PC {
            self.set_pc_raw(value);
        } else {
            self.regs.set(self.cpsr.mode(), r, value);
        }
    }

    /// Reads register `r` through the User bank regardless of the current
    /// mode (LDM(2)/STM(2)).
    #[must_use]
    pub fn reg_user(&self, r: u8) -> u32 {
        self.regs.get(Mode::User, r)
    }

    /// Writes register `r` through the User bank regardless of the current
    /// mode.
    pub fn set_reg_user(&mut self, r: u8, value: u32) {
        self.regs.set(Mode::User, r, value);
    }

    // ------------------------------------------------------------------
    // PC writes
    // ------------------------------------------------------------------

    /// Branches to `target` without touching CPSR.T.
    pub fn set_pc_raw(&mut self, target: u32) {
        self.regs.set_program_counter(target);
        self.jumped = true;
    }

    /// Interworking branch: CPSR.T from bit 0 of `target`, PC from the
    /// halfword-aligned remainder.
    pub fn set_pc_interworking(&mut self, target: u32) {
        use crate::bitwise::Bits;
        self.cpsr.set_state_bit(target.get_bit(0));
        self.set_pc_raw(target & 0xFFFF_FFFE);
    }

    /// Address of the instruction after the one executing.
    #[must_use]
    pub fn next_instr(&self) -> u32 {
        self.regs.program_counter().wrapping_add(4)
    }

    /// Whether the last executed instruction committed a branch. Clears the
    /// flag.
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jumped)
    }

    /// Driver hook: advance to the next instruction. After a committed
    /// branch the PC already holds the target, so only the jump flag is
    /// consumed; otherwise execution falls through sequentially.
    pub fn retire(&mut self) {
        if !self.take_jump() {
            let pc = self.regs.program_counter();
            self.regs.set_program_counter(pc.wrapping_add(4));
        }
    }

    // ------------------------------------------------------------------
    // Status registers, conditions, UNPREDICTABLE
    // ------------------------------------------------------------------

    #[must_use]
    pub fn condition_passed(&self, cond: Condition) -> bool {
        self.cpsr.can_execute(cond)
    }

    #[must_use]
    pub fn in_privileged_mode(&self) -> bool {
        self.cpsr.mode().is_privileged()
    }

    #[must_use]
    pub fn current_mode_has_spsr(&self) -> bool {
        self.cpsr.mode().has_spsr()
    }

    /// SPSR of the current mode. In User/System mode, which have no SPSR,
    /// the access is UNPREDICTABLE: the event is reported and the CPSR is
    /// returned so execution can continue self-consistently.
    #[must_use]
    pub fn spsr(&mut self) -> Psr {
        match self.cpsr.mode().spsr_slot() {
            Some(slot) => self.spsrs[slot],
            None => {
                self.unpredictable(Unpredictable::SpsrAccess);
                self.cpsr
            }
        }
    }

    /// Writes the SPSR of the current mode; UNPREDICTABLE (reported, then
    /// dropped) when there is none.
    pub fn set_spsr(&mut self, value: Psr) {
        match self.cpsr.mode().spsr_slot() {
            Some(slot) => self.spsrs[slot] = value,
            None => self.unpredictable(Unpredictable::SpsrAccess),
        }
    }

    /// SPSR of a specific exception mode (exception entry sequences).
    pub fn set_spsr_of(&mut self, mode: Mode, value: Psr) {
        if let Some(slot) = mode.spsr_slot() {
            self.spsrs[slot] = value;
        }
    }

    /// The SPSR-to-CPSR transfer performed by flag-setting writes to r15
    /// and by LDM(3).
    pub(crate) fn copy_spsr_to_cpsr(&mut self) {
        match self.cpsr.mode().spsr_slot() {
            Some(slot) => self.cpsr = self.spsrs[slot],
            None => self.unpredictable(Unpredictable::SpsrAccess),
        }
    }

    pub(crate) fn unpredictable(&mut self, event: Unpredictable) {
        self.sink.report(event);
    }

    // ------------------------------------------------------------------
    // Collaborator plumbing
    // ------------------------------------------------------------------

    /// The coprocessor on port `cp_num`, if one is installed. An absent
    /// coprocessor would take the undefined-instruction trap before
    /// reaching the semantic core, so here it is just logged and skipped.
    pub(crate) fn coproc(&mut self, cp_num: u8) -> Option<&mut (dyn Coprocessor + '_)> {
        let port = self.coprocessors[cp_num as usize]
            .as_mut()
            .map(|b| &mut **b as &mut (dyn Coprocessor + '_));
        if port.is_none() {
            tracing::warn!("no coprocessor on port {cp_num}");
        }
        port
    }

    /// Detaches the coprocessor on `cp_num` for the duration of a transfer
    /// loop that interleaves memory and coprocessor accesses. Put it back
    /// with [`Arm1176::put_coproc`].
    pub(crate) fn take_coproc(&mut self, cp_num: u8) -> Option<Box<dyn Coprocessor>> {
        let port = self.coprocessors[cp_num as usize].take();
        if port.is_none() {
            tracing::warn!("no coprocessor on port {cp_num}");
        }
        port
    }

    pub(crate) fn put_coproc(&mut self, cp_num: u8, coprocessor: Box<dyn Coprocessor>) {
        self.coprocessors[cp_num as usize] = Some(coprocessor);
    }

    /// Stores invalidate overlapping global reservations: the write makes
    /// any outstanding exclusive sequence on another processor fail.
    pub(crate) fn clear_exclusive_if_shared(&mut self, address: u32, size: u32) {
        if self.monitor.shared(address) {
            let physical_address = self.monitor.tlb(address);
            let processor_id = self.monitor.executing_processor();
            self.monitor
                .clear_exclusive_by_address(physical_address, processor_id, size);
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Applies one decoded instruction to the context.
    #[allow(clippy::too_many_lines)]
    pub fn execute(&mut self, instruction: &Instruction) {
        use Instruction as I;
        match *instruction {
            I::Adc { cond, set_flags, n, d, op2 } => self.adc(cond, set_flags, n, d, op2),
            I::Add { cond, set_flags, n, d, op2 } => self.add(cond, set_flags, n, d, op2),
            I::And { cond, set_flags, n, d, op2 } => self.and(cond, set_flags, n, d, op2),
            I::Bic { cond, set_flags, n, d, op2 } => self.bic(cond, set_flags, n, d, op2),
            I::Cmn { cond, n, op2 } => self.cmn(cond, n, op2),
            I::Cmp { cond, n, op2 } => self.cmp(cond, n, op2),
            I::Cpy { cond, d, m } => self.cpy(cond, d, m),
            I::Eor { cond, set_flags, n, d, op2 } => self.eor(cond, set_flags, n, d, op2),
            I::Mov { cond, set_flags, d, op2 } => self.mov(cond, set_flags, d, op2),
            I::Mvn { cond, set_flags, d, op2 } => self.mvn(cond, set_flags, d, op2),
            I::Orr { cond, set_flags, n, d, op2 } => self.orr(cond, set_flags, n, d, op2),
            I::Rsb { cond, set_flags, n, d, op2 } => self.rsb(cond, set_flags, n, d, op2),
            I::Rsc { cond, set_flags, n, d, op2 } => self.rsc(cond, set_flags, n, d, op2),
            I::Sbc { cond, set_flags, n, d, op2 } => self.sbc(cond, set_flags, n, d, op2),
            I::Sub { cond, set_flags, n, d, op2 } => self.sub(cond, set_flags, n, d, op2),
            I::Teq { cond, n, op2 } => self.teq(cond, n, op2),
            I::Tst { cond, n, op2 } => self.tst(cond, n, op2),

            I::Branch { cond, link, signed_immed_24 } => self.b_bl(cond, link, signed_immed_24),
            I::BranchExchange { cond, m } => self.bx(cond, m),
            I::BranchExchangeJazelle { cond, m } => self.bxj(cond, m),
            I::BranchLinkExchangeImmediate { signed_immed_24, h_bit } => {
                self.blx_immediate(signed_immed_24, h_bit);
            }
            I::BranchLinkExchangeRegister { cond, m } => self.blx_register(cond, m),

            I::Bkpt => self.bkpt(),
            I::Swi { cond } => self.swi(cond),

            I::Cps { imod, mmod, a, i, f, mode } => self.cps(imod, mmod, a, i, f, mode),
            I::Mrs { cond, d, source } => self.mrs(cond, d, source),
            I::Msr { cond, destination, field_mask, operand } => {
                self.msr(cond, destination, field_mask, operand);
            }
            I::Setend { big_endian } => self.setend(big_endian),

            I::Mla { cond, set_flags, d, n, m, s } => self.mla(cond, set_flags, d, n, m, s),
            I::Mul { cond, set_flags, d, m, s } => self.mul(cond, set_flags, d, m, s),
            I::Smla { cond, d, n, m, s, x, y } => self.smla(cond, d, n, m, s, x, y),
            I::Smlad { cond, d, n, m, s, x } => self.smlad(cond, d, n, m, s, x),
            I::Smlal { cond, set_flags, d_lo, d_hi, m, s } => {
                self.smlal(cond, set_flags, d_lo, d_hi, m, s);
            }
            I::SmlalXy { cond, d_lo, d_hi, m, s, x, y } => {
                self.smlal_xy(cond, d_lo, d_hi, m, s, x, y);
            }
            I::Smlald { cond, d_lo, d_hi, m, s, x } => self.smlald(cond, d_lo, d_hi, m, s, x),
            I::Smlaw { cond, d, n, m, s, y } => self.smlaw(cond, d, n, m, s, y),
            I::Smlsd { cond, d, n, m, s, x } => self.smlsd(cond, d, n, m, s, x),
            I::Smlsld { cond, d_lo, d_hi, m, s, x } => self.smlsld(cond, d_lo, d_hi, m, s, x),
            I::Smmla { cond, d, n, m, s, round } => self.smmla(cond, d, n, m, s, round),
            I::Smmls { cond, d, n, m, s, round } => self.smmls(cond, d, n, m, s, round),
            I::Smmul { cond, d, m, s, round } => self.smmul(cond, d, m, s, round),
            I::Smuad { cond, d, m, s, x } => self.smuad(cond, d, m, s, x),
            I::Smul { cond, d, m, s, x, y } => self.smul(cond, d, m, s, x, y),
            I::Smull { cond, set_flags, d_lo, d_hi, m, s } => {
                self.smull(cond, set_flags, d_lo, d_hi, m, s);
            }
            I::Smulw { cond, d, m, s, y } => self.smulw(cond, d, m, s, y),
            I::Smusd { cond, d, m, s, x } => self.smusd(cond, d, m, s, x),
            I::Umaal { cond, d_lo, d_hi, m, s } => self.umaal(cond, d_lo, d_hi, m, s),
            I::Umlal { cond, set_flags, d_lo, d_hi, m, s } => {
                self.umlal(cond, set_flags, d_lo, d_hi, m, s);
            }
            I::Umull { cond, set_flags, d_lo, d_hi, m, s } => {
                self.umull(cond, set_flags, d_lo, d_hi, m, s);
            }
            I::Usad8 { cond, d, m, s } => self.usad8(cond, d, m, s),
            I::Usada8 { cond, d, n, m, s } => self.usada8(cond, d, n, m, s),

            I::Clz { cond, d, m } => self.clz(cond, d, m),

            I::Qadd { cond, d, n, m } => self.qadd(cond, d, n, m),
            I::Qadd16 { cond, d, n, m } => self.qadd16(cond, d, n, m),
            I::Qadd8 { cond, d, n, m } => self.qadd8(cond, d, n, m),
            I::Qaddsubx { cond, d, n, m } => self.qaddsubx(cond, d, n, m),
            I::Qdadd { cond, d, n, m } => self.qdadd(cond, d, n, m),
            I::Qdsub { cond, d, n, m } => self.qdsub(cond, d, n, m),
            I::Qsub { cond, d, n, m } => self.qsub(cond, d, n, m),
            I::Qsub16 { cond, d, n, m } => self.qsub16(cond, d, n, m),
            I::Qsub8 { cond, d, n, m } => self.qsub8(cond, d, n, m),
            I::Qsubaddx { cond, d, n, m } => self.qsubaddx(cond, d, n, m),
            I::Ssat { cond, d, m, sat_imm, shift_imm, arithmetic_shift } => {
                self.ssat(cond, d, m, sat_imm, shift_imm, arithmetic_shift);
            }
            I::Ssat16 { cond, d, m, sat_imm } => self.ssat16(cond, d, m, sat_imm),
            I::Uqadd16 { cond, d, n, m } => self.uqadd16(cond, d, n, m),
            I::Uqadd8 { cond, d, n, m } => self.uqadd8(cond, d, n, m),
            I::Uqaddsubx { cond, d, n, m } => self.uqaddsubx(cond, d, n, m),
            I::Uqsub16 { cond, d, n, m } => self.uqsub16(cond, d, n, m),
            I::Uqsub8 { cond, d, n, m } => self.uqsub8(cond, d, n, m),
            I::Uqsubaddx { cond, d, n, m } => self.uqsubaddx(cond, d, n, m),
            I::Usat { cond, d, m, sat_imm, shift_imm, arithmetic_shift } => {
                self.usat(cond, d, m, sat_imm, shift_imm, arithmetic_shift);
            }
            I::Usat16 { cond, d, m, sat_imm } => self.usat16(cond, d, m, sat_imm),

            I::Sadd16 { cond, d, n, m } => self.sadd16(cond, d, n, m),
            I::Sadd8 { cond, d, n, m } => self.sadd8(cond, d, n, m),
            I::Saddsubx { cond, d, n, m } => self.saddsubx(cond, d, n, m),
            I::Shadd16 { cond, d, n, m } => self.shadd16(cond, d, n, m),
            I::Shadd8 { cond, d, n, m } => self.shadd8(cond, d, n, m),
            I::Shaddsubx { cond, d, n, m } => self.shaddsubx(cond, d, n, m),
            I::Shsub16 { cond, d, n, m } => self.shsub16(cond, d, n, m),
            I::Shsub8 { cond, d, n, m } => self.shsub8(cond, d, n, m),
            I::Shsubaddx { cond, d, n, m } => self.shsubaddx(cond, d, n, m),
            I::Ssub16 { cond, d, n, m } => self.ssub16(cond, d, n, m),
            I::Ssub8 { cond, d, n, m } => self.ssub8(cond, d, n, m),
            I::Ssubaddx { cond, d, n, m } => self.ssubaddx(cond, d, n, m),
            I::Uadd16 { cond, d, n, m } => self.uadd16(cond, d, n, m),
            I::Uadd8 { cond, d, n, m } => self.uadd8(cond, d, n, m),
            I::Uaddsubx { cond, d, n, m } => self.uaddsubx(cond, d, n, m),
            I::Uhadd16 { cond, d, n, m } => self.uhadd16(cond, d, n, m),
            I::Uhadd8 { cond, d, n, m } => self.uhadd8(cond, d, n, m),
            I::Uhaddsubx { cond, d, n, m } => self.uhaddsubx(cond, d, n, m),
            I::Uhsub16 { cond, d, n, m } => self.uhsub16(cond, d, n, m),
            I::Uhsub8 { cond, d, n, m } => self.uhsub8(cond, d, n, m),
            I::Uhsubaddx { cond, d, n, m } => self.uhsubaddx(cond, d, n, m),
            I::Usub16 { cond, d, n, m } => self.usub16(cond, d, n, m),
            I::Usub8 { cond, d, n, m } => self.usub8(cond, d, n, m),
            I::Usubaddx { cond, d, n, m } => self.usubaddx(cond, d, n, m),

            I::Pkhbt { cond, d, n, m, shift_imm } => self.pkhbt(cond, d, n, m, shift_imm),
            I::Pkhtb { cond, d, n, m, shift_imm } => self.pkhtb(cond, d, n, m, shift_imm),
            I::Rev { cond, d, m } => self.rev(cond, d, m),
            I::Rev16 { cond, d, m } => self.rev16(cond, d, m),
            I::Revsh { cond, d, m } => self.revsh(cond, d, m),
            I::Sel { cond, d, n, m } => self.sel(cond, d, n, m),
            I::Sxtab { cond, d, n, m, rotate } => self.sxtab(cond, d, n, m, rotate),
            I::Sxtab16 { cond, d, n, m, rotate } => self.sxtab16(cond, d, n, m, rotate),
            I::Sxtah { cond, d, n, m, rotate } => self.sxtah(cond, d, n, m, rotate),
            I::Sxtb { cond, d, m, rotate } => self.sxtb(cond, d, m, rotate),
            I::Sxtb16 { cond, d, m, rotate } => self.sxtb16(cond, d, m, rotate),
            I::Sxth { cond, d, m, rotate } => self.sxth(cond, d, m, rotate),
            I::Uxtab { cond, d, n, m, rotate } => self.uxtab(cond, d, n, m, rotate),
            I::Uxtab16 { cond, d, n, m, rotate } => self.uxtab16(cond, d, n, m, rotate),
            I::Uxtah { cond, d, n, m, rotate } => self.uxtah(cond, d, n, m, rotate),
            I::Uxtb { cond, d, m, rotate } => self.uxtb(cond, d, m, rotate),
            I::Uxtb16 { cond, d, m, rotate } => self.uxtb16(cond, d, m, rotate),
            I::Uxth { cond, d, m, rotate } => self.uxth(cond, d, m, rotate),

            I::Ldr { cond, d, address } => self.ldr(cond, d, address),
            I::Ldrb { cond, d, address } => self.ldrb(cond, d, address),
            I::Ldrbt { cond, d, address } => self.ldrbt(cond, d, address),
            I::Ldrt { cond, d, address } => self.ldrt(cond, d, address),
            I::Pld => self.pld(),
            I::Str { cond, d, address } => self.str(cond, d, address),
            I::Strb { cond, d, address } => self.strb(cond, d, address),
            I::Strbt { cond, d, address } => self.strbt(cond, d, address),
            I::Strt { cond, d, address } => self.strt(cond, d, address),

            I::Ldrd { cond, d, address } => self.ldrd(cond, d, address),
            I::Ldrh { cond, d, address } => self.ldrh(cond, d, address),
            I::Ldrsb { cond, d, address } => self.ldrsb(cond, d, address),
            I::Ldrsh { cond, d, address } => self.ldrsh(cond, d, address),
            I::Strd { cond, d, address } => self.strd(cond, d, address),
            I::Strh { cond, d, address } => self.strh(cond, d, address),

            I::Ldrex { cond, d, n } => self.ldrex(cond, d, n),
            I::Strex { cond, d, n, m } => self.strex(cond, d, n, m),
            I::Swp { cond, d, n, m } => self.swp(cond, d, n, m),
            I::Swpb { cond, d, n, m } => self.swpb(cond, d, n, m),

            I::Ldm1 { cond, addressing, n, register_list, w } => {
                self.ldm1(cond, addressing, n, register_list, w);
            }
            I::Ldm2 { cond, addressing, n, register_list, w } => {
                self.ldm2(cond, addressing, n, register_list, w);
            }
            I::Ldm3 { cond, addressing, n, register_list, w } => {
                self.ldm3(cond, addressing, n, register_list, w);
            }
            I::Rfe { addressing, n, w } => self.rfe(addressing, n, w),
            I::Srs { addressing, mode, w } => self.srs(addressing, mode, w),
            I::Stm1 { cond, addressing, n, register_list, w } => {
                self.stm1(cond, addressing, n, register_list, w);
            }
            I::Stm2 { cond, addressing, n, register_list, w } => {
                self.stm2(cond, addressing, n, register_list, w);
            }

            I::Cdp { cond, cp_num } => self.cdp(cond, cp_num),
            I::Ldc { cond, cp_num, address } => {
                self.ldc(cond, cp_num, address);
            }
            I::Mcr { cond, cp_num, d } => self.mcr(cond, cp_num, d),
            I::Mcrr { cond, cp_num, d, n } => self.mcrr(cond, cp_num, d, n),
            I::Mrc { cond, cp_num, d } => self.mrc(cond, cp_num, d),
            I::Mrrc { cond, cp_num, d, n } => self.mrrc(cond, cp_num, d, n),
            I::Stc { cond, cp_num, address } => {
                self.stc(cond, cp_num, address);
            }
        }
    }
}

#[cfg(test)]
impl Arm1176 {
    /// A core over 64 KiB of RAM at address zero, reference collaborators
    /// everywhere. Most tests start here.
    pub(crate) fn for_tests() -> Self {
        Self::new(Box::new(crate::cpu::hardware::memory::Ram::new(0, 0x1_0000)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::registers::REG_PC;
    use pretty_assertions::assert_eq;

    #[test]
    fn reset_state() {
        let core = Arm1176::for_tests();
        assert_eq!(core.cpsr.mode(), Mode::Supervisor);
        assert!(core.cpsr.irq_disable());
        assert!(core.cpsr.fiq_disable());
        assert!(!core.cpsr.state_bit());
    }

    #[test]
    fn pc_reads_plus_eight() {
        let mut core = Arm1176::for_tests();
        core.regs.set_program_counter(0x8000);
        assert_eq!(core.reg(REG_PC), 0x8008);
    }

    #[test]
    fn retire_advances_or_consumes_jump() {
        let mut core = Arm1176::for_tests();
        core.regs.set_program_counter(0x100);
        core.retire();
        assert_eq!(core.regs.program_counter(), 0x104);

        core.set_pc_raw(0x2000);
        core.retire();
        assert_eq!(core.regs.program_counter(), 0x2000);
        core.retire();
        assert_eq!(core.regs.program_counter(), 0x2004);
    }

    #[test]
    fn interworking_write_sets_thumb_bit() {
        let mut core = Arm1176::for_tests();
        core.set_pc_interworking(0x3001);
        assert!(core.cpsr.state_bit());
        assert_eq!(core.regs.program_counter(), 0x3000);

        core.set_pc_interworking(0x4000);
        assert!(!core.cpsr.state_bit());
        assert_eq!(core.regs.program_counter(), 0x4000);
    }

    #[test]
    fn raw_write_leaves_thumb_bit() {
        let mut core = Arm1176::for_tests();
        core.set_pc_raw(0x3001);
        assert!(!core.cpsr.state_bit());
        assert_eq!(core.regs.program_counter(), 0x3001);
    }

    #[test]
    fn spsr_roundtrip_in_exception_mode() {
        let mut core = Arm1176::for_tests();
        let mut saved = Psr::from(Mode::User);
        saved.set_carry_flag(true);
        core.set_spsr(saved);
        assert_eq!(core.spsr(), saved);
    }

    #[test]
    fn save_and_restore_state() {
        let mut core = Arm1176::for_tests();
        core.set_reg(5, 0x1234);
        core.cpsr.set_carry_flag(true);
        let state = core.save_state();

        core.set_reg(5, 0);
        core.cpsr.set_carry_flag(false);
        core.restore_state(state);
        assert_eq!(core.reg(5), 0x1234);
        assert!(core.cpsr.carry_flag());
    }
}
