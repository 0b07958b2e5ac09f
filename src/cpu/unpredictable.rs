//! # UNPREDICTABLE reporting
//!
//! The architecture labels certain operand/state combinations
//! UNPREDICTABLE: the implementation may do anything self-consistent but
//! must not crash. The core funnels every such site through a single sink
//! and then returns from the transformer without further mutation; callers
//! decide whether the sink logs, counts, halts or panics.

/// One architecturally UNPREDICTABLE event, by trigger family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unpredictable {
    /// SPSR access (read, write or SPSR-to-CPSR copy) in User or System
    /// mode, which have no SPSR. Covers flag-setting writes to r15, MRS/MSR
    /// with R=1, LDM(3), RFE and SRS outside exception modes.
    SpsrAccess,
    /// LDRD/STRD with an odd or r14 destination pair, a misaligned address,
    /// or U=0 with a doubleword-crossing address.
    PairedTransfer { d: u8, address: u32 },
    /// Halfword access to an odd address while CP15 alignment checking is
    /// off (U=0).
    MisalignedHalfword { address: u32 },
    /// MSR operand with non-zero unallocated PSR bits.
    ReservedPsrBits { operand: u32 },
    /// Privileged MSR asked to write the execution-state bits of the CPSR.
    CpsrStateBits { operand: u32 },
}

/// Where UNPREDICTABLE events go. Invoked at most once per instruction.
pub trait UnpredictableSink {
    fn report(&mut self, event: Unpredictable);
}

/// Default sink: count and log.
#[derive(Debug, Default)]
pub struct LoggingSink {
    reported: u64,
}

impl LoggingSink {
    /// Number of events reported so far.
    #[must_use]
    pub const fn reported(&self) -> u64 {
        self.reported
    }
}

impl UnpredictableSink for LoggingSink {
    fn report(&mut self, event: Unpredictable) {
        self.reported += 1;
        tracing::warn!("UNPREDICTABLE: {event:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_sink_counts() {
        let mut sink = LoggingSink::default();
        assert_eq!(sink.reported(), 0);
        sink.report(Unpredictable::SpsrAccess);
        sink.report(Unpredictable::MisalignedHalfword { address: 0x1001 });
        assert_eq!(sink.reported(), 2);
    }
}
