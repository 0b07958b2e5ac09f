use serde::{Deserialize, Serialize};

/// The seven ARMv6 processor modes, as encoded in CPSR bits 4-0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// The normal program execution state.
    User = 0b10000,

    /// Fast interrupt handling; banks r8-r14 for low-latency entry.
    Fiq = 0b10001,

    /// General-purpose interrupt handling.
    Irq = 0b10010,

    /// Protected mode for the operating system (SWI entry).
    Supervisor = 0b10011,

    /// Entered after a data or instruction prefetch abort (and BKPT).
    Abort = 0b10111,

    /// Entered when an undefined instruction is executed.
    Undefined = 0b11011,

    /// A privileged mode sharing the User register bank.
    System = 0b11111,
}

impl Mode {
    /// `InAPrivilegedMode()`: every mode except User.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        !matches!(self, Self::User)
    }

    /// `CurrentModeHasSPSR()`: the exception modes have a saved PSR,
    /// User and System do not.
    #[must_use]
    pub const fn has_spsr(self) -> bool {
        !matches!(self, Self::User | Self::System)
    }

    /// Index of this mode's r13/r14 pair in the physical register file.
    pub(crate) const fn bank(self) -> usize {
        match self {
            Self::User | Self::System => 0,
            Self::Supervisor => 1,
            Self::Abort => 2,
            Self::Undefined => 3,
            Self::Irq => 4,
            Self::Fiq => 5,
        }
    }

    /// Slot of this mode's SPSR, if it has one.
    pub(crate) const fn spsr_slot(self) -> Option<usize> {
        match self {
            Self::Fiq => Some(0),
            Self::Irq => Some(1),
            Self::Supervisor => Some(2),
            Self::Abort => Some(3),
            Self::Undefined => Some(4),
            Self::User | Self::System => None,
        }
    }
}

impl From<Mode> for u32 {
    fn from(m: Mode) -> Self {
        m as Self
    }
}

impl TryFrom<u32> for Mode {
    type Error = String;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            0b10000 => Ok(Self::User),
            0b10001 => Ok(Self::Fiq),
            0b10010 => Ok(Self::Irq),
            0b10011 => Ok(Self::Supervisor),
            0b10111 => Ok(Self::Abort),
            0b11011 => Ok(Self::Undefined),
            0b11111 => Ok(Self::System),
            _ => Err(String::from("Unexpected value for Mode")),
        }
    }
}
