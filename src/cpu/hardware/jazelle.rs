//! Jazelle extension shim consumed by BXJ.
//!
//! BXJ is the only instruction that talks to it; everything about actual
//! Jazelle bytecode execution is outside the simulator.

/// The Jazelle-extension predicates and hooks BXJ delegates to.
pub trait JazelleUnit {
    /// JE bit of the Main Configuration register. With JE=0, BXJ behaves
    /// exactly as BX.
    fn je_bit(&self) -> bool;
    /// Whether the extension accepts the opcode at the Jazelle PC.
    fn accepts_opcode_at_jpc(&mut self) -> bool;
    /// CV bit of the Jazelle OS Control register.
    fn cv_bit(&self) -> bool;
    /// The implementation-defined predicate consulted when entry is
    /// declined.
    fn implementation_defined_condition(&self) -> bool;
    /// Subarchitecture-defined word (Jazelle PC, invalid handler address).
    fn subarchitecture_defined_value(&self) -> u32;
    /// Hand control to the extension at the given Jazelle PC.
    fn start_opcode_execution_at(&mut self, jpc: u32);
}

/// A core without the Jazelle extension: JE reads as zero, so BXJ always
/// falls back to BX and the remaining hooks are unreachable.
#[derive(Debug, Default)]
pub struct NullJazelle;

impl JazelleUnit for NullJazelle {
    fn je_bit(&self) -> bool {
        false
    }

    fn accepts_opcode_at_jpc(&mut self) -> bool {
        false
    }

    fn cv_bit(&self) -> bool {
        false
    }

    fn implementation_defined_condition(&self) -> bool {
        false
    }

    fn subarchitecture_defined_value(&self) -> u32 {
        0
    }

    fn start_opcode_execution_at(&mut self, _jpc: u32) {}
}
