//! Guest-side exceptions: the faults and traps ARMv2 code itself can
//! provoke. These are consumed entirely by the execution loop's trap
//! sequence (see `cpu.rs`) and never surface to the host as a `Status`.

use crate::registers::Mode;

/// A guest-visible exception, or the absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    None,
    Reset,
    UndefinedInstruction,
    SoftwareInterrupt,
    PrefetchAbort,
    DataAbort,
    AddressException,
    Irq,
    Fiq,
}

impl Exception {
    /// Byte offset of this exception's entry in the vector table at page 0.
    #[must_use]
    pub fn vector(self) -> u32 {
        match self {
            Self::None => unreachable!("Exception::None has no vector"),
            Self::Reset => 0x00,
            Self::UndefinedInstruction => 0x04,
            Self::SoftwareInterrupt => 0x08,
            Self::PrefetchAbort => 0x0C,
            Self::DataAbort => 0x10,
            Self::AddressException => 0x14,
            Self::Irq => 0x18,
            Self::Fiq => 0x1C,
        }
    }

    /// Processor mode entered when this exception traps. ARMv2 has no
    /// dedicated abort/undefined modes, so every synchronous trap lands in
    /// supervisor mode; only IRQ/FIQ get their own banked mode.
    #[must_use]
    pub fn entry_mode(self) -> Mode {
        match self {
            Self::None => unreachable!("Exception::None never traps"),
            Self::Irq => Mode::Irq,
            Self::Fiq => Mode::Fiq,
            _ => Mode::Sup,
        }
    }

    #[must_use]
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}
