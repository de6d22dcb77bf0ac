//! Host-side result codes.
//!
//! `Status` never appears inside the instruction loop — it is the result
//! of operations the host performs on the CPU from outside (construction,
//! ROM loading, coprocessor registration, teardown). Faults that occur
//! *during* execution of guest code are `Exception`s, not `Status`es; the
//! two never cross.

use std::fmt;

/// Outcome of a host-side operation on a `Cpu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Status {
    Ok,
    InvalidCpuState,
    InvalidArgs,
    ValueError,
    MemoryError,
    IoError,
    UnknownOpcode,
    UniverseBroken,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Ok => "ok",
            Self::InvalidCpuState => "CPU is not in a state that permits this operation",
            Self::InvalidArgs => "invalid arguments",
            Self::ValueError => "value out of range",
            Self::MemoryError => "memory allocation or mapping error",
            Self::IoError => "I/O error",
            Self::UnknownOpcode => "unknown coprocessor opcode",
            Self::UniverseBroken => "internal invariant violated",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Status {}
