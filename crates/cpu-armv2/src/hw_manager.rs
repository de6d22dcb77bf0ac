//! The hardware-manager coprocessor: lets guest code enumerate attached
//! peripherals and move values between an ARM register and the manager's
//! own internal register file. The only coprocessor this crate ships;
//! further devices are a matter of implementing `Coprocessor` and
//! attaching them at another slot.

use crate::coprocessor::Coprocessor;
use crate::registers::{Flags, Registers};
use crate::status::Status;

/// Data-operation opcode (`bits[23:20]`) that writes the attached device
/// count into `CRd`.
const OP_NUM_DEVICES: u32 = 0x0;

/// Register-transfer opcode (`bits[23:21]`) that moves a value between
/// `Rd` and an internal register `CRn`.
const OP_MOV_REGISTER: u32 = 0x0;

/// Size of the hardware manager's own register file. `CRd`/`CRn` are
/// decoded from a 4-bit instruction field (0-15) but the manager itself
/// only implements a handful of registers; indices at or above this bound
/// are rejected with `InvalidArgs`, matching the original's
/// `crd >= HW_MANAGER_NUMREGS` guard.
const NUM_INTERNAL_REGISTERS: usize = 8;

/// The hardware-manager coprocessor.
pub struct HardwareManager {
    registers: [u32; NUM_INTERNAL_REGISTERS],
    device_count: u32,
}

impl HardwareManager {
    #[must_use]
    pub fn new(device_count: u32) -> Self {
        Self {
            registers: [0; NUM_INTERNAL_REGISTERS],
            device_count,
        }
    }

    #[must_use]
    pub fn internal_register(&self, n: usize) -> u32 {
        self.registers[n]
    }
}

impl Coprocessor for HardwareManager {
    fn data_operation(&mut self, instruction: u32) -> Status {
        let opcode = (instruction >> 20) & 0xF;
        let crd = ((instruction >> 12) & 0xF) as usize;

        if crd >= NUM_INTERNAL_REGISTERS {
            return Status::InvalidArgs;
        }
        if opcode != OP_NUM_DEVICES {
            return Status::UnknownOpcode;
        }

        self.registers[crd] = self.device_count;
        Status::Ok
    }

    fn register_transfer(&mut self, instruction: u32, regs: &mut Registers) -> Status {
        const LOAD_BIT: u32 = 1 << 20;

        let crn = ((instruction >> 16) & 0xF) as usize;
        if crn >= NUM_INTERNAL_REGISTERS {
            return Status::InvalidArgs;
        }

        let opcode = (instruction >> 21) & 0x7;
        if opcode != OP_MOV_REGISTER {
            return Status::UnknownOpcode;
        }

        let rd = ((instruction >> 12) & 0xF) as u8;
        let load = instruction & LOAD_BIT != 0;

        if load {
            let value = self.registers[crn];
            if rd == 15 {
                regs.set_flags(flags_from_word(value));
            } else {
                regs.set(regs.mode(), rd, value);
            }
        } else {
            // No special case for Rd=15 here: `Registers::get` already
            // returns the full packed PC/PSR word for register 15, and
            // storing simply copies whatever Rd holds (spec.md §4.9).
            self.registers[crn] = regs.get(regs.mode(), rd);
        }

        Status::Ok
    }
}

/// R15 as a register-transfer *load* destination only ever carries NZCV:
/// the architectural special case for a coprocessor register transfer
/// targeting the program counter (spec.md §4.9). Storing from R15 has no
/// such special case — it copies the whole packed word, handled by
/// `Registers::get` directly.
fn flags_from_word(value: u32) -> Flags {
    Flags {
        n: value & 0x8000_0000 != 0,
        z: value & 0x4000_0000 != 0,
        c: value & 0x2000_0000 != 0,
        v: value & 0x1000_0000 != 0,
    }
}
