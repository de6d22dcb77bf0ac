//! Coprocessor bus: a 16-slot table of attached coprocessors, reached by
//! the two coprocessor instruction classes (data-operation and
//! register-transfer). Slot selection is the 4-bit coprocessor number in
//! `bits[11:8]`, same field in both instruction forms.

use crate::exception::Exception;
use crate::registers::Registers;
use crate::status::Status;

/// A device attached to the coprocessor bus.
///
/// Both entry points report outcomes through `Status`, not `Exception`:
/// a coprocessor's internal rejection of a request (a bad register index,
/// an opcode it doesn't implement) is a coprocessor-level failure, distinct
/// from the guest-visible exceptions the execution loop traps on. The bus
/// is what translates between the two (see `CoprocessorBus::dispatch_*`).
pub trait Coprocessor {
    /// CDP-style data operation: coprocessor-internal computation, no ARM
    /// register touched.
    fn data_operation(&mut self, instruction: u32) -> Status;

    /// MRC/MCR-style register transfer: move a value between an ARM
    /// register and a coprocessor-internal register.
    fn register_transfer(&mut self, instruction: u32, regs: &mut Registers) -> Status;
}

const NUM_SLOTS: usize = 16;

/// The coprocessor bus itself: fixed-size slot table, indexed by the
/// 4-bit coprocessor number every coprocessor instruction carries.
pub struct CoprocessorBus {
    slots: Vec<Option<Box<dyn Coprocessor>>>,
}

impl CoprocessorBus {
    #[must_use]
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(NUM_SLOTS);
        slots.resize_with(NUM_SLOTS, || None);
        Self { slots }
    }

    /// Attach a coprocessor at `id` (0-15). Replaces whatever was there.
    pub fn attach(&mut self, id: u8, coprocessor: Box<dyn Coprocessor>) -> Result<(), Status> {
        let slot = self.slots.get_mut(id as usize).ok_or(Status::InvalidArgs)?;
        *slot = Some(coprocessor);
        Ok(())
    }

    fn slot_id(instruction: u32) -> usize {
        ((instruction >> 8) & 0xF) as usize
    }

    /// Translate a coprocessor's `Status` outcome into the `Exception` the
    /// execution loop understands. A coprocessor rejecting a request
    /// (bad register index, unimplemented opcode) is architecturally no
    /// different from the bus finding no coprocessor there at all: the
    /// instruction goes undefined. `UniverseBroken` is the self-check
    /// from `spec.md` §7 — it never legitimately happens, so observing it
    /// aborts emulation rather than being papered over.
    fn to_exception(status: Status) -> Exception {
        match status {
            Status::Ok => Exception::None,
            Status::InvalidArgs | Status::UnknownOpcode => Exception::UndefinedInstruction,
            Status::UniverseBroken => panic!("coprocessor reported UniverseBroken: unreachable state"),
            other => panic!("coprocessor returned a status it should never produce: {other}"),
        }
    }

    /// Dispatch a coprocessor data-operation instruction. An empty slot
    /// raises `UndefinedInstruction`, matching real hardware's behavior
    /// when no coprocessor claims the instruction.
    pub fn dispatch_data_operation(&mut self, instruction: u32) -> Exception {
        match self.slots[Self::slot_id(instruction)].as_deref_mut() {
            Some(cp) => Self::to_exception(cp.data_operation(instruction)),
            None => Exception::UndefinedInstruction,
        }
    }

    /// Dispatch a coprocessor register-transfer instruction.
    pub fn dispatch_register_transfer(&mut self, instruction: u32, regs: &mut Registers) -> Exception {
        match self.slots[Self::slot_id(instruction)].as_deref_mut() {
            Some(cp) => Self::to_exception(cp.register_transfer(instruction, regs)),
            None => Exception::UndefinedInstruction,
        }
    }
}

impl Default for CoprocessorBus {
    fn default() -> Self {
        Self::new()
    }
}
