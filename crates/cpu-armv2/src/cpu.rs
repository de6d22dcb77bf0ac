//! The CPU: owns memory, registers and the coprocessor bus, and drives
//! the fetch/decode/condition-check/execute loop.

use crate::alu;
use crate::branch;
use crate::condition::Condition;
use crate::coprocessor::{Coprocessor, CoprocessorBus};
use crate::decode::{classify, InstructionClass};
use crate::exception::Exception;
use crate::memory::PagedMemory;
use crate::registers::Registers;
use crate::status::Status;
use crate::unimplemented;
use emu_core::{Observable, Ticks, Value};

/// Minimum ROM image size the boot loader accepts: enough bytes to cover
/// the full exception vector table (`0x00`-`0x1C`) plus the first real
/// instruction after it.
const MIN_ROM_BYTES: usize = 0x24;

/// Where a `Cpu` sits in its construction/boot/run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, memory allocated, no ROM loaded yet.
    Init,
    /// ROM loaded, executing instructions.
    Running,
    /// Halted by the host; `step` refuses to run further instructions.
    Halted,
}

/// Outcome of executing one instruction, used internally to decide how
/// the loop should advance the program counter.
enum Outcome {
    /// PC should advance by 4, the ordinary case (including taken
    /// branches, which pre-compensate by 4 for exactly this).
    Advance,
    /// The instruction wrote R15 directly; its value is already final.
    PcWritten,
    /// The instruction raised an exception; enter the trap sequence.
    Trap(Exception),
}

pub struct Cpu {
    memory: PagedMemory,
    regs: Registers,
    coprocessors: CoprocessorBus,
    lifecycle: Lifecycle,
}

impl Cpu {
    /// Allocate a CPU with `memory_bytes` of RAM (rounded up to a whole
    /// page, rejected above `memory::MAX_MEMORY`). Starts in supervisor
    /// mode with PC at address 0, in `Lifecycle::Init`.
    pub fn new(memory_bytes: usize) -> Result<Self, Status> {
        Ok(Self {
            memory: PagedMemory::new(memory_bytes)?,
            regs: Registers::new(),
            coprocessors: CoprocessorBus::new(),
            lifecycle: Lifecycle::Init,
        })
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    #[must_use]
    pub fn memory(&self) -> &PagedMemory {
        &self.memory
    }

    /// Fill page 0 with a boot ROM image. Must happen before `start`.
    pub fn load_rom(&mut self, data: &[u8]) -> Result<(), Status> {
        if self.lifecycle != Lifecycle::Init {
            return Err(Status::InvalidCpuState);
        }
        if data.len() < MIN_ROM_BYTES {
            return Err(Status::ValueError);
        }
        self.memory.load_page_zero(data)
    }

    /// Attach a coprocessor at bus slot `id` (0-15). Must happen before
    /// `start`; coprocessors can't be swapped out once running.
    pub fn attach_coprocessor(&mut self, id: u8, coprocessor: Box<dyn Coprocessor>) -> Result<(), Status> {
        if self.lifecycle != Lifecycle::Init {
            return Err(Status::InvalidCpuState);
        }
        self.coprocessors.attach(id, coprocessor)
    }

    /// Transition from `Init` to `Running`.
    pub fn start(&mut self) -> Result<(), Status> {
        if self.lifecycle != Lifecycle::Init {
            return Err(Status::InvalidCpuState);
        }
        self.lifecycle = Lifecycle::Running;
        Ok(())
    }

    pub fn halt(&mut self) {
        self.lifecycle = Lifecycle::Halted;
    }

    /// Fetch, decode, condition-check and execute exactly one instruction.
    /// Returns the number of ticks consumed — always one, since this core
    /// executes each instruction as a single atomic step rather than
    /// modeling per-cycle bus timing.
    pub fn step(&mut self) -> Result<Ticks, Status> {
        if self.lifecycle != Lifecycle::Running {
            return Err(Status::InvalidCpuState);
        }

        let pc = self.regs.pc_address();
        let instruction = match self.memory.fetch_word(pc) {
            Ok(word) => word,
            Err(exception) => {
                self.trap(exception);
                return Ok(Ticks::new(1));
            }
        };

        let condition = Condition::from_bits(instruction >> 28);
        if !condition.is_satisfied(self.regs.flags()) {
            self.regs.set_pc_address(pc.wrapping_add(4));
            return Ok(Ticks::new(1));
        }

        match self.execute(instruction) {
            Outcome::Advance => {
                let next = self.regs.pc_address().wrapping_add(4);
                self.regs.set_pc_address(next);
            }
            Outcome::PcWritten => {}
            Outcome::Trap(exception) => self.trap(exception),
        }

        Ok(Ticks::new(1))
    }

    /// Run up to `max_cycles` instructions, stopping early if the CPU
    /// leaves `Running` (e.g. a host-visible halt condition this crate
    /// doesn't itself define).
    pub fn run(&mut self, max_cycles: u64) -> Result<Ticks, Status> {
        let mut executed = Ticks::ZERO;
        while executed.get() < max_cycles && self.lifecycle == Lifecycle::Running {
            executed += self.step()?;
        }
        Ok(executed)
    }

    fn execute(&mut self, instruction: u32) -> Outcome {
        match classify(instruction) {
            InstructionClass::DataProcessing => {
                if alu::execute(instruction, &mut self.regs) {
                    Outcome::PcWritten
                } else {
                    Outcome::Advance
                }
            }
            InstructionClass::Branch => {
                branch::execute(instruction, &mut self.regs);
                Outcome::Advance
            }
            InstructionClass::CoprocessorDataOperation => {
                Self::from_exception(self.coprocessors.dispatch_data_operation(instruction))
            }
            InstructionClass::CoprocessorRegisterTransfer => {
                Self::from_exception(self.coprocessors.dispatch_register_transfer(instruction, &mut self.regs))
            }
            InstructionClass::Multiply => Self::from_exception(unimplemented::multiply(instruction)),
            InstructionClass::SingleDataSwap => {
                Self::from_exception(unimplemented::single_data_swap(instruction))
            }
            InstructionClass::SingleDataTransfer => {
                Self::from_exception(unimplemented::single_data_transfer(instruction))
            }
            InstructionClass::BlockDataTransfer => {
                Self::from_exception(unimplemented::block_data_transfer(instruction))
            }
            InstructionClass::CoprocessorDataTransfer => {
                Self::from_exception(unimplemented::coprocessor_data_transfer(instruction))
            }
            InstructionClass::SoftwareInterrupt => {
                Self::from_exception(unimplemented::software_interrupt(instruction))
            }
            InstructionClass::Undefined => Outcome::Trap(Exception::UndefinedInstruction),
        }
    }

    fn from_exception(exception: Exception) -> Outcome {
        if exception.is_none() {
            Outcome::Advance
        } else {
            Outcome::Trap(exception)
        }
    }

    /// Enter the trap sequence: bank into the exception's mode, save the
    /// faulting/interrupted address into that mode's R14, disable IRQ
    /// (and FIQ, for Reset/FIQ itself), and vector to the handler.
    fn trap(&mut self, exception: Exception) {
        let return_addr = self.regs.pc_address();
        let mode = exception.entry_mode();

        self.regs.set_mode(mode);
        self.regs.set(mode, 14, return_addr);
        self.regs.set_irq_disabled(true);
        if matches!(exception, Exception::Reset | Exception::Fiq) {
            self.regs.set_fiq_disabled(true);
        }
        self.regs.set_pc_address(exception.vector());
    }
}

const QUERY_PATHS: &[&str] = &[
    "pc", "mode", "flags.n", "flags.z", "flags.c", "flags.v", "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8",
    "r9", "r10", "r11", "r12", "r13", "r14",
];

impl Observable for Cpu {
    fn query(&self, path: &str) -> Option<Value> {
        let mode = self.regs.mode();
        let flags = self.regs.flags();
        match path {
            "pc" => Some(Value::U32(self.regs.pc_address())),
            "mode" => Some(Value::String(format!("{mode:?}"))),
            "flags.n" => Some(Value::Bool(flags.n)),
            "flags.z" => Some(Value::Bool(flags.z)),
            "flags.c" => Some(Value::Bool(flags.c)),
            "flags.v" => Some(Value::Bool(flags.v)),
            _ => {
                let n: u8 = path.strip_prefix('r')?.parse().ok()?;
                (n <= 14).then(|| Value::U32(self.regs.get(mode, n)))
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
