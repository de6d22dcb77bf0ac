//! Data-processing instructions: the 16 ALU opcodes, operand combination,
//! and the destination/flag write-back rules (including the R15-as-
//! destination special cases).

use crate::registers::{Flags, Mode, Registers};
use crate::shifter;

/// The 16 data-processing opcodes, in their `bits[24:21]` encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    And,
    Eor,
    Sub,
    Rsb,
    Add,
    Adc,
    Sbc,
    Rsc,
    Tst,
    Teq,
    Cmp,
    Cmn,
    Orr,
    Mov,
    Bic,
    Mvn,
}

impl AluOp {
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0xF {
            0x0 => Self::And,
            0x1 => Self::Eor,
            0x2 => Self::Sub,
            0x3 => Self::Rsb,
            0x4 => Self::Add,
            0x5 => Self::Adc,
            0x6 => Self::Sbc,
            0x7 => Self::Rsc,
            0x8 => Self::Tst,
            0x9 => Self::Teq,
            0xA => Self::Cmp,
            0xB => Self::Cmn,
            0xC => Self::Orr,
            0xD => Self::Mov,
            0xE => Self::Bic,
            0xF => Self::Mvn,
            _ => unreachable!("opcode field is only ever 4 bits"),
        }
    }

    /// The compare-like group: flags-only, destination register untouched
    /// regardless of the `S` bit.
    #[must_use]
    pub fn suppresses_destination(self) -> bool {
        matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }

    /// Whether this opcode's carry/overflow come from the 33-bit adder
    /// (arithmetic group) rather than from the shifter (logical group).
    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Sub | Self::Rsb | Self::Add | Self::Adc | Self::Sbc | Self::Rsc | Self::Cmp | Self::Cmn
        )
    }
}

/// Result of combining the two operands, before destination/flag
/// write-back is applied.
struct AluResult {
    value: u32,
    carry: bool,
    overflow: bool,
}

fn combine(op: AluOp, op1: u32, op2: u32, carry_in: bool, shifter_carry: bool) -> AluResult {
    // 33-bit addition: (a, b, extra_carry_in) -> (result, carry_out, overflow).
    let add33 = |a: u32, b: u32, cin: bool| -> (u32, bool, bool) {
        let sum = u64::from(a) + u64::from(b) + u64::from(cin);
        let result = sum as u32;
        let carry = sum > u64::from(u32::MAX);
        let overflow = ((a ^ b ^ 0x8000_0000) & (a ^ result)) >> 31 != 0;
        (result, carry, overflow)
    };

    match op {
        AluOp::And | AluOp::Tst => AluResult {
            value: op1 & op2,
            carry: shifter_carry,
            overflow: false,
        },
        AluOp::Eor | AluOp::Teq => AluResult {
            value: op1 ^ op2,
            carry: shifter_carry,
            overflow: false,
        },
        AluOp::Sub | AluOp::Cmp => {
            let (value, carry, overflow) = add33(op1, !op2, true);
            AluResult { value, carry, overflow }
        }
        AluOp::Rsb => {
            let (value, carry, overflow) = add33(op2, !op1, true);
            AluResult { value, carry, overflow }
        }
        AluOp::Add | AluOp::Cmn => {
            let (value, carry, overflow) = add33(op1, op2, false);
            AluResult { value, carry, overflow }
        }
        AluOp::Adc => {
            let (value, carry, overflow) = add33(op1, op2, carry_in);
            AluResult { value, carry, overflow }
        }
        AluOp::Sbc => {
            let (value, carry, overflow) = add33(op1, !op2, carry_in);
            AluResult { value, carry, overflow }
        }
        AluOp::Rsc => {
            let (value, carry, overflow) = add33(op2, !op1, carry_in);
            AluResult { value, carry, overflow }
        }
        AluOp::Orr => AluResult {
            value: op1 | op2,
            carry: shifter_carry,
            overflow: false,
        },
        AluOp::Mov => AluResult {
            value: op2,
            carry: shifter_carry,
            overflow: false,
        },
        AluOp::Bic => AluResult {
            value: op1 & !op2,
            carry: shifter_carry,
            overflow: false,
        },
        AluOp::Mvn => AluResult {
            value: !op2,
            carry: shifter_carry,
            overflow: false,
        },
    }
}

/// Execute a data-processing instruction whose condition has already been
/// checked. `instruction` is the raw word; `regs` is mutated in place.
/// Returns `true` if R15 was written directly (a `MOV`/`ADD`/... with
/// `Rd = R15`), telling the execution loop to skip its automatic PC
/// advance — the written address is already final.
pub fn execute(instruction: u32, regs: &mut Registers) -> bool {
    let s_bit = instruction & (1 << 20) != 0;
    let op = AluOp::from_bits(instruction >> 21);
    let rn = ((instruction >> 16) & 0xF) as u8;
    let rd = ((instruction >> 12) & 0xF) as u8;

    let mode = regs.mode();
    let current_flags = regs.flags();
    let (op2, shifter_carry) = shifter::operand2(instruction, regs, current_flags.c);
    let op1 = regs.get(mode, rn);

    let result = combine(op, op1, op2, current_flags.c, shifter_carry);
    let wrote_pc = rd == 15 && !op.suppresses_destination();

    if !op.suppresses_destination() {
        if rd == 15 {
            write_pc_destination(regs, mode, result.value, s_bit);
        } else {
            regs.set(mode, rd, result.value);
        }
    }

    if s_bit && rd != 15 {
        let new_flags = if op.is_arithmetic() {
            Flags {
                n: result.value & 0x8000_0000 != 0,
                z: result.value == 0,
                c: result.carry,
                v: result.overflow,
            }
        } else {
            Flags {
                n: result.value & 0x8000_0000 != 0,
                z: result.value == 0,
                c: result.carry,
                v: current_flags.v,
            }
        };
        regs.set_flags(new_flags);
    }

    wrote_pc
}

/// Write-back when the destination is R15: the PC, flags, interrupt masks
/// and mode may all change in one instruction, gated by `S` and the
/// current privilege level.
fn write_pc_destination(regs: &mut Registers, mode: Mode, result: u32, s_bit: bool) {
    use crate::registers::{PC_PROTECTED_BITS, PC_UNPROTECTED_BITS};

    if !s_bit {
        regs.set_pc_address(result & PC_UNPROTECTED_BITS);
        return;
    }

    if mode.is_privileged() {
        regs.set_pc_packed(result);
    } else {
        let packed = (regs.pc_packed() & PC_PROTECTED_BITS) | (result & PC_UNPROTECTED_BITS);
        regs.set_pc_packed(packed);
    }
}
