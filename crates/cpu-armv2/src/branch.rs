//! Branch and branch-with-link.
//!
//! The execution loop always advances PC by 4 after an instruction. A
//! taken branch therefore needs to land the PC 4 bytes *before* its real
//! target so that the loop's unconditional `+4` produces the right
//! address — the "current PC minus 4" convention carried from the
//! original instruction decoder.

use crate::registers::{Mode, Registers};

const LINK_BIT: u32 = 1 << 24;

/// Execute a branch (or branch-with-link) whose condition already passed.
pub fn execute(instruction: u32, regs: &mut Registers) {
    let offset = sign_extend_24(instruction & 0x00FF_FFFF) << 2;
    // Real ARMv2 fetches two instructions ahead of the one executing;
    // the offset is relative to (address of this instruction) + 8, and
    // `PC_current` in the link calculation below refers to this same
    // pipeline-advanced value, not the bare fetch address.
    let pc_plus_8 = regs.pc_address().wrapping_add(8);
    let target = pc_plus_8.wrapping_add(offset as u32);

    if instruction & LINK_BIT != 0 {
        let mode = regs.mode();
        let return_addr = pc_plus_8.wrapping_sub(4);
        regs.set(mode, 14, return_addr);
    }

    regs.set_pc_address(target.wrapping_sub(4));
}

fn sign_extend_24(value: u32) -> i32 {
    if value & 0x0080_0000 != 0 {
        (value | 0xFF00_0000) as i32
    } else {
        value as i32
    }
}
