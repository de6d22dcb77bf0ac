//! Core traits and types shared by the ARMv2 emulation crates.
//!
//! This is the minimal slice of `emu-core` that a single self-contained CPU
//! core needs: a cycle unit and an observability trait for inspecting
//! register/memory state without disturbing it. The bus/tickable/clock
//! abstractions used by multi-chip systems elsewhere in the workspace don't
//! apply here — the ARMv2 core owns its memory outright (see `cpu-armv2`).

mod observable;
mod ticks;

pub use observable::{Observable, Value};
pub use ticks::Ticks;
