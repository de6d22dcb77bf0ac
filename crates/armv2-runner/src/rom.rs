//! Boot ROM file reading. The only contract that matters beyond this
//! module's boundary is "read a file into bytes suitable for filling
//! page 0" — `Cpu::load_rom` enforces the minimum size and memory
//! permissions on the receiving end.

use std::fs;
use std::path::Path;

pub fn read(path: &Path) -> Result<Vec<u8>, String> {
    fs::read(path).map_err(|err| format!("failed to read ROM file {}: {err}", path.display()))
}
