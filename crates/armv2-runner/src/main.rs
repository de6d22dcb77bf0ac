//! Headless launcher for the ARMv2 core.
//!
//! Loads a boot ROM into a freshly constructed `Cpu`, runs it for up to
//! `--max-cycles` instructions, and exits with a status code describing
//! what happened. No windowed frontend: this core has no video or input
//! peripherals, just the coprocessor bus.

mod rom;

use std::path::PathBuf;
use std::process;

use cpu_armv2::{Cpu, HardwareManager, Lifecycle};
use emu_core::Observable;

const DEFAULT_MEMORY_BYTES: usize = 1024 * 1024;
const DEFAULT_MAX_CYCLES: u64 = 1_000_000;
const HW_MANAGER_SLOT: u8 = 0;

struct CliArgs {
    rom_path: PathBuf,
    mem_bytes: usize,
    trace: bool,
    max_cycles: u64,
    dump_state: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut rom_path = None;
    let mut mem_bytes = DEFAULT_MEMORY_BYTES;
    let mut trace = false;
    let mut max_cycles = DEFAULT_MAX_CYCLES;
    let mut dump_state = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--rom" => {
                let path = iter.next().ok_or("--rom requires a path argument")?;
                rom_path = Some(PathBuf::from(path));
            }
            "--mem" => {
                let value = iter.next().ok_or("--mem requires a byte count")?;
                mem_bytes = value.parse().map_err(|_| format!("invalid --mem value: {value}"))?;
            }
            "--max-cycles" => {
                let value = iter.next().ok_or("--max-cycles requires a count")?;
                max_cycles = value.parse().map_err(|_| format!("invalid --max-cycles value: {value}"))?;
            }
            "--trace" => trace = true,
            "--dump-state" => dump_state = true,
            other => return Err(format!("unrecognized argument: {other}")),
        }
    }

    Ok(CliArgs {
        rom_path: rom_path.ok_or("--rom <path> is required")?,
        mem_bytes,
        trace,
        max_cycles,
        dump_state,
    })
}

fn run(args: CliArgs) -> Result<u64, String> {
    let rom = rom::read(&args.rom_path)?;

    let mut cpu = Cpu::new(args.mem_bytes).map_err(|status| format!("failed to allocate CPU memory: {status}"))?;
    cpu.load_rom(&rom).map_err(|status| format!("failed to load ROM: {status}"))?;
    cpu.attach_coprocessor(HW_MANAGER_SLOT, Box::new(HardwareManager::new(0)))
        .map_err(|status| format!("failed to attach hardware manager: {status}"))?;
    cpu.start().map_err(|status| format!("failed to start CPU: {status}"))?;

    let mut executed = 0u64;
    while executed < args.max_cycles && cpu.lifecycle() == Lifecycle::Running {
        if args.trace {
            let pc = cpu.registers().pc_address();
            match cpu.memory().fetch_word(pc) {
                Ok(word) => eprintln!("{pc:08x}: {word:08x}"),
                Err(_) => eprintln!("{pc:08x}: <unmapped>"),
            }
        }
        cpu.step().map_err(|status| format!("execution failed: {status}"))?;
        executed += 1;
    }

    if args.dump_state {
        for path in cpu.query_paths() {
            if let Some(value) = cpu.query(path) {
                eprintln!("{path} = {value}");
            }
        }
    }

    Ok(executed)
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("armv2-runner: {err}");
            eprintln!(
                "usage: armv2-runner --rom <path> [--mem <bytes>] [--trace] [--dump-state] [--max-cycles <n>]"
            );
            process::exit(2);
        }
    };

    match run(parsed) {
        Ok(executed) => {
            eprintln!("executed {executed} instructions");
        }
        Err(err) => {
            eprintln!("armv2-runner: {err}");
            process::exit(1);
        }
    }
}
