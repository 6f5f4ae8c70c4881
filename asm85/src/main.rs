use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use mpu85::{Processor, StopReason};
use prog85::Program;

/// Assemble (and optionally run) an Intel 8085 source file.
#[derive(Parser)]
#[command(name = "asm85", version, about)]
struct Args {
    /// Source file (.asm, .a85, .8085)
    input: PathBuf,

    /// Print the listing after assembly
    #[arg(short, long)]
    listing: bool,

    /// Print the symbol table after assembly
    #[arg(short, long)]
    symbols: bool,

    /// Run the program after a clean assembly
    #[arg(short, long)]
    run: bool,

    /// Step limit for --run; 0 removes the bound
    #[arg(long, default_value_t = mpu85::constants::DEFAULT_STEP_LIMIT)]
    limit: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match drive(&args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("asm85: {:#}", error);
            ExitCode::from(2)
        }
    }
}

fn drive(args: &Args) -> anyhow::Result<ExitCode> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let program = asm85::assemble(&source);

    for diagnostic in &program.diagnostics {
        eprintln!("{}: {}", args.input.display(), diagnostic);
    }
    if args.listing {
        print_listing(&program);
    }
    if args.symbols {
        print_symbols(&program);
    }

    if program.has_errors() {
        return Ok(ExitCode::from(1));
    }
    if !args.run {
        return Ok(ExitCode::SUCCESS);
    }

    let mut cpu = Processor::from_program(&program);
    let limit = if args.limit == 0 { None } else { Some(args.limit) };
    cpu.set_step_limit(limit);
    let result = cpu.run(None, None);

    let core = cpu.core();
    println!(
        "A={:02X} B={:02X} C={:02X} D={:02X} E={:02X} H={:02X} L={:02X}  \
         SP={:04X} PC={:04X}  S={} Z={} AC={} P={} CY={}  cycles={}",
        core.regs.a,
        core.regs.b,
        core.regs.c,
        core.regs.d,
        core.regs.e,
        core.regs.h,
        core.regs.l,
        core.sp,
        core.pc,
        core.flags.s as u8,
        core.flags.z as u8,
        core.flags.ac as u8,
        core.flags.p as u8,
        core.flags.cy as u8,
        core.cycles,
    );

    Ok(match result.stop_reason {
        StopReason::Halted => ExitCode::SUCCESS,
        StopReason::Cancelled => ExitCode::from(130),
        StopReason::Breakpoint(_) | StopReason::WatchHit(_) => ExitCode::SUCCESS,
        StopReason::StepLimit => {
            eprintln!("asm85: step limit of {} exceeded", args.limit);
            ExitCode::from(2)
        }
        StopReason::Error(error) => {
            eprintln!("asm85: runtime error: {}", error);
            ExitCode::from(2)
        }
    })
}

fn print_listing(program: &Program) {
    for row in &program.listing {
        let bytes: String = row
            .bytes
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:04X}  {:<9}  {}", row.addr, bytes, row.text);
    }
}

fn print_symbols(program: &Program) {
    let mut symbols: Vec<_> = program.symbols.iter().collect();
    symbols.sort_by_key(|symbol| symbol.value);
    for symbol in symbols {
        println!(
            "{:04X}  {}  ({} reference{})",
            symbol.value,
            symbol.name,
            symbol.references.len(),
            if symbol.references.len() == 1 { "" } else { "s" }
        );
    }
}
