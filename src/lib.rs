//! Cycle-accurate Intel 8085 processor model.
//!
//! The crate is built around a static instruction database ([`isa`]) that
//! serves three consumers: the [`asm85`](../asm85/index.html) assembler
//! (operand shapes and opcode synthesis), the interpreter
//! ([`processor::Core`]), and the [`disasm`] module used by listings,
//! hover tooling and debugger UIs.
//!
//! # Programming model
//!
//! | State | Width | Notes |
//! |-------|-------|-------|
//! | A, B, C, D, E, H, L | 8 bit | `M` in an operand slot addresses the byte at `(HL)` |
//! | Flags S Z AC P CY   | 1 bit each | PSW byte layout is `S Z 0 AC 0 P 1 CY` |
//! | SP, PC              | 16 bit | |
//! | Memory              | 64 KiB | copied from a [`prog85::Program`] at reset |
//! | I/O ports           | 256 × 8 bit | optionally intercepted by an [`IoHandler`] |
//!
//! Execution is single-threaded and cooperative: [`Processor::step`] never
//! suspends, long [`Processor::run`] calls poll a shared cancellation flag
//! before each fetch, and host-raised interrupts are edges serviced between
//! instructions. T-state counting follows the 8085: conditional jumps,
//! calls and returns charge different counts taken versus not taken.
//!
//! ```
//! use mpu85::{disassemble_at, Processor};
//! use prog85::Program;
//!
//! let mut program = Program::new();
//! // MVI A, 2AH / HLT assembled by hand
//! program.memory[0] = 0x3E;
//! program.memory[1] = 0x2A;
//! program.memory[2] = 0x76;
//!
//! let mut cpu = Processor::from_program(&program);
//! cpu.run(None, None);
//! assert_eq!(cpu.core().regs.a, 0x2A);
//! assert_eq!(disassemble_at(&program.memory[..], 0).unwrap().text, "MVI A, 2AH");
//! ```

pub mod constants;
pub mod disasm;
pub mod isa;
pub mod processor;
pub mod registers;
pub mod trace;

pub use disasm::{disassemble_at, Disassembly};
pub use isa::{decode, instruction_info, Cycles, Encoding, InstrDef, OpcodeInfo, PairSet, Shape};
pub use processor::{
    Core, DelegateIo, ExecError, IoHandler, Processor, RunResult, StepResult, StopReason,
    TickEvent,
};
pub use registers::{Flags, ParseEnumError, Reg, RegPair, Registers};
pub use trace::{
    first_divergence, Coverage, CpuSnapshot, Divergence, MemWrite, Profiler, StepDelta, WatchRange,
};

#[cfg(test)]
mod test;
