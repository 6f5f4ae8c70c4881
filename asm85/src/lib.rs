//! Two-pass assembler for Intel 8085 source.
//!
//! The entry point is [`assemble`], which takes source text and always
//! returns a [`prog85::Program`]: a 64 KiB image plus symbol table,
//! listing, line↔address maps and every diagnostic collected along the
//! way. Nothing aborts early: a malformed line costs one diagnostic and
//! three reserved bytes, so the addresses of everything after it stay
//! stable and editor tooling can keep rendering.
//!
//! # Source language
//!
//! A line is `[label:] [statement] [; comment]`. Mnemonics, register
//! names, directives and symbols are case-insensitive.
//!
//! ## Directives
//!
//!  Directive | Effect | Example
//! -----------|--------|--------
//! `ORG n`    | Move the location counter; the first `ORG` fixes the program origin | `ORG 8000H`
//! `DB ...`   | Emit bytes: numbers, strings, or a symbol's low byte | `DB 'HI', 0DH, 0AH`
//! `DS n`     | Reserve `n` bytes (left zeroed) | `DS 16`
//! `NAME EQU n` | Bind `NAME` to a constant; the location counter is untouched | `COUNT EQU 05H`
//! `END`      | Stop assembling | `END`
//!
//! ## Numeric literals
//!
//! The radix suffix wins: `1FH` hex, `17O`/`17Q` octal, `1010B` binary,
//! `99D` or bare `99` decimal. A letter-led run of hex digits with an `H`
//! suffix (`FFFFH`) also reads as a number.
//!
//! ## Registers
//!
//! `A B C D E H L` plus the memory pseudo-register `M` (the byte at
//! `(HL)`). Register pairs are written `B`, `D`, `H`, `SP`, `PSW` as in
//! `PUSH B` or `LXI SP, 0FFFFH`; the long spellings `BC`/`DE`/`HL` are
//! also accepted.
//!
//! ```
//! use mpu85::Processor;
//!
//! let program = asm85::assemble("MVI A, 05H\nADI 03H\nHLT\n");
//! assert!(!program.has_errors());
//!
//! let mut cpu = Processor::from_program(&program);
//! cpu.run(None, None);
//! assert_eq!(cpu.core().regs.a, 0x08);
//! ```

pub mod ast;

mod assembler;
mod parser;

pub use assembler::assemble;
pub use parser::{parse_source, scan_number};
