//! Static 8085 instruction database, keyed by mnemonic, plus the
//! 256-entry opcode decode table derived from it at startup.
//!
//! The mnemonic map drives assembly (operand shapes, opcode synthesis) and
//! hover/explain tooling; the decode table drives execution and
//! disassembly. Register and register-pair operands fold into the base
//! opcode as 3-bit and 2-bit fields (`MOV r1, r2` is `0x40 | r1 << 3 | r2`).

use lazy_static::lazy_static;
use phf::phf_map;

use crate::constants::{FLAGS_ALL, FLAGS_CY_ONLY, FLAGS_NONE, FLAGS_NO_CY};
use crate::registers::{Reg, RegPair};

/// Canonical operand shape of a mnemonic.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shape {
    None,
    Reg,
    RegReg,
    RegImm8,
    RegPair,
    RegPairImm16,
    Imm8,
    Addr16,
    Port8,
}

/// Which opcode bit field the register operands fold into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Encoding {
    /// No folding; the base byte is the opcode.
    Fixed,
    /// One register in bits 0-2.
    Src,
    /// One register in bits 3-5.
    Dst,
    /// Destination in bits 3-5, source in bits 0-2.
    DstSrc,
    /// Register pair in bits 4-5.
    Pair,
    /// Restart vector in bits 3-5.
    Rst,
}

/// Register pairs a `Pair` encoding admits. Field code 3 means `SP` or
/// `PSW` depending on the instruction; `LDAX`/`STAX` only take `B` and `D`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PairSet {
    None,
    WithSp,
    WithPsw,
    IndexOnly,
}

impl PairSet {
    /// Decodes a 2-bit pair field under this set.
    pub fn pair_for_code(self, code: u8) -> Option<RegPair> {
        match (self, code & 0b11) {
            (PairSet::None, _) => None,
            (_, 0b00) => Some(RegPair::BC),
            (_, 0b01) => Some(RegPair::DE),
            (PairSet::IndexOnly, _) => None,
            (_, 0b10) => Some(RegPair::HL),
            (PairSet::WithSp, _) => Some(RegPair::SP),
            (PairSet::WithPsw, _) => Some(RegPair::PSW),
        }
    }

    /// Whether this set admits the given pair.
    pub fn admits(self, pair: RegPair) -> bool {
        match self {
            PairSet::None => false,
            PairSet::WithSp => pair != RegPair::PSW,
            PairSet::WithPsw => pair != RegPair::SP,
            PairSet::IndexOnly => matches!(pair, RegPair::BC | RegPair::DE),
        }
    }
}

/// T-state cost. Conditional branches pay different prices depending on
/// whether they are taken.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cycles {
    Fixed(u8),
    Branch { taken: u8, not_taken: u8 },
}

impl Cycles {
    pub fn taken(self) -> u8 {
        match self {
            Cycles::Fixed(n) => n,
            Cycles::Branch { taken, .. } => taken,
        }
    }

    pub fn not_taken(self) -> u8 {
        match self {
            Cycles::Fixed(n) => n,
            Cycles::Branch { not_taken, .. } => not_taken,
        }
    }
}

/// One instruction-database entry.
#[derive(Debug)]
pub struct InstrDef {
    pub mnemonic: &'static str,
    pub shape: Shape,
    pub encoding: Encoding,
    pub pairs: PairSet,
    /// Base opcode before operand fields are folded in.
    pub base: u8,
    /// Instruction length in bytes (1-3).
    pub len: u8,
    pub cycles: Cycles,
    /// T-states when the `M` operand is used; 0 when no M form exists.
    pub m_cycles: u8,
    /// Flag bits (`constants::FLAG_*`) the instruction can modify.
    pub flags: u8,
    /// One-line description for hover and explain output.
    pub desc: &'static str,
}

#[allow(clippy::too_many_arguments)]
const fn def(
    mnemonic: &'static str,
    shape: Shape,
    encoding: Encoding,
    pairs: PairSet,
    base: u8,
    len: u8,
    cycles: Cycles,
    m_cycles: u8,
    flags: u8,
    desc: &'static str,
) -> InstrDef {
    InstrDef {
        mnemonic,
        shape,
        encoding,
        pairs,
        base,
        len,
        cycles,
        m_cycles,
        flags,
        desc,
    }
}

const F4: Cycles = Cycles::Fixed(4);
const F6: Cycles = Cycles::Fixed(6);
const F7: Cycles = Cycles::Fixed(7);
const F10: Cycles = Cycles::Fixed(10);

/// The mnemonic database. Every documented 8085 instruction, including
/// `RIM`/`SIM`; T-states are the 8085 counts.
pub static MNEMONICS: phf::Map<&'static str, InstrDef> = phf_map! {
    // Data transfer
    "MOV"  => def("MOV", Shape::RegReg, Encoding::DstSrc, PairSet::None, 0x40, 1, F4, 7, FLAGS_NONE,
                  "Copy between 8-bit registers; M addresses the byte at (HL)"),
    "MVI"  => def("MVI", Shape::RegImm8, Encoding::Dst, PairSet::None, 0x06, 2, F7, 10, FLAGS_NONE,
                  "Load an 8-bit immediate into a register or (HL)"),
    "LXI"  => def("LXI", Shape::RegPairImm16, Encoding::Pair, PairSet::WithSp, 0x01, 3, F10, 0, FLAGS_NONE,
                  "Load a 16-bit immediate into a register pair"),
    "LDA"  => def("LDA", Shape::Addr16, Encoding::Fixed, PairSet::None, 0x3A, 3, Cycles::Fixed(13), 0, FLAGS_NONE,
                  "Load the accumulator from a direct address"),
    "STA"  => def("STA", Shape::Addr16, Encoding::Fixed, PairSet::None, 0x32, 3, Cycles::Fixed(13), 0, FLAGS_NONE,
                  "Store the accumulator to a direct address"),
    "LHLD" => def("LHLD", Shape::Addr16, Encoding::Fixed, PairSet::None, 0x2A, 3, Cycles::Fixed(16), 0, FLAGS_NONE,
                  "Load HL from a direct address, low byte first"),
    "SHLD" => def("SHLD", Shape::Addr16, Encoding::Fixed, PairSet::None, 0x22, 3, Cycles::Fixed(16), 0, FLAGS_NONE,
                  "Store HL to a direct address, low byte first"),
    "LDAX" => def("LDAX", Shape::RegPair, Encoding::Pair, PairSet::IndexOnly, 0x0A, 1, F7, 0, FLAGS_NONE,
                  "Load the accumulator from the address in BC or DE"),
    "STAX" => def("STAX", Shape::RegPair, Encoding::Pair, PairSet::IndexOnly, 0x02, 1, F7, 0, FLAGS_NONE,
                  "Store the accumulator to the address in BC or DE"),
    "XCHG" => def("XCHG", Shape::None, Encoding::Fixed, PairSet::None, 0xEB, 1, F4, 0, FLAGS_NONE,
                  "Exchange DE with HL"),

    // Arithmetic
    "ADD"  => def("ADD", Shape::Reg, Encoding::Src, PairSet::None, 0x80, 1, F4, 7, FLAGS_ALL,
                  "Add a register to the accumulator"),
    "ADC"  => def("ADC", Shape::Reg, Encoding::Src, PairSet::None, 0x88, 1, F4, 7, FLAGS_ALL,
                  "Add a register and the carry flag to the accumulator"),
    "SUB"  => def("SUB", Shape::Reg, Encoding::Src, PairSet::None, 0x90, 1, F4, 7, FLAGS_ALL,
                  "Subtract a register from the accumulator"),
    "SBB"  => def("SBB", Shape::Reg, Encoding::Src, PairSet::None, 0x98, 1, F4, 7, FLAGS_ALL,
                  "Subtract a register and the borrow from the accumulator"),
    "ADI"  => def("ADI", Shape::Imm8, Encoding::Fixed, PairSet::None, 0xC6, 2, F7, 0, FLAGS_ALL,
                  "Add an immediate to the accumulator"),
    "ACI"  => def("ACI", Shape::Imm8, Encoding::Fixed, PairSet::None, 0xCE, 2, F7, 0, FLAGS_ALL,
                  "Add an immediate and the carry flag to the accumulator"),
    "SUI"  => def("SUI", Shape::Imm8, Encoding::Fixed, PairSet::None, 0xD6, 2, F7, 0, FLAGS_ALL,
                  "Subtract an immediate from the accumulator"),
    "SBI"  => def("SBI", Shape::Imm8, Encoding::Fixed, PairSet::None, 0xDE, 2, F7, 0, FLAGS_ALL,
                  "Subtract an immediate and the borrow from the accumulator"),
    "INR"  => def("INR", Shape::Reg, Encoding::Dst, PairSet::None, 0x04, 1, F4, 10, FLAGS_NO_CY,
                  "Increment a register or (HL); carry is untouched"),
    "DCR"  => def("DCR", Shape::Reg, Encoding::Dst, PairSet::None, 0x05, 1, F4, 10, FLAGS_NO_CY,
                  "Decrement a register or (HL); carry is untouched"),
    "INX"  => def("INX", Shape::RegPair, Encoding::Pair, PairSet::WithSp, 0x03, 1, F6, 0, FLAGS_NONE,
                  "Increment a register pair; no flags are affected"),
    "DCX"  => def("DCX", Shape::RegPair, Encoding::Pair, PairSet::WithSp, 0x0B, 1, F6, 0, FLAGS_NONE,
                  "Decrement a register pair; no flags are affected"),
    "DAD"  => def("DAD", Shape::RegPair, Encoding::Pair, PairSet::WithSp, 0x09, 1, F10, 0, FLAGS_CY_ONLY,
                  "Add a register pair to HL; only carry is affected"),
    "DAA"  => def("DAA", Shape::None, Encoding::Fixed, PairSet::None, 0x27, 1, F4, 0, FLAGS_ALL,
                  "Decimal-adjust the accumulator after BCD arithmetic"),

    // Logical
    "ANA"  => def("ANA", Shape::Reg, Encoding::Src, PairSet::None, 0xA0, 1, F4, 7, FLAGS_ALL,
                  "AND a register into the accumulator; carry clears, aux carry sets"),
    "XRA"  => def("XRA", Shape::Reg, Encoding::Src, PairSet::None, 0xA8, 1, F4, 7, FLAGS_ALL,
                  "Exclusive-OR a register into the accumulator; carries clear"),
    "ORA"  => def("ORA", Shape::Reg, Encoding::Src, PairSet::None, 0xB0, 1, F4, 7, FLAGS_ALL,
                  "OR a register into the accumulator; carries clear"),
    "CMP"  => def("CMP", Shape::Reg, Encoding::Src, PairSet::None, 0xB8, 1, F4, 7, FLAGS_ALL,
                  "Compare a register with the accumulator; the result is discarded"),
    "ANI"  => def("ANI", Shape::Imm8, Encoding::Fixed, PairSet::None, 0xE6, 2, F7, 0, FLAGS_ALL,
                  "AND an immediate into the accumulator"),
    "XRI"  => def("XRI", Shape::Imm8, Encoding::Fixed, PairSet::None, 0xEE, 2, F7, 0, FLAGS_ALL,
                  "Exclusive-OR an immediate into the accumulator"),
    "ORI"  => def("ORI", Shape::Imm8, Encoding::Fixed, PairSet::None, 0xF6, 2, F7, 0, FLAGS_ALL,
                  "OR an immediate into the accumulator"),
    "CPI"  => def("CPI", Shape::Imm8, Encoding::Fixed, PairSet::None, 0xFE, 2, F7, 0, FLAGS_ALL,
                  "Compare an immediate with the accumulator; the result is discarded"),
    "RLC"  => def("RLC", Shape::None, Encoding::Fixed, PairSet::None, 0x07, 1, F4, 0, FLAGS_CY_ONLY,
                  "Rotate the accumulator left; bit 7 goes to carry and bit 0"),
    "RRC"  => def("RRC", Shape::None, Encoding::Fixed, PairSet::None, 0x0F, 1, F4, 0, FLAGS_CY_ONLY,
                  "Rotate the accumulator right; bit 0 goes to carry and bit 7"),
    "RAL"  => def("RAL", Shape::None, Encoding::Fixed, PairSet::None, 0x17, 1, F4, 0, FLAGS_CY_ONLY,
                  "Rotate the accumulator left through the carry flag"),
    "RAR"  => def("RAR", Shape::None, Encoding::Fixed, PairSet::None, 0x1F, 1, F4, 0, FLAGS_CY_ONLY,
                  "Rotate the accumulator right through the carry flag"),
    "CMA"  => def("CMA", Shape::None, Encoding::Fixed, PairSet::None, 0x2F, 1, F4, 0, FLAGS_NONE,
                  "Complement the accumulator"),
    "CMC"  => def("CMC", Shape::None, Encoding::Fixed, PairSet::None, 0x3F, 1, F4, 0, FLAGS_CY_ONLY,
                  "Complement the carry flag"),
    "STC"  => def("STC", Shape::None, Encoding::Fixed, PairSet::None, 0x37, 1, F4, 0, FLAGS_CY_ONLY,
                  "Set the carry flag"),

    // Jumps
    "JMP"  => def("JMP", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xC3, 3, F10, 0, FLAGS_NONE,
                  "Unconditional jump"),
    "JNZ"  => def("JNZ", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xC2, 3, Cycles::Branch { taken: 10, not_taken: 7 }, 0, FLAGS_NONE,
                  "Jump if the zero flag is clear"),
    "JZ"   => def("JZ", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xCA, 3, Cycles::Branch { taken: 10, not_taken: 7 }, 0, FLAGS_NONE,
                  "Jump if the zero flag is set"),
    "JNC"  => def("JNC", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xD2, 3, Cycles::Branch { taken: 10, not_taken: 7 }, 0, FLAGS_NONE,
                  "Jump if the carry flag is clear"),
    "JC"   => def("JC", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xDA, 3, Cycles::Branch { taken: 10, not_taken: 7 }, 0, FLAGS_NONE,
                  "Jump if the carry flag is set"),
    "JPO"  => def("JPO", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xE2, 3, Cycles::Branch { taken: 10, not_taken: 7 }, 0, FLAGS_NONE,
                  "Jump if parity is odd"),
    "JPE"  => def("JPE", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xEA, 3, Cycles::Branch { taken: 10, not_taken: 7 }, 0, FLAGS_NONE,
                  "Jump if parity is even"),
    "JP"   => def("JP", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xF2, 3, Cycles::Branch { taken: 10, not_taken: 7 }, 0, FLAGS_NONE,
                  "Jump if the sign flag is clear"),
    "JM"   => def("JM", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xFA, 3, Cycles::Branch { taken: 10, not_taken: 7 }, 0, FLAGS_NONE,
                  "Jump if the sign flag is set"),

    // Calls and returns
    "CALL" => def("CALL", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xCD, 3, Cycles::Fixed(18), 0, FLAGS_NONE,
                  "Push the return address and jump to a subroutine"),
    "CNZ"  => def("CNZ", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xC4, 3, Cycles::Branch { taken: 18, not_taken: 9 }, 0, FLAGS_NONE,
                  "Call if the zero flag is clear"),
    "CZ"   => def("CZ", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xCC, 3, Cycles::Branch { taken: 18, not_taken: 9 }, 0, FLAGS_NONE,
                  "Call if the zero flag is set"),
    "CNC"  => def("CNC", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xD4, 3, Cycles::Branch { taken: 18, not_taken: 9 }, 0, FLAGS_NONE,
                  "Call if the carry flag is clear"),
    "CC"   => def("CC", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xDC, 3, Cycles::Branch { taken: 18, not_taken: 9 }, 0, FLAGS_NONE,
                  "Call if the carry flag is set"),
    "CPO"  => def("CPO", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xE4, 3, Cycles::Branch { taken: 18, not_taken: 9 }, 0, FLAGS_NONE,
                  "Call if parity is odd"),
    "CPE"  => def("CPE", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xEC, 3, Cycles::Branch { taken: 18, not_taken: 9 }, 0, FLAGS_NONE,
                  "Call if parity is even"),
    "CP"   => def("CP", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xF4, 3, Cycles::Branch { taken: 18, not_taken: 9 }, 0, FLAGS_NONE,
                  "Call if the sign flag is clear"),
    "CM"   => def("CM", Shape::Addr16, Encoding::Fixed, PairSet::None, 0xFC, 3, Cycles::Branch { taken: 18, not_taken: 9 }, 0, FLAGS_NONE,
                  "Call if the sign flag is set"),
    "RET"  => def("RET", Shape::None, Encoding::Fixed, PairSet::None, 0xC9, 1, F10, 0, FLAGS_NONE,
                  "Pop the return address and jump to it"),
    "RNZ"  => def("RNZ", Shape::None, Encoding::Fixed, PairSet::None, 0xC0, 1, Cycles::Branch { taken: 12, not_taken: 6 }, 0, FLAGS_NONE,
                  "Return if the zero flag is clear"),
    "RZ"   => def("RZ", Shape::None, Encoding::Fixed, PairSet::None, 0xC8, 1, Cycles::Branch { taken: 12, not_taken: 6 }, 0, FLAGS_NONE,
                  "Return if the zero flag is set"),
    "RNC"  => def("RNC", Shape::None, Encoding::Fixed, PairSet::None, 0xD0, 1, Cycles::Branch { taken: 12, not_taken: 6 }, 0, FLAGS_NONE,
                  "Return if the carry flag is clear"),
    "RC"   => def("RC", Shape::None, Encoding::Fixed, PairSet::None, 0xD8, 1, Cycles::Branch { taken: 12, not_taken: 6 }, 0, FLAGS_NONE,
                  "Return if the carry flag is set"),
    "RPO"  => def("RPO", Shape::None, Encoding::Fixed, PairSet::None, 0xE0, 1, Cycles::Branch { taken: 12, not_taken: 6 }, 0, FLAGS_NONE,
                  "Return if parity is odd"),
    "RPE"  => def("RPE", Shape::None, Encoding::Fixed, PairSet::None, 0xE8, 1, Cycles::Branch { taken: 12, not_taken: 6 }, 0, FLAGS_NONE,
                  "Return if parity is even"),
    "RP"   => def("RP", Shape::None, Encoding::Fixed, PairSet::None, 0xF0, 1, Cycles::Branch { taken: 12, not_taken: 6 }, 0, FLAGS_NONE,
                  "Return if the sign flag is clear"),
    "RM"   => def("RM", Shape::None, Encoding::Fixed, PairSet::None, 0xF8, 1, Cycles::Branch { taken: 12, not_taken: 6 }, 0, FLAGS_NONE,
                  "Return if the sign flag is set"),
    "RST"  => def("RST", Shape::Imm8, Encoding::Rst, PairSet::None, 0xC7, 1, Cycles::Fixed(12), 0, FLAGS_NONE,
                  "Push the return address and jump to fixed vector 8*n"),
    "PCHL" => def("PCHL", Shape::None, Encoding::Fixed, PairSet::None, 0xE9, 1, F6, 0, FLAGS_NONE,
                  "Jump to the address in HL"),

    // Stack, I/O, machine control
    "PUSH" => def("PUSH", Shape::RegPair, Encoding::Pair, PairSet::WithPsw, 0xC5, 1, Cycles::Fixed(12), 0, FLAGS_NONE,
                  "Push a register pair or PSW onto the stack, high byte first"),
    "POP"  => def("POP", Shape::RegPair, Encoding::Pair, PairSet::WithPsw, 0xC1, 1, F10, 0, FLAGS_NONE,
                  "Pop a register pair or PSW; POP PSW restores all five flags"),
    "XTHL" => def("XTHL", Shape::None, Encoding::Fixed, PairSet::None, 0xE3, 1, Cycles::Fixed(16), 0, FLAGS_NONE,
                  "Exchange HL with the word on top of the stack"),
    "SPHL" => def("SPHL", Shape::None, Encoding::Fixed, PairSet::None, 0xF9, 1, F6, 0, FLAGS_NONE,
                  "Copy HL into the stack pointer"),
    "IN"   => def("IN", Shape::Port8, Encoding::Fixed, PairSet::None, 0xDB, 2, F10, 0, FLAGS_NONE,
                  "Read an input port into the accumulator"),
    "OUT"  => def("OUT", Shape::Port8, Encoding::Fixed, PairSet::None, 0xD3, 2, F10, 0, FLAGS_NONE,
                  "Write the accumulator to an output port"),
    "EI"   => def("EI", Shape::None, Encoding::Fixed, PairSet::None, 0xFB, 1, F4, 0, FLAGS_NONE,
                  "Enable interrupts, effective after the next instruction"),
    "DI"   => def("DI", Shape::None, Encoding::Fixed, PairSet::None, 0xF3, 1, F4, 0, FLAGS_NONE,
                  "Disable interrupts"),
    "HLT"  => def("HLT", Shape::None, Encoding::Fixed, PairSet::None, 0x76, 1, F7, 0, FLAGS_NONE,
                  "Halt until reset or interrupt"),
    "NOP"  => def("NOP", Shape::None, Encoding::Fixed, PairSet::None, 0x00, 1, F4, 0, FLAGS_NONE,
                  "No operation"),
    "RIM"  => def("RIM", Shape::None, Encoding::Fixed, PairSet::None, 0x20, 1, F4, 0, FLAGS_NONE,
                  "Read the interrupt masks and serial input into the accumulator"),
    "SIM"  => def("SIM", Shape::None, Encoding::Fixed, PairSet::None, 0x30, 1, F4, 0, FLAGS_NONE,
                  "Set the interrupt masks and serial output from the accumulator"),
};

/// Looks up a mnemonic, case-insensitively.
pub fn instruction_info(mnemonic: &str) -> Option<&'static InstrDef> {
    MNEMONICS.get(mnemonic.to_uppercase().as_str())
}

pub fn mnemonics() -> impl Iterator<Item = &'static InstrDef> {
    MNEMONICS.values()
}

// Opcode synthesis: fold operand fields into a base opcode.

#[inline]
pub fn fold_src(base: u8, r: Reg) -> u8 {
    base | r.code()
}

#[inline]
pub fn fold_dst(base: u8, r: Reg) -> u8 {
    base | (r.code() << 3)
}

#[inline]
pub fn fold_dst_src(base: u8, d: Reg, s: Reg) -> u8 {
    base | (d.code() << 3) | s.code()
}

#[inline]
pub fn fold_pair(base: u8, rp: RegPair) -> u8 {
    base | (rp.code() << 4)
}

#[inline]
pub fn fold_rst(base: u8, n: u8) -> u8 {
    base | ((n & 0x07) << 3)
}

/// One slot of the decode table: the database entry an opcode byte belongs
/// to, with the M-form T-state adjustment already applied.
#[derive(Clone, Copy, Debug)]
pub struct OpcodeInfo {
    pub def: &'static InstrDef,
    pub cycles: Cycles,
}

impl OpcodeInfo {
    pub fn len(&self) -> u8 {
        self.def.len
    }
}

fn m_adjusted(def: &'static InstrDef, uses_m: bool) -> Cycles {
    if uses_m && def.m_cycles != 0 {
        Cycles::Fixed(def.m_cycles)
    } else {
        def.cycles
    }
}

fn fill(table: &mut [Option<OpcodeInfo>; 256], op: u8, def: &'static InstrDef, cycles: Cycles) {
    debug_assert!(table[op as usize].is_none(), "opcode {:#04X} double-mapped", op);
    table[op as usize] = Some(OpcodeInfo { def, cycles });
}

fn build_decode() -> [Option<OpcodeInfo>; 256] {
    let mut table = [None; 256];
    for def in MNEMONICS.values() {
        match def.encoding {
            Encoding::Fixed => fill(&mut table, def.base, def, def.cycles),
            Encoding::Src => {
                for r in 0..8u8 {
                    fill(&mut table, def.base | r, def, m_adjusted(def, r == Reg::M.code()));
                }
            }
            Encoding::Dst => {
                for r in 0..8u8 {
                    fill(
                        &mut table,
                        def.base | (r << 3),
                        def,
                        m_adjusted(def, r == Reg::M.code()),
                    );
                }
            }
            Encoding::DstSrc => {
                for d in 0..8u8 {
                    for s in 0..8u8 {
                        let op = def.base | (d << 3) | s;
                        if op == 0x76 {
                            // that slot belongs to HLT
                            continue;
                        }
                        let uses_m = d == Reg::M.code() || s == Reg::M.code();
                        fill(&mut table, op, def, m_adjusted(def, uses_m));
                    }
                }
            }
            Encoding::Pair => {
                let codes: &[u8] = match def.pairs {
                    PairSet::IndexOnly => &[0b00, 0b01],
                    _ => &[0b00, 0b01, 0b10, 0b11],
                };
                for &rp in codes {
                    fill(&mut table, def.base | (rp << 4), def, def.cycles);
                }
            }
            Encoding::Rst => {
                for n in 0..8u8 {
                    fill(&mut table, def.base | (n << 3), def, def.cycles);
                }
            }
        }
    }
    table
}

lazy_static! {
    static ref DECODE: [Option<OpcodeInfo>; 256] = build_decode();
}

/// Fast decode of a fetched opcode byte. `None` for the ten undefined
/// bytes of the 8085 map.
#[inline]
pub fn decode(op: u8) -> Option<&'static OpcodeInfo> {
    DECODE[op as usize].as_ref()
}
