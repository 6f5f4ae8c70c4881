//! Opcode-to-text disassembly over the decode table. The rendered text
//! uses assembler syntax (`H`-suffixed hex operands), so feeding a line
//! back through the assembler reproduces the original bytes.

use num_traits::FromPrimitive;

use crate::isa::{self, Cycles, Encoding, Shape};
use crate::registers::Reg;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disassembly {
    pub text: String,
    pub len: u8,
    pub cycles: Cycles,
    pub description: &'static str,
}

/// Renders a hex byte the way the assembler reads it back (`05H`, `0FFH`).
fn hex8(value: u8) -> String {
    let digits = format!("{:02X}", value);
    if digits.as_bytes()[0].is_ascii_alphabetic() {
        format!("0{}H", digits)
    } else {
        format!("{}H", digits)
    }
}

fn hex16(value: u16) -> String {
    let digits = format!("{:04X}", value);
    if digits.as_bytes()[0].is_ascii_alphabetic() {
        format!("0{}H", digits)
    } else {
        format!("{}H", digits)
    }
}

/// Decodes the instruction at `addr`. Reads wrap around the end of the
/// image. Returns `None` on an undefined opcode byte.
pub fn disassemble_at(memory: &[u8], addr: u16) -> Option<Disassembly> {
    if memory.is_empty() {
        return None;
    }
    let at = |offset: u16| memory[addr.wrapping_add(offset) as usize % memory.len()];

    let op = at(0);
    let info = isa::decode(op)?;
    let def = info.def;
    let lo = at(1);
    let imm16 = u16::from_le_bytes([lo, at(2)]);

    let text = match def.encoding {
        Encoding::Fixed => match def.shape {
            Shape::Imm8 | Shape::Port8 => format!("{} {}", def.mnemonic, hex8(lo)),
            Shape::Addr16 => format!("{} {}", def.mnemonic, hex16(imm16)),
            _ => def.mnemonic.to_string(),
        },
        Encoding::Src => {
            let reg = Reg::from_u8(op & 0x07)?;
            format!("{} {}", def.mnemonic, reg.name())
        }
        Encoding::Dst => {
            let reg = Reg::from_u8((op >> 3) & 0x07)?;
            match def.shape {
                Shape::RegImm8 => format!("{} {}, {}", def.mnemonic, reg.name(), hex8(lo)),
                _ => format!("{} {}", def.mnemonic, reg.name()),
            }
        }
        Encoding::DstSrc => {
            let dst = Reg::from_u8((op >> 3) & 0x07)?;
            let src = Reg::from_u8(op & 0x07)?;
            format!("{} {}, {}", def.mnemonic, dst.name(), src.name())
        }
        Encoding::Pair => {
            let pair = def.pairs.pair_for_code((op >> 4) & 0b11)?;
            match def.shape {
                Shape::RegPairImm16 => {
                    format!("{} {}, {}", def.mnemonic, pair.name(), hex16(imm16))
                }
                _ => format!("{} {}", def.mnemonic, pair.name()),
            }
        }
        Encoding::Rst => format!("{} {}", def.mnemonic, (op >> 3) & 0x07),
    };

    Some(Disassembly {
        text,
        len: def.len,
        cycles: info.cycles,
        description: def.desc,
    })
}
