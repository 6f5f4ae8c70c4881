//! The two passes. Pass 1 walks statements with a location counter,
//! defining symbols and fixing every line's address (unknown mnemonics
//! reserve three bytes so later addresses stay stable). Pass 2 synthesises
//! opcodes, resolves references against the symbol table, fills the memory
//! image and builds the listing and the line↔address maps.
//!
//! Assembly never aborts: every problem becomes a diagnostic on the
//! program, and unresolved 16-bit references emit `0000H` so downstream
//! tooling still has an image to show.

use byteorder::{ByteOrder, LittleEndian};

use mpu85::isa::{self, Encoding, InstrDef, Shape};
use mpu85::{Reg, RegPair};
use prog85::{
    Diagnostic, DiagnosticKind, ListingRow, Program, Span, SymbolKind, MEMORY_SIZE,
};

use crate::ast::{DirectiveKind, Expr, Line, OperandNode, Stmt};
use crate::parser;

/// Assembles 8085 source into a [`Program`]. Errors never propagate as
/// `Err`; check [`Program::has_errors`].
pub fn assemble(source: &str) -> Program {
    let (lines, diagnostics) = parser::parse_source(source);
    let mut program = Program::new();
    program.diagnostics = diagnostics;

    let plans = pass1(&lines, &mut program);
    pass2(&lines, &plans, &mut program);
    program
}

/// Per-line outcome of pass 1.
struct LinePlan {
    /// Location counter at this line (for `ORG`, the target address).
    addr: u32,
    /// Bytes this line advances the location counter by.
    len: u16,
    /// False once `END` was seen or the location counter overflowed.
    active: bool,
}

fn pass1(lines: &[Line], program: &mut Program) -> Vec<LinePlan> {
    let mut lc: u32 = 0;
    let mut origin_set = false;
    let mut ended = false;
    let mut overflowed = false;
    let mut plans = Vec::with_capacity(lines.len());

    for line in lines {
        if ended || overflowed {
            plans.push(LinePlan {
                addr: lc,
                len: 0,
                active: false,
            });
            continue;
        }

        let is_equ = matches!(
            &line.stmt,
            Some(Stmt::Directive {
                kind: DirectiveKind::Equ,
                ..
            })
        );

        // A label binds to the location counter, except on an EQU line
        // where the name binds to the equated constant instead.
        if let Some((name, span)) = &line.label {
            if !is_equ && !program.symbols.define(name, lc as u16, SymbolKind::Label, *span) {
                program.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::DuplicateSymbol,
                    format!("symbol {} is already defined", name),
                    *span,
                ));
            }
        }

        let mut addr = lc;
        let mut len: u16 = 0;

        match &line.stmt {
            None => {}
            Some(Stmt::Directive {
                kind,
                operands,
                span,
            }) => match kind {
                DirectiveKind::Org => {
                    if let Some(value) = eval_const_operand(operands, *span, "ORG", program) {
                        lc = value as u32;
                        addr = lc;
                        if !origin_set {
                            program.origin = value;
                            origin_set = true;
                        }
                    }
                }
                DirectiveKind::Equ => match &line.label {
                    Some((name, name_span)) => {
                        let value =
                            eval_const_operand(operands, *span, "EQU", program).unwrap_or(0);
                        if !program
                            .symbols
                            .define(name, value, SymbolKind::Equate, *name_span)
                        {
                            program.diagnostics.push(Diagnostic::error(
                                DiagnosticKind::DuplicateSymbol,
                                format!("symbol {} is already defined", name),
                                *name_span,
                            ));
                        }
                    }
                    None => program.diagnostics.push(Diagnostic::error(
                        DiagnosticKind::BadOperand,
                        "EQU requires a name to bind",
                        *span,
                    )),
                },
                DirectiveKind::Db => len = db_length(operands),
                DirectiveKind::Ds => {
                    len = eval_const_operand(operands, *span, "DS", program).unwrap_or(0);
                }
                DirectiveKind::End => ended = true,
            },
            Some(Stmt::Instruction { mnemonic, span, .. }) => {
                match isa::instruction_info(mnemonic) {
                    Some(def) => len = def.len as u16,
                    None => {
                        program.diagnostics.push(Diagnostic::error(
                            DiagnosticKind::UnknownMnemonic,
                            format!("unknown mnemonic {}", mnemonic),
                            *span,
                        ));
                        // reserve three bytes so later addresses hold still
                        len = 3;
                    }
                }
            }
        }

        if addr + len as u32 > MEMORY_SIZE as u32 {
            let span = line
                .stmt
                .as_ref()
                .map(stmt_span)
                .or_else(|| line.label.as_ref().map(|(_, span)| *span))
                .unwrap_or_default();
            program.diagnostics.push(Diagnostic::error(
                DiagnosticKind::ValueOutOfRange,
                "location counter overflowed past FFFFH",
                span,
            ));
            overflowed = true;
            plans.push(LinePlan {
                addr,
                len: 0,
                active: false,
            });
            continue;
        }

        plans.push(LinePlan {
            addr,
            len,
            active: true,
        });
        lc = addr + len as u32;
    }

    plans
}

fn stmt_span(stmt: &Stmt) -> Span {
    match stmt {
        Stmt::Directive { span, .. } | Stmt::Instruction { span, .. } => *span,
    }
}

/// Number of bytes a `DB` line emits. Strings contribute their length;
/// every other operand contributes one byte.
fn db_length(operands: &[OperandNode]) -> u16 {
    operands
        .iter()
        .map(|operand| match operand {
            OperandNode::Str(bytes, _) => bytes.len() as u16,
            _ => 1,
        })
        .sum()
}

/// Evaluates the single operand of ORG/DS/EQU against the symbols known so
/// far. Forward references are errors here: the value fixes addresses.
fn eval_const_operand(
    operands: &[OperandNode],
    span: Span,
    what: &str,
    program: &mut Program,
) -> Option<u16> {
    if operands.is_empty() {
        program.diagnostics.push(Diagnostic::error(
            DiagnosticKind::MissingOperand,
            format!("{} expects a value", what),
            span,
        ));
        return None;
    }
    if operands.len() > 1 {
        program.diagnostics.push(Diagnostic::error(
            DiagnosticKind::ExtraOperand,
            format!("{} takes a single value", what),
            operands[1].span(),
        ));
        return None;
    }

    let value = match &operands[0] {
        OperandNode::Immediate(Expr::Num(value), _) => *value,
        OperandNode::Immediate(Expr::Sym(name), span) => {
            match program.symbols.reference(name, *span) {
                Some(value) => value as u32,
                None => {
                    program.diagnostics.push(Diagnostic::error(
                        DiagnosticKind::UndefinedSymbol,
                        format!("undefined symbol {}", name),
                        *span,
                    ));
                    return None;
                }
            }
        }
        other => {
            program.diagnostics.push(Diagnostic::error(
                DiagnosticKind::BadOperand,
                format!("{} expects a number or symbol", what),
                other.span(),
            ));
            return None;
        }
    };

    if value > 0xFFFF {
        program.diagnostics.push(Diagnostic::error(
            DiagnosticKind::ValueOutOfRange,
            format!("{} value {:X}H does not fit in 16 bits", what, value),
            operands[0].span(),
        ));
        return None;
    }
    Some(value as u16)
}

fn pass2(lines: &[Line], plans: &[LinePlan], program: &mut Program) {
    let mut written = vec![false; MEMORY_SIZE];

    for (line, plan) in lines.iter().zip(plans) {
        if !plan.active {
            continue;
        }
        let addr = plan.addr as u16;

        match &line.stmt {
            None => {
                if line.label.is_some() {
                    push_listing(program, addr, Vec::new(), line);
                }
            }
            Some(Stmt::Directive {
                kind,
                operands,
                span,
            }) => match kind {
                DirectiveKind::Db => {
                    let bytes = eval_db(operands, *span, program);
                    emit(program, &mut written, addr, &bytes, *span);
                    program
                        .line_to_addr
                        .insert(line.number, (addr, bytes.len() as u16));
                    push_listing(program, addr, bytes, line);
                }
                DirectiveKind::Org
                | DirectiveKind::Ds
                | DirectiveKind::Equ
                | DirectiveKind::End => {
                    push_listing(program, addr, Vec::new(), line);
                }
            },
            Some(Stmt::Instruction {
                mnemonic,
                operands,
                span,
            }) => {
                let bytes = match isa::instruction_info(mnemonic) {
                    // the unknown-mnemonic diagnostic was raised in pass 1
                    None => Vec::new(),
                    Some(def) => encode(def, operands, *span, program).unwrap_or_default(),
                };
                if !bytes.is_empty() {
                    emit(program, &mut written, addr, &bytes, *span);
                    program
                        .line_to_addr
                        .insert(line.number, (addr, bytes.len() as u16));
                    program.addr_to_line.insert(addr, line.number);
                }
                push_listing(program, addr, bytes, line);
            }
        }
    }
}

fn push_listing(program: &mut Program, addr: u16, bytes: Vec<u8>, line: &Line) {
    program.listing.push(ListingRow {
        addr,
        bytes,
        line: line.number,
        text: line.text.clone(),
    });
}

/// Writes emitted bytes into the image, warning once per statement when a
/// previously written byte is rewritten with a different value.
fn emit(program: &mut Program, written: &mut [bool], start: u16, bytes: &[u8], span: Span) {
    let mut overlap = false;
    let mut at = start as usize;

    for &byte in bytes {
        if at >= MEMORY_SIZE {
            // the overflow diagnostic was raised in pass 1
            break;
        }
        if written[at] && program.memory[at] != byte {
            overlap = true;
        }
        program.memory[at] = byte;
        written[at] = true;
        at += 1;
    }

    if overlap {
        program.diagnostics.push(Diagnostic::warning(
            DiagnosticKind::OriginOverlap,
            format!("overlapping code rewrites bytes at {:04X}H", start),
            span,
        ));
    }
}

/// Operand count for each shape.
fn arity(shape: Shape) -> usize {
    match shape {
        Shape::None => 0,
        Shape::Reg | Shape::RegPair | Shape::Imm8 | Shape::Addr16 | Shape::Port8 => 1,
        Shape::RegReg | Shape::RegImm8 | Shape::RegPairImm16 => 2,
    }
}

/// Synthesises the byte sequence for one instruction, or `None` when the
/// operands do not fit the mnemonic's shape. Value problems (range,
/// undefined symbols) still produce best-effort bytes.
fn encode(
    def: &'static InstrDef,
    operands: &[OperandNode],
    span: Span,
    program: &mut Program,
) -> Option<Vec<u8>> {
    let expected = arity(def.shape);
    if operands.len() < expected {
        program.diagnostics.push(Diagnostic::error(
            DiagnosticKind::MissingOperand,
            format!(
                "{} expects {} operand{}",
                def.mnemonic,
                expected,
                if expected == 1 { "" } else { "s" }
            ),
            span,
        ));
        return None;
    }
    if operands.len() > expected {
        program.diagnostics.push(Diagnostic::error(
            DiagnosticKind::ExtraOperand,
            format!("{} takes {} operand{}", def.mnemonic, expected, if expected == 1 { "" } else { "s" }),
            operands[expected].span(),
        ));
        return None;
    }

    match def.shape {
        Shape::None => Some(vec![def.base]),
        Shape::Reg => {
            let reg = expect_reg(def, &operands[0], program)?;
            Some(vec![match def.encoding {
                Encoding::Src => isa::fold_src(def.base, reg),
                _ => isa::fold_dst(def.base, reg),
            }])
        }
        Shape::RegReg => {
            let dst = expect_reg(def, &operands[0], program)?;
            let src = expect_reg(def, &operands[1], program)?;
            Some(vec![isa::fold_dst_src(def.base, dst, src)])
        }
        Shape::RegImm8 => {
            let reg = expect_reg(def, &operands[0], program)?;
            let value = eval_expr8(def, &operands[1], program)?;
            Some(vec![isa::fold_dst(def.base, reg), value])
        }
        Shape::RegPair => {
            let pair = expect_pair(def, &operands[0], program)?;
            Some(vec![isa::fold_pair(def.base, pair)])
        }
        Shape::RegPairImm16 => {
            let pair = expect_pair(def, &operands[0], program)?;
            let value = eval_expr16(def, &operands[1], program)?;
            let mut bytes = vec![isa::fold_pair(def.base, pair), 0, 0];
            LittleEndian::write_u16(&mut bytes[1..], value);
            Some(bytes)
        }
        Shape::Imm8 if def.encoding == Encoding::Rst => {
            let value = eval_expr(def, &operands[0], program)?;
            if value > 7 {
                program.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::ValueOutOfRange,
                    format!("RST vector must be 0-7, got {}", value),
                    operands[0].span(),
                ));
            }
            Some(vec![isa::fold_rst(def.base, value as u8)])
        }
        Shape::Imm8 | Shape::Port8 => {
            let value = eval_expr8(def, &operands[0], program)?;
            Some(vec![def.base, value])
        }
        Shape::Addr16 => {
            let value = eval_expr16(def, &operands[0], program)?;
            let mut bytes = vec![def.base, 0, 0];
            LittleEndian::write_u16(&mut bytes[1..], value);
            Some(bytes)
        }
    }
}

fn expect_reg(
    def: &InstrDef,
    operand: &OperandNode,
    program: &mut Program,
) -> Option<Reg> {
    match operand {
        OperandNode::Reg(reg, _) => Some(*reg),
        other => {
            program.diagnostics.push(Diagnostic::error(
                DiagnosticKind::BadOperand,
                format!("{} expects an 8-bit register (or M)", def.mnemonic),
                other.span(),
            ));
            None
        }
    }
}

fn expect_pair(
    def: &InstrDef,
    operand: &OperandNode,
    program: &mut Program,
) -> Option<RegPair> {
    // the classic spellings B, D, H denote pairs in pair-shaped slots
    let pair = match operand {
        OperandNode::RegPair(pair, _) => Some(*pair),
        OperandNode::Reg(Reg::B, _) => Some(RegPair::BC),
        OperandNode::Reg(Reg::D, _) => Some(RegPair::DE),
        OperandNode::Reg(Reg::H, _) => Some(RegPair::HL),
        _ => None,
    };

    match pair {
        Some(pair) if def.pairs.admits(pair) => Some(pair),
        Some(pair) => {
            program.diagnostics.push(Diagnostic::error(
                DiagnosticKind::BadOperand,
                format!("{} does not accept the {} pair", def.mnemonic, pair.name()),
                operand.span(),
            ));
            None
        }
        None => {
            program.diagnostics.push(Diagnostic::error(
                DiagnosticKind::BadOperand,
                format!("{} expects a register pair", def.mnemonic),
                operand.span(),
            ));
            None
        }
    }
}

/// Resolves an expression operand. Undefined symbols are diagnosed but
/// yield 0 so emission can continue.
fn eval_expr(def: &InstrDef, operand: &OperandNode, program: &mut Program) -> Option<u32> {
    match operand {
        OperandNode::Immediate(Expr::Num(value), _) => Some(*value),
        OperandNode::Immediate(Expr::Sym(name), span) => {
            match program.symbols.reference(name, *span) {
                Some(value) => Some(value as u32),
                None => {
                    program.diagnostics.push(Diagnostic::error(
                        DiagnosticKind::UndefinedSymbol,
                        format!("undefined symbol {}", name),
                        *span,
                    ));
                    Some(0)
                }
            }
        }
        other => {
            program.diagnostics.push(Diagnostic::error(
                DiagnosticKind::BadOperand,
                format!("{} expects a value", def.mnemonic),
                other.span(),
            ));
            None
        }
    }
}

fn eval_expr8(def: &InstrDef, operand: &OperandNode, program: &mut Program) -> Option<u8> {
    let value = eval_expr(def, operand, program)?;
    if value > 0xFF {
        program.diagnostics.push(Diagnostic::error(
            DiagnosticKind::ValueOutOfRange,
            format!("value {:X}H does not fit in a byte", value),
            operand.span(),
        ));
    }
    Some(value as u8)
}

fn eval_expr16(def: &InstrDef, operand: &OperandNode, program: &mut Program) -> Option<u16> {
    let value = eval_expr(def, operand, program)?;
    if value > 0xFFFF {
        program.diagnostics.push(Diagnostic::error(
            DiagnosticKind::ValueOutOfRange,
            format!("value {:X}H does not fit in 16 bits", value),
            operand.span(),
        ));
    }
    Some(value as u16)
}

/// `DB` payload: byte literals, string bytes, and symbol low bytes.
fn eval_db(operands: &[OperandNode], span: Span, program: &mut Program) -> Vec<u8> {
    if operands.is_empty() {
        program.diagnostics.push(Diagnostic::error(
            DiagnosticKind::MissingOperand,
            "DB expects at least one operand",
            span,
        ));
        return Vec::new();
    }

    let mut bytes = Vec::new();
    for operand in operands {
        match operand {
            OperandNode::Str(text, _) => bytes.extend_from_slice(text),
            OperandNode::Immediate(Expr::Num(value), span) => {
                if *value > 0xFF {
                    program.diagnostics.push(Diagnostic::error(
                        DiagnosticKind::ValueOutOfRange,
                        format!("value {:X}H does not fit in a byte", value),
                        *span,
                    ));
                }
                bytes.push(*value as u8);
            }
            OperandNode::Immediate(Expr::Sym(name), span) => {
                match program.symbols.reference(name, *span) {
                    Some(value) => bytes.push(value as u8),
                    None => {
                        program.diagnostics.push(Diagnostic::error(
                            DiagnosticKind::UndefinedSymbol,
                            format!("undefined symbol {}", name),
                            *span,
                        ));
                        bytes.push(0);
                    }
                }
            }
            other => {
                program.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::BadOperand,
                    "DB expects bytes, strings or symbols",
                    other.span(),
                ));
                bytes.push(0);
            }
        }
    }
    bytes
}
