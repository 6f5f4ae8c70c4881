//! Line-oriented parse: each source line runs through the pest grammar and
//! becomes a [`Line`]; parse failures become diagnostics on that line and
//! the walk continues.

use std::str::FromStr;

use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use mpu85::{Reg, RegPair};
use prog85::{Diagnostic, DiagnosticKind, Span};

use crate::ast::{DirectiveKind, Expr, Line, OperandNode, Stmt};

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct Asm85Parser;

/// Parses the whole source. Never fails: malformed lines yield diagnostics
/// and an empty statement slot.
pub fn parse_source(source: &str) -> (Vec<Line>, Vec<Diagnostic>) {
    let mut lines = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let number = index as u32 + 1;
        match Asm85Parser::parse(Rule::line, raw) {
            Ok(mut pairs) => {
                let pair = pairs.next().expect("line rule always yields one pair");
                lines.push(build_line(pair, number, raw, &mut diagnostics));
            }
            Err(error) => {
                diagnostics.push(classify_error(&error, number, raw));
                lines.push(Line {
                    number,
                    label: None,
                    stmt: None,
                    text: raw.to_string(),
                });
            }
        }
    }

    (lines, diagnostics)
}

/// Radix scan for a numeric lexeme: the suffix wins (`H` hex, `O`/`Q`
/// octal, `B` binary, `D` decimal), bare digit runs are decimal.
pub fn scan_number(lexeme: &str) -> Result<u32, String> {
    let upper = lexeme.to_uppercase();
    let (digits, radix) = match upper.as_bytes().last() {
        Some(b'H') => (&upper[..upper.len() - 1], 16),
        Some(b'O') | Some(b'Q') => (&upper[..upper.len() - 1], 8),
        Some(b'B') => (&upper[..upper.len() - 1], 2),
        Some(b'D') => (&upper[..upper.len() - 1], 10),
        _ => (&upper[..], 10),
    };
    if digits.is_empty() {
        return Err(format!("numeric literal \"{}\" has no digits", lexeme));
    }
    u32::from_str_radix(digits, radix)
        .map_err(|_| format!("invalid digit for base-{} literal \"{}\"", radix, lexeme))
}

fn span_of(pair: &Pair<Rule>, line: u32) -> Span {
    let (_, col) = pair.as_span().start_pos().line_col();
    Span::new(line, col as u32, pair.as_str().len() as u32)
}

fn classify_error(error: &pest::error::Error<Rule>, line: u32, text: &str) -> Diagnostic {
    let col = match error.location {
        pest::error::InputLocation::Pos(pos) => pos as u32 + 1,
        pest::error::InputLocation::Span((start, _)) => start as u32 + 1,
    };
    let span = Span::new(line, col, 1);

    // An odd quote count before any comment marks an unterminated string.
    let code = text.split(';').next().unwrap_or("");
    if code.matches('"').count() % 2 == 1 || code.matches('\'').count() % 2 == 1 {
        return Diagnostic::error(DiagnosticKind::Lex, "unterminated string literal", span);
    }

    // A character the grammar never accepts (a bare `$` and the like) is a
    // lexical problem; anything else is structural.
    if let Some(stray) = code.chars().nth(col as usize - 1) {
        let accepted =
            stray.is_ascii_alphanumeric() || stray.is_whitespace() || "_,:;\"'".contains(stray);
        if !accepted {
            return Diagnostic::error(
                DiagnosticKind::Lex,
                format!("stray character {:?}", stray),
                span,
            );
        }
    }

    Diagnostic::error(
        DiagnosticKind::Syntax,
        format!("malformed line: unexpected input at column {}", col),
        span,
    )
}

fn build_line(
    pair: Pair<Rule>,
    number: u32,
    text: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Line {
    debug_assert_matches!(pair.as_rule(), Rule::line);

    let mut label = None;
    let mut stmt = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::label_def => {
                let ident = item.into_inner().next().expect("label has a name");
                label = Some((ident.as_str().to_uppercase(), span_of(&ident, number)));
            }
            Rule::statement => {
                let inner = item.into_inner().next().expect("statement has a body");
                match inner.as_rule() {
                    Rule::equ_stmt => {
                        let stmt_span = span_of(&inner, number);
                        let mut parts = inner.into_inner();
                        let name = parts.next().expect("equate has a name");
                        let _keyword = parts.next();
                        let operand =
                            build_operand(parts.next().expect("equate has a value"), number, diagnostics);
                        label = Some((name.as_str().to_uppercase(), span_of(&name, number)));
                        stmt = Some(Stmt::Directive {
                            kind: DirectiveKind::Equ,
                            operands: vec![operand],
                            span: stmt_span,
                        });
                    }
                    Rule::op_stmt => {
                        let stmt_span = span_of(&inner, number);
                        let mut parts = inner.into_inner();
                        let head = parts.next().expect("statement has a mnemonic");
                        let name = head.as_str().to_uppercase();
                        let mut operands = Vec::new();
                        if let Some(list) = parts.next() {
                            for operand in list.into_inner() {
                                operands.push(build_operand(operand, number, diagnostics));
                            }
                        }
                        stmt = Some(match DirectiveKind::from_name(&name) {
                            Some(kind) => Stmt::Directive {
                                kind,
                                operands,
                                span: stmt_span,
                            },
                            None => Stmt::Instruction {
                                mnemonic: name,
                                operands,
                                span: stmt_span,
                            },
                        });
                    }
                    _ => unreachable!(),
                }
            }
            Rule::EOI => {}
            _ => unreachable!(),
        }
    }

    Line {
        number,
        label,
        stmt,
        text: text.to_string(),
    }
}

fn build_operand(pair: Pair<Rule>, line: u32, diagnostics: &mut Vec<Diagnostic>) -> OperandNode {
    debug_assert_matches!(pair.as_rule(), Rule::operand);
    let inner = pair.into_inner().next().expect("operand has a body");
    let span = span_of(&inner, line);

    match inner.as_rule() {
        Rule::number => {
            let value = match scan_number(inner.as_str()) {
                Ok(value) => value,
                Err(reason) => {
                    diagnostics.push(Diagnostic::error(DiagnosticKind::Lex, reason, span));
                    0
                }
            };
            OperandNode::Immediate(Expr::Num(value), span)
        }
        Rule::string => {
            let chars = inner.into_inner().next().expect("string has a body");
            OperandNode::Str(chars.as_str().bytes().collect(), span)
        }
        Rule::ident => {
            let name = inner.as_str();
            if let Ok(reg) = Reg::from_str(name) {
                OperandNode::Reg(reg, span)
            } else if let Ok(pair) = RegPair::from_str(name) {
                OperandNode::RegPair(pair, span)
            } else {
                OperandNode::Immediate(Expr::Sym(name.to_uppercase()), span)
            }
        }
        _ => unreachable!(),
    }
}
