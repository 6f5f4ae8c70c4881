//! Parsed statements, one per source line, with spans throughout.

use mpu85::{Reg, RegPair};
use prog85::Span;

/// An operand expression: a literal or a single symbol reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Num(u32),
    Sym(String),
}

/// A classified operand. Bare register letters classify as `Reg` (with `M`
/// mapping to the pseudo-register), pair names as `RegPair`; any other
/// identifier becomes a symbol reference inside `Immediate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperandNode {
    Reg(Reg, Span),
    RegPair(RegPair, Span),
    Immediate(Expr, Span),
    Str(Vec<u8>, Span),
}

impl OperandNode {
    pub fn span(&self) -> Span {
        match self {
            OperandNode::Reg(_, span)
            | OperandNode::RegPair(_, span)
            | OperandNode::Immediate(_, span)
            | OperandNode::Str(_, span) => *span,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    Org,
    Db,
    Ds,
    Equ,
    End,
}

impl DirectiveKind {
    pub fn from_name(name: &str) -> Option<DirectiveKind> {
        match name {
            "ORG" => Some(DirectiveKind::Org),
            "DB" => Some(DirectiveKind::Db),
            "DS" => Some(DirectiveKind::Ds),
            "EQU" => Some(DirectiveKind::Equ),
            "END" => Some(DirectiveKind::End),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Directive {
        kind: DirectiveKind,
        operands: Vec<OperandNode>,
        span: Span,
    },
    Instruction {
        mnemonic: String,
        operands: Vec<OperandNode>,
        span: Span,
    },
}

/// One source line. Blank and comment-only lines keep their slot with no
/// label and no statement so that line numbers stay aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub number: u32,
    pub label: Option<(String, Span)>,
    pub stmt: Option<Stmt>,
    pub text: String,
}
