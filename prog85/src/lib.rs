//! Artifact types produced by the `asm85` assembler and consumed by the
//! `mpu85` emulator and by editor tooling.
//!
//! The central type is [`Program`]: a 64 KiB memory image together with the
//! symbol table, the line↔address maps, the human-readable listing and every
//! diagnostic collected during assembly. A `Program` is created once per
//! assembly run and is immutable afterwards; assembly never fails outright,
//! so consumers must check [`Program::has_errors`] before trusting the image.

use std::collections::HashMap;
use std::fmt;

/// Size of the 8085 address space in bytes.
pub const MEMORY_SIZE: usize = 65536;

/// A source position: 1-based line and column plus the length of the
/// offending or defining text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    pub line: u32,
    pub col: u32,
    pub len: u32,
}

impl Span {
    pub fn new(line: u32, col: u32, len: u32) -> Span {
        Span { line, col, len }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Info => f.write_str("info"),
        }
    }
}

/// Machine-readable diagnostic categories.
///
/// `Lex` and `Syntax` come out of the parse phase, the symbol and value
/// kinds out of the two assembler passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lex,
    Syntax,
    UnknownMnemonic,
    BadOperand,
    MissingOperand,
    ExtraOperand,
    DuplicateSymbol,
    UndefinedSymbol,
    ValueOutOfRange,
    OriginOverlap,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} ({:?})",
            self.span, self.severity, self.message, self.kind
        )
    }
}

/// How a symbol came to be: an address label or an `EQU` constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Label,
    Equate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    /// Canonical (upper-case) name.
    pub name: String,
    pub value: u16,
    pub kind: SymbolKind,
    pub defined_at: Span,
    /// Every span that referenced this symbol, in source order.
    pub references: Vec<Span>,
}

/// Flat, case-insensitive symbol table. Names are canonicalized to
/// upper-case on insertion and lookup.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    map: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Defines a symbol. Returns `false` (and leaves the table unchanged)
    /// if the name is already taken.
    pub fn define(&mut self, name: &str, value: u16, kind: SymbolKind, defined_at: Span) -> bool {
        let canonical = name.to_uppercase();
        if self.map.contains_key(&canonical) {
            return false;
        }
        self.map.insert(
            canonical.clone(),
            Symbol {
                name: canonical,
                value,
                kind,
                defined_at,
                references: Vec::new(),
            },
        );
        true
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.map.get(&name.to_uppercase())
    }

    /// Records a referencing span on an existing symbol. Returns the value
    /// if the symbol is defined.
    pub fn reference(&mut self, name: &str, span: Span) -> Option<u16> {
        self.map.get_mut(&name.to_uppercase()).map(|sym| {
            sym.references.push(span);
            sym.value
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.map.values()
    }
}

/// One line of the assembly listing: the address and bytes a source line
/// produced, alongside the original text.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingRow {
    pub addr: u16,
    pub bytes: Vec<u8>,
    pub line: u32,
    pub text: String,
}

/// The assembled program.
pub struct Program {
    /// Full 64 KiB image, zero-initialised outside emitted regions.
    pub memory: Box<[u8; MEMORY_SIZE]>,
    /// Initial program counter: the first `ORG`, or `0000H`.
    pub origin: u16,
    pub symbols: SymbolTable,
    /// Source line → (first address, emitted byte count).
    pub line_to_addr: HashMap<u32, (u16, u16)>,
    /// First byte of each emitted instruction → source line.
    pub addr_to_line: HashMap<u16, u32>,
    pub diagnostics: Vec<Diagnostic>,
    pub listing: Vec<ListingRow>,
}

impl Program {
    pub fn new() -> Program {
        let memory: Box<[u8; MEMORY_SIZE]> = vec![0u8; MEMORY_SIZE]
            .into_boxed_slice()
            .try_into()
            .expect("image size is fixed");
        Program {
            memory,
            origin: 0,
            symbols: SymbolTable::new(),
            line_to_addr: HashMap::new(),
            addr_to_line: HashMap::new(),
            diagnostics: Vec::new(),
            listing: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Symbols defined on or referenced from the given source line.
    pub fn symbols_at(&self, line: u32) -> Vec<&Symbol> {
        let mut found: Vec<&Symbol> = self
            .symbols
            .iter()
            .filter(|s| {
                s.defined_at.line == line || s.references.iter().any(|r| r.line == line)
            })
            .collect();
        found.sort_by_key(|s| s.defined_at.line);
        found
    }

    /// The label defined at exactly this address, if any.
    pub fn symbol_for_address(&self, addr: u16) -> Option<&Symbol> {
        self.symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Label && s.value == addr)
    }

    pub fn address_for_label(&self, name: &str) -> Option<u16> {
        self.symbols
            .get(name)
            .filter(|s| s.kind == SymbolKind::Label)
            .map(|s| s.value)
    }

    /// Source line that produced the instruction starting at `addr`.
    pub fn line_for_addr(&self, addr: u16) -> Option<u32> {
        self.addr_to_line.get(&addr).copied()
    }

    /// (start address, byte count) emitted for a source line.
    pub fn addr_for_line(&self, line: u32) -> Option<(u16, u16)> {
        self.line_to_addr.get(&line).copied()
    }
}

impl Default for Program {
    fn default() -> Program {
        Program::new()
    }
}

#[cfg(test)]
mod test;
