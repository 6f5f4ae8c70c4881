use super::*;

#[test]
fn symbols_are_case_insensitive() {
    let mut table = SymbolTable::new();
    assert!(table.define("start", 0x8000, SymbolKind::Label, Span::new(1, 1, 5)));
    assert!(table.contains("START"));
    assert_eq!(table.get("Start").unwrap().value, 0x8000);
    assert_eq!(table.get("START").unwrap().name, "START");
}

#[test]
fn duplicate_definition_is_rejected() {
    let mut table = SymbolTable::new();
    assert!(table.define("LOOP", 0x0010, SymbolKind::Label, Span::new(2, 1, 4)));
    assert!(!table.define("loop", 0x0020, SymbolKind::Label, Span::new(7, 1, 4)));
    assert_eq!(table.get("LOOP").unwrap().value, 0x0010);
}

#[test]
fn references_accumulate() {
    let mut table = SymbolTable::new();
    table.define("DONE", 0x0005, SymbolKind::Label, Span::new(9, 1, 4));
    assert_eq!(table.reference("done", Span::new(3, 5, 4)), Some(0x0005));
    assert_eq!(table.reference("DONE", Span::new(4, 5, 4)), Some(0x0005));
    assert_eq!(table.reference("OTHER", Span::new(4, 5, 5)), None);
    assert_eq!(table.get("DONE").unwrap().references.len(), 2);
}

#[test]
fn program_queries() {
    let mut program = Program::new();
    program
        .symbols
        .define("START", 0x8000, SymbolKind::Label, Span::new(2, 1, 5));
    program
        .symbols
        .define("SIZE", 0x0010, SymbolKind::Equate, Span::new(1, 1, 4));
    program.symbols.reference("START", Span::new(5, 5, 5));

    assert_eq!(program.address_for_label("start"), Some(0x8000));
    assert_eq!(program.address_for_label("SIZE"), None);
    assert_eq!(program.symbol_for_address(0x8000).unwrap().name, "START");
    assert!(program.symbol_for_address(0x1234).is_none());

    let at_line_5 = program.symbols_at(5);
    assert_eq!(at_line_5.len(), 1);
    assert_eq!(at_line_5[0].name, "START");
}

#[test]
fn fresh_program_is_clean() {
    let program = Program::new();
    assert!(!program.has_errors());
    assert_eq!(program.origin, 0);
    assert!(program.memory.iter().all(|&b| b == 0));
}

#[test]
fn error_detection() {
    let mut program = Program::new();
    program.diagnostics.push(Diagnostic::warning(
        DiagnosticKind::OriginOverlap,
        "rewrites 0005H",
        Span::new(4, 1, 3),
    ));
    assert!(!program.has_errors());
    program.diagnostics.push(Diagnostic::error(
        DiagnosticKind::UndefinedSymbol,
        "undefined symbol NOWHERE",
        Span::new(6, 5, 7),
    ));
    assert!(program.has_errors());
}
