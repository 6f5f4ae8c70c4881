//! End-to-end programs: assemble real source and execute it on the
//! processor model, checking architectural state, T-states and the source
//! maps that editor tooling consumes.

use std::sync::atomic::AtomicBool;

use asm85::assemble;
use mpu85::{disassemble_at, first_divergence, Processor, StopReason};
use prog85::DiagnosticKind;

fn run(source: &str) -> (prog85::Program, Processor) {
    let program = assemble(source);
    assert!(
        !program.has_errors(),
        "unexpected diagnostics: {:?}",
        program.diagnostics
    );
    let mut cpu = Processor::from_program(&program);
    let result = cpu.run(None, None);
    assert_eq!(result.stop_reason, StopReason::Halted);
    (program, cpu)
}

#[test]
fn arithmetic_program() {
    let (_, cpu) = run("MVI A, 05H\nMVI B, 03H\nADD B\nHLT\n");
    let core = cpu.core();
    assert_eq!(core.regs.a, 0x08);
    assert_eq!(core.regs.b, 0x03);
    assert!(!core.flags.cy);
    assert!(!core.flags.z);
    assert_eq!(core.cycles, 25); // 7 + 7 + 4 + 7
    assert!(core.halted);
}

#[test]
fn conditional_jump_not_taken() {
    let (_, cpu) = run("ORG 0000H\nMVI A, 01H\nCPI 01H\nJNZ 1000H\nHLT\n");
    let core = cpu.core();
    assert!(core.flags.z);
    // the JNZ fell through to the HLT right after it
    assert_eq!(core.pc, 0x0008);
    // JNZ contributes its not-taken price of 7
    assert_eq!(core.cycles, 7 + 7 + 7 + 7);
}

#[test]
fn memory_indirect_through_hl() {
    let (_, cpu) = run("LXI H, 2000H\nMVI M, 42H\nMOV A, M\nHLT\n");
    let core = cpu.core();
    assert_eq!(core.memory()[0x2000], 0x42);
    assert_eq!(core.regs.a, 0x42);
}

#[test]
fn stack_roundtrip() {
    let source = "LXI SP, FFFFH\nLXI H, 1234H\nPUSH H\nLXI H, 0000H\nPOP H\nHLT\n";
    let program = assemble(source);
    assert!(!program.has_errors());

    // stop right after the PUSH to inspect the stack window
    let mut cpu = Processor::from_program(&program);
    let push_addr = program.addr_for_line(3).unwrap().0;
    cpu.set_breakpoint(push_addr.wrapping_add(1));
    let result = cpu.run(None, None);
    assert_eq!(result.stop_reason, StopReason::Breakpoint(push_addr + 1));
    assert_eq!(cpu.core().memory()[0xFFFE], 0x34);
    assert_eq!(cpu.core().memory()[0xFFFD], 0x12);

    let result = cpu.run(None, None);
    assert_eq!(result.stop_reason, StopReason::Halted);
    let core = cpu.core();
    assert_eq!(core.regs.h, 0x12);
    assert_eq!(core.regs.l, 0x34);
    assert_eq!(core.sp, 0xFFFF);
}

#[test]
fn label_resolution_and_source_maps() {
    let source = "\
ORG 8000H
START: MVI A, 00H
JMP DONE
MVI A, FFH
DONE: HLT
";
    let program = assemble(source);
    assert!(program.diagnostics.is_empty());

    let done = program.address_for_label("DONE").unwrap();
    assert_eq!(done, 0x8007);
    // the two-byte operand is DONE's address, little-endian
    let (jmp_addr, jmp_len) = program.addr_for_line(3).unwrap();
    assert_eq!(jmp_len, 3);
    assert_eq!(program.memory[jmp_addr as usize + 1], 0x07);
    assert_eq!(program.memory[jmp_addr as usize + 2], 0x80);
    // both ends of the map point back at the source
    assert_eq!(program.line_for_addr(jmp_addr), Some(3));
    assert_eq!(program.line_for_addr(done), Some(5));

    let mut cpu = Processor::from_program(&program);
    let result = cpu.run(None, None);
    assert_eq!(result.stop_reason, StopReason::Halted);
    assert_eq!(cpu.core().regs.a, 0x00);
}

#[test]
fn error_recovery_keeps_the_rest_runnable() {
    let source = "MVI A, 05H\nUNKNOWN_OP 1\nMVI B, 03H\nADD B\nHLT\n";
    let program = assemble(source);
    assert!(program.has_errors());
    assert!(program
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::UnknownMnemonic && d.span.line == 2));

    // later lines kept their addresses (three bytes were reserved)
    assert_eq!(program.addr_for_line(3), Some((0x0005, 2)));

    // the reserved bytes are zero (NOPs), so the program still runs
    let mut cpu = Processor::from_program(&program);
    let result = cpu.run(None, None);
    assert_eq!(result.stop_reason, StopReason::Halted);
    assert_eq!(cpu.core().regs.a, 0x08);
}

#[test]
fn cancellation_is_cooperative_and_resumable() {
    let program = assemble("MVI A, 01H\nMVI B, 02H\nHLT\n");
    let mut cpu = Processor::from_program(&program);

    let cancel = AtomicBool::new(true);
    let result = cpu.run(None, Some(&cancel));
    assert_eq!(result.stop_reason, StopReason::Cancelled);
    assert_eq!(result.steps, 0);
    assert_eq!(cpu.core().pc, program.origin);
}

#[test]
fn coverage_matches_executed_addresses() {
    let program = assemble("MVI A, 01H\nMVI B, 02H\nADD B\nHLT\n");
    let mut cpu = Processor::from_program(&program);
    cpu.enable_coverage();
    cpu.run(None, None);

    let coverage = cpu.coverage().unwrap();
    assert_eq!(coverage.count() as u64, cpu.core().instructions_executed);
    for line in 1..=4 {
        let (addr, _) = program.addr_for_line(line).unwrap();
        assert!(coverage.is_covered(addr));
    }
}

#[test]
fn equated_ports_and_io() {
    let source = "\
STATUS EQU 10H
MVI A, 7FH
OUT STATUS
HLT
";
    let (_, cpu) = run(source);
    assert_eq!(cpu.core().io_port(0x10), 0x7F);
}

#[test]
fn loop_with_counter() {
    // sums 1..=5 into A
    let source = "\
        MVI A, 00H
        MVI C, 05H
LOOP:   ADD C
        DCR C
        JNZ LOOP
        HLT
";
    let (_, cpu) = run(source);
    assert_eq!(cpu.core().regs.a, 5 + 4 + 3 + 2 + 1);
    assert!(cpu.core().flags.z);
}

#[test]
fn identical_source_runs_do_not_diverge() {
    let program = assemble("MVI A, 05H\nADI 03H\nHLT\n");
    let mut left = Processor::from_program(&program);
    let mut right = Processor::from_program(&program);
    assert!(first_divergence(&mut left, &mut right, 100).is_none());
}

#[test]
fn disassembly_reassembles_to_the_same_bytes() {
    for op in 0u16..=255 {
        let op = op as u8;
        let mem = [op, 0x34, 0x12];
        let Some(d) = disassemble_at(&mem, 0) else {
            continue;
        };

        let program = assemble(&d.text);
        assert!(
            !program.has_errors(),
            "{:#04X} disassembled to unparseable {:?}: {:?}",
            op,
            d.text,
            program.diagnostics
        );
        assert_eq!(
            &program.memory[..d.len as usize],
            &mem[..d.len as usize],
            "round-trip mismatch for {:#04X} ({})",
            op,
            d.text
        );
    }
}
