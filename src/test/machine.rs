use std::cell::Cell;
use std::rc::Rc;

use matches::assert_matches;

use super::{program_with, run_until_halt};
use crate::constants::HALT_IDLE_CYCLES;
use crate::processor::{DelegateIo, ExecError, Processor, StopReason, TickEvent};

#[test]
fn halt_then_idle() {
    let mut cpu = Processor::from_program(&program_with(&[0x76]));
    let result = cpu.step().unwrap();
    assert_matches!(result.event, TickEvent::Executed { op: 0x76 });
    assert!(cpu.core().halted);
    assert_eq!(cpu.core().cycles, 7);

    let result = cpu.step().unwrap();
    assert_matches!(result.event, TickEvent::Halted);
    assert_eq!(cpu.core().cycles, 7 + HALT_IDLE_CYCLES);
    assert_eq!(cpu.core().instructions_executed, 1);
}

#[test]
fn nop_costs_four() {
    let mut cpu = Processor::from_program(&program_with(&[0x00, 0x76]));
    cpu.step().unwrap();
    assert_eq!(cpu.core().cycles, 4);
}

#[test]
fn ei_takes_effect_one_instruction_late() {
    // EI / NOP / HLT
    let mut cpu = Processor::from_program(&program_with(&[0xFB, 0x00, 0x76]));
    cpu.step().unwrap(); // EI
    assert!(!cpu.core().interrupts_enabled);
    cpu.step().unwrap(); // NOP; the latch folds at the top of this step
    assert!(cpu.core().interrupts_enabled);
}

#[test]
fn di_cancels_pending_enable() {
    // EI / DI / NOP / HLT
    let mut cpu = Processor::from_program(&program_with(&[0xFB, 0xF3, 0x00, 0x76]));
    cpu.step().unwrap();
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert!(!cpu.core().interrupts_enabled);
}

#[test]
fn interrupt_wakes_halted_cpu() {
    // 0000 LXI SP, FFFFH / 0003 EI / 0004 HLT
    // 0018 (RST 3) MVI B, 99H / HLT
    let mut bytes = vec![0x31, 0xFF, 0xFF, 0xFB, 0x76];
    bytes.resize(0x18, 0x00);
    bytes.extend_from_slice(&[0x06, 0x99, 0x76]);

    let mut cpu = Processor::from_program(&program_with(&bytes));
    let result = cpu.run(None, None);
    assert_eq!(result.stop_reason, StopReason::Halted);
    assert_eq!(cpu.core().pc, 0x0005);

    cpu.request_interrupt(3);
    let result = cpu.run(None, None);
    assert_eq!(result.stop_reason, StopReason::Halted);
    let core = cpu.core();
    assert_eq!(core.regs.b, 0x99);
    assert!(!core.interrupts_enabled);
    // the interrupted PC (0005H) was pushed
    assert_eq!(core.memory()[0xFFFD], 0x00);
    assert_eq!(core.memory()[0xFFFE], 0x05);
}

#[test]
fn interrupt_ignored_while_disabled() {
    let mut cpu = Processor::from_program(&program_with(&[0x00, 0x76]));
    cpu.request_interrupt(2);
    let result = cpu.run(None, None);
    assert_eq!(result.stop_reason, StopReason::Halted);
    assert_eq!(cpu.core().pc, 0x0002);
}

#[test]
fn out_writes_port_and_notifies_hook() {
    let seen = Rc::new(Cell::new((0u8, 0u8)));
    let seen_ref = Rc::clone(&seen);
    let hook = DelegateIo::new(
        |_| None,
        move |port, value| seen_ref.set((port, value)),
    );

    // MVI A, 42H / OUT 10H / HLT
    let mut cpu = Processor::from_program(&program_with(&[0x3E, 0x42, 0xD3, 0x10, 0x76]));
    cpu.set_io_handler(Box::new(hook));
    let result = cpu.run(None, None);
    assert_eq!(result.stop_reason, StopReason::Halted);
    assert_eq!(seen.get(), (0x10, 0x42));
    assert_eq!(cpu.core().io_port(0x10), 0x42);
}

#[test]
fn in_prefers_hook_over_port_latch() {
    let hook = DelegateIo::new(|port| if port == 0x20 { Some(0x99) } else { None }, |_, _| ());

    // IN 20H / HLT
    let mut cpu = Processor::from_program(&program_with(&[0xDB, 0x20, 0x76]));
    cpu.set_io_handler(Box::new(hook));
    cpu.run(None, None);
    assert_eq!(cpu.core().regs.a, 0x99);
}

#[test]
fn in_reads_port_latch_without_hook() {
    // IN 07H / HLT
    let mut cpu = Processor::from_program(&program_with(&[0xDB, 0x07, 0x76]));
    cpu.core_mut().set_io_port(0x07, 0xAB);
    cpu.run(None, None);
    assert_eq!(cpu.core().regs.a, 0xAB);
}

#[test]
fn rim_reads_back_sim_masks() {
    // MVI A, 0DH / SIM / MVI A, 00H / RIM / HLT
    let cpu = run_until_halt(&[0x3E, 0x0D, 0x30, 0x3E, 0x00, 0x20, 0x76]);
    // mask-set-enable was bit 3; masks 101, interrupts disabled
    assert_eq!(cpu.core().regs.a, 0x05);
}

#[test]
fn sim_drives_the_sod_latch() {
    // MVI A, C0H / SIM / HLT
    let cpu = run_until_halt(&[0x3E, 0xC0, 0x30, 0x76]);
    assert!(cpu.core().serial_output());

    // without the enable bit the latch keeps its state
    let cpu = run_until_halt(&[0x3E, 0x80, 0x30, 0x76]);
    assert!(!cpu.core().serial_output());
}

#[test]
fn illegal_opcode_reports_and_preserves_pc() {
    let mut cpu = Processor::from_program(&program_with(&[0x00, 0x08]));
    let result = cpu.run(None, None);
    assert_matches!(
        result.stop_reason,
        StopReason::Error(ExecError::IllegalOpcode(0x08))
    );
    assert_eq!(cpu.core().pc, 0x0001);
    assert_eq!(cpu.core().instructions_executed, 1);
}
