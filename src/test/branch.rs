use super::{program_with, run_until_halt};
use crate::processor::{Processor, StopReason};

#[test]
fn jmp_skips_over() {
    // 0000 MVI A, 01H
    // 0002 JMP 0007H
    // 0005 MVI A, FFH
    // 0007 HLT
    let cpu = run_until_halt(&[0x3E, 0x01, 0xC3, 0x07, 0x00, 0x3E, 0xFF, 0x76]);
    assert_eq!(cpu.core().regs.a, 0x01);
}

#[test]
fn jnz_not_taken_charges_seven() {
    // MVI A, 01H / CPI 01H / JNZ 1000H / HLT
    let cpu = run_until_halt(&[0x3E, 0x01, 0xFE, 0x01, 0xC2, 0x00, 0x10, 0x76]);
    let core = cpu.core();
    assert!(core.flags.z);
    assert_eq!(core.cycles, 7 + 7 + 7 + 7);
}

#[test]
fn jnz_taken_charges_ten() {
    // 0000 MVI A, 02H
    // 0002 CPI 01H
    // 0004 JNZ 0008H
    // 0007 HLT
    // 0008 HLT
    let cpu = run_until_halt(&[0x3E, 0x02, 0xFE, 0x01, 0xC2, 0x08, 0x00, 0x76, 0x76]);
    let core = cpu.core();
    assert!(!core.flags.z);
    assert_eq!(core.pc, 0x0009);
    assert_eq!(core.cycles, 7 + 7 + 10 + 7);
}

#[test]
fn conditional_jump_families() {
    // STC / JC 0005H / HLT / 0005 MVI B, 01H / HLT
    let cpu = run_until_halt(&[0x37, 0xDA, 0x05, 0x00, 0x76, 0x06, 0x01, 0x76]);
    assert_eq!(cpu.core().regs.b, 0x01);

    // MVI A, 80H / ORA A / JM 0007H / HLT / 0007 MVI C, 01H / HLT
    let cpu = run_until_halt(&[0x3E, 0x80, 0xB7, 0xFA, 0x07, 0x00, 0x76, 0x0E, 0x01, 0x76]);
    assert_eq!(cpu.core().regs.c, 0x01);
}

#[test]
fn call_and_ret() {
    // 0000 LXI SP, FFFFH
    // 0003 CALL 0008H
    // 0006 HLT
    // 0007 NOP
    // 0008 MVI B, 07H
    // 000A RET
    let cpu = run_until_halt(&[
        0x31, 0xFF, 0xFF, 0xCD, 0x08, 0x00, 0x76, 0x00, 0x06, 0x07, 0xC9,
    ]);
    let core = cpu.core();
    assert_eq!(core.regs.b, 0x07);
    assert_eq!(core.sp, 0xFFFF);
    assert_eq!(core.cycles, 10 + 18 + 7 + 10 + 7);
}

#[test]
fn conditional_call_not_taken_charges_nine() {
    // MVI A, 00H / ORA A / CNZ 1000H / HLT
    let cpu = run_until_halt(&[0x3E, 0x00, 0xB7, 0xC4, 0x00, 0x10, 0x76]);
    assert_eq!(cpu.core().cycles, 7 + 4 + 9 + 7);
}

#[test]
fn conditional_ret_cycle_split() {
    // Taken RZ: 0000 LXI SP, FFFFH / 0003 CALL 0009H / 0006 HLT
    //           0009 MVI A, 00H / 000B ORA A / 000C RZ / 000D JMP 000DH
    let cpu = run_until_halt(&[
        0x31, 0xFF, 0xFF, 0xCD, 0x09, 0x00, 0x76, 0x00, 0x00, 0x3E, 0x00, 0xB7, 0xC8, 0xC3, 0x0D,
        0x00,
    ]);
    assert_eq!(cpu.core().cycles, 10 + 18 + 7 + 4 + 12 + 7);

    // Not-taken RNZ costs 6: LXI SP, FFFFH / MVI A, 00H / ORA A / RNZ / HLT
    let cpu = run_until_halt(&[0x31, 0xFF, 0xFF, 0x3E, 0x00, 0xB7, 0xC0, 0x76]);
    assert_eq!(cpu.core().cycles, 10 + 7 + 4 + 6 + 7);
}

#[test]
fn rst_vectors_into_low_memory() {
    // 0000 LXI SP, FFFFH / 0003 RST 2 ... 0010 MVI B, 22H / HLT
    let mut bytes = vec![0x31, 0xFF, 0xFF, 0xD7];
    bytes.resize(0x10, 0x00);
    bytes.extend_from_slice(&[0x06, 0x22, 0x76]);
    let cpu = run_until_halt(&bytes);
    let core = cpu.core();
    assert_eq!(core.regs.b, 0x22);
    assert_eq!(core.sp, 0xFFFD);
    // return address 0004H, high byte at SP
    assert_eq!(core.memory()[0xFFFD], 0x00);
    assert_eq!(core.memory()[0xFFFE], 0x04);
}

#[test]
fn pchl_jumps_through_hl() {
    // 0000 LXI H, 0005H / 0003 PCHL / 0004 NOP / 0005 HLT
    let cpu = run_until_halt(&[0x21, 0x05, 0x00, 0xE9, 0x00, 0x76]);
    assert_eq!(cpu.core().pc, 0x0006);
}

#[test]
fn step_limit_stops_runaway_loop() {
    // JMP 0000H
    let mut cpu = Processor::from_program(&program_with(&[0xC3, 0x00, 0x00]));
    let result = cpu.run(Some(100), None);
    assert_eq!(result.stop_reason, StopReason::StepLimit);
    assert_eq!(result.steps, 100);
    assert!(!cpu.core().halted);
}
