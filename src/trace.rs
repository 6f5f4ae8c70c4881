//! Pure observers over execution: state snapshots and per-step deltas,
//! coverage and profiling counters, watch ranges, and the lock-step diff of
//! two runs. None of these mutate CPU state.

use crate::constants::MEMORY_SIZE;
use crate::processor::{Core, Processor};
use crate::registers::{Flags, Registers};

/// A compact copy of everything a program can observe about the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub regs: Registers,
    pub flags: Flags,
    pub sp: u16,
    pub pc: u16,
    pub halted: bool,
}

impl CpuSnapshot {
    pub fn of(core: &Core) -> CpuSnapshot {
        CpuSnapshot {
            regs: core.regs,
            flags: core.flags,
            sp: core.sp,
            pc: core.pc,
            halted: core.halted,
        }
    }
}

/// One memory byte rewritten by an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct MemWrite {
    pub addr: u16,
    pub old: u8,
    pub new: u8,
}

/// What a single step changed. An 8085 instruction writes at most two
/// memory bytes, so the write log needs no allocation.
#[derive(Clone, Debug)]
pub struct StepDelta {
    pub before: CpuSnapshot,
    pub after: CpuSnapshot,
    writes: [MemWrite; 2],
    write_count: u8,
    pub port_write: Option<(u8, u8)>,
}

impl StepDelta {
    pub(crate) fn new(
        before: CpuSnapshot,
        after: CpuSnapshot,
        writes: &[MemWrite],
        port_write: Option<(u8, u8)>,
    ) -> StepDelta {
        let mut fixed = [MemWrite::default(); 2];
        let count = writes.len().min(2);
        fixed[..count].copy_from_slice(&writes[..count]);
        StepDelta {
            before,
            after,
            writes: fixed,
            write_count: count as u8,
            port_write,
        }
    }

    pub fn writes(&self) -> &[MemWrite] {
        &self.writes[..self.write_count as usize]
    }

    pub fn registers_changed(&self) -> bool {
        self.before.regs != self.after.regs
            || self.before.flags != self.after.flags
            || self.before.sp != self.after.sp
    }
}

/// Inclusive address range under watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchRange {
    pub start: u16,
    pub end: u16,
}

impl WatchRange {
    pub fn new(start: u16, end: u16) -> WatchRange {
        WatchRange { start, end }
    }

    pub fn contains(&self, addr: u16) -> bool {
        addr >= self.start && addr <= self.end
    }
}

/// Fetched-address bitmap over the full 64 KiB space.
pub struct Coverage {
    bits: Box<[bool]>,
}

impl Coverage {
    pub fn new() -> Coverage {
        Coverage {
            bits: vec![false; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    pub(crate) fn mark(&mut self, addr: u16) {
        self.bits[addr as usize] = true;
    }

    pub fn is_covered(&self, addr: u16) -> bool {
        self.bits[addr as usize]
    }

    /// Number of distinct instruction addresses fetched.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }

    pub fn clear(&mut self) {
        self.bits.fill(false);
    }
}

impl Default for Coverage {
    fn default() -> Coverage {
        Coverage::new()
    }
}

/// Per-instruction-address execution counters.
pub struct Profiler {
    hits: Box<[u64]>,
    cycles: Box<[u64]>,
}

impl Profiler {
    pub fn new() -> Profiler {
        Profiler {
            hits: vec![0; MEMORY_SIZE].into_boxed_slice(),
            cycles: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    pub(crate) fn record(&mut self, addr: u16, cycles: u64) {
        self.hits[addr as usize] += 1;
        self.cycles[addr as usize] += cycles;
    }

    pub fn hits(&self, addr: u16) -> u64 {
        self.hits[addr as usize]
    }

    pub fn cycles(&self, addr: u16) -> u64 {
        self.cycles[addr as usize]
    }

    pub fn top_by_hits(&self, n: usize) -> Vec<(u16, u64)> {
        Self::top(&self.hits, n)
    }

    pub fn top_by_cycles(&self, n: usize) -> Vec<(u16, u64)> {
        Self::top(&self.cycles, n)
    }

    fn top(counters: &[u64], n: usize) -> Vec<(u16, u64)> {
        let mut entries: Vec<(u16, u64)> = counters
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(addr, &count)| (addr as u16, count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    pub fn clear(&mut self) {
        self.hits.fill(0);
        self.cycles.fill(0);
    }
}

impl Default for Profiler {
    fn default() -> Profiler {
        Profiler::new()
    }
}

/// First step at which two runs disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Divergence {
    /// 1-based step count at which the states differed.
    pub step: u64,
    pub left: CpuSnapshot,
    pub right: CpuSnapshot,
}

/// Lock-steps two processors over the same inputs and reports the first
/// post-step state mismatch, if any occurs within `limit` steps.
pub fn first_divergence(
    left: &mut Processor,
    right: &mut Processor,
    limit: u64,
) -> Option<Divergence> {
    for step in 1..=limit {
        let left_result = left.step();
        let right_result = right.step();

        let left_state = CpuSnapshot::of(left.core());
        let right_state = CpuSnapshot::of(right.core());
        if left_state != right_state {
            return Some(Divergence {
                step,
                left: left_state,
                right: right_state,
            });
        }

        if left_result.is_err() && right_result.is_err() {
            break;
        }
        if left_state.halted && right_state.halted {
            break;
        }
    }
    None
}
