//! Execution sessions over the 8085 core.
//!
//! [`Core`] is the bare CPU state; [`Processor`] wraps it with the overlays
//! a debugger or test harness needs: breakpoints, watched address ranges,
//! coverage and profiling observers, a cooperative cancellation flag and a
//! runaway-loop step limit. Overlays observe, they never alter what the
//! program computes.

mod core;
pub mod logic;

pub use self::core::{Core, TickEvent};
pub use self::logic as flag_logic;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use prog85::Program;
use thiserror::Error;

use crate::constants::DEFAULT_STEP_LIMIT;
use crate::trace::{Coverage, CpuSnapshot, Profiler, StepDelta, WatchRange};

/// Runtime faults. A fault aborts the current `run` but leaves the CPU
/// state intact for inspection.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecError {
    #[error("illegal opcode {0:#04X}")]
    IllegalOpcode(u8),
    #[error("stack underflow: SP {sp:#06X} reached the stack guard")]
    StackUnderflow { sp: u16 },
}

/// Synchronous I/O port hook. `input` may supply the byte an `IN` reads
/// (falling back to the port latch when it returns `None`); `output`
/// observes every `OUT`.
pub trait IoHandler {
    fn input(&mut self, port: u8) -> Option<u8>;
    fn output(&mut self, port: u8, value: u8);
}

/// Closure-backed [`IoHandler`].
pub struct DelegateIo<FI, FO>
where
    FI: FnMut(u8) -> Option<u8>,
    FO: FnMut(u8, u8),
{
    input: FI,
    output: FO,
}

impl<FI, FO> DelegateIo<FI, FO>
where
    FI: FnMut(u8) -> Option<u8>,
    FO: FnMut(u8, u8),
{
    pub fn new(input: FI, output: FO) -> DelegateIo<FI, FO> {
        DelegateIo { input, output }
    }
}

impl<FI, FO> IoHandler for DelegateIo<FI, FO>
where
    FI: FnMut(u8) -> Option<u8>,
    FO: FnMut(u8, u8),
{
    fn input(&mut self, port: u8) -> Option<u8> {
        (self.input)(port)
    }

    fn output(&mut self, port: u8, value: u8) {
        (self.output)(port, value)
    }
}

/// Why a `run` stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Halted,
    StepLimit,
    Breakpoint(u16),
    WatchHit(u16),
    Cancelled,
    Error(ExecError),
}

#[derive(Clone, Copy, Debug)]
pub struct RunResult {
    pub stop_reason: StopReason,
    /// Cumulative T-states on the core after the run.
    pub cycles: u64,
    /// Instructions executed by this run call.
    pub steps: u64,
}

#[derive(Clone, Debug)]
pub struct StepResult {
    pub event: TickEvent,
    pub delta: StepDelta,
}

pub struct Processor {
    core: Core,
    breakpoints: HashSet<u16>,
    watches: Vec<WatchRange>,
    coverage: Option<Coverage>,
    profiler: Option<Profiler>,
    io: Option<Box<dyn IoHandler>>,
    step_limit: Option<u64>,
}

impl Processor {
    pub fn new() -> Processor {
        Processor {
            core: Core::new(),
            breakpoints: HashSet::new(),
            watches: Vec::new(),
            coverage: None,
            profiler: None,
            io: None,
            step_limit: Some(DEFAULT_STEP_LIMIT),
        }
    }

    pub fn from_program(program: &Program) -> Processor {
        let mut processor = Processor::new();
        processor.reset(program);
        processor
    }

    /// Loads the program image and restarts the CPU at its origin.
    /// Overlays (breakpoints, watches, observers) are kept.
    pub fn reset(&mut self, program: &Program) {
        self.core.reset(program);
        if let Some(coverage) = &mut self.coverage {
            coverage.clear();
        }
        if let Some(profiler) = &mut self.profiler {
            profiler.clear();
        }
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    pub fn set_breakpoint(&mut self, addr: u16) {
        self.breakpoints.insert(addr);
    }

    pub fn clear_breakpoint(&mut self, addr: u16) {
        self.breakpoints.remove(&addr);
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = u16> + '_ {
        self.breakpoints.iter().copied()
    }

    /// Watches the inclusive address range; any write into it stops `run`.
    pub fn watch(&mut self, start: u16, end: u16) {
        self.watches.push(WatchRange::new(start, end));
    }

    pub fn clear_watches(&mut self) {
        self.watches.clear();
    }

    pub fn enable_coverage(&mut self) {
        self.coverage.get_or_insert_with(Coverage::new);
    }

    pub fn coverage(&self) -> Option<&Coverage> {
        self.coverage.as_ref()
    }

    pub fn enable_profiler(&mut self) {
        self.profiler.get_or_insert_with(Profiler::new);
    }

    pub fn profiler(&self) -> Option<&Profiler> {
        self.profiler.as_ref()
    }

    pub fn set_io_handler(&mut self, handler: Box<dyn IoHandler>) {
        self.io = Some(handler);
    }

    /// `None` removes the safety bound entirely.
    pub fn set_step_limit(&mut self, limit: Option<u64>) {
        self.step_limit = limit;
    }

    pub fn set_stack_guard(&mut self, guard: Option<u16>) {
        self.core.set_stack_guard(guard);
    }

    /// Raises an interrupt edge (RST vector 0-7), serviced before the next
    /// fetch while interrupts are enabled.
    pub fn request_interrupt(&mut self, vector: u8) {
        self.core.request_interrupt(vector);
    }

    /// Executes a single instruction and reports what changed.
    pub fn step(&mut self) -> Result<StepResult, ExecError> {
        let pc_before = self.core.pc;
        let cycles_before = self.core.cycles;
        let before = CpuSnapshot::of(&self.core);

        let event = self.core.tick(self.io.as_deref_mut())?;

        if let TickEvent::Executed { .. } = event {
            if let Some(coverage) = &mut self.coverage {
                coverage.mark(pc_before);
            }
            if let Some(profiler) = &mut self.profiler {
                profiler.record(pc_before, self.core.cycles - cycles_before);
            }
        }

        let after = CpuSnapshot::of(&self.core);
        let delta = StepDelta::new(
            before,
            after,
            self.core.last_writes(),
            self.core.last_port_write(),
        );
        Ok(StepResult { event, delta })
    }

    /// Runs until something stops execution.
    ///
    /// `limit` overrides the configured step limit for this call. The
    /// cancellation flag is read before every fetch; when it trips, the CPU
    /// is left at the instruction that would have executed next. A
    /// breakpoint on the resume address does not fire on the first
    /// iteration, so a stopped session can continue.
    pub fn run(&mut self, limit: Option<u64>, cancel: Option<&AtomicBool>) -> RunResult {
        let limit = limit.or(self.step_limit);
        let resume_pc = self.core.pc;
        let mut steps = 0u64;

        loop {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return self.run_result(StopReason::Cancelled, steps);
                }
            }

            let pc = self.core.pc;
            if (steps > 0 || pc != resume_pc)
                && !self.core.halted
                && self.breakpoints.contains(&pc)
            {
                return self.run_result(StopReason::Breakpoint(pc), steps);
            }

            if let Some(max) = limit {
                if steps >= max {
                    return self.run_result(StopReason::StepLimit, steps);
                }
            }

            match self.step() {
                Ok(result) => {
                    steps += 1;
                    if self.core.halted {
                        return self.run_result(StopReason::Halted, steps);
                    }
                    if let Some(addr) = self.watch_hit(&result.delta) {
                        return self.run_result(StopReason::WatchHit(addr), steps);
                    }
                }
                Err(error) => return self.run_result(StopReason::Error(error), steps),
            }
        }
    }

    fn watch_hit(&self, delta: &StepDelta) -> Option<u16> {
        for write in delta.writes() {
            for range in &self.watches {
                if range.contains(write.addr) {
                    return Some(write.addr);
                }
            }
        }
        None
    }

    fn run_result(&self, stop_reason: StopReason, steps: u64) -> RunResult {
        RunResult {
            stop_reason,
            cycles: self.core.cycles,
            steps,
        }
    }
}

impl Default for Processor {
    fn default() -> Processor {
        Processor::new()
    }
}
