pub use prog85::MEMORY_SIZE;

pub const PORT_COUNT: usize = 256;

// Flag register bit positions. The PSW byte layout is S Z 0 AC 0 P 1 CY,
// with bit 1 wired high and bits 3/5 wired low.
pub const FLAG_S: u8 = 0b1000_0000;
pub const FLAG_Z: u8 = 0b0100_0000;
pub const FLAG_AC: u8 = 0b0001_0000;
pub const FLAG_P: u8 = 0b0000_0100;
pub const FLAG_CY: u8 = 0b0000_0001;
pub const PSW_FIXED_ONES: u8 = 0b0000_0010;

// Flag-effect masks for the instruction database.
pub const FLAGS_NONE: u8 = 0;
pub const FLAGS_ALL: u8 = FLAG_S | FLAG_Z | FLAG_AC | FLAG_P | FLAG_CY;
pub const FLAGS_NO_CY: u8 = FLAG_S | FLAG_Z | FLAG_AC | FLAG_P;
pub const FLAGS_CY_ONLY: u8 = FLAG_CY;

/// Byte distance between consecutive RST vectors.
pub const RST_STRIDE: u16 = 8;

/// Safety bound for unattended `run` calls; lift with
/// [`Processor::set_step_limit`](crate::Processor::set_step_limit).
pub const DEFAULT_STEP_LIMIT: u64 = 10_000_000;

/// T-states charged per step while the CPU sits in the halt state.
pub const HALT_IDLE_CYCLES: u64 = 4;

/// T-states charged for servicing a host-raised interrupt (a forced RST).
pub const INTERRUPT_ACK_CYCLES: u64 = 12;
