//! Compile-time measurement parameters.

use fugit::{MicrosDurationU32, TimerDurationU32};

/// Width of the trigger pulse, in microseconds.
pub const PULSE_WIDTH_US: u32 = 10;

/// Rate at which the echo timer counts.
pub const TIMER_FREQ_HZ: u32 = 10_000;

/// Count at which the echo timer reaches terminal count. At 10 kHz this is
/// about 29.9 ms, longer than any echo from a target in range.
pub const TIMER_PERIOD_TICKS: u32 = 299;

/// Divides elapsed echo ticks into meters.
pub const DISTANCE_DIVISOR: f32 = 58.0;

/// A span measured in echo timer ticks.
pub type Ticks = TimerDurationU32<TIMER_FREQ_HZ>;

pub const PULSE_WIDTH: MicrosDurationU32 = MicrosDurationU32::from_ticks(PULSE_WIDTH_US);

/// How long a cycle may wait for its echo before the timer gives up on it.
pub const TIMEOUT: Ticks = Ticks::from_ticks(TIMER_PERIOD_TICKS);
