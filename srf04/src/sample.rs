use crate::config::{Ticks, DISTANCE_DIVISOR};
use core::fmt;
use fugit::MicrosDurationU32;

/// One finished measurement: the width of an echo pulse in timer ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistanceSample {
    elapsed: u32,
}

impl DistanceSample {
    pub const fn from_ticks(elapsed: u32) -> Self {
        DistanceSample { elapsed }
    }

    /// Sample for an echo that rose at `start` and fell at `end`.
    ///
    /// Returns `None` when `end` is before `start`, which happens when the
    /// timer was restarted or wrapped inside the echo window.
    pub fn between(start: u32, end: u32) -> Option<Self> {
        end.checked_sub(start).map(Self::from_ticks)
    }

    pub fn elapsed(&self) -> Ticks {
        Ticks::from_ticks(self.elapsed)
    }

    pub fn echo_time(&self) -> MicrosDurationU32 {
        self.elapsed().convert()
    }

    pub fn meters(&self) -> f32 {
        self.elapsed as f32 / DISTANCE_DIVISOR
    }
}

/// The text line reported for every sample, e.g. `Distance: 1.00m`.
impl fmt::Display for DistanceSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Distance: {:.2}m", self.meters())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DistanceSample {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(
            f,
            "Distance: {=f32}m ({=u32} ticks)",
            self.meters(),
            self.elapsed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_elapsed_ticks_over_divisor() {
        for (start, end) in [(0, 0), (0, 1), (50, 108), (10, 299), (1_000, 4_321)] {
            let sample = DistanceSample::between(start, end).unwrap();
            assert_eq!(sample.meters(), (end - start) as f32 / 58.0);
        }
    }

    #[test]
    fn same_tick_is_zero_distance() {
        let sample = DistanceSample::between(77, 77).unwrap();
        assert_eq!(sample.meters(), 0.0);
        assert_eq!(sample.to_string(), "Distance: 0.00m");
    }

    #[test]
    fn end_before_start_has_no_sample() {
        assert_eq!(DistanceSample::between(280, 12), None);
    }

    #[test]
    fn fifty_eight_ticks_is_one_meter() {
        let sample = DistanceSample::between(50, 108).unwrap();
        assert_eq!(sample.meters(), 1.0);
        assert_eq!(sample.to_string(), "Distance: 1.00m");
    }

    #[test]
    fn echo_time_uses_timer_rate() {
        let sample = DistanceSample::from_ticks(58);
        assert_eq!(sample.elapsed().ticks(), 58);
        assert_eq!(sample.echo_time().ticks(), 5_800);
    }

    #[test]
    fn text_rounds_to_centimeters() {
        assert_eq!(DistanceSample::from_ticks(100).to_string(), "Distance: 1.72m");
        assert_eq!(DistanceSample::from_ticks(1).to_string(), "Distance: 0.02m");
    }
}
