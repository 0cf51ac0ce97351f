//! nRF52840-DK side of the ranger: the pins it is wired to and the timer and
//! delay the driver core runs on. The console is the HAL's `Uarte`, which
//! already implements `core::fmt::Write`.
//!
//! | Signal  | Pin   |
//! | ------- | ----- |
//! | TRIG    | P0.03 |
//! | ECHO    | P0.04 |
//! | UART TX | P0.06 |
//! | UART RX | P0.08 |

use embedded_hal::blocking::delay::DelayUs;
use fugit::MicrosDurationU32;
use nrf52840_hal::{
    gpio::{Input, Output, Pin, PullDown, PushPull},
    pac::{timer0, TIMER0, TIMER1, TIMER2},
    uarte::Baudrate,
};
use srf04::{
    config::{Ticks, TIMEOUT},
    EchoTimer,
};

/// CPU clock, which is fixed on the nRF52840.
pub const CORE_CLOCK_HZ: u32 = 64_000_000;

pub const CONSOLE_BAUDRATE: Baudrate = Baudrate::BAUD115200;

pub type TrigPin = Pin<Output<PushPull>>;
pub type EchoPin = Pin<Input<PullDown>>;

/// Echo timer on one of the 32-bit TIMER peripherals.
///
/// The peripheral can't count at 10 kHz (16 MHz / 2^9 is the slowest it
/// gets), so it runs at 1 MHz and reads are scaled down to echo ticks.
/// Compare 0 is terminal count: it stops and clears the counter and raises
/// the interrupt. Capture channel 1 is used for reads.
pub struct OneShotTimer<T: Instance32> {
    timer: T,
}

impl<T: Instance32> OneShotTimer<T> {
    pub fn new(timer: T) -> Self {
        timer.tasks_stop.write(|w| unsafe { w.bits(1) });
        timer.mode.write(|w| w.mode().timer());
        timer.bitmode.write(|w| w.bitmode()._32bit());
        timer.prescaler.write(
            |w| unsafe { w.prescaler().bits(4) }, // 1 MHz
        );
        timer.cc[0].write(|w| unsafe { w.cc().bits(TIMEOUT.to_micros()) });
        timer
            .shorts
            .write(|w| w.compare0_clear().enabled().compare0_stop().enabled());
        timer.events_compare[0].write(|w| w);
        timer.intenset.modify(|_, w| w.compare0().set());

        OneShotTimer { timer }
    }
}

impl<T: Instance32> EchoTimer for OneShotTimer<T> {
    fn start(&mut self) {
        self.timer.events_compare[0].write(|w| w);
        self.timer.tasks_clear.write(|w| unsafe { w.bits(1) });
        self.timer.tasks_start.write(|w| unsafe { w.bits(1) });
    }

    fn read(&mut self) -> u32 {
        self.timer.tasks_capture[1].write(|w| unsafe { w.bits(1) });
        let elapsed = MicrosDurationU32::from_ticks(self.timer.cc[1].read().bits());
        let ticks: Ticks = elapsed.convert();
        ticks.ticks()
    }

    fn clear_terminal_count(&mut self) -> bool {
        let fired = self.timer.events_compare[0].read().bits() != 0;
        if fired {
            self.timer.events_compare[0].write(|w| w);
        }
        fired
    }
}

pub trait Instance32: core::ops::Deref<Target = timer0::RegisterBlock> {}
impl Instance32 for TIMER0 {}
impl Instance32 for TIMER1 {}
impl Instance32 for TIMER2 {}

/// Busy-waits by counting CPU cycles. Interrupts stay enabled, so a wait can
/// only run long, never short.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleDelay;

impl DelayUs<u32> for CycleDelay {
    fn delay_us(&mut self, us: u32) {
        cortex_m::asm::delay(us.saturating_mul(CORE_CLOCK_HZ / 1_000_000));
    }
}
