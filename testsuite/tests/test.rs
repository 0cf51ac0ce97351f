#![no_std]
#![no_main]

use sonar_play as _; // memory layout + panic handler

// See https://crates.io/crates/defmt-test/0.3.0 for more documentation (e.g. about the 'state'
// feature)
#[defmt_test::tests]
mod tests {
    use defmt::{assert, assert_eq};
    use embedded_hal::blocking::delay::DelayUs;
    use nrf52840_hal::{
        delay::Delay,
        gpio::{p0::Parts, Level},
        pac::{self, TIMER1, TIMER2, UARTE0},
        uarte::{self, Parity, Uarte},
    };
    use sonar_play::board::{CycleDelay, OneShotTimer, TrigPin, CONSOLE_BAUDRATE};
    use srf04::{EchoTimer, Event, Outcome, Phase, Sonar};

    struct State {
        timer: OneShotTimer<TIMER1>,
        sonar: Sonar<TrigPin, OneShotTimer<TIMER2>, CycleDelay, Uarte<UARTE0>>,
        delay: Delay,
    }

    #[init]
    fn init() -> State {
        let core = pac::CorePeripherals::take().unwrap();
        let device = pac::Peripherals::take().unwrap();

        let p0 = Parts::new(device.P0);
        let trig_pin = p0.p0_03.into_push_pull_output(Level::Low).degrade();
        let pins = uarte::Pins {
            txd: p0.p0_06.into_push_pull_output(Level::High).degrade(),
            rxd: p0.p0_08.into_floating_input().degrade(),
            cts: None,
            rts: None,
        };
        let console = Uarte::new(device.UARTE0, pins, Parity::EXCLUDED, CONSOLE_BAUDRATE);

        State {
            timer: OneShotTimer::new(device.TIMER1),
            sonar: Sonar::new(trig_pin, OneShotTimer::new(device.TIMER2), CycleDelay, console),
            delay: Delay::new(core.SYST),
        }
    }

    #[test]
    fn timer_counts_at_ten_kilohertz(state: &mut State) {
        state.timer.start();
        state.delay.delay_us(10_000_u32);
        let ticks = state.timer.read();

        assert!(ticks >= 100 && ticks <= 102, "{=u32}", ticks);
    }

    #[test]
    fn restart_counts_from_zero(state: &mut State) {
        state.timer.start();
        state.delay.delay_us(5_000_u32);
        state.timer.start();

        assert!(state.timer.read() <= 1);
    }

    #[test]
    fn terminal_count_after_period(state: &mut State) {
        state.timer.start();
        state.delay.delay_us(20_000_u32);
        assert!(!state.timer.clear_terminal_count());

        state.delay.delay_us(10_000_u32);
        assert!(state.timer.clear_terminal_count());
        assert!(!state.timer.clear_terminal_count());
    }

    #[test]
    fn timer_stops_at_terminal_count(state: &mut State) {
        state.timer.start();
        state.delay.delay_us(31_000_u32);

        assert_eq!(state.timer.read(), 0);
        state.delay.delay_us(1_000_u32);
        assert_eq!(state.timer.read(), 0);
        state.timer.clear_terminal_count();
    }

    #[test]
    fn restart_drops_terminal_count(state: &mut State) {
        state.timer.start();
        state.delay.delay_us(31_000_u32);
        state.timer.start();

        assert!(!state.timer.clear_terminal_count());
    }

    #[test]
    fn cycle_delay_never_runs_short(state: &mut State) {
        state.timer.start();
        CycleDelay.delay_us(2_000);

        assert!(state.timer.read() >= 20);
    }

    #[test]
    fn sonar_times_echo_window(state: &mut State) {
        state.sonar.start().unwrap();
        state.delay.delay_us(5_000_u32);
        assert_eq!(state.sonar.handle(Event::RisingEdge).unwrap(), Outcome::EchoStarted);

        state.delay.delay_us(5_800_u32);
        match state.sonar.handle(Event::FallingEdge).unwrap() {
            Outcome::Measured(sample) => {
                let ticks = sample.elapsed().ticks();
                assert!(ticks >= 57 && ticks <= 62, "{=u32}", ticks);
            }
            other => defmt::panic!("unexpected {}", other),
        }
        assert_eq!(state.sonar.phase(), Phase::AwaitingRise);
    }

    #[test]
    fn sonar_retriggers_after_timeout(state: &mut State) {
        state.sonar.start().unwrap();
        state.delay.delay_us(31_000_u32);

        assert_eq!(state.sonar.on_timer_interrupt().unwrap(), Some(Outcome::TimedOut));
        assert_eq!(state.sonar.phase(), Phase::AwaitingRise);
    }
}
