#![no_main]
#![no_std]

use nrf52840_hal::{
    pac::{TIMER1, UARTE0},
    uarte::Uarte,
};
use sonar_play as _; // global logger + panicking-behavior + memory layout
use sonar_play::board::{CycleDelay, OneShotTimer, TrigPin};
use srf04::{Error, Event, Outcome, Sonar};

type Ranger = Sonar<TrigPin, OneShotTimer<TIMER1>, CycleDelay, Uarte<UARTE0>>;

fn report<E: core::fmt::Debug>(event: Event, result: Result<Outcome, Error<E>>) {
    match result {
        Ok(Outcome::Measured(sample)) => defmt::info!("{}", sample),
        Ok(outcome) => defmt::trace!("{} -> {}", event, outcome),
        Err(e) => defmt::error!("{} failed: {}", event, defmt::Debug2Format(&e)),
    }
}

#[rtic::app(device = nrf52840_hal::pac, peripherals = true)]
mod app {
    use super::{report, Ranger};
    use nrf52840_hal::{
        clocks::Clocks,
        gpio::{p0::Parts, Level},
        gpiote::Gpiote,
        prelude::*,
        uarte::{self, Parity, Uarte},
    };
    use sonar_play::board::{CycleDelay, EchoPin, OneShotTimer, CONSOLE_BAUDRATE};
    use srf04::{Event, Sonar};

    #[shared]
    struct Shared {
        sonar: Ranger,
    }

    #[local]
    struct Local {
        gpiote: Gpiote,
        echo_pin: EchoPin,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        let _clocks = Clocks::new(ctx.device.CLOCK).enable_ext_hfosc();

        let p0 = Parts::new(ctx.device.P0);
        let trig_pin = p0.p0_03.into_push_pull_output(Level::Low).degrade();
        let echo_pin: EchoPin = p0.p0_04.into_pulldown_input().degrade();
        let txd = p0.p0_06.into_push_pull_output(Level::High).degrade();
        let rxd = p0.p0_08.into_floating_input().degrade();

        let gpiote = Gpiote::new(ctx.device.GPIOTE);
        gpiote
            .channel0()
            .input_pin(&echo_pin)
            .toggle()
            .enable_interrupt();

        let pins = uarte::Pins {
            txd,
            rxd,
            cts: None,
            rts: None,
        };
        let console = Uarte::new(ctx.device.UARTE0, pins, Parity::EXCLUDED, CONSOLE_BAUDRATE);
        let timer = OneShotTimer::new(ctx.device.TIMER1);
        let sonar = Sonar::new(trig_pin, timer, CycleDelay, console);

        defmt::info!("init");
        (
            Shared { sonar },
            Local { gpiote, echo_pin },
            init::Monotonics(),
        )
    }

    #[idle(shared = [sonar])]
    fn idle(mut ctx: idle::Context) -> ! {
        if let Err(e) = ctx.shared.sonar.lock(|sonar| sonar.start()) {
            defmt::error!("first trigger failed, retried at timeout: {}", defmt::Debug2Format(&e));
        }

        loop {
            cortex_m::asm::nop();
        }
    }

    #[task(binds = GPIOTE, shared = [sonar], local = [gpiote, echo_pin])]
    fn on_gpiote(mut ctx: on_gpiote::Context) {
        let gpiote = ctx.local.gpiote;
        if !gpiote.channel0().is_event_triggered() {
            return;
        }
        gpiote.reset_events();

        // echo_pin toggled, its level tells which edge
        let event = Event::echo_edge(matches!(ctx.local.echo_pin.is_high(), Ok(true)));
        ctx.shared
            .sonar
            .lock(|sonar| report(event, sonar.handle(event)));
    }

    #[task(binds = TIMER1, shared = [sonar])]
    fn on_timer(mut ctx: on_timer::Context) {
        ctx.shared.sonar.lock(|sonar| match sonar.on_timer_interrupt() {
            Ok(Some(_)) => defmt::debug!("no echo, {}", sonar.stats()),
            Ok(None) => {}
            Err(e) => defmt::error!("timeout failed: {}", defmt::Debug2Format(&e)),
        });
    }
}
