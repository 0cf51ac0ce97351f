use crate::config::PULSE_WIDTH_US;
use crate::error::Error;
use crate::sample::DistanceSample;
use core::fmt::Write;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

/// A one-shot timer counting up from zero at
/// [`TIMER_FREQ_HZ`](crate::config::TIMER_FREQ_HZ) that raises terminal
/// count after [`TIMER_PERIOD_TICKS`](crate::config::TIMER_PERIOD_TICKS).
pub trait EchoTimer {
    /// Clear the counter and start counting. Restarts from zero if the timer
    /// is already running, and drops a terminal count nobody acknowledged.
    fn start(&mut self);

    /// Current count. Does not stop the timer.
    fn read(&mut self) -> u32;

    /// Acknowledge terminal count. Returns `false` if it has not been
    /// reached since the last call or the last `start`.
    fn clear_terminal_count(&mut self) -> bool;
}

/// Hardware events the measurement loop reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    RisingEdge,
    FallingEdge,
    TimerTimeout,
}

impl Event {
    /// Edge event for an echo pin watched on both edges, picked from the
    /// level the pin has when the interrupt is serviced.
    ///
    /// An echo short enough to rise and fall before then reads low and
    /// becomes a falling edge with no rise, which the driver ignores; the
    /// timeout then starts the next cycle.
    pub fn echo_edge(pin_high: bool) -> Self {
        if pin_high {
            Event::RisingEdge
        } else {
            Event::FallingEdge
        }
    }
}

/// Where the current measurement cycle stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No trigger has been sent.
    Idle,
    /// Trigger sent, timer running, echo pin still low.
    AwaitingRise,
    /// Echo pin went high at `start` ticks.
    AwaitingFall { start: u32 },
}

/// What handling an [`Event`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Start of the echo latched.
    EchoStarted,
    /// Echo finished, line written, next cycle triggered.
    Measured(DistanceSample),
    /// No echo in time, next cycle triggered.
    TimedOut,
    /// Edge did not belong to the current cycle.
    Ignored,
    /// Echo ended before it started by the timer's count, next cycle triggered.
    Discarded,
}

/// Counters kept across cycles. All of them wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    pub triggers: u32,
    pub samples: u32,
    pub timeouts: u32,
    pub ignored: u32,
    pub discarded: u32,
}

/// Ultrasonic ranger driven by edge and timer interrupts.
///
/// The driver owns everything a measurement touches. Interrupt handlers
/// feed it [`Event`]s through [`Sonar::handle`], and must not be able to
/// preempt each other while doing so (same priority, or a lock around the
/// call).
pub struct Sonar<Trig, Timer, Delay, Sink> {
    trig: Trig,
    timer: Timer,
    delay: Delay,
    sink: Sink,
    phase: Phase,
    stats: Stats,
}

impl<Trig, Timer, Delay, Sink> Sonar<Trig, Timer, Delay, Sink>
where
    Trig: OutputPin,
    Timer: EchoTimer,
    Delay: DelayUs<u32>,
    Sink: Write,
{
    /// Takes ownership of an already configured pin, timer, delay and sink.
    /// Nothing is touched until [`start`](Sonar::start).
    pub fn new(trig: Trig, timer: Timer, delay: Delay, sink: Sink) -> Self {
        Sonar {
            trig,
            timer,
            delay,
            sink,
            phase: Phase::Idle,
            stats: Stats::default(),
        }
    }

    /// Fire the first trigger. From here on the loop keeps itself going.
    pub fn start(&mut self) -> Result<(), Error<Trig::Error>> {
        info!("starting measurement loop");
        self.send_trigger()
    }

    /// Pulse the trigger pin and arm the echo timer from zero.
    ///
    /// The timer is armed even when the pin fails, so terminal count retries
    /// the pulse and the loop never stalls on a pin error.
    pub fn send_trigger(&mut self) -> Result<(), Error<Trig::Error>> {
        let pulsed = self.pulse();

        self.timer.start();
        self.phase = Phase::AwaitingRise;

        if pulsed.is_ok() {
            self.stats.triggers = self.stats.triggers.wrapping_add(1);
            debug!("trigger #{=u32}", self.stats.triggers);
        }
        pulsed
    }

    /// Run one state transition.
    pub fn handle(&mut self, event: Event) -> Result<Outcome, Error<Trig::Error>> {
        match event {
            Event::RisingEdge => Ok(self.on_rising_edge()),
            Event::FallingEdge => self.on_falling_edge(),
            Event::TimerTimeout => self.on_timer_terminal_count(),
        }
    }

    /// Latch the echo start. A second rise before the fall replaces the
    /// first one.
    pub fn on_rising_edge(&mut self) -> Outcome {
        let now = self.timer.read();

        match self.phase {
            Phase::Idle => self.ignore(Event::RisingEdge),
            Phase::AwaitingRise | Phase::AwaitingFall { .. } => {
                trace!("echo rose at {=u32}", now);
                self.phase = Phase::AwaitingFall { start: now };
                Outcome::EchoStarted
            }
        }
    }

    /// Close the echo window, report the distance and trigger the next cycle.
    ///
    /// A fall with no rise in the current cycle is ignored. That covers the
    /// tail of an echo whose cycle was already ended by a timeout.
    pub fn on_falling_edge(&mut self) -> Result<Outcome, Error<Trig::Error>> {
        let now = self.timer.read();

        let start = match self.phase {
            Phase::AwaitingFall { start } => start,
            Phase::Idle | Phase::AwaitingRise => return Ok(self.ignore(Event::FallingEdge)),
        };
        trace!("echo fell at {=u32}", now);
        self.phase = Phase::Idle;

        let (outcome, emitted) = match DistanceSample::between(start, now) {
            Some(sample) => {
                self.stats.samples = self.stats.samples.wrapping_add(1);
                (Outcome::Measured(sample), self.emit(&sample))
            }
            None => {
                warn!("echo fell at {=u32} before it rose at {=u32}", now, start);
                self.stats.discarded = self.stats.discarded.wrapping_add(1);
                (Outcome::Discarded, Ok(()))
            }
        };

        // The loop must keep running even if the line could not be written.
        self.send_trigger()?;
        emitted.map(|()| outcome)
    }

    /// Give up on the current cycle and start another.
    pub fn on_timer_terminal_count(&mut self) -> Result<Outcome, Error<Trig::Error>> {
        match self.phase {
            Phase::AwaitingFall { start } => {
                debug!("echo that rose at {=u32} never fell", start)
            }
            _ => debug!("no echo"),
        }
        self.phase = Phase::Idle;
        self.stats.timeouts = self.stats.timeouts.wrapping_add(1);

        self.send_trigger()?;
        Ok(Outcome::TimedOut)
    }

    /// Entry point for the timer interrupt. Returns `None` when the
    /// interrupt was not a terminal count, e.g. one that `start` already
    /// dropped.
    pub fn on_timer_interrupt(&mut self) -> Result<Option<Outcome>, Error<Trig::Error>> {
        if self.timer.clear_terminal_count() {
            self.on_timer_terminal_count().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Give the hardware back.
    pub fn release(self) -> (Trig, Timer, Delay, Sink) {
        (self.trig, self.timer, self.delay, self.sink)
    }

    fn ignore(&mut self, event: Event) -> Outcome {
        trace!("ignoring {} in {}", event, self.phase);
        self.stats.ignored = self.stats.ignored.wrapping_add(1);
        Outcome::Ignored
    }

    fn pulse(&mut self) -> Result<(), Error<Trig::Error>> {
        if let Err(e) = self.trig.set_high() {
            // Never leave the sensor triggering.
            self.trig.set_low().ok();
            return Err(Error::Pin(e));
        }
        self.delay.delay_us(PULSE_WIDTH_US);
        self.trig.set_low().map_err(Error::Pin)
    }

    fn emit(&mut self, sample: &DistanceSample) -> Result<(), Error<Trig::Error>> {
        write!(self.sink, "{}\r\n", sample)?;
        Ok(())
    }
}
