//! Echo timing for HC-SR04 / SRF04 class ultrasonic rangers.
//!
//! The sensor is driven entirely from interrupts: a trigger pulse arms a
//! one-shot timer, the echo pin's rising edge latches the timer count, the
//! falling edge reads it again and turns the difference into a distance.
//! Every completed echo, and every timer expiry, fires the next trigger, so
//! the measurement loop runs on its own once [`Sonar::start`] has been called.
//!
//! The hardware is reached through three small seams:
//!
//! - the trigger pin is an [`embedded_hal::digital::v2::OutputPin`],
//! - the pulse width busy-wait is an [`embedded_hal::blocking::delay::DelayUs`],
//! - the echo window is measured by an [`EchoTimer`].
//!
//! Finished samples are written as text lines to any [`core::fmt::Write`].
//!
//! Enable the `defmt` feature to get log output and `defmt::Format` impls.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
mod error;
mod sample;
mod sonar;

pub use error::Error;
pub use sample::DistanceSample;
pub use sonar::{EchoTimer, Event, Outcome, Phase, Sonar, Stats};
