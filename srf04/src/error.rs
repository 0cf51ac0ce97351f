use core::fmt;

/// Failures reported by the collaborators the driver talks to.
///
/// `E` is the trigger pin's error type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Driving the trigger pin failed.
    Pin(E),
    /// The text sink refused the distance line.
    Sink,
}

impl<E> From<fmt::Error> for Error<E> {
    fn from(_: fmt::Error) -> Self {
        Error::Sink
    }
}
