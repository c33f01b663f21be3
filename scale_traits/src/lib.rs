#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions)]
//! Shared vocabulary for the scale reader: the pollable weight-source
//! capability, the reading model it produces, and the clock used to time it.

pub mod clock;
pub mod error;
pub mod reading;

pub use clock::{Clock, MonotonicClock};
pub use error::ConnectionError;
pub use reading::{
    KG_PER_LB, Measurement, Reading, TimestampedReading, Unit, epoch_secs, percent_complete, round2,
};

/// Something that can be polled for a weight reading, live or simulated.
///
/// `Ok(None)` means the poll produced nothing this cycle (e.g. the read
/// timed out with no bytes). An unparseable frame is still `Ok(Some(_))`
/// with `parsed() == false`.
pub trait WeightSource {
    fn poll(&mut self) -> Result<Option<Reading>, ConnectionError>;
    fn is_connected(&self) -> bool;
}

/// A weight source whose connection can be re-established after a
/// `ConnectionError`. Retry policy belongs to the caller.
pub trait Reconnect: WeightSource {
    fn reconnect(&mut self) -> Result<(), ConnectionError>;
}

impl<T: WeightSource + ?Sized> WeightSource for Box<T> {
    fn poll(&mut self) -> Result<Option<Reading>, ConnectionError> {
        (**self).poll()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

impl<T: Reconnect + ?Sized> Reconnect for Box<T> {
    fn reconnect(&mut self) -> Result<(), ConnectionError> {
        (**self).reconnect()
    }
}
