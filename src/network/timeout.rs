use core::time::Duration;
use embedded_time::duration::{Extensions, Microseconds};
use embedded_time::timer::param::{OneShot, Running};
use embedded_time::{Clock, Timer};

#[derive(Debug, PartialEq)]
pub enum TimeoutError {
    TimerStartFailed,
    TimerError,
}

/// Deadline of a single blocking operation. A zero duration never expires.
#[derive(Debug)]
pub struct Timeout<'a, C: Clock> {
    timer: Option<Timer<'a, OneShot, Running, C, Microseconds>>,
}

impl<'a, C: Clock> Timeout<'a, C> {
    pub fn new(clock: &'a C, duration: Microseconds) -> Result<Timeout<'a, C>, TimeoutError> {
        if duration == 0.microseconds() {
            return Ok(Self { timer: None });
        }

        match clock.new_timer(duration).start() {
            Ok(timer) => Ok(Self { timer: Some(timer) }),
            Err(_) => Err(TimeoutError::TimerStartFailed),
        }
    }

    pub fn expired(&self) -> Result<bool, TimeoutError> {
        let Some(timer) = self.timer.as_ref() else {
            return Ok(false);
        };

        timer.is_expired().map_err(|_| TimeoutError::TimerError)
    }
}

/// Converts a timeout to the timer resolution. None if it exceeds the timer range.
pub(crate) fn to_microseconds(timeout: Duration) -> Option<Microseconds> {
    let micros = u32::try_from(timeout.as_micros()).ok()?;
    Some(micros.microseconds())
}

/// Builds a timeout from whole seconds plus a microsecond remainder
pub(crate) fn from_parts(seconds: u32, micros: u32) -> Duration {
    Duration::from_secs(u64::from(seconds)) + Duration::from_micros(u64::from(micros))
}
