//! HC-SR04 ultrasonic ranging.

use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rppal::gpio::{Gpio, InputPin, Level, OutputPin, Trigger};

use crate::error::{Error, Result};

pub const DEFAULT_TRIGGER_PIN: u8 = 23;
pub const DEFAULT_ECHO_PIN: u8 = 24;

/// Reported when the echo never starts or never ends.
pub const NO_ECHO_CM: f64 = 999.0;
pub const MIN_CM: f64 = 2.0;
pub const MAX_CM: f64 = 400.0;

// half the speed of sound, in cm/s
const CM_PER_SECOND: f64 = 17150.0;

const SETTLE: Duration = Duration::from_millis(2);
const TRIGGER_PULSE: Duration = Duration::from_micros(10);
const ECHO_TIMEOUT: Duration = Duration::from_millis(100);

/// How the echo pulse width is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoTiming {
    /// Busy-poll the echo level.
    Poll,
    /// Block on the kernel's edge interrupt for each transition.
    Edge,
}

impl Default for EchoTiming {
    fn default() -> Self {
        EchoTiming::Poll
    }
}

impl FromStr for EchoTiming {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "poll" => Ok(EchoTiming::Poll),
            "edge" => Ok(EchoTiming::Edge),
            _ => Err(Error::InvalidArgument {
                name: "echo timing",
                value: s.to_string(),
            }),
        }
    }
}

/// Distance for an echo pulse of the given width, clamped to the sensor range.
pub fn distance_cm(pulse: Duration) -> f64 {
    let cm = pulse.as_secs_f64() * CM_PER_SECOND;
    cm.max(MIN_CM).min(MAX_CM)
}

pub fn read(trigger_pin: u8, echo_pin: u8, timing: EchoTiming) -> Result<f64> {
    let gpio = Gpio::new()?;
    let mut trigger = gpio.get(trigger_pin)?.into_output();
    let mut echo = gpio.get(echo_pin)?.into_input();
    info!(
        "hcsr04 trigger gpio {} echo gpio {} ({:?})",
        trigger_pin, echo_pin, timing
    );

    if timing == EchoTiming::Edge {
        echo.set_interrupt(Trigger::Both)?;
    }

    fire(&mut trigger);

    let pulse = match timing {
        EchoTiming::Poll => echo_by_polling(&echo),
        EchoTiming::Edge => echo_by_interrupt(&mut echo)?,
    };

    match pulse {
        Some(pulse) => {
            debug!("echo {:?}", pulse);
            Ok(distance_cm(pulse))
        }
        None => {
            warn!("no echo within {:?}", ECHO_TIMEOUT);
            Ok(NO_ECHO_CM)
        }
    }
}

fn fire(trigger: &mut OutputPin) {
    trigger.set_low();
    thread::sleep(SETTLE);
    trigger.set_high();
    thread::sleep(TRIGGER_PULSE);
    trigger.set_low();
}

fn poll_until(echo: &InputPin, level: Level) -> Option<Instant> {
    let deadline = Instant::now() + ECHO_TIMEOUT;
    loop {
        let now = Instant::now();
        if echo.read() == level {
            return Some(now);
        }
        if now > deadline {
            return None;
        }
    }
}

fn echo_by_polling(echo: &InputPin) -> Option<Duration> {
    let start = poll_until(echo, Level::High)?;
    let end = poll_until(echo, Level::Low)?;
    Some(end - start)
}

fn echo_by_interrupt(echo: &mut InputPin) -> Result<Option<Duration>> {
    let start = match echo.poll_interrupt(false, Some(ECHO_TIMEOUT))? {
        Some(Level::High) => Instant::now(),
        _ => return Ok(None),
    };
    let end = match echo.poll_interrupt(false, Some(ECHO_TIMEOUT))? {
        Some(Level::Low) => Instant::now(),
        _ => return Ok(None),
    };
    Ok(Some(end - start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_round_trip_time() {
        let cm = distance_cm(Duration::from_micros(2000));
        assert!((cm - 34.3).abs() < 1e-9);
    }

    #[test]
    fn clamps_to_sensor_range() {
        assert_eq!(distance_cm(Duration::from_micros(10)), MIN_CM);
        assert_eq!(distance_cm(Duration::from_millis(50)), MAX_CM);
    }

    #[test]
    fn parses_timing_backend() {
        assert_eq!("poll".parse::<EchoTiming>().unwrap(), EchoTiming::Poll);
        assert_eq!("edge".parse::<EchoTiming>().unwrap(), EchoTiming::Edge);
        assert!("gpiozero".parse::<EchoTiming>().is_err());
    }
}
