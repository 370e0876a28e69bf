//! DHT22 (AM2302) over its single-wire protocol, bit-banged on a GPIO.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use rppal::gpio::{Gpio, IoPin, Level, Mode};

use crate::error::{Error, Result};

pub const DEFAULT_PIN: u8 = 4;

/// BCM pins broken out on the 40-pin header that are free for the sensor.
pub const SUPPORTED_PINS: [u8; 17] = [4, 5, 6, 12, 13, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27];

const START_SIGNAL: Duration = Duration::from_millis(2);
const EDGE_TIMEOUT: Duration = Duration::from_micros(200);
// 26-28 us high is a 0, 70 us high is a 1
const ONE_THRESHOLD: Duration = Duration::from_micros(50);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dht22Reading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

pub fn check_pin(pin: u8) -> Result<u8> {
    if SUPPORTED_PINS.contains(&pin) {
        Ok(pin)
    } else {
        Err(Error::InvalidArgument {
            name: "GPIO pin",
            value: format!("Unsupported GPIO pin: {}", pin),
        })
    }
}

/// Packs the 40 high-pulse widths, MSB first, into the five frame bytes.
pub fn frame_from_pulses(pulses: &[Duration; 40]) -> [u8; 5] {
    let mut frame = [0u8; 5];
    for (i, width) in pulses.iter().enumerate() {
        if *width > ONE_THRESHOLD {
            frame[i / 8] |= 0x80 >> (i % 8);
        }
    }
    frame
}

pub fn decode_frame(frame: [u8; 5]) -> Result<Dht22Reading> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(Error::Checksum {
            expected: frame[4],
            actual: sum,
        });
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let mut temperature = f64::from(magnitude) / 10.0;
    if frame[2] & 0x80 != 0 {
        temperature = -temperature;
    }

    Ok(Dht22Reading {
        temperature_c: temperature,
        humidity_pct: f64::from(humidity) / 10.0,
    })
}

fn wait_for(pin: &IoPin, level: Level, what: &'static str) -> Result<Duration> {
    let start = Instant::now();
    while pin.read() != level {
        if start.elapsed() > EDGE_TIMEOUT {
            return Err(Error::Timeout(what));
        }
    }
    Ok(start.elapsed())
}

pub fn read(pin: u8) -> Result<Dht22Reading> {
    let pin = check_pin(pin)?;
    let mut io = Gpio::new()?.get(pin)?.into_io(Mode::Output);
    info!("dht22 on gpio {}", pin);

    io.set_low();
    thread::sleep(START_SIGNAL);
    io.set_mode(Mode::Input);

    wait_for(&io, Level::Low, "sensor response")?;
    wait_for(&io, Level::High, "end of response low")?;
    wait_for(&io, Level::Low, "end of response high")?;

    let mut pulses = [Duration::default(); 40];
    for pulse in pulses.iter_mut() {
        wait_for(&io, Level::High, "bit start")?;
        *pulse = wait_for(&io, Level::Low, "bit end")?;
    }

    let frame = frame_from_pulses(&pulses);
    debug!("frame {:02x?}", frame);
    decode_frame(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_datasheet_frame() {
        // 65.2 %RH, 35.1 C
        let reading = decode_frame([0x02, 0x8C, 0x01, 0x5F, 0xEE]).unwrap();
        assert!((reading.humidity_pct - 65.2).abs() < 1e-9);
        assert!((reading.temperature_c - 35.1).abs() < 1e-9);
    }

    #[test]
    fn sign_bit_negates_temperature() {
        let reading = decode_frame([0x02, 0x8C, 0x80, 0x65, 0x73]).unwrap();
        assert!((reading.temperature_c + 10.1).abs() < 1e-9);
    }

    #[test]
    fn bad_checksum_is_an_error() {
        match decode_frame([0x02, 0x8C, 0x01, 0x5F, 0x00]) {
            Err(Error::Checksum { expected, actual }) => {
                assert_eq!(expected, 0x00);
                assert_eq!(actual, 0xEE);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn long_pulses_are_ones() {
        let mut pulses = [Duration::from_micros(27); 40];
        pulses[0] = Duration::from_micros(70);
        pulses[39] = Duration::from_micros(70);
        assert_eq!(frame_from_pulses(&pulses), [0x80, 0, 0, 0, 0x01]);
    }

    #[test]
    fn rejects_unmapped_pins() {
        assert_eq!(check_pin(17).unwrap(), 17);
        assert!(matches!(check_pin(2), Err(Error::InvalidArgument { .. })));
    }
}
