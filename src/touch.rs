//! Capacitive touch: a single TTP223 pad on a GPIO, or the twelve
//! electrodes of an MPR121 on I2C.

use std::thread;
use std::time::Duration;

use log::{debug, info};
use rppal::gpio::Gpio;
use rppal::i2c::I2c;

use crate::error::Result;

pub const DEFAULT_PIN: u8 = 17;
pub const MPR121_DEFAULT_ADDRESS: u16 = 0x5A;
pub const MPR121_CHANNELS: u8 = 12;

/// Which touch controller is wired, chosen when the command line is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchConfig {
    Ttp223 { pin: u8 },
    Mpr121 { bus: u8, address: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchReading {
    pub channels: Vec<u8>,
    /// Filtered electrode data for each touched channel. `None` for the
    /// TTP223, and for the MPR121 when nothing is touched.
    pub values: Option<Vec<u16>>,
}

pub fn read(config: TouchConfig) -> Result<TouchReading> {
    match config {
        TouchConfig::Ttp223 { pin } => read_ttp223(pin),
        TouchConfig::Mpr121 { bus, address } => read_mpr121(bus, address),
    }
}

fn read_ttp223(pin: u8) -> Result<TouchReading> {
    let input = Gpio::new()?.get(pin)?.into_input_pulldown();
    let touched = input.is_high();
    info!("ttp223 on gpio {}: {}", pin, touched);

    Ok(TouchReading {
        channels: if touched { vec![0] } else { Vec::new() },
        values: None,
    })
}

// MPR121 registers
const REG_TOUCH_STATUS: u8 = 0x00;
const REG_FILTERED_DATA: u8 = 0x04;
const REG_MHDR: u8 = 0x2B;
const REG_TOUCH_THRESHOLD: u8 = 0x41;
const REG_DEBOUNCE: u8 = 0x5B;
const REG_CONFIG1: u8 = 0x5C;
const REG_CONFIG2: u8 = 0x5D;
const REG_ECR: u8 = 0x5E;
const REG_SOFT_RESET: u8 = 0x80;

const TOUCH_THRESHOLD: u8 = 12;
const RELEASE_THRESHOLD: u8 = 6;

// MHDR NHDR NCLR FDLR MHDF NHDF NCLF FDLF
const BASELINE_FILTER: [u8; 8] = [0x01, 0x01, 0x0E, 0x00, 0x01, 0x05, 0x01, 0x00];

const SETTLE: Duration = Duration::from_millis(50);

/// Channel numbers whose bit is set in the touch status word.
pub fn touched_channels(status: u16) -> Vec<u8> {
    (0..MPR121_CHANNELS)
        .filter(|ch| status & (1u16 << *ch) != 0)
        .collect()
}

fn read_word(i2c: &I2c, register: u8) -> Result<u16> {
    let mut data = [0u8; 2];
    i2c.write_read(&[register], &mut data)?;
    Ok(u16::from_le_bytes(data))
}

fn init_mpr121(i2c: &I2c) -> Result<()> {
    i2c.smbus_write_byte(REG_SOFT_RESET, 0x63)?;
    thread::sleep(Duration::from_millis(1));
    // stop mode, required before touching the configuration
    i2c.smbus_write_byte(REG_ECR, 0x00)?;

    for ch in 0..MPR121_CHANNELS {
        i2c.smbus_write_byte(REG_TOUCH_THRESHOLD + 2 * ch, TOUCH_THRESHOLD)?;
        i2c.smbus_write_byte(REG_TOUCH_THRESHOLD + 2 * ch + 1, RELEASE_THRESHOLD)?;
    }
    for (offset, value) in BASELINE_FILTER.iter().enumerate() {
        i2c.smbus_write_byte(REG_MHDR + offset as u8, *value)?;
    }

    i2c.smbus_write_byte(REG_DEBOUNCE, 0x00)?;
    i2c.smbus_write_byte(REG_CONFIG1, 0x10)?; // 16 uA charge current
    i2c.smbus_write_byte(REG_CONFIG2, 0x20)?; // 0.5 us charge time
    // run mode, baseline tracking on, all 12 electrodes
    i2c.smbus_write_byte(REG_ECR, 0x8F)?;
    Ok(())
}

fn read_mpr121(bus: u8, address: u16) -> Result<TouchReading> {
    let mut i2c = I2c::with_bus(bus)?;
    i2c.set_slave_address(address)?;
    info!("mpr121 on i2c-{} at {:#04x}", bus, address);

    init_mpr121(&i2c)?;
    thread::sleep(SETTLE);

    let status = read_word(&i2c, REG_TOUCH_STATUS)? & 0x0FFF;
    debug!("touch status {:#06x}", status);

    let channels = touched_channels(status);
    let mut values = Vec::with_capacity(channels.len());
    for ch in &channels {
        values.push(read_word(&i2c, REG_FILTERED_DATA + 2 * ch)? & 0x03FF);
    }

    Ok(TouchReading {
        channels,
        values: if values.is_empty() { None } else { Some(values) },
    })
}
