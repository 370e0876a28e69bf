use std::thread;
use std::time::Duration;

use log::{debug, info};
use rppal::i2c::I2c;

use crate::error::Result;

pub const DEFAULT_ADDRESS: u16 = 0x23;

const CMD_POWER_ON: u8 = 0x01;
// 1 lx resolution, 120 ms typical
const CMD_ONE_TIME_H_RES: u8 = 0x20;

const MEASUREMENT_WAIT: Duration = Duration::from_millis(180);

/// Converts the two result bytes to lux.
pub fn lux(data: [u8; 2]) -> f64 {
    f64::from(u16::from_be_bytes(data)) / 1.2
}

pub fn read(bus: u8, address: u16) -> Result<f64> {
    let mut i2c = I2c::with_bus(bus)?;
    i2c.set_slave_address(address)?;
    info!("bh1750 on i2c-{} at {:#04x}", bus, address);

    i2c.write(&[CMD_POWER_ON])?;
    i2c.write(&[CMD_ONE_TIME_H_RES])?;
    thread::sleep(MEASUREMENT_WAIT);

    let mut data = [0u8; 2];
    i2c.read(&mut data)?;
    debug!("raw {:02x?}", data);

    Ok(lux(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_count_over_1_2() {
        assert_eq!(lux([0x00, 0x00]), 0.0);
        assert!((lux([0x01, 0x9B]) - 342.5).abs() < 1e-9);
        assert!((lux([0xFF, 0xFF]) - 54612.5).abs() < 1e-9);
    }
}
