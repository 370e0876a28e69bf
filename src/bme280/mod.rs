pub mod calibration;
pub mod compensation;

use std::thread;
use std::time::Duration;

use log::{debug, info};
use rppal::i2c::I2c;

pub use calibration::CalibrationSet;
pub use compensation::{compensate, CompensatedReading, RawSample};

use crate::error::Result;

// BME280 I2C default slave address.
pub const DEFAULT_ADDRESS: u16 = 0x76;

// BME280 register addresses.
// cf. https://trac.switch-science.com/wiki/BME280
const REG_CTRL_HUM: u8 = 0xF2;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CALIB_00: u8 = 0x88;
const REG_CALIB_26: u8 = 0xE1;
const REG_ADC_VALUE: u8 = 0xF7;

const OSRS_T: u8 = 1; // Temperature oversampling x 1
const OSRS_P: u8 = 1; // Pressure oversampling x 1
const OSRS_H: u8 = 1; // Humidity oversampling x 1
const MODE_FORCED: u8 = 1;

const MEASUREMENT_WAIT: Duration = Duration::from_millis(50);

/// One BME280 on an I2C bus with its calibration loaded.
pub struct Bme280 {
    i2c: I2c,
    calib: CalibrationSet,
}

impl Bme280 {
    pub fn open(bus: u8, address: u16) -> Result<Self> {
        let mut i2c = I2c::with_bus(bus)?;
        i2c.set_slave_address(address)?;
        info!("bme280 on i2c-{} at {:#04x}", bus, address);

        let calib = read_calib(&i2c)?;
        debug!("{:?}", calib);

        Ok(Bme280 { i2c, calib })
    }

    /// Runs one forced-mode conversion and returns the compensated values.
    pub fn measure(&mut self) -> Result<CompensatedReading> {
        self.trigger()?;
        thread::sleep(MEASUREMENT_WAIT);

        let sample = read_data(&self.i2c)?;
        debug!("{:?}", sample);

        Ok(compensate(&self.calib, &sample))
    }

    fn trigger(&mut self) -> Result<()> {
        // ctrl_hum only takes effect after a write to ctrl_meas
        self.i2c.smbus_write_byte(REG_CTRL_HUM, OSRS_H)?;
        self.i2c
            .smbus_write_byte(REG_CTRL_MEAS, (OSRS_T << 5) | (OSRS_P << 2) | MODE_FORCED)?;
        Ok(())
    }
}

fn read_calib(i2c: &I2c) -> Result<CalibrationSet> {
    // 0x88 - 0xA1
    let mut block_a = [0u8; calibration::BLOCK_A_LEN];
    i2c.write_read(&[REG_CALIB_00], &mut block_a)?;
    // 0xE1 - 0xE7
    let mut block_b = [0u8; calibration::BLOCK_B_LEN];
    i2c.write_read(&[REG_CALIB_26], &mut block_b)?;

    CalibrationSet::decode(&block_a, &block_b)
}

fn read_data(i2c: &I2c) -> Result<RawSample> {
    // 0xF7 - 0xFE
    let mut data = [0u8; compensation::BURST_LEN];
    i2c.write_read(&[REG_ADC_VALUE], &mut data)?;
    Ok(RawSample::from_burst(&data))
}
