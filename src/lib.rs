//! One-shot readers for sensors wired to a Raspberry Pi's I2C bus or GPIO
//! header. Each reading is returned as a [`Report`] that renders to a flat
//! JSON object.

pub mod bh1750;
pub mod bme280;
pub mod config;
pub mod dht22;
pub mod error;
pub mod hcsr04;
pub mod report;
pub mod touch;

pub use config::SensorConfig;
pub use error::{Error, Result};
pub use report::Report;

/// Takes one reading from the configured sensor.
pub fn read(config: SensorConfig) -> Result<Report> {
    match config {
        SensorConfig::Bme280 { bus, address } => {
            let mut sensor = bme280::Bme280::open(bus, address)?;
            Ok(sensor.measure()?.into())
        }
        SensorConfig::Bh1750 { bus, address } => Ok(Report::light(bh1750::read(bus, address)?)),
        SensorConfig::Dht22 { pin } => Ok(dht22::read(pin)?.into()),
        SensorConfig::HcSr04 {
            trigger_pin,
            echo_pin,
            timing,
        } => Ok(Report::distance(hcsr04::read(trigger_pin, echo_pin, timing)?)),
        SensorConfig::Touch(wiring) => Ok(touch::read(wiring)?.into()),
    }
}
