use std::convert::TryFrom;

use crate::error::{Error, Result};
use crate::hcsr04::EchoTiming;
use crate::touch::TouchConfig;
use crate::{bh1750, bme280, dht22, hcsr04, touch};

pub const DEFAULT_I2C_BUS: u8 = 1;

pub const USAGE: &str = "\
USAGE:
    rpsensors bme280 [i2c_bus] [i2c_address]
    rpsensors bh1750 [i2c_bus] [i2c_address]
    rpsensors dht22 [gpio_pin]
    rpsensors hcsr04 [trigger_pin] [echo_pin] [poll|edge]
    rpsensors touch [ttp223|mpr121] [i2c_bus] [i2c_address] [gpio_pin]

Numbers are decimal or 0x-prefixed hexadecimal. Set RUST_LOG for diagnostics.";

/// What to read and where, fully resolved before any hardware is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorConfig {
    Bme280 { bus: u8, address: u16 },
    Bh1750 { bus: u8, address: u16 },
    Dht22 { pin: u8 },
    HcSr04 { trigger_pin: u8, echo_pin: u8, timing: EchoTiming },
    Touch(TouchConfig),
}

fn parse_int<T>(name: &'static str, s: &str) -> Result<T>
where
    T: TryFrom<u32>,
{
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => s.parse::<u32>().ok(),
    };
    parsed
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| Error::InvalidArgument {
            name,
            value: s.to_string(),
        })
}

fn arg<T>(args: &[&str], index: usize, name: &'static str, default: T) -> Result<T>
where
    T: TryFrom<u32>,
{
    match args.get(index) {
        Some(s) => parse_int(name, s),
        None => Ok(default),
    }
}

impl SensorConfig {
    /// `args` excludes the program name. The first element selects the sensor,
    /// the rest are positional and fall back to the usual wiring.
    pub fn from_args(args: &[&str]) -> Result<Self> {
        let (sensor, rest) = match args.split_first() {
            Some((sensor, rest)) => (*sensor, rest),
            None => return Err(Error::UnknownSensor(String::new())),
        };

        match sensor {
            "bme280" => Ok(SensorConfig::Bme280 {
                bus: arg(rest, 0, "i2c bus", DEFAULT_I2C_BUS)?,
                address: arg(rest, 1, "i2c address", bme280::DEFAULT_ADDRESS)?,
            }),
            "bh1750" => Ok(SensorConfig::Bh1750 {
                bus: arg(rest, 0, "i2c bus", DEFAULT_I2C_BUS)?,
                address: arg(rest, 1, "i2c address", bh1750::DEFAULT_ADDRESS)?,
            }),
            "dht22" => Ok(SensorConfig::Dht22 {
                pin: dht22::check_pin(arg(rest, 0, "gpio pin", dht22::DEFAULT_PIN)?)?,
            }),
            "hcsr04" => Ok(SensorConfig::HcSr04 {
                trigger_pin: arg(rest, 0, "trigger pin", hcsr04::DEFAULT_TRIGGER_PIN)?,
                echo_pin: arg(rest, 1, "echo pin", hcsr04::DEFAULT_ECHO_PIN)?,
                timing: match rest.get(2) {
                    Some(s) => s.parse()?,
                    None => EchoTiming::default(),
                },
            }),
            "touch" => {
                let kind = rest.first().copied().unwrap_or("ttp223");
                let bus = arg(rest, 1, "i2c bus", DEFAULT_I2C_BUS)?;
                let address = arg(rest, 2, "i2c address", touch::MPR121_DEFAULT_ADDRESS)?;
                let pin = arg(rest, 3, "gpio pin", touch::DEFAULT_PIN)?;
                match kind {
                    "ttp223" => Ok(SensorConfig::Touch(TouchConfig::Ttp223 { pin })),
                    "mpr121" => Ok(SensorConfig::Touch(TouchConfig::Mpr121 { bus, address })),
                    other => Err(Error::UnknownTouchSensor(other.to_string())),
                }
            }
            other => Err(Error::UnknownSensor(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_usual_wiring() {
        assert_eq!(
            SensorConfig::from_args(&["bme280"]).unwrap(),
            SensorConfig::Bme280 {
                bus: 1,
                address: 0x76
            }
        );
        assert_eq!(
            SensorConfig::from_args(&["hcsr04"]).unwrap(),
            SensorConfig::HcSr04 {
                trigger_pin: 23,
                echo_pin: 24,
                timing: EchoTiming::Poll
            }
        );
        assert_eq!(
            SensorConfig::from_args(&["touch"]).unwrap(),
            SensorConfig::Touch(TouchConfig::Ttp223 { pin: 17 })
        );
    }

    #[test]
    fn accepts_hex_and_decimal() {
        assert_eq!(
            SensorConfig::from_args(&["bh1750", "0", "0x5c"]).unwrap(),
            SensorConfig::Bh1750 {
                bus: 0,
                address: 0x5C
            }
        );
        assert_eq!(
            SensorConfig::from_args(&["bme280", "1", "119"]).unwrap(),
            SensorConfig::Bme280 {
                bus: 1,
                address: 0x77
            }
        );
    }

    #[test]
    fn selects_backends_statically() {
        assert_eq!(
            SensorConfig::from_args(&["hcsr04", "5", "6", "edge"]).unwrap(),
            SensorConfig::HcSr04 {
                trigger_pin: 5,
                echo_pin: 6,
                timing: EchoTiming::Edge
            }
        );
        assert_eq!(
            SensorConfig::from_args(&["touch", "mpr121", "1", "0x5B"]).unwrap(),
            SensorConfig::Touch(TouchConfig::Mpr121 {
                bus: 1,
                address: 0x5B
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            SensorConfig::from_args(&["sht31"]),
            Err(Error::UnknownSensor(_))
        ));
        assert!(matches!(
            SensorConfig::from_args(&["touch", "cap1188"]),
            Err(Error::UnknownTouchSensor(_))
        ));
        assert!(matches!(
            SensorConfig::from_args(&["bme280", "one"]),
            Err(Error::InvalidArgument { .. })
        ));
        // bus must fit in a u8
        assert!(matches!(
            SensorConfig::from_args(&["bme280", "300"]),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            SensorConfig::from_args(&["dht22", "3"]),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
