use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A calibration block read from the BME280 did not have the expected length.
    #[error("malformed calibration block {block}: expected {expected} bytes, got {actual}")]
    MalformedCalibration {
        block: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("i2c: {0}")]
    I2c(#[from] rppal::i2c::Error),

    #[error("gpio: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    /// A GPIO edge did not arrive in time.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    Checksum { expected: u8, actual: u8 },

    #[error("invalid {name}: {value}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("Unknown sensor type: {0}")]
    UnknownTouchSensor(String),
}
