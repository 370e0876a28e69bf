//! Flat JSON objects written to stdout, one per invocation.
//!
//! Values are rounded here and nowhere else.

use serde::Serialize;

use crate::bme280::CompensatedReading;
use crate::dht22::Dht22Reading;
use crate::touch::TouchReading;

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Environment {
        temperature: f64,
        humidity: f64,
        pressure: f64,
    },
    Climate {
        temperature: f64,
        humidity: f64,
    },
    Light {
        lux: f64,
    },
    Distance {
        #[serde(rename = "distanceCm")]
        distance_cm: f64,
    },
    Touch {
        channels: Vec<u8>,
        values: Option<Vec<u16>>,
    },
}

impl Report {
    pub fn light(lux: f64) -> Self {
        Report::Light {
            lux: round_to(lux, 1),
        }
    }

    pub fn distance(cm: f64) -> Self {
        Report::Distance {
            distance_cm: round_to(cm, 1),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<CompensatedReading> for Report {
    fn from(reading: CompensatedReading) -> Self {
        Report::Environment {
            temperature: round_to(reading.temperature_c, 1),
            humidity: round_to(reading.humidity_pct, 1),
            pressure: round_to(reading.pressure_hpa, 2),
        }
    }
}

impl From<Dht22Reading> for Report {
    fn from(reading: Dht22Reading) -> Self {
        Report::Climate {
            temperature: round_to(reading.temperature_c, 1),
            humidity: round_to(reading.humidity_pct, 1),
        }
    }
}

impl From<TouchReading> for Report {
    fn from(reading: TouchReading) -> Self {
        Report::Touch {
            channels: reading.channels,
            values: reading.values,
        }
    }
}

/// Written to stderr when a reading fails.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: String,
}
