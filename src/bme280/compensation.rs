//! Floating point compensation formulas from the BME280 datasheet (section 8.1).
//!
//! Temperature goes first: its intermediate `t_fine` feeds both the pressure
//! and the humidity polynomials. Nothing here rounds; see [`crate::report`].

use log::{debug, warn};

use super::calibration::CalibrationSet;

/// Length of the ADC burst at 0xF7 - 0xFE.
pub const BURST_LEN: usize = 8;

/// Uncompensated ADC counts of one measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// 20 bits.
    pub raw_pressure: u32,
    /// 20 bits.
    pub raw_temperature: u32,
    /// 16 bits.
    pub raw_humidity: u32,
}

impl RawSample {
    pub fn from_burst(data: &[u8; BURST_LEN]) -> Self {
        let data = (*data).map(u32::from);
        RawSample {
            raw_pressure: (data[0] << 12) | (data[1] << 4) | (data[2] >> 4),
            raw_temperature: (data[3] << 12) | (data[4] << 4) | (data[5] >> 4),
            raw_humidity: (data[6] << 8) | data[7],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensatedReading {
    pub temperature_c: f64,
    pub pressure_hpa: f64,
    /// Always within [0, 100].
    pub humidity_pct: f64,
}

/// Returns `t_fine`. The temperature in degrees Celsius is `t_fine / 5120`.
pub fn t_fine(calib: &CalibrationSet, raw_temperature: u32) -> f64 {
    let raw = f64::from(raw_temperature);
    let t1 = f64::from(calib.t1);

    let var1 = (raw / 16384.0 - t1 / 1024.0) * f64::from(calib.t2);
    let d = raw / 131072.0 - t1 / 8192.0;
    let var2 = d * d * f64::from(calib.t3);
    var1 + var2
}

pub fn compensate_temperature(t_fine: f64) -> f64 {
    t_fine / 5120.0
}

/// Pressure in hPa. Returns 0 when the `p1` scaled divisor vanishes.
pub fn compensate_pressure(calib: &CalibrationSet, raw_pressure: u32, t_fine: f64) -> f64 {
    let mut var1 = t_fine / 2.0 - 64000.0;
    let mut var2 = var1 * var1 * f64::from(calib.p6) / 32768.0;
    var2 += var1 * f64::from(calib.p5) * 2.0;
    var2 = var2 / 4.0 + f64::from(calib.p4) * 65536.0;
    var1 = (f64::from(calib.p3) * var1 * var1 / 524288.0 + f64::from(calib.p2) * var1) / 524288.0;
    var1 = (1.0 + var1 / 32768.0) * f64::from(calib.p1);
    if var1 == 0.0 {
        warn!("pressure divisor is zero (p1 = {}), reporting 0", calib.p1);
        return 0.0;
    }

    let mut p = 1048576.0 - f64::from(raw_pressure);
    p = ((p - var2 / 4096.0) * 6250.0) / var1;
    var1 = f64::from(calib.p9) * p * p / 2147483648.0;
    var2 = p * f64::from(calib.p8) / 32768.0;
    (p + (var1 + var2 + f64::from(calib.p7)) / 16.0) / 100.0
}

/// Relative humidity in percent, clamped to [0, 100]. Returns 0 when
/// `t_fine` is exactly 76800.
pub fn compensate_humidity(calib: &CalibrationSet, raw_humidity: u32, t_fine: f64) -> f64 {
    let mut h = t_fine - 76800.0;
    if h == 0.0 {
        warn!("humidity divisor is zero (t_fine = 76800), reporting 0");
        return 0.0;
    }

    h = (f64::from(raw_humidity) - (f64::from(calib.h4) * 64.0 + f64::from(calib.h5) / 16384.0 * h))
        * (f64::from(calib.h2) / 65536.0
            * (1.0
                + f64::from(calib.h6) / 67108864.0
                    * h
                    * (1.0 + f64::from(calib.h3) / 67108864.0 * h)));
    h *= 1.0 - f64::from(calib.h1) * h / 524288.0;

    // NaN falls through to 0
    if h > 100.0 {
        100.0
    } else if h > 0.0 {
        h
    } else {
        0.0
    }
}

pub fn compensate(calib: &CalibrationSet, sample: &RawSample) -> CompensatedReading {
    let t_fine = t_fine(calib, sample.raw_temperature);
    debug!("t_fine = {}", t_fine);

    CompensatedReading {
        temperature_c: compensate_temperature(t_fine),
        pressure_hpa: compensate_pressure(calib, sample.raw_pressure, t_fine),
        humidity_pct: compensate_humidity(calib, sample.raw_humidity, t_fine),
    }
}
