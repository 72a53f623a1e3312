//! Moist air properties at standard atmospheric pressure.
//!
//! Correlations are closed-form and valid roughly from -50 °C to 50 °C,
//! which covers every room and ambient condition the calculator sees.

use crate::units::KELVIN_OFFSET;

/// Standard atmospheric pressure (Pa)
pub const ATMOSPHERIC_PRESSURE_PA: f64 = 101_325.0;

/// Saturation vapour pressure (Pa), Magnus-type fit in absolute temperature
pub fn saturation_pressure_pa(temp_c: f64) -> f64 {
    let t = temp_c + KELVIN_OFFSET;
    10f64.powf((10.286 * t - 2148.4909) / (t - 35.85))
}

/// Partial pressure of water vapour (Pa)
pub fn vapour_pressure_pa(temp_c: f64, relative_humidity_pct: f64) -> f64 {
    relative_humidity_pct / 100.0 * saturation_pressure_pa(temp_c)
}

/// Humidity ratio (kg water / kg dry air)
pub fn humidity_ratio(temp_c: f64, relative_humidity_pct: f64) -> f64 {
    let pv = vapour_pressure_pa(temp_c, relative_humidity_pct);
    0.622 * pv / (ATMOSPHERIC_PRESSURE_PA - pv)
}

/// Specific enthalpy of moist air (kJ/kg dry air), 0 °C dry air reference
pub fn enthalpy_kj_kg(temp_c: f64, relative_humidity_pct: f64) -> f64 {
    let w = humidity_ratio(temp_c, relative_humidity_pct);
    1.006 * temp_c + w * (2501.0 + 1.86 * temp_c)
}

/// Density of moist air (kg/m³)
pub fn density_kg_m3(temp_c: f64, relative_humidity_pct: f64) -> f64 {
    let psat_mpa = saturation_pressure_pa(temp_c) / 1.0e6;
    let phi = relative_humidity_pct / 100.0;
    1.293 * KELVIN_OFFSET / (KELVIN_OFFSET + temp_c) * (0.101325 - 0.0378 * phi * psat_mpa) / 0.1013
}
