//! Individual heat load terms.
//!
//! Each function returns a continuous heat gain in watts. They take plain
//! numbers so they can be checked in isolation; [`compute_load`](super::compute_load)
//! wires them to the room, product and catalogs.

use serde::{Deserialize, Serialize};

use super::product::ProductLoad;
use super::room::SurfaceInsulation;
use crate::catalog::ProductProperties;
use crate::units::SECONDS_PER_DAY;

/// Heat load components
///
/// Declaration order is the order they are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoadTerm {
    /// Conduction through walls, ceiling and floor
    Transmission,
    /// Cooling (and freezing) of incoming product and packaging
    Product,
    /// Respiration heat of stored fruit and vegetables
    Respiration,
    /// Warm moist air entering through doors
    Infiltration,
    /// People working inside
    Occupancy,
    Lighting,
    /// Evaporator fan motors
    FanMotor,
    /// Defrost heaters
    Defrost,
}

impl LoadTerm {
    pub const ALL: [LoadTerm; 8] = [
        LoadTerm::Transmission,
        LoadTerm::Product,
        LoadTerm::Respiration,
        LoadTerm::Infiltration,
        LoadTerm::Occupancy,
        LoadTerm::Lighting,
        LoadTerm::FanMotor,
        LoadTerm::Defrost,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            LoadTerm::Transmission => "Transmission",
            LoadTerm::Product => "Product",
            LoadTerm::Respiration => "Respiration",
            LoadTerm::Infiltration => "Air change",
            LoadTerm::Occupancy => "Occupancy",
            LoadTerm::Lighting => "Lighting",
            LoadTerm::FanMotor => "Fan motors",
            LoadTerm::Defrost => "Defrost",
        }
    }
}

/// Conduction through one surface: U·A·(t_far − t_room)
pub fn surface_transmission_w(
    area_m2: f64,
    insulation: &SurfaceInsulation,
    ambient_c: f64,
    design_temp_c: f64,
) -> f64 {
    let far_side_c = insulation.adjacent_c.unwrap_or(ambient_c);
    insulation.conductance_w_m2k() * area_m2 * (far_side_c - design_temp_c)
}

/// Heat removed from the daily product intake, spread over the pull-down time
pub fn product_w(load: &ProductLoad, props: &ProductProperties) -> f64 {
    let mut kj = load.mass_per_day_kg * props.heat_removed_kj_kg(load.entry_temp_c, load.target_temp_c);
    if let Some(p) = load.packaging {
        kj += load.mass_per_day_kg
            * p.mass_fraction
            * p.specific_heat_kj_kgk
            * (load.entry_temp_c - load.target_temp_c);
    }
    kj * 1000.0 / (load.pull_down_hours * 3600.0)
}

/// Respiration rates (W/t) of the day's intake and of the stored stock.
///
/// The intake respires at the mean of the catalog rates at its entry and
/// target temperatures while it cools; the stock at the target rate. Rates
/// come from the tabulated temperature nearest each value. An explicit
/// override applies to both. `None` for non-respiring products without one.
pub fn respiration_rates_w_per_t(load: &ProductLoad, props: &ProductProperties) -> Option<(f64, f64)> {
    if let Some(rate) = load.respiration_w_per_t {
        return Some((rate, rate));
    }
    if !props.category.respires() {
        return None;
    }
    let stock = props.respiration_w_per_t(load.target_temp_c)?;
    let entry = props.respiration_w_per_t(load.entry_temp_c).unwrap_or(stock);
    Some(((entry + stock) / 2.0, stock))
}

/// Respiration heat of the day's intake and the rest of the stock.
///
/// `stored_mass_kg` is everything held in the room, intake included.
pub fn respiration_w(load: &ProductLoad, props: &ProductProperties, stored_mass_kg: f64) -> f64 {
    let Some((intake_rate, stock_rate)) = respiration_rates_w_per_t(load, props) else {
        return 0.0;
    };
    let intake_t = load.mass_per_day_kg / 1000.0;
    let rest_t = (stored_mass_kg - load.mass_per_day_kg).max(0.0) / 1000.0;
    intake_t * intake_rate + rest_t * stock_rate
}

/// Air change load.
///
/// `volume · changes/day · usage factor` is the daily volume of room air
/// replaced; each kilogram of it carries `enthalpy_diff_kj_kg` that the
/// coolers must remove. A negative enthalpy difference contributes nothing.
pub fn infiltration_w(
    volume_m3: f64,
    air_changes_per_day: f64,
    door_usage_factor: f64,
    room_air_density_kg_m3: f64,
    enthalpy_diff_kj_kg: f64,
) -> f64 {
    volume_m3 * air_changes_per_day * door_usage_factor * room_air_density_kg_m3 * enthalpy_diff_kj_kg.max(0.0)
        * 1000.0
        / SECONDS_PER_DAY
}

/// Occupant heat averaged over the day
pub fn occupancy_w(people: u32, heat_per_person_w: f64, hours_per_day: f64) -> f64 {
    f64::from(people) * heat_per_person_w * hours_per_day / 24.0
}

/// Lighting heat averaged over the day
pub fn lighting_w(w_per_m2: f64, floor_area_m2: f64, hours_per_day: f64) -> f64 {
    w_per_m2 * floor_area_m2 * hours_per_day / 24.0
}

/// Defrost heat averaged over the day
pub fn defrost_w(power_w: f64, hours_per_day: f64) -> f64 {
    power_w * hours_per_day / 24.0
}
