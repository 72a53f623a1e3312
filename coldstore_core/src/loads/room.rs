//! # Room Geometry and Construction
//!
//! Geometry, envelope insulation, design and ambient conditions, and the
//! internal usage pattern (doors, people, lighting, fans, defrost) of one
//! cold room.
//!
//! ## Example
//!
//! ```rust
//! use coldstore_core::loads::{RoomSpec, SurfaceInsulation, AmbientConditions, RoomUsage};
//!
//! let panel = SurfaceInsulation::new(0.15, 0.024);
//! let room = RoomSpec {
//!     label: "Freezer 1".to_string(),
//!     length_m: 10.0,
//!     width_m: 8.0,
//!     height_m: 4.0,
//!     walls: panel,
//!     ceiling: panel,
//!     floor: panel,
//!     design_temp_c: -18.0,
//!     ambient: AmbientConditions::new(35.0, 60.0),
//!     usage: RoomUsage::default(),
//! };
//!
//! assert_eq!(room.volume_m3(), 320.0);
//! assert_eq!(room.envelope_area_m2(), 304.0);
//! assert!(room.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{ClimateZone, DefrostMethod, DoorUsage, InsulationMaterial, ThermalCatalog};
use crate::errors::{first_error, CalcError, CalcResult};

/// Insulation layer of one envelope surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceInsulation {
    pub thickness_m: f64,
    pub conductivity_w_mk: f64,
    /// Temperature on the far side when it is not the ambient (ground,
    /// corridor, neighbouring cold room)
    #[serde(default)]
    pub adjacent_c: Option<f64>,
}

impl SurfaceInsulation {
    pub fn new(thickness_m: f64, conductivity_w_mk: f64) -> Self {
        SurfaceInsulation {
            thickness_m,
            conductivity_w_mk,
            adjacent_c: None,
        }
    }

    /// Insulation of a catalog material
    pub fn of_material(
        material: InsulationMaterial,
        thickness_m: f64,
        catalog: &ThermalCatalog,
    ) -> CalcResult<Self> {
        Ok(SurfaceInsulation::new(thickness_m, catalog.insulation(material)?))
    }

    /// Set the far-side temperature
    pub fn with_adjacent(mut self, adjacent_c: f64) -> Self {
        self.adjacent_c = Some(adjacent_c);
        self
    }

    /// Thermal conductance per unit area, k / thickness (W/m²·K)
    pub fn conductance_w_m2k(&self) -> f64 {
        self.conductivity_w_mk / self.thickness_m
    }

    fn validation_errors(&self, surface: &str) -> Vec<CalcError> {
        let mut errors = Vec::new();
        if !(self.thickness_m > 0.0) {
            errors.push(CalcError::invalid_input(
                format!("{}.thickness_m", surface),
                self.thickness_m.to_string(),
                "Insulation thickness must be positive",
            ));
        }
        if !(self.conductivity_w_mk > 0.0) {
            errors.push(CalcError::invalid_input(
                format!("{}.conductivity_w_mk", surface),
                self.conductivity_w_mk.to_string(),
                "Thermal conductivity must be positive",
            ));
        }
        if errors.is_empty() && !self.conductance_w_m2k().is_finite() {
            errors.push(CalcError::invalid_input(
                format!("{}.conductivity_w_mk", surface),
                self.conductivity_w_mk.to_string(),
                "Thermal conductance is not finite",
            ));
        }
        errors
    }
}

/// Outdoor design conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientConditions {
    pub design_temp_c: f64,
    pub relative_humidity_pct: f64,
}

impl AmbientConditions {
    pub fn new(design_temp_c: f64, relative_humidity_pct: f64) -> Self {
        AmbientConditions {
            design_temp_c,
            relative_humidity_pct,
        }
    }

    /// Tabulated design conditions for a climate zone
    pub fn for_climate(zone: ClimateZone, catalog: &ThermalCatalog) -> CalcResult<Self> {
        let c = catalog.climate(zone)?;
        Ok(AmbientConditions::new(c.design_temp_c, c.relative_humidity_pct))
    }
}

/// Internal heat sources and door traffic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomUsage {
    pub door_usage: DoorUsage,
    pub people: u32,
    /// Hours per day people work inside
    pub occupancy_hours: f64,
    pub lighting_w_m2: f64,
    pub lighting_hours: f64,
    /// Evaporator fan motors, running continuously (W)
    pub fan_power_w: f64,
    /// Defrost heater power (W)
    pub defrost_power_w: f64,
    pub defrost_hours_per_day: f64,
    pub defrost_method: DefrostMethod,
}

impl Default for RoomUsage {
    fn default() -> Self {
        RoomUsage {
            door_usage: DoorUsage::Normal,
            people: 0,
            occupancy_hours: 0.0,
            lighting_w_m2: 0.0,
            lighting_hours: 0.0,
            fan_power_w: 0.0,
            defrost_power_w: 0.0,
            defrost_hours_per_day: 0.0,
            defrost_method: DefrostMethod::Electric,
        }
    }
}

impl RoomUsage {
    fn validation_errors(&self) -> Vec<CalcError> {
        let mut errors = Vec::new();
        for (field, hours) in [
            ("usage.occupancy_hours", self.occupancy_hours),
            ("usage.lighting_hours", self.lighting_hours),
            ("usage.defrost_hours_per_day", self.defrost_hours_per_day),
        ] {
            if !(0.0..=24.0).contains(&hours) {
                errors.push(CalcError::invalid_input(
                    field,
                    hours.to_string(),
                    "Hours per day must be between 0 and 24",
                ));
            }
        }
        for (field, power) in [
            ("usage.lighting_w_m2", self.lighting_w_m2),
            ("usage.fan_power_w", self.fan_power_w),
            ("usage.defrost_power_w", self.defrost_power_w),
        ] {
            if !(power >= 0.0 && power.is_finite()) {
                errors.push(CalcError::invalid_input(field, power.to_string(), "Power cannot be negative"));
            }
        }
        errors
    }
}

/// One cold room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub label: String,
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    pub walls: SurfaceInsulation,
    pub ceiling: SurfaceInsulation,
    pub floor: SurfaceInsulation,
    /// Room air design temperature (°C)
    pub design_temp_c: f64,
    pub ambient: AmbientConditions,
    #[serde(default)]
    pub usage: RoomUsage,
}

impl RoomSpec {
    pub fn floor_area_m2(&self) -> f64 {
        self.length_m * self.width_m
    }

    /// Total area of the four walls
    pub fn wall_area_m2(&self) -> f64 {
        2.0 * (self.length_m + self.width_m) * self.height_m
    }

    /// Walls, ceiling and floor
    pub fn envelope_area_m2(&self) -> f64 {
        self.wall_area_m2() + 2.0 * self.floor_area_m2()
    }

    pub fn volume_m3(&self) -> f64 {
        self.floor_area_m2() * self.height_m
    }

    /// Envelope surfaces with their areas
    pub fn surfaces(&self) -> [(&'static str, f64, &SurfaceInsulation); 3] {
        [
            ("walls", self.wall_area_m2(), &self.walls),
            ("ceiling", self.floor_area_m2(), &self.ceiling),
            ("floor", self.floor_area_m2(), &self.floor),
        ]
    }

    /// Overall envelope conductance UA (W/K)
    pub fn ua_w_k(&self) -> f64 {
        self.surfaces()
            .iter()
            .map(|(_, area, ins)| area * ins.conductance_w_m2k())
            .sum()
    }

    /// Every problem with the room
    pub fn validation_errors(&self) -> Vec<CalcError> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("length_m", self.length_m),
            ("width_m", self.width_m),
            ("height_m", self.height_m),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                errors.push(CalcError::invalid_input(field, value.to_string(), "Room dimensions must be positive"));
            }
        }

        errors.extend(self.walls.validation_errors("walls"));
        errors.extend(self.ceiling.validation_errors("ceiling"));
        errors.extend(self.floor.validation_errors("floor"));

        if !(self.ambient.design_temp_c > self.design_temp_c) {
            errors.push(CalcError::invalid_input(
                "ambient.design_temp_c",
                self.ambient.design_temp_c.to_string(),
                format!(
                    "Ambient temperature must exceed the room design temperature ({} °C)",
                    self.design_temp_c
                ),
            ));
        }

        let rh = self.ambient.relative_humidity_pct;
        if !(rh > 0.0 && rh <= 100.0) {
            errors.push(CalcError::invalid_input(
                "ambient.relative_humidity_pct",
                rh.to_string(),
                "Relative humidity must be in (0, 100]",
            ));
        }

        errors.extend(self.usage.validation_errors());
        errors
    }

    pub fn validate(&self) -> CalcResult<()> {
        first_error(self.validation_errors())
    }
}
