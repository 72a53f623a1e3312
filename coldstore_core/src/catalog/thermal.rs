//! Thermal Property Catalog
//!
//! Reference data consulted by the heat load calculator: insulation
//! conductivities, product properties, air changes by room volume, door
//! usage factors, occupant heat and ambient design conditions.
//!
//! The catalog is plain data. [`ThermalCatalog::standard`] returns the
//! built-in tables, initialised once per process; an externally sourced
//! catalog can be deserialized from JSON with the same shape.
//!
//! ## Example
//!
//! ```rust
//! use coldstore_core::catalog::{ThermalCatalog, InsulationMaterial};
//!
//! let catalog = ThermalCatalog::standard();
//! let k = catalog.insulation(InsulationMaterial::Polyurethane).unwrap();
//! assert!(k > 0.0 && k < 0.05);
//!
//! let beef = catalog.product("beef").unwrap();
//! assert!(beef.freezing_point_c < 0.0);
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::products::{standard_products, ProductCategory, ProductProperties};
use crate::errors::{CalcError, CalcResult};

static STANDARD_THERMAL: Lazy<ThermalCatalog> = Lazy::new(ThermalCatalog::build_standard);

/// Insulation material for walls, ceiling and floor panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsulationMaterial {
    /// Rigid polyurethane foam (sandwich panels)
    Polyurethane,
    /// Polyisocyanurate foam
    Polyisocyanurate,
    /// Extruded polystyrene (typical for floors)
    ExtrudedPolystyrene,
    /// Expanded polystyrene
    ExpandedPolystyrene,
    /// Mineral wool
    MineralWool,
}

impl InsulationMaterial {
    /// All materials for iteration
    pub const ALL: [InsulationMaterial; 5] = [
        InsulationMaterial::Polyurethane,
        InsulationMaterial::Polyisocyanurate,
        InsulationMaterial::ExtrudedPolystyrene,
        InsulationMaterial::ExpandedPolystyrene,
        InsulationMaterial::MineralWool,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            InsulationMaterial::Polyurethane => "Polyurethane (PUR)",
            InsulationMaterial::Polyisocyanurate => "Polyisocyanurate (PIR)",
            InsulationMaterial::ExtrudedPolystyrene => "Extruded Polystyrene (XPS)",
            InsulationMaterial::ExpandedPolystyrene => "Expanded Polystyrene (EPS)",
            InsulationMaterial::MineralWool => "Mineral Wool",
        }
    }
}

/// How often the room's doors are opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoorUsage {
    /// Long-term storage, doors rarely opened
    Light,
    /// Typical distribution storage
    #[default]
    Normal,
    /// Frequent forklift traffic, dispatch rooms
    Heavy,
}

/// Climate zone with tabulated summer design conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateZone {
    Cold,
    Temperate,
    HotDry,
    HotHumid,
    Tropical,
}

/// Insulation conductivity row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsulationEntry {
    pub material: InsulationMaterial,
    /// Thermal conductivity at mean panel temperature (W/m·K)
    pub conductivity_w_mk: f64,
}

/// Air changes per 24 h for rooms up to `max_volume_m3`
///
/// A bracket with no upper bound covers every larger room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirChangeBracket {
    pub max_volume_m3: Option<f64>,
    /// Rooms held at or above 0 °C
    pub above_freezing: f64,
    /// Rooms held below 0 °C
    pub below_freezing: f64,
}

/// Multipliers on the tabulated air changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorUsageFactors {
    pub light: f64,
    pub normal: f64,
    pub heavy: f64,
}

/// Heat released per occupant: `base_w - per_degree_w * t_room`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupantHeat {
    pub base_w: f64,
    pub per_degree_w: f64,
}

/// Summer design conditions for a climate zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateEntry {
    pub zone: ClimateZone,
    pub design_temp_c: f64,
    pub relative_humidity_pct: f64,
}

/// Volume utilisation: fraction of gross room volume occupied by goods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeUtilisation {
    pub max_volume_m3: Option<f64>,
    pub fraction: f64,
}

/// The Thermal Property Catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalCatalog {
    pub insulation: Vec<InsulationEntry>,
    pub products: BTreeMap<String, ProductProperties>,
    pub air_changes: Vec<AirChangeBracket>,
    pub door_usage: DoorUsageFactors,
    pub occupant_heat: OccupantHeat,
    pub climates: Vec<ClimateEntry>,
    pub volume_utilisation: Vec<VolumeUtilisation>,
    /// Correction applied to volume utilisation for produce rooms
    pub produce_utilisation_factor: f64,
}

impl ThermalCatalog {
    /// The built-in catalog, shared process-wide
    pub fn standard() -> &'static ThermalCatalog {
        &STANDARD_THERMAL
    }

    fn build_standard() -> ThermalCatalog {
        use InsulationMaterial::*;
        ThermalCatalog {
            insulation: vec![
                InsulationEntry { material: Polyurethane, conductivity_w_mk: 0.024 },
                InsulationEntry { material: Polyisocyanurate, conductivity_w_mk: 0.022 },
                InsulationEntry { material: ExtrudedPolystyrene, conductivity_w_mk: 0.030 },
                InsulationEntry { material: ExpandedPolystyrene, conductivity_w_mk: 0.035 },
                InsulationEntry { material: MineralWool, conductivity_w_mk: 0.040 },
            ],
            products: standard_products()
                .into_iter()
                .map(|(key, props)| (key.to_string(), props))
                .collect(),
            // ASHRAE average air changes per 24 h from door openings and
            // infiltration, volume converted from ft³
            air_changes: vec![
                bracket(Some(10.0), 38.0, 29.0),
                bracket(Some(20.0), 26.0, 20.0),
                bracket(Some(40.0), 17.5, 13.5),
                bracket(Some(100.0), 9.5, 7.4),
                bracket(Some(150.0), 7.2, 5.6),
                bracket(Some(300.0), 4.9, 3.8),
                bracket(Some(750.0), 3.0, 2.3),
                bracket(Some(1500.0), 2.1, 1.6),
                bracket(Some(3000.0), 1.4, 1.1),
                bracket(None, 1.0, 0.8),
            ],
            door_usage: DoorUsageFactors { light: 0.6, normal: 1.0, heavy: 2.0 },
            occupant_heat: OccupantHeat { base_w: 272.0, per_degree_w: 6.0 },
            climates: vec![
                climate(ClimateZone::Cold, 28.0, 60.0),
                climate(ClimateZone::Temperate, 32.0, 60.0),
                climate(ClimateZone::HotDry, 40.0, 30.0),
                climate(ClimateZone::HotHumid, 35.0, 70.0),
                climate(ClimateZone::Tropical, 34.0, 80.0),
            ],
            volume_utilisation: vec![
                VolumeUtilisation { max_volume_m3: Some(1_000.0), fraction: 0.40 },
                VolumeUtilisation { max_volume_m3: Some(2_000.0), fraction: 0.50 },
                VolumeUtilisation { max_volume_m3: Some(10_000.0), fraction: 0.55 },
                VolumeUtilisation { max_volume_m3: Some(15_000.0), fraction: 0.60 },
                VolumeUtilisation { max_volume_m3: None, fraction: 0.62 },
            ],
            produce_utilisation_factor: 0.8,
        }
    }

    /// Look up a product by key
    pub fn product(&self, key: &str) -> CalcResult<&ProductProperties> {
        self.products
            .get(key)
            .ok_or_else(|| CalcError::unknown_entry("product", key))
    }

    /// Look up insulation conductivity (W/m·K)
    pub fn insulation(&self, material: InsulationMaterial) -> CalcResult<f64> {
        self.insulation
            .iter()
            .find(|e| e.material == material)
            .map(|e| e.conductivity_w_mk)
            .ok_or_else(|| CalcError::unknown_entry("insulation", format!("{:?}", material)))
    }

    /// Air changes per 24 h for a room of `volume_m3` held at `design_temp_c`.
    ///
    /// Picks the first bracket whose upper bound is at or above the volume.
    pub fn air_changes_per_day(&self, volume_m3: f64, design_temp_c: f64) -> f64 {
        let bracket = self
            .air_changes
            .iter()
            .find(|b| b.max_volume_m3.map_or(true, |max| volume_m3 <= max))
            .or_else(|| self.air_changes.last());

        match bracket {
            Some(b) if design_temp_c >= 0.0 => b.above_freezing,
            Some(b) => b.below_freezing,
            None => 0.0,
        }
    }

    /// Multiplier on air changes for the door usage pattern
    pub fn door_usage_factor(&self, usage: DoorUsage) -> f64 {
        match usage {
            DoorUsage::Light => self.door_usage.light,
            DoorUsage::Normal => self.door_usage.normal,
            DoorUsage::Heavy => self.door_usage.heavy,
        }
    }

    /// Heat released by one person working in a room at `design_temp_c` (W)
    pub fn occupant_heat_w(&self, design_temp_c: f64) -> f64 {
        self.occupant_heat.base_w - self.occupant_heat.per_degree_w * design_temp_c
    }

    /// Summer design conditions for a climate zone
    pub fn climate(&self, zone: ClimateZone) -> CalcResult<&ClimateEntry> {
        self.climates
            .iter()
            .find(|c| c.zone == zone)
            .ok_or_else(|| CalcError::unknown_entry("climate", format!("{:?}", zone)))
    }

    /// Estimated storage capacity of a room for a product (kg)
    pub fn storage_capacity_kg(&self, volume_m3: f64, product: &ProductProperties) -> f64 {
        let mut fraction = self
            .volume_utilisation
            .iter()
            .find(|v| v.max_volume_m3.map_or(true, |max| volume_m3 <= max))
            .map(|v| v.fraction)
            .unwrap_or(0.0);
        if product.category == ProductCategory::Produce {
            fraction *= self.produce_utilisation_factor;
        }
        volume_m3 * fraction * product.storage_density_kg_m3
    }
}

fn bracket(max_volume_m3: Option<f64>, above_freezing: f64, below_freezing: f64) -> AirChangeBracket {
    AirChangeBracket {
        max_volume_m3,
        above_freezing,
        below_freezing,
    }
}

fn climate(zone: ClimateZone, design_temp_c: f64, relative_humidity_pct: f64) -> ClimateEntry {
    ClimateEntry {
        zone,
        design_temp_c,
        relative_humidity_pct,
    }
}
