//! # Heat Load Calculator
//!
//! Computes the refrigeration load of one cold room from its envelope,
//! product intake and internal gains.
//!
//! ## Load Terms
//!
//! | Term | Model |
//! |------|-------|
//! | Transmission | Σ (k/δ)·A·(t_far − t_room) over walls, ceiling, floor |
//! | Product | m·Δh / pull-down time, including latent heat across freezing |
//! | Respiration | rate (W/t) × stored tonnes, produce only |
//! | Infiltration | V·n·f_door·ρ·(h_amb − h_room) / 86 400 s |
//! | Occupancy | people × (272 − 6·t) × hours/24 |
//! | Lighting | W/m² × floor area × hours/24 |
//! | Fan motor | installed fan power, continuous |
//! | Defrost | heater power × hours/24 |
//!
//! The total applies the configured safety margin to the sum:
//! `total = subtotal × (1 + safety_margin)`.
//!
//! Two derived loads are reported next to it, both with the margin applied:
//!
//! - **Equipment load** (air coolers): the total with the product terms
//!   raised by the pull-down factor for large pull-downs
//! - **Mechanical load** (compressors): transmission, product terms by the
//!   volume diversity factor and operational terms by the operational
//!   diversity factor, times the piping factor
//!
//! [`SizingBasis`] picks which loads the selectors work against.
//!
//! ## Example
//!
//! ```rust
//! use coldstore_core::catalog::ThermalCatalog;
//! use coldstore_core::config::DesignConfig;
//! use coldstore_core::loads::{
//!     compute_load, AmbientConditions, LoadTerm, ProductLoad, RoomSpec, RoomUsage,
//!     SurfaceInsulation,
//! };
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
//! let product = ProductLoad::new("beef", 2000.0, -10.0, -18.0, 24.0);
//!
//! let load = compute_load(&room, &product, &DesignConfig::new(0.1), ThermalCatalog::standard()).unwrap();
//! assert!(load.term_w(LoadTerm::Transmission) > 0.0);
//! assert!(load.total_w > load.subtotal_w);
//! ```

pub mod load_terms;
pub mod product;
pub mod psychrometrics;
pub mod room;

pub use load_terms::LoadTerm;
pub use product::{Packaging, ProductLoad};
pub use room::{AmbientConditions, RoomSpec, RoomUsage, SurfaceInsulation};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::ThermalCatalog;
use crate::config::{DesignConfig, SizingBasis};
use crate::errors::{first_error, CalcError, CalcResult};

/// Room load broken down by term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBreakdown {
    /// Every term, zero when it does not apply (W)
    pub terms: BTreeMap<LoadTerm, f64>,
    pub subtotal_w: f64,
    pub safety_margin: f64,
    pub total_w: f64,

    pub volume_m3: f64,
    /// Envelope conductance (W/K)
    pub ua_w_k: f64,
    pub air_changes_per_day: f64,
    pub ambient_enthalpy_kj_kg: f64,
    pub room_enthalpy_kj_kg: f64,

    /// Product the room holds at its volume utilisation (kg)
    pub storage_capacity_kg: f64,
    /// Stock the respiration term was computed for (kg)
    pub stored_mass_kg: f64,

    /// Multiplier on the product terms in the equipment load
    pub pull_down_factor: f64,
    /// Diversity on the product terms in the mechanical load
    pub product_diversity: f64,
    /// Load the air coolers must cover at full pull-down (W)
    pub equipment_load_w: f64,
    /// Diversified load the compressors must cover (W)
    pub mechanical_load_w: f64,
}

/// Capacity each equipment group must provide (kW)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequiredCapacity {
    pub air_cooler_kw: f64,
    pub compressor_kw: f64,
}

impl LoadBreakdown {
    /// Value of one term (W)
    pub fn term_w(&self, term: LoadTerm) -> f64 {
        self.terms.get(&term).copied().unwrap_or(0.0)
    }

    /// Required refrigeration capacity (kW)
    pub fn total_kw(&self) -> f64 {
        self.total_w / 1000.0
    }

    /// Capacities the selectors work against
    pub fn required(&self, basis: SizingBasis) -> RequiredCapacity {
        match basis {
            SizingBasis::Total => RequiredCapacity {
                air_cooler_kw: self.total_kw(),
                compressor_kw: self.total_kw(),
            },
            SizingBasis::Diversified => RequiredCapacity {
                air_cooler_kw: self.equipment_load_w / 1000.0,
                compressor_kw: self.mechanical_load_w / 1000.0,
            },
        }
    }

    /// Largest contributing term
    pub fn dominant_term(&self) -> Option<LoadTerm> {
        self.terms
            .iter()
            .filter(|(_, w)| **w > 0.0)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(t, _)| *t)
    }
}

/// Compute the heat load of a room.
///
/// # Errors
///
/// - `InvalidInput` for non-positive dimensions, thickness or conductivity,
///   ambient not above design temperature, entry below target temperature,
///   a safety margin outside [0, 1], or an unknown product key.
pub fn compute_load(
    room: &RoomSpec,
    product: &ProductLoad,
    config: &DesignConfig,
    catalog: &ThermalCatalog,
) -> CalcResult<LoadBreakdown> {
    validate(room, product, config, catalog)?;
    let props = catalog.product(&product.product).map_err(|_| unknown_product(product))?;

    let mut terms = BTreeMap::new();

    // Transmission
    let mut transmission = 0.0;
    for (name, area, insulation) in room.surfaces() {
        let q = load_terms::surface_transmission_w(
            area,
            insulation,
            room.ambient.design_temp_c,
            room.design_temp_c,
        );
        debug!(surface = name, area_m2 = area, watts = q, "transmission");
        transmission += q;
    }
    terms.insert(LoadTerm::Transmission, transmission);

    // Product and respiration
    let volume_m3 = room.volume_m3();
    let storage_capacity_kg = catalog.storage_capacity_kg(volume_m3, props);
    let stored_mass_kg = product.stored_mass_kg.unwrap_or(storage_capacity_kg);
    terms.insert(LoadTerm::Product, load_terms::product_w(product, props));
    terms.insert(
        LoadTerm::Respiration,
        load_terms::respiration_w(product, props, stored_mass_kg),
    );

    // Air change
    let air_changes_per_day = catalog.air_changes_per_day(volume_m3, room.design_temp_c);
    let ambient_enthalpy_kj_kg = psychrometrics::enthalpy_kj_kg(
        room.ambient.design_temp_c,
        room.ambient.relative_humidity_pct,
    );
    let room_enthalpy_kj_kg =
        psychrometrics::enthalpy_kj_kg(room.design_temp_c, config.room_relative_humidity_pct);
    let room_density = psychrometrics::density_kg_m3(room.design_temp_c, config.room_relative_humidity_pct);
    terms.insert(
        LoadTerm::Infiltration,
        load_terms::infiltration_w(
            volume_m3,
            air_changes_per_day,
            catalog.door_usage_factor(room.usage.door_usage),
            room_density,
            ambient_enthalpy_kj_kg - room_enthalpy_kj_kg,
        ),
    );

    // Internal gains
    let usage = &room.usage;
    terms.insert(
        LoadTerm::Occupancy,
        load_terms::occupancy_w(
            usage.people,
            catalog.occupant_heat_w(room.design_temp_c),
            usage.occupancy_hours,
        ),
    );
    terms.insert(
        LoadTerm::Lighting,
        load_terms::lighting_w(usage.lighting_w_m2, room.floor_area_m2(), usage.lighting_hours),
    );
    terms.insert(LoadTerm::FanMotor, usage.fan_power_w);
    terms.insert(
        LoadTerm::Defrost,
        load_terms::defrost_w(usage.defrost_power_w, usage.defrost_hours_per_day),
    );

    for (term, watts) in &terms {
        debug!(room = %room.label, term = term.display_name(), watts, "load term");
    }

    let subtotal_w: f64 = terms.values().sum();
    let margin = 1.0 + config.safety_margin;
    let total_w = subtotal_w * margin;

    let sizing = &config.sizing;
    let of = |term: LoadTerm| terms.get(&term).copied().unwrap_or(0.0);
    let product_terms_w = of(LoadTerm::Product) + of(LoadTerm::Respiration);
    let operational_w = of(LoadTerm::Infiltration)
        + of(LoadTerm::Occupancy)
        + of(LoadTerm::Lighting)
        + of(LoadTerm::FanMotor)
        + of(LoadTerm::Defrost);

    let pull_down_factor = sizing.pull_down_multiplier(product.entry_temp_c, product.target_temp_c);
    let product_diversity = sizing.product_diversity(volume_m3, room.design_temp_c);
    let equipment_load_w = (subtotal_w + (pull_down_factor - 1.0) * product_terms_w) * margin;
    let mechanical_load_w = (of(LoadTerm::Transmission)
        + product_diversity * product_terms_w
        + sizing.operational_diversity * operational_w)
        * sizing.piping_factor
        * margin;

    debug!(
        room = %room.label,
        subtotal_w,
        total_w,
        equipment_load_w,
        mechanical_load_w,
        "room load"
    );

    Ok(LoadBreakdown {
        terms,
        subtotal_w,
        safety_margin: config.safety_margin,
        total_w,
        volume_m3,
        ua_w_k: room.ua_w_k(),
        air_changes_per_day,
        ambient_enthalpy_kj_kg,
        room_enthalpy_kj_kg,
        storage_capacity_kg,
        stored_mass_kg,
        pull_down_factor,
        product_diversity,
        equipment_load_w,
        mechanical_load_w,
    })
}

fn unknown_product(product: &ProductLoad) -> CalcError {
    CalcError::invalid_input("product", &product.product, "Product not found in thermal catalog")
}

/// Every validation problem across room, product and configuration,
/// including a product key missing from the catalog
pub fn validation_errors(
    room: &RoomSpec,
    product: &ProductLoad,
    config: &DesignConfig,
    catalog: &ThermalCatalog,
) -> Vec<CalcError> {
    let mut errors = room.validation_errors();
    errors.extend(product.validation_errors());
    if !product.product.trim().is_empty() && catalog.product(&product.product).is_err() {
        errors.push(unknown_product(product));
    }
    errors.extend(config.validation_errors());
    errors
}

/// First validation problem across room, product and configuration
pub fn validate(
    room: &RoomSpec,
    product: &ProductLoad,
    config: &DesignConfig,
    catalog: &ThermalCatalog,
) -> CalcResult<()> {
    first_error(validation_errors(room, product, config, catalog))
}
