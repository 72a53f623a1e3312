//! # Catalogs
//!
//! Read-only reference data shared by every calculation:
//!
//! - [`thermal`] - insulation, product properties, air changes, climate
//! - [`products`] - product property records and the built-in product table
//! - [`equipment`] - air coolers and compressors with correction curves
//!
//! Both catalogs have a built-in `standard()` instance and can be loaded
//! from JSON (see [`file_io`](crate::file_io)).

pub mod equipment;
pub mod products;
pub mod thermal;

pub use equipment::{
    carnot_cop, en12900, CapacityCorrection, DefrostMethod, Envelope, EnvelopeViolation,
    EquipmentCatalog, EquipmentEntry, EquipmentKind, PowerModel, RatingPoint, StageRole, TempRange,
};
pub use products::{PackagingMaterial, ProductCategory, ProductProperties, RespirationPoint};
pub use thermal::{ClimateZone, DoorUsage, InsulationMaterial, ThermalCatalog};

/// The two catalogs a design consults, passed together by reference
#[derive(Debug, Clone, Copy)]
pub struct Catalogs<'a> {
    pub thermal: &'a ThermalCatalog,
    pub equipment: &'a EquipmentCatalog,
}

impl<'a> Catalogs<'a> {
    pub fn new(thermal: &'a ThermalCatalog, equipment: &'a EquipmentCatalog) -> Self {
        Catalogs { thermal, equipment }
    }
}

impl Catalogs<'static> {
    /// The built-in thermal and equipment catalogs
    pub fn standard() -> Self {
        Catalogs {
            thermal: ThermalCatalog::standard(),
            equipment: EquipmentCatalog::standard(),
        }
    }
}
