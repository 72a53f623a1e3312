//! Product load input: what enters the room each day and how fast it must
//! be brought down to storage temperature.

use serde::{Deserialize, Serialize};

use crate::catalog::PackagingMaterial;
use crate::errors::{first_error, CalcError, CalcResult};

/// Packaging that enters with the product and is cooled with it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Packaging {
    /// Packaging mass as a fraction of product mass
    pub mass_fraction: f64,
    pub specific_heat_kj_kgk: f64,
}

impl Packaging {
    pub fn of_material(material: PackagingMaterial, mass_fraction: f64) -> Self {
        Packaging {
            mass_fraction,
            specific_heat_kj_kgk: material.specific_heat_kj_kgk(),
        }
    }
}

/// Daily product intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLoad {
    /// Thermal catalog key, e.g. `"beef"`
    pub product: String,
    pub mass_per_day_kg: f64,
    pub entry_temp_c: f64,
    pub target_temp_c: f64,
    /// Time allowed to bring a day's intake down to target (h)
    pub pull_down_hours: f64,
    /// Respiration rate overriding the catalog (W/t)
    #[serde(default)]
    pub respiration_w_per_t: Option<f64>,
    /// Stock held in the room, intake included. Defaults to the room's
    /// storage capacity for the product.
    #[serde(default)]
    pub stored_mass_kg: Option<f64>,
    #[serde(default)]
    pub packaging: Option<Packaging>,
}

impl ProductLoad {
    /// Product intake without respiration override, storage mass or packaging
    pub fn new(
        product: impl Into<String>,
        mass_per_day_kg: f64,
        entry_temp_c: f64,
        target_temp_c: f64,
        pull_down_hours: f64,
    ) -> Self {
        ProductLoad {
            product: product.into(),
            mass_per_day_kg,
            entry_temp_c,
            target_temp_c,
            pull_down_hours,
            respiration_w_per_t: None,
            stored_mass_kg: None,
            packaging: None,
        }
    }

    pub fn validation_errors(&self) -> Vec<CalcError> {
        let mut errors = Vec::new();

        if self.product.trim().is_empty() {
            errors.push(CalcError::invalid_input("product", "", "Product key cannot be empty"));
        }
        if !(self.mass_per_day_kg >= 0.0 && self.mass_per_day_kg.is_finite()) {
            errors.push(CalcError::invalid_input(
                "mass_per_day_kg",
                self.mass_per_day_kg.to_string(),
                "Product mass cannot be negative",
            ));
        }
        if !(self.entry_temp_c >= self.target_temp_c) {
            errors.push(CalcError::invalid_input(
                "entry_temp_c",
                self.entry_temp_c.to_string(),
                format!(
                    "Entry temperature must not be below the target temperature ({} °C)",
                    self.target_temp_c
                ),
            ));
        }
        if !(self.pull_down_hours > 0.0) {
            errors.push(CalcError::invalid_input(
                "pull_down_hours",
                self.pull_down_hours.to_string(),
                "Pull-down time must be positive",
            ));
        }
        if let Some(rate) = self.respiration_w_per_t {
            if !(rate >= 0.0) {
                errors.push(CalcError::invalid_input(
                    "respiration_w_per_t",
                    rate.to_string(),
                    "Respiration rate cannot be negative",
                ));
            }
        }
        if let Some(stored) = self.stored_mass_kg {
            if !(stored >= 0.0) {
                errors.push(CalcError::invalid_input(
                    "stored_mass_kg",
                    stored.to_string(),
                    "Stored mass cannot be negative",
                ));
            }
        }
        if let Some(p) = self.packaging {
            if !(0.0..=1.0).contains(&p.mass_fraction) {
                errors.push(CalcError::invalid_input(
                    "packaging.mass_fraction",
                    p.mass_fraction.to_string(),
                    "Packaging fraction must be between 0 and 1",
                ));
            }
            if !(p.specific_heat_kj_kgk > 0.0) {
                errors.push(CalcError::invalid_input(
                    "packaging.specific_heat_kj_kgk",
                    p.specific_heat_kj_kgk.to_string(),
                    "Specific heat must be positive",
                ));
            }
        }

        errors
    }

    pub fn validate(&self) -> CalcResult<()> {
        first_error(self.validation_errors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_below_target_rejected() {
        let load = ProductLoad::new("apples", 1000.0, -5.0, 0.0, 24.0);
        match load.validate() {
            Err(CalcError::InvalidInput { field, .. }) => assert_eq!(field, "entry_temp_c"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_equal_entry_and_target_allowed() {
        assert!(ProductLoad::new("beef", 1000.0, -18.0, -18.0, 24.0).validate().is_ok());
    }

    #[test]
    fn test_zero_pull_down_rejected() {
        let load = ProductLoad::new("beef", 1000.0, 5.0, -18.0, 0.0);
        assert!(load.validate().is_err());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let mut load = ProductLoad::new("apples", 2000.0, 10.0, 0.0, 24.0);
        load.stored_mass_kg = Some(-1.0);
        assert_eq!(load.validation_errors().len(), 1);
    }

    #[test]
    fn test_packaging_fraction_checked() {
        let mut load = ProductLoad::new("apples", 2000.0, 10.0, 0.0, 24.0);
        load.packaging = Some(Packaging::of_material(PackagingMaterial::Wood, 1.5));
        assert_eq!(load.validation_errors().len(), 1);
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "product": "beef",
            "mass_per_day_kg": 500.0,
            "entry_temp_c": 5.0,
            "target_temp_c": -18.0,
            "pull_down_hours": 24.0
        }"#;
        let load: ProductLoad = serde_json::from_str(json).unwrap();
        assert_eq!(load, ProductLoad::new("beef", 500.0, 5.0, -18.0, 24.0));
    }
}
