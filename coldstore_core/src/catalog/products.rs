//! Product thermal properties
//!
//! Specific heats, latent heat of fusion, initial freezing points, storage
//! densities and respiration rates for commonly stored goods.
//!
//! ## Data Source
//!
//! Values are rounded from the commodity tables of the ASHRAE Refrigeration
//! Handbook. Respiration rates are the midpoints of the published ranges.

use serde::{Deserialize, Serialize};

/// Broad product category
///
/// The category decides whether a product respires in storage and how much
/// of a room's volume it can usefully occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Meat,
    Poultry,
    Seafood,
    Dairy,
    Eggs,
    /// Fruit and vegetables (living tissue, respires)
    Produce,
    /// Already-frozen goods such as ice cream
    Frozen,
}

impl ProductCategory {
    /// Whether products in this category release respiration heat
    pub fn respires(&self) -> bool {
        matches!(self, ProductCategory::Produce)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProductCategory::Meat => "Meat",
            ProductCategory::Poultry => "Poultry",
            ProductCategory::Seafood => "Seafood",
            ProductCategory::Dairy => "Dairy",
            ProductCategory::Eggs => "Eggs",
            ProductCategory::Produce => "Fruit & Vegetables",
            ProductCategory::Frozen => "Frozen Goods",
        }
    }
}

/// Respiration heat at one tabulated storage temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespirationPoint {
    /// Storage temperature (°C)
    pub temp_c: f64,
    /// Heat of respiration (W per tonne of product)
    pub w_per_t: f64,
}

/// Thermal properties of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProperties {
    /// Human-readable name
    pub display_name: String,

    pub category: ProductCategory,

    /// Specific heat above the initial freezing point (kJ/kg·K)
    pub cp_above_kj_kgk: f64,

    /// Specific heat below the initial freezing point (kJ/kg·K)
    pub cp_below_kj_kgk: f64,

    /// Latent heat of fusion (kJ/kg)
    pub latent_heat_kj_kg: f64,

    /// Initial freezing point (°C)
    pub freezing_point_c: f64,

    /// Bulk storage density including racking gaps (kg/m³)
    pub storage_density_kg_m3: f64,

    /// Heat of respiration by temperature, ascending; empty for inert goods
    #[serde(default)]
    pub respiration: Vec<RespirationPoint>,
}

impl ProductProperties {
    /// Heat of respiration at the tabulated temperature nearest `temp_c`.
    ///
    /// Returns `None` if the product has no respiration data. Ties go to the
    /// lower tabulated temperature.
    pub fn respiration_w_per_t(&self, temp_c: f64) -> Option<f64> {
        let mut best: Option<&RespirationPoint> = None;
        for point in &self.respiration {
            let closer = match best {
                None => true,
                Some(b) => (temp_c - point.temp_c).abs() < (temp_c - b.temp_c).abs(),
            };
            if closer {
                best = Some(point);
            }
        }
        best.map(|p| p.w_per_t)
    }

    /// Heat to remove per kilogram when cooling from `entry_c` to `target_c`
    /// (kJ/kg), including latent heat if the range crosses the freezing point.
    pub fn heat_removed_kj_kg(&self, entry_c: f64, target_c: f64) -> f64 {
        let tf = self.freezing_point_c;
        let mut q = 0.0;

        if entry_c > tf {
            q += self.cp_above_kj_kgk * (entry_c - target_c.max(tf));
        }
        if entry_c > tf && target_c < tf {
            q += self.latent_heat_kj_kg;
        }
        if target_c < tf {
            q += self.cp_below_kj_kgk * (entry_c.min(tf) - target_c);
        }
        q
    }
}

/// Packaging material, for the sensible heat of crates and cartons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackagingMaterial {
    Wood,
    Cardboard,
    Plastic,
    Metal,
}

impl PackagingMaterial {
    /// Specific heat (kJ/kg·K)
    pub fn specific_heat_kj_kgk(&self) -> f64 {
        match self {
            PackagingMaterial::Wood => 2.51,
            PackagingMaterial::Cardboard => 1.47,
            PackagingMaterial::Plastic => 1.47,
            PackagingMaterial::Metal => 0.42,
        }
    }
}

fn product(
    display_name: &str,
    category: ProductCategory,
    cp_above: f64,
    cp_below: f64,
    latent: f64,
    freezing_point: f64,
    density: f64,
    respiration: &[(f64, f64)],
) -> ProductProperties {
    ProductProperties {
        display_name: display_name.to_string(),
        category,
        cp_above_kj_kgk: cp_above,
        cp_below_kj_kgk: cp_below,
        latent_heat_kj_kg: latent,
        freezing_point_c: freezing_point,
        storage_density_kg_m3: density,
        respiration: respiration
            .iter()
            .map(|&(temp_c, w_per_t)| RespirationPoint { temp_c, w_per_t })
            .collect(),
    }
}

/// Built-in product table, keyed by lower-case identifier
pub(crate) fn standard_products() -> Vec<(&'static str, ProductProperties)> {
    use ProductCategory::*;
    vec![
        ("beef", product("Beef", Meat, 3.14, 1.70, 234.0, -1.7, 400.0, &[])),
        ("pork", product("Pork", Meat, 2.85, 1.60, 210.0, -2.2, 400.0, &[])),
        ("poultry", product("Poultry", Poultry, 3.31, 1.55, 247.0, -2.8, 380.0, &[])),
        ("fish", product("Lean Fish", Seafood, 3.60, 1.88, 266.0, -2.2, 470.0, &[])),
        ("milk", product("Milk", Dairy, 3.93, 2.05, 290.0, -0.6, 500.0, &[])),
        ("eggs", product("Shell Eggs", Eggs, 3.20, 1.67, 232.0, -0.6, 300.0, &[])),
        ("ice_cream", product("Ice Cream", Frozen, 2.95, 1.63, 220.0, -5.6, 450.0, &[])),
        (
            "apples",
            product(
                "Apples",
                Produce,
                3.65,
                1.88,
                280.0,
                -1.5,
                300.0,
                &[(0.0, 11.0), (5.0, 18.0), (10.0, 51.0), (15.0, 66.0), (20.0, 82.0)],
            ),
        ),
        (
            "cabbage",
            product(
                "Cabbage",
                Produce,
                3.94,
                1.97,
                306.0,
                -0.9,
                280.0,
                &[(0.0, 23.0), (5.0, 36.0), (10.0, 55.0), (15.0, 85.0), (20.0, 120.0)],
            ),
        ),
        (
            "strawberries",
            product(
                "Strawberries",
                Produce,
                3.85,
                1.95,
                300.0,
                -0.8,
                250.0,
                &[(0.0, 45.0), (5.0, 75.0), (10.0, 170.0), (15.0, 260.0), (20.0, 390.0)],
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beef() -> ProductProperties {
        standard_products()
            .into_iter()
            .find(|(k, _)| *k == "beef")
            .map(|(_, p)| p)
            .unwrap()
    }

    fn apples() -> ProductProperties {
        standard_products()
            .into_iter()
            .find(|(k, _)| *k == "apples")
            .map(|(_, p)| p)
            .unwrap()
    }

    #[test]
    fn test_sensible_only_above_freezing() {
        let p = beef();
        // 10 °C -> 0 °C, stays above -1.7 °C
        let q = p.heat_removed_kj_kg(10.0, 0.0);
        assert!((q - 31.4).abs() < 1e-9);
    }

    #[test]
    fn test_freezing_adds_latent_heat() {
        let p = beef();
        // 5 °C -> -18 °C: 3.14*6.7 + 234 + 1.70*16.3
        let q = p.heat_removed_kj_kg(5.0, -18.0);
        let expected = 3.14 * 6.7 + 234.0 + 1.70 * 16.3;
        assert!((q - expected).abs() < 1e-9);
    }

    #[test]
    fn test_frozen_entry_sensible_below() {
        let p = beef();
        // already frozen: -10 °C -> -20 °C
        let q = p.heat_removed_kj_kg(-10.0, -20.0);
        assert!((q - 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_duty_when_equal() {
        assert_eq!(beef().heat_removed_kj_kg(-18.0, -18.0), 0.0);
        assert_eq!(beef().heat_removed_kj_kg(4.0, 4.0), 0.0);
    }

    #[test]
    fn test_respiration_nearest_point() {
        let p = apples();
        assert_eq!(p.respiration_w_per_t(1.0), Some(11.0));
        assert_eq!(p.respiration_w_per_t(4.0), Some(18.0));
        assert_eq!(p.respiration_w_per_t(-5.0), Some(11.0));
        // Exactly between 0 and 5: lower wins
        assert_eq!(p.respiration_w_per_t(2.5), Some(11.0));
        assert_eq!(beef().respiration_w_per_t(0.0), None);
    }

    #[test]
    fn test_category_respires() {
        assert!(ProductCategory::Produce.respires());
        assert!(!ProductCategory::Meat.respires());
    }
}
