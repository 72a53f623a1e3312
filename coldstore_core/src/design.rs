//! # Design Orchestrator
//!
//! Runs one room from input to equipment: validation, heat load, operating
//! point, air cooler and compressor selection, energy estimate.
//!
//! [`design`] never fails outright. Problems are collected in
//! [`DesignResult::errors`] with `valid = false`, and whatever was computed
//! before the failure (e.g. the load breakdown) is kept. Input problems,
//! including the operating point and a cascade's intermediate temperature,
//! are all reported together before any equipment is selected.
//!
//! ## Example
//!
//! ```rust
//! use coldstore_core::catalog::Catalogs;
//! use coldstore_core::design::DesignInput;
//!
//! let input = DesignInput::example();
//! let result = input.design(&Catalogs::standard());
//!
//! assert!(result.valid, "{:?}", result.errors);
//! assert!(result.selection.is_some());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::Catalogs;
use crate::config::DesignConfig;
use crate::errors::{CalcError, CalcResult};
use crate::loads::{
    self, compute_load, AmbientConditions, LoadBreakdown, ProductLoad, RequiredCapacity, RoomSpec,
    RoomUsage, SurfaceInsulation,
};
use crate::selection::{
    intermediate_temperature, select_system, OperatingPoint, SystemKind, SystemSelection,
};
use crate::units::HOURS_PER_YEAR;

/// Everything needed to design one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignInput {
    pub room: RoomSpec,
    pub product: ProductLoad,
    pub config: DesignConfig,
}

impl DesignInput {
    pub fn design(&self, catalogs: &Catalogs) -> DesignResult {
        design(&self.room, &self.product, &self.config, catalogs)
    }

    /// A frozen beef store, used by the CLI `example` command
    pub fn example() -> Self {
        let panel = SurfaceInsulation::new(0.15, 0.024);
        DesignInput {
            room: RoomSpec {
                label: "Frozen store 1".to_string(),
                length_m: 10.0,
                width_m: 8.0,
                height_m: 4.0,
                walls: panel,
                ceiling: panel,
                floor: SurfaceInsulation::new(0.12, 0.030).with_adjacent(10.0),
                design_temp_c: -18.0,
                ambient: AmbientConditions::new(35.0, 60.0),
                usage: RoomUsage {
                    people: 2,
                    occupancy_hours: 4.0,
                    lighting_w_m2: 8.0,
                    lighting_hours: 8.0,
                    fan_power_w: 500.0,
                    defrost_power_w: 4500.0,
                    defrost_hours_per_day: 2.0,
                    ..RoomUsage::default()
                },
            },
            product: ProductLoad::new("beef", 3000.0, -8.0, -18.0, 24.0),
            config: DesignConfig::new(0.1),
        }
    }
}

/// Compressor, fan and defrost power with annual consumption
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    pub compressor_power_kw: f64,
    pub fan_power_kw: f64,
    /// Air cooler defrost heaters averaged over the day
    pub defrost_power_kw: f64,
    pub total_input_kw: f64,
    /// Refrigeration delivered per unit of electrical input
    pub system_cop: f64,
    pub run_time_fraction: f64,
    pub annual_energy_kwh: f64,
}

/// Outcome of a room design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignResult {
    pub label: String,
    pub load: Option<LoadBreakdown>,
    /// Capacities the equipment was selected against
    pub required: Option<RequiredCapacity>,
    pub operating: Option<OperatingPoint>,
    pub selection: Option<SystemSelection>,
    pub energy: Option<EnergyEstimate>,
    pub valid: bool,
    pub errors: Vec<CalcError>,
}

impl DesignResult {
    fn failed(label: &str, errors: Vec<CalcError>) -> Self {
        DesignResult {
            label: label.to_string(),
            load: None,
            required: None,
            operating: None,
            selection: None,
            energy: None,
            valid: false,
            errors,
        }
    }

    /// Required compressor capacity (kW), when the load was computed
    pub fn required_kw(&self) -> Option<f64> {
        self.required.map(|r| r.compressor_kw)
    }
}

/// Evaporating and condensing temperatures for a room.
///
/// Evaporating is the room temperature less the evaporator approach,
/// condensing the ambient plus the condenser approach, unless overridden.
pub fn operating_point(room: &RoomSpec, config: &DesignConfig) -> CalcResult<OperatingPoint> {
    let evaporating_c = config
        .evaporating_override_c
        .unwrap_or(room.design_temp_c - config.evaporator_approach_k);
    let condensing_c = config
        .condensing_override_c
        .unwrap_or(room.ambient.design_temp_c + config.condenser_approach_k);

    if !(evaporating_c < room.design_temp_c) {
        return Err(CalcError::invalid_input(
            "evaporating_override_c",
            evaporating_c.to_string(),
            "Evaporating temperature must be below the room temperature",
        ));
    }
    if !(condensing_c > evaporating_c) {
        return Err(CalcError::invalid_input(
            "condensing_override_c",
            condensing_c.to_string(),
            "Condensing temperature must exceed the evaporating temperature",
        ));
    }
    Ok(OperatingPoint::new(evaporating_c, condensing_c, room.design_temp_c))
}

/// Energy figures for a selection, if every compressor has a power figure.
///
/// Defrost heaters of the selected air coolers count for
/// `defrost_hours_per_day` out of 24.
pub fn energy_estimate(
    required_kw: f64,
    selection: &SystemSelection,
    run_time_fraction: f64,
    defrost_hours_per_day: f64,
) -> Option<EnergyEstimate> {
    let compressor_power_kw = selection.compressor_power_kw()?;
    let air_cooler = selection.air_cooler();
    let fan_power_kw = air_cooler.fan_power_kw;
    let defrost_power_kw = air_cooler.defrost_power_kw * defrost_hours_per_day / 24.0;
    let total_input_kw = compressor_power_kw + fan_power_kw + defrost_power_kw;
    Some(EnergyEstimate {
        compressor_power_kw,
        fan_power_kw,
        defrost_power_kw,
        total_input_kw,
        system_cop: required_kw / total_input_kw,
        run_time_fraction,
        annual_energy_kwh: total_input_kw * HOURS_PER_YEAR * run_time_fraction,
    })
}

/// Every input problem of a design: room, product (including the catalog
/// lookup), configuration, operating point and, for a cascade, the
/// intermediate temperature.
pub fn validation_errors(
    room: &RoomSpec,
    product: &ProductLoad,
    config: &DesignConfig,
    catalogs: &Catalogs,
) -> Vec<CalcError> {
    let mut errors = loads::validation_errors(room, product, config, catalogs.thermal);

    match operating_point(room, config) {
        Ok(op) => {
            let kind = SystemKind::for_evaporating(op.evaporating_c, config.cascade_threshold_c);
            if kind == SystemKind::Cascade {
                if let Err(e) =
                    intermediate_temperature(op.evaporating_c, op.condensing_c, &config.cascade)
                {
                    errors.push(e);
                }
            }
        }
        Err(e) => errors.push(e),
    }

    errors
}

/// Design one room.
///
/// Input problems are reported together; later stages stop at their first
/// failure.
pub fn design(
    room: &RoomSpec,
    product: &ProductLoad,
    config: &DesignConfig,
    catalogs: &Catalogs,
) -> DesignResult {
    let errors = validation_errors(room, product, config, catalogs);
    if !errors.is_empty() {
        warn!(room = %room.label, count = errors.len(), "invalid design input");
        return DesignResult::failed(&room.label, errors);
    }

    let load = match compute_load(room, product, config, catalogs.thermal) {
        Ok(load) => load,
        Err(e) => {
            warn!(room = %room.label, error = %e, "load calculation failed");
            return DesignResult::failed(&room.label, vec![e]);
        }
    };
    let required = load.required(config.sizing.basis);

    let mut result = DesignResult {
        label: room.label.clone(),
        load: Some(load),
        required: Some(required),
        operating: None,
        selection: None,
        energy: None,
        valid: false,
        errors: Vec::new(),
    };

    let op = match operating_point(room, config) {
        Ok(op) => op,
        Err(e) => {
            warn!(room = %room.label, error = %e, "no operating point");
            result.errors.push(e);
            return result;
        }
    };
    result.operating = Some(op);

    info!(
        room = %room.label,
        air_cooler_kw = required.air_cooler_kw,
        compressor_kw = required.compressor_kw,
        evaporating_c = op.evaporating_c,
        condensing_c = op.condensing_c,
        "designing"
    );

    match select_system(
        required,
        &op,
        room.usage.defrost_method,
        catalogs.equipment,
        config,
    ) {
        Ok(selection) => {
            result.energy = energy_estimate(
                required.compressor_kw,
                &selection,
                config.run_time_fraction,
                room.usage.defrost_hours_per_day,
            );
            result.selection = Some(selection);
            result.valid = true;
            info!(room = %room.label, compressor_kw = required.compressor_kw, "design complete");
        }
        Err(e) => {
            warn!(room = %room.label, error = %e, "equipment selection failed");
            result.errors.push(e);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DefrostMethod, EquipmentCatalog, ThermalCatalog};
    use crate::config::SizingBasis;

    fn catalogs() -> Catalogs<'static> {
        Catalogs::standard()
    }

    #[test]
    fn test_example_is_single_stage() {
        let result = DesignInput::example().design(&catalogs());
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.errors.is_empty());
        let op = result.operating.unwrap();
        assert_eq!(op.evaporating_c, -26.0);
        assert_eq!(op.condensing_c, 45.0);
        assert_eq!(result.selection.as_ref().unwrap().kind(), SystemKind::SingleStage);
    }

    #[test]
    fn test_deep_freezer_is_cascade() {
        let mut input = DesignInput::example();
        input.room.design_temp_c = -40.0;
        input.product = ProductLoad::new("ice_cream", 2000.0, -25.0, -40.0, 24.0);
        let result = input.design(&catalogs());
        assert!(result.valid, "{:?}", result.errors);
        let selection = result.selection.unwrap();
        assert_eq!(selection.kind(), SystemKind::Cascade);
        if let SystemSelection::Cascade { intermediate_c, .. } = selection {
            assert!(-48.0 < intermediate_c && intermediate_c < 45.0);
        }
    }

    #[test]
    fn test_energy_estimate() {
        let result = DesignInput::example().design(&catalogs());
        let energy = result.energy.unwrap();
        let required = result.required_kw().unwrap();
        let cooler = result.selection.as_ref().unwrap().air_cooler().clone();
        // 2 h of defrost per day
        assert!((energy.defrost_power_kw - cooler.defrost_power_kw * 2.0 / 24.0).abs() < 1e-12);
        assert!(energy.defrost_power_kw > 0.0);
        let parts = energy.compressor_power_kw + energy.fan_power_kw + energy.defrost_power_kw;
        assert!((energy.total_input_kw - parts).abs() < 1e-12);
        assert!((energy.system_cop - required / energy.total_input_kw).abs() < 1e-12);
        assert!((energy.annual_energy_kwh - energy.total_input_kw * 8760.0 * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_input_collects_all_errors() {
        let mut input = DesignInput::example();
        input.room.width_m = 0.0;
        input.product = ProductLoad::new("apples", 1000.0, -5.0, 0.0, 24.0);
        input.config.safety_margin = 3.0;
        let result = input.design(&catalogs());
        assert!(!result.valid);
        assert!(result.load.is_none());
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors.iter().all(|e| e.error_code() == "INVALID_INPUT"));
    }

    #[test]
    fn test_entry_below_target_reported() {
        let mut input = DesignInput::example();
        input.product = ProductLoad::new("beef", 1000.0, -5.0, 0.0, 24.0);
        let result = input.design(&catalogs());
        assert!(!result.valid);
        assert!(matches!(result.errors[0], CalcError::InvalidInput { .. }));
    }

    #[test]
    fn test_oversized_load_reports_no_candidate() {
        let mut input = DesignInput::example();
        input.room.length_m = 200.0;
        input.room.width_m = 100.0;
        input.room.height_m = 12.0;
        input.product.mass_per_day_kg = 400_000.0;
        let result = input.design(&catalogs());
        assert!(!result.valid);
        assert!(result.load.is_some());
        match &result.errors[0] {
            CalcError::NoCandidate {
                required_kw,
                max_available_kw,
                ..
            } => {
                assert!(required_kw > max_available_kw);
                assert!(*max_available_kw > 0.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_product_reported() {
        let mut input = DesignInput::example();
        input.product.product = "kumquat".to_string();
        let result = input.design(&catalogs());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
    }

    fn fields(result: &DesignResult) -> Vec<&str> {
        result
            .errors
            .iter()
            .map(|e| match e {
                CalcError::InvalidInput { field, .. } => field.as_str(),
                other => panic!("unexpected: {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_unknown_product_reported_with_other_problems() {
        let mut input = DesignInput::example();
        input.room.width_m = 0.0;
        input.product.product = "kumquat".to_string();
        input.config.evaporating_override_c = Some(-10.0);
        let result = input.design(&catalogs());
        assert!(!result.valid);
        assert_eq!(fields(&result), vec!["width_m", "product", "evaporating_override_c"]);
    }

    #[test]
    fn test_bad_intermediate_reported_before_selection() {
        let equipment = EquipmentCatalog::new(Vec::new()).unwrap();
        let catalogs = Catalogs::new(ThermalCatalog::standard(), &equipment);
        let mut input = DesignInput::example();
        input.room.design_temp_c = -40.0;
        input.product = ProductLoad::new("ice_cream", 2000.0, -25.0, -40.0, 24.0);
        input.config.cascade.intermediate_c = Some(80.0);
        let result = input.design(&catalogs);
        assert!(!result.valid);
        assert!(result.load.is_none());
        assert_eq!(fields(&result), vec!["cascade.intermediate_c"]);
    }

    #[test]
    fn test_intermediate_ignored_for_single_stage() {
        let mut input = DesignInput::example();
        input.config.cascade.intermediate_c = Some(80.0);
        let result = input.design(&catalogs());
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn test_diversified_sizing() {
        let mut input = DesignInput::example();
        input.product = ProductLoad::new("beef", 3000.0, 5.0, -18.0, 24.0);
        input.config.sizing.basis = SizingBasis::Diversified;
        let result = input.design(&catalogs());
        assert!(result.valid, "{:?}", result.errors);

        let load = result.load.as_ref().unwrap();
        let required = result.required.unwrap();
        assert!((required.air_cooler_kw - load.equipment_load_w / 1000.0).abs() < 1e-12);
        assert!((required.compressor_kw - load.mechanical_load_w / 1000.0).abs() < 1e-12);
        assert_eq!(result.required_kw(), Some(required.compressor_kw));

        match result.selection.as_ref().unwrap() {
            SystemSelection::SingleStage { air_cooler, compressor } => {
                assert_eq!(air_cooler.required_kw, required.air_cooler_kw);
                assert_eq!(compressor.required_kw, required.compressor_kw);
            }
            other => panic!("expected single stage, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_total_sizing_by_default() {
        let result = DesignInput::example().design(&catalogs());
        let total = result.load.as_ref().unwrap().total_kw();
        let required = result.required.unwrap();
        assert_eq!(required.air_cooler_kw, total);
        assert_eq!(required.compressor_kw, total);
    }

    #[test]
    fn test_overrides_shape_operating_point() {
        let mut config = DesignConfig::new(0.1);
        config.evaporating_override_c = Some(-25.0);
        config.condensing_override_c = Some(40.0);
        let room = DesignInput::example().room;
        let op = operating_point(&room, &config).unwrap();
        assert_eq!((op.evaporating_c, op.condensing_c), (-25.0, 40.0));

        config.evaporating_override_c = Some(-10.0);
        assert!(operating_point(&room, &config).is_err());
    }

    #[test]
    fn test_custom_catalogs() {
        let equipment = EquipmentCatalog::new(Vec::new()).unwrap();
        let catalogs = Catalogs::new(ThermalCatalog::standard(), &equipment);
        let result = DesignInput::example().design(&catalogs);
        assert!(!result.valid);
        match &result.errors[0] {
            CalcError::NoCandidate { stage, max_available_kw, .. } => {
                assert_eq!(stage, "air cooler");
                assert_eq!(*max_available_kw, 0.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_water_defrost_selects_water_series() {
        let mut input = DesignInput::example();
        input.room.design_temp_c = 2.0;
        input.room.usage.defrost_method = DefrostMethod::Water;
        input.product = ProductLoad::new("apples", 4000.0, 15.0, 2.0, 24.0);
        let result = input.design(&catalogs());
        assert!(result.valid, "{:?}", result.errors);
        let cooler = result.selection.unwrap().air_cooler().clone();
        assert!(cooler.model_id.starts_with("ACW"));
    }

    #[test]
    fn test_result_json_roundtrip() {
        let mut input = DesignInput::example();
        input.product.entry_temp_c = -30.0;
        let result = input.design(&catalogs());
        let json = serde_json::to_string(&result).unwrap();
        let parsed: DesignResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.valid, result.valid);
        assert_eq!(parsed.errors, result.errors);
    }

    #[test]
    fn test_input_json_roundtrip() {
        let input = DesignInput::example();
        let json = serde_json::to_string_pretty(&input).unwrap();
        let parsed: DesignInput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.room.label, input.room.label);
        assert_eq!(parsed.product, input.product);
    }
}
