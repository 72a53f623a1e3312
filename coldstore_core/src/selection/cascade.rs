//! # Cascade Selector
//!
//! Two refrigeration circuits joined by a cascade heat exchanger. The low
//! stage evaporates at the room's evaporating temperature and rejects its
//! heat into the heat exchanger; the high stage evaporates in that heat
//! exchanger and condenses at the design condensing temperature.
//!
//! ```text
//!   condensing ─────────────── high stage ──┐
//!   intermediate ── cascade HX ──────────────┘ ← low stage load + low stage work
//!   intermediate + approach ── low stage ───┐
//!   evaporating ─────────────── room load ──┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{select, EquipmentSelection, OperatingPoint, SelectionCriteria};
use crate::catalog::{carnot_cop, EquipmentCatalog, StageRole};
use crate::config::{CascadeConfig, CopEstimate, DesignConfig};
use crate::errors::{CalcError, CalcResult};
use crate::units::{Celsius, Kelvin};

/// Both stages of a cascade system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeDesign {
    pub low_stage: EquipmentSelection,
    pub high_stage: EquipmentSelection,
    pub intermediate_c: f64,
    /// Low stage load plus low stage work (kW)
    pub heat_exchanger_duty_kw: f64,
    pub low_stage_power_kw: f64,
}

/// Cascade heat exchanger temperature (°C).
///
/// Uses the configured value, otherwise the geometric mean of the absolute
/// evaporating and condensing temperatures. Fails unless it lies strictly
/// between the two.
pub fn intermediate_temperature(
    evaporating_c: f64,
    condensing_c: f64,
    config: &CascadeConfig,
) -> CalcResult<f64> {
    let intermediate_c = match config.intermediate_c {
        Some(t) => t,
        None => {
            let te: Kelvin = Celsius(evaporating_c).into();
            let tc: Kelvin = Celsius(condensing_c).into();
            let mean: Celsius = Kelvin((te.value() * tc.value()).sqrt()).into();
            mean.value()
        }
    };

    if !(evaporating_c < intermediate_c && intermediate_c < condensing_c) {
        return Err(CalcError::invalid_input(
            "cascade.intermediate_c",
            intermediate_c.to_string(),
            format!(
                "Intermediate temperature must lie strictly between evaporating ({} °C) and condensing ({} °C)",
                evaporating_c, condensing_c
            ),
        ));
    }
    Ok(intermediate_c)
}

/// Select low and high stage compressors for a low-temperature load.
///
/// # Errors
///
/// - `InvalidInput` if the intermediate temperature is not strictly between
///   evaporating and condensing
/// - `NoCandidate` with stage `"low"` or `"high"` when a stage cannot be covered
pub fn select_cascade(
    required_kw: f64,
    op: &OperatingPoint,
    catalog: &EquipmentCatalog,
    config: &DesignConfig,
) -> CalcResult<CascadeDesign> {
    let cascade = &config.cascade;
    let intermediate_c = intermediate_temperature(op.evaporating_c, op.condensing_c, cascade)?;

    let low_op = OperatingPoint::new(
        op.evaporating_c,
        intermediate_c + cascade.heat_exchanger_approach_k,
        op.room_c,
    );
    let high_op = OperatingPoint::new(intermediate_c, op.condensing_c, op.room_c);

    info!(
        intermediate_c,
        low_condensing_c = low_op.condensing_c,
        "cascade stages"
    );

    let low_stage = select(
        required_kw,
        &low_op,
        catalog,
        &SelectionCriteria::compressors(StageRole::Low, config.max_units_per_stage),
    )?;

    let low_stage_power_kw = match low_stage.power_input_kw {
        Some(p) => p,
        None => estimated_power_kw(required_kw, &low_op, cascade.low_stage_cop)?,
    };
    let heat_exchanger_duty_kw = required_kw + low_stage_power_kw;
    debug!(low_stage_power_kw, heat_exchanger_duty_kw, "cascade heat exchanger");

    let high_stage = select(
        heat_exchanger_duty_kw,
        &high_op,
        catalog,
        &SelectionCriteria::compressors(StageRole::High, config.max_units_per_stage),
    )?;

    Ok(CascadeDesign {
        low_stage,
        high_stage,
        intermediate_c,
        heat_exchanger_duty_kw,
        low_stage_power_kw,
    })
}

fn estimated_power_kw(load_kw: f64, op: &OperatingPoint, estimate: CopEstimate) -> CalcResult<f64> {
    let cop = match estimate {
        CopEstimate::Fixed(cop) => cop,
        CopEstimate::CarnotFraction(fraction) => {
            let carnot = carnot_cop(op.evaporating_c, op.condensing_c).ok_or_else(|| {
                CalcError::invalid_input(
                    "cascade.heat_exchanger_approach_k",
                    op.condensing_c.to_string(),
                    "Low stage condensing temperature must exceed evaporating temperature",
                )
            })?;
            fraction * carnot
        }
    };
    Ok(load_kw / cop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CapacityCorrection, EquipmentEntry};

    fn deep_freeze_point() -> OperatingPoint {
        OperatingPoint::new(-48.0, 45.0, -40.0)
    }

    #[test]
    fn test_geometric_mean_intermediate() {
        let t = intermediate_temperature(-48.0, 45.0, &CascadeConfig::default()).unwrap();
        let expected = (225.15f64 * 318.15).sqrt() - 273.15;
        assert!((t - expected).abs() < 1e-9);
        assert!(-48.0 < t && t < 45.0);
    }

    #[test]
    fn test_configured_intermediate_outside_range() {
        let config = CascadeConfig {
            intermediate_c: Some(50.0),
            ..CascadeConfig::default()
        };
        let err = intermediate_temperature(-48.0, 45.0, &config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let config = CascadeConfig {
            intermediate_c: Some(-48.0),
            ..CascadeConfig::default()
        };
        assert!(intermediate_temperature(-48.0, 45.0, &config).is_err());
    }

    #[test]
    fn test_cascade_with_polynomial_low_stage() {
        let design = select_cascade(
            20.0,
            &deep_freeze_point(),
            EquipmentCatalog::standard(),
            &DesignConfig::new(0.1),
        )
        .unwrap();

        assert_eq!(design.low_stage.model_id, "CDS3001B");
        let low_power = design.low_stage.power_input_kw.unwrap();
        assert_eq!(design.low_stage_power_kw, low_power);
        assert!((design.heat_exchanger_duty_kw - (20.0 + low_power)).abs() < 1e-9);
        assert_eq!(design.high_stage.required_kw, design.heat_exchanger_duty_kw);
        assert!(design.high_stage.total_capacity_kw >= design.heat_exchanger_duty_kw);

        // Stage operating points hang off the intermediate temperature
        assert_eq!(design.high_stage.operating.evaporating_c, design.intermediate_c);
        assert!((design.low_stage.operating.condensing_c - (design.intermediate_c + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_cop_estimate_used_without_power_model() {
        let mut catalog = EquipmentCatalog::standard().clone();
        for e in catalog.entries.iter_mut().filter(|e| e.role == StageRole::Low) {
            e.power = None;
        }
        let mut config = DesignConfig::new(0.1);
        config.cascade.low_stage_cop = CopEstimate::Fixed(2.0);

        let design = select_cascade(20.0, &deep_freeze_point(), &catalog, &config).unwrap();
        assert!((design.low_stage_power_kw - 10.0).abs() < 1e-9);
        assert!((design.heat_exchanger_duty_kw - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_carnot_fraction_estimate() {
        let op = OperatingPoint::new(-40.0, 0.0, -32.0);
        let p = estimated_power_kw(10.0, &op, CopEstimate::CarnotFraction(0.5)).unwrap();
        // Carnot 233.15 / 40
        let expected = 10.0 / (0.5 * 233.15 / 40.0);
        assert!((p - expected).abs() < 1e-9);
    }

    #[test]
    fn test_low_stage_failure_names_stage() {
        let err = select_cascade(
            10_000.0,
            &deep_freeze_point(),
            EquipmentCatalog::standard(),
            &DesignConfig::new(0.1),
        )
        .unwrap_err();
        match err {
            CalcError::NoCandidate { stage, max_available_kw, .. } => {
                assert_eq!(stage, "low");
                assert!(max_available_kw > 0.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_high_stage_failure_names_stage() {
        let mut catalog = EquipmentCatalog::standard().clone();
        let template = catalog.get("LS-CO2-030").unwrap().clone();
        catalog.entries.push(EquipmentEntry {
            model_id: "LS-HUGE".to_string(),
            rated_capacity_kw: 5_000.0,
            correction: CapacityCorrection::Linear {
                evap_coeff_per_k: 0.0,
                cond_coeff_per_k: 0.0,
            },
            ..template
        });
        let err = select_cascade(2_000.0, &deep_freeze_point(), &catalog, &DesignConfig::new(0.1)).unwrap_err();
        match err {
            CalcError::NoCandidate { stage, .. } => assert_eq!(stage, "high"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn accepted_intermediate_is_strictly_between(
                te in -60.0f64..-20.0,
                tc in 20.0f64..55.0,
                configured in proptest::option::of(-70.0f64..70.0),
            ) {
                let config = CascadeConfig { intermediate_c: configured, ..CascadeConfig::default() };
                if let Ok(t) = intermediate_temperature(te, tc, &config) {
                    prop_assert!(te < t && t < tc);
                }
                if configured.is_none() {
                    prop_assert!(intermediate_temperature(te, tc, &config).is_ok());
                }
            }
        }
    }
}
