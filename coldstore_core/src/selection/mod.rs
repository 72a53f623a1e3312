//! # Equipment Selection
//!
//! Matches a required load against the equipment catalog.
//!
//! - [`single_stage`] - picks the smallest unit (or group of identical units)
//!   covering a load at one operating point
//! - [`cascade`] - splits a low-temperature duty across a low and a high stage
//!
//! [`select_system`] makes the single-stage/cascade decision in one place,
//! comparing the evaporating temperature against the configured threshold.

pub mod cascade;
pub mod single_stage;

pub use cascade::{intermediate_temperature, select_cascade, CascadeDesign};
pub use single_stage::select;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{DefrostMethod, EnvelopeViolation, EquipmentCatalog, EquipmentKind, StageRole};
use crate::config::DesignConfig;
use crate::errors::CalcResult;
use crate::loads::RequiredCapacity;

/// Refrigerant and air temperatures a unit works at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub evaporating_c: f64,
    pub condensing_c: f64,
    /// Room air entering the air cooler
    pub room_c: f64,
}

impl OperatingPoint {
    pub fn new(evaporating_c: f64, condensing_c: f64, room_c: f64) -> Self {
        OperatingPoint {
            evaporating_c,
            condensing_c,
            room_c,
        }
    }

    /// Temperature lift between condensing and evaporating (K)
    pub fn lift_k(&self) -> f64 {
        self.condensing_c - self.evaporating_c
    }
}

/// What the selector is looking for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub kind: EquipmentKind,
    pub role: StageRole,
    /// Largest group of identical units considered
    pub max_units: u32,
    /// Air coolers only
    pub defrost_method: Option<DefrostMethod>,
}

impl SelectionCriteria {
    pub fn air_coolers(max_units: u32, defrost_method: DefrostMethod) -> Self {
        SelectionCriteria {
            kind: EquipmentKind::AirCooler,
            role: StageRole::Single,
            max_units,
            defrost_method: Some(defrost_method),
        }
    }

    pub fn compressors(role: StageRole, max_units: u32) -> Self {
        SelectionCriteria {
            kind: EquipmentKind::Compressor,
            role,
            max_units,
            defrost_method: None,
        }
    }

    /// Stage name reported in `NoCandidate`
    pub fn stage_name(&self) -> &'static str {
        match self.kind {
            EquipmentKind::AirCooler => "air cooler",
            EquipmentKind::Compressor => self.role.stage_name(),
        }
    }
}

/// Why a catalog entry was not selected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum RejectionReason {
    OutsideEnvelope { violation: EnvelopeViolation },
    /// Cooler built for another defrost method
    DefrostMismatch {
        required: DefrostMethod,
        found: Option<DefrostMethod>,
    },
    /// Correction curve gives no usable capacity here; `None` when non-finite
    NoCapacity { capacity_kw: Option<f64> },
}

/// One excluded catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub model_id: String,
    pub reason: RejectionReason,
}

/// A chosen group of identical units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSelection {
    pub model_id: String,
    pub kind: EquipmentKind,
    pub role: StageRole,
    pub refrigerant: String,
    pub units: u32,
    /// Corrected capacity of one unit (kW)
    pub unit_capacity_kw: f64,
    pub total_capacity_kw: f64,
    pub required_kw: f64,
    pub margin_kw: f64,
    /// `margin_kw / required_kw`
    pub margin_fraction: f64,
    pub operating: OperatingPoint,
    /// Compressor shaft power when delivering the required load (kW)
    pub power_input_kw: Option<f64>,
    pub cop: Option<f64>,
    /// Fan motors of all units (air coolers)
    pub fan_power_kw: f64,
    /// Defrost heaters of all units while defrosting (air coolers)
    #[serde(default)]
    pub defrost_power_kw: f64,
    /// Every entry considered and excluded, in model id order
    pub rejections: Vec<Rejection>,
}

/// Which kind of system serves the room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemKind {
    SingleStage,
    Cascade,
}

impl SystemKind {
    /// Evaporating temperatures strictly below the threshold need a cascade
    pub fn for_evaporating(evaporating_c: f64, cascade_threshold_c: f64) -> Self {
        if evaporating_c < cascade_threshold_c {
            SystemKind::Cascade
        } else {
            SystemKind::SingleStage
        }
    }
}

/// Selected equipment for one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "system")]
pub enum SystemSelection {
    SingleStage {
        air_cooler: EquipmentSelection,
        compressor: EquipmentSelection,
    },
    Cascade {
        air_cooler: EquipmentSelection,
        low_stage: EquipmentSelection,
        high_stage: EquipmentSelection,
        intermediate_c: f64,
        heat_exchanger_duty_kw: f64,
        low_stage_power_kw: f64,
    },
}

impl SystemSelection {
    pub fn kind(&self) -> SystemKind {
        match self {
            SystemSelection::SingleStage { .. } => SystemKind::SingleStage,
            SystemSelection::Cascade { .. } => SystemKind::Cascade,
        }
    }

    pub fn air_cooler(&self) -> &EquipmentSelection {
        match self {
            SystemSelection::SingleStage { air_cooler, .. } => air_cooler,
            SystemSelection::Cascade { air_cooler, .. } => air_cooler,
        }
    }

    /// Total compressor shaft power (kW), if every stage has a power figure
    pub fn compressor_power_kw(&self) -> Option<f64> {
        match self {
            SystemSelection::SingleStage { compressor, .. } => compressor.power_input_kw,
            SystemSelection::Cascade {
                high_stage,
                low_stage_power_kw,
                ..
            } => high_stage.power_input_kw.map(|high| high + low_stage_power_kw),
        }
    }
}

/// Select air coolers and compressors for a room load.
///
/// The operating point is the room's; a cascade derives its stage operating
/// points from it. A cascade's intermediate temperature is checked before
/// any equipment is selected.
pub fn select_system(
    required: RequiredCapacity,
    op: &OperatingPoint,
    defrost_method: DefrostMethod,
    catalog: &EquipmentCatalog,
    config: &DesignConfig,
) -> CalcResult<SystemSelection> {
    let kind = SystemKind::for_evaporating(op.evaporating_c, config.cascade_threshold_c);
    info!(
        evaporating_c = op.evaporating_c,
        threshold_c = config.cascade_threshold_c,
        system = ?kind,
        "compressor system"
    );
    if kind == SystemKind::Cascade {
        intermediate_temperature(op.evaporating_c, op.condensing_c, &config.cascade)?;
    }

    let air_cooler = select(
        required.air_cooler_kw,
        op,
        catalog,
        &SelectionCriteria::air_coolers(config.max_air_coolers, defrost_method),
    )?;

    match kind {
        SystemKind::SingleStage => {
            let compressor = select(
                required.compressor_kw,
                op,
                catalog,
                &SelectionCriteria::compressors(StageRole::Single, config.max_units_per_stage),
            )?;
            Ok(SystemSelection::SingleStage {
                air_cooler,
                compressor,
            })
        }
        SystemKind::Cascade => {
            let cascade = select_cascade(required.compressor_kw, op, catalog, config)?;
            Ok(SystemSelection::Cascade {
                air_cooler,
                low_stage: cascade.low_stage,
                high_stage: cascade.high_stage,
                intermediate_c: cascade.intermediate_c,
                heat_exchanger_duty_kw: cascade.heat_exchanger_duty_kw,
                low_stage_power_kw: cascade.low_stage_power_kw,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;

    fn both(kw: f64) -> RequiredCapacity {
        RequiredCapacity {
            air_cooler_kw: kw,
            compressor_kw: kw,
        }
    }

    #[test]
    fn test_system_kind_threshold() {
        assert_eq!(SystemKind::for_evaporating(-26.0, -35.0), SystemKind::SingleStage);
        assert_eq!(SystemKind::for_evaporating(-35.0, -35.0), SystemKind::SingleStage);
        assert_eq!(SystemKind::for_evaporating(-35.1, -35.0), SystemKind::Cascade);
    }

    #[test]
    fn test_single_stage_system() {
        let op = OperatingPoint::new(-26.0, 45.0, -18.0);
        let sel = select_system(both(9.0), &op, DefrostMethod::Electric, EquipmentCatalog::standard(), &DesignConfig::new(0.1))
            .unwrap();
        assert_eq!(sel.kind(), SystemKind::SingleStage);
        assert!(sel.air_cooler().total_capacity_kw >= 9.0);
        assert!(sel.compressor_power_kw().unwrap() > 0.0);
    }

    #[test]
    fn test_cascade_system() {
        let op = OperatingPoint::new(-48.0, 45.0, -40.0);
        let sel = select_system(both(20.0), &op, DefrostMethod::Electric, EquipmentCatalog::standard(), &DesignConfig::new(0.1))
            .unwrap();
        match &sel {
            SystemSelection::Cascade {
                low_stage,
                high_stage,
                intermediate_c,
                heat_exchanger_duty_kw,
                low_stage_power_kw,
                ..
            } => {
                assert!(-48.0 < *intermediate_c && *intermediate_c < 45.0);
                assert_eq!(low_stage.role, StageRole::Low);
                assert_eq!(high_stage.role, StageRole::High);
                assert!((heat_exchanger_duty_kw - (20.0 + low_stage_power_kw)).abs() < 1e-9);
                assert!((high_stage.required_kw - heat_exchanger_duty_kw).abs() < 1e-9);
            }
            other => panic!("expected cascade, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_selection_json_is_tagged() {
        let op = OperatingPoint::new(-26.0, 45.0, -18.0);
        let sel = select_system(both(9.0), &op, DefrostMethod::Electric, EquipmentCatalog::standard(), &DesignConfig::new(0.1))
            .unwrap();
        let json = serde_json::to_string(&sel).unwrap();
        assert!(json.contains("\"system\":\"SingleStage\""));
    }

    #[test]
    fn test_coolers_and_compressors_use_their_own_loads() {
        let op = OperatingPoint::new(-26.0, 45.0, -18.0);
        let required = RequiredCapacity {
            air_cooler_kw: 12.0,
            compressor_kw: 7.0,
        };
        let sel = select_system(required, &op, DefrostMethod::Electric, EquipmentCatalog::standard(), &DesignConfig::new(0.1))
            .unwrap();
        match &sel {
            SystemSelection::SingleStage { air_cooler, compressor } => {
                assert_eq!(air_cooler.required_kw, 12.0);
                assert_eq!(compressor.required_kw, 7.0);
            }
            other => panic!("expected single stage, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_intermediate_checked_before_any_selection() {
        let op = OperatingPoint::new(-48.0, 45.0, -40.0);
        let mut config = DesignConfig::new(0.1);
        config.cascade.intermediate_c = Some(80.0);
        let empty = EquipmentCatalog::new(Vec::new()).unwrap();
        match select_system(both(20.0), &op, DefrostMethod::Electric, &empty, &config) {
            Err(CalcError::InvalidInput { field, .. }) => assert_eq!(field, "cascade.intermediate_c"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_cooler_defrost_power_scales_with_units() {
        let op = OperatingPoint::new(-26.0, 45.0, -18.0);
        let sel = select_system(both(9.0), &op, DefrostMethod::Electric, EquipmentCatalog::standard(), &DesignConfig::new(0.1))
            .unwrap();
        let cooler = sel.air_cooler();
        let entry = EquipmentCatalog::standard().get(&cooler.model_id).unwrap();
        assert!(entry.defrost_power_kw > 0.0);
        assert!((cooler.defrost_power_kw - entry.defrost_power_kw * f64::from(cooler.units)).abs() < 1e-12);
    }
}
